//! Detectors for SPLDOC constructs.
//!
//! Line-level and table markup is matched with anchored regular expressions,
//! compiled once. A match never looks past the end of the current line
//! (the terminating `\n` included). Font, link and image markup are plain
//! literals.
//!
//! `\s` in the patterns means the ASCII whitespace set
//! `[ \t\n\x0B\x0C\r]`, not Unicode whitespace.

use memchr::memchr;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::NodeKind;

const WS: &str = r"[ \t\n\x0B\x0C\r]";
const NON_WS: &str = r"[^ \t\n\x0B\x0C\r]";

/// Markup recognized by regular expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Markup {
    NewPage,
    Section,
    Paragraph,
    CodeBlock,
    OrderedListItem,
    UnorderedListItem,
    Annotation,
    Comment,
    TableTitle,
    TableStart,
    TableEnd,
    TableColumnHeaderBoundary,
    TableRowContentStart,
    TableRowContentEnd,
    TableEntryStart,
    TableEntryEnd,
    TableRowBoundary,
    TableClosingBorder,
    ReservedInline,
    ReservedNewline,
    ReservedTitle,
}

impl Markup {
    const ALL: [Markup; 21] = [
        Markup::NewPage,
        Markup::Section,
        Markup::Paragraph,
        Markup::CodeBlock,
        Markup::OrderedListItem,
        Markup::UnorderedListItem,
        Markup::Annotation,
        Markup::Comment,
        Markup::TableTitle,
        Markup::TableStart,
        Markup::TableEnd,
        Markup::TableColumnHeaderBoundary,
        Markup::TableRowContentStart,
        Markup::TableRowContentEnd,
        Markup::TableEntryStart,
        Markup::TableEntryEnd,
        Markup::TableRowBoundary,
        Markup::TableClosingBorder,
        Markup::ReservedInline,
        Markup::ReservedNewline,
        Markup::ReservedTitle,
    ];

    fn pattern(self) -> &'static str {
        match self {
            Markup::NewPage => r"\s*\++\s",
            Markup::Section => r"\s*#\s",
            Markup::Paragraph => r"\s*$",
            Markup::CodeBlock => r"( {4,}|\t+)",
            Markup::OrderedListItem => r"\s*[0-9]+\.\s",
            Markup::UnorderedListItem => r"\s*\*\s",
            Markup::Annotation => r"\s*@",
            Markup::Comment => r"\s*!\s+",
            Markup::TableTitle => r"\s*---\s+\S",
            Markup::TableStart => r"\s*(\|[-:][-:][-:]|---)",
            Markup::TableEnd => r"\s*---",
            Markup::TableColumnHeaderBoundary => r"\s*\|[=:][=:][=:]",
            Markup::TableRowContentStart => r"\s*[|:]",
            Markup::TableRowContentEnd => r"\|\s*$",
            Markup::TableEntryStart => r"[|+:]\s+\S",
            Markup::TableEntryEnd => r"\s+([|+][:-][:-]-|[|+:]\s|\|\s*$)",
            Markup::TableRowBoundary => r"[|+][-:][-:][-:]",
            Markup::TableClosingBorder => r"\s*[|+]---+([|+]+---+)*[|+]\s*$",
            Markup::ReservedInline => r"(\*\*\*\*|``|\[\[|\{\{)",
            Markup::ReservedNewline => r"\s*([!%=^$\-]|#+\s)",
            Markup::ReservedTitle => r"\s*[!@#%=^$\-+]",
        }
    }

    #[inline]
    fn regex(self) -> &'static Regex {
        &COMPILED[self as usize]
    }

    /// Whether `line` starts with this markup.
    #[inline]
    pub(crate) fn matches(self, line: &str) -> bool {
        self.regex().is_match(line)
    }

    /// Length of the match at the start of `line`.
    #[inline]
    pub(crate) fn match_len(self, line: &str) -> Option<usize> {
        self.regex().find(line).map(|m| m.end())
    }

    /// Match at `pos`, restricted to the rest of that line. Returns the
    /// absolute end position.
    pub(crate) fn match_at(self, input: &str, pos: usize) -> Option<usize> {
        let rest = input.get(pos..)?;
        let line_end = memchr(b'\n', rest.as_bytes()).map_or(rest.len(), |i| i + 1);
        self.match_len(&rest[..line_end]).map(|len| pos + len)
    }
}

static COMPILED: Lazy<Vec<Regex>> = Lazy::new(|| {
    Markup::ALL
        .iter()
        .map(|markup| {
            let pattern = markup
                .pattern()
                .replace(r"\s", WS)
                .replace(r"\S", NON_WS);
            Regex::new(&format!("^(?:{})", pattern)).expect("markup pattern is valid")
        })
        .collect()
});

/// Font markup: opened and closed by the same delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Font {
    Bold,
    Italics,
    Monospace,
}

impl Font {
    #[inline]
    pub(crate) fn delimiter(self) -> &'static str {
        match self {
            Font::Bold => "**",
            Font::Italics => "*",
            Font::Monospace => "`",
        }
    }

    pub(crate) fn kind(self) -> NodeKind {
        match self {
            Font::Bold => NodeKind::Bold,
            Font::Italics => NodeKind::Italics,
            Font::Monospace => NodeKind::Monospace,
        }
    }

    /// Font markup opening at `pos`: delimiter followed by non-whitespace.
    /// Bold is tried before italics, so `** x` opens nothing.
    pub(crate) fn opening_at(input: &str, pos: usize) -> Option<Font> {
        let rest = input.as_bytes().get(pos..)?;
        let font = [Font::Bold, Font::Italics, Font::Monospace]
            .into_iter()
            .find(|font| rest.starts_with(font.delimiter().as_bytes()))?;
        rest.get(font.delimiter().len())
            .is_some_and(|&b| !is_whitespace_byte(b))
            .then_some(font)
    }
}

/// Bracketed markup: `[url|label]` and `{url|label}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bracket {
    Link,
    Image,
}

impl Bracket {
    pub(crate) const LABEL_SEPARATOR: u8 = b'|';

    #[inline]
    pub(crate) fn open(self) -> u8 {
        match self {
            Bracket::Link => b'[',
            Bracket::Image => b'{',
        }
    }

    #[inline]
    pub(crate) fn close(self) -> u8 {
        match self {
            Bracket::Link => b']',
            Bracket::Image => b'}',
        }
    }

    pub(crate) fn kind(self) -> NodeKind {
        match self {
            Bracket::Link => NodeKind::Link,
            Bracket::Image => NodeKind::Image,
        }
    }

    pub(crate) fn url_kind(self) -> NodeKind {
        match self {
            Bracket::Link => NodeKind::LinkUrl,
            Bracket::Image => NodeKind::ImageUrl,
        }
    }

    pub(crate) fn label_kind(self) -> NodeKind {
        match self {
            Bracket::Link => NodeKind::LinkLabel,
            Bracket::Image => NodeKind::ImageLabel,
        }
    }

    /// Link or image opener at `pos`.
    pub(crate) fn opening_at(input: &str, pos: usize) -> Option<Bracket> {
        match input.as_bytes().get(pos) {
            Some(b'[') => Some(Bracket::Link),
            Some(b'{') => Some(Bracket::Image),
            _ => None,
        }
    }
}

/// SPLDOC whitespace: space, tab, newline, carriage return, form feed.
#[inline(always)]
pub(crate) fn is_whitespace_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
}
