//! Cursor over one SPLDOC input.
//!
//! A [`Lexer`] is created per call (and per table entry re-parse). It owns
//! the byte position, the line offset, the document's base indentation and
//! the nesting [`Scope`]. Nothing is shared between calls.
//!
//! Positions are byte offsets into the input. All markup characters are
//! ASCII, so positions produced by markup scanning are always character
//! boundaries; arbitrary text is stepped over a whole `char` at a time.

use memchr::memchr;

use crate::markup::{is_whitespace_byte, Markup};

/// Deepest nesting of lists, pages or font markup. Deeper markup is text.
pub(crate) const MAX_NESTING: u32 = 64;

/// Nesting state consulted when deciding where a span of text ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Scope {
    pub font_level: u32,
    pub list_level: u32,
    pub page_level: u32,
    pub in_title: bool,
    /// Parsing the buffered text of a table entry.
    pub in_table_entry: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    /// Current byte offset.
    pub pos: usize,
    /// Line offset of `pos`, relative to the caller's numbering.
    pub line: usize,
    /// Indentation of the first non-blank, non-comment line.
    start_indent: usize,
    pub scope: Scope,
}

impl<'a> Lexer<'a> {
    /// Create a cursor positioned on the first line with content.
    pub fn new(input: &'a str, line: usize) -> Self {
        let mut lexer = Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            line,
            start_indent: 0,
            scope: Scope::default(),
        };
        lexer.skip_comments_and_blank_lines(None);
        lexer.start_indent = indent_of(lexer.current_line());
        lexer
    }

    #[inline(always)]
    pub fn input(&self) -> &'a str {
        self.input
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline(always)]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    #[inline(always)]
    pub fn start_indent(&self) -> usize {
        self.start_indent
    }

    /// Indentation never goes below the document base.
    #[inline]
    pub fn adjust_indent(&self, indent: usize) -> usize {
        indent.max(self.start_indent)
    }

    #[inline(always)]
    pub fn byte_at(&self, pos: usize) -> Option<u8> {
        self.bytes.get(pos).copied()
    }

    #[inline]
    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.input.get(pos..).and_then(|rest| rest.chars().next())
    }

    #[inline]
    pub fn starts_with_at(&self, pos: usize, literal: &str) -> bool {
        self.bytes
            .get(pos..)
            .is_some_and(|rest| rest.starts_with(literal.as_bytes()))
    }

    /// Text from `pos` through the end of its line, newline included.
    #[inline]
    pub fn line_from(&self, pos: usize) -> &'a str {
        if pos >= self.bytes.len() {
            return "";
        }
        let end = memchr(b'\n', &self.bytes[pos..]).map_or(self.bytes.len(), |i| pos + i + 1);
        &self.input[pos..end]
    }

    #[inline]
    pub fn current_line(&self) -> &'a str {
        self.line_from(self.pos)
    }

    /// The whole line containing `pos`, newline included.
    pub fn whole_line(&self, pos: usize) -> &'a str {
        let pos = pos.min(self.bytes.len());
        let start = memchr::memrchr(b'\n', &self.bytes[..pos]).map_or(0, |i| i + 1);
        self.line_from(start)
    }

    /// Move past `len` bytes that end a line.
    #[inline]
    pub fn advance_line(&mut self, len: usize) {
        self.pos += len;
        self.line += 1;
    }

    #[inline]
    pub fn skip_line(&mut self) {
        let len = self.current_line().len();
        self.advance_line(len);
    }

    /// Step over one character, returning it.
    #[inline]
    pub fn bump_char(&mut self) -> Option<char> {
        let c = self.char_at(self.pos)?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Whether `line` is a code block line relative to `base`.
    pub fn is_code_block_line(line: &str, base: Option<usize>) -> bool {
        match base {
            Some(base) => {
                indent_of(line) > base
                    && line
                        .get(base..)
                        .is_some_and(|rest| Markup::CodeBlock.matches(rest))
            }
            None => false,
        }
    }

    /// Skip comment lines. Code block lines are never comments.
    pub fn skip_comments(&mut self, base: Option<usize>) {
        while !self.is_eof() {
            let line = self.current_line();
            if Self::is_code_block_line(line, base) || !Markup::Comment.matches(line) {
                return;
            }
            self.advance_line(line.len());
        }
    }

    pub fn skip_comments_and_blank_lines(&mut self, base: Option<usize>) {
        while !self.is_eof() {
            self.skip_comments(base);
            let line = self.current_line();
            if line.is_empty() || !Markup::Paragraph.matches(line) {
                return;
            }
            self.advance_line(line.len());
        }
    }

    /// Consume a run of escapes, returning the escaped characters.
    /// A backslash before a newline joins the two lines.
    pub fn take_escapes(&mut self) -> String {
        let mut escaped = String::new();
        while self.byte_at(self.pos) == Some(b'\\') {
            self.pos += 1;
            match self.char_at(self.pos) {
                None => break,
                Some('\n') => {
                    self.pos += 1;
                    self.line += 1;
                }
                Some(c) => {
                    escaped.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
        escaped
    }

    /// Whether the line at `pos` ends the current span of inline text.
    pub fn ends_text_at(&self, pos: usize, base: Option<usize>) -> bool {
        if self.scope.in_title {
            return true;
        }
        let line = self.line_from(pos);
        let indent = indent_of(line);
        Markup::Paragraph.matches(line)
            || Self::is_code_block_line(line, base)
            || Markup::NewPage.matches(line)
            || Markup::Section.matches(line)
            || Markup::OrderedListItem.matches(line)
            || Markup::UnorderedListItem.matches(line)
            || Markup::TableTitle.matches(line)
            || Markup::TableStart.matches(line)
            || (Markup::ReservedNewline.matches(line) && !Markup::Comment.matches(line))
            || Markup::Annotation.matches(line)
            || (self.scope.list_level > 0 && base.is_some_and(|base| indent <= base))
    }
}

/// Leading whitespace of `line`, newline excluded.
#[inline]
pub(crate) fn indent_of(line: &str) -> usize {
    line.bytes()
        .take_while(|&b| b != b'\n' && is_whitespace_byte(b))
        .count()
}

/// Start of the trailing whitespace of the line at `pos`, or of its newline.
pub(crate) fn end_of_line_whitespace(input: &str, pos: usize) -> usize {
    let bytes = input.as_bytes();
    let line_end = memchr(b'\n', bytes.get(pos..).unwrap_or_default()).map_or(bytes.len(), |i| pos + i);
    let mut end = line_end;
    while end > pos && is_whitespace_byte(bytes[end - 1]) {
        end -= 1;
    }
    end
}

/// First non-whitespace position at or after `pos`.
#[inline]
pub(crate) fn next_non_whitespace(input: &str, pos: usize) -> Option<usize> {
    input
        .as_bytes()
        .get(pos..)?
        .iter()
        .position(|&b| !is_whitespace_byte(b))
        .map(|i| pos + i)
}

/// First whitespace position at or after `pos`, or the end of `text`.
#[inline]
pub(crate) fn next_whitespace_or_end(text: &str, pos: usize) -> usize {
    text.as_bytes()
        .get(pos..)
        .and_then(|rest| rest.iter().position(|&b| is_whitespace_byte(b)))
        .map_or(text.len(), |i| pos + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_skips_leading_comments_and_blanks() {
        let lexer = Lexer::new("\n! note\n  \n  text\n", 5);
        assert_eq!(lexer.current_line(), "  text\n");
        assert_eq!(lexer.line, 8);
        assert_eq!(lexer.start_indent(), 2);
    }

    #[test]
    fn test_code_block_line_is_not_a_comment() {
        let mut lexer = Lexer::new("x\n      ! code\n", 0);
        lexer.skip_line();
        lexer.skip_comments(Some(0));
        assert_eq!(lexer.current_line(), "      ! code\n");
        lexer.skip_comments(None);
        assert!(lexer.is_eof());
    }

    #[test]
    fn test_escapes() {
        let mut lexer = Lexer::new("\\*\\\\\\\nx", 0);
        assert_eq!(lexer.take_escapes(), "*\\");
        assert_eq!(lexer.line, 1);
        assert_eq!(lexer.byte_at(lexer.pos), Some(b'x'));
    }

    #[test]
    fn test_line_helpers() {
        let input = "ab  \ncd";
        assert_eq!(end_of_line_whitespace(input, 0), 2);
        assert_eq!(end_of_line_whitespace(input, 5), 7);
        assert_eq!(next_non_whitespace(input, 2), Some(5));
        assert_eq!(next_whitespace_or_end("param x", 0), 5);
        assert_eq!(next_whitespace_or_end("param", 0), 5);
        let lexer = Lexer::new(input, 0);
        assert_eq!(lexer.whole_line(6), "cd");
        assert_eq!(lexer.whole_line(2), "ab  \n");
    }

    #[test]
    fn test_text_ends_at_block_markup() {
        let lexer = Lexer::new("a\n* item\nb\n\n", 0);
        assert!(lexer.ends_text_at(2, Some(0)));
        assert!(!lexer.ends_text_at(9, Some(0)));
        assert!(lexer.ends_text_at(11, Some(0)));
    }
}
