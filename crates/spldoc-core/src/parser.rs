//! Block parser for SPLDOC markup.
//!
//! Consumes the input line by line. Pages, sections and lists recurse; a
//! recursive call returns when the current line ends its scope, leaving the
//! line for the caller. Inline text is handed to the inline scanner and
//! tables to the table sub-parser.
//!
//! Malformed markup never stops the parser: it becomes literal text (prefixed
//! by the configured error marker) plus an `Error` node.

use crate::annotation::{self, Annotation};
use crate::ast::{NodeId, NodeKind, SyntaxTree};
use crate::error::ErrorKind;
use crate::lexer::{indent_of, next_non_whitespace, Lexer, MAX_NESTING};
use crate::markup::{is_whitespace_byte, Markup};
use crate::summary;
use crate::table::TableParser;

/// Text inserted before faulty markup that is echoed into the output.
pub const DEFAULT_ERROR_MARKER: &str = "!!!!!!ERROR:!!!!!!";

/// Settings for a [`Parser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Line number of the first input line, used for node and diagnostic
    /// line offsets.
    pub start_line: usize,
    /// Marker prepended to faulty markup echoed as text.
    pub error_marker: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            start_line: 0,
            error_marker: DEFAULT_ERROR_MARKER.to_string(),
        }
    }
}

/// SPLDOC parser.
///
/// ```rust
/// use spldoc_core::{NodeKind, Parser};
///
/// let parser = Parser::new().with_start_line(10);
/// let tree = parser.parse("# Usage\nCall it twice.");
/// let section = tree.children_of_kind(tree.root(), NodeKind::Section).next().unwrap();
/// assert_eq!(tree[section].line(), 10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    /// Create a parser with default options.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with the given options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Set the line number of the first input line.
    pub fn with_start_line(mut self, line: usize) -> Self {
        self.options.start_line = line;
        self
    }

    /// Set the marker prepended to echoed faulty markup.
    pub fn with_error_marker(mut self, marker: impl Into<String>) -> Self {
        self.options.error_marker = marker.into();
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse the narrative part of a documentation comment.
    ///
    /// Everything from the first annotation line on is ignored; see
    /// [`Parser::parse_annotations`].
    #[tracing::instrument(level = "trace", skip_all, fields(len = input.len()))]
    pub fn parse(&self, input: &str) -> SyntaxTree {
        let mut parser = DocParser::new(&self.options);
        let mut lexer = Lexer::new(input, self.options.start_line);
        let root = parser.tree.root();
        parser.parse_block(root, &mut lexer);
        let tree = parser.finish();
        tracing::debug!(nodes = tree.len(), "parsed spldoc markup");
        tree
    }

    /// Extract the annotations of a documentation comment.
    #[tracing::instrument(level = "trace", skip_all, fields(len = input.len()))]
    pub fn parse_annotations(&self, input: &str) -> Vec<Annotation> {
        annotation::parse_annotations(&mut Lexer::new(input, self.options.start_line))
    }

    /// First sentence of the narrative text.
    pub fn first_sentence<'a>(&self, input: &'a str) -> &'a str {
        summary::first_sentence(&Lexer::new(input, self.options.start_line))
    }

    /// Whether the input has narrative text before its annotations.
    pub fn has_description(&self, input: &str) -> bool {
        summary::has_description(&Lexer::new(input, self.options.start_line))
    }
}

/// Parse `input` with default options, numbering lines from `start_line`.
///
/// ```rust
/// use spldoc_core::{parse, NodeKind};
///
/// let tree = parse("1. first\n2. second\n", 0);
/// assert!(!tree.has_errors());
/// assert_eq!(tree.descendants(tree.root())
///     .filter(|&id| tree.kind(id) == NodeKind::OrderedListItem)
///     .count(), 2);
/// ```
pub fn parse(input: &str, start_line: usize) -> SyntaxTree {
    Parser::new().with_start_line(start_line).parse(input)
}

/// Extract annotations (`@param`, `@return`, ...) with default options.
pub fn parse_annotations(input: &str) -> Vec<Annotation> {
    Parser::new().parse_annotations(input)
}

/// First sentence of `input`, as a slice of it.
pub fn first_sentence(input: &str) -> &str {
    Parser::new().first_sentence(input)
}

/// Whether `input` has narrative text before any annotation.
pub fn has_description(input: &str) -> bool {
    Parser::new().has_description(input)
}

/// Tree under construction plus the settings of one parse call.
pub(crate) struct DocParser<'o> {
    pub(crate) tree: SyntaxTree,
    options: &'o ParseOptions,
}

impl<'o> DocParser<'o> {
    pub(crate) fn new(options: &'o ParseOptions) -> Self {
        Self {
            tree: SyntaxTree::new(options.start_line),
            options,
        }
    }

    pub(crate) fn finish(self) -> SyntaxTree {
        self.tree
    }

    #[inline]
    pub(crate) fn marker(&self) -> &'o str {
        &self.options.error_marker
    }

    /// Parse block content into `parent` until the input or the parent's
    /// scope ends.
    pub(crate) fn parse_block(&mut self, parent: NodeId, lexer: &mut Lexer<'_>) {
        lexer.skip_comments_and_blank_lines(None);
        let parent_kind = self.tree.kind(parent);
        let nested_blocks = !lexer.scope.in_table_entry;

        let (mut current, base) = if parent_kind.is_list() {
            (parent, lexer.adjust_indent(indent_of(lexer.current_line())))
        } else {
            let para = self.tree.push(parent, NodeKind::Paragraph, lexer.line);
            (para, lexer.start_indent())
        };
        let mut list_item: Option<NodeId> = None;
        // Paragraph opened by the last blank line, with the position of that line.
        let mut blank: Option<(NodeId, usize, usize)> = None;

        while !lexer.is_eof() {
            let line = lexer.current_line();
            let indent = indent_of(line);
            let adjusted = lexer.adjust_indent(indent);

            if Markup::Paragraph.matches(line) {
                let owner = match list_item {
                    Some(item) if lexer.scope.list_level > 0 => item,
                    _ => parent,
                };
                current = self.tree.push(owner, NodeKind::Paragraph, lexer.line);
                blank = Some((current, lexer.pos, lexer.line));
                lexer.advance_line(line.len());
                continue;
            }

            if Lexer::is_code_block_line(line, Some(base)) {
                let code = self.tree.push(current, NodeKind::CodeBlock, lexer.line);
                self.parse_code_block(code, lexer, base);
                continue;
            }

            if nested_blocks && Markup::NewPage.matches(line) {
                if lexer.scope.list_level > 0 || parent_kind == NodeKind::Section {
                    return;
                }
                let level = line[indent..].bytes().take_while(|&b| b == b'+').count() as u32;
                if level <= lexer.scope.page_level {
                    return;
                }
                if lexer.scope.page_level >= MAX_NESTING {
                    self.parse_text(current, lexer, Some(base), None);
                    continue;
                }
                current = self.tree.push(parent, NodeKind::NewPage, lexer.line);
                lexer.pos += indent + level as usize;
                lexer.scope.page_level += 1;
                self.parse_title(current, lexer, Some(base));
                let summary = summary::first_sentence(lexer);
                self.tree.set_text(current, summary);
                self.parse_block(current, lexer);
                lexer.scope.page_level -= 1;
                continue;
            }

            if nested_blocks && Markup::Section.matches(line) {
                if lexer.scope.list_level > 0 || parent_kind == NodeKind::Section {
                    return;
                }
                current = self.tree.push(parent, NodeKind::Section, lexer.line);
                lexer.pos += indent + 1;
                self.parse_title(current, lexer, Some(base));
                self.parse_block(current, lexer);
                continue;
            }

            let list = if Markup::OrderedListItem.matches(line) {
                Some((NodeKind::OrderedList, NodeKind::OrderedListItem))
            } else if Markup::UnorderedListItem.matches(line) {
                Some((NodeKind::UnorderedList, NodeKind::UnorderedListItem))
            } else {
                None
            };
            if let Some((list_kind, item_kind)) = list {
                if parent_kind == list_kind && adjusted == base {
                    let item = self.tree.push(parent, item_kind, lexer.line);
                    list_item = Some(item);
                    current = self.tree.push(item, NodeKind::Paragraph, lexer.line);
                    let marker_end = match item_kind {
                        NodeKind::OrderedListItem => line.find('.').map_or(indent, |dot| dot + 1),
                        _ => indent + 1,
                    };
                    lexer.pos += marker_end;
                    while lexer
                        .byte_at(lexer.pos)
                        .is_some_and(|b| b != b'\n' && is_whitespace_byte(b))
                    {
                        lexer.pos += 1;
                    }
                    self.parse_text(current, lexer, Some(base), None);
                } else if lexer.scope.list_level > 0 && adjusted <= base {
                    self.rewind_blank(lexer, current, blank);
                    return;
                } else if lexer.scope.list_level >= MAX_NESTING {
                    self.parse_text(current, lexer, Some(base), None);
                } else {
                    lexer.scope.list_level += 1;
                    let list = self.tree.push(current, list_kind, lexer.line);
                    self.parse_block(list, lexer);
                    lexer.scope.list_level -= 1;
                }
                continue;
            }

            if Markup::TableTitle.matches(line) || Markup::TableStart.matches(line) {
                if nested_blocks {
                    TableParser::new(self, current).parse(lexer, base);
                } else {
                    self.parse_text(current, lexer, Some(base), None);
                }
                continue;
            }

            if nested_blocks && Markup::Annotation.matches(line) {
                lexer.pos = lexer.len();
                return;
            }

            if Markup::Comment.matches(line) {
                lexer.skip_comments(Some(base));
                continue;
            }

            if Markup::ReservedNewline.matches(line) && (nested_blocks || !Markup::Section.matches(line)) {
                self.tree.push_error(
                    current,
                    ErrorKind::ReservedNewline,
                    Some(line.trim().to_string()),
                    lexer.line,
                );
                let echoed = format!("{}{}", self.marker(), line);
                self.tree.push_text(current, echoed, lexer.line);
                lexer.advance_line(line.len());
                continue;
            }

            if lexer.scope.list_level > 0 && indent <= base {
                self.rewind_blank(lexer, current, blank);
                return;
            }

            self.parse_text(current, lexer, Some(base), None);
        }
    }

    /// Give a blank line that only opened an empty paragraph back to the
    /// caller, so it can start a paragraph at its own level. The empty
    /// paragraph is dropped.
    fn rewind_blank(
        &mut self,
        lexer: &mut Lexer<'_>,
        current: NodeId,
        blank: Option<(NodeId, usize, usize)>,
    ) {
        if let Some((para, pos, line)) = blank {
            if para == current && self.tree.discard(para) {
                lexer.pos = pos;
                lexer.line = line;
            }
        }
    }

    /// Parse a code block: indented lines, blank lines between them
    /// included, comments at the base indentation skipped.
    fn parse_code_block(&mut self, node: NodeId, lexer: &mut Lexer<'_>, base: usize) {
        let end = code_block_end(lexer, base);
        let mut code = String::new();
        while lexer.pos < end {
            lexer.skip_comments(Some(base));
            if lexer.pos >= end {
                break;
            }
            let line = lexer.current_line();
            code.push_str(&code_block_line(line, base));
            lexer.advance_line(line.len());
        }
        if code.ends_with('\n') {
            code.pop();
        }
        self.tree.push_text(node, code, lexer.line);
    }

    /// Parse the single-line title of a page, section or table. Links are
    /// literal in titles.
    pub(crate) fn parse_title(&mut self, node: NodeId, lexer: &mut Lexer<'_>, base: Option<usize>) {
        while lexer
            .byte_at(lexer.pos)
            .is_some_and(|b| b != b'\n' && is_whitespace_byte(b))
        {
            lexer.pos += 1;
        }
        let title = self.tree.push(node, NodeKind::Title, lexer.line);
        let line = lexer.current_line();

        let error = if matches!(lexer.byte_at(lexer.pos), None | Some(b'\n')) {
            Some((ErrorKind::NoTitle, None))
        } else if Markup::ReservedTitle.matches(line) {
            Some((ErrorKind::ReservedTitle, Some(line.trim().to_string())))
        } else {
            None
        };
        if let Some((kind, text)) = error {
            self.tree.push_error(node, kind, text, lexer.line);
            let echoed = format!("{}{}", self.marker(), line.trim());
            self.tree.push_text(title, echoed, lexer.line);
            lexer.advance_line(line.len());
            return;
        }

        lexer.scope.in_title = true;
        self.parse_text(title, lexer, base, None);
        lexer.scope.in_title = false;
    }

    /// Parse the buffered text of a table entry into `entry`.
    pub(crate) fn parse_entry(&mut self, entry: NodeId, text: &str, line: usize) {
        let mut lexer = Lexer::new(text, line);
        lexer.scope.in_table_entry = true;
        self.parse_block(entry, &mut lexer);
    }
}

/// End position of the code block starting at the cursor. Trailing blank
/// lines are not part of it.
fn code_block_end(lexer: &Lexer<'_>, base: usize) -> usize {
    let mut probe = lexer.clone();
    let mut end = probe.pos;
    while !probe.is_eof() {
        probe.skip_comments_and_blank_lines(Some(base));
        if probe.is_eof() {
            break;
        }
        let line = probe.current_line();
        if !Lexer::is_code_block_line(line, Some(base)) {
            break;
        }
        probe.advance_line(line.len());
        end = probe.pos;
    }
    end
}

/// Strip the base plus one code indentation, and translate a leading `\@`
/// or `\\`.
fn code_block_line(line: &str, base: usize) -> String {
    let mut code = line;
    if let Some(rest) = line.get(base..) {
        if let Some(stripped) = rest.strip_prefix("    ").or_else(|| rest.strip_prefix('\t')) {
            code = stripped;
        }
    }
    if let Some(first) = next_non_whitespace(code, 0) {
        let bytes = code.as_bytes();
        if bytes[first] == b'\\' && matches!(bytes.get(first + 1), Some(b'@' | b'\\')) {
            return format!("{}{}", &code[..first], &code[first + 1..]);
        }
    }
    code.to_string()
}
