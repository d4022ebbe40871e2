//! Inline scanner.
//!
//! Parses a span of text for escapes, font markup (`**bold**`, `*italics*`,
//! `` `monospace` ``), links (`[url|label]`), images (`{url|label}`) and
//! reserved sequences. The span ends at the end of input, at a given end
//! position, or at a newline followed by a line-level construct.
//!
//! Markup is validated by a lookahead on a copy of the cursor
//! ([`font_markup_end`], [`bracket_markup_end`]); only valid markup is then
//! consumed.

use crate::ast::NodeId;
use crate::error::ErrorKind;
use crate::lexer::{Lexer, MAX_NESTING};
use crate::markup::{is_whitespace_byte, Bracket, Font, Markup};
use crate::parser::DocParser;

/// Step over a newline and any comment lines after it, as [`DocParser::parse_text`]
/// does. `None` if the following line ends the text.
fn skip_newline(probe: &mut Lexer<'_>, base: Option<usize>) -> Option<()> {
    probe.pos += 1;
    probe.line += 1;
    if !probe.is_eof() {
        probe.skip_comments(base);
    }
    if !probe.is_eof() && probe.ends_text_at(probe.pos, base) {
        return None;
    }
    Some(())
}

/// End position (past the closing delimiter) of font markup opening at the
/// cursor, or `None` if it is not valid.
///
/// The closer must not follow whitespace and must come before the current
/// block scope ends. Nested font markup must itself be valid, and reserved
/// sequences invalidate the markup, as does nesting deeper than
/// [`MAX_NESTING`].
pub(crate) fn font_markup_end(lexer: &Lexer<'_>, font: Font, base: Option<usize>) -> Option<usize> {
    if lexer.scope.font_level >= MAX_NESTING {
        return None;
    }
    let mut probe = lexer.clone();
    let delimiter = font.delimiter();
    probe.pos += delimiter.len();
    while !probe.is_eof() {
        probe.take_escapes();
        let b = probe.byte_at(probe.pos)?;
        if b == b'\n' {
            skip_newline(&mut probe, base)?;
            continue;
        }
        if probe.starts_with_at(probe.pos, delimiter)
            && !probe.byte_at(probe.pos - 1).is_some_and(is_whitespace_byte)
        {
            return Some(probe.pos + delimiter.len());
        }
        if Markup::ReservedInline.match_at(probe.input(), probe.pos).is_some() {
            return None;
        }
        match Font::opening_at(probe.input(), probe.pos) {
            Some(nested) => {
                probe.scope.font_level += 1;
                probe.pos = font_markup_end(&probe, nested, base)?;
                probe.scope.font_level -= 1;
            }
            None => {
                probe.bump_char();
            }
        }
    }
    None
}

/// End position (past the closing bracket) of link or image markup opening
/// at the cursor, or `None` if it is not terminated within the current block
/// scope.
pub(crate) fn bracket_markup_end(
    lexer: &Lexer<'_>,
    bracket: Bracket,
    base: Option<usize>,
) -> Option<usize> {
    let mut probe = lexer.clone();
    probe.pos += 1;
    while !probe.is_eof() {
        probe.take_escapes();
        let b = probe.byte_at(probe.pos)?;
        if b == b'\n' {
            skip_newline(&mut probe, base)?;
            continue;
        }
        if b == bracket.close() {
            return Some(probe.pos + 1);
        }
        probe.bump_char();
    }
    None
}

impl DocParser<'_> {
    /// Parse inline text into `node` until the current text ends or `end`
    /// is reached.
    pub(crate) fn parse_text(
        &mut self,
        node: NodeId,
        lexer: &mut Lexer<'_>,
        base: Option<usize>,
        end: Option<usize>,
    ) {
        let end = end.unwrap_or(lexer.len());
        let mut plain = String::new();
        while lexer.pos < end {
            plain.push_str(&lexer.take_escapes());
            if lexer.pos >= end {
                break;
            }
            let Some(c) = lexer.char_at(lexer.pos) else {
                break;
            };

            if c == '\n' {
                lexer.pos += 1;
                lexer.line += 1;
                if lexer.pos < end {
                    lexer.skip_comments(base);
                }
                if lexer.pos >= end || lexer.ends_text_at(lexer.pos, base) {
                    break;
                }
                // A line break is a single space, whatever the indentation.
                while lexer.pos < end
                    && lexer
                        .byte_at(lexer.pos)
                        .is_some_and(|b| b != b'\n' && is_whitespace_byte(b))
                {
                    lexer.pos += 1;
                }
                plain.push(' ');
                continue;
            }

            if let Some(reserved_end) = Markup::ReservedInline.match_at(lexer.input(), lexer.pos) {
                let reserved = &lexer.input()[lexer.pos..reserved_end];
                plain.push_str(self.marker());
                plain.push_str(reserved);
                self.tree.push_error(
                    node,
                    ErrorKind::ReservedInline,
                    Some(reserved.to_string()),
                    lexer.line,
                );
                lexer.pos = reserved_end;
                continue;
            }

            if let Some(font) = Font::opening_at(lexer.input(), lexer.pos) {
                self.parse_font(node, font, lexer, base, &mut plain);
                continue;
            }

            if !lexer.scope.in_title {
                if let Some(bracket) = Bracket::opening_at(lexer.input(), lexer.pos) {
                    if lexer.scope.font_level == 0 {
                        self.parse_bracket(node, bracket, lexer, base, &mut plain);
                    } else {
                        if bracket == Bracket::Link {
                            let line = lexer.current_line().trim().to_string();
                            self.tree.push_error(
                                node,
                                ErrorKind::ReservedNestedInline,
                                Some(line),
                                lexer.line,
                            );
                        }
                        plain.push(char::from(bracket.open()));
                        lexer.pos += 1;
                    }
                    continue;
                }
            }

            plain.push(c);
            lexer.pos += c.len_utf8();
        }
        self.tree.push_text(node, plain, lexer.line);
    }

    fn parse_font(
        &mut self,
        node: NodeId,
        font: Font,
        lexer: &mut Lexer<'_>,
        base: Option<usize>,
        plain: &mut String,
    ) {
        let delimiter = font.delimiter();
        let Some(end) = font_markup_end(lexer, font, base) else {
            plain.push_str(delimiter);
            lexer.pos += delimiter.len();
            return;
        };
        lexer.pos += delimiter.len();
        self.tree.push_text(node, std::mem::take(plain), lexer.line);

        let font_node = self.tree.push(node, font.kind(), lexer.line);
        let end_of_text = end - delimiter.len();
        lexer.scope.font_level += 1;
        self.parse_text(font_node, lexer, base, Some(end_of_text));
        lexer.scope.font_level -= 1;
        if lexer.pos != end_of_text {
            self.tree.push_error(
                font_node,
                ErrorKind::Internal,
                Some(format!(
                    "font markup text ended at {} instead of {}",
                    lexer.pos, end_of_text
                )),
                lexer.line,
            );
        }
        lexer.pos = end;
    }

    fn parse_bracket(
        &mut self,
        node: NodeId,
        bracket: Bracket,
        lexer: &mut Lexer<'_>,
        base: Option<usize>,
        plain: &mut String,
    ) {
        let Some(end) = bracket_markup_end(lexer, bracket, base) else {
            let line = lexer.current_line().trim().to_string();
            self.tree
                .push_error(node, ErrorKind::InvalidInlineMarkup, Some(line), lexer.line);
            plain.push(char::from(bracket.open()));
            lexer.pos += 1;
            return;
        };
        lexer.pos += 1;

        let end_of_text = end - 1;
        let mut marked = String::new();
        let mut url: Option<String> = None;
        while lexer.pos < end_of_text {
            marked.push_str(&lexer.take_escapes());
            if lexer.pos >= end_of_text {
                break;
            }
            let Some(c) = lexer.char_at(lexer.pos) else {
                break;
            };
            if c == '\n' {
                lexer.pos += 1;
                lexer.line += 1;
                if lexer.pos < end_of_text {
                    lexer.skip_comments(base);
                }
                marked.push(' ');
                continue;
            }
            if url.is_none() && lexer.byte_at(lexer.pos) == Some(Bracket::LABEL_SEPARATOR) {
                lexer.pos += 1;
                url = Some(std::mem::take(&mut marked));
                continue;
            }
            if url.is_some() && bracket == Bracket::Link {
                let nested_end = Markup::ReservedInline
                    .match_at(lexer.input(), lexer.pos)
                    .or_else(|| {
                        Font::opening_at(lexer.input(), lexer.pos)
                            .map(|font| lexer.pos + font.delimiter().len())
                    });
                if let Some(nested_end) = nested_end {
                    let line = lexer.current_line().trim().to_string();
                    self.tree.push_error(
                        node,
                        ErrorKind::ReservedNestedInline,
                        Some(line),
                        lexer.line,
                    );
                    marked.push_str(&lexer.input()[lexer.pos..nested_end]);
                    lexer.pos = nested_end;
                    continue;
                }
            }
            marked.push(c);
            lexer.pos += c.len_utf8();
        }

        let (url, label) = match url {
            Some(url) => (url, Some(marked)),
            None => (marked, None),
        };
        self.tree.push_text(node, std::mem::take(plain), lexer.line);
        let bracket_node = self.tree.push(node, bracket.kind(), lexer.line);
        let url_node = self.tree.push(bracket_node, bracket.url_kind(), lexer.line);
        self.tree.set_text(url_node, url.trim());
        if let Some(label) = label.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            let label_node = self.tree.push(bracket_node, bracket.label_kind(), lexer.line);
            self.tree.set_text(label_node, label);
        }
        if lexer.pos != end_of_text {
            self.tree.push_error(
                node,
                ErrorKind::Internal,
                Some(format!(
                    "link or image text ended at {} instead of {}",
                    lexer.pos, end_of_text
                )),
                lexer.line,
            );
        }
        lexer.pos = end;
    }
}
