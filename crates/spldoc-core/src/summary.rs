//! First-sentence and has-description scans.
//!
//! Both work on a copy of the cursor and never change the caller's state.

use crate::lexer::{next_non_whitespace, Lexer};
use crate::markup::{is_whitespace_byte, Markup};

/// First sentence from the cursor on, a leading page or section title
/// included.
///
/// The sentence ends after the first `.` that follows a non-whitespace
/// character and is itself followed by whitespace or the end of the line, or
/// before the first line that starts a new block.
pub(crate) fn first_sentence<'a>(lexer: &Lexer<'a>) -> &'a str {
    let mut probe = lexer.clone();
    let start = probe.pos;
    let base = probe.start_indent();
    let input = probe.input();

    let line = probe.current_line();
    if Markup::NewPage.matches(line) || Markup::Section.matches(line) {
        probe.skip_line();
        probe.skip_comments_and_blank_lines(Some(base));
    }

    let mut end = input.len();
    while !probe.is_eof() {
        probe.skip_comments(None);
        if probe.is_eof() {
            break;
        }
        let line = probe.current_line();
        if starts_block(line, base) {
            end = probe.pos;
            break;
        }
        if let Some(dot) = sentence_end(line) {
            end = probe.pos + dot + 1;
            break;
        }
        probe.skip_line();
    }
    &input[start..end.max(start)]
}

/// Whether there is narrative text before any annotation.
pub(crate) fn has_description(lexer: &Lexer<'_>) -> bool {
    let input = lexer.input();
    next_non_whitespace(input, lexer.pos).is_some()
        && Markup::Annotation.match_at(input, lexer.pos).is_none()
}

fn starts_block(line: &str, base: usize) -> bool {
    Markup::Paragraph.matches(line)
        || Lexer::is_code_block_line(line, Some(base))
        || Markup::NewPage.matches(line)
        || Markup::Section.matches(line)
        || Markup::OrderedListItem.matches(line)
        || Markup::UnorderedListItem.matches(line)
        || Markup::TableTitle.matches(line)
        || Markup::TableStart.matches(line)
        || Markup::Annotation.matches(line)
        || Markup::ReservedNewline.matches(line)
}

/// Offset of the first full stop on `line` that ends a sentence.
fn sentence_end(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    memchr::memchr_iter(b'.', bytes).find(|&dot| {
        dot > 0
            && !is_whitespace_byte(bytes[dot - 1])
            && bytes.get(dot + 1).map_or(true, |&b| is_whitespace_byte(b))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Adds two ports. Then more.", "Adds two ports.")]
    #[case("Version 1.2 is here. Next.", "Version 1.2 is here.")]
    #[case("No period here\nstill going\n\nNew para.", "No period here\nstill going\n")]
    #[case("# Usage\nCall it. Twice.", "# Usage\nCall it.")]
    #[case("! hidden\nShown text.\n", "Shown text.")]
    #[case("Ends at list\n* item.\n", "Ends at list\n")]
    #[case("Trailing", "Trailing")]
    #[case("", "")]
    fn test_first_sentence(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(first_sentence(&Lexer::new(input, 0)), expected);
    }

    #[test]
    fn test_first_sentence_leaves_cursor() {
        let lexer = Lexer::new("One. Two.", 3);
        first_sentence(&lexer);
        assert_eq!(lexer.pos, 0);
        assert_eq!(lexer.line, 3);
    }

    #[rstest]
    #[case("Text\n@param x y", true)]
    #[case("\n! comment\n  @return z", false)]
    #[case("  \n\n", false)]
    #[case("", false)]
    fn test_has_description(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(has_description(&Lexer::new(input, 0)), expected);
    }
}
