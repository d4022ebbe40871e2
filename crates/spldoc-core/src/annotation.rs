//! Annotation extractor.
//!
//! Annotations are the `@tag [target] description` lines that follow the
//! narrative text of a documentation comment:
//!
//! ```text
//! Computes the running average.
//! @param window number of tuples
//!   averaged over
//! @return the average
//! ```
//!
//! Extraction is a single pass independent of the block parser. A line
//! starting with `@` opens an annotation unless it is indented as code.

use crate::error::ErrorKind;
use crate::lexer::{next_non_whitespace, next_whitespace_or_end, Lexer};
use crate::markup::Markup;

/// Tags whose first token is a target.
const TAGS_WITH_TARGET: &[&str] = &["param", "throws"];

/// One `@tag [target] description` record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Annotation {
    /// Tag name without the `@`; empty when missing.
    pub name: String,
    pub target: Option<String>,
    /// Raw markup of the description, trailing whitespace removed.
    pub description: Option<String>,
    /// Line offset of the `@` line.
    pub line: usize,
    /// [`ErrorKind::NoTagName`] or [`ErrorKind::NoTarget`].
    pub error: Option<ErrorKind>,
}

impl Annotation {
    fn new(line: usize) -> Self {
        Self {
            line,
            ..Self::default()
        }
    }

    #[inline]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Whether this tag takes a target.
    pub fn takes_target(&self) -> bool {
        TAGS_WITH_TARGET.contains(&self.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    LookingForNextAnnotation,
    LookingForTarget,
    LookingForDescription,
    LookingForEndOfDescription,
}

struct Extractor {
    annotations: Vec<Annotation>,
    state: State,
    current: Option<Annotation>,
    description: String,
}

impl Extractor {
    fn close(&mut self) {
        let Some(mut annotation) = self.current.take() else {
            return;
        };
        match self.state {
            State::LookingForTarget => annotation.error = Some(ErrorKind::NoTarget),
            State::LookingForEndOfDescription => {
                let description = std::mem::take(&mut self.description);
                annotation.description = Some(description.trim_end().to_string());
            }
            _ => {}
        }
        self.annotations.push(annotation);
    }
}

/// Extract all annotations from the cursor on.
pub(crate) fn parse_annotations(lexer: &mut Lexer<'_>) -> Vec<Annotation> {
    let base = lexer.start_indent();
    let mut ex = Extractor {
        annotations: Vec::new(),
        state: State::Start,
        current: None,
        description: String::new(),
    };
    // Whether the cursor is at the start of a line.
    let mut line_start = true;

    while !lexer.is_eof() {
        let line = lexer.current_line();
        let mut next_line = true;

        if line_start
            && Markup::Annotation.matches(line)
            && !Lexer::is_code_block_line(line, Some(base))
        {
            ex.close();
            let mut annotation = Annotation::new(lexer.line);
            let start = Markup::Annotation.match_len(line).unwrap_or(0);
            let end = next_whitespace_or_end(line, start);
            if end <= start {
                annotation.error = Some(ErrorKind::NoTagName);
                ex.state = State::LookingForNextAnnotation;
            } else {
                annotation.name = line[start..end].to_string();
                ex.state = if annotation.takes_target() {
                    State::LookingForTarget
                } else {
                    State::LookingForDescription
                };
                lexer.pos += end;
                next_line = false;
            }
            ex.current = Some(annotation);
        } else {
            match ex.state {
                State::LookingForTarget => {
                    if let Some(start) = next_non_whitespace(line, 0) {
                        let end = next_whitespace_or_end(line, start);
                        if let Some(annotation) = &mut ex.current {
                            annotation.target = Some(line[start..end].to_string());
                        }
                        ex.state = State::LookingForDescription;
                        lexer.pos += end;
                        next_line = false;
                    }
                }
                State::LookingForDescription => {
                    if let Some(mut start) = next_non_whitespace(line, 0) {
                        if line_start {
                            start = start.min(base);
                        }
                        ex.description = line[start..].to_string();
                        ex.state = State::LookingForEndOfDescription;
                    }
                }
                State::LookingForEndOfDescription => {
                    let start = next_non_whitespace(line, 0).map_or(0, |start| start.min(base));
                    ex.description.push_str(&line[start..]);
                }
                State::Start | State::LookingForNextAnnotation => {}
            }
        }

        line_start = next_line;
        if next_line {
            lexer.advance_line(line.len());
        }
    }
    ex.close();
    tracing::trace!(count = ex.annotations.len(), "extracted annotations");
    ex.annotations
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(input: &str) -> Vec<Annotation> {
        parse_annotations(&mut Lexer::new(input, 0))
    }

    #[test]
    fn test_target_on_following_line() {
        let annotations = extract("@param\n  count how many\n");
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].target.as_deref(), Some("count"));
        assert_eq!(annotations[0].description.as_deref(), Some("how many"));
        assert!(!annotations[0].has_error());
    }

    #[test]
    fn test_narrative_before_annotations_is_ignored() {
        let annotations = extract("Some text.\n\n@return x\n");
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].name, "return");
        assert_eq!(annotations[0].line, 2);
    }

    #[test]
    fn test_code_indented_at_line_is_description() {
        let annotations = extract("@return\n    @code\n");
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].description.as_deref(), Some("    @code"));
    }
}
