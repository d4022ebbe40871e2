//! Integration tests for annotation extraction

use pretty_assertions::assert_eq;
use spldoc_core::{parse, parse_annotations, Annotation, ErrorKind, Parser};

#[test]
fn test_param_and_return() {
    let annotations = parse_annotations("@param x the input\n@return the output");
    assert_eq!(
        annotations,
        vec![
            Annotation {
                name: "param".into(),
                target: Some("x".into()),
                description: Some("the input".into()),
                line: 0,
                error: None,
            },
            Annotation {
                name: "return".into(),
                target: None,
                description: Some("the output".into()),
                line: 1,
                error: None,
            },
        ]
    );
}

#[test]
fn test_tag_without_description() {
    let annotations = parse_annotations("@foo");
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].name, "foo");
    assert_eq!(annotations[0].target, None);
    assert_eq!(annotations[0].description, None);
    assert!(!annotations[0].has_error());
}

#[test]
fn test_multi_line_description_keeps_relative_indent() {
    let input = "  @return a list:\n    * one\n  * two\n";
    let annotations = parse_annotations(input);
    assert_eq!(
        annotations[0].description.as_deref(),
        Some("a list:\n  * one\n* two")
    );
}

#[test]
fn test_indented_comment_keeps_annotations() {
    let input = "    Text here.\n    @param x the input\n      spans lines\n";
    let annotations = parse_annotations(input);
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].name, "param");
    assert_eq!(annotations[0].target.as_deref(), Some("x"));
    assert_eq!(
        annotations[0].description.as_deref(),
        Some("the input\n  spans lines")
    );
    assert_eq!(annotations[0].line, 1);

    let tree = parse(input, 0);
    assert_eq!(tree.text_content(tree.root()).trim(), "Text here.");
}

#[test]
fn test_missing_tag_name() {
    let annotations = parse_annotations("@ lost\nignored\n@return ok");
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[0].error, Some(ErrorKind::NoTagName));
    assert_eq!(annotations[0].description, None);
    assert_eq!(annotations[1].name, "return");
    assert!(!annotations[1].has_error());
}

#[test]
fn test_missing_target() {
    let annotations = parse_annotations("@throws\n@param");
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[0].error, Some(ErrorKind::NoTarget));
    assert_eq!(annotations[1].error, Some(ErrorKind::NoTarget));
    assert_eq!(annotations[1].line, 1);
}

#[test]
fn test_start_line_offsets_annotations() {
    let annotations = Parser::new()
        .with_start_line(20)
        .parse_annotations("Text.\n@param a b");
    assert_eq!(annotations[0].line, 21);
}

#[test]
fn test_no_annotations() {
    assert!(parse_annotations("Only narrative.\n").is_empty());
    assert!(parse_annotations("").is_empty());
}
