//! Property-based robustness tests
//!
//! Arbitrary markup soup must always parse into a well-formed tree, and
//! plain narrative must come back out unchanged.

use proptest::prelude::*;
use spldoc_core::{first_sentence, has_description, parse, parse_annotations, NodeKind, SyntaxTree};

fn count(tree: &SyntaxTree, kind: NodeKind) -> usize {
    tree.descendants(tree.root())
        .filter(|&id| tree.kind(id) == kind)
        .count()
}

/// Lines built from the characters that drive SPLDOC markup.
fn markup_soup_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("---".to_string()),
            Just("|---|---|".to_string()),
            Just("|===|".to_string()),
            Just("| a | b |".to_string()),
            Just("# Title".to_string()),
            Just("* item".to_string()),
            Just("1. step".to_string()),
            Just("@param x desc".to_string()),
            Just("    code".to_string()),
            "[ a-z0-9*`{}|+#!@=:.\\[\\]\\\\-]{0,24}",
        ],
        0..16,
    )
    .prop_map(|lines| lines.join("\n"))
}

/// Lines of lowercase words separated by single spaces.
fn plain_words_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec("[a-z]{1,8}", 1..8), 1..6)
}

/// Whether `inner` borrows from `outer`.
fn is_subslice(outer: &str, inner: &str) -> bool {
    let outer_range = outer.as_bytes().as_ptr_range();
    let inner_range = inner.as_bytes().as_ptr_range();
    outer_range.start <= inner_range.start && inner_range.end <= outer_range.end
}

fn assert_well_formed(tree: &SyntaxTree) {
    let root = tree.root();
    assert_eq!(tree.kind(root), NodeKind::Root);
    assert_eq!(tree.parent(root), None);
    assert_eq!(tree.descendants(root).count(), tree.len());
    for id in tree.descendants(root).skip(1) {
        let parent = tree.parent(id).expect("non-root node without parent");
        assert!(tree.children(parent).contains(&id));
        for &child in tree.children(id) {
            assert_eq!(tree.parent(child), Some(id));
        }
    }
}

proptest! {
    #[test]
    fn test_parse_never_panics(input in markup_soup_strategy()) {
        let tree = parse(&input, 0);
        assert_well_formed(&tree);
    }

    #[test]
    fn test_no_internal_errors(input in markup_soup_strategy()) {
        let tree = parse(&input, 0);
        prop_assert!(!tree.diagnostics().has_internal(), "{}", tree.dump());
    }

    #[test]
    fn test_arbitrary_text_never_panics(input in "\\PC{0,200}") {
        let tree = parse(&input, 0);
        assert_well_formed(&tree);
        let _ = parse_annotations(&input);
        let _ = has_description(&input);
        prop_assert!(is_subslice(&input, first_sentence(&input)));
    }

    #[test]
    fn test_scans_never_panic(input in markup_soup_strategy()) {
        let lines = input.lines().count().max(1);
        for annotation in parse_annotations(&input) {
            prop_assert!(annotation.line < lines);
        }
        let _ = has_description(&input);
        prop_assert!(is_subslice(&input, first_sentence(&input)));
    }

    #[test]
    fn test_plain_words_round_trip(lines in plain_words_strategy()) {
        let input = lines
            .iter()
            .map(|words| words.join(" "))
            .collect::<Vec<_>>()
            .join("\n");
        let tree = parse(&input, 0);
        prop_assert!(!tree.has_errors());
        prop_assert_eq!(tree.children(tree.root()).len(), 1);
        let expected = lines.concat().join(" ");
        prop_assert_eq!(tree.text_content(tree.root()), expected);
        prop_assert!(has_description(&input));
        prop_assert_eq!(first_sentence(&input), input.as_str());
    }
}

// ============================================================================
// Nesting Limit Tests
// ============================================================================

#[test]
fn test_deep_list_nesting_becomes_text() {
    let input: String = (0..3000).map(|i| format!("{}* x\n", " ".repeat(i))).collect();
    let tree = parse(&input, 0);
    assert_well_formed(&tree);
    assert_eq!(count(&tree, NodeKind::UnorderedList), 64);
    assert!(!tree.diagnostics().has_internal());
}

#[test]
fn test_deep_page_nesting_becomes_text() {
    let input: String = (1..=1000).map(|i| format!("{} t\n", "+".repeat(i))).collect();
    let tree = parse(&input, 0);
    assert_well_formed(&tree);
    assert_eq!(count(&tree, NodeKind::NewPage), 64);
}

#[test]
fn test_deep_font_nesting_terminates() {
    let input = format!("{}{}", "**a ".repeat(5000), "b**".repeat(5000));
    let tree = parse(&input, 0);
    assert_well_formed(&tree);
    assert!(!tree.diagnostics().has_internal());
}
