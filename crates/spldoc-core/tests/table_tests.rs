//! Integration tests for SPLDOC tables

use pretty_assertions::assert_eq;
use spldoc_core::{
    parse, ErrorKind, HorizontalAlignment, NodeId, NodeKind, SyntaxTree, TableEntry,
    VerticalAlignment,
};

fn find(tree: &SyntaxTree, kind: NodeKind) -> Vec<NodeId> {
    tree.descendants(tree.root())
        .filter(|&id| tree.kind(id) == kind)
        .collect()
}

fn error_kinds(tree: &SyntaxTree) -> Vec<ErrorKind> {
    tree.diagnostics().iter().map(|d| d.kind).collect()
}

fn entries(tree: &SyntaxTree) -> Vec<(String, TableEntry)> {
    find(tree, NodeKind::TableEntry)
        .into_iter()
        .map(|id| {
            let layout = tree[id].table_entry().copied().unwrap_or_default();
            (tree.text_content(id), layout)
        })
        .collect()
}

// ============================================================================
// Structure Tests
// ============================================================================

#[test]
fn test_header_and_body_rows() {
    let tree = parse(
        "|---|---|\n| A | B |\n|===|===|\n| 1 | 2 |\n|---|---|",
        0,
    );
    let expected = "\
Root
  Paragraph
    Table
      TableGroup
        TableRows [column header]
          TableRow
            TableEntry [cols 0..0, more_rows 0, Default, Default]
              Paragraph
                Text \"A\"
            TableEntry [cols 1..1, more_rows 0, Default, Default]
              Paragraph
                Text \"B\"
        TableRows
          TableRow
            TableEntry [cols 0..0, more_rows 0, Default, Default]
              Paragraph
                Text \"1\"
            TableEntry [cols 1..1, more_rows 0, Default, Default]
              Paragraph
                Text \"2\"
";
    assert_eq!(tree.dump(), expected);
    assert!(!tree.has_errors());
}

#[test]
fn test_title_and_dash_borders() {
    let tree = parse("--- Sizes\n|---|\n| a |\n---\n", 0);
    assert!(!tree.has_errors());
    let table = find(&tree, NodeKind::Table)[0];
    let title = tree.children_of_kind(table, NodeKind::Title).next().unwrap();
    assert_eq!(tree.text_content(title), "Sizes");
    assert_eq!(entries(&tree).len(), 1);
    assert_eq!(entries(&tree)[0].0, "a");
}

#[test]
fn test_columns_defined_by_first_row() {
    let tree = parse("---\n| a | b | c |\n---\nAfter", 0);
    assert!(!tree.has_errors());
    let texts: Vec<String> = entries(&tree).into_iter().map(|(text, _)| text).collect();
    assert_eq!(texts, vec!["a", "b", "c"]);
    let root_paragraph = tree.children(tree.root())[0];
    assert_eq!(tree.text_content(root_paragraph).trim_end(), "abcAfter");
}

#[test]
fn test_entry_lines_continue_until_row_boundary() {
    let tree = parse("|---|---|\n| a | b |\n| c | d |\n|---|---|\n| e | f |\n---", 0);
    assert!(!tree.has_errors());
    let texts: Vec<String> = entries(&tree).into_iter().map(|(text, _)| text).collect();
    assert_eq!(texts, vec!["a c", "b d", "e", "f"]);
    assert_eq!(find(&tree, NodeKind::TableRow).len(), 2);
}

#[test]
fn test_entry_text_is_parsed_as_markup() {
    let tree = parse("|---|\n| **x** \\| y |\n---", 0);
    assert!(!tree.has_errors());
    assert_eq!(find(&tree, NodeKind::Bold).len(), 1);
    assert_eq!(entries(&tree)[0].0, "x | y");
}

#[test]
fn test_row_header_column() {
    let tree = parse("|---+---|\n| h + x |\n---", 0);
    assert!(!tree.has_errors());
    let table = find(&tree, NodeKind::Table)[0];
    assert!(tree[table].has_first_column_row_header());
}

#[test]
fn test_column_span() {
    let tree = parse("|---||---|\n| wide | x |\n---", 0);
    assert!(!tree.has_errors());
    let entries = entries(&tree);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0, "wide");
    assert_eq!((entries[0].1.col_start, entries[0].1.col_end), (0, 1));
    assert_eq!(entries[0].1.col_span(), 2);
    assert_eq!((entries[1].1.col_start, entries[1].1.col_end), (2, 2));
}

#[test]
fn test_row_span() {
    let tree = parse("|---|---|\n| a | b |\n|---| c |\n---", 0);
    assert!(!tree.has_errors());
    let entries = entries(&tree);
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1].0, "b c");
    assert_eq!(entries[1].1.row_span(), 2);
    assert_eq!(entries[0].1.row_span(), 1);
}

// ============================================================================
// Alignment Tests
// ============================================================================

#[test]
fn test_horizontal_alignment_fills_down_columns() {
    let tree = parse("|:--|--:|\n| a | b |\n|---|---|\n| c | d |\n---", 0);
    assert!(!tree.has_errors());
    let aligns: Vec<HorizontalAlignment> = entries(&tree)
        .into_iter()
        .map(|(_, layout)| layout.h_align)
        .collect();
    assert_eq!(
        aligns,
        vec![
            HorizontalAlignment::Left,
            HorizontalAlignment::Right,
            HorizontalAlignment::Left,
            HorizontalAlignment::Right
        ]
    );
}

#[test]
fn test_center_alignment() {
    let tree = parse("|:-:|\n| a |\n---", 0);
    assert!(!tree.has_errors());
    assert_eq!(entries(&tree)[0].1.h_align, HorizontalAlignment::Center);
}

#[test]
fn test_vertical_alignment_fills_along_row() {
    let tree = parse("|---|---|\n: a | b |\n---", 0);
    assert!(!tree.has_errors());
    let aligns: Vec<VerticalAlignment> = entries(&tree)
        .into_iter()
        .map(|(_, layout)| layout.v_align)
        .collect();
    assert_eq!(aligns, vec![VerticalAlignment::Top, VerticalAlignment::Top]);
}

#[test]
fn test_vertical_alignment_on_later_line_is_bottom() {
    let tree = parse("|---|\n| a |\n: b |\n---", 0);
    assert!(!tree.has_errors());
    let entries = entries(&tree);
    assert_eq!(entries[0].0, "a b");
    assert_eq!(entries[0].1.v_align, VerticalAlignment::Bottom);
}

#[test]
fn test_vertical_alignment_on_both_lines_is_middle() {
    let tree = parse("|---|\n: a |\n: b |\n---", 0);
    assert!(!tree.has_errors());
    assert_eq!(entries(&tree)[0].1.v_align, VerticalAlignment::Middle);
}

#[test]
fn test_third_vertical_marker_is_a_syntax_error() {
    let tree = parse("|---|\n: a |\n: b |\n: c |\n---", 0);
    assert_eq!(error_kinds(&tree), vec![ErrorKind::TableSyntax]);
    let entries = entries(&tree);
    assert_eq!(entries[0].0, "a b");
    assert_eq!(entries[0].1.v_align, VerticalAlignment::Middle);
}

// ============================================================================
// Error Recovery Tests
// ============================================================================

#[test]
fn test_short_row_boundary() {
    let tree = parse(
        "|---|---|\n| a | b |\n|---|--|\n| c | d |\n---\n\nAfter.",
        0,
    );
    assert_eq!(error_kinds(&tree), vec![ErrorKind::TableShortRowBoundary]);
    let paragraphs: Vec<NodeId> = tree
        .children_of_kind(tree.root(), NodeKind::Paragraph)
        .collect();
    assert_eq!(tree.text_content(*paragraphs.last().unwrap()), "After.");
}

#[test]
fn test_too_few_columns() {
    let tree = parse("|---|---|\n| a |\n---", 0);
    let diagnostics = tree.diagnostics();
    assert_eq!(error_kinds(&tree), vec![ErrorKind::TableTooFewColumns]);
    assert_eq!(diagnostics.iter().next().unwrap().text.as_deref(), Some("| a |"));
    assert_eq!(diagnostics.iter().next().unwrap().line, 1);
}

#[test]
fn test_too_many_columns() {
    let tree = parse("|---|\n| a | b |\n---", 0);
    assert_eq!(error_kinds(&tree), vec![ErrorKind::TableTooManyColumns]);
    assert_eq!(entries(&tree)[0].0, "a");
}

#[test]
fn test_mixed_column_boundary() {
    let tree = parse("|---+---|\n| h | x |\n---", 0);
    assert_eq!(error_kinds(&tree), vec![ErrorKind::TableMixedColumnBoundary]);
}

#[test]
fn test_row_boundary_before_columns() {
    let tree = parse("---\n|---|\n---", 0);
    assert_eq!(error_kinds(&tree), vec![ErrorKind::TableNoColsRowBoundary]);
}

#[test]
fn test_second_title_is_a_syntax_error() {
    let tree = parse("--- One\n--- Two\n|---|\n| a |\n---", 0);
    assert_eq!(error_kinds(&tree), vec![ErrorKind::TableSyntax]);
    assert_eq!(entries(&tree)[0].0, "a");
}

#[test]
fn test_unterminated_table() {
    let tree = parse("|---|\n| a |\n\nAfter", 0);
    assert_eq!(error_kinds(&tree), vec![ErrorKind::TableEnd]);
    assert_eq!(entries(&tree)[0].0, "a");
    let paragraphs: Vec<NodeId> = tree
        .children_of_kind(tree.root(), NodeKind::Paragraph)
        .collect();
    assert_eq!(paragraphs.len(), 2);
    assert_eq!(tree.text_content(paragraphs[1]), "After");
}

#[test]
fn test_unclosed_top_border_is_an_end_of_line_error() {
    let tree = parse("|----\n| a |\n---", 0);
    let diagnostics = tree.diagnostics();
    assert_eq!(error_kinds(&tree), vec![ErrorKind::TableEolSyntax]);
    assert_eq!(diagnostics.iter().next().unwrap().text.as_deref(), Some("|----"));
    assert_eq!(entries(&tree)[0].0, "a");
}

#[test]
fn test_annotation_markup_in_entry_is_text() {
    let tree = parse("|---|\n| @x y |\n---", 0);
    assert!(!tree.has_errors());
    assert_eq!(entries(&tree)[0].0, "@x y");
}

#[test]
fn test_tables_in_entries_are_text() {
    let tree = parse("|---|\n| --- x |\n---", 0);
    assert_eq!(find(&tree, NodeKind::Table).len(), 1);
    assert_eq!(entries(&tree)[0].0, "--- x");
}
