use std::fmt;

use thiserror::Error;

/// Kinds of problems the parser reports.
///
/// Malformed markup never aborts parsing. Every kind except
/// [`ErrorKind::Internal`] describes a defect in the input; the parser
/// records it and carries on with the literal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ErrorKind {
    /// Parser bug: a consuming pass disagreed with its lookahead.
    #[error("internal parser error")]
    Internal,
    /// Link or image markup without a closing delimiter.
    #[error("link or image markup is not terminated")]
    InvalidInlineMarkup,
    /// Page, section or table marker without a title.
    #[error("title is missing")]
    NoTitle,
    /// Reserved inline sequence (`****`, ` `` `, `[[`, `{{`).
    #[error("reserved inline markup")]
    ReservedInline,
    /// Markup that may not appear nested where it was found.
    #[error("reserved nested inline markup")]
    ReservedNestedInline,
    /// Line starting with a reserved character.
    #[error("line starts with reserved markup")]
    ReservedNewline,
    /// Title starting with a reserved character.
    #[error("title starts with reserved markup")]
    ReservedTitle,
    /// Table ended without a lower border.
    #[error("table is not terminated")]
    TableEnd,
    /// Invalid character in a table line.
    #[error("table syntax error")]
    TableSyntax,
    /// Table line ended where more markup was required.
    #[error("table line ended unexpectedly")]
    TableEolSyntax,
    /// Row has fewer entries than the table has columns.
    #[error("table row has too few columns")]
    TableTooFewColumns,
    /// Row has more entries than the table has columns.
    #[error("table row has too many columns")]
    TableTooManyColumns,
    /// Row header (`+`) and plain (`|`) boundaries mixed in one column.
    #[error("row header and column boundaries are mixed")]
    TableMixedColumnBoundary,
    /// Row boundary before any columns are defined.
    #[error("row boundary appears before columns are defined")]
    TableNoColsRowBoundary,
    /// Boundary segment shorter than three characters.
    #[error("table boundary segment is too short")]
    TableShortRowBoundary,
    /// `@` without a tag name.
    #[error("annotation has no tag name")]
    NoTagName,
    /// `@param`/`@throws` without a target.
    #[error("annotation has no target")]
    NoTarget,
}

/// How serious a reported problem is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Severity {
    Warning,
    Error,
}

impl ErrorKind {
    /// Severity of this kind of problem.
    pub fn severity(self) -> Severity {
        match self {
            ErrorKind::InvalidInlineMarkup | ErrorKind::ReservedNestedInline => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Whether this kind signals a defect in the parser rather than the input.
    pub fn is_internal(self) -> bool {
        self == ErrorKind::Internal
    }

    /// Whether this kind comes from the table sub-parser.
    pub fn is_table(self) -> bool {
        matches!(
            self,
            ErrorKind::TableEnd
                | ErrorKind::TableSyntax
                | ErrorKind::TableEolSyntax
                | ErrorKind::TableTooFewColumns
                | ErrorKind::TableTooManyColumns
                | ErrorKind::TableMixedColumnBoundary
                | ErrorKind::TableNoColsRowBoundary
                | ErrorKind::TableShortRowBoundary
        )
    }
}

/// A problem found in the input, located by line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Diagnostic {
    /// Problem category.
    pub kind: ErrorKind,
    /// Line offset (relative to the caller's starting line).
    pub line: usize,
    /// The offending markup, when the parser kept it.
    pub text: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic.
    pub fn new(kind: ErrorKind, line: usize, text: Option<String>) -> Self {
        Self { kind, line, text }
    }

    /// Severity of the underlying kind.
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)?;
        if let Some(text) = &self.text {
            write!(f, ": {}", text)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

/// Diagnostics collected from a syntax tree, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Check if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of diagnostics.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate over the diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Iterate over the diagnostics of the given kind.
    pub fn of_kind(&self, kind: ErrorKind) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.kind == kind)
    }

    /// Check if any diagnostic has [`Severity::Error`].
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity() == Severity::Error)
    }

    /// Check if the parser reported a defect in itself.
    pub fn has_internal(&self) -> bool {
        self.items.iter().any(|d| d.kind.is_internal())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
