//! # SPLDOC Core
//!
//! Parser for SPLDOC, the line-oriented markup used in the documentation
//! comments of SPL toolkits.
//!
//! Parsing produces a [`SyntaxTree`] of pages, sections, paragraphs, lists,
//! code blocks, tables and inline markup. The `@tag` annotations that follow
//! the narrative text are extracted separately by [`parse_annotations`].
//!
//! ## Quick Start
//!
//! ```rust
//! use spldoc_core::{parse, NodeKind};
//!
//! let tree = parse("Adds a **bold** word.", 0);
//! let para = tree.children(tree.root())[0];
//! assert_eq!(tree.kind(para), NodeKind::Paragraph);
//! assert_eq!(tree.text_content(para), "Adds a bold word.");
//! ```
//!
//! ## Error Recovery
//!
//! Malformed markup never fails a parse. It is echoed as text, prefixed by an
//! error marker, next to an `Error` node naming the problem:
//!
//! ```rust
//! use spldoc_core::{parse, ErrorKind};
//!
//! let tree = parse("Reserved [[ here", 0);
//! let diagnostics = tree.diagnostics();
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics.iter().next().unwrap().kind, ErrorKind::ReservedInline);
//! ```
//!
//! ## Annotations
//!
//! ```rust
//! use spldoc_core::parse_annotations;
//!
//! let annotations = parse_annotations("@param x the input\n@return the output");
//! assert_eq!(annotations[0].target.as_deref(), Some("x"));
//! assert_eq!(annotations[1].description.as_deref(), Some("the output"));
//! ```

pub mod annotation;
pub mod ast;
pub mod error;
mod inline;
mod lexer;
mod markup;
pub mod parser;
mod summary;
mod table;

pub use annotation::Annotation;
pub use ast::{
    HorizontalAlignment, NodeId, NodeKind, Payload, SyntaxNode, SyntaxTree, TableEntry,
    VerticalAlignment,
};
pub use error::{Diagnostic, Diagnostics, ErrorKind, Severity};
pub use parser::{
    first_sentence, has_description, parse, parse_annotations, ParseOptions, Parser,
    DEFAULT_ERROR_MARKER,
};
