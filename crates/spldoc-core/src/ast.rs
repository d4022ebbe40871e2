//! Syntax tree types for SPLDOC markup.
//!
//! The tree is an arena: nodes live in one `Vec` and refer to each other by
//! [`NodeId`]. Parent links are plain indices, so the tree has no reference
//! cycles and can be shared read-only once the parser hands it out.
//!
//! ```rust
//! use spldoc_core::{parse, NodeKind};
//!
//! let tree = parse("Some **bold** text.", 0);
//! let bold = tree.descendants(tree.root())
//!     .find(|&id| tree[id].kind() == NodeKind::Bold)
//!     .unwrap();
//! assert_eq!(tree.text_content(bold), "bold");
//! ```

use std::fmt;
use std::ops::Index;

use crate::error::{Diagnostic, Diagnostics, ErrorKind};

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NodeId(u32);

impl NodeId {
    /// The root node of every tree.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NodeKind {
    Root,
    NewPage,
    Section,
    Title,
    Paragraph,
    Text,
    CodeBlock,
    OrderedList,
    OrderedListItem,
    UnorderedList,
    UnorderedListItem,
    Bold,
    Italics,
    Monospace,
    Link,
    LinkUrl,
    LinkLabel,
    Image,
    ImageUrl,
    ImageLabel,
    Table,
    TableGroup,
    TableRows,
    TableRow,
    TableEntry,
    Error,
}

impl NodeKind {
    /// Ordered or unordered list.
    #[inline]
    pub fn is_list(self) -> bool {
        matches!(self, NodeKind::OrderedList | NodeKind::UnorderedList)
    }

    /// Item of an ordered or unordered list.
    #[inline]
    pub fn is_list_item(self) -> bool {
        matches!(self, NodeKind::OrderedListItem | NodeKind::UnorderedListItem)
    }

    /// Bold, italics or monospace.
    #[inline]
    pub fn is_font(self) -> bool {
        matches!(self, NodeKind::Bold | NodeKind::Italics | NodeKind::Monospace)
    }
}

/// Horizontal alignment of a table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum HorizontalAlignment {
    Left,
    Right,
    Center,
    #[default]
    Default,
}

/// Vertical alignment of a table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum VerticalAlignment {
    Top,
    Bottom,
    Middle,
    #[default]
    Default,
}

/// Layout of one table entry (cell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TableEntry {
    pub h_align: HorizontalAlignment,
    pub v_align: VerticalAlignment,
    /// Number of additional rows this entry spans.
    pub more_rows: u32,
    /// First column covered (zero based).
    pub col_start: usize,
    /// Last column covered (inclusive).
    pub col_end: usize,
}

impl TableEntry {
    pub(crate) fn at_column(col: usize) -> Self {
        Self {
            col_start: col,
            col_end: col,
            ..Self::default()
        }
    }

    /// Number of columns covered.
    #[inline]
    pub fn col_span(&self) -> usize {
        self.col_end - self.col_start + 1
    }

    /// Number of rows covered.
    #[inline]
    pub fn row_span(&self) -> usize {
        self.more_rows as usize + 1
    }
}

/// Kind-specific data attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Payload {
    #[default]
    None,
    Error(ErrorKind),
    Table { has_first_column_row_header: bool },
    TableRows { is_column_header: bool },
    TableEntry(TableEntry),
}

/// A node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SyntaxNode {
    kind: NodeKind,
    text: Option<String>,
    line: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    payload: Payload,
}

impl SyntaxNode {
    fn new(kind: NodeKind, line: usize) -> Self {
        let payload = match kind {
            NodeKind::Table => Payload::Table {
                has_first_column_row_header: false,
            },
            NodeKind::TableRows => Payload::TableRows {
                is_column_header: false,
            },
            NodeKind::TableEntry => Payload::TableEntry(TableEntry::default()),
            _ => Payload::None,
        };
        Self {
            kind,
            text: None,
            line,
            parent: None,
            children: Vec::new(),
            payload,
        }
    }

    #[inline(always)]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Text payload: literal text, code, URL, label, title summary or
    /// the offending markup of an error.
    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Source line offset the node was created at.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// No children and no text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.text.is_none()
    }

    /// Error kind of an `Error` node.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self.payload {
            Payload::Error(kind) => Some(kind),
            _ => None,
        }
    }

    /// Layout of a `TableEntry` node.
    pub fn table_entry(&self) -> Option<&TableEntry> {
        match &self.payload {
            Payload::TableEntry(entry) => Some(entry),
            _ => None,
        }
    }

    /// Whether a `Table` node's first column holds row headers.
    pub fn has_first_column_row_header(&self) -> bool {
        matches!(
            self.payload,
            Payload::Table {
                has_first_column_row_header: true
            }
        )
    }

    /// Whether a `TableRows` node is the column header.
    pub fn is_column_header(&self) -> bool {
        matches!(
            self.payload,
            Payload::TableRows {
                is_column_header: true
            }
        )
    }
}

/// Syntax tree produced by [`crate::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    pub(crate) fn new(line: usize) -> Self {
        Self {
            nodes: vec![SyntaxNode::new(NodeKind::Root, line)],
        }
    }

    #[inline(always)]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Look up a node.
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self[id].kind
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self[id].children
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self[id].parent
    }

    /// Children of the given kind, in order.
    pub fn children_of_kind(&self, id: NodeId, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
        self[id]
            .children
            .iter()
            .copied()
            .filter(move |&child| self[child].kind == kind)
    }

    /// Closest proper ancestor of the given kind.
    pub fn ancestor(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        let mut current = self[id].parent;
        while let Some(node) = current {
            if self[node].kind == kind {
                return Some(node);
            }
            current = self[node].parent;
        }
        None
    }

    /// Pre-order walk of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// Concatenated text of all `Text` nodes below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter(|&n| self[n].kind == NodeKind::Text)
            .filter_map(|n| self[n].text())
            .collect()
    }

    /// All `Error` nodes as diagnostics, in document order.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for id in self.descendants(self.root()) {
            let node = &self[id];
            if let Some(kind) = node.error_kind() {
                diagnostics.push(Diagnostic::new(kind, node.line, node.text.clone()));
            }
        }
        diagnostics
    }

    /// Check if the tree holds any `Error` node.
    pub fn has_errors(&self) -> bool {
        self.nodes.iter().any(|n| n.kind == NodeKind::Error)
    }

    /// Indented listing of the tree, one node per line.
    pub fn dump(&self) -> String {
        self.to_string()
    }

    // Construction. Only the parser builds trees.

    fn alloc(&mut self, kind: NodeKind, line: usize) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SyntaxNode::new(kind, line));
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self[child].parent.is_none());
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    pub(crate) fn push(&mut self, parent: NodeId, kind: NodeKind, line: usize) -> NodeId {
        let id = self.alloc(kind, line);
        self.attach(parent, id);
        id
    }

    /// Remove `id` if it is the most recently added node and has no
    /// children. Returns whether it was removed.
    pub(crate) fn discard(&mut self, id: NodeId) -> bool {
        if id.index() + 1 != self.nodes.len() || !self[id].children.is_empty() {
            return false;
        }
        if let Some(parent) = self[id].parent {
            self.nodes[parent.index()].children.retain(|&child| child != id);
        }
        self.nodes.pop();
        true
    }

    /// Append a `Text` child unless `text` is empty.
    pub(crate) fn push_text(&mut self, parent: NodeId, text: impl Into<String>, line: usize) {
        let text = text.into();
        if !text.is_empty() {
            let id = self.push(parent, NodeKind::Text, line);
            self.nodes[id.index()].text = Some(text);
        }
    }

    pub(crate) fn push_error(
        &mut self,
        parent: NodeId,
        kind: ErrorKind,
        text: Option<String>,
        line: usize,
    ) -> NodeId {
        let id = self.push(parent, NodeKind::Error, line);
        let node = &mut self.nodes[id.index()];
        node.payload = Payload::Error(kind);
        node.text = text;
        id
    }

    pub(crate) fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.nodes[id.index()].text = Some(text.into());
    }

    pub(crate) fn entry_mut(&mut self, id: NodeId) -> Option<&mut TableEntry> {
        match &mut self.nodes[id.index()].payload {
            Payload::TableEntry(entry) => Some(entry),
            _ => None,
        }
    }

    pub(crate) fn set_row_header(&mut self, table: NodeId) {
        if let Payload::Table {
            has_first_column_row_header,
        } = &mut self.nodes[table.index()].payload
        {
            *has_first_column_row_header = true;
        }
    }

    pub(crate) fn set_column_header(&mut self, rows: NodeId) {
        if let Payload::TableRows { is_column_header } = &mut self.nodes[rows.index()].payload {
            *is_column_header = true;
        }
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let node = &self[id];
        write!(f, "{:indent$}{:?}", "", node.kind, indent = depth * 2)?;
        if let Some(text) = &node.text {
            write!(f, " {:?}", text)?;
        }
        match &node.payload {
            Payload::None => {}
            Payload::Error(kind) => write!(f, " [{:?}]", kind)?,
            Payload::Table {
                has_first_column_row_header,
            } => {
                if *has_first_column_row_header {
                    write!(f, " [row header]")?;
                }
            }
            Payload::TableRows { is_column_header } => {
                if *is_column_header {
                    write!(f, " [column header]")?;
                }
            }
            Payload::TableEntry(entry) => write!(
                f,
                " [cols {}..{}, more_rows {}, {:?}, {:?}]",
                entry.col_start, entry.col_end, entry.more_rows, entry.h_align, entry.v_align
            )?,
        }
        writeln!(f)?;
        for &child in &node.children {
            self.write_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl Index<NodeId> for SyntaxTree {
    type Output = SyntaxNode;

    #[inline(always)]
    fn index(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }
}

impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(f, self.root(), 0)
    }
}

/// Pre-order iterator returned by [`SyntaxTree::descendants`].
pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
