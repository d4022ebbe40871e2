//! Table sub-parser.
//!
//! ```text
//! --- Optional title
//! |:--------|------:|      top border (or just `---`)
//! | Name    | Size  |      row content
//! |=========|=======|      column header boundary
//! | a       | 1     |
//! |---------|-------|      row boundary
//! | b       | 2     |
//! ---                      lower border
//! ```
//!
//! A [`TableParser`] is created by the block parser when a line starts a
//! table, consumes exactly one table and hands the cursor back. Entry text is
//! buffered per column and parsed as block content when the entry is closed.
//! Every problem is reported as an `Error` node next to the table, the
//! offending line is echoed as text and parsing goes on with the next line.

use crate::ast::{HorizontalAlignment, NodeId, NodeKind, TableEntry, VerticalAlignment};
use crate::error::ErrorKind;
use crate::lexer::{end_of_line_whitespace, indent_of, next_non_whitespace, Lexer};
use crate::markup::Markup;
use crate::parser::DocParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    TitleFetched,
    /// Top border was `---`; the first row defines the columns.
    DefiningColumns,
    FetchingRows,
    End,
}

/// Per-column state.
#[derive(Debug, Default)]
struct Column {
    /// Last horizontal alignment given for an entry starting here.
    h_align: HorizontalAlignment,
    /// Open entry covering this column.
    entry: Option<NodeId>,
    /// Buffered entry text; `None` until the first line of the entry.
    text: Option<String>,
    /// Line the buffered text starts on.
    line: usize,
}

#[derive(Debug, Default)]
struct RowState {
    new_row: bool,
    error: bool,
}

pub(crate) struct TableParser<'p, 'o> {
    parser: &'p mut DocParser<'o>,
    /// Node the table and its diagnostics are attached to.
    owner: NodeId,
    table: Option<NodeId>,
    phase: Phase,
    has_column_header: bool,
    group: Option<NodeId>,
    rows: Option<NodeId>,
    row: Option<NodeId>,
    row_state: RowState,
    columns: Vec<Column>,
    /// Column holding the entry being filled; lags behind `col` inside a
    /// column span.
    current: usize,
    /// Column position; `None` before the first column.
    col: Option<usize>,
}

impl<'p, 'o> TableParser<'p, 'o> {
    pub(crate) fn new(parser: &'p mut DocParser<'o>, owner: NodeId) -> Self {
        Self {
            parser,
            owner,
            table: None,
            phase: Phase::Start,
            has_column_header: false,
            group: None,
            rows: None,
            row: None,
            row_state: RowState::default(),
            columns: Vec::new(),
            current: 0,
            col: None,
        }
    }

    /// Consume one table, starting at the cursor's line.
    pub(crate) fn parse(mut self, lexer: &mut Lexer<'_>, base: usize) {
        let mut last_line = "";
        while !lexer.is_eof() {
            lexer.skip_comments(Some(base));
            if lexer.is_eof() {
                last_line = "";
                break;
            }
            let line = lexer.current_line();
            last_line = line;
            if Lexer::is_code_block_line(line, Some(base)) {
                break;
            }
            let line_start = lexer.pos;
            lexer.pos += indent_of(line);

            if Markup::TableTitle.matches(line) {
                self.parse_title(lexer);
            } else if Markup::TableStart.matches(line)
                && matches!(self.phase, Phase::Start | Phase::TitleFetched)
            {
                self.parse_start(lexer);
            } else if Markup::TableColumnHeaderBoundary.matches(line) {
                self.parse_column_header_boundary(lexer);
            } else if self.phase == Phase::FetchingRows
                && Markup::TableClosingBorder.matches(line)
                && !table_continues_after(lexer, base)
            {
                lexer.skip_line();
                self.close();
                return;
            } else if Markup::TableRowContentStart.matches(line) {
                self.parse_row_content(lexer);
            } else if Markup::TableEnd.matches(line) {
                self.parse_end(lexer);
                return;
            } else {
                lexer.pos = line_start;
                break;
            }
        }

        self.close();
        let marker = self.parser.marker();
        let tree = &mut self.parser.tree;
        tree.push_error(
            self.owner,
            ErrorKind::TableEnd,
            Some(last_line.trim().to_string()),
            lexer.line,
        );
        tree.push_text(self.owner, marker, lexer.line);
    }

    fn table(&mut self, line: usize) -> NodeId {
        match self.table {
            Some(table) => table,
            None => {
                let table = self.parser.tree.push(self.owner, NodeKind::Table, line);
                self.table = Some(table);
                table
            }
        }
    }

    fn has_row_header(&self) -> bool {
        self.table
            .is_some_and(|table| self.parser.tree[table].has_first_column_row_header())
    }

    fn set_row_header(&mut self) {
        if let Some(table) = self.table {
            self.parser.tree.set_row_header(table);
        }
    }

    // Error reporting.

    /// Report `kind` at the cursor, echo the rest of the line and skip it.
    fn error(&mut self, lexer: &mut Lexer<'_>, kind: ErrorKind) {
        let rest = lexer.current_line();
        let marker = self.parser.marker();
        let tree = &mut self.parser.tree;
        tree.push_text(self.owner, format!("{}{}", marker, rest), lexer.line);
        let mut report = rest.trim();
        if report.is_empty() {
            report = lexer.whole_line(lexer.pos).trim();
        }
        tree.push_error(self.owner, kind, Some(report.to_string()), lexer.line);
        lexer.advance_line(rest.len());
    }

    fn syntax_error(&mut self, lexer: &mut Lexer<'_>) {
        let kind = if end_of_line_whitespace(lexer.input(), lexer.pos) == lexer.pos {
            ErrorKind::TableEolSyntax
        } else {
            ErrorKind::TableSyntax
        };
        self.error(lexer, kind);
    }

    fn row_error(&mut self, lexer: &mut Lexer<'_>, kind: ErrorKind) {
        self.error(lexer, kind);
        self.row_state.error = true;
    }

    fn row_syntax_error(&mut self, lexer: &mut Lexer<'_>) {
        self.syntax_error(lexer);
        self.row_state.error = true;
    }

    // Rows, columns and entries.

    fn add_row(&mut self, line: usize) {
        if let Some(rows) = self.rows {
            self.row = Some(self.parser.tree.push(rows, NodeKind::TableRow, line));
        }
    }

    #[inline]
    fn next_index(&self) -> usize {
        self.col.map_or(0, |col| col + 1)
    }

    fn add_column(&mut self, line: usize) {
        self.columns.push(Column::default());
        self.current = self.columns.len() - 1;
        self.col = Some(self.next_index());
        self.add_col_entry(line);
    }

    /// Add a column covered by the current entry.
    fn add_column_with_span(&mut self) {
        self.columns.push(Column::default());
        self.extend_current_entry();
        self.col = Some(self.next_index());
    }

    fn extend_current_entry(&mut self) {
        if let Some(entry) = self.columns[self.current].entry {
            if let Some(layout) = self.parser.tree.entry_mut(entry) {
                layout.col_end += 1;
            }
        }
    }

    fn current_entry_end(&self) -> Option<usize> {
        let entry = self.columns.get(self.current)?.entry?;
        self.parser.tree[entry].table_entry().map(|layout| layout.col_end)
    }

    #[inline]
    fn reset_column(&mut self) {
        self.col = None;
    }

    /// Move to the next column; the entry being filled changes only when
    /// the column is past its span.
    fn next_column(&mut self) -> bool {
        let next = self.next_index();
        if next >= self.columns.len() {
            return false;
        }
        self.col = Some(next);
        if next == 0 || self.current_entry_end().map_or(true, |end| next > end) {
            self.current = next;
        }
        true
    }

    /// Move to the next column, extending the current entry over it.
    fn next_column_with_span(&mut self) -> bool {
        let next = self.next_index();
        if next >= self.columns.len() {
            return false;
        }
        self.col = Some(next);
        self.extend_current_entry();
        true
    }

    fn next_column_has_entry(&self) -> bool {
        self.columns
            .get(self.next_index())
            .is_some_and(|column| column.entry.is_some())
    }

    /// Move to the column after the current entry's span.
    fn next_col_entry(&mut self) -> bool {
        let next = match self.col {
            None => 0,
            Some(_) => self
                .current_entry_end()
                .map_or(0, |end| end + 1)
                .max(self.next_index()),
        };
        if next >= self.columns.len() {
            return false;
        }
        self.col = Some(next);
        self.current = next;
        true
    }

    fn add_col_entry(&mut self, line: usize) {
        let Some(row) = self.row else {
            return;
        };
        let col = self.col.unwrap_or(0);
        let tree = &mut self.parser.tree;
        let entry = tree.push(row, NodeKind::TableEntry, line);
        if let Some(layout) = tree.entry_mut(entry) {
            *layout = TableEntry::at_column(col);
        }
        let column = &mut self.columns[self.current];
        column.entry = Some(entry);
        column.text = None;
    }

    /// Close the entry of the current column, parsing its buffered text.
    fn end_col_entry(&mut self) {
        let Some(column) = self.col.and_then(|col| self.columns.get_mut(col)) else {
            return;
        };
        let line = column.line;
        if let (Some(entry), Some(text)) = (column.entry.take(), column.text.take()) {
            self.parser.parse_entry(entry, &text, line);
        }
    }

    /// Entries still open when a new row started span that row as well.
    fn add_row_spans(&mut self) {
        if !self.row_state.new_row {
            return;
        }
        self.reset_column();
        while self.next_col_entry() {
            let column = &self.columns[self.current];
            if let (Some(entry), Some(_)) = (column.entry, &column.text) {
                if let Some(layout) = self.parser.tree.entry_mut(entry) {
                    layout.more_rows += 1;
                }
            }
        }
    }

    /// `:` in a column boundary: top on the entry's first line, bottom on a
    /// later one, both for middle.
    fn set_row_align(&mut self) -> bool {
        let column = &self.columns[self.current];
        let Some(entry) = column.entry else {
            return false;
        };
        let started = column.text.is_some();
        let Some(layout) = self.parser.tree.entry_mut(entry) else {
            return false;
        };
        layout.v_align = match (started, layout.v_align) {
            (false, _) => VerticalAlignment::Top,
            (true, VerticalAlignment::Default) => VerticalAlignment::Bottom,
            (true, VerticalAlignment::Top) => VerticalAlignment::Middle,
            _ => return false,
        };
        true
    }

    /// `:` in a row boundary: left right after the boundary, right
    /// elsewhere, both for center.
    fn set_col_align(&mut self, lexer: &Lexer<'_>) -> bool {
        let after_boundary = lexer.pos > 0 && matches!(lexer.byte_at(lexer.pos - 1), Some(b'|' | b'+'));
        let Some(entry) = self.columns[self.current].entry else {
            return false;
        };
        let Some(layout) = self.parser.tree.entry_mut(entry) else {
            return false;
        };
        layout.h_align = match (after_boundary, layout.h_align) {
            (true, _) => HorizontalAlignment::Left,
            (false, HorizontalAlignment::Default) => HorizontalAlignment::Right,
            (false, HorizontalAlignment::Left) => HorizontalAlignment::Center,
            _ => return false,
        };
        true
    }

    /// Fill unspecified alignments: vertical from the entry to its left in
    /// the row, horizontal from the entry above starting in the same column.
    fn set_default_alignments(&mut self) {
        let Some(table) = self.table else {
            return;
        };
        let tree = &self.parser.tree;
        let rows: Vec<NodeId> = tree
            .children_of_kind(table, NodeKind::TableGroup)
            .flat_map(|group| tree.children_of_kind(group, NodeKind::TableRows))
            .flat_map(|rows| tree.children_of_kind(rows, NodeKind::TableRow))
            .collect();

        for row in rows {
            let entries = self.parser.tree.children(row).to_vec();
            let mut v_align = VerticalAlignment::Default;
            for entry in entries {
                let Some(layout) = self.parser.tree.entry_mut(entry) else {
                    continue;
                };
                if layout.v_align != VerticalAlignment::Default {
                    v_align = layout.v_align;
                } else {
                    layout.v_align = v_align;
                }
                let Some(column) = self.columns.get_mut(layout.col_start) else {
                    continue;
                };
                if layout.h_align != HorizontalAlignment::Default {
                    column.h_align = layout.h_align;
                } else {
                    layout.h_align = column.h_align;
                }
            }
        }
    }

    /// Close all open entries and settle alignments.
    fn close(&mut self) {
        self.reset_column();
        while self.next_column() {
            self.end_col_entry();
        }
        self.set_default_alignments();
        self.phase = Phase::End;
        if let Some(table) = self.table {
            tracing::trace!(
                columns = self.columns.len(),
                rows = self
                    .parser
                    .tree
                    .descendants(table)
                    .filter(|&id| self.parser.tree.kind(id) == NodeKind::TableRow)
                    .count(),
                "table closed"
            );
        }
    }

    // Line parsers.

    /// `--- title`, only before the top border.
    fn parse_title(&mut self, lexer: &mut Lexer<'_>) {
        if self.phase != Phase::Start {
            self.syntax_error(lexer);
            return;
        }
        lexer.pos += 3;
        let table = self.table(lexer.line);
        self.parser.parse_title(table, lexer, None);
        self.phase = Phase::TitleFetched;
    }

    /// Top border: `---`, or `|---|---|` declaring the columns with their
    /// spans, alignments and an optional row header column.
    fn parse_start(&mut self, lexer: &mut Lexer<'_>) {
        let line = lexer.line;
        let table = self.table(line);
        let tree = &mut self.parser.tree;
        let group = tree.push(table, NodeKind::TableGroup, line);
        self.group = Some(group);
        self.rows = Some(tree.push(group, NodeKind::TableRows, line));
        self.add_row(line);
        self.add_column(line);

        let start = lexer.pos;
        let end = end_of_line_whitespace(lexer.input(), start);
        let mut col_start = start;
        let defining = lexer.byte_at(start) == Some(b'|');
        while lexer.pos < end {
            match lexer.byte_at(lexer.pos) {
                Some(b'-') => {}
                _ if !defining => {
                    self.syntax_error(lexer);
                    break;
                }
                Some(b'|') => {
                    if lexer.pos > start && lexer.pos < end - 1 {
                        if lexer.pos < col_start + 4 {
                            self.error(lexer, ErrorKind::TableShortRowBoundary);
                            break;
                        }
                        if lexer.byte_at(lexer.pos + 1) == Some(b'|') {
                            self.add_column_with_span();
                        } else {
                            col_start = lexer.pos;
                            self.add_column(line);
                        }
                    }
                }
                Some(b'+') => {
                    if lexer.pos < col_start + 4 {
                        self.error(lexer, ErrorKind::TableShortRowBoundary);
                        break;
                    }
                    if self.columns.len() > 1 {
                        self.syntax_error(lexer);
                        break;
                    }
                    col_start = lexer.pos;
                    self.add_column(line);
                    self.set_row_header();
                }
                Some(b':') => {
                    if !self.set_col_align(lexer) {
                        self.syntax_error(lexer);
                        break;
                    }
                }
                _ => {
                    self.syntax_error(lexer);
                    break;
                }
            }
            lexer.pos += 1;
            if lexer.pos == end {
                if defining {
                    if lexer.byte_at(end - 1) != Some(b'|') {
                        self.syntax_error(lexer);
                        break;
                    }
                    if lexer.pos - 1 < col_start + 4 {
                        lexer.pos -= 1;
                        self.error(lexer, ErrorKind::TableShortRowBoundary);
                        break;
                    }
                }
                lexer.skip_line();
                break;
            }
        }
        self.phase = if defining {
            Phase::FetchingRows
        } else {
            Phase::DefiningColumns
        };
    }

    /// `|===|===|`: rows so far become the column header, a body row group
    /// starts.
    fn parse_column_header_boundary(&mut self, lexer: &mut Lexer<'_>) {
        if self.phase != Phase::FetchingRows || self.has_column_header {
            self.syntax_error(lexer);
            return;
        }
        if let Some(rows) = self.rows {
            self.parser.tree.set_column_header(rows);
        }
        self.reset_column();
        while self.next_column() {
            self.end_col_entry();
        }
        if let Some(group) = self.group {
            self.rows = Some(self.parser.tree.push(group, NodeKind::TableRows, lexer.line));
        }
        self.add_row(lexer.line);
        self.reset_column();
        self.next_column();
        self.add_col_entry(lexer.line);

        let mut col_start = lexer.pos;
        let end = end_of_line_whitespace(lexer.input(), lexer.pos);
        self.row_state = RowState::default();
        self.parse_col_boundary(lexer, false);
        if self.row_state.error {
            return;
        }
        while lexer.pos < end {
            if lexer.pos == end - 1 {
                self.parse_col_boundary(lexer, false);
                if !self.row_state.error {
                    lexer.skip_line();
                }
                break;
            }
            match lexer.byte_at(lexer.pos) {
                Some(b'=') => lexer.pos += 1,
                Some(b':') => {
                    if !self.set_col_align(lexer) {
                        self.syntax_error(lexer);
                        break;
                    }
                    lexer.pos += 1;
                }
                Some(boundary @ (b'+' | b'|')) => {
                    if lexer.pos < col_start + 4 {
                        self.error(lexer, ErrorKind::TableShortRowBoundary);
                        break;
                    }
                    if boundary == b'|' && lexer.byte_at(lexer.pos + 1) == Some(b'|') {
                        if !self.next_column_with_span() {
                            self.row_error(lexer, ErrorKind::TableTooManyColumns);
                            break;
                        }
                    } else {
                        if !self.next_column() {
                            self.row_error(lexer, ErrorKind::TableTooManyColumns);
                            break;
                        }
                        col_start = lexer.pos;
                        self.add_col_entry(lexer.line);
                    }
                    self.parse_col_boundary(lexer, false);
                    if self.row_state.error {
                        break;
                    }
                }
                _ => {
                    self.syntax_error(lexer);
                    break;
                }
            }
        }
        while self.next_column() {
            self.add_col_entry(lexer.line);
        }
        self.has_column_header = true;
    }

    /// `---` lower border.
    fn parse_end(&mut self, lexer: &mut Lexer<'_>) {
        let end = end_of_line_whitespace(lexer.input(), lexer.pos);
        while lexer.pos < end {
            if lexer.byte_at(lexer.pos) != Some(b'-') {
                self.syntax_error(lexer);
                break;
            }
            lexer.pos += 1;
            if lexer.pos == end {
                lexer.skip_line();
                break;
            }
        }
        self.close();
    }

    /// The boundary character opening a column: `|`, `+` ending the row
    /// header column, or `:` (vertical alignment) before an entry.
    fn parse_col_boundary(&mut self, lexer: &mut Lexer<'_>, before_entry: bool) {
        match lexer.byte_at(lexer.pos) {
            Some(b'+') => {
                if self.col != Some(1) {
                    self.row_syntax_error(lexer);
                    return;
                }
                if self.phase == Phase::DefiningColumns {
                    self.set_row_header();
                } else if !self.has_row_header() {
                    self.row_error(lexer, ErrorKind::TableMixedColumnBoundary);
                    return;
                }
            }
            Some(b'|') => {
                if self.col == Some(1) && self.has_row_header() {
                    self.row_error(lexer, ErrorKind::TableMixedColumnBoundary);
                    return;
                }
            }
            Some(b':') if before_entry => {
                if !self.set_row_align() {
                    self.row_syntax_error(lexer);
                    return;
                }
            }
            _ => {
                self.row_syntax_error(lexer);
                return;
            }
        }
        lexer.pos += 1;
    }

    /// One line of entry text, up to the next column boundary.
    fn parse_entry(&mut self, lexer: &mut Lexer<'_>) {
        if self.phase == Phase::DefiningColumns {
            if self.col.is_none() {
                self.next_column();
            } else {
                self.add_column(lexer.line);
            }
        } else if !self.next_col_entry() {
            self.row_error(lexer, ErrorKind::TableTooManyColumns);
            return;
        }
        self.parse_col_boundary(lexer, true);
        if self.row_state.error {
            return;
        }
        // Whitespace after the boundary.
        lexer.pos += 1;

        let line = lexer.line;
        let column = &mut self.columns[self.current];
        if let Some(text) = column.text.as_mut() {
            if !text.is_empty() {
                text.push('\n');
            }
        } else {
            column.text = Some(String::new());
            column.line = line;
        }

        let input = lexer.input();
        let end = end_of_line_whitespace(input, lexer.pos);
        let mut text = String::new();
        let mut terminated = false;
        while lexer.pos < end {
            if lexer.byte_at(lexer.pos) == Some(b'\\') {
                if let Some(escaped) = lexer.char_at(lexer.pos + 1).filter(|&c| c != '\n') {
                    // Kept escaped; unescaped when the entry is parsed.
                    text.push('\\');
                    text.push(escaped);
                    lexer.pos += 1 + escaped.len_utf8();
                    continue;
                }
            }
            if Markup::TableEntryEnd.match_at(input, lexer.pos).is_some() {
                lexer.pos = next_non_whitespace(input, lexer.pos).unwrap_or(end);
                terminated = true;
                break;
            }
            match lexer.char_at(lexer.pos) {
                Some(c) => {
                    text.push(c);
                    lexer.pos += c.len_utf8();
                }
                None => break,
            }
        }
        if let Some(buffer) = &mut self.columns[self.current].text {
            buffer.push_str(&text);
        }
        if !terminated {
            self.row_syntax_error(lexer);
        }
    }

    /// `|---|---|` inside row content: closes entries and starts a new row,
    /// redeclaring spans and alignments.
    fn parse_row_boundary(&mut self, lexer: &mut Lexer<'_>) {
        if self.phase != Phase::FetchingRows {
            self.row_error(lexer, ErrorKind::TableNoColsRowBoundary);
            return;
        }
        if !self.next_col_entry() {
            self.row_error(lexer, ErrorKind::TableTooManyColumns);
            return;
        }
        if !self.row_state.new_row {
            self.add_row(lexer.line);
            self.row_state.new_row = true;
        }
        let mut col_start = lexer.pos;
        let end = end_of_line_whitespace(lexer.input(), lexer.pos);
        self.end_col_entry();
        self.add_col_entry(lexer.line);
        self.parse_col_boundary(lexer, false);
        if self.row_state.error {
            return;
        }

        while lexer.pos < end {
            let input = lexer.input();
            if Markup::TableRowContentEnd.match_at(input, lexer.pos).is_some() {
                if lexer.pos < col_start + 4 {
                    self.row_error(lexer, ErrorKind::TableShortRowBoundary);
                    return;
                }
                while self.next_column() {
                    self.end_col_entry();
                    self.add_col_entry(lexer.line);
                }
                return;
            }
            if Markup::TableEntryStart.match_at(input, lexer.pos).is_some() {
                if lexer.pos < col_start + 4 {
                    self.row_error(lexer, ErrorKind::TableShortRowBoundary);
                    return;
                }
                while !self.next_column_has_entry() {
                    if !self.next_column() {
                        self.row_error(lexer, ErrorKind::TableTooManyColumns);
                        return;
                    }
                    self.add_col_entry(lexer.line);
                }
                return;
            }
            match lexer.byte_at(lexer.pos) {
                Some(b'-') => lexer.pos += 1,
                Some(b':') => {
                    if !self.set_col_align(lexer) {
                        self.row_syntax_error(lexer);
                        return;
                    }
                    lexer.pos += 1;
                }
                Some(boundary @ (b'+' | b'|')) => {
                    if lexer.pos < col_start + 4 {
                        self.row_error(lexer, ErrorKind::TableShortRowBoundary);
                        return;
                    }
                    if boundary == b'|' && lexer.byte_at(lexer.pos + 1) == Some(b'|') {
                        if !self.next_column_with_span() {
                            self.row_error(lexer, ErrorKind::TableTooManyColumns);
                            return;
                        }
                        self.end_col_entry();
                    } else {
                        if !self.next_column() {
                            self.row_error(lexer, ErrorKind::TableTooManyColumns);
                            return;
                        }
                        col_start = lexer.pos;
                        self.end_col_entry();
                        self.add_col_entry(lexer.line);
                    }
                    self.parse_col_boundary(lexer, false);
                    if self.row_state.error {
                        return;
                    }
                }
                _ => {
                    self.row_syntax_error(lexer);
                    return;
                }
            }
        }
        self.row_syntax_error(lexer);
    }

    /// A line of row content: entries and row boundaries.
    fn parse_row_content(&mut self, lexer: &mut Lexer<'_>) {
        if !matches!(self.phase, Phase::DefiningColumns | Phase::FetchingRows) {
            self.syntax_error(lexer);
            return;
        }
        self.row_state = RowState::default();
        self.reset_column();
        let end = end_of_line_whitespace(lexer.input(), lexer.pos);
        while !lexer.is_eof() {
            let input = lexer.input();
            if lexer.pos >= end {
                self.row_syntax_error(lexer);
            } else if Markup::TableRowContentEnd.match_at(input, lexer.pos).is_some() {
                if self.next_col_entry() {
                    lexer.pos = end;
                    self.row_error(lexer, ErrorKind::TableTooFewColumns);
                } else {
                    lexer.skip_line();
                    self.add_row_spans();
                    break;
                }
            } else if Markup::TableEntryStart.match_at(input, lexer.pos).is_some() {
                self.parse_entry(lexer);
            } else if Markup::TableRowBoundary.match_at(input, lexer.pos).is_some() {
                self.parse_row_boundary(lexer);
            } else {
                self.row_syntax_error(lexer);
            }
            if self.row_state.error {
                break;
            }
        }
        if self.phase == Phase::DefiningColumns {
            self.phase = Phase::FetchingRows;
        }
    }
}

/// Whether the line after the cursor's line is still table markup.
fn table_continues_after(lexer: &Lexer<'_>, base: usize) -> bool {
    let mut probe = lexer.clone();
    probe.skip_line();
    probe.skip_comments(Some(base));
    if probe.is_eof() {
        return false;
    }
    let line = probe.current_line();
    !Lexer::is_code_block_line(line, Some(base))
        && (Markup::TableRowContentStart.matches(line)
            || Markup::TableEnd.matches(line)
            || Markup::TableColumnHeaderBoundary.matches(line))
}
