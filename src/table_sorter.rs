use crate::collation::Collator;
use crate::dom::{Dom, NodeId};
use crate::table::{ASCENDING_MARKER, DESCENDING_MARKER, SortDirection, sorted_order};
use crate::Result;

pub(crate) const SORTABLE_HEADER_SELECTOR: &str = "th.sortable";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SortOutcome {
    pub(crate) table: NodeId,
    pub(crate) column: usize,
    pub(crate) direction: SortDirection,
    pub(crate) rows: usize,
}

impl Dom {
    /// Sorts the body rows of the table owning `header`.
    ///
    /// `forced` skips the click toggle and applies that direction as is.
    /// Returns `None` without touching the DOM when the header has no table,
    /// the table has no body, or the body has no rows.
    pub(crate) fn sort_by_header(
        &mut self,
        header: NodeId,
        forced: Option<SortDirection>,
        collator: &Collator,
    ) -> Result<Option<SortOutcome>> {
        let Some(table) = self.find_ancestor_by_tag(header, "table") else {
            return Ok(None);
        };
        let Some(body) = self.table_body(table) else {
            return Ok(None);
        };
        let rows = self.body_rows(body);
        if rows.is_empty() {
            return Ok(None);
        }

        let column = self.header_column_index(header);
        let headers = self.sortable_headers(table)?;
        // only the clicked header's own marker decides the next direction
        let direction =
            forced.unwrap_or_else(|| SortDirection::after_click(self.header_marker(header)));
        self.apply_markers(&headers, header, direction)?;

        let keys = rows
            .iter()
            .map(|row| self.cell_text(*row, column))
            .collect::<Vec<_>>();
        for index in sorted_order(&keys, direction, collator) {
            self.append_child(body, rows[index])?;
        }

        Ok(Some(SortOutcome {
            table,
            column,
            direction,
            rows: rows.len(),
        }))
    }

    pub(crate) fn sortable_headers(&self, table: NodeId) -> Result<Vec<NodeId>> {
        let mut headers = self.query_selector_all_from(table, SORTABLE_HEADER_SELECTOR)?;
        headers.retain(|header| self.find_ancestor_by_tag(*header, "table") == Some(table));
        Ok(headers)
    }

    pub(crate) fn header_marker(&self, header: NodeId) -> Option<SortDirection> {
        if self.class_contains(header, ASCENDING_MARKER) {
            Some(SortDirection::Ascending)
        } else if self.class_contains(header, DESCENDING_MARKER) {
            Some(SortDirection::Descending)
        } else {
            None
        }
    }

    fn apply_markers(
        &mut self,
        headers: &[NodeId],
        active: NodeId,
        direction: SortDirection,
    ) -> Result<()> {
        for header in headers {
            self.class_remove(*header, ASCENDING_MARKER)?;
            self.class_remove(*header, DESCENDING_MARKER)?;
        }
        self.class_add(active, direction.marker_class())
    }

    pub(crate) fn header_column_index(&self, header: NodeId) -> usize {
        let mut index = 0;
        let mut cursor = self.previous_element_sibling(header);
        while let Some(sibling) = cursor {
            if self.is_cell(sibling) {
                index += 1;
            }
            cursor = self.previous_element_sibling(sibling);
        }
        index
    }

    pub(crate) fn table_body(&self, table: NodeId) -> Option<NodeId> {
        self.element_children(table)
            .into_iter()
            .find(|child| self.is_tag(*child, "tbody"))
    }

    pub(crate) fn body_rows(&self, body: NodeId) -> Vec<NodeId> {
        self.element_children(body)
            .into_iter()
            .filter(|child| self.is_tag(*child, "tr"))
            .collect()
    }

    pub(crate) fn row_cells(&self, row: NodeId) -> Vec<NodeId> {
        self.element_children(row)
            .into_iter()
            .filter(|child| self.is_cell(*child))
            .collect()
    }

    fn cell_text(&self, row: NodeId, column: usize) -> String {
        self.row_cells(row)
            .get(column)
            .map(|cell| self.text_content(*cell).trim().to_string())
            .unwrap_or_default()
    }

    fn is_cell(&self, node: NodeId) -> bool {
        self.is_tag(node, "td") || self.is_tag(node, "th")
    }
}
