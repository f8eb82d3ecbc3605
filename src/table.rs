//! Typed table model and the column sorter.
//!
//! Sorting never needs a DOM: rows are plain cell text, the active column is
//! an explicit [`SortState`], and [`sort_table`] reorders rows in place.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::collation::Collator;

pub(crate) const ASCENDING_MARKER: &str = "sort-asc";
pub(crate) const DESCENDING_MARKER: &str = "sort-desc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Direction applied by a click on a column whose current direction is
    /// `current`: only an ascending column flips to descending.
    pub fn after_click(current: Option<SortDirection>) -> SortDirection {
        match current {
            Some(SortDirection::Ascending) => SortDirection::Descending,
            Some(SortDirection::Descending) | None => SortDirection::Ascending,
        }
    }

    pub fn reversed(self) -> SortDirection {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn marker_class(self) -> &'static str {
        match self {
            SortDirection::Ascending => ASCENDING_MARKER,
            SortDirection::Descending => DESCENDING_MARKER,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Last applied direction per column of one table.
///
/// At most one column is active: [`SortState::set`] and
/// [`SortState::toggle`] clear every other column first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    columns: BTreeMap<usize, SortDirection>,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direction(&self, column: usize) -> Option<SortDirection> {
        self.columns.get(&column).copied()
    }

    pub fn active(&self) -> Option<(usize, SortDirection)> {
        self.columns
            .iter()
            .next()
            .map(|(column, direction)| (*column, *direction))
    }

    pub fn set(&mut self, column: usize, direction: SortDirection) {
        self.columns.clear();
        self.columns.insert(column, direction);
    }

    pub fn toggle(&mut self, column: usize) -> SortDirection {
        let direction = SortDirection::after_click(self.direction(column));
        self.set(column, direction);
        direction
    }

    pub fn clear(&mut self) {
        self.columns.clear();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn cell(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Trimmed cell text; a row without the column sorts as empty text.
    pub fn sort_key(&self, column: usize) -> &str {
        self.cell(column).map(str::trim).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, column: usize) -> Vec<&str> {
        self.rows.iter().map(|row| row.sort_key(column)).collect()
    }
}

/// Stable permutation that sorts `keys` in `direction`.
///
/// Each key is collated once up front rather than on every comparison.
pub(crate) fn sorted_order<S: AsRef<str>>(
    keys: &[S],
    direction: SortDirection,
    collator: &Collator,
) -> Vec<usize> {
    let sort_keys = keys
        .iter()
        .map(|key| collator.sort_key(key.as_ref()))
        .collect::<Vec<_>>();
    let mut order = (0..keys.len()).collect::<Vec<_>>();
    order.sort_by(|a, b| {
        direction.apply(collator.compare_sort_keys(&sort_keys[*a], &sort_keys[*b]))
    });
    order
}

/// Reorders `table` by the trimmed text of `column`.
///
/// The sort is stable, so rows with equal keys keep their relative order and
/// sorting twice in the same direction is idempotent.
pub fn sort_table(
    table: &mut Table,
    column: usize,
    direction: SortDirection,
    collator: &Collator,
) {
    let order = sorted_order(&table.column(column), direction, collator);
    let mut rows = std::mem::take(&mut table.rows)
        .into_iter()
        .map(Some)
        .collect::<Vec<_>>();
    table.rows = order
        .into_iter()
        .filter_map(|index| rows[index].take())
        .collect();
}

/// Applies a header click to `table`: the new direction follows
/// [`SortDirection::after_click`] and the returned state has `column` as its
/// only active column.
pub fn toggle_sort(
    table: &mut Table,
    state: &SortState,
    column: usize,
    collator: &Collator,
) -> SortState {
    let mut next = state.clone();
    let direction = next.toggle(column);
    sort_table(table, column, direction, collator);
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric() -> Collator {
        Collator::default().with_numeric(true)
    }

    fn names(values: &[&str]) -> Table {
        Table::from_rows(values.iter().map(|value| Row::new([*value])))
    }

    #[test]
    fn click_transitions_follow_the_toggle_rule() {
        assert_eq!(SortDirection::after_click(None), SortDirection::Ascending);
        assert_eq!(
            SortDirection::after_click(Some(SortDirection::Ascending)),
            SortDirection::Descending
        );
        assert_eq!(
            SortDirection::after_click(Some(SortDirection::Descending)),
            SortDirection::Ascending
        );
    }

    #[test]
    fn toggling_another_column_resets_the_previous_one() {
        let mut state = SortState::new();
        assert_eq!(state.toggle(0), SortDirection::Ascending);
        assert_eq!(state.toggle(0), SortDirection::Descending);
        assert_eq!(state.toggle(2), SortDirection::Ascending);
        assert_eq!(state.direction(0), None);
        assert_eq!(state.active(), Some((2, SortDirection::Ascending)));
        assert_eq!(state.toggle(0), SortDirection::Ascending);
    }

    #[test]
    fn names_sort_case_insensitively() {
        let mut table = names(&["Charlie", "alice", "Bob"]);
        sort_table(&mut table, 0, SortDirection::Ascending, &numeric());
        assert_eq!(table.column(0), vec!["alice", "Bob", "Charlie"]);
    }

    #[test]
    fn numeric_text_sorts_by_value() {
        let mut table = names(&["2", "10", "1"]);
        sort_table(&mut table, 0, SortDirection::Ascending, &numeric());
        assert_eq!(table.column(0), vec!["1", "2", "10"]);
        sort_table(&mut table, 0, SortDirection::Descending, &numeric());
        assert_eq!(table.column(0), vec!["10", "2", "1"]);
    }

    #[test]
    fn second_toggle_reverses_distinct_keys() {
        let mut table = names(&["pear", "apple", "fig", "kiwi"]);
        let state = toggle_sort(&mut table, &SortState::new(), 0, &numeric());
        let ascending = table.column(0).iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let state = toggle_sort(&mut table, &state, 0, &numeric());
        let mut descending = table.column(0).iter().map(|s| s.to_string()).collect::<Vec<_>>();
        descending.reverse();
        assert_eq!(ascending, descending);
        assert_eq!(state.active(), Some((0, SortDirection::Descending)));
    }

    #[test]
    fn forced_direction_is_idempotent() {
        let mut table = names(&["b", "a", "c", "a "]);
        sort_table(&mut table, 0, SortDirection::Ascending, &numeric());
        let once = table.clone();
        sort_table(&mut table, 0, SortDirection::Ascending, &numeric());
        assert_eq!(table, once);
    }

    #[test]
    fn equal_keys_keep_their_relative_order() {
        let mut table = Table::from_rows([
            Row::new(["1", "first"]),
            Row::new(["0", "zero"]),
            Row::new(["1", "second"]),
        ]);
        sort_table(&mut table, 0, SortDirection::Ascending, &numeric());
        assert_eq!(table.column(1), vec!["zero", "first", "second"]);
        sort_table(&mut table, 0, SortDirection::Descending, &numeric());
        assert_eq!(table.column(1), vec!["first", "second", "zero"]);
    }

    #[test]
    fn keys_are_trimmed_and_missing_cells_sort_first() {
        let mut table = Table::from_rows([
            Row::new(["x", "  b "]),
            Row::new(["y"]),
            Row::new(["z", "a"]),
        ]);
        sort_table(&mut table, 1, SortDirection::Ascending, &numeric());
        assert_eq!(table.column(0), vec!["y", "z", "x"]);
    }

    #[test]
    fn empty_table_is_a_no_op() {
        let mut table = Table::new();
        sort_table(&mut table, 3, SortDirection::Ascending, &numeric());
        assert!(table.is_empty());
    }

    #[test]
    fn sorted_order_agrees_with_pairwise_compare() {
        let collator = Collator::new("sv").with_numeric(true);
        let keys = ["Öl", "item 10", "item 9", "Zebra", "ål", "#tag", "apple", "Apple"];
        let mut expected = keys.to_vec();
        expected.sort_by(|a, b| collator.compare(a, b));
        let actual = sorted_order(&keys, SortDirection::Ascending, &collator)
            .into_iter()
            .map(|index| keys[index])
            .collect::<Vec<_>>();
        assert_eq!(actual, expected);
    }

    #[test]
    fn sorted_order_is_a_stable_permutation() {
        let keys = ["b", "a", "b", "a"];
        assert_eq!(
            sorted_order(&keys, SortDirection::Ascending, &numeric()),
            vec![1, 3, 0, 2]
        );
        assert_eq!(
            sorted_order(&keys, SortDirection::Descending, &numeric()),
            vec![0, 2, 1, 3]
        );
    }
}
