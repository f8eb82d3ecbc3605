use std::cmp::Ordering;

use form_enhancer::{Collator, Page, Row, SortDirection, SortState, Table, sort_table, toggle_sort};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseError, TestCaseResult};

const SORT_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/sort_property_fuzz_test.txt";
const DEFAULT_SORT_PROPTEST_CASES: u32 = 128;

fn sort_proptest_cases() -> u32 {
    std::env::var("FORM_ENHANCER_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SORT_PROPTEST_CASES)
}

fn collator() -> Collator {
    Collator::default().with_numeric(true)
}

fn cell_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        3 => vec(
            prop_oneof![
                Just('a'),
                Just('B'),
                Just('c'),
                Just('é'),
                Just('Z'),
                Just('0'),
                Just('7'),
                Just('9'),
                Just(' '),
                Just('-'),
                Just('_'),
            ],
            0..=6,
        )
        .prop_map(|chars| chars.into_iter().collect()),
        1 => any::<u32>().prop_map(|value| value.to_string()),
    ]
    .boxed()
}

fn table_strategy() -> BoxedStrategy<Table> {
    vec(vec(cell_strategy(), 0..=3), 0..=12)
        .prop_map(|rows| Table::from_rows(rows.into_iter().map(Row::new)))
        .boxed()
}

fn column_strategy() -> BoxedStrategy<usize> {
    (0usize..3).boxed()
}

fn assert_ordered(table: &Table, column: usize, direction: SortDirection) -> TestCaseResult {
    let collator = collator();
    let keys = table.column(column);
    for pair in keys.windows(2) {
        let ordering = collator.compare(pair[0], pair[1]);
        let ok = match direction {
            SortDirection::Ascending => ordering != Ordering::Greater,
            SortDirection::Descending => ordering != Ordering::Less,
        };
        prop_assert!(ok, "{:?} out of order in {direction:?}: {keys:?}", pair);
    }
    Ok(())
}

fn sorted_multiset(table: &Table) -> Vec<Vec<String>> {
    let mut rows = table
        .rows()
        .iter()
        .map(|row| row.cells().to_vec())
        .collect::<Vec<_>>();
    rows.sort();
    rows
}

fn page_html(rows: &[[String; 3]]) -> String {
    let body = rows
        .iter()
        .map(|cells| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                cells[0], cells[1], cells[2]
            )
        })
        .collect::<String>();
    format!(
        "<table id='t'><thead><tr>\
         <th id='h0' class='sortable'>A</th>\
         <th id='h1' class='sortable'>B</th>\
         <th id='h2' class='sortable'>C</th>\
         </tr></thead><tbody>{body}</tbody></table>"
    )
}

fn page_rows_strategy() -> BoxedStrategy<Vec<[String; 3]>> {
    vec(
        (cell_strategy(), cell_strategy(), cell_strategy()).prop_map(|(a, b, c)| [a, b, c]),
        1..=8,
    )
    .boxed()
}

fn run_page_clicks(rows: &[[String; 3]], clicks: &[usize]) -> TestCaseResult {
    let mut page = Page::from_html(&page_html(rows))
        .map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
    let mut expected = SortState::new();

    for column in clicks {
        page.click(&format!("#h{column}"))
            .map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
        let direction = expected.toggle(*column);

        let markers = page
            .count("th.sort-asc, th.sort-desc")
            .map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
        prop_assert_eq!(markers, 1, "clicks={:?}", clicks);

        let marker = page
            .sort_marker(&format!("#h{column}"))
            .map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
        prop_assert_eq!(marker, Some(direction));

        let texts = page
            .column_texts("#t", *column)
            .map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
        let table = Table::from_rows(texts.iter().map(|text| Row::new([text.as_str()])));
        assert_ordered(&table, 0, direction)?;
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: sort_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(SORT_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn sorted_table_is_an_ordered_permutation(
        table in table_strategy(),
        column in column_strategy(),
        descending in any::<bool>(),
    ) {
        let direction = if descending { SortDirection::Descending } else { SortDirection::Ascending };
        let mut sorted = table.clone();
        sort_table(&mut sorted, column, direction, &collator());

        prop_assert_eq!(sorted.len(), table.len());
        prop_assert_eq!(sorted_multiset(&sorted), sorted_multiset(&table));
        assert_ordered(&sorted, column, direction)?;
    }

    #[test]
    fn sorting_twice_is_idempotent(
        table in table_strategy(),
        column in column_strategy(),
        descending in any::<bool>(),
    ) {
        let direction = if descending { SortDirection::Descending } else { SortDirection::Ascending };
        let mut once = table.clone();
        sort_table(&mut once, column, direction, &collator());
        let mut twice = once.clone();
        sort_table(&mut twice, column, direction, &collator());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn descending_reverses_ascending_for_distinct_keys(
        values in vec(any::<u32>(), 0..=16),
    ) {
        let mut values = values;
        values.sort_unstable();
        values.dedup();
        let table = Table::from_rows(values.iter().rev().map(|value| Row::new([value.to_string()])));

        let mut ascending = table.clone();
        sort_table(&mut ascending, 0, SortDirection::Ascending, &collator());
        let mut descending = table;
        sort_table(&mut descending, 0, SortDirection::Descending, &collator());

        let mut reversed = descending.column(0);
        reversed.reverse();
        prop_assert_eq!(ascending.column(0), reversed);

        let expected = values.iter().map(u32::to_string).collect::<Vec<_>>();
        prop_assert_eq!(ascending.column(0), expected);
    }

    #[test]
    fn toggle_sort_keeps_one_active_column(
        table in table_strategy(),
        clicks in vec(column_strategy(), 1..=10),
    ) {
        let mut table = table;
        let mut state = SortState::new();
        for column in &clicks {
            let previous = state.direction(*column);
            state = toggle_sort(&mut table, &state, *column, &collator());
            let direction = SortDirection::after_click(previous);
            prop_assert_eq!(state.active(), Some((*column, direction)));
            assert_ordered(&table, *column, direction)?;
        }
    }

    #[test]
    fn collator_is_antisymmetric(left in cell_strategy(), right in cell_strategy()) {
        let collator = collator();
        prop_assert_eq!(
            collator.compare(&left, &right),
            collator.compare(&right, &left).reverse()
        );
    }

    #[test]
    fn page_header_clicks_keep_a_single_marker(
        rows in page_rows_strategy(),
        clicks in vec(0usize..3, 1..=12),
    ) {
        run_page_clicks(&rows, &clicks)?;
    }
}
