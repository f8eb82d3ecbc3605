use std::borrow::Cow;
use std::collections::HashSet;

use super::Download;
use crate::Result;
use crate::dom::{Dom, NodeId};

pub(crate) const EXPORT_TRIGGER_SELECTOR: &str = "[data-export-csv]";
pub(crate) const DEFAULT_FILENAME: &str = "export.csv";
pub(crate) const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8";

/// Builds the download requested by an export trigger. A selector that does
/// not resolve to a table produces nothing.
pub(crate) fn export_from_trigger(dom: &Dom, trigger: NodeId) -> Result<Option<Download>> {
    let Some(selector) = dom.attr(trigger, "data-export-csv") else {
        return Ok(None);
    };
    let Ok(Some(table)) = dom.query_selector(&selector) else {
        return Ok(None);
    };
    if !dom.is_tag(table, "table") {
        return Ok(None);
    }

    let filename = dom
        .attr(trigger, "data-filename")
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
    Ok(Some(Download {
        filename,
        mime_type: CSV_MIME_TYPE.to_string(),
        contents: table_to_csv(dom, table),
    }))
}

pub(crate) fn table_to_csv(dom: &Dom, table: NodeId) -> String {
    let skipped = skipped_columns(dom, table);
    let mut out = String::new();
    for row in table_rows(dom, table) {
        let fields = dom
            .row_cells(row)
            .into_iter()
            .enumerate()
            .filter(|(column, _)| !skipped.contains(column))
            .map(|(_, cell)| escape_field(&collapse_whitespace(&dom.text_content(cell))).into_owned())
            .collect::<Vec<_>>();
        out.push_str(&fields.join(","));
        out.push_str("\r\n");
    }
    out
}

fn table_rows(dom: &Dom, table: NodeId) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    dom.collect_elements_descendants_dfs(table, &mut nodes);
    nodes.retain(|node| {
        dom.is_tag(*node, "tr") && dom.find_ancestor_by_tag(*node, "table") == Some(table)
    });
    nodes
}

fn skipped_columns(dom: &Dom, table: NodeId) -> HashSet<usize> {
    table_rows(dom, table)
        .into_iter()
        .flat_map(|row| dom.row_cells(row))
        .filter(|cell| dom.attr(*cell, "data-export").as_deref() == Some("false"))
        .map(|cell| dom.header_column_index(cell))
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_html;

    #[test]
    fn fields_are_quoted_only_when_needed() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn table_export_covers_head_body_and_foot() -> Result<()> {
        let dom = parse_html(
            "<table id='t'>\
               <thead><tr><th>Name</th><th data-export='false'>Actions</th><th>Score</th></tr></thead>\
               <tbody><tr><td> Smith,  Jo </td><td><button>x</button></td><td>10</td></tr></tbody>\
               <tfoot><tr><td>Total</td><td></td><td>10</td></tr></tfoot>\
             </table>",
        )?;
        let table = dom.by_id("t").ok_or_else(|| crate::Error::SelectorNotFound("#t".into()))?;
        assert_eq!(
            table_to_csv(&dom, table),
            "Name,Score\r\n\"Smith, Jo\",10\r\nTotal,10\r\n"
        );
        Ok(())
    }
}
