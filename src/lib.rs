//! Deterministic page behaviors for web form front-ends.
//!
//! An HTML document is parsed into an in-memory DOM and driven through
//! [`Page`]: clicking a `th.sortable` header sorts its table, submitting a
//! `form.needs-validation` marks controls valid or invalid, and so on. The
//! sorting core is also available without a DOM through [`Table`],
//! [`SortState`] and [`sort_table`].

use std::error::Error as StdError;
use std::fmt;

mod behaviors;
mod collation;
mod dom;
mod html;
mod page;
mod pattern;
mod selector;
mod table;
mod table_sorter;

pub use behaviors::{Download, NotificationKind, Submission};
pub use collation::{CaseFirst, Collator, Sensitivity};
pub use page::{Page, PendingTimer};
pub use table::{Row, SortDirection, SortState, Table, sort_table, toggle_sort};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    UnsupportedSelector(String),
    SelectorNotFound(String),
    InvalidPattern {
        pattern: String,
        message: String,
    },
    Runtime(String),
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::InvalidPattern { pattern, message } => {
                write!(f, "invalid pattern attribute {pattern:?}: {message}")
            }
            Self::Runtime(msg) => write!(f, "runtime error: {msg}"),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}
