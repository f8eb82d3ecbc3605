use crate::Result;
use crate::dom::Dom;

pub(crate) const TOOLTIP_SELECTOR: &str = "[data-bs-toggle=tooltip]";
pub(crate) const POPOVER_SELECTOR: &str = "[data-bs-toggle=popover]";
const INITIALIZED_ATTR: &str = "data-initialized";
const ORIGINAL_TITLE_ATTR: &str = "data-bs-original-title";

/// Initializes tooltip and popover triggers that were not initialized yet.
/// Returns the number of newly initialized `(tooltips, popovers)`.
pub(crate) fn init_all(dom: &mut Dom) -> Result<(usize, usize)> {
    let tooltips = init_matching(dom, TOOLTIP_SELECTOR)?;
    let popovers = init_matching(dom, POPOVER_SELECTOR)?;
    Ok((tooltips, popovers))
}

pub(crate) fn initialized_count(dom: &Dom, selector: &str) -> Result<usize> {
    Ok(dom
        .query_selector_all(selector)?
        .into_iter()
        .filter(|node| dom.attr(*node, INITIALIZED_ATTR).is_some())
        .count())
}

fn init_matching(dom: &mut Dom, selector: &str) -> Result<usize> {
    let mut count = 0;
    for node in dom.query_selector_all(selector)? {
        if dom.attr(node, INITIALIZED_ATTR).is_some() {
            continue;
        }
        // the native title would show a second tooltip
        if let Some(title) = dom.attr(node, "title") {
            dom.set_attr(node, ORIGINAL_TITLE_ATTR, &title)?;
            dom.remove_attr(node, "title")?;
        }
        dom.set_attr(node, INITIALIZED_ATTR, "true")?;
        count += 1;
    }
    Ok(count)
}
