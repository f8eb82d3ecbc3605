use crate::Result;
use crate::dom::{Dom, NodeId};

pub(crate) const AUTO_DISMISS_SELECTOR: &str = ".alert:not(.alert-permanent)";
pub(crate) const CLOSE_BUTTON_SELECTOR: &str = ".btn-close";
pub(crate) const FADE_MS: i64 = 150;

pub(crate) fn auto_dismiss_candidates(dom: &Dom) -> Result<Vec<NodeId>> {
    dom.query_selector_all(AUTO_DISMISS_SELECTOR)
}

/// Starts the fade of a still attached alert. Returns false when the alert
/// is already gone.
pub(crate) fn start_fade(dom: &mut Dom, alert: NodeId) -> Result<bool> {
    if !dom.is_connected(alert) {
        return Ok(false);
    }
    dom.class_remove(alert, "show")?;
    Ok(true)
}

/// Alert closed by a click on `target`, if `target` is inside a close button.
pub(crate) fn close_target(dom: &Dom, target: NodeId) -> Result<Option<NodeId>> {
    let Some(button) = dom.closest(target, CLOSE_BUTTON_SELECTOR)? else {
        return Ok(None);
    };
    dom.closest(button, ".alert")
}
