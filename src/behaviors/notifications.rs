use super::NotificationKind;
use crate::Result;
use crate::dom::{Dom, NodeId};

pub(crate) const CONTAINER_ID: &str = "notification-container";
pub(crate) const TOAST_CLASS: &str = "toast-notification";

/// Appends a toast to the notification container, creating the container at
/// the end of the body when the page has none.
pub(crate) fn show(dom: &mut Dom, message: &str, kind: NotificationKind) -> Result<NodeId> {
    let container = match dom.by_id(CONTAINER_ID) {
        Some(container) => container,
        None => {
            let parent = dom.body().unwrap_or(dom.root);
            dom.append_element(
                parent,
                "div",
                &[("id", CONTAINER_ID), ("class", "notification-container")],
            )?
        }
    };

    let class = format!("{TOAST_CLASS} alert alert-{} show", kind.as_str());
    let toast = dom.append_element(container, "div", &[("class", class.as_str()), ("role", "status")])?;
    if !message.is_empty() {
        dom.create_text(toast, message.to_string());
    }
    Ok(toast)
}
