use crate::Result;
use crate::dom::{Dom, NodeId};

pub(crate) const COPY_TRIGGER_SELECTOR: &str = "[data-copy-target]";
pub(crate) const COPIED_LABEL: &str = "Copied!";
const ORIGINAL_LABEL_ATTR: &str = "data-original-label";

/// Copies the text of the trigger's target and swaps the trigger label.
///
/// Returns `None` when the target selector is unusable or matches nothing.
pub(crate) fn copy_from_trigger(dom: &mut Dom, trigger: NodeId) -> Result<Option<String>> {
    let Some(selector) = dom.attr(trigger, "data-copy-target") else {
        return Ok(None);
    };
    let Ok(Some(target)) = dom.query_selector(&selector) else {
        return Ok(None);
    };

    let text = if is_form_control(dom, target) {
        dom.value(target)?
    } else {
        dom.text_content(target).trim().to_string()
    };

    if dom.attr(trigger, ORIGINAL_LABEL_ATTR).is_none() {
        let label = dom.text_content(trigger);
        dom.set_attr(trigger, ORIGINAL_LABEL_ATTR, &label)?;
    }
    dom.set_text_content(trigger, COPIED_LABEL)?;
    Ok(Some(text))
}

pub(crate) fn restore_label(dom: &mut Dom, trigger: NodeId) -> Result<()> {
    if let Some(label) = dom.attr(trigger, ORIGINAL_LABEL_ATTR) {
        dom.set_text_content(trigger, &label)?;
        dom.remove_attr(trigger, ORIGINAL_LABEL_ATTR)?;
    }
    Ok(())
}

fn is_form_control(dom: &Dom, node: NodeId) -> bool {
    dom.is_tag(node, "input") || dom.is_tag(node, "textarea") || dom.is_tag(node, "select")
}
