use crate::Result;
use crate::dom::{Dom, NodeId};

pub(crate) const FADE_IN_CLASS: &str = "fade-in";
pub(crate) const VISIBLE_CLASS: &str = "visible";

/// Marks a `.fade-in` element visible the first time it enters the viewport.
pub(crate) fn reveal(dom: &mut Dom, node: NodeId) -> Result<bool> {
    if !dom.class_contains(node, FADE_IN_CLASS) || dom.class_contains(node, VISIBLE_CLASS) {
        return Ok(false);
    }
    dom.class_add(node, VISIBLE_CLASS)?;
    Ok(true)
}
