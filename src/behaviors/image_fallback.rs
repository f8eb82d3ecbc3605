use crate::Result;
use crate::dom::{Dom, NodeId};

pub(crate) const DEFAULT_PLACEHOLDER: &str = "/static/img/placeholder.png";
pub(crate) const FALLBACK_CLASS: &str = "img-fallback";

/// Swaps a broken image for its fallback. An image already showing its
/// fallback is left alone so a broken placeholder cannot loop.
pub(crate) fn apply_fallback(dom: &mut Dom, image: NodeId) -> Result<bool> {
    if !dom.is_tag(image, "img") || dom.class_contains(image, FALLBACK_CLASS) {
        return Ok(false);
    }
    let fallback = dom
        .attr(image, "data-fallback")
        .filter(|src| !src.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string());
    dom.set_attr(image, "src", &fallback)?;
    dom.class_add(image, FALLBACK_CLASS)?;
    Ok(true)
}
