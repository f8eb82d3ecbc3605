use crate::Result;
use crate::dom::Dom;

pub(crate) const TOGGLE_SELECTOR: &str = "#darkModeToggle";
pub(crate) const STORAGE_KEY: &str = "darkMode";
pub(crate) const DARK_MODE_CLASS: &str = "dark-mode";

pub(crate) fn storage_value(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

/// Flips the body class. Returns the new state, or `None` without a body.
pub(crate) fn toggle(dom: &mut Dom) -> Result<Option<bool>> {
    let Some(body) = dom.body() else {
        return Ok(None);
    };
    dom.class_toggle(body, DARK_MODE_CLASS).map(Some)
}

/// Applies a stored preference on page load.
pub(crate) fn restore(dom: &mut Dom, stored: Option<&str>) -> Result<bool> {
    if stored != Some(storage_value(true)) {
        return Ok(false);
    }
    let Some(body) = dom.body() else {
        return Ok(false);
    };
    dom.class_add(body, DARK_MODE_CLASS)?;
    Ok(true)
}
