use crate::dom::{Dom, NodeId};
use crate::pattern::Pattern;
use crate::Result;

pub(crate) const VALIDATED_FORM_CLASS: &str = "needs-validation";
pub(crate) const WAS_VALIDATED_CLASS: &str = "was-validated";
const VALID_CLASS: &str = "is-valid";
const INVALID_CLASS: &str = "is-invalid";
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Marks every control of `form` valid or invalid and returns whether the
/// whole form may be submitted.
pub(crate) fn validate_form(dom: &mut Dom, form: NodeId) -> Result<bool> {
    let mut all_valid = true;
    for control in validated_controls(dom, form) {
        all_valid &= mark_control(dom, form, control)?;
    }
    dom.class_add(form, WAS_VALIDATED_CLASS)?;
    Ok(all_valid)
}

/// Re-checks one control after an edit, once its form has been validated.
pub(crate) fn revalidate_control(dom: &mut Dom, control: NodeId) -> Result<Option<bool>> {
    let Some(form) = dom.find_ancestor_by_tag(control, "form") else {
        return Ok(None);
    };
    if !dom.class_contains(form, WAS_VALIDATED_CLASS) || !is_validated_control(dom, control) {
        return Ok(None);
    }
    mark_control(dom, form, control).map(Some)
}

pub(crate) fn form_entries(dom: &Dom, form: NodeId) -> Result<Vec<(String, String)>> {
    let mut entries = Vec::new();
    for control in form_controls(dom, form) {
        let Some(name) = dom.attr(control, "name").filter(|name| !name.is_empty()) else {
            continue;
        };
        if dom.attr(control, "disabled").is_some() || is_button(dom, control) {
            continue;
        }
        if is_checkable(dom, control) {
            if dom.checked(control)? {
                let value = dom.attr(control, "value").unwrap_or_else(|| "on".into());
                entries.push((name, value));
            }
            continue;
        }
        entries.push((name, dom.value(control)?));
    }
    Ok(entries)
}

fn mark_control(dom: &mut Dom, form: NodeId, control: NodeId) -> Result<bool> {
    let valid = control_is_valid(dom, form, control)?;
    let (add, remove) = if valid {
        (VALID_CLASS, INVALID_CLASS)
    } else {
        (INVALID_CLASS, VALID_CLASS)
    };
    dom.class_remove(control, remove)?;
    dom.class_add(control, add)?;
    Ok(valid)
}

fn control_is_valid(dom: &Dom, form: NodeId, control: NodeId) -> Result<bool> {
    let required = dom.attr(control, "required").is_some();

    if is_checkable(dom, control) {
        if !required {
            return Ok(true);
        }
        if input_type(dom, control) == "radio" {
            return radio_group_checked(dom, form, control);
        }
        return dom.checked(control);
    }

    let value = dom.value(control)?;
    if value.is_empty() {
        return Ok(!required);
    }

    let length = value.chars().count();
    if let Some(min) = numeric_attr::<usize>(dom, control, "minlength") {
        if length < min {
            return Ok(false);
        }
    }
    if let Some(max) = numeric_attr::<usize>(dom, control, "maxlength") {
        if length > max {
            return Ok(false);
        }
    }

    match input_type(dom, control).as_str() {
        "email" => {
            if !Pattern::new(EMAIL_PATTERN)?.is_match(&value)? {
                return Ok(false);
            }
        }
        "number" => {
            let Ok(number) = value.trim().parse::<f64>() else {
                return Ok(false);
            };
            if numeric_attr::<f64>(dom, control, "min").is_some_and(|min| number < min)
                || numeric_attr::<f64>(dom, control, "max").is_some_and(|max| number > max)
            {
                return Ok(false);
            }
        }
        _ => {}
    }

    // a pattern that does not compile imposes no constraint
    if let Some(pattern) = dom
        .attr(control, "pattern")
        .filter(|p| !p.is_empty())
        .and_then(|p| Pattern::whole_value(&p).ok())
    {
        if !pattern.is_match(&value).unwrap_or(true) {
            return Ok(false);
        }
    }

    Ok(true)
}

fn radio_group_checked(dom: &Dom, form: NodeId, control: NodeId) -> Result<bool> {
    let Some(name) = dom.attr(control, "name") else {
        return dom.checked(control);
    };
    for other in form_controls(dom, form) {
        if input_type(dom, other) == "radio"
            && dom.attr(other, "name").as_deref() == Some(name.as_str())
            && dom.checked(other)?
        {
            return Ok(true);
        }
    }
    Ok(false)
}

fn numeric_attr<T: std::str::FromStr>(dom: &Dom, control: NodeId, name: &str) -> Option<T> {
    dom.attr(control, name)
        .and_then(|value| value.trim().parse::<T>().ok())
}

fn form_controls(dom: &Dom, form: NodeId) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    dom.collect_elements_descendants_dfs(form, &mut nodes);
    nodes.retain(|node| {
        dom.is_tag(*node, "input") || dom.is_tag(*node, "select") || dom.is_tag(*node, "textarea")
    });
    nodes
}

fn validated_controls(dom: &Dom, form: NodeId) -> Vec<NodeId> {
    form_controls(dom, form)
        .into_iter()
        .filter(|control| is_validated_control(dom, *control))
        .collect()
}

fn is_validated_control(dom: &Dom, control: NodeId) -> bool {
    let is_control =
        dom.is_tag(control, "input") || dom.is_tag(control, "select") || dom.is_tag(control, "textarea");
    is_control
        && dom.attr(control, "disabled").is_none()
        && !is_button(dom, control)
        && input_type(dom, control) != "hidden"
}

pub(crate) fn input_type(dom: &Dom, control: NodeId) -> String {
    if !dom.is_tag(control, "input") {
        return String::new();
    }
    dom.attr(control, "type")
        .map(|kind| kind.to_ascii_lowercase())
        .unwrap_or_else(|| "text".into())
}

pub(crate) fn is_checkable(dom: &Dom, control: NodeId) -> bool {
    matches!(input_type(dom, control).as_str(), "checkbox" | "radio")
}

fn is_button(dom: &Dom, control: NodeId) -> bool {
    matches!(
        input_type(dom, control).as_str(),
        "submit" | "button" | "reset" | "image"
    )
}
