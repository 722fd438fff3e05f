//! Structural validation of element lists.

use std::collections::HashSet;

use super::{Element, ElementKind};
use crate::error::{GabaritError, Result};

/// A group with at least one child.
pub fn is_valid_group(element: &Element) -> bool {
    matches!(&element.kind, ElementKind::Group(g) if !g.children.is_empty())
}

/// A table with at least one column.
pub fn is_valid_table(element: &Element) -> bool {
    matches!(&element.kind, ElementKind::Table(t) if !t.columns.is_empty())
}

/// Enforce the invariants composition relies on: ids present and unique,
/// finite non-negative sizes, and grouping exactly one level deep.
pub(super) fn validate_elements(elements: &[Element]) -> Result<()> {
    let mut seen = HashSet::new();
    for el in elements {
        check_element(el, &mut seen)?;
        for child in el.children() {
            if matches!(child.kind, ElementKind::Group(_)) {
                return Err(GabaritError::config(format!(
                    "group '{}' contains nested group '{}'",
                    el.id, child.id
                )));
            }
            check_element(child, &mut seen)?;
        }
    }
    Ok(())
}

fn check_element<'a>(el: &'a Element, seen: &mut HashSet<&'a str>) -> Result<()> {
    if el.id.trim().is_empty() {
        return Err(GabaritError::config(format!(
            "{} element without an id",
            el.kind.label()
        )));
    }
    if !seen.insert(el.id.as_str()) {
        return Err(GabaritError::config(format!("duplicate element id '{}'", el.id)));
    }
    let finite = [el.x, el.y, el.width, el.height].iter().all(|v| v.is_finite());
    if !finite || el.width < 0.0 || el.height < 0.0 {
        return Err(GabaritError::config(format!(
            "element '{}' has invalid geometry",
            el.id
        )));
    }
    Ok(())
}
