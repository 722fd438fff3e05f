//! Turn a pasted HTML snippet into a CSS selector.
//!
//! Users often copy an element's markup from the browser inspector into the
//! selector field. The editor calls [`selector_from_input`] when the field
//! loses focus and stores the result; rendering uses the stored selector.

use html5ever::{LocalName, Namespace, QualName};
use kuchiki::traits::*;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// `tag.firstClass`, else `tag#id`, else `tag` for an HTML snippet.
/// Anything that does not look like markup is returned trimmed.
pub fn selector_from_input(input: &str) -> String {
    let trimmed = input.trim();
    if !trimmed.starts_with('<') {
        return trimmed.to_string();
    }

    // Parsed as the content of a <template> so table parts (td, tr, ...)
    // survive outside a table.
    let context = QualName::new(
        None,
        Namespace::from(HTML_NAMESPACE),
        LocalName::from("template"),
    );
    let document = kuchiki::parse_fragment(context, Vec::new()).one(trimmed);
    let first = document.descendants().elements().find(|el| {
        !matches!(&*el.name.local, "html" | "head" | "body")
    });
    let Some(element) = first else {
        return trimmed.to_string();
    };

    let tag = element.name.local.to_string();
    let attributes = element.attributes.borrow();

    if let Some(class) = attributes
        .get("class")
        .and_then(|c| c.split_whitespace().next())
    {
        return format!("{}.{}", tag, class);
    }
    if let Some(id) = attributes.get("id").map(str::trim).filter(|id| !id.is_empty()) {
        return format!("{}#{}", tag, id);
    }
    tag
}
