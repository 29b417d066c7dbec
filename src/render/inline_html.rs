//! Inline (line-oriented) HTML renderer: one `<div>` per flattened
//! `Change`, meant for embedding directly next to the source line it
//! annotates rather than as a standalone tree view (see [`super::html`]).

use crate::model::Change;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render one flattened `Change` as a single inline annotation `<div>`.
fn render_one(change: &Change) -> String {
    let location = change
        .new_location
        .or(change.old_location)
        .map_or_else(String::new, |span| format!("L{}", span.start_line));
    format!(
        "<div class=\"semdiff-inline {kind} {impact}\" data-location=\"{location}\" title=\"{name}\">{kind}: {name}</div>",
        kind = change.kind.as_str(),
        impact = change.impact.as_str(),
        location = escape(&location),
        name = escape(&change.name),
    )
}

/// Render every change in `changes` (and their descendants) as a flat
/// sequence of inline annotation `<div>`s, in the same pre-order as
/// [`Change::flatten`].
#[must_use]
pub fn render(changes: &[Change]) -> String {
    changes
        .iter()
        .flat_map(Change::flatten)
        .map(render_one)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::NodeKind;
    use crate::model::{ChangeKind, Impact, Visibility};

    #[test]
    fn renders_one_div_per_flattened_change() {
        let child = Change::leaf(
            ChangeKind::Added,
            NodeKind::Method,
            "Multiply",
            None,
            None,
            None,
            None,
            Impact::NonBreaking,
            Visibility::Public,
        );
        let parent = Change::leaf(
            ChangeKind::Modified,
            NodeKind::Class,
            "Calculator",
            None,
            None,
            None,
            None,
            Impact::NonBreaking,
            Visibility::Public,
        )
        .with_children(vec![child]);

        let html = render(&[parent]);
        assert_eq!(html.matches("<div").count(), 2);
        assert!(html.contains("Multiply"));
    }
}
