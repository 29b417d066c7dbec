//! Embeddable HTML renderer (§6 "Embeddable fragment"): *document* (a full
//! standalone page) and *fragment* (a single container element carrying
//! machine-readable `data-*` attributes, referencing an external
//! stylesheet) modes.
//!
//! Fragment mode never emits a doctype, `<head>`, or `<body>` — the whole
//! point is that a caller can splice it into an existing page.

use crate::model::{Change, ComparisonMode, MultiFileResult};

/// Default external stylesheet filename (§6), used unless the caller
/// configures another.
pub const DEFAULT_STYLESHEET: &str = "roslyn-diff.css";

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn render_change(change: &Change, out: &mut String) {
    out.push_str(&format!(
        "<li class=\"change change-{kind} impact-{impact}\" data-kind=\"{kind}\" data-impact=\"{impact}\" data-name=\"{name}\">",
        kind = change.kind.as_str(),
        impact = change.impact.as_str(),
        name = escape(&change.name),
    ));
    out.push_str(&format!(
        "<span class=\"change-label\">{} {} {}</span>",
        change.kind.as_str(),
        change.node_kind,
        escape(&change.name),
    ));
    if !change.caveats.is_empty() {
        out.push_str("<ul class=\"caveats\">");
        for caveat in &change.caveats {
            out.push_str(&format!("<li class=\"caveat\">{}</li>", escape(caveat)));
        }
        out.push_str("</ul>");
    }
    if !change.children.is_empty() {
        out.push_str("<ul class=\"children\">");
        for child in &change.children {
            render_change(child, out);
        }
        out.push_str("</ul>");
    }
    out.push_str("</li>");
}

/// Render the container element shared by both modes: a `<section>` with
/// `data-*` attributes exposing change counts and impact breakdown, plus a
/// nested list for every file's change tree.
fn render_container(result: &MultiFileResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<section class=\"semdiff-result\" data-total-changes=\"{total}\" data-breaking-public-api=\"{bp}\" data-breaking-internal-api=\"{bi}\" data-non-breaking=\"{nb}\" data-formatting-only=\"{fo}\">",
        total = result.summary.total_changes,
        bp = result.summary.breaking_public_api,
        bi = result.summary.breaking_internal_api,
        nb = result.summary.non_breaking,
        fo = result.summary.formatting_only,
    ));
    for entry in &result.files {
        out.push_str(&format!(
            "<article class=\"file\" data-new-path=\"{}\">",
            escape(&entry.new_path)
        ));
        match &entry.outcome {
            crate::model::FileStatus::Ok { result } => {
                out.push_str("<ul class=\"changes\">");
                for change in &result.changes {
                    render_change(change, &mut out);
                }
                out.push_str("</ul>");
            }
            crate::model::FileStatus::Error { message } => {
                out.push_str(&format!(
                    "<p class=\"file-error\">{}</p>",
                    escape(message)
                ));
            }
        }
        out.push_str("</article>");
    }
    out.push_str("</section>");
    out
}

/// *Fragment* mode: a single container element, no doctype/head/body.
#[must_use]
pub fn render_fragment(result: &MultiFileResult, stylesheet: Option<&str>) -> String {
    let stylesheet = stylesheet.unwrap_or(DEFAULT_STYLESHEET);
    format!(
        "<link rel=\"stylesheet\" href=\"{}\">\n{}",
        escape(stylesheet),
        render_container(result)
    )
}

/// *Document* mode: a full standalone page wrapping [`render_fragment`].
#[must_use]
pub fn render_document(result: &MultiFileResult, stylesheet: Option<&str>) -> String {
    let stylesheet = stylesheet.unwrap_or(DEFAULT_STYLESHEET);
    let title = match result.comparison_mode {
        ComparisonMode::Direct => "semdiff",
        ComparisonMode::Folder => "semdiff — folder comparison",
        ComparisonMode::RefRange => "semdiff — ref range comparison",
    };
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<link rel=\"stylesheet\" href=\"{stylesheet}\">\n</head>\n<body>\n{container}\n</body>\n</html>\n",
        title = escape(title),
        stylesheet = escape(stylesheet),
        container = render_container(result),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComparisonMode, FileCounts, Stats};

    fn empty_result() -> MultiFileResult {
        MultiFileResult {
            comparison_mode: ComparisonMode::Folder,
            ref_range: None,
            old_root: None,
            new_root: None,
            files: vec![],
            summary: Stats::default(),
            file_counts: FileCounts::default(),
            generated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn fragment_has_no_document_preamble() {
        let html = render_fragment(&empty_result(), None);
        assert!(!html.contains("<!DOCTYPE"));
        assert!(!html.contains("<head>"));
        assert!(!html.contains("<body>"));
        assert!(html.contains(DEFAULT_STYLESHEET));
    }

    #[test]
    fn document_wraps_fragment_in_a_full_page() {
        let html = render_document(&empty_result(), None);
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("<head>"));
        assert!(html.contains("<body>"));
    }

    #[test]
    fn custom_stylesheet_name_is_honored() {
        let html = render_fragment(&empty_result(), Some("custom.css"));
        assert!(html.contains("custom.css"));
        assert!(!html.contains(DEFAULT_STYLESHEET));
    }
}
