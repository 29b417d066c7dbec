//! Fallback structural scanner for VB-like source and anything else without
//! a recognized tree-sitter grammar in this workspace's dependency stack.
//!
//! There is no maintained VB.NET tree-sitter grammar in the crates the rest
//! of this workspace already depends on, so rather than failing the whole
//! file with [`ParseError::UnsupportedLanguage`], this module recognizes
//! VB's `Keyword ... End Keyword` block structure line by line. Anything
//! that isn't one of those blocks is left out of the structural tree
//! entirely (it still contributes to the containing block's content hash)
//! rather than invented as a synthetic node — a file full of loose
//! statements legitimately has no structural children to report.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use semdiff::capability::{Node, NodeKind, ParseError, Span, Tree};
use semdiff::model::Visibility;

struct Opener {
    keyword: &'static str,
    kind: NodeKind,
}

const OPENERS: &[Opener] = &[
    Opener { keyword: "namespace", kind: NodeKind::Namespace },
    Opener { keyword: "class", kind: NodeKind::Class },
    Opener { keyword: "module", kind: NodeKind::Class },
    Opener { keyword: "interface", kind: NodeKind::Interface },
    Opener { keyword: "structure", kind: NodeKind::Struct },
    Opener { keyword: "enum", kind: NodeKind::Enum },
    Opener { keyword: "sub", kind: NodeKind::Method },
    Opener { keyword: "function", kind: NodeKind::Method },
    Opener { keyword: "property", kind: NodeKind::Property },
];

const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "friend", "shared", "overrides", "overridable", "mustoverride", "default",
];

fn hash_text(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Find an opener keyword on this line (skipping leading modifiers) and the
/// identifier token right after it, if any.
fn match_opener(line: &str) -> Option<(&'static Opener, Option<String>)> {
    let mut tokens = line.split_whitespace();
    let mut token = tokens.next()?;
    while MODIFIERS.iter().any(|m| m.eq_ignore_ascii_case(token)) {
        token = tokens.next()?;
    }
    let opener = OPENERS.iter().find(|o| o.keyword.eq_ignore_ascii_case(token))?;
    let name = tokens
        .next()
        .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '_').to_string())
        .filter(|n| !n.is_empty());
    Some((opener, name))
}

fn match_closer(line: &str, keyword: &str) -> bool {
    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else { return false };
    let Some(second) = tokens.next() else { return false };
    first.eq_ignore_ascii_case("end") && second.eq_ignore_ascii_case(keyword)
}

fn detect_visibility(line: &str) -> Visibility {
    let lower = line.to_ascii_lowercase();
    if lower.split_whitespace().any(|t| t == "public") {
        Visibility::Public
    } else if lower.split_whitespace().any(|t| t == "private") {
        Visibility::Private
    } else if lower.split_whitespace().any(|t| t == "protected") {
        Visibility::Protected
    } else if lower.split_whitespace().any(|t| t == "friend") {
        Visibility::Internal
    } else {
        Visibility::Unknown
    }
}

pub struct HeuristicNode {
    kind: NodeKind,
    name: Option<String>,
    signature: String,
    visibility: Visibility,
    span: Span,
    hash: u64,
    body: Option<String>,
    children: Vec<HeuristicNode>,
}

impl Node for HeuristicNode {
    fn kind(&self) -> NodeKind {
        self.kind
    }
    fn identifier(&self) -> Option<&str> {
        self.name.as_deref()
    }
    fn signature(&self) -> &str {
        &self.signature
    }
    fn visibility(&self) -> Visibility {
        self.visibility
    }
    fn span(&self) -> Span {
        self.span
    }
    fn content_hash(&self) -> u64 {
        self.hash
    }
    fn children(&self) -> Vec<&dyn Node> {
        self.children.iter().map(|c| c as &dyn Node).collect()
    }
    fn body_text(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

struct Frame {
    opener: &'static Opener,
    name: Option<String>,
    visibility: Visibility,
    start_line: usize,
    lines: Vec<String>,
    children: Vec<HeuristicNode>,
}

/// The opener line with whitespace collapsed and the declared name's token
/// removed — excluding the name is what lets a renamed block still match by
/// signature (§4.3 step 2).
fn signature_line(line: &str, name: Option<&str>) -> String {
    let Some(name) = name else { return collapse_whitespace(line) };
    let mut removed = false;
    line.split_whitespace()
        .filter(|token| {
            if !removed && token.trim_matches(|c: char| !c.is_alphanumeric() && c != '_') == name {
                removed = true;
                false
            } else {
                true
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn finish_frame(frame: Frame, end_line: usize) -> HeuristicNode {
    let body = frame.lines.join("\n");
    let signature =
        frame.lines.first().map(|l| signature_line(l, frame.name.as_deref())).unwrap_or_default();
    HeuristicNode {
        kind: frame.opener.kind,
        name: frame.name,
        signature,
        visibility: frame.visibility,
        span: Span::new(
            u32::try_from(frame.start_line).unwrap_or(u32::MAX),
            u32::try_from(end_line).unwrap_or(u32::MAX),
            0,
            0,
        ),
        hash: hash_text(&body),
        body: Some(body),
        children: frame.children,
    }
}

pub struct HeuristicTree {
    root: HeuristicNode,
}

impl Tree for HeuristicTree {
    fn root(&self) -> &dyn Node {
        &self.root
    }
    fn root_hash(&self) -> u64 {
        self.root.hash
    }
}

/// Scan `text` for `Keyword ... End Keyword` blocks, nesting children under
/// their enclosing block. `language_hint` is accepted for symmetry with
/// [`csharp::parse`](crate::csharp::parse) but doesn't change behavior —
/// the scanner is language-agnostic by construction.
pub fn parse(text: &str, _language_hint: &str) -> Result<Box<dyn Tree>, ParseError> {
    let mut stack: Vec<Frame> = Vec::new();
    let mut root_children: Vec<HeuristicNode> = Vec::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            if let Some(frame) = stack.last_mut() {
                frame.lines.push(raw_line.to_string());
            }
            continue;
        }

        if let Some(frame) = stack.last() {
            if match_closer(trimmed, frame.opener.keyword) {
                let mut frame = stack.pop().expect("just peeked");
                frame.lines.push(raw_line.to_string());
                let node = finish_frame(frame, line_no);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root_children.push(node),
                }
                continue;
            }
        }

        if let Some((opener, name)) = match_opener(trimmed) {
            stack.push(Frame {
                opener,
                name,
                visibility: detect_visibility(trimmed),
                start_line: line_no,
                lines: vec![raw_line.to_string()],
                children: Vec::new(),
            });
            continue;
        }

        if let Some(frame) = stack.last_mut() {
            frame.lines.push(raw_line.to_string());
        }
    }

    // Unterminated blocks (malformed input) close implicitly at EOF rather
    // than failing the whole file.
    let total_lines = text.lines().count().max(1);
    while let Some(frame) = stack.pop() {
        let node = finish_frame(frame, total_lines);
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => root_children.push(node),
        }
    }

    let root = HeuristicNode {
        kind: NodeKind::Other,
        name: None,
        signature: String::new(),
        visibility: Visibility::Unknown,
        span: Span::new(1, u32::try_from(total_lines).unwrap_or(u32::MAX), 0, 0),
        hash: hash_text(text),
        body: None,
        children: root_children,
    };

    Ok(Box::new(HeuristicTree { root }))
}
