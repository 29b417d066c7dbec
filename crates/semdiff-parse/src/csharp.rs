//! C#-like structural parsing, backed by `tree-sitter-c-sharp`.
//!
//! The core's [`semdiff::capability::Node`] trait needs owned, `'static`
//! data (no lifetime tied to the `tree_sitter::Tree`), so parsing eagerly
//! converts the whole tree-sitter parse tree into an owned [`CsNode`] tree
//! rather than wrapping borrowed `tree_sitter::Node`s — the same shape the
//! teacher's own AST merge uses (`TopLevelItem` copies out `content: Vec<u8>`
//! rather than holding node references across the merge).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use semdiff::capability::{Node, NodeKind, ParseError, Span, Tree};
use semdiff::model::Visibility;
use tree_sitter::Parser as TsParser;

fn kind_for(ts_kind: &str) -> Option<NodeKind> {
    match ts_kind {
        "namespace_declaration" => Some(NodeKind::Namespace),
        "class_declaration" => Some(NodeKind::Class),
        "interface_declaration" => Some(NodeKind::Interface),
        "struct_declaration" => Some(NodeKind::Struct),
        "record_declaration" => Some(NodeKind::Record),
        "enum_declaration" => Some(NodeKind::Enum),
        "method_declaration" | "constructor_declaration" | "destructor_declaration" => {
            Some(NodeKind::Method)
        }
        "property_declaration" | "indexer_declaration" => Some(NodeKind::Property),
        "field_declaration" => Some(NodeKind::Field),
        _ => None,
    }
}

fn node_text<'a>(node: tree_sitter::Node<'_>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

fn hash_text(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

fn span_of(node: tree_sitter::Node<'_>) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span::new(
        u32::try_from(start.row + 1).unwrap_or(u32::MAX),
        u32::try_from(end.row + 1).unwrap_or(u32::MAX),
        u32::try_from(start.column).unwrap_or(u32::MAX),
        u32::try_from(end.column).unwrap_or(u32::MAX),
    )
}

/// A declaration's signature: its header up to the first `{` or `;`, with
/// the declared name itself excised and whitespace collapsed. Stable across
/// reformatting and adequate for the §4.3 signature-based rename match —
/// excluding the name is what lets a method keep the same signature across
/// a rename in the first place.
fn build_signature(node: tree_sitter::Node<'_>, source: &str) -> String {
    let full_text = node_text(node, source);
    let header = full_text.split(['{', ';']).next().unwrap_or("");

    let without_name = node.child_by_field_name("name").and_then(|name_node| {
        let start = name_node.start_byte().checked_sub(node.start_byte())?;
        let end = name_node.end_byte().checked_sub(node.start_byte())?;
        if end <= header.len() && header.is_char_boundary(start) && header.is_char_boundary(end) {
            Some(format!("{}{}", &header[..start], &header[end..]))
        } else {
            None
        }
    });

    without_name
        .as_deref()
        .unwrap_or(header)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn detect_visibility(node: tree_sitter::Node<'_>, source: &str) -> Visibility {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match node_text(child, source) {
            "public" => return Visibility::Public,
            "private" => return Visibility::Private,
            "protected" => return Visibility::Protected,
            "internal" => return Visibility::Internal,
            _ => {}
        }
    }
    Visibility::Internal
}

fn identifier_of(node: tree_sitter::Node<'_>, source: &str) -> Option<String> {
    node.child_by_field_name("name")
        .map(|n| node_text(n, source).to_string())
}

/// An owned node in the structural tree `semdiff` diffs.
pub struct CsNode {
    kind: NodeKind,
    name: Option<String>,
    signature: String,
    visibility: Visibility,
    span: Span,
    hash: u64,
    body: Option<String>,
    children: Vec<CsNode>,
}

impl Node for CsNode {
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

fn convert_node(ts_node: tree_sitter::Node<'_>, source: &str) -> CsNode {
    let kind = kind_for(ts_node.kind()).unwrap_or(NodeKind::Other);
    let full_text = node_text(ts_node, source);
    let has_body = matches!(kind, NodeKind::Method | NodeKind::Property | NodeKind::Field);

    CsNode {
        kind,
        name: identifier_of(ts_node, source),
        signature: build_signature(ts_node, source),
        visibility: detect_visibility(ts_node, source),
        span: span_of(ts_node),
        hash: hash_text(full_text),
        body: has_body.then(|| full_text.to_string()),
        children: extract_structural_children(ts_node, source),
    }
}

/// Collect the *immediate* structural declarations reachable from
/// `ts_node`, transparently descending through non-structural container
/// nodes (`declaration_list`, the compilation unit itself, …) without
/// creating a `CsNode` for them.
fn extract_structural_children(ts_node: tree_sitter::Node<'_>, source: &str) -> Vec<CsNode> {
    let mut out = Vec::new();
    let mut cursor = ts_node.walk();
    for child in ts_node.named_children(&mut cursor) {
        if kind_for(child.kind()).is_some() {
            out.push(convert_node(child, source));
        } else {
            out.extend(extract_structural_children(child, source));
        }
    }
    out
}

pub struct CsTree {
    root: CsNode,
}

impl Tree for CsTree {
    fn root(&self) -> &dyn Node {
        &self.root
    }

    fn root_hash(&self) -> u64 {
        self.root.hash
    }
}

pub fn parse(text: &str) -> Result<Box<dyn Tree>, ParseError> {
    let mut parser = TsParser::new();
    parser
        .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
        .map_err(|err| ParseError::Malformed {
            detail: format!("failed to initialize C# grammar: {err}"),
        })?;

    let tree = parser.parse(text, None).ok_or_else(|| ParseError::Malformed {
        detail: "tree-sitter returned no tree".to_string(),
    })?;

    let root_ts_node = tree.root_node();
    let root = CsNode {
        kind: NodeKind::Other,
        name: None,
        signature: String::new(),
        visibility: Visibility::Unknown,
        span: span_of(root_ts_node),
        hash: hash_text(text),
        body: None,
        children: extract_structural_children(root_ts_node, text),
    };

    Ok(Box::new(CsTree { root }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_class_with_methods() {
        let source = "public class Calculator {\n    public int Add(int a, int b) { return a + b; }\n}\n";
        let tree = parse(source).unwrap();
        let root = tree.root();
        assert_eq!(root.children().len(), 1);
        let class_node = root.children()[0];
        assert_eq!(class_node.kind(), NodeKind::Class);
        assert_eq!(class_node.identifier(), Some("Calculator"));
        assert_eq!(class_node.children().len(), 1);
        let method = class_node.children()[0];
        assert_eq!(method.kind(), NodeKind::Method);
        assert_eq!(method.visibility(), Visibility::Public);
    }

    #[test]
    fn identical_sources_hash_equal() {
        let source = "public class A {}\n";
        let a = parse(source).unwrap();
        let b = parse(source).unwrap();
        assert_eq!(a.root_hash(), b.root_hash());
    }
}
