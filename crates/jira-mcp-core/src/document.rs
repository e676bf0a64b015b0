//! Atlassian Document Format (ADF) helpers.
//!
//! Jira Cloud returns descriptions and comment bodies as a tree of
//! document nodes. This module flattens such trees into plain text and
//! builds the minimal document used when creating or editing issues.

use serde_json::{json, Value};

/// Marker prepended to every list item.
const BULLET: &str = "• ";

/// A rich-text node, parsed from its JSON form only to be flattened.
#[derive(Debug, Clone, PartialEq)]
pub enum RichTextNode {
    Text(String),
    HardBreak,
    Paragraph(Vec<RichTextNode>),
    BulletList(Vec<RichTextNode>),
    OrderedList(Vec<RichTextNode>),
    ListItem(Vec<RichTextNode>),
    /// Any other node type; empty when the node has no children.
    Other(Vec<RichTextNode>),
}

impl RichTextNode {
    /// Parse a node from its JSON representation.
    ///
    /// Never fails: unknown or malformed nodes become `Other` with whatever
    /// children could be read.
    pub fn from_value(value: &Value) -> Self {
        let node_type = value.get("type").and_then(Value::as_str).unwrap_or("");

        match node_type {
            "text" => RichTextNode::Text(
                value
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
            ),
            "hardBreak" => RichTextNode::HardBreak,
            "paragraph" => RichTextNode::Paragraph(children(value)),
            "bulletList" => RichTextNode::BulletList(children(value)),
            "orderedList" => RichTextNode::OrderedList(children(value)),
            "listItem" => RichTextNode::ListItem(children(value)),
            _ => RichTextNode::Other(children(value)),
        }
    }

    /// Flatten this node (and its subtree) into plain text.
    pub fn to_plain_text(&self) -> String {
        match self {
            RichTextNode::Text(text) => text.clone(),
            RichTextNode::HardBreak => "\n".to_string(),
            RichTextNode::Paragraph(nodes) | RichTextNode::Other(nodes) => concat(nodes),
            // Ordered lists are intentionally rendered like bullet lists (no numbering).
            RichTextNode::BulletList(nodes) | RichTextNode::OrderedList(nodes) => nodes
                .iter()
                .map(RichTextNode::to_plain_text)
                .collect::<Vec<_>>()
                .join("\n"),
            RichTextNode::ListItem(nodes) => format!("{}{}", BULLET, concat(nodes)),
        }
    }
}

fn children(value: &Value) -> Vec<RichTextNode> {
    value
        .get("content")
        .and_then(Value::as_array)
        .map(|nodes| nodes.iter().map(RichTextNode::from_value).collect())
        .unwrap_or_default()
}

fn concat(nodes: &[RichTextNode]) -> String {
    nodes.iter().map(RichTextNode::to_plain_text).collect()
}

/// Flatten a single node, or nothing, into plain text.
pub fn flatten_node(value: Option<&Value>) -> String {
    match value {
        Some(Value::Null) | None => String::new(),
        Some(v) => RichTextNode::from_value(v).to_plain_text(),
    }
}

/// Flatten a comment body.
///
/// Top-level children are flattened one by one, joined with newlines and
/// the result is trimmed. Plain-string bodies (API v2) are returned trimmed.
pub fn flatten_comment_body(body: Option<&Value>) -> String {
    match body {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(doc) => match RichTextNode::from_value(doc) {
            RichTextNode::Paragraph(nodes)
            | RichTextNode::BulletList(nodes)
            | RichTextNode::OrderedList(nodes)
            | RichTextNode::ListItem(nodes)
            | RichTextNode::Other(nodes) => nodes
                .iter()
                .map(RichTextNode::to_plain_text)
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string(),
            leaf => leaf.to_plain_text().trim().to_string(),
        },
    }
}

/// Wrap plain text in a single-paragraph ADF document.
///
/// Multi-paragraph or styled text is not interpreted; the whole string
/// becomes one text node.
pub fn single_paragraph_doc(text: &str) -> Value {
    json!({
        "type": "doc",
        "version": 1,
        "content": [{
            "type": "paragraph",
            "content": [{
                "type": "text",
                "text": text
            }]
        }]
    })
}
