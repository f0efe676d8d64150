//! Rich-text document trees as delivered by the tracker, plus the polymorphic
//! body type used by ticket descriptions and comments.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Inline formatting attached to a text node. Marks apply in list order, each
/// one wrapping the result of the previous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mark {
    Strong,
    Em,
    Code,
    Strike,
    Link { href: Option<String> },
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentNode {
    Doc(Vec<DocumentNode>),
    Paragraph(Vec<DocumentNode>),
    Heading {
        level: Option<i64>,
        content: Vec<DocumentNode>,
    },
    BulletList(Vec<DocumentNode>),
    OrderedList(Vec<DocumentNode>),
    ListItem(Vec<DocumentNode>),
    CodeBlock {
        language: Option<String>,
        content: Vec<DocumentNode>,
    },
    Blockquote(Vec<DocumentNode>),
    Rule,
    HardBreak,
    Text {
        text: String,
        marks: Vec<Mark>,
    },
    Unknown {
        kind: String,
        content: Vec<DocumentNode>,
    },
}

impl DocumentNode {
    #[cfg(test)]
    pub fn text(text: impl Into<String>) -> Self {
        DocumentNode::Text {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn marked(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        DocumentNode::Text {
            text: text.into(),
            marks,
        }
    }

    pub fn children(&self) -> &[DocumentNode] {
        match self {
            DocumentNode::Doc(content)
            | DocumentNode::Paragraph(content)
            | DocumentNode::BulletList(content)
            | DocumentNode::OrderedList(content)
            | DocumentNode::ListItem(content)
            | DocumentNode::Blockquote(content)
            | DocumentNode::Heading { content, .. }
            | DocumentNode::CodeBlock { content, .. }
            | DocumentNode::Unknown { content, .. } => content,
            DocumentNode::Rule | DocumentNode::HardBreak | DocumentNode::Text { .. } => &[],
        }
    }

    /// Concatenated text payloads in document order. Walks iteratively so
    /// arbitrarily deep trees cannot exhaust the stack.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                DocumentNode::Text { text, .. } => out.push_str(text),
                DocumentNode::HardBreak => out.push('\n'),
                other => stack.extend(other.children().iter().rev()),
            }
        }
        out
    }

    /// Parses a JSON value into a tree. Returns `None` when the value does not
    /// have the shape of a node at all. Subtrees nested deeper than
    /// [`MAX_DEPTH`] are collapsed into a single text node.
    pub fn from_value(value: &Value) -> Option<Self> {
        parse_node(value, 0)
    }
}

/// Deepest nesting kept as structure; anything below becomes plain text.
pub const MAX_DEPTH: usize = 64;

fn parse_node(value: &Value, depth: usize) -> Option<DocumentNode> {
    let object = value.as_object()?;
    if depth > MAX_DEPTH {
        tracing::debug!(depth, "document nesting exceeds limit, flattening");
        return Some(DocumentNode::Text {
            text: flatten_text(value),
            marks: Vec::new(),
        });
    }

    let kind = match object.get("type") {
        None | Some(Value::Null) => "",
        Some(kind) => kind.as_str()?,
    };
    let attrs = object.get("attrs");
    let content = match object.get("content") {
        None | Some(Value::Null) => Vec::new(),
        Some(children) => children
            .as_array()?
            .iter()
            .map(|child| parse_node(child, depth + 1))
            .collect::<Option<Vec<_>>>()?,
    };

    let node = match kind {
        "doc" => DocumentNode::Doc(content),
        "paragraph" => DocumentNode::Paragraph(content),
        "heading" => DocumentNode::Heading {
            level: attr(attrs, "level").and_then(Value::as_i64),
            content,
        },
        "bulletList" => DocumentNode::BulletList(content),
        "orderedList" => DocumentNode::OrderedList(content),
        "listItem" => DocumentNode::ListItem(content),
        "codeBlock" => DocumentNode::CodeBlock {
            language: attr(attrs, "language")
                .and_then(Value::as_str)
                .filter(|lang| !lang.trim().is_empty())
                .map(str::to_string),
            content,
        },
        "blockquote" => DocumentNode::Blockquote(content),
        "rule" => DocumentNode::Rule,
        "hardBreak" => DocumentNode::HardBreak,
        "text" => DocumentNode::Text {
            text: object
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            marks: parse_marks(object.get("marks"))?,
        },
        other => DocumentNode::Unknown {
            kind: other.to_string(),
            content,
        },
    };
    Some(node)
}

fn parse_marks(value: Option<&Value>) -> Option<Vec<Mark>> {
    let marks = match value {
        None | Some(Value::Null) => return Some(Vec::new()),
        Some(marks) => marks.as_array()?,
    };
    marks.iter().map(parse_mark).collect()
}

fn parse_mark(value: &Value) -> Option<Mark> {
    let object = value.as_object()?;
    let kind = object.get("type").and_then(Value::as_str).unwrap_or_default();
    let mark = match kind {
        "strong" => Mark::Strong,
        "em" => Mark::Em,
        "code" => Mark::Code,
        "strike" => Mark::Strike,
        "link" => Mark::Link {
            href: attr(object.get("attrs"), "href")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
        other => Mark::Unknown(other.to_string()),
    };
    Some(mark)
}

fn attr<'a>(attrs: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    attrs.and_then(|attrs| attrs.get(name))
}

/// Text payloads of a raw subtree in document order, without recursion.
fn flatten_text(value: &Value) -> String {
    let mut out = String::new();
    let mut stack = vec![value];
    while let Some(node) = stack.pop() {
        match node.get("type").and_then(Value::as_str) {
            Some("text") => {
                if let Some(text) = node.get("text").and_then(Value::as_str) {
                    out.push_str(text);
                }
            }
            Some("hardBreak") => out.push('\n'),
            _ => {
                if let Some(children) = node.get("content").and_then(Value::as_array) {
                    stack.extend(children.iter().rev());
                }
            }
        }
    }
    out
}

/// Description or comment body, classified once when the payload arrives.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Text(String),
    Document(DocumentNode),
    /// Structured payload that is not a `doc`-rooted tree.
    Opaque(Value),
}

impl Body {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => Body::Text(text),
            Value::Object(ref map) if map.get("type").and_then(Value::as_str) == Some("doc") => {
                match DocumentNode::from_value(&value) {
                    Some(node) => Body::Document(node),
                    None => Body::Opaque(value),
                }
            }
            other => Body::Opaque(other),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Body::Text(text) => text.trim().is_empty(),
            Body::Document(node) => node.plain_text().trim().is_empty(),
            Body::Opaque(value) => value.is_null(),
        }
    }

    pub fn plain_text(&self) -> String {
        match self {
            Body::Text(text) => text.clone(),
            Body::Document(node) => node.plain_text(),
            Body::Opaque(value) => value.to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for Body {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Body::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_nested_document_with_marks() {
        let value = json!({
            "type": "doc",
            "version": 1,
            "content": [{
                "type": "paragraph",
                "content": [
                    {"type": "text", "text": "see "},
                    {"type": "text", "text": "docs", "marks": [
                        {"type": "strong"},
                        {"type": "link", "attrs": {"href": "https://example.com"}}
                    ]}
                ]
            }]
        });

        let body = Body::from_value(value);
        let Body::Document(DocumentNode::Doc(blocks)) = body else {
            panic!("expected a doc-rooted body");
        };
        assert_eq!(
            blocks[0],
            DocumentNode::Paragraph(vec![
                DocumentNode::text("see "),
                DocumentNode::marked(
                    "docs",
                    vec![
                        Mark::Strong,
                        Mark::Link {
                            href: Some("https://example.com".to_string())
                        }
                    ]
                ),
            ])
        );
    }

    #[test]
    fn keeps_unknown_node_and_mark_types() {
        let node = DocumentNode::from_value(&json!({
            "type": "panel",
            "content": [{"type": "text", "text": "x", "marks": [{"type": "underline"}]}]
        }))
        .unwrap();

        assert_eq!(
            node,
            DocumentNode::Unknown {
                kind: "panel".to_string(),
                content: vec![DocumentNode::marked(
                    "x",
                    vec![Mark::Unknown("underline".to_string())]
                )],
            }
        );
    }

    #[test]
    fn classifies_bodies_once() {
        assert_eq!(
            Body::from_value(json!("plain")),
            Body::Text("plain".to_string())
        );
        assert!(matches!(
            Body::from_value(json!({"type": "paragraph", "content": []})),
            Body::Opaque(_)
        ));
        assert!(matches!(Body::from_value(json!([1, 2])), Body::Opaque(_)));
        // A doc whose children are not nodes cannot be parsed as a tree.
        assert!(matches!(
            Body::from_value(json!({"type": "doc", "content": ["oops"]})),
            Body::Opaque(_)
        ));
    }

    #[test]
    fn null_content_is_treated_as_empty() {
        let node =
            DocumentNode::from_value(&json!({"type": "paragraph", "content": null})).unwrap();
        assert_eq!(node, DocumentNode::Paragraph(Vec::new()));
    }

    #[test]
    fn deep_nesting_collapses_to_text() {
        let mut value = json!({"type": "text", "text": "bottom"});
        for _ in 0..500 {
            value = json!({"type": "paragraph", "content": [value]});
        }
        let node = DocumentNode::from_value(&json!({"type": "doc", "content": [value]})).unwrap();

        let mut levels = 0;
        let mut cursor = &node;
        while let [child] = cursor.children() {
            levels += 1;
            cursor = child;
        }
        assert_eq!(levels, MAX_DEPTH + 1);
        assert_eq!(cursor, &DocumentNode::text("bottom"));
        assert_eq!(node.plain_text(), "bottom");
    }

    #[test]
    fn plain_text_follows_document_order() {
        let node = DocumentNode::Doc(vec![
            DocumentNode::Paragraph(vec![DocumentNode::text("a"), DocumentNode::text("b")]),
            DocumentNode::HardBreak,
            DocumentNode::Paragraph(vec![DocumentNode::text("c")]),
        ]);
        assert_eq!(node.plain_text(), "ab\nc");
    }
}
