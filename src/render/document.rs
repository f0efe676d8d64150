//! Converts document trees and polymorphic bodies into markup.
//!
//! Rendering is total: unknown node types contribute their children, unknown
//! marks are skipped, and subtrees nested deeper than [`MAX_DEPTH`] collapse
//! to their escaped plain text.

use crate::domain::document::{Body, DocumentNode, MAX_DEPTH, Mark};
use crate::render::markup::{escape_attr, escape_text, safe_href};

const DEFAULT_HEADING_LEVEL: i64 = 3;

pub fn render_node(node: &DocumentNode) -> String {
    let mut out = String::new();
    write_node(node, 0, &mut out);
    out
}

/// Entry point for description and comment bodies.
pub fn render_body(body: &Body) -> String {
    match body {
        Body::Text(text) => escape_text(text).replace('\n', "<br>"),
        Body::Document(node) => render_node(node),
        Body::Opaque(value) => {
            let raw = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            format!(r#"<pre class="raw-body">{}</pre>"#, escape_text(&raw))
        }
    }
}

fn write_node(node: &DocumentNode, depth: usize, out: &mut String) {
    if depth > MAX_DEPTH {
        tracing::warn!(depth, "document nesting exceeds render limit, flattening");
        out.push_str(&escape_text(&node.plain_text()));
        return;
    }

    match node {
        DocumentNode::Text { text, marks } => out.push_str(&render_text(text, marks)),
        DocumentNode::Doc(content) | DocumentNode::Unknown { content, .. } => {
            write_children(content, depth, out)
        }
        DocumentNode::Paragraph(content) => wrap("p", content, depth, out),
        DocumentNode::BulletList(content) => wrap("ul", content, depth, out),
        DocumentNode::OrderedList(content) => wrap("ol", content, depth, out),
        DocumentNode::ListItem(content) => wrap("li", content, depth, out),
        DocumentNode::Blockquote(content) => wrap("blockquote", content, depth, out),
        DocumentNode::Heading { level, content } => {
            let level = level.unwrap_or(DEFAULT_HEADING_LEVEL).clamp(1, 6);
            wrap(&format!("h{level}"), content, depth, out)
        }
        DocumentNode::CodeBlock { language, content } => {
            // Children are text nodes and arrive escaped already.
            match language {
                Some(lang) => out.push_str(&format!(
                    r#"<pre><code class="language-{}">"#,
                    escape_attr(lang)
                )),
                None => out.push_str("<pre><code>"),
            }
            write_children(content, depth, out);
            out.push_str("</code></pre>");
        }
        DocumentNode::Rule => out.push_str("<hr>"),
        DocumentNode::HardBreak => out.push_str("<br>"),
    }
}

fn write_children(content: &[DocumentNode], depth: usize, out: &mut String) {
    for child in content {
        write_node(child, depth + 1, out);
    }
}

fn wrap(tag: &str, content: &[DocumentNode], depth: usize, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    write_children(content, depth, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn render_text(text: &str, marks: &[Mark]) -> String {
    marks.iter().fold(escape_text(text), |inner, mark| match mark {
        Mark::Strong => format!("<strong>{inner}</strong>"),
        Mark::Em => format!("<em>{inner}</em>"),
        Mark::Code => format!(r#"<code class="inline-code">{inner}</code>"#),
        Mark::Strike => format!("<del>{inner}</del>"),
        Mark::Link { href } => format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">{inner}</a>"#,
            safe_href(href.as_deref())
        ),
        Mark::Unknown(_) => inner,
    })
}
