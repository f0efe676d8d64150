use chrono::DateTime;

use crate::domain::comment::Comment;
use crate::render::document::render_body;
use crate::render::markup::{escape_attr, escape_text, safe_href};
use crate::render::user::render_user;

const TRACKER_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

pub fn render_comments(comments: &[Comment]) -> String {
    if comments.is_empty() {
        return "<em>No comments found.</em>".to_string();
    }

    let mut html = format!(
        r#"<div class="comments-total">Total: <strong>{}</strong> comment(s)</div>"#,
        comments.len()
    );
    for (index, comment) in comments.iter().enumerate() {
        html.push_str(&render_comment(index + 1, comment));
    }
    html
}

pub fn render_comment(number: usize, comment: &Comment) -> String {
    let id = comment.id.as_deref().unwrap_or_default();

    let self_link = comment
        .self_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .map(|url| {
            format!(
                r#"<a class="comment-self" href="{}" target="_blank" rel="noopener noreferrer" title="API Self Link">🔗 self</a>"#,
                safe_href(Some(url))
            )
        })
        .unwrap_or_default();

    let author = comment
        .author
        .as_ref()
        .map(|user| render_user(user, "Author"))
        .unwrap_or_default();
    let update_author = comment
        .update_author
        .as_ref()
        .map(|user| render_user(user, "Update Author"))
        .unwrap_or_default();

    let created_raw = comment.created.as_deref().unwrap_or_default();
    let updated_raw = comment.updated.as_deref().unwrap_or_default();
    let mut meta = vec![
        format!(
            r#"<span title="Created at {}">📝 Created: {}</span>"#,
            escape_attr(created_raw),
            escape_text(
                &display_timestamp(comment.created.as_deref())
                    .unwrap_or_else(|| "N/A".to_string())
            )
        ),
        format!(
            r#"<span title="Updated at {}">🔄 Updated: {}</span>"#,
            escape_attr(updated_raw),
            escape_text(&display_timestamp(comment.updated.as_deref()).unwrap_or_default())
        ),
    ];
    meta.push(if comment.was_edited() {
        r#"<span class="edited">✏️ Edited</span>"#.to_string()
    } else {
        r#"<span class="not-edited">Not edited</span>"#.to_string()
    });
    if let Some(public) = comment.public {
        let label = if public { "🌍 Public" } else { "🔒 Private" };
        meta.push(format!(r#"<span title="JSD Public">{label}</span>"#));
    }
    if let Some(visibility) = &comment.visibility {
        meta.push(format!(
            r#"<span title="Visibility">🛡️ {}</span>"#,
            escape_text(&visibility.label())
        ));
    }

    let body = match &comment.body {
        Some(body) => render_body(body),
        None => "<em>No body</em>".to_string(),
    };

    format!(
        r#"<div class="comment-card"><div class="comment-header"><span class="comment-number">#{number}</span><span class="comment-id">ID: {}</span>{self_link}</div>{author}<div class="comment-meta">{}</div>{update_author}<div class="comment-body">{body}</div></div>"#,
        escape_text(id),
        meta.concat()
    )
}

/// Formats tracker timestamps (`2024-03-01T10:00:00.000+0000`) for display,
/// returning the raw value when it cannot be parsed.
fn display_timestamp(raw: Option<&str>) -> Option<String> {
    let raw = raw.filter(|raw| !raw.is_empty())?;
    let parsed = DateTime::parse_from_str(raw, TRACKER_TIMESTAMP)
        .or_else(|_| DateTime::parse_from_rfc3339(raw));
    Some(match parsed {
        Ok(timestamp) => timestamp.format("%Y-%m-%d %H:%M %:z").to_string(),
        Err(_) => raw.to_string(),
    })
}
