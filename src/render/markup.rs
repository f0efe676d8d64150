//! Escaping helpers shared by every renderer.

/// Escapes text content: `&`, `<` and `>`.
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// Escapes a value placed inside a double- or single-quoted attribute.
pub fn escape_attr(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Link target safe to emit: http(s), mailto, relative paths and fragments
/// pass through; anything else, including a missing href, becomes `#`.
pub fn safe_href(href: Option<&str>) -> String {
    let Some(href) = href.map(str::trim).filter(|href| !href.is_empty()) else {
        return "#".to_string();
    };

    let lower = href.to_ascii_lowercase();
    let allowed = lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || lower.starts_with('/')
        || lower.starts_with('#')
        || !lower.contains(':');

    if allowed {
        escape_attr(href)
    } else {
        "#".to_string()
    }
}
