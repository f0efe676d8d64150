use crate::domain::user::UserReference;
use crate::render::markup::{escape_attr, escape_text};

/// Avatar (or initial), label, name and a row of metadata chips. A chip is
/// emitted only when its field carries a value.
pub fn render_user(user: &UserReference, label: &str) -> String {
    let name = user.name();

    let avatar = match user.avatar_url() {
        Some(url) => format!(
            r#"<img class="avatar" src="{}" alt="{}">"#,
            escape_attr(url),
            escape_attr(name)
        ),
        None => format!(
            r#"<div class="avatar avatar-initial">{}</div>"#,
            escape_text(&user.initial())
        ),
    };

    let mut chips = Vec::new();
    if let Some(email) = non_empty(&user.email) {
        chips.push(chip("Email", &format!("📧 {}", escape_text(email))));
    }
    if let Some(account_id) = non_empty(&user.account_id) {
        chips.push(chip("Account ID", &format!("🆔 {}", escape_text(account_id))));
    }
    if let Some(active) = user.active {
        let state = if active { "🟢 Active" } else { "🔴 Inactive" };
        chips.push(chip("Active Status", state));
    }
    if let Some(time_zone) = non_empty(&user.time_zone) {
        chips.push(chip("Timezone", &format!("🌐 {}", escape_text(time_zone))));
    }
    if let Some(account_type) = non_empty(&user.account_type) {
        chips.push(chip("Account Type", &format!("👤 {}", escape_text(account_type))));
    }

    format!(
        r#"<div class="user-card">{avatar}<div class="user-details"><div class="user-label">{}</div><div class="user-name">{}</div><div class="user-chips">{}</div></div></div>"#,
        escape_text(label),
        escape_text(name),
        chips.concat()
    )
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}

fn chip(title: &str, content: &str) -> String {
    format!(r#"<span class="chip" title="{title}">{content}</span>"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_initial_when_no_avatar() {
        let html = render_user(&UserReference::named("zoe <admin>"), "Author");
        assert!(html.contains(r#"<div class="avatar avatar-initial">Z</div>"#));
        assert!(html.contains("zoe &lt;admin&gt;"));
        assert!(html.contains(r#"<div class="user-label">Author</div>"#));
        assert!(html.contains(r#"<div class="user-chips"></div>"#));
        assert!(!html.contains(r#"class="chip""#));
    }

    #[test]
    fn renders_only_present_chips() {
        let mut user = UserReference::named("Zoe");
        user.email = Some("zoe@example.com".to_string());
        user.active = Some(false);
        user.time_zone = Some(String::new());
        user.avatar_urls
            .insert("32x32".to_string(), "https://cdn/z.png".to_string());

        let html = render_user(&user, "Update Author");
        assert!(html.contains(r#"<img class="avatar" src="https://cdn/z.png" alt="Zoe">"#));
        assert!(html.contains("📧 zoe@example.com"));
        assert!(html.contains("🔴 Inactive"));
        assert!(!html.contains("Timezone"));
        assert!(!html.contains("Account ID"));
        assert_eq!(html.matches(r#"class="chip""#).count(), 2);
    }
}
