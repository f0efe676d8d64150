use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReference {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, rename = "emailAddress")]
    pub email: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub avatar_urls: BTreeMap<String, String>,
}

impl UserReference {
    #[cfg(test)]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            display_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("Unknown")
    }

    /// Uppercased first character of the display name.
    pub fn initial(&self) -> String {
        self.name()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }

    pub fn avatar_url(&self) -> Option<&str> {
        ["32x32", "24x24"]
            .iter()
            .find_map(|size| self.avatar_urls.get(*size))
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }
}
