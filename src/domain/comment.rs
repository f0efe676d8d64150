use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::document::Body;
use crate::domain::user::UserReference;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Comment {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default, rename = "self")]
    pub self_url: Option<String>,
    #[serde(default)]
    pub author: Option<UserReference>,
    #[serde(default, rename = "updateAuthor")]
    pub update_author: Option<UserReference>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub body: Option<Body>,
    #[serde(default, rename = "jsdPublic")]
    pub public: Option<bool>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Visibility {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: String,
}

impl Visibility {
    pub fn label(&self) -> String {
        format!("{}: {}", self.kind, self.value)
    }
}

impl Comment {
    pub fn was_edited(&self) -> bool {
        match (&self.created, &self.updated) {
            (Some(created), Some(updated)) => created != updated,
            _ => false,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(id)) => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}
