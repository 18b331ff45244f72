//! Records exchanged with the REST store
//!
//! Projects and data items are owned by the server; the client only keeps
//! cached copies. Messages follow the multimodal chat layout
//! (`role` plus a list of typed content parts).
//!
//! Stored items keep their message arrays as raw JSON: the server accepts
//! any list, and one item with an unfamiliar part must not make the whole
//! project unreadable. The typed [`Message`] schema applies to what we send.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A named container for training data items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    #[serde(default, deserialize_with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One labeled training example belonging to a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataItem {
    pub id: String,
    pub project_id: String,
    #[serde(default, deserialize_with = "nullable_messages")]
    pub input_message: Vec<Value>,
    #[serde(default, deserialize_with = "nullable_messages")]
    pub output_message: Vec<Value>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, deserialize_with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DataItem {
    /// Text shown for the input side in item listings
    pub fn input_preview(&self) -> &str {
        first_text(&self.input_message).unwrap_or("Multimodal content")
    }

    /// Text shown for the output side in item listings
    pub fn output_preview(&self) -> &str {
        first_text(&self.output_message).unwrap_or("No output")
    }
}

/// Text of the first part of the first message, if that part is text
fn first_text(messages: &[Value]) -> Option<&str> {
    let part = messages.first()?.get("content")?.as_array()?.first()?;
    match part.get("type")?.as_str()? {
        "input_text" | "output_text" => part
            .get("text")?
            .as_str()
            .filter(|text| !text.is_empty()),
        _ => None,
    }
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

impl Message {
    pub fn text(role: Role, kind: ContentKind, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentPart {
                kind,
                text: text.into(),
            }],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One typed fragment of a message's content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub text: String,
}

/// Recognized content part types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    InputText,
    OutputText,
}

/// Body for `POST /projects/`
#[derive(Debug, Serialize)]
pub struct NewProject<'a> {
    pub name: &'a str,
}

/// Body for `PATCH /projects/{id}`
#[derive(Debug, Default, Serialize)]
pub struct ProjectPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

/// Body for creating or updating a data item
#[derive(Debug, Serialize)]
pub struct ItemPayload {
    pub input_message: Vec<Message>,
    pub output_message: Vec<Message>,
}

fn nullable_messages<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts RFC 3339 or a naive ISO-8601 timestamp (read as UTC)
fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<String>::deserialize(deserializer)? {
        Some(raw) => raw,
        None => return Ok(None),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}
