//! Editable text form of data item payloads
//!
//! Drafts hold the raw JSON text the user edits. Parsing turns that text
//! into typed messages and rejects anything outside the message schema
//! before it can reach the API client.

use serde::Serialize;
use serde_json::Value;

use crate::error::{ConsoleError, Result};
use crate::model::{ContentKind, DataItem, ItemPayload, Message, Role};

/// The two text areas of the data item form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub input: String,
    pub output: String,
}

impl ItemDraft {
    /// Draft for a new item: one empty user turn in, one empty assistant turn out
    pub fn template() -> Self {
        Self {
            input: render(&[Message::text(Role::User, ContentKind::InputText, "")]),
            output: render(&[Message::text(Role::Assistant, ContentKind::InputText, "")]),
        }
    }

    /// Draft pre-filled with an existing item's messages
    pub fn from_item(item: &DataItem) -> Self {
        Self {
            input: render(&item.input_message),
            output: render(&item.output_message),
        }
    }

    /// Both text areas are required
    pub fn check_required(&self) -> Result<()> {
        if self.input.trim().is_empty() {
            return Err(ConsoleError::Validation("Input message is required".to_string()));
        }
        if self.output.trim().is_empty() {
            return Err(ConsoleError::Validation("Output message is required".to_string()));
        }
        Ok(())
    }

    /// Parse and validate both sides into a request body.
    ///
    /// The output side may be an empty array (an item awaiting its
    /// answer); the input side needs at least one message.
    pub fn to_payload(&self) -> Result<ItemPayload> {
        let input_message = parse_messages("input_message", &self.input)?;
        if input_message.is_empty() {
            return Err(ConsoleError::Validation(
                "input_message must contain at least one message".to_string(),
            ));
        }
        Ok(ItemPayload {
            input_message,
            output_message: parse_messages("output_message", &self.output)?,
        })
    }
}

/// Pretty-printed JSON with two-space indentation
pub fn render<T: Serialize>(messages: &[T]) -> String {
    // Serializing messages or plain JSON values cannot fail
    serde_json::to_string_pretty(messages).unwrap_or_else(|_| "[]".to_string())
}

/// Parse one side of a draft.
///
/// The text must be a JSON array of messages (possibly empty); every
/// message needs a known role and at least one content part, every part a
/// known type and a text. Unknown fields are rejected rather than dropped.
pub fn parse_messages(field: &str, text: &str) -> Result<Vec<Message>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ConsoleError::Validation(format!("{} is not valid JSON: {}", field, e)))?;

    let entries = value.as_array().ok_or_else(|| {
        ConsoleError::Validation(format!("{} must be a JSON array of messages", field))
    })?;

    let mut messages = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let message: Message = serde_json::from_value(entry.clone()).map_err(|e| {
            ConsoleError::Validation(format!("{}[{}]: {}", field, index, e))
        })?;

        if message.content.is_empty() {
            return Err(ConsoleError::Validation(format!(
                "{}[{}]: content must not be empty",
                field, index
            )));
        }

        messages.push(message);
    }

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = r#"[{"role":"user","content":[{"type":"input_text","text":"hi"}]}]"#;
    const OUTPUT: &str =
        r#"[{"role":"assistant","content":[{"type":"input_text","text":"hello"}]}]"#;

    fn validation_message(result: Result<Vec<Message>>) -> String {
        match result {
            Err(ConsoleError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_template_shape() {
        let draft = ItemDraft::template();
        let input = parse_messages("input_message", &draft.input).unwrap();
        let output = parse_messages("output_message", &draft.output).unwrap();

        assert_eq!(input[0].role, Role::User);
        assert_eq!(input[0].content[0].kind, ContentKind::InputText);
        assert_eq!(output[0].role, Role::Assistant);
        assert_eq!(output[0].content[0].text, "");
        assert!(draft.input.contains("\n  {\n    \"role\": \"user\""));
    }

    #[test]
    fn test_parse_render_is_stable() {
        let messages = vec![
            Message::text(Role::System, ContentKind::InputText, "be terse"),
            Message::text(Role::User, ContentKind::InputText, "what is 2+2?"),
            Message::text(Role::Assistant, ContentKind::OutputText, "4"),
        ];
        let parsed = parse_messages("input_message", &render(&messages)).unwrap();
        assert_eq!(parsed, messages);
    }

    #[test]
    fn test_draft_to_payload() {
        let draft = ItemDraft {
            input: INPUT.to_string(),
            output: OUTPUT.to_string(),
        };
        let payload = draft.to_payload().unwrap();
        assert_eq!(payload.input_message[0].content[0].text, "hi");
        assert_eq!(payload.output_message[0].content[0].text, "hello");
    }

    #[test]
    fn test_rejects_invalid_json() {
        let msg = validation_message(parse_messages("input_message", "[{\"role\": "));
        assert!(msg.starts_with("input_message is not valid JSON"));
    }

    #[test]
    fn test_rejects_non_array() {
        let msg = validation_message(parse_messages("output_message", r#"{"role":"user"}"#));
        assert!(msg.contains("must be a JSON array"));
    }

    #[test]
    fn test_empty_array_round_trips() {
        let empty: Vec<Message> = Vec::new();
        assert_eq!(render(&empty), "[]");
        assert_eq!(parse_messages("output_message", &render(&empty)), Ok(empty));
    }

    #[test]
    fn test_payload_allows_empty_output_only() {
        let draft = ItemDraft {
            input: INPUT.to_string(),
            output: "[]".to_string(),
        };
        let payload = draft.to_payload().unwrap();
        assert!(payload.output_message.is_empty());

        let draft = ItemDraft {
            input: "[]".to_string(),
            output: OUTPUT.to_string(),
        };
        match draft.to_payload() {
            Err(ConsoleError::Validation(msg)) => {
                assert_eq!(msg, "input_message must contain at least one message")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_draft_from_stored_item() {
        let item: DataItem = serde_json::from_value(serde_json::json!({
            "id": "i1",
            "project_id": "p1",
            "input_message": [
                {"role": "user", "content": [{"type": "input_text", "text": "hi"}]}
            ],
            "output_message": null
        }))
        .unwrap();

        let draft = ItemDraft::from_item(&item);
        assert_eq!(draft.output, "[]");
        let payload = draft.to_payload().unwrap();
        assert_eq!(payload.input_message[0].content[0].text, "hi");
        assert!(payload.output_message.is_empty());
    }

    #[test]
    fn test_rejects_missing_role() {
        let msg = validation_message(parse_messages(
            "input_message",
            r#"[{"content":[{"type":"input_text","text":"hi"}]}]"#,
        ));
        assert!(msg.starts_with("input_message[0]"));
        assert!(msg.contains("role"));
    }

    #[test]
    fn test_rejects_unknown_role_and_type() {
        validation_message(parse_messages(
            "input_message",
            r#"[{"role":"tool","content":[{"type":"input_text","text":"x"}]}]"#,
        ));
        validation_message(parse_messages(
            "input_message",
            r#"[{"role":"user","content":[{"type":"input_audio","text":"x"}]}]"#,
        ));
    }

    #[test]
    fn test_rejects_empty_content() {
        let msg = validation_message(parse_messages(
            "output_message",
            r#"[{"role":"assistant","content":[]}]"#,
        ));
        assert_eq!(msg, "output_message[0]: content must not be empty");
    }

    #[test]
    fn test_rejects_unknown_fields() {
        validation_message(parse_messages(
            "input_message",
            r#"[{"role":"user","name":"bob","content":[{"type":"input_text","text":"x"}]}]"#,
        ));
    }

    #[test]
    fn test_required_fields() {
        let draft = ItemDraft {
            input: "   ".to_string(),
            output: OUTPUT.to_string(),
        };
        assert!(matches!(draft.check_required(), Err(ConsoleError::Validation(_))));

        let draft = ItemDraft {
            input: INPUT.to_string(),
            output: String::new(),
        };
        assert!(matches!(draft.check_required(), Err(ConsoleError::Validation(_))));
    }
}
