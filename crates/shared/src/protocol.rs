use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ChatMessage, ContactForm};

pub type ContactRequest = ContactForm;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSubmitResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRecord {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
    #[serde(
        default,
        rename = "createdAt",
        alias = "created_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactsResponse {
    #[serde(default)]
    pub data: Vec<ContactRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(rename = "conversationHistory")]
    pub conversation_history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn chat_request_uses_backend_field_names() {
        let request = ChatRequest {
            message: "range?".into(),
            conversation_history: vec![ChatMessage::bot("hi"), ChatMessage::user("range?")],
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            json!({
                "message": "range?",
                "conversationHistory": [
                    {"type": "bot", "text": "hi"},
                    {"type": "user", "text": "range?"},
                ],
            })
        );
    }

    #[test]
    fn contact_record_accepts_mongo_style_id_and_timestamp() {
        let record: ContactRecord = serde_json::from_value(json!({
            "_id": "66a1",
            "name": "Ada",
            "email": "ada@example.com",
            "message": "Test ride?",
            "createdAt": "2024-05-01T10:00:00Z",
        }))
        .expect("deserialize");
        assert_eq!(record.id.as_deref(), Some("66a1"));
        assert_eq!(record.phone, None);
        assert!(record.created_at.is_some());
    }

    #[test]
    fn contact_submit_response_tolerates_missing_data() {
        let response: ContactSubmitResponse =
            serde_json::from_value(json!({"message": "ok"})).expect("deserialize");
        assert_eq!(response.message.as_deref(), Some("ok"));
        assert!(response.data.is_null());
    }
}
