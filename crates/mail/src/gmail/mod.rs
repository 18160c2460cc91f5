//! Gmail API integration
//!
//! This module provides:
//! - The session boundary and OAuth2 authentication flow
//! - The provider trait and its Gmail HTTP implementation
//! - Normalization of Gmail messages into flat mail records

mod auth;
mod client;
mod normalize;

pub use auth::{GMAIL_READONLY_SCOPE, GmailAuth, Session};
pub use client::{GmailClient, MailProvider};
pub use normalize::{decode_base64_body, extract_date, normalize_message, parse_sender, select_body};

/// Gmail API response types
pub mod api {
    use serde::{Deserialize, Serialize};

    /// Response from listing messages
    #[derive(Debug, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListMessagesResponse {
        pub messages: Option<Vec<MessageRef>>,
        pub next_page_token: Option<String>,
        pub result_size_estimate: Option<u32>,
    }

    /// Response from listing labels
    #[derive(Debug, Default, Deserialize)]
    pub struct ListLabelsResponse {
        pub labels: Option<Vec<GmailLabel>>,
    }

    /// A Gmail label as returned by the labels endpoints
    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GmailLabel {
        pub id: String,
        pub name: String,
        /// "system" or "user"
        #[serde(rename = "type")]
        pub label_type: Option<String>,
        pub messages_unread: Option<u32>,
    }

    impl GmailLabel {
        /// Convert to a sidebar label; system names like `INBOX` become `Inbox`
        pub fn into_label(self) -> crate::models::Label {
            use crate::models::Label;

            let unread = self.messages_unread.unwrap_or(0);
            if self.label_type.as_deref() == Some("system") {
                let mut chars = self.name.chars();
                let name: String = match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                    None => String::new(),
                };
                Label::system(self.id, name).with_unread_count(unread)
            } else {
                Label::custom(self.id, self.name).with_unread_count(unread)
            }
        }
    }

    /// Reference to a message returned by a list call
    #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessageRef {
        #[serde(default)]
        pub id: Option<String>,
        #[serde(default)]
        pub thread_id: Option<String>,
    }

    impl MessageRef {
        pub fn new(id: impl Into<String>) -> Self {
            Self {
                id: Some(id.into()),
                thread_id: None,
            }
        }
    }

    /// Full message from the Gmail API (`format=full`)
    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GmailMessage {
        #[serde(default)]
        pub id: String,
        pub thread_id: Option<String>,
        pub label_ids: Option<Vec<String>>,
        pub snippet: Option<String>,
        pub internal_date: Option<String>,
        pub payload: Option<MessagePayload>,
    }

    /// Top-level MIME part carrying the message headers
    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessagePayload {
        pub headers: Option<Vec<Header>>,
        pub body: Option<MessageBody>,
        pub parts: Option<Vec<MessagePart>>,
        pub mime_type: Option<String>,
    }

    /// Email header (name-value pair)
    #[derive(Debug, Clone, Deserialize, Serialize)]
    pub struct Header {
        pub name: String,
        pub value: String,
    }

    impl Header {
        pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                value: value.into(),
            }
        }
    }

    /// Part payload, base64url encoded
    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessageBody {
        pub size: Option<u32>,
        pub data: Option<String>,
        pub attachment_id: Option<String>,
    }

    impl MessageBody {
        pub fn with_data(data: impl Into<String>) -> Self {
            Self {
                data: Some(data.into()),
                ..Self::default()
            }
        }
    }

    /// Nested MIME part
    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessagePart {
        pub part_id: Option<String>,
        pub mime_type: Option<String>,
        pub filename: Option<String>,
        pub headers: Option<Vec<Header>>,
        pub body: Option<MessageBody>,
        pub parts: Option<Vec<MessagePart>>,
    }

    impl MessagePart {
        /// Leaf part with base64-encoded `data`
        pub fn leaf(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
            Self {
                mime_type: Some(mime_type.into()),
                body: Some(MessageBody::with_data(data)),
                ..Self::default()
            }
        }

        /// Container part such as `multipart/alternative`
        pub fn multipart(mime_type: impl Into<String>, parts: Vec<MessagePart>) -> Self {
            Self {
                mime_type: Some(mime_type.into()),
                parts: Some(parts),
                ..Self::default()
            }
        }
    }

}
