//! Integration tests for the mail crate
//!
//! These drive the complete flow from a provider listing through
//! normalization to the mailbox queries, using Gmail-shaped JSON.

use std::collections::HashMap;
use std::sync::Mutex;

use base64::prelude::*;
use chrono::{TimeZone, Utc};
use mail::gmail::api::{GmailMessage, MessageRef};
use mail::{
    FailurePolicy, FetchError, FetchOptions, GMAIL_READONLY_SCOPE, MailProvider, MessageId,
    Session, fetch_mail, filter_by_label, normalize_message, unread_count,
};

/// Provider backed by canned Gmail JSON documents
struct JsonProvider {
    order: Vec<String>,
    messages: HashMap<String, String>,
    get_calls: Mutex<usize>,
}

impl JsonProvider {
    fn new(messages: Vec<(&str, String)>) -> Self {
        Self {
            order: messages.iter().map(|(id, _)| id.to_string()).collect(),
            messages: messages
                .into_iter()
                .map(|(id, json)| (id.to_string(), json))
                .collect(),
            get_calls: Mutex::new(0),
        }
    }
}

impl MailProvider for JsonProvider {
    fn list_messages(
        &self,
        _access_token: &str,
        max_results: usize,
        _label: Option<&str>,
    ) -> Result<Vec<MessageRef>, FetchError> {
        let json = serde_json::json!({
            "messages": self.order.iter().take(max_results)
                .map(|id| serde_json::json!({ "id": id, "threadId": id }))
                .collect::<Vec<_>>(),
            "resultSizeEstimate": self.order.len(),
        });
        let list: mail::gmail::api::ListMessagesResponse =
            serde_json::from_value(json).expect("valid list json");
        Ok(list.messages.unwrap_or_default())
    }

    fn get_message(&self, _access_token: &str, id: &MessageId) -> Result<GmailMessage, FetchError> {
        *self.get_calls.lock().unwrap() += 1;
        let json = self
            .messages
            .get(id.as_str())
            .ok_or_else(|| FetchError::provider(format!("Get message {}", id), Some(404), "not found"))?;
        Ok(serde_json::from_str(json).expect("valid message json"))
    }
}

fn b64(text: &str) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(text)
}

fn jane_message() -> String {
    serde_json::json!({
        "id": "jane",
        "threadId": "jane",
        "labelIds": ["INBOX"],
        "snippet": "hello",
        "payload": {
            "mimeType": "text/html",
            "headers": [
                { "name": "From", "value": "\"Jane Doe\" <jane@x.com>" },
                { "name": "Subject", "value": "Hi" },
                { "name": "Date", "value": "Mon, 2 Jun 2025 10:30:00 +0000" }
            ],
            "body": { "size": 12, "data": b64("<p>hello</p>") }
        }
    })
    .to_string()
}

fn multipart_message() -> String {
    serde_json::json!({
        "id": "multi",
        "labelIds": ["UNREAD", "INBOX", "CATEGORY_UPDATES"],
        "payload": {
            "mimeType": "multipart/mixed",
            "headers": [
                { "name": "from", "value": "news@example.com" },
                { "name": "Date", "value": "Sun, 1 Jun 2025 08:00:00 -0500 (CDT)" }
            ],
            "parts": [
                {
                    "mimeType": "multipart/alternative",
                    "parts": [
                        { "mimeType": "text/plain", "body": { "data": b64("plain news") } },
                        { "mimeType": "text/html", "body": { "data": b64("<h1>news</h1>") } }
                    ]
                },
                { "mimeType": "image/png", "filename": "logo.png", "body": { "attachmentId": "a1" } }
            ]
        }
    })
    .to_string()
}

fn empty_message() -> String {
    r#"{ "id": "empty" }"#.to_string()
}

fn session() -> Session {
    Session::new("token", &format!("openid email {}", GMAIL_READONLY_SCOPE))
}

#[test]
fn test_end_to_end_fetch() {
    let provider = JsonProvider::new(vec![
        ("jane", jane_message()),
        ("multi", multipart_message()),
        ("empty", empty_message()),
    ]);

    let report = fetch_mail(&provider, &session(), &FetchOptions::default()).unwrap();
    assert_eq!(report.listed, 3);
    assert!(report.failures.is_empty());

    let ids: Vec<_> = report.mails.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["jane", "multi", "empty"]);

    let jane = &report.mails[0];
    assert_eq!(jane.from.name, "Jane Doe");
    assert_eq!(jane.from.email, "jane@x.com");
    assert_eq!(jane.subject, "Hi");
    assert!(jane.read);
    assert_eq!(jane.body, "<p>hello</p>");
    assert_eq!(jane.labels, vec!["INBOX".to_string()]);
    assert_eq!(jane.date, Utc.with_ymd_and_hms(2025, 6, 2, 10, 30, 0).unwrap());

    let multi = &report.mails[1];
    assert!(!multi.read);
    assert_eq!(multi.body, "<h1>news</h1>");
    assert_eq!(multi.from.name, "news@example.com");
    assert_eq!(multi.from.email, "news@example.com");
    assert_eq!(multi.subject, "(No Subject)");
    assert_eq!(multi.date, Utc.with_ymd_and_hms(2025, 6, 1, 13, 0, 0).unwrap());

    let empty = &report.mails[2];
    assert_eq!(empty.from.name, "Unknown Sender");
    assert_eq!(empty.from.email, "Unknown Sender");
    assert_eq!(empty.subject, "(No Subject)");
    assert!(empty.read);
    assert_eq!(empty.body, "");
    assert!(empty.labels.is_empty());
    assert!(!empty.date_parsed);

    // The fetched batch feeds the mailbox queries directly
    assert_eq!(unread_count(&report.mails), 1);
    assert_eq!(filter_by_label(&report.mails, "inbox").len(), 2);
}

#[test]
fn test_serialized_output_matches_display_record() {
    let msg: GmailMessage = serde_json::from_str(&jane_message()).unwrap();
    let mail = normalize_message(msg, Utc::now());

    let json = serde_json::to_value(&mail).unwrap();
    assert_eq!(json["from"]["name"], "Jane Doe");
    assert_eq!(json["date"], "2025-06-02T10:30:00Z");
    assert_eq!(json["read"], true);
    assert!(json.get("date_parsed").is_none());
}

#[test]
fn test_missing_message_fails_batch_by_default() {
    let mut provider = JsonProvider::new(vec![("jane", jane_message())]);
    provider.order.push("ghost".to_string());

    let err = fetch_mail(&provider, &session(), &FetchOptions::default()).unwrap_err();
    assert_eq!(err, FetchError::provider("Get message ghost", Some(404), "not found"));
}

#[test]
fn test_missing_message_isolated() {
    let mut provider = JsonProvider::new(vec![("jane", jane_message())]);
    provider.order.insert(0, "ghost".to_string());

    let options = FetchOptions {
        failure_policy: FailurePolicy::Isolate,
        max_concurrency: 2,
        ..FetchOptions::default()
    };
    let report = fetch_mail(&provider, &session(), &options).unwrap();

    assert_eq!(report.mails.len(), 1);
    assert_eq!(report.mails[0].id.as_str(), "jane");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].id.as_str(), "ghost");
    assert_eq!(*provider.get_calls.lock().unwrap(), 2);
}

#[test]
fn test_empty_mailbox() {
    let provider = JsonProvider::new(vec![]);
    let report = fetch_mail(&provider, &session(), &FetchOptions::default()).unwrap();

    assert!(report.mails.is_empty());
    assert_eq!(report.listed, 0);
    assert_eq!(*provider.get_calls.lock().unwrap(), 0);
}

#[test]
fn test_unauthorized_session_never_reaches_provider() {
    let provider = JsonProvider::new(vec![("jane", jane_message())]);

    let err = fetch_mail(&provider, &Session::new("token", "openid"), &FetchOptions::default())
        .unwrap_err();
    assert!(err.is_auth_error());
    assert!(err.to_string().contains(GMAIL_READONLY_SCOPE));
    assert_eq!(*provider.get_calls.lock().unwrap(), 0);
}

#[test]
fn test_normalization_is_idempotent() {
    let fallback = Utc::now();
    let first = normalize_message(serde_json::from_str(&multipart_message()).unwrap(), fallback);
    let second = normalize_message(serde_json::from_str(&multipart_message()).unwrap(), fallback);
    assert_eq!(first, second);
}
