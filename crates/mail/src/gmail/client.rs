//! Gmail API HTTP client
//!
//! [`MailProvider`] is the outbound surface the fetcher depends on: list
//! message references, then get each message in full. [`GmailClient`]
//! implements it with synchronous HTTP (ureq) so it stays executor-agnostic
//! and can be driven from a plain thread pool.

use log::debug;
use std::time::Duration;

use super::api::{GmailMessage, ListLabelsResponse, ListMessagesResponse, MessageRef};
use crate::error::FetchError;
use crate::models::{Label, MessageId};

/// A mail provider the fetcher can list and fetch messages from
pub trait MailProvider: Send + Sync {
    /// List up to `max_results` message references, most recent first
    fn list_messages(
        &self,
        access_token: &str,
        max_results: usize,
        label: Option<&str>,
    ) -> Result<Vec<MessageRef>, FetchError>;

    /// Fetch the full representation of one message
    fn get_message(&self, access_token: &str, id: &MessageId) -> Result<GmailMessage, FetchError>;
}

/// Gmail REST client
pub struct GmailClient {
    agent: ureq::Agent,
}

impl GmailClient {
    /// Gmail API base URL
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    /// Create a client whose requests each time out after `request_timeout`
    pub fn new(request_timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(request_timeout))
            .build();

        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }

    /// List the mailbox's labels with their unread counts
    pub fn list_labels(&self, access_token: &str) -> Result<Vec<Label>, FetchError> {
        let url = format!("{}/users/me/labels", Self::BASE_URL);
        let list: ListLabelsResponse = self.get_json("List labels", &url, access_token, &[])?;

        // The list endpoint omits counts; fetch each label for them
        let mut labels = Vec::new();
        for label in list.labels.unwrap_or_default() {
            let url = format!(
                "{}/users/me/labels/{}",
                Self::BASE_URL,
                urlencoding::encode(&label.id)
            );
            let detail: super::api::GmailLabel =
                self.get_json("Get label", &url, access_token, &[])?;
            labels.push(detail.into_label());
        }

        Ok(labels)
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        url: &str,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let mut request = self
            .agent
            .get(url)
            .header("Authorization", &format!("Bearer {}", access_token));
        for (key, value) in query {
            request = request.query(*key, value);
        }

        let mut response = request.call().map_err(|e| provider_error(operation, e))?;

        response
            .body_mut()
            .read_json()
            .map_err(|e| FetchError::provider(operation, None, format!("invalid response: {}", e)))
    }
}

impl MailProvider for GmailClient {
    fn list_messages(
        &self,
        access_token: &str,
        max_results: usize,
        label: Option<&str>,
    ) -> Result<Vec<MessageRef>, FetchError> {
        let url = format!("{}/users/me/messages", Self::BASE_URL);
        let mut query = vec![("maxResults", max_results.to_string())];
        if let Some(label) = label {
            query.push(("labelIds", label.to_string()));
        }

        let list: ListMessagesResponse = self.get_json("List messages", &url, access_token, &query)?;
        let refs = list.messages.unwrap_or_default();
        debug!(
            "Listed {} messages (estimate {:?})",
            refs.len(),
            list.result_size_estimate
        );
        Ok(refs)
    }

    fn get_message(&self, access_token: &str, id: &MessageId) -> Result<GmailMessage, FetchError> {
        let url = format!(
            "{}/users/me/messages/{}",
            Self::BASE_URL,
            urlencoding::encode(id.as_str())
        );
        let operation = format!("Get message {}", id);
        self.get_json(
            &operation,
            &url,
            access_token,
            &[("format", "full".to_string())],
        )
    }
}

/// Map a ureq failure onto the fetch error taxonomy
fn provider_error(operation: &str, error: ureq::Error) -> FetchError {
    match error {
        ureq::Error::StatusCode(status) => {
            let message = match status {
                401 => "access token rejected",
                403 => "access forbidden",
                404 => "not found",
                429 => "rate limited",
                500..=599 => "provider error",
                _ => "unexpected status",
            };
            FetchError::provider(operation, Some(status), message)
        }
        other => FetchError::provider(operation, None, other.to_string()),
    }
}
