//! Errors surfaced by the mail fetch path

use std::time::Duration;

/// Failure of a mail fetch.
///
/// Malformed message fields are never errors; the normalizer resolves them
/// to defaults. Only session problems and provider failures end up here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// No session, or a session without a bearer token
    #[error("Authentication required: {reason}")]
    Authentication { reason: String },

    /// The token does not carry every required scope
    #[error("Missing required scopes: {}", .missing_scopes.join(", "))]
    Authorization { missing_scopes: Vec<String> },

    /// Network or provider failure while listing or fetching messages
    #[error("{operation} failed{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    ProviderRequest {
        operation: String,
        status: Option<u16>,
        message: String,
    },

    /// The batch deadline expired before every message was requested
    #[error("Mail fetch exceeded its deadline after {}ms", .elapsed.as_millis())]
    DeadlineExceeded { elapsed: Duration },
}

impl FetchError {
    /// Build a provider failure for `operation`
    pub fn provider(
        operation: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::ProviderRequest {
            operation: operation.into(),
            status,
            message: message.into(),
        }
    }

    /// True for failures caused by the session rather than the provider
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::Authorization { .. })
    }
}
