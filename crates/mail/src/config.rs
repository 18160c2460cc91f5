//! Configuration for Gmail access and mail fetching
//!
//! OAuth credentials are loaded from (in order of priority):
//! 1. Compile-time embedded credentials (for release builds)
//! 2. JSON file in the Google Cloud Console format
//! 3. Runtime environment variables
//!
//! Fetch settings live in `fetch.json` and default sensibly when absent.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Credentials filename in the Hermes config directory
const CREDENTIALS_FILE: &str = "google-credentials.json";

/// Fetch settings filename in the Hermes config directory
const FETCH_OPTIONS_FILE: &str = "fetch.json";

/// OAuth client credentials for the Gmail API
#[derive(Debug, Clone)]
pub struct GmailCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Google Cloud Console credential file
#[derive(Deserialize)]
struct GoogleCredentialFile {
    installed: Option<ClientSection>,
    web: Option<ClientSection>,
}

#[derive(Deserialize)]
struct ClientSection {
    client_id: String,
    client_secret: String,
}

impl GmailCredentials {
    /// Load credentials from the first available source
    pub fn load() -> Result<Self> {
        if let Some(creds) = Self::from_compile_time() {
            return Ok(creds);
        }

        if config::config_exists(CREDENTIALS_FILE) {
            let creds: GoogleCredentialFile = config::load_json(CREDENTIALS_FILE)?;
            return Self::from_credential_file(creds);
        }

        Self::from_env()
    }

    /// Credentials embedded at build time.
    /// Build with: GOOGLE_CLIENT_ID=xxx GOOGLE_CLIENT_SECRET=yyy cargo build --release
    pub fn from_compile_time() -> Option<Self> {
        let client_id = option_env!("GOOGLE_CLIENT_ID")?;
        let client_secret = option_env!("GOOGLE_CLIENT_SECRET")?;

        if client_id.is_empty() || client_secret.is_empty() {
            return None;
        }

        Some(Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }

    /// Load credentials from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let creds: GoogleCredentialFile = config::load_json_file(path)?;
        Self::from_credential_file(creds)
    }

    /// Parse credentials from a JSON string (Google Cloud Console format)
    pub fn from_json(json: &str) -> Result<Self> {
        let creds: GoogleCredentialFile =
            serde_json::from_str(json).context("Failed to parse credentials JSON")?;
        Self::from_credential_file(creds)
    }

    fn from_credential_file(creds: GoogleCredentialFile) -> Result<Self> {
        // Desktop ("installed") and server ("web") clients share a layout
        let section = creds
            .installed
            .or(creds.web)
            .context("Credentials file missing 'installed' or 'web' section")?;

        Ok(Self {
            client_id: section.client_id,
            client_secret: section.client_secret,
        })
    }

    /// Load credentials from environment variables
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("GMAIL_CLIENT_ID")
            .context("GMAIL_CLIENT_ID environment variable not set")?;
        let client_secret = std::env::var("GMAIL_CLIENT_SECRET")
            .context("GMAIL_CLIENT_SECRET environment variable not set")?;

        Ok(Self {
            client_id,
            client_secret,
        })
    }

    /// Default credentials file path (~/.config/hermes/google-credentials.json)
    pub fn default_credentials_path() -> Option<PathBuf> {
        config::config_path(CREDENTIALS_FILE)
    }
}

/// What to do when fetching one message of a batch fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Fail the whole batch on the first failed message
    #[default]
    Abort,
    /// Skip failed messages and report them alongside the results
    Isolate,
}

/// Settings for a single mail fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Number of message references to list (Gmail caps this at 500)
    pub page_size: usize,
    /// Maximum number of message fetches in flight
    pub max_concurrency: usize,
    /// Timeout for each HTTP request
    pub request_timeout_secs: u64,
    /// Deadline for the whole fetch, listing included
    pub batch_deadline_secs: u64,
    pub failure_policy: FailurePolicy,
    /// Restrict the listing to one provider label (e.g. "INBOX")
    pub label_filter: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_concurrency: 8,
            request_timeout_secs: 30,
            batch_deadline_secs: 120,
            failure_policy: FailurePolicy::Abort,
            label_filter: None,
        }
    }
}

impl FetchOptions {
    /// Gmail's upper bound for `maxResults`
    pub const MAX_PAGE_SIZE: usize = 500;

    /// Load `fetch.json` from the Hermes config directory, or defaults
    pub fn load() -> Result<Self> {
        config::load_json_or_default(FETCH_OPTIONS_FILE)
    }

    /// Page size clamped to what the provider accepts
    pub fn effective_page_size(&self) -> usize {
        self.page_size.clamp(1, Self::MAX_PAGE_SIZE)
    }

    /// Concurrency limit, never below one
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn batch_deadline(&self) -> Duration {
        Duration::from_secs(self.batch_deadline_secs)
    }
}
