//! Mailbox fetch implementation

use chrono::Utc;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::HashSet;
use std::time::Instant;

use crate::config::{FailurePolicy, FetchOptions};
use crate::error::FetchError;
use crate::gmail::{GMAIL_READONLY_SCOPE, MailProvider, Session, normalize_message};
use crate::models::{MessageId, NormalizedMail};

/// A message that could not be fetched under [`FailurePolicy::Isolate`]
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub id: MessageId,
    pub error: FetchError,
}

/// Result of a mail fetch
#[derive(Debug, Default, Clone)]
pub struct FetchReport {
    /// Normalized mails, in the provider's listing order
    pub mails: Vec<NormalizedMail>,
    /// Messages skipped because their fetch failed
    pub failures: Vec<FetchFailure>,
    /// Number of references the list call returned
    pub listed: usize,
    /// Duration of the whole fetch
    pub duration_ms: u64,
}

/// Fetch and normalize the most recent page of mail
///
/// The session is checked before any network call. One list request is
/// followed by one get request per listed message, issued from a pool of
/// at most `options.max_concurrency` threads. Results keep the listing
/// order regardless of completion order.
///
/// # Arguments
/// * `provider` - Mail provider to read from
/// * `session` - Session holding the bearer token and granted scopes
/// * `options` - Page size, concurrency, deadline and failure policy
pub fn fetch_mail(
    provider: &dyn MailProvider,
    session: &Session,
    options: &FetchOptions,
) -> Result<FetchReport, FetchError> {
    let start = Instant::now();
    let access_token = session.authorize(&[GMAIL_READONLY_SCOPE])?;

    // 1. List message references
    let refs = provider.list_messages(
        access_token,
        options.effective_page_size(),
        options.label_filter.as_deref(),
    )?;
    let listed = refs.len();

    // 2. Drop references without an id, and duplicates
    let mut seen = HashSet::new();
    let ids: Vec<MessageId> = refs
        .into_iter()
        .filter_map(|r| r.id)
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .map(MessageId::new)
        .collect();

    if ids.is_empty() {
        return Ok(FetchReport {
            listed,
            duration_ms: start.elapsed().as_millis() as u64,
            ..FetchReport::default()
        });
    }

    // 3. Fetch and normalize, bounded fan-out
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.effective_concurrency())
        .thread_name(|i| format!("hermes-fetch-{}", i))
        .build()
        .map_err(|e| FetchError::provider("Start fetch workers", None, e.to_string()))?;

    // Shared by every message without a usable Date header
    let fallback_date = Utc::now();
    let deadline = options.batch_deadline();

    let fetch_one = |id: &MessageId| -> Result<NormalizedMail, FetchError> {
        let elapsed = start.elapsed();
        if elapsed >= deadline {
            return Err(FetchError::DeadlineExceeded { elapsed });
        }

        debug!("Fetching message {}", id);
        let mut message = provider.get_message(access_token, id)?;
        if message.id.is_empty() {
            message.id = id.as_str().to_string();
        }
        Ok(normalize_message(message, fallback_date))
    };

    let mut report = FetchReport {
        listed,
        ..FetchReport::default()
    };

    match options.failure_policy {
        FailurePolicy::Abort => {
            report.mails = pool.install(|| {
                ids.par_iter()
                    .map(|id| fetch_one(id))
                    .collect::<Result<Vec<_>, _>>()
            })?;
        }
        FailurePolicy::Isolate => {
            let results: Vec<Result<NormalizedMail, FetchError>> =
                pool.install(|| ids.par_iter().map(|id| fetch_one(id)).collect());

            for (id, result) in ids.into_iter().zip(results) {
                match result {
                    Ok(mail) => report.mails.push(mail),
                    Err(error) => {
                        warn!("Skipping message {}: {}", id, error);
                        report.failures.push(FetchFailure { id, error });
                    }
                }
            }
        }
    }

    report.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Fetched {} of {} listed messages in {}ms ({} failed)",
        report.mails.len(),
        report.listed,
        report.duration_ms,
        report.failures.len()
    );

    Ok(report)
}
