//! Mail crate - Business logic for Hermes Mail
//!
//! This crate provides the platform-independent half of the client:
//! - Domain models (NormalizedMail, Sender, Label, Account)
//! - Gmail session handling, OAuth flow and API client
//! - Normalization of Gmail messages into flat display records
//! - A bounded, order-preserving mail fetcher
//! - Mailbox queries and a static sample mailbox for the UI
//!
//! Nothing here holds global state: tokens and fetch settings are always
//! passed in explicitly.

pub mod config;
pub mod error;
pub mod fetch;
pub mod gmail;
pub mod models;
pub mod query;
pub mod sample;

pub use config::{FailurePolicy, FetchOptions, GmailCredentials};
pub use error::FetchError;
pub use fetch::{FetchFailure, FetchReport, fetch_mail};
pub use gmail::{GMAIL_READONLY_SCOPE, GmailAuth, GmailClient, MailProvider, Session, normalize_message};
pub use models::{Account, Label, LabelId, LabelKind, MessageId, NormalizedMail, Sender, label_sort_order};
pub use query::{
    display_labels, filter_by_label, find_mail, label_unread_counts, search, sort_newest_first,
    unread_count,
};
pub use sample::{sample_accounts, sample_labels, sample_mails};
