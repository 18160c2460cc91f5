//! Normalized mail record consumed by the presentation layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::LabelId;

/// Provider message identifier (Gmail message ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sender of a mail as shown in the list and viewer
///
/// When the `From` header has no angle-bracket address, `name` and `email`
/// both hold the raw header value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub name: String,
    pub email: String,
}

impl Sender {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Name for display, falling back to the address when the name is blank
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// A flat, UI-ready mail record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMail {
    pub id: MessageId,
    /// False iff the provider labels include `UNREAD`
    pub read: bool,
    pub subject: String,
    /// Selected body representation, HTML preferred
    pub body: String,
    pub from: Sender,
    /// Parsed `Date` header, or the caller-supplied fallback
    pub date: DateTime<Utc>,
    /// Whether `date` came from the message itself
    ///
    /// Never serialized, so a record read back from JSON cannot vouch for
    /// its date and gets `false`.
    #[serde(skip_serializing, default)]
    pub date_parsed: bool,
    /// Provider label ids, in provider order
    pub labels: Vec<String>,
}

impl NormalizedMail {
    pub fn builder(id: impl Into<MessageId>) -> NormalizedMailBuilder {
        NormalizedMailBuilder::new(id.into())
    }

    /// Whether the mail carries `label` (ASCII case-insensitive)
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l.eq_ignore_ascii_case(label))
    }

    pub fn is_unread(&self) -> bool {
        !self.read
    }
}

/// Builder for NormalizedMail, used by the normalizer and the sample mailbox
pub struct NormalizedMailBuilder {
    id: MessageId,
    read: bool,
    subject: Option<String>,
    body: String,
    from: Option<Sender>,
    date: Option<DateTime<Utc>>,
    fallback_date: Option<DateTime<Utc>>,
    labels: Vec<String>,
}

impl NormalizedMailBuilder {
    fn new(id: MessageId) -> Self {
        Self {
            id,
            read: true,
            subject: None,
            body: String::new(),
            from: None,
            date: None,
            fallback_date: None,
            labels: Vec::new(),
        }
    }

    pub fn read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn from(mut self, from: Sender) -> Self {
        self.from = Some(from);
        self
    }

    pub fn date(mut self, date: Option<DateTime<Utc>>) -> Self {
        self.date = date;
        self
    }

    /// Timestamp used when no date was set
    pub fn fallback_date(mut self, fallback: DateTime<Utc>) -> Self {
        self.fallback_date = Some(fallback);
        self
    }

    /// Replace the labels; `read` is derived from the presence of `UNREAD`
    pub fn labels(mut self, labels: Vec<String>) -> Self {
        self.read = !labels.iter().any(|l| l == LabelId::UNREAD);
        self.labels = labels;
        self
    }

    pub fn build(self) -> NormalizedMail {
        let date_parsed = self.date.is_some();
        NormalizedMail {
            id: self.id,
            read: self.read,
            subject: self
                .subject
                .unwrap_or_else(|| NO_SUBJECT.to_string()),
            body: self.body,
            from: self
                .from
                .unwrap_or_else(|| Sender::new(UNKNOWN_SENDER, UNKNOWN_SENDER)),
            date: self
                .date
                .or(self.fallback_date)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            date_parsed,
            labels: self.labels,
        }
    }
}

/// Subject used when the `Subject` header is missing
pub const NO_SUBJECT: &str = "(No Subject)";

/// Sender used when the `From` header is missing
pub const UNKNOWN_SENDER: &str = "Unknown Sender";
