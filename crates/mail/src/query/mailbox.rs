//! Mailbox queries for list and sidebar views
//!
//! All queries work on an in-memory slice of normalized mails; nothing here
//! touches the network.

use crate::models::{Label, LabelId, MessageId, NormalizedMail};

/// Mails carrying `label`, or every mail for the `all` pseudo-label
///
/// Matching ignores ASCII case, so the sidebar's `inbox` matches Gmail's
/// `INBOX`.
pub fn filter_by_label<'a>(mails: &'a [NormalizedMail], label: &str) -> Vec<&'a NormalizedMail> {
    if label.eq_ignore_ascii_case(LabelId::ALL) {
        return mails.iter().collect();
    }
    mails.iter().filter(|m| m.has_label(label)).collect()
}

/// Number of unread mails
pub fn unread_count<'a>(mails: impl IntoIterator<Item = &'a NormalizedMail>) -> usize {
    mails.into_iter().filter(|m| m.is_unread()).count()
}

/// Labels with `unread_count` recomputed from `mails`
pub fn label_unread_counts(labels: &[Label], mails: &[NormalizedMail]) -> Vec<Label> {
    labels
        .iter()
        .map(|label| {
            let count = unread_count(filter_by_label(mails, label.id.as_str()));
            label.clone().with_unread_count(count as u32)
        })
        .collect()
}

/// Look up a mail by id
pub fn find_mail<'a>(mails: &'a [NormalizedMail], id: &MessageId) -> Option<&'a NormalizedMail> {
    mails.iter().find(|m| &m.id == id)
}

/// Case-insensitive substring search over subject, sender and body
///
/// An empty or blank query matches everything.
pub fn search<'a>(mails: &'a [NormalizedMail], query: &str) -> Vec<&'a NormalizedMail> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return mails.iter().collect();
    }

    mails
        .iter()
        .filter(|m| {
            [&m.subject, &m.from.name, &m.from.email, &m.body]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Sort newest first; ties keep their original order
pub fn sort_newest_first(mails: &mut [NormalizedMail]) {
    mails.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Labels shown as badges in the mail list
///
/// The inbox label is implied by the view and `UNREAD` by the unread
/// marker, so neither is shown.
pub fn display_labels(mail: &NormalizedMail) -> Vec<&str> {
    mail.labels
        .iter()
        .map(String::as_str)
        .filter(|l| !l.eq_ignore_ascii_case(LabelId::INBOX) && *l != LabelId::UNREAD)
        .collect()
}
