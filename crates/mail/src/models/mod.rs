//! Domain models for mail entities

mod account;
mod label;
mod mail;

pub use account::Account;
pub use label::{Label, LabelId, LabelKind, label_sort_order};
pub use mail::{MessageId, NO_SUBJECT, NormalizedMail, NormalizedMailBuilder, Sender, UNKNOWN_SENDER};
