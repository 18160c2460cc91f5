//! Label model for the mailbox sidebar

use serde::{Deserialize, Serialize};

/// Unique identifier for a label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelId(pub String);

impl LabelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Well-known Gmail system labels
    pub const INBOX: &'static str = "INBOX";
    pub const SENT: &'static str = "SENT";
    pub const DRAFTS: &'static str = "DRAFT";
    pub const TRASH: &'static str = "TRASH";
    pub const SPAM: &'static str = "SPAM";
    pub const STARRED: &'static str = "STARRED";
    pub const IMPORTANT: &'static str = "IMPORTANT";
    pub const UNREAD: &'static str = "UNREAD";

    /// Pseudo-label selecting every mail
    pub const ALL: &'static str = "all";
}

impl From<String> for LabelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LabelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Whether a label is built into the mailbox or user-defined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    System,
    Custom,
}

/// A mailbox label shown in the sidebar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: LabelId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LabelKind,
    pub unread_count: u32,
}

impl Label {
    /// Create a user-defined label
    pub fn custom(id: impl Into<LabelId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: LabelKind::Custom,
            unread_count: 0,
        }
    }

    /// Create a system label
    pub fn system(id: impl Into<LabelId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: LabelKind::System,
            unread_count: 0,
        }
    }

    pub fn with_unread_count(mut self, count: u32) -> Self {
        self.unread_count = count;
        self
    }

    pub fn is_system(&self) -> bool {
        self.kind == LabelKind::System
    }
}

/// Display order of a label: system labels first, in Gmail's order
pub fn label_sort_order(label_id: &str) -> u32 {
    match label_id.to_ascii_uppercase().as_str() {
        LabelId::INBOX => 0,
        LabelId::STARRED => 1,
        LabelId::IMPORTANT => 2,
        LabelId::SENT => 3,
        LabelId::DRAFTS | "DRAFTS" => 4,
        LabelId::SPAM => 5,
        LabelId::TRASH => 6,
        "ARCHIVE" => 7,
        _ => 100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_sort_order_is_case_insensitive() {
        assert_eq!(label_sort_order("INBOX"), label_sort_order("inbox"));
        assert!(label_sort_order("starred") < label_sort_order("trash"));
        assert_eq!(label_sort_order("work"), 100);
    }

    #[test]
    fn test_label_serializes_kind_as_type() {
        let label = Label::custom("work", "Work").with_unread_count(2);
        let json = serde_json::to_value(&label).unwrap();
        assert_eq!(json["type"], "custom");
        assert_eq!(json["unreadCount"], 2);
        assert!(!label.is_system());
    }
}
