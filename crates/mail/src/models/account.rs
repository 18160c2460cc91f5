//! Account model for the account switcher

use serde::{Deserialize, Serialize};

/// A mailbox account the user can switch between
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Display label (usually the owner's name)
    pub label: String,
    pub email: String,
}

impl Account {
    pub fn new(label: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            email: email.into(),
        }
    }

    /// Up to two initials for the avatar badge, e.g. "AK" for "Alicia Koch"
    pub fn initials(&self) -> String {
        let source = if self.label.trim().is_empty() {
            &self.email
        } else {
            &self.label
        };

        source
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials() {
        assert_eq!(Account::new("Alicia Koch", "alicia@example.com").initials(), "AK");
        assert_eq!(Account::new("william", "will@example.com").initials(), "W");
        assert_eq!(Account::new("", "will@example.com").initials(), "W");
    }
}
