//! Query API for UI consumption

mod mailbox;

pub use mailbox::{
    display_labels, filter_by_label, find_mail, label_unread_counts, search, sort_newest_first,
    unread_count,
};
