//! Mail fetching
//!
//! Lists the newest messages, fetches them with bounded concurrency and
//! normalizes each one independently.

mod inbox;

pub use inbox::{FetchFailure, FetchReport, fetch_mail};
