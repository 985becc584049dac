//! Static reference data for the site: the catalog of ethnic groups and the
//! per-group quiz question banks.
//!
//! This data is code-embedded by design — it changes with releases, not at
//! runtime, and nothing in the application may assume a post's
//! `ethnic_group_id` resolves: lookups return `Option` and callers degrade
//! to "unknown group".

pub mod groups;
pub mod quiz;

pub use groups::{EthnicGroup, all_groups, find_group};
pub use quiz::{QuizQuestion, grade, quiz_for};
