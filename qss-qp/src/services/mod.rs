//! Record services over the shared [`RecordStore`](qss_common::RecordStore)
//!
//! Plain async functions taking `&dyn RecordStore`; HTTP concerns stay in
//! [`crate::api`].

pub mod answers;
pub mod categories;
pub mod scores;
pub mod visits;

pub use answers::{AnswerInput, parse_score};
pub use categories::{CategoryInput, CategoryUpdate};
pub use scores::AnswerScore;

/// First path segments owned by fixed routes. A user with one of these ids
/// could never be addressed under `/:user_id/...`.
pub const RESERVED_USER_IDS: &[&str] = &["categories", "health", "process", "submit_visit"];

/// Second path segments owned by `/:user_id/answers` and `/:user_id/visits`
pub const RESERVED_QUESTION_IDS: &[&str] = &["answers", "visits"];

pub fn is_reserved_user_id(user_id: &str) -> bool {
    RESERVED_USER_IDS.contains(&user_id)
}

pub fn is_reserved_question_id(question_id: &str) -> bool {
    RESERVED_QUESTION_IDS.contains(&question_id)
}
