//! Questionnaire scoring
//!
//! Raw submission → per-category totals → normalized result → ranking,
//! plus the advisory validator for normalized results.

pub mod aggregate;
pub mod pipeline;
pub mod rank;
pub mod result;
pub mod score;
pub mod validate;

pub use aggregate::calculate_total_scores;
pub use pipeline::{process_data, process_value};
pub use rank::sort_categories_by_score;
pub use result::{construct_result_json, NormalizedResult, ProcessError, RawSubmission};
pub use score::{CategoryScores, Score, ScoreSum};
pub use validate::{validate_data, ValidationReport, ValidationStatus};
pub use qss_common::time::validate_time_format;
