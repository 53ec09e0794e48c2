//! Processing pipeline: aggregate → construct → rank

use serde_json::Value;
use tracing::debug;

use super::rank::sort_categories_by_score;
use super::result::{construct_result_json, NormalizedResult, ProcessError, RawSubmission};

/// Best-effort normalized, ranked result for a submission.
///
/// Never validates or rejects; see [`super::validate_data`] for the
/// advisory check.
pub fn process_data(raw: &RawSubmission) -> NormalizedResult {
    let result = sort_categories_by_score(&construct_result_json(raw));

    debug!(
        responses = raw.responses.len(),
        categories = result.categories.len(),
        "Processed visit submission"
    );

    result
}

/// [`process_data`] over an arbitrary JSON body
pub fn process_value(value: &Value) -> Result<NormalizedResult, ProcessError> {
    RawSubmission::from_value(value).map(|raw| process_data(&raw))
}
