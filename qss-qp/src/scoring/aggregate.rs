//! Per-category score aggregation

use serde_json::{Map, Value};
use tracing::trace;

use super::score::{CategoryScores, Score};

/// Sum response scores into per-category totals.
///
/// Responses without a string `category` are skipped. Scores go through
/// [`Score::coerce`], so unparseable values add zero but still register the
/// category. Categories appear in order of first occurrence; the totals
/// themselves do not depend on response order.
pub fn calculate_total_scores(responses: &Map<String, Value>) -> CategoryScores {
    responses
        .iter()
        .filter_map(|(question_id, response)| {
            let Some(category) = response.get("category").and_then(Value::as_str) else {
                trace!(question_id = %question_id, "Skipping response without category");
                return None;
            };

            let score = response.get("score").map(Score::coerce).unwrap_or_default();
            Some((category, score))
        })
        .collect()
}
