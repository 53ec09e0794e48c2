//! Category ranking

use super::result::NormalizedResult;

/// Copy of `result` with categories ordered by descending score.
///
/// The sort is stable, so categories with equal scores keep their
/// relative order. Integer and float scores compare numerically.
pub fn sort_categories_by_score(result: &NormalizedResult) -> NormalizedResult {
    let mut sorted = result.clone();
    sorted.categories.sort_descending();
    sorted
}
