//! Score view of answers

use qss_common::models::{Answer, ANSWERS};
use qss_common::store::set_record;
use qss_common::time::now;
use qss_common::{RecordStore, Result};
use serde::Serialize;
use tracing::info;

use super::answers::load_answer;

/// Score of one answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerScore {
    pub user_id: String,
    pub question_id: String,
    pub score: i64,
}

impl From<&Answer> for AnswerScore {
    fn from(answer: &Answer) -> Self {
        Self {
            user_id: answer.user_id.clone(),
            question_id: answer.question_id.clone(),
            score: answer.score,
        }
    }
}

pub async fn get_score(
    store: &dyn RecordStore,
    user_id: &str,
    question_id: &str,
) -> Result<Option<AnswerScore>> {
    let answer = load_answer(store, user_id, question_id).await?;
    Ok(answer.as_ref().map(AnswerScore::from))
}

/// Set the score of an existing answer; `None` when the answer is absent
pub async fn update_score(
    store: &dyn RecordStore,
    user_id: &str,
    question_id: &str,
    score: i64,
) -> Result<Option<AnswerScore>> {
    let Some(mut answer) = load_answer(store, user_id, question_id).await? else {
        return Ok(None);
    };

    let key = Answer::key(user_id, question_id);

    answer.score = score;
    answer.updated_at = now();
    set_record(store, ANSWERS, &key, &answer).await?;

    info!(answer_id = %key, score, "Score updated");
    Ok(Some(AnswerScore::from(&answer)))
}
