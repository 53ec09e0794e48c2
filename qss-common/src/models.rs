//! Records persisted through the record store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Collection holding [`Answer`] documents
pub const ANSWERS: &str = "answers";
/// Collection holding [`Category`] documents
pub const CATEGORIES: &str = "categories";
/// Collection holding [`Visit`] documents
pub const VISITS: &str = "visits";

/// A user's answer to one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub user_id: String,
    pub question_id: String,
    pub answer_text: String,
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Answer {
    /// Store key: `<user_id>_<question_id>`.
    ///
    /// Different id pairs can share a key (`a_b`/`c` and `a`/`b_c`); use
    /// [`Answer::is_for`] on whatever the key loads.
    pub fn key(user_id: &str, question_id: &str) -> String {
        format!("{}_{}", user_id, question_id)
    }

    pub fn is_for(&self, user_id: &str, question_id: &str) -> bool {
        self.user_id == user_id && self.question_id == question_id
    }
}

/// A questionnaire category, keyed by its name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub category_name: String,
    pub category_description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A submitted questionnaire visit.
///
/// `responses` is kept as raw JSON: scoring tolerates malformed entries and
/// must see them exactly as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub visit_id: String,
    pub user_id: String,
    pub visit_count: i64,
    pub visit_duration: String,
    #[serde(default)]
    pub responses: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Visit {
    /// Store key: `<user_id>_<visit_id>`, ambiguous like [`Answer::key`]
    pub fn key(user_id: &str, visit_id: &str) -> String {
        format!("{}_{}", user_id, visit_id)
    }

    pub fn is_for(&self, user_id: &str, visit_id: &str) -> bool {
        self.user_id == user_id && self.visit_id == visit_id
    }
}
