//! HTTP API handlers for qss-qp
//!
//! Static segments win over path parameters and the router does not
//! backtrack, so `GET /categories/visits` is a category lookup and
//! `/:user_id/visits/answer` is a visit lookup. Ids listed in
//! [`crate::services::RESERVED_USER_IDS`] and
//! [`crate::services::RESERVED_QUESTION_IDS`] are rejected when records are
//! written.

pub mod answers;
pub mod categories;
pub mod health;
pub mod process;
pub mod scores;
pub mod visits;

pub use answers::answer_routes;
pub use categories::category_routes;
pub use health::health_routes;
pub use process::process_routes;
pub use scores::score_routes;
pub use visits::visit_routes;
