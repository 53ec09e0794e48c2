//! # QSS Common Library
//!
//! Shared code for the questionnaire scoring service crates:
//! - Error and Result types
//! - Configuration resolution (CLI → ENV → TOML → defaults)
//! - Record store interface and backends
//! - Answer, category and visit records
//! - Duration format checks and timestamps

pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod time;

pub use error::{Error, Result};
pub use store::{RecordFilter, RecordStore};
