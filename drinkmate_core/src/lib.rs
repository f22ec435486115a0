#![forbid(unsafe_code)]

//! Core domain model and business logic for DrinkMate.
//!
//! This crate provides:
//! - Domain types (drinks, drink events, session state, body profile)
//! - Fuzzy drink search
//! - Blood-alcohol accumulation model
//! - Risk pattern analysis
//! - Catalog, configuration and persistence (session state, event log, CSV archive)

pub mod types;
pub mod error;
pub mod similarity;
pub mod bac;
pub mod risk;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod session_store;
pub mod event_log;
pub mod archive;
pub mod report;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use similarity::{distance, rank, similarity, DEFAULT_MATCH_THRESHOLD};
pub use bac::{apply_event, compute_contribution, distribution_factor, recompute, remove_event};
pub use risk::{assess, RiskAssessment, RiskLevel};
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use event_log::{EventSink, JsonlSink, LogRecord};
