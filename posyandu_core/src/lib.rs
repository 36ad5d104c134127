#![forbid(unsafe_code)]

//! Core domain model and business logic for the Posyandu growth monitor.
//!
//! This crate provides:
//! - Domain types (measurement records, growth status, session users)
//! - Growth status classifier
//! - In-memory record store
//! - Summary statistics and trend
//! - CSV and printable report export
//! - Session and access gate

pub mod types;
pub mod error;
pub mod classifier;
pub mod store;
pub mod stats;
pub mod search;
pub mod export;
pub mod session;
pub mod app;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use classifier::{classify, Classification};
pub use store::RecordStore;
pub use stats::{summarize, trend, Stats};
pub use search::search;
pub use export::{export_csv, render_report};
pub use session::{Action, Authenticator, DemoAuthenticator, Session};
pub use app::{DeleteOutcome, MeasurementPatch, Posyandu};
pub use config::Config;
