//! Resume screener library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod processing;
pub mod output;

pub use config::Config;
pub use error::{DocumentFailure, FailureKind, Result, ScreenerError};
pub use output::report::ScreeningReport;
pub use processing::document::RawDocument;
pub use processing::screener::ScreeningEngine;
