//! Reelcut library
//!
//! Upload validation, trim-window checks and H.264/AAC re-encoding of short
//! clips, exposed over HTTP or driven in-process.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod planner;
pub mod ports;
pub mod server;
pub mod settings;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{TranscodeRequest, TranscodeResult, TranscodeSubmission};
pub use error::{ReelcutError, ReelcutResult};
pub use settings::Settings;
