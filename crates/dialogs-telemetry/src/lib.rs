//! Logging setup for Dialogs services.
//!
//! Dialogs logs through `tracing`. This crate installs the subscriber: an
//! `EnvFilter` plus a JSON (production) or pretty (development) formatter.
//!
//! # Example
//!
//! ```rust,ignore
//! use dialogs_telemetry::{init_logging, LogConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging(&LogConfig::development())?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/dialogs-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
