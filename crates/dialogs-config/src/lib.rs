//! Typed configuration for Dialogs webhook services.
//!
//! [`DialogsConfig`] groups three sections:
//!
//! - [`ServerSection`] - bind address, webhook path and timeouts
//! - [`SkillSection`] - which interceptors answer before the handler
//! - [`LoggingSection`] - log filter and output format
//!
//! Unknown fields are rejected. Missing fields take their defaults.
//!
//! # Example
//!
//! ```no_run
//! use dialogs_config::ConfigLoader;
//!
//! # fn main() -> Result<(), dialogs_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("dialogs.toml")?
//!     .with_env_prefix("DIALOGS")
//!     .load()?;
//!
//! println!("Webhook on {}{}", config.server.http_addr, config.server.webhook_path);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! webhook_path = "/alice"
//! shutdown_timeout_secs = 30
//! request_timeout_ms = 30000
//! max_body_size = 1048576
//!
//! [skill]
//! auto_ping = true
//! auto_dangerous_context = true
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables:
//!
//! - `DIALOGS__SERVER__HTTP_ADDR=0.0.0.0:9000`
//! - `DIALOGS__SKILL__AUTO_DANGEROUS_CONTEXT=false`
//! - `DIALOGS__LOGGING__LEVEL=dialogs_server=debug`

#![doc(html_root_url = "https://docs.rs/dialogs-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::DialogsConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingSection, ServerSection, SkillSection};
