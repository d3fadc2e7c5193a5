//! # Dialogs
//!
//! **Webhook adapter for Yandex Alice voice skills**
//!
//! Dialogs turns the platform's JSON webhook calls into typed Rust values,
//! answers health-check pings and flagged content on its own, and hands
//! everything else to your skill handler:
//!
//! - **Typed envelopes** - [`core::InputData`] in, [`core::OutputData`] out
//! - **Deferred entities** - named-entity values decoded on demand through
//!   typed accessors, including relative date/time resolution
//! - **Panic isolation** - a panicking handler yields a 500, never a crash
//! - **Structured logs** - `tracing` with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dialogs::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new()
//!         .with_production()
//!         .with_optional_file("dialogs.toml")?
//!         .with_env_prefix("DIALOGS")
//!         .load()?;
//!
//!     let dispatcher = Dispatcher::new(|input: InputData| async move {
//!         let text = input.request.original_utterance.clone();
//!         OutputData::new(&input, Response::new(text, "", false))
//!     });
//!
//!     dialogs::run(&config, dispatcher).await
//! }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! body → decode → ping? → flagged? → handler → serialize → 200
//!          ↓                            ↓          ↓
//!         400                  advisory error     500
//! ```

#![doc(html_root_url = "https://docs.rs/dialogs/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::time::Duration;

use anyhow::Context;

pub use dialogs_config as config;
pub use dialogs_core as core;
pub use dialogs_server as server;
pub use dialogs_telemetry as telemetry;

use dialogs_config::{DialogsConfig, LogFormat};
use dialogs_server::{DispatchOptions, Dispatcher, Server, ServerConfig, ShutdownSignal};
use dialogs_telemetry::LogConfig;

/// Builds the transport configuration from a loaded [`DialogsConfig`].
pub fn server_config(config: &DialogsConfig) -> ServerConfig {
    let server = &config.server;
    ServerConfig::builder()
        .http_addr(server.http_addr.clone())
        .webhook_path(server.webhook_path.clone())
        .shutdown_timeout(Duration::from_secs(server.shutdown_timeout_secs))
        .request_timeout(Duration::from_millis(server.request_timeout_ms))
        .max_body_size(server.max_body_size)
        .build()
}

/// Builds the interception switches from a loaded [`DialogsConfig`].
pub fn dispatch_options(config: &DialogsConfig) -> DispatchOptions {
    DispatchOptions {
        auto_ping: config.skill.auto_ping,
        auto_dangerous_context: config.skill.auto_dangerous_context,
    }
}

/// Builds the logging setup from a loaded [`DialogsConfig`].
pub fn log_config(config: &DialogsConfig) -> LogConfig {
    let logging = &config.logging;
    LogConfig {
        enabled: logging.enabled,
        level: logging.level.clone(),
        json_format: logging.format == LogFormat::Json,
        file_line_info: logging.include_location,
        include_target: logging.include_target,
        ansi: logging.ansi_enabled,
    }
}

/// Applies the config's interception switches to `dispatcher` and wraps both
/// in a [`Server`].
pub fn build_server(config: &DialogsConfig, dispatcher: Dispatcher) -> Server {
    Server::new(
        server_config(config),
        dispatcher.with_options(dispatch_options(config)),
    )
}

/// Installs logging, then serves `dispatcher` until SIGTERM or SIGINT.
///
/// # Errors
///
/// Returns an error if logging cannot be installed or the server cannot bind.
pub async fn run(config: &DialogsConfig, dispatcher: Dispatcher) -> anyhow::Result<()> {
    run_with_shutdown(config, dispatcher, ShutdownSignal::with_os_signals()).await
}

/// Installs logging, then serves `dispatcher` until `shutdown` triggers.
///
/// # Errors
///
/// Returns an error if logging cannot be installed or the server cannot bind.
pub async fn run_with_shutdown(
    config: &DialogsConfig,
    dispatcher: Dispatcher,
    shutdown: ShutdownSignal,
) -> anyhow::Result<()> {
    dialogs_telemetry::init_logging(&log_config(config)).context("failed to install logging")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        auto_ping = config.skill.auto_ping,
        auto_dangerous_context = config.skill.auto_dangerous_context,
        "Starting Dialogs webhook"
    );

    build_server(config, dispatcher)
        .run_with_shutdown(shutdown)
        .await
        .with_context(|| format!("webhook server on {} failed", config.server.http_addr))
}

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use dialogs::prelude::*;
///
/// let response = Response::new("Hello", "", false).with_button(Button::new("Again"));
/// assert_eq!(response.buttons.len(), 1);
/// ```
pub mod prelude {
    pub use dialogs_core::{
        Button, CodecError, CodecResult, Entity, EntityType, InputData, OutputData, Request,
        RequestType, Response, ValueDateTime, ValueFio, ValueGeo,
    };

    pub use dialogs_server::{
        BoxError, DispatchError, DispatchOptions, Dispatcher, FailureClass, HandlerOutput,
        Server, ServerConfig, ShutdownSignal,
    };

    pub use dialogs_config::{ConfigError, ConfigLoader, DialogsConfig};

    pub use dialogs_telemetry::{init_logging, LogConfig};
}
