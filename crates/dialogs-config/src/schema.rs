//! Configuration schema types.
//!
//! Every section rejects unknown fields and falls back to a default for each
//! missing one.

use serde::{Deserialize, Serialize};

/// HTTP transport section.
///
/// # Example
///
/// ```
/// use dialogs_config::ServerSection;
///
/// let server = ServerSection {
///     webhook_path: "/alice".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(server.http_addr, "0.0.0.0:8080");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// HTTP bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Path the webhook is served on.
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Request body timeout in milliseconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Largest accepted request body in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            webhook_path: default_webhook_path(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            request_timeout_ms: default_request_timeout(),
            max_body_size: default_max_body_size(),
        }
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_webhook_path() -> String {
    "/".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    30_000
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

/// Skill behaviour section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SkillSection {
    /// Answer health-check pings without calling the handler.
    #[serde(default = "default_true")]
    pub auto_ping: bool,

    /// Answer flagged content without calling the handler.
    #[serde(default = "default_true")]
    pub auto_dangerous_context: bool,
}

impl Default for SkillSection {
    fn default() -> Self {
        Self {
            auto_ping: true,
            auto_dangerous_context: true,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directives (e.g. `info`, `dialogs_server=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,

    /// Include the event target (module path).
    #[serde(default = "default_true")]
    pub include_target: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
            include_target: true,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_section_defaults() {
        let server = ServerSection::default();
        assert_eq!(server.http_addr, "0.0.0.0:8080");
        assert_eq!(server.webhook_path, "/");
        assert_eq!(server.shutdown_timeout_secs, 30);
        assert_eq!(server.request_timeout_ms, 30_000);
        assert_eq!(server.max_body_size, 1_048_576);
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let skill: SkillSection = toml::from_str("auto_ping = false").unwrap();
        assert!(!skill.auto_ping);
        assert!(skill.auto_dangerous_context);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<SkillSection, _> = toml::from_str("auto_pong = true");
        assert!(result.is_err());
    }

    #[test]
    fn test_log_format_lowercase() {
        let logging: LoggingSection = toml::from_str(r#"format = "pretty""#).unwrap();
        assert_eq!(logging.format, LogFormat::Pretty);
        assert!(logging.include_target);

        let json = serde_json::to_string(&LogFormat::Json).unwrap();
        assert_eq!(json, r#""json""#);
    }
}
