//! Root configuration type.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingSection, ServerSection, SkillSection};

/// Complete Dialogs service configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use dialogs_config::DialogsConfig;
///
/// let config = DialogsConfig::default();
/// assert_eq!(config.server.webhook_path, "/");
/// assert!(config.skill.auto_ping);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct DialogsConfig {
    /// HTTP transport configuration.
    #[serde(default)]
    pub server: ServerSection,

    /// Skill behaviour configuration.
    #[serde(default)]
    pub skill: SkillSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl DialogsConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - the bind address is not a socket address
    /// - the webhook path is empty or does not start with `/`
    /// - a timeout or the body size limit is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.http_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", server.http_addr),
            ));
        }

        if !server.webhook_path.starts_with('/') {
            return Err(ConfigError::invalid_value(
                "server.webhook_path",
                format!("must start with '/': {:?}", server.webhook_path),
            ));
        }

        if server.shutdown_timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "server.shutdown_timeout_secs",
                "must be greater than zero",
            ));
        }

        if server.max_body_size == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_body_size",
                "must be greater than zero",
            ));
        }

        if server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Development preset: loopback bind, pretty debug logs with colour and
    /// source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            server: ServerSection {
                http_addr: "127.0.0.1:8080".to_string(),
                ..ServerSection::default()
            },
            skill: SkillSection::default(),
            logging: LoggingSection {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                ansi_enabled: true,
                include_location: true,
                ..LoggingSection::default()
            },
        }
    }

    /// Production preset: JSON logs at `info`.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LoggingSection {
                format: LogFormat::Json,
                ansi_enabled: false,
                include_location: false,
                ..LoggingSection::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(DialogsConfig::default().validate().is_ok());
        assert!(DialogsConfig::development().validate().is_ok());
        assert!(DialogsConfig::production().validate().is_ok());
    }

    #[test]
    fn test_development_preset() {
        let config = DialogsConfig::development();
        assert_eq!(config.server.http_addr, "127.0.0.1:8080");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.logging.include_location);
    }

    #[test]
    fn test_invalid_address() {
        let mut config = DialogsConfig::default();
        config.server.http_addr = "localhost".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.http_addr"));
    }

    #[test]
    fn test_invalid_webhook_path() {
        let mut config = DialogsConfig::default();

        config.server.webhook_path = String::new();
        assert!(config.validate().is_err());

        config.server.webhook_path = "alice".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.webhook_path"));
    }

    #[test]
    fn test_zero_timeouts() {
        let mut config = DialogsConfig::default();
        config.server.shutdown_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = DialogsConfig::default();
        config.server.request_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_body_limit() {
        let mut config = DialogsConfig::default();
        config.server.max_body_size = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.max_body_size"));
    }
}
