use std::path::PathBuf;

use kiemdinh_core::rules::builtin::DEFAULT_PRESET;

use crate::error::AppError;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Custom rule file; takes precedence over `rules_preset`.
    pub rules_file: Option<PathBuf>,
    /// Built-in rule table (default: `rau`).
    pub rules_preset: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `RULES_FILE`           | unset                      |
    /// | `RULES_PRESET`         | `rau`                      |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;

        let rules_file = lookup("RULES_FILE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let rules_preset = lookup("RULES_PRESET").unwrap_or_else(|| DEFAULT_PRESET.into());

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = lookup("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".into())
            .parse()
            .map_err(|e| AppError::Config(format!("REQUEST_TIMEOUT_SECS must be a valid u64: {e}")))?;

        Ok(Self {
            host,
            port,
            rules_file,
            rules_preset,
            cors_origins,
            request_timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<ServerConfig, AppError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c.host, "0.0.0.0");
        assert_eq!(c.port, 3000);
        assert_eq!(c.rules_file, None);
        assert_eq!(c.rules_preset, "rau");
        assert_eq!(c.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(c.request_timeout_secs, 30);
    }

    #[test]
    fn test_overrides() {
        let c = config(&[
            ("PORT", "8080"),
            ("RULES_FILE", "/etc/kiemdinh/rules.json"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
        ])
        .unwrap();
        assert_eq!(c.port, 8080);
        assert_eq!(c.rules_file, Some(PathBuf::from("/etc/kiemdinh/rules.json")));
        assert_eq!(c.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        assert!(matches!(config(&[("PORT", "http")]), Err(AppError::Config(_))));
        assert!(matches!(
            config(&[("REQUEST_TIMEOUT_SECS", "-1")]),
            Err(AppError::Config(_))
        ));
    }
}
