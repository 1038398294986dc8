//! Configuration loading from disk and from the process environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::InterceptorConfig;

pub const ENV_PROXY_HOST: &str = "LUNAR_PROXY_HOST";
pub const ENV_PROXY_SUPPORT_TLS: &str = "LUNAR_PROXY_SUPPORT_TLS";
pub const ENV_TENANT_ID: &str = "LUNAR_TENANT_ID";
pub const ENV_HANDSHAKE_PORT: &str = "LUNAR_HEALTHCHECK_PORT";
pub const ENV_ALLOW_LIST: &str = "LUNAR_ALLOW_LIST";
pub const ENV_BLOCK_LIST: &str = "LUNAR_BLOCK_LIST";
pub const ENV_ERROR_THRESHOLD: &str = "LUNAR_ENTER_COOLDOWN_AFTER_ATTEMPTS";
pub const ENV_COOLDOWN_SECS: &str = "LUNAR_EXIT_COOLDOWN_AFTER_SEC";
pub const ENV_LOG_LEVEL: &str = "LUNAR_INTERCEPTOR_LOG_LEVEL";

const LIST_DELIMITER: char = ',';

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<InterceptorConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the effective configuration: the optional file, then the process environment on top.
pub fn load(path: Option<&Path>) -> Result<InterceptorConfig, ConfigError> {
    let config = match path {
        Some(path) => load_config(path)?,
        None => InterceptorConfig::default(),
    };
    Ok(apply_env(config, std::env::vars()))
}

/// Overlay `LUNAR_*` variables onto `config`.
///
/// Variables that fail to parse leave the existing value in place.
pub fn apply_env<I, K, V>(mut config: InterceptorConfig, vars: I) -> InterceptorConfig
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    for (key, value) in vars {
        let (key, value) = (key.as_ref(), value.as_ref());
        match key {
            ENV_PROXY_HOST => config.proxy.host = Some(value.to_string()),
            ENV_PROXY_SUPPORT_TLS => config.proxy.tls = value.trim() == "1",
            ENV_TENANT_ID => config.proxy.tenant_id = value.to_string(),
            ENV_HANDSHAKE_PORT => {
                if let Some(port) = parse_env(key, value) {
                    config.proxy.handshake_port = port;
                }
            }
            ENV_ALLOW_LIST => config.traffic.allow_list = parse_list(value),
            ENV_BLOCK_LIST => config.traffic.block_list = parse_list(value),
            ENV_ERROR_THRESHOLD => {
                if let Some(threshold) = parse_env(key, value) {
                    config.fail_safe.error_threshold = threshold;
                }
            }
            ENV_COOLDOWN_SECS => {
                if let Some(secs) = parse_env(key, value) {
                    config.fail_safe.cooldown_secs = secs;
                }
            }
            ENV_LOG_LEVEL => config.observability.log_level = value.to_lowercase(),
            _ => {}
        }
    }
    config
}

/// Split a comma separated destination list. An empty value means "not configured".
pub fn parse_list(raw: &str) -> Option<Vec<String>> {
    if raw.trim().is_empty() {
        return None;
    }
    Some(
        raw.split(LIST_DELIMITER)
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(key, value, "Ignoring unparseable environment value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overlay() {
        let vars = [
            (ENV_PROXY_HOST, "lunar-proxy:8000"),
            (ENV_PROXY_SUPPORT_TLS, "1"),
            (ENV_TENANT_ID, "acme"),
            (ENV_ALLOW_LIST, "api.example.com, 1.2.3.4"),
            (ENV_ERROR_THRESHOLD, "3"),
            (ENV_COOLDOWN_SECS, "30"),
            ("PATH", "/usr/bin"),
        ];
        let config = apply_env(InterceptorConfig::default(), vars);

        assert_eq!(config.proxy.host.as_deref(), Some("lunar-proxy:8000"));
        assert!(config.proxy.tls);
        assert_eq!(config.proxy.tenant_id, "acme");
        assert_eq!(
            config.traffic.allow_list,
            Some(vec!["api.example.com".to_string(), "1.2.3.4".to_string()])
        );
        assert_eq!(config.fail_safe.error_threshold, 3);
        assert_eq!(config.fail_safe.cooldown_secs, 30);
    }

    #[test]
    fn test_bad_numbers_keep_previous_value() {
        let vars = [(ENV_ERROR_THRESHOLD, "many"), (ENV_HANDSHAKE_PORT, "-1")];
        let config = apply_env(InterceptorConfig::default(), vars);
        assert_eq!(config.fail_safe.error_threshold, 5);
        assert_eq!(config.proxy.handshake_port, 8040);
    }

    #[test]
    fn test_tls_flag_requires_one() {
        let config = apply_env(InterceptorConfig::default(), [(ENV_PROXY_SUPPORT_TLS, "true")]);
        assert!(!config.proxy.tls);
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list(""), None);
        assert_eq!(parse_list("  "), None);
        assert_eq!(
            parse_list("a.com,,b.com,"),
            Some(vec!["a.com".to_string(), "b.com".to_string()])
        );
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/interceptor.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
