use crate::utils::object_key::ObjectKeyPattern;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default body ceiling for `/upload`: 10 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default bound on a single storage write
pub const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Object storage connection settings
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Full endpoint URL, e.g. `https://<account>.r2.cloudflarestorage.com`
    pub endpoint_url: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// Signing region; R2 expects "auto"
    pub region: String,
    pub key_pattern: ObjectKeyPattern,
    pub timeout: Duration,
    /// Base URL under which stored objects are publicly reachable
    pub public_base_url: Option<String>,
}

/// Process configuration, resolved once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageConfig,

    /// Maximum request body size for uploads in bytes (default: 10 MiB)
    pub max_upload_bytes: usize,

    /// Deployment region shown on the index page
    pub deploy_region: Option<String>,
}

impl AppConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let endpoint_url = match get("STORAGE_ENDPOINT") {
            Some(url) => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::Invalid {
                        name: "STORAGE_ENDPOINT",
                        reason: format!("'{}' is not an http(s) URL", url),
                    });
                }
                url.trim_end_matches('/').to_string()
            }
            None => r2_endpoint(&require("STORAGE_ACCOUNT_ID")?),
        };

        let timeout_secs = parse_or(
            "STORAGE_TIMEOUT_SECS",
            get("STORAGE_TIMEOUT_SECS"),
            DEFAULT_STORAGE_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "STORAGE_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }

        let max_upload_bytes = parse_or(
            "MAX_UPLOAD_SIZE",
            get("MAX_UPLOAD_SIZE"),
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;
        if max_upload_bytes == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_UPLOAD_SIZE",
                reason: "must be greater than zero".to_string(),
            });
        }

        let default_pattern = ObjectKeyPattern::default();
        let key_pattern = ObjectKeyPattern::new(
            get("STORAGE_KEY_PREFIX").unwrap_or(default_pattern.prefix),
            get("STORAGE_KEY_SUFFIX").unwrap_or(default_pattern.suffix),
        );

        Ok(Self {
            storage: StorageConfig {
                endpoint_url,
                access_key: require("STORAGE_ACCESS_KEY")?,
                secret_key: require("STORAGE_SECRET")?,
                bucket: require("STORAGE_BUCKET")?,
                region: get("STORAGE_REGION").unwrap_or_else(|| "auto".to_string()),
                key_pattern,
                timeout: Duration::from_secs(timeout_secs),
                public_base_url: get("PUBLIC_BASE_URL")
                    .map(|u| u.trim_end_matches('/').to_string()),
            },
            max_upload_bytes,
            deploy_region: get("FLY_REGION"),
        })
    }

    /// Config for tests and local runs against a fake endpoint
    pub fn development() -> Self {
        Self {
            storage: StorageConfig {
                endpoint_url: "http://127.0.0.1:9000".to_string(),
                access_key: "minioadmin".to_string(),
                secret_key: "minioadmin".to_string(),
                bucket: "uploads".to_string(),
                region: "auto".to_string(),
                key_pattern: ObjectKeyPattern::default(),
                timeout: Duration::from_secs(DEFAULT_STORAGE_TIMEOUT_SECS),
                public_base_url: None,
            },
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            deploy_region: None,
        }
    }
}

fn r2_endpoint(account_id: &str) -> String {
    format!("https://{}.r2.cloudflarestorage.com", account_id)
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
            name,
            reason: format!("'{}' is not a valid number", v),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("STORAGE_ACCOUNT_ID", "acct123"),
        ("STORAGE_ACCESS_KEY", "ak"),
        ("STORAGE_SECRET", "sk"),
        ("STORAGE_BUCKET", "media"),
    ];

    #[test]
    fn test_defaults_from_required_vars() {
        let config = AppConfig::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(
            config.storage.endpoint_url,
            "https://acct123.r2.cloudflarestorage.com"
        );
        assert_eq!(config.storage.bucket, "media");
        assert_eq!(config.storage.region, "auto");
        assert_eq!(config.storage.key_pattern.prefix, "sign_");
        assert_eq!(config.storage.key_pattern.suffix, "_raw");
        assert_eq!(config.storage.timeout, Duration::from_secs(30));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(config.storage.public_base_url.is_none());
        assert!(config.deploy_region.is_none());
    }

    #[test]
    fn test_missing_secret_is_reported() {
        let vars: Vec<_> = REQUIRED
            .iter()
            .copied()
            .filter(|(k, _)| *k != "STORAGE_SECRET")
            .collect();
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("STORAGE_SECRET"));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut vars: Vec<_> = REQUIRED
            .iter()
            .copied()
            .filter(|(k, _)| *k != "STORAGE_BUCKET")
            .collect();
        vars.push(("STORAGE_BUCKET", "  "));
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("STORAGE_BUCKET"));
    }

    #[test]
    fn test_explicit_endpoint_replaces_account_id() {
        let vars = [
            ("STORAGE_ENDPOINT", "http://localhost:9000/"),
            ("STORAGE_ACCESS_KEY", "ak"),
            ("STORAGE_SECRET", "sk"),
            ("STORAGE_BUCKET", "media"),
        ];
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.storage.endpoint_url, "http://localhost:9000");
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("STORAGE_ENDPOINT", "localhost:9000"));
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "STORAGE_ENDPOINT", .. }));
    }

    #[test]
    fn test_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("MAX_UPLOAD_SIZE", "2048"),
            ("STORAGE_TIMEOUT_SECS", "5"),
            ("STORAGE_KEY_PREFIX", "doc_"),
            ("STORAGE_KEY_SUFFIX", ""),
            ("PUBLIC_BASE_URL", "https://media.example.com/"),
            ("FLY_REGION", "cdg"),
        ]);
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.max_upload_bytes, 2048);
        assert_eq!(config.storage.timeout, Duration::from_secs(5));
        assert_eq!(config.storage.key_pattern.prefix, "doc_");
        // blank suffix falls back to the default
        assert_eq!(config.storage.key_pattern.suffix, "_raw");
        assert_eq!(
            config.storage.public_base_url.as_deref(),
            Some("https://media.example.com")
        );
        assert_eq!(config.deploy_region.as_deref(), Some("cdg"));
    }

    #[test]
    fn test_non_numeric_limit_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("MAX_UPLOAD_SIZE", "ten megs"));
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "MAX_UPLOAD_SIZE", .. }));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("STORAGE_TIMEOUT_SECS", "0"));
        assert!(AppConfig::from_lookup(lookup(&vars)).is_err());
    }
}
