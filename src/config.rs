//! Configuration management for the catalog service
//!
//! Supports configuration via:
//! - Environment variables (primary)
//! - Optional TOML config file (secondary)
//!
//! Environment variables take precedence over config file values.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Backend storage type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// AWS S3 (or an S3-compatible endpoint)
    Aws,
    /// Local directory tree, one sub-directory per bucket
    Local,
}

impl FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aws" | "s3" => Ok(BackendType::Aws),
            "local" | "fs" => Ok(BackendType::Local),
            _ => Err(format!("Unknown backend type: {}", s)),
        }
    }
}

/// Backend storage configuration
///
/// Bucket names are not fixed here: the scanner derives one bucket per
/// tenant, the catalog handlers use the buckets in [`CatalogConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend type (aws, local)
    #[serde(rename = "type")]
    pub backend_type: BackendType,

    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint URL (for S3-compatible services)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Permit plain HTTP endpoints
    #[serde(default)]
    pub allow_http: bool,

    /// Root directory for the local backend
    #[serde(default)]
    pub local_root: Option<PathBuf>,
}

fn default_region() -> String {
    "ca-central-1".to_string()
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_timeout_secs() -> u64 {
    30
}

/// Availability scan tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// A day qualifies when its frames total strictly more than this
    #[serde(default = "default_threshold_bytes")]
    pub size_threshold_bytes: u64,

    /// Number of dates returned
    #[serde(default = "default_max_days")]
    pub max_days: usize,
}

fn default_threshold_bytes() -> u64 {
    20 * 1024 * 1024
}

fn default_max_days() -> usize {
    10
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            size_threshold_bytes: default_threshold_bytes(),
            max_days: default_max_days(),
        }
    }
}

/// Buckets and prefixes backing the media catalog endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Bucket holding `video/`, `vis_test/` and `pdf_evidance/`
    #[serde(default)]
    pub bucket: Option<String>,

    /// CDN domain used to build public URLs
    #[serde(default)]
    pub cdn_domain: Option<String>,

    #[serde(default = "default_models_bucket")]
    pub models_bucket: String,

    #[serde(default = "default_models_prefix")]
    pub models_prefix: String,

    /// Bucket holding per-client analysis output
    #[serde(default = "default_output_bucket")]
    pub output_bucket: String,

    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
}

fn default_models_bucket() -> String {
    "graph-pilot".to_string()
}

fn default_models_prefix() -> String {
    "models/".to_string()
}

fn default_output_bucket() -> String {
    "vendor-analysis-webapp-production".to_string()
}

fn default_output_prefix() -> String {
    "output/".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            cdn_domain: None,
            models_bucket: default_models_bucket(),
            models_prefix: default_models_prefix(),
            output_bucket: default_output_bucket(),
            output_prefix: default_output_prefix(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Backend storage configuration
    pub backend: BackendConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Log level (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: default_bind_address(),
                timeout_secs: default_timeout_secs(),
            },
            backend: BackendConfig {
                backend_type: BackendType::Aws,
                region: default_region(),
                endpoint: None,
                allow_http: false,
                local_root: None,
            },
            scan: ScanConfig::default(),
            catalog: CatalogConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// Environment variables:
    /// - PILOT_CONFIG_FILE: optional path to TOML config file
    /// - PILOT_BIND_ADDRESS: server bind address (default: 0.0.0.0:8080)
    /// - PILOT_TIMEOUT_SECS: request timeout (default: 30)
    /// - PILOT_BACKEND_TYPE: aws|local
    /// - PILOT_BACKEND_REGION: AWS region (default: ca-central-1)
    /// - PILOT_BACKEND_ENDPOINT: custom endpoint URL (optional)
    /// - PILOT_BACKEND_ALLOW_HTTP: true|false
    /// - PILOT_LOCAL_ROOT: root directory for the local backend
    /// - PILOT_SCAN_THRESHOLD_BYTES: per-day size threshold (default: 20 MiB)
    /// - PILOT_SCAN_MAX_DAYS: dates returned by a scan (default: 10)
    /// - PILOT_CATALOG_BUCKET: media catalog bucket
    /// - PILOT_CDN_DOMAIN: public CDN domain for catalog URLs
    /// - PILOT_MODELS_BUCKET / PILOT_MODELS_PREFIX
    /// - PILOT_OUTPUT_BUCKET / PILOT_OUTPUT_PREFIX
    /// - PILOT_LOG_LEVEL: log level (default: info)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` in place of the process environment
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("PILOT_CONFIG_FILE") {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(addr) = lookup("PILOT_BIND_ADDRESS") {
            config.server.bind_address = addr
                .parse()
                .with_context(|| format!("invalid PILOT_BIND_ADDRESS {addr:?}"))?;
        }

        if let Some(timeout) = lookup("PILOT_TIMEOUT_SECS") {
            config.server.timeout_secs = timeout
                .parse()
                .with_context(|| format!("invalid PILOT_TIMEOUT_SECS {timeout:?}"))?;
        }

        if let Some(backend_type) = lookup("PILOT_BACKEND_TYPE") {
            config.backend.backend_type =
                BackendType::from_str(&backend_type).map_err(anyhow::Error::msg)?;
        }

        if let Some(region) = lookup("PILOT_BACKEND_REGION") {
            config.backend.region = region;
        }

        if let Some(endpoint) = lookup("PILOT_BACKEND_ENDPOINT") {
            config.backend.endpoint = Some(endpoint);
        }

        if let Some(allow_http) = lookup("PILOT_BACKEND_ALLOW_HTTP") {
            config.backend.allow_http = allow_http
                .parse()
                .with_context(|| format!("invalid PILOT_BACKEND_ALLOW_HTTP {allow_http:?}"))?;
        }

        if let Some(root) = lookup("PILOT_LOCAL_ROOT") {
            config.backend.local_root = Some(PathBuf::from(root));
        }

        if let Some(threshold) = lookup("PILOT_SCAN_THRESHOLD_BYTES") {
            config.scan.size_threshold_bytes = threshold
                .parse()
                .with_context(|| format!("invalid PILOT_SCAN_THRESHOLD_BYTES {threshold:?}"))?;
        }

        if let Some(max_days) = lookup("PILOT_SCAN_MAX_DAYS") {
            config.scan.max_days = max_days
                .parse()
                .with_context(|| format!("invalid PILOT_SCAN_MAX_DAYS {max_days:?}"))?;
        }

        if let Some(bucket) = lookup("PILOT_CATALOG_BUCKET") {
            config.catalog.bucket = Some(bucket);
        }

        if let Some(domain) = lookup("PILOT_CDN_DOMAIN") {
            config.catalog.cdn_domain = Some(domain);
        }

        if let Some(bucket) = lookup("PILOT_MODELS_BUCKET") {
            config.catalog.models_bucket = bucket;
        }

        if let Some(prefix) = lookup("PILOT_MODELS_PREFIX") {
            config.catalog.models_prefix = prefix;
        }

        if let Some(bucket) = lookup("PILOT_OUTPUT_BUCKET") {
            config.catalog.output_bucket = bucket;
        }

        if let Some(prefix) = lookup("PILOT_OUTPUT_PREFIX") {
            config.catalog.output_prefix = prefix;
        }

        if let Some(level) = lookup("PILOT_LOG_LEVEL") {
            config.log_level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path}"))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("failed to parse {path}"))?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.scan.max_days == 0 {
            bail!("scan.max_days must be at least 1");
        }
        if self.backend.backend_type == BackendType::Local && self.backend.local_root.is_none() {
            bail!("the local backend requires PILOT_LOCAL_ROOT");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_backend_type_parsing() {
        assert_eq!(BackendType::from_str("aws").unwrap(), BackendType::Aws);
        assert_eq!(BackendType::from_str("S3").unwrap(), BackendType::Aws);
        assert_eq!(BackendType::from_str("local").unwrap(), BackendType::Local);
        assert!(BackendType::from_str("azure").is_err());
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.scan.size_threshold_bytes, 20 * 1024 * 1024);
        assert_eq!(config.scan.max_days, 10);
        assert_eq!(config.catalog.models_bucket, "graph-pilot");
        assert_eq!(config.catalog.output_prefix, "output/");
        assert_eq!(config.backend.backend_type, BackendType::Aws);
        assert_eq!(config.server.bind_address.port(), 8080);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("PILOT_BIND_ADDRESS", "127.0.0.1:9000"),
            ("PILOT_BACKEND_ENDPOINT", "http://localhost:9001"),
            ("PILOT_BACKEND_ALLOW_HTTP", "true"),
            ("PILOT_SCAN_MAX_DAYS", "5"),
            ("PILOT_CATALOG_BUCKET", "media"),
            ("PILOT_CDN_DOMAIN", "cdn.example.com"),
        ]))
        .unwrap();

        assert_eq!(config.server.bind_address.port(), 9000);
        assert_eq!(
            config.backend.endpoint.as_deref(),
            Some("http://localhost:9001")
        );
        assert!(config.backend.allow_http);
        assert_eq!(config.scan.max_days, 5);
        assert_eq!(config.catalog.bucket.as_deref(), Some("media"));
        assert_eq!(config.catalog.cdn_domain.as_deref(), Some("cdn.example.com"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("PILOT_TIMEOUT_SECS", "soon")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("PILOT_SCAN_MAX_DAYS", "0")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("PILOT_BACKEND_TYPE", "local")])).is_err());
    }

    #[test]
    fn toml_sections_are_optional() {
        let config: Config = toml::from_str(
            r#"
            [server]
            bind_address = "0.0.0.0:8081"

            [backend]
            type = "aws"
            region = "us-east-1"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.backend.region, "us-east-1");
        assert_eq!(config.scan, ScanConfig::default());
        assert_eq!(config.log_level, "info");
    }
}
