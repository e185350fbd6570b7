// src/config/app.rs
//! Process configuration, loaded once at startup.
//!
//! Sources, lowest precedence first:
//! 1) built-in defaults
//! 2) TOML file: $NEWS_CONFIG_PATH, else `config/news.toml` when present
//! 3) individual env vars (`NEWS_TABLE`, `PORT`, ...)
//!
//! AWS credentials and the default region come from the standard AWS
//! provider chain, not from here.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::query::{PageLimits, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::store::dynamo::DynamoSettings;

pub const ENV_CONFIG_PATH: &str = "NEWS_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/news.toml";

const ENV_TABLE: &str = "NEWS_TABLE";
const ENV_REGION: &str = "NEWS_STORE_REGION";
const ENV_ENDPOINT: &str = "NEWS_STORE_ENDPOINT";
const ENV_TIMEOUT_MS: &str = "NEWS_STORE_TIMEOUT_MS";
const ENV_PORT: &str = "PORT";
const ENV_DEFAULT_LIMIT: &str = "NEWS_DEFAULT_LIMIT";
const ENV_MAX_LIMIT: &str = "NEWS_MAX_LIMIT";
const ENV_BACKEND: &str = "NEWS_BACKEND";
const ENV_FIXTURES_PATH: &str = "NEWS_FIXTURES_PATH";
const ENV_METRICS: &str = "NEWS_METRICS";

fn default_table() -> String {
    "Briefly-News".to_string()
}
fn default_timeout_ms() -> Option<u64> {
    Some(3_000)
}
fn default_port() -> u16 {
    8080
}
fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}
fn default_max_limit() -> u32 {
    MAX_PAGE_SIZE
}

/// Where news items are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Dynamodb,
    /// In-process store seeded from `fixtures_path`; for local runs.
    Memory,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dynamodb" | "dynamo" => Ok(Self::Dynamodb),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(anyhow!("unknown news backend `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_table")]
    pub table_name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: Option<u64>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub fixtures_path: Option<PathBuf>,
    #[serde(default)]
    pub metrics: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            table_name: default_table(),
            region: None,
            endpoint: None,
            timeout_ms: default_timeout_ms(),
            port: default_port(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            backend: Backend::default(),
            fixtures_path: None,
            metrics: false,
        }
    }
}

impl AppConfig {
    /// Resolve the full configuration (file + env) and validate it.
    pub fn load() -> Result<Self> {
        let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let path = PathBuf::from(p);
                if !path.exists() {
                    return Err(anyhow!(
                        "{ENV_CONFIG_PATH} points to non-existent path {}",
                        path.display()
                    ));
                }
                Self::from_file(&path)?
            }
            Err(_) => {
                let fallback = Path::new(DEFAULT_CONFIG_PATH);
                if fallback.exists() {
                    Self::from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let mut cfg: Self = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        // 0 disables the operation timeout, same as the env override
        cfg.timeout_ms = cfg.timeout_ms.filter(|&ms| ms > 0);
        Ok(cfg)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(v) = env_str(ENV_TABLE) {
            self.table_name = v;
        }
        if let Some(v) = env_str(ENV_REGION) {
            self.region = Some(v);
        }
        if let Some(v) = env_str(ENV_ENDPOINT) {
            self.endpoint = Some(v);
        }
        if let Some(v) = env_parse::<u64>(ENV_TIMEOUT_MS)? {
            // 0 disables the operation timeout
            self.timeout_ms = (v > 0).then_some(v);
        }
        if let Some(v) = env_parse(ENV_PORT)? {
            self.port = v;
        }
        if let Some(v) = env_parse(ENV_DEFAULT_LIMIT)? {
            self.default_limit = v;
        }
        if let Some(v) = env_parse(ENV_MAX_LIMIT)? {
            self.max_limit = v;
        }
        if let Some(v) = env_parse(ENV_BACKEND)? {
            self.backend = v;
        }
        if let Some(v) = env_str(ENV_FIXTURES_PATH) {
            self.fixtures_path = Some(PathBuf::from(v));
        }
        if let Some(v) = env_str(ENV_METRICS) {
            self.metrics = matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.table_name.trim().is_empty() {
            return Err(anyhow!("table name must not be empty"));
        }
        if self.default_limit == 0 || self.max_limit == 0 {
            return Err(anyhow!("page limits must be positive"));
        }
        if self.default_limit > self.max_limit {
            return Err(anyhow!(
                "default limit {} exceeds max limit {}",
                self.default_limit,
                self.max_limit
            ));
        }
        if self.backend == Backend::Memory && self.fixtures_path.is_none() {
            return Err(anyhow!("memory backend requires fixtures_path"));
        }
        Ok(())
    }

    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default: self.default_limit,
            max: self.max_limit,
        }
    }

    pub fn dynamo_settings(&self) -> DynamoSettings {
        DynamoSettings {
            table_name: self.table_name.clone(),
            region: self.region.clone(),
            endpoint: self.endpoint.clone(),
            timeout_ms: self.timeout_ms,
        }
    }
}

fn env_str(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_str(key)
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| anyhow!("invalid value `{v}` for {key}: {e}"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    const ALL_ENV: [&str; 11] = [
        ENV_CONFIG_PATH,
        ENV_TABLE,
        ENV_REGION,
        ENV_ENDPOINT,
        ENV_TIMEOUT_MS,
        ENV_PORT,
        ENV_DEFAULT_LIMIT,
        ENV_MAX_LIMIT,
        ENV_BACKEND,
        ENV_FIXTURES_PATH,
        ENV_METRICS,
    ];

    fn clear_env() {
        for key in ALL_ENV {
            env::remove_var(key);
        }
    }

    struct CwdGuard(PathBuf);

    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = env::set_current_dir(&self.0);
        }
    }

    fn in_temp_dir() -> (tempfile::TempDir, CwdGuard) {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        (tmp, CwdGuard(old))
    }

    #[serial_test::serial]
    #[test]
    fn defaults_without_file_or_env() {
        let (_tmp, _cwd) = in_temp_dir();
        clear_env();

        let cfg = AppConfig::load().unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.table_name, "Briefly-News");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.page_limits(), PageLimits::default());
        assert_eq!(cfg.timeout_ms, Some(3_000));
    }

    #[serial_test::serial]
    #[test]
    fn file_then_env_overrides() {
        let (tmp, _cwd) = in_temp_dir();
        clear_env();

        fs::create_dir_all(tmp.path().join("config")).unwrap();
        fs::write(
            tmp.path().join(DEFAULT_CONFIG_PATH),
            "table_name = \"News-Staging\"\nmax_limit = 50\nregion = \"eu-central-1\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load().unwrap();
        assert_eq!(cfg.table_name, "News-Staging");
        assert_eq!(cfg.max_limit, 50);
        assert_eq!(cfg.region.as_deref(), Some("eu-central-1"));

        env::set_var(ENV_TABLE, "News-Override");
        env::set_var(ENV_PORT, "9000");
        env::set_var(ENV_TIMEOUT_MS, "0");
        env::set_var(ENV_METRICS, "true");
        let cfg = AppConfig::load().unwrap();
        assert_eq!(cfg.table_name, "News-Override");
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.timeout_ms, None);
        assert!(cfg.metrics);
        assert_eq!(cfg.dynamo_settings().table_name, "News-Override");

        clear_env();
    }

    #[serial_test::serial]
    #[test]
    fn explicit_path_must_exist() {
        let (tmp, _cwd) = in_temp_dir();
        clear_env();

        env::set_var(ENV_CONFIG_PATH, tmp.path().join("nope.toml"));
        assert!(AppConfig::load().is_err());

        let p = tmp.path().join("custom.toml");
        fs::write(&p, "backend = \"memory\"\nfixtures_path = \"news.json\"\n").unwrap();
        env::set_var(ENV_CONFIG_PATH, &p);
        let cfg = AppConfig::load().unwrap();
        assert_eq!(cfg.backend, Backend::Memory);

        clear_env();
    }

    #[test]
    fn zero_timeout_in_file_disables_it() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("news.toml");

        fs::write(&p, "timeout_ms = 0\n").unwrap();
        let cfg = AppConfig::from_file(&p).unwrap();
        assert_eq!(cfg.timeout_ms, None);
        assert_eq!(cfg.dynamo_settings().timeout_ms, None);

        fs::write(&p, "timeout_ms = 250\n").unwrap();
        assert_eq!(AppConfig::from_file(&p).unwrap().timeout_ms, Some(250));
    }

    #[serial_test::serial]
    #[test]
    fn invalid_values_abort_loading() {
        let (_tmp, _cwd) = in_temp_dir();
        clear_env();

        env::set_var(ENV_PORT, "eighty");
        assert!(AppConfig::load().is_err());
        clear_env();

        env::set_var(ENV_DEFAULT_LIMIT, "500");
        assert!(AppConfig::load().is_err(), "default above max must fail");
        clear_env();

        env::set_var(ENV_BACKEND, "memory");
        assert!(AppConfig::load().is_err(), "memory without fixtures must fail");
        env::set_var(ENV_BACKEND, "cassandra");
        assert!(AppConfig::load().is_err());
        clear_env();
    }
}
