use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

use super::cache::DEFAULT_VALIDITY_HOURS;
use super::corrections::Correction;
use crate::providers::nse_tools::NSE_TOOLS_BASE_URL;
use crate::providers::rapid_api::{RAPID_API_BASE_URL, RAPID_API_HOST};
use crate::providers::twelve_data::TWELVE_DATA_BASE_URL;
use crate::providers::util::ProviderSettings;

pub const RAPID_API_KEY_ENV: &str = "RAPID_API_KEY";
pub const TWELVE_DATA_API_KEY_ENV: &str = "TWELVE_DATA_API_KEY";

fn default_rapid_api_base_url() -> String {
    RAPID_API_BASE_URL.to_string()
}

fn default_rapid_api_host() -> String {
    RAPID_API_HOST.to_string()
}

fn default_twelve_data_base_url() -> String {
    TWELVE_DATA_BASE_URL.to_string()
}

fn default_nse_tools_base_url() -> String {
    NSE_TOOLS_BASE_URL.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RapidApiConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_rapid_api_base_url")]
    pub base_url: String,
    #[serde(default = "default_rapid_api_host")]
    pub host: String,
}

impl Default for RapidApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_rapid_api_base_url(),
            host: default_rapid_api_host(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TwelveDataConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_twelve_data_base_url")]
    pub base_url: String,
}

impl Default for TwelveDataConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_twelve_data_base_url(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NseToolsConfig {
    #[serde(default = "default_nse_tools_base_url")]
    pub base_url: String,
}

impl Default for NseToolsConfig {
    fn default() -> Self {
        Self {
            base_url: default_nse_tools_base_url(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub rapid_api: RapidApiConfig,
    #[serde(default)]
    pub twelve_data: TwelveDataConfig,
    #[serde(default)]
    pub nse_tools: NseToolsConfig,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_retries() -> usize {
    2
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_cache_validity_hours() -> i64 {
    DEFAULT_VALIDITY_HOURS
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: usize,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_cache_validity_hours")]
    pub cache_validity_hours: i64,
    /// When false, a symbol whose providers all fail is an error instead of
    /// a synthesized offline quote.
    #[serde(default = "default_true")]
    pub synthesize_fallback: bool,
    /// Extra correction rules, merged over the built-in table.
    #[serde(default)]
    pub corrections: HashMap<String, Correction>,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            providers: ProvidersConfig::default(),
            request_timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            cache_validity_hours: default_cache_validity_hours(),
            synthesize_fallback: true,
            corrections: HashMap::new(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the default config file, falling back to built-in defaults when
    /// it does not exist yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default().with_env_overrides());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "valtrack", "valtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "valtrack", "valtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config.with_env_overrides())
    }

    /// API keys from the environment win over keys in the file.
    pub fn with_env_overrides(self) -> Self {
        self.with_keys(
            std::env::var(RAPID_API_KEY_ENV).ok(),
            std::env::var(TWELVE_DATA_API_KEY_ENV).ok(),
        )
    }

    fn with_keys(mut self, rapid_api: Option<String>, twelve_data: Option<String>) -> Self {
        if let Some(key) = rapid_api.filter(|k| !k.trim().is_empty()) {
            self.providers.rapid_api.api_key = Some(key);
        }
        if let Some(key) = twelve_data.filter(|k| !k.trim().is_empty()) {
            self.providers.twelve_data.api_key = Some(key);
        }
        self
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            timeout: Duration::from_secs(self.request_timeout_secs),
            retries: self.retries,
            retry_delay_ms: self.retry_delay_ms,
        }
    }

    /// Rejects values that cannot be turned into durations.
    pub fn validate(&self) -> Result<()> {
        self.cache_validity()?;
        self.provider_deadline()?;
        Ok(())
    }

    pub fn cache_validity(&self) -> Result<chrono::Duration> {
        chrono::Duration::try_hours(self.cache_validity_hours)
            .filter(|validity| *validity > chrono::Duration::zero())
            .with_context(|| {
                format!(
                    "cache_validity_hours must be positive and in range, got {}",
                    self.cache_validity_hours
                )
            })
    }

    /// Upper bound for one provider's attempt: every try times out and every
    /// retry waits out its delay.
    pub fn provider_deadline(&self) -> Result<Duration> {
        let retries = u32::try_from(self.retries)
            .ok()
            .filter(|r| *r < u32::MAX)
            .with_context(|| format!("retries out of range: {}", self.retries))?;

        Duration::from_secs(self.request_timeout_secs)
            .checked_mul(retries + 1)
            .zip(Duration::from_millis(self.retry_delay_ms).checked_mul(retries))
            .and_then(|(requests, delays)| requests.checked_add(delays))
            .with_context(|| {
                format!(
                    "request_timeout_secs {} with {} retries of {}ms overflows",
                    self.request_timeout_secs, self.retries, self.retry_delay_ms
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  rapid_api:
    api_key: "rk-123"
  twelve_data:
    api_key: "td-456"
    base_url: "http://example.com/twelve"
  nse_tools:
    base_url: "http://example.com/nse"
request_timeout_secs: 5
retries: 0
cache_validity_hours: 12
synthesize_fallback: false
corrections:
  itc:
    pe_ratio: 26.5
  tcs:
    high_52_week: 4500.0
    low_52_week: 3100.0
data_path: "/tmp/valtrack"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.providers.rapid_api.api_key.as_deref(), Some("rk-123"));
        assert_eq!(config.providers.rapid_api.base_url, RAPID_API_BASE_URL);
        assert_eq!(config.providers.rapid_api.host, RAPID_API_HOST);
        assert_eq!(config.providers.twelve_data.api_key.as_deref(), Some("td-456"));
        assert_eq!(
            config.providers.twelve_data.base_url,
            "http://example.com/twelve"
        );
        assert_eq!(config.providers.nse_tools.base_url, "http://example.com/nse");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.retries, 0);
        assert_eq!(config.retry_delay_ms, 500);
        assert_eq!(config.cache_validity().unwrap(), chrono::Duration::hours(12));
        assert!(!config.synthesize_fallback);
        assert_eq!(config.corrections["itc"].pe_ratio, Some(26.5));
        assert_eq!(config.corrections["tcs"].high_52_week, Some(4500.0));
        assert_eq!(config.corrections["tcs"].pe_ratio, None);
        assert_eq!(config.data_path.as_deref(), Some("/tmp/valtrack"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.providers.rapid_api.api_key.is_none());
        assert!(config.providers.twelve_data.api_key.is_none());
        assert_eq!(config.providers.nse_tools.base_url, NSE_TOOLS_BASE_URL);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.cache_validity_hours, 24);
        assert!(config.synthesize_fallback);
        assert!(config.corrections.is_empty());

        let settings = config.provider_settings();
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert_eq!(settings.retries, 2);
    }

    #[test]
    fn test_keys_override_file_values() {
        let config = AppConfig::default().with_keys(Some("env-rapid".to_string()), None);
        assert_eq!(
            config.providers.rapid_api.api_key.as_deref(),
            Some("env-rapid")
        );
        assert!(config.providers.twelve_data.api_key.is_none());

        let config = AppConfig::default().with_keys(Some("  ".to_string()), None);
        assert!(config.providers.rapid_api.api_key.is_none());
    }

    #[test]
    fn test_load_from_path() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("config.yaml");
        fs::write(&path, "retries: 1\nproviders:\n  nse_tools:\n    base_url: http://x\n")?;

        let config = AppConfig::load_from_path(&path)?;
        assert_eq!(config.retries, 1);
        assert_eq!(config.providers.nse_tools.base_url, "http://x");

        assert!(AppConfig::load_from_path(dir.path().join("missing.yaml")).is_err());
        Ok(())
    }

    #[test]
    fn test_provider_deadline_covers_retries() {
        let config = AppConfig {
            request_timeout_secs: 10,
            retries: 2,
            retry_delay_ms: 500,
            ..Default::default()
        };
        assert_eq!(config.provider_deadline().unwrap(), Duration::from_secs(31));

        let config = AppConfig {
            request_timeout_secs: 5,
            retries: 0,
            ..Default::default()
        };
        assert_eq!(config.provider_deadline().unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn test_out_of_range_durations_are_errors() {
        let config = AppConfig {
            request_timeout_secs: u64::MAX,
            ..Default::default()
        };
        assert!(config.provider_deadline().is_err());

        let config = AppConfig {
            retries: usize::MAX,
            ..Default::default()
        };
        assert!(config.provider_deadline().is_err());

        let config = AppConfig {
            cache_validity_hours: i64::MAX,
            ..Default::default()
        };
        assert!(config.cache_validity().is_err());

        let config = AppConfig {
            cache_validity_hours: 0,
            ..Default::default()
        };
        assert!(config.cache_validity().is_err());
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_rejects_out_of_range_values() -> Result<()> {
        let dir = tempfile::TempDir::new()?;

        let path = dir.path().join("validity.yaml");
        fs::write(&path, "cache_validity_hours: 9223372036854775807\n")?;
        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(format!("{err:#}").contains("cache_validity_hours"));

        let path = dir.path().join("timeout.yaml");
        fs::write(&path, "request_timeout_secs: 18446744073709551615\n")?;
        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid config file"));
        Ok(())
    }
}
