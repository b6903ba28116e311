#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::utils::error::{OutsetaError, Result};
use crate::utils::validation::{self, Validate};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use toml_config::TomlConfig;

pub const ENV_SUBDOMAIN: &str = "OUTSETA_SUBDOMAIN";
pub const ENV_API_KEY: &str = "OUTSETA_API_KEY";
pub const ENV_API_SECRET: &str = "OUTSETA_API_SECRET";
pub const ENV_BASE_URL: &str = "OUTSETA_BASE_URL";
pub const ENV_TIMEOUT_SECONDS: &str = "OUTSETA_TIMEOUT_SECONDS";
pub const ENV_CONFIG_PATH: &str = "OUTSETA_CONFIG";

/// 程序層級的唯讀設定；讀取一次後不再變動
#[derive(Clone, Default)]
pub struct OutsetaConfig {
    pub subdomain: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// 租戶 API 金鑰組，用於 `Authorization: Outseta {key}:{secret}`
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    api_key: String,
    api_secret: String,
}

impl Credential {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn authorization_header(&self) -> String {
        format!("Outseta {}:{}", self.api_key, self.api_secret)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .finish()
    }
}

impl fmt::Debug for OutsetaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutsetaConfig")
            .field("subdomain", &self.subdomain)
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl OutsetaConfig {
    /// 載入 `.env`、選用的 TOML 檔，再以環境變數覆蓋
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }

        let path = config_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from));

        let file = match path {
            Some(path) => {
                tracing::debug!("Reading configuration file {}", path.display());
                Some(TomlConfig::from_file(&path)?)
            }
            None => None,
        };

        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// 環境變數優先於設定檔；空白值視為未設定
    pub fn from_sources<F>(file: Option<TomlConfig>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let section = file.map(|config| config.outseta).unwrap_or_default();
        let env = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let timeout_seconds = match env(ENV_TIMEOUT_SECONDS) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
                OutsetaError::InvalidConfigValueError {
                    field: ENV_TIMEOUT_SECONDS.to_string(),
                    value: raw.clone(),
                    reason: format!("Expected a whole number of seconds: {}", e),
                }
            })?),
            None => section.timeout_seconds,
        };

        Ok(Self {
            subdomain: env(ENV_SUBDOMAIN).or(section.subdomain),
            api_key: env(ENV_API_KEY).or(section.api_key),
            api_secret: env(ENV_API_SECRET).or(section.api_secret),
            base_url: env(ENV_BASE_URL).or(section.base_url),
            timeout_seconds,
        })
    }

    /// 預設為 `https://{subdomain}.outseta.com`，明確設定 base URL 時以其為準
    pub fn base_url(&self) -> Result<String> {
        if let Some(base_url) = &self.base_url {
            return Ok(base_url.trim_end_matches('/').to_string());
        }

        let subdomain = validation::validate_required_field(ENV_SUBDOMAIN, &self.subdomain)?;
        Ok(format!("https://{}.outseta.com", subdomain.trim()))
    }

    pub fn credential(&self) -> Result<Credential> {
        let api_key = validation::validate_required_field(ENV_API_KEY, &self.api_key)?;
        let api_secret = validation::validate_required_field(ENV_API_SECRET, &self.api_secret)?;
        validation::validate_non_empty_string(ENV_API_KEY, api_key)?;
        validation::validate_non_empty_string(ENV_API_SECRET, api_secret)?;
        Ok(Credential::new(api_key.trim(), api_secret.trim()))
    }

    /// 未設定時不設逾時
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for OutsetaConfig {
    fn validate(&self) -> Result<()> {
        match &self.base_url {
            Some(base_url) => validation::validate_url(ENV_BASE_URL, base_url)?,
            None => {
                let subdomain =
                    validation::validate_required_field(ENV_SUBDOMAIN, &self.subdomain)?;
                validation::validate_subdomain(ENV_SUBDOMAIN, subdomain)?;
            }
        }

        if let Some(timeout) = self.timeout_seconds {
            validation::validate_positive_number(ENV_TIMEOUT_SECONDS, timeout, 1)?;
        }

        Ok(())
    }
}
