use crate::utils::error::{OutsetaError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 選用的 TOML 設定檔，例如：
///
/// ```toml
/// [outseta]
/// subdomain = "acme"
/// api_key = "${OUTSETA_API_KEY}"
/// api_secret = "${OUTSETA_API_SECRET}"
/// timeout_seconds = 30
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub outseta: OutsetaSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutsetaSection {
    pub subdomain: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OutsetaError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| OutsetaError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OUTSETA_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| OutsetaError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("OUTSETA_TOML_TEST_SECRET", "s3cr3t");

        let toml_content = r#"
[outseta]
subdomain = "acme"
api_secret = "${OUTSETA_TOML_TEST_SECRET}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.outseta.api_secret.as_deref(), Some("s3cr3t"));

        std::env::remove_var("OUTSETA_TOML_TEST_SECRET");
    }

    #[test]
    fn test_unknown_variable_is_left_as_is() {
        let config = TomlConfig::from_toml_str(
            "[outseta]\napi_key = \"${OUTSETA_TOML_TEST_NEVER_SET}\"\n",
        )
        .unwrap();
        assert_eq!(
            config.outseta.api_key.as_deref(),
            Some("${OUTSETA_TOML_TEST_NEVER_SET}")
        );
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[outseta\nsubdomain = 1").unwrap_err();
        assert!(matches!(err, OutsetaError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[outseta]
subdomain = "file-test"
timeout_seconds = 15
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.outseta.subdomain.as_deref(), Some("file-test"));
        assert_eq!(config.outseta.timeout_seconds, Some(15));
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.outseta.subdomain.is_none());
    }
}
