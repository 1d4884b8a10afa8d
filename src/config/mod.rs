#[cfg(feature = "cli")]
pub mod cli;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, WwdError};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_required_field, validate_url,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://api.waywedo.com/v1/";

pub const ENV_API_TOKEN: &str = "WAYWEDO_API_TOKEN";
pub const ENV_BASE_URL: &str = "WAYWEDO_BASE_URL";
pub const ENV_TIMEOUT_SECONDS: &str = "WAYWEDO_TIMEOUT_SECONDS";

/// 客戶端配置：token、API 位址與逾時
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// TOML 檔的最外層，設定都放在 `[client]` 底下
#[derive(Debug, Deserialize)]
struct ConfigFile {
    client: ClientConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: default_base_url(),
            timeout_seconds: None,
        }
    }
}

// token 不可出現在日誌裡
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: Some(api_token.into()),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// 從環境變數載入配置；token 缺少時不在這裡報錯，交給客戶端建構時處理
    pub fn from_env() -> Result<Self> {
        let timeout_seconds = match std::env::var(ENV_TIMEOUT_SECONDS) {
            Ok(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
                WwdError::InvalidConfigValueError {
                    field: ENV_TIMEOUT_SECONDS.to_string(),
                    value: raw.clone(),
                    reason: format!("Not a number of seconds: {}", e),
                }
            })?),
            Err(_) => None,
        };

        Ok(Self {
            api_token: std::env::var(ENV_API_TOKEN).ok(),
            base_url: std::env::var(ENV_BASE_URL).unwrap_or_else(|_| default_base_url()),
            timeout_seconds,
        })
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(WwdError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        let file: ConfigFile = toml::from_str(&processed_content).map_err(|e| {
            WwdError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            }
        })?;

        let mut config = file.client;
        // 沒被替換掉的 ${VAR} 視同未設定
        if config
            .api_token
            .as_deref()
            .is_some_and(|token| token.starts_with("${") && token.ends_with('}'))
        {
            tracing::warn!("api_token placeholder was not resolved from the environment");
            config.api_token = None;
        }

        Ok(config)
    }
}

/// 替換環境變數 (例如 ${WAYWEDO_API_TOKEN})，找不到的保留原樣
fn substitute_env_vars(content: &str) -> Result<String> {
    use regex::Regex;
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| WwdError::ConfigError {
        message: format!("Invalid placeholder pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}

impl ConfigProvider for ClientConfig {
    fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.timeout_seconds
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        let token = validate_required_field("api_token", &self.api_token)?;
        validate_non_empty_string("api_token", token)?;
        validate_url("base_url", &self.base_url)?;
        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number("timeout_seconds", timeout, 1)?;
        }
        Ok(())
    }
}
