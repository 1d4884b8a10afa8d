use thiserror::Error;

#[derive(Error, Debug)]
pub enum WwdError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Request failed with status code {status}")]
    HttpStatus { status: u16 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl WwdError {
    /// 非成功狀態碼（僅 `HttpStatus` 才有）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            WwdError::HttpStatus { status } => Some(*status),
            _ => None,
        }
    }

    /// 是否為建構階段的配置錯誤（尚未送出任何請求）
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            WwdError::ConfigError { .. }
                | WwdError::MissingConfigError { .. }
                | WwdError::InvalidConfigValueError { .. }
        )
    }

    /// 給 CLI 使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            WwdError::MissingConfigError { field } if field == "api_token" => {
                "No API token configured. Pass --token or set WAYWEDO_API_TOKEN.".to_string()
            }
            WwdError::HttpStatus { status } => {
                format!("The server rejected the request (HTTP {})", status)
            }
            WwdError::ApiError(e) if e.is_timeout() => "The request timed out".to_string(),
            WwdError::ApiError(e) if e.is_connect() => {
                "Could not connect to the API server".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WwdError>;
