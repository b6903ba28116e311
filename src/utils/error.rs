use crate::domain::model::EntityValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutsetaError {
    /// 本地輸入格式錯誤，在任何網路請求之前偵測
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    /// 遠端缺少必要的關聯資料（例如沒有 current subscription）
    #[error("{message}")]
    PreconditionError { message: String },

    #[error("{endpoint}: [{status}] {message}")]
    ApiError {
        endpoint: String,
        status: u16,
        message: String,
        validation_errors: Vec<EntityValidationError>,
    },

    #[error("JWK Set verification failed: {cause}")]
    KeySetVerificationError { cause: String },

    #[error("Profile endpoint verification failed: {}", describe_rejection(.status, .message))]
    ProfileVerificationError { status: Option<u16>, message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Exited.")]
    Interrupted,
}

fn describe_rejection(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("[{}] {}", status, message),
        None => message.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Precondition,
    Remote,
    Verification,
    Transport,
    Configuration,
    Interrupted,
}

impl OutsetaError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::PreconditionError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } => ErrorCategory::Input,
            Self::PreconditionError { .. } => ErrorCategory::Precondition,
            Self::ApiError { .. } => ErrorCategory::Remote,
            Self::KeySetVerificationError { .. } | Self::ProfileVerificationError { .. } => {
                ErrorCategory::Verification
            }
            Self::HttpError(_) | Self::SerializationError(_) | Self::IoError(_) => {
                ErrorCategory::Transport
            }
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::Interrupted => ErrorCategory::Interrupted,
        }
    }

    /// 中斷（Ctrl+C / EOF）一律視為正常結束
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Interrupted => 0,
            _ => 1,
        }
    }

    /// 遠端回報的欄位驗證錯誤（若有）
    pub fn validation_errors(&self) -> &[EntityValidationError] {
        match self {
            Self::ApiError {
                validation_errors, ..
            } => validation_errors,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, OutsetaError>;
