use crate::api_types::{response_error_message, BackendOutcome};
use crate::ddm_client::DdmClientError;
use crate::mask_spec::MaskSpecError;
use crate::tag_validator::TagViolation;
use thiserror::Error;

/// アプリケーション全体で使用する統一エラー型
#[derive(Error, Debug)]
pub enum AppError {
    #[error("DDM client error: {0}")]
    Client(#[from] DdmClientError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    // バックエンドが success: false を返した場合 (メッセージはそのまま表示する)
    #[error("{0}")]
    Backend(String),
}

impl AppError {
    /// バリデーションエラーを作成
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 設定エラーを作成
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// バックエンドの失敗レスポンスからエラーを作成
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// 認可タグの違反をフィールド付きのバリデーションエラーに変換
    pub fn tag_violation(field: impl Into<String>, violation: TagViolation) -> Self {
        Self::validation(field, violation.to_string())
    }

    /// マスク指定のエラーを変換
    pub fn mask_spec(field: impl Into<String>, error: MaskSpecError) -> Self {
        Self::validation(field, error.to_string())
    }
}

/// アプリケーション全体で使用するResult型
pub type AppResult<T> = Result<T, AppError>;

/// 必須入力のチェック。前後の空白を除いた値を返す
pub fn require<'a>(field: &str, value: &'a str, message: &str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(field, message));
    }
    Ok(trimmed)
}

/// `success: false` のレスポンスを Backend エラーに変換
pub fn ensure_success<T: BackendOutcome>(response: T, fallback: &str) -> AppResult<T> {
    if response.succeeded() {
        return Ok(response);
    }
    Err(AppError::backend(response_error_message(
        response.error_text(),
        response.message_text(),
        fallback,
    )))
}

/// エラーのカテゴリ分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// ユーザー操作エラー（修正可能）
    UserError,
    /// システムエラー（再試行可能）
    SystemError,
    /// 設定エラー（設定変更が必要）
    ConfigError,
    /// 重大なエラー（アプリケーション終了）
    FatalError,
}

impl AppError {
    /// エラーのカテゴリを取得
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Validation { .. } => ErrorCategory::UserError,
            AppError::Backend(_) => ErrorCategory::UserError,
            AppError::Configuration(_) => ErrorCategory::ConfigError,
            AppError::Client(DdmClientError::Unauthorized) => ErrorCategory::ConfigError,
            AppError::Client(DdmClientError::InvalidUrl { .. }) => ErrorCategory::ConfigError,
            AppError::Client(_) => ErrorCategory::SystemError,
            AppError::Internal(_) => ErrorCategory::SystemError,
            AppError::Serialization(_) => ErrorCategory::FatalError,
        }
    }

    /// ユーザー向けメッセージを取得
    pub fn user_message(&self) -> String {
        match self {
            AppError::Client(DdmClientError::Unauthorized) => {
                "Authentication failed. Check DDM_USERNAME / DDM_PASSWORD.".to_string()
            }
            AppError::Client(DdmClientError::Network { .. }) => {
                "Could not reach the DDM service. Check the base URL and network connection."
                    .to_string()
            }
            AppError::Client(err) => err.to_string(),
            AppError::Internal(err) => format!("Internal error: {err}"),
            AppError::Validation { field, message } => format!("{field}: {message}"),
            AppError::Configuration(msg) => format!("Configuration error: {msg}"),
            AppError::Serialization(_) => "Failed to convert data.".to_string(),
            AppError::Backend(msg) => msg.clone(),
        }
    }

    /// 再試行可能かどうか
    pub fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::SystemError)
    }
}
