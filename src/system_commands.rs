use crate::api_types::api_schemas;
use crate::config::{api, app};
use crate::config_summary::{parse_config_summary, ParsedConfigSummary};
use crate::ddm_client::normalize_base_url;
use crate::tag_validator::authorization_tag_validation_error;
use crate::{AppError, AppResult};
use anyhow::Context;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// =============================================================================
// 設定ファイル (パスワードは保存しない)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsoleSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub username: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            base_url: api::DEFAULT_BASE_URL.to_string(),
            timeout_secs: api::DEFAULT_TIMEOUT_SECS,
            username: None,
            updated_at: None,
        }
    }
}

/// `config set` で変更する項目
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub username: Option<String>,
}

impl ConsoleSettings {
    pub fn apply(&mut self, update: SettingsUpdate) -> AppResult<()> {
        if let Some(base_url) = update.base_url {
            normalize_base_url(&base_url)?;
            self.base_url = base_url.trim().to_string();
        }
        if let Some(timeout_secs) = update.timeout_secs {
            self.timeout_secs = checked_timeout(timeout_secs)?;
        }
        if let Some(username) = update.username {
            // 空文字でユーザー名を削除
            let username = username.trim();
            self.username = (!username.is_empty()).then(|| username.to_string());
        }
        Ok(())
    }
}

fn checked_timeout(timeout_secs: u64) -> AppResult<u64> {
    if timeout_secs == 0 {
        return Err(AppError::config("timeout must be at least 1 second"));
    }
    Ok(timeout_secs)
}

pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(app::CONFIG_DIR_NAME)
        .join(app::SETTINGS_FILENAME)
}

pub fn load_settings_from(path: &Path) -> AppResult<ConsoleSettings> {
    if !path.exists() {
        debug!("No settings file at {}, using defaults", path.display());
        return Ok(ConsoleSettings::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings: {}", path.display()))?;
    let settings = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
    Ok(settings)
}

pub fn save_settings_to(path: &Path, settings: &ConsoleSettings) -> AppResult<ConsoleSettings> {
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }
    }

    let mut saved = settings.clone();
    saved.updated_at = Some(Utc::now());
    let content = serde_json::to_string_pretty(&saved)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to save settings: {}", path.display()))?;

    info!("Saved settings to {}", path.display());
    Ok(saved)
}

pub fn load_settings() -> AppResult<ConsoleSettings> {
    load_settings_from(&settings_path())
}

/// 設定を更新して保存する (`config set`)
pub fn update_settings(update: SettingsUpdate) -> AppResult<ConsoleSettings> {
    let path = settings_path();
    let mut settings = load_settings_from(&path)?;
    settings.apply(update)?;
    save_settings_to(&path, &settings)
}

/// 実行時に使う接続設定
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub username: Option<String>,
}

impl EffectiveSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 優先順位: フラグ / 環境変数 (clap が解決済み) > 設定ファイル > 既定値
pub fn resolve_settings(
    file: &ConsoleSettings,
    base_url: Option<&str>,
    timeout_secs: Option<u64>,
) -> AppResult<EffectiveSettings> {
    let base_url = base_url
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or(&file.base_url)
        .to_string();
    normalize_base_url(&base_url)?;

    let timeout_secs = checked_timeout(timeout_secs.unwrap_or(file.timeout_secs))?;

    Ok(EffectiveSettings {
        base_url,
        timeout_secs,
        username: file.username.clone(),
    })
}

// =============================================================================
// オフラインのヘルパー
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagCheck {
    pub tag: String,
    pub valid: bool,
    pub error: Option<String>,
}

pub fn validate_tag(tag: &str) -> TagCheck {
    let error = authorization_tag_validation_error(tag);
    TagCheck {
        tag: tag.to_string(),
        valid: error.is_none(),
        error,
    }
}

pub fn parse_summary(text: &str) -> ParsedConfigSummary {
    parse_config_summary(text)
}

/// `ddm-console schema` の出力 (--json では `data` に入る)
pub fn api_schema() -> AppResult<serde_json::Value> {
    Ok(serde_json::to_value(api_schemas())?)
}
