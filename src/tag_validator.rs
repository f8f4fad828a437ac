// 認可タグ (authorization tag) のバリデーション
// DDM バックエンドの命名規則に従う:
// - #DDM_See_ で始まる (大文字小文字は区別しない)
// - 最大 64 文字 (バイトではなく文字数)
// - 使用可能文字: A-Z, a-z, 0-9, _ . - # $ % &
// - スペース不可、プレフィックスの後に 1 文字以上必要

use crate::config::auth_tags;
use thiserror::Error;

/// 認可タグの違反種別
///
/// 複数の規則に違反していても報告されるのは常に 1 つだけで、
/// `validate_authorization_tag` のチェック順で最初に失敗したものになる。
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagViolation {
    #[error("Authorization tag is required")]
    Required,

    #[error("Authorization tag must be at most 64 characters")]
    TooLong,

    #[error("Authorization tag cannot contain spaces")]
    ContainsSpace,

    #[error("Authorization tag must start with the required prefix (case-insensitive) \"#DDM_See_\"")]
    MissingPrefix,

    #[error("Authorization tag must include characters after the required prefix")]
    EmptySuffix,

    #[error("Allowed characters: A-Z, a-z, 0-9, and _ . - # $ % &")]
    DisallowedCharacter,
}

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || auth_tags::ALLOWED_SYMBOLS.contains(&c)
}

fn has_required_prefix(tag: &str) -> bool {
    // char 単位で比較するため、先頭が非 ASCII でもスライス境界で panic しない
    let mut chars = tag.chars();
    auth_tags::PREFIX
        .chars()
        .all(|p| matches!(chars.next(), Some(c) if c.eq_ignore_ascii_case(&p)))
}

/// 規則を固定順でチェックし、最初の違反を返す
pub fn validate_authorization_tag(tag: &str) -> Result<(), TagViolation> {
    if tag.is_empty() {
        return Err(TagViolation::Required);
    }

    let length = tag.chars().count();
    if length > auth_tags::MAX_LENGTH {
        return Err(TagViolation::TooLong);
    }

    if tag.contains(' ') {
        return Err(TagViolation::ContainsSpace);
    }

    if !has_required_prefix(tag) {
        return Err(TagViolation::MissingPrefix);
    }

    if length <= auth_tags::PREFIX.chars().count() {
        return Err(TagViolation::EmptySuffix);
    }

    if !tag.chars().all(is_allowed_char) {
        return Err(TagViolation::DisallowedCharacter);
    }

    Ok(())
}

/// 送信ボタンの有効化など、真偽値だけが欲しい場合に使う
pub fn is_valid_authorization_tag(tag: &str) -> bool {
    validate_authorization_tag(tag).is_ok()
}

/// インライン表示用のエラーメッセージ (問題がなければ None)
pub fn authorization_tag_validation_error(tag: &str) -> Option<String> {
    validate_authorization_tag(tag).err().map(|v| v.to_string())
}

/// フォーム入力の境界でのアダプタ: 未入力は空文字列として扱う
pub fn tag_from_form(value: Option<&str>) -> &str {
    value.unwrap_or_default()
}
