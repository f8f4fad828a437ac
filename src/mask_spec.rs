// マスク種別とバックエンドの maskingType / maskingValue の対応
//
// | kind    | maskingType | maskingValue |
// |---------|-------------|--------------|
// | Default | FULL        | D:           |
// | Null    | FULL        | N:           |
// | Literal | FULL        | L:<value>    |
// | Partial | PARTIAL     | P:<s,c,n>    |

use crate::config::masks;
use clap::ValueEnum;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static PARTIAL_FORMAT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d+,[^,],\d+$").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaskKind {
    /// Default mask provided by clients (D:)
    Default,
    /// Sets masked value to null, any type (N:)
    Null,
    /// Replace value with a literal, not for RAW/LOGICAL (L:value)
    Literal,
    /// Partially mask character fields (P:start,maskChar,count)
    Partial,
}

impl fmt::Display for MaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MaskKind::Default => "DEFAULT",
            MaskKind::Null => "NULL",
            MaskKind::Literal => "LITERAL",
            MaskKind::Partial => "PARTIAL",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaskSpecError {
    #[error("Literal mask requires a value (e.g., MASKED)")]
    LiteralValueRequired,

    #[error("Partial mask requires a format (e.g., 0,X,4)")]
    PartialFormatRequired,

    #[error("Partial mask must be start,maskChar,count (e.g., 0,X,4)")]
    InvalidPartialFormat,
}

/// バックエンドに送るマスク指定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaskSpec {
    pub kind: MaskKind,
    pub masking_type: String,
    pub masking_value: String,
}

fn is_partial_format(value: &str) -> bool {
    PARTIAL_FORMAT
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

impl MaskSpec {
    /// フォームの mask kind と値から組み立てる
    ///
    /// Literal / Partial 以外では `value` は無視される。
    pub fn build(kind: MaskKind, value: Option<&str>) -> Result<Self, MaskSpecError> {
        let value = value.unwrap_or_default();

        let (masking_type, masking_value) = match kind {
            MaskKind::Default => (masks::MASKING_TYPE_FULL, masks::DEFAULT_CODE.to_string()),
            MaskKind::Null => (masks::MASKING_TYPE_FULL, masks::NULL_CODE.to_string()),
            MaskKind::Literal => {
                if value.trim().is_empty() {
                    return Err(MaskSpecError::LiteralValueRequired);
                }
                (
                    masks::MASKING_TYPE_FULL,
                    format!("{}{value}", masks::LITERAL_PREFIX),
                )
            }
            MaskKind::Partial => {
                if value.trim().is_empty() {
                    return Err(MaskSpecError::PartialFormatRequired);
                }
                if !is_partial_format(value) {
                    return Err(MaskSpecError::InvalidPartialFormat);
                }
                (
                    masks::MASKING_TYPE_PARTIAL,
                    format!("{}{value}", masks::PARTIAL_PREFIX),
                )
            }
        };

        Ok(MaskSpec {
            kind,
            masking_type: masking_type.to_string(),
            masking_value,
        })
    }

    /// `D:` / `N:` / `L:x` / `P:s,c,n` の短縮形を読み戻す
    pub fn parse_short_form(text: &str) -> Option<Self> {
        let text = text.trim();
        if text == masks::DEFAULT_CODE {
            return Self::build(MaskKind::Default, None).ok();
        }
        if text == masks::NULL_CODE {
            return Self::build(MaskKind::Null, None).ok();
        }
        if let Some(literal) = text.strip_prefix(masks::LITERAL_PREFIX) {
            return Self::build(MaskKind::Literal, Some(literal)).ok();
        }
        if let Some(partial) = text.strip_prefix(masks::PARTIAL_PREFIX) {
            return Self::build(MaskKind::Partial, Some(partial)).ok();
        }
        None
    }
}

/// 部分マスクが適用できるフィールド型か (型が不明な場合は許可する)
pub fn supports_partial_mask(field_type: Option<&str>) -> bool {
    match field_type.map(str::trim) {
        None | Some("") => true,
        Some(t) => t.eq_ignore_ascii_case(masks::PARTIAL_FIELD_TYPE),
    }
}
