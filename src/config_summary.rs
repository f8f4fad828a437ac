// フィールド設定サマリーの解析
// バックエンドは mask / auth tag の状態を人間向けの文字列でしか返さないため、
// 表示用に best-effort で値を取り出す。結果は参考情報であり、検証には使わない。

use crate::config::masks;
use crate::mask_spec::{MaskKind, MaskSpec};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedConfigSummary {
    pub mask_value: Option<String>,
    pub auth_tag: Option<String>,
}

impl ParsedConfigSummary {
    pub fn is_empty(&self) -> bool {
        self.mask_value.is_none() && self.auth_tag.is_none()
    }

    /// 未解決の値はプレースホルダ ("–") で表示する
    pub fn display_mask(&self) -> &str {
        self.mask_value.as_deref().unwrap_or(masks::PLACEHOLDER)
    }

    pub fn display_auth_tag(&self) -> &str {
        self.auth_tag.as_deref().unwrap_or(masks::PLACEHOLDER)
    }

    /// マスク値の短縮形からマスク種別を判定する (`P:0` のような不完全な値は None)
    pub fn mask_kind(&self) -> Option<MaskKind> {
        self.mask_value
            .as_deref()
            .and_then(MaskSpec::parse_short_form)
            .map(|spec| spec.kind)
    }
}

// パターンは固定文字列なので、コンパイル失敗時はそのルールを無効として扱う
static MASK_THEN_AUTH_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)mask\s*[:=]\s*([^,;\n]+).*?auth\s*tag\s*[:=]\s*([^,;\n]+)").ok()
});

static AUTH_TAG_THEN_MASK: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)auth\s*tag\s*[:=]\s*([^,;\n]+).*?mask\s*[:=]\s*([^,;\n]+)").ok()
});

static VERBOSE_LABELS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)mask\s*value\s*[:=]\s*([^,;\n]+).*?auth\s*tag\s*[:=]\s*([^,;\n]+)").ok()
});

static MASK_TOKEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b(D:|N:|L:[^,;\s]+|P:\d+,[^,],\d+)").ok());

static AUTH_TAG_TOKEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)#DDM_See_[A-Za-z0-9_.\-#$%&]+").ok());

/// 抽出ルール (優先順)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryRule {
    /// `mask: X ... auth tag: Y`
    MaskThenAuthTag,
    /// `auth tag: Y ... mask: X`
    AuthTagThenMask,
    /// `Mask Value: X ... Auth Tag: Y`
    VerboseLabels,
    /// ラベルが無い場合: D:/N:/L:/P: トークンと #DDM_See_ トークンを個別に探す
    TokenScan,
}

impl SummaryRule {
    pub const ORDERED: [SummaryRule; 4] = [
        SummaryRule::MaskThenAuthTag,
        SummaryRule::AuthTagThenMask,
        SummaryRule::VerboseLabels,
        SummaryRule::TokenScan,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SummaryRule::MaskThenAuthTag => "mask-then-auth-tag",
            SummaryRule::AuthTagThenMask => "auth-tag-then-mask",
            SummaryRule::VerboseLabels => "verbose-labels",
            SummaryRule::TokenScan => "token-scan",
        }
    }

    pub fn try_match(self, text: &str) -> Option<ParsedConfigSummary> {
        match self {
            SummaryRule::MaskThenAuthTag => labeled_pair(MASK_THEN_AUTH_TAG.as_ref(), text, false),
            SummaryRule::AuthTagThenMask => labeled_pair(AUTH_TAG_THEN_MASK.as_ref(), text, true),
            SummaryRule::VerboseLabels => labeled_pair(VERBOSE_LABELS.as_ref(), text, false),
            SummaryRule::TokenScan => token_scan(text),
        }
    }
}

fn non_blank(value: Option<regex::Match<'_>>) -> Option<String> {
    value
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn labeled_pair(
    pattern: Option<&Regex>,
    text: &str,
    auth_tag_first: bool,
) -> Option<ParsedConfigSummary> {
    let captures = pattern?.captures(text)?;
    let (first, second) = (non_blank(captures.get(1)), non_blank(captures.get(2)));

    let (mask_value, auth_tag) = if auth_tag_first {
        (second, first)
    } else {
        (first, second)
    };

    Some(ParsedConfigSummary {
        mask_value,
        auth_tag,
    })
}

fn token_scan(text: &str) -> Option<ParsedConfigSummary> {
    let mask_value = MASK_TOKEN
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|c| non_blank(c.get(1)));
    let auth_tag = AUTH_TAG_TOKEN
        .as_ref()
        .and_then(|re| re.find(text))
        .map(|m| m.as_str().to_string());

    let parsed = ParsedConfigSummary {
        mask_value,
        auth_tag,
    };
    (!parsed.is_empty()).then_some(parsed)
}

/// サマリー文字列から mask / auth tag を取り出す
///
/// ルールを優先順に試し、最初にマッチしたものを採用する。
/// どのルールにも当てはまらない場合は空の結果を返す (エラーにはしない)。
pub fn parse_config_summary(text: &str) -> ParsedConfigSummary {
    if text.is_empty() {
        return ParsedConfigSummary::default();
    }

    SummaryRule::ORDERED
        .iter()
        .find_map(|rule| {
            let parsed = rule.try_match(text)?;
            log::debug!("config summary matched by {}", rule.name());
            Some(parsed)
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parsed(mask: Option<&str>, tag: Option<&str>) -> ParsedConfigSummary {
        ParsedConfigSummary {
            mask_value: mask.map(str::to_string),
            auth_tag: tag.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_config_summary(""), ParsedConfigSummary::default());
        assert!(parse_config_summary("").is_empty());
    }

    #[test]
    fn test_mask_then_auth_tag() {
        assert_eq!(
            parse_config_summary("mask: D:, auth tag: #DDM_See_PII"),
            parsed(Some("D:"), Some("#DDM_See_PII"))
        );
        assert_eq!(
            parse_config_summary("MASK=N:; Auth Tag = #ddm_see_Hr"),
            parsed(Some("N:"), Some("#ddm_see_Hr"))
        );
    }

    #[test]
    fn test_auth_tag_then_mask() {
        assert_eq!(
            parse_config_summary("auth tag: #DDM_See_PII, mask: L:MASKED"),
            parsed(Some("L:MASKED"), Some("#DDM_See_PII"))
        );
    }

    #[test]
    fn test_verbose_labels() {
        assert_eq!(
            parse_config_summary("Mask Value: L:REDACTED, Auth Tag: #DDM_See_Phone"),
            parsed(Some("L:REDACTED"), Some("#DDM_See_Phone"))
        );
        assert_eq!(
            SummaryRule::VerboseLabels.try_match("Mask Value: L:REDACTED, Auth Tag: #DDM_See_Phone"),
            Some(parsed(Some("L:REDACTED"), Some("#DDM_See_Phone")))
        );
        assert_eq!(
            parse_config_summary("Mask Value = L:***; Auth Tag = #DDM_See_Card"),
            parsed(Some("L:***"), Some("#DDM_See_Card"))
        );
    }

    #[test]
    fn test_labels_must_be_on_one_line() {
        // `.` は改行にマッチしないので、ラベル付きルールは適用されずトークン検索になる
        assert_eq!(
            parse_config_summary("mask: L:X\nauth tag: #DDM_See_A"),
            parsed(Some("L:X"), Some("#DDM_See_A"))
        );
        assert_eq!(
            SummaryRule::MaskThenAuthTag.try_match("mask: L:X\nauth tag: #DDM_See_A"),
            None
        );
    }

    #[test]
    fn test_token_scan_fallback() {
        assert_eq!(
            parse_config_summary(
                "some unrelated text with P:0,X,4 embedded and #DDM_See_Sensitive present"
            ),
            parsed(Some("P:0,X,4"), Some("#DDM_See_Sensitive"))
        );
        assert_eq!(
            parse_config_summary("field is masked with D: only"),
            parsed(Some("D:"), None)
        );
        assert_eq!(
            parse_config_summary("protected by #ddm_SEE_Finance"),
            parsed(None, Some("#ddm_SEE_Finance"))
        );
    }

    #[test]
    fn test_token_scan_requires_word_boundary() {
        assert_eq!(parse_config_summary("ID:42 and XN:1"), ParsedConfigSummary::default());
    }

    #[test]
    fn test_no_tokens() {
        assert_eq!(
            parse_config_summary("no recognizable tokens here"),
            ParsedConfigSummary::default()
        );
    }

    #[test]
    fn test_blank_capture_is_none() {
        assert_eq!(
            parse_config_summary("mask:  , auth tag: #DDM_See_X"),
            parsed(None, Some("#DDM_See_X"))
        );
    }

    #[test]
    fn test_placeholder_display() {
        let result = parsed(Some("D:"), None);
        assert_eq!(result.display_mask(), "D:");
        assert_eq!(result.display_auth_tag(), "–");
    }

    #[test]
    fn test_mask_kind_from_short_form() {
        assert_eq!(parsed(Some("D:"), None).mask_kind(), Some(MaskKind::Default));
        assert_eq!(
            parse_config_summary("Auth Tag: #DDM_See_PII, Mask: L:REDACTED").mask_kind(),
            Some(MaskKind::Literal)
        );
        assert_eq!(
            parse_config_summary("P:0,X,4 #DDM_See_PII").mask_kind(),
            Some(MaskKind::Partial)
        );
        // ラベル付きの部分マスクはカンマで切れるため種別は判定できない
        assert_eq!(parsed(Some("P:0"), None).mask_kind(), None);
        assert_eq!(ParsedConfigSummary::default().mask_kind(), None);
    }

    #[test]
    fn test_rule_order_is_fixed() {
        assert_eq!(SummaryRule::ORDERED[0], SummaryRule::MaskThenAuthTag);
        assert_eq!(SummaryRule::ORDERED[3], SummaryRule::TokenScan);
    }

    proptest! {
        #[test]
        fn prop_parse_is_total(text in "(?s).{0,200}") {
            let first = parse_config_summary(&text);
            prop_assert_eq!(first, parse_config_summary(&text));
        }
    }
}
