// 一覧系エンドポイントの `result` (カンマ区切り文字列) を分解する

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TagRole {
    pub name: String,
    pub role: String,
}

/// `a, b,,c` -> `["a", "b", "c"]`
pub fn split_result_list(result: &str) -> Vec<String> {
    result
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// `role|count` 形式。件数が無い・数値でない場合は 0
pub fn parse_role_counts(result: &str) -> Vec<RoleCount> {
    split_result_list(result)
        .into_iter()
        .map(|item| {
            let mut parts = item.splitn(2, '|');
            let name = parts.next().unwrap_or_default().trim().to_string();
            let count = parts
                .next()
                .and_then(|c| c.trim().parse::<u64>().ok())
                .unwrap_or(0);
            RoleCount { name, count }
        })
        .collect()
}

/// `tag|role` 形式。欠けている部分は空文字列
pub fn parse_tag_roles(result: &str) -> Vec<TagRole> {
    split_result_list(result)
        .into_iter()
        .map(|item| {
            let mut parts = item.splitn(2, '|');
            TagRole {
                name: parts.next().unwrap_or_default().trim().to_string(),
                role: parts.next().unwrap_or_default().trim().to_string(),
            }
        })
        .collect()
}
