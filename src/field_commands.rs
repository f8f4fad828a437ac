use crate::api_types::{
    ConfigureFieldRequest, ConfigureFieldResponse, FieldRequest, MaskAndAuthTagResponse,
    OperationResponse, TableConfigsResponse,
};
use crate::config::{fallbacks, ui_text};
use crate::config_summary::{parse_config_summary, ParsedConfigSummary};
use crate::errors::{ensure_success, require};
use crate::mask_spec::{supports_partial_mask, MaskKind, MaskSpec};
use crate::{AppError, AppResult, AppState};
use log::{debug, info, warn};
use serde::Serialize;

/// 1 フィールド分のマスク / 認可タグのサマリー
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    pub table_name: String,
    pub field_name: String,
    pub user_name: Option<String>,
    pub result: String,
    pub parsed: ParsedConfigSummary,
    pub mask_kind: Option<MaskKind>,
}

/// フィールドにマスクと認可タグを設定する
pub async fn configure_field(
    state: &AppState,
    table_name: &str,
    field_name: &str,
    kind: MaskKind,
    mask_value: Option<&str>,
    auth_tag: &str,
) -> AppResult<ConfigureFieldResponse> {
    let table_name = require("tableName", table_name, ui_text::TABLE_NAME_REQUIRED)?;
    let field_name = require("fieldName", field_name, ui_text::FIELD_NAME_REQUIRED)?;
    let mask = MaskSpec::build(kind, mask_value).map_err(|e| AppError::mask_spec("maskValue", e))?;
    // 命名規則は作成・改名時のみ。ここでは入力の有無だけを見る
    let auth_tag = require("authTag", auth_tag, ui_text::AUTH_TAG_REQUIRED)?;

    if kind == MaskKind::Partial {
        check_partial_datatype(state, table_name, field_name).await?;
    }

    let request = ConfigureFieldRequest::new(table_name, field_name, &mask, auth_tag);
    let response = state.client.configure_field(&request).await?;
    let response = ensure_success(response, fallbacks::CONFIGURE_FIELD)?;

    info!(
        "Configured {table_name}.{field_name}: {} {} / {auth_tag}",
        mask.masking_type, mask.masking_value
    );
    Ok(response)
}

// 部分マスクは CHARACTER 型のみ。型が取得できない場合はバックエンドの判断に任せる
async fn check_partial_datatype(
    state: &AppState,
    table_name: &str,
    field_name: &str,
) -> AppResult<()> {
    let fields = match state.client.get_fields(table_name).await {
        Ok(fields) if fields.success => fields,
        Ok(fields) => {
            warn!(
                "Could not load field types for {table_name}: {}",
                fields.error.as_deref().unwrap_or(ui_text::REQUEST_FAILED)
            );
            return Ok(());
        }
        Err(e) => {
            warn!("Could not load field types for {table_name}: {e}");
            return Ok(());
        }
    };

    let field_type = fields.field_type(field_name);
    debug!("Field type of {table_name}.{field_name}: {field_type:?}");
    if !supports_partial_mask(field_type) {
        return Err(AppError::validation(
            "maskKind",
            ui_text::PARTIAL_REQUIRES_CHARACTER,
        ));
    }
    Ok(())
}

fn field_request(table_name: &str, field_name: &str) -> AppResult<FieldRequest> {
    Ok(FieldRequest {
        table_name: require("tableName", table_name, ui_text::TABLE_NAME_REQUIRED)?.to_string(),
        field_name: require("fieldName", field_name, ui_text::FIELD_NAME_REQUIRED)?.to_string(),
    })
}

pub async fn unset_mask(
    state: &AppState,
    table_name: &str,
    field_name: &str,
) -> AppResult<OperationResponse> {
    let request = field_request(table_name, field_name)?;
    let response = state.client.unset_mask(&request).await?;
    ensure_success(response, fallbacks::UNSET_MASK)
}

pub async fn unset_auth_tag(
    state: &AppState,
    table_name: &str,
    field_name: &str,
) -> AppResult<OperationResponse> {
    let request = field_request(table_name, field_name)?;
    let response = state.client.unset_auth_tag(&request).await?;
    ensure_success(response, fallbacks::UNSET_AUTH_TAG)
}

/// テーブル全体の設定一覧。各行のサマリー文字列を解析して補完する
pub async fn table_configs(state: &AppState, table_name: &str) -> AppResult<TableConfigsResponse> {
    let table_name = require("tableName", table_name, ui_text::TABLE_NAME_REQUIRED)?;
    let mut response = ensure_success(
        state.client.get_table_configs(table_name).await?,
        fallbacks::LOAD,
    )?;

    response.items = response
        .items
        .into_iter()
        .map(|item| {
            // バックエンドが構造化した値を返した場合はそちらを優先
            let parsed = parse_config_summary(&item.result);
            let merged = ParsedConfigSummary {
                mask_value: item.mask_value.clone().or(parsed.mask_value),
                auth_tag: item.auth_tag.clone().or(parsed.auth_tag),
            };
            item.with_parsed(merged)
        })
        .collect();

    Ok(response)
}

pub async fn mask_and_auth_tag(
    state: &AppState,
    table_name: &str,
    field_name: &str,
    user_name: Option<&str>,
) -> AppResult<FieldSummary> {
    let table_name = require("tableName", table_name, ui_text::TABLE_NAME_REQUIRED)?;
    let field_name = require("fieldName", field_name, ui_text::FIELD_NAME_REQUIRED)?;
    let user_name = user_name.map(str::trim).filter(|u| !u.is_empty());

    let response: MaskAndAuthTagResponse = ensure_success(
        state
            .client
            .get_mask_and_auth_tag(table_name, field_name, user_name)
            .await?,
        fallbacks::LOAD,
    )?;

    let parsed = parse_config_summary(&response.result);
    Ok(FieldSummary {
        table_name: table_name.to_string(),
        field_name: field_name.to_string(),
        user_name: user_name.map(str::to_string),
        mask_kind: parsed.mask_kind(),
        parsed,
        result: response.result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_request_requires_both_names() {
        let err = field_request("Customer", " ").unwrap_err();
        assert_eq!(err.user_message(), "fieldName: Field name is required");

        let request = field_request(" Customer ", "Phone").unwrap();
        assert_eq!(request.table_name, "Customer");
    }
}
