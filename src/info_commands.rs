use crate::api_types::{AuthTagRoleResponse, FieldsListResponse, HealthResponse, UserRoleGrantsResponse};
use crate::config::{fallbacks, ui_text};
use crate::errors::{ensure_success, require};
use crate::result_lists::split_result_list;
use crate::tag_validator::tag_from_form;
use crate::{AppResult, AppState};
use serde::Serialize;

/// `info fields` の 1 行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRow {
    pub name: String,
    pub field_type: Option<String>,
}

pub async fn health(state: &AppState) -> AppResult<HealthResponse> {
    Ok(state.client.health().await?)
}

pub async fn list_tables(state: &AppState) -> AppResult<Vec<String>> {
    let response = ensure_success(state.client.get_tables().await?, fallbacks::LOAD)?;
    Ok(response.tables)
}

pub async fn list_fields(state: &AppState, table_name: &str) -> AppResult<FieldsListResponse> {
    let table_name = require("tableName", table_name, ui_text::TABLE_NAME_REQUIRED)?;
    ensure_success(state.client.get_fields(table_name).await?, fallbacks::LOAD)
}

/// フィールド名と型を並べる (型が返らないフィールドは None)
pub fn field_rows(response: &FieldsListResponse) -> Vec<FieldRow> {
    response
        .fields
        .iter()
        .map(|name| FieldRow {
            name: name.clone(),
            field_type: response.field_type(name).map(str::to_string),
        })
        .collect()
}

/// 認可タグに紐づくロール
pub async fn auth_tag_role(
    state: &AppState,
    domain_name: &str,
    auth_tag_name: Option<&str>,
) -> AppResult<AuthTagRoleResponse> {
    let domain_name = require("domainName", domain_name, ui_text::DOMAIN_NAME_REQUIRED)?;
    let auth_tag_name = require(
        "authTagName",
        tag_from_form(auth_tag_name),
        ui_text::AUTH_TAG_REQUIRED,
    )?;
    ensure_success(
        state.client.get_auth_tag_role(domain_name, auth_tag_name).await?,
        fallbacks::LOAD,
    )
}

/// ユーザーに付与されたロール (grant ID 付きの文字列のまま返す)
pub async fn user_role_grants(state: &AppState, user_name: &str) -> AppResult<UserRoleGrantsResponse> {
    let user_name = require("userName", user_name, ui_text::USER_NAME_REQUIRED)?;
    ensure_success(
        state.client.get_user_role_grants(user_name).await?,
        fallbacks::USER_ROLE_GRANTS,
    )
}

/// `user_role_grants` の結果を行ごとに分解
pub fn grant_lines(response: &UserRoleGrantsResponse) -> Vec<String> {
    split_result_list(&response.result)
}
