use crate::api_types::{
    DeleteGrantedRoleRequest, DeleteGrantedRoleResponse, GrantRoleRequest, GrantRoleResponse,
    GrantRolesRequest, GrantRolesResponse, RoleRequest, RoleResponse,
};
use crate::config::{fallbacks, ui_text};
use crate::errors::{ensure_success, require};
use crate::result_lists::{parse_role_counts, split_result_list, RoleCount};
use crate::{AppError, AppResult, AppState};
use log::{info, warn};

pub async fn create_role(state: &AppState, role_name: &str) -> AppResult<RoleResponse> {
    let role_name = require("roleName", role_name, ui_text::ROLE_NAME_REQUIRED)?;

    let response = state
        .client
        .create_role(&RoleRequest {
            role_name: role_name.to_string(),
        })
        .await?;
    let response = ensure_success(response, fallbacks::CREATE_ROLE)?;

    info!("Created role {role_name}");
    Ok(response)
}

pub async fn delete_role(state: &AppState, role_name: &str) -> AppResult<RoleResponse> {
    let role_name = require("roleName", role_name, ui_text::ROLE_NAME_REQUIRED)?;

    let response = state
        .client
        .delete_role(&RoleRequest {
            role_name: role_name.to_string(),
        })
        .await?;
    let response = ensure_success(response, fallbacks::DELETE_ROLE)?;

    info!("Deleted role {role_name}");
    Ok(response)
}

pub async fn grant_role(
    state: &AppState,
    user_name: &str,
    role_name: &str,
) -> AppResult<GrantRoleResponse> {
    let user_name = require("userName", user_name, ui_text::USER_NAME_REQUIRED)?;
    let role_name = require("roleName", role_name, ui_text::ROLE_NAME_REQUIRED)?;

    let response = state
        .client
        .grant_role(&GrantRoleRequest {
            user_name: user_name.to_string(),
            role_name: role_name.to_string(),
        })
        .await?;
    ensure_success(response, fallbacks::GRANT_ROLE)
}

/// 複数ユーザーへ一括でロールを付与する
///
/// 一部のユーザーだけ失敗した場合は、失敗したユーザーごとのエラーをまとめて返す。
pub async fn grant_roles(
    state: &AppState,
    user_names: &[String],
    role_name: &str,
) -> AppResult<GrantRolesResponse> {
    let role_name = require("roleName", role_name, ui_text::ROLE_NAME_REQUIRED)?;

    // 空白のみの名前と重複は除く
    let mut users: Vec<String> = Vec::new();
    for name in user_names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if !users.iter().any(|u| u == name) {
            users.push(name.to_string());
        }
    }
    if users.is_empty() {
        return Err(AppError::validation(
            "userNames",
            ui_text::SELECT_AT_LEAST_ONE_USER,
        ));
    }

    let response = state
        .client
        .grant_roles(&GrantRolesRequest {
            user_names: users,
            role_name: role_name.to_string(),
        })
        .await?;

    if response.success {
        return Ok(response);
    }

    let failures: Vec<String> = response
        .results
        .iter()
        .filter(|item| !item.success)
        .map(|item| {
            let reason = item
                .error
                .as_deref()
                .or(item.message.as_deref())
                .unwrap_or(ui_text::REQUEST_FAILED);
            format!("{}: {reason}", item.user_name)
        })
        .collect();
    warn!("Bulk grant of {role_name} failed for {} user(s)", failures.len());

    if failures.is_empty() {
        ensure_success(response, fallbacks::GRANT_ROLES)
    } else {
        Err(AppError::backend(failures.join("; ")))
    }
}

/// grant ID 指定でロール付与を取り消す
pub async fn revoke_grant(state: &AppState, grant_id: &str) -> AppResult<DeleteGrantedRoleResponse> {
    let grant_id = require("grantId", grant_id, ui_text::GRANT_ID_REQUIRED)?;

    let response = state
        .client
        .delete_granted_role(&DeleteGrantedRoleRequest {
            grant_id: grant_id.to_string(),
        })
        .await?;
    ensure_success(response, fallbacks::REVOKE_GRANT)
}

pub async fn list_roles(state: &AppState) -> AppResult<Vec<String>> {
    let response = ensure_success(state.client.get_roles().await?, fallbacks::LOAD)?;
    Ok(split_result_list(&response.result))
}

pub async fn list_roles_with_counts(state: &AppState) -> AppResult<Vec<RoleCount>> {
    let response = ensure_success(state.client.get_roles_with_counts().await?, fallbacks::LOAD)?;
    Ok(parse_role_counts(&response.result))
}

/// ロールに紐づく認可タグ
pub async fn role_auth_tags(state: &AppState, role_name: &str) -> AppResult<Vec<String>> {
    let role_name = require("roleName", role_name, ui_text::ROLE_NAME_REQUIRED)?;
    let response = ensure_success(
        state.client.get_role_auth_tags(role_name).await?,
        fallbacks::LOAD,
    )?;
    Ok(split_result_list(&response.result))
}
