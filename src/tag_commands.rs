use crate::api_types::{
    AssociateAuthTagRoleRequest, AssociateAuthTagRoleResponse, AuthTagRequest, AuthTagResponse,
    UpdateAuthTagRequest, UpdateAuthTagResponse,
};
use crate::config::{fallbacks, ui_text};
use crate::errors::{ensure_success, require};
use crate::result_lists::{parse_tag_roles, split_result_list, TagRole};
use crate::tag_validator::validate_authorization_tag;
use crate::{AppError, AppResult, AppState};
use log::info;

// 認可タグ名のチェック (前後の空白は除く)
fn checked_tag<'a>(field: &str, tag: &'a str) -> AppResult<&'a str> {
    let tag = tag.trim();
    validate_authorization_tag(tag).map_err(|v| AppError::tag_violation(field, v))?;
    Ok(tag)
}

pub async fn create_auth_tag(
    state: &AppState,
    domain_name: &str,
    auth_tag_name: &str,
) -> AppResult<AuthTagResponse> {
    let domain_name = require("domainName", domain_name, ui_text::DOMAIN_NAME_REQUIRED)?;
    let auth_tag_name = checked_tag("authTagName", auth_tag_name)?;

    let response = state
        .client
        .create_auth_tag(&AuthTagRequest {
            domain_name: domain_name.to_string(),
            auth_tag_name: auth_tag_name.to_string(),
        })
        .await?;
    let response = ensure_success(response, fallbacks::CREATE_AUTH_TAG)?;

    info!("Created authorization tag {auth_tag_name} in domain {domain_name}");
    Ok(response)
}

pub async fn update_auth_tag(
    state: &AppState,
    domain_name: &str,
    auth_tag_name: &str,
    new_name: &str,
) -> AppResult<UpdateAuthTagResponse> {
    let domain_name = require("domainName", domain_name, ui_text::DOMAIN_NAME_REQUIRED)?;
    let auth_tag_name = checked_tag("authTagName", auth_tag_name)?;
    let new_name = checked_tag("newName", new_name)?;

    let response = state
        .client
        .update_auth_tag(&UpdateAuthTagRequest {
            domain_name: domain_name.to_string(),
            auth_tag_name: auth_tag_name.to_string(),
            new_name: new_name.to_string(),
        })
        .await?;
    let response = ensure_success(response, fallbacks::UPDATE_AUTH_TAG)?;

    info!("Renamed authorization tag {auth_tag_name} -> {new_name}");
    Ok(response)
}

pub async fn delete_auth_tag(
    state: &AppState,
    domain_name: &str,
    auth_tag_name: &str,
) -> AppResult<AuthTagResponse> {
    let domain_name = require("domainName", domain_name, ui_text::DOMAIN_NAME_REQUIRED)?;
    let auth_tag_name = checked_tag("authTagName", auth_tag_name)?;

    let response = state
        .client
        .delete_auth_tag(&AuthTagRequest {
            domain_name: domain_name.to_string(),
            auth_tag_name: auth_tag_name.to_string(),
        })
        .await?;
    let response = ensure_success(response, fallbacks::DELETE_AUTH_TAG)?;

    info!("Deleted authorization tag {auth_tag_name}");
    Ok(response)
}

/// 認可タグを別のロールに付け替える
pub async fn associate_auth_tag_role(
    state: &AppState,
    current_role_name: &str,
    auth_tag_name: &str,
    new_role_name: &str,
) -> AppResult<AssociateAuthTagRoleResponse> {
    let current_role_name = require(
        "currentRoleName",
        current_role_name,
        ui_text::CURRENT_ROLE_REQUIRED,
    )?;
    let auth_tag_name = checked_tag("authTagName", auth_tag_name)?;
    let new_role_name = require("newRoleName", new_role_name, ui_text::NEW_ROLE_REQUIRED)?;

    let response = state
        .client
        .associate_auth_tag_role(&AssociateAuthTagRoleRequest {
            current_role_name: current_role_name.to_string(),
            auth_tag_name: auth_tag_name.to_string(),
            new_role_name: new_role_name.to_string(),
        })
        .await?;
    ensure_success(response, fallbacks::REASSIGN_AUTH_TAG)
}

pub async fn list_auth_tags(state: &AppState) -> AppResult<Vec<String>> {
    let response = ensure_success(state.client.get_auth_tags().await?, fallbacks::LOAD)?;
    Ok(split_result_list(&response.result))
}

pub async fn list_auth_tags_with_roles(state: &AppState) -> AppResult<Vec<TagRole>> {
    let response = ensure_success(
        state.client.get_auth_tags_with_roles().await?,
        fallbacks::LOAD,
    )?;
    Ok(parse_tag_roles(&response.result))
}
