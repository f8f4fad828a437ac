use crate::api_types::{CreateUserRequest, UserRequest, UserResponse};
use crate::config::{fallbacks, forms, ui_text};
use crate::errors::{ensure_success, require};
use crate::result_lists::split_result_list;
use crate::{AppError, AppResult, AppState};
use log::{info, warn};
use serde::Serialize;

/// ユーザー作成の結果 (セキュリティ管理者の付与は任意)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserOutcome {
    pub user: UserResponse,
    pub security_admin: Option<UserResponse>,
}

fn check_password(password: &str) -> AppResult<()> {
    if password.chars().count() < forms::MIN_PASSWORD_LENGTH {
        return Err(AppError::validation("password", ui_text::PASSWORD_TOO_SHORT));
    }
    Ok(())
}

/// ユーザーを作成し、指定があればセキュリティ管理者権限も付与する
///
/// 付与に失敗した場合、作成済みのユーザーは残したままエラーを返す。
pub async fn create_user(
    state: &AppState,
    user_name: &str,
    password: &str,
    grant_security_admin: bool,
) -> AppResult<CreateUserOutcome> {
    let user_name = require("userName", user_name, ui_text::USER_NAME_REQUIRED)?;
    check_password(password)?;

    let response = state
        .client
        .create_user(&CreateUserRequest {
            user_name: user_name.to_string(),
            password: password.to_string(),
        })
        .await?;
    let user = ensure_success(response, fallbacks::CREATE_USER)?;
    info!("Created user {user_name}");

    let security_admin = if grant_security_admin {
        // 通信エラーも success: false も、作成済みであることを伝える
        let granted = state
            .client
            .grant_security_admin(&UserRequest {
                user_name: user_name.to_string(),
            })
            .await
            .map_err(AppError::from)
            .and_then(|r| ensure_success(r, fallbacks::GRANT_SECURITY_ADMIN));
        match granted {
            Ok(granted) => Some(granted),
            Err(e) => {
                warn!("User {user_name} was created but security admin grant failed: {e}");
                return Err(AppError::backend(format!(
                    "User created, but granting security admin failed: {}",
                    e.user_message()
                )));
            }
        }
    } else {
        None
    };

    Ok(CreateUserOutcome {
        user,
        security_admin,
    })
}

pub async fn delete_user(state: &AppState, user_name: &str) -> AppResult<UserResponse> {
    let user_name = require("userName", user_name, ui_text::USER_NAME_REQUIRED)?;

    let response = state
        .client
        .delete_user(&UserRequest {
            user_name: user_name.to_string(),
        })
        .await?;
    let response = ensure_success(response, fallbacks::DELETE_USER)?;

    info!("Deleted user {user_name}");
    Ok(response)
}

pub async fn grant_security_admin(state: &AppState, user_name: &str) -> AppResult<UserResponse> {
    let user_name = require("userName", user_name, ui_text::USER_NAME_REQUIRED)?;

    let response = state
        .client
        .grant_security_admin(&UserRequest {
            user_name: user_name.to_string(),
        })
        .await?;
    ensure_success(response, fallbacks::GRANT_SECURITY_ADMIN)
}

pub async fn list_users(state: &AppState) -> AppResult<Vec<String>> {
    let response = ensure_success(state.client.get_users().await?, fallbacks::LOAD)?;
    Ok(split_result_list(&response.result))
}
