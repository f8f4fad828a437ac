use crate::api_types::*;
use crate::config::{api, app};
use log::{debug, warn};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use url::Url;

#[derive(Error, Debug)]
pub enum DdmClientError {
    #[error("Invalid DDM base URL: {url}")]
    InvalidUrl { url: String },

    #[error("Network request failed: {source}")]
    Network { source: reqwest::Error },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Unauthorized (HTTP 401)")]
    Unauthorized,

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Max retries exceeded")]
    RetriesExhausted,
}

// =============================================================================
// Credentials
// =============================================================================

/// HTTP Basic 認証の資格情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// 資格情報の取得元 (グローバル状態は持たず、クライアントに注入する)
pub trait CredentialProvider: Send + Sync {
    fn credentials(&self) -> Option<Credentials>;
}

/// 認証なし
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn credentials(&self) -> Option<Credentials> {
        None
    }
}

/// 固定の資格情報
pub struct StaticCredentials(pub Credentials);

impl CredentialProvider for StaticCredentials {
    fn credentials(&self) -> Option<Credentials> {
        Some(self.0.clone())
    }
}

/// 環境変数 DDM_USERNAME / DDM_PASSWORD から読む
///
/// ユーザー名だけが設定ファイルにある場合は `fallback_username` を使う。
#[derive(Default)]
pub struct EnvCredentials {
    pub fallback_username: Option<String>,
}

impl CredentialProvider for EnvCredentials {
    fn credentials(&self) -> Option<Credentials> {
        let username = std::env::var(app::ENV_USERNAME)
            .ok()
            .filter(|u| !u.is_empty())
            .or_else(|| self.fallback_username.clone())?;
        let password = std::env::var(app::ENV_PASSWORD).unwrap_or_default();
        Some(Credentials { username, password })
    }
}

// =============================================================================
// Client
// =============================================================================

/// GET リクエストの再試行ポリシー (更新系は再試行しない)
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub network_backoff: Duration,
    pub rate_limit_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: api::MAX_RETRIES,
            network_backoff: Duration::from_millis(api::NETWORK_BACKOFF_MS),
            rate_limit_backoff: Duration::from_millis(api::RATE_LIMIT_BACKOFF_MS),
        }
    }
}

fn backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2_u32.saturating_pow(attempt.saturating_sub(1)))
}

pub struct DdmClient {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
    retry: RetryPolicy,
}

impl DdmClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, DdmClientError> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ddm-console/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| DdmClientError::Network { source })?;

        Ok(DdmClient {
            client,
            base_url,
            credentials,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, DdmClientError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|_| DdmClientError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
            })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match self.credentials.credentials() {
            Some(creds) => builder.basic_auth(creds.username, Some(creds.password)),
            None => builder,
        }
    }

    // リトライ機能付き GET
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, DdmClientError> {
        let url = self.endpoint(path, query)?;
        let mut last_error = None;

        for attempt in 1..=self.retry.max_attempts {
            debug!("API Request: GET {}", url.path());

            match self.request(Method::GET, url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    debug!("API Response: {} {}", status.as_u16(), url.path());

                    if status == StatusCode::TOO_MANY_REQUESTS && attempt < self.retry.max_attempts
                    {
                        // Rate limited - 指数バックオフで待機
                        let delay = backoff(self.retry.rate_limit_backoff, attempt);
                        warn!("Rate limited (429) on {}, retrying in {delay:?}", url.path());
                        sleep(delay).await;
                        last_error = Some(DdmClientError::Http {
                            status: status.as_u16(),
                            message: "Rate limited".to_string(),
                        });
                        continue;
                    }

                    return decode(response).await;
                }
                Err(e) => {
                    warn!("Network error on GET {} (attempt {attempt}): {e}", url.path());
                    last_error = Some(DdmClientError::Network { source: e });
                    if attempt < self.retry.max_attempts {
                        sleep(backoff(self.retry.network_backoff, attempt)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or(DdmClientError::RetriesExhausted))
    }

    // 更新系 (POST / DELETE)。二重実行を避けるため再試行しない
    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, DdmClientError> {
        let url = self.endpoint(path, &[])?;
        debug!("API Request: {method} {}", url.path());

        let response = self
            .request(method, url.clone())
            .json(body)
            .send()
            .await
            .map_err(|source| DdmClientError::Network { source })?;
        debug!("API Response: {} {}", response.status().as_u16(), url.path());

        decode(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DdmClientError> {
        self.send(Method::POST, path, body).await
    }

    async fn delete<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DdmClientError> {
        self.send(Method::DELETE, path, body).await
    }

    // ============ HEALTH ============

    pub async fn health(&self) -> Result<HealthResponse, DdmClientError> {
        self.get(api::HEALTH, &[]).await
    }

    // ============ FIELD OPERATIONS ============

    pub async fn configure_field(
        &self,
        request: &ConfigureFieldRequest,
    ) -> Result<ConfigureFieldResponse, DdmClientError> {
        self.post(api::CONFIGURE_FIELD, request).await
    }

    pub async fn unset_mask(
        &self,
        request: &FieldRequest,
    ) -> Result<OperationResponse, DdmClientError> {
        self.post(api::UNSET_MASK, request).await
    }

    pub async fn unset_auth_tag(
        &self,
        request: &FieldRequest,
    ) -> Result<OperationResponse, DdmClientError> {
        self.post(api::UNSET_AUTH_TAG, request).await
    }

    // ============ AUTHORIZATION TAGS ============

    pub async fn create_auth_tag(
        &self,
        request: &AuthTagRequest,
    ) -> Result<AuthTagResponse, DdmClientError> {
        self.post(api::CREATE_AUTH_TAG, request).await
    }

    pub async fn update_auth_tag(
        &self,
        request: &UpdateAuthTagRequest,
    ) -> Result<UpdateAuthTagResponse, DdmClientError> {
        self.post(api::UPDATE_AUTH_TAG, request).await
    }

    pub async fn delete_auth_tag(
        &self,
        request: &AuthTagRequest,
    ) -> Result<AuthTagResponse, DdmClientError> {
        self.delete(api::DELETE_AUTH_TAG, request).await
    }

    pub async fn associate_auth_tag_role(
        &self,
        request: &AssociateAuthTagRoleRequest,
    ) -> Result<AssociateAuthTagRoleResponse, DdmClientError> {
        self.post(api::ASSOCIATE_AUTH_TAG_ROLE, request).await
    }

    // ============ ROLE MANAGEMENT ============

    pub async fn create_role(&self, request: &RoleRequest) -> Result<RoleResponse, DdmClientError> {
        self.post(api::CREATE_ROLE, request).await
    }

    pub async fn delete_role(&self, request: &RoleRequest) -> Result<RoleResponse, DdmClientError> {
        self.delete(api::DELETE_ROLE, request).await
    }

    pub async fn grant_role(
        &self,
        request: &GrantRoleRequest,
    ) -> Result<GrantRoleResponse, DdmClientError> {
        self.post(api::GRANT_ROLE, request).await
    }

    pub async fn grant_roles(
        &self,
        request: &GrantRolesRequest,
    ) -> Result<GrantRolesResponse, DdmClientError> {
        self.post(api::GRANT_ROLES, request).await
    }

    pub async fn delete_granted_role(
        &self,
        request: &DeleteGrantedRoleRequest,
    ) -> Result<DeleteGrantedRoleResponse, DdmClientError> {
        self.delete(api::DELETE_GRANTED_ROLE, request).await
    }

    // ============ USER MANAGEMENT ============

    pub async fn create_user(
        &self,
        request: &CreateUserRequest,
    ) -> Result<UserResponse, DdmClientError> {
        self.post(api::CREATE_USER, request).await
    }

    pub async fn delete_user(&self, request: &UserRequest) -> Result<UserResponse, DdmClientError> {
        self.delete(api::DELETE_USER, request).await
    }

    pub async fn grant_security_admin(
        &self,
        request: &UserRequest,
    ) -> Result<UserResponse, DdmClientError> {
        self.post(api::GRANT_SECURITY_ADMIN, request).await
    }

    // ============ INFORMATION RETRIEVAL ============

    pub async fn get_mask_and_auth_tag(
        &self,
        table_name: &str,
        field_name: &str,
        user_name: Option<&str>,
    ) -> Result<MaskAndAuthTagResponse, DdmClientError> {
        let mut query = vec![("tableName", table_name), ("fieldName", field_name)];
        if let Some(user) = user_name {
            query.push(("userName", user));
        }
        self.get(api::MASK_AND_AUTH_TAG, &query).await
    }

    pub async fn get_auth_tag_role(
        &self,
        domain_name: &str,
        auth_tag_name: &str,
    ) -> Result<AuthTagRoleResponse, DdmClientError> {
        self.get(
            api::AUTH_TAG_ROLE,
            &[("domainName", domain_name), ("authTagName", auth_tag_name)],
        )
        .await
    }

    pub async fn get_user_role_grants(
        &self,
        user_name: &str,
    ) -> Result<UserRoleGrantsResponse, DdmClientError> {
        self.get(api::USER_ROLE_GRANTS, &[("userName", user_name)])
            .await
    }

    // ============ LISTS ============

    pub async fn get_roles(&self) -> Result<ListResponse, DdmClientError> {
        self.get(api::ROLES, &[]).await
    }

    pub async fn get_role_auth_tags(
        &self,
        role_name: &str,
    ) -> Result<RoleAuthTagsListResponse, DdmClientError> {
        self.get(api::ROLE_AUTH_TAGS, &[("roleName", role_name)])
            .await
    }

    pub async fn get_users(&self) -> Result<ListResponse, DdmClientError> {
        self.get(api::USERS, &[]).await
    }

    pub async fn get_auth_tags(&self) -> Result<ListResponse, DdmClientError> {
        self.get(api::AUTH_TAGS, &[]).await
    }

    pub async fn get_roles_with_counts(&self) -> Result<ListResponse, DdmClientError> {
        self.get(api::ROLES_WITH_COUNTS, &[]).await
    }

    pub async fn get_auth_tags_with_roles(&self) -> Result<ListResponse, DdmClientError> {
        self.get(api::AUTH_TAGS_WITH_ROLES, &[]).await
    }

    // ============ SCHEMA ============

    pub async fn get_tables(&self) -> Result<TablesListResponse, DdmClientError> {
        self.get(api::TABLES, &[]).await
    }

    pub async fn get_fields(&self, table_name: &str) -> Result<FieldsListResponse, DdmClientError> {
        self.get(api::FIELDS, &[("tableName", table_name)]).await
    }

    pub async fn get_table_configs(
        &self,
        table_name: &str,
    ) -> Result<TableConfigsResponse, DdmClientError> {
        self.get(api::TABLE_CONFIGS, &[("tableName", table_name)])
            .await
    }
}

/// ベース URL を検証し、`join` が最後のセグメントを置き換えないよう末尾に `/` を付ける
pub fn normalize_base_url(base_url: &str) -> Result<Url, DdmClientError> {
    let invalid = || DdmClientError::InvalidUrl {
        url: base_url.to_string(),
    };

    let trimmed = base_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };

    let url = Url::parse(&with_slash).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(invalid());
    }
    Ok(url)
}

// レスポンスの解釈: 401 / 非 2xx / JSON デコード
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, DdmClientError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        return Err(DdmClientError::Unauthorized);
    }

    let body = response
        .text()
        .await
        .map_err(|source| DdmClientError::Network { source })?;

    if !status.is_success() {
        // バックエンドの { "error": ... } を優先して表示する
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .map(|e| e.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        return Err(DdmClientError::Http {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| DdmClientError::Decode {
        message: e.to_string(),
    })
}
