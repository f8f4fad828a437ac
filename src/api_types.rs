// API型定義 - DDM REST API (/api/masking) のリクエスト/レスポンス
use crate::config_summary::ParsedConfigSummary;
use crate::mask_spec::{MaskKind, MaskSpec};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// System
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub database: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

/// `{ success, message, error }` を持つレスポンスの共通部分
pub trait BackendOutcome {
    fn succeeded(&self) -> bool;
    fn error_text(&self) -> Option<&str>;
    fn message_text(&self) -> Option<&str>;
}

macro_rules! impl_backend_outcome {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BackendOutcome for $ty {
                fn succeeded(&self) -> bool {
                    self.success
                }
                fn error_text(&self) -> Option<&str> {
                    self.error.as_deref()
                }
                fn message_text(&self) -> Option<&str> {
                    Some(self.message.as_str())
                }
            }
        )*
    };
}

macro_rules! impl_backend_outcome_without_message {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BackendOutcome for $ty {
                fn succeeded(&self) -> bool {
                    self.success
                }
                fn error_text(&self) -> Option<&str> {
                    self.error.as_deref()
                }
                fn message_text(&self) -> Option<&str> {
                    None
                }
            }
        )*
    };
}

/// 失敗レスポンスから表示用メッセージを取り出す
///
/// 空でない `error` を優先し、次に `message`、どちらも無ければ `fallback`。
pub fn response_error_message(
    error: Option<&str>,
    message: Option<&str>,
    fallback: &str,
) -> String {
    [error, message]
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}

// =============================================================================
// Field Operations
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureFieldRequest {
    pub table_name: String,
    pub field_name: String,
    pub masking_type: String,
    pub masking_value: String,
    pub auth_tag: String,
}

impl ConfigureFieldRequest {
    pub fn new(table_name: &str, field_name: &str, mask: &MaskSpec, auth_tag: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            field_name: field_name.to_string(),
            masking_type: mask.masking_type.clone(),
            masking_value: mask.masking_value.clone(),
            auth_tag: auth_tag.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigureFieldResponse {
    pub table_name: String,
    pub field_name: String,
    pub masking_type: String,
    pub masking_value: String,
    pub auth_tag: String,
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldRequest {
    pub table_name: String,
    pub field_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationResponse {
    pub table_name: Option<String>,
    pub field_name: Option<String>,
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
}

// =============================================================================
// Authorization Tags
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthTagRequest {
    pub domain_name: String,
    pub auth_tag_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthTagResponse {
    pub domain_name: String,
    pub auth_tag_name: String,
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthTagRequest {
    pub domain_name: String,
    pub auth_tag_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateAuthTagResponse {
    pub domain_name: String,
    pub auth_tag_name: String,
    pub new_name: String,
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssociateAuthTagRoleRequest {
    pub current_role_name: String,
    pub auth_tag_name: String,
    pub new_role_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AssociateAuthTagRoleResponse {
    pub current_role_name: String,
    pub auth_tag_name: String,
    pub new_role_name: String,
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
}

// =============================================================================
// Roles
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequest {
    pub role_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RoleResponse {
    pub role_name: String,
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrantRoleRequest {
    pub user_name: String,
    pub role_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GrantRoleResponse {
    pub user_name: String,
    pub role_name: String,
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrantRolesRequest {
    pub user_names: Vec<String>,
    pub role_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GrantRolesResponseItem {
    pub user_name: String,
    pub role_name: String,
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GrantRolesResponse {
    pub role_name: String,
    pub results: Vec<GrantRolesResponseItem>,
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteGrantedRoleRequest {
    pub grant_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteGrantedRoleResponse {
    pub grant_id: String,
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    pub user_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UserResponse {
    pub user_name: String,
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
}

// =============================================================================
// Information Retrieval
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MaskAndAuthTagResponse {
    pub table_name: String,
    pub field_name: String,
    pub user_name: Option<String>,
    pub result: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthTagRoleResponse {
    pub domain_name: String,
    pub auth_tag_name: String,
    pub result: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRoleGrantsResponse {
    pub user_name: String,
    pub result: String,
    pub success: bool,
    pub error: Option<String>,
}

/// 一覧系: `result` はカンマ区切り (roles / users / auth-tags / role|count / tag|role)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ListResponse {
    pub result: String,
    pub success: bool,
    pub error: Option<String>,
}

pub type RolesListResponse = ListResponse;
pub type UsersListResponse = ListResponse;
pub type AuthTagsListResponse = ListResponse;
/// `result`: `role|count,...`
pub type RolesWithCountsResponse = ListResponse;
/// `result`: `tag|role,...`
pub type AuthTagsWithRolesResponse = ListResponse;

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RoleAuthTagsListResponse {
    pub role_name: String,
    pub result: String,
    pub success: bool,
    pub error: Option<String>,
}

// =============================================================================
// Schema: Tables and Fields
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TablesListResponse {
    pub tables: Vec<String>,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldsListResponse {
    pub table_name: String,
    pub fields: Vec<String>,
    pub field_types: Option<BTreeMap<String, String>>,
    pub success: bool,
    pub error: Option<String>,
}

impl FieldsListResponse {
    pub fn field_type(&self, field_name: &str) -> Option<&str> {
        self.field_types
            .as_ref()
            .and_then(|types| types.get(field_name))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TableFieldConfigItem {
    pub field_name: String,
    /// バックエンドが返すサマリー文字列
    pub result: String,
    pub mask_value: Option<String>,
    pub auth_tag: Option<String>,
    /// mask_value から判定した種別 (表示用)
    pub mask_kind: Option<MaskKind>,
}

impl TableFieldConfigItem {
    /// サマリーの解析結果で mask / auth tag / 種別を埋める
    pub fn with_parsed(mut self, parsed: ParsedConfigSummary) -> Self {
        self.mask_kind = parsed.mask_kind();
        self.mask_value = parsed.mask_value;
        self.auth_tag = parsed.auth_tag;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TableConfigsResponse {
    pub table_name: String,
    pub items: Vec<TableFieldConfigItem>,
    pub success: bool,
    pub error: Option<String>,
}

impl_backend_outcome!(
    ConfigureFieldResponse,
    OperationResponse,
    AuthTagResponse,
    UpdateAuthTagResponse,
    AssociateAuthTagRoleResponse,
    RoleResponse,
    GrantRoleResponse,
    GrantRolesResponse,
    DeleteGrantedRoleResponse,
    UserResponse,
);

impl_backend_outcome_without_message!(
    MaskAndAuthTagResponse,
    AuthTagRoleResponse,
    UserRoleGrantsResponse,
    ListResponse,
    RoleAuthTagsListResponse,
    TablesListResponse,
    FieldsListResponse,
    TableConfigsResponse,
);

// =============================================================================
// Schema Generation
// =============================================================================

/// API コントラクトの JSON Schema (型名ごと)
pub fn api_schemas() -> BTreeMap<&'static str, schemars::schema::RootSchema> {
    use schemars::schema_for;

    BTreeMap::from([
        ("HealthResponse", schema_for!(HealthResponse)),
        ("ErrorResponse", schema_for!(ErrorResponse)),
        ("ConfigureFieldRequest", schema_for!(ConfigureFieldRequest)),
        ("ConfigureFieldResponse", schema_for!(ConfigureFieldResponse)),
        ("FieldRequest", schema_for!(FieldRequest)),
        ("OperationResponse", schema_for!(OperationResponse)),
        ("AuthTagRequest", schema_for!(AuthTagRequest)),
        ("AuthTagResponse", schema_for!(AuthTagResponse)),
        ("UpdateAuthTagRequest", schema_for!(UpdateAuthTagRequest)),
        ("UpdateAuthTagResponse", schema_for!(UpdateAuthTagResponse)),
        ("AssociateAuthTagRoleRequest", schema_for!(AssociateAuthTagRoleRequest)),
        ("AssociateAuthTagRoleResponse", schema_for!(AssociateAuthTagRoleResponse)),
        ("RoleRequest", schema_for!(RoleRequest)),
        ("RoleResponse", schema_for!(RoleResponse)),
        ("GrantRoleRequest", schema_for!(GrantRoleRequest)),
        ("GrantRoleResponse", schema_for!(GrantRoleResponse)),
        ("GrantRolesRequest", schema_for!(GrantRolesRequest)),
        ("GrantRolesResponse", schema_for!(GrantRolesResponse)),
        ("DeleteGrantedRoleRequest", schema_for!(DeleteGrantedRoleRequest)),
        ("DeleteGrantedRoleResponse", schema_for!(DeleteGrantedRoleResponse)),
        ("CreateUserRequest", schema_for!(CreateUserRequest)),
        ("UserRequest", schema_for!(UserRequest)),
        ("UserResponse", schema_for!(UserResponse)),
        ("MaskAndAuthTagResponse", schema_for!(MaskAndAuthTagResponse)),
        ("AuthTagRoleResponse", schema_for!(AuthTagRoleResponse)),
        ("UserRoleGrantsResponse", schema_for!(UserRoleGrantsResponse)),
        ("ListResponse", schema_for!(ListResponse)),
        ("RoleAuthTagsListResponse", schema_for!(RoleAuthTagsListResponse)),
        ("TablesListResponse", schema_for!(TablesListResponse)),
        ("FieldsListResponse", schema_for!(FieldsListResponse)),
        ("TableConfigsResponse", schema_for!(TableConfigsResponse)),
        ("ParsedConfigSummary", schema_for!(ParsedConfigSummary)),
    ])
}

/// API コントラクトの JSON Schema を生成する
pub fn generate_api_schema() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&api_schemas())
}
