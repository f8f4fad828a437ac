//! Console command tests against a mocked masking service

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ddm_console_lib::ddm_client::{DdmClient, NoCredentials};
use ddm_console_lib::errors::ErrorCategory;
use ddm_console_lib::mask_spec::MaskKind;
use ddm_console_lib::result_lists::{RoleCount, TagRole};
use ddm_console_lib::{
    field_commands, info_commands, role_commands, tag_commands, user_commands, AppError, AppState,
};

const PREFIX: &str = "/web/api/masking";

async fn setup() -> (MockServer, AppState) {
    let server = MockServer::start().await;
    let client = DdmClient::new(
        &format!("{}{PREFIX}", server.uri()),
        Duration::from_secs(5),
        Arc::new(NoCredentials),
    )
    .unwrap();
    (server, AppState::with_client(client))
}

fn ok(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

// ============================================================================
// Authorization tags
// ============================================================================

mod tags {
    use super::*;

    #[tokio::test]
    async fn test_create_trims_and_posts() {
        let (server, state) = setup().await;
        Mock::given(method("POST"))
            .and(path(format!("{PREFIX}/create-auth-tag")))
            .and(body_json(json!({
                "domainName": "sports2020",
                "authTagName": "#DDM_See_PII"
            })))
            .respond_with(ok(json!({ "success": true, "message": "created" })))
            .expect(1)
            .mount(&server)
            .await;

        let res = tag_commands::create_auth_tag(&state, " sports2020 ", "#DDM_See_PII ")
            .await
            .unwrap();
        assert_eq!(res.message, "created");
    }

    #[tokio::test]
    async fn test_invalid_tag_never_reaches_backend() {
        let (server, state) = setup().await;
        Mock::given(method("POST"))
            .respond_with(ok(json!({ "success": true })))
            .expect(0)
            .mount(&server)
            .await;

        let err = tag_commands::create_auth_tag(&state, "sports2020", "DDM_See_PII")
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::UserError);
        assert!(err.user_message().contains("required prefix"));

        let err = tag_commands::create_auth_tag(&state, "", "#DDM_See_PII")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "domainName: Domain name is required");
    }

    #[tokio::test]
    async fn test_update_validates_new_name() {
        let (_server, state) = setup().await;
        let err = tag_commands::update_auth_tag(&state, "sports2020", "#DDM_See_PII", "#DDM_See_ X")
            .await
            .unwrap_err();
        assert_eq!(
            err.user_message(),
            "newName: Authorization tag cannot contain spaces"
        );
    }

    #[tokio::test]
    async fn test_backend_failure_message() {
        let (server, state) = setup().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{PREFIX}/delete-auth-tag")))
            .respond_with(ok(json!({ "success": false, "error": "Tag is in use" })))
            .mount(&server)
            .await;

        let err = tag_commands::delete_auth_tag(&state, "sports2020", "#DDM_See_PII")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Backend(_)));
        assert_eq!(err.to_string(), "Tag is in use");
    }

    #[tokio::test]
    async fn test_failure_without_text_uses_fallback() {
        let (server, state) = setup().await;
        Mock::given(method("POST"))
            .and(path(format!("{PREFIX}/associate-auth-tag-role")))
            .respond_with(ok(json!({ "success": false })))
            .mount(&server)
            .await;

        let err =
            tag_commands::associate_auth_tag_role(&state, "Auditor", "#DDM_See_PII", "Support")
                .await
                .unwrap_err();
        assert_eq!(err.to_string(), "Failed to reassign authorization tag");
    }

    #[tokio::test]
    async fn test_list_with_roles() {
        let (server, state) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{PREFIX}/auth-tags-with-roles")))
            .respond_with(ok(json!({
                "result": "#DDM_See_PII|Auditor,#DDM_See_HR",
                "success": true
            })))
            .mount(&server)
            .await;

        let tags = tag_commands::list_auth_tags_with_roles(&state).await.unwrap();
        assert_eq!(
            tags,
            vec![
                TagRole { name: "#DDM_See_PII".into(), role: "Auditor".into() },
                TagRole { name: "#DDM_See_HR".into(), role: String::new() },
            ]
        );
    }
}

// ============================================================================
// Roles
// ============================================================================

mod roles {
    use super::*;

    #[tokio::test]
    async fn test_grant_bulk_requires_a_user() {
        let (_server, state) = setup().await;
        let err = role_commands::grant_roles(&state, &[" ".to_string()], "Auditor")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "userNames: Select at least one user");
    }

    #[tokio::test]
    async fn test_grant_bulk_dedupes_users() {
        let (server, state) = setup().await;
        Mock::given(method("POST"))
            .and(path(format!("{PREFIX}/grant-roles")))
            .and(body_json(json!({ "userNames": ["alice", "bob"], "roleName": "Auditor" })))
            .respond_with(ok(json!({
                "roleName": "Auditor",
                "results": [
                    { "userName": "alice", "roleName": "Auditor", "success": true },
                    { "userName": "bob", "roleName": "Auditor", "success": true }
                ],
                "success": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let users = vec!["alice".to_string(), "bob".to_string(), " alice ".to_string()];
        let res = role_commands::grant_roles(&state, &users, "Auditor")
            .await
            .unwrap();
        assert_eq!(res.results.len(), 2);
    }

    #[tokio::test]
    async fn test_grant_bulk_partial_failure() {
        let (server, state) = setup().await;
        Mock::given(method("POST"))
            .and(path(format!("{PREFIX}/grant-roles")))
            .respond_with(ok(json!({
                "roleName": "Auditor",
                "results": [
                    { "userName": "alice", "success": true },
                    { "userName": "bob", "success": false, "error": "No such user" }
                ],
                "success": false
            })))
            .mount(&server)
            .await;

        let users = vec!["alice".to_string(), "bob".to_string()];
        let err = role_commands::grant_roles(&state, &users, "Auditor")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "bob: No such user");
    }

    #[tokio::test]
    async fn test_list_with_counts() {
        let (server, state) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{PREFIX}/roles-with-counts")))
            .respond_with(ok(json!({ "result": "Auditor|2, Support|0", "success": true })))
            .mount(&server)
            .await;

        let roles = role_commands::list_roles_with_counts(&state).await.unwrap();
        assert_eq!(
            roles,
            vec![
                RoleCount { name: "Auditor".into(), count: 2 },
                RoleCount { name: "Support".into(), count: 0 },
            ]
        );
    }

    #[tokio::test]
    async fn test_role_auth_tags() {
        let (server, state) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{PREFIX}/role-auth-tags")))
            .and(query_param("roleName", "Auditor"))
            .respond_with(ok(json!({
                "roleName": "Auditor",
                "result": "#DDM_See_PII, #DDM_See_HR",
                "success": true
            })))
            .mount(&server)
            .await;

        let tags = role_commands::role_auth_tags(&state, "Auditor").await.unwrap();
        assert_eq!(tags, vec!["#DDM_See_PII", "#DDM_See_HR"]);
    }

    #[tokio::test]
    async fn test_revoke_requires_grant_id() {
        let (_server, state) = setup().await;
        let err = role_commands::revoke_grant(&state, "").await.unwrap_err();
        assert_eq!(err.user_message(), "grantId: Grant ID is required");
    }
}

// ============================================================================
// Users
// ============================================================================

mod users {
    use super::*;

    #[tokio::test]
    async fn test_create_with_security_admin() {
        let (server, state) = setup().await;
        Mock::given(method("POST"))
            .and(path(format!("{PREFIX}/create-user")))
            .and(body_json(json!({ "userName": "alice", "password": "secret1" })))
            .respond_with(ok(json!({ "userName": "alice", "success": true })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{PREFIX}/grant-security-admin")))
            .and(body_json(json!({ "userName": "alice" })))
            .respond_with(ok(json!({ "userName": "alice", "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let res = user_commands::create_user(&state, "alice", "secret1", true)
            .await
            .unwrap();
        assert!(res.user.success);
        assert!(res.security_admin.is_some());
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let (_server, state) = setup().await;
        let err = user_commands::create_user(&state, "alice", "12345", false)
            .await
            .unwrap_err();
        assert_eq!(
            err.user_message(),
            "password: Password must be at least 6 characters"
        );
    }

    #[tokio::test]
    async fn test_security_admin_failure_after_create() {
        let (server, state) = setup().await;
        Mock::given(method("POST"))
            .and(path(format!("{PREFIX}/create-user")))
            .respond_with(ok(json!({ "success": true })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{PREFIX}/grant-security-admin")))
            .respond_with(ok(json!({ "success": false, "error": "denied" })))
            .mount(&server)
            .await;

        let err = user_commands::create_user(&state, "alice", "secret1", true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("User created"));
        assert!(err.to_string().contains("denied"));
    }

    #[tokio::test]
    async fn test_security_admin_http_error_reports_creation() {
        let (server, state) = setup().await;
        Mock::given(method("POST"))
            .and(path(format!("{PREFIX}/create-user")))
            .respond_with(ok(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{PREFIX}/grant-security-admin")))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })))
            .expect(1)
            .mount(&server)
            .await;

        let err = user_commands::create_user(&state, "bob", "secret1", true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Backend(_)));
        assert_eq!(
            err.user_message(),
            "User created, but granting security admin failed: HTTP 500: boom"
        );
    }
}

// ============================================================================
// Fields
// ============================================================================

mod fields {
    use super::*;

    #[tokio::test]
    async fn test_partial_mask_rejected_for_non_character_field() {
        let (server, state) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{PREFIX}/fields")))
            .and(query_param("tableName", "Customer"))
            .respond_with(ok(json!({
                "tableName": "Customer",
                "fields": ["CustNum"],
                "fieldTypes": { "CustNum": "INTEGER" },
                "success": true
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{PREFIX}/configure-field")))
            .respond_with(ok(json!({ "success": true })))
            .expect(0)
            .mount(&server)
            .await;

        let err = field_commands::configure_field(
            &state,
            "Customer",
            "CustNum",
            MaskKind::Partial,
            Some("0,X,4"),
            "#DDM_See_PII",
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.user_message(),
            "maskKind: Partial masks are only supported for CHARACTER fields"
        );
    }

    #[tokio::test]
    async fn test_partial_mask_on_character_field() {
        let (server, state) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{PREFIX}/fields")))
            .respond_with(ok(json!({
                "fields": ["Phone"],
                "fieldTypes": { "Phone": "character" },
                "success": true
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{PREFIX}/configure-field")))
            .and(body_json(json!({
                "tableName": "Customer",
                "fieldName": "Phone",
                "maskingType": "PARTIAL",
                "maskingValue": "P:0,X,4",
                "authTag": "#DDM_See_PII"
            })))
            .respond_with(ok(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        field_commands::configure_field(
            &state,
            "Customer",
            "Phone",
            MaskKind::Partial,
            Some("0,X,4"),
            "#DDM_See_PII",
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_existing_tag_outside_naming_rules_is_accepted() {
        let (server, state) = setup().await;
        Mock::given(method("POST"))
            .and(path(format!("{PREFIX}/configure-field")))
            .and(body_json(json!({
                "tableName": "Customer",
                "fieldName": "Email",
                "maskingType": "FULL",
                "maskingValue": "N:",
                "authTag": "LEGACY_TAG"
            })))
            .respond_with(ok(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        field_commands::configure_field(
            &state,
            "Customer",
            "Email",
            MaskKind::Null,
            None,
            " LEGACY_TAG ",
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_configure_requires_auth_tag() {
        let (_server, state) = setup().await;
        let err = field_commands::configure_field(
            &state,
            "Customer",
            "Email",
            MaskKind::Null,
            None,
            "  ",
        )
        .await
        .unwrap_err();
        assert_eq!(err.user_message(), "authTag: Authorization tag is required");
    }

    #[tokio::test]
    async fn test_literal_requires_value() {
        let (_server, state) = setup().await;
        let err = field_commands::configure_field(
            &state,
            "Customer",
            "Phone",
            MaskKind::Literal,
            None,
            "#DDM_See_PII",
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.user_message(),
            "maskValue: Literal mask requires a value (e.g., MASKED)"
        );
    }

    #[tokio::test]
    async fn test_table_configs_are_parsed() {
        let (server, state) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{PREFIX}/table-configs")))
            .and(query_param("tableName", "Customer"))
            .respond_with(ok(json!({
                "tableName": "Customer",
                "items": [
                    { "fieldName": "Phone", "result": "mask=P:0,X,4; auth tag=#DDM_See_PII" },
                    { "fieldName": "Name", "result": "nothing configured" },
                    { "fieldName": "Email", "result": "N:", "authTag": "#DDM_See_Email" }
                ],
                "success": true
            })))
            .mount(&server)
            .await;

        let res = field_commands::table_configs(&state, "Customer").await.unwrap();
        assert_eq!(res.items[0].mask_value.as_deref(), Some("P:0"));
        assert_eq!(res.items[0].auth_tag.as_deref(), Some("#DDM_See_PII"));
        assert_eq!(res.items[1].mask_value, None);
        assert_eq!(res.items[1].auth_tag, None);
        assert_eq!(res.items[2].mask_value.as_deref(), Some("N:"));
        assert_eq!(res.items[2].auth_tag.as_deref(), Some("#DDM_See_Email"));
        // 区切られた P:0 は種別不明、N: は Null
        assert_eq!(res.items[0].mask_kind, None);
        assert_eq!(res.items[1].mask_kind, None);
        assert_eq!(res.items[2].mask_kind, Some(MaskKind::Null));
    }

    #[tokio::test]
    async fn test_mask_and_auth_tag_summary() {
        let (server, state) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{PREFIX}/mask-and-auth-tag")))
            .respond_with(ok(json!({
                "result": "Auth Tag: #DDM_See_PII, Mask: L:REDACTED",
                "success": true
            })))
            .mount(&server)
            .await;

        let summary = field_commands::mask_and_auth_tag(&state, "Customer", "Phone", Some(" "))
            .await
            .unwrap();
        assert_eq!(summary.user_name, None);
        assert_eq!(summary.parsed.mask_value.as_deref(), Some("L:REDACTED"));
        assert_eq!(summary.parsed.auth_tag.as_deref(), Some("#DDM_See_PII"));
        assert_eq!(summary.mask_kind, Some(MaskKind::Literal));
    }
}

// ============================================================================
// Info
// ============================================================================

mod info {
    use super::*;

    #[tokio::test]
    async fn test_auth_tag_role_requires_tag() {
        let (_server, state) = setup().await;
        let err = info_commands::auth_tag_role(&state, "sports2020", None)
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "authTagName: Authorization tag is required");
    }

    #[tokio::test]
    async fn test_user_role_grants() {
        let (server, state) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{PREFIX}/user-role-grants")))
            .and(query_param("userName", "alice"))
            .respond_with(ok(json!({
                "userName": "alice",
                "result": "Auditor (grant 101), Support (grant 102)",
                "success": true
            })))
            .mount(&server)
            .await;

        let res = info_commands::user_role_grants(&state, "alice").await.unwrap();
        assert_eq!(
            info_commands::grant_lines(&res),
            vec!["Auditor (grant 101)", "Support (grant 102)"]
        );
    }

    #[tokio::test]
    async fn test_tables() {
        let (server, state) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{PREFIX}/tables")))
            .respond_with(ok(json!({ "tables": ["Customer", "Order"], "success": true })))
            .mount(&server)
            .await;

        assert_eq!(
            info_commands::list_tables(&state).await.unwrap(),
            vec!["Customer", "Order"]
        );
    }
}
