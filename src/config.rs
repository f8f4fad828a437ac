// Configuration constants for the DDM console
// This module centralizes all magic numbers and hardcoded strings to improve maintainability

/// Application configuration constants
pub mod app {
    /// Name of the application config directory
    pub const CONFIG_DIR_NAME: &str = "DDM_Console";

    /// Settings file name
    pub const SETTINGS_FILENAME: &str = "config.json";

    /// Environment variable overriding the backend base URL
    pub const ENV_API_URL: &str = "DDM_API_URL";

    /// Environment variable overriding the request timeout (seconds)
    pub const ENV_TIMEOUT_SECS: &str = "DDM_TIMEOUT_SECS";

    /// Environment variables for HTTP Basic credentials
    pub const ENV_USERNAME: &str = "DDM_USERNAME";
    pub const ENV_PASSWORD: &str = "DDM_PASSWORD";
}

/// Authorization tag grammar constants
pub mod auth_tags {
    /// Required prefix (compared case-insensitively)
    pub const PREFIX: &str = "#DDM_See_";

    /// Maximum tag length in characters
    pub const MAX_LENGTH: usize = 64;

    /// Symbols allowed in addition to ASCII letters and digits
    pub const ALLOWED_SYMBOLS: &[char] = &['_', '.', '-', '#', '$', '%', '&'];
}

/// Mask specification constants
pub mod masks {
    /// Short-form codes understood by the backend
    pub const DEFAULT_CODE: &str = "D:";
    pub const NULL_CODE: &str = "N:";
    pub const LITERAL_PREFIX: &str = "L:";
    pub const PARTIAL_PREFIX: &str = "P:";

    /// Backend maskingType values
    pub const MASKING_TYPE_FULL: &str = "FULL";
    pub const MASKING_TYPE_PARTIAL: &str = "PARTIAL";

    /// Field datatype that supports partial masks
    pub const PARTIAL_FIELD_TYPE: &str = "CHARACTER";

    /// Placeholder shown for unresolved summary values
    pub const PLACEHOLDER: &str = "–";
}

/// Backend REST API constants
pub mod api {
    /// Default PAS endpoint behind the console's reverse-proxy rewrite
    pub const DEFAULT_BASE_URL: &str = "http://localhost:8810/web/api/masking";

    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Maximum attempts for idempotent requests
    pub const MAX_RETRIES: u32 = 3;

    /// Backoff base for network errors / 429 responses (milliseconds)
    pub const NETWORK_BACKOFF_MS: u64 = 500;
    pub const RATE_LIMIT_BACKOFF_MS: u64 = 1000;

    pub const HEALTH: &str = "health";
    pub const CONFIGURE_FIELD: &str = "configure-field";
    pub const UNSET_MASK: &str = "unset-mask";
    pub const UNSET_AUTH_TAG: &str = "unset-auth-tag";
    pub const CREATE_AUTH_TAG: &str = "create-auth-tag";
    pub const UPDATE_AUTH_TAG: &str = "update-auth-tag";
    pub const DELETE_AUTH_TAG: &str = "delete-auth-tag";
    pub const CREATE_ROLE: &str = "create-role";
    pub const DELETE_ROLE: &str = "delete-role";
    pub const GRANT_ROLE: &str = "grant-role";
    pub const GRANT_ROLES: &str = "grant-roles";
    pub const DELETE_GRANTED_ROLE: &str = "delete-granted-role";
    pub const CREATE_USER: &str = "create-user";
    pub const DELETE_USER: &str = "delete-user";
    pub const GRANT_SECURITY_ADMIN: &str = "grant-security-admin";
    pub const ASSOCIATE_AUTH_TAG_ROLE: &str = "associate-auth-tag-role";
    pub const MASK_AND_AUTH_TAG: &str = "mask-and-auth-tag";
    pub const AUTH_TAG_ROLE: &str = "auth-tag-role";
    pub const USER_ROLE_GRANTS: &str = "user-role-grants";
    pub const ROLES: &str = "roles";
    pub const ROLE_AUTH_TAGS: &str = "role-auth-tags";
    pub const USERS: &str = "users";
    pub const AUTH_TAGS: &str = "auth-tags";
    pub const ROLES_WITH_COUNTS: &str = "roles-with-counts";
    pub const AUTH_TAGS_WITH_ROLES: &str = "auth-tags-with-roles";
    pub const TABLES: &str = "tables";
    pub const FIELDS: &str = "fields";
    pub const TABLE_CONFIGS: &str = "table-configs";
}

/// Form validation constants
pub mod forms {
    /// Minimum password length for new users
    pub const MIN_PASSWORD_LENGTH: usize = 6;
}

/// UI text constants
pub mod ui_text {
    pub const DOMAIN_NAME_REQUIRED: &str = "Domain name is required";
    pub const ROLE_NAME_REQUIRED: &str = "Role name is required";
    pub const CURRENT_ROLE_REQUIRED: &str = "Current role is required";
    pub const NEW_ROLE_REQUIRED: &str = "New role is required";
    pub const USER_NAME_REQUIRED: &str = "User name is required";
    pub const AUTH_TAG_REQUIRED: &str = "Authorization tag is required";
    pub const GRANT_ID_REQUIRED: &str = "Grant ID is required";
    pub const TABLE_NAME_REQUIRED: &str = "Table name is required";
    pub const FIELD_NAME_REQUIRED: &str = "Field name is required";
    pub const SELECT_AT_LEAST_ONE_USER: &str = "Select at least one user";
    pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
    pub const PARTIAL_REQUIRES_CHARACTER: &str =
        "Partial masks are only supported for CHARACTER fields";
    pub const REQUEST_FAILED: &str = "Request failed";
}

/// Fallback messages when a failed response carries neither `error` nor `message`
pub mod fallbacks {
    pub const CREATE_AUTH_TAG: &str = "Failed to create authorization tag";
    pub const UPDATE_AUTH_TAG: &str = "Failed to update authorization tag";
    pub const DELETE_AUTH_TAG: &str = "Failed to delete authorization tag";
    pub const REASSIGN_AUTH_TAG: &str = "Failed to reassign authorization tag";
    pub const CREATE_ROLE: &str = "Failed to create role";
    pub const DELETE_ROLE: &str = "Failed to delete role";
    pub const GRANT_ROLE: &str = "Failed to grant role";
    pub const GRANT_ROLES: &str = "Failed to grant role to some or all users";
    pub const REVOKE_GRANT: &str = "Failed to revoke role grant";
    pub const CREATE_USER: &str = "Failed to create user";
    pub const DELETE_USER: &str = "Failed to delete user";
    pub const GRANT_SECURITY_ADMIN: &str = "Failed to grant security admin";
    pub const CONFIGURE_FIELD: &str = "Failed to configure field masking";
    pub const UNSET_MASK: &str = "Failed to remove mask";
    pub const UNSET_AUTH_TAG: &str = "Failed to remove authorization tag";
    pub const USER_ROLE_GRANTS: &str = "Failed to retrieve user role grants";
    pub const LOAD: &str = "Failed to load data";
}
