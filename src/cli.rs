use crate::config::app;
use crate::mask_spec::MaskKind;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "ddm-console",
    version,
    about = "Administrative console for OpenEdge Dynamic Data Masking"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = app::ENV_API_URL,
        help = "Base URL of the masking REST API"
    )]
    pub base_url: Option<String>,

    #[arg(
        long,
        global = true,
        env = app::ENV_TIMEOUT_SECS,
        value_name = "SECS",
        help = "Request timeout in seconds"
    )]
    pub timeout: Option<u64>,

    #[arg(short, long, global = true, action = ArgAction::Count, help = "Enable debug logging")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authorization tags
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },
    /// Roles and role grants
    Role {
        #[command(subcommand)]
        command: RoleCommands,
    },
    /// Database users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Field masking configuration
    Field {
        #[command(subcommand)]
        command: FieldCommands,
    },
    /// Read-only lookups
    Info {
        #[command(subcommand)]
        command: InfoCommands,
    },
    /// Console settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Check an authorization tag offline
    ValidateTag { tag: String },
    /// Extract mask and authorization tag from a configuration summary
    ParseSummary { text: String },
    /// Print the JSON schema of the REST contract
    Schema,
}

#[derive(Subcommand, Debug)]
pub enum TagCommands {
    Create {
        #[arg(long)]
        domain: String,
        tag: String,
    },
    Update {
        #[arg(long)]
        domain: String,
        tag: String,
        new_name: String,
    },
    Delete {
        #[arg(long)]
        domain: String,
        tag: String,
    },
    /// Move a tag from one role to another
    Associate {
        #[arg(long)]
        current_role: String,
        tag: String,
        #[arg(long)]
        new_role: String,
    },
    List {
        #[arg(long, default_value_t = false)]
        with_roles: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum RoleCommands {
    Create { role: String },
    Delete { role: String },
    Grant { role: String, user: String },
    GrantBulk {
        role: String,
        #[arg(num_args = 0..)]
        users: Vec<String>,
    },
    /// Revoke a role grant by its grant ID
    Revoke { grant_id: String },
    List {
        #[arg(long, default_value_t = false)]
        with_counts: bool,
    },
    AuthTags { role: String },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Create {
        user: String,
        #[arg(long, env = "DDM_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value_t = false)]
        security_admin: bool,
    },
    Delete { user: String },
    GrantSecurityAdmin { user: String },
    List,
}

#[derive(Subcommand, Debug)]
pub enum FieldCommands {
    Configure {
        table: String,
        field: String,
        #[arg(long, value_enum, default_value_t = MaskKind::Default)]
        mask: MaskKind,
        #[arg(long, help = "Literal value or partial format start,maskChar,count")]
        value: Option<String>,
        #[arg(long)]
        auth_tag: String,
    },
    UnsetMask { table: String, field: String },
    UnsetAuthTag { table: String, field: String },
    /// Masking summary of every configured field in a table
    Configs { table: String },
    /// Effective mask and tag of one field
    Show {
        table: String,
        field: String,
        #[arg(long)]
        user: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum InfoCommands {
    Health,
    Tables,
    Fields { table: String },
    TagRole {
        #[arg(long)]
        domain: String,
        #[arg(long)]
        tag: Option<String>,
    },
    UserGrants { user: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    Show,
    Set { key: SettingKey, value: String },
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SettingKey {
    BaseUrl,
    Timeout,
    Username,
}

impl Commands {
    /// バックエンドへの接続が必要か
    pub fn needs_backend(&self) -> bool {
        matches!(
            self,
            Commands::Tag { .. }
                | Commands::Role { .. }
                | Commands::User { .. }
                | Commands::Field { .. }
                | Commands::Info { .. }
        )
    }
}
