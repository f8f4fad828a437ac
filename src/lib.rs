use log::{debug, error, LevelFilter};
use std::process::ExitCode;
use std::sync::Arc;

pub mod api_types;
pub mod cli;
pub mod config;
pub mod config_summary;
pub mod ddm_client;
pub mod errors;
pub mod field_commands;
pub mod info_commands;
pub mod mask_spec;
mod output;
pub mod result_lists;
pub mod role_commands;
pub mod system_commands;
pub mod tag_commands;
pub mod tag_validator;
pub mod user_commands;

use cli::{
    Cli, Commands, ConfigCommands, FieldCommands, InfoCommands, RoleCommands, SettingKey,
    TagCommands, UserCommands,
};
use config::masks;
use ddm_client::{DdmClient, EnvCredentials};
pub use errors::{AppError, AppResult};
use output::{done, print_error, print_one, print_out};
use system_commands::{EffectiveSettings, SettingsUpdate};

// アプリケーション状態管理
pub struct AppState {
    pub client: Arc<DdmClient>,
}

impl AppState {
    pub fn new(settings: &EffectiveSettings) -> AppResult<Self> {
        let credentials = Arc::new(EnvCredentials {
            fallback_username: settings.username.clone(),
        });
        let client = DdmClient::new(&settings.base_url, settings.timeout(), credentials)?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: DdmClient) -> Self {
        AppState {
            client: Arc::new(client),
        }
    }
}

/// RUST_LOG (既定は warn)。`-v` でこのクレートのログを debug にする
pub fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose > 0 {
        builder.filter_module("ddm_console_lib", LevelFilter::Debug);
    }
    // テストなどで二重に初期化された場合は無視
    let _ = builder.format_timestamp(None).try_init();
}

pub async fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);

    match dispatch(&cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            print_error(cli.json, &e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: &Cli) -> AppResult<ExitCode> {
    if !cli.command.needs_backend() {
        return run_offline(cli);
    }

    let file_settings = system_commands::load_settings()?;
    let settings =
        system_commands::resolve_settings(&file_settings, cli.base_url.as_deref(), cli.timeout)?;
    debug!("Using DDM endpoint {}", settings.base_url);
    let state = AppState::new(&settings)?;

    let json = cli.json;
    match &cli.command {
        Commands::Tag { command } => run_tag(json, &state, command).await?,
        Commands::Role { command } => run_role(json, &state, command).await?,
        Commands::User { command } => run_user(json, &state, command).await?,
        Commands::Field { command } => run_field(json, &state, command).await?,
        Commands::Info { command } => run_info(json, &state, command).await?,
        _ => return run_offline(cli),
    }
    Ok(ExitCode::SUCCESS)
}

// バックエンドに接続しないコマンド
fn run_offline(cli: &Cli) -> AppResult<ExitCode> {
    let json = cli.json;
    match &cli.command {
        Commands::ValidateTag { tag } => {
            let check = system_commands::validate_tag(tag);
            let valid = check.valid;
            print_one(json, check, |c| match &c.error {
                None => format!("valid: {}", c.tag),
                Some(e) => format!("invalid: {e}"),
            })?;
            if !valid {
                return Ok(ExitCode::from(2));
            }
        }
        Commands::ParseSummary { text } => {
            let parsed = system_commands::parse_summary(text);
            print_one(json, parsed, |p| {
                format!("mask: {}\nauth tag: {}", p.display_mask(), p.display_auth_tag())
            })?;
        }
        Commands::Schema => {
            print_one(json, system_commands::api_schema()?, |schema| format!("{schema:#}"))?;
        }
        Commands::Config { command } => run_config(json, command)?,
        Commands::Tag { .. }
        | Commands::Role { .. }
        | Commands::User { .. }
        | Commands::Field { .. }
        | Commands::Info { .. } => {
            return Err(AppError::config("command requires a DDM connection"));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_config(json: bool, command: &ConfigCommands) -> AppResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = system_commands::load_settings()?;
            print_one(json, settings, |s| {
                format!(
                    "base_url: {}\ntimeout_secs: {}\nusername: {}",
                    s.base_url,
                    s.timeout_secs,
                    s.username.as_deref().unwrap_or(masks::PLACEHOLDER)
                )
            })
        }
        ConfigCommands::Set { key, value } => {
            let mut update = SettingsUpdate::default();
            match key {
                SettingKey::BaseUrl => update.base_url = Some(value.clone()),
                SettingKey::Timeout => {
                    let secs = value.trim().parse::<u64>().map_err(|_| {
                        AppError::config(format!("timeout must be a number of seconds: {value}"))
                    })?;
                    update.timeout_secs = Some(secs);
                }
                SettingKey::Username => update.username = Some(value.clone()),
            }
            let saved = system_commands::update_settings(update)?;
            print_one(json, saved, |_| "settings saved".to_string())
        }
        ConfigCommands::Path => {
            let path = system_commands::settings_path();
            print_one(json, path.display().to_string(), |p| p.clone())
        }
    }
}

async fn run_tag(json: bool, state: &AppState, command: &TagCommands) -> AppResult<()> {
    match command {
        TagCommands::Create { domain, tag } => {
            let res = tag_commands::create_auth_tag(state, domain, tag).await?;
            print_one(json, res, |r| done(&r.message, "Authorization tag created"))
        }
        TagCommands::Update {
            domain,
            tag,
            new_name,
        } => {
            let res = tag_commands::update_auth_tag(state, domain, tag, new_name).await?;
            print_one(json, res, |r| done(&r.message, "Authorization tag updated"))
        }
        TagCommands::Delete { domain, tag } => {
            let res = tag_commands::delete_auth_tag(state, domain, tag).await?;
            print_one(json, res, |r| done(&r.message, "Authorization tag deleted"))
        }
        TagCommands::Associate {
            current_role,
            tag,
            new_role,
        } => {
            let res =
                tag_commands::associate_auth_tag_role(state, current_role, tag, new_role).await?;
            print_one(json, res, |r| {
                done(&r.message, "Authorization tag reassigned")
            })
        }
        TagCommands::List { with_roles: false } => {
            let tags = tag_commands::list_auth_tags(state).await?;
            print_out(json, &tags, |t| t.clone())
        }
        TagCommands::List { with_roles: true } => {
            let tags = tag_commands::list_auth_tags_with_roles(state).await?;
            print_out(json, &tags, |t| {
                let role = if t.role.is_empty() {
                    masks::PLACEHOLDER
                } else {
                    t.role.as_str()
                };
                format!("{}\t{role}", t.name)
            })
        }
    }
}

async fn run_role(json: bool, state: &AppState, command: &RoleCommands) -> AppResult<()> {
    match command {
        RoleCommands::Create { role } => {
            let res = role_commands::create_role(state, role).await?;
            print_one(json, res, |r| done(&r.message, "Role created"))
        }
        RoleCommands::Delete { role } => {
            let res = role_commands::delete_role(state, role).await?;
            print_one(json, res, |r| done(&r.message, "Role deleted"))
        }
        RoleCommands::Grant { role, user } => {
            let res = role_commands::grant_role(state, user, role).await?;
            print_one(json, res, |r| done(&r.message, "Role granted"))
        }
        RoleCommands::GrantBulk { role, users } => {
            let res = role_commands::grant_roles(state, users, role).await?;
            print_one(json, res, |r| {
                let granted: Vec<&str> = r.results.iter().map(|i| i.user_name.as_str()).collect();
                format!("{} granted to: {}", r.role_name, granted.join(", "))
            })
        }
        RoleCommands::Revoke { grant_id } => {
            let res = role_commands::revoke_grant(state, grant_id).await?;
            print_one(json, res, |r| done(&r.message, "Role grant revoked"))
        }
        RoleCommands::List { with_counts: false } => {
            let roles = role_commands::list_roles(state).await?;
            print_out(json, &roles, |r| r.clone())
        }
        RoleCommands::List { with_counts: true } => {
            let roles = role_commands::list_roles_with_counts(state).await?;
            print_out(json, &roles, |r| format!("{}\t{}", r.name, r.count))
        }
        RoleCommands::AuthTags { role } => {
            let tags = role_commands::role_auth_tags(state, role).await?;
            print_out(json, &tags, |t| t.clone())
        }
    }
}

async fn run_user(json: bool, state: &AppState, command: &UserCommands) -> AppResult<()> {
    match command {
        UserCommands::Create {
            user,
            password,
            security_admin,
        } => {
            let res = user_commands::create_user(state, user, password, *security_admin).await?;
            print_one(json, res, |r| {
                let created = done(&r.user.message, "User created");
                match &r.security_admin {
                    Some(admin) => format!(
                        "{created}\n{}",
                        done(&admin.message, "Security admin granted")
                    ),
                    None => created,
                }
            })
        }
        UserCommands::Delete { user } => {
            let res = user_commands::delete_user(state, user).await?;
            print_one(json, res, |r| done(&r.message, "User deleted"))
        }
        UserCommands::GrantSecurityAdmin { user } => {
            let res = user_commands::grant_security_admin(state, user).await?;
            print_one(json, res, |r| done(&r.message, "Security admin granted"))
        }
        UserCommands::List => {
            let users = user_commands::list_users(state).await?;
            print_out(json, &users, |u| u.clone())
        }
    }
}

async fn run_field(json: bool, state: &AppState, command: &FieldCommands) -> AppResult<()> {
    match command {
        FieldCommands::Configure {
            table,
            field,
            mask,
            value,
            auth_tag,
        } => {
            let res = field_commands::configure_field(
                state,
                table,
                field,
                *mask,
                value.as_deref(),
                auth_tag,
            )
            .await?;
            print_one(json, res, |r| done(&r.message, "Field masking configured"))
        }
        FieldCommands::UnsetMask { table, field } => {
            let res = field_commands::unset_mask(state, table, field).await?;
            print_one(json, res, |r| done(&r.message, "Mask removed"))
        }
        FieldCommands::UnsetAuthTag { table, field } => {
            let res = field_commands::unset_auth_tag(state, table, field).await?;
            print_one(json, res, |r| done(&r.message, "Authorization tag removed"))
        }
        FieldCommands::Configs { table } => {
            let res = field_commands::table_configs(state, table).await?;
            print_out(json, &res.items, |item| {
                let kind = item
                    .mask_kind
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| masks::PLACEHOLDER.to_string());
                format!(
                    "{}\t{}\t{kind}\t{}",
                    item.field_name,
                    item.mask_value.as_deref().unwrap_or(masks::PLACEHOLDER),
                    item.auth_tag.as_deref().unwrap_or(masks::PLACEHOLDER)
                )
            })
        }
        FieldCommands::Show { table, field, user } => {
            let res =
                field_commands::mask_and_auth_tag(state, table, field, user.as_deref()).await?;
            print_one(json, res, |s| {
                let kind = s
                    .mask_kind
                    .map(|k| format!(" ({k})"))
                    .unwrap_or_default();
                format!(
                    "{}.{}\nmask: {}{kind}\nauth tag: {}",
                    s.table_name,
                    s.field_name,
                    s.parsed.display_mask(),
                    s.parsed.display_auth_tag()
                )
            })
        }
    }
}

async fn run_info(json: bool, state: &AppState, command: &InfoCommands) -> AppResult<()> {
    match command {
        InfoCommands::Health => {
            let res = info_commands::health(state).await?;
            print_one(json, res, |h| {
                format!(
                    "{} {} ({}), database: {}",
                    h.service, h.version, h.status, h.database
                )
            })
        }
        InfoCommands::Tables => {
            let tables = info_commands::list_tables(state).await?;
            print_out(json, &tables, |t| t.clone())
        }
        InfoCommands::Fields { table } => {
            let res = info_commands::list_fields(state, table).await?;
            let rows = info_commands::field_rows(&res);
            print_out(json, &rows, |r| {
                format!(
                    "{}\t{}",
                    r.name,
                    r.field_type.as_deref().unwrap_or(masks::PLACEHOLDER)
                )
            })
        }
        InfoCommands::TagRole { domain, tag } => {
            let res = info_commands::auth_tag_role(state, domain, tag.as_deref()).await?;
            print_one(json, res, |r| r.result.clone())
        }
        InfoCommands::UserGrants { user } => {
            let res = info_commands::user_role_grants(state, user).await?;
            let lines = info_commands::grant_lines(&res);
            print_out(json, &lines, |l| l.clone())
        }
    }
}
