//! Clinic Admin Console
//!
//! Command-line front end for the clinic-management backend:
//! - Sign-in and password recovery
//! - User directory and registration
//! - Roles, the module hierarchy and per-role module rights

mod commands;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::debug;

use cm_client::{Actor, Client, Config, FileSessionStore};
use cm_common::EntityId;
use cm_config::ConfigLoader;

/// Clinic Admin Console
#[derive(Parser, Debug)]
#[command(name = "cm-admin")]
#[command(about = "Clinic admin console - users, roles and module rights")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(long, global = true, env = "CLINIC_ADMIN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Sign in and store the session token
    Login {
        #[arg(long, env = "CLINIC_ADMIN_USERNAME")]
        username: String,

        /// Read from stdin when omitted
        #[arg(long, env = "CLINIC_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show who is signed in
    Status,

    /// Email a password reset link
    ForgotPassword {
        #[arg(long)]
        email: String,
    },

    /// Change a password
    ResetPassword {
        #[arg(long)]
        email: String,

        /// Read from stdin when omitted
        #[arg(long)]
        current: Option<String>,

        /// Read from stdin when omitted
        #[arg(long = "new")]
        new_password: Option<String>,
    },

    #[command(subcommand)]
    Users(UsersCommand),

    #[command(subcommand)]
    Roles(RolesCommand),

    #[command(subcommand)]
    Modules(ModulesCommand),

    /// Module rights granted to roles
    #[command(subcommand)]
    Rights(RightsCommand),
}

#[derive(Subcommand, Debug)]
pub(crate) enum UsersCommand {
    List {
        /// Case-insensitive match on name, email or username
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        id: EntityId,
    },
    Register(RegisterArgs),
    /// Activate an inactive user or deactivate an active one
    ToggleStatus {
        id: EntityId,
    },
    Delete {
        id: EntityId,
    },
}

#[derive(ClapArgs, Debug)]
pub(crate) struct RegisterArgs {
    #[arg(long)]
    pub full_name: String,

    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub email: String,

    /// Read from stdin when omitted
    #[arg(long)]
    pub password: Option<String>,

    /// Read from stdin when omitted
    #[arg(long)]
    pub confirm_password: Option<String>,

    #[arg(long)]
    pub contact_no: String,

    #[arg(long, default_value = "user")]
    pub user_type: String,

    #[arg(long, default_value_t = 0)]
    pub role_id: EntityId,

    #[arg(long, default_value = "male")]
    pub gender: String,

    #[arg(long, default_value = "")]
    pub dob: String,

    #[arg(long, default_value = "")]
    pub address: String,

    #[arg(long, default_value = "")]
    pub city: String,

    #[arg(long, default_value = "")]
    pub state: String,

    #[arg(long, default_value = "")]
    pub zip_code: String,

    /// Register the account as inactive
    #[arg(long)]
    pub inactive: bool,

    #[arg(long)]
    pub staff: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum RolesCommand {
    List,
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,
    },
    Edit {
        id: EntityId,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,
    },
    Delete {
        id: EntityId,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum ModulesCommand {
    /// Print the module hierarchy
    Tree {
        #[arg(long, conflicts_with = "expand")]
        expand_all: bool,

        /// Branches to open besides the first root
        #[arg(long, num_args = 1..)]
        expand: Vec<EntityId>,
    },
    Add {
        #[arg(long)]
        name: String,

        /// Navigation path
        #[arg(long, default_value = "")]
        value: String,

        #[arg(long, default_value_t = 0)]
        parent_id: EntityId,

        #[arg(long, default_value = "")]
        nodes_values: String,

        #[arg(long)]
        inactive: bool,
    },
    Update {
        id: EntityId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        value: Option<String>,

        #[arg(long)]
        parent_id: Option<EntityId>,

        #[arg(long)]
        nodes_values: Option<String>,
    },
    /// Delete modules by id, or every module with --all
    Delete {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        ids: Vec<EntityId>,

        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum RightsCommand {
    /// Module tree with the role's granted modules checked
    Show {
        #[arg(long)]
        role: EntityId,

        #[arg(long)]
        expand_all: bool,
    },
    /// Grant exactly these modules, revoking the rest
    Set {
        #[arg(long)]
        role: EntityId,

        /// Comma-separated; pass `--modules` alone to revoke everything
        #[arg(long, value_delimiter = ',', num_args = 0.., required = true)]
        modules: Vec<EntityId>,
    },
    /// Flip individual modules on or off
    Toggle {
        #[arg(long)]
        role: EntityId,

        #[arg(long = "module", num_args = 1.., required = true)]
        modules: Vec<EntityId>,
    },
    /// Modules reachable by a user through their roles
    User {
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::with_path(path.clone()),
        None => ConfigLoader::new(),
    };
    let config = loader.load()?;

    cm_common::logging::init_logging("cm-admin", &config.log_level);
    debug!(base_url = %config.api.base_url, "Configuration loaded");

    let client_config = Config::new(config.api.base_url.as_str())
        .with_timeout(Duration::from_secs(config.api.timeout_secs))
        .with_user_agent(config.api.user_agent.as_str());
    let session = Arc::new(FileSessionStore::new(config.session.path.clone()));
    let client = Client::new(client_config, session)?;

    let ctx = commands::Context {
        client,
        actor: Actor::new(config.actor.name.clone(), config.actor.practice_id),
    };

    commands::run(&ctx, args.command).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_are_optional_flags() {
        let args = Args::try_parse_from(["cm-admin", "reset-password", "--email", "a@b.co"]).unwrap();
        match args.command {
            Command::ResetPassword {
                current, new_password, ..
            } => {
                assert!(current.is_none());
                assert!(new_password.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let args = Args::try_parse_from([
            "cm-admin", "users", "register", "--full-name", "Ann Lee", "--username", "ann",
            "--email", "ann@clinic.example", "--contact-no", "5550100",
        ])
        .unwrap();
        match args.command {
            Command::Users(UsersCommand::Register(reg)) => {
                assert!(reg.password.is_none());
                assert!(reg.confirm_password.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
