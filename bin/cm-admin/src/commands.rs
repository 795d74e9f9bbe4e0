//! Subcommand handlers.
//!
//! Handlers print results to stdout. Failures come back as the fixed
//! user-facing message for the action; the underlying error is logged at
//! debug level.

use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Result};
use tracing::debug;

use cm_authz::{
    delete_modules, render_rows, save_rights, BulkSelection, DeleteStrategy, ModuleForest,
    RightsSaveReport, TreeState,
};
use cm_client::dto::{ModuleDraft, RoleUpsert};
use cm_client::{Action, Actor, Client, Error};
use cm_common::model::format_date;
use cm_common::user::filter_users;
use cm_common::{EntityId, ModuleNode, UserForm};

use crate::{Command, ModulesCommand, RegisterArgs, RightsCommand, RolesCommand, UsersCommand};

pub(crate) struct Context {
    pub client: Client,
    pub actor: Actor,
}

/// Map a client error to the message shown for `action`.
fn fail(action: Action) -> impl FnOnce(Error) -> anyhow::Error {
    move |err| {
        debug!(error = %err, ?action, "Command failed");
        anyhow!(err.user_message(action))
    }
}

fn admin(banner: &'static str) -> impl FnOnce(Error) -> anyhow::Error {
    fail(Action::Admin(banner))
}

pub(crate) async fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Login { username, password } => login(ctx, &username, password).await,
        Command::Logout => {
            ctx.client.auth().sign_out()?;
            println!("Signed out");
            Ok(())
        }
        Command::Status => status(ctx),
        Command::ForgotPassword { email } => {
            ctx.client
                .auth()
                .forgot_password(&email)
                .await
                .map_err(fail(Action::ForgotPassword))?;
            println!("Password reset instructions sent to {}", email);
            Ok(())
        }
        Command::ResetPassword {
            email,
            current,
            new_password,
        } => {
            let current = password_or_prompt(current, "Current password")?;
            let new_password = password_or_prompt(new_password, "New password")?;
            ctx.client
                .auth()
                .reset_password(&email, &current, &new_password)
                .await
                .map_err(fail(Action::ResetPassword))?;
            println!("Password updated");
            Ok(())
        }
        Command::Users(cmd) => users(ctx, cmd).await,
        Command::Roles(cmd) => roles(ctx, cmd).await,
        Command::Modules(cmd) => modules(ctx, cmd).await,
        Command::Rights(cmd) => rights(ctx, cmd).await,
    }
}

// ============================================================================
// Session
// ============================================================================

async fn login(ctx: &Context, username: &str, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password, "Password")?;

    let session = ctx
        .client
        .auth()
        .login(username, &password)
        .await
        .map_err(fail(Action::Login))?;

    println!(
        "Signed in as {}",
        session.user_name.as_deref().unwrap_or(username)
    );
    Ok(())
}

/// Use the flag value, or prompt on stderr and read one line from stdin.
fn password_or_prompt(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => read_secret(prompt, &mut io::stdin().lock()),
    }
}

fn read_secret<R: BufRead>(prompt: &str, input: &mut R) -> Result<String> {
    eprint!("{}: ", prompt);
    io::stderr().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn status(ctx: &Context) -> Result<()> {
    match ctx.client.auth().current_session()? {
        Some(session) => println!(
            "Signed in as {} since {} ({})",
            session.user_name.as_deref().unwrap_or("unknown user"),
            session.stored_at.format("%b %-d, %Y %H:%M UTC"),
            ctx.client.base_url()
        ),
        None => println!("Not signed in ({})", ctx.client.base_url()),
    }
    Ok(())
}

// ============================================================================
// Users
// ============================================================================

async fn users(ctx: &Context, cmd: UsersCommand) -> Result<()> {
    let api = ctx.client.users();

    match cmd {
        UsersCommand::List { search } => {
            let all = api.list().await.map_err(admin("Failed to fetch users"))?;
            let shown = filter_users(&all, search.as_deref().unwrap_or(""));
            if shown.is_empty() {
                println!("No users found");
                return Ok(());
            }
            println!(
                "{:>6}  {:<24} {:<30} {:<16} {:<11} LAST LOGIN",
                "ID", "NAME", "EMAIL", "USERNAME", "STATUS"
            );
            for user in shown {
                println!(
                    "{:>6}  {:<24} {:<30} {:<16} {:<11} {}",
                    user.id,
                    user.display_name(),
                    user.email.as_deref().unwrap_or("-"),
                    user.user_name.as_deref().unwrap_or("-"),
                    user.status_badge().to_string(),
                    format_date(user.last_login.as_deref())
                );
            }
        }
        UsersCommand::Show { id } => {
            let user = api.get(id).await.map_err(admin("Failed to fetch users"))?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        UsersCommand::Register(args) => {
            let form = registration_form(args)?;
            api.register(form).await.map_err(|err| {
                debug!(error = %err, "Registration failed");
                match &err {
                    Error::InvalidInput(msg) => anyhow!("Please fill in all required fields correctly.\n{}", msg),
                    e if e.is_rejection() => {
                        anyhow!(e.backend_message().unwrap_or("Failed to register user").to_string())
                    }
                    e => anyhow!(e.user_message(Action::Admin("Failed to register user. Please try again."))),
                }
            })?;
            println!("User registered");
        }
        UsersCommand::ToggleStatus { id } => {
            let user = api.get(id).await.map_err(admin("Failed to fetch users"))?;
            let active = api
                .toggle_status(id, user.is_active)
                .await
                .map_err(admin("Failed to update user status"))?;
            println!(
                "{} is now {}",
                user.display_name(),
                if active { "active" } else { "inactive" }
            );
        }
        UsersCommand::Delete { id } => {
            api.delete(id).await.map_err(admin("Failed to delete user"))?;
            println!("User {} deleted", id);
        }
    }
    Ok(())
}

fn registration_form(args: RegisterArgs) -> Result<UserForm> {
    let password = password_or_prompt(args.password, "Password")?;
    let confirm_password = password_or_prompt(args.confirm_password, "Confirm password")?;

    Ok(UserForm {
        full_name: args.full_name,
        user_name: args.username,
        email: args.email,
        password,
        confirm_password,
        contact_no: args.contact_no,
        user_type: args.user_type,
        role_id: args.role_id,
        gender: args.gender,
        dob: args.dob,
        address: args.address,
        city: args.city,
        state: args.state,
        zip_code: args.zip_code,
        is_active: !args.inactive,
        is_staff: args.staff,
    })
}

// ============================================================================
// Roles
// ============================================================================

async fn roles(ctx: &Context, cmd: RolesCommand) -> Result<()> {
    let api = ctx.client.roles();

    match cmd {
        RolesCommand::List => {
            let roles = api.list().await.map_err(admin("Failed to fetch roles"))?;
            if roles.is_empty() {
                println!("No roles found");
                return Ok(());
            }
            println!("{:>6}  {:<24} {:<40} CREATED", "ID", "NAME", "DESCRIPTION");
            for role in roles {
                println!(
                    "{:>6}  {:<24} {:<40} {}",
                    role.id,
                    role.name,
                    role.description.as_deref().unwrap_or(""),
                    format_date(role.created_date.as_deref())
                );
            }
        }
        RolesCommand::Add { name, description } => {
            api.save(&RoleUpsert::create(name.as_str(), description))
                .await
                .map_err(admin("Failed to add role"))?;
            println!("Role {} added", name);
        }
        RolesCommand::Edit { id, name, description } => {
            api.save(&RoleUpsert::update(id, name.as_str(), description))
                .await
                .map_err(admin("Failed to update role"))?;
            println!("Role {} updated", id);
        }
        RolesCommand::Delete { id } => {
            api.delete(id).await.map_err(admin("Failed to delete role"))?;
            println!("Role {} deleted", id);
        }
    }
    Ok(())
}

// ============================================================================
// Modules
// ============================================================================

async fn load_forest(client: &Client) -> Result<ModuleForest> {
    let nodes = client
        .modules()
        .list()
        .await
        .map_err(admin("Failed to fetch modules"))?;
    Ok(ModuleForest::from_backend(nodes))
}

fn open_branches(mut state: TreeState, forest: &ModuleForest, expand_all: bool, ids: &[EntityId]) -> TreeState {
    if expand_all {
        return state.expand_all(forest);
    }
    for &id in ids {
        if !state.is_expanded(id) {
            state = state.toggle_expanded(forest, id);
        }
    }
    state
}

async fn modules(ctx: &Context, cmd: ModulesCommand) -> Result<()> {
    match cmd {
        ModulesCommand::Tree { expand_all, expand } => {
            let forest = load_forest(&ctx.client).await?;
            if forest.is_empty() {
                println!("No modules found");
                return Ok(());
            }
            let state = open_branches(TreeState::initial(&forest), &forest, expand_all, &expand);
            print!("{}", render_rows(&state.rows(&forest)));
        }
        ModulesCommand::Add {
            name,
            value,
            parent_id,
            nodes_values,
            inactive,
        } => {
            let draft = ModuleDraft {
                name: name.clone(),
                value,
                parent_id,
                nodesvalues: nodes_values,
                inactive,
            };
            ctx.client
                .modules()
                .create(draft, &ctx.actor)
                .await
                .map_err(admin("Failed to add module"))?;
            println!("Module {} added", name);
        }
        ModulesCommand::Update {
            id,
            name,
            value,
            parent_id,
            nodes_values,
        } => {
            let forest = load_forest(&ctx.client).await?;
            let Some(existing) = forest.find(id) else {
                bail!("Module {} not found", id);
            };
            let draft = ModuleDraft {
                name: name.unwrap_or_else(|| existing.name.clone()),
                value: value.or_else(|| existing.value.clone()).unwrap_or_default(),
                parent_id: parent_id.unwrap_or(existing.parent_id),
                nodesvalues: nodes_values.unwrap_or_else(|| nodes_values_text(existing)),
                inactive: existing.inactive,
            };
            ctx.client
                .modules()
                .update(existing, draft)
                .await
                .map_err(admin("Failed to update module"))?;
            println!("Module {} updated", id);
        }
        ModulesCommand::Delete { ids, all } => {
            let selection = if all {
                BulkSelection::new().select_all(&load_forest(&ctx.client).await?)
            } else {
                BulkSelection::from_ids(ids)
            };

            let report = delete_modules(&ctx.client, &selection, &ctx.actor)
                .await
                .map_err(admin("Failed to delete modules"))?;

            if report.strategy == DeleteStrategy::PerModule {
                eprintln!("Bulk delete unavailable, deleted modules one at a time");
            }
            for (id, message) in report.batch.failures() {
                eprintln!("  module #{}: {}", id, message);
            }
            if !report.batch.all_succeeded() {
                bail!("Failed to delete module");
            }
            println!("Deleted {} module(s)", report.batch.len());
        }
    }
    Ok(())
}

/// `nodesvalues` as the plain string the edit form carries.
fn nodes_values_text(node: &ModuleNode) -> String {
    match &node.nodesvalues {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

// ============================================================================
// Rights
// ============================================================================

async fn rights(ctx: &Context, cmd: RightsCommand) -> Result<()> {
    match cmd {
        RightsCommand::Show { role: role_id, expand_all } => {
            let roles = ctx.client.roles().list().await.map_err(admin("Failed to fetch roles"))?;
            let Some(role) = roles.into_iter().find(|r| r.id == role_id) else {
                bail!("Role {} not found", role_id);
            };
            let forest = load_forest(&ctx.client).await?;
            let granted = ctx
                .client
                .role_modules()
                .list(role.id)
                .await
                .map_err(admin("Failed to fetch role rights"))?;

            let state = TreeState::initial(&forest).with_checked(granted.iter().map(|rm| rm.module_id));
            let state = open_branches(state, &forest, expand_all, &[]);

            println!("Role: {} (#{})", role.name, role.id);
            print!("{}", render_rows(&state.rows(&forest)));
        }
        RightsCommand::Set { role, modules } => {
            let desired: BTreeSet<EntityId> = modules.into_iter().collect();
            let report = save_role_rights(ctx, role, &desired).await?;
            print_rights_report(&report);
        }
        RightsCommand::Toggle { role, modules } => {
            let granted = ctx
                .client
                .role_modules()
                .list(role)
                .await
                .map_err(admin("Failed to fetch role rights"))?;
            let state = modules.into_iter().fold(
                TreeState::new().with_checked(granted.iter().map(|rm| rm.module_id)),
                TreeState::toggle_checked,
            );
            let report = save_role_rights(ctx, role, state.checked()).await?;
            print_rights_report(&report);
        }
        RightsCommand::User { email } => {
            let rows = ctx
                .client
                .role_modules()
                .for_user(&email)
                .await
                .map_err(admin("Failed to fetch user permissions"))?;
            if rows.is_empty() {
                bail!("No permissions found for user: {}", email);
            }
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }
    Ok(())
}

async fn save_role_rights(ctx: &Context, role_id: EntityId, desired: &BTreeSet<EntityId>) -> Result<RightsSaveReport> {
    let roles = ctx.client.roles().list().await.map_err(admin("Failed to fetch roles"))?;
    let role = roles.into_iter().find(|r| r.id == role_id);

    save_rights(&ctx.client, role.as_ref(), desired, &ctx.actor)
        .await
        .map_err(admin("Failed to update rights"))
}

fn print_rights_report(report: &RightsSaveReport) {
    for (mutation, message) in report.batch.failures() {
        eprintln!("  {:?}: {}", mutation, message);
    }

    if report.batch.is_empty() {
        println!("No changes for role #{}", report.role_id);
    } else {
        println!(
            "Rights updated for role #{}: {}",
            report.role_id, report.batch
        );
    }

    let granted: Vec<String> = report
        .final_module_ids()
        .into_iter()
        .map(|id| id.to_string())
        .collect();
    println!("Granted modules: {}", if granted.is_empty() { "none".into() } else { granted.join(", ") });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_secret_strips_line_ending() {
        let mut input = io::Cursor::new("s3cret\r\nnext\n");
        assert_eq!(read_secret("Password", &mut input).unwrap(), "s3cret");
        assert_eq!(read_secret("Confirm password", &mut input).unwrap(), "next");
        assert_eq!(read_secret("Again", &mut input).unwrap(), "");
    }

    #[test]
    fn test_flag_value_skips_prompt() {
        assert_eq!(password_or_prompt(Some("given".into()), "Password").unwrap(), "given");
    }
}
