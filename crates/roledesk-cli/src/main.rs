use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, Select};
use dotenvy::dotenv;
use roledesk::logging::init_logging;
use roledesk::modules::catalog::ALL_CATEGORIES;
use roledesk::{
    EditorSession, PermissionCatalog, RoleDraft, RoleRegistry, RoleTemplateEngine, SwitchDecision,
    SwitchState,
};
use roledesk_cli::render::{
    permission_line, render_catalog, render_summary, render_templates, role_label,
};
use roledesk_cli::seeder;
use roledesk_config::{EditorConfig, LoggingConfig, StoreBackend};
use roledesk_core::EditorError;
use roledesk_db::{MemoryRoleStore, RoleStore};
use roledesk_models::UpdateRoleDto;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "roledesk")]
#[command(about = "roledesk - edit roles and their permissions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive editing session
    Edit {
        /// Number of demo roles to create before editing
        #[arg(long, default_value = "0")]
        demo_roles: usize,
    },
    /// List the built-in role templates
    Templates,
    /// Print the permission catalog grouped by category
    Permissions {
        /// Only show permissions whose name or description contains this text
        #[arg(short = 's', long)]
        search: Option<String>,

        /// Only show this category
        #[arg(short = 'c', long)]
        category: Option<String>,
    },
    /// Create demo roles from random templates
    Seed {
        /// Number of roles to create
        #[arg(short = 'r', long, default_value = "5")]
        roles: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let _logging = init_logging(&LoggingConfig::from_env())?;
    let config = EditorConfig::from_env();

    match config.store {
        StoreBackend::Memory => {
            let store = MemoryRoleStore::new().with_seed_on_empty(config.seed_on_empty);
            dispatch(store, cli.command).await
        }
        StoreBackend::Postgres => dispatch(postgres_store(&config).await?, cli.command).await,
    }
}

#[cfg(feature = "postgres")]
async fn postgres_store(config: &EditorConfig) -> Result<roledesk_db::PgRoleStore> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set for the postgres store")?;
    let pool = roledesk_db::init_db_pool(url, config.max_connections).await?;
    let store = roledesk_db::PgRoleStore::new(pool, config.seed_on_empty);
    store.migrate().await?;
    Ok(store)
}

#[cfg(not(feature = "postgres"))]
async fn postgres_store(_config: &EditorConfig) -> Result<MemoryRoleStore> {
    anyhow::bail!("roledesk was built without the `postgres` feature")
}

async fn dispatch<S: RoleStore>(store: S, command: Commands) -> Result<()> {
    match command {
        Commands::Edit { demo_roles } => handle_edit(store, demo_roles).await,
        Commands::Templates => handle_templates(store).await,
        Commands::Permissions { search, category } => {
            handle_permissions(store, search, category).await
        }
        Commands::Seed { roles } => handle_seed(store, roles).await,
    }
}

async fn handle_templates<S: RoleStore>(store: S) -> Result<()> {
    let catalog = PermissionCatalog::load(&store).await?;
    print!("{}", render_templates(&RoleTemplateEngine::builtin(), &catalog));
    Ok(())
}

async fn handle_permissions<S: RoleStore>(
    store: S,
    search: Option<String>,
    category: Option<String>,
) -> Result<()> {
    let catalog = PermissionCatalog::load(&store).await?;
    let groups = catalog.filter(
        search.as_deref().unwrap_or_default(),
        category.as_deref().unwrap_or(ALL_CATEGORIES),
    );
    print!("{}", render_catalog(&groups, None));
    Ok(())
}

async fn handle_seed<S: RoleStore>(store: S, roles: usize) -> Result<()> {
    let catalog = PermissionCatalog::load(&store).await?;
    let registry = RoleRegistry::load(store).await?;
    let created =
        seeder::seed_demo_roles(&registry, &catalog, &RoleTemplateEngine::builtin(), roles).await?;
    println!("✅ Created {} roles", created.len());
    Ok(())
}

/// Opens a session, offering a retry while the failure is recoverable.
async fn open_session<S: RoleStore>(registry: Arc<RoleRegistry<S>>) -> Result<EditorSession<S>> {
    loop {
        match EditorSession::open_with_registry(Arc::clone(&registry)).await {
            Ok(session) => return Ok(session),
            Err(e) if e.is_recoverable() => {
                eprintln!("❌ {}", e);
                let retry = Confirm::new()
                    .with_prompt("Retry?")
                    .default(true)
                    .interact()?;
                if !retry {
                    anyhow::bail!("editor not opened: {}", e);
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

const ACTIONS: &[&str] = &[
    "Switch role",
    "Toggle permission",
    "Select category",
    "Deselect category",
    "Select all",
    "Deselect all",
    "Reset changes",
    "Save",
    "Search permissions",
    "New role",
    "New role from template",
    "Rename role",
    "Refresh catalog",
    "Refresh roles",
    "Remove stale permissions",
    "Quit",
];

async fn handle_edit<S: RoleStore>(store: S, demo_roles: usize) -> Result<()> {
    let registry = Arc::new(RoleRegistry::new(store));
    let mut session = open_session(Arc::clone(&registry)).await?;

    if demo_roles > 0 {
        let engine = RoleTemplateEngine::builtin();
        seeder::seed_demo_roles(&registry, session.catalog(), &engine, demo_roles).await?;
    }

    loop {
        if matches!(session.switch_state(), SwitchState::PendingConfirm { .. }) {
            resolve_pending_switch(&mut session).await?;
            continue;
        }

        print_header(&session);
        let choice = Select::new()
            .with_prompt("Action")
            .items(ACTIONS)
            .default(0)
            .interact()?;

        let outcome = match ACTIONS[choice] {
            "Switch role" => switch_role(&mut session),
            "Toggle permission" => toggle_permission(&mut session),
            "Select category" => edit_category(&mut session, true),
            "Deselect category" => edit_category(&mut session, false),
            "Select all" => session.select_all().map_err(anyhow::Error::from),
            "Deselect all" => session.deselect_all().map_err(anyhow::Error::from),
            "Reset changes" => session.reset().map_err(anyhow::Error::from),
            "Save" => save(&mut session).await,
            "Search permissions" => search(&session),
            "New role" => new_role(&mut session, false).await,
            "New role from template" => new_role(&mut session, true).await,
            "Rename role" => rename_role(&mut session).await,
            "Refresh catalog" => session.refresh_catalog().await.map_err(anyhow::Error::from),
            "Refresh roles" => session.refresh_roles().await.map_err(anyhow::Error::from),
            "Remove stale permissions" => {
                let removed = session.prune_stale();
                println!("Removed {} stale permissions", removed.len());
                Ok(())
            }
            _ => {
                if confirm_quit(&session)? {
                    return Ok(());
                }
                Ok(())
            }
        };

        if let Err(e) = outcome {
            report(e)?;
        }
    }
}

/// Prints editor errors and keeps going; terminal errors end the session.
fn report(e: anyhow::Error) -> Result<()> {
    match e.downcast::<EditorError>() {
        Ok(editor) => {
            eprintln!("❌ {}", editor);
            Ok(())
        }
        Err(other) => Err(other),
    }
}

fn print_header<S: RoleStore>(session: &EditorSession<S>) {
    println!();
    match session.active_role() {
        Some(role) => {
            let marker = if session.is_dirty() { " *unsaved*" } else { "" };
            println!("Role: {}{}", role.name, marker);
            print!("{}", render_summary(&session.category_summary()));
        }
        None => println!("No role selected"),
    }
}

fn switch_role<S: RoleStore>(session: &mut EditorSession<S>) -> Result<()> {
    let roles = session.roles();
    if roles.is_empty() {
        println!("No roles yet. Create one first.");
        return Ok(());
    }

    let active = session.selection().role_id();
    let labels: Vec<String> = roles
        .iter()
        .map(|r| role_label(r, Some(r.id) == active))
        .collect();
    let Some(index) = Select::new()
        .with_prompt("Role")
        .items(&labels)
        .interact_opt()?
    else {
        return Ok(());
    };

    if let SwitchDecision::ConfirmRequired(_) = session.request_switch(roles[index].id)? {
        println!("You have unsaved changes.");
    }
    Ok(())
}

async fn resolve_pending_switch<S: RoleStore>(session: &mut EditorSession<S>) -> Result<()> {
    let choice = Select::new()
        .with_prompt("Unsaved changes")
        .items(["Save and switch", "Discard changes and switch", "Stay on this role"])
        .default(0)
        .interact()?;

    let outcome = match choice {
        0 => session.save_then_switch().await.map(|role| {
            println!("✅ Saved. Now editing {}", role.name);
        }),
        1 => session.discard().map(|role| println!("Now editing {}", role.name)),
        _ => session.cancel(),
    };

    if let Err(e) = outcome {
        eprintln!("❌ {}", e);
        if !e.is_recoverable() {
            session.cancel()?;
        }
    }
    Ok(())
}

fn toggle_permission<S: RoleStore>(session: &mut EditorSession<S>) -> Result<()> {
    let catalog = session.catalog().clone();
    let labels: Vec<String> = catalog
        .all()
        .iter()
        .map(|p| permission_line(p, session.selection().is_selected(p.id)))
        .collect();

    if let Some(index) = Select::new()
        .with_prompt("Permission")
        .items(&labels)
        .max_length(15)
        .interact_opt()?
    {
        session.toggle(catalog.all()[index].id)?;
    }
    Ok(())
}

fn edit_category<S: RoleStore>(session: &mut EditorSession<S>, select: bool) -> Result<()> {
    let categories: Vec<String> = session.catalog().categories().map(str::to_string).collect();
    let Some(index) = Select::new()
        .with_prompt("Category")
        .items(&categories)
        .interact_opt()?
    else {
        return Ok(());
    };

    if select {
        session.select_category(&categories[index])?;
    } else {
        session.deselect_category(&categories[index])?;
    }
    Ok(())
}

async fn save<S: RoleStore>(session: &mut EditorSession<S>) -> Result<()> {
    let role = session.save().await?;
    println!("✅ Saved {} ({} permissions)", role.name, role.permission_ids.len());
    Ok(())
}

fn search<S: RoleStore>(session: &EditorSession<S>) -> Result<()> {
    let term: String = Input::new()
        .with_prompt("Search")
        .allow_empty(true)
        .interact_text()?;
    let groups = session.filter(&term, ALL_CATEGORIES);
    print!("{}", render_catalog(&groups, Some(session.selection().working())));
    Ok(())
}

async fn new_role<S: RoleStore>(session: &mut EditorSession<S>, from_template: bool) -> Result<()> {
    let mut draft = if from_template {
        let engine = RoleTemplateEngine::builtin();
        let labels: Vec<String> = engine
            .templates()
            .iter()
            .map(|t| format!("{} {}", t.icon.glyph(), t.name))
            .collect();
        let Some(index) = Select::new()
            .with_prompt("Template")
            .items(&labels)
            .interact_opt()?
        else {
            return Ok(());
        };
        RoleDraft::from_template(&engine.templates()[index], session.catalog())?
    } else {
        RoleDraft::default()
    };

    let name: String = Input::new()
        .with_prompt("Name")
        .with_initial_text(draft.name())
        .interact_text()?;
    let description: String = Input::new()
        .with_prompt("Description")
        .with_initial_text(draft.description())
        .allow_empty(true)
        .interact_text()?;
    draft.set_name(name);
    draft.set_description(description);

    let (role, decision) = session.create_role(&draft).await?;
    println!("✅ Created {}", role.name);
    if let SwitchDecision::ConfirmRequired(_) = decision {
        println!("You have unsaved changes on the current role.");
    }
    Ok(())
}

async fn rename_role<S: RoleStore>(session: &mut EditorSession<S>) -> Result<()> {
    let role = session.active_role().ok_or(EditorError::NoActiveRole)?;

    let name: String = Input::new()
        .with_prompt("Name")
        .with_initial_text(role.name.as_str())
        .interact_text()?;
    let description: String = Input::new()
        .with_prompt("Description")
        .with_initial_text(role.description.as_str())
        .allow_empty(true)
        .interact_text()?;

    let renamed = session
        .registry()
        .rename_role(role.id, UpdateRoleDto { name, description })
        .await?;
    println!("✅ Renamed to {}", renamed.name);
    Ok(())
}

fn confirm_quit<S: RoleStore>(session: &EditorSession<S>) -> Result<bool> {
    if !session.is_dirty() {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt("Quit and discard unsaved changes?")
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}
