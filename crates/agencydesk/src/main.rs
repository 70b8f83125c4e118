//! `agencydesk` - CLI for the agencydesk back office
//!
//! This binary runs the HTTP server and provides maintenance commands for the
//! flat-file data directory.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use agencydesk::auth::SessionStore;
use agencydesk::cli::{Cli, Command, ConfigCommand, ExportCommand, UserCommand};
use agencydesk::model::NewAdminUser;
use agencydesk::service::{export_csv, UserService};
use agencydesk::{init_logging, serve, AppContext, Config, Storage};

const REDACTED: &str = "********";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // `config validate` reports load errors instead of failing on them.
    if let Command::Config(ConfigCommand::Validate { file }) = &cli.command {
        handle_validate(file.clone().or_else(|| cli.config.clone()));
        return Ok(());
    }

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Serve(cmd) => handle_serve(config, cmd.bind).await,
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Export(cmd) => handle_export(&config, &cmd),
        Command::User(cmd) => handle_user(&config, cmd),
        Command::Config(cmd) => handle_config(&config, &cmd),
    }
}

fn open_storage(config: &Config) -> Result<Storage> {
    let data_dir = config.data_dir();
    Storage::open(&data_dir)
        .with_context(|| format!("opening data directory {}", data_dir.display()))
}

async fn handle_serve(mut config: Config, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind_address = bind;
        config.validate().context("checking --bind")?;
    }

    let storage = open_storage(&config)?;
    let state = Arc::new(AppContext::new(config, storage));

    if let Some(owner) = &state.config.auth.bootstrap_owner {
        if let Some(profile) = state
            .users()
            .bootstrap_owner(owner)
            .context("creating bootstrap owner")?
        {
            info!(email = %profile.email, "Created bootstrap owner account");
        }
    }

    serve(state).await.context("running HTTP server")
}

fn handle_status(config: &Config, json: bool) -> Result<()> {
    let storage = open_storage(config)?;
    let stats = storage.stats()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("agencydesk status");
        println!("-----------------");
        println!("Data directory:  {}", stats.data_dir.display());
        println!("Schema version:  {}", stats.schema_version);
        println!();
        for collection in &stats.collections {
            println!(
                "  {:<12} {:>6} records  {:>10} bytes",
                collection.name, collection.records, collection.bytes
            );
        }
        println!();
        println!(
            "Total:           {} records, {} bytes",
            stats.total_records(),
            stats.total_bytes()
        );
    }
    Ok(())
}

fn handle_export(config: &Config, cmd: &ExportCommand) -> Result<()> {
    let storage = open_storage(config)?;
    let bytes = export_csv(&storage, cmd.collection)?;

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &bytes)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), collection = %cmd.collection, "Wrote export");
        }
        None => std::io::stdout().write_all(&bytes)?,
    }
    Ok(())
}

fn handle_user(config: &Config, cmd: UserCommand) -> Result<()> {
    let storage = open_storage(config)?;
    // CLI changes do not reach a running server's sessions.
    let sessions = SessionStore::new(config.session_ttl());
    let users = UserService::new(&storage, &sessions, &config.auth);

    match cmd {
        UserCommand::Add {
            name,
            email,
            password,
            role,
        } => {
            let profile = users.create(NewAdminUser {
                name,
                email,
                password,
                role: role.into(),
            })?;
            println!("Created {} {} ({})", profile.role, profile.email, profile.id);
        }
        UserCommand::List { json } => {
            let profiles = users.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&profiles)?);
            } else if profiles.is_empty() {
                println!("No admin accounts.");
            } else {
                for p in &profiles {
                    println!(
                        "{:<36}  {:<6}  {:<8}  {} <{}>",
                        p.id,
                        p.role.to_string(),
                        if p.active { "active" } else { "disabled" },
                        p.name,
                        p.email
                    );
                }
            }
        }
        UserCommand::ResetPassword { email, password } => {
            let profile = users.reset_password(&email, &password)?;
            println!("Password updated for {}", profile.email);
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: &ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let mut shown = config.clone();
            if let Some(owner) = shown.auth.bootstrap_owner.as_mut() {
                owner.password = REDACTED.to_string();
            }
            if *json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind address:       {}", shown.server.bind_address);
                println!("  Max body (bytes):   {}", shown.server.max_body_bytes);
                println!();
                println!("[Storage]");
                println!("  Data directory:     {}", shown.data_dir().display());
                println!();
                println!("[Auth]");
                println!("  Session TTL (min):  {}", shown.auth.session_ttl_minutes);
                println!("  Min password len:   {}", shown.auth.min_password_length);
                println!(
                    "  Bootstrap owner:    {}",
                    shown
                        .auth
                        .bootstrap_owner
                        .as_ref()
                        .map_or("none", |o| o.email.as_str())
                );
                println!();
                println!("[Content]");
                println!("  Sanitize mode:      {:?}", shown.content.sanitize_mode);
                println!(
                    "  Per page:           {} (max {})",
                    shown.content.default_per_page, shown.content.max_per_page
                );
                println!("  Words per minute:   {}", shown.content.words_per_minute);
                println!("  Excerpt length:     {}", shown.content.excerpt_length);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { .. } => {}
    }
    Ok(())
}

fn handle_validate(file: Option<std::path::PathBuf>) {
    let path = file.unwrap_or_else(Config::default_config_path);
    println!("Validating configuration: {}", path.display());
    match Config::load_from(Some(path)) {
        Ok(_) => println!("Configuration is valid."),
        Err(e) => println!("Configuration error: {e}"),
    }
}
