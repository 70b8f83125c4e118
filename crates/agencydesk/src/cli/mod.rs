//! Command-line interface for agencydesk.
//!
//! This module provides the CLI structure for the `agencydesk` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, ExportCommand, RoleArg, ServeCommand, StatusCommand, UserCommand,
};

/// agencydesk - Marketing site API and admin back office
///
/// Serves blog posts, portfolio projects and the contact form, plus an
/// authenticated admin API, all stored in flat CSV and JSON files.
#[derive(Debug, Parser)]
#[command(name = "agencydesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Show storage status
    Status(StatusCommand),

    /// Export a collection as CSV
    Export(ExportCommand),

    /// Manage admin accounts
    #[command(subcommand)]
    User(UserCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ExportCollection;
    use clap::CommandFactory;

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "agencydesk");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        let cli = Cli::try_parse_from(["agencydesk", "-q", "-v", "status"]).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Quiet);
        let cli = Cli::try_parse_from(["agencydesk", "-vv", "status"]).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Trace);
    }

    #[test]
    fn test_parse_serve_with_bind() {
        let cli = Cli::try_parse_from(["agencydesk", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        match cli.command {
            Command::Serve(cmd) => assert_eq!(cmd.bind.as_deref(), Some("0.0.0.0:8080")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_export() {
        let cli =
            Cli::try_parse_from(["agencydesk", "export", "admin_users", "-o", "users.csv"]).unwrap();
        match cli.command {
            Command::Export(cmd) => {
                assert_eq!(cmd.collection, ExportCollection::AdminUsers);
                assert_eq!(cmd.output, Some(PathBuf::from("users.csv")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["agencydesk", "export", "invoices"]).is_err());
    }

    #[test]
    fn test_parse_user_add() {
        let cli = Cli::try_parse_from([
            "agencydesk",
            "user",
            "add",
            "--name",
            "Ada",
            "--email",
            "ada@studio.io",
            "--password",
            "s3cret-pass",
            "--role",
            "owner",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::User(UserCommand::Add {
                role: RoleArg::Owner,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_user_reset_password() {
        let cli = Cli::try_parse_from([
            "agencydesk",
            "user",
            "reset-password",
            "--email",
            "ada@studio.io",
            "--password",
            "another-pass",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::User(UserCommand::ResetPassword { .. })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["agencydesk", "-c", "/custom/config.toml", "status"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = Cli::try_parse_from(["agencydesk", "config", "validate", "--file", "x.toml"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }
}
