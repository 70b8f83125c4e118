//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::model::AdminRole;
use crate::service::ExportCollection;

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to listen on (overrides `server.bind_address`)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Collection to export
    #[arg(value_enum)]
    pub collection: ExportCollection,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Admin account commands.
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create an admin account
    Add {
        /// Display name
        #[arg(long)]
        name: String,

        /// Login email
        #[arg(long)]
        email: String,

        /// Initial password
        #[arg(long)]
        password: String,

        /// Access level
        #[arg(long, value_enum, default_value = "editor")]
        role: RoleArg,
    },

    /// List admin accounts
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Set a new password for an account
    ResetPassword {
        /// Login email of the account
        #[arg(long)]
        email: String,

        /// New password
        #[arg(long)]
        password: String,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Role argument for account creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RoleArg {
    /// Full access, including user management
    Owner,
    /// Content and lead management
    #[default]
    Editor,
}

impl From<RoleArg> for AdminRole {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Owner => Self::Owner,
            RoleArg::Editor => Self::Editor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_arg_conversion() {
        assert_eq!(AdminRole::from(RoleArg::Owner), AdminRole::Owner);
        assert_eq!(AdminRole::from(RoleArg::Editor), AdminRole::Editor);
    }

    #[test]
    fn test_role_arg_default() {
        assert_eq!(RoleArg::default(), RoleArg::Editor);
    }

    #[test]
    fn test_user_command_debug() {
        let cmd = UserCommand::List { json: true };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("List"));
        assert!(debug_str.contains("json"));
    }

    #[test]
    fn test_export_command_debug() {
        let cmd = ExportCommand {
            collection: ExportCollection::Blogs,
            output: None,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Blogs"));
    }
}
