//! `agencydesk` - Marketing site API and admin back office backed by flat files
//!
//! This library provides the file-backed persistence layer, rich text handling,
//! admin authentication and the HTTP interface for a consultancy's public site
//! and its admin console.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod logging;
pub mod model;
pub mod server;
pub mod service;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use server::{build_router, serve, AppContext, AppState};
pub use storage::{Storage, StorageStats};
