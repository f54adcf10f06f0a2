//! CLI module for the membership service
//!
//! - `serve`: run the HTTP API
//! - `migrate`: apply the PostgreSQL schema

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Membership - self-service member registration and profiles
#[derive(Parser)]
#[command(name = "membership")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Create the members table if it does not exist
    Migrate,
}

/// Shared startup: `.env`, layered configuration, then logging
fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration, using defaults: {}", e);
        AppConfig::default()
    });
    logging::init_logging(&config.logging);

    config
}
