//! CLI command handlers.

use std::path::PathBuf;

use anyhow::Result;
use leetlens_config::{LoadedConfig, SESSION_TOKEN_ENV};
use serde::Serialize;

use crate::app::App;

pub mod batch;
pub mod config;
pub mod problems;
pub mod profile;
pub mod user;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Allow anonymous fallback.
    pub anonymous: bool,
    /// Explicit config file, bypassing discovery.
    pub config_path: Option<PathBuf>,
}

impl Context {
    /// Load the explicit config file, or discover the layered config.
    pub fn load_config(&self) -> Result<LoadedConfig> {
        let loaded = match &self.config_path {
            Some(path) => {
                leetlens_config::load_config_from(path, std::env::var(SESSION_TOKEN_ENV).ok())?
            }
            None => leetlens_config::load_config(None)?,
        };

        for warning in &loaded.warnings {
            tracing::warn!("{}", warning);
        }
        Ok(loaded)
    }

    /// Load config and start the client.
    pub fn start_app(&self) -> Result<App> {
        let loaded = self.load_config()?;
        App::start(&loaded.config, self.anonymous)
    }

    /// Print a value as pretty JSON.
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}
