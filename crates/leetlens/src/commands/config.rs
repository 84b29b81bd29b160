//! Config command - configuration management.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use leetlens_config::LeetlensConfig;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the resolved configuration and where it came from
    Show,

    /// Show the user configuration file path
    Path,

    /// Initialize a config file with defaults
    Init {
        /// Create project-local config (./leetlens.toml) instead of user config
        #[arg(long)]
        local: bool,
    },
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Path => cmd_path(),
        ConfigCommand::Init { local } => cmd_init(local),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;
    let mut config = loaded.config.clone();

    // Never echo the credential
    let has_token = config.session_token().is_some();
    if let Some(auth) = config.auth.as_mut() {
        auth.session_token = auth.session_token.as_ref().map(|_| "<redacted>".to_string());
    }

    if ctx.json_output {
        let sources: Vec<_> = loaded
            .loaded_from()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        return ctx.print_json(&serde_json::json!({
            "sources": sources,
            "token": token_source(has_token, loaded.token_from_env),
            "warnings": loaded.warnings,
            "config": effective(&config),
        }));
    }

    let dim = Style::new().dim();
    println!("# leetlens configuration\n");

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("No config files loaded (using defaults)\n");
    } else {
        println!("Config files:");
        for source in &sources {
            println!("  {}", source.display());
        }
        println!();
    }

    println!(
        "{} {}\n",
        dim.apply_to("Session token:"),
        token_source(has_token, loaded.token_from_env)
    );
    print!("{}", effective(&config).to_toml()?);
    Ok(())
}

/// Every section filled in, so defaults are visible.
fn effective(config: &LeetlensConfig) -> LeetlensConfig {
    LeetlensConfig {
        client: Some(config.client()),
        rate_limit: Some(config.rate_limit()),
        cache: Some(config.cache()),
        auth: Some(config.auth()),
    }
}

fn token_source(has_token: bool, from_env: bool) -> &'static str {
    match (has_token, from_env) {
        (false, _) => "not set (bootstrapped on first request)",
        (true, true) => "from environment",
        (true, false) => "from config file",
    }
}

fn cmd_path() -> Result<()> {
    if let Some(path) = leetlens_config::user_config_path() {
        println!("{}", path.display());
    } else {
        eprintln!("Could not determine config directory");
    }
    Ok(())
}

fn cmd_init(local: bool) -> Result<()> {
    let path = if local {
        PathBuf::from("leetlens.toml")
    } else {
        leetlens_config::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
    };

    if path.exists() {
        println!("Config file already exists: {}", path.display());
        return Ok(());
    }

    leetlens_config::save_config(&LeetlensConfig::with_defaults(), &path)?;
    println!("✓ Created config file: {}", path.display());
    println!();
    println!("Next steps:");
    println!("  export LEETCODE_SESSION=...   # supply your session cookie");
    println!("  leetlens config show          # verify configuration");

    Ok(())
}
