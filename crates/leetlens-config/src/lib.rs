//! Configuration for the leetlens client and CLI.
//!
//! Provides TOML-based configuration with:
//! - Endpoint, timeout and user agent settings (`[client]`)
//! - Request rate policy (`[rate_limit]`)
//! - Per-category cache TTLs and the background sweep interval (`[cache]`)
//! - Session credential and anonymous fallback (`[auth]`)
//!
//! Files are layered: user config, then `./leetlens.toml`, then the
//! `LEETCODE_SESSION` environment variable for the token.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, SESSION_TOKEN_ENV, load_config, load_config_file, load_config_from,
    load_config_with_options, save_config, user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
