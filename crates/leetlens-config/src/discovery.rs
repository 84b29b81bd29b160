//! Config file discovery and layered merging.
//!
//! Resolution order (later overrides earlier):
//! 1. `~/.config/leetlens/config.toml` (user config)
//! 2. `./leetlens.toml` (project-local)
//! 3. `LEETCODE_SESSION` environment variable (token only)
//! 4. CLI arguments (handled externally)

use std::path::{Path, PathBuf};

use crate::{ConfigError, LeetlensConfig, Result};

/// Default config filename for project-local config.
const PROJECT_CONFIG_FILE: &str = "leetlens.toml";

/// Default config filename within the user config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for config directory resolution.
const APP_NAME: &str = "leetlens";

/// Environment variable to override the config directory.
const CONFIG_DIR_ENV: &str = "LEETLENS_CONFIG_DIR";

/// Environment variable carrying the session cookie value.
pub const SESSION_TOKEN_ENV: &str = "LEETCODE_SESSION";

/// Tracks where each config layer was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the config file.
    pub path: PathBuf,
    /// Whether the file was found and loaded.
    pub loaded: bool,
}

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration.
    pub config: LeetlensConfig,
    /// Sources that were checked, in order of precedence (lowest first).
    pub sources: Vec<ConfigSource>,
    /// Whether the token came from the environment.
    pub token_from_env: bool,
    /// Warnings generated during loading (e.g. plaintext tokens).
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Get paths of sources that were actually loaded.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Load configuration by discovering and merging all config layers.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    let env_token = std::env::var(SESSION_TOKEN_ENV).ok();
    load_config_with_options(project_dir, None, env_token)
}

/// Load configuration with explicit control over every input.
///
/// `config_dir` overrides both `LEETLENS_CONFIG_DIR` and the platform
/// default. `env_token` stands in for the `LEETCODE_SESSION` variable.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
    env_token: Option<String>,
) -> Result<LoadedConfig> {
    let mut config = LeetlensConfig::new();
    let mut sources = Vec::new();
    let mut warnings = Vec::new();

    // 1. User config
    let user_config_path = match config_dir {
        Some(dir) => Some(dir.join(USER_CONFIG_FILE)),
        None => user_config_path(),
    };
    if let Some(path) = user_config_path {
        sources.push(load_layer(&mut config, &path, &mut warnings)?);
    }

    // 2. Project-local config
    let project_path = project_dir
        .map(|d| d.join(PROJECT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
    sources.push(load_layer(&mut config, &project_path, &mut warnings)?);

    check_plaintext_token(&config, &mut warnings);

    // 3. Environment
    let token_from_env = apply_env_token(&mut config, env_token);

    Ok(LoadedConfig {
        config,
        sources,
        token_from_env,
        warnings,
    })
}

/// Load one explicit config file instead of discovering layers.
///
/// Unlike discovery, a missing or malformed file is an error. The
/// environment token still applies.
pub fn load_config_from(path: &Path, env_token: Option<String>) -> Result<LoadedConfig> {
    let mut config = load_config_file(path)?;
    let mut warnings = Vec::new();
    check_plaintext_token(&config, &mut warnings);
    let token_from_env = apply_env_token(&mut config, env_token);

    Ok(LoadedConfig {
        config,
        sources: vec![ConfigSource {
            path: path.to_path_buf(),
            loaded: true,
        }],
        token_from_env,
        warnings,
    })
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<LeetlensConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    LeetlensConfig::from_toml(&contents)
}

/// Save configuration to a file.
///
/// Creates parent directories if they don't exist.
pub fn save_config(config: &LeetlensConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = config.to_toml()?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// Path of the user config file.
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// User config directory.
///
/// Checks `LEETLENS_CONFIG_DIR` first, then falls back to the platform
/// default (`~/.config/leetlens` on Linux).
pub fn user_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Try to load a config file and merge it into the existing config.
///
/// A missing file is skipped; a malformed one is skipped with a warning.
fn load_layer(
    config: &mut LeetlensConfig,
    path: &Path,
    warnings: &mut Vec<String>,
) -> Result<ConfigSource> {
    if !path.is_file() {
        return Ok(ConfigSource {
            path: path.to_path_buf(),
            loaded: false,
        });
    }

    match load_config_file(path) {
        Ok(layer) => {
            config.merge(layer);
            Ok(ConfigSource {
                path: path.to_path_buf(),
                loaded: true,
            })
        }
        Err(e) => {
            warnings.push(format!("Failed to load {}: {}", path.display(), e));
            Ok(ConfigSource {
                path: path.to_path_buf(),
                loaded: false,
            })
        }
    }
}

/// Warn when a file layer carries the session token in plaintext.
fn check_plaintext_token(config: &LeetlensConfig, warnings: &mut Vec<String>) {
    if config.session_token().is_some() {
        warnings.push(format!(
            "Config file contains a plaintext session token. \
             Consider setting {} in the environment instead.",
            SESSION_TOKEN_ENV
        ));
    }
}

/// Install a non-blank environment token. Returns whether one was applied.
fn apply_env_token(config: &mut LeetlensConfig, env_token: Option<String>) -> bool {
    match env_token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(token) => {
            config.auth.get_or_insert_with(Default::default).session_token =
                Some(token.to_string());
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn load(project: &TempDir, user: &TempDir, env_token: Option<&str>) -> LoadedConfig {
        load_config_with_options(
            Some(project.path()),
            Some(user.path()),
            env_token.map(str::to_string),
        )
        .unwrap()
    }

    #[test]
    fn test_user_config_path_shape() {
        if let Some(p) = user_config_path() {
            assert!(p.ends_with("config.toml"));
        }
    }

    #[test]
    fn test_load_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[rate_limit]\nmax_requests = 7\n").unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.rate_limit().max_requests, 7);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let err = load_config_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is not valid toml {{{{").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_no_files() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();

        let loaded = load(&project, &user, None);
        assert_eq!(loaded.config, LeetlensConfig::new());
        assert!(loaded.loaded_from().is_empty());
        assert!(loaded.warnings.is_empty());
        assert!(!loaded.token_from_env);
    }

    #[test]
    fn test_project_overrides_user() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        fs::write(
            user.path().join("config.toml"),
            "[rate_limit]\nmax_requests = 5\n\n[client]\ntimeout_secs = 12\n",
        )
        .unwrap();
        fs::write(
            project.path().join("leetlens.toml"),
            "[rate_limit]\nmax_requests = 9\n",
        )
        .unwrap();

        let loaded = load(&project, &user, None);
        assert_eq!(loaded.config.rate_limit().max_requests, 9);
        assert_eq!(loaded.config.client().timeout_secs, 12);
        assert_eq!(loaded.loaded_from().len(), 2);
    }

    #[test]
    fn test_env_token_overrides_files() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        fs::write(
            project.path().join("leetlens.toml"),
            "[auth]\nsession_token = \"from-file\"\nallow_anonymous = true\n",
        )
        .unwrap();

        let loaded = load(&project, &user, Some(" from-env "));
        assert_eq!(loaded.config.session_token(), Some("from-env"));
        assert!(loaded.config.auth().allow_anonymous);
        assert!(loaded.token_from_env);
    }

    #[test]
    fn test_blank_env_token_ignored() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();

        let loaded = load(&project, &user, Some("   "));
        assert!(loaded.config.session_token().is_none());
        assert!(!loaded.token_from_env);
    }

    #[test]
    fn test_plaintext_token_warning() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        fs::write(
            user.path().join("config.toml"),
            "[auth]\nsession_token = \"secret\"\n",
        )
        .unwrap();

        let loaded = load(&project, &user, None);
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("plaintext"));
    }

    #[test]
    fn test_env_token_alone_does_not_warn() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();

        let loaded = load(&project, &user, Some("from-env"));
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_malformed_config_warns_but_continues() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        fs::write(project.path().join("leetlens.toml"), "not valid toml {{{{").unwrap();

        let loaded = load(&project, &user, None);
        assert!(!loaded.warnings.is_empty());
        assert!(loaded.warnings[0].contains("Failed to load"));
        assert!(loaded.loaded_from().is_empty());
    }

    #[test]
    fn test_load_config_from_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[cache]\ncleanup_interval_secs = 0\n").unwrap();

        let loaded = load_config_from(&path, Some("tok".to_string())).unwrap();
        assert_eq!(loaded.config.cache().cleanup_interval(), None);
        assert_eq!(loaded.config.session_token(), Some("tok"));
        assert_eq!(loaded.loaded_from(), vec![path.as_path()]);

        let err = load_config_from(&dir.path().join("missing.toml"), None).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = LeetlensConfig::with_defaults();
        if let Some(cache) = config.cache.as_mut() {
            cache.ttls.insert("profile".to_string(), 900);
        }
        save_config(&config, &path).unwrap();

        let reloaded = load_config_file(&path).unwrap();
        assert_eq!(reloaded, config);
    }
}
