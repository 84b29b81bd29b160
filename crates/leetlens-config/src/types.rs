//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [client]        # endpoint, timeout, user agent
//! [rate_limit]    # outbound request policy
//! [cache]         # TTLs and sweep interval
//! [cache.ttls]    # per-category overrides
//! [auth]          # session token
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g. project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeetlensConfig {
    /// Endpoint and transport settings.
    pub client: Option<ClientSection>,
    /// Outbound request rate policy.
    pub rate_limit: Option<RateLimitSection>,
    /// Response cache policy.
    pub cache: Option<CacheSection>,
    /// Session credential.
    pub auth: Option<AuthSection>,
}

impl LeetlensConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// A config with every section filled with defaults.
    pub fn with_defaults() -> Self {
        Self {
            client: Some(ClientSection::default()),
            rate_limit: Some(RateLimitSection::default()),
            cache: Some(CacheSection::default()),
            auth: Some(AuthSection::default()),
        }
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections replace each other wholesale, except that TTL overrides merge
    /// per category and a token is kept when the later layer has none.
    pub fn merge(&mut self, other: LeetlensConfig) {
        if other.client.is_some() {
            self.client = other.client;
        }

        if other.rate_limit.is_some() {
            self.rate_limit = other.rate_limit;
        }

        if let Some(mut cache) = other.cache {
            if let Some(base) = self.cache.take() {
                for (category, ttl) in base.ttls {
                    cache.ttls.entry(category).or_insert(ttl);
                }
            }
            self.cache = Some(cache);
        }

        if let Some(mut auth) = other.auth {
            if auth.session_token.is_none() {
                auth.session_token = self.auth.take().and_then(|a| a.session_token);
            }
            self.auth = Some(auth);
        }
    }

    /// Reject values the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        let client = self.client();
        if client.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("client.base_url", "must not be empty"));
        }
        if client.timeout_secs == 0 {
            return Err(ConfigError::invalid("client.timeout_secs", "must be positive"));
        }

        let rate = self.rate_limit();
        if rate.max_requests == 0 {
            return Err(ConfigError::invalid(
                "rate_limit.max_requests",
                "must be at least 1",
            ));
        }
        if rate.window_secs == 0 {
            return Err(ConfigError::invalid(
                "rate_limit.window_secs",
                "must be positive",
            ));
        }

        let cache = self.cache();
        check_ttl("cache.default_ttl_secs".to_string(), cache.default_ttl_secs)?;
        for (category, secs) in &cache.ttls {
            check_ttl(format!("cache.ttls.{}", category), *secs)?;
        }

        Ok(())
    }

    /// Effective `[client]` section.
    pub fn client(&self) -> ClientSection {
        self.client.clone().unwrap_or_default()
    }

    /// Effective `[rate_limit]` section.
    pub fn rate_limit(&self) -> RateLimitSection {
        self.rate_limit.clone().unwrap_or_default()
    }

    /// Effective `[cache]` section.
    pub fn cache(&self) -> CacheSection {
        self.cache.clone().unwrap_or_default()
    }

    /// Effective `[auth]` section.
    pub fn auth(&self) -> AuthSection {
        self.auth.clone().unwrap_or_default()
    }

    /// Session token, if one is configured.
    pub fn session_token(&self) -> Option<&str> {
        self.auth
            .as_ref()
            .and_then(|a| a.session_token.as_deref())
            .filter(|t| !t.is_empty())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────────────────────────────────────

/// Default site URL.
pub const DEFAULT_BASE_URL: &str = "https://leetcode.com/";

/// Longest accepted cache TTL in seconds (one year).
pub const MAX_TTL_SECS: i64 = 365 * 24 * 60 * 60;

fn check_ttl(field: String, secs: i64) -> Result<()> {
    if secs <= 0 {
        return Err(ConfigError::invalid(
            field,
            format!("must be positive, got {}", secs),
        ));
    }
    if secs > MAX_TTL_SECS {
        return Err(ConfigError::invalid(
            field,
            format!("must be at most {} seconds, got {}", MAX_TTL_SECS, secs),
        ));
    }
    Ok(())
}

/// Endpoint and transport settings.
///
/// ```toml
/// [client]
/// base_url = "https://leetcode.com/"
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSection {
    /// Site URL; the landing page used for token bootstrap.
    pub base_url: String,
    /// GraphQL endpoint. Derived from `base_url` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graphql_url: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// User agent override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            graphql_url: None,
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

impl ClientSection {
    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Outbound request rate policy.
///
/// ```toml
/// [rate_limit]
/// max_requests = 20
/// window_secs = 30
/// min_spacing_ms = 200
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSection {
    /// Requests allowed within one window.
    pub max_requests: u32,
    /// Window length in seconds.
    pub window_secs: u64,
    /// Minimum delay between requests in milliseconds.
    pub min_spacing_ms: u64,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            max_requests: 20,
            window_secs: 30,
            min_spacing_ms: 200,
        }
    }
}

impl RateLimitSection {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn min_spacing(&self) -> Duration {
        Duration::from_millis(self.min_spacing_ms)
    }
}

/// Response cache policy.
///
/// ```toml
/// [cache]
/// default_ttl_secs = 300
/// cleanup_interval_secs = 300
///
/// [cache.ttls]
/// profile = 3600
/// contest = 1800
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// TTL for categories without an override.
    pub default_ttl_secs: i64,
    /// Per-category TTL overrides in seconds.
    pub ttls: BTreeMap<String, i64>,
    /// Interval of the background sweep in seconds; 0 disables it.
    pub cleanup_interval_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            default_ttl_secs: 300,
            ttls: BTreeMap::new(),
            cleanup_interval_secs: 300,
        }
    }
}

impl CacheSection {
    /// Sweep interval, or `None` when disabled.
    pub fn cleanup_interval(&self) -> Option<Duration> {
        (self.cleanup_interval_secs > 0).then(|| Duration::from_secs(self.cleanup_interval_secs))
    }
}

/// Session credential.
///
/// ```toml
/// [auth]
/// allow_anonymous = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    /// `LEETCODE_SESSION` cookie value. Prefer the environment variable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    /// Continue without a cookie when no token can be obtained.
    pub allow_anonymous: bool,
}
