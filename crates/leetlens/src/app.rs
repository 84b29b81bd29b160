//! Client lifetime: construction from config, background cache sweep, shutdown.

use std::time::Duration;

use anyhow::{Context as _, Result};
use leetlens_client::{LeetClient, RateLimitConfig, TtlCache, TtlPolicy, category};
use leetlens_config::LeetlensConfig;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// The one client of this process, plus its background work.
pub struct App {
    client: LeetClient,
    cancel: CancellationToken,
    sweeper: Option<JoinHandle<()>>,
}

impl App {
    /// Build the client and start the periodic cache sweep (if enabled).
    ///
    /// `allow_anonymous` turns on anonymous fallback regardless of config.
    pub fn start(config: &LeetlensConfig, allow_anonymous: bool) -> Result<Self> {
        config.validate().context("invalid configuration")?;
        let client = build_client(config, allow_anonymous)?;

        let cancel = CancellationToken::new();
        let sweeper = config
            .cache()
            .cleanup_interval()
            .map(|every| spawn_sweeper(client.cache().clone(), every, cancel.clone()));

        tracing::debug!(
            graphql_url = %client.graphql_url(),
            sweep = sweeper.is_some(),
            "Client started"
        );

        Ok(Self {
            client,
            cancel,
            sweeper,
        })
    }

    /// The shared client.
    pub fn client(&self) -> &LeetClient {
        &self.client
    }

    /// Stop background work and wait for it to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Some(handle) = self.sweeper
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "Cache sweep task failed");
        }

        let stats = self.client.cache().stats();
        tracing::debug!(
            cached = stats.active,
            expired = stats.expired,
            open_sessions = self.client.sessions().open_sessions(),
            "Client shut down"
        );
    }
}

/// Translate config sections into a client.
pub fn build_client(config: &LeetlensConfig, allow_anonymous: bool) -> Result<LeetClient> {
    let client = config.client();
    let rate = config.rate_limit();
    let auth = config.auth();

    let mut builder = LeetClient::builder()
        .base_url(client.base_url.as_str())
        .timeout(client.timeout())
        .allow_anonymous(allow_anonymous || auth.allow_anonymous)
        .rate_limit(
            RateLimitConfig::new()
                .with_max_requests(rate.max_requests)
                .with_window(rate.window())
                .with_min_spacing(rate.min_spacing()),
        )
        .cache_policy(cache_policy(config)?);

    if let Some(url) = client.graphql_url {
        builder = builder.graphql_url(url);
    }
    if let Some(agent) = client.user_agent {
        builder = builder.user_agent(agent);
    }
    if let Some(token) = config.session_token() {
        builder = builder.session_token(token);
    }

    Ok(builder.build()?)
}

/// Built-in TTLs with the configured overrides applied.
fn cache_policy(config: &LeetlensConfig) -> Result<TtlPolicy> {
    let cache = config.cache();
    let mut policy = TtlPolicy::default();
    policy.set(category::DEFAULT, secs(cache.default_ttl_secs)?)?;
    for (name, ttl) in &cache.ttls {
        policy
            .set(name.as_str(), secs(*ttl)?)
            .with_context(|| format!("cache TTL for '{}'", name))?;
    }
    Ok(policy)
}

fn secs(value: i64) -> Result<Duration> {
    let value = u64::try_from(value).context("TTL must be positive")?;
    Ok(Duration::from_secs(value))
}

fn spawn_sweeper(
    cache: TtlCache<Value>,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Cache sweep stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = cache.cleanup();
                    if removed > 0 {
                        tracing::debug!(removed, remaining = cache.len(), "Cache sweep");
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(toml: &str) -> LeetlensConfig {
        LeetlensConfig::from_toml(toml).unwrap()
    }

    #[tokio::test]
    async fn test_start_applies_config() {
        let app = App::start(
            &config(
                r#"
[client]
base_url = "http://localhost:9999/"

[rate_limit]
max_requests = 3

[cache]
cleanup_interval_secs = 0

[cache.ttls]
profile = 42
"#,
            ),
            false,
        )
        .unwrap();

        let client = app.client();
        assert_eq!(client.graphql_url().as_str(), "http://localhost:9999/graphql");
        assert_eq!(client.rate_limiter().config().max_requests, 3);
        assert_eq!(
            client.cache().ttl_for(category::PROFILE),
            Duration::from_secs(42)
        );
        // Built-in TTLs survive
        assert_eq!(
            client.cache().ttl_for(category::CONTEST),
            Duration::from_secs(1800)
        );
        assert!(app.sweeper.is_none());

        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_config() {
        let result = App::start(&config("[rate_limit]\nmax_requests = 0\n"), false);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_token_from_config_is_used() {
        let app = App::start(&config("[auth]\nsession_token = \"tok\"\n"), false).unwrap();
        assert!(app.client().sessions().has_token().await);
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_sweeper_removes_expired_entries() {
        let app = App::start(&config("[cache]\ncleanup_interval_secs = 1\n"), false).unwrap();
        assert!(app.sweeper.is_some());

        let cache = app.client().cache().clone();
        cache
            .set_with_ttl("stale", Value::from(1), Duration::from_millis(1))
            .unwrap();
        assert_eq!(cache.len(), 1);

        tokio::time::sleep(Duration::from_millis(1_300)).await;
        assert_eq!(cache.len(), 0);

        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_sweeper() {
        let app = App::start(&LeetlensConfig::new(), false).unwrap();
        let cancel = app.cancel.clone();
        app.shutdown().await;
        assert!(cancel.is_cancelled());
    }
}
