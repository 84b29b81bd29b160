//! Main client implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use leetlens_cache::{TtlCache, TtlPolicy};
use parking_lot::Mutex;
use reqwest::header::REFERER;
use serde_json::Value;
use url::Url;

use crate::api::{ProblemsApi, UsersApi};
use crate::error::{Error, Result};
use crate::queries::Query;
use crate::ratelimit::{RateLimitConfig, RateLimiter};
use crate::session::{Session, SessionManager};
use crate::types::ParsedResult;

/// Default landing page of the remote site.
pub const DEFAULT_BASE_URL: &str = "https://leetcode.com/";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Browser-style identifier the remote site accepts.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Rate-limited, caching LeetCode GraphQL client.
///
/// Cloning yields another handle to the same cache, limiter and sessions.
///
/// # Example
///
/// ```no_run
/// use leetlens_client::LeetClient;
///
/// # async fn example() -> leetlens_client::Result<()> {
/// let client = LeetClient::builder()
///     .session_token("cookie-value")
///     .build()?;
///
/// let scope = client.scope().await?;
/// let profile = client.users().complete_data("alice").await?;
/// let contests = client.users().contest_ranking("alice").await?;
/// scope.close();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LeetClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
struct ClientInner {
    /// GraphQL endpoint.
    graphql_url: Url,
    /// Token and session lifecycle.
    sessions: SessionManager,
    /// Outbound request gate.
    limiter: RateLimiter,
    /// Response cache keyed by caller-supplied keys.
    cache: TtlCache<Value>,
    /// Session installed by the outermost live [`SessionScope`].
    active: Mutex<Option<Arc<Session>>>,
    /// Continue without a cookie when no token can be obtained.
    allow_anonymous: bool,
}

impl LeetClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// GraphQL endpoint URL.
    pub fn graphql_url(&self) -> &Url {
        &self.inner.graphql_url
    }

    /// The response cache.
    pub fn cache(&self) -> &TtlCache<Value> {
        &self.inner.cache
    }

    /// The request rate limiter.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.limiter
    }

    /// The session manager.
    pub fn sessions(&self) -> &SessionManager {
        &self.inner.sessions
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the per-user queries.
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }

    /// Access the problem set queries.
    pub fn problems(&self) -> ProblemsApi {
        ProblemsApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sessions
    // ─────────────────────────────────────────────────────────────────────────

    /// Open a session shared by every `fetch` until the scope ends.
    ///
    /// When a scope is already active, the returned scope reuses its session
    /// and leaves it installed when dropped.
    pub async fn scope(&self) -> Result<SessionScope> {
        if let Some(session) = self.inner.active.lock().clone() {
            return Ok(SessionScope {
                client: self.clone(),
                session,
                owner: false,
            });
        }

        let session = Arc::new(self.open_session().await?);

        let mut active = self.inner.active.lock();
        if let Some(existing) = active.as_ref() {
            // Lost a race with another scope; ours is released on return
            return Ok(SessionScope {
                client: self.clone(),
                session: Arc::clone(existing),
                owner: false,
            });
        }
        *active = Some(Arc::clone(&session));
        tracing::debug!(session_id = session.id(), "Session scope entered");

        Ok(SessionScope {
            client: self.clone(),
            session,
            owner: true,
        })
    }

    /// Whether a session scope is currently active.
    pub fn in_scope(&self) -> bool {
        self.inner.active.lock().is_some()
    }

    async fn open_session(&self) -> Result<Session> {
        match self.inner.sessions.open().await {
            Ok(session) => Ok(session),
            Err(Error::AuthUnavailable(reason)) if self.inner.allow_anonymous => {
                tracing::warn!(reason = %reason, "No session token, continuing anonymously");
                self.inner.sessions.open_anonymous()
            }
            Err(e) => Err(e),
        }
    }

    /// Reuse the scoped session, or open one for this call only.
    async fn ensure_session(&self) -> Result<Arc<Session>> {
        if let Some(session) = self.inner.active.lock().clone() {
            return Ok(session);
        }
        Ok(Arc::new(self.open_session().await?))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fetch
    // ─────────────────────────────────────────────────────────────────────────

    /// Run a query through the cache, rate limiter and a session.
    ///
    /// An empty `cache_key` bypasses the cache in both directions. Responses
    /// carrying GraphQL errors are returned but not cached.
    pub async fn fetch(&self, query: &Query, cache_key: &str, category: &str) -> Result<ParsedResult> {
        if !cache_key.is_empty() {
            if let Some(data) = self.inner.cache.get(cache_key) {
                tracing::debug!(
                    operation = query.name(),
                    cache_key = %cache_key,
                    "Cache hit"
                );
                return Ok(ParsedResult::from_cache(data));
            }
            tracing::debug!(
                operation = query.name(),
                cache_key = %cache_key,
                "Cache miss"
            );
        }

        // Resolve local inputs before taking a rate slot
        let referer = self.referer_for(query)?;
        self.inner.limiter.admit().await;
        let session = self.ensure_session().await?;
        let parsed = self.send(&session, query, &referer).await?;
        drop(session);

        if parsed.has_errors() {
            tracing::warn!(
                operation = query.name(),
                error_count = parsed.errors.len(),
                first_error = %parsed.errors[0].message,
                "GraphQL response contained errors"
            );
        } else if !cache_key.is_empty() {
            self.inner
                .cache
                .set(cache_key, parsed.data.clone(), category);
        }

        Ok(parsed)
    }

    /// Send one query over `session` and parse the response.
    async fn send(&self, session: &Session, query: &Query, referer: &Url) -> Result<ParsedResult> {
        let started = Instant::now();

        tracing::info!(
            operation = query.name(),
            session_id = session.id(),
            "Sending GraphQL request"
        );

        let response = session
            .http()
            .post(self.inner.graphql_url.clone())
            .header(REFERER, referer.as_str())
            .json(&query.request())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(operation = query.name(), error = %e, "GraphQL request failed");
                Error::Transport(e)
            })?;

        let status = response.status();
        tracing::info!(
            operation = query.name(),
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "GraphQL request completed"
        );

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = serde_json::from_str(&text).unwrap_or(if text.is_empty() {
                Value::Null
            } else {
                Value::String(text)
            });
            tracing::error!(
                operation = query.name(),
                status = status.as_u16(),
                body = %body,
                "GraphQL request rejected"
            );
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        ParsedResult::from_body(&bytes).inspect_err(|e| {
            tracing::error!(operation = query.name(), error = %e, "Unusable GraphQL response");
        })
    }

    /// `Referer` for a query: the user's page, or the site root.
    ///
    /// The slug is appended as one escaped path segment.
    fn referer_for(&self, query: &Query) -> Result<Url> {
        let mut referer = self.inner.sessions.base_url().clone();
        if let Some(slug) = query.referer_slug().filter(|slug| !slug.is_empty()) {
            referer
                .path_segments_mut()
                .map_err(|_| Error::Config("base URL cannot carry a path".to_string()))?
                .pop_if_empty()
                .push(slug)
                .push("");
        }
        Ok(referer)
    }
}

impl std::fmt::Debug for LeetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeetClient")
            .field("graphql_url", &self.inner.graphql_url.as_str())
            .field("in_scope", &self.in_scope())
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session scope
// ─────────────────────────────────────────────────────────────────────────────

/// A live session shared by every `fetch` on the client.
///
/// Dropping the scope uninstalls the session. In-flight requests that
/// already hold it finish first; the session is released after the last one.
#[must_use = "the session is released as soon as the scope is dropped"]
pub struct SessionScope {
    client: LeetClient,
    session: Arc<Session>,
    owner: bool,
}

impl SessionScope {
    /// The shared session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Whether this scope opened the session (as opposed to reusing an outer one).
    pub fn is_owner(&self) -> bool {
        self.owner
    }

    /// End the scope.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for SessionScope {
    fn drop(&mut self) {
        if !self.owner {
            return;
        }
        let mut active = self.client.inner.active.lock();
        if active
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &self.session))
        {
            *active = None;
            tracing::debug!(session_id = self.session.id(), "Session scope exited");
        }
    }
}

impl std::fmt::Debug for SessionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionScope")
            .field("session", &self.session)
            .field("owner", &self.owner)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating a [`LeetClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    graphql_url: Option<String>,
    session_token: Option<String>,
    allow_anonymous: bool,
    timeout: Duration,
    user_agent: Option<String>,
    rate_limit: RateLimitConfig,
    cache_policy: TtlPolicy,
    cache: Option<TtlCache<Value>>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            graphql_url: None,
            session_token: None,
            allow_anonymous: false,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            rate_limit: RateLimitConfig::default(),
            cache_policy: TtlPolicy::default(),
            cache: None,
        }
    }

    /// Set the site URL (landing page and header origin).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the GraphQL endpoint. Defaults to `<base_url>/graphql`.
    pub fn graphql_url(mut self, url: impl Into<String>) -> Self {
        self.graphql_url = Some(url.into());
        self
    }

    /// Supply the session cookie value instead of bootstrapping one.
    pub fn session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Continue without authentication when no token can be obtained.
    pub fn allow_anonymous(mut self, allow: bool) -> Self {
        self.allow_anonymous = allow;
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the rate limit policy.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Set the TTL policy for a cache created by the builder.
    pub fn cache_policy(mut self, policy: TtlPolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    /// Use an existing cache instead of creating one.
    pub fn cache(mut self, cache: TtlCache<Value>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<LeetClient> {
        // Parse and normalize base URL
        let mut base_url = Url::parse(&self.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "base URL '{}' cannot carry a path",
                self.base_url
            )));
        }
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let graphql_url = match &self.graphql_url {
            Some(url) => Url::parse(url)?,
            None => base_url.join("graphql")?,
        };

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let sessions =
            SessionManager::new(base_url, user_agent, self.timeout, self.session_token)?;
        let limiter = RateLimiter::new(self.rate_limit)?;
        let cache = self
            .cache
            .unwrap_or_else(|| TtlCache::new(self.cache_policy));

        Ok(LeetClient {
            inner: Arc::new(ClientInner {
                graphql_url,
                sessions,
                limiter,
                cache,
                active: Mutex::new(None),
                allow_anonymous: self.allow_anonymous,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
