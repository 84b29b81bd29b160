//! Session credential and network session lifecycle.
//!
//! A [`Session`] is a dedicated HTTP client carrying the headers the remote
//! site requires, including the `LEETCODE_SESSION` cookie. Sessions are
//! scoped resources: they are released when dropped, so every exit path
//! (return, error, cancellation) gives the connection pool back.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::header::{
    ACCEPT, CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue, ORIGIN, SET_COOKIE,
};
use tokio::sync::RwLock;
use url::Url;

use crate::error::{Error, Result};

/// Name of the session cookie issued by the remote site.
pub const SESSION_COOKIE: &str = "LEETCODE_SESSION";

/// Owns the auth token and opens network sessions.
pub struct SessionManager {
    /// Plain client used for the bootstrap request.
    http: reqwest::Client,
    /// Landing page; also the origin for `Origin`/`Referer`.
    base_url: Url,
    user_agent: String,
    timeout: Duration,
    token: RwLock<Option<String>>,
    /// Sessions currently alive.
    open: Arc<AtomicUsize>,
    /// Sessions opened since construction; doubles as the id source.
    opened: AtomicU64,
}

impl SessionManager {
    /// Create a manager. `token` is used as-is when supplied.
    pub fn new(
        base_url: Url,
        user_agent: impl Into<String>,
        timeout: Duration,
        token: Option<String>,
    ) -> Result<Self> {
        let user_agent = user_agent.into();
        let token = token.filter(|t| !t.is_empty());
        if let Some(token) = &token {
            cookie_header(token)?;
        }
        origin_header(&base_url)?;

        let http = reqwest::Client::builder()
            .user_agent(user_agent.clone())
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            user_agent,
            timeout,
            token: RwLock::new(token),
            open: Arc::new(AtomicUsize::new(0)),
            opened: AtomicU64::new(0),
        })
    }

    /// Landing page URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `scheme://host[:port]` of the remote site.
    pub fn origin(&self) -> String {
        self.base_url.origin().ascii_serialization()
    }

    /// Number of sessions currently open.
    pub fn open_sessions(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Number of sessions opened since construction.
    pub fn total_opened(&self) -> u64 {
        self.opened.load(Ordering::SeqCst)
    }

    /// Whether a token is available without a bootstrap request.
    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Supply a token out of band.
    ///
    /// A token that cannot be sent as a cookie is rejected.
    pub async fn set_token(&self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        cookie_header(&token)?;
        *self.token.write().await = Some(token);
        Ok(())
    }

    /// Forget the current token; the next `open` bootstraps again.
    pub async fn clear_token(&self) {
        *self.token.write().await = None;
    }

    /// Get the auth token, bootstrapping it from the landing page if needed.
    ///
    /// Bootstrap failures are surfaced once as [`Error::AuthUnavailable`].
    pub async fn token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }

        let mut slot = self.token.write().await;
        // Another caller may have bootstrapped while we waited for the lock
        if let Some(token) = slot.clone() {
            return Ok(token);
        }

        let token = self.bootstrap().await?;
        *slot = Some(token.clone());
        Ok(token)
    }

    async fn bootstrap(&self) -> Result<String> {
        tracing::debug!(url = %self.base_url, "Bootstrapping session token");

        let response = self
            .http
            .get(self.base_url.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Session bootstrap request failed");
                Error::AuthUnavailable(format!("bootstrap request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Session bootstrap rejected");
            return Err(Error::AuthUnavailable(format!(
                "bootstrap request returned HTTP {}",
                status.as_u16()
            )));
        }

        extract_session_cookie(response.headers()).ok_or_else(|| {
            Error::AuthUnavailable(format!(
                "bootstrap response did not set {}",
                SESSION_COOKIE
            ))
        })
    }

    /// Open an authenticated session.
    pub async fn open(&self) -> Result<Session> {
        let token = self.token().await?;
        self.build(Some(&token))
    }

    /// Open a session without a cookie.
    pub fn open_anonymous(&self) -> Result<Session> {
        self.build(None)
    }

    fn build(&self, token: Option<&str>) -> Result<Session> {
        let origin = origin_header(&self.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ORIGIN, origin);

        if let Some(token) = token {
            headers.insert(COOKIE, cookie_header(token)?);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(self.user_agent.clone())
            .timeout(self.timeout)
            .build()?;

        let id = self.opened.fetch_add(1, Ordering::SeqCst) + 1;
        self.open.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            session_id = id,
            authenticated = token.is_some(),
            "Session opened"
        );

        Ok(Session {
            id,
            http,
            authenticated: token.is_some(),
            open: Arc::clone(&self.open),
        })
    }

    /// Release a session. Equivalent to dropping it.
    pub fn close(&self, session: Session) {
        session.close();
    }
}

fn cookie_header(token: &str) -> Result<HeaderValue> {
    let mut cookie = HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, token))
        .map_err(|_| Error::Config("Invalid session token".to_string()))?;
    cookie.set_sensitive(true);
    Ok(cookie)
}

fn origin_header(base_url: &Url) -> Result<HeaderValue> {
    HeaderValue::from_str(&base_url.origin().ascii_serialization())
        .map_err(|_| Error::Config("base URL is not a valid origin".to_string()))
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("base_url", &self.base_url.as_str())
            .field("open_sessions", &self.open_sessions())
            .finish_non_exhaustive()
    }
}

/// An open network session.
pub struct Session {
    id: u64,
    http: reqwest::Client,
    authenticated: bool,
    open: Arc<AtomicUsize>,
}

impl Session {
    /// Session identifier, unique per manager.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the session carries the auth cookie.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// HTTP client bound to this session.
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Release the session.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!(session_id = self.id, "Session closed");
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("authenticated", &self.authenticated)
            .finish()
    }
}

/// Find the session cookie value among `Set-Cookie` headers.
fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case(SESSION_COOKIE))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
