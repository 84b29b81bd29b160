//! Rate-limited, caching GraphQL client for LeetCode profile data.
//!
//! Every request goes through three gates, in order:
//!
//! 1. the response cache, keyed by the caller,
//! 2. a sliding-window rate limiter shared by all clones of the client,
//! 3. a network session carrying the `LEETCODE_SESSION` cookie.
//!
//! # Example
//!
//! ```no_run
//! use leetlens_client::{LeetClient, ProblemFilters, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = LeetClient::builder()
//!     .session_token("cookie-value")
//!     .build()?;
//!
//! // One session for a group of calls
//! let scope = client.scope().await?;
//! let profile = client.users().complete_data("alice").await?;
//! println!("{}", profile["matchedUser"]["profile"]["ranking"]);
//!
//! let problems = client
//!     .problems()
//!     .list("algorithms", 20, &ProblemFilters::default())
//!     .await?;
//! println!("{}", problems["problemsetQuestionList"]["total"]);
//! scope.close();
//!
//! // Repeated reads are served from the cache
//! let again = client.users().complete_data("alice").await?;
//! assert_eq!(profile, again);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod queries;
pub mod ratelimit;
pub mod session;
pub mod types;

pub use api::{ProblemsApi, UsersApi};
pub use client::{ClientBuilder, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, LeetClient, SessionScope};
pub use error::{Error, Result};
pub use queries::{ProblemFilters, Query};
pub use ratelimit::{RateLimitConfig, RateLimiter};
pub use session::{SESSION_COOKIE, Session, SessionManager};
pub use types::{GraphQlError, GraphQlRequest, ParsedResult};

// Re-export the cache so callers need not depend on it directly
pub use leetlens_cache::{CacheStats, TtlCache, TtlPolicy, category};
