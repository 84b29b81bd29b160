//! TTL policy for cached data categories.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{Error, Result};

/// Well-known data categories.
pub mod category {
    /// User profile data and batched profile queries.
    pub const PROFILE: &str = "profile";
    /// Contest ranking and history.
    pub const CONTEST: &str = "contest";
    /// Submission statistics.
    pub const SUBMISSIONS: &str = "submissions";
    /// Problem set listings.
    pub const PROBLEMS: &str = "problems";
    /// Anything without a dedicated category.
    pub const DEFAULT: &str = "default";
}

/// TTL applied to data without a dedicated category (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Longest TTL the cache accepts (one year).
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Mapping from data category to time-to-live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlPolicy {
    /// TTL for uncategorized data.
    default_ttl: Duration,

    /// Per-category overrides.
    categories: BTreeMap<String, Duration>,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        let categories = [
            (category::PROFILE, Duration::from_secs(3600)),
            (category::CONTEST, Duration::from_secs(1800)),
            (category::SUBMISSIONS, Duration::from_secs(300)),
            (category::PROBLEMS, Duration::from_secs(3600)),
        ]
        .into_iter()
        .map(|(name, ttl)| (name.to_string(), ttl))
        .collect();

        Self {
            default_ttl: DEFAULT_TTL,
            categories,
        }
    }
}

impl TtlPolicy {
    /// Create a policy with only a default TTL and no categories.
    pub fn empty(default_ttl: Duration) -> Result<Self> {
        check_ttl(category::DEFAULT, default_ttl)?;
        Ok(Self {
            default_ttl,
            categories: BTreeMap::new(),
        })
    }

    /// Set the TTL for a category, builder style.
    pub fn with_ttl(mut self, category: impl Into<String>, ttl: Duration) -> Result<Self> {
        self.set(category, ttl)?;
        Ok(self)
    }

    /// Set the TTL for a category.
    ///
    /// The name `"default"` updates the fallback TTL.
    pub fn set(&mut self, category: impl Into<String>, ttl: Duration) -> Result<()> {
        let category = category.into();
        check_ttl(&category, ttl)?;
        if category == category::DEFAULT {
            self.default_ttl = ttl;
        } else {
            self.categories.insert(category, ttl);
        }
        Ok(())
    }

    /// TTL for a category, falling back to the default.
    pub fn ttl_for(&self, category: &str) -> Duration {
        self.categories
            .get(category)
            .copied()
            .unwrap_or(self.default_ttl)
    }

    /// The fallback TTL.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Snapshot of the policy in whole seconds, including `"default"`.
    pub fn to_secs(&self) -> BTreeMap<String, u64> {
        let mut out: BTreeMap<String, u64> = self
            .categories
            .iter()
            .map(|(name, ttl)| (name.clone(), ttl.as_secs()))
            .collect();
        out.insert(category::DEFAULT.to_string(), self.default_ttl.as_secs());
        out
    }
}

pub(crate) fn check_ttl(label: &str, ttl: Duration) -> Result<()> {
    if ttl.is_zero() {
        return Err(Error::InvalidArgument(format!(
            "TTL for '{}' must be positive",
            label
        )));
    }
    if ttl > MAX_TTL {
        return Err(Error::InvalidArgument(format!(
            "TTL for '{}' must be at most {}s, got {}s",
            label,
            MAX_TTL.as_secs(),
            ttl.as_secs()
        )));
    }
    Ok(())
}
