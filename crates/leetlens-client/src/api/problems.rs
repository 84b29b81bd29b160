//! Problem set queries.

use leetlens_cache::category;
use serde_json::Value;

use crate::client::LeetClient;
use crate::error::{Error, Result};
use crate::queries::{ProblemFilters, Query};

/// Problems API client.
pub struct ProblemsApi {
    client: LeetClient,
}

impl ProblemsApi {
    pub(crate) fn new(client: LeetClient) -> Self {
        Self { client }
    }

    /// First `limit` problems of a category matching `filters`.
    ///
    /// An empty `category_slug` lists every category.
    pub async fn list(
        &self,
        category_slug: &str,
        limit: u32,
        filters: &ProblemFilters,
    ) -> Result<Value> {
        if limit == 0 {
            return Err(Error::InvalidArgument(
                "limit must be at least 1".to_string(),
            ));
        }

        let query = Query::problems_list(category_slug, limit, filters);
        let key = format!(
            "{}:{}:{}:{}",
            query.name(),
            category_slug,
            limit,
            filters.cache_fragment()
        );
        Ok(self
            .client
            .fetch(&query, &key, category::PROBLEMS)
            .await?
            .into_data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_limit_rejected() {
        let client = LeetClient::builder().build().unwrap();
        let err = client
            .problems()
            .list("", 0, &ProblemFilters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
