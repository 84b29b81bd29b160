//! Per-user queries.

use leetlens_cache::category;
use serde_json::Value;

use crate::client::LeetClient;
use crate::error::{Error, Result};
use crate::queries::Query;

/// Users API client.
pub struct UsersApi {
    client: LeetClient,
}

impl UsersApi {
    pub(crate) fn new(client: LeetClient) -> Self {
        Self { client }
    }

    /// Profile, contest summary and solved counts in one request.
    pub async fn complete_data(&self, username: &str) -> Result<Value> {
        let username = check_username(username)?;
        self.run(Query::user_complete_data(username), username, category::PROFILE)
            .await
    }

    /// Profile, badges and recent submissions.
    pub async fn profile(&self, username: &str) -> Result<Value> {
        let username = check_username(username)?;
        self.run(Query::user_profile(username), username, category::PROFILE)
            .await
    }

    /// Contest rating and history.
    pub async fn contest_ranking(&self, username: &str) -> Result<Value> {
        let username = check_username(username)?;
        self.run(Query::contest_ranking(username), username, category::CONTEST)
            .await
    }

    /// Solved counts per topic tag.
    pub async fn skill_stats(&self, username: &str) -> Result<Value> {
        let username = check_username(username)?;
        self.run(Query::skill_stats(username), username, category::PROFILE)
            .await
    }

    /// Submission calendar for `year`.
    pub async fn calendar(&self, username: &str, year: i32) -> Result<Value> {
        let username = check_username(username)?;
        self.run(
            Query::profile_calendar(username, year),
            &format!("{}:{}", username, year),
            category::PROFILE,
        )
        .await
    }

    /// Accepted, failed and untouched question counts.
    pub async fn question_progress(&self, username: &str) -> Result<Value> {
        let username = check_username(username)?;
        self.run(Query::question_progress(username), username, category::PROFILE)
            .await
    }

    /// Submission stats and beats percentages.
    pub async fn submissions(&self, username: &str) -> Result<Value> {
        let username = check_username(username)?;
        self.run(
            Query::submission_details(username),
            username,
            category::SUBMISSIONS,
        )
        .await
    }

    /// Per-difficulty totals and progress.
    pub async fn difficulty_stats(&self, username: &str) -> Result<Value> {
        let username = check_username(username)?;
        self.run(
            Query::difficulty_stats(username),
            username,
            category::SUBMISSIONS,
        )
        .await
    }

    async fn run(&self, query: Query, arg: &str, category: &str) -> Result<Value> {
        let key = format!("{}:{}", query.name(), arg);
        Ok(self.client.fetch(&query, &key, category).await?.into_data())
    }
}

fn check_username(username: &str) -> Result<&str> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::InvalidArgument(
            "username must not be empty".to_string(),
        ));
    }
    Ok(username)
}
