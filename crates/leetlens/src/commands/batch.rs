//! Batch command - several profiles through one session.

use anyhow::Result;
use clap::Args;
use console::Style;
use futures::future::join_all;
use leetlens_client::{CacheStats, LeetClient};
use serde::Serialize;
use serde_json::Value;

use super::Context;
use super::profile::text;

/// Arguments for the batch command.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// LeetCode usernames
    #[arg(required = true)]
    pub usernames: Vec<String>,
}

/// Batch result for JSON output.
#[derive(Debug, Serialize)]
struct BatchOutput {
    users: Vec<UserOutcome>,
    cache: CacheStats,
}

#[derive(Debug, Serialize)]
struct UserOutcome {
    username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run the batch command.
pub async fn run(args: BatchArgs, ctx: &Context) -> Result<()> {
    let app = ctx.start_app()?;
    let result = fetch_all(app.client(), &args.usernames).await;
    app.shutdown().await;

    let output = result?;
    if ctx.json_output {
        return ctx.print_json(&output);
    }

    let dim = Style::new().dim();
    let red = Style::new().red();
    println!();
    for outcome in &output.users {
        match (&outcome.data, &outcome.error) {
            (Some(data), _) => println!(
                "  {:<20} ranking {}",
                outcome.username,
                text(&data["matchedUser"]["profile"]["ranking"])
            ),
            (None, Some(error)) => {
                println!("  {:<20} {}", outcome.username, red.apply_to(error))
            }
            (None, None) => {}
        }
    }
    println!();
    println!(
        "  {}",
        dim.apply_to(format!(
            "cache: {} active, {} expired, {} total",
            output.cache.active, output.cache.expired, output.cache.total
        ))
    );
    println!();
    Ok(())
}

/// Fetch every profile concurrently inside one session scope.
async fn fetch_all(client: &LeetClient, usernames: &[String]) -> Result<BatchOutput> {
    let scope = client.scope().await?;

    let calls = usernames.iter().map(|username| {
        let users = client.users();
        async move { (username, users.complete_data(username).await) }
    });
    let results = join_all(calls).await;
    scope.close();

    let users = results
        .into_iter()
        .map(|(username, result)| match result {
            Ok(data) => UserOutcome {
                username: username.clone(),
                data: Some(data),
                error: None,
            },
            Err(e) => {
                tracing::warn!(username = %username, error = %e, "Profile fetch failed");
                UserOutcome {
                    username: username.clone(),
                    data: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    Ok(BatchOutput {
        users,
        cache: client.cache().stats(),
    })
}
