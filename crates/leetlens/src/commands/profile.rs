//! Profile command - one-screen summary of a user.

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use leetlens_client::LeetClient;
use serde_json::Value;

use super::Context;

/// Arguments for the profile command.
#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// LeetCode username
    pub username: String,
}

/// Run the profile command.
pub async fn run(args: ProfileArgs, ctx: &Context) -> Result<()> {
    let app = ctx.start_app()?;
    let result = show(app.client(), &args.username, ctx).await;
    app.shutdown().await;
    result
}

async fn show(client: &LeetClient, username: &str, ctx: &Context) -> Result<()> {
    let data = client.users().complete_data(username).await?;

    if ctx.json_output {
        return ctx.print_json(&data);
    }

    let user = &data["matchedUser"];
    if user.is_null() {
        anyhow::bail!("User '{}' not found", username);
    }

    let dim = Style::new().dim();
    println!();
    println!("{}", style(text(&user["username"])).bold());
    println!("{}", dim.apply_to("─".repeat(40)));

    let profile = &user["profile"];
    field(&dim, "Name", text(&profile["realName"]));
    field(&dim, "Ranking", text(&profile["ranking"]));
    field(&dim, "Country", text(&profile["countryName"]));

    println!();
    let totals = &data["allQuestionsCount"];
    if let Some(solved) = user["submitStats"]["acSubmissionNum"].as_array() {
        for entry in solved {
            let difficulty = text(&entry["difficulty"]);
            let total = find_count(totals, &difficulty);
            field(
                &dim,
                &difficulty,
                format!("{} / {}", text(&entry["count"]), total),
            );
        }
    }

    let contest = &data["userContestRanking"];
    if !contest.is_null() {
        println!();
        field(&dim, "Contest rating", format!("{:.0}", contest["rating"].as_f64().unwrap_or(0.0)));
        field(&dim, "Contests", text(&contest["attendedContestsCount"]));
        field(&dim, "Top", format!("{}%", text(&contest["topPercentage"])));
    }

    if ctx.verbose {
        println!();
        let stats = client.cache().stats();
        println!("  {} {} cached", dim.apply_to("Cache:"), stats.active);
    }
    println!();
    Ok(())
}

fn field(dim: &Style, label: &str, value: impl std::fmt::Display) {
    println!("  {:<16} {}", dim.apply_to(format!("{}:", label)), value);
}

/// Display form of a scalar, `-` when absent.
pub(crate) fn text(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) if s.is_empty() => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn find_count(totals: &Value, difficulty: &str) -> String {
    totals
        .as_array()
        .and_then(|all| all.iter().find(|e| e["difficulty"] == difficulty))
        .map(|e| text(&e["count"]))
        .unwrap_or_else(|| "-".to_string())
}
