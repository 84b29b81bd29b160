//! User command - raw per-user data.

use anyhow::Result;
use clap::{Args, ValueEnum};
use leetlens_client::LeetClient;
use serde_json::Value;

use super::Context;

/// Arguments for the user command.
#[derive(Args, Debug)]
pub struct UserArgs {
    /// Which data to fetch
    #[arg(value_enum)]
    pub kind: UserDataKind,

    /// LeetCode username
    pub username: String,

    /// Calendar year (required for calendar)
    #[arg(long)]
    pub year: Option<i32>,
}

/// Kinds of per-user data.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserDataKind {
    /// Profile, contest summary and solved counts
    Complete,
    /// Profile, badges and recent submissions
    Profile,
    /// Contest rating and history
    Contest,
    /// Solved counts per topic tag
    Skills,
    /// Submission calendar
    Calendar,
    /// Accepted, failed and untouched questions
    Progress,
    /// Submission stats and beats percentages
    Submissions,
    /// Per-difficulty totals and progress
    Difficulty,
}

/// Run the user command.
pub async fn run(args: UserArgs, ctx: &Context) -> Result<()> {
    let app = ctx.start_app()?;
    let result = fetch(app.client(), &args).await;
    app.shutdown().await;

    ctx.print_json(&result?)
}

async fn fetch(client: &LeetClient, args: &UserArgs) -> Result<Value> {
    let users = client.users();
    let username = args.username.as_str();

    let data = match args.kind {
        UserDataKind::Complete => users.complete_data(username).await?,
        UserDataKind::Profile => users.profile(username).await?,
        UserDataKind::Contest => users.contest_ranking(username).await?,
        UserDataKind::Skills => users.skill_stats(username).await?,
        UserDataKind::Calendar => {
            let year = args
                .year
                .ok_or_else(|| anyhow::anyhow!("calendar requires --year"))?;
            users.calendar(username, year).await?
        }
        UserDataKind::Progress => users.question_progress(username).await?,
        UserDataKind::Submissions => users.submissions(username).await?,
        UserDataKind::Difficulty => users.difficulty_stats(username).await?,
    };
    Ok(data)
}
