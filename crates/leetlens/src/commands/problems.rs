//! Problems command - browse the problem set.

use anyhow::Result;
use clap::{Args, ValueEnum};
use console::Style;
use leetlens_client::{LeetClient, ProblemFilters};
use serde_json::Value;

use super::Context;
use super::profile::text;

/// Arguments for the problems command.
#[derive(Args, Debug)]
pub struct ProblemsArgs {
    /// Category slug (e.g. algorithms, database); empty for all
    #[arg(long, default_value = "")]
    pub category: String,

    /// Maximum number of problems
    #[arg(long, default_value_t = 20)]
    pub limit: u32,

    /// Filter by difficulty
    #[arg(long, value_enum)]
    pub difficulty: Option<Difficulty>,

    /// Filter by your status
    #[arg(long, value_enum)]
    pub status: Option<Status>,

    /// Filter by topic tag slug (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Status {
    /// Accepted
    Solved,
    /// Attempted but not accepted
    Attempted,
    /// Never submitted
    Todo,
}

impl ProblemsArgs {
    fn filters(&self) -> ProblemFilters {
        ProblemFilters {
            difficulty: self.difficulty.map(|d| {
                match d {
                    Difficulty::Easy => "EASY",
                    Difficulty::Medium => "MEDIUM",
                    Difficulty::Hard => "HARD",
                }
                .to_string()
            }),
            status: self.status.map(|s| {
                match s {
                    Status::Solved => "AC",
                    Status::Attempted => "TRIED",
                    Status::Todo => "NOT_STARTED",
                }
                .to_string()
            }),
            tags: (!self.tags.is_empty()).then(|| self.tags.clone()),
            list_id: None,
        }
    }
}

/// Run the problems command.
pub async fn run(args: ProblemsArgs, ctx: &Context) -> Result<()> {
    let app = ctx.start_app()?;
    let result = list(app.client(), &args, ctx).await;
    app.shutdown().await;
    result
}

async fn list(client: &LeetClient, args: &ProblemsArgs, ctx: &Context) -> Result<()> {
    let data = client
        .problems()
        .list(&args.category, args.limit, &args.filters())
        .await?;

    if ctx.json_output {
        return ctx.print_json(&data);
    }

    let page = &data["problemsetQuestionList"];
    let dim = Style::new().dim();
    let questions = page["questions"].as_array().map(Vec::as_slice).unwrap_or(&[]);

    println!();
    for question in questions {
        println!(
            "  {:>5}  {:<50} {:<7} {}",
            text(&question["questionFrontendId"]),
            text(&question["title"]),
            text(&question["difficulty"]),
            dim.apply_to(acceptance(&question["acRate"])),
        );
    }
    println!();
    println!(
        "  {}",
        dim.apply_to(format!("{} of {} problems", questions.len(), text(&page["total"])))
    );
    println!();
    Ok(())
}

fn acceptance(rate: &Value) -> String {
    rate.as_f64()
        .map(|r| format!("{:.1}%", r))
        .unwrap_or_else(|| "-".to_string())
}
