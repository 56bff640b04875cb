//! Subcommand implementations
//!
//! Each command returns its rendered output so `main` only has to print it.

use anyhow::Context;
use chrono::Local;
use goaltrack_model::{Goal, Todo, UserProfile};
use goaltrack_progress::{aggregate, overall, OverallProgress, ProgressMap};
use goaltrack_store::{MemoryStore, StaticIdentity};
use goaltrack_sync::{DailyLogDraft, MutationReport, SyncClient, SyncConfig};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

/// Goals and todos as exported from the document store
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Fixture {
    #[serde(default)]
    pub(crate) goals: Vec<Goal>,
    #[serde(default)]
    pub(crate) todos: Vec<Todo>,
}

#[derive(Serialize)]
struct AggregateOutput<'a> {
    goals: &'a ProgressMap,
    overall: OverallProgress,
}

/// `goaltrack aggregate`
pub(crate) fn aggregate_file(input: &Path, json: bool) -> anyhow::Result<String> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read fixture {}", input.display()))?;
    let fixture: Fixture = serde_json::from_str(&raw)
        .with_context(|| format!("invalid fixture {}", input.display()))?;
    tracing::info!(
        goals = fixture.goals.len(),
        todos = fixture.todos.len(),
        "aggregating fixture"
    );

    let progress = aggregate(&fixture.goals, &fixture.todos);
    if json {
        let output = AggregateOutput {
            goals: &progress,
            overall: overall(&progress),
        };
        return serde_json::to_string_pretty(&output).context("failed to encode progress");
    }
    Ok(render_progress(&fixture.goals, &progress))
}

fn render_progress(goals: &[Goal], progress: &ProgressMap) -> String {
    let mut out = String::new();
    for goal in goals {
        let Some(p) = progress.get(&goal.id) else {
            continue;
        };
        let _ = writeln!(out, "{:<32} {:>3}/{:<3} {:>3}%", goal.title, p.done, p.total, p.percent);
    }
    let summary = overall(progress);
    let _ = writeln!(
        out,
        "{} goals, {} complete, {}% of linked todos done",
        summary.goals, summary.completed_goals, summary.todos.percent
    );
    out
}

fn status_line<T, C>(out: &mut String, report: &MutationReport<T, C>) {
    match report.outcome.error() {
        None => {
            let _ = writeln!(out, "ok      {}", report.action);
        }
        Some(error) => {
            let _ = writeln!(out, "failed  {} ({error})", report.action);
        }
    }
}

/// `goaltrack demo`
///
/// Scripted session against an in-memory store. With `fail_writes` the
/// store goes offline after the goal and its todos are created, so the
/// later mutations roll back.
pub(crate) async fn demo(config: SyncConfig, fail_writes: bool) -> anyhow::Result<String> {
    let store = Arc::new(MemoryStore::new());
    let identity = Arc::new(StaticIdentity::signed_in(
        UserProfile::new("demo-user").with_display_name("Demo"),
    ));
    let client = SyncClient::new(store.clone(), identity).with_config(config);
    client.refresh_all(None).await.context("initial load failed")?;

    let mut out = String::new();

    let report = client.add_goal("Run a half marathon").await?;
    status_line(&mut out, &report);
    let goal_id = report.outcome.committed().cloned();

    let titles = ["Buy running shoes", "Run 5k", "Run 10k", "Run 15k"];
    let report = client.add_todos_bulk(titles.as_slice(), goal_id.as_ref()).await?;
    status_line(&mut out, &report);
    let todo_ids = report.outcome.committed().cloned().unwrap_or_default();

    if fail_writes {
        tracing::info!("taking store writes offline");
        store.set_writes_offline(true);
    }

    if let Some(first) = todo_ids.first() {
        let report = client.toggle_todo(first).await?;
        status_line(&mut out, &report);
    }

    let report = client.add_activity("Running").await?;
    status_line(&mut out, &report);
    if let Some(activity_id) = report.outcome.committed().cloned() {
        let draft = DailyLogDraft::new(activity_id, Local::now().date_naive(), 42.5)
            .with_notes("easy pace");
        let report = client.add_daily_log(draft).await?;
        status_line(&mut out, &report);
    }

    out.push('\n');
    out.push_str(&render_progress(&client.goals(), &client.progress()));
    for total in client.activity_totals() {
        let _ = writeln!(
            out,
            "{:<32} {:>4} min over {} entries",
            total.activity_name, total.minutes, total.entries
        );
    }
    Ok(out)
}
