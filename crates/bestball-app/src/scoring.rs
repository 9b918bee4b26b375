// Weekly ideal-lineup scores for the whole league.

use std::path::{Path, PathBuf};

use anyhow::Context;
use bestball_core::schedule::{self, LeagueFeed, ScheduleReport};
use bestball_data::league::JsonLeagueFeed;
use bestball_data::scores::write_scores;
use tracing::{info, warn};

use crate::config::Config;

/// Score every completed week from `feed`.
pub fn score_league<F: LeagueFeed>(feed: &F) -> anyhow::Result<ScheduleReport> {
    let report = schedule::run(feed).context("failed to score league")?;
    for (week, team, diagnostic) in &report.diagnostics {
        warn!("week {} ({}): {}", week, team, diagnostic);
    }
    Ok(report)
}

/// Score the configured league snapshot and write the table to `output`
/// (or the configured scores path). Returns the path written.
///
/// A non-empty `league.teams` replaces the snapshot's week-1 waiver order.
pub fn run(config: &Config, output: Option<&Path>) -> anyhow::Result<PathBuf> {
    let snapshot = config.resolve(&config.paths.league_snapshot);
    let mut feed = JsonLeagueFeed::new(&snapshot);
    info!("Reading league snapshot from {}", snapshot.display());
    if !config.league.teams.is_empty() {
        info!("Using configured team order: {}", config.league.teams.join(", "));
        feed = feed.with_team_order(config.league.teams.clone());
    }

    let report = score_league(&feed)?;
    if report.table.is_empty() {
        warn!("no completed weeks in the snapshot");
    }

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.resolve(&config.paths.scores_output));
    write_scores(&output, &report.table)
        .with_context(|| format!("failed to write scores to {}", output.display()))?;
    info!(
        "Wrote {} weeks for {} teams to {}",
        report.table.weeks().len(),
        report.table.teams().len(),
        output.display()
    );
    Ok(output)
}
