// Draft-order validation: check each submitted ranking against the saved
// reference page for the same team.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use bestball_core::compare::{Comparison, RankComparator};
use bestball_core::normalize::NameNormalizer;
use bestball_data::draft_order::load_draft_order;
use bestball_data::reference::load_reference;
use tracing::{info, warn};

use crate::config::Config;

/// Outcome of validating one team's draft order.
#[derive(Debug, Clone)]
pub struct TeamValidation {
    pub team: String,
    pub comparison: Comparison,
}

impl TeamValidation {
    pub fn is_clean(&self) -> bool {
        self.comparison.mismatches.is_empty() && !self.comparison.lengths_differ()
    }
}

/// File locations for one team's submitted and reference rankings.
pub fn team_files(config: &Config, team: &str) -> (PathBuf, PathBuf) {
    (
        config.resolve(&config.paths.draft_orders).join(format!("{team}.csv")),
        config.resolve(&config.paths.reference_pages).join(format!("{team}.html")),
    )
}

pub fn validate_team(
    config: &Config,
    comparator: &RankComparator,
    normalizer: &NameNormalizer,
    team: &str,
) -> anyhow::Result<TeamValidation> {
    let (csv_path, html_path) = team_files(config, team);
    let candidate = load_draft_order(&csv_path, normalizer)
        .with_context(|| format!("failed to load draft order for {team}"))?;
    let reference = load_reference(&html_path, normalizer)
        .with_context(|| format!("failed to load reference page for {team}"))?;

    let comparison = comparator.compare(&candidate, &reference);
    if comparison.lengths_differ() {
        warn!(
            "{}: submitted ranking has {} relevant players, reference has {}",
            team, comparison.candidate_len, comparison.reference_len
        );
    }
    info!("{}: {} mismatches", team, comparison.mismatches.len());

    Ok(TeamValidation {
        team: team.to_string(),
        comparison,
    })
}

/// Validate `teams`, or every configured draft-order team when empty.
pub fn run(config: &Config, teams: &[String]) -> anyhow::Result<Vec<TeamValidation>> {
    let teams = if teams.is_empty() {
        &config.league.draft_order_teams
    } else {
        teams
    };
    if teams.is_empty() {
        warn!("no draft-order teams configured; nothing to validate");
    }

    let comparator = RankComparator::new(config.league.num_teams);
    let normalizer = config.normalizer();
    teams
        .iter()
        .map(|team| validate_team(config, &comparator, &normalizer, team))
        .collect()
}

/// Mismatch table: index, submitted last name, position, reference name.
pub fn render(result: &TeamValidation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", result.team);
    if result.comparison.mismatches.is_empty() {
        let _ = writeln!(out, "no mismatches");
        return out;
    }
    let _ = writeln!(out, "{:>5}  {:<20} {:<4} {}", "index", "last_name", "pos", "reference_name");
    for m in &result.comparison.mismatches {
        let _ = writeln!(
            out,
            "{:>5}  {:<20} {:<4} {}",
            m.index,
            m.candidate.last_name,
            m.candidate.position.display_str(),
            m.reference.name_key()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bestball_core::compare::Mismatch;
    use bestball_core::{PlayerRecord, Position};

    #[test]
    fn render_lists_each_mismatch() {
        let result = TeamValidation {
            team: "Team 1".into(),
            comparison: Comparison {
                mismatches: vec![Mismatch {
                    index: 3,
                    candidate: PlayerRecord::from_name_key("john_smith", Position::WideReceiver, 4),
                    reference: PlayerRecord::from_name_key("jon_smyth", Position::WideReceiver, 4),
                }],
                candidate_len: 10,
                reference_len: 10,
            },
        };
        let text = render(&result);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "== Team 1 ==");
        assert!(lines[1].contains("reference_name"));
        assert!(lines[2].contains("smith"));
        assert!(lines[2].contains("WR"));
        assert!(lines[2].ends_with("jon_smyth"));
        assert!(!result.is_clean());
    }

    #[test]
    fn render_clean_result() {
        let result = TeamValidation {
            team: "Team 2".into(),
            comparison: Comparison::default(),
        };
        assert!(result.is_clean());
        assert!(render(&result).contains("no mismatches"));
    }
}
