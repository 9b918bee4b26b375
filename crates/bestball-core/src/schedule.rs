// Week-by-week best-ball scoring with waiver-order free-agent priority.
//
// Each week, teams are processed worst-first: the team with the lowest
// cumulative score so far gets first claim on the shared free-agent pool.
// Because claims depend on processing order, and order depends on scores
// computed earlier in the same run, the weeks must be processed in sequence.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::lineup::{self, EligibilityDiagnostic, FreeAgentPool, LineupError};
use crate::player::BoxPlayer;
use crate::table::{ScoreTable, TableError};

// ---------------------------------------------------------------------------
// Feed abstraction
// ---------------------------------------------------------------------------

/// One matchup. A missing team (bye slot) is `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoxScore {
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    #[serde(default)]
    pub home_lineup: Vec<BoxPlayer>,
    #[serde(default)]
    pub away_lineup: Vec<BoxPlayer>,
}

impl BoxScore {
    /// The (team, lineup) pairs present in this matchup.
    pub fn sides(&self) -> impl Iterator<Item = (&str, &[BoxPlayer])> {
        let home = self
            .home_team
            .as_deref()
            .map(|t| (t, self.home_lineup.as_slice()));
        let away = self
            .away_team
            .as_deref()
            .map(|t| (t, self.away_lineup.as_slice()));
        home.into_iter().chain(away)
    }
}

/// Source of league box scores and free agents.
pub trait LeagueFeed {
    type Error: std::error::Error + Send + Sync + 'static;

    /// The week in progress. Weeks `1..current_week` are complete.
    fn current_week(&self) -> Result<u32, Self::Error>;

    /// League-default team order, used as the waiver order for week 1.
    fn teams(&self) -> Result<Vec<String>, Self::Error>;

    fn box_scores(&self, week: u32) -> Result<Vec<BoxScore>, Self::Error>;

    fn free_agents(&self, week: u32) -> Result<Vec<BoxPlayer>, Self::Error>;
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("league feed failed: {0}")]
    Feed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("week {week}, team `{team}`: {source}")]
    Lineup {
        week: u32,
        team: String,
        source: LineupError,
    },

    #[error("week {week}: team `{team}` is not in the league team list")]
    UnknownTeam { week: u32, team: String },

    #[error("week {week}: team `{team}` appears in more than one box score")]
    DuplicateTeam { week: u32, team: String },

    #[error("league team list contains `{0}` more than once")]
    DuplicateLeagueTeam(String),

    #[error(transparent)]
    Table(#[from] TableError),
}

fn feed_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> ScheduleError {
    ScheduleError::Feed(Box::new(e))
}

// ---------------------------------------------------------------------------
// Waiver order
// ---------------------------------------------------------------------------

/// Free-agent claim priority. Contains each team exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct WaiverOrder {
    /// League-default order; the tie-break for equal cumulative scores.
    league_order: Vec<String>,
    current: Vec<String>,
}

impl WaiverOrder {
    pub fn new(teams: Vec<String>) -> Result<Self, ScheduleError> {
        for (i, team) in teams.iter().enumerate() {
            if teams[..i].contains(team) {
                return Err(ScheduleError::DuplicateLeagueTeam(team.clone()));
            }
        }
        Ok(Self {
            league_order: teams.clone(),
            current: teams,
        })
    }

    pub fn current(&self) -> &[String] {
        &self.current
    }

    pub fn contains(&self, team: &str) -> bool {
        self.league_order.iter().any(|t| t == team)
    }

    /// Re-derive the order ascending by cumulative score, breaking ties by
    /// league-default order.
    pub fn reorder(&mut self, table: &ScoreTable) {
        let mut order: Vec<(usize, f64)> = self
            .league_order
            .iter()
            .enumerate()
            .map(|(i, team)| (i, table.cumulative(team)))
            .collect();
        order.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        self.current = order
            .into_iter()
            .map(|(i, _)| self.league_order[i].clone())
            .collect();
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Everything a full scoring run produced.
#[derive(Debug, Clone, Default)]
pub struct ScheduleReport {
    pub table: ScoreTable,
    /// Waiver order used to process each week, indexed by `week - 1`.
    pub orders: Vec<Vec<String>>,
    pub diagnostics: Vec<(u32, String, EligibilityDiagnostic)>,
}

impl ScheduleReport {
    pub fn order_for_week(&self, week: u32) -> Option<&[String]> {
        let idx = usize::try_from(week).ok()?.checked_sub(1)?;
        self.orders.get(idx).map(|o| o.as_slice())
    }
}

/// Score every completed week of the league.
pub fn run<F: LeagueFeed>(feed: &F) -> Result<ScheduleReport, ScheduleError> {
    let current_week = feed.current_week().map_err(feed_err)?;
    let mut order = WaiverOrder::new(feed.teams().map_err(feed_err)?)?;
    let mut report = ScheduleReport::default();

    info!(
        "Scoring weeks 1..{} for {} teams",
        current_week,
        order.current().len()
    );

    for week in 1..current_week {
        let box_scores = feed.box_scores(week).map_err(feed_err)?;
        let mut pool = FreeAgentPool::from_feed(feed.free_agents(week).map_err(feed_err)?);
        debug!(week, free_agents = pool.len(), "week start");

        let mut lineups: HashMap<&str, &[BoxPlayer]> = HashMap::new();
        for score in &box_scores {
            for (team, players) in score.sides() {
                if !order.contains(team) {
                    return Err(ScheduleError::UnknownTeam {
                        week,
                        team: team.to_string(),
                    });
                }
                if lineups.insert(team, players).is_some() {
                    return Err(ScheduleError::DuplicateTeam {
                        week,
                        team: team.to_string(),
                    });
                }
            }
        }

        report.orders.push(order.current().to_vec());

        for team in order.current() {
            let Some(players) = lineups.get(team.as_str()) else {
                warn!("week {}: no box score for team `{}`", week, team);
                continue;
            };
            let selection = lineup::select(players).map_err(|source| ScheduleError::Lineup {
                week,
                team: team.clone(),
                source,
            })?;
            report.diagnostics.extend(
                selection
                    .diagnostics
                    .into_iter()
                    .map(|d| (week, team.clone(), d)),
            );
            let lineup = lineup::backfill(selection.lineup, &mut pool);
            let total = lineup.total_points();
            debug!(week, team = %team, total, "ideal lineup scored");
            report.table.insert(week, team, total)?;
        }

        order.reorder(&report.table);
    }

    Ok(report)
}
