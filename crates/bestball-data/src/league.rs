// League snapshot on disk, served as a `LeagueFeed`.
//
// Layout of the snapshot directory:
//   league.json    {"current_week": 5, "teams": ["...", ...]}
//   week_<n>.json  {"box_scores": [...], "free_agents": [...]}
//
// Players carry `eligible_slots` as platform labels ("RB", "WR/TE", "FLEX",
// "BE", ...). Only labels that name a position survive; roster-slot labels
// are dropped.
//
// The team list in league.json is the league-default waiver order. A caller
// may substitute its own order with `with_team_order`.

use std::path::{Path, PathBuf};

use bestball_core::schedule::{BoxScore, LeagueFeed};
use bestball_core::{BoxPlayer, Position};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Raw JSON shapes (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LeagueMeta {
    current_week: u32,
    teams: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawWeek {
    #[serde(default)]
    box_scores: Vec<RawBoxScore>,
    #[serde(default)]
    free_agents: Vec<RawPlayer>,
}

#[derive(Debug, Deserialize)]
struct RawBoxScore {
    #[serde(default)]
    home_team: Option<String>,
    #[serde(default)]
    away_team: Option<String>,
    #[serde(default)]
    home_lineup: Vec<RawPlayer>,
    #[serde(default)]
    away_lineup: Vec<RawPlayer>,
}

#[derive(Debug, Deserialize)]
struct RawPlayer {
    name: String,
    #[serde(default)]
    eligible_slots: Vec<String>,
    #[serde(default)]
    points: f64,
    #[serde(default)]
    projected_points: f64,
}

impl RawPlayer {
    fn into_box_player(self) -> BoxPlayer {
        let mut eligible: Vec<Position> = Vec::new();
        for label in &self.eligible_slots {
            match Position::from_str_pos(label) {
                Some(pos) if !eligible.contains(&pos) => eligible.push(pos),
                Some(_) => {}
                None => debug!("{}: ignoring slot label '{}'", self.name, label),
            }
        }
        BoxPlayer {
            name: self.name,
            eligible,
            points: self.points,
            projected_points: self.projected_points,
        }
    }
}

fn convert(players: Vec<RawPlayer>) -> Vec<BoxPlayer> {
    players.into_iter().map(RawPlayer::into_box_player).collect()
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

/// A league snapshot read from a directory of JSON files.
#[derive(Debug, Clone)]
pub struct JsonLeagueFeed {
    dir: PathBuf,
    team_order: Option<Vec<String>>,
}

impl JsonLeagueFeed {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            team_order: None,
        }
    }

    /// Serve `teams` as the league-default order instead of the snapshot's
    /// list.
    pub fn with_team_order(mut self, teams: Vec<String>) -> Self {
        self.team_order = Some(teams);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn week_path(&self, week: u32) -> PathBuf {
        self.dir.join(format!("week_{week}.json"))
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        serde_json::from_str(&text).map_err(|source| LoadError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    fn meta(&self) -> Result<LeagueMeta, LoadError> {
        Self::read_json(&self.dir.join("league.json"))
    }

    fn week(&self, week: u32) -> Result<RawWeek, LoadError> {
        Self::read_json(&self.week_path(week))
    }
}

impl LeagueFeed for JsonLeagueFeed {
    type Error = LoadError;

    fn current_week(&self) -> Result<u32, LoadError> {
        Ok(self.meta()?.current_week)
    }

    fn teams(&self) -> Result<Vec<String>, LoadError> {
        match &self.team_order {
            Some(teams) => Ok(teams.clone()),
            None => Ok(self.meta()?.teams),
        }
    }

    fn box_scores(&self, week: u32) -> Result<Vec<BoxScore>, LoadError> {
        let raw = self.week(week)?;
        Ok(raw
            .box_scores
            .into_iter()
            .map(|b| BoxScore {
                home_team: b.home_team,
                away_team: b.away_team,
                home_lineup: convert(b.home_lineup),
                away_lineup: convert(b.away_lineup),
            })
            .collect())
    }

    fn free_agents(&self, week: u32) -> Result<Vec<BoxPlayer>, LoadError> {
        Ok(convert(self.week(week)?.free_agents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bestball-league-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn reads_meta_and_week_files() {
        let dir = snapshot_dir("meta");
        std::fs::write(
            dir.join("league.json"),
            r#"{"current_week": 3, "teams": ["Alpha", "Beta", "Gamma"]}"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("week_1.json"),
            r#"{
                "box_scores": [
                    {"home_team": "Alpha", "away_team": "Beta",
                     "home_lineup": [{"name": "Josh Allen", "eligible_slots": ["QB", "OP", "BE"], "points": 24.5, "projected_points": 22.0}],
                     "away_lineup": []},
                    {"home_team": "Gamma", "away_team": null}
                ],
                "free_agents": [{"name": "Sam LaPorta", "eligible_slots": ["TE", "RB/WR/TE", "FLEX"], "points": 9.1, "projected_points": 8.0}]
            }"#,
        )
        .unwrap();

        let feed = JsonLeagueFeed::new(&dir);
        assert_eq!(feed.current_week().unwrap(), 3);
        assert_eq!(feed.teams().unwrap(), vec!["Alpha", "Beta", "Gamma"]);

        let scores = feed.box_scores(1).unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].home_lineup[0].eligible, vec![Position::Quarterback]);
        assert!((scores[0].home_lineup[0].points - 24.5).abs() < f64::EPSILON);
        assert_eq!(scores[1].away_team, None);
        assert_eq!(scores[1].sides().count(), 1);

        let agents = feed.free_agents(1).unwrap();
        assert_eq!(agents[0].eligible, vec![Position::TightEnd]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn team_order_override_replaces_snapshot_list() {
        let dir = snapshot_dir("order");
        std::fs::write(
            dir.join("league.json"),
            r#"{"current_week": 2, "teams": ["Alpha", "Beta", "Gamma"]}"#,
        )
        .unwrap();

        let feed = JsonLeagueFeed::new(&dir)
            .with_team_order(vec!["Gamma".into(), "Alpha".into(), "Beta".into()]);
        assert_eq!(feed.teams().unwrap(), vec!["Gamma", "Alpha", "Beta"]);
        assert_eq!(feed.current_week().unwrap(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_week_file_is_io_error() {
        let dir = snapshot_dir("missing");
        let feed = JsonLeagueFeed::new(&dir);
        assert!(matches!(feed.box_scores(7), Err(LoadError::Io { .. })));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn malformed_meta_is_json_error() {
        let dir = snapshot_dir("malformed");
        std::fs::write(dir.join("league.json"), "{\"teams\": [").unwrap();
        let feed = JsonLeagueFeed::new(&dir);
        assert!(matches!(feed.current_week(), Err(LoadError::Json { .. })));
        std::fs::remove_dir_all(&dir).ok();
    }
}
