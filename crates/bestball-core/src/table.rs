// Week x team score table.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("score for team `{team}` in week {week} already recorded")]
    Duplicate { week: u32, team: String },
}

/// One week's row of team scores, in the order teams were processed.
#[derive(Debug, Clone, Serialize)]
pub struct WeekRow {
    pub week: u32,
    pub scores: Vec<(String, f64)>,
}

impl WeekRow {
    pub fn score(&self, team: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|(t, _)| t == team)
            .map(|(_, s)| *s)
    }
}

/// Ideal-lineup totals keyed by week, then team.
///
/// Weeks keep insertion order; teams keep first-seen order across the whole
/// table so every row can be laid out under the same columns.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoreTable {
    teams: Vec<String>,
    weeks: Vec<WeekRow>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `team`'s total for `week`. A second score for the same cell is
    /// rejected.
    pub fn insert(&mut self, week: u32, team: &str, score: f64) -> Result<(), TableError> {
        let row = match self.weeks.iter().position(|r| r.week == week) {
            Some(idx) => &mut self.weeks[idx],
            None => {
                self.weeks.push(WeekRow {
                    week,
                    scores: Vec::new(),
                });
                let last = self.weeks.len() - 1;
                &mut self.weeks[last]
            }
        };

        if row.scores.iter().any(|(t, _)| t == team) {
            return Err(TableError::Duplicate {
                week,
                team: team.to_string(),
            });
        }
        row.scores.push((team.to_string(), score));

        if !self.teams.iter().any(|t| t == team) {
            self.teams.push(team.to_string());
        }
        Ok(())
    }

    pub fn get(&self, week: u32, team: &str) -> Option<f64> {
        self.weeks
            .iter()
            .find(|r| r.week == week)
            .and_then(|r| r.score(team))
    }

    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    pub fn weeks(&self) -> &[WeekRow] {
        &self.weeks
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Sum of a team's scores over every recorded week.
    pub fn cumulative(&self, team: &str) -> f64 {
        self.weeks.iter().filter_map(|r| r.score(team)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup() {
        let mut table = ScoreTable::new();
        table.insert(1, "Alpha", 101.5).unwrap();
        table.insert(1, "Bravo", 88.0).unwrap();
        table.insert(2, "Bravo", 92.25).unwrap();

        assert_eq!(table.get(1, "Alpha"), Some(101.5));
        assert_eq!(table.get(2, "Alpha"), None);
        assert_eq!(table.teams(), &["Alpha".to_string(), "Bravo".to_string()]);
        assert_eq!(table.weeks().len(), 2);
        assert!((table.cumulative("Bravo") - 180.25).abs() < 1e-9);
    }

    #[test]
    fn duplicate_cell_rejected() {
        let mut table = ScoreTable::new();
        table.insert(3, "Alpha", 10.0).unwrap();
        let err = table.insert(3, "Alpha", 11.0).unwrap_err();
        assert_eq!(
            err,
            TableError::Duplicate {
                week: 3,
                team: "Alpha".into()
            }
        );
        assert_eq!(table.get(3, "Alpha"), Some(10.0));
    }

    #[test]
    fn weeks_keep_insertion_order() {
        let mut table = ScoreTable::new();
        table.insert(2, "Alpha", 1.0).unwrap();
        table.insert(1, "Alpha", 2.0).unwrap();
        let order: Vec<u32> = table.weeks().iter().map(|r| r.week).collect();
        assert_eq!(order, vec![2, 1]);
    }
}
