// Player positions and the records every loader produces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Football positions that appear in draft rankings and box scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    Quarterback,
    RunningBack,
    WideReceiver,
    TightEnd,
    Kicker,
    Defense,
}

impl Position {
    /// Parse a position label into a Position enum.
    ///
    /// Matching is case-insensitive and accepts the aliases used by the
    /// different sources:
    /// - "K"/"PK" -> Kicker
    /// - "D/ST"/"DST"/"DEF" -> Defense
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            "K" | "PK" => Some(Position::Kicker),
            "D/ST" | "DST" | "DEF" => Some(Position::Defense),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::Kicker => "K",
            Position::Defense => "DST",
        }
    }

    /// Kickers and team defenses are never part of a ranking or a lineup.
    pub fn is_excluded(&self) -> bool {
        matches!(self, Position::Kicker | Position::Defense)
    }

    /// How many players per team a ranking needs at this position before
    /// deeper entries stop mattering. `None` for excluded positions.
    pub fn depth_multiplier(&self) -> Option<usize> {
        match self {
            Position::RunningBack | Position::WideReceiver => Some(5),
            Position::Quarterback | Position::TightEnd => Some(2),
            Position::Kicker | Position::Defense => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Ranked players
// ---------------------------------------------------------------------------

/// One entry of a positional ranking.
///
/// Names are stored already normalized (see [`crate::normalize`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub first_name: String,
    pub last_name: String,
    pub position: Position,
    pub position_rank: usize,
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub projected_points: Option<f64>,
    #[serde(default)]
    pub adp: Option<f64>,
}

impl PlayerRecord {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        position: Position,
        position_rank: usize,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            position,
            position_rank,
            points: None,
            projected_points: None,
            adp: None,
        }
    }

    /// Build a record from a single `first_last` token, splitting on the
    /// first underscore.
    pub fn from_name_key(name_key: &str, position: Position, position_rank: usize) -> Self {
        let (first, last) = name_key.split_once('_').unwrap_or((name_key, ""));
        Self::new(first, last, position, position_rank)
    }

    /// The `first_last` composite used to compare two rankings.
    pub fn name_key(&self) -> String {
        format!("{}_{}", self.first_name, self.last_name)
    }

    /// A row whose name fields are both empty carries no player.
    pub fn is_blank(&self) -> bool {
        self.first_name.is_empty() && self.last_name.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Box-score players
// ---------------------------------------------------------------------------

/// A player as reported in a weekly box score or on the free-agent list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlayer {
    pub name: String,
    /// Positions this player may fill, in the order the feed lists them.
    pub eligible: Vec<Position>,
    pub points: f64,
    pub projected_points: f64,
}

impl BoxPlayer {
    pub fn new(name: impl Into<String>, eligible: &[Position], points: f64, projected_points: f64) -> Self {
        Self {
            name: name.into(),
            eligible: eligible.to_vec(),
            points,
            projected_points,
        }
    }

    pub fn is_eligible(&self, pos: Position) -> bool {
        self.eligible.contains(&pos)
    }
}
