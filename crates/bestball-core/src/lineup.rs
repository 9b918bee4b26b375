// Ideal best-ball lineup selection and free-agent backfill.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::player::{BoxPlayer, Position};

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// The seven starting slots of a lineup, in fill order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Slot {
    Qb,
    Wr1,
    Wr2,
    Rb1,
    Rb2,
    Te,
    Flex,
}

impl Slot {
    /// Fill order for selection and backfill.
    pub const ALL: [Slot; 7] = [
        Slot::Qb,
        Slot::Wr1,
        Slot::Wr2,
        Slot::Rb1,
        Slot::Rb2,
        Slot::Te,
        Slot::Flex,
    ];

    /// Positions a player may hold to fill this slot.
    pub fn eligible_positions(&self) -> &'static [Position] {
        match self {
            Slot::Qb => &[Position::Quarterback],
            Slot::Wr1 | Slot::Wr2 => &[Position::WideReceiver],
            Slot::Rb1 | Slot::Rb2 => &[Position::RunningBack],
            Slot::Te => &[Position::TightEnd],
            Slot::Flex => &[Position::RunningBack, Position::WideReceiver, Position::TightEnd],
        }
    }

    pub fn accepts(&self, player: &BoxPlayer) -> bool {
        self.eligible_positions().iter().any(|&p| player.is_eligible(p))
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Slot::Qb => "QB",
            Slot::Wr1 => "WR1",
            Slot::Wr2 => "WR2",
            Slot::Rb1 => "RB1",
            Slot::Rb2 => "RB2",
            Slot::Te => "TE",
            Slot::Flex => "FLEX",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Errors and diagnostics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineupError {
    #[error("no eligible player left to fill the {slot} slot")]
    BucketExhausted { slot: Slot },
}

/// A player that fit none of the QB/RB/WR/TE buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityDiagnostic {
    pub player: String,
    pub eligible: Vec<Position>,
}

impl fmt::Display for EligibilityDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.eligible.iter().map(|p| p.display_str()).collect();
        write!(
            f,
            "{} does not match any eligible roles ({})",
            self.player,
            labels.join("/")
        )
    }
}

// ---------------------------------------------------------------------------
// Bucketing
// ---------------------------------------------------------------------------

/// Bucket priority: a player eligible at several positions lands in the
/// first one listed here.
const BUCKET_ORDER: [Position; 4] = [
    Position::Quarterback,
    Position::RunningBack,
    Position::WideReceiver,
    Position::TightEnd,
];

/// Indices into the source slice, grouped by bucket.
#[derive(Debug, Clone, Default)]
pub struct Buckets {
    pub qb: Vec<usize>,
    pub rb: Vec<usize>,
    pub wr: Vec<usize>,
    pub te: Vec<usize>,
    pub diagnostics: Vec<EligibilityDiagnostic>,
}

impl Buckets {
    fn bucket_mut(&mut self, pos: Position) -> &mut Vec<usize> {
        match pos {
            Position::Quarterback => &mut self.qb,
            Position::RunningBack => &mut self.rb,
            Position::WideReceiver => &mut self.wr,
            _ => &mut self.te,
        }
    }

    /// Candidate indices for `slot`. FLEX draws from RB, then WR, then TE.
    fn candidates(&self, slot: Slot) -> Vec<usize> {
        match slot {
            Slot::Qb => self.qb.clone(),
            Slot::Wr1 | Slot::Wr2 => self.wr.clone(),
            Slot::Rb1 | Slot::Rb2 => self.rb.clone(),
            Slot::Te => self.te.clone(),
            Slot::Flex => self
                .rb
                .iter()
                .chain(self.wr.iter())
                .chain(self.te.iter())
                .copied()
                .collect(),
        }
    }
}

/// Place each player into exactly one bucket. Players with no usable
/// eligibility are reported in `diagnostics` and otherwise ignored.
pub fn bucket(players: &[BoxPlayer]) -> Buckets {
    let mut buckets = Buckets::default();
    for (idx, player) in players.iter().enumerate() {
        match BUCKET_ORDER.iter().find(|&&pos| player.is_eligible(pos)) {
            Some(&pos) => buckets.bucket_mut(pos).push(idx),
            None => {
                let diag = EligibilityDiagnostic {
                    player: player.name.clone(),
                    eligible: player.eligible.clone(),
                };
                debug!("{}", diag);
                buckets.diagnostics.push(diag);
            }
        }
    }
    buckets
}

// ---------------------------------------------------------------------------
// Ideal lineup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdealLineup {
    pub qb: BoxPlayer,
    pub wr1: BoxPlayer,
    pub wr2: BoxPlayer,
    pub rb1: BoxPlayer,
    pub rb2: BoxPlayer,
    pub te: BoxPlayer,
    pub flex: BoxPlayer,
}

impl IdealLineup {
    pub fn get(&self, slot: Slot) -> &BoxPlayer {
        match slot {
            Slot::Qb => &self.qb,
            Slot::Wr1 => &self.wr1,
            Slot::Wr2 => &self.wr2,
            Slot::Rb1 => &self.rb1,
            Slot::Rb2 => &self.rb2,
            Slot::Te => &self.te,
            Slot::Flex => &self.flex,
        }
    }

    fn get_mut(&mut self, slot: Slot) -> &mut BoxPlayer {
        match slot {
            Slot::Qb => &mut self.qb,
            Slot::Wr1 => &mut self.wr1,
            Slot::Wr2 => &mut self.wr2,
            Slot::Rb1 => &mut self.rb1,
            Slot::Rb2 => &mut self.rb2,
            Slot::Te => &mut self.te,
            Slot::Flex => &mut self.flex,
        }
    }

    /// Sum of all seven slots, rounded to two decimals.
    pub fn total_points(&self) -> f64 {
        let total: f64 = Slot::ALL.iter().map(|&s| self.get(s).points).sum();
        round2(total)
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A selected lineup plus the players that could not be bucketed.
#[derive(Debug, Clone)]
pub struct Selection {
    pub lineup: IdealLineup,
    pub diagnostics: Vec<EligibilityDiagnostic>,
}

/// Index of the highest-scoring unused candidate. The first candidate wins
/// a tie.
fn best_unused(players: &[BoxPlayer], candidates: &[usize], used: &[bool]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for &idx in candidates {
        if used[idx] {
            continue;
        }
        match best {
            Some(b) if players[idx].points <= players[b].points => {}
            _ => best = Some(idx),
        }
    }
    best
}

/// Select the highest-scoring legal lineup from `available`.
///
/// Slots are filled in [`Slot::ALL`] order, each taking the best player not
/// already used. Fails when a slot's bucket runs dry.
pub fn select(available: &[BoxPlayer]) -> Result<Selection, LineupError> {
    let buckets = bucket(available);
    let mut used = vec![false; available.len()];
    let mut chosen = Vec::with_capacity(Slot::ALL.len());

    for slot in Slot::ALL {
        let idx = best_unused(available, &buckets.candidates(slot), &used)
            .ok_or(LineupError::BucketExhausted { slot })?;
        used[idx] = true;
        chosen.push(available[idx].clone());
    }

    let [qb, wr1, wr2, rb1, rb2, te, flex]: [BoxPlayer; 7] = chosen
        .try_into()
        .map_err(|_| LineupError::BucketExhausted { slot: Slot::Flex })?;

    Ok(Selection {
        lineup: IdealLineup {
            qb,
            wr1,
            wr2,
            rb1,
            rb2,
            te,
            flex,
        },
        diagnostics: buckets.diagnostics,
    })
}

// ---------------------------------------------------------------------------
// Free-agent backfill
// ---------------------------------------------------------------------------

/// Free agents available this week, best projection first. Claims remove
/// players so later slots and later teams cannot reuse them.
#[derive(Debug, Clone, Default)]
pub struct FreeAgentPool {
    players: Vec<BoxPlayer>,
}

impl FreeAgentPool {
    /// Build a pool from already-ordered free agents.
    pub fn new(players: Vec<BoxPlayer>) -> Self {
        Self { players }
    }

    /// Keep only free agents who scored this week, sorted descending by
    /// projection. The sort is stable so feed order breaks ties.
    pub fn from_feed(players: Vec<BoxPlayer>) -> Self {
        let mut players: Vec<BoxPlayer> = players.into_iter().filter(|p| p.points > 0.0).collect();
        players.sort_by(|a, b| {
            b.projected_points
                .partial_cmp(&a.projected_points)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self { players }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn players(&self) -> &[BoxPlayer] {
        &self.players
    }

    /// Remove and return the first free agent who can fill `slot`.
    pub fn claim(&mut self, slot: Slot) -> Option<BoxPlayer> {
        let idx = self.players.iter().position(|p| slot.accepts(p))?;
        Some(self.players.remove(idx))
    }
}

/// Replace every zero-point starter with the first eligible free agent.
///
/// Slots are visited in [`Slot::ALL`] order. Slots with no eligible free
/// agent left keep their starter.
pub fn backfill(mut lineup: IdealLineup, pool: &mut FreeAgentPool) -> IdealLineup {
    for slot in Slot::ALL {
        if lineup.get(slot).points != 0.0 {
            continue;
        }
        if let Some(free_agent) = pool.claim(slot) {
            debug!(
                slot = %slot,
                replaced = %lineup.get(slot).name,
                claimed = %free_agent.name,
                "backfilled zero-point starter"
            );
            *lineup.get_mut(slot) = free_agent;
        }
    }
    lineup
}
