// Best-ball league decision logic: name normalization, ranking validation,
// ideal-lineup selection, waiver-ordered weekly scoring, and rank fusion.

pub mod compare;
pub mod fusion;
pub mod lineup;
pub mod normalize;
pub mod player;
pub mod schedule;
pub mod table;

pub use player::{BoxPlayer, PlayerRecord, Position};
