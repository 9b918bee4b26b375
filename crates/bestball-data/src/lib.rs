// Readers and writers for the files and services the league tools consume:
// draft-order CSVs, saved reference pages, league snapshots, depth charts,
// and the ADP service.

pub mod adp;
pub mod depth_chart;
pub mod draft_order;
pub mod error;
pub mod league;
pub mod reference;
pub mod scores;

pub use error::LoadError;
