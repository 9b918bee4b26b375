// Draft-order CSV files: the per-team rankings submitted to the league.
//
// Columns: player_first_name, player_last_name, team_name, position,
// overall_rank, position_rank. Only the names, position and position_rank
// are required when reading.

use std::io::{Read, Write};
use std::path::Path;

use bestball_core::normalize::{normalize, NameNormalizer};
use bestball_core::{PlayerRecord, Position};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::LoadError;

/// A ranking row as written by the ranking pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub record: PlayerRecord,
    pub team_name: String,
    pub overall_rank: usize,
}

// ---------------------------------------------------------------------------
// Raw CSV rows (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawDraftOrderRow {
    #[serde(default)]
    player_first_name: Option<String>,
    #[serde(default)]
    player_last_name: Option<String>,
    #[serde(default)]
    team_name: Option<String>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    overall_rank: Option<f64>,
    #[serde(default)]
    position_rank: Option<f64>,
}

impl RawDraftOrderRow {
    fn is_empty(&self) -> bool {
        let blank = |s: &Option<String>| s.as_deref().map_or(true, |v| v.trim().is_empty());
        blank(&self.player_first_name)
            && blank(&self.player_last_name)
            && blank(&self.team_name)
            && blank(&self.position)
            && self.overall_rank.is_none()
            && self.position_rank.is_none()
    }
}

#[derive(Debug, Serialize)]
struct DraftOrderOutRow<'a> {
    player_first_name: &'a str,
    player_last_name: &'a str,
    team_name: &'a str,
    position: &'a str,
    overall_rank: usize,
    position_rank: usize,
}

fn parse_rank(value: Option<f64>) -> Option<usize> {
    match value {
        Some(v) if v.is_finite() && v >= 1.0 => Some(v.round() as usize),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Reader/writer-based helpers
// ---------------------------------------------------------------------------

fn load_from_reader<R: Read>(
    rdr: R,
    normalizer: &NameNormalizer,
) -> Result<Vec<PlayerRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let mut records = Vec::new();
    for (line, result) in reader.deserialize::<RawDraftOrderRow>().enumerate() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed draft-order row: {}", e);
                continue;
            }
        };
        if raw.is_empty() {
            continue;
        }

        let first = normalize(raw.player_first_name.as_deref().unwrap_or(""), 1);
        let last = normalize(raw.player_last_name.as_deref().unwrap_or(""), 1);
        let key = normalizer.resolve(format!("{first}_{last}"));

        let label = raw.position.as_deref().unwrap_or("");
        let Some(position) = Position::from_str_pos(label) else {
            warn!("row {}: skipping '{}' with unknown position '{}'", line + 1, key, label);
            continue;
        };
        let Some(position_rank) = parse_rank(raw.position_rank) else {
            warn!("row {}: skipping '{}' with missing position_rank", line + 1, key);
            continue;
        };

        records.push(PlayerRecord::from_name_key(&key, position, position_rank));
    }
    Ok(records)
}

fn write_to_writer<W: Write>(wtr: W, entries: &[RankedEntry]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(wtr);
    for entry in entries {
        writer.serialize(DraftOrderOutRow {
            player_first_name: &entry.record.first_name,
            player_last_name: &entry.record.last_name,
            team_name: &entry.team_name,
            position: entry.record.position.display_str(),
            overall_rank: entry.overall_rank,
            position_rank: entry.record.position_rank,
        })?;
    }
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Public path-based API
// ---------------------------------------------------------------------------

/// Load a draft-order CSV, normalizing names to one part each.
pub fn load_draft_order(path: &Path, normalizer: &NameNormalizer) -> Result<Vec<PlayerRecord>, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::io(path, e))?;
    load_from_reader(file, normalizer).map_err(|e| LoadError::csv(path, e))
}

/// Write ranked entries in the draft-order CSV layout.
pub fn write_draft_order(path: &Path, entries: &[RankedEntry]) -> Result<(), LoadError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| LoadError::io(parent, e))?;
    }
    let file = std::fs::File::create(path).map_err(|e| LoadError::io(path, e))?;
    write_to_writer(file, entries).map_err(|e| LoadError::csv(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> NameNormalizer {
        NameNormalizer::with_default_aliases()
    }

    #[test]
    fn loads_and_normalizes_names() {
        let csv_data = "\
player_first_name,player_last_name,team_name,position,overall_rank,position_rank
Ja'Marr,Chase,CIN,WR,1,1
Christian,McCaffrey,SF,RB,2,1
Kenneth,Walker III,SEA,RB,3,2";

        let records = load_from_reader(csv_data.as_bytes(), &normalizer()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name_key(), "jamarr_chase");
        assert_eq!(records[0].position, Position::WideReceiver);
        assert_eq!(records[1].name_key(), "christian_mccaffrey");
        assert_eq!(records[2].name_key(), "kenneth_walker");
        assert_eq!(records[2].position_rank, 2);
    }

    #[test]
    fn fully_empty_rows_dropped() {
        let csv_data = "\
player_first_name,player_last_name,team_name,position,overall_rank,position_rank
Josh,Allen,BUF,QB,1,1
,,,,,
Jalen,Hurts,PHI,QB,2,2";

        let records = load_from_reader(csv_data.as_bytes(), &normalizer()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name_key(), "jalen_hurts");
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let csv_data = "\
player_first_name,player_last_name,position,position_rank
Travis,Kelce,TE,1.0";

        let records = load_from_reader(csv_data.as_bytes(), &normalizer()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].position_rank, 1);
    }

    #[test]
    fn defense_and_kicker_positions_parse() {
        let csv_data = "\
player_first_name,player_last_name,position,position_rank
Bills,D/ST,D/ST,1
Justin,Tucker,K,1";

        let records = load_from_reader(csv_data.as_bytes(), &normalizer()).unwrap();
        assert_eq!(records[0].position, Position::Defense);
        assert_eq!(records[1].position, Position::Kicker);
    }

    #[test]
    fn unknown_position_and_missing_rank_skipped() {
        let csv_data = "\
player_first_name,player_last_name,position,position_rank
Some,Body,LB,1
No,Rank,WR,
Valid,Player,WR,1";

        let records = load_from_reader(csv_data.as_bytes(), &normalizer()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name_key(), "valid_player");
    }

    #[test]
    fn aliases_apply_to_composite_name() {
        let csv_data = "\
player_first_name,player_last_name,position,position_rank
Gabe,Davis,WR,20";

        let records = load_from_reader(csv_data.as_bytes(), &normalizer()).unwrap();
        assert_eq!(records[0].first_name, "gabriel");
        assert_eq!(records[0].last_name, "davis");
    }

    #[test]
    fn written_ranking_reads_back() {
        let entries = vec![
            RankedEntry {
                record: PlayerRecord::new("bijan", "robinson", Position::RunningBack, 1),
                team_name: "ATL".into(),
                overall_rank: 1,
            },
            RankedEntry {
                record: PlayerRecord::new("justin", "jefferson", Position::WideReceiver, 1),
                team_name: "MIN".into(),
                overall_rank: 2,
            },
        ];
        let mut buf = Vec::new();
        write_to_writer(&mut buf, &entries).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with(
            "player_first_name,player_last_name,team_name,position,overall_rank,position_rank\n"
        ));
        assert!(text.contains("bijan,robinson,ATL,RB,1,1"));

        let back = load_from_reader(text.as_bytes(), &normalizer()).unwrap();
        let keys: Vec<String> = back.iter().map(|r| r.name_key()).collect();
        assert_eq!(keys, vec!["bijan_robinson", "justin_jefferson"]);
    }
}
