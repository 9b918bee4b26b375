// Depth-chart inputs for the custom ranking.
//
// Three files feed the ranking:
// - a historical weekly depth chart (nflverse layout: gsis_id, club_code,
//   week, depth_position, depth_team, ...),
// - seasonal fantasy points keyed by the same player id,
// - a current-season depth chart export, one block per team.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use bestball_core::Position;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::LoadError;

/// Full team name to the club code used by the historical depth charts.
pub const TEAM_CODES: &[(&str, &str)] = &[
    ("Arizona Cardinals", "ARI"),
    ("Atlanta Falcons", "ATL"),
    ("Baltimore Ravens", "BAL"),
    ("Buffalo Bills", "BUF"),
    ("Carolina Panthers", "CAR"),
    ("Chicago Bears", "CHI"),
    ("Cincinnati Bengals", "CIN"),
    ("Cleveland Browns", "CLE"),
    ("Dallas Cowboys", "DAL"),
    ("Denver Broncos", "DEN"),
    ("Detroit Lions", "DET"),
    ("Green Bay Packers", "GB"),
    ("Houston Texans", "HOU"),
    ("Indianapolis Colts", "IND"),
    ("Jacksonville Jaguars", "JAX"),
    ("Kansas City Chiefs", "KC"),
    ("Los Angeles Chargers", "LAC"),
    ("Los Angeles Rams", "LA"),
    ("Las Vegas Raiders", "LV"),
    ("Miami Dolphins", "MIA"),
    ("Minnesota Vikings", "MIN"),
    ("New England Patriots", "NE"),
    ("New Orleans Saints", "NO"),
    ("New York Giants", "NYG"),
    ("New York Jets", "NYJ"),
    ("Philadelphia Eagles", "PHI"),
    ("Pittsburgh Steelers", "PIT"),
    ("Seattle Seahawks", "SEA"),
    ("San Francisco 49ers", "SF"),
    ("Tampa Bay Buccaneers", "TB"),
    ("Tennessee Titans", "TEN"),
    ("Washington Commanders", "WAS"),
];

pub fn team_code(full_name: &str) -> Option<&'static str> {
    let name = full_name.trim();
    TEAM_CODES
        .iter()
        .find(|(full, _)| full.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}

/// Positions carried by the depth charts, in export column order.
const CHART_POSITIONS: [Position; 4] = [
    Position::Quarterback,
    Position::RunningBack,
    Position::WideReceiver,
    Position::TightEnd,
];

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One slot of a historical depth chart.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalDepthEntry {
    pub player_id: String,
    pub team: String,
    pub position: Position,
    pub depth: u32,
}

/// One slot of the current-season depth chart.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentDepthEntry {
    pub team: String,
    pub position: Position,
    pub depth: u32,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Raw CSV rows (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawDepthRow {
    gsis_id: Option<String>,
    club_code: String,
    week: Option<f64>,
    depth_position: String,
    depth_team: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSeasonalRow {
    player_id: String,
    fantasy_points_ppr: Option<f64>,
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private)
// ---------------------------------------------------------------------------

fn historical_from_reader<R: Read>(rdr: R, week: u32) -> Result<Vec<HistoricalDepthEntry>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut entries = Vec::new();
    for result in reader.deserialize::<RawDepthRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed depth chart row: {}", e);
                continue;
            }
        };
        if raw.week.map(|w| w.round() as u32) != Some(week) {
            continue;
        }
        let Some(position) = Position::from_str_pos(&raw.depth_position)
            .filter(|p| CHART_POSITIONS.contains(p))
        else {
            continue;
        };
        let Some(player_id) = raw.gsis_id.filter(|id| !id.trim().is_empty()) else {
            debug!("depth chart slot without player id at {}", raw.club_code);
            continue;
        };
        let Some(depth) = raw
            .depth_team
            .as_deref()
            .and_then(|d| d.trim().parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d >= 1.0)
        else {
            warn!("skipping depth chart row for {}: bad depth_team", player_id);
            continue;
        };
        entries.push(HistoricalDepthEntry {
            player_id: player_id.trim().to_string(),
            team: raw.club_code.trim().to_string(),
            position,
            depth: depth.round() as u32,
        });
    }
    Ok(entries)
}

fn seasonal_from_reader<R: Read>(rdr: R) -> Result<HashMap<String, f64>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut points = HashMap::new();
    for result in reader.deserialize::<RawSeasonalRow>() {
        match result {
            Ok(raw) => {
                let Some(value) = raw.fantasy_points_ppr.filter(|v| v.is_finite()) else {
                    continue;
                };
                let id = raw.player_id.trim().to_string();
                if points.contains_key(&id) {
                    warn!("duplicate seasonal points for '{}', keeping first", id);
                    continue;
                }
                points.insert(id, value);
            }
            Err(e) => warn!("skipping malformed seasonal points row: {}", e),
        }
    }
    Ok(points)
}

/// Whether a chart line is a column header rather than a depth row.
fn is_header_row(record: &csv::StringRecord) -> bool {
    CHART_POSITIONS.iter().enumerate().any(|(i, pos)| {
        record
            .get(i * 2 + 1)
            .is_some_and(|cell| cell.trim().eq_ignore_ascii_case(pos.display_str()))
    })
}

fn parse_block(block: &[&str]) -> Result<Vec<CurrentDepthEntry>, csv::Error> {
    let Some((header, body)) = block.split_first() else {
        return Ok(Vec::new());
    };
    let team_name = header.trim().trim_matches(',').trim_matches('"');
    let Some(team) = team_code(team_name) else {
        warn!("skipping depth chart block for unknown team '{}'", team_name);
        return Ok(Vec::new());
    };

    let text = body.join("\n");
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut entries = Vec::new();
    let mut depth = 0;
    for result in reader.records() {
        let record = result?;
        if is_header_row(&record) {
            continue;
        }
        depth += 1;
        for (i, &position) in CHART_POSITIONS.iter().enumerate() {
            let Some(name) = record.get(i * 2 + 1).map(str::trim).filter(|n| !n.is_empty()) else {
                continue;
            };
            entries.push(CurrentDepthEntry {
                team: team.to_string(),
                position,
                depth,
                name: name.to_string(),
            });
        }
    }
    Ok(entries)
}

fn current_from_str(text: &str) -> Result<Vec<CurrentDepthEntry>, csv::Error> {
    let mut entries = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim() == "\"\"" {
            entries.extend(parse_block(&block)?);
            block.clear();
        } else if !line.trim().is_empty() {
            block.push(line);
        }
    }
    entries.extend(parse_block(&block)?);
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load QB/RB/WR/TE slots from a historical depth chart for one week.
pub fn load_historical_depth_chart(path: &Path, week: u32) -> Result<Vec<HistoricalDepthEntry>, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::io(path, e))?;
    historical_from_reader(file, week).map_err(|e| LoadError::csv(path, e))
}

/// Load seasonal PPR fantasy points keyed by player id.
pub fn load_seasonal_points(path: &Path) -> Result<HashMap<String, f64>, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::io(path, e))?;
    seasonal_from_reader(file).map_err(|e| LoadError::csv(path, e))
}

/// Parse a current-season depth chart export already in memory.
pub fn parse_current_depth_chart(text: &str) -> Result<Vec<CurrentDepthEntry>, LoadError> {
    current_from_str(text).map_err(|source| LoadError::Csv {
        path: "<inline>".into(),
        source,
    })
}

/// Load a current-season depth chart export.
///
/// Blocks are separated by a line containing only `""`. The first line of a
/// block is the team's full name; each following line is
/// `qb_rank,qb,rb_rank,rb,wr_rank,wr,te_rank,te`. Depth is the 1-based row
/// index within the block.
pub fn load_current_depth_chart(path: &Path) -> Result<Vec<CurrentDepthEntry>, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    current_from_str(&text).map_err(|e| LoadError::csv(path, e))
}
