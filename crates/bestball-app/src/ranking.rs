// Custom draft ranking built from last season's depth-chart production, this
// season's depth charts, and ADP.
//
// Pipeline:
// 1. Historical depth chart joined to seasonal points, best first
// 2. Each (team, position, depth) slot made unique by running count
// 3. Current depth chart stacked into (team, position, depth, name)
// 4. Current occupants inherit their slot's historical standing
// 5. ADP from the primary format, gaps filled from the fallback format
// 6. Inner join on (name, position) and fuse both per-position ranks
// 7. Keep the best `limit * league_size` per position
// 8. Number the rows and write the draft-order CSV

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Context;
use bestball_core::fusion::{fuse, FusionError};
use bestball_core::normalize::NameNormalizer;
use bestball_core::{PlayerRecord, Position};
use bestball_data::adp::{AdpClient, AdpEntry, AdpRequest};
use bestball_data::depth_chart::{
    load_current_depth_chart, load_historical_depth_chart, load_seasonal_points, CurrentDepthEntry,
    HistoricalDepthEntry,
};
use bestball_data::draft_order::{write_draft_order, RankedEntry};
use tracing::{debug, info, warn};

use crate::config::Config;

/// Order positions are laid out in when building the performance table.
const PERFORMANCE_ORDER: [Position; 4] = [
    Position::RunningBack,
    Position::WideReceiver,
    Position::Quarterback,
    Position::TightEnd,
];

// ---------------------------------------------------------------------------
// Intermediate rows
// ---------------------------------------------------------------------------

/// A historical depth-chart slot and the points its occupant scored.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceRow {
    pub team: String,
    pub position: Position,
    pub depth: u32,
    pub points: Option<f64>,
}

/// A current player ranked by the standing of the slot they occupy.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthRanked {
    pub name: String,
    pub team: String,
    pub position: Position,
    pub depth_position_rank: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdpRanked {
    pub name: String,
    pub position: Position,
    pub adp: f64,
    pub adp_position_rank: usize,
}

/// A player with both rank signals and the fused position rank.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedRow {
    pub name: String,
    pub team: String,
    pub position: Position,
    pub adp: f64,
    pub adp_position_rank: usize,
    pub depth_position_rank: usize,
    pub position_rank: usize,
}

fn descending_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Steps 1 and 2: historical slots ordered by production, with shared slots
/// pushed down so every (team, position, depth) is distinct.
pub fn depth_chart_performance(
    historical: &[HistoricalDepthEntry],
    points: &HashMap<String, f64>,
) -> Vec<PerformanceRow> {
    let mut with_points: Vec<PerformanceRow> = historical
        .iter()
        .map(|e| PerformanceRow {
            team: e.team.clone(),
            position: e.position,
            depth: e.depth,
            points: points.get(&e.player_id).copied(),
        })
        .collect();
    with_points.sort_by(|a, b| descending_missing_last(a.points, b.points));

    let mut seen: HashMap<(String, Position, u32), u32> = HashMap::new();
    let mut rows = Vec::with_capacity(with_points.len());
    for position in PERFORMANCE_ORDER {
        for row in with_points.iter().filter(|r| r.position == position) {
            let count = seen
                .entry((row.team.clone(), row.position, row.depth))
                .or_insert(0);
            rows.push(PerformanceRow {
                depth: row.depth + *count,
                ..row.clone()
            });
            *count += 1;
        }
    }
    rows
}

/// Step 4: map each historical slot to whoever holds it now.
pub fn merge_current(
    performance: &[PerformanceRow],
    current: &[CurrentDepthEntry],
    normalizer: &NameNormalizer,
) -> Vec<DepthRanked> {
    let mut occupants: HashMap<(&str, Position, u32), &str> = HashMap::new();
    for entry in current {
        occupants
            .entry((entry.team.as_str(), entry.position, entry.depth))
            .or_insert(entry.name.as_str());
    }

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut counts: HashMap<Position, usize> = HashMap::new();
    let mut ranked = Vec::new();
    for row in performance {
        let Some(&name) = occupants.get(&(row.team.as_str(), row.position, row.depth)) else {
            debug!("{} {} depth {}: no current occupant", row.team, row.position, row.depth);
            continue;
        };
        if !seen.insert((name, row.team.as_str())) {
            continue;
        }
        let rank = counts.entry(row.position).or_insert(0);
        *rank += 1;
        ranked.push(DepthRanked {
            name: normalizer.normalize(name, 2),
            team: row.team.clone(),
            position: row.position,
            depth_position_rank: *rank,
        });
    }
    ranked
}

/// Step 5: primary ADP plus fallback entries the primary lacks, ranked by
/// ADP within each position.
pub fn adp_table(primary: &[AdpEntry], fallback: &[AdpEntry], normalizer: &NameNormalizer) -> Vec<AdpRanked> {
    let primary_names: HashSet<&str> = primary.iter().map(|e| e.name.as_str()).collect();
    let combined = primary
        .iter()
        .chain(fallback.iter().filter(|e| !primary_names.contains(e.name.as_str())));

    let mut rows: Vec<AdpRanked> = Vec::new();
    for entry in combined {
        let Some(position) = Position::from_str_pos(&entry.position) else {
            debug!("ADP entry {} has unknown position {}", entry.name, entry.position);
            continue;
        };
        rows.push(AdpRanked {
            name: normalizer.normalize(&entry.name, 2),
            position,
            adp: entry.adp,
            adp_position_rank: 0,
        });
    }
    rows.sort_by(|a, b| a.adp.partial_cmp(&b.adp).unwrap_or(Ordering::Equal));

    let mut counts: HashMap<Position, usize> = HashMap::new();
    for row in &mut rows {
        let rank = counts.entry(row.position).or_insert(0);
        *rank += 1;
        row.adp_position_rank = *rank;
    }
    rows
}

/// Step 6: keep players present in both tables and fuse their ranks.
pub fn join_and_fuse(depth: &[DepthRanked], adp: &[AdpRanked]) -> Result<Vec<FusedRow>, FusionError> {
    let mut by_key: HashMap<(&str, Position), Vec<&AdpRanked>> = HashMap::new();
    for row in adp {
        by_key.entry((row.name.as_str(), row.position)).or_default().push(row);
    }

    let mut rows: Vec<FusedRow> = Vec::new();
    for d in depth {
        let Some(matches) = by_key.get(&(d.name.as_str(), d.position)) else {
            continue;
        };
        for a in matches {
            rows.push(FusedRow {
                name: d.name.clone(),
                team: d.team.clone(),
                position: d.position,
                adp: a.adp,
                adp_position_rank: a.adp_position_rank,
                depth_position_rank: d.depth_position_rank,
                position_rank: 0,
            });
        }
    }

    let groups: Vec<Position> = rows.iter().map(|r| r.position).collect();
    let signals: Vec<Vec<Option<f64>>> = vec![
        rows.iter().map(|r| Some(r.adp_position_rank as f64)).collect(),
        rows.iter().map(|r| Some(r.depth_position_rank as f64)).collect(),
    ];
    let fused = fuse(&groups, &signals)?;
    for (row, rank) in rows.iter_mut().zip(fused) {
        row.position_rank = rank;
    }
    Ok(rows)
}

/// Step 7: best rows per position by fused rank, positions in `limits` order.
pub fn reduce(rows: &[FusedRow], limits: &[(Position, usize)]) -> Vec<FusedRow> {
    let mut kept = Vec::new();
    for &(position, limit) in limits {
        let mut subset: Vec<&FusedRow> = rows.iter().filter(|r| r.position == position).collect();
        subset.sort_by_key(|r| r.position_rank);
        kept.extend(subset.into_iter().take(limit).cloned());
    }
    kept
}

/// Step 8: number the rows in output order.
pub fn to_entries(rows: &[FusedRow]) -> Vec<RankedEntry> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let mut record = PlayerRecord::from_name_key(&row.name, row.position, row.position_rank);
            record.adp = Some(row.adp);
            RankedEntry {
                record,
                team_name: row.team.clone(),
                overall_rank: i + 1,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// Depth-chart inputs loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct DepthInputs {
    pub historical: Vec<HistoricalDepthEntry>,
    pub points: HashMap<String, f64>,
    pub current: Vec<CurrentDepthEntry>,
}

pub fn load_depth_inputs(config: &Config) -> anyhow::Result<DepthInputs> {
    let paths = &config.ranking.depth_charts;
    let historical = load_historical_depth_chart(&config.resolve(&paths.historical), paths.historical_week)
        .context("failed to load historical depth chart")?;
    let points = load_seasonal_points(&config.resolve(&paths.seasonal_points))
        .context("failed to load seasonal points")?;
    let current = load_current_depth_chart(&config.resolve(&paths.current))
        .context("failed to load current depth chart")?;
    info!(
        "Loaded {} historical slots, {} seasonal totals, {} current slots",
        historical.len(),
        points.len(),
        current.len()
    );
    Ok(DepthInputs {
        historical,
        points,
        current,
    })
}

/// Fetch the primary and (if configured) fallback ADP tables. Any failure
/// aborts the whole run.
pub async fn fetch_adp(config: &Config, client: &AdpClient) -> anyhow::Result<(Vec<AdpEntry>, Vec<AdpEntry>)> {
    let adp = &config.ranking.adp;
    let year = config.adp_year();

    let primary_request = AdpRequest::new(&adp.primary_format, year, adp.number_of_teams, &adp.position)
        .context("invalid primary ADP request")?;
    let primary = client
        .fetch(&primary_request)
        .await
        .context("failed to fetch primary ADP")?;

    let fallback = match &adp.fallback_format {
        Some(format) => {
            let request = AdpRequest::new(format, year, adp.number_of_teams, &adp.position)
                .context("invalid fallback ADP request")?;
            client
                .fetch(&request)
                .await
                .context("failed to fetch fallback ADP")?
        }
        None => Vec::new(),
    };
    Ok((primary, fallback))
}

/// Run steps 1 to 8 over already-loaded inputs.
pub fn build_ranking(
    config: &Config,
    inputs: &DepthInputs,
    primary: &[AdpEntry],
    fallback: &[AdpEntry],
) -> anyhow::Result<Vec<RankedEntry>> {
    let normalizer = config.normalizer();

    let performance = depth_chart_performance(&inputs.historical, &inputs.points);
    let depth = merge_current(&performance, &inputs.current, &normalizer);
    let adp = adp_table(primary, fallback, &normalizer);
    debug!(performance = performance.len(), depth = depth.len(), adp = adp.len(), "ranking inputs");

    let fused = join_and_fuse(&depth, &adp).context("failed to fuse rank signals")?;
    if fused.is_empty() {
        warn!("no player appears in both the depth charts and ADP");
    }
    let reduced = reduce(&fused, &config.ranking.limits.per_position());
    Ok(to_entries(&reduced))
}

/// Build the ranking and write it to `output` (or the configured path).
/// Nothing is written unless every input, including ADP, was obtained.
pub async fn run(config: &Config, client: &AdpClient, output: Option<&Path>) -> anyhow::Result<PathBuf> {
    let inputs = load_depth_inputs(config)?;
    let (primary, fallback) = fetch_adp(config, client).await?;
    let entries = build_ranking(config, &inputs, &primary, &fallback)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.resolve(&config.ranking.output));
    write_draft_order(&output, &entries)
        .with_context(|| format!("failed to write ranking to {}", output.display()))?;
    info!("Wrote {} ranked players to {}", entries.len(), output.display());
    Ok(output)
}
