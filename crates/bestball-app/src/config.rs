// Configuration loading and parsing (league.toml, ranking.toml).

use chrono::Datelike;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use bestball_core::compare::DEFAULT_NUMBER_OF_TEAMS;
use bestball_core::normalize::NameNormalizer;
use bestball_core::Position;
use bestball_data::adp::{self, DEFAULT_BASE_URL, DEFAULT_MIN_DRAFT_PERCENTAGE};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the relative paths below are resolved against.
    pub root: PathBuf,
    pub league: LeagueConfig,
    pub paths: PathsConfig,
    pub aliases: BTreeMap<String, String>,
    pub ranking: RankingConfig,
}

impl Config {
    /// Resolve a configured path against the config root.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }

    /// Season queried from the ADP service: `adp.year`, else `league.year`,
    /// else the current calendar year.
    pub fn adp_year(&self) -> i32 {
        self.ranking
            .adp
            .year
            .or(self.league.year)
            .unwrap_or_else(|| chrono::Local::now().year())
    }

    /// Name normalizer carrying the configured alias corrections.
    pub fn normalizer(&self) -> NameNormalizer {
        NameNormalizer::new(self.aliases.clone().into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire league.toml file.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
    paths: PathsConfig,
    #[serde(default)]
    aliases: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    #[serde(default = "default_num_teams")]
    pub num_teams: usize,
    /// Season year. Defaults to the current calendar year.
    #[serde(default)]
    pub year: Option<i32>,
    /// League-default team order (week-1 waiver order). Empty defers to the
    /// league snapshot's own list.
    #[serde(default)]
    pub teams: Vec<String>,
    /// Teams whose submitted draft order is validated.
    #[serde(default)]
    pub draft_order_teams: Vec<String>,
}

fn default_num_teams() -> usize {
    DEFAULT_NUMBER_OF_TEAMS
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Directory of `<team>.csv` draft-order files.
    pub draft_orders: String,
    /// Directory of `<team>.html` saved reference pages.
    pub reference_pages: String,
    /// Directory holding `league.json` and `week_<n>.json`.
    pub league_snapshot: String,
    pub scores_output: String,
}

// ---------------------------------------------------------------------------
// ranking.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct RankingFile {
    adp: AdpConfig,
    limits: LimitsConfig,
    depth_charts: DepthChartPaths,
    output: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdpConfig {
    pub primary_format: String,
    pub fallback_format: Option<String>,
    pub year: Option<i32>,
    pub number_of_teams: usize,
    #[serde(default = "default_adp_position")]
    pub position: String,
    #[serde(default = "default_min_draft_percentage")]
    pub min_draft_percentage: f64,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_adp_position() -> String {
    "all".into()
}

fn default_min_draft_percentage() -> f64 {
    DEFAULT_MIN_DRAFT_PERCENTAGE
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

/// Per-position multipliers, applied as `limit * league_size`.
#[derive(Debug, Clone, Deserialize)]
#[allow(non_snake_case)]
pub struct LimitsConfig {
    pub league_size: usize,
    pub RB: usize,
    pub WR: usize,
    pub QB: usize,
    pub TE: usize,
}

impl LimitsConfig {
    /// (position, rows kept) in output order.
    pub fn per_position(&self) -> [(Position, usize); 4] {
        [
            (Position::RunningBack, self.RB * self.league_size),
            (Position::WideReceiver, self.WR * self.league_size),
            (Position::Quarterback, self.QB * self.league_size),
            (Position::TightEnd, self.TE * self.league_size),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepthChartPaths {
    pub historical: String,
    #[serde(default = "default_historical_week")]
    pub historical_week: u32,
    pub seasonal_points: String,
    pub current: String,
}

fn default_historical_week() -> u32 {
    1
}

/// The public ranking config assembled from ranking.toml.
#[derive(Debug, Clone)]
pub struct RankingConfig {
    pub adp: AdpConfig,
    pub limits: LimitsConfig,
    pub depth_charts: DepthChartPaths,
    pub output: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/ranking.toml` relative to `base_dir`. Does not copy defaults.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    // --- ranking.toml ---
    let ranking_path = config_dir.join("ranking.toml");
    let ranking_text = read_file(&ranking_path)?;
    let ranking_file: RankingFile =
        toml::from_str(&ranking_text).map_err(|e| ConfigError::ParseError {
            path: ranking_path.clone(),
            source: e,
        })?;

    let aliases = league_file.aliases.unwrap_or_else(|| {
        NameNormalizer::with_default_aliases()
            .aliases()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    });

    let config = Config {
        root: base_dir.to_path_buf(),
        league: league_file.league,
        paths: league_file.paths,
        aliases,
        ranking: RankingConfig {
            adp: ranking_file.adp,
            limits: ranking_file.limits,
            depth_charts: ranking_file.depth_charts,
            output: ranking_file.output,
        },
    };

    validate(&config)?;

    Ok(config)
}

/// The files `load_config_from` reads from `config/`.
pub const CONFIG_FILES: &[&str] = &["league.toml", "ranking.toml"];

/// Copy each of [`CONFIG_FILES`] missing from `config/` out of `defaults/`.
/// Returns the files that were created. Existing files are never touched.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or pass --root",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for name in CONFIG_FILES {
        let source = defaults_dir.join(name);
        // Nothing to copy; load_config_from reports the missing file.
        if !source.is_file() {
            continue;
        }
        let target = config_dir.join(name);

        // create_new so a file written since the check is not clobbered
        let mut dest = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(dest) => dest,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        };
        let mut src = std::fs::File::open(&source).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read {}: {e}", source.display()),
        })?;
        std::io::copy(&mut src, &mut dest).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to write {}: {e}", target.display()),
        })?;
        copied.push(target);
    }

    Ok(copied)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.num_teams == 0 {
        return Err(invalid("league.num_teams", "must be greater than 0"));
    }

    let mut seen = std::collections::HashSet::new();
    for team in &config.league.teams {
        if !seen.insert(team.as_str()) {
            return Err(invalid("league.teams", format!("`{team}` listed more than once")));
        }
    }

    let adp = &config.ranking.adp;
    adp::valid_scoring_format(&adp.primary_format)
        .map_err(|e| invalid("adp.primary_format", e.to_string()))?;
    if let Some(fallback) = &adp.fallback_format {
        adp::valid_scoring_format(fallback)
            .map_err(|e| invalid("adp.fallback_format", e.to_string()))?;
    }
    adp::valid_position(&adp.position).map_err(|e| invalid("adp.position", e.to_string()))?;
    if adp.number_of_teams == 0 {
        return Err(invalid("adp.number_of_teams", "must be greater than 0"));
    }
    if !(0.0..100.0).contains(&adp.min_draft_percentage) {
        return Err(invalid(
            "adp.min_draft_percentage",
            format!("must be in [0, 100), got {}", adp.min_draft_percentage),
        ));
    }

    let limits = &config.ranking.limits;
    let limit_fields: &[(&str, usize)] = &[
        ("limits.league_size", limits.league_size),
        ("limits.RB", limits.RB),
        ("limits.WR", limits.WR),
        ("limits.QB", limits.QB),
        ("limits.TE", limits.TE),
    ];
    for (name, val) in limit_fields {
        if *val == 0 {
            return Err(invalid(name, "must be > 0"));
        }
    }

    if config.ranking.depth_charts.historical_week == 0 {
        return Err(invalid("depth_charts.historical_week", "must be >= 1"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
