// Average-draft-position client for the Fantasy Football Calculator REST API.
//
// GET {base}/adp/{format}?year={year}&teams={teams}&position={position}
//
// The response carries the total number of mock drafts recorded; players
// drafted in fewer than `min_draft_percentage` percent of them are noise and
// are dropped.

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://fantasyfootballcalculator.com/api/v1";
pub const DEFAULT_MIN_DRAFT_PERCENTAGE: f64 = 1.0;

/// Accepted scoring formats: (uppercase lookup key, value sent to the API).
pub const SCORING_FORMATS: &[(&str, &str)] = &[
    ("HALF-PPR", "half-ppr"),
    ("PPR", "ppr"),
    ("STANDARD", "standard"),
    ("ROOKIE", "rookie"),
];

/// Accepted position filters: (uppercase lookup key, value sent to the API).
pub const POSITIONS: &[(&str, &str)] = &[
    ("ALL", "all"),
    ("QB", "QB"),
    ("RB", "RB"),
    ("WR", "WR"),
    ("TE", "TE"),
    ("PK", "PK"),
    ("DEF", "DEF"),
];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum AdpError {
    #[error("invalid scoring format, expected one of {expected:?}, received: {received}")]
    InvalidScoringFormat {
        received: String,
        expected: Vec<&'static str>,
    },

    #[error("invalid position, expected one of {expected:?}, received: {received}")]
    InvalidPosition {
        received: String,
        expected: Vec<&'static str>,
    },

    #[error("ADP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ADP API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("ADP API rejected the request ({status}): {message}")]
    Rejected { status: String, message: String },

    #[error("unexpected ADP response: {0}")]
    Decode(#[from] serde_json::Error),
}

fn lookup(table: &[(&'static str, &'static str)], value: &str) -> Option<&'static str> {
    let upper = value.trim().to_uppercase();
    table.iter().find(|(key, _)| *key == upper).map(|(_, v)| *v)
}

fn keys(table: &[(&'static str, &'static str)]) -> Vec<&'static str> {
    table.iter().map(|(k, _)| *k).collect()
}

/// Validate a scoring format, returning the value the API expects.
pub fn valid_scoring_format(value: &str) -> Result<&'static str, AdpError> {
    lookup(SCORING_FORMATS, value).ok_or_else(|| AdpError::InvalidScoringFormat {
        received: value.to_string(),
        expected: keys(SCORING_FORMATS),
    })
}

/// Validate a position filter, returning the value the API expects.
pub fn valid_position(value: &str) -> Result<&'static str, AdpError> {
    lookup(POSITIONS, value).ok_or_else(|| AdpError::InvalidPosition {
        received: value.to_string(),
        expected: keys(POSITIONS),
    })
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A validated ADP query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdpRequest {
    pub scoring_format: &'static str,
    pub year: i32,
    pub number_of_teams: usize,
    pub position: &'static str,
}

impl AdpRequest {
    pub fn new(scoring_format: &str, year: i32, number_of_teams: usize, position: &str) -> Result<Self, AdpError> {
        Ok(Self {
            scoring_format: valid_scoring_format(scoring_format)?,
            year,
            number_of_teams,
            position: valid_position(position)?,
        })
    }

    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/adp/{}?year={}&teams={}&position={}",
            base_url.trim_end_matches('/'),
            self.scoring_format,
            self.year,
            self.number_of_teams,
            self.position
        )
    }
}

/// One player's ADP entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdpEntry {
    pub name: String,
    pub position: String,
    pub adp: f64,
    pub times_drafted: u64,
    #[serde(default)]
    pub team: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AdpMeta {
    total_drafts: u64,
}

#[derive(Debug, Deserialize)]
struct AdpResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
    meta: Option<AdpMeta>,
    #[serde(default)]
    players: Vec<AdpEntry>,
}

/// Decode a response body and drop entries under the noise floor.
pub fn parse_response(body: &str, min_draft_percentage: f64) -> Result<Vec<AdpEntry>, AdpError> {
    let response: AdpResponse = serde_json::from_str(body)?;

    if let Some(status) = response.status.as_deref() {
        if !status.eq_ignore_ascii_case("success") {
            let message = response
                .errors
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no error details".to_string());
            return Err(AdpError::Rejected {
                status: status.to_string(),
                message,
            });
        }
    }

    let Some(meta) = response.meta else {
        return Err(AdpError::Rejected {
            status: response.status.unwrap_or_default(),
            message: "response has no `meta.total_drafts`".to_string(),
        });
    };

    let min_value = meta.total_drafts as f64 * (min_draft_percentage / 100.0);
    let total = response.players.len();
    let players: Vec<AdpEntry> = response
        .players
        .into_iter()
        .filter(|p| p.times_drafted as f64 > min_value)
        .collect();
    debug!(
        total,
        kept = players.len(),
        min_value,
        "filtered ADP entries under the noise floor"
    );
    Ok(players)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct AdpClient {
    http: reqwest::Client,
    base_url: String,
    min_draft_percentage: f64,
}

impl AdpClient {
    pub fn new(base_url: impl Into<String>, min_draft_percentage: f64) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, min_draft_percentage)
    }

    /// Use a preconfigured HTTP client (timeouts, proxies).
    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>, min_draft_percentage: f64) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            min_draft_percentage,
        }
    }

    /// Fetch ADP for `request`. Any transport failure or non-success
    /// response is returned as an error; nothing is retried.
    pub async fn fetch(&self, request: &AdpRequest) -> Result<Vec<AdpEntry>, AdpError> {
        let url = request.url(&self.base_url);
        info!("Fetching ADP from {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AdpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let players = parse_response(&body, self.min_draft_percentage)?;
        info!(
            "ADP {} ({}): {} players above the noise floor",
            request.scoring_format, request.position, players.len()
        );
        Ok(players)
    }
}

impl Default for AdpClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_MIN_DRAFT_PERCENTAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const BODY: &str = r#"{
        "status": "Success",
        "meta": {"type": "PPR", "teams": 12, "total_drafts": 1000},
        "players": [
            {"player_id": 1, "name": "Jonathan Taylor", "position": "RB", "team": "IND", "adp": 1.3, "times_drafted": 800},
            {"player_id": 2, "name": "Deep Sleeper", "position": "WR", "team": "NYJ", "adp": 180.2, "times_drafted": 10},
            {"player_id": 3, "name": "Josh Allen", "position": "QB", "team": "BUF", "adp": 25.0, "times_drafted": 11}
        ]
    }"#;

    /// Serve one canned HTTP response on an ephemeral port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}")
    }

    fn local_client(base: String) -> AdpClient {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        AdpClient::with_http(http, base, 1.0)
    }

    // -- Validation --

    #[test]
    fn scoring_format_is_case_insensitive() {
        assert_eq!(valid_scoring_format("Half-PPR").unwrap(), "half-ppr");
        assert_eq!(valid_scoring_format("ppr").unwrap(), "ppr");
    }

    #[test]
    fn invalid_scoring_format_names_accepted_values() {
        let err = valid_scoring_format("superflex").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("superflex"));
        assert!(msg.contains("HALF-PPR"));
        assert!(msg.contains("ROOKIE"));
    }

    #[test]
    fn invalid_position_rejected() {
        let err = AdpRequest::new("ppr", 2022, 12, "FLEX").unwrap_err();
        assert!(matches!(err, AdpError::InvalidPosition { ref received, .. } if received == "FLEX"));
    }

    #[test]
    fn request_url_uses_api_values() {
        let req = AdpRequest::new("STANDARD", 2022, 12, "all").unwrap();
        assert_eq!(
            req.url("https://example.test/api/v1/"),
            "https://example.test/api/v1/adp/standard?year=2022&teams=12&position=all"
        );
    }

    // -- Response parsing --

    #[test]
    fn noise_floor_drops_rarely_drafted_players() {
        let players = parse_response(BODY, 1.0).unwrap();
        let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        // 1% of 1000 drafts = 10; exactly 10 is not above the floor.
        assert_eq!(names, vec!["Jonathan Taylor", "Josh Allen"]);
        assert_eq!(players[0].team.as_deref(), Some("IND"));
    }

    #[test]
    fn non_success_status_is_an_error() {
        let body = r#"{"status": "Error", "errors": ["Invalid year"]}"#;
        let err = parse_response(body, 1.0).unwrap_err();
        match err {
            AdpError::Rejected { status, message } => {
                assert_eq!(status, "Error");
                assert!(message.contains("Invalid year"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        assert!(matches!(parse_response("not json", 1.0), Err(AdpError::Decode(_))));
    }

    // -- HTTP round trip --

    #[tokio::test]
    async fn fetch_reads_and_filters_players() {
        let base = serve_once("200 OK", BODY).await;
        let client = local_client(base);
        let req = AdpRequest::new("ppr", 2022, 12, "all").unwrap();
        let players = client.fetch(&req).await.unwrap();
        assert_eq!(players.len(), 2);
    }

    #[tokio::test]
    async fn fetch_surfaces_http_failures() {
        let base = serve_once("500 Internal Server Error", "{\"oops\":true}").await;
        let client = local_client(base);
        let req = AdpRequest::new("ppr", 2022, 12, "all").unwrap();
        let err = client.fetch(&req).await.unwrap_err();
        assert!(matches!(err, AdpError::Status { status: 500, .. }));
    }
}
