// Reference ranking scraped from a saved draft-order page.
//
// The page embeds a table with one player per row: the player link is the
// focusable anchor (`tabindex="0"`) and the position is in a `playerpos`
// span. Position rank is not on the page; it is the running count of each
// position in page order.

use std::collections::HashMap;
use std::path::Path;

use bestball_core::normalize::NameNormalizer;
use bestball_core::{PlayerRecord, Position};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::error::LoadError;

fn selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| format!("invalid selector `{css}`: {e}"))
}

fn first_text(row: &ElementRef, sel: &Selector) -> Option<String> {
    row.select(sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Extract the ranked players from the page source.
fn parse_html(html: &str, normalizer: &NameNormalizer) -> Result<Vec<PlayerRecord>, String> {
    let document = Html::parse_document(html);
    let row_selector = selector("tr")?;
    let name_selector = selector("a[tabindex=\"0\"]")?;
    let position_selector = selector("span.playerpos")?;

    let mut counts: HashMap<Position, usize> = HashMap::new();
    let mut records = Vec::new();

    for (row_index, row) in document.select(&row_selector).enumerate() {
        let Some(name) = first_text(&row, &name_selector) else {
            debug!("row {}: no player link, skipping", row_index);
            continue;
        };
        let Some(label) = first_text(&row, &position_selector) else {
            warn!("row {}: player '{}' has no position, skipping", row_index, name);
            continue;
        };
        let Some(position) = Position::from_str_pos(&label) else {
            warn!("row {}: player '{}' has unknown position '{}'", row_index, name, label);
            continue;
        };

        let rank = counts.entry(position).or_insert(0);
        *rank += 1;
        let key = normalizer.normalize(&name, 2);
        records.push(PlayerRecord::from_name_key(&key, position, *rank));
    }

    Ok(records)
}

/// Parse reference-page HTML that is already in memory.
pub fn parse_reference(html: &str, normalizer: &NameNormalizer) -> Result<Vec<PlayerRecord>, LoadError> {
    parse_html(html, normalizer).map_err(|message| LoadError::Format {
        path: "<inline>".into(),
        message,
    })
}

/// Load and parse a saved reference page.
pub fn load_reference(path: &Path, normalizer: &NameNormalizer) -> Result<Vec<PlayerRecord>, LoadError> {
    let html = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    parse_html(&html, normalizer).map_err(|message| LoadError::Format {
        path: path.display().to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, pos: &str) -> String {
        format!(
            "<tr><td><div><a href=\"#\" class=\"link\" tabindex=\"0\">{name}</a>\
             <span class=\"playerpos ttu\">{pos}</span></div></td></tr>"
        )
    }

    fn page(rows: &[String]) -> String {
        format!(
            "<html><body><table><thead><tr><th>Player</th></tr></thead><tbody>{}</tbody></table></body></html>",
            rows.concat()
        )
    }

    #[test]
    fn extracts_names_positions_and_running_ranks() {
        let html = page(&[
            row("Justin Jefferson", "WR"),
            row("Christian McCaffrey", "RB"),
            row("Ja'Marr Chase", "WR"),
            row("Josh Allen", "QB"),
        ]);
        let records = parse_reference(&html, &NameNormalizer::default()).unwrap();
        let summary: Vec<(String, Position, usize)> = records
            .iter()
            .map(|r| (r.name_key(), r.position, r.position_rank))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("justin_jefferson".to_string(), Position::WideReceiver, 1),
                ("christian_mccaffrey".to_string(), Position::RunningBack, 1),
                ("jamarr_chase".to_string(), Position::WideReceiver, 2),
                ("josh_allen".to_string(), Position::Quarterback, 1),
            ]
        );
    }

    #[test]
    fn misrendered_name_is_corrected() {
        let html = page(&[row("Gabe Davis", "WR")]);
        let records = parse_reference(&html, &NameNormalizer::with_default_aliases()).unwrap();
        assert_eq!(records[0].name_key(), "gabriel_davis");
    }

    #[test]
    fn names_truncated_to_two_parts() {
        let html = page(&[row("Kenneth Walker III", "RB"), row("Amon-Ra St. Brown", "WR")]);
        let records = parse_reference(&html, &NameNormalizer::default()).unwrap();
        assert_eq!(records[0].name_key(), "kenneth_walker");
        assert_eq!(records[1].name_key(), "amonra_st");
    }

    #[test]
    fn defenses_are_counted_under_their_own_position() {
        let html = page(&[row("Bills D/ST", "D/ST"), row("Cowboys D/ST", "d/st")]);
        let records = parse_reference(&html, &NameNormalizer::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].position, Position::Defense);
        assert_eq!(records[1].position_rank, 2);
    }

    #[test]
    fn rows_without_player_or_position_are_skipped() {
        let html = page(&[
            "<tr><td>spacer</td></tr>".to_string(),
            "<tr><td><a tabindex=\"0\">No Position</a></td></tr>".to_string(),
            row("Travis Kelce", "TE"),
        ]);
        let records = parse_reference(&html, &NameNormalizer::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name_key(), "travis_kelce");
        assert_eq!(records[0].position_rank, 1);
    }

    #[test]
    fn empty_page_yields_no_records() {
        let records = parse_reference("<html></html>", &NameNormalizer::default()).unwrap();
        assert!(records.is_empty());
    }
}
