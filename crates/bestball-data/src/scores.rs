// Weekly score table written as CSV: `week,<team>...`, one `Week <n>` row
// per scored week. A team without a score that week (bye) gets an empty cell.

use std::io::Write;
use std::path::Path;

use bestball_core::table::ScoreTable;

use crate::error::LoadError;

fn format_score(score: Option<f64>) -> String {
    score.map(|s| format!("{s}")).unwrap_or_default()
}

fn write_to_writer<W: Write>(wtr: W, table: &ScoreTable) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(wtr);

    let mut header = vec!["week".to_string()];
    header.extend(table.teams().iter().cloned());
    writer.write_record(&header)?;

    for row in table.weeks() {
        let mut record = vec![format!("Week {}", row.week)];
        record.extend(table.teams().iter().map(|team| format_score(row.score(team))));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Render the table to a CSV string.
pub fn render_scores(table: &ScoreTable) -> Result<String, LoadError> {
    let mut buf = Vec::new();
    write_to_writer(&mut buf, table).map_err(|source| LoadError::Csv {
        path: "<memory>".into(),
        source,
    })?;
    String::from_utf8(buf).map_err(|e| LoadError::Format {
        path: "<memory>".into(),
        message: e.to_string(),
    })
}

/// Write the table to `path`, creating parent directories as needed.
pub fn write_scores(path: &Path, table: &ScoreTable) -> Result<(), LoadError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| LoadError::io(parent, e))?;
    }
    let file = std::fs::File::create(path).map_err(|e| LoadError::io(path, e))?;
    write_to_writer(file, table).map_err(|e| LoadError::csv(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_row_per_week_with_empty_bye_cells() {
        let mut table = ScoreTable::new();
        table.insert(1, "Alpha", 101.5).unwrap();
        table.insert(1, "Beta", 88.0).unwrap();
        table.insert(2, "Beta", 92.25).unwrap();

        let text = render_scores(&table).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["week,Alpha,Beta", "Week 1,101.5,88", "Week 2,,92.25"]);
    }

    #[test]
    fn empty_table_writes_header_only() {
        let text = render_scores(&ScoreTable::new()).unwrap();
        assert_eq!(text.trim(), "week");
    }
}
