use crate::model::Mention;
use chrono::NaiveDate;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const CSV_HEADERS: [&str; 6] = ["ID", "Text", "Platform", "Sentiment", "Score", "Created At"];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No records to download")]
    Empty,
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("mentions-{}.csv", date.format("%Y-%m-%d"))
}

/// Writes one row per mention. Only the Text cell is quoted, with embedded
/// quotes doubled; scores get two decimals and timestamps are written as
/// received.
pub fn write_csv<W: Write>(writer: W, rows: &[Mention]) -> Result<(), ExportError> {
    if rows.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(CSV_HEADERS)?;
    for mention in rows {
        csv_writer.write_record([
            mention.id.to_string(),
            quote_text(&mention.text),
            mention.platform.to_string(),
            mention.sentiment.to_string(),
            format!("{:.2}", mention.score()),
            mention.created_at_literal().into_owned(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn quote_text(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// Exports into `dir` under the dated filename and returns the written path.
pub fn export_to_dir(dir: &Path, rows: &[Mention], date: NaiveDate) -> Result<PathBuf, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::Empty);
    }
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(date));
    let file = std::fs::File::create(&path)?;
    write_csv(file, rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "exported mentions");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Platform, Sentiment};
    use chrono::{TimeZone, Utc};

    fn mention(id: i64, text: &str, score: Option<f64>) -> Mention {
        Mention {
            id,
            text: text.to_string(),
            platform: Platform::News,
            url: format!("https://example.com/mention/{id}"),
            sentiment: Sentiment::Neutral,
            sentiment_score: score,
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, 15, 0).unwrap(),
            created_at_raw: None,
        }
    }

    fn render(rows: &[Mention]) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, rows).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        let output = render(&[mention(4, r#"He said "hi""#, Some(0.5))]);
        assert!(output.contains(r#""He said ""hi""""#), "got {output}");
    }

    #[test]
    fn test_row_layout() {
        let output = render(&[mention(12, "Plain text", Some(-0.456))]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "ID,Text,Platform,Sentiment,Score,Created At"
        );
        assert_eq!(
            lines[1],
            r#"12,"Plain text",News,neutral,-0.46,2024-06-01T08:15:00.000Z"#
        );
    }

    #[test]
    fn test_created_at_is_exported_as_received() {
        let mut row = mention(3, "Offset time", Some(0.2));
        row.created_at_raw = Some("2024-06-01T22:00:00-05:00".to_string());
        let output = render(&[row]);
        assert!(output.ends_with(",0.20,2024-06-01T22:00:00-05:00\n"), "got {output}");
    }

    #[test]
    fn test_missing_score_exports_as_zero() {
        let output = render(&[mention(1, "No score", None)]);
        assert!(output.contains(",0.00,"));
    }

    #[test]
    fn test_commas_in_text_stay_in_one_cell() {
        let output = render(&[mention(1, "Good, fast, cheap", Some(0.0))]);
        let mut reader = csv::Reader::from_reader(output.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[1], "Good, fast, cheap");
        assert_eq!(record.len(), 6);
    }

    #[test]
    fn test_empty_export_is_refused() {
        let mut buf = Vec::new();
        assert!(matches!(write_csv(&mut buf, &[]), Err(ExportError::Empty)));
    }

    #[test]
    fn test_export_to_dir_uses_dated_name() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let path = export_to_dir(dir.path(), &[mention(1, "x", Some(0.1))], date).unwrap();
        assert_eq!(path.file_name().unwrap(), "mentions-2024-06-02.csv");
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.starts_with("ID,Text,"));
    }
}
