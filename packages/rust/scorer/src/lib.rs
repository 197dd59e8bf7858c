//! Lead scoring: CSV in, scored and re-ranked CSV out.
//!
//! The input file is typically the fetcher's export *after* external
//! enrichment has added the `Current Position` and `Locality` columns (the
//! fetcher itself never emits them — see the required-column check below).
//! The input is never mutated; a new file with a `Probability Score` column
//! appended is written, sorted descending by score.

mod rules;

use std::path::Path;

use tracing::{info, instrument};

use leadpipe_shared::{LeadPipeError, Result, ScoreConfig};

pub use rules::{HUB_POINTS, INTENT_POINTS, MAX_SCORE, ROLE_POINTS, ScoreInput, TECH_POINTS, score};

/// Name of the appended score column.
pub const SCORE_COLUMN: &str = "Probability Score";

/// Columns the scorer reads. A missing column is fatal for the whole run;
/// a missing cell in a row is read as the empty string.
const REQUIRED_COLUMNS: [&str; 3] = ["Paper Title", "Current Position", "Locality"];

// ---------------------------------------------------------------------------
// ScoreReport
// ---------------------------------------------------------------------------

/// Summary of a completed scoring run.
#[derive(Debug, Clone)]
pub struct ScoreReport {
    /// Number of rows scored (output row count equals input row count).
    pub rows: usize,
    /// Highest score in the batch, if any rows were present.
    pub top_score: Option<u32>,
}

// ---------------------------------------------------------------------------
// Batch driver
// ---------------------------------------------------------------------------

/// Score every row of the input CSV and write the re-ranked output CSV.
///
/// All input columns are preserved in their original order, with
/// [`SCORE_COLUMN`] appended. Ties keep their input order (stable sort).
#[instrument(skip_all, fields(input = %config.input_path.display()))]
pub fn run(config: &ScoreConfig) -> Result<ScoreReport> {
    let mut reader = csv::Reader::from_path(&config.input_path)
        .map_err(|e| LeadPipeError::Export(format!("{}: {e}", config.input_path.display())))?;

    let headers = reader
        .headers()
        .map_err(|e| LeadPipeError::Export(e.to_string()))?
        .clone();

    let columns = resolve_columns(&headers, &config.input_path)?;

    // Read and score everything up front; the sort needs the full batch anyway.
    let mut scored: Vec<(csv::StringRecord, u32)> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| LeadPipeError::Export(e.to_string()))?;
        let points = score(&ScoreInput {
            paper_title: cell(&record, columns.paper_title),
            current_position: cell(&record, columns.current_position),
            locality: cell(&record, columns.locality),
        });
        scored.push((record, points));
    }

    // Stable descending sort: equal scores keep their input order.
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    write_output(&config.output_path, &headers, &scored)?;

    let report = ScoreReport {
        rows: scored.len(),
        top_score: scored.first().map(|(_, s)| *s),
    };

    info!(
        rows = report.rows,
        top_score = ?report.top_score,
        output = %config.output_path.display(),
        "scoring complete"
    );

    Ok(report)
}

/// Header indexes of the three scored columns.
struct ScoredColumns {
    paper_title: usize,
    current_position: usize,
    locality: usize,
}

fn resolve_columns(headers: &csv::StringRecord, input_path: &Path) -> Result<ScoredColumns> {
    let find = |name: &str| -> Result<usize> {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            LeadPipeError::validation(format!(
                "input CSV {} has no '{name}' column — the scorer expects an \
                 enriched export with columns {REQUIRED_COLUMNS:?}",
                input_path.display()
            ))
        })
    };

    Ok(ScoredColumns {
        paper_title: find(REQUIRED_COLUMNS[0])?,
        current_position: find(REQUIRED_COLUMNS[1])?,
        locality: find(REQUIRED_COLUMNS[2])?,
    })
}

/// A cell by index, with absent/short rows read as the empty string.
fn cell(record: &csv::StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("")
}

fn write_output(
    path: &Path,
    headers: &csv::StringRecord,
    scored: &[(csv::StringRecord, u32)],
) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).map_err(|e| LeadPipeError::Export(e.to_string()))?;

    let mut header_row = headers.clone();
    header_row.push_field(SCORE_COLUMN);
    writer
        .write_record(&header_row)
        .map_err(|e| LeadPipeError::Export(e.to_string()))?;

    for (record, points) in scored {
        let mut row = record.clone();
        row.push_field(&points.to_string());
        writer
            .write_record(&row)
            .map_err(|e| LeadPipeError::Export(e.to_string()))?;
    }

    writer.flush().map_err(|e| LeadPipeError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_csv(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("leadpipe-scorer-{name}-{}.csv", std::process::id()))
    }

    fn score_config(input: &Path, output: &Path) -> ScoreConfig {
        ScoreConfig {
            input_path: input.to_path_buf(),
            output_path: output.to_path_buf(),
        }
    }

    const ENRICHED_CSV: &str = "\
Name,Paper Title,Affiliation,Source,Current Position,Locality
Low Lead,Protein folding review,Somewhere U,PubMed Automated Script,Postdoc,Berlin
Top Lead,3D organoid model of hepatic injury,Example Institute,PubMed Automated Script,Toxicology Safety Lead,\"Cambridge, UK\"
Mid Lead,Liver fibrosis markers,Another U,PubMed Automated Script,Lecturer,Madrid
Tied Lead,DILI case series,Clinic,PubMed Automated Script,Radiologist,Lisbon
";

    fn run_on(content: &str, name: &str) -> (Result<ScoreReport>, PathBuf) {
        let input = temp_csv(&format!("{name}-in"));
        let output = temp_csv(&format!("{name}-out"));
        std::fs::write(&input, content).unwrap();
        let result = run(&score_config(&input, &output));
        let _ = std::fs::remove_file(&input);
        (result, output)
    }

    fn read_rows(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::Reader::from_path(path).unwrap();
        let headers = reader.headers().unwrap().iter().map(String::from).collect();
        let rows = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        (headers, rows)
    }

    #[test]
    fn output_is_sorted_descending_with_stable_ties() {
        let (result, output) = run_on(ENRICHED_CSV, "sort");
        let report = result.unwrap();
        assert_eq!(report.rows, 4);
        assert_eq!(report.top_score, Some(95));

        let (headers, rows) = read_rows(&output);
        assert_eq!(headers.last().map(String::as_str), Some(SCORE_COLUMN));
        assert_eq!(rows.len(), 4);

        let scores: Vec<u32> = rows
            .iter()
            .map(|r| r.last().unwrap().parse().unwrap())
            .collect();
        for pair in scores.windows(2) {
            assert!(pair[0] >= pair[1], "not sorted: {scores:?}");
        }

        // Mid Lead and Tied Lead both score 40; input order is preserved.
        assert_eq!(rows[0][0], "Top Lead");
        assert_eq!(rows[1][0], "Mid Lead");
        assert_eq!(rows[2][0], "Tied Lead");
        assert_eq!(rows[3][0], "Low Lead");

        let _ = std::fs::remove_file(&output);
    }

    #[test]
    fn all_input_columns_are_preserved() {
        let (result, output) = run_on(ENRICHED_CSV, "columns");
        result.unwrap();

        let (headers, rows) = read_rows(&output);
        assert_eq!(
            headers,
            vec![
                "Name",
                "Paper Title",
                "Affiliation",
                "Source",
                "Current Position",
                "Locality",
                SCORE_COLUMN,
            ]
        );
        // Affiliation content survives untouched (and never affects the score).
        assert_eq!(rows[0][2], "Example Institute");

        let _ = std::fs::remove_file(&output);
    }

    #[test]
    fn empty_cells_contribute_nothing() {
        let csv = "\
Name,Paper Title,Current Position,Locality
Blank Lead,,,
";
        let (result, output) = run_on(csv, "blank");
        let report = result.unwrap();
        assert_eq!(report.rows, 1);
        assert_eq!(report.top_score, Some(0));

        let _ = std::fs::remove_file(&output);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let csv = "\
Name,Paper Title,Locality
Someone,Liver study,Boston
";
        let (result, _output) = run_on(csv, "missing-column");
        let err = result.unwrap_err();
        assert!(matches!(err, LeadPipeError::Validation { .. }));
        assert!(err.to_string().contains("Current Position"));
    }

    #[test]
    fn missing_input_file_is_fatal() {
        let config = score_config(
            Path::new("/nonexistent/leads.csv"),
            &temp_csv("missing-input-out"),
        );
        assert!(run(&config).is_err());
    }

    #[test]
    fn empty_input_produces_empty_output() {
        let csv = "Name,Paper Title,Current Position,Locality\n";
        let (result, output) = run_on(csv, "empty");
        let report = result.unwrap();
        assert_eq!(report.rows, 0);
        assert_eq!(report.top_score, None);

        let (_, rows) = read_rows(&output);
        assert!(rows.is_empty());

        let _ = std::fs::remove_file(&output);
    }
}
