use std::path::Path;

use crate::error::Result;
use crate::layout::ChartLayout;
use crate::model::RawProject;

/// Load raw records from a JSON array.
pub fn load_records(path: &Path) -> Result<Vec<RawProject>> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Save raw records as a JSON array.
pub fn save_records(records: &[RawProject], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load records from `.csv` (or `.txt`) through the CSV importer, anything
/// else as JSON. Returns the records and the number of skipped CSV rows.
pub fn load_any(path: &Path) -> Result<(Vec<RawProject>, usize)> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv") || e.eq_ignore_ascii_case("txt"));
    if is_csv {
        super::csv_import::import_csv(path)
    } else {
        Ok((load_records(path)?, 0))
    }
}

/// Write a computed chart layout as JSON, for renderers outside this crate.
pub fn save_layout(layout: &ChartLayout, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(layout)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimelineError;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_records_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        let records = vec![
            RawProject::new("p1", "Website", "2024-01-01")
                .with_end("2024-02-01")
                .with_status("Active")
                .with_client("Acme"),
            RawProject::new("p2", "App", "2024-02-01").with_dependencies(["p1"]),
        ];
        save_records(&records, &path).unwrap();
        assert_eq!(load_records(&path).unwrap(), records);
    }

    #[test]
    fn load_any_picks_loader_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("tasks.CSV");
        std::fs::write(&csv_path, "id,name,start\na,Alpha,2024-01-01\n").unwrap();
        let (records, skipped) = load_any(&csv_path).unwrap();
        assert_eq!((records.len(), skipped), (1, 0));

        let json_path = dir.path().join("tasks.json");
        std::fs::write(&json_path, r#"[{"id": "a", "name": "Alpha", "start_date": "2024-01-01"}]"#)
            .unwrap();
        let (records, _) = load_any(&json_path).unwrap();
        assert_eq!(records[0].id, "a");
    }

    #[test]
    fn malformed_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "[{").unwrap();
        assert!(matches!(load_records(&path), Err(TimelineError::Json(_))));
        let missing = dir.path().join("missing.json");
        assert!(matches!(load_records(&missing), Err(TimelineError::Io(_))));
    }
}
