use std::collections::HashMap;
use std::path::Path;

use uuid::Uuid;

use crate::error::{Result, TimelineError};
use crate::model::RawProject;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Id,
    Name,
    Start,
    End,
    Status,
    Priority,
    Client,
    Dependencies,
    ProjectId,
    ProjectName,
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

/// Normalize a header string to a canonical column key.
fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

fn header_to_column(normalized: &str) -> Option<Column> {
    match normalized {
        "id" | "taskid" | "key" => Some(Column::Id),
        "name" | "task" | "tasklabel" | "taskname" | "label" | "title" | "activity" => {
            Some(Column::Name)
        }
        "start" | "startdate" | "from" | "begin" | "begindate" => Some(Column::Start),
        "end" | "enddate" | "to" | "finish" | "finishdate" | "due" | "duedate" => {
            Some(Column::End)
        }
        "status" | "state" | "stage" => Some(Column::Status),
        "priority" | "pri" | "importance" => Some(Column::Priority),
        "client" | "clientname" | "customer" => Some(Column::Client),
        "dependencies" | "dependson" | "predecessors" | "after" => Some(Column::Dependencies),
        "projectid" => Some(Column::ProjectId),
        "project" | "projectname" => Some(Column::ProjectName),
        _ => None,
    }
}

/// Stable identifier for a row that carries no ID column.
fn synthesized_id(row: usize, name: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{row}:{name}").as_bytes()).to_string()
}

fn split_list(field: &str) -> Vec<String> {
    field
        .split([',', '|'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Import raw records from a CSV file. See [`import_csv_str`].
pub fn import_csv(path: &Path) -> Result<(Vec<RawProject>, usize)> {
    let content = std::fs::read_to_string(path)?;
    import_csv_str(&content)
}

/// Parse raw records from CSV text.
///
/// Auto-detects the delimiter (comma, semicolon, tab) and matches column
/// headers flexibly ("Task Label", "Start Date", ...). Dates are kept as
/// text; the normalizer validates them. Rows without a name are skipped.
/// Dependencies may name other rows by ID or by task name.
/// Returns `(records, skipped_count)`.
pub fn import_csv_str(content: &str) -> Result<(Vec<RawProject>, usize)> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let columns: Vec<Option<Column>> = headers
        .iter()
        .map(|h| header_to_column(&normalize_header(h)))
        .collect();

    let has = |c: Column| columns.contains(&Some(c));
    if !has(Column::Name) || !has(Column::Start) {
        let found: Vec<&str> = headers.iter().collect();
        return Err(TimelineError::validation(
            "header",
            "columns",
            format!(
                "CSV is missing required columns. Found headers: {found:?}. \
                 Need columns for: task name, start date."
            ),
        ));
    }

    let mut records: Vec<RawProject> = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(row = i + 2, error = %e, "skipping unreadable CSV row");
                skipped += 1;
                continue;
            }
        };

        let mut record = RawProject::default();
        for (field, column) in row.iter().zip(&columns) {
            let value = field.trim();
            match column {
                Some(Column::Id) => record.id = value.to_string(),
                Some(Column::Name) => record.name = value.to_string(),
                Some(Column::Start) => record.start_date = Some(value.to_string()),
                Some(Column::End) => {
                    record.end_date = (!value.is_empty()).then(|| value.to_string())
                }
                Some(Column::Status) => record.status = value.to_string(),
                Some(Column::Priority) => {
                    record.priority = (!value.is_empty()).then(|| value.to_string())
                }
                Some(Column::Client) => record.client_name = value.to_string(),
                Some(Column::Dependencies) => record.dependencies = split_list(value),
                Some(Column::ProjectId) => {
                    record.project_id = (!value.is_empty()).then(|| value.to_string())
                }
                Some(Column::ProjectName) => {
                    record.project_name = (!value.is_empty()).then(|| value.to_string())
                }
                None => {}
            }
        }

        if record.name.is_empty() {
            tracing::warn!(row = i + 2, "skipping CSV row without a task name");
            skipped += 1;
            continue;
        }
        if record.id.is_empty() {
            record.id = synthesized_id(i, &record.name);
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(TimelineError::validation(
            "body",
            "rows",
            if skipped > 0 {
                format!("no valid rows found in CSV ({skipped} rows skipped)")
            } else {
                "CSV file is empty or has no data rows".to_string()
            },
        ));
    }

    // Second pass: dependencies may refer to a task by name rather than ID.
    let ids: std::collections::HashSet<String> = records.iter().map(|r| r.id.clone()).collect();
    let name_to_id: HashMap<String, String> = records
        .iter()
        .map(|r| (r.name.to_lowercase(), r.id.clone()))
        .collect();
    for record in &mut records {
        for dep in &mut record.dependencies {
            if ids.contains(dep.as_str()) {
                continue;
            }
            match name_to_id.get(&dep.to_lowercase()) {
                Some(id) => *dep = id.clone(),
                None => {
                    tracing::warn!(task = %record.id, dependency = %dep, "dependency not found in CSV")
                }
            }
        }
    }

    Ok((records, skipped))
}
