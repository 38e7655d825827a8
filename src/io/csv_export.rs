use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::model::{Task, TaskId};

/// Export tasks to a semicolon-delimited CSV file the importer can read
/// back. Returns the number of tasks written.
pub fn export_csv(tasks: &[Task], critical_path: &[TaskId], path: &Path) -> Result<usize> {
    let file = std::fs::File::create(path)?;
    write_csv(tasks, critical_path, file)
}

/// Columns: ID ; Task Label ; Start Date ; End Date ; Status ; Priority ;
/// Client ; Depends On ; Progress ; Critical. Dates are DD/MM/YYYY,
/// progress is a whole percentage.
pub fn write_csv<W: Write>(tasks: &[Task], critical_path: &[TaskId], writer: W) -> Result<usize> {
    let critical: HashSet<&str> = critical_path.iter().map(String::as_str).collect();
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record([
        "ID",
        "Task Label",
        "Start Date",
        "End Date",
        "Status",
        "Priority",
        "Client",
        "Depends On",
        "Progress",
        "Critical",
    ])?;

    for task in tasks {
        wtr.write_record([
            task.id.as_str(),
            task.name.as_str(),
            &task.start.format("%d/%m/%Y").to_string(),
            &task.end.format("%d/%m/%Y").to_string(),
            task.status.as_str(),
            task.priority.as_str(),
            task.client_name.as_str(),
            &task.dependencies.join(","),
            &format!("{}", (task.progress * 100.0).round() as i32),
            if critical.contains(task.id.as_str()) { "yes" } else { "no" },
        ])?;
    }

    wtr.flush()?;
    Ok(tasks.len())
}
