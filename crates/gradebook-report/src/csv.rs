//! CSV grade table, one row per student.
//!
//! Columns: `student_id`, `name`, one `O<number>` column per objective with the
//! earned points, then `total`, `max` and `grade`. Ungraded students get an
//! empty grade cell.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use gradebook_core::report::GradeReport;

/// Write the grade table of a report to any writer.
pub fn write_csv<W: Write>(report: &GradeReport, writer: W) -> Result<()> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);

    let mut header = vec!["student_id".to_string(), "name".to_string()];
    header.extend(
        report
            .project
            .objectives
            .iter()
            .map(|o| format!("O{}", o.number)),
    );
    header.extend(["total", "max", "grade"].map(String::from));
    csv_writer.write_record(&header)?;

    for result in &report.results {
        let mut record = vec![result.student_id.clone(), result.student_name.clone()];
        for objective in &report.project.objectives {
            let points = result
                .objectives
                .iter()
                .find(|o| o.objective_id == objective.id)
                .map(|o| o.total_points.to_string())
                .unwrap_or_default();
            record.push(points);
        }
        record.push(result.total_points.to_string());
        record.push(result.max_points.to_string());
        record.push(
            result
                .outcome
                .grade()
                .map(|g| format!("{g:.1}"))
                .unwrap_or_default(),
        );
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the grade table of a report to a file, creating parent directories.
pub fn write_csv_report(report: &GradeReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(report, file)
}
