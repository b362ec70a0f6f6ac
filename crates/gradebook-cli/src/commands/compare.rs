//! The `gradebook compare` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::report::{GradeChange, GradeReport};

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    tolerance: f64,
    fail_on_lowered: bool,
    format: String,
) -> Result<()> {
    anyhow::ensure!(tolerance >= 0.0, "tolerance must not be negative");

    let baseline = GradeReport::load_json(&baseline_path)?;
    let current = GradeReport::load_json(&current_path)?;

    if baseline.project.id != current.project.id {
        tracing::warn!(
            "comparing different projects: {} and {}",
            baseline.project.id,
            current.project.id
        );
    }

    let report = current.compare(&baseline, tolerance);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!(
                "Comparison: {} lowered, {} raised, {} unchanged",
                report.lowered.len(),
                report.raised.len(),
                report.unchanged
            );

            print_changes("Lowered", &report.lowered);
            print_changes("Raised", &report.raised);

            if report.new_students > 0 {
                println!("\n{} new student(s)", report.new_students);
            }
            if report.removed_students > 0 {
                println!("{} removed student(s)", report.removed_students);
            }
        }
    }

    if fail_on_lowered && report.has_lowered() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_changes(title: &str, changes: &[GradeChange]) {
    if changes.is_empty() {
        return;
    }
    println!("\n{title}:");
    for c in changes {
        println!(
            "  {} ({}) {:.1} -> {:.1} ({:+.1})",
            c.student_id, c.student_name, c.baseline_grade, c.current_grade, c.delta
        );
    }
}
