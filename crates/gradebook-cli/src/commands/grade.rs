//! The `gradebook grade` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gradebook_core::config::load_config_from;
use gradebook_core::model::ScoringMode;
use gradebook_core::parser;
use gradebook_core::report::GradeReport;
use gradebook_core::{GradingEngine, SettingsOverride};
use gradebook_report::csv::write_csv_report;
use gradebook_report::html::write_html_report;

/// Command-line options of `gradebook grade`.
pub struct GradeArgs {
    pub project: PathBuf,
    pub threshold: Option<f64>,
    pub correction: Option<f64>,
    pub max_questions: Option<u32>,
    pub scoring_mode: Option<String>,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub config: Option<PathBuf>,
}

pub fn execute(args: GradeArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;

    let scoring_mode = args
        .scoring_mode
        .as_deref()
        .map(str::parse::<ScoringMode>)
        .transpose()
        .map_err(|e| anyhow::anyhow!("invalid --scoring-mode: {e}"))?;

    // Flags beat the project's own [settings] table.
    let flags = SettingsOverride {
        threshold: args.threshold,
        correction_error: args.correction,
        max_questions_to_answer: args.max_questions,
        scoring_mode,
        pass_grade: None,
    };

    let projects = parser::load_projects(&args.project)?;
    anyhow::ensure!(
        !projects.is_empty(),
        "no projects found in {}",
        args.project.display()
    );

    let output = args.output.unwrap_or_else(|| config.output_dir.clone());
    let format = args
        .format
        .unwrap_or_else(|| config.default_format.clone());
    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html", "csv"]
    } else {
        format.split(',').map(str::trim).collect()
    };

    let engine = GradingEngine::new(config.settings.clone());

    for mut project in projects {
        project.settings = project.settings.merged_with(&flags);

        let settings = engine.settings_for(&project);
        if let Err(errors) = settings.validate() {
            for error in errors {
                tracing::warn!("project {}: {}", project.id, error);
            }
        }

        eprintln!(
            "gradebook v{}: grading {} ({} students, {} indicators)",
            env!("CARGO_PKG_VERSION"),
            project.name,
            project.grids.len(),
            project.indicator_count()
        );

        let report = engine.run(&project);
        print_summary(&report);

        std::fs::create_dir_all(&output)?;
        let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");
        let stem = format!("{}-{timestamp}", project.id);

        for fmt in &formats {
            match *fmt {
                "json" => {
                    let path = output.join(format!("{stem}.json"));
                    report.save_json(&path)?;
                    eprintln!("Results saved to: {}", path.display());
                }
                "html" => {
                    let path = output.join(format!("{stem}.html"));
                    write_html_report(&report, &path)?;
                    eprintln!("HTML report: {}", path.display());
                }
                "csv" => {
                    let path = output.join(format!("{stem}.csv"));
                    write_csv_report(&report, &path)?;
                    eprintln!("CSV export: {}", path.display());
                }
                _ => {
                    eprintln!("Unknown format: {fmt}");
                }
            }
        }
    }

    Ok(())
}

fn print_summary(report: &GradeReport) {
    let mut table = Table::new();
    table.set_header(vec!["Student", "Name", "Points", "Grade", "Selection"]);

    for result in &report.results {
        table.add_row(vec![
            Cell::new(&result.student_id),
            Cell::new(&result.student_name),
            Cell::new(format!("{}/{}", result.total_points, result.max_points)),
            Cell::new(
                result
                    .outcome
                    .grade()
                    .map_or_else(|| "ungraded".to_string(), |g| format!("{g:.1}")),
            ),
            Cell::new(if result.auto_selected { "auto" } else { "" }),
        ]);
    }

    eprintln!("\n{table}");

    let stats = &report.statistics;
    if let Some(mean) = stats.mean_grade {
        eprintln!(
            "Mean {:.2} | {}/{} passed ({:.0}%)",
            mean,
            stats.pass_count,
            stats.graded_count,
            stats.pass_rate * 100.0
        );
    }
}
