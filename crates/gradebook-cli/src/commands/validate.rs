//! The `gradebook validate` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::config::load_config_from;
use gradebook_core::parser;

pub fn execute(project_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let projects = parser::load_projects(&project_path)?;

    let mut total_warnings = 0;

    for project in &projects {
        println!(
            "Project: {} ({} objectives, {} indicators, {} students)",
            project.name,
            project.objectives.len(),
            project.indicator_count(),
            project.grids.len()
        );

        let settings = config.settings.with_override(&project.settings);
        let warnings = parser::validate_project(project, &settings);
        for w in &warnings {
            let prefix = w
                .subject
                .as_ref()
                .map(|subject| format!("  [{subject}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All projects valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
