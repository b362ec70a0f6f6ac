//! The `gradebook init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("gradebook.toml").exists() {
        println!("gradebook.toml already exists, skipping.");
    } else {
        std::fs::write("gradebook.toml", SAMPLE_CONFIG)?;
        println!("Created gradebook.toml");
    }

    std::fs::create_dir_all("projects")?;
    let example_path = std::path::Path::new("projects/example.toml");
    if example_path.exists() {
        println!("projects/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_PROJECT)?;
        println!("Created projects/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Adjust the grading settings in gradebook.toml");
    println!("  2. Run: gradebook validate --project projects/example.toml");
    println!("  3. Run: gradebook grade --project projects/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gradebook configuration

output_dir = "./gradebook-reports"
default_format = "json,html"

[settings]
# Share of the points that earns grade 4.
threshold = 0.6
# Added to every grade before clamping to 1-6.
correction_error = 0.0
# "weighted" (scores 0-3 times weights) or "raw-points".
scoring_mode = "weighted"
pass_grade = 4.0
# max_questions_to_answer = 3
"#;

const EXAMPLE_PROJECT: &str = r#"[project]
id = "example"
name = "Example test"
description = "A short test to get started"

[[objectives]]
id = "reading"
weight = 1

[[objectives.indicators]]
id = "main-idea"
weight = 2
question_number = 1

[[objectives.indicators]]
id = "details"
weight = 1
question_number = 2

[[objectives]]
id = "writing"
weight = 2

[[objectives.indicators]]
id = "structure"
weight = 1
question_number = 3

[[students]]
id = "s1"
name = "First student"
evaluations = [
    { objective = "reading", indicator = "main-idea", score = 3 },
    { objective = "reading", indicator = "details", score = 2 },
    { objective = "writing", indicator = "structure", score = 2 },
]

[[students]]
id = "s2"
name = "Second student"
evaluations = [
    { objective = "reading", indicator = "main-idea", score = 1 },
    { objective = "reading", indicator = "details", score = 2 },
    { objective = "writing", indicator = "structure", score = 1 },
]
"#;
