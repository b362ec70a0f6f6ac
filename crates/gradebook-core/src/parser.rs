//! TOML project parser.
//!
//! Loads projects (rubric, students, and their scores) from TOML files and
//! directories, and validates them.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Evaluation, Indicator, Objective, Project, Student, StudentGrid, MAX_SCORE};
use crate::settings::{GradingSettings, SettingsOverride};

/// Intermediate TOML structure for parsing project files.
#[derive(Debug, Deserialize)]
struct TomlProjectFile {
    project: TomlProjectHeader,
    #[serde(default)]
    settings: SettingsOverride,
    #[serde(default)]
    objectives: Vec<TomlObjective>,
    #[serde(default)]
    students: Vec<TomlStudent>,
}

#[derive(Debug, Deserialize)]
struct TomlProjectHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlObjective {
    id: String,
    #[serde(default)]
    number: Option<u32>,
    #[serde(default = "default_weight")]
    weight: u32,
    #[serde(default)]
    indicators: Vec<TomlIndicator>,
}

#[derive(Debug, Deserialize)]
struct TomlIndicator {
    id: String,
    #[serde(default = "default_weight")]
    weight: u32,
    #[serde(default)]
    question_number: Option<u32>,
}

fn default_weight() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct TomlStudent {
    id: String,
    name: String,
    #[serde(default)]
    evaluations: Vec<TomlEvaluation>,
}

#[derive(Debug, Deserialize)]
struct TomlEvaluation {
    objective: String,
    indicator: String,
    #[serde(default)]
    score: Option<u8>,
    #[serde(default)]
    selected: Option<bool>,
}

/// Parse a single TOML file into a `Project`.
pub fn parse_project(path: &Path) -> Result<Project> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read project file: {}", path.display()))?;

    parse_project_str(&content, path)
}

/// Parse a TOML string into a `Project` (useful for testing).
pub fn parse_project_str(content: &str, source_path: &Path) -> Result<Project> {
    let parsed: TomlProjectFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let objectives = parsed
        .objectives
        .into_iter()
        .enumerate()
        .map(|(position, o)| Objective {
            id: o.id,
            number: o.number.unwrap_or(position as u32 + 1),
            weight: o.weight,
            indicators: o
                .indicators
                .into_iter()
                .map(|i| Indicator {
                    id: i.id,
                    weight: i.weight,
                    question_number: i.question_number,
                })
                .collect(),
        })
        .collect();

    let grids = parsed
        .students
        .into_iter()
        .map(|s| StudentGrid {
            evaluations: s
                .evaluations
                .into_iter()
                .map(|e| Evaluation {
                    objective_id: e.objective,
                    indicator_id: e.indicator,
                    score: e.score,
                    selected: e.selected,
                })
                .collect(),
            ..StudentGrid::new(Student {
                id: s.id,
                name: s.name,
            })
        })
        .collect();

    Ok(Project {
        id: parsed.project.id,
        name: parsed.project.name,
        description: parsed.project.description,
        objectives,
        grids,
        settings: parsed.settings,
    })
}

/// Recursively load all `.toml` project files from a directory.
pub fn load_project_directory(dir: &Path) -> Result<Vec<Project>> {
    let mut projects = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            projects.extend(load_project_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_project(&path) {
                Ok(project) => projects.push(project),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(projects)
}

/// Load a single project file, or every project below a directory.
pub fn load_projects(path: &Path) -> Result<Vec<Project>> {
    if path.is_dir() {
        load_project_directory(path)
    } else {
        Ok(vec![parse_project(path)?])
    }
}

/// A warning from project validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// What the warning is about, e.g. `student s1` or `objective o2`.
    pub subject: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            message: message.into(),
        }
    }
}

/// Validate a project against the settings it will be graded with.
pub fn validate_project(project: &Project, settings: &GradingSettings) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if let Err(errors) = settings.validate() {
        warnings.extend(
            errors
                .into_iter()
                .map(|e| ValidationWarning::new("settings", e.to_string())),
        );
    }

    if project.indicator_count() == 0 {
        warnings.push(ValidationWarning {
            subject: None,
            message: "rubric has no indicators, every student will receive grade 1".into(),
        });
    }

    validate_rubric(&project.objectives, &mut warnings);

    let mut seen_students = HashSet::new();
    for grid in &project.grids {
        if !seen_students.insert(grid.student.id.as_str()) {
            warnings.push(ValidationWarning::new(
                format!("student {}", grid.student.id),
                format!("duplicate student ID: {}", grid.student.id),
            ));
        }
        validate_grid(&project.objectives, grid, settings, &mut warnings);
    }

    warnings
}

fn validate_rubric(objectives: &[Objective], warnings: &mut Vec<ValidationWarning>) {
    let mut seen_objectives = HashSet::new();
    for objective in objectives {
        let subject = format!("objective {}", objective.id);

        if !seen_objectives.insert(objective.id.as_str()) {
            warnings.push(ValidationWarning::new(
                &subject,
                format!("duplicate objective ID: {}", objective.id),
            ));
        }
        if objective.weight < 1 {
            warnings.push(ValidationWarning::new(
                &subject,
                "objective weight must be at least 1",
            ));
        }

        let mut seen_indicators = HashSet::new();
        for indicator in &objective.indicators {
            if !seen_indicators.insert(indicator.id.as_str()) {
                warnings.push(ValidationWarning::new(
                    &subject,
                    format!("duplicate indicator ID: {}", indicator.id),
                ));
            }
            if !(1..=9).contains(&indicator.weight) {
                warnings.push(ValidationWarning::new(
                    &subject,
                    format!(
                        "indicator {} has weight {}, expected 1-9",
                        indicator.id, indicator.weight
                    ),
                ));
            }
            if indicator.question_number == Some(0) {
                warnings.push(ValidationWarning::new(
                    &subject,
                    format!("indicator {} has question number 0", indicator.id),
                ));
            }
        }
    }
}

fn validate_grid(
    objectives: &[Objective],
    grid: &StudentGrid,
    settings: &GradingSettings,
    warnings: &mut Vec<ValidationWarning>,
) {
    let subject = format!("student {}", grid.student.id);

    let rubric: HashMap<(&str, &str), &Indicator> = objectives
        .iter()
        .flat_map(|o| o.indicators.iter().map(move |i| ((o.id.as_str(), i.id.as_str()), i)))
        .collect();

    let mut seen = HashSet::new();
    for evaluation in &grid.evaluations {
        let key = (
            evaluation.objective_id.as_str(),
            evaluation.indicator_id.as_str(),
        );

        if !rubric.contains_key(&key) {
            warnings.push(ValidationWarning::new(
                &subject,
                format!(
                    "evaluation references unknown indicator {}/{} and is ignored",
                    key.0, key.1
                ),
            ));
        }
        if !seen.insert(key) {
            warnings.push(ValidationWarning::new(
                &subject,
                format!(
                    "duplicate evaluation for {}/{}, the last one is used",
                    key.0, key.1
                ),
            ));
        }
        if let Some(score) = evaluation.score.filter(|&s| s > MAX_SCORE) {
            warnings.push(ValidationWarning::new(
                &subject,
                format!(
                    "score {score} for {}/{} is above the maximum of {MAX_SCORE}",
                    key.0, key.1
                ),
            ));
        }
    }

    if let Some(cap) = settings.max_questions_to_answer {
        if grid.has_explicit_selection() {
            let selected_questions = selected_question_count(objectives, grid);
            if selected_questions > cap as usize {
                warnings.push(ValidationWarning::new(
                    &subject,
                    format!(
                        "{selected_questions} questions selected but at most {cap} may be answered"
                    ),
                ));
            }
        }
    }
}

/// Count distinct selected questions of a grid.
fn selected_question_count(objectives: &[Objective], grid: &StudentGrid) -> usize {
    let mut questions: HashSet<(Option<u32>, &str)> = HashSet::new();
    for objective in objectives {
        for indicator in &objective.indicators {
            let selected = grid
                .evaluation_for(&objective.id, &indicator.id)
                .map_or(true, |e| e.is_selected());
            if selected {
                match indicator.question_number {
                    Some(number) => questions.insert((Some(number), "")),
                    None => questions.insert((None, indicator.id.as_str())),
                };
            }
        }
    }
    questions.len()
}
