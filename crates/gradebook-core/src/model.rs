//! Core data model types for gradebook.
//!
//! These are the rubric, scoring, and project types that the rest of the
//! gradebook system is built on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::settings::SettingsOverride;

/// Highest score an indicator can receive ("excellent").
pub const MAX_SCORE: u8 = 3;

/// A weighted competency area in a rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// Unique identifier for this objective.
    pub id: String,
    /// Display number (1-based) of the objective inside the rubric.
    pub number: u32,
    /// Multiplier applied to every indicator's contribution (>= 1).
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// The gradable criteria of this objective.
    #[serde(default)]
    pub indicators: Vec<Indicator>,
}

/// A single gradable question or criterion inside an objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    /// Unique identifier for this indicator.
    pub id: String,
    /// Indicator weight (1-9).
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// Exam question this indicator belongs to, if any.
    #[serde(default)]
    pub question_number: Option<u32>,
}

impl Indicator {
    /// The best score an indicator can receive.
    pub fn max_score(&self) -> u8 {
        MAX_SCORE
    }
}

fn default_weight() -> u32 {
    1
}

/// The recorded score for one indicator of one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub objective_id: String,
    pub indicator_id: String,
    /// 0-3, or `None` when not graded yet.
    #[serde(default)]
    pub score: Option<u8>,
    /// `Some(false)` excludes the indicator from both sums. Absent means selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

impl Evaluation {
    pub fn new(objective_id: impl Into<String>, indicator_id: impl Into<String>) -> Self {
        Self {
            objective_id: objective_id.into(),
            indicator_id: indicator_id.into(),
            score: None,
            selected: None,
        }
    }

    pub fn with_score(mut self, score: u8) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = Some(selected);
        self
    }

    /// Whether this indicator counts toward the totals.
    pub fn is_selected(&self) -> bool {
        self.selected.unwrap_or(true)
    }
}

/// How raw indicator scores are turned into points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringMode {
    /// `score * indicator.weight * objective.weight`, out of `3 * weights`.
    #[default]
    Weighted,
    /// The score is already-earned points out of `indicator.weight`.
    RawPoints,
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringMode::Weighted => write!(f, "weighted"),
            ScoringMode::RawPoints => write!(f, "raw-points"),
        }
    }
}

impl FromStr for ScoringMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weighted" => Ok(ScoringMode::Weighted),
            "raw-points" | "raw_points" | "raw" => Ok(ScoringMode::RawPoints),
            other => Err(format!("unknown scoring mode: {other}")),
        }
    }
}

/// A student enrolled in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
}

/// All evaluations of one student in one project, plus the derived totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentGrid {
    pub student: Student,
    #[serde(default)]
    pub evaluations: Vec<Evaluation>,
    #[serde(default)]
    pub total_points: f64,
    #[serde(default)]
    pub max_points: f64,
    /// The stored grade. `None` means ungraded: nothing was selected.
    #[serde(default)]
    pub final_grade: Option<f64>,
    /// Set when the selection flags were written by the question cap rather
    /// than by the grader. Such flags are recomputed on every grading pass.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub auto_selected: bool,
}

impl StudentGrid {
    pub fn new(student: Student) -> Self {
        Self {
            student,
            evaluations: Vec::new(),
            total_points: 0.0,
            max_points: 0.0,
            final_grade: None,
            auto_selected: false,
        }
    }

    /// Find the evaluation for an indicator. With duplicates, the last one wins.
    pub fn evaluation_for(&self, objective_id: &str, indicator_id: &str) -> Option<&Evaluation> {
        self.evaluations
            .iter()
            .rev()
            .find(|e| e.objective_id == objective_id && e.indicator_id == indicator_id)
    }

    /// True when the grader marked at least one indicator as selected or deselected.
    /// Flags written by the question cap do not count.
    pub fn has_explicit_selection(&self) -> bool {
        !self.auto_selected && self.evaluations.iter().any(|e| e.selected.is_some())
    }
}

/// A graded class test: one rubric and the grids of every student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default)]
    pub grids: Vec<StudentGrid>,
    /// Per-project settings that take precedence over the global configuration.
    #[serde(default)]
    pub settings: SettingsOverride,
}

impl Project {
    /// Number of indicators across all objectives.
    pub fn indicator_count(&self) -> usize {
        self.objectives.iter().map(|o| o.indicators.len()).sum()
    }
}
