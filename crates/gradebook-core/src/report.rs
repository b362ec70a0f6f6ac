//! Grade report types with JSON persistence and grade change detection.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Project;
use crate::results::StudentResult;
use crate::settings::GradingSettings;
use crate::statistics::ClassStatistics;

/// A complete grade report for one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the graded project.
    pub project: ProjectSummary,
    /// The settings the grades were computed with.
    pub settings: GradingSettings,
    /// One result per student, in project order.
    pub results: Vec<StudentResult>,
    /// Class statistics.
    pub statistics: ClassStatistics,
}

/// Summary of a project (without student grids).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub student_count: usize,
    pub indicator_count: usize,
    pub objectives: Vec<ObjectiveSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveSummary {
    pub id: String,
    pub number: u32,
    pub weight: u32,
}

impl ProjectSummary {
    pub fn from_project(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            student_count: project.grids.len(),
            indicator_count: project.indicator_count(),
            objectives: project
                .objectives
                .iter()
                .map(|o| ObjectiveSummary {
                    id: o.id.clone(),
                    number: o.number,
                    weight: o.weight,
                })
                .collect(),
        }
    }
}

impl GradeReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradeReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline, matching students by ID.
    ///
    /// A grade that moved by more than `tolerance` counts as raised or
    /// lowered. Ungraded students compare as the minimum grade.
    pub fn compare(&self, baseline: &GradeReport, tolerance: f64) -> GradeChangeReport {
        let baseline_grades: HashMap<&str, f64> = baseline
            .results
            .iter()
            .map(|r| (r.student_id.as_str(), r.final_grade()))
            .collect();

        let mut lowered = Vec::new();
        let mut raised = Vec::new();
        let mut unchanged = 0usize;
        let mut new_students = 0usize;

        for result in &self.results {
            let Some(&baseline_grade) = baseline_grades.get(result.student_id.as_str()) else {
                new_students += 1;
                continue;
            };

            let current_grade = result.final_grade();
            let delta = current_grade - baseline_grade;
            let change = GradeChange {
                student_id: result.student_id.clone(),
                student_name: result.student_name.clone(),
                baseline_grade,
                current_grade,
                delta,
            };

            if delta < -tolerance {
                lowered.push(change);
            } else if delta > tolerance {
                raised.push(change);
            } else {
                unchanged += 1;
            }
        }

        let current_ids: std::collections::HashSet<&str> =
            self.results.iter().map(|r| r.student_id.as_str()).collect();
        let removed_students = baseline_grades
            .keys()
            .filter(|id| !current_ids.contains(*id))
            .count();

        GradeChangeReport {
            lowered,
            raised,
            unchanged,
            new_students,
            removed_students,
        }
    }
}

/// Result of comparing two grade reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeChangeReport {
    /// Students whose grade went down.
    pub lowered: Vec<GradeChange>,
    /// Students whose grade went up.
    pub raised: Vec<GradeChange>,
    /// Students with no significant change.
    pub unchanged: usize,
    /// Students in current but not baseline.
    pub new_students: usize,
    /// Students in baseline but not current.
    pub removed_students: usize,
}

/// A grade that moved between two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeChange {
    pub student_id: String,
    pub student_name: String,
    pub baseline_grade: f64,
    pub current_grade: f64,
    pub delta: f64,
}

impl GradeChangeReport {
    /// Format the change report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} lowered, {} raised, {} unchanged\n\n",
            self.lowered.len(),
            self.raised.len(),
            self.unchanged
        ));

        for (title, changes) in [("Lowered", &self.lowered), ("Raised", &self.raised)] {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Student | Name | Baseline | Current | Delta |\n");
            md.push_str("|---------|------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {} | {:.1} | {:.1} | {:+.1} |\n",
                    c.student_id, c.student_name, c.baseline_grade, c.current_grade, c.delta
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if any grade went down.
    pub fn has_lowered(&self) -> bool {
        !self.lowered.is_empty()
    }
}
