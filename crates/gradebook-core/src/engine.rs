//! Grading engine.
//!
//! Resolves the settings of a project, applies the question cap, grades every
//! student grid, and assembles the grade report.

use std::borrow::Cow;
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::grading::{
    evaluation_lookup, grade_outcome, objective_totals, select_best_questions, GridTotals,
};
use crate::model::{Evaluation, Objective, Project, StudentGrid};
use crate::report::{GradeReport, ProjectSummary};
use crate::results::{ObjectiveResult, StudentResult};
use crate::settings::GradingSettings;
use crate::statistics::compute_class_statistics;

/// Grades projects with a fixed set of base settings.
#[derive(Debug, Clone)]
pub struct GradingEngine {
    settings: GradingSettings,
}

impl GradingEngine {
    pub fn new(settings: GradingSettings) -> Self {
        Self { settings }
    }

    /// The base settings, before any project override.
    pub fn settings(&self) -> &GradingSettings {
        &self.settings
    }

    /// Settings for a project: the base settings with the project's overrides applied.
    pub fn settings_for(&self, project: &Project) -> GradingSettings {
        self.settings.with_override(&project.settings)
    }

    /// Recompute totals and grades of every grid and store them in the project.
    ///
    /// Selections made by the question cap are written back and the grid is
    /// marked `auto_selected`, so the next recompute selects again.
    pub fn recompute(&self, project: &mut Project) {
        let settings = self.settings_for(project);
        let objectives = &project.objectives;

        for grid in &mut project.grids {
            let (result, selected) = {
                let (result, evaluations) = grade_with_selection(objectives, grid, &settings);
                let selected = match evaluations {
                    Cow::Owned(selected) => Some(selected),
                    Cow::Borrowed(_) => None,
                };
                (result, selected)
            };
            if let Some(selected) = selected {
                grid.evaluations = selected;
            }
            grid.auto_selected = result.auto_selected;
            grid.total_points = result.total_points;
            grid.max_points = result.max_points;
            grid.final_grade = result.outcome.grade();
        }
    }

    /// Grade every student of a project and build the report.
    pub fn run(&self, project: &Project) -> GradeReport {
        let start = Instant::now();
        let settings = self.settings_for(project);

        tracing::info!(
            project = %project.id,
            students = project.grids.len(),
            indicators = project.indicator_count(),
            "grading project"
        );

        let results: Vec<StudentResult> = project
            .grids
            .iter()
            .map(|grid| {
                let result = grade_grid(&project.objectives, grid, &settings);
                tracing::debug!(
                    student = %result.student_id,
                    total = result.total_points,
                    max = result.max_points,
                    grade = ?result.outcome.grade(),
                    "graded student"
                );
                if !result.is_graded() {
                    tracing::warn!(
                        "student {} has no selected indicators in project {}",
                        result.student_id,
                        project.id
                    );
                }
                result
            })
            .collect();

        let statistics =
            compute_class_statistics(&results, &project.objectives, settings.pass_grade);

        tracing::info!(
            project = %project.id,
            graded = statistics.graded_count,
            elapsed_us = start.elapsed().as_micros() as u64,
            "project graded"
        );

        GradeReport {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            project: ProjectSummary::from_project(project),
            settings,
            results,
            statistics,
        }
    }
}

/// Grade one student grid against a rubric.
///
/// When a question cap is set and the grid carries no explicit selection,
/// the best questions are selected automatically. Flags left by an earlier
/// automatic selection are ignored once the cap is gone.
pub fn grade_grid(
    objectives: &[Objective],
    grid: &StudentGrid,
    settings: &GradingSettings,
) -> StudentResult {
    let (result, _) = grade_with_selection(objectives, grid, settings);
    result
}

fn grade_with_selection<'a>(
    objectives: &[Objective],
    grid: &'a StudentGrid,
    settings: &GradingSettings,
) -> (StudentResult, Cow<'a, [Evaluation]>) {
    let (evaluations, auto_selected): (Cow<'a, [Evaluation]>, bool) =
        match settings.max_questions_to_answer {
            Some(cap) if !grid.has_explicit_selection() => (
                Cow::Owned(select_best_questions(
                    objectives,
                    &grid.evaluations,
                    cap,
                    settings.scoring_mode,
                )),
                true,
            ),
            None if grid.auto_selected => (
                Cow::Owned(
                    grid.evaluations
                        .iter()
                        .map(|e| Evaluation {
                            selected: None,
                            ..e.clone()
                        })
                        .collect(),
                ),
                false,
            ),
            _ => (Cow::Borrowed(&grid.evaluations), false),
        };

    let lookup = evaluation_lookup(&evaluations);
    let objective_results: Vec<ObjectiveResult> = objectives
        .iter()
        .map(|objective| {
            let totals = objective_totals(objective, &lookup, settings.scoring_mode);
            ObjectiveResult {
                objective_id: objective.id.clone(),
                number: objective.number,
                total_points: totals.total_points,
                max_points: totals.max_points,
            }
        })
        .collect();

    let totals = objective_results
        .iter()
        .fold(GridTotals::default(), |acc, o| {
            acc + GridTotals {
                total_points: o.total_points,
                max_points: o.max_points,
            }
        });

    let result = StudentResult {
        student_id: grid.student.id.clone(),
        student_name: grid.student.name.clone(),
        total_points: totals.total_points,
        max_points: totals.max_points,
        outcome: grade_outcome(totals, settings),
        objectives: objective_results,
        auto_selected,
    };

    (result, evaluations)
}
