//! Grading result types.

use serde::{Deserialize, Serialize};

use crate::grading::{GradeOutcome, GridTotals};

/// The grading result of a single student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentResult {
    pub student_id: String,
    pub student_name: String,
    /// Points earned on selected indicators.
    pub total_points: f64,
    /// Points achievable on selected indicators.
    pub max_points: f64,
    pub outcome: GradeOutcome,
    /// Per-objective breakdown, in rubric order.
    #[serde(default)]
    pub objectives: Vec<ObjectiveResult>,
    /// Whether the selection was made automatically from the question cap.
    #[serde(default)]
    pub auto_selected: bool,
}

impl StudentResult {
    /// Grade on the 1-6 scale; an ungraded student reports the minimum.
    pub fn final_grade(&self) -> f64 {
        self.outcome.grade_or_min()
    }

    pub fn is_graded(&self) -> bool {
        matches!(self.outcome, GradeOutcome::Graded(_))
    }

    pub fn totals(&self) -> GridTotals {
        GridTotals {
            total_points: self.total_points,
            max_points: self.max_points,
        }
    }
}

/// Points of one student on one objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveResult {
    pub objective_id: String,
    pub number: u32,
    pub total_points: f64,
    pub max_points: f64,
}

impl ObjectiveResult {
    /// Share of the achievable points earned, if anything was achievable.
    pub fn achievement(&self) -> Option<f64> {
        (self.max_points > 0.0).then(|| self.total_points / self.max_points)
    }
}
