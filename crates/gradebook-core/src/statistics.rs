//! Class-level grade statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Objective;
use crate::results::StudentResult;

/// Statistics across all students of a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassStatistics {
    /// Number of students, graded or not.
    pub student_count: usize,
    /// Students with at least one selected indicator.
    pub graded_count: usize,
    pub mean_grade: Option<f64>,
    pub median_grade: Option<f64>,
    pub min_grade: Option<f64>,
    pub max_grade: Option<f64>,
    /// Graded students at or above the pass grade.
    pub pass_count: usize,
    /// `pass_count / graded_count`, 0 when nobody is graded.
    pub pass_rate: f64,
    /// Number of students per grade, rounded to the nearest half grade ("4.5").
    pub distribution: BTreeMap<String, usize>,
    /// Per-objective achievement, in rubric order.
    pub per_objective: Vec<ObjectiveStats>,
}

/// How well the class did on a single objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveStats {
    pub objective_id: String,
    pub number: u32,
    /// Mean of earned/achievable points over students for whom the objective counted.
    pub mean_achievement: Option<f64>,
}

/// Round a grade to the nearest half and format it as a distribution bucket.
pub fn grade_bucket(grade: f64) -> String {
    format!("{:.1}", (grade * 2.0).round() / 2.0)
}

/// Median of a list of values, `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Compute class statistics. Ungraded students are counted but excluded from
/// every grade figure.
pub fn compute_class_statistics(
    results: &[StudentResult],
    objectives: &[Objective],
    pass_grade: f64,
) -> ClassStatistics {
    let grades: Vec<f64> = results.iter().filter_map(|r| r.outcome.grade()).collect();

    let mean_grade = if grades.is_empty() {
        None
    } else {
        Some(grades.iter().sum::<f64>() / grades.len() as f64)
    };

    let pass_count = grades.iter().filter(|&&g| g >= pass_grade).count();
    let pass_rate = if grades.is_empty() {
        0.0
    } else {
        pass_count as f64 / grades.len() as f64
    };

    let mut distribution = BTreeMap::new();
    for &grade in &grades {
        *distribution.entry(grade_bucket(grade)).or_insert(0) += 1;
    }

    let per_objective = objectives
        .iter()
        .map(|objective| {
            let achievements: Vec<f64> = results
                .iter()
                .flat_map(|r| r.objectives.iter())
                .filter(|o| o.objective_id == objective.id)
                .filter_map(|o| o.achievement())
                .collect();
            ObjectiveStats {
                objective_id: objective.id.clone(),
                number: objective.number,
                mean_achievement: (!achievements.is_empty())
                    .then(|| achievements.iter().sum::<f64>() / achievements.len() as f64),
            }
        })
        .collect();

    ClassStatistics {
        student_count: results.len(),
        graded_count: grades.len(),
        mean_grade,
        median_grade: median(&grades),
        min_grade: grades.iter().copied().reduce(f64::min),
        max_grade: grades.iter().copied().reduce(f64::max),
        pass_count,
        pass_rate,
        distribution,
        per_objective,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::GradeOutcome;
    use crate::results::ObjectiveResult;

    fn result(id: &str, outcome: GradeOutcome, points: f64, max: f64) -> StudentResult {
        StudentResult {
            student_id: id.into(),
            student_name: id.to_uppercase(),
            total_points: points,
            max_points: max,
            outcome,
            objectives: vec![ObjectiveResult {
                objective_id: "o1".into(),
                number: 1,
                total_points: points,
                max_points: max,
            }],
            auto_selected: false,
        }
    }

    fn rubric() -> Vec<Objective> {
        vec![
            Objective {
                id: "o1".into(),
                number: 1,
                weight: 1,
                indicators: vec![],
            },
            Objective {
                id: "o2".into(),
                number: 2,
                weight: 1,
                indicators: vec![],
            },
        ]
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[4.0, 6.0, 1.0, 5.0]), Some(4.5));
    }

    #[test]
    fn grade_buckets() {
        assert_eq!(grade_bucket(4.2), "4.0");
        assert_eq!(grade_bucket(4.3), "4.5");
        assert_eq!(grade_bucket(5.8), "6.0");
        assert_eq!(grade_bucket(1.0), "1.0");
    }

    #[test]
    fn class_statistics() {
        let results = vec![
            result("a", GradeOutcome::Graded(5.0), 9.0, 12.0),
            result("b", GradeOutcome::Graded(3.5), 6.0, 12.0),
            result("c", GradeOutcome::Graded(4.0), 7.0, 12.0),
            result("d", GradeOutcome::Ungraded, 0.0, 0.0),
        ];
        let stats = compute_class_statistics(&results, &rubric(), 4.0);

        assert_eq!(stats.student_count, 4);
        assert_eq!(stats.graded_count, 3);
        assert!((stats.mean_grade.unwrap() - 12.5 / 3.0).abs() < 1e-9);
        assert_eq!(stats.median_grade, Some(4.0));
        assert_eq!(stats.min_grade, Some(3.5));
        assert_eq!(stats.max_grade, Some(5.0));
        assert_eq!(stats.pass_count, 2);
        assert!((stats.pass_rate - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.distribution.get("3.5"), Some(&1));
        assert_eq!(stats.distribution.get("4.0"), Some(&1));
        assert_eq!(stats.distribution.get("5.0"), Some(&1));

        assert_eq!(stats.per_objective.len(), 2);
        assert!((stats.per_objective[0].mean_achievement.unwrap() - 22.0 / 36.0).abs() < 1e-9);
        assert_eq!(stats.per_objective[1].mean_achievement, None);
    }

    #[test]
    fn statistics_without_grades() {
        let results = vec![result("d", GradeOutcome::Ungraded, 0.0, 0.0)];
        let stats = compute_class_statistics(&results, &[], 4.0);
        assert_eq!(stats.student_count, 1);
        assert_eq!(stats.graded_count, 0);
        assert_eq!(stats.mean_grade, None);
        assert_eq!(stats.pass_rate, 0.0);
        assert!(stats.distribution.is_empty());
    }
}
