//! Grade calculation.
//!
//! Sums weighted indicator scores into point totals and maps the achieved
//! ratio onto the 1-6 scale with a two-segment linear transform anchored at
//! the pass threshold (`ratio == threshold` gives 4.0 before correction).
//!
//! Everything here is pure: no I/O, no logging, no errors. Degenerate inputs
//! are clamped.

use std::collections::{HashMap, HashSet};
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::model::{Evaluation, Indicator, Objective, ScoringMode};
use crate::settings::GradingSettings;

/// Lowest grade on the scale.
pub const MIN_GRADE: f64 = 1.0;
/// Highest grade on the scale.
pub const MAX_GRADE: f64 = 6.0;

const MIN_THRESHOLD: f64 = 0.01;
const MAX_THRESHOLD: f64 = 0.99;

/// Earned and achievable points of a grid (or of part of it).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GridTotals {
    pub total_points: f64,
    pub max_points: f64,
}

impl GridTotals {
    /// Achieved ratio, or `None` when nothing counts.
    pub fn ratio(&self) -> Option<f64> {
        (self.max_points > 0.0).then(|| self.total_points / self.max_points)
    }
}

impl Add for GridTotals {
    type Output = GridTotals;

    fn add(self, rhs: GridTotals) -> GridTotals {
        GridTotals {
            total_points: self.total_points + rhs.total_points,
            max_points: self.max_points + rhs.max_points,
        }
    }
}

impl AddAssign for GridTotals {
    fn add_assign(&mut self, rhs: GridTotals) {
        self.total_points += rhs.total_points;
        self.max_points += rhs.max_points;
    }
}

/// Evaluations keyed by `(objective_id, indicator_id)`.
pub type EvaluationLookup<'a> = HashMap<(&'a str, &'a str), &'a Evaluation>;

/// Build the evaluation lookup. Duplicate entries: the last one wins.
pub fn evaluation_lookup(evaluations: &[Evaluation]) -> EvaluationLookup<'_> {
    evaluations
        .iter()
        .map(|e| ((e.objective_id.as_str(), e.indicator_id.as_str()), e))
        .collect()
}

/// Points an indicator is worth when it counts.
pub fn indicator_max_points(objective: &Objective, indicator: &Indicator, mode: ScoringMode) -> f64 {
    let weights = indicator.weight as f64 * objective.weight as f64;
    match mode {
        ScoringMode::Weighted => indicator.max_score() as f64 * weights,
        ScoringMode::RawPoints => weights,
    }
}

/// Points earned for `score` on an indicator.
pub fn indicator_points(
    objective: &Objective,
    indicator: &Indicator,
    score: u8,
    mode: ScoringMode,
) -> f64 {
    match mode {
        ScoringMode::Weighted => score as f64 * indicator.weight as f64 * objective.weight as f64,
        ScoringMode::RawPoints => score as f64 * objective.weight as f64,
    }
}

/// Totals for a single objective.
///
/// Indicators explicitly deselected are left out of both sums; indicators
/// without an evaluation count as selected and unscored.
pub fn objective_totals(
    objective: &Objective,
    lookup: &EvaluationLookup<'_>,
    mode: ScoringMode,
) -> GridTotals {
    let mut totals = GridTotals::default();

    for indicator in &objective.indicators {
        let evaluation = lookup
            .get(&(objective.id.as_str(), indicator.id.as_str()))
            .copied();

        if evaluation.is_some_and(|e| !e.is_selected()) {
            continue;
        }

        totals.max_points += indicator_max_points(objective, indicator, mode);
        if let Some(score) = evaluation.and_then(|e| e.score) {
            totals.total_points += indicator_points(objective, indicator, score, mode);
        }
    }

    totals
}

/// Sum earned and achievable points over every indicator of every objective.
///
/// Evaluations for unknown objectives or indicators are ignored.
pub fn aggregate_grid_totals(
    objectives: &[Objective],
    evaluations: &[Evaluation],
    mode: ScoringMode,
) -> GridTotals {
    let lookup = evaluation_lookup(evaluations);
    objectives
        .iter()
        .map(|objective| objective_totals(objective, &lookup, mode))
        .fold(GridTotals::default(), |acc, totals| acc + totals)
}

/// Map points to a grade between 1.0 and 6.0, rounded to one decimal.
///
/// `max_points <= 0` gives the minimum grade. The threshold is clamped to
/// `[0.01, 0.99]` and the corrected grade to `[1, 6]`.
pub fn final_grade(total_points: f64, max_points: f64, threshold: f64, correction_error: f64) -> f64 {
    if max_points <= 0.0 {
        return MIN_GRADE;
    }

    let threshold = threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD);
    let rate = total_points / max_points;

    let grade = if rate <= threshold {
        3.0 * (rate / threshold) + 1.0 + correction_error
    } else {
        2.0 * ((rate - threshold) / (1.0 - threshold)) + 4.0 + correction_error
    };

    if grade.is_nan() {
        return MIN_GRADE;
    }

    round_to_tenth(grade.clamp(MIN_GRADE, MAX_GRADE))
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Grade of a grid, telling "nothing to grade" apart from a real grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "grade", rename_all = "lowercase")]
pub enum GradeOutcome {
    Graded(f64),
    /// No selected indicator: the ratio is undefined.
    Ungraded,
}

impl GradeOutcome {
    pub fn grade(&self) -> Option<f64> {
        match self {
            GradeOutcome::Graded(grade) => Some(*grade),
            GradeOutcome::Ungraded => None,
        }
    }

    /// The grade `final_grade` would report: ungraded counts as the minimum.
    pub fn grade_or_min(&self) -> f64 {
        self.grade().unwrap_or(MIN_GRADE)
    }
}

/// Like `final_grade`, but returns `Ungraded` instead of masking an empty grid.
pub fn grade_outcome(totals: GridTotals, settings: &GradingSettings) -> GradeOutcome {
    if totals.max_points <= 0.0 {
        return GradeOutcome::Ungraded;
    }
    GradeOutcome::Graded(final_grade(
        totals.total_points,
        totals.max_points,
        settings.threshold,
        settings.correction_error,
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum QuestionKey<'a> {
    Numbered(u32),
    Single(&'a str, &'a str),
}

fn question_key<'a>(objective: &'a Objective, indicator: &'a Indicator) -> QuestionKey<'a> {
    match indicator.question_number {
        Some(number) => QuestionKey::Numbered(number),
        None => QuestionKey::Single(&objective.id, &indicator.id),
    }
}

/// Keep the `cap` best questions of a grid selected and deselect the rest.
///
/// Indicators sharing a `question_number` form one question; an indicator
/// without one is a question on its own. Questions are ranked by their
/// achievement ratio (earned over achievable points, 0 when nothing is
/// achievable), so a small question answered fully beats a large one
/// answered poorly. Equal ratios go to the question with more earned
/// points, then to the one that appears first in the rubric.
/// The returned list holds one evaluation per rubric indicator (missing
/// ones are created unscored), followed by the evaluations that reference
/// no known indicator, untouched.
pub fn select_best_questions(
    objectives: &[Objective],
    evaluations: &[Evaluation],
    cap: u32,
    mode: ScoringMode,
) -> Vec<Evaluation> {
    let lookup = evaluation_lookup(evaluations);

    let mut questions: Vec<(QuestionKey<'_>, GridTotals)> = Vec::new();
    let mut positions: HashMap<QuestionKey<'_>, usize> = HashMap::new();
    for objective in objectives {
        for indicator in &objective.indicators {
            let key = question_key(objective, indicator);
            let earned = lookup
                .get(&(objective.id.as_str(), indicator.id.as_str()))
                .and_then(|e| e.score)
                .map(|score| indicator_points(objective, indicator, score, mode))
                .unwrap_or(0.0);

            let position = *positions.entry(key.clone()).or_insert_with(|| {
                questions.push((key, GridTotals::default()));
                questions.len() - 1
            });
            questions[position].1 += GridTotals {
                total_points: earned,
                max_points: indicator_max_points(objective, indicator, mode),
            };
        }
    }

    // Stable: equal questions keep rubric order.
    let mut ranked: Vec<usize> = (0..questions.len()).collect();
    ranked.sort_by(|&a, &b| {
        let (a, b) = (&questions[a].1, &questions[b].1);
        let ratio = |t: &GridTotals| t.ratio().unwrap_or(0.0);
        ratio(b)
            .total_cmp(&ratio(a))
            .then(b.total_points.total_cmp(&a.total_points))
    });
    let kept: HashSet<&QuestionKey<'_>> = ranked
        .iter()
        .take(cap as usize)
        .map(|&i| &questions[i].0)
        .collect();

    let mut selected = Vec::with_capacity(evaluations.len().max(questions.len()));
    let mut known: HashSet<(&str, &str)> = HashSet::new();
    for objective in objectives {
        for indicator in &objective.indicators {
            let key = question_key(objective, indicator);
            let id = (objective.id.as_str(), indicator.id.as_str());
            known.insert(id);

            let evaluation = match lookup.get(&id) {
                Some(existing) => (*existing).clone(),
                None => Evaluation::new(&objective.id, &indicator.id),
            };
            selected.push(evaluation.with_selected(kept.contains(&key)));
        }
    }

    selected.extend(
        evaluations
            .iter()
            .filter(|e| !known.contains(&(e.objective_id.as_str(), e.indicator_id.as_str())))
            .cloned(),
    );

    selected
}
