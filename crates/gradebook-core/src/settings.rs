//! Grading settings and their per-project overrides.
//!
//! A `GradingSettings` value is resolved once (config file, environment,
//! project file, CLI flags) and then passed by reference to the engine.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::model::ScoringMode;

/// Settings that drive the grade calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingSettings {
    /// Achievement ratio that maps to grade 4.0.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Additive bonus/malus applied to the computed grade.
    #[serde(default)]
    pub correction_error: f64,
    /// How many questions count when students may skip some.
    #[serde(default)]
    pub max_questions_to_answer: Option<u32>,
    #[serde(default)]
    pub scoring_mode: ScoringMode,
    /// Lowest passing grade, used for class statistics.
    #[serde(default = "default_pass_grade")]
    pub pass_grade: f64,
}

fn default_threshold() -> f64 {
    0.6
}

fn default_pass_grade() -> f64 {
    4.0
}

impl Default for GradingSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            correction_error: 0.0,
            max_questions_to_answer: None,
            scoring_mode: ScoringMode::default(),
            pass_grade: default_pass_grade(),
        }
    }
}

/// Optional values layered on top of `GradingSettings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction_error: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_questions_to_answer: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring_mode: Option<ScoringMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_grade: Option<f64>,
}

impl SettingsOverride {
    pub fn is_empty(&self) -> bool {
        self == &SettingsOverride::default()
    }

    /// Layer `other` on top of `self`; values set in `other` win.
    pub fn merged_with(&self, other: &SettingsOverride) -> Self {
        Self {
            threshold: other.threshold.or(self.threshold),
            correction_error: other.correction_error.or(self.correction_error),
            max_questions_to_answer: other
                .max_questions_to_answer
                .or(self.max_questions_to_answer),
            scoring_mode: other.scoring_mode.or(self.scoring_mode),
            pass_grade: other.pass_grade.or(self.pass_grade),
        }
    }
}

impl GradingSettings {
    /// Return a copy with every value present in `overrides` applied.
    pub fn with_override(&self, overrides: &SettingsOverride) -> Self {
        Self {
            threshold: overrides.threshold.unwrap_or(self.threshold),
            correction_error: overrides.correction_error.unwrap_or(self.correction_error),
            max_questions_to_answer: overrides
                .max_questions_to_answer
                .or(self.max_questions_to_answer),
            scoring_mode: overrides.scoring_mode.unwrap_or(self.scoring_mode),
            pass_grade: overrides.pass_grade.unwrap_or(self.pass_grade),
        }
    }

    /// Report every out-of-range value. The grade calculation still clamps them.
    pub fn validate(&self) -> Result<(), Vec<SettingsError>> {
        let mut errors = Vec::new();

        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            errors.push(SettingsError::ThresholdOutOfRange(self.threshold));
        }
        if !(-1.0..=1.0).contains(&self.correction_error) {
            errors.push(SettingsError::CorrectionOutOfRange(self.correction_error));
        }
        if self.max_questions_to_answer == Some(0) {
            errors.push(SettingsError::ZeroQuestionCap);
        }
        if !(1.0..=6.0).contains(&self.pass_grade) {
            errors.push(SettingsError::PassGradeOutOfRange(self.pass_grade));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = GradingSettings::default();
        assert_eq!(settings.threshold, 0.6);
        assert_eq!(settings.correction_error, 0.0);
        assert_eq!(settings.max_questions_to_answer, None);
        assert_eq!(settings.scoring_mode, ScoringMode::Weighted);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn override_replaces_only_present_fields() {
        let base = GradingSettings {
            max_questions_to_answer: Some(4),
            ..Default::default()
        };
        let overrides = SettingsOverride {
            threshold: Some(0.5),
            scoring_mode: Some(ScoringMode::RawPoints),
            ..Default::default()
        };

        let merged = base.with_override(&overrides);
        assert_eq!(merged.threshold, 0.5);
        assert_eq!(merged.scoring_mode, ScoringMode::RawPoints);
        assert_eq!(merged.max_questions_to_answer, Some(4));
        assert_eq!(merged.correction_error, 0.0);

        assert_eq!(base.with_override(&SettingsOverride::default()), base);
        assert!(SettingsOverride::default().is_empty());
        assert!(!overrides.is_empty());
    }

    #[test]
    fn later_override_wins() {
        let project = SettingsOverride {
            threshold: Some(0.5),
            correction_error: Some(0.2),
            ..Default::default()
        };
        let flags = SettingsOverride {
            threshold: Some(0.7),
            ..Default::default()
        };

        let merged = project.merged_with(&flags);
        assert_eq!(merged.threshold, Some(0.7));
        assert_eq!(merged.correction_error, Some(0.2));
        assert_eq!(merged.scoring_mode, None);
    }

    #[test]
    fn validate_reports_every_problem() {
        let settings = GradingSettings {
            threshold: 1.2,
            correction_error: -1.5,
            max_questions_to_answer: Some(0),
            scoring_mode: ScoringMode::Weighted,
            pass_grade: 7.0,
        };
        let errors = settings.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&SettingsError::ThresholdOutOfRange(1.2)));
        assert!(errors.contains(&SettingsError::ZeroQuestionCap));
        assert!(errors[0].to_string().contains("clamped"));
    }

    #[test]
    fn validate_rejects_nan_threshold() {
        let settings = GradingSettings {
            threshold: f64::NAN,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn parse_from_toml() {
        let settings: GradingSettings = toml::from_str(
            r#"
threshold = 0.55
scoring_mode = "raw-points"
"#,
        )
        .unwrap();
        assert_eq!(settings.threshold, 0.55);
        assert_eq!(settings.scoring_mode, ScoringMode::RawPoints);
        assert_eq!(settings.pass_grade, 4.0);
    }
}
