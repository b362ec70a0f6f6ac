//! Settings validation errors.
//!
//! The grade calculation never fails: it clamps whatever it is given. These
//! errors let the surrounding tooling tell the user which values were clamped.

use thiserror::Error;

/// Settings values that the kernel will silently clamp or that make no sense.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    /// The threshold must lie strictly between 0 and 1.
    #[error("threshold {0} is outside (0, 1) and will be clamped to [0.01, 0.99]")]
    ThresholdOutOfRange(f64),

    /// The correction is expected within [-1, 1].
    #[error("correction error {0} is outside [-1, 1]")]
    CorrectionOutOfRange(f64),

    /// A cap of zero questions deselects everything.
    #[error("max questions to answer is 0, every student would be ungraded")]
    ZeroQuestionCap,

    /// The pass grade must be on the 1-6 scale.
    #[error("pass grade {0} is outside [1, 6]")]
    PassGradeOutOfRange(f64),
}
