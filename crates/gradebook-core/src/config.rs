//! Global gradebook configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::ScoringMode;
use crate::settings::GradingSettings;

/// Top-level gradebook configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradebookConfig {
    /// Default grading settings, overridable per project.
    #[serde(default)]
    pub settings: GradingSettings,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Report formats written by `gradebook grade` when none is given.
    #[serde(default = "default_format")]
    pub default_format: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./gradebook-reports")
}

fn default_format() -> String {
    "json".to_string()
}

impl Default for GradebookConfig {
    fn default() -> Self {
        Self {
            settings: GradingSettings::default(),
            output_dir: default_output_dir(),
            default_format: default_format(),
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `gradebook.toml` in the current directory
/// 2. `~/.config/gradebook/config.toml`
///
/// Environment variable overrides: `GRADEBOOK_THRESHOLD`,
/// `GRADEBOOK_CORRECTION_ERROR`, `GRADEBOOK_SCORING_MODE`.
pub fn load_config_from(path: Option<&Path>) -> Result<GradebookConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("gradebook.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            parse_config_str(
                &std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config: {}", path.display()))?,
            )
            .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GradebookConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    Ok(config)
}

/// Parse a TOML config string.
pub fn parse_config_str(content: &str) -> Result<GradebookConfig> {
    Ok(toml::from_str(content)?)
}

/// Apply `GRADEBOOK_*` overrides using `lookup` to read variables.
fn apply_env_overrides(
    config: &mut GradebookConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(value) = lookup("GRADEBOOK_THRESHOLD") {
        config.settings.threshold = value
            .trim()
            .parse()
            .with_context(|| format!("invalid GRADEBOOK_THRESHOLD: '{value}'"))?;
    }

    if let Some(value) = lookup("GRADEBOOK_CORRECTION_ERROR") {
        config.settings.correction_error = value
            .trim()
            .parse()
            .with_context(|| format!("invalid GRADEBOOK_CORRECTION_ERROR: '{value}'"))?;
    }

    if let Some(value) = lookup("GRADEBOOK_SCORING_MODE") {
        config.settings.scoring_mode = value
            .trim()
            .parse::<ScoringMode>()
            .map_err(|e| anyhow::anyhow!("invalid GRADEBOOK_SCORING_MODE: {e}"))?;
    }

    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gradebook"))
}
