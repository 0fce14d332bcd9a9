//! Runtime configuration for a kernel host process: the knobs that tune
//! hull synthesis and where on disk a design's state lives, loaded from a
//! `keelmark.toml` next to the rest of a design's state directory.
//!
//! Every field has a default matching the in-code constant it overrides
//! (`ConvergenceCriteria::default()`, `DEFAULT_MAX_ITERATIONS`), so an
//! absent config file is equivalent to an empty one.

use std::fs;
use std::path::Path;

use anyhow::Context;
use keelmark_synthesis::ConvergenceCriteria;
use keelmark_types::{HullFamily, SynthesisRequest};
use serde::{Deserialize, Serialize};

/// Synthesis loop tuning: iteration cap, default hull family, and the
/// convergence thresholds `keelmark-synthesis` otherwise only ships as
/// hardcoded defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub max_iterations: u32,
    pub default_hull_family: String,
    pub min_validators_passed: u32,
    pub min_score: f64,
    pub gm_margin_m: f64,
    pub soft_floor: f64,
    pub plateau_window: usize,
    pub plateau_delta: f64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        let criteria = ConvergenceCriteria::default();
        SynthesisConfig {
            max_iterations: SynthesisRequest::new(HullFamily::Patrol, 1.0).max_iterations,
            default_hull_family: HullFamily::Patrol.as_str().to_string(),
            min_validators_passed: criteria.min_validators_passed,
            min_score: criteria.min_score,
            gm_margin_m: criteria.gm_margin_m,
            soft_floor: criteria.soft_floor,
            plateau_window: criteria.plateau_window,
            plateau_delta: criteria.plateau_delta,
        }
    }
}

impl SynthesisConfig {
    pub fn convergence_criteria(&self) -> ConvergenceCriteria {
        ConvergenceCriteria {
            min_validators_passed: self.min_validators_passed,
            min_score: self.min_score,
            gm_margin_m: self.gm_margin_m,
            soft_floor: self.soft_floor,
            plateau_window: self.plateau_window,
            plateau_delta: self.plateau_delta,
        }
    }

    pub fn default_hull_family(&self) -> HullFamily {
        HullFamily::from_str(&self.default_hull_family).unwrap_or(HullFamily::Patrol)
    }
}

/// File locations a host process persists a design's state to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub state_dir: String,
    pub design_file: String,
    pub session_file: String,
    pub events_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            state_dir: ".keelmark".to_string(),
            design_file: "design.json".to_string(),
            session_file: "session.json".to_string(),
            events_file: "events.jsonl".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub synthesis: SynthesisConfig,
    pub paths: PathsConfig,
}

impl KernelConfig {
    /// Loads config from `path`, falling back to defaults when the file
    /// does not exist. A malformed file is still an error — silently
    /// ignoring unparsable config would hide operator mistakes.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config dir {}", parent.display()))?;
        }
        let toml = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, toml)
            .with_context(|| format!("failed to write config file {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename config file to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = KernelConfig::load(&dir.path().join("keelmark.toml")).unwrap();
        assert_eq!(config, KernelConfig::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keelmark.toml");
        let mut config = KernelConfig::default();
        config.synthesis.max_iterations = 5;
        config.paths.state_dir = "/tmp/design".to_string();

        config.save(&path).unwrap();
        let loaded = KernelConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keelmark.toml");
        fs::write(&path, "not = [valid toml").unwrap();
        assert!(KernelConfig::load(&path).is_err());
    }

    #[test]
    fn default_hull_family_falls_back_on_unknown_name() {
        let mut config = SynthesisConfig::default();
        config.default_hull_family = "nonsense".to_string();
        assert_eq!(config.default_hull_family(), HullFamily::Patrol);
    }

    #[test]
    fn convergence_criteria_reflects_overridden_values() {
        let mut config = SynthesisConfig::default();
        config.min_score = 90.0;
        config.soft_floor = 75.0;
        let criteria = config.convergence_criteria();
        assert_eq!(criteria.min_score, 90.0);
        assert_eq!(criteria.soft_floor, 75.0);
    }

    #[test]
    fn save_leaves_no_tmp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keelmark.toml");
        KernelConfig::default().save(&path).unwrap();
        assert!(!path.with_extension("tmp").exists());
        assert!(path.exists());
    }
}
