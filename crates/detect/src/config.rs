//! Detector configuration.
use ingest::{BoundsError, ValidationBounds};
use serde::{Deserialize, Serialize};

/// Runtime configuration for the threat detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// In strict mode, prompt/SQL/command-injection findings are CRITICAL
    /// and invalidate the request. Outside strict mode they downgrade to
    /// WARNING — useful while tuning patterns against live traffic. XSS is
    /// ERROR either way.
    #[serde(default = "default_strict_mode")]
    pub strict_mode: bool,

    /// Structural limits: timestamp window and per-field scan budget.
    #[serde(default)]
    pub bounds: ValidationBounds,
}

fn default_strict_mode() -> bool {
    true
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            strict_mode: default_strict_mode(),
            bounds: ValidationBounds::default(),
        }
    }
}

impl DetectorConfig {
    /// Validates internal consistency. Run once at startup.
    pub fn validate(&self) -> Result<(), BoundsError> {
        self.bounds.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_strict_and_valid() {
        let cfg = DetectorConfig::default();
        assert!(cfg.strict_mode);
        assert!(cfg.validate().is_ok());
    }
}
