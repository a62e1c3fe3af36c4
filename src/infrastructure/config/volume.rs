//! Volume display and health thresholds.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::volume::VolumePolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct VolumeConfig {
    /// Placeholder volume shown for empty active markets. Defaults to each
    /// market's minimum bet.
    #[serde(default)]
    pub fallback_display: Option<Decimal>,
    /// Active markets below this volume are reported as low.
    #[serde(default = "default_low_volume_threshold")]
    pub low_volume_threshold: Decimal,
}

fn default_low_volume_threshold() -> Decimal {
    Decimal::ONE_HUNDRED
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            fallback_display: None,
            low_volume_threshold: default_low_volume_threshold(),
        }
    }
}

impl VolumeConfig {
    #[must_use]
    pub fn policy(&self) -> VolumePolicy {
        VolumePolicy {
            fallback_display: self.fallback_display,
            low_volume_threshold: self.low_volume_threshold,
        }
    }
}
