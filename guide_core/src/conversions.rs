//! `From`/`TryFrom` implementations bridging `guide_config` types to
//! `guide_core` types.

use crate::config::PredictorCfg;
use crate::error::KernelError;
use crate::kernel::{CovarianceFunction, Kernel, KernelKind};

// ── PredictorCfg ─────────────────────────────────────────────────────────────

impl From<&guide_config::PredictorCfg> for PredictorCfg {
    fn from(c: &guide_config::PredictorCfg) -> Self {
        Self {
            settings_prefix: c.settings_prefix(),
            control_gain: c.control_gain,
            min_points_for_inference: c.min_points_for_inference,
        }
    }
}

// ── Kernel ───────────────────────────────────────────────────────────────────

impl From<guide_config::KernelVariant> for KernelKind {
    fn from(v: guide_config::KernelVariant) -> Self {
        match v {
            guide_config::KernelVariant::PeriodicSquareExponential => {
                KernelKind::PeriodicSquareExponential
            }
            guide_config::KernelVariant::PeriodicSquareExponential2 => {
                KernelKind::PeriodicSquareExponential2
            }
        }
    }
}

impl TryFrom<&guide_config::KernelCfg> for Kernel {
    type Error = KernelError;

    fn try_from(c: &guide_config::KernelCfg) -> Result<Self, Self::Error> {
        let mut kernel = Kernel::new(c.variant.into());
        kernel.set_parameters(&c.hyperparameters_or_default())?;
        if let Some(p) = c.log_period {
            kernel.set_extra_parameters(&[p])?;
        }
        Ok(kernel)
    }
}
