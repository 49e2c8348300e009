#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas, persisted profiles and guide-trace parsing.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - `Profile` is a TOML-backed key/value settings store implementing
//!   `guide_traits::SettingsStore`.
//! - The trace CSV loader enforces headers and reports the failing line.
use serde::Deserialize;

pub mod profile;
pub mod trace;

pub use profile::Profile;
pub use trace::{TraceRow, load_trace_csv};

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PredictorCfg {
    /// Proportional gain in [0.0, 1.0]. When absent the persisted profile
    /// value (or the algorithm default) is used.
    pub control_gain: Option<f64>,
    /// Buffered points required before drift inference (0 disables inference).
    /// When absent the persisted profile value (or the default) is used.
    pub min_points_for_inference: Option<i64>,
    /// Guided axis name; selects the settings prefix in the profile
    pub axis: String,
}

impl Default for PredictorCfg {
    fn default() -> Self {
        Self {
            control_gain: None,
            min_points_for_inference: None,
            axis: "ra".to_string(),
        }
    }
}

impl PredictorCfg {
    /// Settings path prefix unique to the guided axis.
    pub fn settings_prefix(&self) -> String {
        format!("/guide_algorithm/{}", self.axis)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KernelVariant {
    /// One square-exponential term plus one periodic term (4 hyperparameters).
    #[default]
    PeriodicSquareExponential,
    /// Two square-exponential terms plus one periodic term (6 hyperparameters).
    PeriodicSquareExponential2,
}

impl KernelVariant {
    pub fn parameter_count(self) -> usize {
        match self {
            KernelVariant::PeriodicSquareExponential => 4,
            KernelVariant::PeriodicSquareExponential2 => 6,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct KernelCfg {
    pub variant: KernelVariant,
    /// Log-space hyperparameters; zeros of the variant's length when absent.
    pub hyperparameters: Option<Vec<f64>>,
    /// Natural log of the period length; unset leaves the periodic term flat.
    pub log_period: Option<f64>,
}

impl KernelCfg {
    /// Hyperparameters with the variant-length default filled in.
    pub fn hyperparameters_or_default(&self) -> Vec<f64> {
        self.hyperparameters
            .clone()
            .unwrap_or_else(|| vec![0.0; self.variant.parameter_count()])
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ProfileCfg {
    /// Path to the persisted settings profile (TOML). Volatile when absent.
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub predictor: PredictorCfg,
    #[serde(default)]
    pub kernel: KernelCfg,
    #[serde(default)]
    pub profile: ProfileCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Predictor
        if let Some(gain) = self.predictor.control_gain
            && (!gain.is_finite() || !(0.0..=1.0).contains(&gain))
        {
            eyre::bail!("predictor.control_gain must be in [0.0, 1.0]");
        }
        if let Some(n) = self.predictor.min_points_for_inference
            && n < 0
        {
            eyre::bail!("predictor.min_points_for_inference must be >= 0");
        }
        if self.predictor.axis.trim().is_empty() {
            eyre::bail!("predictor.axis must not be empty");
        }
        if self.predictor.axis.contains('/') {
            eyre::bail!("predictor.axis must not contain '/'");
        }

        // Kernel
        if let Some(h) = &self.kernel.hyperparameters {
            let want = self.kernel.variant.parameter_count();
            if h.len() != want {
                eyre::bail!(
                    "kernel.hyperparameters must have {} entries for {:?}, got {}",
                    want,
                    self.kernel.variant,
                    h.len()
                );
            }
            if h.iter().any(|v| !v.is_finite()) {
                eyre::bail!("kernel.hyperparameters must be finite");
            }
        }
        if let Some(p) = self.kernel.log_period
            && !p.is_finite()
        {
            eyre::bail!("kernel.log_period must be finite");
        }

        // Logging
        if let Some(level) = self.logging.level.as_deref()
            && !matches!(
                level.to_ascii_lowercase().as_str(),
                "error" | "warn" | "info" | "debug" | "trace"
            )
        {
            eyre::bail!("logging.level must be one of error|warn|info|debug|trace");
        }
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(
                rot.to_ascii_lowercase().as_str(),
                "never" | "daily" | "hourly"
            )
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        // Profile
        if let Some(p) = self.profile.path.as_deref()
            && p.trim().is_empty()
        {
            eyre::bail!("profile.path must not be empty when set");
        }

        Ok(())
    }
}
