//! Runtime configuration for the linear-regression guide algorithm.
//!
//! Separate from the TOML-deserialized config in `guide_config`.

/// Default proportional gain, substituted when an invalid gain is supplied.
pub const DEFAULT_CONTROL_GAIN: f64 = 1.0;
/// Default point count before drift inference starts.
pub const DEFAULT_MIN_POINTS_FOR_INFERENCE: i64 = 25;
/// Ring capacity of the per-axis measurement history.
pub const HISTORY_CAPACITY: usize = 200;
/// Ridge constant added to both diagonal entries of the normal equations.
pub const RIDGE_REGULARIZATION: f64 = 1e-3;

/// Profile key suffix for the control gain.
pub const CONTROL_GAIN_KEY: &str = "lr_control_gain";
/// Profile key suffix for the inference threshold.
pub const MIN_POINTS_KEY: &str = "lr_min_points_for_inference";

/// Predictor construction parameters.
///
/// `None` values keep whatever the settings store holds (or the defaults).
#[derive(Debug, Clone)]
pub struct PredictorCfg {
    /// Settings path prefix unique to the guided axis, e.g. `/guide_algorithm/ra`.
    pub settings_prefix: String,
    /// Explicit gain override; persisted when applied.
    pub control_gain: Option<f64>,
    /// Explicit inference threshold override; persisted when applied.
    pub min_points_for_inference: Option<i64>,
}

impl Default for PredictorCfg {
    fn default() -> Self {
        Self {
            settings_prefix: "/guide_algorithm/ra".to_string(),
            control_gain: None,
            min_points_for_inference: None,
        }
    }
}
