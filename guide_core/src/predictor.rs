//! History-compensated linear-regression guide algorithm.
//!
//! Each guide cycle the caller hands in the measured position error of one
//! axis. The predictor keeps a bounded history, reconstructs the error that
//! would have accumulated without any correction (by adding back every
//! issued control), fits a ridge-regularized line to that reconstruction and
//! issues
//!
//! ```text
//! control = gain * measurement + slope * exposure_s
//! ```
//!
//! where the drift term only kicks in once more than
//! `min_points_for_inference` points are buffered. Below the threshold the
//! output is plain proportional control.
//!
//! Tuning is persisted through a [`SettingsStore`] under a path prefix unique
//! to the guided axis. Invalid values never leave the predictor in an
//! undefined state: they are replaced by the documented defaults, the
//! substitution is persisted and reported back as [`Setting::Defaulted`].

use std::time::Instant;

use guide_traits::{Clock, MonotonicClock, SettingsStore};

use crate::config::{
    CONTROL_GAIN_KEY, DEFAULT_CONTROL_GAIN, DEFAULT_MIN_POINTS_FOR_INFERENCE, MIN_POINTS_KEY,
    PredictorCfg, RIDGE_REGULARIZATION,
};
use crate::error::{GuideError, Result};
use crate::history::{HistoryBuffer, MeasurementPoint};
use crate::regression::{LineFit, ridge_fit_line};
use crate::util::{MILLIS_PER_SEC, exposure_secs};

/// Outcome of updating a tunable.
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use]
pub enum Setting<T> {
    /// The requested value was stored.
    Accepted(T),
    /// The requested value was invalid; `applied` was stored instead.
    Defaulted { rejected: T, applied: T },
}

impl<T: Copy> Setting<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Setting::Accepted(_))
    }

    /// The value now in effect.
    pub fn value(&self) -> T {
        match *self {
            Setting::Accepted(v) => v,
            Setting::Defaulted { applied, .. } => applied,
        }
    }
}

/// Outcome of [`LinearRegressionGuide::configure`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use]
pub struct ConfigureReport {
    pub control_gain: Setting<f64>,
    pub min_points_for_inference: Setting<i64>,
}

impl ConfigureReport {
    pub fn is_ok(&self) -> bool {
        self.control_gain.is_ok() && self.min_points_for_inference.is_ok()
    }
}

/// Common interface of guide algorithms driven once per guide cycle.
pub trait GuideAlgorithm {
    /// Consume a new measurement and return the control to issue.
    fn step(&mut self, measurement: f64, exposure_ms: u32) -> f64;
    /// Return a control for a cycle without a measurement.
    fn predict_only(&mut self, exposure_ms: u32) -> f64;
    /// Forget all history.
    fn reset(&mut self);
    /// One-line human-readable dump of the current tuning.
    fn settings_summary(&self) -> String;
}

/// Linear-regression guide algorithm for one axis.
///
/// Single-threaded: owns its history and stopwatch exclusively.
pub struct LinearRegressionGuide<S: SettingsStore, C: Clock = MonotonicClock> {
    store: S,
    config_path: String,
    clock: C,
    history: HistoryBuffer,
    // Stopwatch origin; armed by the first point of an empty buffer.
    stopwatch: Option<Instant>,
    last_timestamp_ms: f64,
    control_signal: f64,
    control_gain: f64,
    min_points_for_inference: usize,
    last_fit: Option<LineFit>,
}

impl<S: SettingsStore, C: Clock> core::fmt::Debug for LinearRegressionGuide<S, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LinearRegressionGuide")
            .field("config_path", &self.config_path)
            .field("control_gain", &self.control_gain)
            .field("min_points_for_inference", &self.min_points_for_inference)
            .field("points", &self.history.len())
            .field("control_signal", &self.control_signal)
            .finish()
    }
}

impl<S: SettingsStore, C: Clock> LinearRegressionGuide<S, C> {
    /// Create a predictor whose tuning lives under `config_path` in `store`.
    ///
    /// Stored values are read with the documented defaults and pushed through
    /// the validating setters, so a corrupt profile is repaired on load.
    pub fn new(store: S, config_path: impl Into<String>, clock: C) -> Self {
        let mut guide = Self {
            store,
            config_path: config_path.into(),
            clock,
            history: HistoryBuffer::new(),
            stopwatch: None,
            last_timestamp_ms: 0.0,
            control_signal: 0.0,
            control_gain: DEFAULT_CONTROL_GAIN,
            min_points_for_inference: DEFAULT_MIN_POINTS_FOR_INFERENCE as usize,
            last_fit: None,
        };

        let gain = guide
            .store
            .get_f64(&guide.key(CONTROL_GAIN_KEY), DEFAULT_CONTROL_GAIN);
        let _ = guide.set_control_gain(gain);
        let min_points = guide
            .store
            .get_i64(&guide.key(MIN_POINTS_KEY), DEFAULT_MIN_POINTS_FOR_INFERENCE);
        let _ = guide.set_min_points_for_inference(min_points);

        guide.reset();
        guide
    }

    /// Build from runtime config, applying explicit overrides on top of the
    /// stored values.
    pub fn from_cfg(store: S, clock: C, cfg: &PredictorCfg) -> Result<(Self, ConfigureReport)> {
        if cfg.settings_prefix.trim().is_empty() {
            return Err(GuideError::Config("settings prefix must not be empty".into()).into());
        }
        let mut guide = Self::new(store, cfg.settings_prefix.clone(), clock);
        let report = ConfigureReport {
            control_gain: match cfg.control_gain {
                Some(g) => guide.set_control_gain(g),
                None => Setting::Accepted(guide.control_gain),
            },
            min_points_for_inference: match cfg.min_points_for_inference {
                Some(n) => guide.set_min_points_for_inference(n),
                None => Setting::Accepted(guide.min_points_for_inference as i64),
            },
        };
        Ok((guide, report))
    }

    fn key(&self, name: &str) -> String {
        format!("{}/{}", self.config_path, name)
    }

    /// Set the proportional gain. Values outside `[0, 1]` (or NaN) are
    /// replaced by the default. The applied value is persisted either way.
    pub fn set_control_gain(&mut self, control_gain: f64) -> Setting<f64> {
        let outcome = if (0.0..=1.0).contains(&control_gain) {
            Setting::Accepted(control_gain)
        } else {
            tracing::warn!(
                requested = control_gain,
                applied = DEFAULT_CONTROL_GAIN,
                "invalid control gain, using default"
            );
            Setting::Defaulted {
                rejected: control_gain,
                applied: DEFAULT_CONTROL_GAIN,
            }
        };
        self.control_gain = outcome.value();
        let key = self.key(CONTROL_GAIN_KEY);
        self.store.set_f64(&key, self.control_gain);
        outcome
    }

    /// Set the number of buffered points required before drift inference.
    /// Negative values are replaced by the default; `0` disables inference.
    pub fn set_min_points_for_inference(&mut self, min_points: i64) -> Setting<i64> {
        let outcome = if min_points >= 0 {
            Setting::Accepted(min_points)
        } else {
            tracing::warn!(
                requested = min_points,
                applied = DEFAULT_MIN_POINTS_FOR_INFERENCE,
                "invalid number of points for inference, using default"
            );
            Setting::Defaulted {
                rejected: min_points,
                applied: DEFAULT_MIN_POINTS_FOR_INFERENCE,
            }
        };
        let applied = outcome.value();
        self.min_points_for_inference = usize::try_from(applied).unwrap_or(usize::MAX);
        let key = self.key(MIN_POINTS_KEY);
        self.store.set_i64(&key, applied);
        outcome
    }

    /// Update both tunables.
    pub fn configure(&mut self, control_gain: f64, min_points: i64) -> ConfigureReport {
        ConfigureReport {
            control_gain: self.set_control_gain(control_gain),
            min_points_for_inference: self.set_min_points_for_inference(min_points),
        }
    }

    pub fn control_gain(&self) -> f64 {
        self.control_gain
    }

    pub fn min_points_for_inference(&self) -> usize {
        self.min_points_for_inference
    }

    /// Most recently emitted control.
    pub fn control_signal(&self) -> f64 {
        self.control_signal
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Fit used by the most recent prediction, if inference ran.
    pub fn last_fit(&self) -> Option<LineFit> {
        self.last_fit
    }

    pub fn config_path(&self) -> &str {
        &self.config_path
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Release the settings store (e.g. to save a profile).
    pub fn into_store(self) -> S {
        self.store
    }

    /// Whether the drift term is active for the current history.
    pub fn inference_active(&self) -> bool {
        self.min_points_for_inference > 0 && self.history.len() > self.min_points_for_inference
    }

    /// Timestamp for a point about to be appended: the midpoint between the
    /// previous sample time and now, in seconds.
    fn next_timestamp(&mut self) -> f64 {
        let epoch = match self.stopwatch {
            Some(epoch) if !self.history.is_empty() => epoch,
            _ => {
                let epoch = self.clock.now();
                self.stopwatch = Some(epoch);
                self.last_timestamp_ms = 0.0;
                epoch
            }
        };
        let now_ms = self.clock.ms_since(epoch) as f64;
        let delta_ms = now_ms - self.last_timestamp_ms;
        self.last_timestamp_ms = now_ms;
        (now_ms - delta_ms / 2.0) / MILLIS_PER_SEC
    }

    /// Drift expected over the upcoming exposure, or `None` below the
    /// inference threshold.
    fn predicted_drift(&mut self, exposure_ms: u32) -> Option<f64> {
        if !self.inference_active() {
            self.last_fit = None;
            return None;
        }
        let samples = self
            .history
            .iter_chronological()
            .map(|p| (p.timestamp, p.modified_measurement));
        let Some(fit) = ridge_fit_line(samples, RIDGE_REGULARIZATION) else {
            tracing::warn!(
                points = self.history.len(),
                "drift regression is not solvable, skipping prediction"
            );
            self.last_fit = None;
            return None;
        };
        self.last_fit = Some(fit);
        let drift = fit.slope * exposure_secs(exposure_ms);
        tracing::debug!(
            slope = fit.slope,
            intercept = fit.intercept,
            points = fit.points,
            exposure_ms,
            drift,
            "drift prediction"
        );
        Some(drift)
    }

    fn record_control(&mut self, control: f64) {
        self.control_signal = control;
        if let Some(latest) = self.history.latest_mut() {
            latest.control = control;
        }
    }

    /// Consume a measurement and return the control to issue.
    pub fn step(&mut self, measurement: f64, exposure_ms: u32) -> f64 {
        let timestamp = self.next_timestamp();
        let modified_measurement = MeasurementPoint::reconstruct(measurement, self.history.latest());
        self.history.push(MeasurementPoint {
            timestamp,
            measurement,
            modified_measurement,
            control: 0.0,
        });

        let mut control = self.control_gain * measurement;
        if let Some(drift) = self.predicted_drift(exposure_ms) {
            control += drift;
        }
        self.record_control(control);

        tracing::trace!(
            timestamp,
            measurement,
            modified_measurement,
            control,
            points = self.history.len(),
            "guide step"
        );
        control
    }

    /// Control for a cycle without a new measurement: the drift term alone.
    ///
    /// Returns `0.0` below the inference threshold. The result is recorded as
    /// the control of the newest point.
    pub fn predict_only(&mut self, exposure_ms: u32) -> f64 {
        if self.history.is_empty() {
            self.control_signal = 0.0;
            self.last_fit = None;
            return 0.0;
        }
        let control = self.predicted_drift(exposure_ms).unwrap_or(0.0);
        self.record_control(control);
        control
    }

    /// Clear the history and re-arm the stopwatch. Tuning is kept.
    pub fn reset(&mut self) {
        self.history.clear();
        self.stopwatch = None;
        self.last_timestamp_ms = 0.0;
        self.control_signal = 0.0;
        self.last_fit = None;
    }

    pub fn settings_summary(&self) -> String {
        format!("Control Gain = {:.3}\n", self.control_gain)
    }
}

impl<S: SettingsStore, C: Clock> GuideAlgorithm for LinearRegressionGuide<S, C> {
    fn step(&mut self, measurement: f64, exposure_ms: u32) -> f64 {
        LinearRegressionGuide::step(self, measurement, exposure_ms)
    }

    fn predict_only(&mut self, exposure_ms: u32) -> f64 {
        LinearRegressionGuide::predict_only(self, exposure_ms)
    }

    fn reset(&mut self) {
        LinearRegressionGuide::reset(self);
    }

    fn settings_summary(&self) -> String {
        LinearRegressionGuide::settings_summary(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guide_traits::{ManualClock, MemoryStore};

    const PREFIX: &str = "/guide_algorithm/ra";

    fn guide() -> (LinearRegressionGuide<MemoryStore, ManualClock>, ManualClock) {
        let clk = ManualClock::new();
        let g = LinearRegressionGuide::new(MemoryStore::new(), PREFIX, clk.clone());
        (g, clk)
    }

    #[test]
    fn construction_persists_defaults() {
        let (g, _) = guide();
        assert_eq!(g.control_gain(), DEFAULT_CONTROL_GAIN);
        assert_eq!(g.min_points_for_inference(), 25);
        assert_eq!(
            g.store().get_f64("/guide_algorithm/ra/lr_control_gain", -1.0),
            1.0
        );
        assert_eq!(
            g.store()
                .get_i64("/guide_algorithm/ra/lr_min_points_for_inference", -1),
            25
        );
    }

    #[test]
    fn construction_reads_stored_values() {
        let mut store = MemoryStore::new();
        store.set_f64("/guide_algorithm/dec/lr_control_gain", 0.6);
        store.set_i64("/guide_algorithm/dec/lr_min_points_for_inference", 4);
        let g = LinearRegressionGuide::new(store, "/guide_algorithm/dec", ManualClock::new());
        assert_eq!(g.control_gain(), 0.6);
        assert_eq!(g.min_points_for_inference(), 4);
    }

    #[test]
    fn corrupt_stored_gain_is_repaired() {
        let mut store = MemoryStore::new();
        store.set_f64("/p/lr_control_gain", 3.0);
        let g = LinearRegressionGuide::new(store, "/p", ManualClock::new());
        assert_eq!(g.control_gain(), DEFAULT_CONTROL_GAIN);
        assert_eq!(g.store().get_f64("/p/lr_control_gain", -1.0), 1.0);
    }

    #[test]
    fn nan_gain_is_rejected() {
        let (mut g, _) = guide();
        let s = g.set_control_gain(f64::NAN);
        assert!(!s.is_ok());
        assert_eq!(g.control_gain(), DEFAULT_CONTROL_GAIN);
    }

    #[test]
    fn timestamps_are_interval_midpoints() {
        let (mut g, clk) = guide();
        g.step(0.0, 1000);
        clk.advance_ms(1000);
        g.step(0.0, 1000);
        clk.advance_ms(3000);
        g.step(0.0, 1000);
        let ts: Vec<f64> = g.history().iter_chronological().map(|p| p.timestamp).collect();
        assert_eq!(ts, vec![0.0, 0.5, 2.5]);
    }

    #[test]
    fn predict_only_on_empty_history_is_zero() {
        let (mut g, _) = guide();
        assert_eq!(g.predict_only(2000), 0.0);
        assert!(g.history().is_empty());
    }

    #[test]
    fn summary_format() {
        let (mut g, _) = guide();
        let _ = g.set_control_gain(0.8);
        assert_eq!(g.settings_summary(), "Control Gain = 0.800\n");
    }

    #[test]
    fn from_cfg_applies_overrides_over_store() {
        let mut store = MemoryStore::new();
        store.set_f64("/g/lr_control_gain", 0.3);
        let cfg = PredictorCfg {
            settings_prefix: "/g".into(),
            control_gain: Some(0.9),
            min_points_for_inference: None,
        };
        let (g, report) = LinearRegressionGuide::from_cfg(store, ManualClock::new(), &cfg)
            .expect("valid cfg");
        assert!(report.is_ok());
        assert_eq!(g.control_gain(), 0.9);
        assert_eq!(g.min_points_for_inference(), 25);
        assert_eq!(g.store().get_f64("/g/lr_control_gain", 0.0), 0.9);
    }

    #[test]
    fn from_cfg_rejects_empty_prefix() {
        let cfg = PredictorCfg {
            settings_prefix: " ".into(),
            ..Default::default()
        };
        let err = LinearRegressionGuide::from_cfg(MemoryStore::new(), ManualClock::new(), &cfg)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GuideError>(),
            Some(GuideError::Config(_))
        ));
    }
}
