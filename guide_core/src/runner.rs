//! Offline replay of recorded guide traces.
//!
//! Time is simulated: before each cycle the shared [`ManualClock`] advances
//! by the cycle's exposure, then the measurement (or, for a dropped frame, a
//! prediction-only request) is fed to the predictor.

use guide_config::TraceRow;
use guide_traits::{ManualClock, SettingsStore};

use crate::predictor::LinearRegressionGuide;

/// Outcome of one replayed guide cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayStep {
    pub index: usize,
    /// Timestamp of the newest history point after the cycle (s).
    pub timestamp: f64,
    /// `None` for a dropped frame.
    pub measurement: Option<f64>,
    pub modified_measurement: Option<f64>,
    pub control: f64,
    /// Whether the drift term contributed to `control`.
    pub inference_active: bool,
}

/// Summary statistics over a replay.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReplayStats {
    pub cycles: usize,
    pub dropped_frames: usize,
    pub inference_cycles: usize,
    /// RMS of the measured errors.
    pub rms_measurement: f64,
}

/// Drive `guide` over `rows`, advancing `clock` by each exposure.
///
/// `clock` must be a clone of the clock owned by `guide`.
pub fn replay<S: SettingsStore>(
    guide: &mut LinearRegressionGuide<S, ManualClock>,
    clock: &ManualClock,
    rows: &[TraceRow],
) -> Vec<ReplayStep> {
    let mut out = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        clock.advance_ms(u64::from(row.exposure_ms));
        let control = match row.measurement {
            Some(m) => guide.step(m, row.exposure_ms),
            None => guide.predict_only(row.exposure_ms),
        };
        let inference_active = guide.last_fit().is_some();
        let latest = guide.history().latest().copied();
        out.push(ReplayStep {
            index,
            timestamp: latest.map_or(0.0, |p| p.timestamp),
            measurement: row.measurement,
            modified_measurement: row
                .measurement
                .and(latest.map(|p| p.modified_measurement)),
            control,
            inference_active,
        });
    }
    tracing::debug!(
        cycles = out.len(),
        points = guide.history().len(),
        "trace replay finished"
    );
    out
}

impl ReplayStats {
    pub fn from_steps(steps: &[ReplayStep]) -> Self {
        let measured: Vec<f64> = steps.iter().filter_map(|s| s.measurement).collect();
        let rms_measurement = if measured.is_empty() {
            0.0
        } else {
            (measured.iter().map(|m| m * m).sum::<f64>() / measured.len() as f64).sqrt()
        };
        Self {
            cycles: steps.len(),
            dropped_frames: steps.len() - measured.len(),
            inference_cycles: steps.iter().filter(|s| s.inference_active).count(),
            rms_measurement,
        }
    }
}
