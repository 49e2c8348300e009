#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap,
    clippy::similar_names
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Predictive guiding engine (hardware-agnostic).
//!
//! Two independent parts live here:
//!
//! - **Predictor** ([`LinearRegressionGuide`]): per-axis closed-loop guide
//!   algorithm. Keeps a bounded history of measurements, reconstructs the
//!   uncorrected error by adding back past controls, fits a ridge-regularized
//!   line and issues proportional control plus the predicted drift over the
//!   next exposure.
//! - **Kernels** ([`kernel`]): composite square-exponential + periodic
//!   covariance functions with exact hyperparameter gradients and Hessians,
//!   used by Gaussian-process based guiding.
//!
//! Time is read through `guide_traits::Clock` and tuning is persisted through
//! `guide_traits::SettingsStore`, so both can be replaced in tests and replays.
//!
//! ## Units
//!
//! Measurements and controls share the caller's unit (pixels or arcseconds).
//! Exposures are integer milliseconds; timestamps are seconds since the first
//! point of the current history.

pub mod config;
pub mod conversions;
pub mod error;
pub mod history;
pub mod kernel;
pub mod predictor;
pub mod regression;
pub mod runner;
pub mod util;

pub use config::PredictorCfg;
pub use error::{GuideError, KernelError, Report, Result};
pub use history::{HistoryBuffer, MeasurementPoint};
pub use kernel::{
    CovarianceFunction, Kernel, KernelEvaluation, KernelKind, PeriodicSquareExponential,
    PeriodicSquareExponential2,
};
pub use predictor::{ConfigureReport, GuideAlgorithm, LinearRegressionGuide, Setting};
pub use regression::LineFit;
pub use runner::{ReplayStats, ReplayStep, replay};
