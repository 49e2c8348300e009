use super::terms::{Component, square_distance};
use super::{CovarianceFunction, KernelEvaluation, KernelKind, UNSET_LOG_PERIOD, check_values};
use crate::error::KernelError;

/// Square-exponential plus periodic kernel.
///
/// Hyperparameters: `[ln ls_se, ln sd_se, ln ls_per, ln sd_per]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicSquareExponential {
    hyperparameters: [f64; 4],
    extra_parameters: [f64; 1],
}

impl Default for PeriodicSquareExponential {
    fn default() -> Self {
        Self::new([0.0; 4])
    }
}

impl PeriodicSquareExponential {
    pub fn new(hyperparameters: [f64; 4]) -> Self {
        Self {
            hyperparameters,
            extra_parameters: [UNSET_LOG_PERIOD],
        }
    }

    /// Set the period as its natural log.
    pub fn with_log_period(mut self, log_period: f64) -> Self {
        self.extra_parameters = [log_period];
        self
    }
}

impl CovarianceFunction for PeriodicSquareExponential {
    fn kind(&self) -> KernelKind {
        KernelKind::PeriodicSquareExponential
    }

    fn evaluate(&self, x: &[f64], y: &[f64]) -> KernelEvaluation {
        let [ls_se, sd_se, ls_per, sd_per] = self.hyperparameters;
        let d2 = square_distance(x, y);
        let dist = d2.mapv(f64::sqrt);
        let components = vec![
            Component::square_exponential(&d2, ls_se, sd_se),
            Component::periodic(&dist, ls_per, sd_per, self.extra_parameters[0]),
        ];
        KernelEvaluation::from_components(self.kind(), d2.dim(), components)
    }

    fn parameters(&self) -> &[f64] {
        &self.hyperparameters
    }

    fn set_parameters(&mut self, params: &[f64]) -> Result<(), KernelError> {
        check_values("hyperparameters", self.hyperparameters.len(), params)?;
        self.hyperparameters.copy_from_slice(params);
        Ok(())
    }

    fn extra_parameters(&self) -> &[f64] {
        &self.extra_parameters
    }

    fn set_extra_parameters(&mut self, params: &[f64]) -> Result<(), KernelError> {
        check_values("extra parameters", self.extra_parameters.len(), params)?;
        self.extra_parameters.copy_from_slice(params);
        Ok(())
    }
}

/// Two square-exponential terms plus a periodic kernel, e.g. a long-range
/// drift term next to a short-range seeing term.
///
/// Hyperparameters:
/// `[ln ls_se, ln sd_se, ln ls_per, ln sd_per, ln ls_se2, ln sd_se2]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicSquareExponential2 {
    hyperparameters: [f64; 6],
    extra_parameters: [f64; 1],
}

impl Default for PeriodicSquareExponential2 {
    fn default() -> Self {
        Self::new([0.0; 6])
    }
}

impl PeriodicSquareExponential2 {
    pub fn new(hyperparameters: [f64; 6]) -> Self {
        Self {
            hyperparameters,
            extra_parameters: [UNSET_LOG_PERIOD],
        }
    }

    pub fn with_log_period(mut self, log_period: f64) -> Self {
        self.extra_parameters = [log_period];
        self
    }
}

impl CovarianceFunction for PeriodicSquareExponential2 {
    fn kind(&self) -> KernelKind {
        KernelKind::PeriodicSquareExponential2
    }

    fn evaluate(&self, x: &[f64], y: &[f64]) -> KernelEvaluation {
        let [ls_se, sd_se, ls_per, sd_per, ls_se2, sd_se2] = self.hyperparameters;
        let d2 = square_distance(x, y);
        let dist = d2.mapv(f64::sqrt);
        let components = vec![
            Component::square_exponential(&d2, ls_se, sd_se),
            Component::periodic(&dist, ls_per, sd_per, self.extra_parameters[0]),
            Component::square_exponential(&d2, ls_se2, sd_se2),
        ];
        KernelEvaluation::from_components(self.kind(), d2.dim(), components)
    }

    fn parameters(&self) -> &[f64] {
        &self.hyperparameters
    }

    fn set_parameters(&mut self, params: &[f64]) -> Result<(), KernelError> {
        check_values("hyperparameters", self.hyperparameters.len(), params)?;
        self.hyperparameters.copy_from_slice(params);
        Ok(())
    }

    fn extra_parameters(&self) -> &[f64] {
        &self.extra_parameters
    }

    fn set_extra_parameters(&mut self, params: &[f64]) -> Result<(), KernelError> {
        check_values("extra parameters", self.extra_parameters.len(), params)?;
        self.extra_parameters.copy_from_slice(params);
        Ok(())
    }
}
