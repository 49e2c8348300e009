//! Composite covariance kernels with exact hyperparameter derivatives.
//!
//! Two variants share one capability set ([`CovarianceFunction`]):
//!
//! - [`PeriodicSquareExponential`]: square-exponential + periodic,
//!   hyperparameters `[ln ls_se, ln sd_se, ln ls_per, ln sd_per]`.
//! - [`PeriodicSquareExponential2`]: the above plus a second
//!   square-exponential term, `[.., ln ls_se2, ln sd_se2]`.
//!
//! Both take one extra parameter, the natural log of the period. It is not
//! learned and defaults to `f64::MAX` (unset).
//!
//! ## Evaluation bundles
//!
//! [`CovarianceFunction::evaluate`] returns a [`KernelEvaluation`] holding the
//! covariance matrix together with every intermediate the derivatives need.
//! Gradients and Hessians are pure functions of that bundle, so derivatives
//! always belong to the evaluation they are computed from and independent
//! evaluations may be held (or computed on other threads) at the same time.
//!
//! ## Derivative layout
//!
//! - gradient: one matrix per hyperparameter, in parameter order.
//! - Hessian: `hessian[i][j]`, square over the parameter count. Only the 2x2
//!   blocks of each component are populated; every other entry is an all-zero
//!   matrix of the covariance shape.

use ndarray::Array2;

use crate::error::KernelError;

mod periodic;
mod terms;

pub use periodic::{PeriodicSquareExponential, PeriodicSquareExponential2};
use terms::Component;

/// Extra parameter value meaning "no period configured".
pub const UNSET_LOG_PERIOD: f64 = f64::MAX;

/// Which kernel variant produced an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    PeriodicSquareExponential,
    PeriodicSquareExponential2,
}

impl KernelKind {
    pub fn parameter_count(self) -> usize {
        match self {
            KernelKind::PeriodicSquareExponential => 4,
            KernelKind::PeriodicSquareExponential2 => 6,
        }
    }

    pub fn extra_parameter_count(self) -> usize {
        1
    }
}

/// Covariance matrix plus the intermediates of the evaluation that made it.
#[derive(Debug, Clone)]
pub struct KernelEvaluation {
    kind: KernelKind,
    covariance: Array2<f64>,
    // In hyperparameter order, two parameters per component.
    components: Vec<Component>,
}

impl KernelEvaluation {
    fn from_components(kind: KernelKind, shape: (usize, usize), components: Vec<Component>) -> Self {
        let mut covariance = Array2::<f64>::zeros(shape);
        for c in &components {
            covariance += c.covariance();
        }
        tracing::trace!(rows = shape.0, cols = shape.1, ?kind, "kernel evaluated");
        Self {
            kind,
            covariance,
            components,
        }
    }

    pub fn kind(&self) -> KernelKind {
        self.kind
    }

    pub fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }

    pub fn into_covariance(self) -> Array2<f64> {
        self.covariance
    }

    /// `(len(x), len(y))`.
    pub fn shape(&self) -> (usize, usize) {
        self.covariance.dim()
    }

    pub fn parameter_count(&self) -> usize {
        2 * self.components.len()
    }

    /// Partial derivative of the covariance for each hyperparameter.
    pub fn gradient(&self) -> Vec<Array2<f64>> {
        self.components.iter().flat_map(Component::gradient).collect()
    }

    /// Second partial derivatives, block diagonal per component.
    pub fn hessian(&self) -> Vec<Vec<Array2<f64>>> {
        let n = self.parameter_count();
        let zero = Array2::<f64>::zeros(self.shape());
        let mut hessian = vec![vec![zero; n]; n];
        for (b, component) in self.components.iter().enumerate() {
            let base = 2 * b;
            for (i, row) in component.hessian().into_iter().enumerate() {
                for (j, m) in row.into_iter().enumerate() {
                    hessian[base + i][base + j] = m;
                }
            }
        }
        hessian
    }
}

/// Uniform capability set of the covariance kernels.
pub trait CovarianceFunction {
    fn kind(&self) -> KernelKind;

    /// Covariance between the point sets `x` (rows) and `y` (columns).
    fn evaluate(&self, x: &[f64], y: &[f64]) -> KernelEvaluation;

    fn parameters(&self) -> &[f64];

    /// Replace the log-space hyperparameters. Fails without modifying the
    /// kernel when the length is not `parameter_count()` or a value is not
    /// finite.
    fn set_parameters(&mut self, params: &[f64]) -> Result<(), KernelError>;

    fn extra_parameters(&self) -> &[f64];

    /// Replace the fixed parameters (`[ln period]`). Same checks as
    /// `set_parameters`.
    fn set_extra_parameters(&mut self, params: &[f64]) -> Result<(), KernelError>;

    fn parameter_count(&self) -> usize {
        self.kind().parameter_count()
    }

    fn extra_parameter_count(&self) -> usize {
        self.kind().extra_parameter_count()
    }

    /// Gradient of an evaluation produced by this kernel variant.
    fn gradient(&self, evaluation: &KernelEvaluation) -> Result<Vec<Array2<f64>>, KernelError> {
        check_kind(self.kind(), evaluation)?;
        Ok(evaluation.gradient())
    }

    /// Hessian of an evaluation produced by this kernel variant.
    fn hessian(
        &self,
        evaluation: &KernelEvaluation,
    ) -> Result<Vec<Vec<Array2<f64>>>, KernelError> {
        check_kind(self.kind(), evaluation)?;
        Ok(evaluation.hessian())
    }
}

fn check_kind(expected: KernelKind, evaluation: &KernelEvaluation) -> Result<(), KernelError> {
    if evaluation.kind != expected {
        return Err(KernelError::EvaluationMismatch {
            expected,
            got: evaluation.kind,
        });
    }
    Ok(())
}

pub(crate) fn check_values(
    what: &'static str,
    expected: usize,
    params: &[f64],
) -> Result<(), KernelError> {
    if params.len() != expected {
        return Err(KernelError::ParameterCount {
            what,
            expected,
            got: params.len(),
        });
    }
    if let Some(index) = params.iter().position(|v| !v.is_finite()) {
        return Err(KernelError::NonFinite { what, index });
    }
    Ok(())
}

/// Runtime-selected kernel variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Kernel {
    PeriodicSquareExponential(PeriodicSquareExponential),
    PeriodicSquareExponential2(PeriodicSquareExponential2),
}

impl Kernel {
    /// Variant with zero hyperparameters and an unset period.
    pub fn new(kind: KernelKind) -> Self {
        match kind {
            KernelKind::PeriodicSquareExponential => {
                Kernel::PeriodicSquareExponential(PeriodicSquareExponential::default())
            }
            KernelKind::PeriodicSquareExponential2 => {
                Kernel::PeriodicSquareExponential2(PeriodicSquareExponential2::default())
            }
        }
    }

    fn inner(&self) -> &dyn CovarianceFunction {
        match self {
            Kernel::PeriodicSquareExponential(k) => k,
            Kernel::PeriodicSquareExponential2(k) => k,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn CovarianceFunction {
        match self {
            Kernel::PeriodicSquareExponential(k) => k,
            Kernel::PeriodicSquareExponential2(k) => k,
        }
    }
}

impl CovarianceFunction for Kernel {
    fn kind(&self) -> KernelKind {
        self.inner().kind()
    }

    fn evaluate(&self, x: &[f64], y: &[f64]) -> KernelEvaluation {
        self.inner().evaluate(x, y)
    }

    fn parameters(&self) -> &[f64] {
        self.inner().parameters()
    }

    fn set_parameters(&mut self, params: &[f64]) -> Result<(), KernelError> {
        self.inner_mut().set_parameters(params)
    }

    fn extra_parameters(&self) -> &[f64] {
        self.inner().extra_parameters()
    }

    fn set_extra_parameters(&mut self, params: &[f64]) -> Result<(), KernelError> {
        self.inner_mut().set_extra_parameters(params)
    }
}
