//! Elementwise kernel components and their closed-form derivatives.
//!
//! Every component owns exactly two log-space hyperparameters
//! `(ln lengthscale, ln signal sd)` and keeps the intermediates its
//! derivatives need. Components are additive and parameter-disjoint, so the
//! Hessian of a composite kernel is block diagonal with one 2x2 block per
//! component.

use std::f64::consts::PI;

use ndarray::{Array2, Zip};

/// Pairwise squared distances `(x_i - y_j)^2`.
pub(crate) fn square_distance(x: &[f64], y: &[f64]) -> Array2<f64> {
    Array2::from_shape_fn((x.len(), y.len()), |(i, j)| {
        let d = x[i] - y[j];
        d * d
    })
}

#[derive(Debug, Clone)]
pub(crate) enum Component {
    /// `K = sv * exp(-E / 2)` with `E = D² / ls²`.
    SquareExponential { e: Array2<f64>, k: Array2<f64> },
    /// `K = sv * exp(-2Q)` with `Q = (sin(pi D / period) / ls)²`.
    Periodic { q: Array2<f64>, k: Array2<f64> },
}

impl Component {
    pub(crate) fn square_exponential(d2: &Array2<f64>, log_ls: f64, log_sd: f64) -> Self {
        let ls = log_ls.exp();
        let sv = (2.0 * log_sd).exp();
        let e = d2.mapv(|v| v / (ls * ls));
        let k = e.mapv(|e| sv * (-0.5 * e).exp());
        Component::SquareExponential { e, k }
    }

    /// `log_period` of `f64::MAX` (unset) sends the period to infinity, which
    /// collapses the component to the constant `sv`.
    pub(crate) fn periodic(dist: &Array2<f64>, log_ls: f64, log_sd: f64, log_period: f64) -> Self {
        let ls = log_ls.exp();
        let sv = (2.0 * log_sd).exp();
        let period = log_period.exp();
        let q = dist.mapv(|d| {
            let s = (PI * d / period).sin() / ls;
            s * s
        });
        let k = q.mapv(|q| sv * (-2.0 * q).exp());
        Component::Periodic { q, k }
    }

    pub(crate) fn covariance(&self) -> &Array2<f64> {
        match self {
            Component::SquareExponential { k, .. } | Component::Periodic { k, .. } => k,
        }
    }

    /// `[dK/d ln ls, dK/d ln sd]`.
    pub(crate) fn gradient(&self) -> [Array2<f64>; 2] {
        match self {
            Component::SquareExponential { e, k } => [
                Zip::from(k).and(e).map_collect(|&k, &e| k * e),
                k.mapv(|k| 2.0 * k),
            ],
            Component::Periodic { q, k } => [
                Zip::from(k).and(q).map_collect(|&k, &q| 4.0 * k * q),
                k.mapv(|k| 2.0 * k),
            ],
        }
    }

    /// Second derivatives over `(ln ls, ln sd)`.
    pub(crate) fn hessian(&self) -> [[Array2<f64>; 2]; 2] {
        match self {
            Component::SquareExponential { e, k } => {
                let cross = Zip::from(k).and(e).map_collect(|&k, &e| 2.0 * k * e);
                [
                    [
                        Zip::from(k)
                            .and(e)
                            .map_collect(|&k, &e| k * (e * e - 2.0 * e)),
                        cross.clone(),
                    ],
                    [cross, k.mapv(|k| 4.0 * k)],
                ]
            }
            Component::Periodic { q, k } => {
                let cross = Zip::from(k).and(q).map_collect(|&k, &q| 8.0 * k * q);
                [
                    [
                        Zip::from(k)
                            .and(q)
                            .map_collect(|&k, &q| k * (16.0 * q * q - 8.0 * q)),
                        cross.clone(),
                    ],
                    [cross, k.mapv(|k| 4.0 * k)],
                ]
            }
        }
    }
}
