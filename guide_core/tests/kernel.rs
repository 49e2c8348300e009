//! Finite-difference checks of the analytic kernel derivatives.

use approx::assert_relative_eq;
use guide_core::{CovarianceFunction, Kernel, KernelKind};
use ndarray::Array2;
use proptest::prelude::*;

const EPS: f64 = 1e-5;
const TOL: f64 = 1e-5;

fn kernel(kind: KernelKind, params: &[f64], log_period: f64) -> Kernel {
    let mut k = Kernel::new(kind);
    k.set_parameters(params).expect("valid hyperparameters");
    k.set_extra_parameters(&[log_period]).expect("valid period");
    k
}

fn shifted(params: &[f64], i: usize, by: f64) -> Vec<f64> {
    let mut p = params.to_vec();
    p[i] += by;
    p
}

fn assert_close(got: &Array2<f64>, want: &Array2<f64>, what: &str) {
    assert_eq!(got.dim(), want.dim());
    for (a, b) in got.iter().zip(want.iter()) {
        assert!(
            (a - b).abs() <= TOL * (1.0 + a.abs()),
            "{what}: analytic {a} vs numeric {b}"
        );
    }
}

fn check_derivatives(kind: KernelKind, params: &[f64], log_period: f64, x: &[f64], y: &[f64]) {
    let k = kernel(kind, params, log_period);
    let eval = k.evaluate(x, y);
    let grad = k.gradient(&eval).expect("gradient");
    let hess = k.hessian(&eval).expect("hessian");
    let n = params.len();
    assert_eq!(grad.len(), n);
    assert_eq!(hess.len(), n);

    for i in 0..n {
        let up = kernel(kind, &shifted(params, i, EPS), log_period).evaluate(x, y);
        let down = kernel(kind, &shifted(params, i, -EPS), log_period).evaluate(x, y);
        let numeric = (up.covariance() - down.covariance()) / (2.0 * EPS);
        assert_close(&grad[i], &numeric, &format!("dK/dh{i}"));

        let g_up = up.gradient();
        let g_down = down.gradient();
        for j in 0..n {
            let numeric = (&g_up[j] - &g_down[j]) / (2.0 * EPS);
            assert_close(&hess[j][i], &numeric, &format!("d2K/dh{j}dh{i}"));
            if i / 2 != j / 2 {
                assert!(hess[i][j].iter().all(|&v| v == 0.0));
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn first_variant_derivatives_match_finite_differences(
        params in prop::array::uniform4(-1.0f64..1.0),
        log_period in 0.0f64..1.5,
        x in prop::collection::vec(0.0f64..5.0, 1..5),
        y in prop::collection::vec(0.0f64..5.0, 1..5),
    ) {
        check_derivatives(KernelKind::PeriodicSquareExponential, &params, log_period, &x, &y);
    }

    #[test]
    fn second_variant_derivatives_match_finite_differences(
        params in prop::array::uniform6(-1.0f64..1.0),
        log_period in 0.0f64..1.5,
        x in prop::collection::vec(0.0f64..5.0, 1..5),
        y in prop::collection::vec(0.0f64..5.0, 1..5),
    ) {
        check_derivatives(KernelKind::PeriodicSquareExponential2, &params, log_period, &x, &y);
    }

    #[test]
    fn covariance_of_a_set_with_itself_is_symmetric(
        params in prop::array::uniform6(-1.0f64..1.0),
        log_period in 0.0f64..1.5,
        x in prop::collection::vec(0.0f64..5.0, 1..8),
    ) {
        let k = kernel(KernelKind::PeriodicSquareExponential2, &params, log_period);
        let c = k.evaluate(&x, &x).into_covariance();
        for i in 0..x.len() {
            for j in 0..x.len() {
                prop_assert!((c[[i, j]] - c[[j, i]]).abs() <= 1e-12 * (1.0 + c[[i, j]].abs()));
            }
        }
    }
}

#[test]
fn unset_period_makes_periodic_term_constant() {
    let k = Kernel::new(KernelKind::PeriodicSquareExponential);
    let eval = k.evaluate(&[0.0, 1.0, 4.0], &[0.0, 2.5]);
    // SE(ls = 1, sd = 1) + constant 1
    for (i, xi) in [0.0f64, 1.0, 4.0].iter().enumerate() {
        for (j, yj) in [0.0f64, 2.5].iter().enumerate() {
            let d2 = (xi - yj).powi(2);
            assert_relative_eq!(eval.covariance()[[i, j]], (-0.5 * d2).exp() + 1.0, max_relative = 1e-12);
        }
    }
    // lengthscale of the flat periodic term has no effect
    let g = eval.gradient();
    assert!(g[2].iter().all(|&v| v == 0.0));
}

#[test]
fn hessian_of_second_variant_populates_only_diagonal_blocks() {
    let k = kernel(
        KernelKind::PeriodicSquareExponential2,
        &[0.3, -0.2, 0.1, 0.4, 0.9, -0.7],
        0.8,
    );
    let eval = k.evaluate(&[0.2, 1.1, 3.4], &[0.9, 2.0]);
    let h = k.hessian(&eval).expect("hessian");
    let blocks = [(0, 1), (2, 3), (4, 5)];
    for (a, b) in blocks {
        for (i, j) in [(a, a), (a, b), (b, a), (b, b)] {
            assert!(h[i][j].iter().any(|&v| v != 0.0), "H[{i}][{j}] unexpectedly zero");
        }
    }
    assert!(h[0][2].iter().all(|&v| v == 0.0));
    assert!(h[5][1].iter().all(|&v| v == 0.0));
}
