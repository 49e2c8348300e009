//! Ridge-regularized straight-line fit for drift estimation.
//!
//! Solves the normal equations of `y = w0 + w1 * t` with `ridge` added to
//! both diagonal entries:
//!
//! ```text
//! | n + r    Σt     | |w0|   | Σy  |
//! | Σt       Σt² + r| |w1| = | Σty |
//! ```
//!
//! The system is expanded around the mean timestamp so that long sessions
//! (large, tightly clustered timestamps) do not lose the slope to
//! cancellation in `nΣt² - (Σt)²`. The solution is algebraically identical
//! to the raw normal equations.

/// Intercept and slope of a fitted line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub intercept: f64,
    pub slope: f64,
    /// Number of points the fit used.
    pub points: usize,
}

impl LineFit {
    /// Value of the line at `t`.
    #[inline]
    pub fn at(&self, t: f64) -> f64 {
        self.intercept + self.slope * t
    }
}

/// Fit `y ~ w0 + w1 * t` over `(t, y)` pairs with ridge constant `ridge`.
///
/// Returns `None` when the inputs produce a non-finite or non-positive
/// determinant (NaN data, or `ridge <= 0` with a degenerate design).
pub fn ridge_fit_line<I>(samples: I, ridge: f64) -> Option<LineFit>
where
    I: IntoIterator<Item = (f64, f64)>,
    I::IntoIter: Clone,
{
    let iter = samples.into_iter();

    // First pass: means.
    let mut n = 0usize;
    let mut sum_t = 0.0f64;
    let mut sum_y = 0.0f64;
    for (t, y) in iter.clone() {
        n += 1;
        sum_t += t;
        sum_y += y;
    }
    let nf = n as f64;
    let (mean_t, mean_y) = if n == 0 {
        (0.0, 0.0)
    } else {
        (sum_t / nf, sum_y / nf)
    };

    // Second pass: centered second moments.
    let mut stt = 0.0f64;
    let mut sty = 0.0f64;
    for (t, y) in iter {
        let dt = t - mean_t;
        stt += dt * dt;
        sty += dt * (y - mean_y);
    }

    let r = ridge;
    let det = nf * stt + nf * r + r * stt + r * nf * mean_t * mean_t + r * r;
    if !det.is_finite() || det <= 0.0 {
        return None;
    }
    let slope = ((nf + r) * sty + r * nf * mean_t * mean_y) / det;
    let intercept = nf * (mean_y * (stt + r) - mean_t * sty) / det;
    if !slope.is_finite() || !intercept.is_finite() {
        return None;
    }
    Some(LineFit {
        intercept,
        slope,
        points: n,
    })
}
