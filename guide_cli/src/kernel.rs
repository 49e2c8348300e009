//! `guide kernel`: evaluate the configured covariance kernel and its
//! hyperparameter derivatives.

use eyre::Result;
use guide_config::Config;
use guide_core::{CovarianceFunction, GuideError, Kernel, kernel::UNSET_LOG_PERIOD};
use ndarray::Array2;
use serde_json::json;

pub fn run(
    cfg: &Config,
    x: &[f64],
    y: Option<&[f64]>,
    gradient: bool,
    hessian: bool,
    json: bool,
) -> Result<()> {
    let y = y.unwrap_or(x);
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(GuideError::Config("kernel inputs must be finite".into()).into());
    }
    let k = Kernel::try_from(&cfg.kernel)?;
    let eval = k.evaluate(x, y);
    tracing::debug!(kind = ?k.kind(), rows = x.len(), cols = y.len(), "kernel evaluated");

    let grad = if gradient { Some(k.gradient(&eval)?) } else { None };
    let hess = if hessian { Some(k.hessian(&eval)?) } else { None };

    if json {
        let mut out = json!({
            "kernel": format!("{:?}", k.kind()),
            "hyperparameters": k.parameters(),
            "log_period": log_period(&k),
            "covariance": rows(eval.covariance()),
        });
        if let Some(g) = &grad {
            out["gradient"] = g.iter().map(rows).collect::<Vec<_>>().into();
        }
        if let Some(h) = &hess {
            out["hessian"] = h
                .iter()
                .map(|r| r.iter().map(rows).collect::<Vec<_>>())
                .collect::<Vec<_>>()
                .into();
        }
        println!("{out}");
        return Ok(());
    }

    println!("{}", describe(&k));
    println!("K:");
    print_matrix(eval.covariance());
    if let Some(g) = &grad {
        for (i, m) in g.iter().enumerate() {
            println!("dK/dh{i}:");
            print_matrix(m);
        }
    }
    if let Some(h) = &hess {
        for (i, row) in h.iter().enumerate() {
            for (j, m) in row.iter().enumerate() {
                // off-block entries are structurally zero
                if i / 2 == j / 2 {
                    println!("d2K/dh{i}dh{j}:");
                    print_matrix(m);
                }
            }
        }
    }
    Ok(())
}

fn log_period(k: &Kernel) -> Option<f64> {
    k.extra_parameters()
        .first()
        .copied()
        .filter(|&p| p != UNSET_LOG_PERIOD)
}

/// One-line description of a kernel's variant and parameters.
pub fn describe(k: &Kernel) -> String {
    let period = log_period(k).map_or_else(|| "unset".to_string(), |p| format!("{p}"));
    format!(
        "Kernel = {:?}, hyperparameters = {:?}, log period = {period}",
        k.kind(),
        k.parameters()
    )
}

fn rows(m: &Array2<f64>) -> Vec<Vec<f64>> {
    m.outer_iter().map(|r| r.to_vec()).collect()
}

fn print_matrix(m: &Array2<f64>) {
    for r in m.outer_iter() {
        let line: Vec<String> = r.iter().map(|v| format!("{v:>12.6}")).collect();
        println!("{}", line.join(" "));
    }
}
