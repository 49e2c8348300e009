use thiserror::Error;

use crate::kernel::KernelKind;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GuideError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Contract violations of the covariance kernel API.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelError {
    #[error("{what} expects {expected} values, got {got}")]
    ParameterCount {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("{what}[{index}] is not finite")]
    NonFinite { what: &'static str, index: usize },
    #[error("evaluation was produced by {got:?}, not {expected:?}")]
    EvaluationMismatch {
        expected: KernelKind,
        got: KernelKind,
    },
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
