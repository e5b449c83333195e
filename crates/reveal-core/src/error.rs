#![forbid(unsafe_code)]

//! Error taxonomy shared by the counter and visibility components.
//!
//! None of these errors reach an end user. `MalformedInput` and
//! `MissingSignalSource` are expected idle conditions that callers log and
//! skip; `PreconditionViolation` reports caller bugs from the validating
//! constructors (the panicking constructors assert instead).

use core::fmt;

/// Errors raised by `reveal-core`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealError {
    /// A counter label contained no numeric substring.
    MalformedInput {
        /// The label as it was read.
        label: String,
    },
    /// The visibility signal source is unavailable; watches stay inert.
    MissingSignalSource,
    /// A caller passed an argument outside its documented domain.
    PreconditionViolation(&'static str),
}

impl fmt::Display for RevealError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput { label } => {
                write!(f, "label has no numeric value: {label:?}")
            }
            Self::MissingSignalSource => write!(f, "visibility signal source unavailable"),
            Self::PreconditionViolation(what) => write!(f, "precondition violated: {what}"),
        }
    }
}

impl std::error::Error for RevealError {}
