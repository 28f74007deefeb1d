//! Core error taxonomy shared by `structures` and `waf`.
//!
//! Mirrors the taxonomy a sparse-matrix/analytics core of this shape has
//! always used: out-of-range coordinates, absent lookups, invalid arguments,
//! malformed serialized input, and a catch-all runtime bucket for mismatched
//! operands or I/O failures. Kept decoupled from the shell's `CliError` so
//! the core never knows it's being driven by a CLI.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WafError {
    OutOfRange { op: &'static str, value: String },
    NotFound { op: &'static str, key: String },
    InvalidArgument { op: &'static str, detail: String },
    ParseError { detail: String },
    Runtime { detail: String },
}

impl WafError {
    pub fn out_of_range(op: &'static str, value: impl fmt::Display) -> Self {
        WafError::OutOfRange {
            op,
            value: value.to_string(),
        }
    }

    pub fn not_found(op: &'static str, key: impl fmt::Display) -> Self {
        WafError::NotFound {
            op,
            key: key.to_string(),
        }
    }

    pub fn invalid_argument(op: &'static str, detail: impl Into<String>) -> Self {
        WafError::InvalidArgument {
            op,
            detail: detail.into(),
        }
    }

    pub fn parse(detail: impl Into<String>) -> Self {
        WafError::ParseError {
            detail: detail.into(),
        }
    }

    pub fn runtime(detail: impl Into<String>) -> Self {
        WafError::Runtime {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for WafError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WafError::OutOfRange { op, value } => {
                write!(f, "{op}: {value} is out of range")
            }
            WafError::NotFound { op, key } => {
                write!(f, "{op}: no value at {key}")
            }
            WafError::InvalidArgument { op, detail } => {
                write!(f, "{op}: invalid argument ({detail})")
            }
            WafError::ParseError { detail } => write!(f, "parse error: {detail}"),
            WafError::Runtime { detail } => write!(f, "runtime error: {detail}"),
        }
    }
}

impl std::error::Error for WafError {}

impl From<std::io::Error> for WafError {
    fn from(err: std::io::Error) -> Self {
        WafError::runtime(err.to_string())
    }
}

pub type WafResult<T> = Result<T, WafError>;
