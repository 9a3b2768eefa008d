//! Error types for filter construction and parameter writes.

use thiserror::Error;

use crate::value::ParamType;

/// Which end of a `value_range` a write violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bound::Min => f.write_str("minimum"),
            Bound::Max => f.write_str("maximum"),
        }
    }
}

#[derive(Error, Debug)]
pub enum FilterError {
    /// A numeric write fell outside the parameter's `value_range`.
    #[error("parameter '{param}': {value} is below the minimum {limit}")]
    BelowRange {
        param: String,
        value: f64,
        limit: f64,
    },

    #[error("parameter '{param}': {value} is above the maximum {limit}")]
    AboveRange {
        param: String,
        value: f64,
        limit: f64,
    },

    #[error("parameter '{param}': expected {expected}, got {got}")]
    TypeMismatch {
        param: String,
        expected: ParamType,
        got: ParamType,
    },

    #[error("unknown parameter '{param}' on {owner}")]
    UnknownParam { owner: String, param: String },

    /// The host engine has no operation registered under this kind.
    #[error("missing operation '{kind}'")]
    MissingOperation { kind: String },

    #[error("redirect '{exposed}' targets missing parameter '{param}' on node '{node}'")]
    MissingRedirectTarget {
        exposed: String,
        node: String,
        param: String,
    },

    #[error("unknown node '{node}' in filter '{filter}'")]
    UnknownNode { filter: String, node: String },

    #[error("node '{node}' ({kind}) has no input port '{port}'")]
    UnknownPort {
        node: String,
        kind: String,
        port: String,
    },

    #[error("node '{node}' declared twice in filter '{filter}'")]
    DuplicateNode { filter: String, node: String },

    #[error("cycle detected in filter '{filter}'")]
    Cycle { filter: String },

    #[error("node '{node}' in filter '{filter}' is not on a path from input to output")]
    Unreachable { filter: String, node: String },

    #[error("exposed parameter '{param}' of filter '{filter}' has no redirect")]
    Unredirected { filter: String, param: String },

    #[error("filter '{name}' is already registered")]
    DuplicateFilter { name: String },

    #[error("filter '{name}' nests itself ({chain})")]
    RecursiveFilter { name: String, chain: String },

    #[error("preset for '{preset}' cannot be applied to '{filter}'")]
    PresetMismatch { preset: String, filter: String },

    #[error("invalid color '{0}'")]
    InvalidColor(String),

    #[error("invalid schema for '{param}': {reason}")]
    InvalidSchema { param: String, reason: String },

    #[error("catalog: {0}")]
    Catalog(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FilterError>;

impl FilterError {
    /// Name of the exposed or internal parameter the error refers to, if any.
    pub fn param(&self) -> Option<&str> {
        match self {
            FilterError::BelowRange { param, .. }
            | FilterError::AboveRange { param, .. }
            | FilterError::TypeMismatch { param, .. }
            | FilterError::UnknownParam { param, .. }
            | FilterError::InvalidSchema { param, .. }
            | FilterError::Unredirected { param, .. } => Some(param),
            FilterError::MissingRedirectTarget { exposed, .. } => Some(exposed),
            _ => None,
        }
    }

    /// Violated bound for range errors.
    pub fn bound(&self) -> Option<Bound> {
        match self {
            FilterError::BelowRange { .. } => Some(Bound::Min),
            FilterError::AboveRange { .. } => Some(Bound::Max),
            _ => None,
        }
    }
}
