//! Model error types.
//!
//! Three failure classes, kept apart so callers can tell "cannot build",
//! "cannot configure" and "cannot compute this query" from each other.
//! A point outside every grid is not an error; queries report it as `None`.

use ggxf_core::{CoreError, Real};
use ggxf_time::TimeError;
use thiserror::Error;

use crate::content::ContentType;
use crate::interp::InterpolationMethod;

/// Broken grid geometry, data or nesting. Always fatal while building, even
/// with an error sink.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StructuralError {
    #[error("Grid {grid}: affine coefficients must be finite")]
    NonFiniteTransform { grid: String },

    #[error("Grid {grid}: affine transform is singular")]
    SingularTransform { grid: String },

    #[error("Grid {grid}: node counts ({i_count}, {j_count}) must both be at least 1")]
    InvalidNodeCount {
        grid: String,
        i_count: usize,
        j_count: usize,
    },

    #[error("Grid data is malformed: {what}")]
    MalformedData { what: String },

    #[error("Grid {grid}: data dimensions {actual:?} don't match expected {expected:?}")]
    DataShape {
        grid: String,
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },

    #[error("Grid {grid} is not contained in parent grid {parent}")]
    NotContained { grid: String, parent: String },

    #[error("Grids {first} and {second} overlap without distinct priorities")]
    AmbiguousOverlap { first: String, second: String },

    #[error("Parent grid {parent} of {grid} not found")]
    UnknownParent { grid: String, parent: String },

    #[error("Grid {grid} cannot be nested in {parent}, which belongs to group {parent_group}")]
    CrossGroupNesting {
        grid: String,
        parent: String,
        parent_group: String,
    },

    #[error("Duplicate grid name {grid} in group {group}")]
    DuplicateGrid { group: String, grid: String },
}

/// Parameter resolution and setup failures.
///
/// With an error sink the offending group is dropped and configuration goes on.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Group {group}: parameter {name} is not in the parameter catalog")]
    UnknownParameter { group: String, name: String },

    #[error("Group {group}: invalid parameters ({names}) for content type {content}")]
    DisallowedParameters {
        group: String,
        content: ContentType,
        names: String,
    },

    #[error("Inconsistent definition of parameter {name}: {existing} and {redefined}")]
    InconsistentParameter {
        name: String,
        existing: String,
        redefined: String,
    },

    #[error("Group {group}: content type {content} requires a time function")]
    MissingTimeFunction { group: String, content: ContentType },

    #[error("{what} queried before configuration")]
    NotConfigured { what: &'static str },

    #[error("Group {group}: {source}")]
    TimeFunction {
        group: String,
        #[source]
        source: TimeError,
    },
}

/// Per-query failures. Never replaced by a silent zero.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("Cannot evaluate {content} without providing an epoch")]
    EpochRequired { content: ContentType },

    #[error("Cannot evaluate {group}: time function not defined")]
    NoTimeFunction { group: String },

    #[error("Cannot evaluate {group}: time function undefined at epoch {epoch}")]
    TimeFunctionUndefined { group: String, epoch: Real },

    #[error("Grid {grid} ({i_count}x{j_count}) not big enough for {method} interpolation")]
    GridTooSmall {
        grid: String,
        method: InterpolationMethod,
        i_count: usize,
        j_count: usize,
    },

    #[error("Invalid query point: {0}")]
    InvalidPoint(#[from] CoreError),

    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

pub type StructuralResult<T> = Result<T, StructuralError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type EvalResult<T> = Result<T, EvalError>;

/// Any model failure, for callers that don't need to tell the classes apart.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Structural error: {0}")]
    Structural(#[from] StructuralError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),

    #[error("Time function error: {0}")]
    Time(#[from] TimeError),
}

pub type ModelResult<T> = Result<T, ModelError>;
