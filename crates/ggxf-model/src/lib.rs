//! ggxf-model: grids, groups and the evaluation of a GGXF model.
//!
//! Construction runs in dependency order: parameters into a
//! [`ModelBuilder`], grids into [`GroupBuilder`]s (validated as they are
//! added), then [`ModelBuilder::configure`] freezes everything into a
//! query-only [`Model`].
//!
//! Module map:
//! - `parameter`: parameter definitions and the catalog
//! - `content`: content types and the permitted parameter-set policy
//! - `affine`, `grid`, `nest`: grid geometry and nested grid search
//! - `interp`: interpolation kernels
//! - `group`, `model`: per-group and model-wide evaluation
//! - `summary`: serializable introspection

pub mod affine;
pub mod content;
pub mod error;
pub mod grid;
pub mod group;
pub mod interp;
pub mod model;
pub mod nest;
pub mod parameter;
pub mod summary;

pub use affine::AffineTransform;
pub use content::{AnyParameterSet, ContentType, GgxfContentRules, ParameterSetPolicy, UnknownContentType};
pub use error::{
    ConfigError, ConfigResult, EvalError, EvalResult, ModelError, ModelResult, StructuralError,
    StructuralResult,
};
pub use grid::{Extent, Grid, GridData, GridSpec};
pub use group::{Group, GroupBuilder};
pub use interp::{InterpolationMethod, Kernel, UnknownInterpolationMethod};
pub use model::{ErrorSink, Model, ModelBuilder};
pub use nest::GridNest;
pub use parameter::{Parameter, ParameterCatalog};
pub use summary::{GridSize, GridSummary, GroupSummary, ModelSummary, ParameterSummary};
