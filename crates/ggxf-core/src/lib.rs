//! ggxf-core: shared foundation for the GGXF grid evaluation engine.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact arena handles for grids, groups and parameters)
//! - memo (single-entry caches for epoch-keyed values)
//! - error (shared error type)

pub mod error;
pub mod ids;
pub mod memo;
pub mod numeric;

pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use memo::Memo;
pub use numeric::*;
