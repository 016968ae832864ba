//! Time-dependent scaling for GGXF deformation groups.
//!
//! A group's correction is multiplied by a scalar built from one or more
//! base functions of epoch (decimal year):
//! - eight base shapes (velocity, acceleration, step, ramp, exponential,
//!   logarithmic, hyperbolic tangent, cyclic)
//! - each optionally clamped to a `[startEpoch, endEpoch]` window, scaled,
//!   and shifted to read zero at its function reference epoch
//! - summed by a [`CompoundTimeFunction`] with an optional validity window
//!
//! Functions are built either directly or from a keyed definition as found in
//! GGXF metadata (`functionType`, `eventEpoch`, `eventDate`, ...).

pub mod compound;
pub mod epoch;
pub mod error;
pub mod function;

pub use compound::CompoundTimeFunction;
pub use epoch::{date_to_epoch, parse_epoch};
pub use error::{TimeError, TimeResult};
pub use function::{BaseTimeFunction, ParamValue, TimeFunctionDefinition, TimeFunctionKind};
