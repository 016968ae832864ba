//! Base time functions.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use ggxf_core::Real;
use serde::{Deserialize, Serialize};

use crate::epoch::date_to_epoch;
use crate::error::{TimeError, TimeResult};

pub const FUNCTION_TYPE: &str = "functionType";
pub const START_EPOCH: &str = "startEpoch";
pub const END_EPOCH: &str = "endEpoch";
pub const REFERENCE_EPOCH: &str = "functionReferenceEpoch";
pub const EVENT_EPOCH: &str = "eventEpoch";
pub const SCALE_FACTOR: &str = "scaleFactor";
pub const TIME_CONSTANT: &str = "timeConstant";
pub const FREQUENCY: &str = "frequency";

/// Parameters every kind accepts.
const OPTIONAL_PARAMS: [&str; 4] = [START_EPOCH, END_EPOCH, REFERENCE_EPOCH, SCALE_FACTOR];

/// A single value in a keyed time function definition.
///
/// Loaders hand over numbers as found in the source document; strings may hold
/// either a number or an ISO date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(Real),
    Text(String),
}

impl From<Real> for ParamValue {
    fn from(value: Real) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Keyed definition, e.g. `{functionType: step, eventEpoch: 2010.0}`.
pub type TimeFunctionDefinition = BTreeMap<String, ParamValue>;

/// The eight base function shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeFunctionKind {
    Velocity,
    Acceleration,
    Step,
    Ramp,
    Exponential,
    Logarithmic,
    HyperbolicTangent,
    Cyclic,
}

impl TimeFunctionKind {
    pub const ALL: [TimeFunctionKind; 8] = [
        Self::Velocity,
        Self::Acceleration,
        Self::Step,
        Self::Ramp,
        Self::Exponential,
        Self::Logarithmic,
        Self::HyperbolicTangent,
        Self::Cyclic,
    ];

    /// Name used for `functionType` in GGXF metadata.
    pub fn name(self) -> &'static str {
        match self {
            Self::Velocity => "velocity",
            Self::Acceleration => "acceleration",
            Self::Step => "step",
            Self::Ramp => "ramp",
            Self::Exponential => "exponential",
            Self::Logarithmic => "logarithmic",
            Self::HyperbolicTangent => "hyperbolicTangent",
            Self::Cyclic => "cyclic",
        }
    }

    /// Parameters that must be present for this kind.
    pub fn required_params(self) -> &'static [&'static str] {
        match self {
            Self::Velocity | Self::Acceleration => &[REFERENCE_EPOCH],
            Self::Step => &[EVENT_EPOCH],
            Self::Ramp => &[START_EPOCH, END_EPOCH],
            Self::Exponential | Self::Logarithmic | Self::HyperbolicTangent => {
                &[EVENT_EPOCH, TIME_CONSTANT]
            }
            Self::Cyclic => &[REFERENCE_EPOCH, FREQUENCY],
        }
    }

    fn accepts(self, key: &str) -> bool {
        self.required_params().contains(&key) || OPTIONAL_PARAMS.contains(&key)
    }
}

impl fmt::Display for TimeFunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeFunctionKind {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| TimeError::UnknownFunctionType {
                name: s.to_string(),
            })
    }
}

/// Shape-specific constants, resolved once at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    Velocity { reference: Real },
    Acceleration { reference: Real },
    Step { event: Real },
    Ramp { start: Real, end: Real },
    Exponential { event: Real, time_constant: Real },
    Logarithmic { event: Real, time_constant: Real },
    HyperbolicTangent { event: Real, time_constant: Real },
    Cyclic { reference: Real, frequency: Real },
}

impl Shape {
    /// Unscaled magnitude at an (already clamped) epoch.
    fn magnitude(self, epoch: Real) -> Real {
        match self {
            Shape::Velocity { reference } => epoch - reference,
            Shape::Acceleration { reference } => {
                let dt = epoch - reference;
                dt * dt
            }
            Shape::Step { event } => {
                if epoch >= event {
                    1.0
                } else {
                    0.0
                }
            }
            Shape::Ramp { start, end } => {
                if epoch < start {
                    0.0
                } else if epoch >= end {
                    1.0
                } else {
                    (epoch - start) / (end - start)
                }
            }
            Shape::Exponential {
                event,
                time_constant,
            } => {
                let dt = epoch - event;
                if dt < 0.0 {
                    0.0
                } else {
                    1.0 - (-dt / time_constant).exp()
                }
            }
            Shape::Logarithmic {
                event,
                time_constant,
            } => {
                let dt = epoch - event;
                if dt < 0.0 {
                    0.0
                } else {
                    (1.0 + dt / time_constant).ln()
                }
            }
            Shape::HyperbolicTangent {
                event,
                time_constant,
            } => ((epoch - event) / time_constant).tanh(),
            Shape::Cyclic {
                reference,
                frequency,
            } => (frequency * (epoch - reference) / (2.0 * PI)).sin(),
        }
    }
}

/// One base time function: shape, optional clamp window, scale and reference.
///
/// `value_at` reads zero at the function reference epoch when one is given.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseTimeFunction {
    kind: TimeFunctionKind,
    shape: Shape,
    start_epoch: Option<Real>,
    end_epoch: Option<Real>,
    reference_epoch: Option<Real>,
    scale_factor: Real,
    reference_value: Real,
}

impl BaseTimeFunction {
    /// Build from a keyed definition.
    ///
    /// Keys ending in `Date` are the date form of the matching `...Epoch` key.
    pub fn from_definition(definition: &TimeFunctionDefinition) -> TimeResult<Self> {
        let kind = match definition.get(FUNCTION_TYPE) {
            Some(ParamValue::Text(name)) => name.parse::<TimeFunctionKind>()?,
            Some(other) => {
                return Err(TimeError::UnknownFunctionType {
                    name: other.to_string(),
                });
            }
            None => return Err(TimeError::MissingFunctionType),
        };

        let mut params = BTreeMap::new();
        for (source_key, value) in definition {
            if source_key == FUNCTION_TYPE {
                continue;
            }
            let (key, is_date) = match source_key.strip_suffix("Date") {
                Some(stem) => (format!("{stem}Epoch"), true),
                None => (source_key.clone(), false),
            };
            if !kind.accepts(&key) {
                return Err(TimeError::UnexpectedParameter {
                    function: kind.name(),
                    key: source_key.clone(),
                });
            }
            let parsed = parse_value(value, is_date).ok_or_else(|| TimeError::InvalidValue {
                function: kind.name(),
                key: source_key.clone(),
                value: value.to_string(),
            })?;
            params.insert(key, parsed);
        }

        Self::from_params(kind, &params)
    }

    /// Build from already-parsed numeric parameters keyed by their `...Epoch` names.
    pub fn from_params(kind: TimeFunctionKind, params: &BTreeMap<String, Real>) -> TimeResult<Self> {
        let function = kind.name();
        for key in params.keys() {
            if !kind.accepts(key) {
                return Err(TimeError::UnexpectedParameter {
                    function,
                    key: key.clone(),
                });
            }
        }
        let require = |key: &'static str| -> TimeResult<Real> {
            params
                .get(key)
                .copied()
                .ok_or(TimeError::MissingParameter { function, key })
        };
        let positive = |key: &'static str| -> TimeResult<Real> {
            let value = require(key)?;
            if value > 0.0 {
                Ok(value)
            } else {
                Err(TimeError::InvalidValue {
                    function,
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
        };

        let shape = match kind {
            TimeFunctionKind::Velocity => Shape::Velocity {
                reference: require(REFERENCE_EPOCH)?,
            },
            TimeFunctionKind::Acceleration => Shape::Acceleration {
                reference: require(REFERENCE_EPOCH)?,
            },
            TimeFunctionKind::Step => Shape::Step {
                event: require(EVENT_EPOCH)?,
            },
            TimeFunctionKind::Ramp => {
                let (start, end) = (require(START_EPOCH)?, require(END_EPOCH)?);
                if end <= start {
                    return Err(TimeError::InvalidWindow {
                        function,
                        start,
                        end,
                    });
                }
                Shape::Ramp { start, end }
            }
            TimeFunctionKind::Exponential => Shape::Exponential {
                event: require(EVENT_EPOCH)?,
                time_constant: positive(TIME_CONSTANT)?,
            },
            TimeFunctionKind::Logarithmic => Shape::Logarithmic {
                event: require(EVENT_EPOCH)?,
                time_constant: positive(TIME_CONSTANT)?,
            },
            TimeFunctionKind::HyperbolicTangent => Shape::HyperbolicTangent {
                event: require(EVENT_EPOCH)?,
                time_constant: positive(TIME_CONSTANT)?,
            },
            TimeFunctionKind::Cyclic => Shape::Cyclic {
                reference: require(REFERENCE_EPOCH)?,
                frequency: require(FREQUENCY)?,
            },
        };

        let start_epoch = params.get(START_EPOCH).copied();
        let end_epoch = params.get(END_EPOCH).copied();
        if let (Some(start), Some(end)) = (start_epoch, end_epoch) {
            if end < start {
                return Err(TimeError::InvalidWindow {
                    function,
                    start,
                    end,
                });
            }
        }

        Ok(Self::assemble(
            kind,
            shape,
            start_epoch,
            end_epoch,
            params.get(REFERENCE_EPOCH).copied(),
            params.get(SCALE_FACTOR).copied().unwrap_or(1.0),
        ))
    }

    /// Linear change of `rate` per year, zero at `reference_epoch`.
    pub fn velocity(reference_epoch: Real, rate: Real) -> Self {
        Self::assemble(
            TimeFunctionKind::Velocity,
            Shape::Velocity {
                reference: reference_epoch,
            },
            None,
            None,
            Some(reference_epoch),
            rate,
        )
    }

    /// Jump of `size` at `event_epoch`.
    pub fn step(event_epoch: Real, size: Real) -> Self {
        Self::assemble(
            TimeFunctionKind::Step,
            Shape::Step { event: event_epoch },
            None,
            None,
            None,
            size,
        )
    }

    /// Linear transition of `size` between two epochs.
    pub fn ramp(start_epoch: Real, end_epoch: Real, size: Real) -> TimeResult<Self> {
        let params = BTreeMap::from([
            (START_EPOCH.to_string(), start_epoch),
            (END_EPOCH.to_string(), end_epoch),
            (SCALE_FACTOR.to_string(), size),
        ]);
        Self::from_params(TimeFunctionKind::Ramp, &params)
    }

    /// Restrict the epochs this function responds to; outside the window the
    /// value is held at the nearest bound.
    pub fn with_window(mut self, start_epoch: Option<Real>, end_epoch: Option<Real>) -> Self {
        self.start_epoch = start_epoch;
        self.end_epoch = end_epoch;
        self.reference_value = self.reference_value_for(self.reference_epoch);
        self
    }

    fn assemble(
        kind: TimeFunctionKind,
        shape: Shape,
        start_epoch: Option<Real>,
        end_epoch: Option<Real>,
        reference_epoch: Option<Real>,
        scale_factor: Real,
    ) -> Self {
        let mut function = Self {
            kind,
            shape,
            start_epoch,
            end_epoch,
            reference_epoch,
            scale_factor,
            reference_value: 0.0,
        };
        function.reference_value = function.reference_value_for(reference_epoch);
        function
    }

    fn reference_value_for(&self, reference_epoch: Option<Real>) -> Real {
        reference_epoch.map_or(0.0, |epoch| self.scaled(epoch))
    }

    pub fn kind(&self) -> TimeFunctionKind {
        self.kind
    }

    pub fn scale_factor(&self) -> Real {
        self.scale_factor
    }

    pub fn reference_epoch(&self) -> Option<Real> {
        self.reference_epoch
    }

    /// Epoch window `(start, end)` used for clamping.
    pub fn window(&self) -> (Option<Real>, Option<Real>) {
        (self.start_epoch, self.end_epoch)
    }

    fn clamp(&self, epoch: Real) -> Real {
        match (self.start_epoch, self.end_epoch) {
            (Some(start), _) if epoch < start => start,
            (_, Some(end)) if epoch > end => end,
            _ => epoch,
        }
    }

    fn scaled(&self, epoch: Real) -> Real {
        self.shape.magnitude(self.clamp(epoch)) * self.scale_factor
    }

    /// Scaled value at `epoch`, relative to the function reference epoch.
    pub fn value_at(&self, epoch: Real) -> Real {
        self.scaled(epoch) - self.reference_value
    }
}

fn parse_value(value: &ParamValue, is_date: bool) -> Option<Real> {
    match value {
        ParamValue::Number(v) if v.is_finite() => Some(*v),
        ParamValue::Number(_) => None,
        ParamValue::Text(text) => {
            if is_date {
                date_to_epoch(text).ok()
            } else {
                text.trim().parse::<Real>().ok().filter(|v| v.is_finite())
            }
        }
    }
}
