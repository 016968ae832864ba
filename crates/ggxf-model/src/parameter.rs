//! Parameters and the model-wide parameter catalog.

use std::collections::HashMap;

use ggxf_core::{ParamId, Real};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// One output quantity of a model. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    #[serde(rename = "parameterName")]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parameter_set: Option<String>,
    #[serde(default = "default_si_ratio")]
    unit_si_ratio: Real,
    #[serde(
        default = "default_unit",
        alias = "unitName",
        alias = "lengthUnit",
        alias = "angleUnit",
        alias = "scaleUnit"
    )]
    unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_crs_axis: Option<u32>,
    #[serde(default, rename = "parameterMinimumValue", skip_serializing_if = "Option::is_none")]
    minimum: Option<Real>,
    #[serde(default, rename = "parameterMaximumValue", skip_serializing_if = "Option::is_none")]
    maximum: Option<Real>,
    #[serde(default, rename = "noDataFlag", skip_serializing_if = "Option::is_none")]
    no_data: Option<Real>,
}

fn default_si_ratio() -> Real {
    1.0
}

fn default_unit() -> String {
    "unspecified".to_string()
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter_set: None,
            unit_si_ratio: default_si_ratio(),
            unit: default_unit(),
            source_crs_axis: None,
            minimum: None,
            maximum: None,
            no_data: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>, si_ratio: Real) -> Self {
        self.unit = unit.into();
        self.unit_si_ratio = si_ratio;
        self
    }

    pub fn with_parameter_set(mut self, set: impl Into<String>) -> Self {
        self.parameter_set = Some(set.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter_set(&self) -> Option<&str> {
        self.parameter_set.as_deref()
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn unit_si_ratio(&self) -> Real {
        self.unit_si_ratio
    }

    pub fn source_crs_axis(&self) -> Option<u32> {
        self.source_crs_axis
    }

    pub fn range(&self) -> (Option<Real>, Option<Real>) {
        (self.minimum, self.maximum)
    }

    pub fn no_data(&self) -> Option<Real> {
        self.no_data
    }

    fn describe_unit(&self) -> String {
        format!("{} (SI ratio {})", self.unit, self.unit_si_ratio)
    }
}

/// Ordered, name-unique list of parameters.
///
/// Catalog order defines the layout of every evaluation result.
#[derive(Debug, Clone, Default)]
pub struct ParameterCatalog {
    parameters: Vec<Parameter>,
    index: HashMap<String, ParamId>,
}

impl ParameterCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, or return the id of an identical-unit earlier definition.
    pub fn add(&mut self, parameter: Parameter) -> ConfigResult<ParamId> {
        if let Some(&id) = self.index.get(parameter.name()) {
            let existing = &self.parameters[id.slot()];
            if existing.unit != parameter.unit || existing.unit_si_ratio != parameter.unit_si_ratio
            {
                return Err(ConfigError::InconsistentParameter {
                    existing: existing.describe_unit(),
                    redefined: parameter.describe_unit(),
                    name: parameter.name,
                });
            }
            return Ok(id);
        }
        let id = ParamId::from_usize(self.parameters.len());
        self.index.insert(parameter.name.clone(), id);
        self.parameters.push(parameter);
        Ok(id)
    }

    pub fn find(&self, name: &str) -> Option<ParamId> {
        self.index.get(name).copied()
    }

    pub fn get(&self, id: ParamId) -> Option<&Parameter> {
        self.parameters.get(id.slot())
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(Parameter::name)
    }

    /// Fill in missing parameter-set tags. Explicit tags are kept.
    pub fn assign_parameter_sets<'a>(&mut self, tag_of: impl Fn(&str) -> Option<&'a str>) {
        for parameter in &mut self.parameters {
            if parameter.parameter_set.is_none() {
                parameter.parameter_set = tag_of(&parameter.name).map(str::to_string);
            }
        }
    }
}
