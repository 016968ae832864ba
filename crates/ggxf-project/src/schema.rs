//! GGXF document schema: the inline-data subset of the YAML/JSON format.

use std::collections::BTreeMap;

use ggxf_core::Real;
use ggxf_model::{ContentType, GridData, InterpolationMethod, Parameter, StructuralError};
use ggxf_time::TimeFunctionDefinition;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GgxfDocument {
    pub content: ContentType,
    /// Model-wide parameter definitions. Groups may add more.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(rename = "ggxfGroups", default)]
    pub groups: Vec<GroupDef>,
    /// Every other root attribute (title, abstract, CRS definitions, ...).
    #[serde(flatten)]
    pub metadata: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupDef {
    #[serde(rename = "ggxfGroupName")]
    pub name: String,
    #[serde(default, alias = "groupParameters")]
    pub parameters: Vec<ParameterRef>,
    pub interpolation_method: InterpolationMethod,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub time_functions: Vec<TimeFunctionDefinition>,
    #[serde(default)]
    pub grids: Vec<GridDef>,
}

/// A group parameter: a bare name resolved against the model parameters,
/// or a full inline definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParameterRef {
    Name(String),
    Definition(Parameter),
}

impl ParameterRef {
    pub fn name(&self) -> &str {
        match self {
            ParameterRef::Name(name) => name,
            ParameterRef::Definition(parameter) => parameter.name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridDef {
    pub grid_name: String,
    pub i_node_count: usize,
    pub j_node_count: usize,
    pub affine_coeffs: [Real; 6],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_grid_name: Option<String>,
    /// Child grids nested directly under this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grids: Vec<GridDef>,
    pub data: GridValues,
}

/// Node values in `[i][j][p]` order.
///
/// Single-parameter groups may drop the innermost level; any grid may give
/// the values as one flat list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GridValues {
    Nodes(Vec<Vec<Vec<Real>>>),
    Scalars(Vec<Vec<Real>>),
    Flat(Vec<Real>),
}

impl GridValues {
    /// Convert to model grid data. `n_param` is the owning group's width.
    pub fn to_grid_data(&self, grid: &GridDef, n_param: usize) -> Result<GridData, StructuralError> {
        let data = match self {
            GridValues::Nodes(rows) => GridData::from_nested(rows),
            GridValues::Scalars(rows) => {
                let nested: Vec<Vec<Vec<Real>>> = rows
                    .iter()
                    .map(|row| row.iter().map(|&v| vec![v]).collect())
                    .collect();
                GridData::from_nested(&nested)
            }
            GridValues::Flat(values) => GridData::from_shape_vec(
                (grid.i_node_count, grid.j_node_count, n_param),
                values.clone(),
            ),
        };
        data.map_err(|err| match err {
            StructuralError::MalformedData { what } => StructuralError::MalformedData {
                what: format!("grid {}: {what}", grid.grid_name),
            },
            other => other,
        })
    }
}

impl GgxfDocument {
    /// Metadata as display strings: scalars verbatim, anything else as
    /// single-line JSON.
    pub fn metadata_strings(&self) -> BTreeMap<String, String> {
        self.metadata
            .iter()
            .map(|(key, value)| (key.clone(), metadata_string(value)))
            .collect()
    }
}

fn metadata_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => String::new(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

impl GridDef {
    /// This grid followed by all nested grids, depth-first, each paired with
    /// the name of its structural parent.
    pub fn flatten<'a>(&'a self, parent: Option<&'a str>, out: &mut Vec<(&'a GridDef, Option<&'a str>)>) {
        out.push((self, parent));
        for child in &self.grids {
            child.flatten(Some(self.grid_name.as_str()), out);
        }
    }
}

impl GroupDef {
    /// Every grid in the group, depth-first, with its structural parent.
    pub fn all_grids(&self) -> Vec<(&GridDef, Option<&str>)> {
        let mut out = Vec::new();
        for grid in &self.grids {
            grid.flatten(None, &mut out);
        }
        out
    }
}
