//! Serializable descriptions of a configured model.

use std::collections::BTreeMap;

use ggxf_core::Real;
use serde::Serialize;

use crate::content::ContentType;
use crate::grid::{Extent, Grid};
use crate::group::Group;
use crate::interp::InterpolationMethod;
use crate::model::Model;
use crate::parameter::{Parameter, ParameterCatalog};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub content: ContentType,
    pub metadata: BTreeMap<String, String>,
    pub parameters: Vec<Parameter>,
    pub groups: Vec<GroupSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub name: String,
    pub interpolation_method: InterpolationMethod,
    pub parameters: Vec<String>,
    pub time_functions: Vec<String>,
    pub grids: Vec<GridSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSummary {
    pub name: String,
    pub id: String,
    pub size: GridSize,
    pub extents: Extent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub parameters: Vec<ParameterSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSize {
    pub i_node_count: usize,
    pub j_node_count: usize,
}

/// Observed value range of one parameter over a grid's nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_set: Option<String>,
    pub min: Option<Real>,
    pub max: Option<Real>,
}

impl Model {
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            content: self.content(),
            metadata: self.metadata().clone(),
            parameters: self.parameters().to_vec(),
            groups: self
                .groups()
                .iter()
                .map(|g| GroupSummary::new(g, self.catalog()))
                .collect(),
        }
    }
}

impl GroupSummary {
    fn new(group: &Group, catalog: &ParameterCatalog) -> Self {
        let definitions: Vec<&Parameter> = group
            .parameter_map()
            .iter()
            .filter_map(|id| catalog.get(*id))
            .collect();
        let parameters: Vec<String> = definitions.iter().map(|p| p.name().to_string()).collect();
        let time_functions = group
            .time_function()
            .map(|tf| tf.functions().iter().map(|f| f.kind().to_string()).collect())
            .unwrap_or_default();
        let grids = group
            .all_grids()
            .into_iter()
            .map(|grid| GridSummary::new(group, grid, &definitions))
            .collect();
        Self {
            name: group.name().to_string(),
            interpolation_method: group.method(),
            parameters,
            time_functions,
            grids,
        }
    }
}

impl GridSummary {
    fn new(group: &Group, grid: &Grid, definitions: &[&Parameter]) -> Self {
        let (i_node_count, j_node_count) = grid.size();
        let parameters = definitions
            .iter()
            .enumerate()
            .map(|(p, definition)| {
                let range = grid.data().value_range(p);
                ParameterSummary {
                    name: definition.name().to_string(),
                    parameter_set: definition.parameter_set().map(str::to_string),
                    min: range.map(|r| r.0),
                    max: range.map(|r| r.1),
                }
            })
            .collect();
        Self {
            name: grid.name().to_string(),
            id: grid.display_id().to_string(),
            size: GridSize {
                i_node_count,
                j_node_count,
            },
            extents: *grid.extent(),
            priority: grid.priority(),
            parent: grid
                .parent()
                .and_then(|id| group.grid(id))
                .map(|p| p.name().to_string()),
            parameters,
        }
    }
}
