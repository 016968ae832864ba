//! Document-level checks that need no grid geometry.
//!
//! Geometry (containment, overlap, data shape) is left to the model builder;
//! this pass catches naming problems early, with document context.

use std::collections::{HashMap, HashSet};

use crate::schema::{GgxfDocument, GroupDef};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate name: {name} in {context}")]
    DuplicateName { name: String, context: String },

    #[error("Group {group} defines no parameters")]
    NoParameters { group: String },

    #[error("Grid {grid} parentGridName {declared} conflicts with structural parent {structural}")]
    ConflictingParent {
        grid: String,
        declared: String,
        structural: String,
    },

    #[error("Grid {grid} is its own ancestor")]
    NestingCycle { grid: String },
}

pub fn validate_document(document: &GgxfDocument) -> Result<(), ValidationError> {
    let mut group_names = HashSet::new();
    for group in &document.groups {
        if !group_names.insert(group.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: group.name.clone(),
                context: "ggxfGroups".to_string(),
            });
        }
        validate_group(group)?;
    }
    Ok(())
}

fn validate_group(group: &GroupDef) -> Result<(), ValidationError> {
    if group.parameters.is_empty() {
        return Err(ValidationError::NoParameters {
            group: group.name.clone(),
        });
    }
    let mut parameter_names = HashSet::new();
    for parameter in &group.parameters {
        if !parameter_names.insert(parameter.name()) {
            return Err(ValidationError::DuplicateName {
                name: parameter.name().to_string(),
                context: format!("group '{}' parameters", group.name),
            });
        }
    }

    let grids = group.all_grids();
    let mut parents: HashMap<&str, Option<&str>> = HashMap::new();
    for (grid, structural) in &grids {
        let parent = match (grid.parent_grid_name.as_deref(), *structural) {
            (Some(declared), Some(structural)) if declared != structural => {
                return Err(ValidationError::ConflictingParent {
                    grid: grid.grid_name.clone(),
                    declared: declared.to_string(),
                    structural: structural.to_string(),
                });
            }
            (declared, structural) => structural.or(declared),
        };
        if parents.insert(grid.grid_name.as_str(), parent).is_some() {
            return Err(ValidationError::DuplicateName {
                name: grid.grid_name.clone(),
                context: format!("group '{}' grids", group.name),
            });
        }
    }

    // Unknown parents are reported by the builder; only cycles are caught here.
    for (grid, _) in &grids {
        let mut seen = HashSet::new();
        let mut current = Some(grid.grid_name.as_str());
        while let Some(name) = current {
            if !seen.insert(name) {
                return Err(ValidationError::NestingCycle {
                    grid: grid.grid_name.clone(),
                });
            }
            current = parents.get(name).copied().flatten();
        }
    }
    Ok(())
}
