//! Conversion of a validated document into a configured model.

use ggxf_model::{
    ConfigError, GgxfContentRules, GridSpec, GroupBuilder, Model, ModelBuilder, ModelError,
    ModelResult, StructuralError,
};
use ggxf_time::CompoundTimeFunction;
use tracing::{debug, info, warn};

use crate::ProjectResult;
use crate::schema::{GgxfDocument, GridDef, GroupDef, ParameterRef};

/// What to do when a group fails configuration.
///
/// Structural errors (broken geometry, bad data, unresolved nesting) abort
/// the load in either mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorSinkMode {
    /// Abort on the first error.
    #[default]
    Strict,
    /// Leave a misconfigured group out and report the error alongside the model.
    BestEffort,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub error_sink_mode: ErrorSinkMode,
}

impl LoadOptions {
    pub fn best_effort() -> Self {
        Self {
            error_sink_mode: ErrorSinkMode::BestEffort,
        }
    }
}

/// A configured model plus the configuration errors of any groups left out of it.
#[derive(Debug)]
pub struct LoadedModel {
    pub model: Model,
    pub errors: Vec<ConfigError>,
}

pub fn build_model(document: &GgxfDocument, options: &LoadOptions) -> ProjectResult<LoadedModel> {
    let mut builder = ModelBuilder::new(document.content);
    for (key, value) in document.metadata_strings() {
        builder.insert_metadata(key, value);
    }
    for parameter in &document.parameters {
        builder.add_parameter(parameter.clone())?;
    }

    let mut errors = Vec::new();
    for group in &document.groups {
        match build_group(document, group, &mut builder) {
            Ok(group_builder) => builder.add_group(group_builder),
            Err(ModelError::Config(err))
                if options.error_sink_mode == ErrorSinkMode::BestEffort =>
            {
                warn!(group = %group.name, error = %err, "group excluded from model");
                errors.push(err);
            }
            Err(err) => {
                warn!(group = %group.name, error = %err, "group failed to build");
                return Err(err.into());
            }
        }
    }

    let model = match options.error_sink_mode {
        ErrorSinkMode::Strict => builder.configure(&GgxfContentRules, None)?,
        ErrorSinkMode::BestEffort => {
            let mut sink = |err: ConfigError| errors.push(err);
            builder.configure(&GgxfContentRules, Some(&mut sink))?
        }
    };
    info!(
        content = %model.content(),
        groups = model.groups().len(),
        excluded = errors.len(),
        "document loaded"
    );
    Ok(LoadedModel { model, errors })
}

fn build_group(
    document: &GgxfDocument,
    group: &GroupDef,
    model: &mut ModelBuilder,
) -> ModelResult<GroupBuilder> {
    let mut builder = GroupBuilder::new(
        &group.name,
        group.parameters.iter().map(ParameterRef::name),
        group.interpolation_method,
    );
    if !group.time_functions.is_empty() {
        let time_function = CompoundTimeFunction::from_definitions(&group.time_functions)
            .map_err(|source| ConfigError::TimeFunction {
                group: group.name.clone(),
                source,
            })?;
        builder = builder.with_time_function(time_function);
    }

    // Parents must be added before their children; parentGridName may point
    // forward in the document, so unresolved grids are retried until a pass
    // makes no progress.
    let n_param = builder.n_param();
    let mut pending = group.all_grids();
    while !pending.is_empty() {
        let before = pending.len();
        let mut deferred = Vec::new();
        for (grid, structural) in pending {
            let parent = match structural.or(grid.parent_grid_name.as_deref()) {
                None => None,
                Some(name) => match builder.grid_id(name) {
                    Some(id) => Some(id),
                    None => {
                        deferred.push((grid, structural));
                        continue;
                    }
                },
            };
            let data = grid.data.to_grid_data(grid, n_param)?;
            let mut spec = GridSpec::new(
                &grid.grid_name,
                grid.affine_coeffs,
                (grid.i_node_count, grid.j_node_count),
                data,
            );
            spec.priority = grid.grid_priority;
            builder.add_grid(spec, parent)?;
            debug!(group = %group.name, grid = %grid.grid_name, "grid added");
        }
        if deferred.len() == before {
            if let Some((grid, structural)) = deferred.first() {
                return Err(unresolved_parent(document, group, grid, *structural).into());
            }
        }
        pending = deferred;
    }

    for parameter in &group.parameters {
        if let ParameterRef::Definition(definition) = parameter {
            model.add_parameter(definition.clone())?;
        }
    }
    Ok(builder)
}

fn unresolved_parent(
    document: &GgxfDocument,
    group: &GroupDef,
    grid: &GridDef,
    structural: Option<&str>,
) -> StructuralError {
    let parent = structural
        .or(grid.parent_grid_name.as_deref())
        .unwrap_or_default()
        .to_string();
    let owner = document.groups.iter().find(|other| {
        other.name != group.name
            && other
                .all_grids()
                .iter()
                .any(|(candidate, _)| candidate.grid_name == parent)
    });
    match owner {
        Some(owner) => StructuralError::CrossGroupNesting {
            grid: grid.grid_name.clone(),
            parent,
            parent_group: owner.name.clone(),
        },
        None => StructuralError::UnknownParent {
            grid: grid.grid_name.clone(),
            parent,
        },
    }
}
