//! Groups: grids sharing a parameter list, interpolation method and time function.

use ggxf_core::{GridId, GroupId, Memo, ParamId, Real};
use ggxf_time::CompoundTimeFunction;
use tracing::debug;

use crate::content::{ContentType, ParameterSetPolicy};
use crate::error::{ConfigError, ConfigResult, EvalError, EvalResult, StructuralError, StructuralResult};
use crate::grid::{Grid, GridSpec};
use crate::interp::{InterpolationMethod, Kernel};
use crate::nest::{GridNest, configure_all};
use crate::parameter::ParameterCatalog;

/// Mutable construction phase of a group.
///
/// Grids are validated as they are added (shape, containment, sibling
/// overlap). [`GroupBuilder::configure`] resolves parameters and freezes the
/// result into a query-only [`Group`].
#[derive(Debug, Clone)]
pub struct GroupBuilder {
    name: String,
    parameter_names: Vec<String>,
    method: InterpolationMethod,
    time_function: Option<CompoundTimeFunction>,
    grids: Vec<Grid>,
    roots: GridNest,
}

impl GroupBuilder {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        parameter_names: impl IntoIterator<Item = S>,
        method: InterpolationMethod,
    ) -> Self {
        Self {
            name: name.into(),
            parameter_names: parameter_names.into_iter().map(Into::into).collect(),
            method,
            time_function: None,
            grids: Vec::new(),
            roots: GridNest::default(),
        }
    }

    pub fn with_time_function(mut self, time_function: CompoundTimeFunction) -> Self {
        self.time_function = Some(time_function);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    pub fn n_param(&self) -> usize {
        self.parameter_names.len()
    }

    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    pub fn grid_id(&self, name: &str) -> Option<GridId> {
        self.grids
            .iter()
            .position(|g| g.name() == name)
            .map(GridId::from_usize)
    }

    pub fn grid(&self, id: GridId) -> Option<&Grid> {
        self.grids.get(id.slot())
    }

    /// Add a grid at the group root or nested under `parent`.
    pub fn add_grid(&mut self, spec: GridSpec, parent: Option<GridId>) -> StructuralResult<GridId> {
        if self.grid_id(&spec.name).is_some() {
            return Err(StructuralError::DuplicateGrid {
                group: self.name.clone(),
                grid: spec.name,
            });
        }
        let mut grid = Grid::new(spec, self.n_param())?;
        let id = GridId::from_usize(self.grids.len());
        match parent {
            Some(parent_id) => {
                let parent = self.grids.get(parent_id.slot()).ok_or_else(|| {
                    StructuralError::UnknownParent {
                        grid: grid.name().to_string(),
                        parent: format!("#{parent_id}"),
                    }
                })?;
                if !parent.extent().encloses(grid.extent(), grid.tolerance()) {
                    return Err(StructuralError::NotContained {
                        grid: grid.name().to_string(),
                        parent: parent.name().to_string(),
                    });
                }
                parent.children().check_sibling(&self.grids, &grid)?;
                grid.set_parent(parent_id);
                self.grids.push(grid);
                self.grids[parent_id.slot()].children.push(id);
            }
            None => {
                self.roots.check_sibling(&self.grids, &grid)?;
                self.grids.push(grid);
                self.roots.push(id);
            }
        }
        Ok(id)
    }

    /// Resolve declared names against the catalog and check the combination.
    pub fn configure_parameters(
        &self,
        catalog: &ParameterCatalog,
        content: ContentType,
        policy: &dyn ParameterSetPolicy,
    ) -> ConfigResult<Vec<ParamId>> {
        let map = self
            .parameter_names
            .iter()
            .map(|name| {
                catalog
                    .find(name)
                    .ok_or_else(|| ConfigError::UnknownParameter {
                        group: self.name.clone(),
                        name: name.clone(),
                    })
            })
            .collect::<ConfigResult<Vec<_>>>()?;
        let names: Vec<&str> = self.parameter_names.iter().map(String::as_str).collect();
        if !policy.permits(content, &names) {
            return Err(ConfigError::DisallowedParameters {
                group: self.name.clone(),
                content,
                names: names.join(","),
            });
        }
        Ok(map)
    }

    /// Freeze into a queryable group; `index` seeds the grid display ids.
    pub fn configure(
        self,
        index: usize,
        catalog: &ParameterCatalog,
        content: ContentType,
        policy: &dyn ParameterSetPolicy,
    ) -> ConfigResult<Group> {
        let parameter_map = self.configure_parameters(catalog, content, policy)?;
        if content.needs_epoch() && self.time_function.is_none() {
            return Err(ConfigError::MissingTimeFunction {
                group: self.name,
                content,
            });
        }
        let GroupBuilder {
            name,
            method,
            time_function,
            mut grids,
            mut roots,
            ..
        } = self;
        configure_all(&mut roots, &mut grids);
        assign_display_ids(&mut grids, roots.members().to_vec(), &index.to_string());
        Ok(Group {
            name,
            id: GroupId::from_usize(index),
            parameter_map,
            width: catalog.len(),
            method,
            kernel: method.kernel(),
            time_function,
            content,
            grids,
            roots,
            factor_cache: Memo::new(),
        })
    }
}

fn assign_display_ids(grids: &mut [Grid], members: Vec<GridId>, prefix: &str) {
    for (k, id) in members.into_iter().enumerate() {
        let label = format!("{prefix}:{k}");
        let Some(grid) = grids.get_mut(id.slot()) else {
            continue;
        };
        grid.set_display_id(label.clone());
        let children = grid.children().members().to_vec();
        assign_display_ids(grids, children, &label);
    }
}

/// A configured, read-only group.
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    id: GroupId,
    parameter_map: Vec<ParamId>,
    width: usize,
    method: InterpolationMethod,
    kernel: Kernel,
    time_function: Option<CompoundTimeFunction>,
    content: ContentType,
    grids: Vec<Grid>,
    roots: GridNest,
    factor_cache: Memo<(Real, Option<Real>), Option<Real>>,
}

impl Group {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Catalog position of each local parameter, in declaration order.
    pub fn parameter_map(&self) -> &[ParamId] {
        &self.parameter_map
    }

    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    pub fn time_function(&self) -> Option<&CompoundTimeFunction> {
        self.time_function.as_ref()
    }

    pub fn grid(&self, id: GridId) -> Option<&Grid> {
        self.grids.get(id.slot())
    }

    pub fn root_grids(&self) -> impl Iterator<Item = &Grid> + '_ {
        self.roots
            .members()
            .iter()
            .filter_map(|id| self.grids.get(id.slot()))
    }

    /// Every grid, depth-first with parents before their children.
    pub fn all_grids(&self) -> Vec<&Grid> {
        let mut out = Vec::with_capacity(self.grids.len());
        let mut stack: Vec<GridId> = self.roots.members().iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(grid) = self.grids.get(id.slot()) {
                out.push(grid);
                stack.extend(grid.children().members().iter().rev());
            }
        }
        out
    }

    /// Most specific grid covering `xy`.
    pub fn grid_at(&self, xy: (Real, Real)) -> EvalResult<Option<&Grid>> {
        let found = self.roots.grid_at(&self.grids, xy)?;
        Ok(found.and_then(|id| self.grids.get(id.slot())))
    }

    /// Time factor at `epoch`, relative to `reference_epoch` when given.
    ///
    /// `None` means the compound function is undefined there.
    pub fn time_factor(
        &self,
        epoch: Option<Real>,
        reference_epoch: Option<Real>,
    ) -> EvalResult<Option<Real>> {
        let function = self
            .time_function
            .as_ref()
            .ok_or_else(|| EvalError::NoTimeFunction {
                group: self.name.clone(),
            })?;
        let epoch = epoch.ok_or(EvalError::EpochRequired {
            content: self.content,
        })?;
        Ok(self
            .factor_cache
            .get_or_insert_with((epoch, reference_epoch), || match reference_epoch {
                None => function.value_at(epoch),
                Some(reference) => function.value_change(epoch, reference),
            }))
    }

    /// Values of the local parameters at `xy`, time-scaled when required.
    pub fn evaluate_local(
        &self,
        xy: (Real, Real),
        epoch: Option<Real>,
        reference_epoch: Option<Real>,
    ) -> EvalResult<Option<Vec<Real>>> {
        let Some(grid) = self.grid_at(xy)? else {
            return Ok(None);
        };
        debug!(group = %self.name, grid = %grid.display_id(), ?xy, "grid selected");
        let mut value = (self.kernel)(grid, xy)?;
        if self.content.needs_epoch() {
            let factor = self.time_factor(epoch, reference_epoch)?.ok_or_else(|| {
                EvalError::TimeFunctionUndefined {
                    group: self.name.clone(),
                    epoch: epoch.unwrap_or(Real::NAN),
                }
            })?;
            value.iter_mut().for_each(|v| *v *= factor);
        }
        Ok(Some(value))
    }

    /// Like [`Group::evaluate_local`], scattered into a catalog-width vector.
    pub fn evaluate(
        &self,
        xy: (Real, Real),
        epoch: Option<Real>,
        reference_epoch: Option<Real>,
    ) -> EvalResult<Option<Vec<Real>>> {
        Ok(self
            .evaluate_local(xy, epoch, reference_epoch)?
            .map(|local| self.scatter(&local)))
    }

    fn scatter(&self, local: &[Real]) -> Vec<Real> {
        let mut full = vec![0.0; self.width];
        for (param, value) in self.parameter_map.iter().zip(local) {
            if let Some(slot) = full.get_mut(param.slot()) {
                *slot = *value;
            }
        }
        full
    }
}
