//! Priority-ordered spatial container of sibling grids.
//!
//! One nest sits at the root of every group and one inside every grid for
//! its children. Grids live in the group's arena; a nest only holds ids.

use ggxf_core::{GridId, Real};

use crate::error::{ConfigError, ConfigResult, StructuralError, StructuralResult};
use crate::grid::Grid;

#[derive(Debug, Clone, Default)]
pub struct GridNest {
    members: Vec<GridId>,
    search_order: Option<Vec<GridId>>,
}

impl GridNest {
    pub fn members(&self) -> &[GridId] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_configured(&self) -> bool {
        self.search_order.is_some()
    }

    /// Check `candidate` against the current members without adding it.
    ///
    /// Siblings sharing more than the smaller tolerance of the two must both
    /// carry a priority, and the priorities must differ.
    pub(crate) fn check_sibling(&self, arena: &[Grid], candidate: &Grid) -> StructuralResult<()> {
        for sibling in self.members.iter().filter_map(|id| arena.get(id.slot())) {
            let tolerance = sibling.tolerance().min(candidate.tolerance());
            if !sibling.extent().overlaps(candidate.extent(), tolerance) {
                continue;
            }
            let distinct = matches!(
                (sibling.priority(), candidate.priority()),
                (Some(a), Some(b)) if a != b
            );
            if !distinct {
                return Err(StructuralError::AmbiguousOverlap {
                    first: sibling.name().to_string(),
                    second: candidate.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Append a member; any cached search order is dropped.
    pub(crate) fn push(&mut self, id: GridId) {
        self.members.push(id);
        self.search_order = None;
    }

    /// Cache the search order: priority descending, missing priority as 0,
    /// insertion order among equals.
    pub(crate) fn configure(&mut self, arena: &[Grid]) {
        let priority = |id: &GridId| arena.get(id.slot()).and_then(Grid::priority).unwrap_or(0);
        let mut order = self.members.clone();
        order.sort_by_key(|id| std::cmp::Reverse(priority(id)));
        self.search_order = Some(order);
    }

    /// Most specific grid containing `xy`, or `None` outside coverage.
    pub fn grid_at(&self, arena: &[Grid], xy: (Real, Real)) -> ConfigResult<Option<GridId>> {
        let order = self
            .search_order
            .as_ref()
            .ok_or(ConfigError::NotConfigured { what: "Grid nest" })?;
        for &id in order {
            let Some(grid) = arena.get(id.slot()) else {
                continue;
            };
            if grid.contains(xy) {
                let deeper = grid.children.grid_at(arena, xy)?;
                return Ok(Some(deeper.unwrap_or(id)));
            }
        }
        Ok(None)
    }
}

/// Configure the root nest and every grid's child nest in `arena`.
pub(crate) fn configure_all(root: &mut GridNest, arena: &mut [Grid]) {
    root.configure(arena);
    for slot in 0..arena.len() {
        let mut children = std::mem::take(&mut arena[slot].children);
        children.configure(arena);
        arena[slot].children = children;
    }
}
