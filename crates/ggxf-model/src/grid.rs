//! Grids: an affine-located block of per-node parameter values.

use ggxf_core::{GridId, Real};
use serde::Serialize;

use crate::affine::AffineTransform;
use crate::error::{StructuralError, StructuralResult};
use crate::nest::GridNest;

/// Cell diagonal multiplier giving the containment/overlap tolerance.
pub const GRID_TOLERANCE_FACTOR: Real = 1.0e-5;

/// Node values laid out `[i][j][p]`, row-major with `i` slowest.
#[derive(Debug, Clone, PartialEq)]
pub struct GridData {
    shape: (usize, usize, usize),
    values: Vec<Real>,
}

impl GridData {
    /// Wrap a flat buffer whose length must equal the product of `shape`.
    pub fn from_shape_vec(shape: (usize, usize, usize), values: Vec<Real>) -> StructuralResult<Self> {
        let expected = shape.0 * shape.1 * shape.2;
        if values.len() != expected {
            return Err(StructuralError::MalformedData {
                what: format!(
                    "{} values cannot fill a {}x{}x{} array",
                    values.len(),
                    shape.0,
                    shape.1,
                    shape.2
                ),
            });
        }
        Ok(Self { shape, values })
    }

    /// Build from nested rows; ragged input is rejected.
    pub fn from_nested(rows: &[Vec<Vec<Real>>]) -> StructuralResult<Self> {
        let i_count = rows.len();
        let j_count = rows.first().map_or(0, Vec::len);
        let n_param = rows
            .first()
            .and_then(|row| row.first())
            .map_or(0, Vec::len);
        let mut values = Vec::with_capacity(i_count * j_count * n_param);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != j_count {
                return Err(StructuralError::MalformedData {
                    what: format!("row {i} has {} nodes, expected {j_count}", row.len()),
                });
            }
            for (j, node) in row.iter().enumerate() {
                if node.len() != n_param {
                    return Err(StructuralError::MalformedData {
                        what: format!(
                            "node ({i}, {j}) has {} values, expected {n_param}",
                            node.len()
                        ),
                    });
                }
                values.extend_from_slice(node);
            }
        }
        Ok(Self {
            shape: (i_count, j_count, n_param),
            values,
        })
    }

    /// Fill every node value from `f(i, j, p)`.
    pub fn from_fn(
        shape: (usize, usize, usize),
        mut f: impl FnMut(usize, usize, usize) -> Real,
    ) -> Self {
        let (ni, nj, np) = shape;
        let mut values = Vec::with_capacity(ni * nj * np);
        for i in 0..ni {
            for j in 0..nj {
                for p in 0..np {
                    values.push(f(i, j, p));
                }
            }
        }
        Self { shape, values }
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        self.shape
    }

    pub fn values(&self) -> &[Real] {
        &self.values
    }

    /// All parameter values at node `(i, j)`.
    pub fn node(&self, i: usize, j: usize) -> Option<&[Real]> {
        let (ni, nj, np) = self.shape;
        if i >= ni || j >= nj {
            return None;
        }
        let start = (i * nj + j) * np;
        self.values.get(start..start + np)
    }

    /// Smallest and largest finite value of parameter `p`.
    pub fn value_range(&self, p: usize) -> Option<(Real, Real)> {
        let np = self.shape.2;
        if p >= np {
            return None;
        }
        self.values
            .iter()
            .skip(p)
            .step_by(np)
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Axis-aligned bounding box in interpolation coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extent {
    pub x_min: Real,
    pub y_min: Real,
    pub x_max: Real,
    pub y_max: Real,
}

impl Extent {
    fn from_points(points: impl IntoIterator<Item = (Real, Real)>) -> Self {
        points.into_iter().fold(
            Extent {
                x_min: Real::INFINITY,
                y_min: Real::INFINITY,
                x_max: Real::NEG_INFINITY,
                y_max: Real::NEG_INFINITY,
            },
            |e, (x, y)| Extent {
                x_min: e.x_min.min(x),
                y_min: e.y_min.min(y),
                x_max: e.x_max.max(x),
                y_max: e.y_max.max(y),
            },
        )
    }

    /// Closed-interval containment, no tolerance.
    pub fn contains(&self, xy: (Real, Real)) -> bool {
        self.x_min <= xy.0 && xy.0 <= self.x_max && self.y_min <= xy.1 && xy.1 <= self.y_max
    }

    /// True when the boxes share more than a `tolerance`-wide sliver.
    pub fn overlaps(&self, other: &Extent, tolerance: Real) -> bool {
        self.x_min < other.x_max - tolerance
            && other.x_min < self.x_max - tolerance
            && self.y_min < other.y_max - tolerance
            && other.y_min < self.y_max - tolerance
    }

    /// True when `inner`, shrunk by `tolerance` on every side, lies inside `self`.
    pub fn encloses(&self, inner: &Extent, tolerance: Real) -> bool {
        inner.x_min + tolerance >= self.x_min
            && inner.x_max - tolerance <= self.x_max
            && inner.y_min + tolerance >= self.y_min
            && inner.y_max - tolerance <= self.y_max
    }
}

/// Loader-facing description of one grid.
#[derive(Debug, Clone)]
pub struct GridSpec {
    pub name: String,
    pub affine: [Real; 6],
    pub i_count: usize,
    pub j_count: usize,
    pub priority: Option<i32>,
    pub data: GridData,
}

impl GridSpec {
    pub fn new(
        name: impl Into<String>,
        affine: [Real; 6],
        (i_count, j_count): (usize, usize),
        data: GridData,
    ) -> Self {
        Self {
            name: name.into(),
            affine,
            i_count,
            j_count,
            priority: None,
            data,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Grid {
    name: String,
    display_id: String,
    affine: AffineTransform,
    i_count: usize,
    j_count: usize,
    priority: Option<i32>,
    parent: Option<GridId>,
    pub(crate) children: GridNest,
    data: GridData,
    extent: Extent,
    tolerance: Real,
}

impl Grid {
    /// Validate a [`GridSpec`] against the owning group's parameter count.
    pub fn new(spec: GridSpec, n_param: usize) -> StructuralResult<Self> {
        let GridSpec {
            name,
            affine,
            i_count,
            j_count,
            priority,
            data,
        } = spec;
        if i_count < 1 || j_count < 1 {
            return Err(StructuralError::InvalidNodeCount {
                grid: name,
                i_count,
                j_count,
            });
        }
        let expected = (i_count, j_count, n_param);
        if data.shape() != expected {
            return Err(StructuralError::DataShape {
                grid: name,
                expected,
                actual: data.shape(),
            });
        }
        let affine = AffineTransform::new(&name, affine)?;
        let (imax, jmax) = ((i_count - 1) as Real, (j_count - 1) as Real);
        let extent = Extent::from_points(
            [(0.0, 0.0), (0.0, jmax), (imax, 0.0), (imax, jmax)].map(|ij| affine.calc_xy(ij)),
        );
        let tolerance = affine.cell_diagonal() * GRID_TOLERANCE_FACTOR;
        Ok(Self {
            display_id: name.clone(),
            name,
            affine,
            i_count,
            j_count,
            priority,
            parent: None,
            children: GridNest::default(),
            data,
            extent,
            tolerance,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hierarchical id (`group:index:child…`) assigned at configuration.
    pub fn display_id(&self) -> &str {
        &self.display_id
    }

    pub(crate) fn set_display_id(&mut self, id: String) {
        self.display_id = id;
    }

    pub fn affine(&self) -> &AffineTransform {
        &self.affine
    }

    /// `(i_count, j_count)`.
    pub fn size(&self) -> (usize, usize) {
        (self.i_count, self.j_count)
    }

    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    pub fn parent(&self) -> Option<GridId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: GridId) {
        self.parent = Some(parent);
    }

    pub fn children(&self) -> &GridNest {
        &self.children
    }

    pub fn data(&self) -> &GridData {
        &self.data
    }

    pub fn n_param(&self) -> usize {
        self.data.shape().2
    }

    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    pub fn tolerance(&self) -> Real {
        self.tolerance
    }

    pub fn calc_xy(&self, ij: (Real, Real)) -> (Real, Real) {
        self.affine.calc_xy(ij)
    }

    pub fn calc_ij(&self, xy: (Real, Real)) -> (Real, Real) {
        self.affine.calc_ij(xy)
    }

    /// Lower-left node of the cell holding `xy` and the offset within it.
    ///
    /// The cell index is clamped to `[0, count-2]` per axis so the upper
    /// corner always exists; the offset may then fall outside `[0, 1)`.
    pub fn cell_ij(&self, xy: (Real, Real)) -> ((usize, usize), (Real, Real)) {
        let (i, j) = self.calc_ij(xy);
        let (ci, fi) = clamp_cell(i, self.i_count);
        let (cj, fj) = clamp_cell(j, self.j_count);
        ((ci, cj), (fi, fj))
    }

    /// Uses the precomputed extent; tolerance only applies while building.
    pub fn contains(&self, xy: (Real, Real)) -> bool {
        self.extent.contains(xy)
    }

    pub fn node(&self, i: usize, j: usize) -> Option<&[Real]> {
        self.data.node(i, j)
    }
}

fn clamp_cell(index: Real, count: usize) -> (usize, Real) {
    let max_cell = count.saturating_sub(2) as Real;
    let cell = index.floor().clamp(0.0, max_cell);
    (cell as usize, index - cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ggxf_core::{Tolerances, nearly_equal};

    const TOL: Tolerances = Tolerances::new(1e-12, 1e-12);

    fn grid(affine: [Real; 6], size: (usize, usize)) -> Grid {
        let data = GridData::from_fn((size.0, size.1, 1), |i, j, _| (i * 10 + j) as Real);
        Grid::new(GridSpec::new("g", affine, size, data), 1).unwrap()
    }

    #[test]
    fn extent_spans_corner_nodes() {
        let g = grid([172.0, 0.3, 0.0, 41.5, 0.0, 0.4], (4, 5));
        let e = g.extent();
        assert!(nearly_equal(e.x_min, 172.0, TOL));
        assert!(nearly_equal(e.x_max, 172.9, TOL));
        assert!(nearly_equal(e.y_min, 41.5, TOL));
        assert!(nearly_equal(e.y_max, 43.1, TOL));
        assert!(nearly_equal(g.tolerance(), 0.5e-5, TOL));
    }

    #[test]
    fn negative_steps_still_give_ordered_extent() {
        let g = grid([10.0, -1.0, 0.0, 50.0, 0.0, -0.5], (3, 3));
        assert_eq!(
            *g.extent(),
            Extent {
                x_min: 8.0,
                y_min: 49.0,
                x_max: 10.0,
                y_max: 50.0
            }
        );
        assert!(g.contains((9.0, 49.5)));
        assert!(g.contains((8.0, 49.0)));
        assert!(!g.contains((7.999, 49.5)));
    }

    #[test]
    fn cell_ij_clamps_to_last_full_cell() {
        let g = grid([0.0, 1.0, 0.0, 0.0, 0.0, 1.0], (4, 3));
        assert_eq!(g.cell_ij((1.25, 0.5)), ((1, 0), (0.25, 0.5)));
        // on the upper boundary the last cell is used with offset 1
        assert_eq!(g.cell_ij((3.0, 2.0)), ((2, 1), (1.0, 1.0)));
        // outside below: cell 0 with negative offset
        assert_eq!(g.cell_ij((-0.5, 0.0)), ((0, 0), (-0.5, 0.0)));
    }

    #[test]
    fn node_values_are_row_major() {
        let g = grid([0.0, 1.0, 0.0, 0.0, 0.0, 1.0], (3, 4));
        assert_eq!(g.node(2, 3), Some(&[23.0][..]));
        assert_eq!(g.node(3, 0), None);
    }

    #[test]
    fn data_shape_must_match_exactly() {
        // transposed data is rejected rather than reshaped
        let data = GridData::from_fn((4, 3, 1), |_, _, _| 0.0);
        let err = Grid::new(
            GridSpec::new("t", [0.0, 1.0, 0.0, 0.0, 0.0, 1.0], (3, 4), data),
            1,
        )
        .unwrap_err();
        assert_eq!(
            err,
            StructuralError::DataShape {
                grid: "t".into(),
                expected: (3, 4, 1),
                actual: (4, 3, 1)
            }
        );
    }

    #[test]
    fn zero_node_count_is_rejected() {
        let data = GridData::from_fn((0, 3, 1), |_, _, _| 0.0);
        assert!(matches!(
            Grid::new(GridSpec::new("z", [0.0, 1.0, 0.0, 0.0, 0.0, 1.0], (0, 3), data), 1),
            Err(StructuralError::InvalidNodeCount { .. })
        ));
    }

    #[test]
    fn nested_data_must_not_be_ragged() {
        let ok = GridData::from_nested(&[vec![vec![1.0, 2.0], vec![3.0, 4.0]]]).unwrap();
        assert_eq!(ok.shape(), (1, 2, 2));
        assert_eq!(ok.values(), &[1.0, 2.0, 3.0, 4.0]);
        assert!(GridData::from_nested(&[vec![vec![1.0], vec![2.0]], vec![vec![3.0]]]).is_err());
        assert!(GridData::from_shape_vec((2, 2, 1), vec![0.0; 3]).is_err());
    }

    #[test]
    fn value_range_ignores_non_finite() {
        let data = GridData::from_shape_vec((1, 3, 2), vec![1.0, -4.0, Real::NAN, 2.0, 3.0, 0.5]).unwrap();
        assert_eq!(data.value_range(0), Some((1.0, 3.0)));
        assert_eq!(data.value_range(1), Some((-4.0, 2.0)));
        assert_eq!(data.value_range(2), None);
    }

    #[test]
    fn overlap_ignores_tolerance_sliver() {
        let a = Extent { x_min: 0.0, y_min: 0.0, x_max: 1.0, y_max: 1.0 };
        let touching = Extent { x_min: 1.0, y_min: 0.0, x_max: 2.0, y_max: 1.0 };
        let sliver = Extent { x_min: 0.999_999_9, y_min: 0.0, x_max: 2.0, y_max: 1.0 };
        let deep = Extent { x_min: 0.5, y_min: 0.5, x_max: 2.0, y_max: 2.0 };
        assert!(!a.overlaps(&touching, 1e-6));
        assert!(!a.overlaps(&sliver, 1e-6));
        assert!(a.overlaps(&deep, 1e-6));
        assert!(deep.overlaps(&a, 1e-6));
        assert!(a.encloses(&Extent { x_min: -1e-7, y_min: 0.2, x_max: 0.5, y_max: 1.0 }, 1e-6));
        assert!(!a.encloses(&deep, 1e-6));
    }
}
