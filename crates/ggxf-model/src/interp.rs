//! Bilinear, biquadratic and bicubic interpolation over a single grid.
//!
//! Each kernel selects a cell with [`Grid::cell_ij`], builds one weight
//! vector per axis and sums the outer-product-weighted node values.

use std::fmt;
use std::str::FromStr;

use ggxf_core::Real;
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};
use crate::grid::Grid;

/// Kernel signature, resolved once per group.
pub type Kernel = fn(&Grid, (Real, Real)) -> EvalResult<Vec<Real>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    Bilinear,
    Biquadratic,
    Bicubic,
}

impl InterpolationMethod {
    pub const ALL: [InterpolationMethod; 3] = [
        InterpolationMethod::Bilinear,
        InterpolationMethod::Biquadratic,
        InterpolationMethod::Bicubic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InterpolationMethod::Bilinear => "bilinear",
            InterpolationMethod::Biquadratic => "biquadratic",
            InterpolationMethod::Bicubic => "bicubic",
        }
    }

    /// Smallest node count per axis the stencil fits in.
    pub fn min_nodes(self) -> usize {
        match self {
            InterpolationMethod::Bilinear => 2,
            InterpolationMethod::Biquadratic => 3,
            InterpolationMethod::Bicubic => 4,
        }
    }

    pub fn kernel(self) -> Kernel {
        match self {
            InterpolationMethod::Bilinear => bilinear,
            InterpolationMethod::Biquadratic => biquadratic,
            InterpolationMethod::Bicubic => bicubic,
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("interpolationMethod {0} is not supported")]
pub struct UnknownInterpolationMethod(pub String);

impl FromStr for InterpolationMethod {
    type Err = UnknownInterpolationMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InterpolationMethod::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| UnknownInterpolationMethod(s.to_string()))
    }
}

fn ensure_size(grid: &Grid, method: InterpolationMethod) -> EvalResult<()> {
    let (i_count, j_count) = grid.size();
    let min = method.min_nodes();
    if i_count < min || j_count < min {
        return Err(too_small(grid, method));
    }
    Ok(())
}

fn too_small(grid: &Grid, method: InterpolationMethod) -> EvalError {
    let (i_count, j_count) = grid.size();
    EvalError::GridTooSmall {
        grid: grid.name().to_string(),
        method,
        i_count,
        j_count,
    }
}

/// `Σ wi[a]·wj[b]·node(ci + first + a, cj + first + b)`.
fn stencil_sum(
    grid: &Grid,
    method: InterpolationMethod,
    cell: (usize, usize),
    first: isize,
    wi: &[Real],
    wj: &[Real],
) -> EvalResult<Vec<Real>> {
    let mut value = vec![0.0; grid.n_param()];
    for (a, &fa) in wi.iter().enumerate() {
        for (b, &fb) in wj.iter().enumerate() {
            let i = cell.0 as isize + first + a as isize;
            let j = cell.1 as isize + first + b as isize;
            let node = usize::try_from(i)
                .ok()
                .zip(usize::try_from(j).ok())
                .and_then(|(i, j)| grid.node(i, j))
                .ok_or_else(|| too_small(grid, method))?;
            let weight = fa * fb;
            for (v, n) in value.iter_mut().zip(node) {
                *v += weight * n;
            }
        }
    }
    Ok(value)
}

pub fn bilinear(grid: &Grid, xy: (Real, Real)) -> EvalResult<Vec<Real>> {
    let method = InterpolationMethod::Bilinear;
    ensure_size(grid, method)?;
    let (cell, (u, v)) = grid.cell_ij(xy);
    stencil_sum(grid, method, cell, 0, &[1.0 - u, u], &[1.0 - v, v])
}

/// Centre the 3-node stencil on the node nearest the point, keeping it in bounds.
fn quadratic_axis(cell: usize, t: Real, count: usize) -> (usize, [Real; 3]) {
    let (c, t) = if (t > 0.5 && cell + 2 < count) || cell == 0 {
        (cell + 1, t - 1.0)
    } else {
        (cell, t)
    };
    let t2 = t * t;
    (c, [0.5 * t2 - 0.5 * t, 1.0 - t2, 0.5 * t2 + 0.5 * t])
}

pub fn biquadratic(grid: &Grid, xy: (Real, Real)) -> EvalResult<Vec<Real>> {
    let method = InterpolationMethod::Biquadratic;
    ensure_size(grid, method)?;
    let ((ci, cj), (u, v)) = grid.cell_ij(xy);
    let (i_count, j_count) = grid.size();
    let (ci, wi) = quadratic_axis(ci, u, i_count);
    let (cj, wj) = quadratic_axis(cj, v, j_count);
    stencil_sum(grid, method, (ci, cj), -1, &wi, &wj)
}

/// Shift the 4-node stencil `{-1, 0, 1, 2}` inward at either grid edge.
fn cubic_axis(cell: usize, t: Real, count: usize) -> (usize, [Real; 4]) {
    let (c, t) = if cell == 0 {
        (1, t - 1.0)
    } else if cell + 2 >= count {
        (cell - 1, t + 1.0)
    } else {
        (cell, t)
    };
    let t2 = t * t;
    let t3 = t2 * t;
    (
        c,
        [
            -t3 / 6.0 + 0.5 * t2 - t / 3.0,
            0.5 * t3 - t2 - 0.5 * t + 1.0,
            -0.5 * t3 + 0.5 * t2 + t,
            t3 / 6.0 - t / 6.0,
        ],
    )
}

pub fn bicubic(grid: &Grid, xy: (Real, Real)) -> EvalResult<Vec<Real>> {
    let method = InterpolationMethod::Bicubic;
    ensure_size(grid, method)?;
    let ((ci, cj), (u, v)) = grid.cell_ij(xy);
    let (i_count, j_count) = grid.size();
    let (ci, wi) = cubic_axis(ci, u, i_count);
    let (cj, wj) = cubic_axis(cj, v, j_count);
    stencil_sum(grid, method, (ci, cj), -1, &wi, &wj)
}
