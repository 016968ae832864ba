//! Affine map between grid node indices and interpolation coordinates.

use ggxf_core::Real;
use nalgebra::{Matrix2, Vector2};

use crate::error::{StructuralError, StructuralResult};

/// `xy = origin + M · (i, j)`, with the inverse precomputed.
///
/// Coefficients follow the GGXF order
/// `[x0, dx/di, dx/dj, y0, dy/di, dy/dj]` and locate node centres.
#[derive(Debug, Clone, PartialEq)]
pub struct AffineTransform {
    coeffs: [Real; 6],
    origin: Vector2<Real>,
    forward: Matrix2<Real>,
    inverse: Matrix2<Real>,
}

impl AffineTransform {
    pub fn new(grid: &str, coeffs: [Real; 6]) -> StructuralResult<Self> {
        if coeffs.iter().any(|c| !c.is_finite()) {
            return Err(StructuralError::NonFiniteTransform {
                grid: grid.to_string(),
            });
        }
        let [x0, xi, xj, y0, yi, yj] = coeffs;
        let forward = Matrix2::new(xi, xj, yi, yj);
        let inverse = forward
            .try_inverse()
            .filter(|inv| inv.iter().all(|v| v.is_finite()))
            .ok_or_else(|| StructuralError::SingularTransform {
                grid: grid.to_string(),
            })?;
        Ok(Self {
            coeffs,
            origin: Vector2::new(x0, y0),
            forward,
            inverse,
        })
    }

    pub fn coeffs(&self) -> [Real; 6] {
        self.coeffs
    }

    /// Coordinate of the (possibly fractional) node `(i, j)`.
    pub fn calc_xy(&self, ij: (Real, Real)) -> (Real, Real) {
        let xy = self.origin + self.forward * Vector2::new(ij.0, ij.1);
        (xy.x, xy.y)
    }

    /// Continuous node indices of `xy`.
    pub fn calc_ij(&self, xy: (Real, Real)) -> (Real, Real) {
        let ij = self.inverse * (Vector2::new(xy.0, xy.1) - self.origin);
        (ij.x, ij.y)
    }

    /// Length of the diagonal of one grid cell.
    pub fn cell_diagonal(&self) -> Real {
        (self.forward * Vector2::new(1.0, 1.0)).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ggxf_core::{Tolerances, nearly_equal};
    use proptest::prelude::*;

    const TOL: Tolerances = Tolerances::new(1e-9, 1e-12);

    #[test]
    fn forward_matches_coefficients() {
        let affine = AffineTransform::new("g", [172.0, 0.3, 0.0, 41.5, 0.0, 0.4]).unwrap();
        let (x, y) = affine.calc_xy((2.0, 3.0));
        assert!(nearly_equal(x, 172.6, TOL));
        assert!(nearly_equal(y, 42.7, TOL));
    }

    #[test]
    fn rotated_grid_inverts() {
        let affine = AffineTransform::new("g", [10.0, 0.0, -1.0, 20.0, 2.0, 0.0]).unwrap();
        let (i, j) = affine.calc_ij((7.0, 24.0));
        assert!(nearly_equal(i, 2.0, TOL));
        assert!(nearly_equal(j, 3.0, TOL));
        assert!(nearly_equal(affine.cell_diagonal(), 5.0_f64.sqrt(), TOL));
    }

    #[test]
    fn singular_transform_is_rejected() {
        let err = AffineTransform::new("flat", [0.0, 1.0, 2.0, 0.0, 2.0, 4.0]).unwrap_err();
        assert_eq!(
            err,
            StructuralError::SingularTransform {
                grid: "flat".into()
            }
        );
        assert!(matches!(
            AffineTransform::new("nan", [0.0, Real::NAN, 0.0, 0.0, 0.0, 1.0]),
            Err(StructuralError::NonFiniteTransform { .. })
        ));
    }

    proptest! {
        #[test]
        fn calc_ij_inverts_calc_xy(
            x0 in -180.0_f64..180.0,
            y0 in -90.0_f64..90.0,
            xi in 0.01_f64..2.0,
            yj in 0.01_f64..2.0,
            shear in -0.5_f64..0.5,
            i in 0.0_f64..500.0,
            j in 0.0_f64..500.0,
        ) {
            let affine = AffineTransform::new("p", [x0, xi, shear * xi, y0, 0.0, yj]).unwrap();
            let (ri, rj) = affine.calc_ij(affine.calc_xy((i, j)));
            prop_assert!(nearly_equal(ri, i, Tolerances::new(1e-7, 1e-9)));
            prop_assert!(nearly_equal(rj, j, Tolerances::new(1e-7, 1e-9)));
        }
    }
}
