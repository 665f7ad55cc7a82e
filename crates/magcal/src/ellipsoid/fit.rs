//! Least-squares quadric fit: design matrix and normal-equation solve.

use nalgebra::{DMatrix, DVector};

use super::types::{CalibrationError, QuadricCoeffs, SamplePoint, SolveOptions};

/// Minimum number of samples needed to determine the 9 quadric unknowns.
pub const MIN_POINTS: usize = 9;

/// Build the N×9 design matrix for the implicit quadric equation together
/// with its all-ones right-hand side.
///
/// Row i is `[x², y², z², 2xy, 2xz, 2yz, 2x, 2y, 2z]` evaluated at point i;
/// the surface is normalized to equal 1, hence the ones vector.
pub(crate) fn design_matrix(
    points: &[SamplePoint],
) -> Result<(DMatrix<f64>, DVector<f64>), CalibrationError> {
    if points.is_empty() {
        return Err(CalibrationError::InvalidInput);
    }

    let n = points.len();
    let mut d = DMatrix::<f64>::zeros(n, 9);
    for (i, &[x, y, z]) in points.iter().enumerate() {
        d[(i, 0)] = x * x;
        d[(i, 1)] = y * y;
        d[(i, 2)] = z * z;
        d[(i, 3)] = 2.0 * x * y;
        d[(i, 4)] = 2.0 * x * z;
        d[(i, 5)] = 2.0 * y * z;
        d[(i, 6)] = 2.0 * x;
        d[(i, 7)] = 2.0 * y;
        d[(i, 8)] = 2.0 * z;
    }

    Ok((d, DVector::from_element(n, 1.0)))
}

/// Fit the 9 quadric coefficients to a sample cloud.
///
/// Solves the normal equations `(DᵀD) v = Dᵀ·1` through an SVD
/// pseudo-inverse. Rank of the normal matrix is checked explicitly: points
/// confined to a plane span at most the six plane-restricted quadric
/// monomials, so an effective rank of 6 or less is rejected as
/// [`CalibrationError::SingularFit`]. Rank-7/8 systems (e.g. a sparse sample
/// whose cross-moment columns vanish) are solved with null directions zeroed.
pub fn fit_quadric(
    points: &[SamplePoint],
    options: &SolveOptions,
) -> Result<QuadricCoeffs, CalibrationError> {
    let (d, rhs) = design_matrix(points)?;
    if points.len() < MIN_POINTS {
        return Err(CalibrationError::SingularFit(format!(
            "need at least {} points for 9 quadric unknowns, got {}",
            MIN_POINTS,
            points.len()
        )));
    }

    let dtd = d.transpose() * &d;
    let dtb = d.transpose() * rhs;

    let svd = dtd.svd(true, true);
    let sv_max = svd.singular_values.max();
    let eps = options.rank_eps * sv_max;
    let rank = svd.rank(eps);
    tracing::debug!(rank, sv_max, "quadric normal equations");

    if rank <= 6 {
        return Err(CalibrationError::SingularFit(format!(
            "normal equations have rank {rank} of 9; samples span too few independent directions"
        )));
    }

    let v = svd
        .solve(&dtb, eps)
        .map_err(|e| CalibrationError::SingularFit(e.to_string()))?;

    let mut coeffs = [0.0; 9];
    for (c, &vi) in coeffs.iter_mut().zip(v.iter()) {
        *c = vi;
    }
    Ok(QuadricCoeffs(coeffs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::sample_unit_sphere;
    use approx::assert_abs_diff_eq;

    #[test]
    fn design_matrix_row_layout() {
        let (d, rhs) = design_matrix(&[[1.0, 2.0, 3.0]]).unwrap();
        let expected = [1.0, 4.0, 9.0, 4.0, 6.0, 12.0, 2.0, 4.0, 6.0];
        for (j, &e) in expected.iter().enumerate() {
            assert_abs_diff_eq!(d[(0, j)], e);
        }
        assert_eq!(rhs.len(), 1);
        assert_abs_diff_eq!(rhs[0], 1.0);
    }

    #[test]
    fn empty_input_is_invalid() {
        let err = design_matrix(&[]).unwrap_err();
        assert_eq!(err, CalibrationError::InvalidInput);
        let err = fit_quadric(&[], &SolveOptions::default()).unwrap_err();
        assert_eq!(err, CalibrationError::InvalidInput);
    }

    #[test]
    fn too_few_points_is_singular() {
        let pts: Vec<[f64; 3]> = sample_unit_sphere(8, 7);
        let err = fit_quadric(&pts, &SolveOptions::default()).unwrap_err();
        assert!(matches!(err, CalibrationError::SingularFit(_)), "{err:?}");
    }

    #[test]
    fn coplanar_points_are_singular() {
        // Points on the unit circle in the z = 0 plane plus a few interior
        // ones: still a single plane, rank of the normal matrix is at most 6.
        let mut pts = Vec::new();
        for k in 0..16 {
            let t = 2.0 * std::f64::consts::PI * k as f64 / 16.0;
            pts.push([t.cos(), t.sin(), 0.0]);
        }
        pts.push([0.2, 0.1, 0.0]);
        pts.push([-0.3, 0.4, 0.0]);

        let err = fit_quadric(&pts, &SolveOptions::default()).unwrap_err();
        assert!(matches!(err, CalibrationError::SingularFit(_)), "{err:?}");
    }

    #[test]
    fn tilted_plane_is_singular() {
        // Same circle rotated out of the coordinate planes.
        let mut pts = Vec::new();
        for k in 0..24 {
            let t = 2.0 * std::f64::consts::PI * k as f64 / 24.0;
            let (u, v) = (t.cos(), t.sin());
            // Plane spanned by (1,0,1)/√2 and (0,1,0), offset from origin.
            let s = std::f64::consts::FRAC_1_SQRT_2;
            pts.push([u * s + 0.5, v + 0.1, u * s - 0.2]);
        }

        let err = fit_quadric(&pts, &SolveOptions::default()).unwrap_err();
        assert!(matches!(err, CalibrationError::SingularFit(_)), "{err:?}");
    }

    #[test]
    fn unit_sphere_recovers_unit_coeffs() {
        let pts = sample_unit_sphere(300, 11);
        let QuadricCoeffs(c) = fit_quadric(&pts, &SolveOptions::default()).unwrap();
        for (j, &cj) in c.iter().enumerate() {
            let expected = if j < 3 { 1.0 } else { 0.0 };
            assert_abs_diff_eq!(cj, expected, epsilon = 1e-9);
        }
    }
}
