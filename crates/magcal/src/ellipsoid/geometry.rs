//! Ellipsoid geometry recovery: center, principal axes and radii.

use nalgebra::{Matrix3, Matrix4, Vector3};

use super::types::{CalibrationError, EllipsoidGeometry, QuadricCoeffs, SolveOptions};

/// Recover center, radii and rotation from fitted quadric coefficients.
///
/// Steps:
/// 1. Assemble the symmetric 4×4 algebraic matrix M of the quadric in
///    homogeneous form.
/// 2. Solve `c = −Q₃⁻¹·[G,H,I]ᵀ` for the center (SVD pseudo-inverse of the
///    upper-left 3×3 block, full rank required).
/// 3. Translate M to the center via the congruence `Tᵀ·M·T`, which removes
///    the linear terms; the remaining scalar `M′[3,3]` normalizes the form.
/// 4. Eigen-decompose the 3×3 block with the spectrum scaled by
///    `1/(−M′[3,3])`; all scaled eigenvalues must be finite and strictly
///    positive, otherwise the quadric is not an ellipsoid.
/// 5. Order eigenpairs by descending eigenvalue (radii ascending) and fix
///    each eigenvector's sign so its largest-magnitude component is positive.
pub fn resolve_geometry(
    coeffs: &QuadricCoeffs,
    options: &SolveOptions,
) -> Result<EllipsoidGeometry, CalibrationError> {
    let [a, b, c, d, e, f, g, h, i] = coeffs.0;

    let q3 = Matrix3::new(a, d, e, d, b, f, e, f, c);
    let ghi = Vector3::new(g, h, i);

    // Center: c = −Q₃⁻¹·[G,H,I]ᵀ. The 3×3 block must be full rank; a
    // rank-deficient block means the quadric has no unique center.
    let svd = q3.svd(true, true);
    let eps = options.rank_eps * svd.singular_values.max();
    let rank = svd.rank(eps);
    if rank < 3 {
        return Err(CalibrationError::SingularFit(format!(
            "quadric 3x3 block has rank {rank} of 3; no unique ellipsoid center"
        )));
    }
    let center = -svd
        .solve(&ghi, eps)
        .map_err(|e| CalibrationError::SingularFit(e.to_string()))?;

    // Homogeneous algebraic matrix and the translation congruence Tᵀ·M·T.
    // The congruence leaves the 3×3 block unchanged; only the scalar
    // M′[3,3] matters for normalization.
    let mut m = Matrix4::zeros();
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(&q3);
    m[(0, 3)] = g;
    m[(1, 3)] = h;
    m[(2, 3)] = i;
    m[(3, 0)] = g;
    m[(3, 1)] = h;
    m[(3, 2)] = i;
    m[(3, 3)] = -1.0;

    let mut t = Matrix4::identity();
    t[(0, 3)] = center.x;
    t[(1, 3)] = center.y;
    t[(2, 3)] = center.z;
    let m_centered = t.transpose() * m * t;

    let scale = -1.0 / m_centered[(3, 3)];

    // Symmetric eigendecomposition of the block; the scaled eigenvalues are
    // the inverse squared radii.
    let eig = q3.symmetric_eigen();
    let mut order = [0usize, 1, 2];
    let scaled = [
        eig.eigenvalues[0] * scale,
        eig.eigenvalues[1] * scale,
        eig.eigenvalues[2] * scale,
    ];
    order.sort_by(|&p, &q| {
        scaled[q]
            .partial_cmp(&scaled[p])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let eigenvalues = [scaled[order[0]], scaled[order[1]], scaled[order[2]]];
    if eigenvalues.iter().any(|ev| !ev.is_finite() || *ev <= 0.0) {
        tracing::debug!(?eigenvalues, "fit is not an ellipsoid");
        return Err(CalibrationError::DegenerateGeometry { eigenvalues });
    }

    let mut radii = [0.0; 3];
    let mut rotation = [[0.0; 3]; 3];
    for (k, &src) in order.iter().enumerate() {
        radii[k] = (1.0 / eigenvalues[k]).sqrt();

        let mut v = eig.eigenvectors.column(src).into_owned();
        v /= v.norm();
        // Deterministic sign: make the largest-magnitude component positive,
        // first index winning ties.
        let mut lead = 0;
        for j in 1..3 {
            if v[j].abs() > v[lead].abs() {
                lead = j;
            }
        }
        if v[lead] < 0.0 {
            v = -v;
        }
        for r in 0..3 {
            rotation[r][k] = v[r];
        }
    }

    tracing::debug!(?radii, center = ?[center.x, center.y, center.z], "resolved ellipsoid");

    Ok(EllipsoidGeometry {
        center: [center.x, center.y, center.z],
        radii,
        rotation,
    })
}
