//! Deterministic synthetic sample clouds for tests, docs and the CLI.

use nalgebra::{Matrix3, Rotation3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::ellipsoid::types::{EllipsoidGeometry, SamplePoint};

/// Row-major rotation matrix from intrinsic roll/pitch/yaw Euler angles
/// (radians).
pub fn rotation_from_euler(roll: f64, pitch: f64, yaw: f64) -> [[f64; 3]; 3] {
    let r = Rotation3::from_euler_angles(roll, pitch, yaw);
    let m = r.matrix();
    [
        [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
        [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
        [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
    ]
}

/// Sample `n` points on an ellipsoid surface, optionally perturbed by
/// per-component Gaussian noise of standard deviation `noise_sigma`.
///
/// Directions are uniform on the sphere (normalized Gaussian triples); each
/// point is `center + R·diag(radii)·u`. The same seed and arguments always
/// produce the same cloud.
pub fn sample_ellipsoid(
    geometry: &EllipsoidGeometry,
    n: usize,
    noise_sigma: f64,
    seed: u64,
) -> Vec<SamplePoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    let r = Matrix3::from_fn(|i, j| geometry.rotation[i][j]);
    let center = Vector3::from_column_slice(&geometry.center);
    let radii = Vector3::from_column_slice(&geometry.radii);

    let mut points = Vec::with_capacity(n);
    for _ in 0..n {
        let u = loop {
            let v = Vector3::new(
                rng.sample::<f64, _>(StandardNormal),
                rng.sample::<f64, _>(StandardNormal),
                rng.sample::<f64, _>(StandardNormal),
            );
            let norm = v.norm();
            if norm > 1e-12 {
                break v / norm;
            }
        };

        let mut p = center + r * u.component_mul(&radii);
        if noise_sigma > 0.0 {
            for k in 0..3 {
                p[k] += noise_sigma * rng.sample::<f64, _>(StandardNormal);
            }
        }
        points.push([p.x, p.y, p.z]);
    }
    points
}

/// Sample `n` points exactly on the unit sphere centered at the origin.
pub fn sample_unit_sphere(n: usize, seed: u64) -> Vec<SamplePoint> {
    sample_ellipsoid(
        &EllipsoidGeometry::axis_aligned([0.0; 3], [1.0; 3]),
        n,
        0.0,
        seed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn same_seed_same_cloud() {
        let geom = EllipsoidGeometry::axis_aligned([1.0, 2.0, 3.0], [0.5, 1.0, 2.0]);
        let a = sample_ellipsoid(&geom, 50, 0.01, 17);
        let b = sample_ellipsoid(&geom, 50, 0.01, 17);
        assert_eq!(a, b);

        let c = sample_ellipsoid(&geom, 50, 0.01, 18);
        assert_ne!(a, c);
    }

    #[test]
    fn zero_noise_points_lie_on_surface() {
        let geom = EllipsoidGeometry {
            center: [0.5, -1.0, 2.0],
            radii: [1.0, 2.0, 3.0],
            rotation: rotation_from_euler(0.1, 0.2, 0.3),
        };
        let r = Matrix3::from_fn(|i, j| geom.rotation[i][j]);

        for &[x, y, z] in &sample_ellipsoid(&geom, 100, 0.0, 9) {
            let d = Vector3::new(x - geom.center[0], y - geom.center[1], z - geom.center[2]);
            let local = r.transpose() * d;
            let s = (local.x / geom.radii[0]).powi(2)
                + (local.y / geom.radii[1]).powi(2)
                + (local.z / geom.radii[2]).powi(2);
            assert_abs_diff_eq!(s, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn unit_sphere_has_unit_norm() {
        for &[x, y, z] in &sample_unit_sphere(100, 1) {
            assert_abs_diff_eq!((x * x + y * y + z * z).sqrt(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn euler_rotation_is_orthonormal() {
        let m = rotation_from_euler(0.7, -0.4, 1.2);
        let r = Matrix3::from_fn(|i, j| m[i][j]);
        let should_be_identity = r * r.transpose();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(should_be_identity[(i, j)], expected, epsilon = 1e-12);
            }
        }
        assert_abs_diff_eq!(r.determinant(), 1.0, epsilon = 1e-12);
    }
}
