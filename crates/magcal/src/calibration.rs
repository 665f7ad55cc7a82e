//! Correction-matrix composition and the public solve entry point.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::ellipsoid::fit::fit_quadric;
use crate::ellipsoid::geometry::resolve_geometry;
use crate::ellipsoid::types::{CalibrationError, EllipsoidGeometry, SamplePoint, SolveOptions};

/// Result of one calibration solve: hard-iron bias and soft-iron correction.
///
/// Immutable once created; safe to share across threads and reuse for any
/// number of point corrections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Ellipsoid center; subtract from raw samples to remove hard-iron bias.
    pub center: [f64; 3],
    /// Symmetric positive-definite gain matrix, row-major. Applied to a
    /// bias-corrected sample it maps the fitted ellipsoid onto the unit
    /// sphere.
    pub correction: [[f64; 3]; 3],
}

impl CalibrationResult {
    /// The no-op calibration: zero bias, identity correction.
    pub fn identity() -> Self {
        Self {
            center: [0.0; 3],
            correction: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Compose the correction from fitted ellipsoid geometry:
    /// `correction = R · diag(1/r₀, 1/r₁, 1/r₂) · Rᵀ`, the symmetric matrix
    /// square root of the centered, normalized quadric form.
    pub fn from_geometry(geometry: &EllipsoidGeometry) -> Self {
        let r = Matrix3::from_fn(|i, j| geometry.rotation[i][j]);
        let gain = Matrix3::from_diagonal(&Vector3::new(
            1.0 / geometry.radii[0],
            1.0 / geometry.radii[1],
            1.0 / geometry.radii[2],
        ));
        let correction = r * gain * r.transpose();

        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = correction[(i, j)];
            }
        }
        Self {
            center: geometry.center,
            correction: out,
        }
    }

    /// Apply the calibration to one sample: `correction · (p − center)`.
    pub fn correct(&self, p: SamplePoint) -> SamplePoint {
        let d = [
            p[0] - self.center[0],
            p[1] - self.center[1],
            p[2] - self.center[2],
        ];
        let m = &self.correction;
        [
            m[0][0] * d[0] + m[0][1] * d[1] + m[0][2] * d[2],
            m[1][0] * d[0] + m[1][1] * d[1] + m[1][2] * d[2],
            m[2][0] * d[0] + m[2][1] * d[1] + m[2][2] * d[2],
        ]
    }

    /// Apply the calibration to a whole sample slice.
    pub fn correct_all(&self, points: &[SamplePoint]) -> Vec<SamplePoint> {
        points.iter().map(|&p| self.correct(p)).collect()
    }
}

/// Calibrate from a raw sample cloud with default numeric options.
///
/// Runs the full pipeline: design matrix, quadric fit, geometry recovery,
/// correction composition. Pure and stateless; concurrent calls are
/// independent.
pub fn solve(points: &[SamplePoint]) -> Result<CalibrationResult, CalibrationError> {
    solve_with_options(points, &SolveOptions::default())
}

/// Calibrate with explicit numeric options.
pub fn solve_with_options(
    points: &[SamplePoint],
    options: &SolveOptions,
) -> Result<CalibrationResult, CalibrationError> {
    let coeffs = fit_quadric(points, options)?;
    let geometry = resolve_geometry(&coeffs, options)?;
    let result = CalibrationResult::from_geometry(&geometry);
    tracing::info!(
        n_points = points.len(),
        center = ?result.center,
        radii = ?geometry.radii,
        "calibration solved"
    );
    Ok(result)
}

// ── Fit statistics ─────────────────────────────────────────────────────────

/// Quality metrics of a calibration over a sample cloud.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FitStats {
    /// Number of samples the stats were computed over.
    pub n_points: usize,
    /// Mean distance of corrected samples from the origin; 1.0 for a perfect
    /// fit.
    pub mean_radius: f64,
    /// Population standard deviation of the corrected distances.
    pub radius_std: f64,
    /// RMS of (corrected distance − 1).
    pub rms_error: f64,
}

/// Compute fit statistics of a calibration over a sample cloud.
///
/// An empty slice yields zeroed stats.
pub fn fit_stats(result: &CalibrationResult, points: &[SamplePoint]) -> FitStats {
    if points.is_empty() {
        return FitStats::default();
    }

    let n = points.len() as f64;
    let dists: Vec<f64> = points
        .iter()
        .map(|&p| {
            let [x, y, z] = result.correct(p);
            (x * x + y * y + z * z).sqrt()
        })
        .collect();

    let mean = dists.iter().sum::<f64>() / n;
    let var = dists.iter().map(|d| (d - mean) * (d - mean)).sum::<f64>() / n;
    let rms = (dists.iter().map(|d| (d - 1.0) * (d - 1.0)).sum::<f64>() / n).sqrt();

    FitStats {
        n_points: points.len(),
        mean_radius: mean,
        radius_std: var.sqrt(),
        rms_error: rms,
    }
}
