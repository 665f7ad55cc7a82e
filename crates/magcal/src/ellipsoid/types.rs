//! Core types and errors for the ellipsoid fit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A raw sensor sample `(x, y, z)` in sensor units.
pub type SamplePoint = [f64; 3];

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors that can occur during a calibration solve.
///
/// Every failure is local to one solve call; no partial result is ever
/// returned and no error is masked by a placeholder value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    /// Empty sample set.
    #[error("empty sample set")]
    InvalidInput,
    /// A required linear solve met a matrix that is not invertible within
    /// tolerance: too few points, or points without enough independent
    /// directions (coplanar, collinear). Retrying with a better-distributed
    /// sample set may succeed.
    #[error("singular fit: {0}")]
    SingularFit(String),
    /// The fitted quadric is not an ellipsoid (hyperboloid, paraboloid or
    /// cone): at least one eigenvalue of the centered form is not strictly
    /// positive. Eigenvalues are reported in descending order.
    #[error("degenerate geometry: eigenvalues {eigenvalues:?} are not all positive")]
    DegenerateGeometry {
        /// Scaled eigenvalues of the centered quadric, descending.
        eigenvalues: [f64; 3],
    },
}

// ── Types ──────────────────────────────────────────────────────────────────

/// Quadric coefficients `[A..I]` of the implicit surface
/// `Ax² + By² + Cz² + 2Dxy + 2Exz + 2Fyz + 2Gx + 2Hy + 2Iz = 1`,
/// fitted in a least-squares sense over a sample set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadricCoeffs(pub [f64; 9]);

/// Geometric ellipsoid parameters recovered from a quadric fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipsoidGeometry {
    /// Ellipsoid center; the hard-iron bias.
    pub center: [f64; 3],
    /// Semi-axis lengths along the principal axes, ascending.
    pub radii: [f64; 3],
    /// Orthonormal rotation matrix, row-major; column `i` is the principal
    /// axis for `radii[i]`, sign-fixed so its largest-magnitude component is
    /// positive.
    pub rotation: [[f64; 3]; 3],
}

impl EllipsoidGeometry {
    /// An ellipsoid with the given center and radii, axes aligned with the
    /// coordinate frame.
    pub fn axis_aligned(center: [f64; 3], radii: [f64; 3]) -> Self {
        Self {
            center,
            radii,
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }
}

/// Numeric tuning for the solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveOptions {
    /// Relative singular-value cutoff for every rank decision: a singular
    /// value below `rank_eps` times the largest one counts as zero.
    pub rank_eps: f64,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self { rank_eps: 1e-9 }
    }
}
