//! magcal — tri-axial magnetometer calibration via ellipsoid fitting.
//!
//! Raw magnetometer samples taken while rotating the sensor through all
//! orientations trace out an ellipsoid: hard-iron bias shifts its center away
//! from the origin, soft-iron distortion stretches and tilts it. Calibration
//! recovers both from a batch of samples. The pipeline stages are:
//!
//! 1. **Design matrix** – expand each sample into the 9 quadric monomials of
//!    the implicit surface equation.
//! 2. **Quadric fit** – solve the normal equations for the quadric
//!    coefficients via an SVD pseudo-inverse.
//! 3. **Geometry** – recover the ellipsoid center, translate the quadric to
//!    it, and eigen-decompose the centered form into principal axes and radii.
//! 4. **Correction** – compose the symmetric gain matrix that maps the fitted
//!    ellipsoid back onto the unit sphere.
//!
//! The core entry point is [`solve`], a pure function from a point slice to a
//! [`CalibrationResult`]; it owns no state and is safe to call concurrently.
//! Around it sit the in-process collaborators: [`samples`] for the `x;y;z`
//! text format and radius-based trimming, and [`synthetic`] for seeded test
//! cloud generation.

pub mod calibration;
pub mod ellipsoid;
pub mod samples;
pub mod synthetic;

pub use calibration::{fit_stats, solve, solve_with_options, CalibrationResult, FitStats};
pub use ellipsoid::fit::fit_quadric;
pub use ellipsoid::geometry::resolve_geometry;
pub use ellipsoid::types::{
    CalibrationError, EllipsoidGeometry, QuadricCoeffs, SamplePoint, SolveOptions,
};
pub use samples::{
    format_samples, load_samples, parse_samples, save_samples, trim_radius_outliers,
    SampleParseError,
};

/// Fit an ellipsoid to a sample cloud and return its geometry.
///
/// Convenience wrapper running the quadric fit and geometry resolution
/// stages; [`solve`] adds the correction-matrix composition on top.
pub fn fit_ellipsoid(
    points: &[SamplePoint],
    options: &SolveOptions,
) -> Result<EllipsoidGeometry, CalibrationError> {
    let coeffs = fit_quadric(points, options)?;
    resolve_geometry(&coeffs, options)
}
