//! Least-squares ellipsoid fitting: quadric fit and geometry recovery.

pub mod fit;
pub mod geometry;
pub mod types;

pub use fit::fit_quadric;
pub use geometry::resolve_geometry;
pub use types::{CalibrationError, EllipsoidGeometry, QuadricCoeffs, SamplePoint, SolveOptions};
