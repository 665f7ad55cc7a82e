//! Sample-cloud text I/O and simple radius-based trimming.
//!
//! The interchange format is newline-delimited `x;y;z` decimal triples, one
//! point per line. Blank lines and lines starting with `#` are ignored.

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::ellipsoid::types::SamplePoint;

/// Errors from parsing the `x;y;z` sample format.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleParseError {
    /// A data line did not split into exactly three `;`-separated fields.
    #[error("line {line}: expected 3 fields separated by ';', got {got}")]
    FieldCount {
        /// 1-based line number.
        line: usize,
        /// Number of fields found.
        got: usize,
    },
    /// A coordinate field was not a valid decimal number.
    #[error("line {line}: invalid coordinate {field:?}")]
    InvalidCoordinate {
        /// 1-based line number.
        line: usize,
        /// The offending field text.
        field: String,
    },
}

/// Parse a sample cloud from `x;y;z` text.
pub fn parse_samples(text: &str) -> Result<Vec<SamplePoint>, SampleParseError> {
    let mut points = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split(';').collect();
        if fields.len() != 3 {
            return Err(SampleParseError::FieldCount {
                line,
                got: fields.len(),
            });
        }

        let mut p = [0.0; 3];
        for (k, field) in fields.iter().enumerate() {
            p[k] = field
                .trim()
                .parse::<f64>()
                .map_err(|_| SampleParseError::InvalidCoordinate {
                    line,
                    field: field.trim().to_string(),
                })?;
        }
        points.push(p);
    }
    Ok(points)
}

/// Format a sample cloud as `x;y;z` text; inverse of [`parse_samples`].
pub fn format_samples(points: &[SamplePoint]) -> String {
    let mut out = String::from("# x;y;z\n");
    for &[x, y, z] in points {
        out.push_str(&format!("{};{};{}\n", x, y, z));
    }
    out
}

/// Load a sample cloud from a file in the `x;y;z` format.
pub fn load_samples(path: &Path) -> Result<Vec<SamplePoint>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let points = parse_samples(&text)?;
    tracing::debug!(n_points = points.len(), path = %path.display(), "loaded samples");
    Ok(points)
}

/// Save a sample cloud to a file in the `x;y;z` format.
pub fn save_samples(path: &Path, points: &[SamplePoint]) -> io::Result<()> {
    std::fs::write(path, format_samples(points))
}

/// Drop samples whose distance from the centroid deviates from the median
/// distance by more than `max_deviation` times the median.
///
/// This is the simple pre-fit outlier trim: it rejects isolated spikes but
/// makes no attempt at robust estimation.
pub fn trim_radius_outliers(points: &[SamplePoint], max_deviation: f64) -> Vec<SamplePoint> {
    if points.is_empty() {
        return Vec::new();
    }

    let n = points.len() as f64;
    let mut centroid = [0.0; 3];
    for &[x, y, z] in points {
        centroid[0] += x / n;
        centroid[1] += y / n;
        centroid[2] += z / n;
    }

    let dist = |p: &SamplePoint| {
        let dx = p[0] - centroid[0];
        let dy = p[1] - centroid[1];
        let dz = p[2] - centroid[2];
        (dx * dx + dy * dy + dz * dz).sqrt()
    };

    let mut dists: Vec<f64> = points.iter().map(dist).collect();
    dists.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = dists[dists.len() / 2];

    let kept: Vec<SamplePoint> = points
        .iter()
        .filter(|p| (dist(p) - median).abs() <= max_deviation * median)
        .copied()
        .collect();

    let dropped = points.len() - kept.len();
    if dropped > 0 {
        tracing::info!(dropped, kept = kept.len(), "trimmed radius outliers");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_lines() {
        let pts = parse_samples("1;2;3\n-0.5;0.25;1e3\n").unwrap();
        assert_eq!(pts, vec![[1.0, 2.0, 3.0], [-0.5, 0.25, 1000.0]]);
    }

    #[test]
    fn parse_skips_comments_and_blanks() {
        let text = "# header\n\n 1;2;3 \n   \n# trailing\n4; 5 ;6\n";
        let pts = parse_samples(text).unwrap();
        assert_eq!(pts, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    }

    #[test]
    fn parse_reports_field_count_with_line() {
        let err = parse_samples("1;2;3\n1;2\n").unwrap_err();
        assert_eq!(err, SampleParseError::FieldCount { line: 2, got: 2 });
    }

    #[test]
    fn parse_reports_bad_coordinate_with_line() {
        let err = parse_samples("# c\n1;2;3\n1;x;3\n").unwrap_err();
        assert_eq!(
            err,
            SampleParseError::InvalidCoordinate {
                line: 3,
                field: "x".to_string()
            }
        );
    }

    #[test]
    fn format_parse_round_trip() {
        let pts = vec![[1.5, -2.25, 0.0], [1e-7, 3.0, -4.125]];
        let back = parse_samples(&format_samples(&pts)).unwrap();
        assert_eq!(back, pts);
    }

    #[test]
    fn trim_drops_far_outlier() {
        let mut pts: Vec<[f64; 3]> = crate::synthetic::sample_unit_sphere(200, 13);
        pts.push([10.0, 0.0, 0.0]);

        let kept = trim_radius_outliers(&pts, 0.5);
        assert_eq!(kept.len(), 200);
        assert!(!kept.contains(&[10.0, 0.0, 0.0]));
    }

    #[test]
    fn trim_keeps_clean_cloud() {
        let pts = crate::synthetic::sample_unit_sphere(200, 4);
        let kept = trim_radius_outliers(&pts, 0.3);
        assert_eq!(kept.len(), pts.len());
    }

    #[test]
    fn trim_empty_is_empty() {
        assert!(trim_radius_outliers(&[], 0.5).is_empty());
    }
}
