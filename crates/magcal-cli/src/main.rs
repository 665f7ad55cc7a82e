//! magcal CLI — calibrate magnetometer sample clouds from the command line.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use magcal::{
    fit_ellipsoid, fit_stats, load_samples, save_samples, trim_radius_outliers,
    CalibrationResult, EllipsoidGeometry, SolveOptions,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "magcal")]
#[command(about = "Magnetometer calibration via least-squares ellipsoid fitting")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a calibration to a sample file and report it.
    Calibrate(CalibrateArgs),

    /// Generate a synthetic ellipsoid sample cloud.
    Synth(SynthArgs),

    /// Apply a saved calibration to a sample file.
    Apply(ApplyArgs),
}

#[derive(Debug, Clone, Args)]
struct CalibrateArgs {
    /// Path to the input samples (x;y;z per line).
    #[arg(long)]
    samples: PathBuf,

    /// Path to write the calibration result (JSON).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Path to write the corrected sample cloud (x;y;z per line).
    #[arg(long)]
    corrected_out: Option<PathBuf>,

    /// Trim samples whose centroid distance deviates from the median by more
    /// than this fraction of the median.
    #[arg(long)]
    trim: Option<f64>,

    /// Relative singular-value cutoff for rank decisions.
    #[arg(long, default_value_t = SolveOptions::default().rank_eps)]
    rank_eps: f64,
}

#[derive(Debug, Clone, Args)]
struct SynthArgs {
    /// Path to write the generated samples (x;y;z per line).
    #[arg(long)]
    out: PathBuf,

    /// Number of points to generate.
    #[arg(long, default_value = "500")]
    n: usize,

    /// Ellipsoid center as "x,y,z".
    #[arg(long, default_value = "0,0,0")]
    center: String,

    /// Ellipsoid radii as "a,b,c".
    #[arg(long, default_value = "1,1,1")]
    radii: String,

    /// Principal-axis orientation as Euler angles "roll,pitch,yaw" (radians).
    #[arg(long, default_value = "0,0,0")]
    euler: String,

    /// Per-component Gaussian noise standard deviation.
    #[arg(long, default_value = "0.0")]
    noise_sigma: f64,

    /// RNG seed.
    #[arg(long, default_value = "0")]
    seed: u64,
}

#[derive(Debug, Clone, Args)]
struct ApplyArgs {
    /// Path to the input samples (x;y;z per line).
    #[arg(long)]
    samples: PathBuf,

    /// Path to the calibration result (JSON).
    #[arg(long)]
    calibration: PathBuf,

    /// Path to write the corrected samples (x;y;z per line).
    #[arg(long)]
    out: PathBuf,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Calibrate(args) => run_calibrate(&args),
        Commands::Synth(args) => run_synth(&args),
        Commands::Apply(args) => run_apply(&args),
    }
}

/// Parse a "a,b,c" triple of decimals.
fn parse_triple(text: &str, what: &str) -> CliResult<[f64; 3]> {
    let fields: Vec<&str> = text.split(',').collect();
    if fields.len() != 3 {
        return Err(format!("{what}: expected 3 comma-separated values, got {text:?}").into());
    }
    let mut out = [0.0; 3];
    for (k, field) in fields.iter().enumerate() {
        out[k] = field
            .trim()
            .parse::<f64>()
            .map_err(|e| -> CliError { format!("{what}: invalid value {field:?}: {e}").into() })?;
    }
    Ok(out)
}

// ── calibrate ──────────────────────────────────────────────────────────

fn run_calibrate(args: &CalibrateArgs) -> CliResult<()> {
    let mut points = load_samples(&args.samples)?;
    tracing::info!("Loaded {} samples from {}", points.len(), args.samples.display());

    if let Some(max_dev) = args.trim {
        points = trim_radius_outliers(&points, max_dev);
    }

    let options = SolveOptions {
        rank_eps: args.rank_eps,
    };
    let geometry = fit_ellipsoid(&points, &options)?;
    let result = CalibrationResult::from_geometry(&geometry);
    let stats = fit_stats(&result, &points);

    tracing::info!(
        "Center (hard-iron bias): [{:.6}, {:.6}, {:.6}]",
        result.center[0],
        result.center[1],
        result.center[2],
    );
    tracing::info!(
        "Radii: [{:.6}, {:.6}, {:.6}]",
        geometry.radii[0],
        geometry.radii[1],
        geometry.radii[2],
    );
    tracing::info!(
        "Fit quality: mean radius {:.4}, spread {:.4}, rms error {:.4} over {} points",
        stats.mean_radius,
        stats.radius_std,
        stats.rms_error,
        stats.n_points,
    );

    if let Some(out) = &args.out {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(out, &json)?;
        tracing::info!("Calibration written to {}", out.display());
    }

    if let Some(corrected_out) = &args.corrected_out {
        save_samples(corrected_out, &result.correct_all(&points))?;
        tracing::info!("Corrected samples written to {}", corrected_out.display());
    }

    Ok(())
}

// ── synth ──────────────────────────────────────────────────────────────

fn run_synth(args: &SynthArgs) -> CliResult<()> {
    let center = parse_triple(&args.center, "--center")?;
    let radii = parse_triple(&args.radii, "--radii")?;
    let euler = parse_triple(&args.euler, "--euler")?;

    if radii.iter().any(|r| *r <= 0.0) {
        return Err("--radii: all radii must be positive".into());
    }

    let geometry = EllipsoidGeometry {
        center,
        radii,
        rotation: magcal::synthetic::rotation_from_euler(euler[0], euler[1], euler[2]),
    };
    let points = magcal::synthetic::sample_ellipsoid(&geometry, args.n, args.noise_sigma, args.seed);

    save_samples(&args.out, &points)?;
    tracing::info!("{} synthetic samples written to {}", points.len(), args.out.display());
    Ok(())
}

// ── apply ──────────────────────────────────────────────────────────────

fn run_apply(args: &ApplyArgs) -> CliResult<()> {
    let json = std::fs::read_to_string(&args.calibration)?;
    let result: CalibrationResult = serde_json::from_str(&json)?;
    let points = load_samples(&args.samples)?;

    save_samples(&args.out, &result.correct_all(&points))?;
    tracing::info!(
        "{} corrected samples written to {}",
        points.len(),
        args.out.display()
    );
    Ok(())
}
