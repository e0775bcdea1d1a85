//! Regridding benchmark on a synthetic satellite scene.
//!
//! This tool:
//! 1. Builds a sheared, satellite-like source mesh over a named domain
//! 2. Fills it with brightness temperatures and knocks out a share of cells
//! 3. Times index construction and regridding for both index kinds and
//!    both interpolation methods, plus a gap fill
//! 4. Prints a summary table
//!
//! Run with: cargo run --release --bin regrid-benchmark -- --domain expats

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use regrid::{
    DomainCatalog, Field, GridSpecification, IndexKind, InterpolationMethod, PointSet,
    RegridConfig, Regridder,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "regrid-benchmark")]
#[command(about = "Time regridding of a synthetic satellite scene onto a domain grid")]
struct Args {
    /// Target domain name
    #[arg(short, long, env = "REGRID_DOMAIN", default_value = "expats")]
    domain: String,

    /// Domain catalog (YAML); the built-in catalog is used when omitted
    #[arg(long, env = "REGRID_DOMAINS_FILE")]
    domains_file: Option<PathBuf>,

    /// Regridder configuration (YAML)
    #[arg(short, long, env = "REGRID_CONFIG")]
    config: Option<PathBuf>,

    /// Source rows
    #[arg(long, default_value_t = 300)]
    source_rows: usize,

    /// Source columns
    #[arg(long, default_value_t = 360)]
    source_cols: usize,

    /// Fraction of source cells set to missing
    #[arg(long, default_value_t = 0.15)]
    missing_fraction: f64,

    /// Log level
    #[arg(long, env = "REGRID_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let catalog = match &args.domains_file {
        Some(path) => DomainCatalog::from_yaml_file(path)
            .with_context(|| format!("loading domains from {}", path.display()))?,
        None => DomainCatalog::builtin(),
    };
    let grid = catalog.grid(&args.domain)?;

    let config = match &args.config {
        Some(path) => RegridConfig::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => RegridConfig::default(),
    };

    info!(
        domain = %args.domain,
        rows = grid.rows(),
        cols = grid.cols(),
        source_rows = args.source_rows,
        source_cols = args.source_cols,
        "Starting regrid benchmark"
    );

    println!("Regrid Benchmark");
    println!("================\n");

    let (field, lat, lon) = synthetic_scene(
        &grid,
        args.source_rows,
        args.source_cols,
        args.missing_fraction,
    )?;
    println!(
        "Source: {} x {} ({} valid of {})",
        args.source_rows,
        args.source_cols,
        field.valid_count(),
        field.len()
    );
    println!(
        "Target: {} ({} x {}, {} deg)\n",
        args.domain,
        grid.rows(),
        grid.cols(),
        grid.resolution()
    );

    let points = PointSet::from_field(&field, &lat, &lon)?;
    if let Some(extent) = points.extent() {
        let target = grid.bbox();
        let overlap = target.intersection(&extent).map_or(0.0, |b| b.area());
        println!(
            "Source extent: lat {:.2}..{:.2}, lon {:.2}..{:.2} ({:.1}% of target)\n",
            extent.min_lat,
            extent.max_lat,
            extent.min_lon,
            extent.max_lon,
            overlap / target.area() * 100.0
        );
    }

    println!("{:-<72}", "");
    println!(
        "{:<12} {:<10} {:>14} {:>14} {:>14}",
        "Index", "Method", "Prepare (ms)", "Regrid (ms)", "Coverage (%)"
    );
    println!("{:-<72}", "");

    for kind in [IndexKind::KdTree, IndexKind::Bucket] {
        let regridder = Regridder::new(config.clone().with_index(kind))?;

        let start = Instant::now();
        let source = regridder.prepare(&points)?;
        let prepare_ms = start.elapsed().as_secs_f64() * 1000.0;

        for method in [InterpolationMethod::Nearest, InterpolationMethod::Linear] {
            let start = Instant::now();
            let out = regridder.regrid_prepared(&source, &grid, method)?;
            let regrid_ms = start.elapsed().as_secs_f64() * 1000.0;

            println!(
                "{:<12} {:<10} {:>14.2} {:>14.2} {:>14.1}",
                kind.to_string(),
                method.to_string(),
                prepare_ms,
                regrid_ms,
                out.coverage() * 100.0
            );
        }
    }
    println!("{:-<72}", "");

    let regridder = Regridder::new(config)?;
    for method in [InterpolationMethod::Nearest, InterpolationMethod::Linear] {
        let start = Instant::now();
        let filled = regridder.fill_gaps(&field, &lat, &lon, method)?;
        let fill_ms = start.elapsed().as_secs_f64() * 1000.0;

        match filled {
            Some(out) => println!(
                "Gap fill ({}): {:.2} ms, {} cells still missing",
                method,
                fill_ms,
                out.len() - out.valid_count()
            ),
            None => println!("Gap fill ({}): skipped, not enough valid points", method),
        }
    }

    Ok(())
}

/// Sheared mesh one degree wider than the grid, with a brightness
/// temperature pattern and deterministic missing cells.
fn synthetic_scene(
    grid: &GridSpecification,
    rows: usize,
    cols: usize,
    missing_fraction: f64,
) -> Result<(Field<f32>, Vec<f64>, Vec<f64>)> {
    let lat0 = grid.lat_min() - 0.5;
    let lon0 = grid.lon_min() - 0.5;
    let dlat = (grid.lat_max() - grid.lat_min() + 1.0) / rows.max(1) as f64;
    let dlon = (grid.lon_max() - grid.lon_min() + 1.0) / cols.max(1) as f64;
    let skew = 0.05;

    let mut lat = Vec::with_capacity(rows * cols);
    let mut lon = Vec::with_capacity(rows * cols);
    let mut data = Vec::with_capacity(rows * cols);
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;

    for r in 0..rows {
        for c in 0..cols {
            let (rf, cf) = (r as f64, c as f64);
            let la = lat0 + rf * dlat + cf * dlon * skew;
            let lo = lon0 + cf * dlon - rf * dlat * skew;
            lat.push(la);
            lon.push(lo);

            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let u = (state >> 11) as f64 / (1u64 << 53) as f64;

            let bt = 255.0 + 45.0 * (la * 0.9).sin() * (lo * 0.7).cos();
            data.push(if u < missing_fraction { f32::NAN } else { bt as f32 });
        }
    }

    let field = Field::continuous(data, rows, cols)?;
    Ok((field, lat, lon))
}
