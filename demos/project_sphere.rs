//! MLS Projection Demo
//!
//! Loads an oriented point set (or synthesizes a sphere), perturbs it along
//! its normals, then projects a cloud of points sampled on a sphere onto the
//! MLS surface of the noisy set and writes the result as a PN file.
//!
//! Usage:
//!   project_sphere [OPTIONS]
//!
//! Example:
//!   project_sphere --input pointsets/dino.pn --noise 0.01 --method simple \
//!       --kernel gaussian --radius 0.05 --neighbors 100 --output projected.pn

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Instant;
use surfcrate_algorithms::{noise_along_normal, sample_sphere, scale_and_center, KdTree};
use surfcrate_core::{NormalPoint3f, PointCloud};
use surfcrate_reconstruction::{Kernel, MLSProjector, ProjectionConfig, ProjectionMethod};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "project_sphere")]
#[command(about = "Project sphere samples onto the MLS surface of a noisy point set")]
struct Args {
    /// Reference PN point set. A unit sphere is synthesized when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Where to write the projected point set.
    #[arg(long, default_value = "projected.pn")]
    output: PathBuf,

    /// Rescale the reference set into the unit box before projecting.
    #[arg(long)]
    normalize: bool,

    /// Half-width of the uniform noise applied along each reference normal.
    #[arg(long, default_value_t = 0.0)]
    noise: f32,

    /// Projection operator: simple (SPSS) or hermite (HPSS).
    #[arg(long, default_value = "simple")]
    method: ProjectionMethod,

    /// Weight kernel: singular, gaussian or wendland.
    #[arg(long, default_value = "gaussian")]
    kernel: Kernel,

    /// Kernel support radius.
    #[arg(long, default_value_t = 0.05)]
    radius: f32,

    /// Neighbors per iteration. Defaults to the operator's own default.
    #[arg(long)]
    neighbors: Option<usize>,

    /// Projection iterations per query point.
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Number of query points sampled on the sphere.
    #[arg(long, default_value_t = 20_000)]
    queries: usize,

    /// Radius of the query sphere.
    #[arg(long, default_value_t = 0.6)]
    query_radius: f32,

    /// Seed for noise and query sampling.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let mut reference = load_reference(&args, &mut rng)?;
    info!(points = reference.len(), "loaded reference point set");

    if args.normalize {
        scale_and_center(&mut reference);
    }
    if args.noise > 0.0 {
        noise_along_normal(&mut reference, args.noise, &mut rng);
        info!(range = args.noise, "added noise along normals");
    }

    let start = Instant::now();
    let index = KdTree::new(&reference.positions())?;
    info!(elapsed = ?start.elapsed(), "built kd-tree");

    let config = ProjectionConfig::default()
        .with_method(args.method)
        .with_kernel(args.kernel)
        .with_support_radius(args.radius)
        .with_num_neighbors(args.neighbors.unwrap_or_else(|| args.method.default_num_neighbors()))
        .with_iterations(args.iterations);
    let projector = MLSProjector::new(&reference, &index, config)?;

    let queries = sample_sphere(args.queries, args.query_radius, &mut rng);
    let start = Instant::now();
    let mut projected = PointCloud::with_capacity(queries.len());
    let mut failures = 0usize;
    for query in &queries {
        match projector.project(&query.position) {
            Ok(point) => projected.push(point),
            Err(e) => {
                failures += 1;
                warn!(query = ?query.position, error = %e, "projection failed");
            }
        }
    }
    info!(
        projected = projected.len(),
        failures,
        elapsed = ?start.elapsed(),
        "projected query points"
    );

    surfcrate_io::write_pn(&args.output, &projected)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(path = %args.output.display(), "wrote projected point set");

    Ok(())
}

fn load_reference(args: &Args, rng: &mut StdRng) -> anyhow::Result<PointCloud<NormalPoint3f>> {
    match &args.input {
        Some(path) => surfcrate_io::read_pn(path)
            .with_context(|| format!("reading {}", path.display())),
        None => Ok(sample_sphere(5_000, 0.5, rng)),
    }
}
