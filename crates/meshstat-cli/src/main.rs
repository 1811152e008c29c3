//! meshstat CLI - mesh quality and roughness statistics
//!
//! Loads a JSON model snapshot and prints summary statistics or the
//! per-vertex roughness table.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use meshstat::{
    collect_report, AnalysisSettings, Analyzer, GeomDim, MeshKernel, MeshModel, Query,
    ReportOptions, Scope,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod output;

#[derive(Parser)]
#[command(name = "meshstat")]
#[command(about = "Mesh quality and surface roughness statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print summary statistics (every summary if no section is chosen)
    Report {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        sections: SectionArgs,
    },
    /// Print per-vertex curvature and roughness with the weighted average
    Roughness {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// JSON model snapshot
    file: PathBuf,
    /// Increase output verbosity and log level
    #[arg(short, long)]
    verbose: bool,
    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
    /// TOML file with analysis settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Global id of the surface or volume to analyse (default: whole model)
    #[arg(long, value_name = "GLOBAL_ID")]
    scope: Option<i32>,
    /// Dimension of the --scope set (0-3 or node/curve/surface/volume)
    #[arg(long, value_name = "DIM", default_value = "volume", requires = "scope")]
    scope_dim: String,
}

#[derive(Args)]
struct SectionArgs {
    /// Native ranges (vertices, triangles, entity sets)
    #[arg(long)]
    nr: bool,
    /// Entity-set ranges (volumes, surfaces, curves, nodes)
    #[arg(long)]
    er: bool,
    /// Surfaces per volume
    #[arg(long)]
    spv: bool,
    /// Triangles per surface
    #[arg(long)]
    tps: bool,
    /// Triangles per vertex
    #[arg(long)]
    tpv: bool,
    /// Triangle aspect ratio
    #[arg(long)]
    tar: bool,
    /// Triangle area
    #[arg(long)]
    at: bool,
    /// Surface coarseness
    #[arg(long)]
    c: bool,
    /// Roughness
    #[arg(long)]
    roughness: bool,
    /// Per-volume surface counts
    #[arg(long, alias = "spv_data")]
    spv_data: bool,
    /// Per-surface triangle counts
    #[arg(long, alias = "tps_data")]
    tps_data: bool,
}

impl From<&SectionArgs> for ReportOptions {
    fn from(s: &SectionArgs) -> Self {
        ReportOptions {
            native_ranges: s.nr,
            entity_ranges: s.er,
            surfaces_per_volume: s.spv,
            triangles_per_surface: s.tps,
            triangles_per_vertex: s.tpv,
            aspect_ratio: s.tar,
            area: s.at,
            coarseness: s.c,
            roughness: s.roughness,
            spv_data: s.spv_data,
            tps_data: s.tps_data,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Report { input, sections } => {
            init_logging(input.verbose);
            run_report(&input, ReportOptions::from(&sections))?;
        }
        Commands::Roughness { input } => {
            init_logging(input.verbose);
            run_roughness(&input)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_model(path: &Path) -> Result<MeshModel> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let model = MeshModel::from_json(&json)
        .with_context(|| format!("failed to load model snapshot {}", path.display()))?;
    debug!(
        vertices = model.num_vertices(),
        triangles = model.num_triangles(),
        sets = model.num_sets(),
        "loaded model"
    );
    Ok(model)
}

fn load_settings(path: Option<&Path>) -> Result<AnalysisSettings> {
    let Some(path) = path else {
        return Ok(AnalysisSettings::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    AnalysisSettings::from_toml(&text)
        .with_context(|| format!("invalid settings in {}", path.display()))
}

fn build_query(model: &MeshModel, input: &InputArgs) -> Result<Query> {
    let settings = load_settings(input.config.as_deref())?;
    let Some(global_id) = input.scope else {
        return Ok(Query::new(Scope::Model, settings));
    };
    let dim: GeomDim = input.scope_dim.parse()?;
    let set = model
        .sets_by_id(dim, &[global_id])
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("no {} with global id {}", dim.plural(), global_id))?;
    Ok(Query::new(Scope::Set(set), settings))
}

fn run_report(input: &InputArgs, options: ReportOptions) -> Result<()> {
    let model = load_model(&input.file)?;
    let query = build_query(&model, input)?;
    let mut analyzer = Analyzer::new(&model);
    let report = collect_report(&mut analyzer, &query, options)?;

    if input.json {
        println!("{}", report.to_json()?);
    } else {
        output::print_report(&report, input.verbose);
    }
    Ok(())
}

/// One row of the roughness table, addressed by position.
#[derive(Serialize)]
struct VertexRow {
    position: [f64; 3],
    triangles: usize,
    curvature: f64,
    roughness: f64,
}

#[derive(Serialize)]
struct RoughnessTable {
    vertices: Vec<VertexRow>,
    weighted_average: f64,
}

fn run_roughness(input: &InputArgs) -> Result<()> {
    let model = load_model(&input.file)?;
    let query = build_query(&model, input)?;
    let mut analyzer = Analyzer::new(&model);

    let mut vertices = Vec::new();
    for row in analyzer.vertex_metrics(&query)? {
        let p = model.coordinates(row.vertex)?;
        vertices.push(VertexRow {
            position: [p.x, p.y, p.z],
            triangles: row.triangles,
            curvature: row.curvature,
            roughness: row.roughness,
        });
    }
    let table = RoughnessTable {
        vertices,
        weighted_average: analyzer.roughness(&query)?,
    };

    if input.json {
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else {
        output::print_roughness(&table.vertices, table.weighted_average, input.verbose);
    }
    Ok(())
}
