//! soapcast CLI - soap dish generator
//!
//! Turns an outline image into a 3D-printable soap dish with OpenSCAD and
//! exports an interactive preview of the result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use soapcast_mesh::{export_stl, index_soup, load_stl, IndexedMesh};
use soapcast_pipeline::{Job, Pipeline, PipelineConfig, RenderMode, Scale};
use soapcast_preview::{MeshFigure, PreviewOptions};

/// Default preview page name, next to the rendered STL.
const PREVIEW_SUFFIX: &str = "_stl.html";

#[derive(Parser)]
#[command(name = "soapcast")]
#[command(about = "Generate a custom 3D soap dish from an outline image", long_about = None)]
struct Cli {
    /// Pipeline configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a soap dish from an SVG, PNG or JPEG outline
    Render {
        /// Input image (.svg, .png, .jpg, .jpeg)
        input: PathBuf,
        /// X scale of the outline in percent
        #[arg(long)]
        x_scale: Option<f64>,
        /// Y scale of the outline in percent
        #[arg(long)]
        y_scale: Option<f64>,
        /// Quick PNG preview without boolean operations
        #[arg(long)]
        quick: bool,
        /// Preview page to write (default: <work_dir>/file_stl.html)
        #[arg(long)]
        html: Option<PathBuf>,
        /// Copy the rendered STL here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Index an STL file and report vertex statistics
    Index {
        /// Input STL file
        file: PathBuf,
        /// Write vertices and I/J/K arrays as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Write the indexed mesh back as binary STL
        #[arg(long)]
        stl: Option<PathBuf>,
    },
    /// Write an interactive HTML preview of an STL file
    Preview {
        /// Input STL file
        file: PathBuf,
        /// Output HTML file
        #[arg(short, long, default_value = "file_stl.html")]
        output: PathBuf,
        /// Figure title
        #[arg(long)]
        title: Option<String>,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            input,
            x_scale,
            y_scale,
            quick,
            html,
            output,
        } => {
            let scale = match (x_scale, y_scale) {
                (None, None) => None,
                (x, y) => Some(Scale::new(x.unwrap_or(100.0), y.unwrap_or(100.0))?),
            };
            let mode = if quick { RenderMode::Quick } else { RenderMode::Full };
            render(config, &input, scale, mode, html, output)?;
        }
        Commands::Index { file, json, stl } => {
            index_file(&file, json.as_deref(), stl.as_deref())?;
        }
        Commands::Preview {
            file,
            output,
            title,
        } => {
            let mesh = load_indexed(&file)?;
            write_preview(&mesh, &output, title)?;
        }
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn render(
    config: PipelineConfig,
    input: &Path,
    scale: Option<Scale>,
    mode: RenderMode,
    html: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let stem = config.file_stem.clone();
    let pipeline = Pipeline::new(config)?;

    let mut job = Job::new(input)?.with_mode(mode);
    if let Some(scale) = scale {
        job = job.with_scale(scale);
    }

    let outcome = pipeline
        .run(&job)
        .with_context(|| format!("failed to render {}", input.display()))?;
    println!(
        "Rendered in {:.2} seconds: {}",
        outcome.elapsed.as_secs_f64(),
        outcome.output.display()
    );

    let Some(mesh) = outcome.mesh else {
        println!("Preview image: {}", outcome.output.display());
        return Ok(());
    };

    if let Some(dest) = output {
        fs::copy(&outcome.output, &dest)
            .with_context(|| format!("failed to copy mesh to {}", dest.display()))?;
        println!("Mesh saved to {}", dest.display());
    }

    let html = html.unwrap_or_else(|| outcome.output.with_file_name(format!("{stem}{PREVIEW_SUFFIX}")));
    write_preview(&mesh, &html, None)?;
    print_stats(&mesh);
    Ok(())
}

fn load_indexed(file: &Path) -> Result<IndexedMesh> {
    let soup = load_stl(file).with_context(|| format!("failed to read {}", file.display()))?;
    let mesh = index_soup(&soup)?;
    log::debug!(
        "{}: {} corners merged into {} vertices",
        file.display(),
        soup.points().len(),
        mesh.num_vertices()
    );
    Ok(mesh)
}

fn index_file(file: &Path, json: Option<&Path>, stl: Option<&Path>) -> Result<()> {
    let mesh = load_indexed(file)?;

    println!("Mesh: {}", file.display());
    print_stats(&mesh);

    if let Some(path) = json {
        let text = serde_json::to_string(&mesh)?;
        fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
        println!("Indexed mesh written to {}", path.display());
    }

    if let Some(path) = stl {
        export_stl(&mesh, path).with_context(|| format!("failed to write {}", path.display()))?;
        println!("STL written to {}", path.display());
    }

    Ok(())
}

fn write_preview(mesh: &IndexedMesh, path: &Path, title: Option<String>) -> Result<()> {
    let options = PreviewOptions {
        title,
        ..Default::default()
    };
    let figure = MeshFigure::from_mesh(mesh, &options)?;
    figure
        .write_html(path)
        .with_context(|| format!("failed to write preview {}", path.display()))?;
    println!("Preview written to {}", path.display());
    Ok(())
}

fn print_stats(mesh: &IndexedMesh) {
    println!("  Triangles: {}", mesh.num_triangles());
    println!("  Vertices:  {}", mesh.num_vertices());
    if let Some((min, max)) = mesh.bounds() {
        println!(
            "  Bounds:    [{:.3}, {:.3}, {:.3}] - [{:.3}, {:.3}, {:.3}]",
            min[0], min[1], min[2], max[0], max[1], max[2]
        );
    }
}
