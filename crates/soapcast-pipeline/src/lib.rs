#![warn(missing_docs)]

//! Image to soap-dish mesh pipeline.
//!
//! Turns an uploaded outline image into a rendered 3D model:
//!
//! 1. Stage the input in the working directory as `<stem>.<ext>`
//! 2. Trace raster inputs to SVG (ImageMagick `convert`, then `potrace -s`)
//! 3. Optionally write a rescaled copy of the OpenSCAD template
//! 4. Render with `openscad` (STL, or PNG for a quick preview)
//! 5. Load the STL and index it for display
//!
//! # Example
//!
//! ```no_run
//! use soapcast_pipeline::{Job, Pipeline, PipelineConfig, RenderMode};
//!
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//! let job = Job::new("logo.png")?.with_mode(RenderMode::Full);
//! let outcome = pipeline.run(&job)?;
//! println!("rendered {} in {:?}", outcome.output.display(), outcome.elapsed);
//! # Ok::<(), soapcast_pipeline::PipelineError>(())
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod template;
pub mod tools;

pub use config::{PipelineConfig, ToolPaths};
pub use error::{PipelineError, Result};
pub use input::{ImageKind, Scale};
pub use template::{rescale_template, write_scaled_template};
pub use tools::{SystemRunner, ToolOutput, ToolRunner};

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use soapcast_mesh::{index_soup, load_stl, IndexedMesh};

use crate::template::format_factor;
use crate::tools::invoke;

/// What the renderer should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Full CSG render of the dish to STL.
    #[default]
    Full,
    /// Fast PNG render of the outline and border without boolean operations.
    Quick,
}

/// A single render request.
#[derive(Debug, Clone)]
pub struct Job {
    /// Input image.
    pub input: PathBuf,
    /// Declared image type.
    pub kind: ImageKind,
    /// Outline rescaling; `None` keeps the template defaults.
    pub scale: Option<Scale>,
    /// Render mode.
    pub mode: RenderMode,
}

impl Job {
    /// Create a job, inferring the image type from the file extension.
    pub fn new(input: impl Into<PathBuf>) -> Result<Self> {
        let input = input.into();
        let kind = ImageKind::from_path(&input)?;
        Ok(Self {
            input,
            kind,
            scale: None,
            mode: RenderMode::Full,
        })
    }

    /// Set the outline scale.
    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Set the render mode.
    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Result of a completed pipeline run.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    /// Render mode used.
    pub mode: RenderMode,
    /// SVG outline fed to the template.
    pub outline: PathBuf,
    /// Template actually rendered (the scaled copy when a scale was given).
    pub template: PathBuf,
    /// Renderer output: STL for [`RenderMode::Full`], PNG for [`RenderMode::Quick`].
    pub output: PathBuf,
    /// Wall time spent in the renderer.
    pub elapsed: Duration,
    /// Indexed mesh of the STL output ([`RenderMode::Full`] only).
    pub mesh: Option<IndexedMesh>,
}

/// Drives external tools to turn an image into a rendered model.
pub struct Pipeline<R: ToolRunner = SystemRunner> {
    config: PipelineConfig,
    runner: R,
}

impl Pipeline<SystemRunner> {
    /// Create a pipeline that runs real child processes.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_runner(config, SystemRunner)
    }
}

impl<R: ToolRunner> Pipeline<R> {
    /// Create a pipeline with a custom tool runner.
    pub fn with_runner(config: PipelineConfig, runner: R) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, runner })
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Tool runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run a job to completion.
    ///
    /// Tool failures are returned as-is; nothing is retried.
    pub fn run(&self, job: &Job) -> Result<RenderOutcome> {
        if let Some(scale) = &job.scale {
            scale.validate()?;
        }

        let bytes = fs::read(&job.input)?;
        job.kind.verify_content(&bytes)?;
        if !job.kind.is_vector() {
            log::warn!(
                "the mesh generated from a {} file is not always predictable",
                job.kind
            );
        }

        fs::create_dir_all(&self.config.work_dir)?;
        let config = PipelineConfig {
            work_dir: fs::canonicalize(&self.config.work_dir)?,
            ..self.config.clone()
        };
        let step = Step {
            config: &config,
            runner: &self.runner,
        };

        let removed = step.clean_stale()?;
        if removed > 0 {
            log::debug!("removed {} stale file(s) from {}", removed, config.work_dir.display());
        }

        let staged = config.work_file(job.kind.extension());
        fs::write(&staged, &bytes)?;
        log::info!("staged {} as {}", job.input.display(), staged.display());

        let outline = step.vectorize(job.kind, &staged)?;
        let template = step.prepare_template(job)?;

        log::info!("rendering {} ({:?})", template.display(), job.mode);
        let start = Instant::now();
        let output = step.render(&template, job.mode)?;
        let elapsed = start.elapsed();
        log::info!("rendered in {:.2} seconds", elapsed.as_secs_f64());

        let mesh = match job.mode {
            RenderMode::Full => {
                let soup = load_stl(&output)?;
                let mesh = index_soup(&soup)?;
                log::info!(
                    "loaded {} triangles, {} unique vertices",
                    mesh.num_triangles(),
                    mesh.num_vertices()
                );
                Some(mesh)
            }
            RenderMode::Quick => None,
        };

        Ok(RenderOutcome {
            mode: job.mode,
            outline,
            template,
            output,
            elapsed,
            mesh,
        })
    }
}

/// One run's view of the pipeline with an absolute working directory.
struct Step<'a, R: ToolRunner> {
    config: &'a PipelineConfig,
    runner: &'a R,
}

impl<R: ToolRunner> Step<'_, R> {
    /// Remove `<stem>.*` files left over from a previous run.
    fn clean_stale(&self) -> Result<usize> {
        let prefix = format!("{}.", self.config.file_stem);
        let mut removed = 0;
        for entry in fs::read_dir(&self.config.work_dir)? {
            let entry = entry?;
            let is_stale = entry.file_name().to_string_lossy().starts_with(&prefix);
            if is_stale && entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Produce the SVG outline for a staged input.
    fn vectorize(&self, kind: ImageKind, staged: &Path) -> Result<PathBuf> {
        if kind.is_vector() {
            return Ok(staged.to_path_buf());
        }

        let tools = &self.config.tools;
        let pnm = self.config.work_file("pnm");
        let svg = self.config.work_file("svg");
        log::info!("tracing {} to {}", staged.display(), svg.display());

        self.call(&tools.convert, &[staged.into(), pnm.as_path().into()])?;
        self.expect_output(&tools.convert, &pnm)?;

        let traced = self.call(
            &tools.potrace,
            &["-s".into(), "-o".into(), svg.as_path().into(), pnm.as_path().into()],
        );
        if let Err(e) = fs::remove_file(&pnm) {
            log::warn!("could not remove {}: {}", pnm.display(), e);
        }
        traced?;
        self.expect_output(&tools.potrace, &svg)?;

        Ok(svg)
    }

    /// Pick the template for the mode, writing a scaled copy if requested.
    fn prepare_template(&self, job: &Job) -> Result<PathBuf> {
        let template = match job.mode {
            RenderMode::Full => self.config.resolve(&self.config.template),
            RenderMode::Quick => self.config.resolve(&self.config.preview_template),
        };
        if !template.is_file() {
            return Err(PipelineError::Template {
                path: template,
                message: "template not found".into(),
            });
        }

        match &job.scale {
            Some(scale) => {
                let (x, y) = scale.factors(self.config.default_scale);
                let literal = format_factor(self.config.default_scale);
                write_scaled_template(&template, &literal, x, y)
            }
            None => Ok(template),
        }
    }

    /// Run the solid modeler on a template.
    fn render(&self, template: &Path, mode: RenderMode) -> Result<PathBuf> {
        let output = match mode {
            RenderMode::Full => self.config.work_file("stl"),
            RenderMode::Quick => self
                .config
                .work_dir
                .join(format!("{}_preview.png", self.config.file_stem)),
        };
        if output.exists() {
            fs::remove_file(&output)?;
        }

        let openscad = &self.config.tools.openscad;
        self.call(openscad, &["-o".into(), output.as_path().into(), template.into()])?;
        self.expect_output(openscad, &output)?;
        Ok(output)
    }

    fn call(&self, program: &str, args: &[OsString]) -> Result<()> {
        invoke(self.runner, program, args, &self.config.work_dir)
    }

    fn expect_output(&self, tool: &str, path: &Path) -> Result<()> {
        if path.is_file() {
            Ok(())
        } else {
            Err(PipelineError::MissingOutput {
                tool: tool.to_string(),
                path: path.to_path_buf(),
            })
        }
    }
}
