//! Pipeline configuration loaded from TOML.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Executables invoked by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    /// ImageMagick converter (raster to PNM).
    pub convert: String,
    /// Bitmap tracer (PNM to SVG).
    pub potrace: String,
    /// Solid modeler (template to STL or PNG).
    pub openscad: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            convert: "convert".into(),
            potrace: "potrace".into(),
            openscad: "openscad".into(),
        }
    }
}

/// Pipeline settings.
///
/// Every field is optional in TOML; missing fields take their defaults.
///
/// ```toml
/// work_dir = "/srv/soapcast"
/// template = "soap_dish_openscad.scad"
///
/// [tools]
/// openscad = "/usr/local/bin/openscad"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the staged input, templates and outputs.
    pub work_dir: PathBuf,
    /// Full model template. Relative paths resolve against `work_dir`.
    pub template: PathBuf,
    /// Quick-preview template (no boolean operations).
    pub preview_template: PathBuf,
    /// Stem of staged and generated files (`<stem>.svg`, `<stem>.stl`).
    pub file_stem: String,
    /// Scale literal written in both templates for x and y.
    pub default_scale: f64,
    /// External executables.
    pub tools: ToolPaths,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            template: PathBuf::from("soap_dish_openscad.scad"),
            preview_template: PathBuf::from("preview.scad"),
            file_stem: "file".into(),
            default_scale: 0.25,
            tools: ToolPaths::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        let tools = [
            ("convert", &self.tools.convert),
            ("potrace", &self.tools.potrace),
            ("openscad", &self.tools.openscad),
        ];
        for (name, value) in tools {
            if value.trim().is_empty() {
                return Err(PipelineError::Config(format!("tools.{name} must not be empty")));
            }
        }
        if self.file_stem.is_empty() || self.file_stem.contains(['/', '\\']) {
            return Err(PipelineError::Config(
                "file_stem must be a plain file name".into(),
            ));
        }
        if !(self.default_scale.is_finite() && self.default_scale > 0.0) {
            return Err(PipelineError::Config(
                "default_scale must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Resolve a possibly relative path against the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }

    /// Path of a generated file `<stem>.<ext>` in the working directory.
    pub fn work_file(&self, ext: &str) -> PathBuf {
        self.work_dir.join(format!("{}.{}", self.file_stem, ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.default_scale, 0.25);
        assert_eq!(config.tools.openscad, "openscad");
        assert_eq!(config.work_file("stl"), PathBuf::from("./file.stl"));
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_toml() {
        let config = PipelineConfig::from_toml_str(
            r#"
work_dir = "/srv/dish"

[tools]
openscad = "/opt/openscad/bin/openscad"
"#,
        )
        .unwrap();

        assert_eq!(config.work_dir, PathBuf::from("/srv/dish"));
        assert_eq!(config.tools.openscad, "/opt/openscad/bin/openscad");
        assert_eq!(config.tools.potrace, "potrace");
        assert_eq!(config.template, PathBuf::from("soap_dish_openscad.scad"));
        assert_eq!(
            config.resolve(&config.template),
            PathBuf::from("/srv/dish/soap_dish_openscad.scad")
        );
        assert_eq!(config.resolve(Path::new("/abs.scad")), PathBuf::from("/abs.scad"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(PipelineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            PipelineConfig::from_toml_str("[tools]\npotrace = \" \""),
            Err(PipelineError::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str("default_scale = -1.0"),
            Err(PipelineError::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str("file_stem = \"a/b\""),
            Err(PipelineError::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str("work_dir = 3"),
            Err(PipelineError::Config(_))
        ));
    }
}
