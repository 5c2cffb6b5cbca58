//! OpenSCAD template scaling.
//!
//! Templates carry the default scale literal twice: first the x factor of
//! the imported outline, then the y factor.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// Replace the first two occurrences of `literal` with `x` and `y`.
///
/// Returns `None` if the literal occurs fewer than two times. Positions are
/// located in the unmodified text, so a replacement equal to the literal
/// cannot shift the y substitution onto the x slot.
pub fn rescale_template(text: &str, literal: &str, x: f64, y: f64) -> Option<String> {
    let mut positions = text.match_indices(literal).map(|(pos, _)| pos);
    let first = positions.next()?;
    let second = positions.next()?;

    let mut out = String::with_capacity(text.len() + 16);
    out.push_str(&text[..first]);
    out.push_str(&format_factor(x));
    out.push_str(&text[first + literal.len()..second]);
    out.push_str(&format_factor(y));
    out.push_str(&text[second + literal.len()..]);
    Some(out)
}

/// Path of the scaled copy of a template: `name.scad` becomes `name_scaled.scad`.
pub fn scaled_template_path(template: &Path) -> PathBuf {
    let stem = template
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match template.extension() {
        Some(ext) => format!("{stem}_scaled.{}", ext.to_string_lossy()),
        None => format!("{stem}_scaled"),
    };
    template.with_file_name(name)
}

/// Write a scaled copy of `template` next to it and return its path.
pub fn write_scaled_template(template: &Path, literal: &str, x: f64, y: f64) -> Result<PathBuf> {
    let text = fs::read_to_string(template)?;
    let scaled = rescale_template(&text, literal, x, y).ok_or_else(|| PipelineError::Template {
        path: template.to_path_buf(),
        message: format!("expected two '{literal}' scale literals"),
    })?;

    let out = scaled_template_path(template);
    fs::write(&out, scaled)?;
    log::debug!("scaled template written to {}", out.display());
    Ok(out)
}

/// Format a scale factor as an OpenSCAD number literal.
pub fn format_factor(value: f64) -> String {
    format!("{value}")
}
