#![warn(missing_docs)]

//! Interactive preview export for indexed meshes.
//!
//! Builds a plotly `mesh3d` figure from an [`IndexedMesh`] and writes it as
//! JSON or as a standalone HTML page that loads plotly.js from its CDN.

use std::fs;
use std::path::Path;

use serde::Serialize;
use soapcast_mesh::IndexedMesh;
use thiserror::Error;

/// plotly.js bundle referenced by exported HTML pages.
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Id of the `<div>` the figure is drawn into.
const PLOT_DIV_ID: &str = "soapcast-preview";

/// Errors returned by preview export.
#[derive(Error, Debug)]
pub enum PreviewError {
    /// The mesh has no triangles to show.
    #[error("mesh is empty")]
    EmptyMesh,
    /// The figure could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// An I/O error occurred while writing the page.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for preview operations.
pub type Result<T> = std::result::Result<T, PreviewError>;

/// Appearance settings for a preview figure.
#[derive(Debug, Clone)]
pub struct PreviewOptions {
    /// Trace name shown in hover labels.
    pub name: String,
    /// Optional figure title.
    pub title: Option<String>,
    /// Figure width in pixels.
    pub width: u32,
    /// Figure height in pixels.
    pub height: u32,
    /// Uniform surface colour.
    pub color: String,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            name: "soap_dish_mesh".into(),
            title: None,
            width: 800,
            height: 800,
            color: "#e5dee5".into(),
        }
    }
}

/// A plotly figure holding a single mesh3d trace.
#[derive(Debug, Clone, Serialize)]
pub struct MeshFigure {
    /// Traces (always exactly one).
    pub data: Vec<Mesh3dTrace>,
    /// Figure layout.
    pub layout: Layout,
}

/// plotly `mesh3d` trace.
#[derive(Debug, Clone, Serialize)]
pub struct Mesh3dTrace {
    #[serde(rename = "type")]
    kind: &'static str,
    /// Vertex x coordinates.
    pub x: Vec<f32>,
    /// Vertex y coordinates.
    pub y: Vec<f32>,
    /// Vertex z coordinates.
    pub z: Vec<f32>,
    /// First corner of each triangle.
    pub i: Vec<u32>,
    /// Second corner of each triangle.
    pub j: Vec<u32>,
    /// Third corner of each triangle.
    pub k: Vec<u32>,
    /// Trace name.
    pub name: String,
    /// Per-vertex intensity driving the colorscale (vertex z).
    pub intensity: Vec<f32>,
    /// Colorscale stops.
    pub colorscale: Vec<(f32, String)>,
    /// Whether to draw the colour bar.
    pub showscale: bool,
    /// Flat (per-face) shading.
    pub flatshading: bool,
    /// Lighting coefficients.
    pub lighting: Lighting,
    /// Light position.
    pub lightposition: Xyz,
}

/// plotly mesh3d lighting coefficients.
#[derive(Debug, Clone, Serialize)]
#[allow(missing_docs)]
pub struct Lighting {
    pub ambient: f32,
    pub diffuse: f32,
    pub fresnel: f32,
    pub specular: f32,
    pub roughness: f32,
    pub facenormalsepsilon: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: 0.18,
            diffuse: 1.0,
            fresnel: 0.1,
            specular: 1.0,
            roughness: 0.1,
            facenormalsepsilon: 0.0,
        }
    }
}

/// A 3-component value in plotly's `{x, y, z}` form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Xyz {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Figure layout.
#[derive(Debug, Clone, Serialize)]
#[allow(missing_docs)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    pub paper_bgcolor: String,
    pub width: u32,
    pub height: u32,
    pub scene: Scene,
}

/// Figure title.
#[derive(Debug, Clone, Serialize)]
#[allow(missing_docs)]
pub struct Title {
    pub text: String,
    pub x: f32,
}

/// 3D scene settings.
#[derive(Debug, Clone, Serialize)]
#[allow(missing_docs)]
pub struct Scene {
    pub camera: Camera,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub zaxis: Axis,
    pub aspectmode: &'static str,
}

/// Scene camera.
#[derive(Debug, Clone, Serialize)]
#[allow(missing_docs)]
pub struct Camera {
    pub eye: Xyz,
}

/// Scene axis.
#[derive(Debug, Clone, Serialize)]
#[allow(missing_docs)]
pub struct Axis {
    pub visible: bool,
}

impl MeshFigure {
    /// Build a figure from an indexed mesh.
    pub fn from_mesh(mesh: &IndexedMesh, options: &PreviewOptions) -> Result<Self> {
        if mesh.is_empty() {
            return Err(PreviewError::EmptyMesh);
        }

        let x: Vec<f32> = mesh.vertices.iter().map(|v| v[0]).collect();
        let y: Vec<f32> = mesh.vertices.iter().map(|v| v[1]).collect();
        let z: Vec<f32> = mesh.vertices.iter().map(|v| v[2]).collect();

        let trace = Mesh3dTrace {
            kind: "mesh3d",
            intensity: z.clone(),
            x,
            y,
            z,
            i: mesh.i.clone(),
            j: mesh.j.clone(),
            k: mesh.k.clone(),
            name: options.name.clone(),
            colorscale: vec![(0.0, options.color.clone()), (1.0, options.color.clone())],
            showscale: false,
            flatshading: true,
            lighting: Lighting::default(),
            lightposition: Xyz {
                x: 3000.0,
                y: 3000.0,
                z: 10000.0,
            },
        };

        let layout = Layout {
            title: options.title.as_ref().map(|text| Title {
                text: text.clone(),
                x: 0.5,
            }),
            paper_bgcolor: "rgb(1,1,1)".into(),
            width: options.width,
            height: options.height,
            scene: Scene {
                camera: Camera {
                    eye: Xyz {
                        x: 1.25,
                        y: -1.25,
                        z: 1.0,
                    },
                },
                xaxis: Axis { visible: true },
                yaxis: Axis { visible: true },
                zaxis: Axis { visible: false },
                aspectmode: "data",
            },
        };

        Ok(Self {
            data: vec![trace],
            layout,
        })
    }

    /// Serialize the figure as plotly JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Render a standalone HTML page showing the figure.
    pub fn to_html(&self) -> Result<String> {
        // "</" inside the inline script would end it early.
        let json = self.to_json()?.replace("</", "<\\/");
        let title = self
            .layout
            .title
            .as_ref()
            .map(|t| escape_html(&t.text))
            .unwrap_or_else(|| "soapcast preview".into());

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{PLOTLY_CDN}"></script>
</head>
<body style="margin:0;background:rgb(1,1,1);">
<div id="{PLOT_DIV_ID}"></div>
<script>
const figure = {json};
Plotly.newPlot("{PLOT_DIV_ID}", figure.data, figure.layout, {{responsive: true}});
</script>
</body>
</html>
"#
        ))
    }

    /// Write the HTML page to `path`.
    pub fn write_html(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_html()?)?;
        log::info!("wrote preview to {}", path.display());
        Ok(())
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use soapcast_mesh::{index_soup, TriangleSoup};

    fn square_mesh() -> IndexedMesh {
        let soup = TriangleSoup::new(vec![
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 2.0]],
            [[1.0, 0.0, 0.0], [0.0, 1.0, 2.0], [1.0, 1.0, 2.0]],
        ]);
        index_soup(&soup).unwrap()
    }

    #[test]
    fn test_figure_columns() {
        let mesh = square_mesh();
        let fig = MeshFigure::from_mesh(&mesh, &PreviewOptions::default()).unwrap();
        let trace = &fig.data[0];

        assert_eq!(trace.x.len(), 4);
        assert_eq!(trace.z, vec![0.0, 2.0, 0.0, 2.0]);
        assert_eq!(trace.intensity, trace.z);
        assert_eq!(trace.i, mesh.i);
        assert_eq!(trace.j, mesh.j);
        assert_eq!(trace.k, mesh.k);
    }

    #[test]
    fn test_figure_json_shape() {
        let fig = MeshFigure::from_mesh(&square_mesh(), &PreviewOptions::default()).unwrap();
        let value: Value = serde_json::from_str(&fig.to_json().unwrap()).unwrap();

        assert_eq!(value["data"][0]["type"], "mesh3d");
        assert_eq!(value["data"][0]["flatshading"], true);
        assert_eq!(value["data"][0]["colorscale"][1][1], "#e5dee5");
        assert_eq!(value["data"][0]["lightposition"]["z"], 10000.0);
        assert_eq!(value["layout"]["scene"]["aspectmode"], "data");
        assert_eq!(value["layout"]["scene"]["zaxis"]["visible"], false);
        assert_eq!(value["layout"]["width"], 800);
        assert!(value["layout"].get("title").is_none());
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let err = MeshFigure::from_mesh(&IndexedMesh::default(), &PreviewOptions::default());
        assert!(matches!(err, Err(PreviewError::EmptyMesh)));
    }

    #[test]
    fn test_html_escapes_title_and_script() {
        let options = PreviewOptions {
            name: "</script><b>".into(),
            title: Some("Soap <dish>".into()),
            ..Default::default()
        };
        let fig = MeshFigure::from_mesh(&square_mesh(), &options).unwrap();
        let html = fig.to_html().unwrap();

        assert!(html.contains("<title>Soap &lt;dish&gt;</title>"));
        assert!(html.contains(PLOTLY_CDN));
        assert!(html.contains("Plotly.newPlot"));
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn test_write_html() {
        let fig = MeshFigure::from_mesh(&square_mesh(), &PreviewOptions::default()).unwrap();
        let path = std::env::temp_dir().join("soapcast_test_preview.html");
        fig.write_html(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<!DOCTYPE html>"));
        assert!(content.contains("\"mesh3d\""));
    }
}
