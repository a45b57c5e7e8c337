//! Hand-off of the finished model to an export collaborator.
//!
//! The core does no encoding. It checks the scene is ready, bakes every
//! world transform into a flat mesh, and passes the result to an
//! [`ExportSink`] together with the requested [`ExportFormat`].

use tracing::{info, warn};

use crate::error::{ExportError, Result, SketchError};
use crate::mesh::TriangleMesh;
use crate::scene::{Color, SceneModel};

/// Target interchange format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Binary glTF: meshes and materials with embedded buffers.
    Glb,
    /// JSON glTF with the same content as [`Glb`](Self::Glb).
    Gltf,
    /// Triangles only; colors are dropped.
    Stl,
    /// Wavefront text, one group per solid.
    Obj,
}

impl ExportFormat {
    /// Every supported format.
    pub const ALL: [Self; 4] = [Self::Glb, Self::Gltf, Self::Stl, Self::Obj];

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Glb => "glb",
            Self::Gltf => "gltf",
            Self::Stl => "stl",
            Self::Obj => "obj",
        }
    }

    /// Default download name.
    #[must_use]
    pub fn file_name(self) -> String {
        format!("drawing-3d.{}", self.extension())
    }

    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Glb => "model/gltf-binary",
            Self::Gltf => "model/gltf+json",
            Self::Stl => "model/stl",
            Self::Obj => "text/plain",
        }
    }

    /// Whether the format keeps per-solid colors.
    #[must_use]
    pub fn carries_material(self) -> bool {
        matches!(self, Self::Glb | Self::Gltf)
    }
}

/// Flat shading parameters handed along with each solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportMaterial {
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
}

impl ExportMaterial {
    #[must_use]
    pub fn new(color: Color) -> Self {
        Self {
            color,
            metalness: 0.05,
            roughness: 0.6,
        }
    }

    /// Opaque RGBA factor with channels in `[0, 1]`.
    #[must_use]
    pub fn base_color_factor(&self) -> [f32; 4] {
        let [r, g, b] = self.color.to_rgb_f32();
        [r, g, b, 1.0]
    }
}

/// One solid, ready to encode.
#[derive(Debug, Clone)]
pub struct ExportItem {
    /// Object or group name.
    pub name: String,
    /// Geometry with the world transform applied.
    pub mesh: TriangleMesh,
    pub material: ExportMaterial,
}

impl ExportItem {
    /// Interleaved `x, y, z` positions as `f32`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn positions(&self) -> Vec<f32> {
        self.mesh.vertices.iter().flat_map(|p| [p.x as f32, p.y as f32, p.z as f32]).collect()
    }

    /// Interleaved `x, y, z` normals as `f32`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn normals(&self) -> Vec<f32> {
        self.mesh.normals.iter().flat_map(|n| [n.x as f32, n.y as f32, n.z as f32]).collect()
    }

    /// Flat triangle index list.
    #[must_use]
    pub fn indices(&self) -> Vec<u32> {
        self.mesh.indices.iter().flatten().copied().collect()
    }
}

/// Encodes and delivers the model. Implemented by the host.
pub trait ExportSink {
    /// Writes `items` in `format` under `file_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Sink`] when encoding or delivery fails.
    fn write(
        &mut self,
        format: ExportFormat,
        file_name: &str,
        items: &[ExportItem],
    ) -> std::result::Result<(), ExportError>;
}

/// Collects the scene for export, in insertion order.
///
/// # Errors
///
/// Returns [`SketchError::EmptyExport`] when the scene has no solids.
pub fn prepare_export(scene: &SceneModel) -> Result<Vec<ExportItem>> {
    if scene.is_empty() {
        warn!("export requested on an empty scene");
        return Err(SketchError::EmptyExport.into());
    }
    Ok(scene
        .solids()
        .enumerate()
        .map(|(i, (_, solid))| ExportItem {
            name: format!("solid_{i}"),
            mesh: solid.world_mesh(),
            material: ExportMaterial::new(solid.color),
        })
        .collect())
}

/// Prepares the scene and hands it to `sink` under the format's default
/// file name.
///
/// # Errors
///
/// Returns [`SketchError::EmptyExport`] for an empty scene, or the sink's
/// own error.
pub fn export_scene(
    scene: &SceneModel,
    format: ExportFormat,
    sink: &mut dyn ExportSink,
) -> Result<()> {
    let items = prepare_export(scene)?;
    let file_name = format.file_name();
    sink.write(format, &file_name, &items)?;
    info!(format = format.extension(), solids = items.len(), "scene exported");
    Ok(())
}
