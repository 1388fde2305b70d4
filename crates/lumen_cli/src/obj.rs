//! OBJ/MTL loading into Lumen models.
//!
//! Faces keep their original corner counts and separate position, normal
//! and texture coordinate indices; the scene triangulates them.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use lumen_core::{Face, Material, Model};

/// Load every object in an OBJ file, with materials from its MTL library.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Vec<Model>> {
    let path = path.as_ref();
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: false,
            triangulate: false,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        },
    )
    .with_context(|| format!("Failed to read OBJ file {}", path.display()))?;

    if models.is_empty() {
        anyhow::bail!("No models found in OBJ file");
    }

    let materials: Vec<Arc<Material>> = match materials {
        Ok(materials) => materials.iter().map(convert_material).map(Arc::new).collect(),
        Err(e) => {
            log::warn!("No materials for {}: {}", path.display(), e);
            Vec::new()
        }
    };

    let models: Vec<Model> = models
        .into_iter()
        .map(|model| convert_model(model, &materials))
        .collect();

    log::info!(
        "Loaded {} models ({} vertices, {} triangles) and {} materials from {}",
        models.len(),
        models.iter().map(Model::vertex_count).sum::<usize>(),
        models.iter().map(Model::triangle_count).sum::<usize>(),
        materials.len(),
        path.display()
    );

    Ok(models)
}

fn convert_model(model: tobj::Model, materials: &[Arc<Material>]) -> Model {
    let mesh = model.mesh;

    let arities: Vec<usize> = if mesh.face_arities.is_empty() {
        vec![3; mesh.indices.len() / 3]
    } else {
        mesh.face_arities.iter().map(|&a| a as usize).collect()
    };

    let mut faces = Vec::with_capacity(arities.len());
    let mut start = 0;
    for arity in arities {
        let end = start + arity;
        let corners = |indices: &[u32]| indices.get(start..end).map(<[u32]>::to_vec).unwrap_or_default();
        faces.push(Face::with_attributes(
            corners(&mesh.indices),
            corners(&mesh.normal_indices),
            corners(&mesh.texcoord_indices),
        ));
        start = end;
    }

    let material = mesh.material_id.and_then(|id| materials.get(id)).cloned();

    Model {
        name: model.name,
        vertices: mesh.positions.chunks_exact(3).map(Vec3::from_slice).collect(),
        normals: mesh
            .normals
            .chunks_exact(3)
            .map(|n| Vec3::from_slice(n).normalize_or_zero())
            .collect(),
        tex_coords: mesh.texcoords.chunks_exact(2).map(Vec2::from_slice).collect(),
        faces,
        material,
    }
}

/// Map MTL statements onto a Lumen material.
///
/// `Ka`, `Kd`, `Ks`, `Ke`, `Ns` and `Ni` map directly, transparency is
/// `1 - d`, and the non-standard `refl` (mirror weight) is read from the
/// unrecognized statements when present.
fn convert_material(mtl: &tobj::Material) -> Material {
    let defaults = Material::default();
    let reflectivity = mtl.unknown_param.get("refl").and_then(|v| parse_f32(v)).unwrap_or(0.0);
    let transparency = mtl.dissolve.map_or(0.0, |d| 1.0 - d);

    Material {
        name: mtl.name.clone(),
        ambient: mtl.ambient.map_or(defaults.ambient, Vec3::from),
        diffuse: mtl.diffuse.map_or(defaults.diffuse, Vec3::from),
        specular: mtl.specular.map_or(defaults.specular, Vec3::from),
        emissive: mtl.emissive.map_or(Vec3::ZERO, Vec3::from),
        shininess: mtl.shininess.unwrap_or(defaults.shininess),
        texture: mtl.diffuse_texture.clone(),
        ..defaults
    }
    .with_reflectivity(reflectivity)
    .with_refraction(transparency, mtl.optical_density.unwrap_or(1.0))
}

fn parse_f32(value: &str) -> Option<f32> {
    value.trim().parse().ok()
}
