//! Polygon soup geometry handed to the raytracer.
//!
//! A `Model` mirrors what an OBJ loader produces: separate tables of
//! positions, normals and texture coordinates, and faces that index into
//! each table independently. Faces may have any number of corners; the
//! scene builder fan-triangulates them from corner 0.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use thiserror::Error;

use crate::material::Material;

/// Errors found while resolving face indices.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("face {face} has {corners} corners, at least 3 are required")]
    FaceTooSmall { face: usize, corners: usize },

    #[error("face {face}: {table} index {index} out of range (table has {len} entries)")]
    IndexOutOfRange {
        face: usize,
        table: &'static str,
        index: u32,
        len: usize,
    },

    #[error("face {face}: {table} list has {found} entries, expected {expected}")]
    CornerCountMismatch {
        face: usize,
        table: &'static str,
        expected: usize,
        found: usize,
    },
}

/// One polygon, as index lists into the owning model's tables.
///
/// `normals` and `tex_coords` are either empty or the same length as
/// `vertices`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Face {
    pub vertices: Vec<u32>,
    pub normals: Vec<u32>,
    pub tex_coords: Vec<u32>,
}

impl Face {
    /// Create a face with position indices only.
    pub fn new(vertices: Vec<u32>) -> Self {
        Self {
            vertices,
            ..Default::default()
        }
    }

    /// Create a face with position, normal and texture coordinate indices.
    pub fn with_attributes(vertices: Vec<u32>, normals: Vec<u32>, tex_coords: Vec<u32>) -> Self {
        Self {
            vertices,
            normals,
            tex_coords,
        }
    }

    /// Number of corners.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Corner triples of the triangle fan anchored at corner 0.
    ///
    /// Yields nothing for faces with fewer than 3 corners.
    pub fn fan(&self) -> impl Iterator<Item = [usize; 3]> {
        (1..self.len().saturating_sub(1)).map(|i| [0, i, i + 1])
    }
}

/// A resolved face corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corner {
    pub position: Vec3,
    /// `None` when the face carries no normal indices
    pub normal: Option<Vec3>,
    pub uv: Vec2,
}

/// A polygon soup with an optional material.
#[derive(Clone, Debug, Default)]
pub struct Model {
    /// Model name (from the OBJ object/group)
    pub name: String,

    /// Vertex positions
    pub vertices: Vec<Vec3>,

    /// Vertex normals, indexed by `Face::normals`
    pub normals: Vec<Vec3>,

    /// Texture coordinates, indexed by `Face::tex_coords`
    pub tex_coords: Vec<Vec2>,

    /// Polygons
    pub faces: Vec<Face>,

    /// Material (optional, the scene supplies a default)
    pub material: Option<Arc<Material>>,
}

impl Model {
    /// Create a model from positions and faces.
    pub fn new(name: impl Into<String>, vertices: Vec<Vec3>, faces: Vec<Face>) -> Self {
        Self {
            name: name.into(),
            vertices,
            faces,
            ..Default::default()
        }
    }

    /// Set the material for this model.
    pub fn with_material(mut self, material: Arc<Material>) -> Self {
        self.material = Some(material);
        self
    }

    /// Get the number of vertices in the model.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles the faces fan out into.
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(|f| f.len().saturating_sub(2)).sum()
    }

    /// Average of all vertex positions.
    pub fn centroid(&self) -> Vec3 {
        if self.vertices.is_empty() {
            return Vec3::ZERO;
        }
        self.vertices.iter().copied().sum::<Vec3>() / self.vertices.len() as f32
    }

    /// Resolve one corner of a face against the attribute tables.
    pub fn corner(&self, face_index: usize, corner: usize) -> Result<Corner, MeshError> {
        let face = &self.faces[face_index];

        let position = lookup(&self.vertices, "vertex", face_index, face.vertices[corner])?;

        let normal = if face.normals.is_empty() {
            None
        } else {
            check_corner_count(face_index, "normal", face.len(), face.normals.len())?;
            Some(lookup(&self.normals, "normal", face_index, face.normals[corner])?)
        };

        let uv = if face.tex_coords.is_empty() {
            Vec2::ZERO
        } else {
            check_corner_count(face_index, "texcoord", face.len(), face.tex_coords.len())?;
            lookup(&self.tex_coords, "texcoord", face_index, face.tex_coords[corner])?
        };

        Ok(Corner {
            position,
            normal,
            uv,
        })
    }

    /// Resolve the three corners of every fan triangle of a face.
    pub fn face_triangles(&self, face_index: usize) -> Result<Vec<[Corner; 3]>, MeshError> {
        let face = &self.faces[face_index];
        if face.len() < 3 {
            return Err(MeshError::FaceTooSmall {
                face: face_index,
                corners: face.len(),
            });
        }

        face.fan()
            .map(|[a, b, c]| {
                Ok([
                    self.corner(face_index, a)?,
                    self.corner(face_index, b)?,
                    self.corner(face_index, c)?,
                ])
            })
            .collect()
    }
}

fn lookup<T: Copy>(
    table: &[T],
    name: &'static str,
    face: usize,
    index: u32,
) -> Result<T, MeshError> {
    table
        .get(index as usize)
        .copied()
        .ok_or(MeshError::IndexOutOfRange {
            face,
            table: name,
            index,
            len: table.len(),
        })
}

fn check_corner_count(
    face: usize,
    table: &'static str,
    expected: usize,
    found: usize,
) -> Result<(), MeshError> {
    if expected == found {
        Ok(())
    } else {
        Err(MeshError::CornerCountMismatch {
            face,
            table,
            expected,
            found,
        })
    }
}
