//! ASCII PLY output via `ply-rs`.
//!
//! Vertices carry `x y z` as floats and, when the mesh has colors,
//! `red green blue` as uchar. Faces are `vertex_indices` lists of three.

use crate::error::MeshError;
use crate::mesh::Mesh;
use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
    ScalarType,
};
use ply_rs::writer::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `mesh` as ASCII PLY to a file.
///
/// # Errors
///
/// Returns [`MeshError::Io`] if the file cannot be created and
/// [`MeshError::Export`] if serialization fails.
pub fn save_ply(mesh: &Mesh, path: impl AsRef<Path>) -> Result<(), MeshError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_ply(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Writes `mesh` as ASCII PLY.
///
/// # Errors
///
/// Returns [`MeshError::Export`] if serialization fails.
///
/// # Example
///
/// ```rust
/// use morphology_mesh::{export::write_ply, primitives::create_sphere};
/// use glam::DVec3;
///
/// let mesh = create_sphere(DVec3::ZERO, 1.0, 8, 4).unwrap();
/// let mut out = Vec::new();
/// write_ply(&mesh, &mut out).unwrap();
/// assert!(String::from_utf8(out).unwrap().contains("element face 48"));
/// ```
pub fn write_ply<W: Write>(mesh: &Mesh, writer: &mut W) -> Result<(), MeshError> {
    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = Encoding::Ascii;
    ply.header
        .comments
        .push("neuron morphology tube mesh".to_string());

    let colors = mesh.colors();

    let mut vertex_def = ElementDef::new("vertex".to_string());
    for axis in ["x", "y", "z"] {
        vertex_def.properties.add(PropertyDef::new(
            axis.to_string(),
            PropertyType::Scalar(ScalarType::Float),
        ));
    }
    if colors.is_some() {
        for channel in ["red", "green", "blue"] {
            vertex_def.properties.add(PropertyDef::new(
                channel.to_string(),
                PropertyType::Scalar(ScalarType::UChar),
            ));
        }
    }
    vertex_def.count = mesh.vertex_count();
    ply.header.elements.add(vertex_def);

    let mut face_def = ElementDef::new("face".to_string());
    face_def.properties.add(PropertyDef::new(
        "vertex_indices".to_string(),
        PropertyType::List(ScalarType::UChar, ScalarType::Int),
    ));
    face_def.count = mesh.triangle_count();
    ply.header.elements.add(face_def);

    let mut vertex_elements = Vec::with_capacity(mesh.vertex_count());
    for (i, v) in mesh.vertices().iter().enumerate() {
        let mut element = DefaultElement::new();
        #[allow(clippy::cast_possible_truncation)]
        {
            element.insert("x".to_string(), Property::Float(v.x as f32));
            element.insert("y".to_string(), Property::Float(v.y as f32));
            element.insert("z".to_string(), Property::Float(v.z as f32));
        }
        if let Some(colors) = colors {
            let [r, g, b] = colors[i];
            element.insert("red".to_string(), Property::UChar(r));
            element.insert("green".to_string(), Property::UChar(g));
            element.insert("blue".to_string(), Property::UChar(b));
        }
        vertex_elements.push(element);
    }
    ply.payload.insert("vertex".to_string(), vertex_elements);

    let mut face_elements = Vec::with_capacity(mesh.triangle_count());
    for &[i0, i1, i2] in mesh.triangles() {
        let mut element = DefaultElement::new();
        #[allow(clippy::cast_possible_wrap)]
        let indices = vec![i0 as i32, i1 as i32, i2 as i32];
        element.insert("vertex_indices".to_string(), Property::ListInt(indices));
        face_elements.push(element);
    }
    ply.payload.insert("face".to_string(), face_elements);

    Writer::new()
        .write_ply(writer, &mut ply)
        .map_err(|e| MeshError::export(format!("failed to write PLY: {e}")))?;
    Ok(())
}
