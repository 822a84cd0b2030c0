//! Legacy ASCII VTK polydata output.
//!
//! ```text
//! # vtk DataFile Version 3.0
//! <title>
//! ASCII
//! DATASET POLYDATA
//! POINTS n double
//! POLYGONS m 4m
//! POINT_DATA n
//!   SCALARS radius double 1    (active scalars)
//!   COLOR_SCALARS colors 3     (channels scaled to [0, 1])
//!   NORMALS normals double
//!   FIELD FieldData 2          (type, compartment_id)
//! ```
//!
//! Point data sections are written only for the channels the mesh has.

use crate::error::MeshError;
use crate::mesh::Mesh;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const TITLE: &str = "neuron morphology tube mesh";

/// Writes `mesh` as legacy VTK polydata to a file.
///
/// # Errors
///
/// Returns [`MeshError::Io`] on any file error.
pub fn save_vtk(mesh: &Mesh, path: impl AsRef<Path>) -> Result<(), MeshError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_vtk(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Writes `mesh` as legacy VTK polydata.
///
/// # Errors
///
/// Returns [`MeshError::Io`] if the writer fails.
pub fn write_vtk<W: Write>(mesh: &Mesh, writer: &mut W) -> Result<(), MeshError> {
    let n = mesh.vertex_count();
    let m = mesh.triangle_count();

    writeln!(writer, "# vtk DataFile Version 3.0")?;
    writeln!(writer, "{TITLE}")?;
    writeln!(writer, "ASCII")?;
    writeln!(writer, "DATASET POLYDATA")?;

    writeln!(writer, "POINTS {n} double")?;
    for v in mesh.vertices() {
        writeln!(writer, "{} {} {}", v.x, v.y, v.z)?;
    }

    writeln!(writer, "POLYGONS {m} {}", 4 * m)?;
    for [a, b, c] in mesh.triangles() {
        writeln!(writer, "3 {a} {b} {c}")?;
    }

    let has_point_data =
        mesh.attributes().is_some() || mesh.colors().is_some() || mesh.normals().is_some();
    if n == 0 || !has_point_data {
        return Ok(());
    }

    writeln!(writer, "POINT_DATA {n}")?;

    if let Some(attributes) = mesh.attributes() {
        writeln!(writer, "SCALARS radius double 1")?;
        writeln!(writer, "LOOKUP_TABLE default")?;
        for a in attributes {
            writeln!(writer, "{}", a.radius)?;
        }
    }

    if let Some(colors) = mesh.colors() {
        writeln!(writer, "COLOR_SCALARS colors 3")?;
        for [r, g, b] in colors {
            let scaled = |c: &u8| f64::from(*c) / 255.0;
            writeln!(writer, "{} {} {}", scaled(r), scaled(g), scaled(b))?;
        }
    }

    if let Some(normals) = mesh.normals() {
        writeln!(writer, "NORMALS normals double")?;
        for nv in normals {
            writeln!(writer, "{} {} {}", nv.x, nv.y, nv.z)?;
        }
    }

    if let Some(attributes) = mesh.attributes() {
        writeln!(writer, "FIELD FieldData 2")?;
        writeln!(writer, "type 1 {n} unsigned_char")?;
        for a in attributes {
            writeln!(writer, "{}", a.kind.code())?;
        }
        writeln!(writer, "compartment_id 1 {n} long")?;
        for a in attributes {
            writeln!(writer, "{}", a.compartment_id)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::VertexAttributes;
    use glam::DVec3;
    use morphology::CompartmentType;

    fn triangle() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_vertex(DVec3::ZERO);
        mesh.add_vertex(DVec3::X);
        mesh.add_vertex(DVec3::Y);
        mesh.add_triangle(0, 1, 2);
        mesh
    }

    fn to_text(mesh: &Mesh) -> String {
        let mut out = Vec::new();
        write_vtk(mesh, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_geometry_only() {
        let text = to_text(&triangle());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# vtk DataFile Version 3.0");
        assert_eq!(lines[3], "DATASET POLYDATA");
        assert_eq!(lines[4], "POINTS 3 double");
        assert_eq!(lines[6], "1 0 0");
        assert_eq!(lines[8], "POLYGONS 1 4");
        assert_eq!(lines[9], "3 0 1 2");
        assert!(!text.contains("POINT_DATA"));
    }

    #[test]
    fn test_point_data_sections() {
        let mut mesh = triangle();
        mesh.set_uniform_color([255, 0, 51]);
        mesh.set_normals(vec![DVec3::Z; 3]);
        mesh.set_uniform_attributes(VertexAttributes {
            radius: 1.5,
            kind: CompartmentType::APICAL_DENDRITE,
            compartment_id: 42,
        });
        let text = to_text(&mesh);
        assert!(text.contains("POINT_DATA 3\nSCALARS radius double 1\nLOOKUP_TABLE default\n1.5\n"));
        assert!(text.contains("COLOR_SCALARS colors 3\n1 0 0.2\n"));
        assert!(text.contains("NORMALS normals double\n0 0 1\n"));
        assert!(text.contains("FIELD FieldData 2\ntype 1 3 unsigned_char\n4\n4\n4\n"));
        assert!(text.contains("compartment_id 1 3 long\n42\n"));
    }

    #[test]
    fn test_empty_mesh() {
        let text = to_text(&Mesh::new());
        assert!(text.contains("POINTS 0 double"));
        assert!(text.contains("POLYGONS 0 0"));
        assert!(!text.contains("POINT_DATA"));
    }

    #[test]
    fn test_save_vtk_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.vtk");
        save_vtk(&triangle(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("3 0 1 2\n"));
    }
}
