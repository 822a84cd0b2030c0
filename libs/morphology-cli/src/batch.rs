//! Per-file meshing and the parallel batch over all inputs.

use crate::args::{ColorScheme, Format, Settings};
use anyhow::{Context, Result};
use log::{error, info};
use morphology::{read_swc, transform, CompartmentTree};
use morphology_mesh::{
    export, generate_mesh, generate_tube, ColorPolicy, HeatMap, Mesh, ScalarAttribute,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Outcome of a batch run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Meshes every input in parallel. A failing input is logged and does not
/// stop the others.
pub fn run(inputs: &[PathBuf], settings: &Settings) -> Summary {
    let results: Vec<(&PathBuf, Result<Vec<PathBuf>>)> = inputs
        .par_iter()
        .map(|input| (input, process(input, settings)))
        .collect();

    let mut summary = Summary::default();
    for (input, result) in results {
        match result {
            Ok(written) => {
                summary.succeeded += 1;
                for path in written {
                    info!("{} -> {}", input.display(), path.display());
                }
            }
            Err(err) => {
                summary.failed += 1;
                error!("{}: {err:#}", input.display());
            }
        }
    }
    summary
}

/// Reads, aligns, meshes and writes one SWC file. Returns the written paths.
pub fn process(input: &Path, settings: &Settings) -> Result<Vec<PathBuf>> {
    let mut tree = read_swc(input).with_context(|| format!("reading {}", input.display()))?;
    align(&mut tree, settings);

    let mesh = build_mesh(&tree, settings)?;
    info!(
        "{}: {} compartments, {} vertices, {} triangles",
        input.display(),
        tree.len(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh".to_string());
    write_outputs(&mesh, &settings.output_dir, &stem, settings.format)
}

fn align(tree: &mut CompartmentTree, settings: &Settings) {
    if settings.z_scale != 1.0 || settings.radius_scale != 1.0 {
        let matrix = transform::scale(1.0, 1.0, settings.z_scale);
        tree.transform_in_place(&matrix, settings.radius_scale);
    }
    if settings.center {
        tree.center_on_soma();
    }
}

fn build_mesh(tree: &CompartmentTree, settings: &Settings) -> Result<Mesh> {
    let policy = match settings.color {
        ColorScheme::Type => ColorPolicy::by_type(),
        ColorScheme::Fixed => ColorPolicy::Fixed(settings.fixed_color),
        ColorScheme::RadiusHeat => {
            ColorPolicy::heat_map(tree, ScalarAttribute::Radius, HeatMap::hot_stops())?
        }
    };
    let mesh = if settings.soma {
        generate_mesh(tree, &policy, &settings.tube)?
    } else {
        generate_tube(tree, &policy, &settings.tube)?
    };
    Ok(mesh)
}

fn write_outputs(mesh: &Mesh, dir: &Path, stem: &str, format: Format) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    format
        .extensions()
        .iter()
        .map(|ext| {
            let path = dir.join(format!("{stem}.{ext}"));
            let saved = match *ext {
                "vtk" => export::save_vtk(mesh, &path),
                _ => export::save_ply(mesh, &path),
            };
            saved.with_context(|| format!("writing {}", path.display()))?;
            Ok(path)
        })
        .collect()
}
