//! Command-line flags and their resolution into generation settings.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use config::constants::GlobalConfig;
use morphology_mesh::{Rgb, TubeOptions, TubeRadius};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Turn SWC neuron reconstructions into capped tube meshes.
#[derive(Debug, Parser)]
#[command(name = "morphmesh")]
#[command(about = "Batch mesher for neuron morphologies", long_about = None)]
#[command(version)]
pub struct Cli {
    /// SWC files to mesh
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory for the generated meshes
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Vertices per tube cross-section
    #[arg(long)]
    pub sides: Option<u32>,

    /// Use one fixed tube radius instead of the per-point radius
    #[arg(long)]
    pub radius: Option<f64>,

    /// Lower bound on every point radius
    #[arg(long)]
    pub min_radius: Option<f64>,

    /// Points closer than this are merged
    #[arg(long)]
    pub merge_tolerance: Option<f64>,

    /// Multiplier applied to every radius before meshing
    #[arg(long)]
    pub radius_scale: Option<f64>,

    /// Multiplier applied to z (shrinkage correction)
    #[arg(long)]
    pub z_scale: Option<f64>,

    /// Translate each cell so its soma sits at the origin
    #[arg(long)]
    pub center: bool,

    /// Skip the soma sphere
    #[arg(long)]
    pub no_soma: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Ply)]
    pub format: Format,

    /// Coloring scheme
    #[arg(long, value_enum, default_value_t = ColorScheme::Type)]
    pub color: ColorScheme,

    /// Color for `--color fixed`, as r,g,b
    #[arg(long, value_parser = parse_rgb, default_value = "255,255,255")]
    pub fixed_color: Rgb,

    /// TOML file with tube options; flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Mesh file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Ply,
    Vtk,
    Both,
}

impl Format {
    /// File extensions to write.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Format::Ply => &["ply"],
            Format::Vtk => &["vtk"],
            Format::Both => &["ply", "vtk"],
        }
    }
}

/// How vertices are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorScheme {
    /// One color per compartment type
    Type,
    /// `--fixed-color` everywhere
    Fixed,
    /// Heat map over compartment radius
    RadiusHeat,
}

/// Contents of a `--config` file.
///
/// ```toml
/// z_scale = 2.5
///
/// [tube]
/// sides = 12
/// root = 1
/// radius = { fixed = 0.5 }
/// soma_radius = "stored"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Tube generation options.
    pub tube: TubeOptions,
    /// Radius multiplier.
    pub radius_scale: Option<f64>,
    /// Z multiplier.
    pub z_scale: Option<f64>,
}

impl FileConfig {
    /// Reads and parses a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

/// Everything one input needs, resolved from flags and config.
#[derive(Debug, Clone)]
pub struct Settings {
    pub tube: TubeOptions,
    pub radius_scale: f64,
    pub z_scale: f64,
    pub center: bool,
    pub soma: bool,
    pub format: Format,
    pub color: ColorScheme,
    pub fixed_color: Rgb,
    pub output_dir: PathBuf,
}

impl Settings {
    /// Layers flags over the config file over the defaults.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        let mut tube = file.tube;

        let global = GlobalConfig::new(
            cli.merge_tolerance.unwrap_or(tube.merge_tolerance),
            cli.sides.unwrap_or(tube.sides),
        )?;
        tube.sides = global.tube_sides;
        tube.merge_tolerance = global.merge_tolerance;
        if let Some(r) = cli.radius {
            tube.radius = TubeRadius::Fixed(r);
        }
        if let Some(r) = cli.min_radius {
            tube.min_radius = r;
        }
        tube.validate()?;

        let radius_scale = cli.radius_scale.or(file.radius_scale).unwrap_or(1.0);
        let z_scale = cli.z_scale.or(file.z_scale).unwrap_or(1.0);
        for (name, value) in [("radius-scale", radius_scale), ("z-scale", z_scale)] {
            if !(value.is_finite() && value > 0.0) {
                bail!("--{name} must be finite and positive, got {value}");
            }
        }

        Ok(Self {
            tube,
            radius_scale,
            z_scale,
            center: cli.center,
            soma: !cli.no_soma,
            format: cli.format,
            color: cli.color,
            fixed_color: cli.fixed_color,
            output_dir: cli.output_dir.clone(),
        })
    }
}

fn parse_rgb(s: &str) -> Result<Rgb, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [r, g, b] = parts.as_slice() else {
        return Err(format!("expected r,g,b, got {s:?}"));
    };
    let channel = |c: &str| c.parse::<u8>().map_err(|e| format!("bad channel {c:?}: {e}"));
    Ok([channel(*r)?, channel(*g)?, channel(*b)?])
}
