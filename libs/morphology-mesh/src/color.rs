//! # Color Mapping
//!
//! Per-compartment color policies consumed by polyline assembly.
//!
//! ## Policies
//!
//! - **Fixed**: one color for the whole morphology
//! - **Categorical**: a palette entry per distinct category (compartment
//!   type by default)
//! - **Continuous**: a heat map over a numeric attribute, with the range
//!   clamped to two standard deviations around the mean

use crate::error::MeshError;
use config::constants::{
    CATEGORY_PALETTE, HEAT_MAP_SIGMA_CLAMP, HEAT_MAP_STOPS, TYPE_COLORS, UNKNOWN_TYPE_COLOR,
};
use morphology::{Compartment, CompartmentTree, CompartmentType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 8-bit RGB triple.
pub type Rgb = [u8; 3];

// =============================================================================
// POLICY
// =============================================================================

/// Maps a compartment to its display color.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorPolicy {
    /// Same color everywhere.
    Fixed(Rgb),
    /// Palette entry per compartment type.
    Categorical(CategoricalColors<CompartmentType>),
    /// Heat map over a numeric compartment attribute.
    Continuous {
        /// Fitted ramp.
        map: HeatMap,
        /// Attribute fed to the ramp.
        attribute: ScalarAttribute,
    },
}

impl ColorPolicy {
    /// The standard per-type coloring.
    pub fn by_type() -> Self {
        Self::Categorical(CategoricalColors::by_type())
    }

    /// Fits a heat map over `attribute` across every compartment of `tree`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidColorRamp`] for bad stops or a tree with
    /// no finite values.
    pub fn heat_map(
        tree: &CompartmentTree,
        attribute: ScalarAttribute,
        stops: Vec<ColorStop>,
    ) -> Result<Self, MeshError> {
        let values: Vec<f64> = tree.iter().map(|c| attribute.value(c)).collect();
        let map = HeatMap::fit(&values, stops)?;
        Ok(Self::Continuous { map, attribute })
    }

    /// Color of one compartment.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::ColorResolution`] when a continuous map cannot
    /// place the attribute value on its ramp.
    ///
    /// # Example
    ///
    /// ```rust
    /// use morphology_mesh::ColorPolicy;
    /// use morphology::{Compartment, CompartmentType, NO_PARENT};
    /// use glam::DVec3;
    ///
    /// let axon = Compartment::new(2, CompartmentType::AXON, DVec3::ZERO, 1.0, NO_PARENT);
    /// assert_eq!(ColorPolicy::by_type().color_of(&axon).unwrap(), [70, 130, 180]);
    /// assert_eq!(ColorPolicy::Fixed([9, 9, 9]).color_of(&axon).unwrap(), [9, 9, 9]);
    /// ```
    pub fn color_of(&self, compartment: &Compartment) -> Result<Rgb, MeshError> {
        match self {
            Self::Fixed(color) => Ok(*color),
            Self::Categorical(table) => Ok(table.color(&compartment.kind)),
            Self::Continuous { map, attribute } => map.color(attribute.value(compartment)),
        }
    }
}

/// Numeric compartment attribute usable by a heat map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarAttribute {
    /// Compartment radius.
    Radius,
    /// Position x.
    X,
    /// Position y.
    Y,
    /// Position z (depth for most reconstructions).
    Z,
}

impl ScalarAttribute {
    /// Reads the attribute from a compartment.
    pub fn value(self, compartment: &Compartment) -> f64 {
        match self {
            Self::Radius => compartment.radius,
            Self::X => compartment.position.x,
            Self::Y => compartment.position.y,
            Self::Z => compartment.position.z,
        }
    }
}

// =============================================================================
// CATEGORICAL
// =============================================================================

/// Fixed palette entry per category label.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalColors<K> {
    table: BTreeMap<K, Rgb>,
    fallback: Rgb,
}

impl<K: Ord + Clone> CategoricalColors<K> {
    /// Assigns palette entries to the distinct `labels` in sorted order,
    /// wrapping around when there are more labels than colors.
    ///
    /// Sorting makes the assignment identical across runs for the same set
    /// of labels, regardless of discovery order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use morphology_mesh::CategoricalColors;
    ///
    /// let palette = [[1, 0, 0], [0, 1, 0]];
    /// let colors = CategoricalColors::assign(["sst", "pvalb", "sst"], &palette);
    /// assert_eq!(colors.get(&"pvalb"), Some([1, 0, 0]));
    /// assert_eq!(colors.get(&"sst"), Some([0, 1, 0]));
    /// assert_eq!(colors.len(), 2);
    /// ```
    pub fn assign(labels: impl IntoIterator<Item = K>, palette: &[Rgb]) -> Self {
        let fallback = UNKNOWN_TYPE_COLOR;
        let mut table: BTreeMap<K, Rgb> = labels.into_iter().map(|l| (l, fallback)).collect();
        if !palette.is_empty() {
            for (i, color) in table.values_mut().enumerate() {
                *color = palette[i % palette.len()];
            }
        }
        Self { table, fallback }
    }

    /// Assigns from the standard ten-color palette.
    pub fn with_default_palette(labels: impl IntoIterator<Item = K>) -> Self {
        Self::assign(labels, &CATEGORY_PALETTE)
    }

    /// Replaces the color used for labels missing from the table.
    pub fn with_fallback(mut self, fallback: Rgb) -> Self {
        self.fallback = fallback;
        self
    }

    /// Sets or overrides the color of one label.
    pub fn insert(&mut self, label: K, color: Rgb) {
        self.table.insert(label, color);
    }

    /// Color of a known label.
    pub fn get(&self, label: &K) -> Option<Rgb> {
        self.table.get(label).copied()
    }

    /// Color of any label, using the fallback for unknown ones.
    pub fn color(&self, label: &K) -> Rgb {
        self.get(label).unwrap_or(self.fallback)
    }

    /// Number of known labels.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True if no labels are known.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl CategoricalColors<CompartmentType> {
    /// The standard type table: grey soma, blue axon, red basal and coral
    /// apical dendrites.
    pub fn by_type() -> Self {
        Self {
            table: TYPE_COLORS
                .iter()
                .map(|&(code, color)| (CompartmentType(code), color))
                .collect(),
            fallback: UNKNOWN_TYPE_COLOR,
        }
    }
}

// =============================================================================
// CONTINUOUS
// =============================================================================

/// One stop of a color ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Position in `[0, 1]`.
    pub position: f64,
    /// Color at that position.
    pub color: Rgb,
}

impl ColorStop {
    /// Creates a stop.
    pub fn new(position: f64, color: Rgb) -> Self {
        Self { position, color }
    }
}

/// Piecewise-linear color ramp over a fitted value range.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatMap {
    min: f64,
    max: f64,
    stops: Vec<ColorStop>,
}

impl HeatMap {
    /// The red → yellow → white stops.
    pub fn hot_stops() -> Vec<ColorStop> {
        HEAT_MAP_STOPS
            .iter()
            .map(|&(position, color)| ColorStop::new(position, color))
            .collect()
    }

    /// Fits the value range to `values`: `[mean − 2σ, mean + 2σ]`
    /// intersected with the observed `[min, max]` (population σ).
    /// Non-finite values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidColorRamp`] for malformed stops or when
    /// no finite values remain.
    ///
    /// # Example
    ///
    /// ```rust
    /// use morphology_mesh::HeatMap;
    ///
    /// let map = HeatMap::fit(&[0.0, 1.0, 2.0, 3.0, 4.0], HeatMap::hot_stops()).unwrap();
    /// assert_eq!(map.range(), (0.0, 4.0));
    /// assert_eq!(map.color(2.0).unwrap(), [255, 193, 0]);
    /// ```
    pub fn fit(values: &[f64], stops: Vec<ColorStop>) -> Result<Self, MeshError> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Err(MeshError::invalid_ramp("no finite values to fit"));
        }

        let n = finite.len() as f64;
        let mean = finite.iter().sum::<f64>() / n;
        let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let spread = HEAT_MAP_SIGMA_CLAMP * variance.sqrt();

        let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self::with_range((mean - spread).max(lo), (mean + spread).min(hi), stops)
    }

    /// Uses an explicit value range.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidColorRamp`] if the range is not finite and
    /// ordered, or the stops are not at least two ascending positions from
    /// 0 to 1.
    pub fn with_range(min: f64, max: f64, stops: Vec<ColorStop>) -> Result<Self, MeshError> {
        if !(min.is_finite() && max.is_finite() && min <= max) {
            return Err(MeshError::invalid_ramp(format!(
                "range must be finite and ordered: [{min}, {max}]"
            )));
        }
        validate_stops(&stops)?;
        Ok(Self { min, max, stops })
    }

    /// The fitted `(min, max)` range.
    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Maps a value onto the ramp.
    ///
    /// The value is normalized over the range and clamped to `[0, 1]`; a
    /// zero-width range maps everything to the first stop. Channels are
    /// interpolated independently and floored.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::ColorResolution`] when no segment brackets the
    /// normalized value (NaN input).
    pub fn color(&self, value: f64) -> Result<Rgb, MeshError> {
        let t = if self.max > self.min {
            ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        } else {
            0.0
        };

        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t >= a.position && t <= b.position {
                let tt = (t - a.position) / (b.position - a.position);
                let channel = |i: usize| {
                    let v = (1.0 - tt) * f64::from(a.color[i]) + tt * f64::from(b.color[i]);
                    v.floor().clamp(0.0, 255.0) as u8
                };
                return Ok([channel(0), channel(1), channel(2)]);
            }
        }

        Err(MeshError::ColorResolution { value })
    }
}

fn validate_stops(stops: &[ColorStop]) -> Result<(), MeshError> {
    if stops.len() < 2 {
        return Err(MeshError::invalid_ramp("at least two stops are required"));
    }
    if stops[0].position != 0.0 || stops[stops.len() - 1].position != 1.0 {
        return Err(MeshError::invalid_ramp("stops must start at 0 and end at 1"));
    }
    if stops.windows(2).any(|p| !(p[0].position < p[1].position)) {
        return Err(MeshError::invalid_ramp("stop positions must strictly ascend"));
    }
    Ok(())
}
