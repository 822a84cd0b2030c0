//! # Polyline Cleaning
//!
//! Merges coincident points so that a tube never sweeps a zero-length
//! segment.
//!
//! Points are bucketed on a grid of cell size `tolerance`; the first point
//! landing in a cell keeps its attributes and every later one is redirected
//! to it. Lines are then rewritten, consecutive repeats dropped, and lines
//! left with fewer than two points removed. Points no longer referenced by
//! any line are removed, except the soma point.

use crate::polyline::PolylineBuffer;
use glam::DVec3;
use std::collections::HashMap;

/// Returns a cleaned copy of `buffer`.
///
/// Idempotent: cleaning a cleaned buffer returns it unchanged.
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use morphology::CompartmentType;
/// use morphology_mesh::{clean_polylines, PolylineBuffer};
///
/// let buffer = PolylineBuffer {
///     points: vec![DVec3::ZERO, DVec3::ZERO, DVec3::X],
///     radii: vec![1.0; 3],
///     kinds: vec![CompartmentType::AXON; 3],
///     colors: vec![[0, 0, 0]; 3],
///     compartment_ids: vec![1, 2, 3],
///     lines: vec![vec![0, 1, 2]],
///     soma_point: None,
/// };
/// let cleaned = clean_polylines(&buffer, 1e-8);
/// assert_eq!(cleaned.lines, vec![vec![0, 1]]);
/// assert_eq!(cleaned.compartment_ids, vec![1, 3]);
/// ```
pub fn clean_polylines(buffer: &PolylineBuffer, tolerance: f64) -> PolylineBuffer {
    // Old point index → surviving representative.
    let mut cells: HashMap<(i64, i64, i64), u32> = HashMap::with_capacity(buffer.point_count());
    let representative: Vec<u32> = buffer
        .points
        .iter()
        .enumerate()
        .map(|(i, &p)| *cells.entry(quantize(p, tolerance)).or_insert(i as u32))
        .collect();

    let mut lines = Vec::with_capacity(buffer.line_count());
    for line in &buffer.lines {
        let mut merged: Vec<u32> = Vec::with_capacity(line.len());
        for &index in line {
            let rep = representative[index as usize];
            if merged.last() != Some(&rep) {
                merged.push(rep);
            }
        }
        if merged.len() >= 2 {
            lines.push(merged);
        }
    }

    let soma_point = buffer.soma_point.map(|i| representative[i as usize]);

    // Compact to referenced points, keeping original order.
    let mut used = vec![false; buffer.point_count()];
    for &index in lines.iter().flatten() {
        used[index as usize] = true;
    }
    if let Some(soma) = soma_point {
        used[soma as usize] = true;
    }

    let mut remap = vec![u32::MAX; buffer.point_count()];
    let mut cleaned = PolylineBuffer::default();
    for (old, _) in used.iter().enumerate().filter(|(_, &u)| u) {
        remap[old] = cleaned.points.len() as u32;
        cleaned.points.push(buffer.points[old]);
        cleaned.radii.push(buffer.radii[old]);
        cleaned.kinds.push(buffer.kinds[old]);
        cleaned.colors.push(buffer.colors[old]);
        cleaned.compartment_ids.push(buffer.compartment_ids[old]);
    }

    cleaned.lines = lines
        .into_iter()
        .map(|line| line.into_iter().map(|i| remap[i as usize]).collect())
        .collect();
    cleaned.soma_point = soma_point.map(|i| remap[i as usize]);
    cleaned
}

fn quantize(p: DVec3, tolerance: f64) -> (i64, i64, i64) {
    let q = (p / tolerance).round();
    (q.x as i64, q.y as i64, q.z as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphology::CompartmentType;

    fn buffer(points: Vec<DVec3>, lines: Vec<Vec<u32>>) -> PolylineBuffer {
        let n = points.len();
        PolylineBuffer {
            points,
            radii: (0..n).map(|i| i as f64).collect(),
            kinds: vec![CompartmentType::AXON; n],
            colors: vec![[0, 0, 0]; n],
            compartment_ids: (0..n as i64).collect(),
            lines,
            soma_point: None,
        }
    }

    #[test]
    fn test_merges_duplicate_points_first_wins() {
        let b = buffer(
            vec![DVec3::ZERO, DVec3::X, DVec3::X, DVec3::Y],
            vec![vec![0, 1, 2, 3]],
        );
        let cleaned = clean_polylines(&b, 1e-8);
        assert_eq!(cleaned.lines, vec![vec![0, 1, 2]]);
        assert_eq!(cleaned.radii, vec![0.0, 1.0, 3.0]);
    }

    #[test]
    fn test_drops_short_lines() {
        let b = buffer(
            vec![DVec3::ZERO, DVec3::ZERO, DVec3::X, DVec3::Y],
            vec![vec![0, 1], vec![2], vec![2, 3]],
        );
        let cleaned = clean_polylines(&b, 1e-8);
        assert_eq!(cleaned.lines, vec![vec![0, 1]]);
        assert_eq!(cleaned.point_count(), 2);
        assert_eq!(cleaned.compartment_ids, vec![2, 3]);
    }

    #[test]
    fn test_keeps_soma_point() {
        let mut b = buffer(vec![DVec3::ZERO], vec![vec![0]]);
        b.soma_point = Some(0);
        let cleaned = clean_polylines(&b, 1e-8);
        assert!(cleaned.lines.is_empty());
        assert_eq!(cleaned.soma_point, Some(0));
        assert_eq!(cleaned.point_count(), 1);
    }

    #[test]
    fn test_shared_junction_survives() {
        let b = buffer(
            vec![DVec3::ZERO, DVec3::X, DVec3::Y],
            vec![vec![0, 1], vec![0, 2]],
        );
        let cleaned = clean_polylines(&b, 1e-8);
        assert_eq!(cleaned, b);
    }

    #[test]
    fn test_idempotent() {
        let b = buffer(
            vec![DVec3::ZERO, DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1e-12, 0.0), DVec3::Z],
            vec![vec![0, 1, 2, 3, 4], vec![1, 4]],
        );
        let once = clean_polylines(&b, 1e-8);
        let twice = clean_polylines(&once, 1e-8);
        assert_eq!(once, twice);
    }
}
