//! # SWC Reader
//!
//! Reads the whitespace-separated skeleton format used by reconstruction
//! archives:
//!
//! ```text
//! # id type x y z radius parent
//! 1 1 0.0 0.0 0.0 5.0 -1
//! 2 3 0.0 8.0 0.0 1.2 1
//! ```
//!
//! Lines starting with `#` and blank lines are ignored. Columns after the
//! seventh are ignored. Any negative parent id marks a root.

use crate::compartment::{Compartment, CompartmentId, CompartmentType, NO_PARENT};
use crate::error::MorphologyError;
use crate::tree::CompartmentTree;
use glam::DVec3;
use std::path::Path;

const COLUMNS: usize = 7;

/// Parses SWC text into a tree.
///
/// # Errors
///
/// Returns [`MorphologyError::Parse`] for short lines or bad numbers, and
/// [`MorphologyError::DuplicateId`] if an id repeats.
///
/// # Example
///
/// ```rust
/// use morphology::parse_swc;
///
/// let tree = parse_swc("1 1 0 0 0 5 -1\n2 3 0 8 0 1.2 1\n").unwrap();
/// assert_eq!(tree.len(), 2);
/// assert_eq!(tree.soma().map(|c| c.id), Some(1));
/// ```
pub fn parse_swc(text: &str) -> Result<CompartmentTree, MorphologyError> {
    let mut compartments = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        compartments.push(parse_line(line, line_no)?);
    }

    log::debug!("parsed {} SWC compartments", compartments.len());
    CompartmentTree::from_compartments(compartments)
}

/// Reads and parses an SWC file.
///
/// # Errors
///
/// Returns [`MorphologyError::Io`] if the file cannot be read, otherwise the
/// errors of [`parse_swc`].
pub fn read_swc(path: impl AsRef<Path>) -> Result<CompartmentTree, MorphologyError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_swc(&text)
}

fn parse_line(line: &str, line_no: usize) -> Result<Compartment, MorphologyError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < COLUMNS {
        return Err(MorphologyError::parse(
            line_no,
            format!("expected {COLUMNS} columns, found {}", fields.len()),
        ));
    }

    let id = parse_id(fields[0], "id", line_no)?;
    let code = parse_id(fields[1], "type", line_no)?;
    let kind = u8::try_from(code)
        .map(CompartmentType)
        .map_err(|_| MorphologyError::parse(line_no, format!("type out of range: {code}")))?;
    let x = parse_float(fields[2], "x", line_no)?;
    let y = parse_float(fields[3], "y", line_no)?;
    let z = parse_float(fields[4], "z", line_no)?;
    let radius = parse_float(fields[5], "radius", line_no)?;
    if radius < 0.0 {
        return Err(MorphologyError::parse(
            line_no,
            format!("negative radius: {radius}"),
        ));
    }
    let parent = match parse_id(fields[6], "parent", line_no)? {
        p if p < 0 => NO_PARENT,
        p => p,
    };

    Ok(Compartment::new(id, kind, DVec3::new(x, y, z), radius, parent))
}

fn parse_float(field: &str, name: &str, line_no: usize) -> Result<f64, MorphologyError> {
    let value: f64 = field
        .parse()
        .map_err(|e| MorphologyError::parse(line_no, format!("invalid {name} '{field}': {e}")))?;
    if !value.is_finite() {
        return Err(MorphologyError::parse(
            line_no,
            format!("non-finite {name}: {field}"),
        ));
    }
    Ok(value)
}

// Some exporters write integral columns as floats ("12.0").
fn parse_id(field: &str, name: &str, line_no: usize) -> Result<CompartmentId, MorphologyError> {
    if let Ok(v) = field.parse::<CompartmentId>() {
        return Ok(v);
    }
    let v = parse_float(field, name, line_no)?;
    if v.fract() != 0.0 {
        return Err(MorphologyError::parse(
            line_no,
            format!("{name} must be an integer: {field}"),
        ));
    }
    Ok(v as CompartmentId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const NEURON: &str = "\
# sample reconstruction
# id type x y z radius parent
1 1 0.0 0.0 0.0 6.5 -1
2 3 0.0 10.0 0.0 1.5 1

3 3 0.0 20.0 0.0 1.0 2
4 2 0.0 -10.0 0.0 0.5 1
";

    #[test]
    fn test_parse_sample() {
        let tree = parse_swc(NEURON).unwrap();
        assert_eq!(tree.len(), 4);
        let soma = tree.soma().unwrap();
        assert_eq!(soma.id, 1);
        assert_eq!(soma.children, vec![2, 4]);
        let c3 = tree.get(3).unwrap();
        assert_eq!(c3.parent, 2);
        assert_relative_eq!(c3.position.y, 20.0);
        assert_eq!(tree.get(4).unwrap().kind, CompartmentType::AXON);
    }

    #[test]
    fn test_float_ids_and_extra_columns() {
        let tree = parse_swc("1.0 1 0 0 0 1 -1.0 extra\n2 3 1 0 0 1 1\n").unwrap();
        assert!(tree.get(1).unwrap().is_root());
        assert_eq!(tree.get(1).unwrap().children, vec![2]);
    }

    #[test]
    fn test_any_negative_parent_is_root() {
        let tree = parse_swc("5 1 0 0 0 1 -7\n").unwrap();
        assert_eq!(tree.get(5).unwrap().parent, NO_PARENT);
    }

    #[test]
    fn test_short_line_reports_line_number() {
        let err = parse_swc("# header\n1 1 0 0 0 1 -1\n2 3 0 0\n").unwrap_err();
        match err {
            MorphologyError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_number_rejected() {
        assert!(parse_swc("1 1 zero 0 0 1 -1\n").is_err());
        assert!(parse_swc("1 1 0 0 0 NaN -1\n").is_err());
        assert!(parse_swc("1 1 0 0 0 -2 -1\n").is_err());
        assert!(parse_swc("1.5 1 0 0 0 1 -1\n").is_err());
        assert!(parse_swc("1 300 0 0 0 1 -1\n").is_err());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = parse_swc("1 1 0 0 0 1 -1\n1 3 0 0 0 1 -1\n").unwrap_err();
        assert!(matches!(err, MorphologyError::DuplicateId(1)));
    }

    #[test]
    fn test_read_swc_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cell.swc");
        std::fs::write(&path, NEURON).unwrap();
        let tree = read_swc(&path).unwrap();
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_swc(dir.path().join("absent.swc")).unwrap_err();
        assert!(matches!(err, MorphologyError::Io(_)));
    }
}
