//! Read-only geometry inputs: bounding boxes, sub-geometries and models.
//!
//! Only bounds are kept from imported meshes. Vertex data belongs to the
//! renderer; everything this crate computes is driven by the boxes.
//!
//! # Quick Start
//!
//! ```
//! use propwash::{BoundingBox, Model, SubGeometry, Vec3};
//!
//! let propeller = SubGeometry::new(
//!     "propeller",
//!     BoundingBox::new(Vec3::new(-0.5, -0.5, 1.9), Vec3::new(0.5, 0.5, 2.0)),
//! );
//! let fuselage = SubGeometry::new(
//!     "fuselage",
//!     BoundingBox::new(Vec3::new(-0.3, -0.3, -2.0), Vec3::new(0.3, 0.3, 1.9)),
//! );
//!
//! let model = Model::new(vec![propeller, fuselage]).unwrap();
//! assert_eq!(model.bounds().max_extent(), 4.0);
//! assert_eq!(model.normalizing_scale(1.0), 0.25);
//! ```
//!
//! Degenerate boxes are rejected here, at load time. The per-frame path does no
//! validation of its own.

use std::io::{Read, Seek};
use std::path::Path;

use glam::{Mat4, Vec3};
use thiserror::Error;

/// Errors that can occur when building or importing geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// File could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// File format could not be determined from extension.
    #[error("unknown geometry format: '{0}'")]
    UnknownFormat(String),
    /// The geometry data was invalid or corrupt.
    #[error("parse error: {0}")]
    ParseError(String),
    /// A model needs at least one sub-geometry.
    #[error("model has no sub-geometries")]
    Empty,
    /// Zero extent on every axis makes the normalizing scale undefined.
    #[error("degenerate bounding box {min:?}..{max:?}")]
    Degenerate { min: Vec3, max: Vec3 },
    /// The propeller index does not name a sub-geometry.
    #[error("propeller index {index} out of range for {count} sub-geometries")]
    PropellerIndex { index: usize, count: usize },
}

/// Axis-aligned bounding box in local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, or `None` for no points.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    /// Reads an STL stream (binary or ASCII) and keeps only its bounds.
    pub fn from_stl_reader<R: Read + Seek>(reader: &mut R) -> Result<Self, GeometryError> {
        let stl = stl_io::read_stl(reader)
            .map_err(|e| GeometryError::ParseError(format!("STL parse error: {}", e)))?;

        let points = stl.vertices.iter().map(|v| {
            let position: [f32; 3] = (*v).into();
            Vec3::from(position)
        });

        Self::from_points(points)
            .ok_or_else(|| GeometryError::ParseError("STL file has no vertices".to_string()))
    }

    /// Reads bounds from a file, picking the importer from the extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GeometryError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "stl" => {
                let file = std::fs::File::open(path)?;
                let mut reader = std::io::BufReader::new(file);
                Self::from_stl_reader(&mut reader)
            }
            _ => Err(GeometryError::UnknownFormat(ext)),
        }
    }

    /// Midpoint of the min/max corners; the rotation pivot.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Size along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn max_extent(&self) -> f32 {
        self.extent().max_element()
    }

    /// True when no axis has positive extent.
    pub fn is_degenerate(&self) -> bool {
        let max = self.max_extent();
        max.is_nan() || max <= 0.0
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// One drawable part of a multi-part object.
#[derive(Clone, Debug)]
pub struct SubGeometry {
    /// Label for logs and output.
    pub name: String,
    /// Bounds in local space, computed once at load.
    pub bounds: BoundingBox,
    /// Load-time pre-transform restored by [`SubGeometry::reset_transform`].
    pub rest: Mat4,
    /// Transform recomposed every frame.
    pub transform: Mat4,
}

impl SubGeometry {
    pub fn new(name: impl Into<String>, bounds: BoundingBox) -> Self {
        Self {
            name: name.into(),
            bounds,
            rest: Mat4::IDENTITY,
            transform: Mat4::IDENTITY,
        }
    }

    /// Bakes a hierarchy node transform that every frame starts from.
    pub fn with_rest(mut self, rest: Mat4) -> Self {
        self.rest = rest;
        self.transform = rest;
        self
    }

    pub fn reset_transform(&mut self) {
        self.transform = self.rest;
    }
}

/// A multi-part rigid body with an aggregate bounding box.
///
/// Used as a hecs component; pair it with [`Propeller`](crate::Propeller) to
/// make one part spin.
#[derive(Clone, Debug)]
pub struct Model {
    parts: Vec<SubGeometry>,
    bounds: BoundingBox,
}

impl Model {
    /// Builds a model and its aggregate box.
    ///
    /// Fails on an empty part list or when the aggregate box has zero extent.
    pub fn new(parts: Vec<SubGeometry>) -> Result<Self, GeometryError> {
        let bounds = parts
            .iter()
            .map(|p| p.bounds)
            .reduce(|acc, b| acc.union(&b))
            .ok_or(GeometryError::Empty)?;

        if bounds.is_degenerate() {
            return Err(GeometryError::Degenerate {
                min: bounds.min,
                max: bounds.max,
            });
        }

        Ok(Self { parts, bounds })
    }

    /// Loads one sub-geometry per file, in order. Parts are named after the file stem.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, GeometryError> {
        let parts = paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                let bounds = BoundingBox::from_file(path)?;
                let name = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("part")
                    .to_string();
                log::info!("loaded part '{}' bounds {:?}..{:?}", name, bounds.min, bounds.max);
                Ok(SubGeometry::new(name, bounds))
            })
            .collect::<Result<Vec<_>, GeometryError>>()?;

        Self::new(parts)
    }

    /// Aggregate bounds spanning every part.
    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn parts(&self) -> &[SubGeometry] {
        &self.parts
    }

    pub fn parts_mut(&mut self) -> &mut [SubGeometry] {
        &mut self.parts
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Current transform of every part, in part order.
    pub fn transforms(&self) -> Vec<Mat4> {
        self.parts.iter().map(|p| p.transform).collect()
    }

    /// Uniform scale that makes the largest extent equal `norm_size`.
    pub fn normalizing_scale(&self, norm_size: f32) -> f32 {
        norm_size / self.bounds.max_extent()
    }

    pub fn reset_transforms(&mut self) {
        for part in &mut self.parts {
            part.reset_transform();
        }
    }
}

/// Marks which sub-geometry of a [`Model`] spins as a propeller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Propeller {
    pub index: usize,
}

impl Propeller {
    /// Checks `index` against `model` once, at load time.
    pub fn attach(model: &Model, index: usize) -> Result<Self, GeometryError> {
        if index >= model.part_count() {
            return Err(GeometryError::PropellerIndex {
                index,
                count: model.part_count(),
            });
        }
        Ok(Self { index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cube(min: f32, max: f32) -> BoundingBox {
        BoundingBox::new(Vec3::splat(min), Vec3::splat(max))
    }

    #[test]
    fn bounds_from_points() {
        let bounds = BoundingBox::from_points([
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-1.0, -1.0, -1.0),
        ])
        .unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 3.0));
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn bounds_centroid_and_extent() {
        let bounds = BoundingBox::new(Vec3::ZERO, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(bounds.centroid(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(bounds.extent(), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(bounds.max_extent(), 6.0);
    }

    #[test]
    fn model_aggregates_part_bounds() {
        let model = Model::new(vec![
            SubGeometry::new("a", cube(0.0, 1.0)),
            SubGeometry::new("b", cube(-3.0, -2.0)),
        ])
        .unwrap();
        assert_eq!(model.bounds().min, Vec3::splat(-3.0));
        assert_eq!(model.bounds().max, Vec3::splat(1.0));
        assert_eq!(model.normalizing_scale(2.0), 0.5);
    }

    #[test]
    fn model_rejects_empty_and_degenerate() {
        assert!(matches!(Model::new(Vec::new()), Err(GeometryError::Empty)));

        let flat = SubGeometry::new("point", cube(1.0, 1.0));
        assert!(matches!(
            Model::new(vec![flat]),
            Err(GeometryError::Degenerate { .. })
        ));
    }

    #[test]
    fn propeller_index_is_checked() {
        let model = Model::new(vec![SubGeometry::new("only", cube(0.0, 1.0))]).unwrap();
        assert_eq!(Propeller::attach(&model, 0).unwrap().index, 0);
        assert!(matches!(
            Propeller::attach(&model, 1),
            Err(GeometryError::PropellerIndex { index: 1, count: 1 })
        ));
    }

    #[test]
    fn reset_restores_rest_transform() {
        let rest = Mat4::from_translation(Vec3::X);
        let mut part = SubGeometry::new("node", cube(0.0, 1.0)).with_rest(rest);
        part.transform = Mat4::from_scale(Vec3::splat(3.0));
        part.reset_transform();
        assert_eq!(part.transform, rest);
    }

    #[test]
    fn stl_bounds_from_ascii_file() {
        let mut file = tempfile::Builder::new().suffix(".stl").tempfile().unwrap();
        write!(
            file,
            "solid tri
  facet normal 0 0 1
    outer loop
      vertex -1 0 0
      vertex 2 0 0
      vertex 0 3 0.5
    endloop
  endfacet
endsolid tri
"
        )
        .unwrap();
        file.flush().unwrap();

        let bounds = BoundingBox::from_file(file.path()).unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(2.0, 3.0, 0.5));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = BoundingBox::from_file("plane.dae").unwrap_err();
        assert!(matches!(err, GeometryError::UnknownFormat(ext) if ext == "dae"));
    }
}
