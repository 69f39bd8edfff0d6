/// Positioned, sized and rotated shape instances
use nalgebra::{Point2, Vector3};

use crate::geometry::{ShapeGeometry, ShapeKind};
use crate::projection::Projection;
use crate::surface::{Color, RasterSurface};
use crate::transform::Transform;

/// Sizes below this are raised to it so every instance stays visible
pub const MIN_INSTANCE_SIZE: f64 = 1e-3;

/// A shape kind placed in the scene with its own pose and color.
///
/// The geometry is looked up from the shared templates, so cloning an
/// instance copies only the pose.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeInstance {
    pub kind: ShapeKind,
    pub position: Vector3<f64>,
    size: f64,
    /// Per-axis angles in radians, accumulated without wrapping
    pub rotation: Vector3<f64>,
    pub color: Color,
}

impl ShapeInstance {
    pub fn new(kind: ShapeKind, position: Vector3<f64>, size: f64) -> Self {
        Self {
            kind,
            position,
            size: size.max(MIN_INSTANCE_SIZE),
            rotation: Vector3::zeros(),
            color: Color::default(),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn geometry(&self) -> &'static ShapeGeometry {
        self.kind.geometry()
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn set_size(&mut self, size: f64) {
        self.size = size.max(MIN_INSTANCE_SIZE);
    }

    /// Change the kind in place, keeping position, size and rotation
    pub fn set_kind(&mut self, kind: ShapeKind) {
        self.kind = kind;
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.position.x = x;
        self.position.y = y;
    }

    /// Add delta angles (radians) to the current rotation
    pub fn rotate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.rotation += Vector3::new(dx, dy, dz);
    }

    /// Geometry vertices after scaling and rotation, before projection
    pub fn transformed_vertices(&self) -> Vec<Vector3<f64>> {
        let rotation = Transform::rotation_from_angles(&self.rotation);
        self.geometry()
            .vertices
            .iter()
            .map(|vertex| Transform::transform_vertex(vertex, self.size, &rotation))
            .collect()
    }

    pub fn projected_vertices(&self, projection: &Projection) -> Vec<Point2<i32>> {
        let anchor = Point2::new(self.position.x, self.position.y);
        self.transformed_vertices()
            .iter()
            .map(|vertex| projection.project(vertex, &anchor))
            .collect()
    }

    /// Draw every edge as a line on `surface`
    pub fn render(
        &self,
        surface: &mut dyn RasterSurface,
        color: Color,
        thickness: u32,
        projection: &Projection,
    ) {
        let projected = self.projected_vertices(projection);
        for &(a, b) in &self.geometry().edges {
            surface.draw_line(projected[a], projected[b], color, thickness);
        }
    }
}

/// Committed shapes in render order (later entries draw on top)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacedShapes {
    shapes: Vec<ShapeInstance>,
}

impl PlacedShapes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, shape: ShapeInstance) {
        self.shapes.push(shape);
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ShapeInstance> {
        self.shapes.iter()
    }

    pub fn as_slice(&self) -> &[ShapeInstance] {
        &self.shapes
    }

    /// Render each placed shape in its own color
    pub fn render_all(
        &self,
        surface: &mut dyn RasterSurface,
        thickness: u32,
        projection: &Projection,
    ) {
        for shape in &self.shapes {
            shape.render(surface, shape.color, thickness, projection);
        }
    }
}

impl<'a> IntoIterator for &'a PlacedShapes {
    type Item = &'a ShapeInstance;
    type IntoIter = std::slice::Iter<'a, ShapeInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.shapes.iter()
    }
}
