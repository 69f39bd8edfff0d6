/// Perspective projection from the shape frame onto the screen
use nalgebra::{Point2, Vector3};

/// Default distance from the eye to the screen plane, in pixels
pub const DEFAULT_VIEW_DISTANCE: f64 = 500.0;

/// Smallest allowed `view_distance + z`, as a fraction of the view distance.
/// Caps the magnification of points close to the eye at 1000x.
pub const MIN_DEPTH_FRACTION: f64 = 1e-3;

/// Simple pinhole projection anchored at a shape's screen position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub view_distance: f64,
}

impl Projection {
    pub fn new(view_distance: f64) -> Self {
        Self { view_distance }
    }

    /// Clamp depth so the projection denominator stays positive
    pub fn clamp_depth(&self, z: f64) -> f64 {
        let floor = -self.view_distance + self.view_distance.abs() * MIN_DEPTH_FRACTION;
        z.max(floor)
    }

    /// Scale factor applied to x and y for a point at depth `z`
    pub fn factor(&self, z: f64) -> f64 {
        let z = self.clamp_depth(z);
        self.view_distance / (self.view_distance + z)
    }

    /// Project a transformed vertex to integer screen coordinates
    pub fn project(&self, point: &Vector3<f64>, anchor: &Point2<f64>) -> Point2<i32> {
        if !point.iter().all(|c| c.is_finite()) {
            return Point2::new(anchor.x.round() as i32, anchor.y.round() as i32);
        }

        let factor = self.factor(point.z);
        let x = point.x * factor + anchor.x;
        let y = point.y * factor + anchor.y;

        Point2::new(x.round() as i32, y.round() as i32)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(DEFAULT_VIEW_DISTANCE)
    }
}
