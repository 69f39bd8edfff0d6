/// Rotation matrices and vertex transforms
use nalgebra::{Matrix3, Vector3};

/// Principal axis for a single-axis rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Stateless helpers for the shape transform pipeline
pub struct Transform;

impl Transform {
    /// Right-handed rotation of `angle` radians about `axis`
    pub fn rotation_matrix(axis: Axis, angle: f64) -> Matrix3<f64> {
        let (s, c) = angle.sin_cos();
        match axis {
            Axis::X => Matrix3::new(
                1.0, 0.0, 0.0, //
                0.0, c, -s, //
                0.0, s, c,
            ),
            Axis::Y => Matrix3::new(
                c, 0.0, s, //
                0.0, 1.0, 0.0, //
                -s, 0.0, c,
            ),
            Axis::Z => Matrix3::new(
                c, -s, 0.0, //
                s, c, 0.0, //
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// Combined rotation Rz * Ry * Rx. The order is fixed so that gesture
    /// driven increments on x and y always feel the same on screen.
    pub fn compose_rotation(rx: f64, ry: f64, rz: f64) -> Matrix3<f64> {
        let rx = Self::rotation_matrix(Axis::X, rx);
        let ry = Self::rotation_matrix(Axis::Y, ry);
        let rz = Self::rotation_matrix(Axis::Z, rz);

        rz * ry * rx
    }

    /// Rotation matrix for a per-axis angle vector
    pub fn rotation_from_angles(angles: &Vector3<f64>) -> Matrix3<f64> {
        Self::compose_rotation(angles.x, angles.y, angles.z)
    }

    /// Scale a unit-frame vertex uniformly, then rotate it
    pub fn transform_vertex(
        vertex: &Vector3<f64>,
        size: f64,
        rotation: &Matrix3<f64>,
    ) -> Vector3<f64> {
        rotation * (vertex * size)
    }
}
