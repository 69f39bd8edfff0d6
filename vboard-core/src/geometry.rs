/// Wireframe topology for the selectable shape kinds
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::BoardError;

/// Ring resolution used for the shared sphere and cylinder templates
pub const DEFAULT_SEGMENTS: usize = 12;

/// The fixed set of shapes a user can pick from the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Cube,
    Sphere,
    Pyramid,
    Cylinder,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Cube,
        ShapeKind::Sphere,
        ShapeKind::Pyramid,
        ShapeKind::Cylinder,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Cube => "cube",
            ShapeKind::Sphere => "sphere",
            ShapeKind::Pyramid => "pyramid",
            ShapeKind::Cylinder => "cylinder",
        }
    }

    /// Shared template for this kind. Built on first use and never mutated.
    pub fn geometry(self) -> &'static ShapeGeometry {
        static CUBE: OnceLock<ShapeGeometry> = OnceLock::new();
        static SPHERE: OnceLock<ShapeGeometry> = OnceLock::new();
        static PYRAMID: OnceLock<ShapeGeometry> = OnceLock::new();
        static CYLINDER: OnceLock<ShapeGeometry> = OnceLock::new();

        match self {
            ShapeKind::Cube => CUBE.get_or_init(ShapeGeometry::cube),
            ShapeKind::Sphere => SPHERE.get_or_init(|| ShapeGeometry::sphere(DEFAULT_SEGMENTS)),
            ShapeKind::Pyramid => PYRAMID.get_or_init(ShapeGeometry::pyramid),
            ShapeKind::Cylinder => {
                CYLINDER.get_or_init(|| ShapeGeometry::cylinder(DEFAULT_SEGMENTS))
            }
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ShapeKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| BoardError::UnknownShape(wanted.to_string()))
    }
}

/// An undirected edge as a pair of indices into the vertex list
pub type Edge = (usize, usize);

/// Vertices in the unit frame (coordinates within [-0.5, 0.5]) and the
/// edges joining them.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeGeometry {
    pub vertices: Vec<Vector3<f64>>,
    pub edges: Vec<Edge>,
}

impl ShapeGeometry {
    pub fn cube() -> Self {
        let vertices = vec![
            Vector3::new(-0.5, -0.5, -0.5),
            Vector3::new(0.5, -0.5, -0.5),
            Vector3::new(0.5, 0.5, -0.5),
            Vector3::new(-0.5, 0.5, -0.5),
            Vector3::new(-0.5, -0.5, 0.5),
            Vector3::new(0.5, -0.5, 0.5),
            Vector3::new(0.5, 0.5, 0.5),
            Vector3::new(-0.5, 0.5, 0.5),
        ];

        let edges = vec![
            // Back face
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            // Front face
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 4),
            // Connecting
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
        ];

        Self { vertices, edges }
    }

    /// Apex on top (negative y is up on screen) over a square base.
    pub fn pyramid() -> Self {
        let vertices = vec![
            Vector3::new(0.0, -0.5, 0.0),
            Vector3::new(-0.5, 0.5, -0.5),
            Vector3::new(0.5, 0.5, -0.5),
            Vector3::new(0.5, 0.5, 0.5),
            Vector3::new(-0.5, 0.5, 0.5),
        ];

        let edges = vec![
            (0, 1),
            (0, 2),
            (0, 3),
            (0, 4),
            (1, 2),
            (2, 3),
            (3, 4),
            (4, 1),
        ];

        Self { vertices, edges }
    }

    /// Latitude/longitude wireframe on a `segments` x `segments` grid.
    ///
    /// Theta runs over [0, pi) so the last ring stops short of the far pole,
    /// and that ring has no theta edges.
    pub fn sphere(segments: usize) -> Self {
        let n = segments.max(1);
        let mut vertices = Vec::with_capacity(n * n);
        let mut edges = Vec::with_capacity(2 * n * n);

        for i in 0..n {
            let theta = i as f64 / n as f64 * PI;
            for j in 0..n {
                let phi = j as f64 / n as f64 * 2.0 * PI;
                vertices.push(Vector3::new(
                    0.5 * theta.sin() * phi.cos(),
                    0.5 * theta.sin() * phi.sin(),
                    0.5 * theta.cos(),
                ));
            }
        }

        for i in 0..n {
            for j in 0..n {
                let current = i * n + j;
                if i < n - 1 {
                    edges.push((current, (i + 1) * n + j));
                }
                edges.push((current, i * n + (j + 1) % n));
            }
        }

        Self { vertices, edges }
    }

    /// Two `segments`-gon rings in the XZ plane joined by vertical edges.
    pub fn cylinder(segments: usize) -> Self {
        let n = segments.max(1);
        let mut vertices = Vec::with_capacity(2 * n);
        let mut edges = Vec::with_capacity(3 * n);

        for y in [-0.5, 0.5] {
            for j in 0..n {
                let phi = j as f64 / n as f64 * 2.0 * PI;
                vertices.push(Vector3::new(0.5 * phi.cos(), y, 0.5 * phi.sin()));
            }
        }

        for j in 0..n {
            let next = (j + 1) % n;
            edges.push((j, next));
            edges.push((n + j, n + next));
            edges.push((j, n + j));
        }

        Self { vertices, edges }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// True when every edge refers to an existing vertex
    pub fn is_well_formed(&self) -> bool {
        let count = self.vertices.len();
        self.edges.iter().all(|&(a, b)| a < count && b < count)
    }
}
