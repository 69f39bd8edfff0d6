/// VBoard Core Library - Wireframe shapes and gesture interaction
///
/// This library holds the frame-synchronous core of the board: shape
/// templates, the transform and projection pipeline, finger classification
/// and the interaction state machine. Camera capture, landmark detection and
/// pixel rasterization stay with the caller.

pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod interaction;
pub mod pose;
pub mod projection;
pub mod shape;
pub mod surface;
pub mod transform;

// Re-export commonly used types
pub use config::{BoardConfig, ColorZone, ShapeZone, XRange, ZoneLabel};
pub use error::{BoardError, Result};
pub use geometry::{ShapeGeometry, ShapeKind};
pub use gesture::{classify, classify_landmarks, GestureVector, HandFrame, Landmark};
pub use interaction::{FrameReport, InteractionMachine, InteractionState, Mode};
pub use pose::HandPose;
pub use projection::Projection;
pub use shape::{PlacedShapes, ShapeInstance};
pub use surface::{Color, LineRecorder, RasterSurface, StrokeSegment};
pub use transform::{Axis, Transform};
