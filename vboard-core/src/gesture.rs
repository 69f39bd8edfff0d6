/// Finger-state classification from hand landmarks
use nalgebra::{Point2, Vector2};
use std::fmt;

use crate::error::{BoardError, Result};

/// A tracked hand point in image pixel coordinates
pub type Landmark = Point2<i32>;

/// Number of points in one hand from the landmark detector
pub const HAND_LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_JOINT: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_JOINT: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_JOINT: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_JOINT: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_JOINT: usize = 18;
pub const PINKY_TIP: usize = 20;

/// Fingertips of index through pinky; each middle joint sits two indices below
const FINGER_TIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Landmarks of one detected hand, checked to hold a full hand topology
#[derive(Debug, Clone, PartialEq)]
pub struct HandFrame {
    points: Vec<Landmark>,
}

impl HandFrame {
    pub fn new(points: Vec<Landmark>) -> Result<Self> {
        if points.len() < HAND_LANDMARK_COUNT {
            return Err(BoardError::InsufficientLandmarks {
                expected: HAND_LANDMARK_COUNT,
                actual: points.len(),
            });
        }
        Ok(Self { points })
    }

    pub fn from_slice(points: &[Landmark]) -> Result<Self> {
        Self::new(points.to_vec())
    }

    /// Landmark by detector index, `None` past the 21 hand points
    pub fn point(&self, index: usize) -> Option<Landmark> {
        self.points().get(index).copied()
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points[..HAND_LANDMARK_COUNT]
    }

    pub fn wrist(&self) -> Landmark {
        self.points[WRIST]
    }

    pub fn thumb_tip(&self) -> Landmark {
        self.points[THUMB_TIP]
    }

    pub fn index_tip(&self) -> Landmark {
        self.points[INDEX_TIP]
    }

    pub fn middle_tip(&self) -> Landmark {
        self.points[MIDDLE_TIP]
    }

    /// Distance between thumb tip and index tip
    pub fn pinch_distance(&self) -> f64 {
        pinch_distance(self.thumb_tip(), self.index_tip())
    }

    /// Tilt proxy from the wrist towards the middle fingertip
    pub fn tilt(&self) -> Vector2<f64> {
        tilt(self.wrist(), self.middle_tip())
    }
}

/// Extended/folded flag per finger, ordered thumb, index, middle, ring, pinky
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GestureVector(pub [bool; 5]);

impl GestureVector {
    pub const OPEN_HAND: GestureVector = GestureVector([true; 5]);
    pub const FIST: GestureVector = GestureVector([false; 5]);

    pub fn new(flags: [bool; 5]) -> Self {
        Self(flags)
    }

    /// Build from 0/1 flags, any non-zero counts as extended
    pub fn from_bits(bits: [u8; 5]) -> Self {
        Self(bits.map(|bit| bit != 0))
    }

    pub fn thumb(&self) -> bool {
        self.0[0]
    }

    pub fn index(&self) -> bool {
        self.0[1]
    }

    pub fn middle(&self) -> bool {
        self.0[2]
    }

    pub fn ring(&self) -> bool {
        self.0[3]
    }

    pub fn pinky(&self) -> bool {
        self.0[4]
    }

    pub fn all_up(&self) -> bool {
        self.0.iter().all(|&up| up)
    }

    pub fn all_down(&self) -> bool {
        self.0.iter().all(|&up| !up)
    }

    pub fn count_up(&self) -> usize {
        self.0.iter().filter(|&&up| up).count()
    }
}

impl fmt::Display for GestureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, &up) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", u8::from(up))?;
        }
        write!(f, "]")
    }
}

/// Decide which fingers are extended.
///
/// The thumb counts as up when its tip is right of its joint, which holds
/// for a right hand in a mirrored camera image. It misreads other hand
/// orientations; that is a known limitation of the heuristic. The other
/// fingers are up when the tip is above (smaller y than) the middle joint.
pub fn classify(hand: &HandFrame) -> GestureVector {
    let mut flags = [false; 5];
    let points = hand.points();
    flags[0] = points[THUMB_TIP].x > points[THUMB_JOINT].x;
    for (flag, tip) in flags[1..].iter_mut().zip(FINGER_TIPS) {
        *flag = points[tip].y < points[tip - 2].y;
    }
    GestureVector(flags)
}

/// Validate raw landmarks and classify them
pub fn classify_landmarks(points: &[Landmark]) -> Result<GestureVector> {
    Ok(classify(&HandFrame::from_slice(points)?))
}

/// Euclidean distance between two landmarks
pub fn pinch_distance(a: Landmark, b: Landmark) -> f64 {
    let dx = f64::from(a.x) - f64::from(b.x);
    let dy = f64::from(a.y) - f64::from(b.y);
    dx.hypot(dy)
}

/// Coarse hand tilt: `x` follows vertical wrist-to-tip offset and drives
/// rotation about the x axis, `y` follows the horizontal offset. Both are
/// scaled down by 100 pixels.
pub fn tilt(wrist: Landmark, fingertip: Landmark) -> Vector2<f64> {
    Vector2::new(
        (f64::from(wrist.y) - f64::from(fingertip.y)) / 100.0,
        (f64::from(wrist.x) - f64::from(fingertip.x)) / 100.0,
    )
}
