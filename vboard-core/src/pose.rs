/// Synthetic hand landmarks for a requested finger pose.
///
/// Produces a full 21-point hand that classifies back to the requested
/// gesture, with the index tip, pinch distance and wrist tilt under direct
/// control. Drives the keyboard hand in the terminal front end and the
/// scenario tests.
use nalgebra::{Point2, Vector2};

use crate::gesture::{
    GestureVector, Landmark, HAND_LANDMARK_COUNT, INDEX_TIP, MIDDLE_TIP, PINKY_TIP, RING_TIP,
    THUMB_JOINT, THUMB_TIP, WRIST,
};

/// Vertical gap between a fingertip and its middle joint
const JOINT_GAP: i32 = 40;
const THUMB_GAP: i32 = 20;

/// Fingertip offsets from the index tip for index, middle, ring, pinky
const TIP_OFFSETS: [(i32, i32); 4] = [(0, 0), (30, 0), (60, 10), (90, 20)];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPose {
    pub index_tip: Landmark,
    pub fingers: GestureVector,
    /// Thumb tip to index tip distance in pixels
    pub pinch: i32,
    /// Wrist position relative to the middle fingertip
    pub wrist_offset: Vector2<i32>,
}

impl HandPose {
    pub fn new(index_tip: Landmark, fingers: GestureVector) -> Self {
        Self {
            index_tip,
            fingers,
            pinch: 60,
            wrist_offset: Vector2::new(0, 200),
        }
    }

    pub fn with_pinch(mut self, pinch: i32) -> Self {
        self.pinch = pinch.max(0);
        self
    }

    pub fn with_wrist_offset(mut self, dx: i32, dy: i32) -> Self {
        self.wrist_offset = Vector2::new(dx, dy);
        self
    }

    pub fn landmarks(&self) -> Vec<Landmark> {
        let mut points = vec![self.index_tip; HAND_LANDMARK_COUNT];

        let tips = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
        for (finger, (&tip, offset)) in tips.iter().zip(TIP_OFFSETS).enumerate() {
            let tip_point = self.index_tip + Vector2::new(offset.0, offset.1);
            let up = self.fingers.0[finger + 1];
            let joint = if up {
                tip_point + Vector2::new(0, JOINT_GAP)
            } else {
                tip_point - Vector2::new(0, JOINT_GAP)
            };
            points[tip] = tip_point;
            points[tip - 2] = joint;
        }

        let thumb_tip = self.index_tip - Vector2::new(self.pinch, 0);
        let thumb_joint = if self.fingers.thumb() {
            thumb_tip - Vector2::new(THUMB_GAP, 0)
        } else {
            thumb_tip + Vector2::new(THUMB_GAP, 0)
        };
        points[THUMB_TIP] = thumb_tip;
        points[THUMB_JOINT] = thumb_joint;

        let wrist = points[MIDDLE_TIP] + self.wrist_offset;
        points[WRIST] = wrist;

        // Remaining knuckles only need plausible positions
        points[1] = lerp(wrist, thumb_joint, 1, 3);
        points[2] = lerp(wrist, thumb_joint, 2, 3);
        for tip in tips {
            points[tip - 3] = lerp(wrist, points[tip - 2], 1, 2);
            points[tip - 1] = lerp(points[tip - 2], points[tip], 1, 2);
        }

        points
    }
}

fn lerp(a: Landmark, b: Landmark, num: i32, den: i32) -> Landmark {
    Point2::new(a.x + (b.x - a.x) * num / den, a.y + (b.y - a.y) * num / den)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{classify_landmarks, pinch_distance};

    #[test]
    fn test_every_pose_round_trips() {
        for bits in 0u8..32 {
            let fingers = GestureVector::new(std::array::from_fn(|i| bits & (1 << i) != 0));
            let points = HandPose::new(Point2::new(640, 360), fingers).landmarks();
            assert_eq!(points.len(), HAND_LANDMARK_COUNT);
            assert_eq!(classify_landmarks(&points).unwrap(), fingers, "bits {bits:05b}");
        }
    }

    #[test]
    fn test_controls_land_where_requested() {
        let pose = HandPose::new(Point2::new(400, 300), GestureVector::OPEN_HAND)
            .with_pinch(40)
            .with_wrist_offset(-50, 150);
        let points = pose.landmarks();

        assert_eq!(points[INDEX_TIP], Point2::new(400, 300));
        assert_eq!(pinch_distance(points[THUMB_TIP], points[INDEX_TIP]), 40.0);
        assert_eq!(points[WRIST] - points[MIDDLE_TIP], Vector2::new(-50, 150));
    }
}
