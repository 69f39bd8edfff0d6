/// Keyboard-controlled stand-in for the camera hand tracker
use crossterm::event::KeyCode;
use nalgebra::Point2;
use vboard_core::{GestureVector, HandPose, Landmark};

/// Pixels moved per arrow key press
const MOVE_STEP: i32 = 20;
const PINCH_STEP: i32 = 10;
const TILT_STEP: i32 = 20;

pub const DRAW_POSE: [u8; 5] = [0, 1, 0, 0, 0];
pub const SELECT_POSE: [u8; 5] = [0, 1, 1, 0, 0];
pub const EDIT_POSE: [u8; 5] = [0, 1, 1, 1, 0];
pub const FIST_POSE: [u8; 5] = [0, 0, 0, 0, 0];
pub const OPEN_POSE: [u8; 5] = [1, 1, 1, 1, 1];

/// A synthetic hand steered from the keyboard
#[derive(Debug, Clone)]
pub struct KeyboardHand {
    pose: HandPose,
    present: bool,
    frame_width: i32,
    frame_height: i32,
}

impl KeyboardHand {
    /// Starts centered in the hover (select) pose so nothing is drawn yet
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        let frame_width = frame_width as i32;
        let frame_height = frame_height as i32;
        let center = Point2::new(frame_width / 2, frame_height / 2);
        Self {
            pose: HandPose::new(center, GestureVector::from_bits(SELECT_POSE)),
            present: true,
            frame_width,
            frame_height,
        }
    }

    pub fn pose(&self) -> &HandPose {
        &self.pose
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    /// Apply a key press. Returns false when the key is not a hand control.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Left | KeyCode::Char('a') => self.nudge(-MOVE_STEP, 0),
            KeyCode::Right | KeyCode::Char('d') => self.nudge(MOVE_STEP, 0),
            KeyCode::Up | KeyCode::Char('w') => self.nudge(0, -MOVE_STEP),
            KeyCode::Down | KeyCode::Char('s') => self.nudge(0, MOVE_STEP),
            KeyCode::Char('1') => self.set_fingers(DRAW_POSE),
            KeyCode::Char('2') => self.set_fingers(SELECT_POSE),
            KeyCode::Char('3') => self.set_fingers(EDIT_POSE),
            KeyCode::Char('0') => self.set_fingers(FIST_POSE),
            KeyCode::Char('5') => self.set_fingers(OPEN_POSE),
            KeyCode::Char('[') => self.pose = self.pose.with_pinch(self.pose.pinch - PINCH_STEP),
            KeyCode::Char(']') => self.pose = self.pose.with_pinch(self.pose.pinch + PINCH_STEP),
            KeyCode::Char('i') => self.tilt(0, -TILT_STEP),
            KeyCode::Char('k') => self.tilt(0, TILT_STEP),
            KeyCode::Char('j') => self.tilt(-TILT_STEP, 0),
            KeyCode::Char('l') => self.tilt(TILT_STEP, 0),
            KeyCode::Char('h') => self.present = !self.present,
            _ => return false,
        }
        true
    }

    /// Landmarks for the current frame, or `None` while the hand is hidden
    pub fn landmarks(&self) -> Option<Vec<Landmark>> {
        self.present.then(|| self.pose.landmarks())
    }

    fn nudge(&mut self, dx: i32, dy: i32) {
        let tip = self.pose.index_tip;
        self.pose.index_tip = Point2::new(
            (tip.x + dx).clamp(0, self.frame_width - 1),
            (tip.y + dy).clamp(0, self.frame_height - 1),
        );
    }

    fn set_fingers(&mut self, bits: [u8; 5]) {
        self.pose.fingers = GestureVector::from_bits(bits);
    }

    fn tilt(&mut self, dx: i32, dy: i32) {
        let offset = self.pose.wrist_offset;
        self.pose = self.pose.with_wrist_offset(offset.x + dx, offset.y + dy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vboard_core::classify_landmarks;

    #[test]
    fn test_pose_keys_change_gesture() {
        let mut hand = KeyboardHand::new(1280, 720);
        assert!(hand.handle_key(KeyCode::Char('3')));
        let gesture = classify_landmarks(&hand.landmarks().unwrap()).unwrap();
        assert_eq!(gesture, GestureVector::from_bits(EDIT_POSE));
    }

    #[test]
    fn test_movement_is_clamped_to_frame() {
        let mut hand = KeyboardHand::new(100, 100);
        for _ in 0..10 {
            hand.handle_key(KeyCode::Left);
            hand.handle_key(KeyCode::Down);
        }
        assert_eq!(hand.pose().index_tip, Point2::new(0, 99));
    }

    #[test]
    fn test_hide_and_pinch() {
        let mut hand = KeyboardHand::new(1280, 720);
        hand.handle_key(KeyCode::Char(']'));
        assert_eq!(hand.pose().pinch, 70);
        for _ in 0..10 {
            hand.handle_key(KeyCode::Char('['));
        }
        assert_eq!(hand.pose().pinch, 0);

        hand.handle_key(KeyCode::Char('h'));
        assert!(hand.landmarks().is_none());
        assert!(!hand.handle_key(KeyCode::Char('q')));
    }
}
