/// Gesture driven interaction state machine.
///
/// One call to [`InteractionMachine::step`] consumes one frame of hand
/// landmarks, decides the mode for that frame and applies its effects to the
/// interaction state, the placed shapes and the stroke canvas.
use nalgebra::Vector3;
use std::fmt;

use crate::config::BoardConfig;
use crate::error::Result;
use crate::geometry::ShapeKind;
use crate::gesture::{classify, GestureVector, HandFrame, Landmark};
use crate::projection::Projection;
use crate::shape::{PlacedShapes, ShapeInstance};
use crate::surface::{Color, RasterSurface, StrokeSegment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Idle,
    Draw,
    Select,
    ShapeEdit,
    Place,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Draw => "draw",
            Mode::Select => "select",
            Mode::ShapeEdit => "shape-edit",
            Mode::Place => "place",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-session interaction state, threaded through every frame
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionState {
    pub mode: Mode,
    pub active_shape: Option<ShapeInstance>,
    /// Start of the next stroke segment; only valid while the hand stays tracked
    pub last_draw_point: Option<Landmark>,
    pub current_shape: ShapeKind,
    pub current_color: Color,
    pub current_size: f64,
}

impl InteractionState {
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            mode: Mode::Idle,
            active_shape: None,
            last_draw_point: None,
            current_shape: config.default_shape,
            current_color: config.default_color,
            current_size: config.default_size,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.mode == Mode::ShapeEdit
    }

    /// The shape being manipulated, if shape editing is active
    pub fn editing_shape(&self) -> Option<&ShapeInstance> {
        if self.is_editing() {
            self.active_shape.as_ref()
        } else {
            None
        }
    }
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::new(&BoardConfig::default())
    }
}

/// What a single frame did, for logging and the front end's status line
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameReport {
    pub mode: Mode,
    /// `None` when no hand was detected
    pub gesture: Option<GestureVector>,
    pub strokes: Vec<StrokeSegment>,
    pub placed: bool,
    pub cleared: bool,
    pub color_pick: Option<Color>,
    pub shape_pick: Option<ShapeKind>,
}

/// Stateless decision logic; all mutable state is passed in by the caller
#[derive(Debug, Clone, Default)]
pub struct InteractionMachine {
    config: BoardConfig,
}

impl InteractionMachine {
    pub fn new(config: BoardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn projection(&self) -> Projection {
        Projection::new(self.config.view_distance)
    }

    /// Fresh state seeded from this machine's configuration
    pub fn initial_state(&self) -> InteractionState {
        InteractionState::new(&self.config)
    }

    /// Process one frame.
    ///
    /// `landmarks` is `None` when no hand was detected. Landmark sets that are
    /// too short are rejected before anything is mutated.
    pub fn step(
        &self,
        state: &mut InteractionState,
        placed: &mut PlacedShapes,
        landmarks: Option<&[Landmark]>,
        canvas: &mut dyn RasterSurface,
    ) -> Result<FrameReport> {
        let Some(points) = landmarks else {
            // Tracking lost: the next stroke must not connect across the gap
            state.last_draw_point = None;
            return Ok(FrameReport {
                mode: state.mode,
                ..FrameReport::default()
            });
        };

        let hand = HandFrame::from_slice(points)?;
        Ok(self.step_hand(state, placed, &hand, canvas))
    }

    /// Process one frame with an already validated hand
    pub fn step_hand(
        &self,
        state: &mut InteractionState,
        placed: &mut PlacedShapes,
        hand: &HandFrame,
        canvas: &mut dyn RasterSurface,
    ) -> FrameReport {
        let fingers = classify(hand);
        let mut report = FrameReport {
            gesture: Some(fingers),
            ..FrameReport::default()
        };

        // Place is transient: reported for the frame, the state returns to idle
        let mut frame_mode = None;

        if fingers.index() && fingers.middle() && fingers.ring() && !fingers.pinky() {
            self.edit_shape(state, hand, &mut report);
        } else if fingers.all_down() {
            self.place_shape(state, placed, &mut report);
            frame_mode = Some(Mode::Place);
        } else if fingers.index() && fingers.middle() && !fingers.ring() {
            self.select(state, hand, &mut report);
        } else if fingers.index() && !fingers.middle() && !state.is_editing() {
            self.draw(state, hand, canvas, &mut report);
        }

        // Checked on its own so it wins over anything decided above
        if fingers.all_up() {
            canvas.clear();
            placed.clear();
            state.active_shape = None;
            state.last_draw_point = None;
            state.mode = Mode::Idle;
            report.cleared = true;
            log::info!("board cleared");
        }

        report.mode = frame_mode.unwrap_or(state.mode);
        log::debug!("gesture {} -> {}", fingers, report.mode);
        report
    }

    fn edit_shape(&self, state: &mut InteractionState, hand: &HandFrame, report: &mut FrameReport) {
        let tip = hand.index_tip();
        state.mode = Mode::ShapeEdit;
        state.current_size = self.config.clamp_size(2.0 * hand.pinch_distance());

        let toolbar_kind = self.config.toolbar_at(tip.x, tip.y).map(|zone| zone.kind);
        if let Some(kind) = toolbar_kind {
            if kind != state.current_shape {
                log::info!("selected shape {kind}");
            }
            state.current_shape = kind;
            report.shape_pick = Some(kind);
        }

        let tip_position = Vector3::new(f64::from(tip.x), f64::from(tip.y), 0.0);
        match state.active_shape.as_mut() {
            Some(shape) if toolbar_kind.is_some() => shape.set_kind(state.current_shape),
            Some(shape) => shape.move_to(tip_position.x, tip_position.y),
            None => {
                let shape =
                    ShapeInstance::new(state.current_shape, tip_position, state.current_size)
                        .with_color(state.current_color);
                state.active_shape = Some(shape);
            }
        }

        let size = state.current_size;
        let tilt = hand.tilt() * self.config.rotation_speed;
        if let Some(shape) = state.active_shape.as_mut() {
            shape.set_size(size);
            shape.rotate(tilt.x, tilt.y, 0.0);
        }
    }

    fn place_shape(
        &self,
        state: &mut InteractionState,
        placed: &mut PlacedShapes,
        report: &mut FrameReport,
    ) {
        if state.is_editing() {
            if let Some(shape) = state.active_shape.as_ref() {
                let snapshot = shape.clone().with_color(state.current_color);
                log::info!(
                    "placed {} at ({:.0}, {:.0}) size {:.0}",
                    snapshot.kind,
                    snapshot.position.x,
                    snapshot.position.y,
                    snapshot.size()
                );
                placed.push(snapshot);
                report.placed = true;
            }
        }
        state.active_shape = None;
        state.mode = Mode::Idle;
    }

    fn select(&self, state: &mut InteractionState, hand: &HandFrame, report: &mut FrameReport) {
        state.mode = Mode::Select;
        state.active_shape = None;
        state.last_draw_point = None;

        let tip = hand.index_tip();
        if let Some(zone) = self.config.palette_at(tip.x, tip.y) {
            if zone.color != state.current_color {
                log::info!("selected {}", zone.label.as_str());
            }
            state.current_color = zone.color;
            report.color_pick = Some(zone.color);
        }
    }

    fn draw(
        &self,
        state: &mut InteractionState,
        hand: &HandFrame,
        canvas: &mut dyn RasterSurface,
        report: &mut FrameReport,
    ) {
        state.mode = Mode::Draw;
        let tip = hand.index_tip();

        if let Some(from) = state.last_draw_point {
            let segment = StrokeSegment {
                from,
                to: tip,
                color: state.current_color,
                thickness: self.brush_thickness(state.current_color),
            };
            canvas.draw_segment(&segment);
            report.strokes.push(segment);
        }
        state.last_draw_point = Some(tip);
    }

    fn brush_thickness(&self, color: Color) -> u32 {
        if color.is_eraser() {
            self.config.eraser_thickness
        } else {
            self.config.brush_thickness
        }
    }

    /// Draw placed shapes in their own colors, then the shape being edited in
    /// the highlight color on top
    pub fn render_overlay(
        &self,
        state: &InteractionState,
        placed: &PlacedShapes,
        surface: &mut dyn RasterSurface,
    ) {
        let projection = self.projection();
        placed.render_all(surface, self.config.shape_thickness, &projection);
        if let Some(shape) = state.editing_shape() {
            shape.render(
                surface,
                self.config.highlight_color,
                self.config.shape_thickness,
                &projection,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::HandPose;
    use crate::surface::LineRecorder;
    use nalgebra::Point2;

    struct Harness {
        machine: InteractionMachine,
        state: InteractionState,
        placed: PlacedShapes,
        canvas: LineRecorder,
    }

    impl Harness {
        fn new() -> Self {
            let machine = InteractionMachine::default();
            let state = machine.initial_state();
            Self {
                machine,
                state,
                placed: PlacedShapes::new(),
                canvas: LineRecorder::new(),
            }
        }

        fn feed(&mut self, pose: HandPose) -> FrameReport {
            let points = pose.landmarks();
            self.machine
                .step(&mut self.state, &mut self.placed, Some(&points), &mut self.canvas)
                .unwrap()
        }

        fn lose_hand(&mut self) -> FrameReport {
            self.machine
                .step(&mut self.state, &mut self.placed, None, &mut self.canvas)
                .unwrap()
        }
    }

    fn pose(x: i32, y: i32, bits: [u8; 5]) -> HandPose {
        HandPose::new(Point2::new(x, y), GestureVector::from_bits(bits))
    }

    const DRAW: [u8; 5] = [0, 1, 0, 0, 0];
    const SELECT: [u8; 5] = [0, 1, 1, 0, 0];
    const EDIT: [u8; 5] = [0, 1, 1, 1, 0];
    const FIST: [u8; 5] = [0, 0, 0, 0, 0];
    const OPEN: [u8; 5] = [1, 1, 1, 1, 1];

    #[test]
    fn test_edit_with_extreme_wrist_does_not_panic() {
        let mut h = Harness::new();
        let mut points = pose(400, -100, EDIT).landmarks();
        points[crate::gesture::WRIST] = Point2::new(400, i32::MAX);

        let report = h
            .machine
            .step(&mut h.state, &mut h.placed, Some(&points), &mut h.canvas)
            .unwrap();
        assert_eq!(report.mode, Mode::ShapeEdit);

        let shape = h.state.active_shape.as_ref().unwrap();
        assert!(shape.rotation.iter().all(|angle| angle.is_finite()));
        h.machine.render_overlay(&h.state, &h.placed, &mut h.canvas);
        assert!(!h.canvas.lines.is_empty());
    }

    #[test]
    fn test_first_draw_frame_only_sets_start() {
        let mut h = Harness::new();
        let report = h.feed(pose(400, 300, DRAW));
        assert_eq!(report.mode, Mode::Draw);
        assert!(report.strokes.is_empty());
        assert_eq!(h.state.last_draw_point, Some(Point2::new(400, 300)));
    }

    #[test]
    fn test_eraser_uses_wide_brush() {
        let mut h = Harness::new();
        h.feed(pose(1200, 50, SELECT));
        assert_eq!(h.state.current_color, Color::ERASER);

        h.feed(pose(400, 300, DRAW));
        let report = h.feed(pose(420, 300, DRAW));
        assert_eq!(report.strokes[0].thickness, 50);
        assert_eq!(report.strokes[0].color, Color::ERASER);
    }

    #[test]
    fn test_select_outside_header_keeps_color() {
        let mut h = Harness::new();
        let report = h.feed(pose(300, 400, SELECT));
        assert_eq!(report.mode, Mode::Select);
        assert_eq!(report.color_pick, None);
        assert_eq!(h.state.current_color, Color::PINK);
    }

    #[test]
    fn test_select_clears_stroke_and_shape() {
        let mut h = Harness::new();
        h.feed(pose(400, 300, DRAW));
        h.feed(pose(600, 60, SELECT));
        assert_eq!(h.state.current_color, Color::GREEN);
        assert_eq!(h.state.last_draw_point, None);

        h.feed(pose(400, 300, EDIT));
        assert!(h.state.active_shape.is_some());
        h.feed(pose(400, 300, SELECT));
        assert!(h.state.active_shape.is_none());
    }

    #[test]
    fn test_index_only_does_not_draw_while_editing() {
        let mut h = Harness::new();
        h.feed(pose(400, 300, EDIT));
        let report = h.feed(pose(420, 300, DRAW));
        assert_eq!(report.mode, Mode::ShapeEdit);
        assert!(h.canvas.lines.is_empty());
        assert_eq!(h.state.last_draw_point, None);
    }

    #[test]
    fn test_edit_moves_active_shape() {
        let mut h = Harness::new();
        h.feed(pose(400, 300, EDIT));
        h.feed(pose(500, 350, EDIT));
        let shape = h.state.active_shape.as_ref().unwrap();
        assert_eq!(shape.position, Vector3::new(500.0, 350.0, 0.0));
        assert_eq!(shape.kind, ShapeKind::Cube);
    }

    #[test]
    fn test_toolbar_switches_kind_without_moving() {
        let mut h = Harness::new();
        h.feed(pose(400, 300, EDIT));
        let report = h.feed(pose(600, 650, EDIT));
        assert_eq!(report.shape_pick, Some(ShapeKind::Sphere));
        assert_eq!(h.state.current_shape, ShapeKind::Sphere);

        let shape = h.state.active_shape.as_ref().unwrap();
        assert_eq!(shape.kind, ShapeKind::Sphere);
        assert_eq!(shape.position, Vector3::new(400.0, 300.0, 0.0));
    }

    #[test]
    fn test_fist_outside_edit_places_nothing() {
        let mut h = Harness::new();
        h.feed(pose(400, 300, DRAW));
        let report = h.feed(pose(400, 300, FIST));
        assert!(!report.placed);
        assert_eq!(report.mode, Mode::Place);
        assert_eq!(h.state.mode, Mode::Idle);
        assert!(h.placed.is_empty());
    }

    #[test]
    fn test_placed_shape_takes_current_color() {
        let mut h = Harness::new();
        h.feed(pose(850, 60, SELECT));
        h.feed(pose(400, 300, EDIT));
        let report = h.feed(pose(400, 300, FIST));
        assert!(report.placed);
        assert_eq!(h.placed.len(), 1);
        assert_eq!(h.placed.as_slice()[0].color, Color::RED);
        assert!(h.state.active_shape.is_none());
        assert_eq!(h.state.mode, Mode::Idle);
    }

    #[test]
    fn test_unmatched_gesture_changes_nothing() {
        let mut h = Harness::new();
        h.feed(pose(400, 300, DRAW));
        let before = h.state.clone();
        let report = h.feed(pose(450, 300, [1, 0, 0, 0, 1]));
        assert_eq!(h.state, before);
        assert_eq!(report.mode, Mode::Draw);
        assert!(report.strokes.is_empty());
    }

    #[test]
    fn test_lost_hand_keeps_mode() {
        let mut h = Harness::new();
        h.feed(pose(400, 300, EDIT));
        let report = h.lose_hand();
        assert_eq!(report.mode, Mode::ShapeEdit);
        assert_eq!(report.gesture, None);
        assert!(h.state.active_shape.is_some());
    }

    #[test]
    fn test_overlay_highlights_only_while_editing() {
        let mut h = Harness::new();
        h.feed(pose(400, 300, EDIT));
        h.feed(pose(400, 300, FIST));
        h.feed(pose(700, 300, EDIT));

        let mut surface = LineRecorder::new();
        h.machine.render_overlay(&h.state, &h.placed, &mut surface);
        assert_eq!(surface.lines.len(), 24);
        assert!(surface.lines[12..].iter().all(|l| l.color == Color::WHITE));

        h.feed(pose(700, 300, SELECT));
        let mut surface = LineRecorder::new();
        h.machine.render_overlay(&h.state, &h.placed, &mut surface);
        assert_eq!(surface.lines.len(), 12);
    }

    #[test]
    fn test_open_hand_overrides_everything() {
        let mut h = Harness::new();
        h.feed(pose(400, 300, DRAW));
        h.feed(pose(410, 300, DRAW));
        let report = h.feed(pose(400, 300, OPEN));
        assert!(report.cleared);
        assert_eq!(report.mode, Mode::Idle);
        assert!(h.canvas.lines.is_empty());
        assert_eq!(h.canvas.clears, 1);
        assert_eq!(h.state.last_draw_point, None);
    }
}
