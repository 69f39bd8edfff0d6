/// Terminal front end for the gesture board
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    terminal,
};
use nalgebra::Point2;
use std::fmt;
use std::io::{self, stdout, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use vboard_core::gesture::{INDEX_TIP, MIDDLE_TIP};
use vboard_core::{
    BoardConfig, Color, FrameReport, InteractionMachine, InteractionState, Landmark, LineRecorder,
    Mode, PlacedShapes, RasterSurface, ShapeKind,
};

pub mod error;
pub mod hand;
pub mod renderer;
pub mod replay;

pub use error::AppError;
pub use hand::KeyboardHand;
pub use renderer::{Cell, CellCanvas};
pub use replay::{Recording, ReplayError};

const STROKE_GLYPH: char = '█';
const SHAPE_GLYPH: char = '*';
const TOOLBAR_SHADE: Color = Color::rgb(90, 90, 90);
const LANDMARK_COLOR: Color = Color::rgb(0, 200, 0);

/// Where hand landmarks come from
pub enum InputSource {
    Keyboard(KeyboardHand),
    Replay { recording: Recording, cursor: usize },
}

impl InputSource {
    pub fn replay(recording: Recording) -> Self {
        InputSource::Replay {
            recording,
            cursor: 0,
        }
    }

    /// Landmarks for the next frame. A finished replay reports no hand.
    fn next_frame(&mut self) -> Option<Vec<Landmark>> {
        match self {
            InputSource::Keyboard(hand) => hand.landmarks(),
            InputSource::Replay { recording, cursor } => {
                let frame = recording.frames.get(*cursor).cloned().flatten();
                *cursor = (*cursor + 1).min(recording.len());
                frame
            }
        }
    }

    fn finished(&self) -> bool {
        match self {
            InputSource::Keyboard(_) => false,
            InputSource::Replay { recording, cursor } => *cursor >= recording.len(),
        }
    }
}

/// Main application struct for the terminal board
pub struct TerminalApp {
    machine: InteractionMachine,
    state: InteractionState,
    placed: PlacedShapes,
    /// Persistent stroke layer, only cleared by the open-hand gesture
    strokes: CellCanvas,
    frame: CellCanvas,
    source: InputSource,
    recording: Option<(PathBuf, Recording)>,
    last_hand: Option<Vec<Landmark>>,
    last_report: FrameReport,
    rejected_frames: usize,
    running: bool,
    target_fps: u32,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(
        machine: InteractionMachine,
        state: InteractionState,
        source: InputSource,
    ) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(
            machine,
            state,
            source,
            width as usize,
            height as usize,
        ))
    }

    /// Build an app for a `width` x `height` cell grid without querying
    /// the terminal
    pub fn with_size(
        machine: InteractionMachine,
        state: InteractionState,
        source: InputSource,
        width: usize,
        height: usize,
    ) -> Self {
        let config = machine.config();
        let mut strokes = CellCanvas::new(width, height, config.frame_width, config.frame_height);
        strokes.glyph = STROKE_GLYPH;
        let frame = CellCanvas::new(width, height, config.frame_width, config.frame_height);

        Self {
            machine,
            state,
            placed: PlacedShapes::new(),
            strokes,
            frame,
            source,
            recording: None,
            last_hand: None,
            last_report: FrameReport::default(),
            rejected_frames: 0,
            running: true,
            target_fps: 30,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps.max(1);
        self
    }

    /// Write every frame fed to the board to `path` when the app exits
    pub fn record_to(mut self, path: PathBuf) -> Self {
        self.recording = Some((path, Recording::default()));
        self
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        if let Some((path, recording)) = &self.recording {
            recording.save(path)?;
            log::info!("saved {} frames to {}", recording.len(), path.display());
        }

        result.map_err(AppError::from)
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / u64::from(self.target_fps));

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            self.update();
            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        if let Event::Key(KeyEvent { code, .. }) = event::read()? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                code => {
                    if let InputSource::Keyboard(hand) = &mut self.source {
                        hand.handle_key(code);
                    }
                }
            }
        }
        Ok(())
    }

    /// Feed one frame of landmarks through the board
    fn update(&mut self) {
        let landmarks = self.source.next_frame();
        if let Some((_, recording)) = self.recording.as_mut() {
            recording.push(landmarks.clone());
        }

        match self.machine.step(
            &mut self.state,
            &mut self.placed,
            landmarks.as_deref(),
            &mut self.strokes,
        ) {
            Ok(report) => self.last_report = report,
            Err(err) => {
                self.rejected_frames += 1;
                log::warn!("skipping frame: {err}");
            }
        }
        self.last_hand = landmarks;
    }

    fn render(&mut self) -> io::Result<()> {
        self.compose_frame();

        let mut stdout = stdout();
        self.frame.draw(&mut stdout)?;

        let status_row = self.frame.height().saturating_sub(1) as u16;
        let mut status = self.status_line();
        status.truncate(
            status
                .char_indices()
                .nth(self.frame.width())
                .map_or(status.len(), |(i, _)| i),
        );
        queue!(
            stdout,
            cursor::MoveTo(0, status_row),
            SetForegroundColor(TermColor::Yellow),
            Print(status),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }

    /// Layer chrome, strokes, shapes and the hand into `frame`
    fn compose_frame(&mut self) {
        self.frame.clear();

        draw_chrome_background(&mut self.frame, self.machine.config());
        self.frame.overlay(&self.strokes);

        self.frame.glyph = SHAPE_GLYPH;
        self.machine
            .render_overlay(&self.state, &self.placed, &mut self.frame);

        draw_chrome_labels(&mut self.frame, self.machine.config(), &self.state);
        self.draw_hand();
    }

    fn draw_hand(&mut self) {
        let Some(points) = self.last_hand.as_deref() else {
            return;
        };
        if points.len() <= MIDDLE_TIP {
            return;
        }

        let cursor_color = if self.state.current_color.is_eraser() {
            Color::WHITE
        } else {
            self.state.current_color
        };

        if self.last_report.mode == Mode::Select {
            let margin = 25;
            let (a, b) = (points[INDEX_TIP], points[MIDDLE_TIP]);
            let min = Point2::new(
                a.x.min(b.x).saturating_sub(margin),
                a.y.min(b.y).saturating_sub(margin),
            );
            let max = Point2::new(
                a.x.max(b.x).saturating_add(margin),
                a.y.max(b.y).saturating_add(margin),
            );
            self.frame.fill_rect(
                min,
                max,
                Cell {
                    glyph: '▒',
                    color: cursor_color,
                },
            );
        }

        for &point in points {
            let (col, row) = self.frame.to_cell(point);
            self.frame.plot(
                col,
                row,
                Cell {
                    glyph: '.',
                    color: LANDMARK_COLOR,
                },
            );
        }

        let (col, row) = self.frame.to_cell(points[INDEX_TIP]);
        self.frame.plot(
            col,
            row,
            Cell {
                glyph: '@',
                color: cursor_color,
            },
        );
    }

    fn status_line(&self) -> String {
        let gesture = self
            .last_report
            .gesture
            .map_or_else(|| "no hand".to_string(), |g| g.to_string());
        let replay_done = if self.source.finished() {
            " | replay finished"
        } else {
            ""
        };
        format!(
            " {} | {} | color {} | shape {} | size {:.0} | placed {} | skipped {} | FPS {:.1}{} | 1 draw 2 select 3 shape 0 place 5 clear [ ] pinch ijkl tilt h hide q quit",
            self.last_report.mode,
            gesture,
            color_name(self.machine.config(), self.state.current_color),
            self.state.current_shape,
            self.state.current_size,
            self.placed.len(),
            self.rejected_frames,
            self.fps,
            replay_done,
        )
    }
}

/// Apply a `--shape` argument. Unknown names are logged and the current
/// kind is kept; returns whether the kind changed.
pub fn apply_shape_arg(state: &mut InteractionState, name: &str) -> bool {
    match name.parse::<ShapeKind>() {
        Ok(kind) => {
            state.current_shape = kind;
            true
        }
        Err(err) => {
            log::warn!("{err}, keeping {}", state.current_shape);
            false
        }
    }
}

/// Palette and toolbar bands, drawn under the strokes
pub fn draw_chrome_background(frame: &mut CellCanvas, config: &BoardConfig) {
    for zone in &config.palette {
        let cell = if zone.color.is_eraser() {
            Cell {
                glyph: '░',
                color: Color::WHITE,
            }
        } else {
            Cell {
                glyph: '█',
                color: zone.color,
            }
        };
        frame.fill_rect(
            Point2::new(zone.range.min + 1, 0),
            Point2::new(zone.range.max - 1, config.header_height - 1),
            cell,
        );
    }

    let bottom = config.frame_height as i32 - 1;
    for zone in &config.toolbar {
        frame.fill_rect(
            Point2::new(zone.range.min + 1, config.toolbar_top + 1),
            Point2::new(zone.range.max - 1, bottom),
            Cell {
                glyph: '░',
                color: TOOLBAR_SHADE,
            },
        );
    }
}

/// Zone labels, with the active color and shape bracketed
pub fn draw_chrome_labels(frame: &mut CellCanvas, config: &BoardConfig, state: &InteractionState) {
    for zone in &config.palette {
        let label = zone.label.as_str();
        let text = if zone.color == state.current_color {
            format!("[{label}]")
        } else {
            label.to_string()
        };
        let center = Point2::new(
            (zone.range.min + zone.range.max) / 2,
            config.header_height / 2,
        );
        frame.put_text_centered(center, &text, Color::WHITE);
    }

    let bottom = config.frame_height as i32;
    for zone in &config.toolbar {
        let label = zone.kind.name().to_uppercase();
        let (text, color) = if zone.kind == state.current_shape {
            (format!(">{label}<"), config.highlight_color)
        } else {
            (label, Color::WHITE)
        };
        let center = Point2::new(
            (zone.range.min + zone.range.max) / 2,
            (config.toolbar_top + bottom) / 2,
        );
        frame.put_text_centered(center, &text, color);
    }
}

/// Human readable name for a draw color
pub fn color_name(config: &BoardConfig, color: Color) -> String {
    if let Some(zone) = config.palette.iter().find(|zone| zone.color == color) {
        return zone.label.as_str().to_string();
    }
    if color == Color::PINK {
        return "PINK".to_string();
    }
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

/// Totals from a replay run without a terminal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    pub frames: usize,
    pub rejected: usize,
    pub strokes: usize,
    pub placements: usize,
    pub clears: usize,
    pub shapes_on_board: usize,
    pub final_mode: Mode,
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "frames:          {}", self.frames)?;
        writeln!(f, "rejected frames: {}", self.rejected)?;
        writeln!(f, "stroke segments: {}", self.strokes)?;
        writeln!(f, "placements:      {}", self.placements)?;
        writeln!(f, "board clears:    {}", self.clears)?;
        writeln!(f, "shapes on board: {}", self.shapes_on_board)?;
        write!(f, "final mode:      {}", self.final_mode)
    }
}

/// Run a recording through the board, recording draw calls instead of
/// rasterizing them
pub fn replay_headless(
    machine: &InteractionMachine,
    state: &mut InteractionState,
    recording: &Recording,
) -> ReplaySummary {
    let mut placed = PlacedShapes::new();
    let mut canvas = LineRecorder::new();
    let mut summary = ReplaySummary::default();

    for frame in &recording.frames {
        summary.frames += 1;
        match machine.step(state, &mut placed, frame.as_deref(), &mut canvas) {
            Ok(report) => {
                summary.strokes += report.strokes.len();
                summary.placements += usize::from(report.placed);
                summary.clears += usize::from(report.cleared);
            }
            Err(err) => {
                summary.rejected += 1;
                log::warn!("frame {}: {err}", summary.frames);
            }
        }
    }

    summary.shapes_on_board = placed.len();
    summary.final_mode = state.mode;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use vboard_core::{GestureVector, HandPose};

    fn frame(x: i32, y: i32, bits: [u8; 5]) -> Option<Vec<Landmark>> {
        Some(HandPose::new(Point2::new(x, y), GestureVector::from_bits(bits)).landmarks())
    }

    #[test]
    fn test_headless_replay_summary() {
        let mut recording = Recording::default();
        for x in [400, 420, 440] {
            recording.push(frame(x, 300, hand::DRAW_POSE));
        }
        recording.push(frame(600, 300, hand::EDIT_POSE));
        recording.push(frame(600, 300, hand::FIST_POSE));
        recording.push(Some(vec![Point2::new(0, 0); 12]));
        recording.push(None);
        recording.push(frame(600, 300, hand::EDIT_POSE));
        recording.push(frame(600, 300, hand::FIST_POSE));

        let machine = InteractionMachine::default();
        let mut state = machine.initial_state();
        let summary = replay_headless(&machine, &mut state, &recording);

        assert_eq!(summary.frames, 9);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.strokes, 2);
        assert_eq!(summary.placements, 2);
        assert_eq!(summary.clears, 0);
        assert_eq!(summary.shapes_on_board, 2);
        assert_eq!(summary.final_mode, Mode::Idle);

        recording.push(frame(600, 300, hand::OPEN_POSE));
        let mut state = machine.initial_state();
        let summary = replay_headless(&machine, &mut state, &recording);
        assert_eq!(summary.clears, 1);
        assert_eq!(summary.shapes_on_board, 0);
    }

    #[test]
    fn test_replay_source_runs_out_to_no_hand() {
        let mut recording = Recording::default();
        recording.push(frame(10, 10, hand::DRAW_POSE));
        let mut source = InputSource::replay(recording);

        assert!(!source.finished());
        assert!(source.next_frame().is_some());
        assert!(source.finished());
        assert!(source.next_frame().is_none());
    }

    #[test]
    fn test_compose_frame_layers_strokes_shapes_and_chrome() {
        let mut recording = Recording::default();
        for x in [400, 500, 600] {
            recording.push(frame(x, 300, hand::DRAW_POSE));
        }
        recording.push(frame(900, 400, hand::EDIT_POSE));

        let machine = InteractionMachine::default();
        let state = machine.initial_state();
        let mut app =
            TerminalApp::with_size(machine, state, InputSource::replay(recording), 128, 72);
        for _ in 0..4 {
            app.update();
        }
        app.compose_frame();

        // Stroke along y = 300 (row 30) between columns 40 and 60
        let stroke = app.frame.get(50, 30).unwrap();
        assert_eq!(stroke.glyph, STROKE_GLYPH);
        assert_eq!(stroke.color, Color::PINK);

        // The active shape is drawn with the shape glyph in the highlight color
        let shape_cells = (0..72)
            .flat_map(|row| (0..128).map(move |col| (col, row)))
            .filter_map(|(col, row)| app.frame.get(col, row))
            .filter(|cell| cell.glyph == SHAPE_GLYPH)
            .count();
        assert!(shape_cells > 0);

        // Landmarks and the index cursor come last
        assert_eq!(app.frame.get(90, 40).map(|c| c.glyph), Some('@'));

        // Header label for the default pink color is not bracketed
        let row: String = (63..68)
            .map(|col| app.frame.get(col, 6).map_or(' ', |cell| cell.glyph))
            .collect();
        assert_eq!(row, "GREEN");

        // Composing again starts from a cleared frame
        app.last_hand = None;
        app.compose_frame();
        assert_ne!(app.frame.get(90, 40).map(|c| c.glyph), Some('@'));
    }

    #[test]
    fn test_compose_frame_survives_extreme_landmarks() {
        let mut points = HandPose::new(
            Point2::new(600, 300),
            GestureVector::from_bits(hand::SELECT_POSE),
        )
        .landmarks();
        points[INDEX_TIP] = Point2::new(i32::MIN, 0);
        points[MIDDLE_TIP] = Point2::new(i32::MAX, 100);
        let mut recording = Recording::default();
        recording.push(Some(points));

        let machine = InteractionMachine::default();
        let state = machine.initial_state();
        let mut app =
            TerminalApp::with_size(machine, state, InputSource::replay(recording), 128, 72);
        app.update();
        assert_eq!(app.last_report.mode, Mode::Select);

        app.compose_frame();
        // Selection box spans the whole width, clipped to the grid
        assert_eq!(app.frame.get(0, 5).map(|c| c.glyph), Some('▒'));
        assert_eq!(app.frame.get(127, 5).map(|c| c.glyph), Some('▒'));
    }

    #[test]
    fn test_unknown_shape_arg_keeps_previous_kind() {
        let config = BoardConfig::default();
        let mut state = InteractionState::new(&config);
        assert_eq!(state.current_shape, ShapeKind::Cube);

        assert!(!apply_shape_arg(&mut state, "torus"));
        assert_eq!(state.current_shape, ShapeKind::Cube);

        assert!(apply_shape_arg(&mut state, " Sphere "));
        assert_eq!(state.current_shape, ShapeKind::Sphere);

        assert!(!apply_shape_arg(&mut state, ""));
        assert_eq!(state.current_shape, ShapeKind::Sphere);
    }

    #[test]
    fn test_color_names() {
        let config = BoardConfig::default();
        assert_eq!(color_name(&config, Color::RED), "RED");
        assert_eq!(color_name(&config, Color::ERASER), "ERASER");
        assert_eq!(color_name(&config, Color::PINK), "PINK");
        assert_eq!(color_name(&config, Color::rgb(1, 2, 255)), "#0102ff");
    }

    #[test]
    fn test_chrome_marks_current_selection() {
        let config = BoardConfig::default();
        let mut state = InteractionState::new(&config);
        state.current_color = Color::GREEN;

        let mut frame = CellCanvas::new(128, 72, 1280, 720);
        draw_chrome_background(&mut frame, &config);
        draw_chrome_labels(&mut frame, &config, &state);

        // "[GREEN]" centered on x = 650, y = 62 -> column 65, row 6
        let row: String = (62..69)
            .map(|col| frame.get(col, 6).map_or(' ', |cell| cell.glyph))
            .collect();
        assert_eq!(row, "[GREEN]");

        // Toolbar label for the default cube is highlighted
        let cube = frame.get(35, 65).unwrap();
        assert_eq!(cube.color, config.highlight_color);
    }
}
