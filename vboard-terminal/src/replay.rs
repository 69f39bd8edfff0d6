/// Landmark recordings: a line-oriented text format parsed with nom.
///
/// One frame per line. `none` or `-` means no hand was detected; otherwise
/// the line holds whitespace separated `x,y` pixel pairs in landmark order.
/// Blank lines and `#` comments are skipped. The point count is not checked
/// here: short frames reach the board and are rejected there.
use nalgebra::Point2;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, i32 as integer, space0, space1},
    combinator::{all_consuming, map},
    multi::separated_list1,
    sequence::{delimited, separated_pair},
    IResult,
};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use thiserror::Error;
use vboard_core::Landmark;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("line {line}: cannot parse frame '{text}'")]
    Syntax { line: usize, text: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One recorded frame: `None` when no hand was tracked
pub type Frame = Option<Vec<Landmark>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recording {
    pub frames: Vec<Frame>,
}

impl Recording {
    pub fn parse(text: &str) -> Result<Self, ReplayError> {
        let mut frames = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let content = raw.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            let (_, frame) = all_consuming(frame_line)(content).map_err(|_| {
                ReplayError::Syntax {
                    line: index + 1,
                    text: content.to_string(),
                }
            })?;
            frames.push(frame);
        }
        Ok(Self { frames })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        fs::write(path, self.to_text())?;
        Ok(())
    }

    pub fn to_text(&self) -> String {
        let mut text = String::from("# vboard landmark recording\n");
        for frame in &self.frames {
            text.push_str(&format_frame(frame.as_deref()));
            text.push('\n');
        }
        text
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Render one frame in the recording syntax
pub fn format_frame(frame: Option<&[Landmark]>) -> String {
    match frame {
        None => "none".to_string(),
        Some(points) => {
            let mut line = String::new();
            for (i, point) in points.iter().enumerate() {
                if i > 0 {
                    line.push(' ');
                }
                let _ = write!(line, "{},{}", point.x, point.y);
            }
            line
        }
    }
}

fn point(input: &str) -> IResult<&str, Landmark> {
    map(separated_pair(integer, char(','), integer), |(x, y)| {
        Point2::new(x, y)
    })(input)
}

fn hand(input: &str) -> IResult<&str, Vec<Landmark>> {
    separated_list1(space1, point)(input)
}

fn no_hand(input: &str) -> IResult<&str, &str> {
    alt((tag("none"), tag("-")))(input)
}

fn frame_line(input: &str) -> IResult<&str, Frame> {
    // Points first: a bare "-" must not swallow the sign of "-5,3"
    delimited(
        space0,
        alt((map(hand, Some), map(no_hand, |_| None))),
        space0,
    )(input)
}
