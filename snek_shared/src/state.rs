//! Game state published to renderers.
//!
//! ```text
//! Connecting -> MetadataPending -> Streaming -> Ended
//!      \               \               \
//!       `-------------- `-------------- `----> Fatal
//! ```
//!
//! The session driver is the only writer. Renderers read through shared
//! references between decodes, so every update is a whole-frame replacement.

use serde::{Deserialize, Serialize};

use crate::{
    error::ProtocolViolation,
    math::{Color, Point, Vec3},
    wire::WorldInfo,
};

/// Connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Transport not yet open.
    Connecting,
    /// Open, waiting for the metadata message.
    MetadataPending,
    /// Metadata received, tick frames flowing.
    Streaming,
    /// Score received. Terminal.
    Ended,
    /// Session aborted by an error. Terminal.
    Fatal,
}

impl ConnectionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Ended | ConnectionState::Fatal)
    }
}

/// Current world, frame and result.
#[derive(Debug, Clone)]
pub struct GameState {
    phase: ConnectionState,
    world: Option<WorldInfo>,
    points: Vec<Point>,
    frames_received: u64,
    score: Option<u32>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            phase: ConnectionState::Connecting,
            world: None,
            points: Vec::new(),
            frames_received: 0,
            score: None,
        }
    }

    /// State for a transport that is already open.
    pub fn opened() -> Self {
        Self {
            phase: ConnectionState::MetadataPending,
            ..Self::new()
        }
    }

    fn expect_phase(&self, phase: ConnectionState) -> Result<(), ProtocolViolation> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(ProtocolViolation::UnexpectedPhase { phase: self.phase })
        }
    }

    /// Transport is open; the next message must be metadata.
    pub fn mark_open(&mut self) -> Result<(), ProtocolViolation> {
        self.expect_phase(ConnectionState::Connecting)?;
        self.phase = ConnectionState::MetadataPending;
        Ok(())
    }

    /// Publishes the world description. Allowed exactly once.
    pub fn apply_metadata(&mut self, world: WorldInfo) -> Result<(), ProtocolViolation> {
        self.expect_phase(ConnectionState::MetadataPending)?;
        self.world = Some(world);
        self.phase = ConnectionState::Streaming;
        Ok(())
    }

    /// Replaces the current frame.
    pub fn apply_frame(&mut self, points: Vec<Point>) -> Result<(), ProtocolViolation> {
        self.expect_phase(ConnectionState::Streaming)?;
        self.points = points;
        self.frames_received += 1;
        Ok(())
    }

    /// Records the final score. The last frame stays visible.
    pub fn finish(&mut self, score: u32) -> Result<(), ProtocolViolation> {
        self.expect_phase(ConnectionState::Streaming)?;
        self.score = Some(score);
        self.phase = ConnectionState::Ended;
        Ok(())
    }

    /// Aborts the session. Has no effect once terminal.
    pub fn fail(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = ConnectionState::Fatal;
        }
    }

    pub fn phase(&self) -> ConnectionState {
        self.phase
    }

    pub fn world(&self) -> Option<&WorldInfo> {
        self.world.as_ref()
    }

    pub fn world_bounds(&self) -> Option<Vec3> {
        self.world.map(|w| w.bounds)
    }

    pub fn world_color(&self) -> Option<Color> {
        self.world.map(|w| w.color)
    }

    /// Points of the most recent frame.
    pub fn current_points(&self) -> &[Point] {
        &self.points
    }

    /// Number of non-sentinel frames applied so far.
    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    pub fn is_ended(&self) -> bool {
        self.phase == ConnectionState::Ended
    }

    pub fn final_score(&self) -> Option<u32> {
        self.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::IntWidth;

    fn world() -> WorldInfo {
        WorldInfo {
            width: IntWidth::One,
            bounds: Vec3::new(9.0, 9.0, 9.0),
            color: Color::opaque(0.0, 0.0, 0.0),
        }
    }

    #[test]
    fn happy_path() {
        let mut s = GameState::new();
        assert_eq!(s.phase(), ConnectionState::Connecting);
        s.mark_open().unwrap();
        s.apply_metadata(world()).unwrap();
        assert_eq!(s.world_bounds(), Some(Vec3::new(9.0, 9.0, 9.0)));

        s.apply_frame(vec![Point::default(); 3]).unwrap();
        s.apply_frame(vec![Point::default(); 4]).unwrap();
        assert_eq!(s.current_points().len(), 4);
        assert_eq!(s.frames_received(), 2);

        s.finish(42).unwrap();
        assert!(s.is_ended());
        assert_eq!(s.final_score(), Some(42));
        assert_eq!(s.current_points().len(), 4);
    }

    #[test]
    fn opened_waits_for_metadata() {
        let mut s = GameState::opened();
        assert_eq!(s.phase(), ConnectionState::MetadataPending);
        assert!(s.mark_open().is_err());
        s.apply_metadata(world()).unwrap();
        assert_eq!(s.phase(), ConnectionState::Streaming);
    }

    #[test]
    fn frame_before_metadata_rejected() {
        let mut s = GameState::new();
        s.mark_open().unwrap();
        assert_eq!(
            s.apply_frame(Vec::new()),
            Err(ProtocolViolation::UnexpectedPhase {
                phase: ConnectionState::MetadataPending
            })
        );
    }

    #[test]
    fn metadata_only_once() {
        let mut s = GameState::new();
        s.mark_open().unwrap();
        s.apply_metadata(world()).unwrap();
        assert!(s.apply_metadata(world()).is_err());
    }

    #[test]
    fn terminal_states_are_sticky() {
        let mut s = GameState::new();
        s.mark_open().unwrap();
        s.apply_metadata(world()).unwrap();
        s.finish(1).unwrap();
        s.fail();
        assert_eq!(s.phase(), ConnectionState::Ended);
        assert!(s.apply_frame(Vec::new()).is_err());
        assert!(s.finish(2).is_err());

        let mut s = GameState::new();
        s.fail();
        assert_eq!(s.phase(), ConnectionState::Fatal);
        assert!(s.mark_open().is_err());
    }
}
