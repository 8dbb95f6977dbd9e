//! Frame presentation.
//!
//! The decoder publishes frames as fast as the server sends them; the
//! presenter redraws on its own cadence. It hands the world to the renderer
//! once, skips redraws that come sooner than the configured interval, and
//! always draws the last frame of a finished game.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use snek_shared::{
    math::Point,
    net::MessageSource,
    render::{draw_frame, RenderBackend},
    state::GameState,
    wire::WorldInfo,
};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::client::{SnekClient, TickOutcome};

/// Redraw throttle around a renderer.
pub struct Presenter<R> {
    renderer: R,
    interval: Duration,
    last_draw: Option<Instant>,
    world_set: bool,
    frames_drawn: u64,
}

impl<R: RenderBackend> Presenter<R> {
    pub fn new(renderer: R, interval: Duration) -> Self {
        Self {
            renderer,
            interval,
            last_draw: None,
            world_set: false,
            frames_drawn: 0,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Draws `state` if the interval has elapsed or `force` is set.
    /// Returns whether a frame was drawn.
    pub fn present(&mut self, state: &GameState, force: bool) -> bool {
        let Some(world) = state.world() else {
            return false;
        };
        if !self.world_set {
            self.renderer.set_world(world);
            self.world_set = true;
        }

        let now = Instant::now();
        let due = self
            .last_draw
            .map_or(true, |last| now.duration_since(last) >= self.interval);
        if !due && !force {
            return false;
        }

        draw_frame(&mut self.renderer, state);
        self.last_draw = Some(now);
        self.frames_drawn += 1;
        true
    }

    /// Drives `client` to the end of the game, presenting after every tick.
    pub async fn run<S: MessageSource>(
        &mut self,
        client: &mut SnekClient<S>,
    ) -> snek_shared::error::SessionResult<GameSummary> {
        self.present(client.state(), true);
        while let Some(outcome) = client.next_tick().await? {
            let last = matches!(outcome, TickOutcome::GameOver { .. });
            self.present(client.state(), last);
        }
        let summary = GameSummary::from_state(client.state());
        info!(
            score = ?summary.final_score,
            frames = summary.frames,
            drawn = self.frames_drawn,
            "Session finished"
        );
        Ok(summary)
    }
}

/// Renderer that reports frames through `tracing` instead of a window.
#[derive(Debug, Default)]
pub struct TraceRenderer {
    frame_points: usize,
    head: Option<Point>,
}

impl RenderBackend for TraceRenderer {
    fn set_world(&mut self, world: &WorldInfo) {
        info!(
            bounds = ?world.bounds,
            clear = ?world.color.as_array(),
            "World set"
        );
    }

    fn begin_frame(&mut self) {
        self.frame_points = 0;
        self.head = None;
    }

    fn draw_point(&mut self, point: &Point) {
        if self.head.is_none() {
            self.head = Some(*point);
        }
        self.frame_points += 1;
    }

    fn end_frame(&mut self) {
        // The server sends the food as one of the points.
        let snake_len = self.frame_points.saturating_sub(1);
        match self.head {
            Some(head) => debug!(snake_len, head = ?head.position, "Frame drawn"),
            None => debug!("Empty frame drawn"),
        }
    }
}

/// Outcome of one game, printable as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub world: Option<WorldInfo>,
    pub frames: u64,
    pub final_score: Option<u32>,
    pub last_length: usize,
}

impl GameSummary {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            world: state.world().copied(),
            frames: state.frames_received(),
            final_score: state.final_score(),
            last_length: state.current_points().len(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snek_shared::{
        codec::IntWidth,
        endian::ByteOrder,
        math::{Color, Vec3},
        net::ScriptedSource,
        wire,
    };

    /// Counts calls for assertions.
    #[derive(Default)]
    struct CountingRenderer {
        worlds: usize,
        frames: usize,
        points: usize,
    }

    impl RenderBackend for CountingRenderer {
        fn set_world(&mut self, _world: &WorldInfo) {
            self.worlds += 1;
        }
        fn begin_frame(&mut self) {
            self.frames += 1;
        }
        fn draw_point(&mut self, _point: &Point) {
            self.points += 1;
        }
        fn end_frame(&mut self) {}
    }

    fn game(order: ByteOrder) -> Vec<Vec<u8>> {
        let world = WorldInfo {
            width: IntWidth::One,
            bounds: Vec3::new(8.0, 8.0, 8.0),
            color: Color::from_rgb8([0, 0, 0]),
        };
        let p = Point::new(Vec3::new(1.0, 2.0, 3.0), Color::WHITE);
        vec![
            wire::encode_metadata(&world, order),
            wire::encode_tick(&[p], world.width, order),
            wire::encode_tick(&[p, p], world.width, order),
            wire::encode_tick(&[p, p, p], world.width, order),
            wire::encode_sentinel(),
            wire::encode_score(3),
        ]
    }

    #[tokio::test]
    async fn unthrottled_draws_every_tick() {
        let order = ByteOrder::native();
        let mut client = SnekClient::new(ScriptedSource::new(game(order)), order);
        client.read_metadata().await.unwrap();

        let mut presenter = Presenter::new(CountingRenderer::default(), Duration::ZERO);
        let summary = presenter.run(&mut client).await.unwrap();

        assert_eq!(summary.final_score, Some(3));
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.last_length, 3);
        let r = presenter.renderer();
        assert_eq!(r.worlds, 1);
        // Initial empty frame, three ticks, the final frame again.
        assert_eq!(r.frames, 5);
        assert_eq!(r.points, 1 + 2 + 3 + 3);
    }

    #[tokio::test]
    async fn throttled_still_draws_last_frame() {
        let order = ByteOrder::native();
        let mut client = SnekClient::new(ScriptedSource::new(game(order)), order);
        client.read_metadata().await.unwrap();

        let mut presenter =
            Presenter::new(CountingRenderer::default(), Duration::from_secs(3600));
        presenter.run(&mut client).await.unwrap();

        // The forced first draw and the forced game-over draw.
        assert_eq!(presenter.frames_drawn(), 2);
        assert_eq!(presenter.renderer().points, 3);
    }

    #[test]
    fn nothing_drawn_without_world() {
        let mut presenter = Presenter::new(CountingRenderer::default(), Duration::ZERO);
        assert!(!presenter.present(&GameState::new(), true));
        assert_eq!(presenter.renderer().worlds, 0);
    }

    #[test]
    fn summary_json() {
        let summary = GameSummary {
            world: None,
            frames: 2,
            final_score: Some(9),
            last_length: 4,
        };
        let json = summary.to_json().unwrap();
        let back: GameSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }
}
