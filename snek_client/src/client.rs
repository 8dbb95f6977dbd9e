//! Client implementation.
//!
//! The client maintains:
//! - One message source (a WebSocket in production)
//! - The decoder context: native byte order and, after metadata, the
//!   negotiated integer decoder
//! - The game state renderers read from
//!
//! Reads are strictly sequential. The sentinel and the score message are
//! consumed in one call so a renderer never observes the gap between them.

use anyhow::Context;
use snek_shared::{
    codec::IntDecoder,
    config::ClientConfig,
    endian::{self, ByteOrder},
    error::{ProtocolViolation, SessionError, SessionResult},
    net::{MessageSource, WsSource},
    state::{ConnectionState, GameState},
    wire::{self, Tick, WorldInfo},
};
use tracing::{debug, info, warn};

/// Decoding parameters for one connection.
#[derive(Debug, Clone, Copy)]
pub struct DecoderContext {
    order: ByteOrder,
    decoder: Option<IntDecoder>,
}

impl DecoderContext {
    pub fn new(order: ByteOrder) -> Self {
        Self {
            order,
            decoder: None,
        }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Decoder negotiated by the metadata message, if received.
    pub fn decoder(&self) -> Option<&IntDecoder> {
        self.decoder.as_ref()
    }
}

/// What one call to [`SnekClient::next_tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame with this many points replaced the previous one.
    Frame { points: usize },
    /// The sentinel and the score were read; the session has ended.
    GameOver { score: u32 },
}

/// Session driver.
pub struct SnekClient<S> {
    source: S,
    ctx: DecoderContext,
    state: GameState,
}

impl SnekClient<WsSource> {
    /// Probes the byte order, connects to the configured server and reads the
    /// metadata message.
    pub async fn connect(cfg: &ClientConfig) -> anyhow::Result<Self> {
        let order = endian::probe()
            .map_err(SessionError::from)
            .context("byte order self-check")?;
        let url = cfg.ws_url();
        info!(%url, ?order, "Connecting to server");

        let source = WsSource::connect(&url)
            .await
            .map_err(SessionError::from)
            .with_context(|| format!("connect {url}"))?;
        let mut client = Self::new(source, order);
        client.read_metadata().await.context("read metadata")?;
        Ok(client)
    }
}

impl<S: MessageSource> SnekClient<S> {
    /// Wraps an open source. The state moves to `MetadataPending`.
    pub fn new(source: S, order: ByteOrder) -> Self {
        Self {
            source,
            ctx: DecoderContext::new(order),
            state: GameState::opened(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn context(&self) -> &DecoderContext {
        &self.ctx
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Consumes the client, returning the source and the final state.
    pub fn into_parts(self) -> (S, GameState) {
        (self.source, self.state)
    }

    /// Reads and applies the metadata message. Must be the first read.
    pub async fn read_metadata(&mut self) -> SessionResult<WorldInfo> {
        let result = self.read_metadata_inner().await;
        self.fail_on_err(result)
    }

    async fn read_metadata_inner(&mut self) -> SessionResult<WorldInfo> {
        if self.state.phase() != ConnectionState::MetadataPending {
            return Err(ProtocolViolation::UnexpectedPhase {
                phase: self.state.phase(),
            }
            .into());
        }
        let raw = self.source.next_message().await?;
        let (decoder, world) = wire::parse_metadata(&raw, self.ctx.order)?;
        self.state.apply_metadata(world)?;
        self.ctx.decoder = Some(decoder);
        info!(
            width = %world.width,
            max_x = world.bounds.x,
            max_y = world.bounds.y,
            max_z = world.bounds.z,
            "World metadata received"
        );
        Ok(world)
    }

    /// Reads and applies the next tick.
    ///
    /// Returns `Ok(None)` without touching the source once the game has
    /// ended. Any error leaves the state in `Fatal`.
    pub async fn next_tick(&mut self) -> SessionResult<Option<TickOutcome>> {
        if self.state.is_ended() {
            return Ok(None);
        }
        let result = self.next_tick_inner().await;
        self.fail_on_err(result).map(Some)
    }

    async fn next_tick_inner(&mut self) -> SessionResult<TickOutcome> {
        let decoder = match (self.state.phase(), self.ctx.decoder) {
            (ConnectionState::Streaming, Some(decoder)) => decoder,
            (phase, _) => return Err(ProtocolViolation::UnexpectedPhase { phase }.into()),
        };

        let raw = self.source.next_message().await?;
        match wire::parse_tick(&raw, &decoder)? {
            Tick::Frame(points) => {
                let n = points.len();
                if let Some(bounds) = self.state.world_bounds() {
                    let outside = points.iter().filter(|p| !p.position.within(bounds)).count();
                    if outside > 0 {
                        debug!(outside, "Points outside world bounds");
                    }
                }
                self.state.apply_frame(points)?;
                debug!(points = n, frame = self.state.frames_received(), "Tick applied");
                Ok(TickOutcome::Frame { points: n })
            }
            Tick::GameOver => {
                info!("Game over");
                let raw = self.source.next_message().await?;
                let score = wire::parse_score(&raw)?;
                self.state.finish(score)?;
                info!(score, "Final score received");
                Ok(TickOutcome::GameOver { score })
            }
        }
    }

    /// Reads ticks until the game ends, returning the final score.
    pub async fn run_to_end(&mut self) -> SessionResult<u32> {
        loop {
            match self.next_tick().await? {
                Some(TickOutcome::GameOver { score }) => return Ok(score),
                Some(TickOutcome::Frame { .. }) => {}
                None => {
                    return self.state.final_score().ok_or_else(|| {
                        ProtocolViolation::UnexpectedPhase {
                            phase: self.state.phase(),
                        }
                        .into()
                    })
                }
            }
        }
    }

    fn fail_on_err<T>(&mut self, result: SessionResult<T>) -> SessionResult<T> {
        if let Err(e) = &result {
            warn!(error = %e, phase = ?self.state.phase(), "Session failed");
            self.state.fail();
        }
        result
    }
}

impl<S> std::fmt::Debug for SnekClient<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnekClient")
            .field("ctx", &self.ctx)
            .field("phase", &self.state.phase())
            .finish_non_exhaustive()
    }
}

/// Maps a session error to a process exit code.
pub fn exit_code(err: &SessionError) -> u8 {
    match err {
        SessionError::Config(_) => 78,
        SessionError::Protocol(_) => 76,
        SessionError::Transport(_) => 74,
    }
}

/// Exit code for an error reaching `main`; 1 when no session error is inside.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<SessionError>().map_or(1, exit_code)
}
