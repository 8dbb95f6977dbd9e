//! Test support for the Snek3D crates.
//!
//! [`spawn_scripted_server`] binds an ephemeral port, accepts one WebSocket
//! client and sends it a fixed list of binary messages.

use std::net::SocketAddr;

use anyhow::bail;
use futures_util::{SinkExt, StreamExt};
use snek_shared::{
    codec::IntWidth,
    endian::ByteOrder,
    math::{Color, Point, Vec3},
    wire::{self, WorldInfo},
};
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::debug;

/// What the server does after its last scripted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterScript {
    /// Send a close frame.
    Close,
    /// Drop the TCP connection without a close handshake.
    Drop,
    /// Keep reading until the client sends a close frame. Fails the task if
    /// the connection ends without one.
    AwaitClose,
}

/// Serves `messages` to the first client that connects.
///
/// The task resolves to the number of messages sent.
pub async fn spawn_scripted_server(
    messages: Vec<Vec<u8>>,
    after: AfterScript,
) -> anyhow::Result<(SocketAddr, JoinHandle<anyhow::Result<usize>>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        let (stream, peer) = listener.accept().await?;
        debug!(%peer, "scripted server accepted");
        let mut ws = accept_async(stream).await?;
        let mut sent = 0;
        for m in messages {
            ws.send(Message::Binary(m)).await?;
            sent += 1;
        }
        match after {
            AfterScript::Close => {
                // The client may already be gone once it has what it needs.
                let _ = ws.close(None).await;
            }
            AfterScript::Drop => drop(ws),
            AfterScript::AwaitClose => {
                let mut saw_close = false;
                while let Some(Ok(msg)) = ws.next().await {
                    saw_close |= msg.is_close();
                }
                if !saw_close {
                    bail!("client went away without a close frame");
                }
            }
        }
        Ok(sent)
    });

    Ok((addr, handle))
}

/// A small world and a growing snake, encoded for `order`.
pub struct Scenario {
    pub world: WorldInfo,
    pub frames: Vec<Vec<Point>>,
    pub score: u32,
}

impl Scenario {
    pub fn growing_snake(width: IntWidth, len: usize, score: u32) -> Self {
        let world = WorldInfo {
            width,
            bounds: Vec3::new(15.0, 15.0, 15.0),
            color: Color::from_rgb8([16, 16, 32]),
        };
        let food = Point::new(Vec3::new(7.0, 7.0, 7.0), Color::from_rgb8([255, 0, 0]));
        let frames = (1..=len)
            .map(|n| {
                let mut pts: Vec<Point> = (0..n)
                    .map(|i| {
                        Point::new(
                            Vec3::new(i as f32, 1.0, 2.0),
                            Color::from_rgb8([0, 255, 0]),
                        )
                    })
                    .collect();
                pts.push(food);
                pts
            })
            .collect();
        Self {
            world,
            frames,
            score,
        }
    }

    /// Metadata, every frame, sentinel, score.
    pub fn encode(&self, order: ByteOrder) -> Vec<Vec<u8>> {
        let mut out = vec![wire::encode_metadata(&self.world, order)];
        out.extend(
            self.frames
                .iter()
                .map(|f| wire::encode_tick(f, self.world.width, order)),
        );
        out.push(wire::encode_sentinel());
        out.push(wire::encode_score(self.score));
        out
    }
}

/// Installs a test-writer subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}
