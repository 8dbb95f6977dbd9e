//! Message transports.
//!
//! The decoder only needs "give me the next message" and "the connection is
//! gone". [`MessageSource`] is that seam; [`WsSource`] speaks WebSocket to a
//! live server and [`ScriptedSource`] replays a fixed list for headless runs.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{client::IntoClientRequest, Message},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, trace};

use crate::error::TransportError;

/// Ordered source of whole server messages.
#[async_trait]
pub trait MessageSource: Send {
    /// Waits for the next message. No timeout.
    async fn next_message(&mut self) -> Result<Vec<u8>, TransportError>;
}

/// WebSocket client connection.
pub struct WsSource {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl std::fmt::Debug for WsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsSource").finish_non_exhaustive()
    }
}

impl WsSource {
    /// Opens a WebSocket to `url` (e.g. `ws://localhost:6969/`).
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let request = url
            .into_client_request()
            .map_err(|_| TransportError::InvalidUrl {
                url: url.to_string(),
            })?;
        let (stream, response) = connect_async(request).await?;
        info!(%url, status = %response.status(), "WebSocket connected");
        Ok(Self { stream })
    }

    /// Sends a close frame and flushes it.
    pub async fn close(mut self) -> Result<(), TransportError> {
        self.stream.close(None).await?;
        Ok(())
    }
}

#[async_trait]
impl MessageSource for WsSource {
    async fn next_message(&mut self) -> Result<Vec<u8>, TransportError> {
        loop {
            let Some(msg) = self.stream.next().await else {
                return Err(TransportError::Closed);
            };
            match msg? {
                Message::Binary(data) => {
                    trace!(len = data.len(), "binary message");
                    return Ok(data);
                }
                Message::Text(text) => {
                    trace!(len = text.len(), "text message treated as bytes");
                    return Ok(text.into_bytes());
                }
                Message::Close(frame) => {
                    debug!(?frame, "server closed connection");
                    return Err(TransportError::Closed);
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }
}

/// In-memory source that replays a fixed message list.
#[derive(Debug, Default, Clone)]
pub struct ScriptedSource {
    queue: VecDeque<Vec<u8>>,
    reads: usize,
}

impl ScriptedSource {
    pub fn new<I>(messages: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        Self {
            queue: messages.into_iter().collect(),
            reads: 0,
        }
    }

    /// Number of `next_message` calls so far, including the failing ones.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Messages not yet consumed.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

#[async_trait]
impl MessageSource for ScriptedSource {
    async fn next_message(&mut self) -> Result<Vec<u8>, TransportError> {
        self.reads += 1;
        self.queue.pop_front().ok_or(TransportError::Closed)
    }
}
