//! Configuration system.
//!
//! Loads client configuration from JSON strings (file IO left to app).

use serde::{Deserialize, Serialize};

/// Frontend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Snek server address with port, e.g. `localhost:6969`.
    #[serde(default = "default_server_addr")]
    pub server_addr: String,
    /// Request path of the WebSocket endpoint.
    #[serde(default = "default_ws_path")]
    pub ws_path: String,
    /// Maximum redraws per second.
    #[serde(default = "default_frame_hz")]
    pub frame_hz: f32,
}

fn default_server_addr() -> String {
    "localhost:6969".to_string()
}

fn default_ws_path() -> String {
    "/".to_string()
}

fn default_frame_hz() -> f32 {
    2.0
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: default_server_addr(),
            ws_path: default_ws_path(),
            frame_hz: default_frame_hz(),
        }
    }
}

impl ClientConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Full `ws://` URL of the server.
    pub fn ws_url(&self) -> String {
        let path = if self.ws_path.starts_with('/') {
            self.ws_path.clone()
        } else {
            format!("/{}", self.ws_path)
        };
        format!("ws://{}{}", self.server_addr, path)
    }

    /// Minimum time between redraws; zero disables throttling.
    pub fn frame_interval(&self) -> std::time::Duration {
        if self.frame_hz > 0.0 && self.frame_hz.is_finite() {
            std::time::Duration::from_secs_f32(1.0 / self.frame_hz)
        } else {
            std::time::Duration::ZERO
        }
    }
}
