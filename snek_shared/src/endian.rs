//! Native byte-order probe.
//!
//! Coordinates and world extents arrive in the byte order of the machine the
//! client runs on, so the client has to know it. Rust knows this at compile
//! time, but the probe still runs once at startup as a self-check and fails
//! loudly if the answer is neither little nor big endian.

use serde::{Deserialize, Serialize};

use crate::error::ConfigFault;

/// Value stored natively to detect the byte order.
pub const PROBE_VALUE: u16 = 0xABCD;

/// Byte order of multi-byte integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Byte order of the compilation target.
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }
}

/// Classifies the two bytes produced by a native store of [`PROBE_VALUE`].
pub fn classify(bytes: [u8; 2]) -> Result<ByteOrder, ConfigFault> {
    match bytes {
        [0xCD, 0xAB] => Ok(ByteOrder::Little),
        [0xAB, 0xCD] => Ok(ByteOrder::Big),
        other => Err(ConfigFault::IndeterminateByteOrder(other)),
    }
}

/// Detects the native byte order.
pub fn probe() -> Result<ByteOrder, ConfigFault> {
    let order = classify(PROBE_VALUE.to_ne_bytes())?;
    tracing::debug!(?order, "native byte order detected");
    Ok(order)
}
