//! Wire format.
//!
//! ```text
//! metadata   | width*8 (1) | maxX maxY maxZ (3*width) | r g b (3) |
//! tick       | numPoints u32 BE (4) | numPoints * [ x y z (3*width) | r g b (3) ] |
//! sentinel   | 0u32 BE (4) |
//! score      | score u32 BE (4) |
//! ```
//!
//! Coordinates and extents use the negotiated width in the client's native
//! byte order. The point count and the score are always big endian.
//!
//! Each point record is `3*width + 3` bytes and records are packed back to
//! back. Some servers were written against a reader that advanced only
//! `3*width` bytes per point; that overlap is not reproduced here.

use bytes::{Buf, BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    codec::{IntDecoder, IntWidth},
    endian::ByteOrder,
    error::{ProtocolViolation, SessionError},
    math::{Color, Point, Vec3},
};

/// Size of the big-endian count and score fields.
pub const COUNT_LEN: usize = 4;

/// Color bytes after each coordinate triple.
pub const COLOR_LEN: usize = 3;

/// Bytes per point record for a width.
pub const fn point_stride(width: IntWidth) -> usize {
    3 * width.bytes() + COLOR_LEN
}

/// Minimum metadata length for a width.
pub const fn metadata_len(width: IntWidth) -> usize {
    1 + 3 * width.bytes() + COLOR_LEN
}

/// World description published by the metadata message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldInfo {
    pub width: IntWidth,
    /// Extents of the playable volume (maxX, maxY, maxZ).
    pub bounds: Vec3,
    /// Background color.
    pub color: Color,
}

/// Decoded tick message.
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// A complete frame replacing the previous one.
    Frame(Vec<Point>),
    /// `numPoints == 0`: the score message follows.
    GameOver,
}

/// Parses the first server message.
///
/// Returns the decoder negotiated for the connection together with the world
/// description.
pub fn parse_metadata(
    buf: &[u8],
    order: ByteOrder,
) -> Result<(IntDecoder, WorldInfo), SessionError> {
    let Some(&byte0) = buf.first() else {
        return Err(ProtocolViolation::TruncatedMetadata { need: 1, got: 0 }.into());
    };
    let width = IntWidth::from_header(byte0)?;
    let need = metadata_len(width);
    if buf.len() < need {
        return Err(ProtocolViolation::TruncatedMetadata {
            need,
            got: buf.len(),
        }
        .into());
    }
    if buf.len() > need {
        debug!(extra = buf.len() - need, "ignoring trailing metadata bytes");
    }

    let decoder = IntDecoder::new(width, order);
    let coords_end = 1 + 3 * width.bytes();
    let bounds = Vec3::from_magnitudes(decoder.decode_triple(&buf[1..coords_end])?);
    let color = Color::from_rgb8([buf[coords_end], buf[coords_end + 1], buf[coords_end + 2]]);

    Ok((
        decoder,
        WorldInfo {
            width,
            bounds,
            color,
        },
    ))
}

/// Parses one tick message with the negotiated decoder.
pub fn parse_tick(buf: &[u8], decoder: &IntDecoder) -> Result<Tick, ProtocolViolation> {
    if buf.len() < COUNT_LEN {
        return Err(ProtocolViolation::TruncatedTick {
            need: COUNT_LEN,
            got: buf.len(),
        });
    }
    let mut rd = buf;
    let num_points = rd.get_u32();
    if num_points == 0 {
        return Ok(Tick::GameOver);
    }

    let stride = point_stride(decoder.width());
    let need = (num_points as usize)
        .checked_mul(stride)
        .and_then(|n| n.checked_add(COUNT_LEN))
        .ok_or(ProtocolViolation::FrameTooLarge { points: num_points })?;
    if buf.len() < need {
        return Err(ProtocolViolation::TruncatedTick {
            need,
            got: buf.len(),
        });
    }
    if buf.len() > need {
        debug!(extra = buf.len() - need, "ignoring trailing tick bytes");
    }

    let coords_len = stride - COLOR_LEN;
    rd[..need - COUNT_LEN]
        .chunks_exact(stride)
        .map(|record| -> Result<Point, ProtocolViolation> {
            let position = Vec3::from_magnitudes(decoder.decode_triple(&record[..coords_len])?);
            let c = &record[coords_len..];
            Ok(Point::new(position, Color::from_rgb8([c[0], c[1], c[2]])))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Tick::Frame)
}

/// Parses the score message that follows the sentinel.
pub fn parse_score(buf: &[u8]) -> Result<u32, ProtocolViolation> {
    if buf.len() < COUNT_LEN {
        return Err(ProtocolViolation::TruncatedScore { got: buf.len() });
    }
    let mut rd = buf;
    Ok(rd.get_u32())
}

// ─── Encoders (servers and tests) ───

/// Builds a metadata message.
pub fn encode_metadata(world: &WorldInfo, order: ByteOrder) -> Vec<u8> {
    let enc = IntDecoder::new(world.width, order);
    let mut out = Vec::with_capacity(metadata_len(world.width));
    out.push(world.width.header());
    for v in [world.bounds.x, world.bounds.y, world.bounds.z] {
        enc.encode_into(v as u64, &mut out);
    }
    out.extend_from_slice(&world.color.to_rgb8());
    out
}

/// Builds a tick message. An empty slice produces the sentinel.
pub fn encode_tick(points: &[Point], width: IntWidth, order: ByteOrder) -> Vec<u8> {
    let enc = IntDecoder::new(width, order);
    let mut buf = BytesMut::with_capacity(COUNT_LEN + points.len() * point_stride(width));
    buf.put_u32(points.len() as u32);
    let mut record = Vec::with_capacity(point_stride(width));
    for p in points {
        record.clear();
        for v in [p.position.x, p.position.y, p.position.z] {
            enc.encode_into(v as u64, &mut record);
        }
        record.extend_from_slice(&p.color.to_rgb8());
        buf.extend_from_slice(&record);
    }
    buf.to_vec()
}

/// Builds the game-over sentinel.
pub fn encode_sentinel() -> Vec<u8> {
    0u32.to_be_bytes().to_vec()
}

/// Builds the final score message.
pub fn encode_score(score: u32) -> Vec<u8> {
    score.to_be_bytes().to_vec()
}
