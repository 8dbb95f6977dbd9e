//! `snek_shared`
//!
//! Protocol library for the Snek3D frontend.
//!
//! Design goals:
//! - Parse the server stream without global state: the byte order and the
//!   negotiated integer width travel in values, not statics.
//! - Every malformed message is an error value; nothing is zero-filled.
//! - Transports and renderers sit behind traits.
//! - No `unsafe`.

pub mod codec;
pub mod config;
pub mod endian;
pub mod error;
pub mod math;
pub mod net;
pub mod render;
pub mod state;
pub mod wire;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::codec::*;
    pub use crate::config::*;
    pub use crate::endian::*;
    pub use crate::error::*;
    pub use crate::math::*;
    pub use crate::state::*;
    pub use crate::wire::*;
}
