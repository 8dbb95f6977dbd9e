//! Rendering abstraction.
//!
//! This crate intentionally does not depend on a graphics backend.
//! A renderer receives the world once and then whole frames of points.

use crate::{
    math::Point,
    state::GameState,
    wire::WorldInfo,
};

/// A minimal rendering API.
pub trait RenderBackend {
    /// Called once after metadata; sets the clear color and the volume.
    fn set_world(&mut self, world: &WorldInfo);
    fn begin_frame(&mut self);
    fn draw_point(&mut self, point: &Point);
    fn end_frame(&mut self);
}

/// Draws the current frame of `state`.
pub fn draw_frame<R: RenderBackend + ?Sized>(renderer: &mut R, state: &GameState) {
    renderer.begin_frame();
    for point in state.current_points() {
        renderer.draw_point(point);
    }
    renderer.end_frame();
}

/// A no-op renderer useful for headless tests.
#[derive(Default)]
pub struct NullRenderer;

impl RenderBackend for NullRenderer {
    fn set_world(&mut self, _world: &WorldInfo) {}
    fn begin_frame(&mut self) {}
    fn draw_point(&mut self, _point: &Point) {}
    fn end_frame(&mut self) {}
}
