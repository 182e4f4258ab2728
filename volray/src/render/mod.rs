//! Ray casting of volumes into frames.

mod frame_buffer;
mod ray_caster;
mod render_front;
mod render_options;
mod renderer;

pub use frame_buffer::FrameBuffer;
pub use ray_caster::{
    cast_ray, composite, correct_opacity, over_background, shade, DegenerateRay, RayResult,
    RayState,
};
pub use render_front::{RendererFront, RendererMessage};
pub use render_options::{
    RenderOptions, RenderOptionsBuilder, RenderOptionsError, DEFAULT_RESOLUTION,
    DEFAULT_SAMPLE_STEP, DEFAULT_TERMINATION_THRESHOLD,
};
pub use renderer::Renderer;
