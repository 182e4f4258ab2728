use std::time::Instant;

use crate::{
    camera::Camera, color::RGBA, volume_property::VolumeProperty, volumetric::Volume,
};

use super::{
    frame_buffer::FrameBuffer,
    ray_caster::{cast_ray, over_background},
    RenderOptions,
};

/// Renders whole frames, splitting rows between worker threads.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    render_options: RenderOptions,
}

impl Renderer {
    pub fn new(render_options: RenderOptions) -> Renderer {
        Renderer { render_options }
    }

    pub fn set_render_options(&mut self, opts: RenderOptions) {
        self.render_options = opts;
    }

    pub fn set_render_resolution(&mut self, res: (usize, usize)) {
        self.render_options.resolution = res;
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }

    /// Render one frame into `frame`, resizing it to the configured resolution.
    ///
    /// Every pixel is written. Rays which miss the volume get the background.
    /// The camera's aspect ratio is matched to the resolution.
    pub fn render(
        &self,
        volume: &Volume,
        property: &VolumeProperty,
        camera: &Camera,
        frame: &mut FrameBuffer,
    ) {
        let start = Instant::now();

        let (width, height) = self.render_options.resolution;
        frame.resize(width, height);
        if width == 0 || height == 0 {
            return;
        }

        let mut camera = camera.clone();
        camera.set_aspect_from_resolution(width, height);

        let workers = self.render_options.worker_count.clamp(1, height);
        let rows_per_band = (height + workers - 1) / workers;

        if workers == 1 {
            self.render_band(volume, property, &camera, 0, frame.pixels_mut());
        } else {
            let camera = &camera;
            // Scope assures threads will be joined before exiting the scope
            let res = crossbeam::scope(|s| {
                for (band, pixels) in frame
                    .pixels_mut()
                    .chunks_mut(rows_per_band * width)
                    .enumerate()
                {
                    let first_row = band * rows_per_band;
                    s.spawn(move |_| {
                        self.render_band(volume, property, camera, first_row, pixels);
                    });
                }
            });
            if let Err(panic) = res {
                std::panic::resume_unwind(panic);
            }
        }

        log::debug!(
            "Rendered {}x{} frame on {} threads in {:?}",
            width,
            height,
            workers,
            start.elapsed()
        );
    }

    // pixels hold whole rows starting at first_row
    fn render_band(
        &self,
        volume: &Volume,
        property: &VolumeProperty,
        camera: &Camera,
        first_row: usize,
        pixels: &mut [RGBA],
    ) {
        let (width, height) = self.render_options.resolution;
        let (step_x, step_y) = (1.0 / width as f32, 1.0 / height as f32);

        for (i, pixel) in pixels.iter_mut().enumerate() {
            let x = i % width;
            let y = first_row + i / width;

            let pixel_coord = ((x as f32 + 0.5) * step_x, (y as f32 + 0.5) * step_y);
            *pixel = self.render_pixel(volume, property, camera, pixel_coord);
        }
    }

    /// Final color of the pixel at normalized `pixel_coord`, background included
    pub fn render_pixel(
        &self,
        volume: &Volume,
        property: &VolumeProperty,
        camera: &Camera,
        pixel_coord: (f32, f32),
    ) -> RGBA {
        let ray = camera.get_ray(pixel_coord);
        let background = self.render_options.background;

        match cast_ray(volume, property, &ray, &self.render_options) {
            Ok(result) => over_background(result.color, background),
            Err(e) => {
                log::trace!("Pixel {:?}: {}", pixel_coord, e);
                background
            }
        }
    }
}
