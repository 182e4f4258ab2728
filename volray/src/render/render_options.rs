use thiserror::Error;

use crate::color::{self, RGBA};

pub const DEFAULT_RESOLUTION: (usize, usize) = (640, 480);
pub const DEFAULT_SAMPLE_STEP: f32 = 0.5;
pub const DEFAULT_TERMINATION_THRESHOLD: f32 = 0.99;

/// Parameters of a frame, independent of the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// `(width, height)` in pixels
    pub resolution: (usize, usize),
    /// Distance between samples along a ray, world units
    pub sample_step: f32,
    pub early_ray_termination: bool,
    /// Accumulated opacity at which a ray stops
    pub termination_threshold: f32,
    /// Composited under every pixel
    pub background: RGBA,
    /// Number of threads rendering a frame
    pub worker_count: usize,
}

impl RenderOptions {
    pub fn builder() -> RenderOptionsBuilder {
        RenderOptionsBuilder::new()
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptionsBuilder::new().build_unchecked()
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderOptionsError {
    #[error("resolution {0:?} has no pixels")]
    ZeroResolution((usize, usize)),
    #[error("sample step must be positive and finite, got {0}")]
    InvalidStep(f32),
    #[error("termination threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f32),
    #[error("background channels must be in [0, 1]")]
    InvalidBackground,
    #[error("at least one render worker is needed")]
    ZeroWorkers,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptionsBuilder {
    resolution: (usize, usize),
    sample_step: f32,
    early_ray_termination: bool,
    termination_threshold: f32,
    background: RGBA,
    worker_count: Option<usize>,
}

impl RenderOptionsBuilder {
    pub fn new() -> Self {
        RenderOptionsBuilder {
            resolution: DEFAULT_RESOLUTION,
            sample_step: DEFAULT_SAMPLE_STEP,
            early_ray_termination: true,
            termination_threshold: DEFAULT_TERMINATION_THRESHOLD,
            background: color::black(),
            worker_count: None,
        }
    }

    pub fn resolution(mut self, resolution: (usize, usize)) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn sample_step(mut self, step: f32) -> Self {
        self.sample_step = step;
        self
    }

    pub fn early_ray_termination(mut self, enable: bool) -> Self {
        self.early_ray_termination = enable;
        self
    }

    pub fn termination_threshold(mut self, threshold: f32) -> Self {
        self.termination_threshold = threshold;
        self
    }

    pub fn background(mut self, background: RGBA) -> Self {
        self.background = background;
        self
    }

    /// Fixed number of render threads.
    /// Defaults to the available parallelism.
    pub fn worker_count(mut self, count: usize) -> Self {
        self.worker_count = Some(count);
        self
    }

    /// Validate and build
    pub fn build(self) -> Result<RenderOptions, RenderOptionsError> {
        let (w, h) = self.resolution;
        if w == 0 || h == 0 {
            return Err(RenderOptionsError::ZeroResolution(self.resolution));
        }
        if !self.sample_step.is_finite() || self.sample_step <= 0.0 {
            return Err(RenderOptionsError::InvalidStep(self.sample_step));
        }
        let t = self.termination_threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(RenderOptionsError::InvalidThreshold(t));
        }
        if !self.background.iter().all(|c| (0.0..=1.0).contains(c)) {
            return Err(RenderOptionsError::InvalidBackground);
        }
        if self.worker_count == Some(0) {
            return Err(RenderOptionsError::ZeroWorkers);
        }
        Ok(self.build_unchecked())
    }

    /// Build without validation
    pub fn build_unchecked(self) -> RenderOptions {
        let worker_count = self.worker_count.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        RenderOptions {
            resolution: self.resolution,
            sample_step: self.sample_step,
            early_ray_termination: self.early_ray_termination,
            termination_threshold: self.termination_threshold,
            background: self.background,
            worker_count,
        }
    }
}

impl Default for RenderOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn defaults() {
        let opts = RenderOptions::builder().build().unwrap();
        assert_eq!(opts.resolution, DEFAULT_RESOLUTION);
        assert_eq!(opts.sample_step, 0.5);
        assert!(opts.early_ray_termination);
        assert_eq!(opts.termination_threshold, 0.99);
        assert_eq!(opts.background, color::black());
        assert!(opts.worker_count >= 1);
    }

    #[test]
    fn validation() {
        let b = RenderOptions::builder();
        assert_eq!(
            b.resolution((0, 10)).build(),
            Err(RenderOptionsError::ZeroResolution((0, 10)))
        );
        assert_eq!(
            b.sample_step(0.0).build(),
            Err(RenderOptionsError::InvalidStep(0.0))
        );
        assert!(matches!(
            b.sample_step(f32::NAN).build(),
            Err(RenderOptionsError::InvalidStep(_))
        ));
        assert_eq!(
            b.termination_threshold(1.5).build(),
            Err(RenderOptionsError::InvalidThreshold(1.5))
        );
        assert_eq!(
            b.background(color::new(2.0, 0.0, 0.0, 1.0)).build(),
            Err(RenderOptionsError::InvalidBackground)
        );
        assert_eq!(b.worker_count(0).build(), Err(RenderOptionsError::ZeroWorkers));
    }

    #[test]
    fn unchecked_skips_validation() {
        let opts = RenderOptions::builder()
            .sample_step(-1.0)
            .worker_count(3)
            .build_unchecked();
        assert_eq!(opts.sample_step, -1.0);
        assert_eq!(opts.worker_count, 3);
    }
}
