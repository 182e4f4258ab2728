//! Display surfaces frames are handed to.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use thiserror::Error;

use crate::render::FrameBuffer;

#[derive(Debug, Error)]
pub enum PresentError {
    #[error("frame {width}x{height} cannot be converted to an image")]
    InvalidFrame { width: usize, height: usize },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Where finished frames go.
pub trait Present {
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), PresentError>;
}

/// Writes every frame into a numbered PNG file, `<prefix>_0000.png` and so on.
#[derive(Debug)]
pub struct PngPresenter {
    prefix: PathBuf,
    counter: usize,
}

impl PngPresenter {
    pub fn new(prefix: impl AsRef<Path>) -> PngPresenter {
        PngPresenter {
            prefix: prefix.as_ref().to_path_buf(),
            counter: 0,
        }
    }

    /// Path of the `index`-th frame
    pub fn frame_path(&self, index: usize) -> PathBuf {
        let mut name = self
            .prefix
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!("_{index:04}.png"));
        self.prefix.with_file_name(name)
    }

    /// Number of frames written so far
    pub fn frames_written(&self) -> usize {
        self.counter
    }
}

impl Present for PngPresenter {
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), PresentError> {
        let (width, height) = frame.resolution();
        let invalid = || PresentError::InvalidFrame { width, height };
        if width == 0 || height == 0 {
            return Err(invalid());
        }

        let w = u32::try_from(width).map_err(|_| invalid())?;
        let h = u32::try_from(height).map_err(|_| invalid())?;
        let image = RgbaImage::from_raw(w, h, frame.to_rgba8()).ok_or_else(invalid)?;

        let path = self.frame_path(self.counter);
        image.save(&path).map_err(|source| PresentError::Write {
            path: path.clone(),
            source,
        })?;

        log::info!("Frame {} written to {}", self.counter, path.display());
        self.counter += 1;
        Ok(())
    }
}
