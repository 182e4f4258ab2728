//! Load, configure and render a volume, then react to camera events.

use std::{path::PathBuf, sync::Arc};

use crate::{
    camera::{Camera, CameraEvent},
    error::Error,
    present::{Present, PresentError},
    render::{FrameBuffer, RenderOptions, RenderOptionsBuilder, Renderer, RendererFront},
    volume_property::VolumeProperty,
    volumetric::{dicom_loader, LoadError, RawVolumeReader, Volume},
};

/// Where the volume comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeSource {
    /// Directory of DICOM slices
    Dicom(PathBuf),
    /// Single `.vol` file
    Raw(PathBuf),
}

impl VolumeSource {
    pub fn load(&self) -> Result<Volume, LoadError> {
        match self {
            VolumeSource::Dicom(dir) => dicom_loader().load_directory(dir),
            VolumeSource::Raw(file) => RawVolumeReader::from_file(file),
        }
    }
}

/// Startup parameters of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub source: VolumeSource,
    pub width: usize,
    pub height: usize,
}

/// One volume on screen.
///
/// Volume and property are fixed for the life of the session, only the camera moves.
pub struct Session {
    volume: Arc<Volume>,
    property: Arc<VolumeProperty>,
    camera: Camera,
    renderer: Renderer,
    frame: FrameBuffer,
}

impl Session {
    /// Session with the initial view of `volume`, nothing rendered yet
    pub fn new(volume: Volume, property: VolumeProperty, render_options: RenderOptions) -> Session {
        let camera = Camera::looking_at_volume(&volume);
        let (width, height) = render_options.resolution;

        log::info!(
            "Session started: {:?}, {}x{} frame",
            volume,
            width,
            height
        );

        Session {
            volume: Arc::new(volume),
            property: Arc::new(property),
            camera,
            renderer: Renderer::new(render_options),
            frame: FrameBuffer::new(width, height),
        }
    }

    /// Load the volume `config` points to and prepare a session for it.
    ///
    /// Resolution of `render_options` is taken from `config`.
    pub fn load(
        config: &SessionConfig,
        property: VolumeProperty,
        render_options: RenderOptionsBuilder,
    ) -> Result<Session, Error> {
        let render_options = render_options
            .resolution((config.width, config.height))
            .build()?;
        let volume = config.source.load()?;
        Ok(Session::new(volume, property, render_options))
    }

    /// Render a frame from the current camera
    pub fn render(&mut self) -> &FrameBuffer {
        self.renderer
            .render(&self.volume, &self.property, &self.camera, &mut self.frame);
        &self.frame
    }

    /// Move the camera and render the new view
    pub fn handle_event(&mut self, event: CameraEvent) -> &FrameBuffer {
        log::debug!("Handling {:?}", event);
        self.camera.apply(event);
        self.render()
    }

    /// Hand the last rendered frame to `presenter`
    pub fn present<P>(&self, presenter: &mut P) -> Result<(), PresentError>
    where
        P: Present + ?Sized,
    {
        presenter.present(&self.frame)
    }

    /// Renderer in its own thread sharing this session's volume and property
    pub fn spawn_front(&self) -> RendererFront {
        RendererFront::new(
            self.volume.clone(),
            self.property.clone(),
            *self.renderer.render_options(),
        )
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn property(&self) -> &VolumeProperty {
        &self.property
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn render_options(&self) -> &RenderOptions {
        self.renderer.render_options()
    }
}
