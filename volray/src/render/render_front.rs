use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    thread::JoinHandle,
};

use crossbeam::channel::{Receiver, Sender};
use parking_lot::Mutex;

use crate::{camera::Camera, volume_property::VolumeProperty, volumetric::Volume};

use super::{FrameBuffer, RenderOptions, Renderer};

/// Messages to render thread
///
/// Messages queue up, only the newest render request is served
pub enum RendererMessage {
    /// Render a frame seen by `camera`
    StartRendering { generation: u64, camera: Camera },
    /// Shut down, thread will get ready to be joined
    ShutDown,
}

/// Renderer running in its own thread.
///
/// Every request gets a generation number. A frame finished after a newer
/// request arrived is stale and gets discarded instead of published.
pub struct RendererFront {
    handle: Option<JoinHandle<()>>,
    buffer: Arc<Mutex<FrameBuffer>>,
    latest: Arc<AtomicU64>,
    sender: Sender<RendererMessage>,
    receiver: Receiver<u64>,
    next_generation: u64,
}

impl RendererFront {
    /// Spawn render thread, it waits for the first request
    pub fn new(
        volume: Arc<Volume>,
        property: Arc<VolumeProperty>,
        render_options: RenderOptions,
    ) -> Self {
        let (sender, requests) = crossbeam::channel::unbounded(); // main -> renderer
        let (frames, receiver) = crossbeam::channel::unbounded(); // renderer -> main

        let (width, height) = render_options.resolution;
        let buffer = Arc::new(Mutex::new(FrameBuffer::new(width, height)));
        let latest = Arc::new(AtomicU64::new(0));

        let worker = RenderWorker {
            volume,
            property,
            renderer: Renderer::new(render_options),
            buffer: buffer.clone(),
            latest: latest.clone(),
            requests,
            frames,
        };
        let handle = std::thread::spawn(move || worker.run());

        RendererFront {
            handle: Some(handle),
            buffer,
            latest,
            sender,
            receiver,
            next_generation: 0,
        }
    }

    /// Ask for a frame seen by `camera`, returns its generation
    ///
    /// Supersedes all earlier requests.
    pub fn request_render(&mut self, camera: &Camera) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.latest.store(generation, Ordering::SeqCst);

        let msg = RendererMessage::StartRendering {
            generation,
            camera: camera.clone(),
        };
        if self.sender.send(msg).is_err() {
            log::error!("Render thread is gone, request {} dropped", generation);
        }
        generation
    }

    /// Generation of the newest request
    pub fn latest_request(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Block until a frame is published
    ///
    /// Returns its generation and a copy of it, `None` once the thread is gone.
    pub fn receive_frame(&self) -> Option<(u64, FrameBuffer)> {
        let generation = self.receiver.recv().ok()?;
        let frame = self.buffer.lock().clone();
        Some((generation, frame))
    }

    /// Getter for shared framebuffer
    /// Holds the last published frame
    pub fn get_buffer_handle(&self) -> Arc<Mutex<FrameBuffer>> {
        self.buffer.clone()
    }

    /// Stop the render thread and wait for it
    pub fn shutdown(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if let Some(handle) = self.handle.take() {
            // Thread may already be gone
            let _ = self.sender.send(RendererMessage::ShutDown);
            if handle.join().is_err() {
                log::error!("Render thread panicked");
            }
        }
    }
}

impl Drop for RendererFront {
    fn drop(&mut self) {
        self.finish();
    }
}

struct RenderWorker {
    volume: Arc<Volume>,
    property: Arc<VolumeProperty>,
    renderer: Renderer,
    buffer: Arc<Mutex<FrameBuffer>>,
    latest: Arc<AtomicU64>,
    requests: Receiver<RendererMessage>,
    frames: Sender<u64>,
}

impl RenderWorker {
    fn run(self) {
        let (width, height) = self.renderer.render_options().resolution;
        let mut frame = FrameBuffer::new(width, height);

        // Master loop
        while let Ok(mut msg) = self.requests.recv() {
            // Skip to the newest request
            while let Ok(next) = self.requests.try_recv() {
                let shutdown = matches!(next, RendererMessage::ShutDown);
                msg = next;
                if shutdown {
                    break;
                }
            }

            let (generation, camera) = match msg {
                RendererMessage::StartRendering { generation, camera } => (generation, camera),
                RendererMessage::ShutDown => break,
            };

            self.renderer
                .render(&self.volume, &self.property, &camera, &mut frame);

            let latest = self.latest.load(Ordering::SeqCst);
            if generation < latest {
                log::warn!(
                    "Discarding stale frame {} (latest request {})",
                    generation,
                    latest
                );
                continue;
            }

            std::mem::swap(&mut *self.buffer.lock(), &mut frame);

            // Send result
            if self.frames.send(generation).is_err() {
                break;
            }
        }
        log::debug!("Render thread finished");
    }
}
