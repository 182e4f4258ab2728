pub use criterion::{black_box, Criterion};

use nalgebra::{point, vector, Point3};
pub use volray::{
    render::{FrameBuffer, RenderOptions, Renderer},
    test_helpers, Camera, Volume, VolumeProperty,
};

pub const RESOLUTION: (usize, usize) = (256, 256);
pub const VOLUME_SIDE: usize = 96;

pub const DEFAULT_CAMERA_POSITIONS: [Point3<f32>; 3] = [
    point![300.0, 300.0, 300.0],
    point![-200.0, 47.5, 47.5],
    point![47.5, -250.0, 47.5],
];

pub struct Scene {
    pub volume: Volume,
    pub property: VolumeProperty,
    pub cameras: Vec<Camera>,
}

impl Scene {
    pub fn sphere() -> Scene {
        let volume = test_helpers::sphere_volume(VOLUME_SIDE, 200.0);
        let property = test_helpers::gray_property(200.0);
        let center = volume.center();
        let cameras = DEFAULT_CAMERA_POSITIONS
            .iter()
            .map(|&pos| Camera::new(pos, center, vector![0.0, 0.0, 1.0]))
            .collect();
        Scene {
            volume,
            property,
            cameras,
        }
    }
}

/// Benchmark rendering `scene` from every camera, one frame per camera
pub fn bench_scene(c: &mut Criterion, name: &str, scene: &Scene, render_options: RenderOptions) {
    let renderer = Renderer::new(render_options);
    let mut frame = FrameBuffer::new(render_options.resolution.0, render_options.resolution.1);

    c.bench_function(name, |b| {
        b.iter(|| {
            for camera in &scene.cameras {
                renderer.render(&scene.volume, &scene.property, camera, &mut frame);
            }
            black_box(frame.pixels()[0]);
        });
    });
}
