use common::*;
use criterion::{criterion_group, criterion_main};

mod common;

pub fn render_single(c: &mut Criterion) {
    let render_options = RenderOptions::builder()
        .resolution(RESOLUTION)
        .early_ray_termination(false)
        .worker_count(1)
        .build_unchecked();

    bench_scene(c, "sphere single", &Scene::sphere(), render_options);
}

pub fn render_single_ert(c: &mut Criterion) {
    let render_options = RenderOptions::builder()
        .resolution(RESOLUTION)
        .early_ray_termination(true)
        .worker_count(1)
        .build_unchecked();

    bench_scene(c, "sphere single ert", &Scene::sphere(), render_options);
}

pub fn render_parallel(c: &mut Criterion) {
    let render_options = RenderOptions::builder()
        .resolution(RESOLUTION)
        .early_ray_termination(false)
        .build_unchecked();

    bench_scene(c, "sphere parallel", &Scene::sphere(), render_options);
}

pub fn render_parallel_ert(c: &mut Criterion) {
    let render_options = RenderOptions::builder()
        .resolution(RESOLUTION)
        .early_ray_termination(true)
        .build_unchecked();

    bench_scene(c, "sphere parallel ert", &Scene::sphere(), render_options);
}

pub fn render_shaded(c: &mut Criterion) {
    let render_options = RenderOptions::builder()
        .resolution(RESOLUTION)
        .early_ray_termination(true)
        .build_unchecked();

    let mut scene = Scene::sphere();
    scene.property = scene.property.to_builder().shade(true).build().unwrap();

    bench_scene(c, "sphere parallel shaded", &scene, render_options);
}

criterion_group! {
    name = sequential;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = render_single, render_single_ert
}

criterion_group! {
    name = parallel;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = render_parallel, render_parallel_ert, render_shaded
}

criterion_main!(sequential, parallel);
