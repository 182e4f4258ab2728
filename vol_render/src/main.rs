use config::{Config, ProjectionKind};
use indicatif::{ProgressBar, ProgressStyle};
use volray::{
    premade::transfer_functions::ct_tissue,
    present::{PngPresenter, Present},
    ColorTransferFunction, Error, PiecewiseFunction, Projection, Session, VolumeProperty,
};

mod args;
mod config;

use crate::args::get_command;

/// Preset CT property with the functions given on the command line swapped in
fn build_property(cfg: &Config) -> Result<VolumeProperty, Error> {
    let mut builder = ct_tissue()?
        .to_builder()
        .interpolation(cfg.interpolation)
        .shade(cfg.shade);

    if !cfg.color_points.is_empty() {
        builder = builder.color(ColorTransferFunction::new(cfg.color_points.iter().copied())?);
    }
    if !cfg.opacity_points.is_empty() {
        builder = builder.scalar_opacity(PiecewiseFunction::new(
            cfg.opacity_points.iter().copied(),
        )?);
    }
    if !cfg.gradient_points.is_empty() {
        builder = builder.gradient_opacity(Some(PiecewiseFunction::new(
            cfg.gradient_points.iter().copied(),
        )?));
    }

    Ok(builder.build()?)
}

fn run(cfg: Config) -> Result<(), Error> {
    let property = build_property(&cfg)?;
    let mut session = Session::load(&cfg.session, property, cfg.render_options())?;

    if cfg.projection == ProjectionKind::Parallel {
        // Whole volume fits the view
        let scale = session.volume().get_bound_box().dims().norm() / 2.0;
        let camera = session
            .camera()
            .clone()
            .with_projection(Projection::Parallel { scale });
        session.set_camera(camera);
    }

    let mut presenter = PngPresenter::new(&cfg.output);

    session.render();
    session.present(&mut presenter)?;

    if !cfg.events.is_empty() {
        let progress = ProgressBar::new(cfg.events.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames"),
        );
        for &event in &cfg.events {
            session.handle_event(event);
            session.present(&mut presenter)?;
            progress.inc(1);
        }
        progress.finish();
    }

    log::info!(
        "{} frames written to {}",
        presenter.frames_written(),
        cfg.output.display()
    );
    Ok(())
}

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = get_command().get_matches();

    let cfg = match Config::from_args(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };
    log::debug!("{:?}", cfg);

    if let Err(e) = run(cfg) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
