use std::{path::PathBuf, str::FromStr};

use clap::ArgMatches;
use volray::{
    color::{self, RGBA},
    render::RenderOptionsBuilder,
    CameraEvent, Interpolation, RenderOptions, SessionConfig, VolumeSource,
};

/// Parse all values of `key`, they were checked by validators
fn parse_values<T>(args: &ArgMatches, key: &str) -> Result<Vec<T>, String>
where
    T: FromStr,
{
    args.values_of(key)
        .into_iter()
        .flatten()
        .map(|v| v.parse::<T>().map_err(|_| format!("invalid value {v} of --{key}")))
        .collect()
}

/// Control points given as repeated `--key=a,b,...`, `n` numbers each
fn control_points(args: &ArgMatches, key: &str, n: usize) -> Result<Vec<Vec<f32>>, String> {
    let values: Vec<f32> = parse_values(args, key)?;
    if values.len() % n != 0 {
        return Err(format!("--{key} takes {n} numbers"));
    }
    Ok(values.chunks_exact(n).map(|c| c.to_vec()).collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    Perspective,
    Parallel,
}

/// App configuration
/// Config is built from args parsed by `clap`
#[derive(Debug)]
pub struct Config {
    /// Volume source and frame size
    pub session: SessionConfig,
    /// `None` keeps the renderer default
    pub sample_step: Option<f32>,
    pub projection: ProjectionKind,
    pub interpolation: Interpolation,
    pub shade: bool,
    pub early_ray_termination: bool,
    /// `None` uses the available parallelism
    pub threads: Option<usize>,
    pub background: RGBA,
    /// Empty lists keep the preset functions
    pub color_points: Vec<(f32, [f32; 3])>,
    pub opacity_points: Vec<(f32, f32)>,
    pub gradient_points: Vec<(f32, f32)>,
    /// Applied in order, one frame each
    pub events: Vec<CameraEvent>,
    /// Prefix of output files
    pub output: PathBuf,
}

impl Config {
    pub fn from_args(args: ArgMatches) -> Result<Config, String> {
        // Source, exactly one is present (arg group)
        let source = match (args.value_of_os("dicom"), args.value_of_os("raw")) {
            (Some(dir), None) => VolumeSource::Dicom(dir.into()),
            (None, Some(file)) => VolumeSource::Raw(file.into()),
            _ => return Err("exactly one of --dicom and --raw is required".into()),
        };

        // Resolution
        let size: Vec<usize> = parse_values(&args, "size")?;
        let (width, height) = match size[..] {
            [w, h] => (w, h),
            _ => return Err("--size takes 2 numbers".into()),
        };

        let sample_step = args
            .value_of("step")
            .map(|s| s.parse().map_err(|_| format!("invalid step {s}")))
            .transpose()?;

        let projection = match args.value_of("projection") {
            Some("parallel") => ProjectionKind::Parallel,
            _ => ProjectionKind::Perspective,
        };

        let interpolation = if args.is_present("nearest") {
            Interpolation::Nearest
        } else {
            Interpolation::Linear
        };

        let threads = args
            .value_of("threads")
            .map(|s| s.parse().map_err(|_| format!("invalid thread count {s}")))
            .transpose()?;

        let background = match parse_values::<f32>(&args, "background")?[..] {
            [r, g, b, a] => color::new(r, g, b, a),
            _ => return Err("--background takes 4 numbers".into()),
        };

        let color_points = control_points(&args, "color-point", 4)?
            .into_iter()
            .map(|p| (p[0], [p[1], p[2], p[3]]))
            .collect();
        let opacity_points = control_points(&args, "opacity-point", 2)?
            .into_iter()
            .map(|p| (p[0], p[1]))
            .collect();
        let gradient_points = control_points(&args, "gradient-point", 2)?
            .into_iter()
            .map(|p| (p[0], p[1]))
            .collect();

        let events = args
            .values_of("event")
            .into_iter()
            .flatten()
            .map(|e| e.parse::<CameraEvent>().map_err(|err| err.to_string()))
            .collect::<Result<_, _>>()?;

        // Has default value
        let output = args
            .value_of_os("output")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("frame"));

        Ok(Config {
            session: SessionConfig {
                source,
                width,
                height,
            },
            sample_step,
            projection,
            interpolation,
            shade: args.is_present("shade"),
            early_ray_termination: !args.is_present("no-ert"),
            threads,
            background,
            color_points,
            opacity_points,
            gradient_points,
            events,
            output,
        })
    }

    /// Render options apart from resolution, which comes from the session config
    pub fn render_options(&self) -> RenderOptionsBuilder {
        let mut builder = RenderOptions::builder()
            .early_ray_termination(self.early_ray_termination)
            .background(self.background);
        if let Some(step) = self.sample_step {
            builder = builder.sample_step(step);
        }
        if let Some(threads) = self.threads {
            builder = builder.worker_count(threads);
        }
        builder
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::args::get_command;

    fn config(args: &[&str]) -> Config {
        let matches = get_command()
            .try_get_matches_from(std::iter::once("vol_render").chain(args.iter().copied()))
            .unwrap();
        Config::from_args(matches).unwrap()
    }

    #[test]
    fn defaults() {
        let cfg = config(&["--dicom", "scans/head"]);
        assert_eq!(cfg.session.source, VolumeSource::Dicom("scans/head".into()));
        assert_eq!((cfg.session.width, cfg.session.height), (640, 480));
        assert_eq!(cfg.projection, ProjectionKind::Perspective);
        assert_eq!(cfg.interpolation, Interpolation::Linear);
        assert!(!cfg.shade);
        assert!(cfg.early_ray_termination);
        assert_eq!(cfg.threads, None);
        assert_eq!(cfg.background, color::black());
        assert!(cfg.color_points.is_empty());
        assert!(cfg.events.is_empty());
        assert_eq!(cfg.output, PathBuf::from("frame"));
    }

    #[test]
    fn all_options() {
        let cfg = config(&[
            "--raw",
            "cube.vol",
            "--size=320,200",
            "--step",
            "0.25",
            "--projection",
            "parallel",
            "--nearest",
            "--shade",
            "--no-ert",
            "--threads",
            "3",
            "--background=1,1,1,0",
            "--color-point=0,0,0,0",
            "--color-point=255,1,0.5,0",
            "--opacity-point=0,0",
            "--opacity-point=255,1",
            "--gradient-point=0,0",
            "--event",
            "orbit:-30,10",
            "--event",
            "zoom:2",
            "-o",
            "out/shot",
        ]);

        assert_eq!(cfg.session.source, VolumeSource::Raw("cube.vol".into()));
        assert_eq!((cfg.session.width, cfg.session.height), (320, 200));
        assert_eq!(cfg.sample_step, Some(0.25));
        assert_eq!(cfg.projection, ProjectionKind::Parallel);
        assert_eq!(cfg.interpolation, Interpolation::Nearest);
        assert!(cfg.shade);
        assert!(!cfg.early_ray_termination);
        assert_eq!(cfg.threads, Some(3));
        assert_eq!(cfg.background, color::new(1.0, 1.0, 1.0, 0.0));
        assert_eq!(
            cfg.color_points,
            vec![(0.0, [0.0, 0.0, 0.0]), (255.0, [1.0, 0.5, 0.0])]
        );
        assert_eq!(cfg.opacity_points, vec![(0.0, 0.0), (255.0, 1.0)]);
        assert_eq!(cfg.gradient_points, vec![(0.0, 0.0)]);
        assert_eq!(
            cfg.events,
            vec![
                CameraEvent::Orbit {
                    azimuth: -30.0,
                    elevation: 10.0
                },
                CameraEvent::Zoom { factor: 2.0 }
            ]
        );
        assert_eq!(cfg.output, PathBuf::from("out/shot"));

        let options = cfg.render_options().resolution((1, 1)).build().unwrap();
        assert_eq!(options.sample_step, 0.25);
        assert_eq!(options.worker_count, 3);
        assert!(!options.early_ray_termination);
    }

    #[test]
    fn source_is_required() {
        assert!(get_command()
            .try_get_matches_from(["vol_render", "--size=10,10"])
            .is_err());
        assert!(get_command()
            .try_get_matches_from(["vol_render", "--dicom", "a", "--raw", "b"])
            .is_err());
    }

    #[test]
    fn rejects_bad_event() {
        assert!(get_command()
            .try_get_matches_from(["vol_render", "--dicom", "a", "--event", "spin:1"])
            .is_err());
    }
}
