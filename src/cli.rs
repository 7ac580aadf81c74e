use std::path::PathBuf;

use clap::Parser;

use crate::error::CloudError;
use crate::sampling::{cube_bounds, UniformSampler, DEFAULT_NUM_POINTS};
use crate::settings::ViewerSettings;

/// Generates a random 3D point cloud and shows it in an interactive window.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Number of points to sample, at most 100 million.
    #[arg(short, long, default_value_t = DEFAULT_NUM_POINTS)]
    pub num_points: usize,

    /// Seed for reproducible samples. Without it every run differs.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Lower corner of the sampling cube, on all axes.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub min: f32,

    /// Upper corner of the sampling cube, on all axes (exclusive).
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub max: f32,

    /// JSON file with viewer settings.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Window title, overrides the config file.
    #[arg(long)]
    pub title: Option<String>,

    /// Point size in pixels, overrides the config file.
    #[arg(long)]
    pub point_size: Option<f32>,

    /// Also write the sampled points to this PLY file.
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Do not open the viewer.
    #[arg(long)]
    pub no_window: bool,

    /// Verbosity of the command line output.
    #[arg(long, default_value = "info")]
    pub log_level: log::LevelFilter,
}

impl Args {
    pub fn sampler(&self) -> UniformSampler {
        UniformSampler::new(self.num_points)
            .bounds(cube_bounds(self.min, self.max))
            .seed(self.seed)
    }

    /// Loads the config file, if any, then applies the command line overrides.
    pub fn viewer_settings(&self) -> Result<ViewerSettings, CloudError> {
        let mut settings = match &self.config {
            Some(path) => ViewerSettings::from_json_file(path)?,
            None => ViewerSettings::default(),
        };
        if let Some(title) = &self.title {
            settings.window_title = title.clone();
        }
        if let Some(point_size) = self.point_size {
            settings.point_size = point_size;
        }
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::{CommandFactory, Parser};

    use super::Args;
    use crate::error::CloudError;

    #[test]
    fn test_command_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults_match_plain_run() {
        let args = Args::try_parse_from(["randcloud"]).unwrap();
        assert_eq!(args.num_points, 1000);
        assert_eq!(args.seed, None);
        assert!(!args.no_window);

        let sampler = args.sampler();
        assert_eq!(sampler.bounds, crate::bounds::Box3Df::unit());

        let settings = args.viewer_settings().unwrap();
        assert_eq!(settings.window_title, "3D Point Cloud");
    }

    #[test]
    fn test_overrides() {
        let mut config = tempfile::NamedTempFile::new().unwrap();
        write!(config, r#"{{"window_title": "From file", "point_size": 2.0}}"#).unwrap();

        let args = Args::try_parse_from([
            "randcloud",
            "-n",
            "50",
            "--seed",
            "3",
            "--min",
            "-1",
            "--config",
            config.path().to_str().unwrap(),
            "--point-size",
            "6",
        ])
        .unwrap();

        let points = args.sampler().sample().unwrap();
        assert_eq!(points.nrows(), 50);
        assert!(points.iter().all(|v| (-1.0..1.0).contains(v)));

        let settings = args.viewer_settings().unwrap();
        assert_eq!(settings.window_title, "From file");
        assert_eq!(settings.point_size, 6.0);
    }

    #[test]
    fn test_rejects_unsampleable_input() {
        let args =
            Args::try_parse_from(["randcloud", "--min", "-3e38", "--max", "3e38"]).unwrap();
        assert!(matches!(
            args.sampler().sample(),
            Err(CloudError::InvalidParameter(_))
        ));

        let args = Args::try_parse_from(["randcloud", "-n", "18446744073709551615"]).unwrap();
        assert!(matches!(
            args.sampler().sample_point_cloud(),
            Err(CloudError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_bad_point_size() {
        let args = Args::try_parse_from(["randcloud", "--point-size", "0"]).unwrap();
        assert!(matches!(
            args.viewer_settings(),
            Err(CloudError::InvalidParameter(_))
        ));
    }
}
