use clap::Parser;
use randcloud::{cli::Args, error::CloudError, io::write_ply, PointCloud, ViewerSettings};

fn run(args: &Args) -> Result<(), CloudError> {
    let settings = args.viewer_settings()?;
    let point_cloud = args.sampler().sample_point_cloud()?;

    if let Some(path) = &args.save {
        write_ply(path, &point_cloud)?;
        log::info!("Saved {} points to {}", point_cloud.len(), path.display());
    }

    if args.no_window {
        return Ok(());
    }

    show(point_cloud, settings)
}

#[cfg(feature = "viz")]
fn show(point_cloud: PointCloud, settings: ViewerSettings) -> Result<(), CloudError> {
    randcloud::viz::draw_geometries(&[point_cloud], settings)
}

#[cfg(not(feature = "viz"))]
fn show(_point_cloud: PointCloud, _settings: ViewerSettings) -> Result<(), CloudError> {
    Err(CloudError::render(
        "viewer support is not compiled in, rebuild with `--features viz` or pass `--no-window`",
    ))
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_level.to_string()),
    )
    .init();

    if let Err(err) = run(&args) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
