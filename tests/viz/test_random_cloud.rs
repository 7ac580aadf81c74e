use randcloud::{random_point_cloud, viz::GeoViewer, ViewerSettings, DEFAULT_NUM_POINTS};

// Interactive: returns once the window is closed.
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut point_cloud = random_point_cloud(DEFAULT_NUM_POINTS).unwrap();
    assert_eq!(point_cloud.points.dim(), (DEFAULT_NUM_POINTS, 3));

    let mut viewer = GeoViewer::new(ViewerSettings::default()).unwrap();
    viewer.add_point_cloud(&point_cloud).unwrap();

    // Red copy next to the first one, key 2 hides it.
    point_cloud.paint_uniform_color([255, 0, 0]);
    point_cloud.points += 1.5;
    viewer.add_point_cloud(&point_cloud).unwrap();

    viewer.run().unwrap();
}
