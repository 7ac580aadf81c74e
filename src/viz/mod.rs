pub mod controllers;
pub mod geometry;

mod manager;
pub use manager::Manager;

mod window;
pub use window::Window;

pub mod node;
pub mod scene;

mod virtual_camera;
pub use virtual_camera::{VirtualCamera, VirtualCameraSphericalBuilder};

mod virtual_projection;
pub use virtual_projection::{PerspectiveVirtualProjectionBuilder, VirtualProjection};

mod geoviewer;
pub use geoviewer::{draw_geometries, GeoViewer};

#[cfg(test)]
mod unit_test;
