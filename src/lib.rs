pub mod bounds;
pub mod cli;
pub mod error;
pub mod io;
pub mod pointcloud;
pub mod sampling;
pub mod settings;

#[cfg(feature = "viz")]
pub mod viz;

pub use crate::error::CloudError;
pub use crate::pointcloud::PointCloud;
pub use crate::sampling::{random_point_cloud, UniformSampler, DEFAULT_NUM_POINTS};
pub use crate::settings::{PointColorMode, ViewerSettings};
