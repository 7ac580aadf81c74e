mod datatypes;
pub use datatypes::{ColorU8, PositionF32};

mod vkpointcloud;
pub use vkpointcloud::{VkPointCloud, VkPointCloudNode};
