mod box3d;
pub use box3d::{Box3D, Box3Df};

mod sphere3d;
pub use sphere3d::Sphere3Df;
