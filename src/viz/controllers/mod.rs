mod state;
pub use state::{FrameStepInfo, SceneState};

mod virtual_camera_controller;
pub use virtual_camera_controller::{VirtualCameraControl, WASDVirtualCameraControl};
