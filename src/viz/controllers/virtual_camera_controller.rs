use nalgebra_glm::{Mat4, Vec2};
use winit::event::{MouseButton, VirtualKeyCode};

use crate::viz::{virtual_camera::VirtualCameraSphericalBuilder, VirtualCamera};

use super::{FrameStepInfo, SceneState};

pub trait VirtualCameraControl {
    fn key_event(&mut self, frame_info: &FrameStepInfo, scene_state: &SceneState);
    fn cursor_moved(&mut self, x: f64, y: f64, frame_info: &FrameStepInfo, scene_state: &SceneState);
    fn view_matrix(&self) -> Mat4;
    fn projection_matrix(&self) -> Mat4;
}

/// W/S move along the view direction, A/D strafe, left mouse drag rotates.
/// `velocity` is in world units per second.
pub struct WASDVirtualCameraControl {
    pub camera: VirtualCamera,
    pub velocity: f32,
    pub rotation_sensitivity: Vec2,
    cursor_last_position: Option<Vec2>,
}

impl WASDVirtualCameraControl {
    pub fn new(camera: VirtualCamera, velocity: f32) -> Self {
        Self {
            camera,
            velocity,
            ..Default::default()
        }
    }

    /// Camera from `camera_builder`, moving `move_velocity` sphere radii per second.
    pub fn fit_sphere_in_frustum(
        camera_builder: VirtualCameraSphericalBuilder,
        move_velocity: f32,
    ) -> Self {
        let move_velocity = move_velocity * camera_builder.sphere.radius;
        Self::new(camera_builder.build(), move_velocity)
    }
}

impl Default for WASDVirtualCameraControl {
    fn default() -> Self {
        Self {
            camera: VirtualCamera::default(),
            velocity: 0.25,
            rotation_sensitivity: Vec2::new(0.5, 0.5),
            cursor_last_position: None,
        }
    }
}

impl VirtualCameraControl for WASDVirtualCameraControl {
    fn key_event(&mut self, frame_info: &FrameStepInfo, _scene_state: &SceneState) {
        let move_increment = self.velocity * frame_info.elapsed_time.as_secs_f32();

        if frame_info.is_key_pressed(VirtualKeyCode::W) {
            self.camera.translate_eye(move_increment);
        }

        if frame_info.is_key_pressed(VirtualKeyCode::S) {
            self.camera.translate_eye(-move_increment);
        }

        if frame_info.is_key_pressed(VirtualKeyCode::A) {
            self.camera.translate_right(-move_increment);
        }

        if frame_info.is_key_pressed(VirtualKeyCode::D) {
            self.camera.translate_right(move_increment);
        }
    }

    fn cursor_moved(&mut self, x: f64, y: f64, frame_info: &FrameStepInfo, _: &SceneState) {
        let current_position = Vec2::new(x as f32, y as f32);
        let last_position = self.cursor_last_position.replace(current_position);

        if !frame_info.is_mouse_pressed(MouseButton::Left) || frame_info.viewport_size[0] <= 0.0
        {
            return;
        }

        if let Some(last_position) = last_position {
            let difference = last_position - current_position;
            let width = frame_info.viewport_size[0];
            self.camera
                .rotate_up_axis(difference[0] / (width * self.rotation_sensitivity[0]));
            self.camera
                .rotate_right_axis(difference[1] / (width * self.rotation_sensitivity[1]));
        }
    }

    fn view_matrix(&self) -> Mat4 {
        self.camera.matrix()
    }

    fn projection_matrix(&self) -> Mat4 {
        self.camera.projection.matrix()
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use nalgebra::Vector3;
    use winit::event::{ElementState, MouseButton, VirtualKeyCode};

    use crate::{
        bounds::Sphere3Df,
        viz::{
            controllers::{FrameStepInfo, SceneState},
            virtual_camera::VirtualCameraSphericalBuilder,
        },
    };

    use super::{VirtualCameraControl, WASDVirtualCameraControl};

    fn sphere() -> Sphere3Df {
        Sphere3Df {
            center: Vector3::new(2.0, 3.0, 4.0),
            radius: 3.0,
        }
    }

    #[test]
    pub fn test_should_instantiate_camera_controller() {
        let controller = WASDVirtualCameraControl::fit_sphere_in_frustum(
            VirtualCameraSphericalBuilder::fit(&sphere(), std::f32::consts::PI / 2.0),
            0.05,
        );

        controller.view_matrix();
        controller.projection_matrix();
        assert!((controller.velocity - 0.15).abs() < 1e-6);
    }

    #[test]
    pub fn test_w_moves_forward() {
        let mut controller = WASDVirtualCameraControl::fit_sphere_in_frustum(
            VirtualCameraSphericalBuilder::fit(&sphere(), std::f32::consts::FRAC_PI_2),
            0.05,
        );
        let start = controller.camera.eye;
        let distance_before = (start - sphere().center).norm();

        let mut frame_info = FrameStepInfo::new([640.0, 480.0]);
        frame_info.elapsed_time = Duration::from_millis(100);
        frame_info
            .keyboard_state
            .insert(VirtualKeyCode::W, ElementState::Pressed);
        let scene_state = SceneState {
            world_bounds: sphere(),
        };

        controller.key_event(&frame_info, &scene_state);
        let distance_after = (controller.camera.eye - sphere().center).norm();
        assert!(distance_after < distance_before);
    }

    #[test]
    pub fn test_drag_rotates_only_with_button() {
        let mut controller = WASDVirtualCameraControl::default();
        let view_before = controller.camera.view;
        let mut frame_info = FrameStepInfo::new([640.0, 480.0]);
        let scene_state = SceneState::default();

        controller.cursor_moved(10.0, 10.0, &frame_info, &scene_state);
        controller.cursor_moved(200.0, 10.0, &frame_info, &scene_state);
        assert_eq!(controller.camera.view, view_before);

        frame_info
            .mouse_state
            .insert(MouseButton::Left, ElementState::Pressed);
        controller.cursor_moved(300.0, 10.0, &frame_info, &scene_state);
        assert_ne!(controller.camera.view, view_before);
        assert!((controller.camera.view.norm() - 1.0).abs() < 1e-5);
    }
}
