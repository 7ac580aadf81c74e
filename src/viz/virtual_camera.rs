use nalgebra::Vector3;
use nalgebra_glm::Vec3;

use crate::bounds::Sphere3Df;

use super::{virtual_projection::PerspectiveVirtualProjectionBuilder, VirtualProjection};

const VULKAN_UP: Vector3<f32> = Vector3::new(0.0, -1.0, 0.0);

/// Virtual camera to move around in the visualization.
pub struct VirtualCamera {
    /// Camera position point.
    pub eye: Vec3,
    /// Viewing vector. Always normalized.
    pub view: Vec3,
    /// Up vector. Always normalized.
    pub up: Vec3,
    /// Projection parameters.
    pub projection: VirtualProjection,
}

impl Default for VirtualCamera {
    fn default() -> VirtualCamera {
        Self {
            eye: Vec3::new(0.0, 0.0, -1.0),
            view: Vec3::new(0.0, 0.0, 1.0),
            up: VULKAN_UP,
            projection: VirtualProjection::default(),
        }
    }
}

impl VirtualCamera {
    pub fn right_vector(&self) -> Vec3 {
        self.view.cross(&self.up).normalize()
    }

    pub fn rotate_right_axis(&mut self, rad_angle: f32) {
        let right_vec = self.right_vector();
        self.view = nalgebra_glm::quat_rotate_vec3(
            &nalgebra_glm::quat_angle_axis(rad_angle, &right_vec),
            &self.view,
        )
        .normalize();

        let right_vec = self.view.cross(&VULKAN_UP);
        self.up = right_vec.cross(&self.view).normalize();
    }

    pub fn rotate_up_axis(&mut self, rad_angle: f32) {
        self.view = nalgebra_glm::quat_rotate_vec3(
            &nalgebra_glm::quat_angle_axis(rad_angle, &self.up),
            &self.view,
        )
        .normalize();
    }

    pub fn translate_eye(&mut self, amount: f32) {
        self.eye += self.view * amount;
    }

    pub fn translate_right(&mut self, amount: f32) {
        self.eye += self.right_vector() * amount;
    }

    pub fn matrix(&self) -> nalgebra_glm::Mat4 {
        nalgebra_glm::look_at(&self.eye, &(self.eye + self.view), &self.up)
    }
}

/// Places a camera on a sphere around the scene bounds, looking at its center.
pub struct VirtualCameraSphericalBuilder {
    pub sphere: Sphere3Df,
    elevation: f32,
    azimuth: f32,
    distance: f32,
    projection: PerspectiveVirtualProjectionBuilder,
}

impl Default for VirtualCameraSphericalBuilder {
    fn default() -> Self {
        Self {
            sphere: Sphere3Df {
                center: Vector3::zeros(),
                radius: 1.0,
            },
            elevation: 0.0,
            azimuth: 0.0,
            distance: 1.0,
            projection: PerspectiveVirtualProjectionBuilder {
                fov_y: std::f32::consts::FRAC_PI_4,
                aspect_ratio: 1.0,
                near_plane: 1.0,
                far_plane: 10.0,
            },
        }
    }
}

impl VirtualCameraSphericalBuilder {
    /// Distance and clip planes for the whole `sphere` to be inside the vertical field of view.
    /// Empty spheres are replaced by a unit sphere at the origin.
    pub fn fit(sphere: &Sphere3Df, fov_y: f32) -> Self {
        let sphere = if sphere.is_empty() {
            log::debug!("Fitting camera to an empty scene, using the unit sphere");
            Sphere3Df {
                center: Vector3::zeros(),
                radius: 1.0,
            }
        } else {
            Sphere3Df {
                center: sphere.center,
                radius: sphere.radius.max(1e-3),
            }
        };

        let distance = sphere.radius / (fov_y / 2.0).sin();
        let mut builder = Self {
            sphere,
            distance,
            ..Default::default()
        };
        builder
            .projection
            .fov_y(fov_y)
            .near_plane(sphere.radius * 0.01)
            .far_plane(distance + sphere.radius * 10.0);
        builder
    }

    pub fn elevation(mut self, value: f32) -> Self {
        self.elevation = value;
        self
    }

    pub fn azimuth(mut self, value: f32) -> Self {
        self.azimuth = value;
        self
    }

    pub fn fov_y(mut self, value: f32) -> Self {
        self.projection.fov_y(value);
        self
    }

    pub fn aspect_ratio(mut self, value: f32) -> Self {
        self.projection.aspect_ratio(value);
        self
    }

    pub fn near_plane(mut self, value: f32) -> Self {
        self.projection.near_plane(value);
        self
    }

    pub fn far_plane(mut self, value: f32) -> Self {
        self.projection.far_plane(value);
        self
    }

    /// Projection parameters, so that the aspect ratio can be updated after resizes.
    pub fn projection_builder(&self) -> PerspectiveVirtualProjectionBuilder {
        self.projection
    }

    pub fn build(&self) -> VirtualCamera {
        let theta = self.elevation;
        let phi = self.azimuth + std::f32::consts::PI * 1.5;

        let position = Vec3::new(
            phi.cos() * self.distance * theta.cos(),
            theta.sin() * self.distance,
            phi.sin() * self.distance * theta.cos(),
        ) + self.sphere.center;

        let view = (self.sphere.center - position).normalize();
        let right = view.cross(&VULKAN_UP).normalize();
        let up = right.cross(&view).normalize();

        VirtualCamera {
            eye: position,
            view,
            up,
            projection: self.projection.build(),
        }
    }
}
