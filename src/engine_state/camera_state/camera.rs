//! # Camera Implementation
//!
//! - `Camera`: position and orientation of the free-flying viewer
//! - `Projection`: perspective projection settings
//! - `CameraController`: accumulates input between frames
//! - `CameraUniform`: packed data for the chunk shader

use cgmath::*;
use std::f32::consts::FRAC_PI_2;
use web_time::Duration;

use crate::engine_state::{
    math::{swizzle, swizzle_set},
    PlayerAction,
};

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// Maps clip-space Z from [-1, 1] to [0, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Safe limit for pitch to prevent gimbal lock
const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// Ground-plane (x, z) components of a world vector.
const GROUND_PLANE: [usize; 2] = [0, 2];

/// A first-person camera in 3D space.
///
/// Yaw is measured from +X towards +Z; pitch from the horizon towards +Y.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation (around Y axis) in radians
    pub yaw: Rad<f32>,
    /// Vertical rotation (around X axis) in radians
    pub pitch: Rad<f32>,
}

impl Camera {
    /// Creates a new camera with the specified position and orientation.
    ///
    /// # Example
    /// ```rust
    /// use cgmath::{Deg, Point3};
    /// use voxel_chunk_mesher::engine_state::camera_state::camera::Camera;
    ///
    /// let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
    /// assert!((camera.view_direction().x - 1.0).abs() < 1e-6);
    /// ```
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        }
    }

    /// Unit vector the camera looks along.
    pub fn view_direction(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.sin_cos();
        Vector3::new(pitch_cos * yaw_cos, pitch_sin, pitch_cos * yaw_sin).normalize()
    }

    /// Calculates the view matrix for this camera.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.view_direction(), Vector3::unit_y())
    }

    /// Applies and resets the input accumulated in `controller`.
    ///
    /// Horizontal movement stays on the ground plane whatever the pitch.
    pub fn get_controller_updates_and_reset_controller(
        &mut self,
        controller: &mut CameraController,
        dt: Duration,
    ) {
        let dt = dt.as_secs_f32();

        let [ground_x, ground_z] = swizzle(&self.view_direction(), GROUND_PLANE);
        let forward = Vector2::new(ground_x, ground_z);
        let forward = if forward.magnitude2() > 0.0 {
            forward.normalize()
        } else {
            Vector2::new(self.yaw.0.cos(), self.yaw.0.sin())
        };
        let right = Vector2::new(-forward.y, forward.x);

        let planar = forward * (controller.amount_forward - controller.amount_backward)
            + right * (controller.amount_right - controller.amount_left);
        let mut step = Vector3::zero();
        swizzle_set(&mut step, GROUND_PLANE, (planar * controller.speed * dt).into());
        step.y = (controller.amount_up - controller.amount_down) * controller.speed * dt;
        self.position += step;

        self.yaw += Rad(controller.rotate_horizontal) * controller.sensitivity * dt;
        self.pitch += Rad(-controller.rotate_vertical) * controller.sensitivity * dt;
        self.pitch = Rad(self.pitch.0.clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2));

        controller.reset();
    }
}

/// A camera's projection matrix parameters.
#[derive(Debug)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection for a `width` x `height` viewport.
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Perspective projection combined with the OpenGL to WGPU transform.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Tracks movement keys and mouse input until the next camera update.
#[derive(Debug)]
pub struct CameraController {
    amount_left: f32,
    amount_right: f32,
    amount_forward: f32,
    amount_backward: f32,
    amount_up: f32,
    amount_down: f32,

    rotate_horizontal: f32,
    rotate_vertical: f32,

    speed: f32,
    sensitivity: f32,
}

impl CameraController {
    /// Creates a controller moving at `speed` blocks per second.
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            amount_left: 0.0,
            amount_right: 0.0,
            amount_forward: 0.0,
            amount_backward: 0.0,
            amount_up: 0.0,
            amount_down: 0.0,
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            speed,
            sensitivity,
        }
    }

    /// Records the movement and look input of one frame.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        let amount = |pressed: bool| if pressed { 1.0 } else { 0.0 };
        self.amount_forward = amount(actions.move_forward);
        self.amount_backward = amount(actions.move_backward);
        self.amount_left = amount(actions.move_left);
        self.amount_right = amount(actions.move_right);
        self.amount_up = amount(actions.move_up);
        self.amount_down = amount(actions.move_down);

        if let Some((delta_x, delta_y)) = actions.rotate_view {
            self.rotate_horizontal = delta_x as f32;
            self.rotate_vertical = delta_y as f32;
        }
    }

    /// Whether any input is waiting to be applied.
    pub fn has_updates(&self) -> bool {
        self.amount_forward > 0.0
            || self.amount_backward > 0.0
            || self.amount_left > 0.0
            || self.amount_right > 0.0
            || self.amount_up > 0.0
            || self.amount_down > 0.0
            || self.rotate_horizontal != 0.0
            || self.rotate_vertical != 0.0
    }

    fn reset(&mut self) {
        *self = Self::new(self.speed, self.sensitivity);
    }
}

/// Camera data laid out for the chunk shader's uniform buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    // cgmath types are not Pod, so the matrix is stored as plain arrays
    view_proj: [[f32; 4]; 4],
    position: [f32; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: Matrix4::identity().into(),
            position: [0.0; 4],
        }
    }
}

impl CameraUniform {
    /// Recomputes the view-projection matrix and eye position.
    pub fn update_view_proj_and_pos(&mut self, camera: &Camera, projection: &Projection) {
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
        self.position = camera.position.to_homogeneous().into();
    }
}
