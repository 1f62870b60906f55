//! # Camera State Management
//!
//! - Camera position and orientation tracking
//! - View and projection matrix calculations
//! - Player input processing for camera control
//! - Chunk-based position tracking for the viewer
//!
//! The camera is CPU-side only; the uniform it produces is written to the GPU
//! by the engine.

use cgmath::{Deg, Point3};

use camera::{Camera, CameraController, CameraUniform, Projection};

use super::{config::CameraConfig, voxels::world::World, PlayerAction};

pub mod camera;

/// Name of the GPU buffer used for camera uniform data
pub const CAMERA_BUFFER_NAME: &str = "camera_buffer";

/// Camera, its controller and the uniform derived from them.
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    /// GPU-optimized camera data for shaders
    pub camera_uniform: CameraUniform,
    /// Handles player input and camera movement
    pub camera_controller: CameraController,
}

impl CameraState {
    /// Places the camera as described by `config`.
    pub fn new(config: &CameraConfig, projection: &Projection) -> Self {
        let camera = Camera::new(
            Point3::from(config.position),
            Deg(config.yaw_degrees),
            Deg(config.pitch_degrees),
        );
        let camera_controller = CameraController::new(config.speed, config.sensitivity);

        let mut camera_uniform = CameraUniform::default();
        camera_uniform.update_view_proj_and_pos(&camera, projection);

        CameraState {
            camera,
            camera_uniform,
            camera_controller,
        }
    }

    /// Processes player input actions and updates the camera controller state.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.camera_controller.intake_actions(actions);
    }

    /// Applies pending input and refreshes the uniform.
    ///
    /// # Returns
    /// - `Some(CameraUpdates)` if the camera moved or turned
    /// - `None` if no input was pending
    pub fn update(&mut self, dt: web_time::Duration, projection: &Projection) -> Option<CameraUpdates> {
        if !self.camera_controller.has_updates() {
            return None;
        }

        self.camera
            .get_controller_updates_and_reset_controller(&mut self.camera_controller, dt);
        self.camera_uniform
            .update_view_proj_and_pos(&self.camera, projection);

        let position = self.camera.position;
        let block = Point3::new(
            position.x.floor() as i32,
            position.y.floor() as i32,
            position.z.floor() as i32,
        );
        Some(CameraUpdates {
            new_chunk_position: World::chunk_pos(block),
        })
    }

    /// Recomputes the uniform for a new projection, e.g. after a resize.
    pub fn refresh_uniform(&mut self, projection: &Projection) {
        self.camera_uniform
            .update_view_proj_and_pos(&self.camera, projection);
    }

    /// The uniform as bytes, ready to be written to [`CAMERA_BUFFER_NAME`].
    pub fn uniform_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.camera_uniform)
    }
}

/// What changed in a camera update.
pub struct CameraUpdates {
    /// The chunk the camera is in after the update
    pub new_chunk_position: Point3<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_the_chunk_after_moving() {
        let config = CameraConfig {
            position: [15.5, 0.5, -0.5],
            yaw_degrees: 0.0,
            pitch_degrees: 0.0,
            speed: 1.0,
            ..CameraConfig::default()
        };
        let projection = Projection::new(640, 480, Deg(45.0), 0.1, 100.0);
        let mut state = CameraState::new(&config, &projection);

        assert!(state.update(web_time::Duration::from_millis(16), &projection).is_none());

        state.intake_actions(&PlayerAction {
            move_forward: true,
            ..PlayerAction::default()
        });
        let updates = state
            .update(web_time::Duration::from_secs(1), &projection)
            .expect("camera should move");

        assert_eq!(updates.new_chunk_position, Point3::new(1, 0, -1));
        assert_eq!(state.uniform_bytes().len(), std::mem::size_of::<CameraUniform>());
    }
}
