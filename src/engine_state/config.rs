//! # Engine Configuration
//!
//! Runtime switches for meshing and buffer management, plus the camera and
//! demo-world settings used by the viewer. Every field has a default so a
//! partial (or missing) JSON file is always accepted.
//!
//! ```json
//! {
//!     "world": { "face_culling": false, "index_mode": "deduplicated" },
//!     "demo": { "extent": [4, 1, 4], "pattern": { "random": { "density": 0.2 } } }
//! }
//! ```

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;

use super::error::ConfigError;
use super::rendering::meshing::{IndexMode, MeshOptions};
use super::voxels::block::block_type::BlockType;

/// Top-level configuration for the engine and viewer.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Meshing and GPU buffer behaviour of the world.
    pub world: WorldConfig,
    /// Initial camera placement and controls.
    pub camera: CameraConfig,
    /// The world populated at startup.
    pub demo: DemoWorldConfig,
}

impl EngineConfig {
    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Parses a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads the file named by [`CONFIG_ENV_VAR`], else [`DEFAULT_CONFIG_FILE`]
    /// if it exists, else the defaults.
    pub fn discover() -> Self {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|path| path.exists()));
        Self::load_or_default(path.as_deref())
    }

    /// Loads `path` if given. A missing path or an unreadable file yields the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            info!("No configuration file, using defaults");
            return Self::default();
        };
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(err) => {
                warn!("Ignoring configuration {}: {}", path.display(), err);
                Self::default()
            }
        }
    }
}

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "VOXEL_CONFIG";

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Behaviour switches for `World`.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// When false, `update()` leaves the mesh cache untouched.
    pub mesh_enabled: bool,
    /// Global face culling switch. When false every face of every rendered block is emitted.
    pub face_culling: bool,
    /// How mesh vertices are indexed.
    pub index_mode: IndexMode,
    /// Dirty the neighbouring chunk when an edit lands on a chunk face.
    pub propagate_boundary_edits: bool,
    /// Delete GPU buffers whose chunk is no longer in the mesh cache.
    pub evict_unused_buffers: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            mesh_enabled: true,
            face_culling: true,
            index_mode: IndexMode::Unshared,
            propagate_boundary_edits: true,
            evict_unused_buffers: true,
        }
    }
}

impl WorldConfig {
    /// The options handed to the chunk mesher.
    pub fn mesh_options(&self) -> MeshOptions {
        MeshOptions {
            face_culling: self.face_culling,
            index_mode: self.index_mode,
        }
    }
}

/// Camera placement and control settings.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial eye position in world space.
    pub position: [f32; 3],
    /// Initial yaw in degrees.
    pub yaw_degrees: f32,
    /// Initial pitch in degrees.
    pub pitch_degrees: f32,
    /// Vertical field of view in degrees.
    pub fovy_degrees: f32,
    /// Movement speed in blocks per second.
    pub speed: f32,
    /// Mouse look sensitivity.
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [-24.0, 64.0, -24.0],
            yaw_degrees: 45.0,
            pitch_degrees: -35.0,
            fovy_degrees: 45.0,
            speed: 12.0,
            sensitivity: 0.4,
        }
    }
}

/// Fill pattern for the chunks of the demo world.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ChunkPattern {
    /// Every block solid.
    Filled,
    /// Alternating solid and air cells.
    Checkerboard,
    /// Each cell solid with the given probability.
    Random {
        /// Probability in `0.0..=1.0` that a cell is solid.
        density: f64,
    },
}

/// The chunk grid populated when the viewer starts.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoWorldConfig {
    /// Number of chunks along each axis, starting at chunk (0, 0, 0).
    pub extent: [i32; 3],
    /// Block type used for solid cells.
    pub block_type: BlockType,
    /// How each chunk is filled.
    pub pattern: ChunkPattern,
}

impl Default for DemoWorldConfig {
    fn default() -> Self {
        Self {
            extent: [3, 3, 3],
            block_type: BlockType::STONE,
            pattern: ChunkPattern::Filled,
        }
    }
}
