//! Decorative falling-bills particle engine and its wgpu/winit host pieces.

pub mod config;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod input;
pub mod page;
pub mod particles;
pub mod surface;
pub mod types;

pub use config::{DeviceProfile, EngineConfig, Environment, HostSettings, ShapeStyle};
pub use engine::ParticleEngine;
pub use surface::{DrawSurface, SurfaceMetrics};
