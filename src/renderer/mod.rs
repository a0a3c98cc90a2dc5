//! WebGPU rendering module
//!
//! Draws the ground grid and the player/obstacle cubes from a perspective
//! chase camera.

pub mod camera;
pub mod mesh;
pub mod pipeline;
pub mod texture;

pub use camera::Camera;
pub use pipeline::{DrawItem, SceneRenderState, scene_items};
