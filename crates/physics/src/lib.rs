//! Physics system using Rapier3D for Cowduction.

pub mod collision;
pub mod physics_world;
pub mod raycast;
pub mod rope;

pub use collision::*;
pub use physics_world::*;
pub use raycast::*;
pub use rope::*;

// Re-export Rapier for downstream crates
pub use rapier3d;

// Re-export common Rapier types
pub use rapier3d::prelude::{ColliderHandle, ImpulseJointHandle, InteractionGroups, RigidBodyHandle};
