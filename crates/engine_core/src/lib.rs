//! Core engine types shared by the Cowduction crates.
//!
//! This crate provides the foundational types used across all systems:
//! - Rays for aiming and world queries
//! - Fixed-step time management

pub mod ray;
pub mod time;

pub use ray::*;
pub use time::*;

// Re-export commonly used types
pub use glam::Vec3;
