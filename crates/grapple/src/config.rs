//! Tunable grapple parameters.

use physics::RopeLinkParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grapple tuning. Usually embedded in the game's `config.ron`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrappleConfig {
    /// Seconds for the probe to fly out (and, on a miss, to fly back).
    #[serde(default = "default_grapple_time")]
    pub grapple_time: f32,
    /// Seconds the probe hangs at the miss point before retracting.
    #[serde(default = "default_grapple_cooldown")]
    pub grapple_cooldown: f32,
    /// Aim range and hard rope length ceiling.
    #[serde(default = "default_max_capture_length")]
    pub max_capture_length: f32,
    /// Rope segment count.
    #[serde(default = "default_number_of_joints")]
    pub number_of_joints: usize,
    /// Reel rate in units per second.
    #[serde(default = "default_capture_speed")]
    pub capture_speed: f32,
    /// Extra slack per segment when the chain is first built.
    #[serde(default = "default_initial_slack_margin")]
    pub initial_slack_margin: f32,
    /// Mass of each intermediate rope link.
    #[serde(default = "default_link_mass")]
    pub link_mass: f32,
    /// Linear and angular damping of rope links.
    #[serde(default = "default_link_damping")]
    pub link_damping: f32,
    /// Target speed above which the beam starts braking it.
    #[serde(default = "default_velocity_clamp_threshold")]
    pub velocity_clamp_threshold: f32,
}

fn default_grapple_time() -> f32 {
    0.5
}
fn default_grapple_cooldown() -> f32 {
    0.5
}
fn default_max_capture_length() -> f32 {
    50.0
}
fn default_number_of_joints() -> usize {
    3
}
fn default_capture_speed() -> f32 {
    5.0
}
fn default_initial_slack_margin() -> f32 {
    0.1
}
fn default_link_mass() -> f32 {
    0.1
}
fn default_link_damping() -> f32 {
    1.0
}
fn default_velocity_clamp_threshold() -> f32 {
    1.0
}

impl Default for GrappleConfig {
    fn default() -> Self {
        Self {
            grapple_time: default_grapple_time(),
            grapple_cooldown: default_grapple_cooldown(),
            max_capture_length: default_max_capture_length(),
            number_of_joints: default_number_of_joints(),
            capture_speed: default_capture_speed(),
            initial_slack_margin: default_initial_slack_margin(),
            link_mass: default_link_mass(),
            link_damping: default_link_damping(),
            velocity_clamp_threshold: default_velocity_clamp_threshold(),
        }
    }
}

/// Why a [`GrappleConfig`] was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("number_of_joints must be at least 1")]
    NoJoints,
    #[error("{field} must be a finite value >= 0, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be a finite value > 0, got {value}")]
    NotPositive { field: &'static str, value: f32 },
}

impl GrappleConfig {
    /// Check every field. The first offending field wins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.number_of_joints < 1 {
            return Err(ConfigError::NoJoints);
        }

        positive("max_capture_length", self.max_capture_length)?;
        positive("link_mass", self.link_mass)?;
        non_negative("grapple_time", self.grapple_time)?;
        non_negative("grapple_cooldown", self.grapple_cooldown)?;
        non_negative("capture_speed", self.capture_speed)?;
        non_negative("initial_slack_margin", self.initial_slack_margin)?;
        non_negative("link_damping", self.link_damping)?;
        non_negative("velocity_clamp_threshold", self.velocity_clamp_threshold)?;
        Ok(())
    }

    /// Physical tuning for intermediate rope links.
    pub fn link_params(&self) -> RopeLinkParams {
        RopeLinkParams {
            mass: self.link_mass,
            damping: self.link_damping,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}
