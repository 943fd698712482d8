//! Game configuration (beam tuning, herd, craft, session). Loaded from config.ron at startup.

use grapple::GrappleConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persistent game settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    /// Tractor beam tuning.
    #[serde(default)]
    pub grapple: GrappleConfig,
    #[serde(default)]
    pub herd: HerdConfig,
    #[serde(default)]
    pub ufo: UfoConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HerdConfig {
    #[serde(default = "default_cows")]
    pub cows: usize,
    #[serde(default = "default_farmers")]
    pub farmers: usize,
    /// Creatures spawn and wander inside this radius around the origin.
    #[serde(default = "default_pasture_radius")]
    pub pasture_radius: f32,
    /// Walking speed in units per second.
    #[serde(default = "default_max_speed")]
    pub max_speed: f32,
    /// Seconds before a new destination is picked even if the old one wasn't reached.
    #[serde(default = "default_max_wander_time")]
    pub max_wander_time: f32,
    /// Seconds a released creature stays limp before its AI takes over again.
    #[serde(default = "default_recovery_time")]
    pub recovery_time: f32,
    /// Score for abducting one cow.
    #[serde(default = "default_milk")]
    pub milk: f32,
    /// Fraction of cows that fight the beam.
    #[serde(default = "default_tug_chance")]
    pub tug_chance: f64,
    #[serde(default = "default_creature_density")]
    pub creature_density: f32,
    /// How farmers shoot back.
    #[serde(default)]
    pub gunner: GunnerConfig,
}

fn default_cows() -> usize {
    8
}
fn default_farmers() -> usize {
    2
}
fn default_pasture_radius() -> f32 {
    40.0
}
fn default_max_speed() -> f32 {
    8.0
}
fn default_max_wander_time() -> f32 {
    10.0
}
fn default_recovery_time() -> f32 {
    3.0
}
fn default_milk() -> f32 {
    10.0
}
fn default_tug_chance() -> f64 {
    0.25
}
fn default_creature_density() -> f32 {
    1.0
}

impl Default for HerdConfig {
    fn default() -> Self {
        Self {
            cows: default_cows(),
            farmers: default_farmers(),
            pasture_radius: default_pasture_radius(),
            max_speed: default_max_speed(),
            max_wander_time: default_max_wander_time(),
            recovery_time: default_recovery_time(),
            milk: default_milk(),
            tug_chance: default_tug_chance(),
            creature_density: default_creature_density(),
            gunner: GunnerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GunnerConfig {
    /// Farmers lock on to a craft in sight closer than this.
    #[serde(default = "default_lock_on_distance")]
    pub lock_on_distance: f32,
    /// Walking speed while locked on.
    #[serde(default = "default_aim_speed")]
    pub aim_speed: f32,
    /// Seconds between shots.
    #[serde(default = "default_fire_rate")]
    pub fire_rate: f32,
    #[serde(default = "default_starting_ammo")]
    pub starting_ammo: u32,
    /// Farmers refill their ammo within this radius of the pasture centre.
    #[serde(default = "default_field_radius")]
    pub field_radius: f32,
    #[serde(default = "default_projectile_speed")]
    pub projectile_speed: f32,
    /// Hull damage per hit.
    #[serde(default = "default_projectile_damage")]
    pub projectile_damage: f32,
    /// Impulse given to the craft per hit.
    #[serde(default = "default_projectile_knockback")]
    pub projectile_knockback: f32,
    /// Seconds before a stray shot is dropped.
    #[serde(default = "default_projectile_life")]
    pub projectile_life: f32,
}

fn default_lock_on_distance() -> f32 {
    20.0
}
fn default_aim_speed() -> f32 {
    5.0
}
fn default_fire_rate() -> f32 {
    3.0
}
fn default_starting_ammo() -> u32 {
    5
}
fn default_field_radius() -> f32 {
    5.0
}
fn default_projectile_speed() -> f32 {
    100.0
}
fn default_projectile_damage() -> f32 {
    5.0
}
fn default_projectile_knockback() -> f32 {
    5.0
}
fn default_projectile_life() -> f32 {
    5.0
}

impl Default for GunnerConfig {
    fn default() -> Self {
        Self {
            lock_on_distance: default_lock_on_distance(),
            aim_speed: default_aim_speed(),
            fire_rate: default_fire_rate(),
            starting_ammo: default_starting_ammo(),
            field_radius: default_field_radius(),
            projectile_speed: default_projectile_speed(),
            projectile_damage: default_projectile_damage(),
            projectile_knockback: default_projectile_knockback(),
            projectile_life: default_projectile_life(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UfoConfig {
    /// Altitude the craft holds over the pasture.
    #[serde(default = "default_hover_height")]
    pub hover_height: f32,
    /// Horizontal acceleration at full thrust.
    #[serde(default = "default_thrust")]
    pub thrust: f32,
    #[serde(default = "default_damping")]
    pub damping: f32,
    /// Radius of the capture zone under the hull.
    #[serde(default = "default_capture_radius")]
    pub capture_radius: f32,
    #[serde(default = "default_hull_density")]
    pub hull_density: f32,
    /// Damage the hull takes before the run ends.
    #[serde(default = "default_hull_strength")]
    pub hull_strength: f32,
}

fn default_hover_height() -> f32 {
    12.0
}
fn default_thrust() -> f32 {
    20.0
}
fn default_damping() -> f32 {
    1.0
}
fn default_capture_radius() -> f32 {
    2.5
}
fn default_hull_density() -> f32 {
    10.0
}
fn default_hull_strength() -> f32 {
    100.0
}

impl Default for UfoConfig {
    fn default() -> Self {
        Self {
            hover_height: default_hover_height(),
            thrust: default_thrust(),
            damping: default_damping(),
            capture_radius: default_capture_radius(),
            hull_density: default_hull_density(),
            hull_strength: default_hull_strength(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Simulated length of a scripted run.
    #[serde(default = "default_duration")]
    pub duration_seconds: f32,
    /// Physics and beam tick rate.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: f64,
    /// Seed for herd placement and wandering.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_duration() -> f32 {
    90.0
}
fn default_tick_rate() -> f64 {
    60.0
}
fn default_seed() -> u64 {
    7
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_seconds: default_duration(),
            tick_rate: default_tick_rate(),
            seed: default_seed(),
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => Self::parse(&data).unwrap_or_else(|e| {
                log::warn!("Invalid config at {:?}: {}, using defaults", path, e);
                Self::default()
            }),
            Err(_) => {
                log::debug!("No config at {:?}, using defaults", path);
                Self::default()
            }
        }
    }

    /// Parse and validate a config document.
    pub fn parse(data: &str) -> anyhow::Result<Self> {
        let config: Self = ron::from_str(data)?;
        config.grapple.validate()?;
        if config.session.tick_rate <= 0.0 {
            anyhow::bail!("session.tick_rate must be > 0, got {}", config.session.tick_rate);
        }
        Ok(config)
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(&path, s) {
                log::warn!("Could not write config to {:?}: {}", path, e);
            }
        }
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.ron")
}
