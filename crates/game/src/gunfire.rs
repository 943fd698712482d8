//! Farmers shooting back: lock-on, timed fire, ammo and straight-flying slugs.

use glam::Vec3;
use physics::{PhysicsWorld, RigidBodyHandle};

use crate::config::GunnerConfig;

/// What a farmer's gun is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stance {
    Wandering,
    LockedOn,
    /// Out of ammo, heading for the field in the middle of the pasture.
    Resupplying,
}

/// What the gunner wants its legs to do this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Order {
    /// Leave walking to the wander AI.
    Wander,
    /// Close in on the craft's ground position.
    Chase(Vec3),
    /// Shoot at the craft, then keep closing in.
    Fire(Vec3),
    /// Walk back to the field.
    Resupply,
}

/// Farmer-only component.
#[derive(Debug, Clone, Copy)]
pub struct Gunner {
    pub stance: Stance,
    pub ammo: u32,
    /// Seconds since the last shot or lock-on, capped at the fire rate.
    pub cooldown: f32,
}

impl Gunner {
    pub fn armed(config: &GunnerConfig) -> Self {
        Self {
            stance: Stance::Wandering,
            ammo: config.starting_ammo,
            cooldown: config.fire_rate,
        }
    }

    /// Whether the gunner is steering the farmer instead of the wander AI.
    pub fn is_engaged(&self) -> bool {
        self.stance != Stance::Wandering
    }

    /// Advance one tick. `in_sight` is only asked when a lock-on is possible.
    pub fn think(
        &mut self,
        position: Vec3,
        craft: Vec3,
        config: &GunnerConfig,
        dt: f32,
        in_sight: impl FnOnce() -> bool,
    ) -> Order {
        if self.cooldown < config.fire_rate {
            self.cooldown += dt;
        }
        let range = position.distance(craft);

        match self.stance {
            Stance::Wandering => {
                if self.ammo > 0 && range <= config.lock_on_distance && in_sight() {
                    self.stance = Stance::LockedOn;
                    self.cooldown = 0.0;
                    log::debug!("Farmer at {:?} locked on, range {:.1}", position, range);
                    Order::Chase(craft)
                } else {
                    Order::Wander
                }
            }
            Stance::LockedOn => {
                if range > config.lock_on_distance {
                    self.stance = Stance::Wandering;
                    Order::Wander
                } else if self.cooldown >= config.fire_rate {
                    self.cooldown = 0.0;
                    self.ammo = self.ammo.saturating_sub(1);
                    if self.ammo == 0 {
                        self.stance = Stance::Resupplying;
                    }
                    Order::Fire(craft)
                } else {
                    Order::Chase(craft)
                }
            }
            Stance::Resupplying => {
                let from_field = Vec3::new(position.x, 0.0, position.z).length();
                if from_field <= config.field_radius {
                    self.ammo = config.starting_ammo;
                    self.stance = Stance::Wandering;
                    log::debug!("Farmer at {:?} reloaded", position);
                    Order::Wander
                } else {
                    Order::Resupply
                }
            }
        }
    }
}

/// A shot leaving a farmer's gun.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub shooter: RigidBodyHandle,
    pub origin: Vec3,
    pub direction: Vec3,
}

/// A slug that struck the craft.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub point: Vec3,
    /// Direction of travel, used for the knock.
    pub direction: Vec3,
    pub knockback: f32,
    pub damage: f32,
}

#[derive(Debug, Clone, Copy)]
struct Slug {
    shooter: RigidBodyHandle,
    position: Vec3,
    velocity: Vec3,
    age: f32,
}

/// Every slug in flight. Slugs fly straight and are swept with a ray each tick.
pub struct Gunfire {
    slugs: Vec<Slug>,
    config: GunnerConfig,
}

impl Gunfire {
    pub fn new(config: GunnerConfig) -> Self {
        Self {
            slugs: Vec::new(),
            config,
        }
    }

    pub fn fire(&mut self, shot: Shot) {
        let velocity = shot.direction.normalize_or_zero() * self.config.projectile_speed;
        if velocity == Vec3::ZERO {
            return;
        }
        log::debug!("Bang from {:?}", shot.origin);
        self.slugs.push(Slug {
            shooter: shot.shooter,
            position: shot.origin,
            velocity,
            age: 0.0,
        });
    }

    pub fn in_flight(&self) -> usize {
        self.slugs.len()
    }

    /// Move every slug one tick. Slugs stop at the first thing they hit; hits on
    /// `craft` are returned.
    pub fn update(&mut self, physics: &PhysicsWorld, craft: RigidBodyHandle, dt: f32) -> Vec<Impact> {
        let config = &self.config;
        let mut impacts = Vec::new();

        self.slugs.retain_mut(|slug| {
            slug.age += dt;
            if slug.age > config.projectile_life {
                return false;
            }

            let travel = slug.velocity * dt;
            match physics.raycast_skipping(slug.position, slug.velocity, travel.length(), slug.shooter) {
                Some(hit) => {
                    if hit.body == Some(craft) {
                        impacts.push(Impact {
                            point: hit.point,
                            direction: slug.velocity.normalize_or_zero(),
                            knockback: config.projectile_knockback,
                            damage: config.projectile_damage,
                        });
                    }
                    false
                }
                None => {
                    slug.position += travel;
                    true
                }
            }
        });
        impacts
    }
}
