//! The abducting craft: a hovering rigid body with a capture zone underneath.

use glam::Vec3;
use grapple::MovementSink;
use physics::{ColliderHandle, CollisionGroup, PhysicsWorld, RigidBodyHandle};

use crate::config::UfoConfig;

/// Hull radius; the capture zone sits around it.
const HULL_RADIUS: f32 = 1.5;

/// Altitude hold gains.
const LIFT_STIFFNESS: f32 = 8.0;
const LIFT_DAMPING: f32 = 4.0;

pub struct Ufo {
    pub body: RigidBodyHandle,
    /// Sensor reporting creatures that reached the hull.
    pub capture_zone: ColliderHandle,
    config: UfoConfig,
    /// Thrust multiplier in `[0, 1]` set by the beam while something is attached.
    speed_factor: f32,
    /// Knocks requested by the beam, applied on the next [`Ufo::fly`].
    pending_impulses: Vec<Vec3>,
}

impl Ufo {
    pub fn spawn(physics: &mut PhysicsWorld, config: UfoConfig, at: Vec3) -> Self {
        let position = Vec3::new(at.x, config.hover_height, at.z);
        let body = physics.add_hover_body(position, config.damping);
        physics.add_sphere_collider(body, HULL_RADIUS, config.hull_density, CollisionGroup::Agent);
        let capture_zone = physics.add_sensor_sphere(body, config.capture_radius.max(HULL_RADIUS));
        log::info!("Craft hovering at {:?}", position);

        Self {
            body,
            capture_zone,
            config,
            speed_factor: 1.0,
            pending_impulses: Vec::new(),
        }
    }

    pub fn speed_factor(&self) -> f32 {
        self.speed_factor
    }

    pub fn position(&self, physics: &PhysicsWorld) -> Vec3 {
        physics.body_position(self.body).unwrap_or(Vec3::ZERO)
    }

    /// Push the craft along `steer` (horizontal, length at most 1) and hold altitude.
    pub fn fly(&mut self, physics: &mut PhysicsWorld, steer: Vec3, dt: f32) {
        for impulse in self.pending_impulses.drain(..) {
            physics.apply_impulse(self.body, impulse);
        }

        let (Some(position), Some(velocity)) =
            (physics.body_position(self.body), physics.body_velocity(self.body))
        else {
            return;
        };

        let flat = Vec3::new(steer.x, 0.0, steer.z).clamp_length_max(1.0);
        let thrust = flat * self.config.thrust * self.speed_factor;
        let lift = (self.config.hover_height - position.y) * LIFT_STIFFNESS - velocity.y * LIFT_DAMPING;
        physics.apply_acceleration(self.body, thrust + Vec3::Y * lift, dt);
    }

    /// Creatures currently inside the capture zone.
    pub fn contacts(&self, physics: &PhysicsWorld) -> Vec<RigidBodyHandle> {
        physics.sensor_contacts(self.capture_zone)
    }
}

impl MovementSink for Ufo {
    fn set_movement_penalty(&mut self, factor: f32) {
        self.speed_factor = factor.clamp(0.0, 1.0);
        log::debug!("Craft thrust at {:.0}%", self.speed_factor * 100.0);
    }

    fn reset_movement_penalty(&mut self) {
        self.speed_factor = 1.0;
    }

    fn add_impulse(&mut self, direction: Vec3, magnitude: f32) {
        self.pending_impulses.push(direction.normalize_or_zero() * magnitude);
    }
}
