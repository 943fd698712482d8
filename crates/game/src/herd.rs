//! Cows and farmers: a hecs world of wandering creatures the beam can grab.

use std::collections::HashMap;

use glam::Vec3;
use grapple::{TargetAi, TargetClass};
use hecs::{Entity, World};
use physics::{CollisionGroup, PhysicsWorld, RigidBodyHandle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::HerdConfig;
use crate::gunfire::{Gunner, Order, Shot};

/// Capsule half-height shared by every creature.
const BODY_HALF_HEIGHT: f32 = 0.5;
const BODY_RADIUS: f32 = 0.75;

/// Destinations closer than this count as reached.
const ARRIVAL_RADIUS: f32 = 1.0;

/// Gun height above a farmer's centre.
const MUZZLE_HEIGHT: f32 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreatureKind {
    Cow,
    Farmer,
}

impl CreatureKind {
    pub fn class(self) -> TargetClass {
        match self {
            CreatureKind::Cow => TargetClass::Liftable,
            CreatureKind::Farmer => TargetClass::HoldOnly,
        }
    }
}

/// Static facts about a creature.
#[derive(Debug, Clone, Copy)]
pub struct Creature {
    pub kind: CreatureKind,
    pub body: RigidBodyHandle,
    /// Score awarded when abducted.
    pub value: f32,
    pub tugs_when_grappled: bool,
}

/// Wander AI state.
#[derive(Debug, Clone, Copy)]
pub struct Brain {
    pub autonomous: bool,
    /// Seconds until the AI takes over again after a release.
    pub recovery: Option<f32>,
    pub destination: Vec3,
    pub wander_time: f32,
}

pub struct Herd {
    world: World,
    bodies: HashMap<RigidBodyHandle, Entity>,
    config: HerdConfig,
    rng: StdRng,
}

impl Herd {
    pub fn new(config: HerdConfig, seed: u64) -> Self {
        Self {
            world: World::new(),
            bodies: HashMap::new(),
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Scatter the configured number of cows and farmers over the pasture.
    pub fn populate(&mut self, physics: &mut PhysicsWorld) {
        for _ in 0..self.config.cows {
            let at = random_point(&mut self.rng, self.config.pasture_radius);
            self.spawn(physics, CreatureKind::Cow, at);
        }
        for _ in 0..self.config.farmers {
            let at = random_point(&mut self.rng, self.config.pasture_radius);
            self.spawn(physics, CreatureKind::Farmer, at);
        }
        log::info!(
            "Herd ready: {} creatures ({} cows, {} farmers)",
            self.len(),
            self.count(CreatureKind::Cow),
            self.count(CreatureKind::Farmer)
        );
    }

    /// Put one creature standing on the ground at `at` (y is ignored).
    pub fn spawn(&mut self, physics: &mut PhysicsWorld, kind: CreatureKind, at: Vec3) -> Entity {
        let standing = Vec3::new(at.x, BODY_HALF_HEIGHT + BODY_RADIUS, at.z);
        let body = physics.add_dynamic_body(standing);
        physics.add_capsule_collider(
            body,
            BODY_HALF_HEIGHT,
            BODY_RADIUS,
            self.config.creature_density,
            CollisionGroup::Creature,
        );

        let (value, tugs_when_grappled) = match kind {
            CreatureKind::Cow => {
                let tugs = self.rng.gen_bool(self.config.tug_chance.clamp(0.0, 1.0));
                (self.config.milk, tugs)
            }
            CreatureKind::Farmer => (0.0, true),
        };
        let destination = random_point(&mut self.rng, self.config.pasture_radius);

        let creature = Creature {
            kind,
            body,
            value,
            tugs_when_grappled,
        };
        let brain = Brain {
            autonomous: true,
            recovery: None,
            destination,
            wander_time: 0.0,
        };
        let entity = match kind {
            CreatureKind::Cow => self.world.spawn((creature, brain)),
            CreatureKind::Farmer => {
                let gunner = Gunner::armed(&self.config.gunner);
                self.world.spawn((creature, brain, gunner))
            }
        };
        self.bodies.insert(body, entity);
        entity
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn count(&self, kind: CreatureKind) -> usize {
        self.world
            .query::<&Creature>()
            .iter()
            .filter(|(_, c)| c.kind == kind)
            .count()
    }

    pub fn creature(&self, body: RigidBodyHandle) -> Option<Creature> {
        let entity = *self.bodies.get(&body)?;
        self.world.get::<&Creature>(entity).ok().map(|c| *c)
    }

    pub fn brain(&self, body: RigidBodyHandle) -> Option<Brain> {
        let entity = *self.bodies.get(&body)?;
        self.world.get::<&Brain>(entity).ok().map(|b| *b)
    }

    /// Every creature of `kind` whose AI is currently in control.
    pub fn roaming(&self, kind: CreatureKind) -> Vec<RigidBodyHandle> {
        self.world
            .query::<(&Creature, &Brain)>()
            .iter()
            .filter(|(_, (c, b))| c.kind == kind && b.autonomous)
            .map(|(_, (c, _))| c.body)
            .collect()
    }

    /// Tick recovery timers and steer every autonomous creature.
    pub fn update(&mut self, physics: &mut PhysicsWorld, dt: f32) {
        let Self {
            world, config, rng, ..
        } = self;

        for (_, (creature, brain, gunner)) in
            world.query_mut::<(&Creature, &mut Brain, Option<&Gunner>)>()
        {
            if let Some(remaining) = brain.recovery {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    brain.recovery = None;
                    brain.autonomous = true;
                    log::debug!("{:?} {:?} back on its feet", creature.kind, creature.body);
                } else {
                    brain.recovery = Some(remaining);
                }
            }
            if !brain.autonomous || gunner.is_some_and(Gunner::is_engaged) {
                continue;
            }

            let Some(position) = physics.body_position(creature.body) else {
                continue;
            };

            brain.wander_time += dt;
            let to_destination = Vec3::new(
                brain.destination.x - position.x,
                0.0,
                brain.destination.z - position.z,
            );
            if to_destination.length() <= ARRIVAL_RADIUS || brain.wander_time >= config.max_wander_time {
                brain.destination = random_point(rng, config.pasture_radius);
                brain.wander_time = 0.0;
                continue;
            }

            walk_towards(physics, creature.body, brain.destination, config.max_speed);
        }
    }

    /// Run every free farmer's gun against the craft. Returns the shots fired this tick.
    pub fn update_gunners(
        &mut self,
        physics: &mut PhysicsWorld,
        craft: (RigidBodyHandle, Vec3),
        dt: f32,
    ) -> Vec<Shot> {
        let (craft_body, craft_pos) = craft;
        let Self { world, config, .. } = self;
        let mut shots = Vec::new();

        for (_, (creature, brain, gunner)) in world.query_mut::<(&Creature, &Brain, &mut Gunner)>() {
            if !brain.autonomous {
                continue;
            }
            let Some(position) = physics.body_position(creature.body) else {
                continue;
            };
            let muzzle = position + Vec3::Y * MUZZLE_HEIGHT;

            let order = gunner.think(position, craft_pos, &config.gunner, dt, || {
                physics
                    .raycast_skipping(muzzle, craft_pos - muzzle, muzzle.distance(craft_pos), creature.body)
                    .is_some_and(|hit| hit.body == Some(craft_body))
            });

            match order {
                Order::Wander => {}
                Order::Chase(target) => {
                    walk_towards(physics, creature.body, target, config.gunner.aim_speed);
                }
                Order::Fire(target) => {
                    shots.push(Shot {
                        shooter: creature.body,
                        origin: muzzle,
                        direction: target - muzzle,
                    });
                    walk_towards(physics, creature.body, target, config.gunner.aim_speed);
                }
                Order::Resupply => {
                    walk_towards(physics, creature.body, Vec3::ZERO, config.max_speed);
                }
            }
        }
        shots
    }

    pub fn gunner(&self, body: RigidBodyHandle) -> Option<Gunner> {
        let entity = *self.bodies.get(&body)?;
        self.world.get::<&Gunner>(entity).ok().map(|g| *g)
    }

    fn entity(&self, body: RigidBodyHandle) -> Option<Entity> {
        self.bodies.get(&body).copied()
    }

    fn with_brain(&mut self, body: RigidBodyHandle, f: impl FnOnce(&mut Brain)) {
        if let Some(entity) = self.entity(body) {
            if let Ok(mut brain) = self.world.get::<&mut Brain>(entity) {
                f(&mut brain);
            }
        }
    }
}

impl TargetAi for Herd {
    fn classify(&self, body: RigidBodyHandle) -> Option<TargetClass> {
        self.creature(body).map(|c| c.kind.class())
    }

    fn is_autonomous(&self, body: RigidBodyHandle) -> bool {
        self.brain(body).is_some_and(|b| b.autonomous)
    }

    fn set_autonomy_enabled(&mut self, body: RigidBodyHandle, enabled: bool) {
        self.with_brain(body, |brain| {
            brain.autonomous = enabled;
            brain.recovery = None;
        });
    }

    fn begin_recovery(&mut self, body: RigidBodyHandle) {
        let delay = self.config.recovery_time.max(0.0);
        self.with_brain(body, |brain| brain.recovery = Some(delay));
    }

    fn tugs_when_grappled(&self, body: RigidBodyHandle) -> bool {
        self.creature(body).is_some_and(|c| c.tugs_when_grappled)
    }

    fn consume(&mut self, body: RigidBodyHandle) -> f32 {
        let Some(entity) = self.bodies.remove(&body) else {
            return 0.0;
        };
        match self.world.remove_one::<Creature>(entity) {
            Ok(creature) => {
                let _ = self.world.despawn(entity);
                creature.value
            }
            Err(_) => 0.0,
        }
    }
}

/// Walk horizontally towards `destination`, keeping whatever vertical speed the body has.
fn walk_towards(physics: &mut PhysicsWorld, body: RigidBodyHandle, destination: Vec3, speed: f32) {
    let (Some(position), Some(velocity)) = (physics.body_position(body), physics.body_velocity(body)) else {
        return;
    };
    let flat = Vec3::new(destination.x - position.x, 0.0, destination.z - position.z);
    let walk = flat.normalize_or_zero() * speed;
    physics.set_body_velocity(body, Vec3::new(walk.x, velocity.y, walk.z));
}

/// Uniform point on the ground disc of `radius` around the origin.
fn random_point(rng: &mut impl Rng, radius: f32) -> Vec3 {
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let distance = radius.max(0.0) * rng.gen::<f32>().sqrt();
    Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance)
}
