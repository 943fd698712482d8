//! Test doubles and a small scene for exercising the beam without a game.

use std::collections::HashMap;

use crate::{
    CaptureResult, FeedbackSink, GrappleConfig, GrappleContext, GrappleController, GrappleState,
    HitCategory, MovementSink, TargetAi, TargetClass,
};
use engine_core::{Ray, Vec3};
use physics::{CollisionGroup, PhysicsWorld, RigidBodyHandle};

#[derive(Debug, Clone)]
pub struct Creature {
    pub class: TargetClass,
    pub autonomous: bool,
    pub tugs: bool,
    pub value: f32,
    pub recoveries: usize,
    pub consumed: bool,
}

/// Creature AI that just records what the beam asked of it.
#[derive(Debug, Default)]
pub struct TestHerd {
    creatures: HashMap<RigidBodyHandle, Creature>,
}

impl TestHerd {
    pub fn add(&mut self, body: RigidBodyHandle, class: TargetClass) {
        self.creatures.insert(
            body,
            Creature {
                class,
                autonomous: true,
                tugs: false,
                value: 10.0,
                recoveries: 0,
                consumed: false,
            },
        );
    }

    pub fn get(&self, body: RigidBodyHandle) -> &Creature {
        &self.creatures[&body]
    }

    pub fn get_mut(&mut self, body: RigidBodyHandle) -> &mut Creature {
        self.creatures
            .get_mut(&body)
            .expect("creature not in test herd")
    }
}

impl TargetAi for TestHerd {
    fn classify(&self, body: RigidBodyHandle) -> Option<TargetClass> {
        self.creatures
            .get(&body)
            .filter(|c| !c.consumed)
            .map(|c| c.class)
    }

    fn is_autonomous(&self, body: RigidBodyHandle) -> bool {
        self.creatures.get(&body).is_some_and(|c| c.autonomous)
    }

    fn set_autonomy_enabled(&mut self, body: RigidBodyHandle, enabled: bool) {
        if let Some(c) = self.creatures.get_mut(&body) {
            c.autonomous = enabled;
        }
    }

    fn begin_recovery(&mut self, body: RigidBodyHandle) {
        if let Some(c) = self.creatures.get_mut(&body) {
            c.recoveries += 1;
            c.autonomous = true;
        }
    }

    fn tugs_when_grappled(&self, body: RigidBodyHandle) -> bool {
        self.creatures.get(&body).is_some_and(|c| c.tugs)
    }

    fn consume(&mut self, body: RigidBodyHandle) -> f32 {
        match self.creatures.get_mut(&body) {
            Some(c) => {
                c.consumed = true;
                c.value
            }
            None => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Fire,
    Hit,
    ReelStart,
    ReelStop,
    Consumed,
    Released,
    Reticle,
}

#[derive(Debug, Default)]
pub struct Cues {
    pub events: Vec<Cue>,
}

impl Cues {
    pub fn count(&self, cue: Cue) -> usize {
        self.events.iter().filter(|&&e| e == cue).count()
    }
}

impl FeedbackSink for Cues {
    fn on_fire(&mut self) {
        self.events.push(Cue::Fire);
    }

    fn on_hit(&mut self, _class: TargetClass) {
        self.events.push(Cue::Hit);
    }

    fn on_reel_start(&mut self) {
        self.events.push(Cue::ReelStart);
    }

    fn on_consumed(&mut self, _value: f32) {
        self.events.push(Cue::Consumed);
    }

    fn on_release_audio_stop(&mut self) {
        self.events.push(Cue::ReelStop);
    }

    fn on_released(&mut self) {
        self.events.push(Cue::Released);
    }

    fn on_reticle(&mut self, _category: HitCategory, _class: Option<TargetClass>) {
        self.events.push(Cue::Reticle);
    }
}

/// Movement controller double.
#[derive(Debug, Default)]
pub struct Helm {
    pub penalty: Option<f32>,
    pub resets: usize,
    pub impulses: Vec<(Vec3, f32)>,
}

impl MovementSink for Helm {
    fn set_movement_penalty(&mut self, factor: f32) {
        self.penalty = Some(factor);
    }

    fn reset_movement_penalty(&mut self) {
        self.penalty = None;
        self.resets += 1;
    }

    fn add_impulse(&mut self, direction: Vec3, magnitude: f32) {
        self.impulses.push((direction, magnitude));
    }
}

/// A craft hovering at the origin, looking down -Z. [`Rig::run`] never steps the
/// solver, so bodies only move when a test moves them and velocities only change
/// through the beam's own impulses. [`Rig::simulate`] steps it.
pub struct Rig {
    pub physics: PhysicsWorld,
    pub herd: TestHerd,
    pub cues: Cues,
    pub helm: Helm,
    pub agent: RigidBodyHandle,
    pub grapple: GrappleController,
}

impl Rig {
    pub fn new(config: GrappleConfig) -> Self {
        let mut physics = PhysicsWorld::new();
        let agent = physics.add_hover_body(Vec3::ZERO, 1.0);
        physics.add_sphere_collider(agent, 1.0, 10.0, CollisionGroup::Agent);
        physics.update_query_pipeline();

        Self {
            physics,
            herd: TestHerd::default(),
            cues: Cues::default(),
            helm: Helm::default(),
            agent,
            grapple: GrappleController::new(config, agent, CollisionGroup::Agent),
        }
    }

    pub fn agent_pos(&self) -> Vec3 {
        self.physics.body_position(self.agent).unwrap()
    }

    /// Drop a unit-radius creature at `position`.
    pub fn spawn(&mut self, position: Vec3, density: f32, class: TargetClass) -> RigidBodyHandle {
        let body = self.physics.add_dynamic_body(position);
        self.physics
            .add_sphere_collider(body, 1.0, density, CollisionGroup::Creature);
        self.physics.update_query_pipeline();
        self.herd.add(body, class);
        body
    }

    pub fn cow_at(&mut self, position: Vec3) -> RigidBodyHandle {
        self.spawn(position, 1.0, TargetClass::Liftable)
    }

    /// A cow whose near surface is `distance` straight ahead.
    pub fn cow_ahead(&mut self, distance: f32) -> RigidBodyHandle {
        let position = self.agent_pos() - Vec3::Z * (distance + 1.0);
        self.cow_at(position)
    }

    pub fn farmer_ahead(&mut self, distance: f32) -> RigidBodyHandle {
        let position = self.agent_pos() - Vec3::Z * (distance + 1.0);
        self.spawn(position, 1.0, TargetClass::HoldOnly)
    }

    fn with_ctx<R>(
        &mut self,
        f: impl FnOnce(&mut GrappleController, &mut GrappleContext<'_>) -> R,
    ) -> R {
        let mut ctx = GrappleContext {
            physics: &mut self.physics,
            targets: &mut self.herd,
            feedback: &mut self.cues,
            movement: &mut self.helm,
        };
        f(&mut self.grapple, &mut ctx)
    }

    pub fn fire(&mut self, aim: Ray) {
        self.with_ctx(|grapple, ctx| grapple.try_fire(ctx, aim));
    }

    pub fn fire_ahead(&mut self) {
        let aim = Ray::new(self.agent_pos(), -Vec3::Z);
        self.fire(aim);
    }

    pub fn aim_ahead(&mut self) -> CaptureResult {
        let aim = Ray::new(self.agent_pos(), -Vec3::Z);
        self.with_ctx(|grapple, ctx| grapple.track_aim(ctx, aim))
    }

    pub fn run(&mut self, dt: f32, ticks: usize) {
        for _ in 0..ticks {
            self.with_ctx(|grapple, ctx| grapple.update(ctx, dt));
        }
    }

    /// Beam tick followed by a solver step, `ticks` times.
    pub fn simulate(&mut self, dt: f32, ticks: usize) {
        for _ in 0..ticks {
            self.run(dt, 1);
            self.physics.step(dt);
        }
    }

    pub fn weightless(&mut self) {
        self.physics.gravity = physics::rapier3d::math::Vector::zeros();
    }

    /// Straight-line distance from the craft to `body`.
    pub fn reach(&self, body: RigidBodyHandle) -> f32 {
        self.physics
            .body_position(body)
            .map_or(f32::NAN, |p| p.distance(self.agent_pos()))
    }

    pub fn release(&mut self) {
        self.with_ctx(|grapple, ctx| grapple.release(ctx));
    }

    pub fn contact(&mut self, body: RigidBodyHandle) {
        self.with_ctx(|grapple, ctx| grapple.on_agent_contact(ctx, body));
    }

    /// Fire straight ahead and fly the probe out until it binds.
    pub fn capture(&mut self) {
        self.fire_ahead();
        let mut ticks = 0;
        while self.grapple.state() == GrappleState::Firing && ticks < 100 {
            self.run(0.125, 1);
            ticks += 1;
        }
        assert_eq!(self.grapple.state(), GrappleState::Attached);
    }
}
