//! One headless abduction run: world setup, a scripted pilot and the fixed-step loop.

use engine_core::{Ray, Time, Vec3};
use grapple::{GrappleContext, GrappleController, GrappleState, MovementSink, TargetClass};
use physics::{CollisionGroup, PhysicsWorld, RigidBodyHandle};

use crate::config::GameConfig;
use crate::gunfire::Gunfire;
use crate::herd::{CreatureKind, Herd};
use crate::hud::Hud;
use crate::ufo::Ufo;

/// Horizontal distance at which the pilot opens fire.
const FIRING_RADIUS: f32 = 3.0;

/// End-of-run report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub elapsed: f32,
    pub score: f32,
    pub abductions: u32,
    pub shots: u32,
    pub hits: u32,
    pub releases: u32,
    pub cows_left: usize,
    pub hull_damage: f32,
}

/// What the pilot wants this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Hover,
    Chase { steer: Vec3, aim: Ray, fire: bool },
    Reel,
    LetGo,
}

pub struct Session {
    pub physics: PhysicsWorld,
    pub herd: Herd,
    pub hud: Hud,
    pub ufo: Ufo,
    pub grapple: GrappleController,
    pub gunfire: Gunfire,
    time: Time,
    duration: f32,
    hull_strength: f32,
}

impl Session {
    pub fn new(config: &GameConfig) -> Self {
        let mut physics = PhysicsWorld::new();
        physics.add_ground_plane();
        physics.add_static_cuboid(Vec3::new(-30.0, 4.0, -30.0), 0.6, Vec3::new(6.0, 4.0, 9.0));

        let mut herd = Herd::new(config.herd.clone(), config.session.seed);
        herd.populate(&mut physics);

        Self::with_herd(config, physics, herd)
    }

    /// Build a session around an already populated world.
    pub fn with_herd(config: &GameConfig, mut physics: PhysicsWorld, herd: Herd) -> Self {
        let ufo = Ufo::spawn(&mut physics, config.ufo.clone(), Vec3::ZERO);
        physics.update_query_pipeline();
        let grapple = GrappleController::new(config.grapple.clone(), ufo.body, CollisionGroup::Agent);

        let mut time = Time::new();
        time.set_fixed_rate(config.session.tick_rate);

        Self {
            physics,
            herd,
            hud: Hud::new(),
            ufo,
            grapple,
            gunfire: Gunfire::new(config.herd.gunner.clone()),
            time,
            duration: config.session.duration_seconds,
            hull_strength: config.ufo.hull_strength,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.time.elapsed_seconds()
    }

    pub fn hull_destroyed(&self) -> bool {
        self.hud.damage >= self.hull_strength
    }

    /// Run until the clock runs out, the last cow is gone or the hull gives out.
    pub fn run(&mut self) -> Summary {
        let step = self.time.fixed_timestep();
        while self.elapsed() < self.duration
            && self.herd.count(CreatureKind::Cow) > 0
            && !self.hull_destroyed()
        {
            self.time.advance(step);
            while self.time.should_fixed_update() {
                let dt = self.time.fixed_timestep_seconds();
                self.tick(dt);
            }
            if self.time.frame_count() % 600 == 0 {
                log::info!(
                    "t={:.0}s score={:.0} beam={:?} thrust={:.0}%",
                    self.elapsed(),
                    self.hud.score,
                    self.grapple.state(),
                    self.ufo.speed_factor() * 100.0
                );
            }
        }
        self.summary()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            elapsed: self.elapsed(),
            score: self.hud.score,
            abductions: self.hud.abductions,
            shots: self.hud.shots,
            hits: self.hud.hits,
            releases: self.hud.releases,
            cows_left: self.herd.count(CreatureKind::Cow),
            hull_damage: self.hud.damage,
        }
    }

    /// One fixed step: pilot, AI, farmer fire, craft, beam, solver, capture zone.
    pub fn tick(&mut self, dt: f32) {
        let command = self.decide();
        let steer = match command {
            Command::Chase { steer, .. } => steer,
            _ => Vec3::ZERO,
        };
        self.execute(command);

        self.herd.update(&mut self.physics, dt);
        self.return_fire(dt);
        self.ufo.fly(&mut self.physics, steer, dt);

        let (grapple, mut ctx) = self.beam();
        grapple.update(&mut ctx, dt);

        self.physics.step(dt);

        for body in self.ufo.contacts(&self.physics) {
            let (grapple, mut ctx) = self.beam();
            grapple.on_agent_contact(&mut ctx, body);
        }
    }

    fn return_fire(&mut self, dt: f32) {
        let craft = (self.ufo.body, self.ufo.position(&self.physics));
        for shot in self.herd.update_gunners(&mut self.physics, craft, dt) {
            self.gunfire.fire(shot);
        }
        for impact in self.gunfire.update(&self.physics, self.ufo.body, dt) {
            self.ufo.add_impulse(impact.direction, impact.knockback);
            self.hud.take_damage(impact.damage);
        }
    }

    fn beam(&mut self) -> (&mut GrappleController, GrappleContext<'_>) {
        (
            &mut self.grapple,
            GrappleContext {
                physics: &mut self.physics,
                targets: &mut self.herd,
                feedback: &mut self.hud,
                movement: &mut self.ufo,
            },
        )
    }

    fn decide(&self) -> Command {
        match self.grapple.state() {
            GrappleState::Attached => match self.grapple.attached().map(|t| t.class) {
                Some(TargetClass::HoldOnly) => Command::LetGo,
                _ => Command::Reel,
            },
            GrappleState::Firing | GrappleState::Retracting => Command::Hover,
            GrappleState::Idle => {
                let craft = self.ufo.position(&self.physics);
                let Some((cow, position)) = self.nearest_cow(craft) else {
                    return Command::Hover;
                };
                let flat = Vec3::new(position.x - craft.x, 0.0, position.z - craft.z);
                log::trace!("Chasing {:?} at {:.1}", cow, flat.length());
                Command::Chase {
                    steer: flat.normalize_or_zero(),
                    aim: Ray::between(craft, position),
                    fire: flat.length() <= FIRING_RADIUS,
                }
            }
        }
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Hover => self.grapple.set_reel_input(0.0),
            Command::Reel => self.grapple.set_reel_input(1.0),
            Command::LetGo => {
                let (grapple, mut ctx) = self.beam();
                grapple.release(&mut ctx);
            }
            Command::Chase { aim, fire, .. } => {
                let (grapple, mut ctx) = self.beam();
                grapple.track_aim(&mut ctx, aim);
                if fire {
                    grapple.try_fire(&mut ctx, aim);
                }
            }
        }
    }

    fn nearest_cow(&self, from: Vec3) -> Option<(RigidBodyHandle, Vec3)> {
        self.herd
            .roaming(CreatureKind::Cow)
            .into_iter()
            .filter_map(|body| self.physics.body_position(body).map(|p| (body, p)))
            .min_by(|(_, a), (_, b)| a.distance(from).total_cmp(&b.distance(from)))
    }
}
