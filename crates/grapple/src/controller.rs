//! The grapple state machine.
//!
//! ```text
//! Idle --fire--> Firing --hit creature--> Attached --release/break/consume--> Idle
//!                  |
//!                  +--miss/obstacle--> Retracting (hang, fly back) --> Idle
//! ```
//!
//! `Firing` and `Retracting` are timed phases advanced by [`GrappleController::update`];
//! they always run to completion. `Attached` ends on manual release, the distance
//! safety break, a failed suck-in, or consumption of a liftable target.

use crate::{
    AttachedTarget, CaptureRequest, CaptureResolver, CaptureResult, ChainParams, GrappleConfig,
    GrappleContext, ReelMechanism, ReelOutcome, ReelState, ReleaseCause, RopeChain, TargetClass,
};
use engine_core::{Ray, Vec3};
use physics::{CollisionGroup, PhysicsWorld, RigidBodyHandle};

/// Public view of the controller's phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrappleState {
    Idle,
    Firing,
    Attached,
    Retracting,
}

/// The visible tether head while it flies out or back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    /// Where the shot is heading (hit point or max range point).
    pub end: Vec3,
    pub position: Vec3,
    /// Seconds spent in the current phase.
    pub elapsed: f32,
}

#[derive(Debug)]
struct Shot {
    result: CaptureResult,
    probe: Probe,
}

#[derive(Debug)]
struct Retract {
    probe: Probe,
    /// Seconds spent hanging at the end point.
    hang: f32,
}

#[derive(Debug, Default)]
enum Phase {
    #[default]
    Idle,
    Firing(Shot),
    Retracting(Retract),
    Attached(AttachedTarget),
}

/// Orchestrates aiming, firing, binding, reeling and letting go for one craft.
#[derive(Debug)]
pub struct GrappleController {
    config: GrappleConfig,
    agent: RigidBodyHandle,
    resolver: CaptureResolver,
    reel: ReelMechanism,
    reel_input: f32,
    phase: Phase,
}

impl GrappleController {
    /// Create a controller for the craft body `agent`, whose colliders live on `agent_group`.
    ///
    /// # Panics
    /// If `config` fails [`GrappleConfig::validate`], e.g. `number_of_joints == 0`.
    pub fn new(config: GrappleConfig, agent: RigidBodyHandle, agent_group: CollisionGroup) -> Self {
        if let Err(e) = config.validate() {
            panic!("invalid grapple config: {}", e);
        }

        let reel = ReelMechanism::new(ReelState::new(
            config.capture_speed,
            config.max_capture_length,
        ));
        Self {
            config,
            agent,
            resolver: CaptureResolver::new(agent_group),
            reel,
            reel_input: 0.0,
            phase: Phase::Idle,
        }
    }

    pub fn config(&self) -> &GrappleConfig {
        &self.config
    }

    pub fn state(&self) -> GrappleState {
        match self.phase {
            Phase::Idle => GrappleState::Idle,
            Phase::Firing(_) => GrappleState::Firing,
            Phase::Retracting(_) => GrappleState::Retracting,
            Phase::Attached(_) => GrappleState::Attached,
        }
    }

    pub fn attached_target(&self) -> Option<RigidBodyHandle> {
        match &self.phase {
            Phase::Attached(target) => Some(target.body),
            _ => None,
        }
    }

    pub fn attached(&self) -> Option<&AttachedTarget> {
        match &self.phase {
            Phase::Attached(target) => Some(target),
            _ => None,
        }
    }

    pub fn chain(&self) -> Option<&RopeChain> {
        self.attached().map(|t| &t.chain)
    }

    pub fn capture_length(&self) -> f32 {
        self.reel.capture_length()
    }

    pub fn probe(&self) -> Option<&Probe> {
        match &self.phase {
            Phase::Firing(shot) => Some(&shot.probe),
            Phase::Retracting(retract) => Some(&retract.probe),
            _ => None,
        }
    }

    pub fn reel_input(&self) -> f32 {
        self.reel_input
    }

    /// Latch the reel axis. Positive pulls, negative lets rope out.
    pub fn set_reel_input(&mut self, axis: f32) {
        self.reel_input = if axis.is_finite() {
            axis.clamp(-1.0, 1.0)
        } else {
            0.0
        };
    }

    /// Report what the crosshair is over so the HUD can colour the reticle.
    pub fn track_aim(&self, ctx: &mut GrappleContext<'_>, aim: Ray) -> CaptureResult {
        let request = CaptureRequest::from_ray(aim, self.config.max_capture_length);
        let result = self.resolver.resolve(ctx.physics, ctx.targets, &request);
        ctx.feedback.on_reticle(result.category, result.class);
        result
    }

    /// Fire the beam along `aim`. Ignored unless idle.
    pub fn try_fire(&mut self, ctx: &mut GrappleContext<'_>, aim: Ray) {
        if !matches!(self.phase, Phase::Idle) {
            log::debug!("Fire ignored while {:?}", self.state());
            return;
        }
        if aim.is_degenerate() {
            log::debug!("Fire ignored: degenerate aim");
            return;
        }
        let Some(agent_pos) = ctx.physics.body_position(self.agent) else {
            log::warn!("Fire ignored: craft body {:?} missing", self.agent);
            return;
        };

        let request = CaptureRequest::from_ray(aim, self.config.max_capture_length);
        let result = self.resolver.resolve(ctx.physics, ctx.targets, &request);
        let end = result.point.unwrap_or_else(|| request.max_range_point());

        self.reel.set_capture_length(agent_pos.distance(end));
        log::debug!(
            "Firing at {:?} ({:?}), capture length {:.2}",
            end,
            result.category,
            self.reel.capture_length()
        );

        ctx.feedback.on_fire();
        self.phase = Phase::Firing(Shot {
            result,
            probe: Probe {
                end,
                position: agent_pos,
                elapsed: 0.0,
            },
        });
    }

    /// Let go of the bound target. Ignored unless attached.
    pub fn release(&mut self, ctx: &mut GrappleContext<'_>) {
        if !matches!(self.phase, Phase::Attached(_)) {
            log::debug!("Release ignored while {:?}", self.state());
            return;
        }
        if let Phase::Attached(target) = std::mem::take(&mut self.phase) {
            self.release_target(ctx, target, ReleaseCause::Manual);
        }
    }

    /// A body touched the craft's capture zone. Completes the abduction if it is the
    /// bound, liftable target.
    pub fn on_agent_contact(&mut self, ctx: &mut GrappleContext<'_>, body: RigidBodyHandle) {
        let consumable = match &self.phase {
            Phase::Attached(target) => target.body == body && target.class.is_liftable(),
            _ => false,
        };
        if !consumable {
            return;
        }
        if let Phase::Attached(target) = std::mem::take(&mut self.phase) {
            self.consume_target(ctx, target);
        }
    }

    /// Advance timers and run the attached-state behaviour for one tick.
    pub fn update(&mut self, ctx: &mut GrappleContext<'_>, dt: f32) {
        let dt = dt.max(0.0);
        self.phase = match std::mem::take(&mut self.phase) {
            Phase::Idle => Phase::Idle,
            Phase::Firing(shot) => self.advance_firing(ctx, shot, dt),
            Phase::Retracting(retract) => self.advance_retracting(ctx, retract, dt),
            Phase::Attached(target) => self.advance_attached(ctx, target, dt),
        };
    }

    /// Polyline for drawing the beam: craft to probe while flying, craft through every
    /// rope segment while attached, empty when idle.
    pub fn rope_points(&self, physics: &PhysicsWorld) -> Vec<Vec3> {
        let Some(agent_pos) = physics.body_position(self.agent) else {
            return Vec::new();
        };
        match &self.phase {
            Phase::Idle => Vec::new(),
            Phase::Firing(Shot { probe, .. }) | Phase::Retracting(Retract { probe, .. }) => {
                vec![agent_pos, probe.position]
            }
            Phase::Attached(target) => target.chain.points(agent_pos),
        }
    }

    fn progress(&self, elapsed: f32) -> f32 {
        if self.config.grapple_time > 0.0 {
            (elapsed / self.config.grapple_time).min(1.0)
        } else {
            1.0
        }
    }

    fn advance_firing(&mut self, ctx: &mut GrappleContext<'_>, mut shot: Shot, dt: f32) -> Phase {
        let agent_pos = ctx
            .physics
            .body_position(self.agent)
            .unwrap_or(shot.probe.position);

        shot.probe.elapsed += dt;
        let t = self.progress(shot.probe.elapsed);
        shot.probe.position = agent_pos.lerp(shot.probe.end, t);
        if t < 1.0 {
            return Phase::Firing(shot);
        }

        if let Some((body, class)) = shot.result.capturable() {
            if let Some(target) = self.attach(ctx, agent_pos, body, class) {
                return Phase::Attached(target);
            }
        }

        log::debug!("Shot missed, retracting");
        Phase::Retracting(Retract {
            probe: Probe {
                end: shot.probe.end,
                position: shot.probe.end,
                elapsed: 0.0,
            },
            hang: 0.0,
        })
    }

    fn advance_retracting(
        &mut self,
        ctx: &mut GrappleContext<'_>,
        mut retract: Retract,
        dt: f32,
    ) -> Phase {
        if retract.hang < self.config.grapple_cooldown {
            retract.hang += dt;
            return Phase::Retracting(retract);
        }

        let agent_pos = ctx
            .physics
            .body_position(self.agent)
            .unwrap_or(retract.probe.position);
        retract.probe.elapsed += dt;
        let t = self.progress(retract.probe.elapsed);
        retract.probe.position = retract.probe.end.lerp(agent_pos, t);
        if t < 1.0 {
            Phase::Retracting(retract)
        } else {
            Phase::Idle
        }
    }

    fn attach(
        &mut self,
        ctx: &mut GrappleContext<'_>,
        agent_pos: Vec3,
        body: RigidBodyHandle,
        class: TargetClass,
    ) -> Option<AttachedTarget> {
        let Some(target_pos) = ctx.physics.body_position(body) else {
            log::debug!("Target {:?} vanished before the probe arrived", body);
            return None;
        };

        let was_autonomous = ctx.targets.is_autonomous(body);
        ctx.targets.set_autonomy_enabled(body, false);
        ctx.physics.remove_rope_joints_on(body);

        let chain = RopeChain::build(
            ctx.physics,
            (self.agent, agent_pos),
            (body, target_pos),
            &ChainParams {
                segments: self.config.number_of_joints,
                length: self.reel.capture_length(),
                slack_margin: self.config.initial_slack_margin,
                link: self.config.link_params(),
            },
        );

        let target_mass = ctx.physics.body_mass(body).unwrap_or(0.0);
        let agent_mass = ctx.physics.body_mass(self.agent).unwrap_or(0.0);
        let ratio = if agent_mass > 0.0 {
            (target_mass / agent_mass).clamp(0.0, 1.0)
        } else {
            1.0
        };
        ctx.movement.set_movement_penalty(1.0 - ratio);

        ctx.feedback.on_hit(class);
        log::info!(
            "Captured {:?} ({:?}) at {:.2} units, {} segments",
            body,
            class,
            self.reel.capture_length(),
            chain.len()
        );

        Some(AttachedTarget {
            body,
            class,
            was_autonomous,
            tugs_when_grappled: ctx.targets.tugs_when_grappled(body),
            chain,
            pass_through: None,
        })
    }

    fn advance_attached(
        &mut self,
        ctx: &mut GrappleContext<'_>,
        mut target: AttachedTarget,
        dt: f32,
    ) -> Phase {
        if !ctx.physics.contains_body(target.body) {
            self.release_target(ctx, target, ReleaseCause::TargetLost);
            return Phase::Idle;
        }

        let outcome = self.reel.tick(
            ctx,
            &self.resolver,
            self.agent,
            &mut target,
            self.reel_input,
            dt,
        );
        if let ReelOutcome::Release(cause) = outcome {
            self.release_target(ctx, target, cause);
            return Phase::Idle;
        }

        let (Some(agent_pos), Some(target_pos)) = (
            ctx.physics.body_position(self.agent),
            ctx.physics.body_position(target.body),
        ) else {
            self.release_target(ctx, target, ReleaseCause::TargetLost);
            return Phase::Idle;
        };

        // Brake runaway swings from the joint chain.
        if let Some(velocity) = ctx.physics.body_velocity(target.body) {
            if velocity.length() > self.config.velocity_clamp_threshold {
                ctx.physics.apply_acceleration(target.body, -velocity, dt);
            }
        }

        if target.tugs_when_grappled {
            let away = (target_pos - agent_pos).normalize_or_zero();
            let mass = ctx.physics.body_mass(target.body).unwrap_or(0.0);
            ctx.physics.apply_impulse(target.body, away * mass);
        }

        if agent_pos.distance(target_pos) > self.config.max_capture_length {
            self.release_target(ctx, target, ReleaseCause::OutOfRange);
            return Phase::Idle;
        }

        target.chain.sync_positions(ctx.physics);
        Phase::Attached(target)
    }

    /// Hand the target back to its AI and tear the rope down.
    fn release_target(
        &mut self,
        ctx: &mut GrappleContext<'_>,
        target: AttachedTarget,
        cause: ReleaseCause,
    ) {
        log::info!("Released {:?} ({:?})", target.body, cause);

        if target.was_autonomous {
            ctx.targets.begin_recovery(target.body);
        }
        if let Some(saved) = &target.pass_through {
            ctx.physics.restore_solver_groups(saved);
        }
        target.chain.destroy(ctx.physics);

        ctx.movement.reset_movement_penalty();
        self.reel.stop_cue(ctx);
        ctx.feedback.on_released();
    }

    /// The target reached the craft: tear the rope down and swallow it.
    fn consume_target(&mut self, ctx: &mut GrappleContext<'_>, target: AttachedTarget) {
        let mass = ctx.physics.body_mass(target.body).unwrap_or(0.0);
        let heading = ctx
            .physics
            .body_velocity(target.body)
            .unwrap_or(Vec3::ZERO)
            .normalize_or_zero();
        ctx.movement
            .add_impulse(heading, (mass * 0.5).clamp(1.0, 10.0));

        let body = target.body;
        target.chain.destroy(ctx.physics);
        let value = ctx.targets.consume(body);
        ctx.physics.remove_body(body);

        ctx.movement.reset_movement_penalty();
        self.reel.stop_cue(ctx);
        ctx.feedback.on_consumed(value);
        log::info!("Abducted {:?} for {:.1}", body, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Cue, Rig};

    const DT: f32 = 0.125;
    /// Solver-sized tick for tests that step physics.
    const STEP: f32 = 1.0 / 60.0;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn fire_at_cow_attaches_after_grapple_time() {
        let mut rig = Rig::new(GrappleConfig::default());
        let cow = rig.cow_ahead(30.0);

        rig.fire_ahead();
        assert_eq!(rig.grapple.state(), GrappleState::Firing);
        assert!(approx(rig.grapple.capture_length(), 30.0));
        assert_eq!(rig.cues.count(Cue::Fire), 1);

        rig.run(DT, 3);
        assert_eq!(rig.grapple.state(), GrappleState::Firing);
        let probe = *rig.grapple.probe().unwrap();
        assert!(approx(probe.position.distance(rig.agent_pos()), 22.5));

        rig.run(DT, 1);
        assert_eq!(rig.grapple.state(), GrappleState::Attached);
        assert_eq!(rig.grapple.attached_target(), Some(cow));
        assert!(!rig.herd.get(cow).autonomous);
        assert_eq!(rig.cues.count(Cue::Hit), 1);
        assert!(rig.helm.penalty.is_some());
    }

    #[test]
    fn thirty_unit_scenario_limits_track_length() {
        let mut rig = Rig::new(GrappleConfig::default());
        rig.cow_ahead(30.0);
        rig.capture();

        let chain = rig.grapple.chain().unwrap();
        assert_eq!(chain.len(), 3);
        for segment in chain.segments() {
            assert!(approx(segment.limit, 10.1));
        }

        rig.grapple.set_reel_input(1.0);
        rig.run(0.25, 8);
        assert!(approx(rig.grapple.capture_length(), 20.0));
        let chain = rig.grapple.chain().unwrap();
        for segment in chain.segments() {
            assert!(approx(segment.limit, 20.0 / 3.0));
            assert!(approx(rig.physics.rope_limit(segment.joint).unwrap(), 20.0 / 3.0));
        }
        assert_eq!(rig.cues.count(Cue::ReelStart), 1);
        assert!(rig.grapple.reel.cue_playing());
        assert!(approx(rig.grapple.reel.state().capture_length, 20.0));

        rig.release();
        assert!(!rig.grapple.reel.cue_playing());
        assert_eq!(rig.cues.count(Cue::ReelStop), 1);
    }

    #[test]
    fn rope_holds_a_target_swung_sideways() {
        let config = GrappleConfig {
            number_of_joints: 1,
            ..GrappleConfig::default()
        };
        let mut rig = Rig::new(config);
        rig.weightless();
        let cow = rig.cow_ahead(10.0);
        rig.capture();
        let slack = rig.grapple.config().initial_slack_margin;
        let rope = rig.grapple.capture_length() + slack;

        // Inside the rope length on every axis, but 12.1 away in a straight line.
        rig.physics.set_body_position(cow, Vec3::new(7.0, 7.0, -7.0));
        rig.simulate(STEP, 120);

        assert_eq!(rig.grapple.state(), GrappleState::Attached);
        let reach = rig.reach(cow);
        assert!(reach <= rope + 0.05, "target drifted to {reach}, rope is {rope}");
    }

    #[test]
    fn stepped_reel_drags_target_towards_craft() {
        let mut rig = Rig::new(GrappleConfig::default());
        rig.weightless();
        let cow = rig.cow_ahead(20.0);
        rig.capture();
        let start = rig.reach(cow);

        rig.grapple.set_reel_input(1.0);
        rig.simulate(STEP, 120);

        assert_eq!(rig.grapple.state(), GrappleState::Attached);
        assert!(approx(rig.grapple.capture_length(), 10.0));
        let reach = rig.reach(cow);
        assert!(reach < start - 8.0, "target only came from {start} to {reach}");
        assert!(reach <= 10.0 + 3.0 * rig.grapple.config().initial_slack_margin + 1.0);
    }

    #[test]
    fn chain_sum_tracks_capture_length_every_tick() {
        for n in 1..=4 {
            let config = GrappleConfig {
                number_of_joints: n,
                ..Default::default()
            };
            let margin = n as f32 * config.initial_slack_margin;
            let mut rig = Rig::new(config);
            rig.cow_ahead(30.0);
            rig.capture();

            let check = |rig: &Rig| {
                let chain = rig.grapple.chain().unwrap();
                assert_eq!(chain.len(), n);
                assert!((chain.total_limit() - rig.grapple.capture_length()).abs() <= margin + 1e-3);
            };

            check(&rig);
            rig.grapple.set_reel_input(1.0);
            for _ in 0..10 {
                rig.run(DT, 1);
                check(&rig);
            }
            rig.grapple.set_reel_input(-1.0);
            for _ in 0..10 {
                rig.run(DT, 1);
                check(&rig);
            }
        }
    }

    #[test]
    fn pushing_never_exceeds_max() {
        let mut rig = Rig::new(GrappleConfig::default());
        rig.cow_ahead(48.0);
        rig.capture();

        rig.grapple.set_reel_input(-1.0);
        rig.run(0.5, 4);
        assert_eq!(rig.grapple.capture_length(), 50.0);
        rig.run(0.5, 1);
        assert_eq!(rig.grapple.capture_length(), 50.0);
        assert_eq!(rig.grapple.state(), GrappleState::Attached);
        // Pushing never starts the reel cue.
        assert_eq!(rig.cues.count(Cue::ReelStart), 0);
    }

    #[test]
    fn fire_is_a_noop_unless_idle() {
        let mut rig = Rig::new(GrappleConfig::default());
        rig.cow_ahead(30.0);
        rig.cow_at(Vec3::new(-11.0, 20.0, 0.0));

        rig.fire_ahead();
        rig.fire(Ray::new(rig.agent_pos(), -Vec3::X));
        assert_eq!(rig.grapple.state(), GrappleState::Firing);
        assert!(approx(rig.grapple.capture_length(), 30.0));

        rig.run(DT, 4);
        assert_eq!(rig.grapple.state(), GrappleState::Attached);
        rig.grapple.set_reel_input(1.0);
        rig.run(DT, 1);
        let before = rig.grapple.capture_length();
        rig.fire(Ray::new(rig.agent_pos(), -Vec3::X));
        assert_eq!(rig.grapple.state(), GrappleState::Attached);
        assert_eq!(rig.grapple.capture_length(), before);
        assert_eq!(rig.cues.count(Cue::Fire), 1);
    }

    #[test]
    fn fire_is_a_noop_while_retracting() {
        let mut rig = Rig::new(GrappleConfig::default());
        rig.fire_ahead();
        rig.run(DT, 4);
        assert_eq!(rig.grapple.state(), GrappleState::Retracting);
        let before = rig.grapple.capture_length();

        rig.cow_ahead(20.0);
        rig.fire_ahead();
        assert_eq!(rig.grapple.state(), GrappleState::Retracting);
        assert_eq!(rig.grapple.capture_length(), before);
    }

    #[test]
    fn miss_retracts_then_idles() {
        let mut rig = Rig::new(GrappleConfig::default());
        let bodies = rig.physics.rigid_body_set.len();

        rig.fire_ahead();
        assert!(approx(rig.grapple.capture_length(), 50.0));
        rig.run(DT, 3);
        assert_eq!(rig.grapple.state(), GrappleState::Firing);
        rig.run(DT, 1);
        assert_eq!(rig.grapple.state(), GrappleState::Retracting);
        let end = rig.agent_pos() - Vec3::Z * 50.0;
        assert!(rig.grapple.probe().unwrap().position.distance(end) < 1e-3);

        // grapple_cooldown + grapple_time = 8 ticks.
        rig.run(DT, 7);
        assert_eq!(rig.grapple.state(), GrappleState::Retracting);
        rig.run(DT, 1);
        assert_eq!(rig.grapple.state(), GrappleState::Idle);
        assert!(rig.grapple.chain().is_none());
        assert_eq!(rig.physics.rigid_body_set.len(), bodies);
        assert_eq!(rig.cues.count(Cue::Hit), 0);
    }

    #[test]
    fn obstacle_hit_retracts() {
        let mut rig = Rig::new(GrappleConfig::default());
        rig.physics
            .add_static_cuboid(rig.agent_pos() - Vec3::Z * 15.0, 0.0, Vec3::splat(1.0));
        rig.physics.update_query_pipeline();

        rig.fire_ahead();
        assert!(approx(rig.grapple.capture_length(), 14.0));
        rig.run(DT, 4);
        assert_eq!(rig.grapple.state(), GrappleState::Retracting);
    }

    #[test]
    fn release_is_idempotent() {
        let mut rig = Rig::new(GrappleConfig::default());
        let cow = rig.cow_ahead(30.0);
        rig.capture();
        let bodies_attached = rig.physics.rigid_body_set.len();

        rig.release();
        assert_eq!(rig.grapple.state(), GrappleState::Idle);
        assert!(rig.herd.get(cow).autonomous);
        assert_eq!(rig.herd.get(cow).recoveries, 1);
        assert_eq!(rig.physics.rigid_body_set.len(), bodies_attached - 2);
        assert_eq!(rig.physics.impulse_joint_set.len(), 0);
        assert_eq!(rig.helm.resets, 1);
        let events = rig.cues.events.len();

        rig.release();
        assert_eq!(rig.grapple.state(), GrappleState::Idle);
        assert_eq!(rig.herd.get(cow).recoveries, 1);
        assert_eq!(rig.helm.resets, 1);
        assert_eq!(rig.cues.events.len(), events);
    }

    #[test]
    fn release_stops_reel_cue() {
        let mut rig = Rig::new(GrappleConfig::default());
        rig.cow_ahead(30.0);
        rig.capture();
        rig.grapple.set_reel_input(1.0);
        rig.run(DT, 2);

        rig.release();
        assert_eq!(rig.cues.count(Cue::ReelStop), 1);
        assert_eq!(rig.cues.count(Cue::Released), 1);
    }

    #[test]
    fn release_restores_only_autonomous_targets() {
        let mut rig = Rig::new(GrappleConfig::default());
        let cow = rig.cow_ahead(30.0);
        rig.herd.get_mut(cow).autonomous = false;
        rig.capture();
        rig.release();
        assert_eq!(rig.herd.get(cow).recoveries, 0);
        assert!(!rig.herd.get(cow).autonomous);
    }

    #[test]
    fn hold_only_target_released_at_zero_length() {
        let mut rig = Rig::new(GrappleConfig::default());
        let farmer = rig.farmer_ahead(5.0);
        rig.capture();
        assert_eq!(rig.grapple.attached().unwrap().class, TargetClass::HoldOnly);

        rig.grapple.set_reel_input(1.0);
        rig.run(0.5, 2);
        assert_eq!(rig.grapple.capture_length(), 0.0);
        assert_eq!(rig.grapple.state(), GrappleState::Attached);

        rig.run(DT, 1);
        assert_eq!(rig.grapple.state(), GrappleState::Idle);
        assert!(rig.herd.get(farmer).autonomous);
        assert!(rig.physics.contains_body(farmer));
    }

    #[test]
    fn pulling_at_zero_never_goes_negative() {
        let mut rig = Rig::new(GrappleConfig::default());
        rig.cow_ahead(2.0);
        rig.capture();
        rig.grapple.set_reel_input(1.0);
        rig.run(1.0, 3);
        assert_eq!(rig.grapple.capture_length(), 0.0);
    }

    #[test]
    fn distance_break_releases_regardless_of_input() {
        let mut rig = Rig::new(GrappleConfig::default());
        let cow = rig.cow_ahead(30.0);
        rig.capture();
        rig.grapple.set_reel_input(-1.0);

        let far = rig.agent_pos() - Vec3::Z * 60.0;
        rig.physics.set_body_position(cow, far);
        rig.run(DT, 1);
        assert_eq!(rig.grapple.state(), GrappleState::Idle);
        assert!(rig.herd.get(cow).autonomous);
        assert_eq!(rig.physics.impulse_joint_set.len(), 0);
    }

    #[test]
    fn liftable_target_sucked_in_when_path_clear() {
        let mut rig = Rig::new(GrappleConfig::default());
        let cow = rig.cow_ahead(5.0);
        rig.capture();
        rig.grapple.set_reel_input(1.0);
        rig.run(0.5, 2);
        assert_eq!(rig.grapple.capture_length(), 0.0);

        let before = rig.physics.body_velocity(cow).unwrap();
        rig.run(DT, 1);
        assert_eq!(rig.grapple.state(), GrappleState::Attached);
        assert!(rig.grapple.attached().unwrap().is_sucking_in());
        let after = rig.physics.body_velocity(cow).unwrap();
        // Snapped towards the craft (+Z from the cow).
        assert!(after.z > before.z);

        for &collider in rig.physics.rigid_body_set[cow].colliders() {
            assert_eq!(
                rig.physics.collider_set[collider].solver_groups(),
                physics::InteractionGroups::none()
            );
        }
    }

    #[test]
    fn obstruction_during_suck_in_releases() {
        let mut rig = Rig::new(GrappleConfig::default());
        let cow = rig.cow_ahead(8.0);
        rig.capture();
        rig.grapple.set_reel_input(1.0);
        rig.run(1.0, 2);
        assert_eq!(rig.grapple.capture_length(), 0.0);

        // A barn wall drops between the craft and the cow.
        rig.physics
            .add_static_cuboid(rig.agent_pos() - Vec3::Z * 4.0, 0.0, Vec3::new(3.0, 3.0, 0.5));
        rig.physics.update_query_pipeline();

        rig.run(DT, 1);
        assert_eq!(rig.grapple.state(), GrappleState::Idle);
        assert!(rig.herd.get(cow).autonomous);
        assert!(rig.physics.contains_body(cow));
    }

    #[test]
    fn contact_consumes_liftable_target() {
        let mut rig = Rig::new(GrappleConfig::default());
        let cow = rig.cow_ahead(5.0);
        rig.capture();
        rig.grapple.set_reel_input(1.0);
        rig.run(0.5, 3);

        rig.contact(cow);
        assert_eq!(rig.grapple.state(), GrappleState::Idle);
        assert!(!rig.physics.contains_body(cow));
        assert!(rig.herd.get(cow).consumed);
        // Consumption never hands the cow back to its AI.
        assert_eq!(rig.herd.get(cow).recoveries, 0);
        assert_eq!(rig.cues.count(Cue::Consumed), 1);
        assert_eq!(rig.cues.count(Cue::Released), 0);
        assert_eq!(rig.cues.count(Cue::ReelStop), 1);
        assert_eq!(rig.helm.resets, 1);
        assert_eq!(rig.helm.impulses.len(), 1);
        let (_, magnitude) = rig.helm.impulses[0];
        assert!((1.0..=10.0).contains(&magnitude));
        assert_eq!(rig.physics.impulse_joint_set.len(), 0);
    }

    #[test]
    fn contact_ignores_other_bodies_and_hold_only_targets() {
        let mut rig = Rig::new(GrappleConfig::default());
        let farmer = rig.farmer_ahead(5.0);
        let cow = rig.cow_at(Vec3::new(-11.0, 20.0, 0.0));
        rig.capture();

        rig.contact(cow);
        rig.contact(farmer);
        assert_eq!(rig.grapple.state(), GrappleState::Attached);
        assert!(rig.physics.contains_body(farmer));
    }

    #[test]
    fn release_after_suck_in_restores_collisions() {
        let mut rig = Rig::new(GrappleConfig::default());
        let cow = rig.cow_ahead(5.0);
        let collider = rig.physics.rigid_body_set[cow].colliders()[0];
        let groups = rig.physics.collider_set[collider].solver_groups();
        rig.capture();
        rig.grapple.set_reel_input(1.0);
        rig.run(0.5, 3);
        assert!(rig.grapple.attached().unwrap().is_sucking_in());

        rig.release();
        assert_eq!(rig.physics.collider_set[collider].solver_groups(), groups);
    }

    #[test]
    fn heavier_targets_slow_the_craft_more() {
        let mut light = Rig::new(GrappleConfig::default());
        light.cow_ahead(20.0);
        light.capture();

        let mut heavy = Rig::new(GrappleConfig::default());
        heavy.spawn(Vec3::new(0.0, 0.0, -21.0), 20.0, TargetClass::Liftable);
        heavy.capture();

        let light_factor = light.helm.penalty.unwrap();
        let heavy_factor = heavy.helm.penalty.unwrap();
        assert!((0.0..=1.0).contains(&light_factor));
        assert!(heavy_factor < light_factor);
    }

    #[test]
    fn tugging_target_pulls_away() {
        let mut rig = Rig::new(GrappleConfig {
            velocity_clamp_threshold: 1000.0,
            ..Default::default()
        });
        let cow = rig.cow_ahead(20.0);
        rig.herd.get_mut(cow).tugs = true;
        rig.capture();

        rig.run(DT, 1);
        let v = rig.physics.body_velocity(cow).unwrap();
        assert!(approx(v.z, -1.0));
    }

    #[test]
    fn fast_targets_are_braked() {
        let mut rig = Rig::new(GrappleConfig::default());
        let cow = rig.cow_ahead(20.0);
        rig.capture();

        rig.physics.set_body_velocity(cow, Vec3::new(4.0, 0.0, 0.0));
        rig.run(0.25, 1);
        let v = rig.physics.body_velocity(cow).unwrap();
        assert!(approx(v.x, 3.0));

        rig.physics.set_body_velocity(cow, Vec3::new(0.5, 0.0, 0.0));
        rig.run(0.25, 1);
        let v = rig.physics.body_velocity(cow).unwrap();
        assert!(approx(v.x, 0.5));
    }

    #[test]
    fn lost_target_is_released_quietly() {
        let mut rig = Rig::new(GrappleConfig::default());
        let cow = rig.cow_ahead(30.0);
        rig.capture();
        rig.physics.remove_body(cow);

        rig.run(DT, 1);
        assert_eq!(rig.grapple.state(), GrappleState::Idle);
        assert_eq!(rig.physics.impulse_joint_set.len(), 0);
        assert_eq!(rig.helm.resets, 1);
    }

    #[test]
    fn target_removed_mid_flight_retracts() {
        let mut rig = Rig::new(GrappleConfig::default());
        let cow = rig.cow_ahead(30.0);
        rig.fire_ahead();
        rig.physics.remove_body(cow);
        rig.run(DT, 4);
        assert_eq!(rig.grapple.state(), GrappleState::Retracting);
    }

    #[test]
    fn pre_existing_rope_on_target_is_replaced() {
        let mut rig = Rig::new(GrappleConfig::default());
        let cow = rig.cow_ahead(30.0);
        let post = rig.physics.add_dynamic_body(Vec3::new(5.0, 0.0, -30.0));
        rig.physics.add_rope_joint(post, cow, 2.0);
        rig.capture();
        assert_eq!(rig.physics.impulse_joint_set.len(), 3);
    }

    #[test]
    fn rope_points_follow_phase() {
        let mut rig = Rig::new(GrappleConfig::default());
        rig.cow_ahead(30.0);
        assert!(rig.grapple.rope_points(&rig.physics).is_empty());

        rig.fire_ahead();
        assert_eq!(rig.grapple.rope_points(&rig.physics).len(), 2);
        rig.run(DT, 4);
        rig.run(DT, 1);
        assert_eq!(rig.grapple.rope_points(&rig.physics).len(), 4);
    }

    #[test]
    fn reticle_reports_category() {
        let mut rig = Rig::new(GrappleConfig::default());
        rig.farmer_ahead(10.0);
        let result = rig.aim_ahead();
        assert_eq!(result.category, crate::HitCategory::Capturable);
        assert_eq!(result.class, Some(TargetClass::HoldOnly));
        assert_eq!(rig.cues.count(Cue::Reticle), 1);
    }

    #[test]
    fn reel_input_is_clamped() {
        let mut rig = Rig::new(GrappleConfig::default());
        rig.grapple.set_reel_input(7.0);
        assert_eq!(rig.grapple.reel_input(), 1.0);
        rig.grapple.set_reel_input(f32::NAN);
        assert_eq!(rig.grapple.reel_input(), 0.0);
    }

    #[test]
    #[should_panic(expected = "number_of_joints")]
    fn zero_joints_fails_fast() {
        Rig::new(GrappleConfig {
            number_of_joints: 0,
            ..Default::default()
        });
    }
}
