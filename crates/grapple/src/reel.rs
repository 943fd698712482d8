//! Reeling: trading rope slack for pull on the target.

use crate::{AttachedTarget, CaptureResolver, GrappleContext, TargetClass};
use physics::RigidBodyHandle;

/// Rope slack bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReelState {
    /// Current total rope length, always in `[0, max_capture_length]`.
    pub capture_length: f32,
    /// Units per second.
    pub capture_speed: f32,
    pub max_capture_length: f32,
}

impl ReelState {
    pub fn new(capture_speed: f32, max_capture_length: f32) -> Self {
        Self {
            capture_length: 0.0,
            capture_speed,
            max_capture_length,
        }
    }

    /// Set the length, clamped into range.
    pub fn set_length(&mut self, length: f32) {
        self.capture_length = length.clamp(0.0, self.max_capture_length);
    }

    /// Shorten by one tick's worth. Returns false if already fully reeled in.
    pub fn pull(&mut self, dt: f32) -> bool {
        if self.capture_length <= 0.0 {
            return false;
        }
        self.set_length(self.capture_length - self.capture_speed * dt);
        true
    }

    /// Lengthen by one tick's worth. Returns false if already at the ceiling.
    pub fn push(&mut self, dt: f32) -> bool {
        if self.capture_length >= self.max_capture_length {
            return false;
        }
        self.set_length(self.capture_length + self.capture_speed * dt);
        true
    }
}

/// Why a bound target was let go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseCause {
    /// The pilot pressed release.
    Manual,
    /// The target drifted beyond the rope ceiling.
    OutOfRange,
    /// Something sits between craft and target during suck-in.
    Obstructed,
    /// Reeled to zero on a target that can't be lifted.
    NotLiftable,
    /// The target body disappeared from the world.
    TargetLost,
}

/// What one reel tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReelOutcome {
    /// No input, or nothing left to give.
    Holding,
    Pulled,
    Pushed,
    /// The target was just made pass-through and snapped towards the craft.
    SuckIn,
    /// The controller must run its release procedure.
    Release(ReleaseCause),
}

/// Converts the reel axis into rope length changes and forces.
#[derive(Debug)]
pub struct ReelMechanism {
    state: ReelState,
    cue_playing: bool,
}

impl ReelMechanism {
    pub fn new(state: ReelState) -> Self {
        Self {
            state,
            cue_playing: false,
        }
    }

    pub fn state(&self) -> &ReelState {
        &self.state
    }

    pub fn capture_length(&self) -> f32 {
        self.state.capture_length
    }

    /// Reset the slack for a new shot.
    pub fn set_capture_length(&mut self, length: f32) {
        self.state.set_length(length);
    }

    /// Whether the looping reel cue has been started and not yet stopped.
    pub fn cue_playing(&self) -> bool {
        self.cue_playing
    }

    /// Stop the reel cue if it is running.
    pub fn stop_cue(&mut self, ctx: &mut GrappleContext<'_>) {
        if self.cue_playing {
            self.cue_playing = false;
            ctx.feedback.on_release_audio_stop();
        }
    }

    /// Run one tick of reeling. `axis > 0` pulls, `axis < 0` pushes.
    pub fn tick(
        &mut self,
        ctx: &mut GrappleContext<'_>,
        resolver: &CaptureResolver,
        agent: RigidBodyHandle,
        target: &mut AttachedTarget,
        axis: f32,
        dt: f32,
    ) -> ReelOutcome {
        if axis > 0.0 {
            self.pull(ctx, resolver, agent, target, dt)
        } else if axis < 0.0 {
            self.push(ctx, target, dt)
        } else {
            ReelOutcome::Holding
        }
    }

    fn pull(
        &mut self,
        ctx: &mut GrappleContext<'_>,
        resolver: &CaptureResolver,
        agent: RigidBodyHandle,
        target: &mut AttachedTarget,
        dt: f32,
    ) -> ReelOutcome {
        let (Some(agent_pos), Some(target_pos)) = (
            ctx.physics.body_position(agent),
            ctx.physics.body_position(target.body),
        ) else {
            return ReelOutcome::Release(ReleaseCause::TargetLost);
        };

        if self.state.pull(dt) {
            target
                .chain
                .set_total_length(ctx.physics, self.state.capture_length);

            let toward_agent = (agent_pos - target_pos).normalize_or_zero();
            ctx.physics.apply_acceleration(target.body, toward_agent, dt);

            if !self.cue_playing {
                self.cue_playing = true;
                ctx.feedback.on_reel_start();
            }
            return ReelOutcome::Pulled;
        }

        if target.class != TargetClass::Liftable {
            return ReelOutcome::Release(ReleaseCause::NotLiftable);
        }
        if target.is_sucking_in() {
            return ReelOutcome::Holding;
        }

        // Any other body blocks the snap, other creatures included.
        if let Some(hit) = resolver.first_hit_between(ctx.physics, agent_pos, target_pos) {
            if hit.body != Some(target.body) {
                return ReelOutcome::Release(ReleaseCause::Obstructed);
            }
        }

        target.pass_through = Some(ctx.physics.disable_contact_response(target.body));
        let mass = ctx.physics.body_mass(target.body).unwrap_or(0.0);
        ctx.physics
            .apply_impulse(target.body, (agent_pos - target_pos) * mass);
        log::debug!("Sucking in {:?}", target.body);
        ReelOutcome::SuckIn
    }

    fn push(
        &mut self,
        ctx: &mut GrappleContext<'_>,
        target: &mut AttachedTarget,
        dt: f32,
    ) -> ReelOutcome {
        if !self.state.push(dt) {
            return ReelOutcome::Holding;
        }
        target
            .chain
            .set_total_length(ctx.physics, self.state.capture_length);
        ReelOutcome::Pushed
    }
}
