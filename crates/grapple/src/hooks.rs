//! Collaborators the beam drives but does not own.

use crate::{HitCategory, TargetClass};
use engine_core::Vec3;
use physics::{PhysicsWorld, RigidBodyHandle};

/// Creature AI and classification, keyed by physics body.
pub trait TargetAi {
    /// Class of a capturable body, or `None` for anything the beam can't hold.
    fn classify(&self, body: RigidBodyHandle) -> Option<TargetClass>;

    /// Whether the body's AI is currently steering it.
    fn is_autonomous(&self, body: RigidBodyHandle) -> bool;

    fn set_autonomy_enabled(&mut self, body: RigidBodyHandle, enabled: bool);

    /// Hand control back to the AI. The AI resumes after its own recovery delay.
    fn begin_recovery(&mut self, body: RigidBodyHandle);

    /// Whether the creature fights the beam while bound.
    fn tugs_when_grappled(&self, body: RigidBodyHandle) -> bool;

    /// The creature was abducted. Forget it and return its score value.
    fn consume(&mut self, body: RigidBodyHandle) -> f32;
}

/// Fire-and-forget audiovisual and HUD notifications.
pub trait FeedbackSink {
    fn on_fire(&mut self);
    fn on_hit(&mut self, class: TargetClass);
    /// Start the looping reel sound.
    fn on_reel_start(&mut self);
    fn on_consumed(&mut self, value: f32);
    /// Stop the looping reel sound.
    fn on_release_audio_stop(&mut self);
    fn on_released(&mut self);
    /// What the crosshair is currently over.
    fn on_reticle(&mut self, category: HitCategory, class: Option<TargetClass>);
}

/// The craft's movement controller.
pub trait MovementSink {
    /// Scale the craft's thrust by `factor` in `[0, 1]`.
    fn set_movement_penalty(&mut self, factor: f32);
    fn reset_movement_penalty(&mut self);
    /// Knock the craft along `direction`.
    fn add_impulse(&mut self, direction: Vec3, magnitude: f32);
}

/// Everything the controller touches during one call.
pub struct GrappleContext<'a> {
    pub physics: &'a mut PhysicsWorld,
    pub targets: &'a mut dyn TargetAi,
    pub feedback: &'a mut dyn FeedbackSink,
    pub movement: &'a mut dyn MovementSink,
}
