//! What the beam knows about the body it is holding.

use crate::RopeChain;
use physics::{RigidBodyHandle, SavedSolverGroups};
use serde::{Deserialize, Serialize};

/// How a capturable body may be handled once bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetClass {
    /// Can be reeled all the way in and consumed (cows).
    Liftable,
    /// Can only be dragged around and let go (farmers).
    HoldOnly,
}

impl TargetClass {
    pub fn is_liftable(self) -> bool {
        matches!(self, TargetClass::Liftable)
    }
}

/// A bound target and everything needed to let it go again.
///
/// Resolved once at capture time; nothing here is looked up per tick.
#[derive(Debug)]
pub struct AttachedTarget {
    pub body: RigidBodyHandle,
    pub class: TargetClass,
    /// AI control flag before capture, restored on release.
    pub was_autonomous: bool,
    pub tugs_when_grappled: bool,
    pub chain: RopeChain,
    /// Collider solver groups saved when suck-in made the target pass-through.
    pub pass_through: Option<SavedSolverGroups>,
}

impl AttachedTarget {
    pub fn is_sucking_in(&self) -> bool {
        self.pass_through.is_some()
    }
}
