//! Collision groups and filtering.

use rapier3d::prelude::*;

/// Collision groups for different entity types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static environment (terrain, barns, fences)
    Environment = 1 << 0,
    /// The abducting craft
    Agent = 1 << 1,
    /// Cows, farmers and anything else that walks around
    Creature = 1 << 2,
    /// Sensors (the craft's capture zone)
    Trigger = 1 << 3,
}

impl CollisionGroup {
    pub fn bits(self) -> Group {
        Group::from_bits_retain(self as u32)
    }

    /// Create a collision group for environment.
    pub fn environment() -> (Group, Group) {
        let membership = Self::Environment.bits();
        let filter = Group::ALL;
        (membership, filter)
    }

    /// Create a collision group for the craft's hull.
    pub fn agent() -> (Group, Group) {
        let membership = Self::Agent.bits();
        let filter = Group::from_bits_retain(Self::Environment as u32 | Self::Creature as u32);
        (membership, filter)
    }

    /// Create a collision group for creatures.
    pub fn creature() -> (Group, Group) {
        let membership = Self::Creature.bits();
        let filter = Group::from_bits_retain(
            Self::Environment as u32
                | Self::Agent as u32
                | Self::Creature as u32
                | Self::Trigger as u32,
        );
        (membership, filter)
    }

    /// Create a collision group for sensors that only care about creatures.
    pub fn trigger() -> (Group, Group) {
        let membership = Self::Trigger.bits();
        let filter = Self::Creature.bits();
        (membership, filter)
    }

    /// The pair above packed as rapier interaction groups.
    pub fn interaction_groups(self) -> InteractionGroups {
        let (membership, filter) = match self {
            Self::Environment => Self::environment(),
            Self::Agent => Self::agent(),
            Self::Creature => Self::creature(),
            Self::Trigger => Self::trigger(),
        };
        InteractionGroups::new(membership, filter)
    }

    /// Query groups that see every layer except `self`.
    pub fn excluded_from_queries(self) -> InteractionGroups {
        InteractionGroups::new(Group::ALL, !self.bits())
    }
}
