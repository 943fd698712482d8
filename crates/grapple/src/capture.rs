//! Turning an aim ray into something to grab.

use crate::{TargetAi, TargetClass};
use engine_core::{Ray, Vec3};
use physics::{CollisionGroup, PhysicsWorld, RaycastHit, RigidBodyHandle};

/// What a capture query hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitCategory {
    /// A body the beam may bind.
    Capturable,
    /// Anything else solid.
    Obstacle,
    /// Nothing within range.
    None,
}

/// One fire attempt's query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRequest {
    pub origin: Vec3,
    pub direction: Vec3,
    pub max_range: f32,
}

impl CaptureRequest {
    pub fn from_ray(aim: Ray, max_range: f32) -> Self {
        Self {
            origin: aim.origin,
            direction: aim.direction,
            max_range,
        }
    }

    /// Where the probe ends up when nothing is hit.
    pub fn max_range_point(&self) -> Vec3 {
        self.origin + self.direction * self.max_range
    }
}

/// Outcome of a capture query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureResult {
    pub point: Option<Vec3>,
    pub body: Option<RigidBodyHandle>,
    pub category: HitCategory,
    /// Set for [`HitCategory::Capturable`] hits only.
    pub class: Option<TargetClass>,
    /// Distance from the request origin to the hit point.
    pub distance: Option<f32>,
}

impl CaptureResult {
    pub fn miss() -> Self {
        Self {
            point: None,
            body: None,
            category: HitCategory::None,
            class: None,
            distance: None,
        }
    }

    /// The body and class, if this is something the beam can bind.
    pub fn capturable(&self) -> Option<(RigidBodyHandle, TargetClass)> {
        match (self.category, self.body, self.class) {
            (HitCategory::Capturable, Some(body), Some(class)) => Some((body, class)),
            _ => None,
        }
    }
}

/// Nearest-hit world queries that never see the craft itself.
#[derive(Debug, Clone, Copy)]
pub struct CaptureResolver {
    exclude: CollisionGroup,
}

impl CaptureResolver {
    pub fn new(exclude: CollisionGroup) -> Self {
        Self { exclude }
    }

    /// Resolve a capture request into a classified hit.
    pub fn resolve(
        &self,
        physics: &PhysicsWorld,
        targets: &dyn TargetAi,
        request: &CaptureRequest,
    ) -> CaptureResult {
        let Some(hit) = physics.raycast_excluding(
            request.origin,
            request.direction,
            request.max_range,
            self.exclude,
        ) else {
            return CaptureResult::miss();
        };

        let class = hit.body.and_then(|body| targets.classify(body));
        let category = if class.is_some() {
            HitCategory::Capturable
        } else {
            HitCategory::Obstacle
        };

        CaptureResult {
            point: Some(hit.point),
            body: hit.body,
            category,
            class,
            distance: Some(hit.distance),
        }
    }

    /// First thing between `from` and `to`, ignoring the excluded layer.
    pub fn first_hit_between(&self, physics: &PhysicsWorld, from: Vec3, to: Vec3) -> Option<RaycastHit> {
        let offset = to - from;
        let distance = offset.length();
        if distance < f32::EPSILON {
            return None;
        }
        physics.raycast_excluding(from, offset, distance, self.exclude)
    }
}
