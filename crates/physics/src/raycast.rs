//! Raycasting and sensor queries for aiming, obstruction checks and capture zones.

use crate::{CollisionGroup, PhysicsWorld};
use engine_core::Vec3;
use rapier3d::prelude::*;

/// Result of a raycast query.
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// The collider that was hit.
    pub collider: ColliderHandle,
    /// Body owning the collider, if it has one (static props don't).
    pub body: Option<RigidBodyHandle>,
    /// Distance along the ray to the hit point.
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
    /// Surface normal at the hit point.
    pub normal: Vec3,
}

impl PhysicsWorld {
    /// Cast a ray and return the first hit.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit> {
        self.raycast_filtered(origin, direction, max_distance, QueryFilter::default())
    }

    /// Cast a ray that ignores sensors and every collider on `exclude`'s layer.
    pub fn raycast_excluding(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: CollisionGroup,
    ) -> Option<RaycastHit> {
        let filter = QueryFilter::default()
            .exclude_sensors()
            .groups(exclude.excluded_from_queries());
        self.raycast_filtered(origin, direction, max_distance, filter)
    }

    /// Cast a ray that ignores sensors and every collider attached to `skip`.
    pub fn raycast_skipping(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        skip: RigidBodyHandle,
    ) -> Option<RaycastHit> {
        let filter = QueryFilter::default()
            .exclude_sensors()
            .exclude_rigid_body(skip);
        self.raycast_filtered(origin, direction, max_distance, filter)
    }

    /// Cast a ray with a caller-provided filter and return the nearest hit.
    pub fn raycast_filtered(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: QueryFilter,
    ) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(collider, intersection)| {
                let point = ray.point_at(intersection.time_of_impact);
                RaycastHit {
                    collider,
                    body: self.collider_set.get(collider).and_then(|c| c.parent()),
                    distance: intersection.time_of_impact,
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: Vec3::new(
                        intersection.normal.x,
                        intersection.normal.y,
                        intersection.normal.z,
                    ),
                }
            })
    }

    /// Bodies currently overlapping the sensor collider `sensor`, without duplicates.
    ///
    /// Reflects the narrow phase of the last [`PhysicsWorld::step`].
    pub fn sensor_contacts(&self, sensor: ColliderHandle) -> Vec<RigidBodyHandle> {
        let mut bodies = Vec::new();
        for (c1, c2, intersecting) in self.narrow_phase.intersection_pairs_with(sensor) {
            if !intersecting {
                continue;
            }
            let other = if c1 == sensor { c2 } else { c1 };
            if let Some(body) = self.collider_set.get(other).and_then(|c| c.parent()) {
                if !bodies.contains(&body) {
                    bodies.push(body);
                }
            }
        }
        bodies
    }
}
