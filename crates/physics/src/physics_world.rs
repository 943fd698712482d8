//! Physics world management with Rapier3D.

use crate::collision::CollisionGroup;
use engine_core::Vec3;
use rapier3d::na::{Isometry3, Vector3};
use rapier3d::prelude::*;

/// Main physics world containing all simulation state.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Solver groups a collider had before they were overridden.
pub type SavedSolverGroups = Vec<(ColliderHandle, InteractionGroups)>;

impl PhysicsWorld {
    /// Create a new physics world with default gravity.
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![0.0, -9.81, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Step the physics simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Update query pipeline for raycasting.
    ///
    /// Needed after adding colliders outside of [`PhysicsWorld::step`].
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a dynamic rigid body and return its handle.
    pub fn add_dynamic_body(&mut self, position: Vec3) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, position.z])
            .build();
        self.rigid_body_set.insert(rigid_body)
    }

    /// Add a dynamic body that ignores gravity and coasts to a stop (the craft).
    pub fn add_hover_body(&mut self, position: Vec3, damping: f32) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, position.z])
            .gravity_scale(0.0)
            .linear_damping(damping)
            .angular_damping(damping)
            .lock_rotations()
            .build();
        self.rigid_body_set.insert(rigid_body)
    }

    /// Add a sphere collider with the given density and collision layer.
    pub fn add_sphere_collider(
        &mut self,
        body_handle: RigidBodyHandle,
        radius: f32,
        density: f32,
        group: CollisionGroup,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::ball(radius)
            .density(density)
            .collision_groups(group.interaction_groups())
            .build();
        self.collider_set.insert_with_parent(collider, body_handle, &mut self.rigid_body_set)
    }

    /// Add a capsule collider (good for creatures).
    pub fn add_capsule_collider(
        &mut self,
        body_handle: RigidBodyHandle,
        half_height: f32,
        radius: f32,
        density: f32,
        group: CollisionGroup,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::capsule_y(half_height, radius)
            .density(density)
            .collision_groups(group.interaction_groups())
            .build();
        self.collider_set.insert_with_parent(collider, body_handle, &mut self.rigid_body_set)
    }

    /// Add a massless sensor sphere (e.g. the craft's capture zone).
    pub fn add_sensor_sphere(&mut self, body_handle: RigidBodyHandle, radius: f32) -> ColliderHandle {
        let collider = ColliderBuilder::ball(radius)
            .sensor(true)
            .density(0.0)
            .collision_groups(CollisionGroup::Trigger.interaction_groups())
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.collider_set.insert_with_parent(collider, body_handle, &mut self.rigid_body_set)
    }

    /// Add a ground plane collider (flat Y=0 half-space).
    pub fn add_ground_plane(&mut self) -> ColliderHandle {
        let collider = ColliderBuilder::halfspace(Vector::y_axis())
            .collision_groups(CollisionGroup::Environment.interaction_groups())
            .build();
        self.collider_set.insert(collider)
    }

    /// Add a static cuboid collider (barns, silos). No parent body; collider is fixed in world.
    /// `translation`: world position of center. `rotation_y_rad`: rotation around Y axis in radians.
    /// `half_extents`: half sizes in local X, Y, Z (after rotation).
    pub fn add_static_cuboid(
        &mut self,
        translation: Vec3,
        rotation_y_rad: f32,
        half_extents: Vec3,
    ) -> ColliderHandle {
        let tra = vector![translation.x, translation.y, translation.z];
        let axisangle = Vector3::y_axis().into_inner() * (rotation_y_rad as Real);
        let position = Isometry3::new(tra, axisangle);
        let collider = ColliderBuilder::cuboid(
            half_extents.x as Real,
            half_extents.y as Real,
            half_extents.z as Real,
        )
        .position(position)
        .collision_groups(CollisionGroup::Environment.interaction_groups())
        .build();
        self.collider_set.insert(collider)
    }

    /// Whether the body still exists.
    pub fn contains_body(&self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set.contains(handle)
    }

    /// World position of a rigid body.
    pub fn body_position(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle).map(|body| {
            let pos = body.translation();
            Vec3::new(pos.x, pos.y, pos.z)
        })
    }

    /// Linear velocity of a rigid body.
    pub fn body_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle).map(|body| {
            let vel = body.linvel();
            Vec3::new(vel.x, vel.y, vel.z)
        })
    }

    /// Mass of a rigid body, including the mass of its colliders.
    pub fn body_mass(&self, handle: RigidBodyHandle) -> Option<f32> {
        self.rigid_body_set.get(handle).map(|body| body.mass())
    }

    /// Teleport a body and zero its velocity.
    pub fn set_body_position(&mut self, handle: RigidBodyHandle, position: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_translation(vector![position.x, position.y, position.z], true);
            body.set_linvel(Vector::zeros(), true);
        }
    }

    /// Overwrite the linear velocity of a body.
    pub fn set_body_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_linvel(vector![velocity.x, velocity.y, velocity.z], true);
        }
    }

    /// Apply an impulse to a dynamic body.
    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.apply_impulse(vector![impulse.x, impulse.y, impulse.z], true);
        }
    }

    /// Apply a mass-independent acceleration for one frame of length `dt`.
    pub fn apply_acceleration(&mut self, handle: RigidBodyHandle, acceleration: Vec3, dt: f32) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            let impulse = acceleration * body.mass() * dt;
            body.apply_impulse(vector![impulse.x, impulse.y, impulse.z], true);
        }
    }

    /// Let every collider of `handle` pass through other bodies while still reporting
    /// intersections. Returns the solver groups to hand back to [`PhysicsWorld::restore_solver_groups`].
    pub fn disable_contact_response(&mut self, handle: RigidBodyHandle) -> SavedSolverGroups {
        let colliders: Vec<ColliderHandle> = match self.rigid_body_set.get(handle) {
            Some(body) => body.colliders().to_vec(),
            None => return Vec::new(),
        };

        let mut saved = Vec::with_capacity(colliders.len());
        for handle in colliders {
            if let Some(collider) = self.collider_set.get_mut(handle) {
                saved.push((handle, collider.solver_groups()));
                collider.set_solver_groups(InteractionGroups::none());
            }
        }
        saved
    }

    /// Undo [`PhysicsWorld::disable_contact_response`]. Colliders that no longer exist are skipped.
    pub fn restore_solver_groups(&mut self, saved: &[(ColliderHandle, InteractionGroups)]) {
        for (handle, groups) in saved {
            if let Some(collider) = self.collider_set.get_mut(*handle) {
                collider.set_solver_groups(*groups);
            }
        }
    }

    /// Remove a rigid body, its colliders and every joint attached to it.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }
}
