//! Rope primitives: near-massless link bodies and length-limited joints.
//!
//! A rope is a chain of rapier rope joints: each one caps the distance between its
//! two anchors and leaves every other degree of freedom free. Each joint carries
//! [`ROPE_JOINT_TAG`] in its user data so ropes attached to a body can be found
//! again without any outside bookkeeping.

use crate::PhysicsWorld;
use engine_core::Vec3;
use rapier3d::prelude::*;

/// User data stamped on every rope joint.
pub const ROPE_JOINT_TAG: u128 = 0x524f_5045;

/// Physical tuning of intermediate rope links.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RopeLinkParams {
    pub mass: f32,
    /// Linear and angular damping.
    pub damping: f32,
}

impl Default for RopeLinkParams {
    fn default() -> Self {
        Self {
            mass: 0.1,
            damping: 1.0,
        }
    }
}

impl PhysicsWorld {
    /// Add a collider-less dynamic body acting as a rope link.
    pub fn add_rope_link(&mut self, position: Vec3, params: RopeLinkParams) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, position.z])
            .additional_mass(params.mass)
            .linear_damping(params.damping)
            .angular_damping(params.damping)
            .build();
        self.rigid_body_set.insert(rigid_body)
    }

    /// Join `parent` and `child` at their origins with a rope no longer than `max_length`.
    pub fn add_rope_joint(
        &mut self,
        parent: RigidBodyHandle,
        child: RigidBodyHandle,
        max_length: f32,
    ) -> ImpulseJointHandle {
        let mut joint: GenericJoint = RopeJointBuilder::new(max_length.max(0.0)).build().into();
        joint.set_contacts_enabled(false);
        joint.user_data = ROPE_JOINT_TAG;

        self.impulse_joint_set.insert(parent, child, joint, true)
    }

    /// Rewrite the maximum length of every listed rope joint.
    /// Returns how many joints were found and updated.
    pub fn set_rope_limits(&mut self, joints: &[ImpulseJointHandle], max_length: f32) -> usize {
        let max_length = max_length.max(0.0);
        let mut touched = Vec::new();

        for (handle, joint) in self.impulse_joint_set.iter_mut() {
            if !joints.contains(&handle) || joint.data.user_data != ROPE_JOINT_TAG {
                continue;
            }
            let mut rope = RopeJoint { data: joint.data };
            rope.set_max_distance(max_length);
            joint.data = rope.data;
            touched.push(joint.body1);
            touched.push(joint.body2);
        }

        for body in &touched {
            if let Some(rb) = self.rigid_body_set.get_mut(*body) {
                rb.wake_up(true);
            }
        }
        touched.len() / 2
    }

    /// Current maximum length of a rope joint. `None` for missing or non-rope joints.
    pub fn rope_limit(&self, joint: ImpulseJointHandle) -> Option<f32> {
        self.impulse_joint_set
            .get(joint)
            .filter(|j| j.data.user_data == ROPE_JOINT_TAG)
            .map(|j| RopeJoint { data: j.data }.max_distance())
    }

    /// Remove one joint. Already-removed joints are ignored.
    pub fn remove_joint(&mut self, joint: ImpulseJointHandle) {
        self.impulse_joint_set.remove(joint, true);
    }

    /// Remove every rope joint attached to `body`. Returns how many were removed.
    pub fn remove_rope_joints_on(&mut self, body: RigidBodyHandle) -> usize {
        let stale: Vec<ImpulseJointHandle> = self
            .impulse_joint_set
            .iter()
            .filter(|(_, joint)| {
                joint.data.user_data == ROPE_JOINT_TAG && (joint.body1 == body || joint.body2 == body)
            })
            .map(|(handle, _)| handle)
            .collect();

        for handle in &stale {
            self.impulse_joint_set.remove(*handle, true);
        }
        if !stale.is_empty() {
            log::debug!("Removed {} stale rope joint(s) from {:?}", stale.len(), body);
        }
        stale.len()
    }
}
