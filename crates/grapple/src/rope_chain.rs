//! The chain of length-limited segments binding a target to the craft.

use engine_core::Vec3;
use physics::{ImpulseJointHandle, PhysicsWorld, RigidBodyHandle, RopeLinkParams};

/// One link of the rope.
#[derive(Debug, Clone)]
pub struct RopeSegment {
    pub index: usize,
    /// A rope link for every segment but the last, whose body is the target itself.
    pub body: RigidBodyHandle,
    /// Constraint to the previous segment's body (the craft for index 0).
    pub joint: ImpulseJointHandle,
    /// Maximum distance between this segment's body and the previous one.
    pub limit: f32,
    /// Last known world position, for drawing only. The solver owns the real one.
    pub position: Vec3,
}

/// How to lay out a new chain.
#[derive(Debug, Clone, Copy)]
pub struct ChainParams {
    pub segments: usize,
    /// Total rope length at capture.
    pub length: f32,
    /// Added to every segment's limit at construction only.
    pub slack_margin: f32,
    pub link: RopeLinkParams,
}

/// Ordered segments from the craft (segment 0) to the target (segment N-1).
#[derive(Debug)]
pub struct RopeChain {
    segments: Vec<RopeSegment>,
}

impl RopeChain {
    /// Build a chain between `anchor` (the craft) and `target`, laying links on the
    /// straight line between their current positions.
    ///
    /// # Panics
    /// If `params.segments` is zero.
    pub fn build(
        physics: &mut PhysicsWorld,
        anchor: (RigidBodyHandle, Vec3),
        target: (RigidBodyHandle, Vec3),
        params: &ChainParams,
    ) -> Self {
        assert!(params.segments >= 1, "a rope needs at least one segment");

        let n = params.segments;
        let (anchor_body, anchor_pos) = anchor;
        let (target_body, target_pos) = target;
        let limit = params.length.max(0.0) / n as f32 + params.slack_margin;

        let mut segments = Vec::with_capacity(n);
        let mut previous = anchor_body;
        for index in 0..n {
            let (body, position) = if index == n - 1 {
                (target_body, target_pos)
            } else {
                let t = (index + 1) as f32 / n as f32;
                let position = anchor_pos.lerp(target_pos, t);
                (physics.add_rope_link(position, params.link), position)
            };

            let joint = physics.add_rope_joint(previous, body, limit);
            segments.push(RopeSegment {
                index,
                body,
                joint,
                limit,
                position,
            });
            previous = body;
        }

        log::debug!(
            "Built {}-segment rope, {:.2} per segment",
            n,
            limit
        );
        Self { segments }
    }

    pub fn segments(&self) -> &[RopeSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Body at the far end of the rope.
    pub fn target(&self) -> Option<RigidBodyHandle> {
        self.segments.last().map(|s| s.body)
    }

    /// Sum of every segment's limit.
    pub fn total_limit(&self) -> f32 {
        self.segments.iter().map(|s| s.limit).sum()
    }

    /// Spread `total` evenly over the segments.
    pub fn set_total_length(&mut self, physics: &mut PhysicsWorld, total: f32) {
        let per_segment = total.max(0.0) / self.segments.len() as f32;
        for segment in &mut self.segments {
            segment.limit = per_segment;
        }

        let joints: Vec<ImpulseJointHandle> = self.segments.iter().map(|s| s.joint).collect();
        let updated = physics.set_rope_limits(&joints, per_segment);
        if updated < joints.len() {
            log::debug!(
                "{} of {} rope joints missing while reeling",
                joints.len() - updated,
                joints.len()
            );
        }
    }

    /// Refresh segment positions from the solver.
    pub fn sync_positions(&mut self, physics: &PhysicsWorld) {
        for segment in &mut self.segments {
            if let Some(position) = physics.body_position(segment.body) {
                segment.position = position;
            }
        }
    }

    /// Polyline from `anchor` through every segment, for drawing the beam.
    pub fn points(&self, anchor: Vec3) -> Vec<Vec3> {
        std::iter::once(anchor)
            .chain(self.segments.iter().map(|s| s.position))
            .collect()
    }

    /// Remove every joint and every rope link. The target body is left alone.
    /// Anything already gone is skipped.
    pub fn destroy(self, physics: &mut PhysicsWorld) {
        let last = self.segments.len().saturating_sub(1);
        for segment in self.segments {
            physics.remove_joint(segment.joint);
            if segment.index < last {
                physics.remove_body(segment.body);
            }
        }
    }
}
