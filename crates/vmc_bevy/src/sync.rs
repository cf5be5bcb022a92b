//! Systems that copy cached poses onto entity transforms.
//!
//! Bones receive local translation/rotation (values are relative to the
//! parent bone, as sent). The root target receives the root pose as is.
//! No handedness or axis conversion is applied.

use std::collections::HashMap;

use bevy::prelude::*;
use tracing::trace;
use vmc_protocol::{HumanBone, Pose, Position, Rotation};

use crate::config::SyncConfig;
use crate::{VmcSession, LOG_SYNC};

/// Maps joints to the entities that carry their transforms.
#[derive(Component, Debug, Default, Clone)]
pub struct Skeleton {
    bones: HashMap<HumanBone, Entity>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bone(mut self, bone: HumanBone, entity: Entity) -> Self {
        self.insert(bone, entity);
        self
    }

    /// Bind `bone` to `entity`, replacing an earlier binding.
    pub fn insert(&mut self, bone: HumanBone, entity: Entity) -> Option<Entity> {
        self.bones.insert(bone, entity)
    }

    pub fn bone(&self, bone: HumanBone) -> Option<Entity> {
        self.bones.get(&bone).copied()
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

/// Marks the entity that follows the root pose.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct RootTarget;

pub fn to_vec3(position: Position) -> Vec3 {
    Vec3::new(position.x, position.y, position.z)
}

pub fn to_quat(rotation: Rotation) -> Quat {
    Quat::from_xyzw(rotation.x, rotation.y, rotation.z, rotation.w)
}

fn apply_pose(transform: &mut Transform, pose: Pose) {
    transform.translation = to_vec3(pose.position);
    transform.rotation = to_quat(pose.rotation);
}

/// Roll the receiver's per-tick counters over. Runs once per frame.
pub fn advance_tick(session: Res<VmcSession>) {
    session.tick();
}

/// Push every resolved performer joint onto each skeleton's bone entities.
pub fn sync_bones(
    session: Res<VmcSession>,
    config: Res<SyncConfig>,
    skeletons: Query<&Skeleton>,
    mut transforms: Query<&mut Transform, Without<RootTarget>>,
    mut snapshot: Local<Vec<(HumanBone, Pose)>>,
) {
    session.performer().snapshot_into(&mut snapshot);
    if snapshot.is_empty() {
        return;
    }

    let mut applied = 0usize;
    for skeleton in &skeletons {
        for (bone, pose) in snapshot.iter() {
            if !config.syncs(*bone) {
                continue;
            }
            // Joints the rig does not have are skipped.
            let Some(entity) = skeleton.bone(*bone) else {
                continue;
            };
            if let Ok(mut transform) = transforms.get_mut(entity) {
                apply_pose(&mut transform, *pose);
                applied += 1;
            }
        }
    }
    trace!(target: LOG_SYNC, cached = snapshot.len(), applied, "bones synchronized");
}

pub fn sync_root(session: Res<VmcSession>, mut roots: Query<&mut Transform, With<RootTarget>>) {
    let pose = session.root_pose();
    for mut transform in &mut roots {
        apply_pose(&mut transform, pose);
    }
}
