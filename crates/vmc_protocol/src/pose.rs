//! Pose values and the last-known-pose table.

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use strum::EnumCount;

use crate::HumanBone;

/// Position in the sender's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<[f32; 3]> for Position {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

/// Rotation quaternion in `x, y, z, w` order.
///
/// Stored exactly as sent; normalization is the sender's job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Rotation {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f32; 4]> for Rotation {
    fn from([x, y, z, w]: [f32; 4]) -> Self {
        Self { x, y, z, w }
    }
}

/// Position and rotation of one joint (or of the root).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Position,
    pub rotation: Rotation,
}

impl Pose {
    pub const IDENTITY: Self = Self::new(Position::ZERO, Rotation::IDENTITY);

    pub const fn new(position: Position, rotation: Rotation) -> Self {
        Self { position, rotation }
    }
}

type Slots = [Option<Pose>; HumanBone::COUNT];

/// Latest pose per [`HumanBone`].
///
/// Position and rotation live in the same slot and are replaced together
/// under the write lock, so readers never see a joint with fields from two
/// different updates. A joint is in the resolved set iff its slot is filled.
/// Writes are last-write-wins.
#[derive(Debug)]
pub struct PoseCache {
    slots: RwLock<Slots>,
}

impl Default for PoseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseCache {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new([None; HumanBone::COUNT]),
        }
    }

    pub fn set_pose(&self, bone: HumanBone, pose: Pose) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots[bone.index()] = Some(pose);
    }

    pub fn get_pose(&self, bone: HumanBone) -> Option<Pose> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots[bone.index()]
    }

    /// Joints with a cached pose, in [`HumanBone`] declaration order.
    pub fn resolved_ids(&self) -> Vec<HumanBone> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        resolved(&slots).map(|(bone, _)| bone).collect()
    }

    /// Copy every cached `(bone, pose)` pair into `out` under one read lock.
    ///
    /// `out` is cleared first; reusing it across frames keeps the per-frame
    /// read allocation-free.
    pub fn snapshot_into(&self, out: &mut Vec<(HumanBone, Pose)>) {
        out.clear();
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        out.extend(resolved(&slots));
    }

    pub fn len(&self) -> usize {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn resolved(slots: &Slots) -> impl Iterator<Item = (HumanBone, Pose)> + '_ {
    slots.iter().enumerate().filter_map(|(index, slot)| {
        let pose = (*slot)?;
        Some((HumanBone::from_index(index)?, pose))
    })
}
