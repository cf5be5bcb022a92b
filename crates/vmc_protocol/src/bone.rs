//! Canonical joint identifiers.
//!
//! The vocabulary follows the humanoid bone naming used by VMC senders
//! (`Hips`, `LeftUpperArm`, `RightIndexDistal`, ...). Matching a sender name
//! against it is exact and case-sensitive.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr, VariantArray};

/// One of the recognized humanoid joints.
///
/// The declaration order is the wire vocabulary's canonical order and is used
/// as the slot index in [`crate::PoseCache`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
    VariantArray,
)]
pub enum HumanBone {
    Hips,
    LeftUpperLeg,
    RightUpperLeg,
    LeftLowerLeg,
    RightLowerLeg,
    LeftFoot,
    RightFoot,
    Spine,
    Chest,
    Neck,
    Head,
    LeftShoulder,
    RightShoulder,
    LeftUpperArm,
    RightUpperArm,
    LeftLowerArm,
    RightLowerArm,
    LeftHand,
    RightHand,
    LeftToes,
    RightToes,
    LeftEye,
    RightEye,
    Jaw,
    LeftThumbProximal,
    LeftThumbIntermediate,
    LeftThumbDistal,
    LeftIndexProximal,
    LeftIndexIntermediate,
    LeftIndexDistal,
    LeftMiddleProximal,
    LeftMiddleIntermediate,
    LeftMiddleDistal,
    LeftRingProximal,
    LeftRingIntermediate,
    LeftRingDistal,
    LeftLittleProximal,
    LeftLittleIntermediate,
    LeftLittleDistal,
    RightThumbProximal,
    RightThumbIntermediate,
    RightThumbDistal,
    RightIndexProximal,
    RightIndexIntermediate,
    RightIndexDistal,
    RightMiddleProximal,
    RightMiddleIntermediate,
    RightMiddleDistal,
    RightRingProximal,
    RightRingIntermediate,
    RightRingDistal,
    RightLittleProximal,
    RightLittleIntermediate,
    RightLittleDistal,
    UpperChest,
}

impl HumanBone {
    /// Dense index in `0..HumanBone::COUNT`.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`HumanBone::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        Self::VARIANTS.get(index).copied()
    }

    /// The sender-facing name, e.g. `"LeftUpperArm"`.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Thumb, index, middle, ring and little finger segments of either hand.
    pub const fn is_finger(self) -> bool {
        let index = self.index();
        index >= HumanBone::LeftThumbProximal.index()
            && index <= HumanBone::RightLittleDistal.index()
    }

    pub const fn is_eye(self) -> bool {
        matches!(self, HumanBone::LeftEye | HumanBone::RightEye)
    }
}
