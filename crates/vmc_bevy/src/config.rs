use std::time::Duration;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use vmc_protocol::HumanBone;

/// Which cached joints the pose synchronizer pushes, and how often the
/// session report is logged.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Apply finger bones.
    pub hands: bool,
    /// Apply eye bones.
    pub eyes: bool,
    /// Seconds between status reports; 0 disables them.
    pub report_interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            hands: true,
            eyes: true,
            report_interval_secs: 10,
        }
    }
}

impl SyncConfig {
    pub fn syncs(&self, bone: HumanBone) -> bool {
        if bone.is_finger() {
            return self.hands;
        }
        if bone.is_eye() {
            return self.eyes;
        }
        true
    }

    pub fn report_interval(&self) -> Option<Duration> {
        (self.report_interval_secs > 0).then(|| Duration::from_secs(self.report_interval_secs))
    }
}
