//! Bevy integration for the VMC receiver.
//!
//! This module provides:
//! - [`VmcSession`]: the shared [`Receiver`] as a resource
//! - tick boundary once per frame (`PreUpdate`)
//! - bone and root synchronizers onto `Transform`s (`Update`)
//! - a periodic session report in the log
//!
//! # Usage
//!
//! ```ignore
//! use bevy::prelude::*;
//! use vmc_bevy::{Skeleton, VmcReceiverPlugin};
//!
//! App::new()
//!     .add_plugins(MinimalPlugins)
//!     .add_plugins(VmcReceiverPlugin::default())
//!     .run();
//! ```
//!
//! Feed the receiver from a transport through `VmcSession::receiver()`.

pub mod config;
pub mod report;
pub mod sync;

use std::ops::Deref;
use std::sync::Arc;

use bevy::prelude::*;
use tracing::debug;
use vmc_protocol::{Receiver, ReceiverConfig};

pub use config::SyncConfig;
pub use report::{report_status, StatusReportTimer};
pub use sync::{advance_tick, sync_bones, sync_root, to_quat, to_vec3, RootTarget, Skeleton};

/// Tracing target for the synchronizers.
pub const LOG_SYNC: &str = "vmc::sync";
/// Tracing target for the periodic session report.
pub const LOG_METRICS: &str = "vmc::metrics";

/// The shared receiver. Clone the inner `Arc` to hand it to a transport.
#[derive(Resource, Clone, Debug)]
pub struct VmcSession(pub Arc<Receiver>);

impl VmcSession {
    pub fn receiver(&self) -> Arc<Receiver> {
        Arc::clone(&self.0)
    }
}

impl Deref for VmcSession {
    type Target = Receiver;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VmcSystems {
    /// `PreUpdate`: limiter tick.
    Tick,
    /// `Update`: pose synchronizers.
    Sync,
}

#[derive(Default)]
pub struct VmcReceiverPlugin {
    /// Used when no receiver is supplied.
    pub config: ReceiverConfig,
    pub sync: SyncConfig,
    /// Pre-built receiver, e.g. one a transport was already started with.
    pub receiver: Option<Arc<Receiver>>,
}

impl VmcReceiverPlugin {
    pub fn with_receiver(receiver: Arc<Receiver>, sync: SyncConfig) -> Self {
        Self {
            config: ReceiverConfig::default(),
            sync,
            receiver: Some(receiver),
        }
    }
}

impl Plugin for VmcReceiverPlugin {
    fn build(&self, app: &mut App) {
        let receiver = self
            .receiver
            .clone()
            .unwrap_or_else(|| Arc::new(Receiver::new(&self.config)));

        app.insert_resource(VmcSession(receiver))
            .insert_resource(self.sync.clone());

        app.add_systems(PreUpdate, advance_tick.in_set(VmcSystems::Tick));
        app.add_systems(
            Update,
            (sync_bones, sync_root)
                .in_set(VmcSystems::Sync)
                .run_if(receiver_active),
        );

        match self.sync.report_interval() {
            Some(interval) => {
                app.insert_resource(StatusReportTimer::new(interval));
                app.add_systems(Update, report_status);
            }
            None => debug!(target: LOG_SYNC, "status report disabled"),
        }
    }

    fn name(&self) -> &str {
        "VmcReceiverPlugin"
    }
}

/// Synchronizers are halted while the receiver is frozen.
pub fn receiver_active(session: Res<VmcSession>) -> bool {
    !session.is_frozen()
}
