//! Session scalars derived from control messages.
//!
//! Each scalar is updated atomically on its own; there is no cross-field
//! consistency (availability and remote time are independent facts).

use std::fmt;
use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use crate::error::SchemaError;
use crate::pose::Pose;

/// Last validation / error state, rendered as the status text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    /// Nothing handled yet.
    Waiting,
    RootPoseOk,
    Malformed(SchemaError),
    /// The transport could not decode a datagram.
    TransportError(&'static str),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Waiting => f.write_str("Waiting for sender..."),
            Status::RootPoseOk => f.write_str("Root-Pos [OK]"),
            Status::Malformed(err) => write!(f, "Bad message: {err}"),
            Status::TransportError(reason) => write!(f, "Error: {reason}"),
        }
    }
}

#[derive(Debug)]
pub struct SessionState {
    availability: AtomicI32,
    remote_time_bits: AtomicU32,
    root: RwLock<Pose>,
    status: Mutex<Status>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            availability: AtomicI32::new(0),
            remote_time_bits: AtomicU32::new(0.0f32.to_bits()),
            root: RwLock::new(Pose::IDENTITY),
            status: Mutex::new(Status::Waiting),
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sender-defined availability flag (`/VMC/Ext/OK`), 0 until reported.
    pub fn availability(&self) -> i32 {
        self.availability.load(Ordering::Acquire)
    }

    pub fn set_availability(&self, value: i32) {
        self.availability.store(value, Ordering::Release);
    }

    /// Sender clock from the last `/VMC/Ext/T`; the unit is the sender's.
    pub fn remote_time(&self) -> f32 {
        f32::from_bits(self.remote_time_bits.load(Ordering::Acquire))
    }

    pub fn set_remote_time(&self, value: f32) {
        self.remote_time_bits.store(value.to_bits(), Ordering::Release);
    }

    pub fn root_pose(&self) -> Pose {
        *self.root.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_root_pose(&self, pose: Pose) {
        *self.root.write().unwrap_or_else(PoisonError::into_inner) = pose;
    }

    pub fn status(&self) -> Status {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_status(&self, status: Status) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }
}
