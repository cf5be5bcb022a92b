//! Ingestion gate shared by the transport and the frame loop.
//!
//! ```text
//! transport ──on_message──▶ freeze? ─▶ RateLimiter::admit ─▶ MessageDispatcher
//!                                                                  │
//! frame loop ──tick──▶ RateLimiter::tick           PoseCache / SessionState
//!            ──read──────────────────────────────────────────────▶ ┘
//! ```
//!
//! All methods take `&self`; put the receiver in an `Arc` and hand clones to
//! the ingestion task and to the consumers.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, trace};

use crate::config::ReceiverConfig;
use crate::dispatcher::{Applied, MessageDispatcher};
use crate::error::DispatchError;
use crate::limiter::RateLimiter;
use crate::message::OscMessage;
use crate::pose::{Pose, PoseCache};
use crate::resolver::ResolverStats;
use crate::session::{SessionState, Status};
use crate::{LOG_DISPATCH, LOG_INGEST};

/// What happened to one incoming message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ingest {
    /// Receiver frozen, message ignored without any accounting.
    Frozen,
    /// Discarded by the rate limiter before validation.
    Dropped,
    Applied(Applied),
    Rejected(DispatchError),
}

#[derive(Debug)]
pub struct Receiver {
    frozen: AtomicBool,
    limiter: RateLimiter,
    dispatcher: Mutex<MessageDispatcher>,
    performer: Arc<PoseCache>,
    trackers: Arc<PoseCache>,
    session: Arc<SessionState>,
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new(&ReceiverConfig::default())
    }
}

impl Receiver {
    pub fn new(config: &ReceiverConfig) -> Self {
        let performer = Arc::new(PoseCache::new());
        let trackers = Arc::new(PoseCache::new());
        let session = Arc::new(SessionState::new());
        let dispatcher = MessageDispatcher::new(
            Arc::clone(&performer),
            Arc::clone(&trackers),
            Arc::clone(&session),
        );

        Self {
            frozen: AtomicBool::new(config.freeze),
            limiter: RateLimiter::new(config.rate_limit_enabled, config.rate_limit_threshold),
            dispatcher: Mutex::new(dispatcher),
            performer,
            trackers,
            session,
        }
    }

    // ---------------------------------------------------------------------
    // Ingestion
    // ---------------------------------------------------------------------

    /// Feed one decoded message. Never fails; the outcome is informational.
    pub fn on_message(&self, message: &OscMessage) -> Ingest {
        if self.is_frozen() {
            return Ingest::Frozen;
        }

        if !self.limiter.admit() {
            trace!(target: LOG_INGEST, address = %message.address, "rate limited, dropped");
            return Ingest::Dropped;
        }

        let result = self
            .dispatcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .dispatch(message);

        match result {
            Ok(applied) => {
                if let Applied::Frame(_) = applied {
                    self.limiter.record_frame();
                }
                Ingest::Applied(applied)
            }
            Err(err @ DispatchError::UnknownAddress) => {
                debug!(target: LOG_DISPATCH, address = %message.address, "unknown address");
                Ingest::Rejected(err)
            }
            Err(err @ DispatchError::Malformed(_)) => {
                debug!(target: LOG_DISPATCH, "{err}");
                Ingest::Rejected(err)
            }
        }
    }

    /// Record a failure that happened before a message existed (bad datagram).
    ///
    /// Only the status text changes; the next datagram is processed normally.
    pub fn on_transport_error(&self, reason: &'static str) {
        if self.is_frozen() {
            return;
        }
        self.session.set_status(Status::TransportError(reason));
    }

    // ---------------------------------------------------------------------
    // Frame loop
    // ---------------------------------------------------------------------

    /// Tick boundary, once per consumer frame. Returns `false` while frozen,
    /// in which case the limiter counts do not roll over either.
    pub fn tick(&self) -> bool {
        if self.is_frozen() {
            return false;
        }
        self.limiter.tick();
        true
    }

    pub fn set_frozen(&self, frozen: bool) {
        self.frozen.store(frozen, Ordering::Release);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    pub fn set_rate_limit_enabled(&self, enabled: bool) {
        self.limiter.set_enabled(enabled);
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Performer joint poses (`/VMC/Ext/Bone/Pos`).
    pub fn performer(&self) -> &Arc<PoseCache> {
        &self.performer
    }

    /// Tracker poses (`/VMC/Ext/Tra/Pos`).
    pub fn trackers(&self) -> &Arc<PoseCache> {
        &self.trackers
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn root_pose(&self) -> Pose {
        self.session.root_pose()
    }

    pub fn availability(&self) -> i32 {
        self.session.availability()
    }

    pub fn remote_timestamp(&self) -> f32 {
        self.session.remote_time()
    }

    pub fn status_text(&self) -> String {
        self.session.status().to_string()
    }

    pub fn drop_count(&self) -> u64 {
        self.limiter.dropped()
    }

    pub fn last_tick_count(&self) -> u32 {
        self.limiter.frames_last_tick()
    }

    pub fn resolver_stats(&self) -> ResolverStats {
        self.dispatcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .resolver()
            .stats()
    }

    pub fn report(&self) -> SessionReport {
        SessionReport {
            status: self.session.status(),
            availability: self.availability(),
            remote_time: self.remote_timestamp(),
            last_tick_count: self.last_tick_count(),
            drop_count: self.drop_count(),
            joints: self.performer.len(),
            resolver: self.resolver_stats(),
        }
    }
}

/// Point-in-time summary for status displays and periodic logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionReport {
    pub status: Status,
    pub availability: i32,
    pub remote_time: f32,
    pub last_tick_count: u32,
    pub drop_count: u64,
    /// Performer joints with a cached pose.
    pub joints: usize,
    pub resolver: ResolverStats,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status : {}", self.status)?;
        writeln!(f, "Available : {}", self.availability)?;
        writeln!(f, "RemoteTime : {}", self.remote_time)?;
        writeln!(f)?;
        writeln!(f, "LastTickFrames : {}", self.last_tick_count)?;
        writeln!(f, "DroppedPackets : {}", self.drop_count)?;
        writeln!(
            f,
            "Joints : {} ({} names seen, {} unresolved)",
            self.joints, self.resolver.names, self.resolver.unresolved
        )
    }
}
