//! Receiving core for VMC motion-capture streams.
//!
//! A sender (face/body tracker, mocap suite) streams OSC messages describing
//! the performer's skeleton. This crate turns that loosely typed stream into a
//! consistent "last known good pose" table:
//!
//! - [`HumanBone`] is the canonical joint vocabulary.
//! - [`JointResolver`] maps sender joint names onto it and memoizes failures.
//! - [`PoseCache`] holds the latest pose per joint (performer and trackers).
//! - [`MessageDispatcher`] validates each message against its address schema
//!   and applies it.
//! - [`RateLimiter`] drops input for a tick after a flooded tick.
//! - [`Receiver`] ties them together behind the freeze flag and is shared
//!   between the transport (ingestion) and the frame loop (tick + readers).
//!
//! The transport itself lives in `vmc_transport`, engine wiring in `vmc_bevy`.

/// Canonical humanoid joint vocabulary
pub mod bone;
/// Receiver configuration surface
pub mod config;
/// Address dispatch onto caches and session scalars
pub mod dispatcher;
/// Error types surfaced by validation and dispatch
pub mod error;
/// Tick-based packet limiter
pub mod limiter;
/// OSC message model and per-address schemas
pub mod message;
/// Pose values and the per-joint pose cache
pub mod pose;
/// Ingestion gate shared between transport and frame loop
pub mod receiver;
/// Joint-name resolution with negative caching
pub mod resolver;
/// Session scalars and status text
pub mod session;

pub use bone::HumanBone;
pub use config::ReceiverConfig;
pub use dispatcher::{Applied, MessageDispatcher};
pub use error::{DispatchError, SchemaError};
pub use limiter::RateLimiter;
pub use message::{Address, ArgKind, OscArg, OscMessage, VmcMessage};
pub use pose::{Pose, PoseCache, Position, Rotation};
pub use receiver::{Ingest, Receiver, SessionReport};
pub use resolver::{JointResolver, ResolverStats, Unresolvable};
pub use session::{SessionState, Status};

/// Frames per tick above which the next tick's input is discarded.
pub const DEFAULT_RATE_LIMIT_THRESHOLD: u32 = 30;

/// Logging target for the ingestion gate (freeze, limiter).
pub const LOG_INGEST: &str = "vmc::ingest";
/// Logging target for schema validation and dispatch.
pub const LOG_DISPATCH: &str = "vmc::dispatch";
/// Logging target for joint name resolution.
pub const LOG_RESOLVER: &str = "vmc::resolver";
