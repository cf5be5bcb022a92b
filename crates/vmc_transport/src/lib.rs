//! OSC over UDP for the VMC receiver.
//!
//! [`codec`] turns datagrams into [`vmc_protocol::OscMessage`]s and back;
//! [`UdpReceiver`] runs the socket on its own tokio runtime and feeds a shared
//! [`vmc_protocol::Receiver`].

pub mod codec;
pub mod config;
pub mod error;
pub mod udp;

pub use codec::{decode_message, decode_packet, encode_bundle, encode_message};
pub use config::{TransportConfig, DEFAULT_VMC_PORT, MAX_UDP_PAYLOAD};
pub use error::{OscDecodeError, TransportError};
pub use udp::{ingest_datagram, UdpReceiver};

/// Tracing target for socket and decode events.
pub const LOG_TRANSPORT: &str = "vmc::transport";
