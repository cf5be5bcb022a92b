use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Port VMC senders use unless told otherwise.
pub const DEFAULT_VMC_PORT: u16 = 39539;

/// Largest payload a single UDP datagram can carry over IPv4.
pub const MAX_UDP_PAYLOAD: usize = 65_507;

/// UDP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub listen_addr: SocketAddr,
    /// Receive buffer size; longer datagrams are truncated by the OS and then
    /// fail to decode.
    pub max_datagram_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_VMC_PORT),
            max_datagram_size: MAX_UDP_PAYLOAD,
        }
    }
}
