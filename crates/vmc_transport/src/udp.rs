//! UDP listener.
//!
//! Owns a small tokio runtime with one receive task. Every datagram is
//! decoded on that task and fed straight into the shared [`Receiver`]; the
//! frame loop never waits on the socket.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::{net::UdpSocket, runtime::Runtime, sync::oneshot, task::JoinHandle};
use tracing::{debug, info, trace, warn};
use vmc_protocol::{OscMessage, Receiver};

use crate::codec::decode_packet;
use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::LOG_TRANSPORT;

/// Decode one datagram and ingest its messages in packet order.
///
/// A decode failure is reported to the receiver as status text after the
/// messages decoded before it have been ingested. Returns the number of
/// messages handed to the receiver. `scratch` is reused between calls.
pub fn ingest_datagram(
    receiver: &Receiver,
    datagram: &[u8],
    scratch: &mut Vec<OscMessage>,
) -> usize {
    scratch.clear();
    let decoded = decode_packet(datagram, scratch);

    for message in scratch.iter() {
        let outcome = receiver.on_message(message);
        trace!(target: LOG_TRANSPORT, address = %message.address, ?outcome, "ingested");
    }

    if let Err(err) = decoded {
        debug!(
            target: LOG_TRANSPORT,
            "undecodable datagram ({} bytes): {err}",
            datagram.len()
        );
        receiver.on_transport_error(err.reason());
    }

    scratch.len()
}

pub struct UdpReceiver {
    runtime: Runtime,
    config: TransportConfig,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for UdpReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpReceiver")
            .field("config", &self.config)
            .field("local_addr", &self.local_addr)
            .finish()
    }
}

impl UdpReceiver {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("vmc-udp")
            .enable_all()
            .build()?;

        Ok(Self {
            runtime,
            config,
            local_addr: None,
            shutdown_tx: None,
            task: None,
        })
    }

    /// Bind the socket and start feeding `receiver`. Returns the bound
    /// address (useful when listening on port 0).
    pub fn start(&mut self, receiver: Arc<Receiver>) -> Result<SocketAddr, TransportError> {
        if self.task.is_some() {
            return Err(TransportError::AlreadyStarted);
        }

        let socket = self
            .runtime
            .block_on(UdpSocket::bind(self.config.listen_addr))?;
        let local_addr = socket.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let buffer_size = self.config.max_datagram_size;
        self.task = Some(self.runtime.spawn(receive_loop(
            socket,
            receiver,
            buffer_size,
            shutdown_rx,
        )));
        self.shutdown_tx = Some(shutdown_tx);
        self.local_addr = Some(local_addr);

        info!(target: LOG_TRANSPORT, %local_addr, "listening for VMC datagrams");
        Ok(local_addr)
    }

    /// Stop the receive task and release the socket. Must not be called from
    /// inside an async context.
    pub fn stop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = self.runtime.block_on(task);
            info!(target: LOG_TRANSPORT, "udp receiver stopped");
        }
        self.local_addr = None;
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for UdpReceiver {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn receive_loop(
    socket: UdpSocket,
    receiver: Arc<Receiver>,
    buffer_size: usize,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut buf = vec![0u8; buffer_size];
    let mut scratch = Vec::new();

    loop {
        tokio::select! {
            result = socket.recv_from(&mut buf) => match result {
                Ok((len, peer)) => {
                    trace!(target: LOG_TRANSPORT, %peer, len, "datagram");
                    ingest_datagram(&receiver, &buf[..len], &mut scratch);
                }
                // Windows reports ICMP port-unreachable as a receive error on UDP
                // sockets; the socket stays usable.
                Err(err) => warn!(target: LOG_TRANSPORT, "udp receive failed: {err}"),
            },
            _ = &mut shutdown_rx => break,
        }
    }
}
