// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Transport capability consumed by the query and subscription engines.
//!
//! The client does not own the fabric stack; it consumes a narrow surface:
//! a synchronous request/response exchange for queries, and an
//! unreliable-datagram endpoint (send, posted receives, completion polling)
//! for subscription traffic. Production deployments back these with the
//! verbs stack; tests use in-memory mocks; [`udp`] tunnels datagrams over
//! IP.

pub mod udp;

pub use udp::UdpEndpoint;

use crate::{Error, Result};
use std::time::Duration;

/// Addressing material for outgoing administration traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddressInfo {
    /// LID of the administration service (the SM/PM port).
    pub service_lid: u32,
    /// Our own base LID.
    pub local_lid: u32,
    /// Service level for management traffic.
    pub service_level: u8,
    /// Queue-pair number of our local datagram endpoint.
    pub local_qpn: u32,
    /// Partition keys present in the local port's table.
    pub pkeys: [u16; 8],
}

impl AddressInfo {
    /// Whether `pkey` is present in the local partition table.
    pub fn has_pkey(&self, pkey: u16) -> bool {
        self.pkeys.iter().any(|&p| p == pkey)
    }
}

/// Synchronous request/response exchange used by the query path.
///
/// Implementations perform their own timeout and retry handling; a return
/// of `Err(Error::Timeout)` means the full timeout x (1 + retries) budget
/// elapsed without a response.
pub trait MadTransport: Send + Sync {
    fn send_recv(&self, request: &[u8], timeout: Duration, retries: u32) -> Result<Vec<u8>>;

    fn address_info(&self) -> AddressInfo;
}

/// One completion harvested from the datagram endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// A previously posted send finished (successfully or not).
    SendDone { ok: bool },
    /// An inbound datagram arrived.
    Received(Vec<u8>),
}

/// Unreliable-datagram endpoint used by the subscription engine.
pub trait UdEndpoint: Send + Sync {
    /// Fire-and-forget datagram send.
    fn send(&self, bytes: &[u8]) -> Result<()>;

    /// Keep `n` receive buffers posted.
    fn post_receives(&self, n: usize) -> Result<()>;

    /// Harvest completions, waiting up to `timeout` for the first one.
    fn poll(&self, timeout: Duration) -> Result<Vec<Completion>>;

    fn address_info(&self) -> AddressInfo;
}

/// Map an I/O failure into the public error space.
pub(crate) fn io_error(context: &str, err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::WouldBlock || err.kind() == std::io::ErrorKind::TimedOut {
        Error::Timeout
    } else {
        log::warn!("[TRANSPORT] {}: {}", context, err);
        Error::Transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_info_pkey_lookup() {
        let mut info = AddressInfo::default();
        info.pkeys[0] = 0xFFFF;
        info.pkeys[1] = 0x7FFF;
        assert!(info.has_pkey(0xFFFF));
        assert!(info.has_pkey(0x7FFF));
        assert!(!info.has_pkey(0x8001));
    }

    #[test]
    fn test_io_error_classification() {
        let timeout = std::io::Error::new(std::io::ErrorKind::WouldBlock, "again");
        match io_error("recv", timeout) {
            Error::Timeout => {}
            other => panic!("unexpected error {:?}", other),
        }

        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "no");
        match io_error("send", refused) {
            Error::Transport => {}
            other => panic!("unexpected error {:?}", other),
        }
    }
}
