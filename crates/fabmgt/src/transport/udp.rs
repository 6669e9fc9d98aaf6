// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! UDP realization of the datagram endpoint.
//!
//! Tunnels management datagrams over UDP for deployments without a local
//! verbs stack and for integration testing. One socket, blocking receives
//! with a poll timeout, drain-until-empty on each poll.

use super::{io_error, AddressInfo, Completion, UdEndpoint};
use crate::Result;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Largest datagram we expect: one full-size MAD.
const MAX_DATAGRAM: usize = 2048;

pub struct UdpEndpoint {
    socket: UdpSocket,
    peer: SocketAddr,
    address: AddressInfo,
    /// Receive credit tracking; a UDP socket has no real receive queue to
    /// post into, but the engine's accounting is preserved.
    posted: AtomicUsize,
}

impl UdpEndpoint {
    /// Bind a local endpoint and aim it at the administration service.
    pub fn new(bind: SocketAddr, peer: SocketAddr, address: AddressInfo) -> Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
            .map_err(|e| io_error("socket create", e))?;
        socket
            .set_reuse_address(true)
            .map_err(|e| io_error("set reuse", e))?;
        socket
            .bind(&bind.into())
            .map_err(|e| io_error("bind", e))?;
        let socket: UdpSocket = socket.into();
        log::debug!("[UDP] endpoint bind addr={} peer={}", bind, peer);
        Ok(Self {
            socket,
            peer,
            address,
            posted: AtomicUsize::new(0),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(|e| io_error("local addr", e))
    }
}

impl UdEndpoint for UdpEndpoint {
    fn send(&self, bytes: &[u8]) -> Result<()> {
        self.socket
            .send_to(bytes, self.peer)
            .map_err(|e| io_error("send_to", e))?;
        Ok(())
    }

    fn post_receives(&self, n: usize) -> Result<()> {
        self.posted.fetch_add(n, Ordering::Relaxed);
        Ok(())
    }

    fn poll(&self, timeout: Duration) -> Result<Vec<Completion>> {
        self.socket
            .set_read_timeout(Some(timeout.max(Duration::from_millis(1))))
            .map_err(|e| io_error("set timeout", e))?;

        let mut completions = Vec::new();
        let mut buf = [0u8; MAX_DATAGRAM];

        // Block for the first datagram, then drain whatever else is queued.
        match self.socket.recv_from(&mut buf) {
            Ok((n, _from)) => {
                self.posted.fetch_sub(1, Ordering::Relaxed);
                completions.push(Completion::Received(buf[..n].to_vec()));
            }
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                return Ok(completions);
            }
            Err(e) => return Err(io_error("recv_from", e)),
        }

        self.socket
            .set_read_timeout(Some(Duration::from_millis(1)))
            .map_err(|e| io_error("set timeout", e))?;
        while let Ok((n, _from)) = self.socket.recv_from(&mut buf) {
            self.posted.fetch_sub(1, Ordering::Relaxed);
            completions.push(Completion::Received(buf[..n].to_vec()));
        }
        Ok(completions)
    }

    fn address_info(&self) -> AddressInfo {
        self.address
    }
}
