// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! # fabmgt - Fabric Management Protocol Client
//!
//! A client-side engine for the administration services of a
//! high-performance interconnect fabric: synchronous record queries against
//! the Subnet Administration (SA) and Performance Administration (PA)
//! services, and asynchronous trap subscriptions over an
//! unreliable-datagram endpoint.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fabmgt::{Config, MadTransport, PortContext, Query, RecordType, SaClient, Selector};
//! use std::sync::Arc;
//!
//! fn run(transport: Arc<impl MadTransport>) -> fabmgt::Result<()> {
//!     let port = Arc::new(PortContext::new(Config::default()));
//!     let client = SaClient::new(transport, port);
//!
//!     // Who is LID 3?
//!     let result = client.query(&Query::new(Selector::Lid(3), RecordType::NodeRecord))?;
//!     for record in &result.records {
//!         println!("{:?}", record);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------------+
//! |                        Application Layer                           |
//! |        query() / subscribe() / unsubscribe() / PA wrappers         |
//! +--------------------------------------------------------------------+
//! |  Query Marshaller (sa)         |  Trap Subscription Engine (notice)|
//! |  reachability gate, builders,  |  registration + pending maps,     |
//! |  response decode, PA client    |  retry sweep, event channel       |
//! +--------------------------------------------------------------------+
//! |                       Wire Codec (wire)                            |
//! |   MAD/class headers | component masks | ~40 record layouts (BE)    |
//! +--------------------------------------------------------------------+
//! |                  Transport Capability (transport)                  |
//! |   send_recv (queries) | UD send/post/poll (subscriptions)          |
//! +--------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PortContext`] | Shared state of one management connection |
//! | [`SaClient`] | Synchronous SA queries with fail-fast reachability |
//! | [`PaClient`] | PA sub-client (sweep images, port counters) |
//! | [`NoticeEngine`] | Async trap registration and event delivery |
//! | [`Query`] | A match selector paired with a record type |

/// Client configuration (timeouts, retries, channel sizing).
pub mod config;
/// Trap subscription engine (registrations, retry sweep, events).
pub mod notice;
/// Port context (shared state, locking, transaction ids).
pub mod port;
/// Query marshaller/dispatcher for the SA and PA services.
pub mod sa;
/// Transport capability traits and the UDP realization.
pub mod transport;
/// Big-endian MAD/SA wire codec.
pub mod wire;

pub use config::Config;
pub use notice::{NoticeEngine, NoticeEvent};
pub use port::{PortContext, ServiceState};
pub use sa::{
    CallStatus, ImageId, ImageInfo, PaClient, PortCounters, Query, QueryResult, RecordType,
    SaClient, Selector, WireRecord,
};
pub use transport::{AddressInfo, Completion, MadTransport, UdEndpoint, UdpEndpoint};
pub use wire::records::Notice;

/// Errors surfaced by queries and subscriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Unsupported selector/record-type combination or bad argument;
    /// rejected before any wire traffic.
    InvalidParameter,
    /// The required management partition key is not present locally.
    Protection,
    /// Send/receive/allocation failure at the transport layer.
    Transport,
    /// Malformed or truncated response.
    InvalidProtocol,
    /// The remote service answered with a non-success status code.
    RemoteStatus(u16),
    /// Zero records matched.
    NotFound,
    /// No response within the timeout x retries budget.
    Timeout,
    /// Result buffer allocation failed.
    OutOfMemory,
    /// The port-context lock could not be acquired within its budget.
    LockTimeout,
    /// Operation not valid in the current connection state.
    InvalidState,
    /// The administration service is unreachable (cached Down state).
    Unavailable,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidParameter => write!(f, "unsupported query parameter combination"),
            Error::Protection => write!(f, "management partition key not available"),
            Error::Transport => write!(f, "transport failure"),
            Error::InvalidProtocol => write!(f, "malformed response"),
            Error::RemoteStatus(status) => {
                write!(f, "remote service status {:#06x}", status)
            }
            Error::NotFound => write!(f, "no records matched"),
            Error::Timeout => write!(f, "request timed out"),
            Error::OutOfMemory => write!(f, "result allocation failed"),
            Error::LockTimeout => write!(f, "port lock acquisition timed out"),
            Error::InvalidState => write!(f, "invalid connection state"),
            Error::Unavailable => write!(f, "administration service unreachable"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::InvalidParameter.to_string(),
            "unsupported query parameter combination"
        );
        assert_eq!(
            Error::RemoteStatus(0x0300).to_string(),
            "remote service status 0x0300"
        );
        assert_eq!(Error::Timeout.to_string(), "request timed out");
        assert_eq!(
            Error::LockTimeout.to_string(),
            "port lock acquisition timed out"
        );
    }
}
