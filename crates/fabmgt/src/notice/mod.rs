// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Trap subscription engine.
//!
//! Subscriptions are asynchronous: `subscribe` and `unsubscribe` return
//! immediately, and confirmations, timeouts and trap reports arrive on the
//! engine's event channel. Loss is handled by a timer-driven retry sweep
//! over the pending-message set.

pub mod engine;
pub mod registry;

pub use engine::NoticeEngine;
pub use registry::{PendingMad, RegState, Registration};

use crate::wire::records::Notice;

/// Events delivered to the application on the bounded channel.
#[derive(Debug, Clone, PartialEq)]
pub enum NoticeEvent {
    /// The service confirmed a trap registration.
    Registered(u16),
    /// The service confirmed an unregistration.
    Unregistered(u16),
    /// A registration exhausted its retries without confirmation.
    RegistrationTimeout(u16),
    /// An inbound trap report (already acknowledged on the wire).
    Trap(Notice),
}
