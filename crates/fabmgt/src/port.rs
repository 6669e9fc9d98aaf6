// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Port context: the shared state of one management connection.
//!
//! One mutex guards the registration set, the pending-message set and the
//! cached service states; the transaction-id counter is per port so
//! multiple connections never share mutable state. Lock acquisition is
//! bounded and surfaces an error instead of hanging.

use crate::config::Config;
use crate::notice::registry::NoticeRegistry;
use crate::{Error, Result};
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};

/// Cached reachability of an administration service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceState {
    #[default]
    Unknown,
    Operational,
    Down,
}

/// State guarded by the port lock.
#[derive(Debug, Default)]
pub struct PortState {
    pub sa_state: ServiceState,
    pub pa_state: ServiceState,
    pub registry: NoticeRegistry,
}

pub struct PortContext {
    pub config: Config,
    state: Mutex<PortState>,
    next_tid: AtomicU64,
}

impl PortContext {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: Mutex::new(PortState::default()),
            next_tid: AtomicU64::new(1),
        }
    }

    /// Acquire the port lock within the configured budget.
    pub fn lock(&self) -> Result<MutexGuard<'_, PortState>> {
        self.state.try_lock_for(self.config.lock_timeout).ok_or_else(|| {
            log::error!("[PORT] failed to acquire port lock within budget");
            Error::LockTimeout
        })
    }

    /// Allocate the next transaction id. Never returns zero.
    pub fn next_tid(&self) -> u64 {
        loop {
            let tid = self.next_tid.fetch_add(1, Ordering::Relaxed);
            if tid != 0 {
                return tid;
            }
        }
    }

    pub fn sa_state(&self) -> Result<ServiceState> {
        Ok(self.lock()?.sa_state)
    }

    pub fn pa_state(&self) -> Result<ServiceState> {
        Ok(self.lock()?.pa_state)
    }

    /// Mark both administration services down (SA down implies PA down).
    pub fn mark_services_down(&self) -> Result<()> {
        let mut state = self.lock()?;
        state.sa_state = ServiceState::Down;
        state.pa_state = ServiceState::Down;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_tid_counter_is_per_port() {
        let a = PortContext::new(Config::default());
        let b = PortContext::new(Config::default());
        assert_eq!(a.next_tid(), 1);
        assert_eq!(a.next_tid(), 2);
        // A second port starts its own sequence.
        assert_eq!(b.next_tid(), 1);
    }

    #[test]
    fn test_service_state_transitions() {
        let port = PortContext::new(Config::default());
        assert_eq!(port.sa_state().expect("Lock should succeed"), ServiceState::Unknown);
        port.mark_services_down().expect("Lock should succeed");
        assert_eq!(port.sa_state().expect("Lock should succeed"), ServiceState::Down);
        assert_eq!(port.pa_state().expect("Lock should succeed"), ServiceState::Down);

        port.lock().expect("Lock should succeed").sa_state = ServiceState::Operational;
        assert_eq!(
            port.sa_state().expect("Lock should succeed"),
            ServiceState::Operational
        );
    }

    #[test]
    fn test_lock_timeout_surfaces_error() {
        let mut config = Config::default();
        config.lock_timeout = Duration::from_millis(50);
        let port = std::sync::Arc::new(PortContext::new(config));

        let held = port.lock().expect("Lock should succeed");
        let contender = std::sync::Arc::clone(&port);
        let result = std::thread::spawn(move || contender.lock().map(|_| ()))
            .join()
            .expect("Thread should finish");
        drop(held);

        match result {
            Err(Error::LockTimeout) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }
}
