// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Client configuration: timeouts, retry budgets, channel sizing.
//!
//! Defaults match the deployed administration stack; environment variables
//! override them for field diagnosis without a rebuild.

use std::time::Duration;

/// Default synchronous query timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 20_000;
/// Default synchronous query retry count.
pub const DEFAULT_RETRY_COUNT: u32 = 3;
/// Short timeout for the reachability probe (class port info).
pub const PROBE_TIMEOUT_MS: u64 = 250;
/// Interval between subscription retry sweeps.
pub const NOTICE_RETRY_INTERVAL_MS: u64 = 1_000;
/// Subscription send attempts before a registration is timed out.
pub const NOTICE_RETRY_COUNT: u32 = 15;
/// Bounded application event channel capacity.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;
/// Datagram receive buffers kept posted.
pub const RECV_BUFFER_COUNT: usize = 32;
/// Budget for acquiring the port-context lock.
pub const LOCK_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Timeout for one synchronous query attempt.
    pub timeout: Duration,
    /// Retries for a synchronous query.
    pub retry_count: u32,
    /// Timeout for the lightweight reachability probe.
    pub probe_timeout: Duration,
    /// Interval of the subscription retry sweep.
    pub notice_retry_interval: Duration,
    /// Send attempts per subscription message.
    pub notice_retry_count: u32,
    /// Capacity of the application-facing event channel.
    pub event_channel_capacity: usize,
    /// Receive buffers kept posted on the datagram endpoint.
    pub recv_buffer_count: usize,
    /// Bounded wait for the port-context lock.
    pub lock_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(env_ms("FABMGT_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)),
            retry_count: env_u32("FABMGT_RETRY_COUNT", DEFAULT_RETRY_COUNT),
            probe_timeout: Duration::from_millis(PROBE_TIMEOUT_MS),
            notice_retry_interval: Duration::from_millis(NOTICE_RETRY_INTERVAL_MS),
            notice_retry_count: NOTICE_RETRY_COUNT,
            event_channel_capacity: EVENT_CHANNEL_CAPACITY,
            recv_buffer_count: RECV_BUFFER_COUNT,
            lock_timeout: Duration::from_millis(LOCK_TIMEOUT_MS),
        }
    }
}

impl Config {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_count(mut self, retries: u32) -> Self {
        self.retry_count = retries;
        self
    }

    pub fn with_notice_retries(mut self, count: u32, interval: Duration) -> Self {
        self.notice_retry_count = count;
        self.notice_retry_interval = interval;
        self
    }
}

fn env_ms(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
