// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! The subscription engine proper.
//!
//! One poller context drives `poll` on the datagram endpoint and feeds
//! completions back into the engine; callers invoke `subscribe` and
//! `unsubscribe` from any thread. The port lock covers only the in-memory
//! maps; no send happens while it is held.

use super::registry::{PendingMad, RegState, Registration};
use super::NoticeEvent;
use crate::port::PortContext;
use crate::transport::{Completion, UdEndpoint};
use crate::wire::cursor::{Cursor, CursorMut};
use crate::wire::mad::{method, MadHeader, SaHeader, SA_HEADER_SIZE};
use crate::wire::records::inform::InformInfo;
use crate::wire::records::{attr, Notice, SaRecord};
use crate::{Error, Result};
use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

pub struct NoticeEngine<E: UdEndpoint> {
    endpoint: Arc<E>,
    port: Arc<PortContext>,
    events_tx: Sender<NoticeEvent>,
    events_rx: Receiver<NoticeEvent>,
    /// Confirmations that matched no pending transaction id.
    unmatched_responses: AtomicU64,
}

impl<E: UdEndpoint> NoticeEngine<E> {
    pub fn new(endpoint: Arc<E>, port: Arc<PortContext>) -> Result<Self> {
        let capacity = port.config.event_channel_capacity;
        let (events_tx, events_rx) = bounded(capacity);
        endpoint.post_receives(port.config.recv_buffer_count)?;
        Ok(Self {
            endpoint,
            port,
            events_tx,
            events_rx,
            unmatched_responses: AtomicU64::new(0),
        })
    }

    /// The application-facing event channel.
    pub fn events(&self) -> Receiver<NoticeEvent> {
        self.events_rx.clone()
    }

    /// Confirmations seen with no matching pending message.
    pub fn unmatched_responses(&self) -> u64 {
        self.unmatched_responses.load(Ordering::Relaxed)
    }

    /// Register interest in a trap number. Non-blocking: the outcome
    /// arrives later as `Registered` or `RegistrationTimeout`.
    pub fn subscribe(&self, trap_number: u16) -> Result<()> {
        let wire = {
            let mut state = self.port.lock()?;
            if let Some(reg) = state.registry.registration(trap_number) {
                // Re-registration is only meaningful for an active entry
                // (reconnect); a pending one is already on its way.
                if reg.state != RegState::Active {
                    return Ok(());
                }
            }

            let tid = self.next_tid32();
            let wire = build_inform_mad(InformInfo::for_trap(trap_number, true), tid)?;
            state.registry.insert_registration(Registration {
                trap_number,
                state: RegState::PendingRegister,
                pending_tid: Some(tid),
            });
            state.registry.insert_pending(PendingMad {
                tid,
                wire: wire.clone(),
                retries_remaining: self.port.config.notice_retry_count,
                owner: Some(trap_number),
            });
            wire
        };

        log::debug!("[NOTICE] registering for trap {:#x}", trap_number);
        self.endpoint.send(&wire)
    }

    /// Cancel a registration.
    ///
    /// While the register message is still unconfirmed this cancels it
    /// outright (no wire traffic, no later timeout). Otherwise an
    /// unregister message is sent, tracked without an owner: the caller's
    /// registration is gone the moment this returns.
    pub fn unsubscribe(&self, trap_number: u16) -> Result<()> {
        let wire = {
            let mut state = self.port.lock()?;
            let reg = state
                .registry
                .remove_registration(trap_number)
                .ok_or(Error::NotFound)?;

            if reg.state == RegState::PendingRegister {
                if let Some(tid) = reg.pending_tid {
                    state.registry.remove_pending(tid);
                }
                log::debug!(
                    "[NOTICE] cancelled unconfirmed registration for trap {:#x}",
                    trap_number
                );
                return Ok(());
            }

            // Registrations this message once belonged to must not be
            // notified again.
            state.registry.orphan_pending_of(trap_number);

            let tid = self.next_tid32();
            let mut info = InformInfo::for_trap(trap_number, false);
            info.qpn = self.endpoint.address_info().local_qpn;
            let wire = build_inform_mad(info, tid)?;
            state.registry.insert_pending(PendingMad {
                tid,
                wire: wire.clone(),
                retries_remaining: self.port.config.notice_retry_count,
                owner: None,
            });
            wire
        };

        log::debug!("[NOTICE] unregistering trap {:#x}", trap_number);
        self.endpoint.send(&wire)
    }

    /// Tear down all subscription state (port close).
    ///
    /// Every remaining registration is unregistered on the wire where a
    /// round trip is still owed; whatever stays pending afterwards is
    /// dropped without waiting for responses.
    pub fn shutdown(&self) -> Result<()> {
        let traps = self.port.lock()?.registry.all_traps();
        for trap in traps {
            if let Err(err) = self.unsubscribe(trap) {
                log::debug!("[NOTICE] shutdown unsubscribe of trap {:#x}: {}", trap, err);
            }
        }
        self.port.lock()?.registry.clear_pending();
        Ok(())
    }

    /// Resubmit every active registration (transport re-establishment).
    pub fn reregister_all(&self) -> Result<()> {
        let traps = self.port.lock()?.registry.active_traps();
        for trap in traps {
            if let Err(err) = self.subscribe(trap) {
                log::error!(
                    "[NOTICE] failed to re-register trap {:#x}: {}",
                    trap,
                    err
                );
            }
        }
        Ok(())
    }

    /// Drain completions once, waiting up to `timeout` for the first.
    pub fn poll_once(&self, timeout: Duration) -> Result<()> {
        let completions = self.endpoint.poll(timeout)?;
        for completion in completions {
            match completion {
                Completion::SendDone { ok } => {
                    if !ok {
                        log::warn!("[NOTICE] send completion reported failure");
                    }
                }
                Completion::Received(bytes) => self.handle_datagram(&bytes)?,
            }
        }
        // Keep the receive queue topped up.
        self.endpoint.post_receives(1)?;
        Ok(())
    }

    /// One pass of the retry sweep: resend what still has retries, time
    /// out what does not.
    pub fn retry_sweep(&self) -> Result<()> {
        let mut resends = Vec::new();
        {
            let mut state = self.port.lock()?;
            for tid in state.registry.pending_tids() {
                let Some(mad) = state.registry.remove_pending(tid) else {
                    continue;
                };
                if mad.retries_remaining > 1 {
                    // Re-key under a fresh transaction id and resend once
                    // the lock is released.
                    let new_tid = self.next_tid32();
                    let mut wire = mad.wire;
                    rewrite_tid(&mut wire, new_tid);
                    resends.push(wire.clone());
                    if let Some(trap) = mad.owner {
                        if let Some(reg) = state.registry.registration_mut(trap) {
                            if reg.pending_tid == Some(tid) {
                                reg.pending_tid = Some(new_tid);
                            }
                        }
                    }
                    state.registry.insert_pending(PendingMad {
                        tid: new_tid,
                        wire,
                        retries_remaining: mad.retries_remaining - 1,
                        owner: mad.owner,
                    });
                } else if let Some(trap) = mad.owner {
                    log::warn!(
                        "[NOTICE] registration for trap {:#x} timed out after retries",
                        trap
                    );
                    state.registry.remove_registration(trap);
                    self.emit(NoticeEvent::RegistrationTimeout(trap));
                } else {
                    log::debug!("[NOTICE] ownerless pending message timed out");
                }
            }
        }

        for wire in resends {
            self.endpoint.send(&wire)?;
        }
        Ok(())
    }

    /// Poll-and-sweep loop until `running` goes false.
    pub fn run(&self, running: &AtomicBool) {
        let sweep_interval = self.port.config.notice_retry_interval;
        let mut last_sweep = Instant::now();
        while running.load(Ordering::Relaxed) {
            let budget = sweep_interval
                .checked_sub(last_sweep.elapsed())
                .unwrap_or(Duration::from_millis(1));
            if let Err(err) = self.poll_once(budget) {
                log::warn!("[NOTICE] poll failed: {}", err);
            }
            if last_sweep.elapsed() >= sweep_interval {
                if let Err(err) = self.retry_sweep() {
                    log::warn!("[NOTICE] retry sweep failed: {}", err);
                }
                last_sweep = Instant::now();
            }
        }
    }

    fn handle_datagram(&self, bytes: &[u8]) -> Result<()> {
        if bytes.len() < SA_HEADER_SIZE {
            log::debug!("[NOTICE] runt datagram ({} bytes) dropped", bytes.len());
            return Ok(());
        }
        let mut c = Cursor::new(bytes);
        let header = MadHeader::decode(&mut c).map_err(Error::from)?;
        let _sa_header = SaHeader::decode(&mut c).map_err(Error::from)?;
        match header.method {
            method::GET_RESP => self.handle_confirmation(&header, &bytes[SA_HEADER_SIZE..]),
            method::REPORT => self.handle_report(&header, &bytes[SA_HEADER_SIZE..]),
            other => {
                log::warn!("[NOTICE] unknown datagram method {:#04x}", other);
                Ok(())
            }
        }
    }

    /// A confirmation for a register/unregister message we sent.
    fn handle_confirmation(&self, header: &MadHeader, payload: &[u8]) -> Result<()> {
        if payload.len() < InformInfo::WIRE_SIZE {
            log::debug!("[NOTICE] truncated confirmation dropped");
            return Ok(());
        }
        let info = InformInfo::decode(&mut Cursor::new(payload)).map_err(Error::from)?;
        let tid = (header.tid & 0xFFFF_FFFF) as u32;

        let mut state = self.port.lock()?;
        match state.registry.remove_pending(tid) {
            Some(mad) => {
                if info.subscribe {
                    // Only act if the registration still exists; it may
                    // have been cancelled while the response was in flight.
                    if let Some(trap) = mad.owner {
                        if let Some(reg) = state.registry.registration_mut(trap) {
                            reg.state = RegState::Active;
                            reg.pending_tid = None;
                            log::debug!(
                                "[NOTICE] registration complete for trap {:#x}",
                                trap
                            );
                            self.emit(NoticeEvent::Registered(trap));
                        }
                    }
                } else {
                    log::debug!(
                        "[NOTICE] unregistration complete for trap {:#x}",
                        info.trap_number
                    );
                    self.emit(NoticeEvent::Unregistered(info.trap_number));
                }
            }
            None => {
                self.unmatched_responses.fetch_add(1, Ordering::Relaxed);
                log::debug!(
                    "[NOTICE] confirmation with unknown tid {:#x} (trap {:#x}) discarded",
                    tid,
                    info.trap_number
                );
            }
        }
        Ok(())
    }

    /// An inbound trap report: acknowledge on the wire, then hand the
    /// notice to the application without blocking this path.
    fn handle_report(&self, header: &MadHeader, payload: &[u8]) -> Result<()> {
        if payload.len() < Notice::WIRE_SIZE {
            log::debug!("[NOTICE] truncated report dropped");
            return Ok(());
        }
        let notice = Notice::from_wire(payload).map_err(Error::from)?;

        let ack = build_report_ack(header.tid)?;
        self.endpoint.send(&ack)?;

        log::debug!(
            "[NOTICE] trap {:#x} report from lid {:#x}",
            notice.trap_number,
            notice.issuer_lid
        );
        self.emit(NoticeEvent::Trap(notice));
        Ok(())
    }

    /// Non-blocking event delivery; a slow consumer loses events rather
    /// than stalling the completion path.
    fn emit(&self, event: NoticeEvent) {
        match self.events_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                log::warn!("[NOTICE] event channel full, dropping {:?}", event);
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    /// Subscription tids are matched on their low 32 bits.
    fn next_tid32(&self) -> u32 {
        loop {
            let tid = (self.port.next_tid() & 0xFFFF_FFFF) as u32;
            if tid != 0 {
                return tid;
            }
        }
    }
}

/// A poller thread wrapping an engine.
pub struct NoticePoller {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl NoticePoller {
    pub fn spawn<E: UdEndpoint + 'static>(engine: Arc<NoticeEngine<E>>) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let thread_flag = Arc::clone(&running);
        let handle = std::thread::Builder::new()
            .name("fabmgt-notice".into())
            .spawn(move || engine.run(&thread_flag))
            .expect("spawning the notice poller thread");
        Self {
            running,
            handle: Some(handle),
        }
    }

    pub fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for NoticePoller {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Build an InformInfo Set MAD.
fn build_inform_mad(info: InformInfo, tid: u32) -> Result<Vec<u8>> {
    let header = MadHeader::sa_request(method::SET, attr::INFORM_INFO, u64::from(tid));
    let mut payload = vec![0u8; InformInfo::WIRE_SIZE];
    info.encode(&mut CursorMut::new(&mut payload))
        .map_err(Error::from)?;
    crate::sa::build::assemble(&header, &SaHeader::default(), &payload).map_err(Error::from)
}

/// Build the ReportResp acknowledging an inbound report, echoing its tid.
fn build_report_ack(tid: u64) -> Result<Vec<u8>> {
    let header = MadHeader::sa_request(method::REPORT_RESP, attr::NOTICE, tid);
    let ack = Notice::empty_ack();
    crate::sa::build::assemble(
        &header,
        &SaHeader::default(),
        &ack.to_wire().map_err(Error::from)?,
    )
    .map_err(Error::from)
}

/// Patch a fresh transaction id into an already-built MAD.
fn rewrite_tid(wire: &mut [u8], tid: u32) {
    wire[8..16].copy_from_slice(&u64::from(tid).to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::transport::AddressInfo;
    use parking_lot::Mutex;

    /// Endpoint double: records sends, serves scripted completions.
    struct MockEndpoint {
        sent: Mutex<Vec<Vec<u8>>>,
        inbound: Mutex<Vec<Completion>>,
        drop_sends: bool,
    }

    impl MockEndpoint {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                inbound: Mutex::new(Vec::new()),
                drop_sends: false,
            }
        }

        fn dropping() -> Self {
            Self {
                drop_sends: true,
                ..Self::new()
            }
        }

        fn sent_count(&self) -> usize {
            self.sent.lock().len()
        }

        fn sent(&self, idx: usize) -> Vec<u8> {
            self.sent.lock()[idx].clone()
        }

        fn queue_inbound(&self, bytes: Vec<u8>) {
            self.inbound.lock().push(Completion::Received(bytes));
        }
    }

    impl UdEndpoint for MockEndpoint {
        fn send(&self, bytes: &[u8]) -> Result<()> {
            self.sent.lock().push(bytes.to_vec());
            // Datagrams silently vanish in dropping mode; the send itself
            // still "succeeds", as on a real unreliable endpoint.
            let _ = self.drop_sends;
            Ok(())
        }

        fn post_receives(&self, _n: usize) -> Result<()> {
            Ok(())
        }

        fn poll(&self, _timeout: Duration) -> Result<Vec<Completion>> {
            Ok(self.inbound.lock().drain(..).collect())
        }

        fn address_info(&self) -> AddressInfo {
            AddressInfo {
                local_qpn: 0x2A,
                ..AddressInfo::default()
            }
        }
    }

    fn engine_with(
        endpoint: MockEndpoint,
    ) -> (Arc<NoticeEngine<MockEndpoint>>, Arc<MockEndpoint>) {
        let endpoint = Arc::new(endpoint);
        let port = Arc::new(PortContext::new(
            Config::default().with_notice_retries(3, Duration::from_millis(1)),
        ));
        let engine = Arc::new(
            NoticeEngine::new(Arc::clone(&endpoint), port).expect("Engine should build"),
        );
        (engine, endpoint)
    }

    fn sent_tid(wire: &[u8]) -> u64 {
        let mut c = Cursor::new(wire);
        MadHeader::decode(&mut c).expect("Header should decode").tid
    }

    fn sent_inform(wire: &[u8]) -> InformInfo {
        InformInfo::decode(&mut Cursor::new(&wire[SA_HEADER_SIZE..]))
            .expect("Payload should decode")
    }

    /// Confirmation for a register/unregister as the service would send.
    fn confirmation(tid: u64, trap: u16, subscribe: bool) -> Vec<u8> {
        let header = MadHeader {
            method: method::GET_RESP,
            ..MadHeader::sa_request(method::SET, attr::INFORM_INFO, tid)
        };
        let info = InformInfo::for_trap(trap, subscribe);
        let mut payload = vec![0u8; InformInfo::WIRE_SIZE];
        info.encode(&mut CursorMut::new(&mut payload))
            .expect("Encode should succeed");
        crate::sa::build::assemble(&header, &SaHeader::default(), &payload)
            .expect("Assemble should succeed")
    }

    fn report(tid: u64, trap: u16) -> Vec<u8> {
        let header = MadHeader {
            method: method::REPORT,
            ..MadHeader::sa_request(method::REPORT, attr::NOTICE, tid)
        };
        let notice = Notice {
            trap_number: trap,
            issuer_lid: 1,
            ..Notice::default()
        };
        crate::sa::build::assemble(
            &header,
            &SaHeader::default(),
            &notice.to_wire().expect("Encode should succeed"),
        )
        .expect("Assemble should succeed")
    }

    #[test]
    fn test_subscribe_sends_inform_and_goes_active_on_confirm() {
        let (engine, endpoint) = engine_with(MockEndpoint::new());
        let events = engine.events();

        engine.subscribe(0x40).expect("Subscribe should succeed");
        assert_eq!(endpoint.sent_count(), 1);
        let wire = endpoint.sent(0);
        let info = sent_inform(&wire);
        assert!(info.subscribe);
        assert_eq!(info.trap_number, 0x40);
        assert_eq!(info.resp_time_value, 19);

        // Simulated matching confirmation flips the registration active,
        // exactly once.
        endpoint.queue_inbound(confirmation(sent_tid(&wire), 0x40, true));
        engine
            .poll_once(Duration::from_millis(1))
            .expect("Poll should succeed");

        assert_eq!(events.try_recv(), Ok(NoticeEvent::Registered(0x40)));
        assert!(events.try_recv().is_err());

        let port = {
            let state = engine.port.lock().expect("Lock should succeed");
            (
                state.registry.registration(0x40).map(|r| r.state),
                state.registry.pending_count(),
            )
        };
        assert_eq!(port.0, Some(RegState::Active));
        assert_eq!(port.1, 0);
    }

    #[test]
    fn test_unsubscribe_active_sends_one_unregister_without_owner() {
        let (engine, endpoint) = engine_with(MockEndpoint::new());
        let events = engine.events();

        engine.subscribe(0x40).expect("Subscribe should succeed");
        let reg_wire = endpoint.sent(0);
        endpoint.queue_inbound(confirmation(sent_tid(&reg_wire), 0x40, true));
        engine
            .poll_once(Duration::from_millis(1))
            .expect("Poll should succeed");
        let _ = events.try_recv();

        engine.unsubscribe(0x40).expect("Unsubscribe should succeed");
        assert_eq!(endpoint.sent_count(), 2);
        let unreg_wire = endpoint.sent(1);
        let info = sent_inform(&unreg_wire);
        assert!(!info.subscribe);
        assert_eq!(info.trap_number, 0x40);
        assert_eq!(info.qpn, 0x2A);

        {
            let state = engine.port.lock().expect("Lock should succeed");
            assert!(state.registry.registration(0x40).is_none());
            // The unregister message is pending but ownerless.
            assert_eq!(state.registry.pending_count(), 1);
            let tid = (sent_tid(&unreg_wire) & 0xFFFF_FFFF) as u32;
            assert_eq!(state.registry.pending(tid).map(|m| m.owner), Some(None));
        }

        // Its confirmation removes the pending entry and reports the
        // unregistration.
        endpoint.queue_inbound(confirmation(sent_tid(&unreg_wire), 0x40, false));
        engine
            .poll_once(Duration::from_millis(1))
            .expect("Poll should succeed");
        assert_eq!(events.try_recv(), Ok(NoticeEvent::Unregistered(0x40)));
        let state = engine.port.lock().expect("Lock should succeed");
        assert_eq!(state.registry.pending_count(), 0);
    }

    #[test]
    fn test_cancel_before_confirm_is_silent_and_local() {
        let (engine, endpoint) = engine_with(MockEndpoint::new());
        let events = engine.events();

        engine.subscribe(0x41).expect("Subscribe should succeed");
        assert_eq!(endpoint.sent_count(), 1);

        engine.unsubscribe(0x41).expect("Unsubscribe should succeed");
        // No unregister went out.
        assert_eq!(endpoint.sent_count(), 1);
        {
            let state = engine.port.lock().expect("Lock should succeed");
            assert!(state.registry.registration(0x41).is_none());
            assert_eq!(state.registry.pending_count(), 0);
        }

        // Sweeps after the cancel produce no timeout event for the trap.
        for _ in 0..5 {
            engine.retry_sweep().expect("Sweep should succeed");
        }
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_retry_exhaustion_delivers_exactly_one_timeout() {
        let (engine, endpoint) = engine_with(MockEndpoint::dropping());
        let events = engine.events();

        engine.subscribe(0x40).expect("Subscribe should succeed");
        assert_eq!(endpoint.sent_count(), 1);

        // retries = 3: two sweeps resend, the third times out.
        engine.retry_sweep().expect("Sweep should succeed");
        engine.retry_sweep().expect("Sweep should succeed");
        assert_eq!(endpoint.sent_count(), 3);
        engine.retry_sweep().expect("Sweep should succeed");
        assert_eq!(endpoint.sent_count(), 3);

        assert_eq!(events.try_recv(), Ok(NoticeEvent::RegistrationTimeout(0x40)));
        assert!(events.try_recv().is_err());

        let state = engine.port.lock().expect("Lock should succeed");
        assert!(state.registry.registration(0x40).is_none());
        assert_eq!(state.registry.pending_count(), 0);
    }

    #[test]
    fn test_resend_rekeys_pending_by_fresh_tid() {
        let (engine, endpoint) = engine_with(MockEndpoint::dropping());
        engine.subscribe(0x40).expect("Subscribe should succeed");
        let first_tid = sent_tid(&endpoint.sent(0));

        engine.retry_sweep().expect("Sweep should succeed");
        let second_tid = sent_tid(&endpoint.sent(1));
        assert_ne!(first_tid, second_tid);

        let state = engine.port.lock().expect("Lock should succeed");
        assert!(state
            .registry
            .pending((first_tid & 0xFFFF_FFFF) as u32)
            .is_none());
        let entry = state
            .registry
            .pending((second_tid & 0xFFFF_FFFF) as u32)
            .expect("Pending entry should be re-keyed");
        assert_eq!(entry.owner, Some(0x40));
        assert_eq!(entry.retries_remaining, 2);
    }

    #[test]
    fn test_inbound_report_is_acked_and_delivered() {
        let (engine, endpoint) = engine_with(MockEndpoint::new());
        let events = engine.events();

        endpoint.queue_inbound(report(0x99, 0x80));
        engine
            .poll_once(Duration::from_millis(1))
            .expect("Poll should succeed");

        // The acknowledgement echoes the inbound tid and carries an empty
        // notice.
        assert_eq!(endpoint.sent_count(), 1);
        let ack = endpoint.sent(0);
        let mut c = Cursor::new(&ack);
        let header = MadHeader::decode(&mut c).expect("Header should decode");
        assert_eq!(header.method, method::REPORT_RESP);
        assert_eq!(header.attr_id, attr::NOTICE);
        assert_eq!(header.tid, 0x99);

        match events.try_recv() {
            Ok(NoticeEvent::Trap(notice)) => {
                assert_eq!(notice.trap_number, 0x80);
                assert_eq!(notice.issuer_lid, 1);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_unmatched_confirmation_counted_not_fatal() {
        let (engine, endpoint) = engine_with(MockEndpoint::new());
        endpoint.queue_inbound(confirmation(0xDEAD, 0x40, true));
        engine
            .poll_once(Duration::from_millis(1))
            .expect("Poll should succeed");
        assert_eq!(engine.unmatched_responses(), 1);
        assert!(engine.events().try_recv().is_err());
    }

    #[test]
    fn test_late_confirmation_after_cancel_is_dropped() {
        let (engine, endpoint) = engine_with(MockEndpoint::new());
        let events = engine.events();

        engine.subscribe(0x40).expect("Subscribe should succeed");
        let tid = sent_tid(&endpoint.sent(0));
        engine.unsubscribe(0x40).expect("Unsubscribe should succeed");

        // The register confirmation arrives after the cancel removed the
        // pending entry: counted as unmatched, no event, no state change.
        endpoint.queue_inbound(confirmation(tid, 0x40, true));
        engine
            .poll_once(Duration::from_millis(1))
            .expect("Poll should succeed");
        assert_eq!(engine.unmatched_responses(), 1);
        assert!(events.try_recv().is_err());
        let state = engine.port.lock().expect("Lock should succeed");
        assert!(state.registry.registration(0x40).is_none());
    }

    #[test]
    fn test_reregister_all_resubmits_active_traps() {
        let (engine, endpoint) = engine_with(MockEndpoint::new());

        for trap in [0x40u16, 0x41] {
            engine.subscribe(trap).expect("Subscribe should succeed");
        }
        endpoint.queue_inbound(confirmation(sent_tid(&endpoint.sent(0)), 0x40, true));
        endpoint.queue_inbound(confirmation(sent_tid(&endpoint.sent(1)), 0x41, true));
        engine
            .poll_once(Duration::from_millis(1))
            .expect("Poll should succeed");

        engine.reregister_all().expect("Reregister should succeed");
        // Two fresh register messages on top of the two originals.
        assert_eq!(endpoint.sent_count(), 4);
        for idx in [2usize, 3] {
            let info = sent_inform(&endpoint.sent(idx));
            assert!(info.subscribe);
        }
        let state = engine.port.lock().expect("Lock should succeed");
        assert_eq!(state.registry.pending_count(), 2);
    }

    #[test]
    fn test_shutdown_unregisters_and_drains() {
        let (engine, endpoint) = engine_with(MockEndpoint::new());

        engine.subscribe(0x40).expect("Subscribe should succeed");
        endpoint.queue_inbound(confirmation(sent_tid(&endpoint.sent(0)), 0x40, true));
        engine
            .poll_once(Duration::from_millis(1))
            .expect("Poll should succeed");
        engine.subscribe(0x41).expect("Subscribe should succeed");

        engine.shutdown().expect("Shutdown should succeed");
        // The active trap got an unregister on the wire; the pending one
        // was cancelled locally; nothing remains tracked.
        assert_eq!(endpoint.sent_count(), 3);
        let state = engine.port.lock().expect("Lock should succeed");
        assert_eq!(state.registry.registration_count(), 0);
        assert_eq!(state.registry.pending_count(), 0);
    }

    #[test]
    fn test_slow_consumer_does_not_stall_completion_path() {
        let endpoint = MockEndpoint::new();
        let endpoint = Arc::new(endpoint);
        let mut config = Config::default().with_notice_retries(3, Duration::from_millis(1));
        config.event_channel_capacity = 1;
        let port = Arc::new(PortContext::new(config));
        let engine =
            NoticeEngine::new(Arc::clone(&endpoint), port).expect("Engine should build");

        // Nobody drains the channel; the second report is dropped but the
        // poll completes and both acks go out.
        endpoint.queue_inbound(report(1, 0x80));
        endpoint.queue_inbound(report(2, 0x80));
        engine
            .poll_once(Duration::from_millis(1))
            .expect("Poll should succeed");
        assert_eq!(endpoint.sent_count(), 2);
        assert_eq!(engine.events().len(), 1);
    }
}
