// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! The synchronous query path.
//!
//! Every query goes through reachability gating first: while the cached
//! service state is not operational, a class-port-info probe with a short
//! timeout runs ahead of the real query. This turns "service is down" into
//! a 250 ms failure instead of a full timeout x retries stall.

use super::build::build_request;
use super::decode::decode_response;
use super::{Query, QueryResult, RecordType, Selector};
use crate::port::{PortContext, ServiceState};
use crate::transport::MadTransport;
use crate::wire::mad::{PKEY_FULL_MGMT, PKEY_LIMITED_MGMT};
use crate::{Error, Result};
use std::sync::Arc;

pub struct SaClient<T: MadTransport> {
    transport: Arc<T>,
    port: Arc<PortContext>,
}

impl<T: MadTransport> SaClient<T> {
    pub fn new(transport: Arc<T>, port: Arc<PortContext>) -> Self {
        Self { transport, port }
    }

    pub fn port(&self) -> &Arc<PortContext> {
        &self.port
    }

    /// Run a query against the subnet administration service.
    ///
    /// Returns `Ok` whenever a response arrived and decoded; inspect
    /// [`QueryResult::status`] for the remote classification. Transport,
    /// protocol, parameter and protection failures are `Err`.
    pub fn query(&self, query: &Query) -> Result<QueryResult> {
        // Reject unsupported combinations and missing keys up front,
        // before any wire traffic (including the probe).
        self.check_pkey(query)?;
        super::build::build_body(query)?;

        let is_probe_query = query.record_type == RecordType::ClassPortInfo
            && query.selector == Selector::NoInput;

        if self.port.sa_state()? != ServiceState::Operational {
            let probe = Query::all(RecordType::ClassPortInfo);
            match self.exchange(&probe, true) {
                Ok(result) => {
                    self.port.lock()?.sa_state = ServiceState::Operational;
                    if is_probe_query {
                        return Ok(result);
                    }
                }
                Err(err) => {
                    log::warn!(
                        "[SA] service state refresh failed: {}; marking SA and PA down",
                        err
                    );
                    self.port.mark_services_down()?;
                    return Err(err);
                }
            }
        }

        match self.exchange(query, false) {
            Ok(result) => Ok(result),
            Err(err) => {
                log::warn!("[SA] query failed: {}; marking SA and PA down", err);
                self.port.mark_services_down()?;
                Err(err)
            }
        }
    }

    /// Probe reachability without running a real query.
    pub fn probe(&self) -> Result<()> {
        self.query(&Query::all(RecordType::ClassPortInfo)).map(|_| ())
    }

    fn check_pkey(&self, query: &Query) -> Result<()> {
        let address = self.transport.address_info();
        if address.has_pkey(PKEY_FULL_MGMT) {
            return Ok(());
        }
        if query.record_type.allows_limited_pkey() && address.has_pkey(PKEY_LIMITED_MGMT) {
            return Ok(());
        }
        log::debug!(
            "[SA] query for {:?} requires management pkey not present locally",
            query.record_type
        );
        Err(Error::Protection)
    }

    /// One request/response cycle: build, send, validate, decode.
    fn exchange(&self, query: &Query, probe: bool) -> Result<QueryResult> {
        let tid = self.port.next_tid();
        let request = build_request(query, tid)?;

        let config = &self.port.config;
        let timeout = if probe {
            config.probe_timeout
        } else {
            config.timeout
        };
        let response = self
            .transport
            .send_recv(&request, timeout, config.retry_count)?;

        let decoded = decode_response(query.record_type, &response).map_err(|e| {
            log::debug!("[SA] response decode failed: {}", e);
            Error::from(e)
        })?;
        if decoded.tid != tid {
            log::debug!(
                "[SA] response tid {:#x} does not match request tid {:#x}",
                decoded.tid,
                tid
            );
            return Err(Error::InvalidProtocol);
        }
        if !decoded.mad_status.is_success() {
            log::debug!(
                "[SA] query returned status {:#06x}: {}",
                decoded.mad_status.0,
                decoded.mad_status.describe()
            );
        }
        Ok(QueryResult {
            mad_status: decoded.mad_status,
            records: decoded.records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sa::{CallStatus, WireRecord};
    use crate::transport::AddressInfo;
    use crate::wire::cursor::Cursor;
    use crate::wire::mad::{method, MadHeader, SaHeader};
    use crate::wire::records::{attr, ClassPortInfo, NodeRecord, SaRecord};
    use parking_lot::Mutex;
    use std::time::Duration;

    /// Scripted transport: pops one canned reply per call and records what
    /// it was asked to send.
    struct MockTransport {
        replies: Mutex<Vec<Result<Vec<u8>>>>,
        calls: Mutex<Vec<(Vec<u8>, Duration)>>,
        address: AddressInfo,
    }

    impl MockTransport {
        fn new(replies: Vec<Result<Vec<u8>>>) -> Self {
            let mut address = AddressInfo::default();
            address.pkeys[0] = PKEY_FULL_MGMT;
            Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(Vec::new()),
                address,
            }
        }

        fn limited_pkey(mut self) -> Self {
            self.address.pkeys = [0; 8];
            self.address.pkeys[0] = PKEY_LIMITED_MGMT;
            self
        }

        fn no_pkey(mut self) -> Self {
            self.address.pkeys = [0; 8];
            self
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }

        fn call_timeout(&self, idx: usize) -> Duration {
            self.calls.lock()[idx].1
        }

        fn sent_tid(&self, idx: usize) -> u64 {
            let calls = self.calls.lock();
            let mut c = Cursor::new(&calls[idx].0);
            MadHeader::decode(&mut c).expect("Header should decode").tid
        }
    }

    impl MadTransport for MockTransport {
        fn send_recv(&self, request: &[u8], timeout: Duration, _retries: u32) -> Result<Vec<u8>> {
            self.calls.lock().push((request.to_vec(), timeout));
            let mut replies = self.replies.lock();
            if replies.is_empty() {
                return Err(Error::Timeout);
            }
            // Patch the canned reply's tid to echo the request, the way a
            // real exchange would.
            let mut c = Cursor::new(request);
            let tid = MadHeader::decode(&mut c).expect("Header should decode").tid;
            replies.remove(0).map(|mut bytes| {
                bytes[8..16].copy_from_slice(&tid.to_be_bytes());
                bytes
            })
        }

        fn address_info(&self) -> AddressInfo {
            self.address
        }
    }

    fn cpi_response() -> Vec<u8> {
        let cpi = ClassPortInfo {
            base_version: 0x80,
            class_version: 0x80,
            cap_mask: 0x0003,
            ..ClassPortInfo::default()
        };
        let header = MadHeader {
            method: method::GET_RESP,
            ..MadHeader::sa_request(method::GET, attr::CLASS_PORT_INFO, 0)
        };
        crate::sa::build::assemble(
            &header,
            &SaHeader::default(),
            &cpi.to_wire().expect("Encode should succeed"),
        )
        .expect("Assemble should succeed")
    }

    fn node_response(records: &[NodeRecord]) -> Vec<u8> {
        crate::sa::decode::tests::node_table_response(0, records)
    }

    fn client(replies: Vec<Result<Vec<u8>>>) -> (SaClient<MockTransport>, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new(replies));
        let port = Arc::new(PortContext::new(Config::default()));
        (SaClient::new(Arc::clone(&transport), port), transport)
    }

    #[test]
    fn test_query_by_lid_probe_then_query() {
        let node = NodeRecord {
            lid: 3,
            ..NodeRecord::default()
        };
        let (client, transport) =
            client(vec![Ok(cpi_response()), Ok(node_response(&[node]))]);

        let result = client
            .query(&Query::new(Selector::Lid(3), RecordType::NodeRecord))
            .expect("Query should succeed");

        // Probe ran first with the short timeout, then the real query.
        assert_eq!(transport.call_count(), 2);
        assert_eq!(transport.call_timeout(0), Duration::from_millis(250));
        assert_eq!(transport.call_timeout(1), Duration::from_millis(20_000));

        assert_eq!(result.count(), 1);
        assert_eq!(result.status(), CallStatus::Ok);
        match &result.records[0] {
            WireRecord::Node(n) => assert_eq!(n.lid, 3),
            other => panic!("unexpected record {:?}", other),
        }
        assert_eq!(
            client.port().sa_state().expect("Lock should succeed"),
            ServiceState::Operational
        );
    }

    #[test]
    fn test_probe_skipped_once_operational() {
        let node = NodeRecord::default();
        let (client, transport) = client(vec![
            Ok(cpi_response()),
            Ok(node_response(&[node])),
            Ok(node_response(&[node])),
        ]);

        let query = Query::all(RecordType::NodeRecord);
        client.query(&query).expect("Query should succeed");
        client.query(&query).expect("Query should succeed");
        // Probe, query, query: three transport calls, not four.
        assert_eq!(transport.call_count(), 3);
    }

    #[test]
    fn test_probe_failure_fails_fast_and_marks_down() {
        let (client, transport) = client(vec![Err(Error::Timeout)]);

        let err = client
            .query(&Query::new(Selector::Lid(3), RecordType::NodeRecord))
            .unwrap_err();
        match err {
            Error::Timeout => {}
            other => panic!("unexpected error {:?}", other),
        }
        // Only the probe went out; the real query was never attempted.
        assert_eq!(transport.call_count(), 1);
        assert_eq!(transport.call_timeout(0), Duration::from_millis(250));
        assert_eq!(
            client.port().sa_state().expect("Lock should succeed"),
            ServiceState::Down
        );
        assert_eq!(
            client.port().pa_state().expect("Lock should succeed"),
            ServiceState::Down
        );
    }

    #[test]
    fn test_probe_query_returns_probe_result_directly() {
        let (client, transport) = client(vec![Ok(cpi_response())]);
        let result = client
            .query(&Query::all(RecordType::ClassPortInfo))
            .expect("Query should succeed");
        assert_eq!(result.count(), 1);
        // One exchange total: the probe result doubles as the answer.
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn test_invalid_combination_sends_nothing() {
        let (client, transport) = client(vec![Ok(cpi_response())]);
        let err = client
            .query(&Query::new(Selector::Lid(1), RecordType::ClassPortInfo))
            .unwrap_err();
        match err {
            Error::InvalidParameter => {}
            other => panic!("unexpected error {:?}", other),
        }
        // Rejected before the probe: the transport saw zero calls.
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_unsupported_pair_rejected_before_probe() {
        let (client, transport) = client(vec![]);
        let err = client
            .query(&Query::new(
                Selector::ServiceId(1),
                RecordType::SwitchInfoRecord,
            ))
            .unwrap_err();
        match err {
            Error::InvalidParameter => {}
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_protection_gate_blocks_without_pkey() {
        let transport = Arc::new(MockTransport::new(vec![]).no_pkey());
        let port = Arc::new(PortContext::new(Config::default()));
        let client = SaClient::new(Arc::clone(&transport), port);

        let err = client
            .query(&Query::all(RecordType::NodeRecord))
            .unwrap_err();
        match err {
            Error::Protection => {}
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_limited_pkey_allows_whitelisted_kinds_only() {
        let transport = Arc::new(
            MockTransport::new(vec![Ok(cpi_response()), Ok(node_response(&[]))]).limited_pkey(),
        );
        let port = Arc::new(PortContext::new(Config::default()));
        let client = SaClient::new(Arc::clone(&transport), port);

        // Node records ride the limited key.
        let result = client
            .query(&Query::all(RecordType::NodeRecord))
            .expect("Query should succeed");
        assert_eq!(result.status(), CallStatus::NoRecords);

        // Switch info does not.
        let err = client
            .query(&Query::all(RecordType::SwitchInfoRecord))
            .unwrap_err();
        match err {
            Error::Protection => {}
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_remote_status_still_yields_result() {
        let mut failed = node_response(&[]);
        failed[4..6]
            .copy_from_slice(&crate::wire::mad::sa_status::NO_RECORDS.to_be_bytes());
        let (client, _) = client(vec![Ok(cpi_response()), Ok(failed)]);

        let result = client
            .query(&Query::all(RecordType::NodeRecord))
            .expect("Query should succeed");
        match result.status() {
            CallStatus::RemoteFailure(status) => {
                assert_eq!(status.0, crate::wire::mad::sa_status::NO_RECORDS);
            }
            other => panic!("unexpected status {:?}", other),
        }
        match result.require_records() {
            Err(Error::RemoteStatus(s)) => {
                assert_eq!(s, crate::wire::mad::sa_status::NO_RECORDS);
            }
            other => panic!("unexpected result {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_query_failure_after_probe_marks_down() {
        let (client, transport) = client(vec![Ok(cpi_response()), Err(Error::Transport)]);
        let err = client
            .query(&Query::all(RecordType::NodeRecord))
            .unwrap_err();
        match err {
            Error::Transport => {}
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(transport.call_count(), 2);
        assert_eq!(
            client.port().sa_state().expect("Lock should succeed"),
            ServiceState::Down
        );
    }

    #[test]
    fn test_each_exchange_uses_fresh_tid() {
        let node = NodeRecord::default();
        let (client, transport) = client(vec![
            Ok(cpi_response()),
            Ok(node_response(&[node])),
            Ok(node_response(&[node])),
        ]);
        let query = Query::all(RecordType::NodeRecord);
        client.query(&query).expect("Query should succeed");
        client.query(&query).expect("Query should succeed");

        let t0 = transport.sent_tid(0);
        let t1 = transport.sent_tid(1);
        let t2 = transport.sent_tid(2);
        assert!(t0 < t1 && t1 < t2, "tids must be fresh: {} {} {}", t0, t1, t2);
    }
}
