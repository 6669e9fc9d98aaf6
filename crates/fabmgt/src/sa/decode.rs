// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Response validation and decoding.

use super::{RecordType, WireRecord};
use crate::wire::cursor::Cursor;
use crate::wire::mad::{
    method, record_stride, response_record_count, MadHeader, MadStatus, SaHeader, SA_HEADER_SIZE,
};
use crate::wire::records::trace::unscramble_trace;
use crate::wire::records::*;
use crate::wire::{WireError, WireResult};

/// Decoded response: remote status plus typed records.
pub struct DecodedResponse {
    pub tid: u64,
    pub mad_status: MadStatus,
    pub records: Vec<WireRecord>,
}

/// Validate headers and decode all records of a response MAD.
pub fn decode_response(record_type: RecordType, bytes: &[u8]) -> WireResult<DecodedResponse> {
    if bytes.len() < SA_HEADER_SIZE {
        return Err(WireError::Truncated {
            need: SA_HEADER_SIZE,
            have: bytes.len(),
        });
    }
    let mut c = Cursor::new(bytes);
    let header = MadHeader::decode(&mut c)?;
    let sa_header = SaHeader::decode(&mut c)?;

    let count = response_record_count(header.method, bytes.len(), sa_header.attr_offset)?;
    let stride = if header.method == method::GET_RESP {
        record_type.wire_size()
    } else {
        record_stride(sa_header.attr_offset)
    };

    let mut payload = bytes[SA_HEADER_SIZE..].to_vec();
    if record_type == RecordType::TraceRecord {
        unscramble_trace(&mut payload);
    }

    let records = if header.status.is_success() {
        decode_records(record_type, &payload, count, stride)?
    } else {
        // A failed response still decodes whatever records it declares
        // (normally none); header status drives the call outcome.
        Vec::new()
    };

    Ok(DecodedResponse {
        tid: header.tid,
        mad_status: header.status,
        records,
    })
}

fn decode_records(
    record_type: RecordType,
    payload: &[u8],
    count: usize,
    stride: usize,
) -> WireResult<Vec<WireRecord>> {
    use RecordType as RT;

    fn map<R: SaRecord>(
        payload: &[u8],
        count: usize,
        stride: usize,
        wrap: impl Fn(R) -> WireRecord,
    ) -> WireResult<Vec<WireRecord>> {
        Ok(decode_table::<R>(payload, count, stride)?
            .into_iter()
            .map(wrap)
            .collect())
    }

    match record_type {
        RT::ClassPortInfo => map(payload, count, stride, WireRecord::ClassPortInfo),
        RT::NodeRecord => map(payload, count, stride, WireRecord::Node),
        RT::NodeDesc => map(payload, count, stride, |r: NodeRecord| {
            WireRecord::NodeDesc(r.node_desc)
        }),
        RT::Lid => map(payload, count, stride, |r: NodeRecord| {
            WireRecord::Lid(r.lid)
        }),
        RT::SystemImageGuid => map(payload, count, stride, |r: NodeRecord| {
            WireRecord::SystemImageGuid(r.node_info.system_image_guid)
        }),
        RT::PortGuid => map(payload, count, stride, |r: NodeRecord| {
            WireRecord::PortGuid(r.node_info.port_guid)
        }),
        RT::NodeGuid => map(payload, count, stride, |r: NodeRecord| {
            WireRecord::NodeGuid(r.node_info.node_guid)
        }),
        RT::PortInfoRecord => map(payload, count, stride, |r| WireRecord::PortInfo(Box::new(r))),
        RT::SwitchInfoRecord => map(payload, count, stride, WireRecord::SwitchInfo),
        RT::SmInfoRecord => map(payload, count, stride, WireRecord::SmInfo),
        RT::LinkRecord => map(payload, count, stride, WireRecord::Link),
        RT::ServiceRecord => map(payload, count, stride, WireRecord::Service),
        RT::McMemberRecord => map(payload, count, stride, WireRecord::McMember),
        RT::InformInfoRecord => map(payload, count, stride, WireRecord::InformInfo),
        RT::TraceRecord => map(payload, count, stride, WireRecord::Trace),
        RT::PathRecord => map(payload, count, stride, WireRecord::Path),
        RT::ScScTableRecord => map(payload, count, stride, WireRecord::ScScTable),
        RT::SlScTableRecord => map(payload, count, stride, WireRecord::SlScTable),
        RT::ScSlTableRecord => map(payload, count, stride, WireRecord::ScSlTable),
        RT::ScVltTableRecord => map(payload, count, stride, WireRecord::ScVltTable),
        RT::ScVlntTableRecord => map(payload, count, stride, WireRecord::ScVlntTable),
        RT::VlArbTableRecord => map(payload, count, stride, WireRecord::VlArbTable),
        RT::PKeyTableRecord => map(payload, count, stride, WireRecord::PKeyTable),
        RT::LinearFdbRecord => map(payload, count, stride, WireRecord::LinearFdb),
        RT::McastFdbRecord => map(payload, count, stride, WireRecord::McastFdb),
        RT::VfInfoRecord => map(payload, count, stride, WireRecord::VfInfo),
        RT::FabricInfoRecord => map(payload, count, stride, WireRecord::FabricInfo),
        RT::QuarantinedNodeRecord => map(payload, count, stride, WireRecord::QuarantinedNode),
        RT::CongestionInfoRecord => map(payload, count, stride, WireRecord::CongestionInfo),
        RT::SwitchCongRecord => map(payload, count, stride, WireRecord::SwitchCong),
        RT::SwitchPortCongRecord => map(payload, count, stride, WireRecord::SwitchPortCong),
        RT::HfiCongRecord => map(payload, count, stride, WireRecord::HfiCong),
        RT::HfiCongCtrlRecord => map(payload, count, stride, WireRecord::HfiCongCtrl),
        RT::BufferControlTableRecord => {
            map(payload, count, stride, WireRecord::BufferControlTable)
        }
        RT::CableInfoRecord => map(payload, count, stride, WireRecord::CableInfo),
        RT::PortGroupRecord => map(payload, count, stride, WireRecord::PortGroup),
        RT::PortGroupFwdRecord => map(payload, count, stride, WireRecord::PortGroupFwd),
        RT::SwitchCostRecord => map(payload, count, stride, WireRecord::SwitchCost),
    }
}
