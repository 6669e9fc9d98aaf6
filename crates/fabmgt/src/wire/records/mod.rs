// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Administration record codecs.
//!
//! One module per wire layout. Every codec is byte-exact against the
//! published record catalog: fixed field widths and offsets, big-endian
//! multi-byte fields, packed sub-byte groups converted as one storage unit
//! and then split.

pub mod classportinfo;
pub mod congestion;
pub mod inform;
pub mod link;
pub mod mcmember;
pub mod misc;
pub mod node;
pub mod notice;
pub mod path;
pub mod portinfo;
pub mod service;
pub mod sminfo;
pub mod switchinfo;
pub mod tables;
pub mod trace;

pub use classportinfo::ClassPortInfo;
pub use congestion::{
    CongestionInfoRecord, HfiCongCtrlRecord, HfiCongRecord, SwitchCongRecord,
    SwitchPortCongRecord,
};
pub use inform::{InformInfo, InformInfoRecord};
pub use link::LinkRecord;
pub use mcmember::McMemberRecord;
pub use misc::{FabricInfoRecord, QuarantinedNodeRecord, SwitchCostRecord, VfInfoRecord};
pub use node::{NodeDescription, NodeInfo, NodeRecord};
pub use notice::Notice;
pub use path::PathRecord;
pub use portinfo::PortInfoRecord;
pub use service::ServiceRecord;
pub use sminfo::SmInfoRecord;
pub use switchinfo::SwitchInfoRecord;
pub use tables::{
    BufferControlTableRecord, CableInfoRecord, LinearFdbRecord, McastFdbRecord,
    PKeyTableRecord, PortGroupFwdRecord, PortGroupRecord, ScMapRecord, ScSlTableRecord,
    ScVlTableRecord, SlScTableRecord, VlArbTableRecord,
};
pub use trace::TraceRecord;

use super::cursor::{Cursor, CursorMut};
use super::{WireError, WireResult};

/// Administration attribute identifiers.
pub mod attr {
    pub const CLASS_PORT_INFO: u16 = 0x0001;
    pub const NOTICE: u16 = 0x0002;
    pub const INFORM_INFO: u16 = 0x0003;
    pub const NODE_RECORD: u16 = 0x0011;
    pub const PORTINFO_RECORD: u16 = 0x0012;
    pub const SC_MAPTBL_RECORD: u16 = 0x0013;
    pub const SWITCHINFO_RECORD: u16 = 0x0014;
    pub const LINEAR_FWDTBL_RECORD: u16 = 0x0015;
    pub const MCAST_FWDTBL_RECORD: u16 = 0x0017;
    pub const SMINFO_RECORD: u16 = 0x0018;
    pub const LINK_RECORD: u16 = 0x0020;
    pub const SERVICE_RECORD: u16 = 0x0031;
    pub const P_KEY_TABLE_RECORD: u16 = 0x0033;
    pub const PATH_RECORD: u16 = 0x0035;
    pub const VLARBTABLE_RECORD: u16 = 0x0036;
    pub const MCMEMBER_RECORD: u16 = 0x0038;
    pub const TRACE_RECORD: u16 = 0x0039;
    pub const INFORM_INFO_RECORD: u16 = 0x00F3;
    pub const SL2SC_MAPTBL_RECORD: u16 = 0x0080;
    pub const SC2SL_MAPTBL_RECORD: u16 = 0x0081;
    pub const SC2VL_NT_MAPTBL_RECORD: u16 = 0x0082;
    pub const SC2VL_T_MAPTBL_RECORD: u16 = 0x0083;
    pub const PGROUP_FWDTBL_RECORD: u16 = 0x0085;
    pub const CABLE_INFO_RECORD: u16 = 0x0088;
    pub const VF_INFO_RECORD: u16 = 0x0089;
    pub const PORTGROUP_TABLE_RECORD: u16 = 0x008B;
    pub const BUFF_CTRL_TAB_RECORD: u16 = 0x008C;
    pub const FABRICINFO_RECORD: u16 = 0x008D;
    pub const QUARANTINED_NODE_RECORD: u16 = 0x0090;
    pub const CONGESTION_INFO_RECORD: u16 = 0x0091;
    pub const SWITCH_CONG_RECORD: u16 = 0x0092;
    pub const SWITCH_PORT_CONG_RECORD: u16 = 0x0093;
    pub const HFI_CONG_RECORD: u16 = 0x0094;
    pub const HFI_CONG_CTRL_RECORD: u16 = 0x0095;
    pub const SWITCH_COST_RECORD: u16 = 0x00A3;
}

/// A fixed-layout administration record.
///
/// `WIRE_SIZE` is the unpadded record size; multi-record responses pad each
/// record to the attribute-offset stride (next 8-byte boundary).
pub trait SaRecord: Sized {
    const ATTR_ID: u16;
    const WIRE_SIZE: usize;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()>;
    fn decode(c: &mut Cursor<'_>) -> WireResult<Self>;

    /// Encode into a fresh buffer of exactly `WIRE_SIZE` bytes.
    fn to_wire(&self) -> WireResult<Vec<u8>> {
        let mut buf = vec![0u8; Self::WIRE_SIZE];
        self.encode(&mut CursorMut::new(&mut buf))?;
        Ok(buf)
    }

    /// Decode one record, requiring the full wire size to be present.
    fn from_wire(bytes: &[u8]) -> WireResult<Self> {
        if bytes.len() < Self::WIRE_SIZE {
            return Err(WireError::Truncated {
                need: Self::WIRE_SIZE,
                have: bytes.len(),
            });
        }
        Self::decode(&mut Cursor::new(bytes))
    }
}

/// Decode `count` records from a table payload with the given stride.
///
/// The payload is the bytes after the 56-byte header. Each record occupies
/// `stride` bytes; the record itself may be shorter (stride padding).
pub fn decode_table<R: SaRecord>(
    payload: &[u8],
    count: usize,
    stride: usize,
) -> WireResult<Vec<R>> {
    if stride < R::WIRE_SIZE {
        return Err(WireError::DecodeFailed {
            reason: format!(
                "attribute offset stride {} smaller than record size {}",
                stride,
                R::WIRE_SIZE
            ),
        });
    }
    if payload.len() < count * stride {
        return Err(WireError::Truncated {
            need: count * stride,
            have: payload.len(),
        });
    }
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        out.push(R::from_wire(&payload[i * stride..i * stride + R::WIRE_SIZE])?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_table_respects_stride_padding() {
        // Link records are 12 bytes, padded to a 16-byte stride.
        let rec = LinkRecord {
            from_lid: 7,
            from_port: 1,
            to_port: 2,
            to_lid: 9,
        };
        let mut payload = vec![0u8; 32];
        payload[..12].copy_from_slice(&rec.to_wire().expect("Encode should succeed"));
        payload[16..28].copy_from_slice(&rec.to_wire().expect("Encode should succeed"));

        let out: Vec<LinkRecord> =
            decode_table(&payload, 2, 16).expect("Decode table should succeed");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], rec);
        assert_eq!(out[1], rec);
    }

    #[test]
    fn test_decode_table_truncated() {
        let payload = vec![0u8; 20];
        let err = decode_table::<LinkRecord>(&payload, 2, 16).unwrap_err();
        match err {
            WireError::Truncated { need, have } => {
                assert_eq!(need, 32);
                assert_eq!(have, 20);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_decode_table_rejects_undersized_stride() {
        let payload = vec![0u8; 32];
        let err = decode_table::<LinkRecord>(&payload, 2, 8).unwrap_err();
        match err {
            WireError::DecodeFailed { .. } => {}
            other => panic!("unexpected error {:?}", other),
        }
    }
}
