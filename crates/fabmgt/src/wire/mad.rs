// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! MAD common header and SA class header codec.
//!
//! Every management datagram starts with the 24-byte common header followed,
//! for the administration classes, by the 32-byte class header (RMPP
//! segmentation fields, access key, attribute offset, component mask). The
//! combined 56-byte prefix is `SA_HEADER_SIZE`.

use super::cursor::{Cursor, CursorMut};
use super::mask::ComponentMask;
use super::{WireError, WireResult};

/// Base protocol version carried by every MAD.
pub const BASE_VERSION: u8 = 0x80;
/// Subnet Administration management class.
pub const MCLASS_SUBN_ADM: u8 = 0x03;
/// Performance Administration (PM/PA) management class.
pub const MCLASS_PERF_ADM: u8 = 0x32;
/// SA class version.
pub const SA_CLASS_VERSION: u8 = 0x80;
/// PA class version.
pub const PA_CLASS_VERSION: u8 = 0x80;

/// Well-known queue key for the general services QP.
pub const GSI_WELL_KNOWN_QKEY: u32 = 0x8001_0000;
/// Full-management partition key.
pub const PKEY_FULL_MGMT: u16 = 0xFFFF;
/// Limited-management partition key.
pub const PKEY_LIMITED_MGMT: u16 = 0x7FFF;

/// Administration methods.
pub mod method {
    pub const GET: u8 = 0x01;
    pub const SET: u8 = 0x02;
    pub const REPORT: u8 = 0x06;
    pub const GET_RESP: u8 = 0x81;
    pub const REPORT_RESP: u8 = 0x86;
    pub const GETTABLE: u8 = 0x12;
    pub const GETTABLE_RESP: u8 = 0x92;
    pub const GETTRACETABLE: u8 = 0x13;
    pub const DELETE: u8 = 0x15;
    pub const DELETE_RESP: u8 = 0x95;
}

/// Class-specific SA status codes (upper byte of the MAD status word).
pub mod sa_status {
    pub const NO_RESOURCES: u16 = 0x0100;
    pub const REQ_INVALID: u16 = 0x0200;
    pub const NO_RECORDS: u16 = 0x0300;
    pub const TOO_MANY_RECORDS: u16 = 0x0400;
    pub const REQ_INVALID_GID: u16 = 0x0500;
    pub const INSUFFICIENT_COMPONENTS: u16 = 0x0600;
}

/// Common MAD header, 24 bytes.
pub const MAD_HEADER_SIZE: usize = 24;
/// SA/PA class header (RMPP + administration fields), 32 bytes.
pub const CLASS_HEADER_SIZE: usize = 32;
/// Combined prefix in front of every administration payload.
pub const SA_HEADER_SIZE: usize = MAD_HEADER_SIZE + CLASS_HEADER_SIZE;

/// Status word of a response MAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MadStatus(pub u16);

impl MadStatus {
    pub fn is_success(self) -> bool {
        self.0 == 0
    }

    /// SA class-specific portion of the status.
    pub fn class_code(self) -> u16 {
        self.0 & 0xFF00
    }

    pub fn describe(self) -> &'static str {
        match self.class_code() {
            0 => "success",
            sa_status::NO_RESOURCES => "insufficient SA resources",
            sa_status::REQ_INVALID => "invalid SA request",
            sa_status::NO_RECORDS => "no SA records",
            sa_status::TOO_MANY_RECORDS => "too many SA records",
            sa_status::REQ_INVALID_GID => "invalid GID in SA request",
            sa_status::INSUFFICIENT_COMPONENTS => "insufficient components in SA request",
            _ => "unknown SA status",
        }
    }
}

/// The 24-byte MAD common header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MadHeader {
    pub base_version: u8,
    pub mgmt_class: u8,
    pub class_version: u8,
    pub method: u8,
    pub status: MadStatus,
    pub tid: u64,
    pub attr_id: u16,
    pub attr_modifier: u32,
}

impl MadHeader {
    /// Request header for the SA class.
    pub fn sa_request(method: u8, attr_id: u16, tid: u64) -> Self {
        Self {
            base_version: BASE_VERSION,
            mgmt_class: MCLASS_SUBN_ADM,
            class_version: SA_CLASS_VERSION,
            method,
            status: MadStatus(0),
            tid,
            attr_id,
            attr_modifier: 0,
        }
    }

    /// Request header for the PA class.
    pub fn pa_request(method: u8, attr_id: u16, tid: u64) -> Self {
        Self {
            base_version: BASE_VERSION,
            mgmt_class: MCLASS_PERF_ADM,
            class_version: PA_CLASS_VERSION,
            method,
            status: MadStatus(0),
            tid,
            attr_id,
            attr_modifier: 0,
        }
    }

    pub fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u8(self.base_version)?;
        c.write_u8(self.mgmt_class)?;
        c.write_u8(self.class_version)?;
        c.write_u8(self.method)?;
        c.write_u16_be(self.status.0)?;
        c.write_zeros(2)?; // class-specific, zero for SA/PA
        c.write_u64_be(self.tid)?;
        c.write_u16_be(self.attr_id)?;
        c.write_zeros(2)?;
        c.write_u32_be(self.attr_modifier)
    }

    pub fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let base_version = c.read_u8()?;
        let mgmt_class = c.read_u8()?;
        let class_version = c.read_u8()?;
        let method = c.read_u8()?;
        let status = MadStatus(c.read_u16_be()?);
        c.skip(2)?;
        let tid = c.read_u64_be()?;
        let attr_id = c.read_u16_be()?;
        c.skip(2)?;
        let attr_modifier = c.read_u32_be()?;
        Ok(Self {
            base_version,
            mgmt_class,
            class_version,
            method,
            status,
            tid,
            attr_id,
            attr_modifier,
        })
    }
}

/// The 32-byte class header: RMPP segmentation plus administration fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaHeader {
    pub rmpp_version: u8,
    pub rmpp_type: u8,
    /// Packed rmpp_flags(3)/resp_time(5) byte, carried as a unit.
    pub rmpp_time_flags: u8,
    pub rmpp_status: u8,
    pub seg_num: u32,
    pub payload_len: u32,
    pub sm_key: u64,
    /// Response record stride in 8-byte units; 0 when no records follow.
    pub attr_offset: u16,
    pub component_mask: ComponentMask,
}

impl SaHeader {
    pub fn for_request(component_mask: ComponentMask) -> Self {
        Self {
            component_mask,
            ..Self::default()
        }
    }

    pub fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u8(self.rmpp_version)?;
        c.write_u8(self.rmpp_type)?;
        c.write_u8(self.rmpp_time_flags)?;
        c.write_u8(self.rmpp_status)?;
        c.write_u32_be(self.seg_num)?;
        c.write_u32_be(self.payload_len)?;
        c.write_u64_be(self.sm_key)?;
        c.write_u16_be(self.attr_offset)?;
        c.write_zeros(2)?;
        c.write_u64_be(self.component_mask.0)
    }

    pub fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let rmpp_version = c.read_u8()?;
        let rmpp_type = c.read_u8()?;
        let rmpp_time_flags = c.read_u8()?;
        let rmpp_status = c.read_u8()?;
        let seg_num = c.read_u32_be()?;
        let payload_len = c.read_u32_be()?;
        let sm_key = c.read_u64_be()?;
        let attr_offset = c.read_u16_be()?;
        c.skip(2)?;
        let component_mask = ComponentMask(c.read_u64_be()?);
        Ok(Self {
            rmpp_version,
            rmpp_type,
            rmpp_time_flags,
            rmpp_status,
            seg_num,
            payload_len,
            sm_key,
            attr_offset,
            component_mask,
        })
    }
}

/// Compute the record count of an administration response.
///
/// A Get response always carries exactly one record. A GetTable response
/// carries `(payload_len - header) / (attr_offset * 8)` records; an
/// attribute offset of zero means no records.
pub fn response_record_count(
    method: u8,
    total_len: usize,
    attr_offset: u16,
) -> WireResult<usize> {
    if total_len < SA_HEADER_SIZE {
        return Err(WireError::Truncated {
            need: SA_HEADER_SIZE,
            have: total_len,
        });
    }
    if method == method::GET_RESP {
        return Ok(1);
    }
    if attr_offset == 0 {
        return Ok(0);
    }
    Ok((total_len - SA_HEADER_SIZE) / (attr_offset as usize * 8))
}

/// Byte stride between records in a multi-record response.
pub fn record_stride(attr_offset: u16) -> usize {
    attr_offset as usize * 8
}

/// Attribute offset (8-byte units) for a record of `wire_size` bytes.
pub fn attr_offset_for(wire_size: usize) -> u16 {
    ((wire_size + 7) / 8) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mad_header_roundtrip() {
        let hdr = MadHeader::sa_request(method::GETTABLE, 0x0011, 0xDEAD_BEEF_0000_0001);
        let mut buf = [0u8; MAD_HEADER_SIZE];
        hdr.encode(&mut CursorMut::new(&mut buf))
            .expect("Encode should succeed");

        // Spot-check wire bytes: version, class, method, tid.
        assert_eq!(buf[0], 0x80);
        assert_eq!(buf[1], 0x03);
        assert_eq!(buf[2], 0x80);
        assert_eq!(buf[3], 0x12);
        assert_eq!(&buf[8..16], &0xDEAD_BEEF_0000_0001u64.to_be_bytes());
        assert_eq!(&buf[16..18], &[0x00, 0x11]);

        let back = MadHeader::decode(&mut Cursor::new(&buf)).expect("Decode should succeed");
        assert_eq!(back, hdr);
    }

    #[test]
    fn test_sa_header_roundtrip() {
        let hdr = SaHeader {
            attr_offset: 15,
            component_mask: ComponentMask(0x1),
            payload_len: 2048,
            ..SaHeader::default()
        };
        let mut buf = [0u8; CLASS_HEADER_SIZE];
        hdr.encode(&mut CursorMut::new(&mut buf))
            .expect("Encode should succeed");
        // Component mask is the trailing u64.
        assert_eq!(&buf[24..32], &1u64.to_be_bytes());

        let back = SaHeader::decode(&mut Cursor::new(&buf)).expect("Decode should succeed");
        assert_eq!(back, hdr);
    }

    #[test]
    fn test_get_response_count_is_one_regardless_of_offset() {
        for offset in [0u16, 1, 15, 64] {
            let cnt = response_record_count(method::GET_RESP, 2048, offset)
                .expect("Count should succeed");
            assert_eq!(cnt, 1);
        }
    }

    #[test]
    fn test_gettable_count_math() {
        // 3 node records: 56 + 3 * 120 bytes, offset 15 (units of 8).
        let cnt = response_record_count(method::GETTABLE_RESP, 56 + 3 * 120, 15)
            .expect("Count should succeed");
        assert_eq!(cnt, 3);

        // Zero attribute offset means an empty table.
        let cnt =
            response_record_count(method::GETTABLE_RESP, 56, 0).expect("Count should succeed");
        assert_eq!(cnt, 0);
    }

    #[test]
    fn test_count_rejects_short_buffer() {
        let err = response_record_count(method::GETTABLE_RESP, 12, 15).unwrap_err();
        match err {
            WireError::Truncated { need, have } => {
                assert_eq!(need, SA_HEADER_SIZE);
                assert_eq!(have, 12);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_attr_offset_padding() {
        assert_eq!(attr_offset_for(116), 15); // node record pads 116 -> 120
        assert_eq!(attr_offset_for(120), 15);
        assert_eq!(attr_offset_for(12), 2);
        assert_eq!(record_stride(15), 120);
    }

    #[test]
    fn test_mad_status_describe() {
        assert!(MadStatus(0).is_success());
        assert_eq!(MadStatus(sa_status::NO_RECORDS).describe(), "no SA records");
        assert_eq!(
            MadStatus(sa_status::REQ_INVALID).describe(),
            "invalid SA request"
        );
        assert_eq!(MadStatus(0x1F00).describe(), "unknown SA status");
    }
}
