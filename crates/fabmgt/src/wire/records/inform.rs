// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! InformInfo: the subscription attribute, 40 bytes.
//!
//! An InformInfo Set with subscribe=1 registers interest in a trap number;
//! subscribe=0 cancels it. The record form (subscriber LID + enum prefix)
//! is what the service returns when queried for current subscriptions.

use crate::wire::cursor::{Cursor, CursorMut};
use crate::wire::gid::Gid;
use crate::wire::records::{attr, SaRecord};
use crate::wire::WireResult;

pub const COMP_SUBSCRIBER_LID: u64 = 0x0000_0001;
pub const COMP_SUBSCRIBER_ENUM: u64 = 0x0000_0002;

/// Wildcard values used when subscribing to a single trap number.
pub const LID_RANGE_ALL: u32 = u32::MAX;
pub const TYPE_ALL: u16 = u16::MAX;
pub const PRODUCER_ALL: u32 = 0x00FF_FFFF;

/// Response-time hint requested of the service (4.096 us * 2^19 ~ 2 s).
pub const DEFAULT_RESP_TIME: u8 = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InformInfo {
    pub gid: Gid,
    pub lid_range_begin: u32,
    pub lid_range_end: u32,
    pub is_generic: bool,
    pub subscribe: bool,
    pub trap_type: u16,
    pub trap_number: u16,
    /// Packed qpn(24)/reserved(3)/resp_time(5) word, converted as a unit.
    pub qpn: u32,
    pub resp_time_value: u8,
    pub producer_type: u32,
}

impl InformInfo {
    pub const WIRE_SIZE: usize = 40;

    /// Interest record for one trap number, all producers, all LIDs.
    pub fn for_trap(trap_number: u16, subscribe: bool) -> Self {
        Self {
            gid: Gid::default(),
            lid_range_begin: LID_RANGE_ALL,
            lid_range_end: 0,
            is_generic: true,
            subscribe,
            trap_type: TYPE_ALL,
            trap_number,
            qpn: 0,
            resp_time_value: DEFAULT_RESP_TIME,
            producer_type: PRODUCER_ALL,
        }
    }

    pub fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        self.gid.encode(c)?;
        c.write_u32_be(self.lid_range_begin)?;
        c.write_u32_be(self.lid_range_end)?;
        c.write_u8(u8::from(self.is_generic))?;
        c.write_u8(u8::from(self.subscribe))?;
        c.write_u16_be(self.trap_type)?;
        c.write_zeros(2)?;
        c.write_u16_be(self.trap_number)?;
        let u1 = ((self.qpn & 0x00FF_FFFF) << 8) | u32::from(self.resp_time_value & 0x1F);
        c.write_u32_be(u1)?;
        c.write_u32_be(self.producer_type & 0x00FF_FFFF)
    }

    pub fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let gid = Gid::decode(c)?;
        let lid_range_begin = c.read_u32_be()?;
        let lid_range_end = c.read_u32_be()?;
        let is_generic = c.read_u8()? != 0;
        let subscribe = c.read_u8()? != 0;
        let trap_type = c.read_u16_be()?;
        c.skip(2)?;
        let trap_number = c.read_u16_be()?;
        let u1 = c.read_u32_be()?;
        let u2 = c.read_u32_be()?;
        Ok(Self {
            gid,
            lid_range_begin,
            lid_range_end,
            is_generic,
            subscribe,
            trap_type,
            trap_number,
            qpn: u1 >> 8,
            resp_time_value: (u1 & 0x1F) as u8,
            producer_type: u2 & 0x00FF_FFFF,
        })
    }
}

/// InformInfo record: subscriber identity plus the subscription, 48 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InformInfoRecord {
    pub subscriber_lid: u32,
    pub subscriber_enum: u16,
    pub inform_info: InformInfo,
}

impl SaRecord for InformInfoRecord {
    const ATTR_ID: u16 = attr::INFORM_INFO_RECORD;
    const WIRE_SIZE: usize = 8 + InformInfo::WIRE_SIZE;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.subscriber_lid)?;
        c.write_u16_be(self.subscriber_enum)?;
        c.write_zeros(2)?;
        self.inform_info.encode(c)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let subscriber_lid = c.read_u32_be()?;
        let subscriber_enum = c.read_u16_be()?;
        c.skip(2)?;
        let inform_info = InformInfo::decode(c)?;
        Ok(Self {
            subscriber_lid,
            subscriber_enum,
            inform_info,
        })
    }
}
