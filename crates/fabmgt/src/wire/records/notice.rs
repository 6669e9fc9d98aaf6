// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Notices: the asynchronous event payload, 96 bytes fixed.
//!
//! A Report MAD delivers one notice; the client answers with a ReportResp
//! carrying an empty notice (type 0x7F) that echoes the transaction id.

use crate::wire::cursor::{Cursor, CursorMut};
use crate::wire::gid::Gid;
use crate::wire::records::{attr, SaRecord};
use crate::wire::WireResult;

/// Well-known generic trap numbers.
pub const TRAP_GID_NOW_IN_SERVICE: u16 = 0x40;
pub const TRAP_GID_OUT_OF_SERVICE: u16 = 0x41;
pub const TRAP_ADD_MULTICAST_GROUP: u16 = 0x42;
pub const TRAP_DEL_MULTICAST_GROUP: u16 = 0x43;
pub const TRAP_LINK_PORT_CHANGE_STATE: u16 = 0x80;
pub const TRAP_LINK_INTEGRITY: u16 = 0x81;
pub const TRAP_BUFFER_OVERRUN: u16 = 0x82;
pub const TRAP_FLOW_WATCHDOG: u16 = 0x83;
pub const TRAP_CHANGE_CAPABILITY: u16 = 0x90;
pub const TRAP_CHANGE_SYSGUID: u16 = 0x91;
pub const TRAP_BAD_M_KEY: u16 = 0x100;
pub const TRAP_BAD_P_KEY: u16 = 0x101;
pub const TRAP_COST_MATRIX_CHANGE: u16 = 0x801;

/// Notice type meaning "empty" (used in report acknowledgements).
pub const NOTICE_TYPE_EMPTY: u8 = 0x7F;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Packed is_generic(1)/type(7)/producer_or_vendor(24) word.
    pub is_generic: bool,
    pub notice_type: u8,
    pub producer_type: u32,
    pub trap_number: u16,
    /// Packed toggle(1)/count(15) stats word.
    pub toggle: bool,
    pub count: u16,
    pub issuer_lid: u32,
    pub issuer_gid: Gid,
    pub data: [u8; 64],
}

impl Default for Notice {
    fn default() -> Self {
        Self {
            is_generic: true,
            notice_type: 0,
            producer_type: 0,
            trap_number: 0,
            toggle: false,
            count: 0,
            issuer_lid: 0,
            issuer_gid: Gid::default(),
            data: [0; 64],
        }
    }
}

impl Notice {
    /// Empty notice used to acknowledge an inbound report. With the type
    /// set to "empty" every other field is unused and left zero.
    pub fn empty_ack() -> Self {
        Self {
            is_generic: false,
            notice_type: NOTICE_TYPE_EMPTY,
            ..Self::default()
        }
    }

    /// The GID carried in the data section of in/out-of-service traps.
    pub fn data_gid(&self) -> Gid {
        let mut prefix = [0u8; 8];
        let mut iface = [0u8; 8];
        prefix.copy_from_slice(&self.data[0..8]);
        iface.copy_from_slice(&self.data[8..16]);
        Gid::new(u64::from_be_bytes(prefix), u64::from_be_bytes(iface))
    }
}

impl SaRecord for Notice {
    const ATTR_ID: u16 = attr::NOTICE;
    const WIRE_SIZE: usize = 96;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        let u = (u32::from(self.is_generic) << 31)
            | (u32::from(self.notice_type & 0x7F) << 24)
            | (self.producer_type & 0x00FF_FFFF);
        c.write_u32_be(u)?;
        c.write_u16_be(self.trap_number)?;
        let stats = (u16::from(self.toggle) << 15) | (self.count & 0x7FFF);
        c.write_u16_be(stats)?;
        c.write_u32_be(self.issuer_lid)?;
        c.write_zeros(4)?;
        self.issuer_gid.encode(c)?;
        c.write_bytes(&self.data)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let u = c.read_u32_be()?;
        let trap_number = c.read_u16_be()?;
        let stats = c.read_u16_be()?;
        let issuer_lid = c.read_u32_be()?;
        c.skip(4)?;
        let issuer_gid = Gid::decode(c)?;
        let data = c.read_array()?;
        Ok(Self {
            is_generic: u & 0x8000_0000 != 0,
            notice_type: ((u >> 24) & 0x7F) as u8,
            producer_type: u & 0x00FF_FFFF,
            trap_number,
            toggle: stats & 0x8000 != 0,
            count: stats & 0x7FFF,
            issuer_lid,
            issuer_gid,
            data,
        })
    }
}
