// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Path records, 64 bytes.
//!
//! Paths keep the original base-fabric layout (GID endpoints, 16-bit LIDs);
//! they are also the request payload for trace-table queries.

use crate::wire::cursor::{Cursor, CursorMut};
use crate::wire::gid::Gid;
use crate::wire::records::{attr, SaRecord};
use crate::wire::WireResult;

pub const COMP_SERVICEID: u64 = 0x0000_0003;
pub const COMP_DGID: u64 = 0x0000_0004;
pub const COMP_SGID: u64 = 0x0000_0008;
pub const COMP_DLID: u64 = 0x0000_0010;
pub const COMP_SLID: u64 = 0x0000_0020;
pub const COMP_REVERSIBLE: u64 = 0x0000_0800;
pub const COMP_NUMBPATH: u64 = 0x0000_1000;
pub const COMP_PKEY: u64 = 0x0000_2000;
pub const COMP_SL: u64 = 0x0000_8000;

/// Maximum paths requested between two endpoints.
pub const DEFAULT_NUMB_PATH: u8 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PathRecord {
    pub service_id: u64,
    pub dgid: Gid,
    pub sgid: Gid,
    pub dlid: u16,
    pub slid: u16,
    /// Packed raw(1)/reserved(3)/flow_label(20)/hop_limit(8) word.
    pub flow_label: u32,
    pub hop_limit: u8,
    pub tclass: u8,
    pub reversible: bool,
    pub numb_path: u8,
    pub pkey: u16,
    /// Packed qos_type(2)/reserved(2)/qos_priority(8)/sl(4) word.
    pub qos_type: u8,
    pub qos_priority: u8,
    pub sl: u8,
    pub mtu_selector: u8,
    pub mtu: u8,
    pub rate_selector: u8,
    pub rate: u8,
    pub pkt_life_selector: u8,
    pub pkt_life: u8,
    pub preference: u8,
}

impl SaRecord for PathRecord {
    const ATTR_ID: u16 = attr::PATH_RECORD;
    const WIRE_SIZE: usize = 64;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u64_be(self.service_id)?;
        self.dgid.encode(c)?;
        self.sgid.encode(c)?;
        c.write_u16_be(self.dlid)?;
        c.write_u16_be(self.slid)?;
        let u1 = ((self.flow_label & 0xF_FFFF) << 8) | u32::from(self.hop_limit);
        c.write_u32_be(u1)?;
        c.write_u8(self.tclass)?;
        c.write_u8((u8::from(self.reversible) << 7) | (self.numb_path & 0x7F))?;
        c.write_u16_be(self.pkey)?;
        let u2 = (u16::from(self.qos_type & 0x3) << 14)
            | (u16::from(self.qos_priority) << 4)
            | u16::from(self.sl & 0xF);
        c.write_u16_be(u2)?;
        c.write_u8(((self.mtu_selector & 0x3) << 6) | (self.mtu & 0x3F))?;
        c.write_u8(((self.rate_selector & 0x3) << 6) | (self.rate & 0x3F))?;
        c.write_u8(((self.pkt_life_selector & 0x3) << 6) | (self.pkt_life & 0x3F))?;
        c.write_u8(self.preference)?;
        c.write_zeros(6)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let service_id = c.read_u64_be()?;
        let dgid = Gid::decode(c)?;
        let sgid = Gid::decode(c)?;
        let dlid = c.read_u16_be()?;
        let slid = c.read_u16_be()?;
        let u1 = c.read_u32_be()?;
        let tclass = c.read_u8()?;
        let np = c.read_u8()?;
        let pkey = c.read_u16_be()?;
        let u2 = c.read_u16_be()?;
        let mtu = c.read_u8()?;
        let rate = c.read_u8()?;
        let life = c.read_u8()?;
        let preference = c.read_u8()?;
        c.skip(6)?;
        Ok(Self {
            service_id,
            dgid,
            sgid,
            dlid,
            slid,
            flow_label: (u1 >> 8) & 0xF_FFFF,
            hop_limit: (u1 & 0xFF) as u8,
            tclass,
            reversible: np & 0x80 != 0,
            numb_path: np & 0x7F,
            pkey,
            qos_type: (u2 >> 14) as u8,
            qos_priority: ((u2 >> 4) & 0xFF) as u8,
            sl: (u2 & 0xF) as u8,
            mtu_selector: mtu >> 6,
            mtu: mtu & 0x3F,
            rate_selector: rate >> 6,
            rate: rate & 0x3F,
            pkt_life_selector: life >> 6,
            pkt_life: life & 0x3F,
            preference,
        })
    }
}
