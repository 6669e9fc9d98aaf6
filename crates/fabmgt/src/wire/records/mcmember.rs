// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Multicast member records, 56 bytes.

use crate::wire::cursor::{Cursor, CursorMut};
use crate::wire::gid::Gid;
use crate::wire::records::{attr, SaRecord};
use crate::wire::WireResult;

pub const COMP_MGID: u64 = 0x0000_0001;
pub const COMP_PORTGID: u64 = 0x0000_0002;
pub const COMP_QKEY: u64 = 0x0000_0004;
pub const COMP_MTU_SEL: u64 = 0x0000_0010;
pub const COMP_MTU: u64 = 0x0000_0020;
pub const COMP_TCLASS: u64 = 0x0000_0040;
pub const COMP_PKEY: u64 = 0x0000_0080;
pub const COMP_RATE_SEL: u64 = 0x0000_0100;
pub const COMP_RATE: u64 = 0x0000_0200;
pub const COMP_LIFE_SEL: u64 = 0x0000_0400;
pub const COMP_LIFE: u64 = 0x0000_0800;
pub const COMP_SL: u64 = 0x0000_1000;
pub const COMP_HOP: u64 = 0x0000_4000;
pub const COMP_SCOPE: u64 = 0x0000_8000;
pub const COMP_JOIN_STATE: u64 = 0x0002_0000;
pub const COMP_PROXY_JOIN: u64 = 0x0004_0000;
pub const COMP_MLID: u64 = 0x0008_0000;

/// Mask for a join operation: group, member, join state.
pub const COMP_OK_JOIN: u64 = COMP_MGID | COMP_JOIN_STATE | COMP_PORTGID;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct McMemberRecord {
    pub mgid: Gid,
    pub port_gid: Gid,
    pub qkey: u32,
    pub mtu_selector: u8,
    pub mtu: u8,
    pub tclass: u8,
    pub pkey: u16,
    pub rate_selector: u8,
    pub rate: u8,
    pub pkt_life_selector: u8,
    pub pkt_life: u8,
    /// Packed sl(5)/reserved(19)/hop_limit(8) word, converted as a unit.
    pub sl: u8,
    pub hop_limit: u8,
    /// The four join-state flags share one byte with scope; treated as one
    /// group on the wire.
    pub scope: u8,
    pub join_send_only: bool,
    pub join_non_member: bool,
    pub join_full_member: bool,
    pub proxy_join: bool,
    pub mlid: u32,
}

impl SaRecord for McMemberRecord {
    const ATTR_ID: u16 = attr::MCMEMBER_RECORD;
    const WIRE_SIZE: usize = 56;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        self.mgid.encode(c)?;
        self.port_gid.encode(c)?;
        c.write_u32_be(self.qkey)?;
        c.write_zeros(2)?; // used to be the 16-bit MLID
        c.write_u8(((self.mtu_selector & 0x3) << 6) | (self.mtu & 0x3F))?;
        c.write_u8(self.tclass)?;
        c.write_u16_be(self.pkey)?;
        c.write_u8(((self.rate_selector & 0x3) << 6) | (self.rate & 0x3F))?;
        c.write_u8(((self.pkt_life_selector & 0x3) << 6) | (self.pkt_life & 0x3F))?;
        let u1 = (u32::from(self.sl & 0x1F) << 27) | u32::from(self.hop_limit);
        c.write_u32_be(u1)?;
        let js = ((self.scope & 0xF) << 4)
            | (u8::from(self.join_send_only) << 2)
            | (u8::from(self.join_non_member) << 1)
            | u8::from(self.join_full_member);
        c.write_u8(js)?;
        c.write_u8(u8::from(self.proxy_join) << 7)?;
        c.write_zeros(2)?;
        c.write_u32_be(self.mlid)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let mgid = Gid::decode(c)?;
        let port_gid = Gid::decode(c)?;
        let qkey = c.read_u32_be()?;
        c.skip(2)?;
        let mtu = c.read_u8()?;
        let tclass = c.read_u8()?;
        let pkey = c.read_u16_be()?;
        let rate = c.read_u8()?;
        let life = c.read_u8()?;
        let u1 = c.read_u32_be()?;
        let js = c.read_u8()?;
        let pj = c.read_u8()?;
        c.skip(2)?;
        let mlid = c.read_u32_be()?;
        Ok(Self {
            mgid,
            port_gid,
            qkey,
            mtu_selector: mtu >> 6,
            mtu: mtu & 0x3F,
            tclass,
            pkey,
            rate_selector: rate >> 6,
            rate: rate & 0x3F,
            pkt_life_selector: life >> 6,
            pkt_life: life & 0x3F,
            sl: (u1 >> 27) as u8,
            hop_limit: (u1 & 0xFF) as u8,
            scope: js >> 4,
            join_send_only: js & 0x4 != 0,
            join_non_member: js & 0x2 != 0,
            join_full_member: js & 0x1 != 0,
            proxy_join: pj & 0x80 != 0,
            mlid,
        })
    }
}
