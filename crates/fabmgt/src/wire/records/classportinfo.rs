// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Class port info, 80 bytes.
//!
//! This is the attribute used by the reachability probe: a tiny constant
//! size response that tells us the administration service is alive and what
//! it can do. Redirect fields are carried but are zero on this fabric
//! generation.

use crate::wire::cursor::{Cursor, CursorMut};
use crate::wire::gid::Gid;
use crate::wire::records::{attr, SaRecord};
use crate::wire::WireResult;

/// Capability bits (CapMask).
pub const CAP_TRAP: u16 = 0x0001;
pub const CAP_NOTICE: u16 = 0x0002;
pub const CAP_CAPMASK2: u16 = 0x0004;
/// SA class-specific capability bits.
pub const CAP_MULTICAST: u16 = 0x0200;
pub const CAP_MULTIPATH: u16 = 0x0400;
pub const CAP_PA_SERVICES: u16 = 0x8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassPortInfo {
    pub base_version: u8,
    pub class_version: u8,
    pub cap_mask: u16,
    /// Packed cap_mask2(27)/resp_time(5) word, converted as a unit.
    pub cap_mask2: u32,
    pub resp_time_value: u8,
    pub redirect_gid: Gid,
    /// Packed redirect tclass(8)/reserved(4)/flow_label(20).
    pub redirect_tc_fl: u32,
    pub redirect_lid: u32,
    /// Packed redirect sl(5)/reserved(3)/qp(24).
    pub redirect_sl_qp: u32,
    pub redirect_qkey: u32,
    pub trap_gid: Gid,
    pub trap_tc_fl: u32,
    pub trap_lid: u32,
    /// Packed trap hop_limit(8)/qp(24).
    pub trap_hl_qp: u32,
    pub trap_qkey: u32,
    pub trap_pkey: u16,
    pub redirect_pkey: u16,
    /// Packed trap sl(5)/reserved(3) byte.
    pub trap_sl: u8,
}

impl SaRecord for ClassPortInfo {
    const ATTR_ID: u16 = attr::CLASS_PORT_INFO;
    const WIRE_SIZE: usize = 80;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u8(self.base_version)?;
        c.write_u8(self.class_version)?;
        c.write_u16_be(self.cap_mask)?;
        let u1 = (self.cap_mask2 << 5) | u32::from(self.resp_time_value & 0x1F);
        c.write_u32_be(u1)?;
        self.redirect_gid.encode(c)?;
        c.write_u32_be(self.redirect_tc_fl)?;
        c.write_u32_be(self.redirect_lid)?;
        c.write_u32_be(self.redirect_sl_qp)?;
        c.write_u32_be(self.redirect_qkey)?;
        self.trap_gid.encode(c)?;
        c.write_u32_be(self.trap_tc_fl)?;
        c.write_u32_be(self.trap_lid)?;
        c.write_u32_be(self.trap_hl_qp)?;
        c.write_u32_be(self.trap_qkey)?;
        c.write_u16_be(self.trap_pkey)?;
        c.write_u16_be(self.redirect_pkey)?;
        c.write_u8((self.trap_sl & 0x1F) << 3)?;
        c.write_zeros(3)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let base_version = c.read_u8()?;
        let class_version = c.read_u8()?;
        let cap_mask = c.read_u16_be()?;
        let u1 = c.read_u32_be()?;
        let redirect_gid = Gid::decode(c)?;
        let redirect_tc_fl = c.read_u32_be()?;
        let redirect_lid = c.read_u32_be()?;
        let redirect_sl_qp = c.read_u32_be()?;
        let redirect_qkey = c.read_u32_be()?;
        let trap_gid = Gid::decode(c)?;
        let trap_tc_fl = c.read_u32_be()?;
        let trap_lid = c.read_u32_be()?;
        let trap_hl_qp = c.read_u32_be()?;
        let trap_qkey = c.read_u32_be()?;
        let trap_pkey = c.read_u16_be()?;
        let redirect_pkey = c.read_u16_be()?;
        let sl_byte = c.read_u8()?;
        c.skip(3)?;
        Ok(Self {
            base_version,
            class_version,
            cap_mask,
            cap_mask2: u1 >> 5,
            resp_time_value: (u1 & 0x1F) as u8,
            redirect_gid,
            redirect_tc_fl,
            redirect_lid,
            redirect_sl_qp,
            redirect_qkey,
            trap_gid,
            trap_tc_fl,
            trap_lid,
            trap_hl_qp,
            trap_qkey,
            trap_pkey,
            redirect_pkey,
            trap_sl: sl_byte >> 3,
        })
    }
}
