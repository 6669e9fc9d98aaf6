// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Switch info records, 92 bytes.

use crate::wire::cursor::{Cursor, CursorMut};
use crate::wire::records::{attr, SaRecord};
use crate::wire::WireResult;

pub const COMP_LID: u64 = 0x0000_0000_0000_0001;
pub const COMP_LFDBCAP: u64 = 0x0000_0000_0000_0004;
pub const COMP_MFDBCAP: u64 = 0x0000_0000_0000_0010;
pub const COMP_LFDBTOP: u64 = 0x0000_0000_0000_0020;
pub const COMP_MFDBTOP: u64 = 0x0000_0000_0000_0080;
pub const COMP_PORTSTATECHG: u64 = 0x0000_0000_0002_0000;
pub const COMP_CAPMASK: u64 = 0x0000_0100_0000_0000;

/// Switch capability/topology summary, 84 bytes of payload after the RID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwitchInfoRecord {
    pub lid: u32,
    pub linear_fdb_cap: u32,
    pub port_group_fdb_cap: u32,
    pub multicast_fdb_cap: u32,
    pub linear_fdb_top: u32,
    pub multicast_fdb_top: u32,
    pub collective_cap: u32,
    pub collective_top: u32,
    pub ipv6_addr: [u8; 16],
    pub ipv4_addr: [u8; 4],
    /// Packed life_time(5)/port_state_change(1)/reserved(2) byte.
    pub life_time_value: u8,
    pub port_state_change: bool,
    pub partition_enforcement_cap: u16,
    pub port_group_cap: u8,
    pub port_group_top: u8,
    pub routing_mode_supported: u8,
    pub routing_mode_enabled: u8,
    pub enhanced_port0: bool,
    /// Packed collective(3)/multicast(3) mask byte.
    pub collective_mask: u8,
    pub multicast_mask: u8,
    /// Adaptive-routing control word, converted as a unit.
    pub adaptive_routing: u16,
    pub capability_mask: u16,
    pub capability_mask_collectives: u16,
}

impl SaRecord for SwitchInfoRecord {
    const ATTR_ID: u16 = attr::SWITCHINFO_RECORD;
    const WIRE_SIZE: usize = 92;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        c.write_zeros(4)?;
        c.write_u32_be(self.linear_fdb_cap)?;
        c.write_u32_be(self.port_group_fdb_cap)?;
        c.write_u32_be(self.multicast_fdb_cap)?;
        c.write_u32_be(self.linear_fdb_top)?;
        c.write_u32_be(self.multicast_fdb_top)?;
        c.write_u32_be(self.collective_cap)?;
        c.write_u32_be(self.collective_top)?;
        c.write_zeros(4)?;
        c.write_bytes(&self.ipv6_addr)?;
        c.write_bytes(&self.ipv4_addr)?;
        c.write_zeros(8)?; // reserved26/27
        c.write_zeros(4)?; // reserved28
        c.write_zeros(3)?; // reserved21..23
        let u1 = (self.life_time_value & 0x1F) | (u8::from(self.port_state_change) << 5);
        c.write_u8(u1)?;
        c.write_zeros(2)?; // reserved24
        c.write_u16_be(self.partition_enforcement_cap)?;
        c.write_u8(self.port_group_cap)?;
        c.write_u8(self.port_group_top)?;
        c.write_u8(self.routing_mode_supported)?;
        c.write_u8(self.routing_mode_enabled)?;
        c.write_u8(u8::from(self.enhanced_port0) << 4)?;
        let mc = ((self.collective_mask & 0x7) << 3) | (self.multicast_mask & 0x7);
        c.write_u8(mc)?;
        c.write_u16_be(self.adaptive_routing)?;
        c.write_u16_be(self.capability_mask)?;
        c.write_u16_be(self.capability_mask_collectives)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        c.skip(4)?;
        let linear_fdb_cap = c.read_u32_be()?;
        let port_group_fdb_cap = c.read_u32_be()?;
        let multicast_fdb_cap = c.read_u32_be()?;
        let linear_fdb_top = c.read_u32_be()?;
        let multicast_fdb_top = c.read_u32_be()?;
        let collective_cap = c.read_u32_be()?;
        let collective_top = c.read_u32_be()?;
        c.skip(4)?;
        let ipv6_addr = c.read_array()?;
        let ipv4_addr = c.read_array()?;
        c.skip(15)?;
        let u1 = c.read_u8()?;
        c.skip(2)?;
        let partition_enforcement_cap = c.read_u16_be()?;
        let port_group_cap = c.read_u8()?;
        let port_group_top = c.read_u8()?;
        let routing_mode_supported = c.read_u8()?;
        let routing_mode_enabled = c.read_u8()?;
        let u2 = c.read_u8()?;
        let mc = c.read_u8()?;
        let adaptive_routing = c.read_u16_be()?;
        let capability_mask = c.read_u16_be()?;
        let capability_mask_collectives = c.read_u16_be()?;
        Ok(Self {
            lid,
            linear_fdb_cap,
            port_group_fdb_cap,
            multicast_fdb_cap,
            linear_fdb_top,
            multicast_fdb_top,
            collective_cap,
            collective_top,
            ipv6_addr,
            ipv4_addr,
            life_time_value: u1 & 0x1F,
            port_state_change: u1 & 0x20 != 0,
            partition_enforcement_cap,
            port_group_cap,
            port_group_top,
            routing_mode_supported,
            routing_mode_enabled,
            enhanced_port0: u2 & 0x10 != 0,
            collective_mask: (mc >> 3) & 0x7,
            multicast_mask: mc & 0x7,
            adaptive_routing,
            capability_mask,
            capability_mask_collectives,
        })
    }
}
