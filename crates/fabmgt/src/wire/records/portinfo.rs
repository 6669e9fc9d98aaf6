// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Port info records, 378 bytes.
//!
//! The SMA port attribute is the largest payload the client decodes. The
//! leading 54 bytes (addressing, VL caps, port states, keys, QPs, link
//! speed) are modeled field-exactly; the remaining 188 bytes of SMA state
//! are carried verbatim so wire round-trips stay byte-identical. The eight
//! link-down-reason entries that trail the payload are modeled exactly.

use crate::wire::cursor::{Cursor, CursorMut};
use crate::wire::records::{attr, SaRecord};
use crate::wire::WireResult;

pub const COMP_ENDPORTLID: u64 = 0x0000_0001;
pub const COMP_PORTNUM: u64 = 0x0000_0002;
pub const COMP_OPTIONS: u64 = 0x0000_0004;
pub const COMP_CAPABILITYMASK: u64 = 0x0000_0008;

/// Logical port states.
pub const PORT_STATE_DOWN: u8 = 1;
pub const PORT_STATE_INIT: u8 = 2;
pub const PORT_STATE_ARMED: u8 = 3;
pub const PORT_STATE_ACTIVE: u8 = 4;

/// Number of retained link-down-reason entries.
pub const NUM_LINKDOWN_REASONS: usize = 8;

/// Size of the unmodeled SMA state span inside the payload.
pub const OPAQUE_SPAN: usize = 188;

/// The packed 32-bit port-states group.
///
/// On the wire this is one big-endian u32; the sub-fields below are split
/// out of (and merged back into) that unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortStates {
    pub led_enabled: bool,
    pub sm_configuration_started: bool,
    pub neighbor_normal: bool,
    pub offline_disabled_reason: u8,
    pub port_physical_state: u8,
    pub port_state: u8,
}

impl PortStates {
    pub fn pack(self) -> u32 {
        (u32::from(self.led_enabled) << 22)
            | (u32::from(self.sm_configuration_started) << 21)
            | (u32::from(self.neighbor_normal) << 20)
            | (u32::from(self.offline_disabled_reason & 0xF) << 16)
            | (u32::from(self.port_physical_state & 0xF) << 4)
            | u32::from(self.port_state & 0xF)
    }

    pub fn unpack(u: u32) -> Self {
        Self {
            led_enabled: u & (1 << 22) != 0,
            sm_configuration_started: u & (1 << 21) != 0,
            neighbor_normal: u & (1 << 20) != 0,
            offline_disabled_reason: ((u >> 16) & 0xF) as u8,
            port_physical_state: ((u >> 4) & 0xF) as u8,
            port_state: (u & 0xF) as u8,
        }
    }
}

/// One retained link-down event, 16 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkDownEntry {
    pub neighbor_reason: u8,
    pub reason: u8,
    pub timestamp: u64,
}

impl LinkDownEntry {
    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_zeros(6)?;
        c.write_u8(self.neighbor_reason)?;
        c.write_u8(self.reason)?;
        c.write_u64_be(self.timestamp)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        c.skip(6)?;
        let neighbor_reason = c.read_u8()?;
        let reason = c.read_u8()?;
        let timestamp = c.read_u64_be()?;
        Ok(Self {
            neighbor_reason,
            reason,
            timestamp,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfoRecord {
    pub end_port_lid: u32,
    pub port_num: u8,
    // --- modeled payload prefix ---
    pub lid: u32,
    pub flow_control_mask: u32,
    pub vl_preempt_cap: u8,
    pub vl_cap: u8,
    pub vl_high_limit: u16,
    pub vl_preempting_limit: u16,
    pub vl_arb_high_cap: u8,
    pub vl_arb_low_cap: u8,
    pub port_states: PortStates,
    pub port_type: u8,
    pub multi_collect_mask: u8,
    pub mkey_protect: u8,
    pub lmc: u8,
    pub master_sm_sl: u8,
    pub link_init_reason: u8,
    pub operational_vl: u8,
    pub pkey_8b: u16,
    pub pkey_10b: u16,
    pub mkey_violations: u16,
    pub pkey_violations: u16,
    pub qkey_violations: u16,
    pub sm_trap_qp: u32,
    pub sa_qp: u32,
    pub neighbor_port_num: u8,
    pub link_down_reason: u8,
    pub neighbor_link_down_reason: u8,
    pub client_reregister: bool,
    pub subnet_timeout: u8,
    pub link_speed_supported: u16,
    pub link_speed_enabled: u16,
    pub link_speed_active: u16,
    /// Unmodeled SMA state carried verbatim (width, modes, keys, caps).
    pub opaque: [u8; OPAQUE_SPAN],
    pub link_down_reasons: [LinkDownEntry; NUM_LINKDOWN_REASONS],
}

impl Default for PortInfoRecord {
    fn default() -> Self {
        Self {
            end_port_lid: 0,
            port_num: 0,
            lid: 0,
            flow_control_mask: 0,
            vl_preempt_cap: 0,
            vl_cap: 0,
            vl_high_limit: 0,
            vl_preempting_limit: 0,
            vl_arb_high_cap: 0,
            vl_arb_low_cap: 0,
            port_states: PortStates::default(),
            port_type: 0,
            multi_collect_mask: 0,
            mkey_protect: 0,
            lmc: 0,
            master_sm_sl: 0,
            link_init_reason: 0,
            operational_vl: 0,
            pkey_8b: 0,
            pkey_10b: 0,
            mkey_violations: 0,
            pkey_violations: 0,
            qkey_violations: 0,
            sm_trap_qp: 0,
            sa_qp: 1,
            neighbor_port_num: 0,
            link_down_reason: 0,
            neighbor_link_down_reason: 0,
            client_reregister: false,
            subnet_timeout: 0,
            link_speed_supported: 0,
            link_speed_enabled: 0,
            link_speed_active: 0,
            opaque: [0; OPAQUE_SPAN],
            link_down_reasons: [LinkDownEntry::default(); NUM_LINKDOWN_REASONS],
        }
    }
}

impl SaRecord for PortInfoRecord {
    const ATTR_ID: u16 = attr::PORTINFO_RECORD;
    const WIRE_SIZE: usize = 8 + 242 + NUM_LINKDOWN_REASONS * 16;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.end_port_lid)?;
        c.write_u8(self.port_num)?;
        c.write_zeros(3)?;
        c.write_u32_be(self.lid)?;
        c.write_u32_be(self.flow_control_mask)?;
        c.write_u8(self.vl_preempt_cap)?;
        c.write_u8(self.vl_cap & 0x1F)?;
        c.write_u16_be(self.vl_high_limit)?;
        c.write_u16_be(self.vl_preempting_limit)?;
        c.write_u8(self.vl_arb_high_cap)?;
        c.write_u8(self.vl_arb_low_cap)?;
        c.write_u32_be(self.port_states.pack())?;
        c.write_u8(self.port_type & 0xF)?;
        c.write_u8(self.multi_collect_mask)?;
        c.write_u8(((self.mkey_protect & 0x3) << 6) | (self.lmc & 0xF))?;
        c.write_u8(self.master_sm_sl & 0x1F)?;
        c.write_u8((self.link_init_reason & 0xF) << 4)?;
        c.write_u8(self.operational_vl & 0x1F)?;
        c.write_u16_be(self.pkey_8b)?;
        c.write_u16_be(self.pkey_10b)?;
        c.write_u16_be(self.mkey_violations)?;
        c.write_u16_be(self.pkey_violations)?;
        c.write_u16_be(self.qkey_violations)?;
        c.write_u32_be(self.sm_trap_qp & 0x00FF_FFFF)?;
        c.write_u32_be(self.sa_qp & 0x00FF_FFFF)?;
        c.write_u8(self.neighbor_port_num)?;
        c.write_u8(self.link_down_reason)?;
        c.write_u8(self.neighbor_link_down_reason)?;
        let subnet = (u8::from(self.client_reregister) << 7) | (self.subnet_timeout & 0x1F);
        c.write_u8(subnet)?;
        c.write_u16_be(self.link_speed_supported)?;
        c.write_u16_be(self.link_speed_enabled)?;
        c.write_u16_be(self.link_speed_active)?;
        c.write_bytes(&self.opaque)?;
        for entry in &self.link_down_reasons {
            entry.encode(c)?;
        }
        Ok(())
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let end_port_lid = c.read_u32_be()?;
        let port_num = c.read_u8()?;
        c.skip(3)?;
        let lid = c.read_u32_be()?;
        let flow_control_mask = c.read_u32_be()?;
        let vl_preempt_cap = c.read_u8()?;
        let vl_cap = c.read_u8()? & 0x1F;
        let vl_high_limit = c.read_u16_be()?;
        let vl_preempting_limit = c.read_u16_be()?;
        let vl_arb_high_cap = c.read_u8()?;
        let vl_arb_low_cap = c.read_u8()?;
        let port_states = PortStates::unpack(c.read_u32_be()?);
        let port_type = c.read_u8()? & 0xF;
        let multi_collect_mask = c.read_u8()?;
        let s1 = c.read_u8()?;
        let master_sm_sl = c.read_u8()? & 0x1F;
        let s3 = c.read_u8()?;
        let operational_vl = c.read_u8()? & 0x1F;
        let pkey_8b = c.read_u16_be()?;
        let pkey_10b = c.read_u16_be()?;
        let mkey_violations = c.read_u16_be()?;
        let pkey_violations = c.read_u16_be()?;
        let qkey_violations = c.read_u16_be()?;
        let sm_trap_qp = c.read_u32_be()? & 0x00FF_FFFF;
        let sa_qp = c.read_u32_be()? & 0x00FF_FFFF;
        let neighbor_port_num = c.read_u8()?;
        let link_down_reason = c.read_u8()?;
        let neighbor_link_down_reason = c.read_u8()?;
        let subnet = c.read_u8()?;
        let link_speed_supported = c.read_u16_be()?;
        let link_speed_enabled = c.read_u16_be()?;
        let link_speed_active = c.read_u16_be()?;
        let opaque = c.read_array()?;
        let mut link_down_reasons = [LinkDownEntry::default(); NUM_LINKDOWN_REASONS];
        for entry in &mut link_down_reasons {
            *entry = LinkDownEntry::decode(c)?;
        }
        Ok(Self {
            end_port_lid,
            port_num,
            lid,
            flow_control_mask,
            vl_preempt_cap,
            vl_cap,
            vl_high_limit,
            vl_preempting_limit,
            vl_arb_high_cap,
            vl_arb_low_cap,
            port_states,
            port_type,
            multi_collect_mask,
            mkey_protect: s1 >> 6,
            lmc: s1 & 0xF,
            master_sm_sl,
            link_init_reason: s3 >> 4,
            operational_vl,
            pkey_8b,
            pkey_10b,
            mkey_violations,
            pkey_violations,
            qkey_violations,
            sm_trap_qp,
            sa_qp,
            neighbor_port_num,
            link_down_reason,
            neighbor_link_down_reason,
            client_reregister: subnet & 0x80 != 0,
            subnet_timeout: subnet & 0x1F,
            link_speed_supported,
            link_speed_enabled,
            link_speed_active,
            opaque,
            link_down_reasons,
        })
    }
}
