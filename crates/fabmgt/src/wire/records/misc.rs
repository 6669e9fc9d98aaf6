// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Virtual fabric, fabric summary, quarantine and switch-cost records.

use crate::wire::cursor::{Cursor, CursorMut};
use crate::wire::gid::Gid;
use crate::wire::records::node::{NodeDescription, NodeInfo};
use crate::wire::records::{attr, SaRecord};
use crate::wire::WireResult;

pub const VFINFO_COMP_INDEX: u64 = 0x0000_0001;
pub const VFINFO_COMP_PKEY: u64 = 0x0000_0002;
pub const VFINFO_COMP_NAME: u64 = 0x0000_0008;
pub const VFINFO_COMP_SERVICEID: u64 = 0x0000_0010;
pub const VFINFO_COMP_MGID: u64 = 0x0000_0020;
pub const VFINFO_COMP_SL: u64 = 0x0000_0080;

pub const SWITCH_COST_COMP_SLID: u64 = 0x0000_0001;

/// Quarantine reason bits.
pub const QUARANTINE_SPOOF_GENERIC: u32 = 0x0000_0001;
pub const QUARANTINE_TOPO_NODE_GUID: u32 = 0x0000_0002;
pub const QUARANTINE_TOPO_NODE_DESC: u32 = 0x0000_0004;
pub const QUARANTINE_TOPO_PORT_GUID: u32 = 0x0000_0008;

/// Cost matrix entries per record.
pub const SWITCH_COST_ENTRIES: usize = 64;

/// Virtual-fabric info, 128 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VfInfoRecord {
    pub vf_index: u16,
    pub pkey: u16,
    pub vf_name: [u8; 64],
    pub service_id: u64,
    pub mgid: Gid,
    /// Packed select_flags(2)/reserved(1)/sl_base(5) byte.
    pub select_flags: u8,
    pub sl_base: u8,
    pub mtu_specified: bool,
    pub mtu: u8,
    pub rate_specified: bool,
    pub rate: u8,
    pub pkt_life_specified: bool,
    pub pkt_life_inc: u8,
    pub option_flags: u8,
    pub bandwidth_percent: u8,
    pub priority: bool,
    pub routing_sls: u8,
    pub preemption_rank: u8,
    pub hoq_life: u8,
    pub sl_response_specified: bool,
    pub sl_response: u8,
    pub sl_multicast_specified: bool,
    pub sl_multicast: u8,
}

impl Default for VfInfoRecord {
    fn default() -> Self {
        Self {
            vf_index: 0,
            pkey: 0,
            vf_name: [0; 64],
            service_id: 0,
            mgid: Gid::default(),
            select_flags: 0,
            sl_base: 0,
            mtu_specified: false,
            mtu: 0,
            rate_specified: false,
            rate: 0,
            pkt_life_specified: false,
            pkt_life_inc: 0,
            option_flags: 0,
            bandwidth_percent: 0,
            priority: false,
            routing_sls: 1,
            preemption_rank: 0,
            hoq_life: 0,
            sl_response_specified: false,
            sl_response: 0,
            sl_multicast_specified: false,
            sl_multicast: 0,
        }
    }
}

impl VfInfoRecord {
    pub fn name(&self) -> &str {
        let end = self.vf_name.iter().position(|&b| b == 0).unwrap_or(64);
        std::str::from_utf8(&self.vf_name[..end]).unwrap_or("")
    }
}

impl SaRecord for VfInfoRecord {
    const ATTR_ID: u16 = attr::VF_INFO_RECORD;
    const WIRE_SIZE: usize = 128;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u16_be(self.vf_index)?;
        c.write_u16_be(self.pkey)?;
        c.write_zeros(4)?;
        c.write_bytes(&self.vf_name)?;
        c.write_u64_be(self.service_id)?;
        self.mgid.encode(c)?;
        c.write_u8(((self.select_flags & 0x3) << 6) | (self.sl_base & 0x1F))?;
        c.write_u8((u8::from(self.mtu_specified) << 7) | (self.mtu & 0x3F))?;
        c.write_u8((u8::from(self.rate_specified) << 7) | (self.rate & 0x3F))?;
        c.write_u8((u8::from(self.pkt_life_specified) << 7) | (self.pkt_life_inc & 0x7))?;
        c.write_u8(self.option_flags)?;
        c.write_u8(self.bandwidth_percent)?;
        c.write_u8(u8::from(self.priority))?;
        c.write_u8(self.routing_sls)?;
        c.write_u8(self.preemption_rank & 0x7F)?;
        c.write_u8(self.hoq_life & 0x1F)?;
        c.write_u8((u8::from(self.sl_response_specified) << 7) | (self.sl_response & 0x1F))?;
        c.write_u8((u8::from(self.sl_multicast_specified) << 7) | (self.sl_multicast & 0x1F))?;
        c.write_zeros(20)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let vf_index = c.read_u16_be()?;
        let pkey = c.read_u16_be()?;
        c.skip(4)?;
        let vf_name = c.read_array()?;
        let service_id = c.read_u64_be()?;
        let mgid = Gid::decode(c)?;
        let s1 = c.read_u8()?;
        let mtu = c.read_u8()?;
        let rate = c.read_u8()?;
        let life = c.read_u8()?;
        let option_flags = c.read_u8()?;
        let bandwidth_percent = c.read_u8()?;
        let priority = c.read_u8()? & 0x1 != 0;
        let routing_sls = c.read_u8()?;
        let preemption_rank = c.read_u8()? & 0x7F;
        let hoq_life = c.read_u8()? & 0x1F;
        let slr = c.read_u8()?;
        let slm = c.read_u8()?;
        c.skip(20)?;
        Ok(Self {
            vf_index,
            pkey,
            vf_name,
            service_id,
            mgid,
            select_flags: s1 >> 6,
            sl_base: s1 & 0x1F,
            mtu_specified: mtu & 0x80 != 0,
            mtu: mtu & 0x3F,
            rate_specified: rate & 0x80 != 0,
            rate: rate & 0x3F,
            pkt_life_specified: life & 0x80 != 0,
            pkt_life_inc: life & 0x7,
            option_flags,
            bandwidth_percent,
            priority,
            routing_sls,
            preemption_rank,
            hoq_life,
            sl_response_specified: slr & 0x80 != 0,
            sl_response: slr & 0x1F,
            sl_multicast_specified: slm & 0x80 != 0,
            sl_multicast: slm & 0x1F,
        })
    }
}

/// Fabric-wide link census, 408 bytes (ten counters plus reserved tail).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FabricInfoRecord {
    pub num_hfis: u32,
    pub num_switches: u32,
    pub num_internal_hfi_links: u32,
    pub num_external_hfi_links: u32,
    pub num_internal_isls: u32,
    pub num_external_isls: u32,
    pub num_degraded_hfi_links: u32,
    pub num_degraded_isls: u32,
    pub num_omitted_hfi_links: u32,
    pub num_omitted_isls: u32,
}

impl SaRecord for FabricInfoRecord {
    const ATTR_ID: u16 = attr::FABRICINFO_RECORD;
    const WIRE_SIZE: usize = 10 * 4 + 92 * 4;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.num_hfis)?;
        c.write_u32_be(self.num_switches)?;
        c.write_u32_be(self.num_internal_hfi_links)?;
        c.write_u32_be(self.num_external_hfi_links)?;
        c.write_u32_be(self.num_internal_isls)?;
        c.write_u32_be(self.num_external_isls)?;
        c.write_u32_be(self.num_degraded_hfi_links)?;
        c.write_u32_be(self.num_degraded_isls)?;
        c.write_u32_be(self.num_omitted_hfi_links)?;
        c.write_u32_be(self.num_omitted_isls)?;
        c.write_zeros(92 * 4)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let num_hfis = c.read_u32_be()?;
        let num_switches = c.read_u32_be()?;
        let num_internal_hfi_links = c.read_u32_be()?;
        let num_external_hfi_links = c.read_u32_be()?;
        let num_internal_isls = c.read_u32_be()?;
        let num_external_isls = c.read_u32_be()?;
        let num_degraded_hfi_links = c.read_u32_be()?;
        let num_degraded_isls = c.read_u32_be()?;
        let num_omitted_hfi_links = c.read_u32_be()?;
        let num_omitted_isls = c.read_u32_be()?;
        c.skip(92 * 4)?;
        Ok(Self {
            num_hfis,
            num_switches,
            num_internal_hfi_links,
            num_external_hfi_links,
            num_internal_isls,
            num_external_isls,
            num_degraded_hfi_links,
            num_degraded_isls,
            num_omitted_hfi_links,
            num_omitted_isls,
        })
    }
}

/// A node held out of the fabric, with what was expected in its place.
/// 216 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuarantinedNodeRecord {
    pub trusted_lid: u32,
    pub trusted_port_num: u8,
    pub trusted_node_guid: u64,
    pub trusted_neighbor_node_guid: u64,
    pub node_desc: NodeDescription,
    pub node_info: NodeInfo,
    pub quarantine_reasons: u32,
    pub expected_node_desc: NodeDescription,
    pub expected_node_guid: u64,
    pub expected_port_guid: u64,
}

impl SaRecord for QuarantinedNodeRecord {
    const ATTR_ID: u16 = attr::QUARANTINED_NODE_RECORD;
    const WIRE_SIZE: usize = 216;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.trusted_lid)?;
        c.write_u8(self.trusted_port_num)?;
        c.write_zeros(3)?;
        c.write_u64_be(self.trusted_node_guid)?;
        c.write_u64_be(self.trusted_neighbor_node_guid)?;
        self.node_desc.encode(c)?;
        self.node_info.encode(c)?;
        c.write_u32_be(self.quarantine_reasons)?;
        self.expected_node_desc.encode(c)?;
        c.write_u64_be(self.expected_node_guid)?;
        c.write_u64_be(self.expected_port_guid)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let trusted_lid = c.read_u32_be()?;
        let trusted_port_num = c.read_u8()?;
        c.skip(3)?;
        let trusted_node_guid = c.read_u64_be()?;
        let trusted_neighbor_node_guid = c.read_u64_be()?;
        let node_desc = NodeDescription::decode(c)?;
        let node_info = NodeInfo::decode(c)?;
        let quarantine_reasons = c.read_u32_be()?;
        let expected_node_desc = NodeDescription::decode(c)?;
        let expected_node_guid = c.read_u64_be()?;
        let expected_port_guid = c.read_u64_be()?;
        Ok(Self {
            trusted_lid,
            trusted_port_num,
            trusted_node_guid,
            trusted_neighbor_node_guid,
            node_desc,
            node_info,
            quarantine_reasons,
            expected_node_desc,
            expected_node_guid,
            expected_port_guid,
        })
    }
}

/// One row of the inter-switch cost matrix, 516 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchCostRecord {
    pub slid: u32,
    /// (destination lid, cost) pairs; unused entries are zero.
    pub costs: [(u32, u16); SWITCH_COST_ENTRIES],
}

impl Default for SwitchCostRecord {
    fn default() -> Self {
        Self {
            slid: 0,
            costs: [(0, 0); SWITCH_COST_ENTRIES],
        }
    }
}

impl SaRecord for SwitchCostRecord {
    const ATTR_ID: u16 = attr::SWITCH_COST_RECORD;
    const WIRE_SIZE: usize = 4 + SWITCH_COST_ENTRIES * 8;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.slid)?;
        for (dlid, value) in self.costs {
            c.write_u32_be(dlid)?;
            c.write_u16_be(value)?;
            c.write_zeros(2)?;
        }
        Ok(())
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let slid = c.read_u32_be()?;
        let mut costs = [(0u32, 0u16); SWITCH_COST_ENTRIES];
        for entry in &mut costs {
            let dlid = c.read_u32_be()?;
            let value = c.read_u16_be()?;
            c.skip(2)?;
            *entry = (dlid, value);
        }
        Ok(Self { slid, costs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_sizes() {
        assert_eq!(VfInfoRecord::WIRE_SIZE, 128);
        assert_eq!(FabricInfoRecord::WIRE_SIZE, 408);
        assert_eq!(QuarantinedNodeRecord::WIRE_SIZE, 216);
        assert_eq!(SwitchCostRecord::WIRE_SIZE, 516);
    }

    #[test]
    fn test_vfinfo_roundtrip() {
        let mut name = [0u8; 64];
        name[..7].copy_from_slice(b"Default");
        let rec = VfInfoRecord {
            vf_index: 0,
            pkey: 0xFFFF,
            vf_name: name,
            service_id: 0x1000_1175_0000_0001,
            mgid: Gid::new(0xFF12_401B_FFFF_0000, 1),
            select_flags: 0x2,
            sl_base: 0,
            mtu_specified: true,
            mtu: 5,
            rate_specified: false,
            rate: 0,
            bandwidth_percent: 100,
            priority: true,
            hoq_life: 8,
            sl_response_specified: true,
            sl_response: 1,
            ..VfInfoRecord::default()
        };
        let wire = rec.to_wire().expect("Encode should succeed");
        let back = VfInfoRecord::from_wire(&wire).expect("Decode should succeed");
        assert_eq!(back, rec);
        assert_eq!(back.name(), "Default");
    }

    #[test]
    fn test_fabric_info_roundtrip() {
        let rec = FabricInfoRecord {
            num_hfis: 1024,
            num_switches: 48,
            num_internal_isls: 96,
            num_external_isls: 480,
            num_degraded_isls: 2,
            ..FabricInfoRecord::default()
        };
        let wire = rec.to_wire().expect("Encode should succeed");
        assert_eq!(wire.len(), 408);
        let back = FabricInfoRecord::from_wire(&wire).expect("Decode should succeed");
        assert_eq!(back, rec);
    }

    #[test]
    fn test_quarantined_node_roundtrip() {
        let rec = QuarantinedNodeRecord {
            trusted_lid: 0x60,
            trusted_port_num: 12,
            trusted_node_guid: 0xAA,
            trusted_neighbor_node_guid: 0xBB,
            node_desc: NodeDescription::from_str("rogue-node"),
            quarantine_reasons: QUARANTINE_TOPO_NODE_GUID,
            expected_node_desc: NodeDescription::from_str("compute-007"),
            expected_node_guid: 0xCC,
            expected_port_guid: 0xDD,
            ..QuarantinedNodeRecord::default()
        };
        let wire = rec.to_wire().expect("Encode should succeed");
        let back = QuarantinedNodeRecord::from_wire(&wire).expect("Decode should succeed");
        assert_eq!(back, rec);
    }

    #[test]
    fn test_switch_cost_roundtrip() {
        let mut rec = SwitchCostRecord {
            slid: 0x100,
            ..SwitchCostRecord::default()
        };
        rec.costs[0] = (0x200, 10);
        rec.costs[63] = (0x300, 40);
        let wire = rec.to_wire().expect("Encode should succeed");
        let back = SwitchCostRecord::from_wire(&wire).expect("Decode should succeed");
        assert_eq!(back, rec);
    }
}
