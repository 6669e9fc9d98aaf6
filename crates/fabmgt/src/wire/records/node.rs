// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Node records: node identity, GUIDs and textual description.
//!
//! The node record also backs the projection query outputs (description,
//! LID, node/port/system-image GUID lists) — those decode the same wire
//! image and project one field.

use crate::wire::cursor::{Cursor, CursorMut};
use crate::wire::records::{attr, SaRecord};
use crate::wire::WireResult;

/// Component mask bits for node record queries.
pub const COMP_LID: u64 = 0x0000_0001;
pub const COMP_BASEVERSION: u64 = 0x0000_0004;
pub const COMP_CLASSVERSION: u64 = 0x0000_0008;
pub const COMP_NODETYPE: u64 = 0x0000_0010;
pub const COMP_NUMPORTS: u64 = 0x0000_0020;
pub const COMP_SYSIMAGEGUID: u64 = 0x0000_0080;
pub const COMP_NODEGUID: u64 = 0x0000_0100;
pub const COMP_PORTGUID: u64 = 0x0000_0200;
pub const COMP_PARTITIONCAP: u64 = 0x0000_0400;
pub const COMP_DEVICEID: u64 = 0x0000_0800;
pub const COMP_REVISION: u64 = 0x0000_1000;
pub const COMP_LOCALPORTNUM: u64 = 0x0000_2000;
pub const COMP_VENDORID: u64 = 0x0000_4000;
pub const COMP_NODEDESC: u64 = 0x0000_8000;

/// Node types.
pub const NODE_TYPE_HFI: u8 = 1;
pub const NODE_TYPE_SWITCH: u8 = 2;

/// Fixed 64-byte node description string (NUL padded).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct NodeDescription(pub [u8; 64]);

impl NodeDescription {
    pub const WIRE_SIZE: usize = 64;

    pub fn from_str(s: &str) -> Self {
        let mut raw = [0u8; 64];
        let n = s.len().min(64);
        raw[..n].copy_from_slice(&s.as_bytes()[..n]);
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(64);
        std::str::from_utf8(&self.0[..end]).unwrap_or("")
    }

    pub fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_bytes(&self.0)
    }

    pub fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        Ok(Self(c.read_array()?))
    }
}

impl Default for NodeDescription {
    fn default() -> Self {
        Self([0u8; 64])
    }
}

impl std::fmt::Debug for NodeDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeDescription({:?})", self.as_str())
    }
}

/// Node identity block, 44 bytes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeInfo {
    pub base_version: u8,
    pub class_version: u8,
    pub node_type: u8,
    pub num_ports: u8,
    pub system_image_guid: u64,
    pub node_guid: u64,
    pub port_guid: u64,
    pub partition_cap: u16,
    pub device_id: u16,
    pub revision: u32,
    /// Packed local_port_num(8)/vendor_id(24) word, converted as a unit.
    pub local_port_num: u8,
    pub vendor_id: u32,
}

impl NodeInfo {
    pub const WIRE_SIZE: usize = 44;

    pub fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u8(self.base_version)?;
        c.write_u8(self.class_version)?;
        c.write_u8(self.node_type)?;
        c.write_u8(self.num_ports)?;
        c.write_zeros(4)?;
        c.write_u64_be(self.system_image_guid)?;
        c.write_u64_be(self.node_guid)?;
        c.write_u64_be(self.port_guid)?;
        c.write_u16_be(self.partition_cap)?;
        c.write_u16_be(self.device_id)?;
        c.write_u32_be(self.revision)?;
        let u1 = (u32::from(self.local_port_num) << 24) | (self.vendor_id & 0x00FF_FFFF);
        c.write_u32_be(u1)
    }

    pub fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let base_version = c.read_u8()?;
        let class_version = c.read_u8()?;
        let node_type = c.read_u8()?;
        let num_ports = c.read_u8()?;
        c.skip(4)?;
        let system_image_guid = c.read_u64_be()?;
        let node_guid = c.read_u64_be()?;
        let port_guid = c.read_u64_be()?;
        let partition_cap = c.read_u16_be()?;
        let device_id = c.read_u16_be()?;
        let revision = c.read_u32_be()?;
        let u1 = c.read_u32_be()?;
        Ok(Self {
            base_version,
            class_version,
            node_type,
            num_ports,
            system_image_guid,
            node_guid,
            port_guid,
            partition_cap,
            device_id,
            revision,
            local_port_num: (u1 >> 24) as u8,
            vendor_id: u1 & 0x00FF_FFFF,
        })
    }
}

/// Node record: 32-bit LID match key, node info, description. 116 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeRecord {
    pub lid: u32,
    pub node_info: NodeInfo,
    pub node_desc: NodeDescription,
}

impl SaRecord for NodeRecord {
    const ATTR_ID: u16 = attr::NODE_RECORD;
    const WIRE_SIZE: usize = 4 + 4 + NodeInfo::WIRE_SIZE + NodeDescription::WIRE_SIZE;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        c.write_zeros(4)?;
        self.node_info.encode(c)?;
        self.node_desc.encode(c)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        c.skip(4)?;
        let node_info = NodeInfo::decode(c)?;
        let node_desc = NodeDescription::decode(c)?;
        Ok(Self {
            lid,
            node_info,
            node_desc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NodeRecord {
        NodeRecord {
            lid: 3,
            node_info: NodeInfo {
                base_version: 0x80,
                class_version: 0x80,
                node_type: NODE_TYPE_HFI,
                num_ports: 1,
                system_image_guid: 0x0011_7501_0102_0304,
                node_guid: 0x0011_7501_0102_0305,
                port_guid: 0x0011_7501_0102_0306,
                partition_cap: 16,
                device_id: 0x24F0,
                revision: 2,
                local_port_num: 1,
                vendor_id: 0x001175,
            },
            node_desc: NodeDescription::from_str("host-042 hfi1_0"),
        }
    }

    #[test]
    fn test_node_record_wire_size() {
        assert_eq!(NodeRecord::WIRE_SIZE, 116);
        assert_eq!(NodeInfo::WIRE_SIZE, 44);
    }

    #[test]
    fn test_node_record_roundtrip() {
        let rec = sample();
        let wire = rec.to_wire().expect("Encode should succeed");
        assert_eq!(wire.len(), 116);
        let back = NodeRecord::from_wire(&wire).expect("Decode should succeed");
        assert_eq!(back, rec);
    }

    #[test]
    fn test_node_record_lid_is_big_endian() {
        let rec = sample();
        let wire = rec.to_wire().expect("Encode should succeed");
        assert_eq!(&wire[0..4], &[0, 0, 0, 3]);
    }

    #[test]
    fn test_vendor_id_group_packing() {
        // local_port_num and vendor_id share one 32-bit storage unit at
        // offset 48 of the record (40 within node info).
        let rec = sample();
        let wire = rec.to_wire().expect("Encode should succeed");
        let u1 = u32::from_be_bytes([wire[48], wire[49], wire[50], wire[51]]);
        assert_eq!(u1 >> 24, 1);
        assert_eq!(u1 & 0x00FF_FFFF, 0x001175);
    }

    #[test]
    fn test_node_desc_truncation_and_nul_padding() {
        let desc = NodeDescription::from_str("edge");
        assert_eq!(desc.as_str(), "edge");
        assert_eq!(desc.0[4], 0);

        let long = "x".repeat(80);
        let desc = NodeDescription::from_str(&long);
        assert_eq!(desc.as_str().len(), 64);
    }

    #[test]
    fn test_node_record_truncated_decode() {
        let wire = sample().to_wire().expect("Encode should succeed");
        assert!(NodeRecord::from_wire(&wire[..60]).is_err());
    }
}
