// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Table-shaped records: partition tables, SC/SL/VL maps, forwarding
//! databases, VL arbitration, buffer control and cable info.
//!
//! Blocks stay 64 bytes where the base fabric defined them that way; LIDs
//! are 32 bits throughout.

use crate::wire::cursor::{Cursor, CursorMut};
use crate::wire::records::{attr, SaRecord};
use crate::wire::WireResult;

/// Entries per partition-table block.
pub const PKEY_ELEMENTS_PER_BLOCK: usize = 32;
/// Service channels / lanes per map.
pub const MAX_SCS: usize = 32;
/// Entries per linear-forwarding block.
pub const LFT_ELEMENTS_PER_BLOCK: usize = 64;
/// Port masks per multicast-forwarding block.
pub const MFT_ELEMENTS_PER_BLOCK: usize = 8;
/// Port groups per port-group-table block.
pub const PGTB_ENTRIES_PER_BLOCK: usize = 8;
/// Entries per port-group forwarding block.
pub const PGFDB_ENTRIES_PER_BLOCK: usize = 64;
/// VL arbitration table length.
pub const VLARB_TABLE_LENGTH: usize = 128;
/// VLs covered by buffer control.
pub const MAX_VLS: usize = 32;
/// Cable info bytes per record.
pub const CABLE_INFO_DATA_SIZE: usize = 64;

// ---------------------------------------------------------------------------
// Partition table
// ---------------------------------------------------------------------------

pub const PKEYTABLE_COMP_LID: u64 = 0x0000_0001;
pub const PKEYTABLE_COMP_BLOCKNUM: u64 = 0x0000_0002;
pub const PKEYTABLE_COMP_PORTNUM: u64 = 0x0000_0004;

/// One 64-byte partition-table block, 72 bytes total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PKeyTableRecord {
    pub lid: u32,
    pub block_num: u16,
    pub port_num: u8,
    /// Each element packs membership(1)/base(15); converted as a unit.
    pub pkeys: [u16; PKEY_ELEMENTS_PER_BLOCK],
}

impl Default for PKeyTableRecord {
    fn default() -> Self {
        Self {
            lid: 0,
            block_num: 0,
            port_num: 0,
            pkeys: [0; PKEY_ELEMENTS_PER_BLOCK],
        }
    }
}

impl SaRecord for PKeyTableRecord {
    const ATTR_ID: u16 = attr::P_KEY_TABLE_RECORD;
    const WIRE_SIZE: usize = 8 + PKEY_ELEMENTS_PER_BLOCK * 2;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        c.write_u16_be(self.block_num)?;
        c.write_u8(self.port_num)?;
        c.write_zeros(1)?;
        for pk in self.pkeys {
            c.write_u16_be(pk)?;
        }
        Ok(())
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        let block_num = c.read_u16_be()?;
        let port_num = c.read_u8()?;
        c.skip(1)?;
        let mut pkeys = [0u16; PKEY_ELEMENTS_PER_BLOCK];
        for pk in &mut pkeys {
            *pk = c.read_u16_be()?;
        }
        Ok(Self {
            lid,
            block_num,
            port_num,
            pkeys,
        })
    }
}

// ---------------------------------------------------------------------------
// SC/SL/VL maps
// ---------------------------------------------------------------------------

pub const SCSC_COMP_LID: u64 = 0x0000_0001;
pub const SCSC_COMP_INPUTPORT: u64 = 0x0000_0002;
pub const SCSC_COMP_OUTPUTPORT: u64 = 0x0000_0004;
pub const SLSC_COMP_LID: u64 = 0x0000_0001;
pub const SCSL_COMP_LID: u64 = 0x0000_0001;
pub const SCVL_COMP_LID: u64 = 0x0000_0001;
pub const SCVL_COMP_PORT: u64 = 0x0000_0002;

/// SC-to-SC map for one input/output port pair, 40 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScMapRecord {
    pub lid: u32,
    pub input_port: u8,
    pub output_port: u8,
    pub map: [u8; MAX_SCS],
}

impl Default for ScMapRecord {
    fn default() -> Self {
        Self {
            lid: 0,
            input_port: 0,
            output_port: 0,
            map: [0; MAX_SCS],
        }
    }
}

impl SaRecord for ScMapRecord {
    const ATTR_ID: u16 = attr::SC_MAPTBL_RECORD;
    const WIRE_SIZE: usize = 8 + MAX_SCS;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        c.write_u8(self.input_port)?;
        c.write_u8(self.output_port)?;
        c.write_zeros(2)?;
        c.write_bytes(&self.map)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        let input_port = c.read_u8()?;
        let output_port = c.read_u8()?;
        c.skip(2)?;
        let map = c.read_array()?;
        Ok(Self {
            lid,
            input_port,
            output_port,
            map,
        })
    }
}

/// SL-to-SC map, 40 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlScTableRecord {
    pub lid: u32,
    pub map: [u8; MAX_SCS],
}

impl Default for SlScTableRecord {
    fn default() -> Self {
        Self {
            lid: 0,
            map: [0; MAX_SCS],
        }
    }
}

impl SaRecord for SlScTableRecord {
    const ATTR_ID: u16 = attr::SL2SC_MAPTBL_RECORD;
    const WIRE_SIZE: usize = 8 + MAX_SCS;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        c.write_zeros(4)?;
        c.write_bytes(&self.map)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        c.skip(4)?;
        let map = c.read_array()?;
        Ok(Self { lid, map })
    }
}

/// SC-to-SL map, 40 bytes. Same shape as [`SlScTableRecord`], its own
/// attribute id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScSlTableRecord {
    pub lid: u32,
    pub map: [u8; MAX_SCS],
}

impl Default for ScSlTableRecord {
    fn default() -> Self {
        Self {
            lid: 0,
            map: [0; MAX_SCS],
        }
    }
}

impl SaRecord for ScSlTableRecord {
    const ATTR_ID: u16 = attr::SC2SL_MAPTBL_RECORD;
    const WIRE_SIZE: usize = 8 + MAX_SCS;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        c.write_zeros(4)?;
        c.write_bytes(&self.map)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        c.skip(4)?;
        let map = c.read_array()?;
        Ok(Self { lid, map })
    }
}

/// SC-to-VL map for one port, 40 bytes. Serves both the VLt and VLnt
/// attributes; the dispatcher picks the attribute id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScVlTableRecord {
    pub lid: u32,
    pub port: u8,
    pub map: [u8; MAX_SCS],
}

impl Default for ScVlTableRecord {
    fn default() -> Self {
        Self {
            lid: 0,
            port: 0,
            map: [0; MAX_SCS],
        }
    }
}

impl SaRecord for ScVlTableRecord {
    const ATTR_ID: u16 = attr::SC2VL_T_MAPTBL_RECORD;
    const WIRE_SIZE: usize = 8 + MAX_SCS;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        c.write_u8(self.port)?;
        c.write_zeros(3)?;
        c.write_bytes(&self.map)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        let port = c.read_u8()?;
        c.skip(3)?;
        let map = c.read_array()?;
        Ok(Self { lid, port, map })
    }
}

// ---------------------------------------------------------------------------
// Forwarding databases
// ---------------------------------------------------------------------------

pub const LFT_COMP_LID: u64 = 0x0000_0001;
pub const LFT_COMP_BLOCKNUM: u64 = 0x0000_0004;
pub const MFT_COMP_LID: u64 = 0x0000_0001;
pub const MFT_COMP_POSITION: u64 = 0x0000_0002;
pub const MFT_COMP_BLOCKNUM: u64 = 0x0000_0008;
pub const PGTB_COMP_LID: u64 = 0x0000_0001;
pub const PGFDB_COMP_LID: u64 = 0x0000_0001;
pub const PGFDB_COMP_BLOCKNUM: u64 = 0x0000_0002;

/// One 64-entry linear forwarding block, 72 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearFdbRecord {
    pub lid: u32,
    /// Packed reserved(14)/block_num(18) word.
    pub block_num: u32,
    pub ports: [u8; LFT_ELEMENTS_PER_BLOCK],
}

impl Default for LinearFdbRecord {
    fn default() -> Self {
        Self {
            lid: 0,
            block_num: 0,
            ports: [0; LFT_ELEMENTS_PER_BLOCK],
        }
    }
}

impl SaRecord for LinearFdbRecord {
    const ATTR_ID: u16 = attr::LINEAR_FWDTBL_RECORD;
    const WIRE_SIZE: usize = 8 + LFT_ELEMENTS_PER_BLOCK;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        c.write_u32_be(self.block_num & 0x0003_FFFF)?;
        c.write_bytes(&self.ports)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        let block_num = c.read_u32_be()? & 0x0003_FFFF;
        let ports = c.read_array()?;
        Ok(Self {
            lid,
            block_num,
            ports,
        })
    }
}

/// One 8-mask multicast forwarding block, 72 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct McastFdbRecord {
    pub lid: u32,
    /// Packed position(2)/reserved(9)/block_num(21) word.
    pub position: u8,
    pub block_num: u32,
    pub port_masks: [u64; MFT_ELEMENTS_PER_BLOCK],
}

impl SaRecord for McastFdbRecord {
    const ATTR_ID: u16 = attr::MCAST_FWDTBL_RECORD;
    const WIRE_SIZE: usize = 8 + MFT_ELEMENTS_PER_BLOCK * 8;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        let u1 = (u32::from(self.position & 0x3) << 30) | (self.block_num & 0x001F_FFFF);
        c.write_u32_be(u1)?;
        for mask in self.port_masks {
            c.write_u64_be(mask)?;
        }
        Ok(())
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        let u1 = c.read_u32_be()?;
        let mut port_masks = [0u64; MFT_ELEMENTS_PER_BLOCK];
        for mask in &mut port_masks {
            *mask = c.read_u64_be()?;
        }
        Ok(Self {
            lid,
            position: (u1 >> 30) as u8,
            block_num: u1 & 0x001F_FFFF,
            port_masks,
        })
    }
}

/// Port-group membership block, 72 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortGroupRecord {
    pub lid: u32,
    /// Packed position(2)/reserved(9)/block_num(5) halfword.
    pub position: u8,
    pub block_num: u8,
    pub group_masks: [u64; PGTB_ENTRIES_PER_BLOCK],
}

impl SaRecord for PortGroupRecord {
    const ATTR_ID: u16 = attr::PORTGROUP_TABLE_RECORD;
    const WIRE_SIZE: usize = 8 + PGTB_ENTRIES_PER_BLOCK * 8;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        let u1 = (u16::from(self.position & 0x3) << 14) | u16::from(self.block_num & 0x1F);
        c.write_u16_be(u1)?;
        c.write_zeros(2)?;
        for mask in self.group_masks {
            c.write_u64_be(mask)?;
        }
        Ok(())
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        let u1 = c.read_u16_be()?;
        c.skip(2)?;
        let mut group_masks = [0u64; PGTB_ENTRIES_PER_BLOCK];
        for mask in &mut group_masks {
            *mask = c.read_u64_be()?;
        }
        Ok(Self {
            lid,
            position: (u1 >> 14) as u8,
            block_num: (u1 & 0x1F) as u8,
            group_masks,
        })
    }
}

/// Port-group forwarding block, 72 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortGroupFwdRecord {
    pub lid: u32,
    /// Packed reserved(14)/block_num(18) word.
    pub block_num: u32,
    pub entries: [u8; PGFDB_ENTRIES_PER_BLOCK],
}

impl Default for PortGroupFwdRecord {
    fn default() -> Self {
        Self {
            lid: 0,
            block_num: 0,
            entries: [0; PGFDB_ENTRIES_PER_BLOCK],
        }
    }
}

impl SaRecord for PortGroupFwdRecord {
    const ATTR_ID: u16 = attr::PGROUP_FWDTBL_RECORD;
    const WIRE_SIZE: usize = 8 + PGFDB_ENTRIES_PER_BLOCK;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        c.write_u32_be(self.block_num & 0x0003_FFFF)?;
        c.write_bytes(&self.entries)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        let block_num = c.read_u32_be()? & 0x0003_FFFF;
        let entries = c.read_array()?;
        Ok(Self {
            lid,
            block_num,
            entries,
        })
    }
}

// ---------------------------------------------------------------------------
// VL arbitration, buffer control, cable info
// ---------------------------------------------------------------------------

pub const VLARB_COMP_LID: u64 = 0x0000_0001;
pub const VLARB_COMP_OUTPORTNUM: u64 = 0x0000_0002;
pub const VLARB_COMP_BLOCKNUM: u64 = 0x0000_0004;
pub const BFCTRL_COMP_LID: u64 = 0x0000_0001;
pub const BFCTRL_COMP_PORT: u64 = 0x0000_0002;
pub const CIR_COMP_LID: u64 = 0x0000_0001;
pub const CIR_COMP_PORT: u64 = 0x0000_0002;

/// VL arbitration table sections addressed by `block_num`.
pub const VLARB_LOW_ELEMENTS: u8 = 0;
pub const VLARB_HIGH_ELEMENTS: u8 = 1;
pub const VLARB_PREEMPT_ELEMENTS: u8 = 2;
pub const VLARB_PREEMPT_MATRIX: u8 = 3;

/// VL arbitration block, 264 bytes: 128 (vl, weight) elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VlArbTableRecord {
    pub lid: u32,
    pub output_port: u8,
    pub block_num: u8,
    /// Each element packs reserved(3)/vl(5) with its weight byte.
    pub elements: [(u8, u8); VLARB_TABLE_LENGTH],
}

impl Default for VlArbTableRecord {
    fn default() -> Self {
        Self {
            lid: 0,
            output_port: 0,
            block_num: 0,
            elements: [(0, 0); VLARB_TABLE_LENGTH],
        }
    }
}

impl SaRecord for VlArbTableRecord {
    const ATTR_ID: u16 = attr::VLARBTABLE_RECORD;
    const WIRE_SIZE: usize = 8 + VLARB_TABLE_LENGTH * 2;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        c.write_u8(self.output_port)?;
        c.write_u8(self.block_num)?;
        c.write_zeros(2)?;
        for (vl, weight) in self.elements {
            c.write_u8(vl & 0x1F)?;
            c.write_u8(weight)?;
        }
        Ok(())
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        let output_port = c.read_u8()?;
        let block_num = c.read_u8()?;
        c.skip(2)?;
        let mut elements = [(0u8, 0u8); VLARB_TABLE_LENGTH];
        for el in &mut elements {
            let vl = c.read_u8()? & 0x1F;
            let weight = c.read_u8()?;
            *el = (vl, weight);
        }
        Ok(Self {
            lid,
            output_port,
            block_num,
            elements,
        })
    }
}

/// Buffer control table, 140 bytes: overall limit plus per-VL limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferControlTableRecord {
    pub lid: u32,
    pub port: u8,
    pub tx_overall_shared_limit: u16,
    /// (dedicated, shared) limits per VL.
    pub vl_limits: [(u16, u16); MAX_VLS],
}

impl Default for BufferControlTableRecord {
    fn default() -> Self {
        Self {
            lid: 0,
            port: 0,
            tx_overall_shared_limit: 0,
            vl_limits: [(0, 0); MAX_VLS],
        }
    }
}

impl SaRecord for BufferControlTableRecord {
    const ATTR_ID: u16 = attr::BUFF_CTRL_TAB_RECORD;
    const WIRE_SIZE: usize = 8 + 4 + MAX_VLS * 4;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        c.write_u8(self.port)?;
        c.write_zeros(3)?;
        c.write_zeros(2)?;
        c.write_u16_be(self.tx_overall_shared_limit)?;
        for (dedicated, shared) in self.vl_limits {
            c.write_u16_be(dedicated)?;
            c.write_u16_be(shared)?;
        }
        Ok(())
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        let port = c.read_u8()?;
        c.skip(3)?;
        c.skip(2)?;
        let tx_overall_shared_limit = c.read_u16_be()?;
        let mut vl_limits = [(0u16, 0u16); MAX_VLS];
        for vl in &mut vl_limits {
            let dedicated = c.read_u16_be()?;
            let shared = c.read_u16_be()?;
            *vl = (dedicated, shared);
        }
        Ok(Self {
            lid,
            port,
            tx_overall_shared_limit,
            vl_limits,
        })
    }
}

/// Cable info block, 72 bytes: 64 bytes of cable EEPROM at an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CableInfoRecord {
    pub lid: u32,
    pub port: u8,
    /// Packed length(7)/reserved(1) byte.
    pub length: u8,
    /// Packed address(12)/port_type(4) halfword.
    pub address: u16,
    pub port_type: u8,
    pub data: [u8; CABLE_INFO_DATA_SIZE],
}

impl Default for CableInfoRecord {
    fn default() -> Self {
        Self {
            lid: 0,
            port: 0,
            length: 0,
            address: 0,
            port_type: 0,
            data: [0; CABLE_INFO_DATA_SIZE],
        }
    }
}

impl SaRecord for CableInfoRecord {
    const ATTR_ID: u16 = attr::CABLE_INFO_RECORD;
    const WIRE_SIZE: usize = 8 + CABLE_INFO_DATA_SIZE;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        c.write_u8(self.port)?;
        c.write_u8((self.length & 0x7F) << 1)?;
        let u1 = ((self.address & 0x0FFF) << 4) | u16::from(self.port_type & 0xF);
        c.write_u16_be(u1)?;
        c.write_bytes(&self.data)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        let port = c.read_u8()?;
        let len_byte = c.read_u8()?;
        let u1 = c.read_u16_be()?;
        let data = c.read_array()?;
        Ok(Self {
            lid,
            port,
            length: len_byte >> 1,
            address: u1 >> 4,
            port_type: (u1 & 0xF) as u8,
            data,
        })
    }
}
