// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Congestion-control records.

use crate::wire::cursor::{Cursor, CursorMut};
use crate::wire::records::{attr, SaRecord};
use crate::wire::WireResult;

pub const CONG_COMP_LID: u64 = 0x0000_0001;
pub const SWCONG_COMP_LID: u64 = 0x0000_0001;
pub const SWPORTCONG_COMP_LID: u64 = 0x0000_0001;
pub const SWPORTCONG_COMP_PORT: u64 = 0x0000_0002;
pub const HFICONG_COMP_LID: u64 = 0x0000_0001;
pub const HFICONGCTRL_COMP_LID: u64 = 0x0000_0001;
pub const HFICONGCTRL_COMP_BLOCK: u64 = 0x0000_0002;

/// Service levels covered by the HFI congestion setting.
pub const MAX_SLS: usize = 32;
/// Entries per congestion-control table block.
pub const CCT_BLOCK_ENTRIES: usize = 64;

/// Congestion capability summary, 12 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CongestionInfoRecord {
    pub lid: u32,
    pub congestion_info: u16,
    pub control_table_cap: u8,
    pub congestion_log_length: u8,
}

impl SaRecord for CongestionInfoRecord {
    const ATTR_ID: u16 = attr::CONGESTION_INFO_RECORD;
    const WIRE_SIZE: usize = 12;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        c.write_zeros(4)?;
        c.write_u16_be(self.congestion_info)?;
        c.write_u8(self.control_table_cap)?;
        c.write_u8(self.congestion_log_length)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        c.skip(4)?;
        let congestion_info = c.read_u16_be()?;
        let control_table_cap = c.read_u8()?;
        let congestion_log_length = c.read_u8()?;
        Ok(Self {
            lid,
            congestion_info,
            control_table_cap,
            congestion_log_length,
        })
    }
}

/// Switch congestion setting, 84 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchCongRecord {
    pub lid: u32,
    pub control_map: u32,
    pub victim_mask: [u8; 32],
    pub credit_mask: [u8; 32],
    /// Packed threshold(4)/reserved(4) byte.
    pub threshold: u8,
    pub packet_size: u8,
    /// Packed cs_threshold(4)/reserved(4) byte.
    pub cs_threshold: u8,
    pub cs_return_delay: u16,
    pub marking_rate: u16,
}

impl Default for SwitchCongRecord {
    fn default() -> Self {
        Self {
            lid: 0,
            control_map: 0,
            victim_mask: [0; 32],
            credit_mask: [0; 32],
            threshold: 0,
            packet_size: 0,
            cs_threshold: 0,
            cs_return_delay: 0,
            marking_rate: 0,
        }
    }
}

impl SaRecord for SwitchCongRecord {
    const ATTR_ID: u16 = attr::SWITCH_CONG_RECORD;
    const WIRE_SIZE: usize = 84;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        c.write_zeros(4)?;
        c.write_u32_be(self.control_map)?;
        c.write_bytes(&self.victim_mask)?;
        c.write_bytes(&self.credit_mask)?;
        c.write_u8((self.threshold & 0xF) << 4)?;
        c.write_u8(self.packet_size)?;
        c.write_u8((self.cs_threshold & 0xF) << 4)?;
        c.write_zeros(1)?;
        c.write_u16_be(self.cs_return_delay)?;
        c.write_u16_be(self.marking_rate)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        c.skip(4)?;
        let control_map = c.read_u32_be()?;
        let victim_mask = c.read_array()?;
        let credit_mask = c.read_array()?;
        let threshold = c.read_u8()? >> 4;
        let packet_size = c.read_u8()?;
        let cs_threshold = c.read_u8()? >> 4;
        c.skip(1)?;
        let cs_return_delay = c.read_u16_be()?;
        let marking_rate = c.read_u16_be()?;
        Ok(Self {
            lid,
            control_map,
            victim_mask,
            credit_mask,
            threshold,
            packet_size,
            cs_threshold,
            cs_return_delay,
            marking_rate,
        })
    }
}

/// Per-port switch congestion element, 12 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwitchPortCongRecord {
    pub lid: u32,
    pub port: u8,
    /// Packed valid(1)/control_type(1)/reserved(2)/threshold(4) byte.
    pub valid: bool,
    pub control_type: u8,
    pub threshold: u8,
    pub packet_size: u8,
    pub marking_rate: u16,
}

impl SaRecord for SwitchPortCongRecord {
    const ATTR_ID: u16 = attr::SWITCH_PORT_CONG_RECORD;
    const WIRE_SIZE: usize = 12;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        c.write_u8(self.port)?;
        c.write_zeros(3)?;
        let u1 = (u8::from(self.valid) << 7)
            | ((self.control_type & 0x1) << 6)
            | (self.threshold & 0xF);
        c.write_u8(u1)?;
        c.write_u8(self.packet_size)?;
        c.write_u16_be(self.marking_rate)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        let port = c.read_u8()?;
        c.skip(3)?;
        let u1 = c.read_u8()?;
        let packet_size = c.read_u8()?;
        let marking_rate = c.read_u16_be()?;
        Ok(Self {
            lid,
            port,
            valid: u1 & 0x80 != 0,
            control_type: (u1 >> 6) & 0x1,
            threshold: u1 & 0xF,
            packet_size,
            marking_rate,
        })
    }
}

/// One HFI congestion setting entry, 6 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HfiCongEntry {
    pub ccti_increase: u8,
    pub ccti_timer: u16,
    pub trigger_threshold: u8,
    pub ccti_min: u8,
}

/// HFI congestion setting, 206 bytes: control words plus one entry per SL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HfiCongRecord {
    pub lid: u32,
    pub control_map: u32,
    pub port_control: u16,
    pub entries: [HfiCongEntry; MAX_SLS],
}

impl Default for HfiCongRecord {
    fn default() -> Self {
        Self {
            lid: 0,
            control_map: 0,
            port_control: 0,
            entries: [HfiCongEntry::default(); MAX_SLS],
        }
    }
}

impl SaRecord for HfiCongRecord {
    const ATTR_ID: u16 = attr::HFI_CONG_RECORD;
    const WIRE_SIZE: usize = 8 + 4 + 2 + MAX_SLS * 6;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        c.write_zeros(4)?;
        c.write_u32_be(self.control_map)?;
        c.write_u16_be(self.port_control)?;
        for e in &self.entries {
            c.write_u8(e.ccti_increase)?;
            c.write_zeros(1)?;
            c.write_u16_be(e.ccti_timer)?;
            c.write_u8(e.trigger_threshold)?;
            c.write_u8(e.ccti_min)?;
        }
        Ok(())
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        c.skip(4)?;
        let control_map = c.read_u32_be()?;
        let port_control = c.read_u16_be()?;
        let mut entries = [HfiCongEntry::default(); MAX_SLS];
        for e in &mut entries {
            let ccti_increase = c.read_u8()?;
            c.skip(1)?;
            let ccti_timer = c.read_u16_be()?;
            let trigger_threshold = c.read_u8()?;
            let ccti_min = c.read_u8()?;
            *e = HfiCongEntry {
                ccti_increase,
                ccti_timer,
                trigger_threshold,
                ccti_min,
            };
        }
        Ok(Self {
            lid,
            control_map,
            port_control,
            entries,
        })
    }
}

/// One congestion-control table block, 138 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HfiCongCtrlRecord {
    pub lid: u32,
    pub block_num: u16,
    pub ccti_limit: u16,
    /// Each entry packs shift(2)/multiplier(14); converted as a unit.
    pub entries: [u16; CCT_BLOCK_ENTRIES],
}

impl Default for HfiCongCtrlRecord {
    fn default() -> Self {
        Self {
            lid: 0,
            block_num: 0,
            ccti_limit: 0,
            entries: [0; CCT_BLOCK_ENTRIES],
        }
    }
}

impl SaRecord for HfiCongCtrlRecord {
    const ATTR_ID: u16 = attr::HFI_CONG_CTRL_RECORD;
    const WIRE_SIZE: usize = 8 + 2 + CCT_BLOCK_ENTRIES * 2;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.lid)?;
        c.write_u16_be(self.block_num)?;
        c.write_zeros(2)?;
        c.write_u16_be(self.ccti_limit)?;
        for e in self.entries {
            c.write_u16_be(e)?;
        }
        Ok(())
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let lid = c.read_u32_be()?;
        let block_num = c.read_u16_be()?;
        c.skip(2)?;
        let ccti_limit = c.read_u16_be()?;
        let mut entries = [0u16; CCT_BLOCK_ENTRIES];
        for e in &mut entries {
            *e = c.read_u16_be()?;
        }
        Ok(Self {
            lid,
            block_num,
            ccti_limit,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_sizes() {
        assert_eq!(CongestionInfoRecord::WIRE_SIZE, 12);
        assert_eq!(SwitchCongRecord::WIRE_SIZE, 84);
        assert_eq!(SwitchPortCongRecord::WIRE_SIZE, 12);
        assert_eq!(HfiCongRecord::WIRE_SIZE, 206);
        assert_eq!(HfiCongCtrlRecord::WIRE_SIZE, 138);
    }

    #[test]
    fn test_congestion_info_roundtrip() {
        let rec = CongestionInfoRecord {
            lid: 0x60,
            congestion_info: 0x1,
            control_table_cap: 14,
            congestion_log_length: 96,
        };
        let wire = rec.to_wire().expect("Encode should succeed");
        let back = CongestionInfoRecord::from_wire(&wire).expect("Decode should succeed");
        assert_eq!(back, rec);
    }

    #[test]
    fn test_switch_cong_threshold_nibbles() {
        let rec = SwitchCongRecord {
            lid: 1,
            threshold: 0xA,
            cs_threshold: 0x5,
            ..SwitchCongRecord::default()
        };
        let wire = rec.to_wire().expect("Encode should succeed");
        // Thresholds occupy the high nibble of their bytes.
        assert_eq!(wire[76], 0xA0);
        assert_eq!(wire[78], 0x50);
        let back = SwitchCongRecord::from_wire(&wire).expect("Decode should succeed");
        assert_eq!(back, rec);
    }

    #[test]
    fn test_switch_port_cong_roundtrip() {
        let rec = SwitchPortCongRecord {
            lid: 5,
            port: 3,
            valid: true,
            control_type: 1,
            threshold: 9,
            packet_size: 4,
            marking_rate: 800,
        };
        let wire = rec.to_wire().expect("Encode should succeed");
        let back = SwitchPortCongRecord::from_wire(&wire).expect("Decode should succeed");
        assert_eq!(back, rec);
    }

    #[test]
    fn test_hfi_cong_roundtrip() {
        let mut rec = HfiCongRecord {
            lid: 7,
            control_map: 0x1,
            port_control: 0x1,
            ..HfiCongRecord::default()
        };
        rec.entries[4] = HfiCongEntry {
            ccti_increase: 1,
            ccti_timer: 150,
            trigger_threshold: 8,
            ccti_min: 0,
        };
        let wire = rec.to_wire().expect("Encode should succeed");
        let back = HfiCongRecord::from_wire(&wire).expect("Decode should succeed");
        assert_eq!(back, rec);
    }

    #[test]
    fn test_hfi_cong_ctrl_roundtrip() {
        let mut rec = HfiCongCtrlRecord {
            lid: 7,
            block_num: 2,
            ccti_limit: 127,
            ..HfiCongCtrlRecord::default()
        };
        rec.entries[0] = (1 << 14) | 300;
        let wire = rec.to_wire().expect("Encode should succeed");
        let back = HfiCongCtrlRecord::from_wire(&wire).expect("Decode should succeed");
        assert_eq!(back, rec);
    }
}
