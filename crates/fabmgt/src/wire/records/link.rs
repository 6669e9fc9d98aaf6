// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Link records: one entry per physical link, 12 bytes.

use crate::wire::cursor::{Cursor, CursorMut};
use crate::wire::records::{attr, SaRecord};
use crate::wire::WireResult;

pub const COMP_FROM_LID: u64 = 0x0000_0001;
pub const COMP_FROM_PORT: u64 = 0x0000_0002;
pub const COMP_TO_PORT: u64 = 0x0000_0004;
pub const COMP_TO_LID: u64 = 0x0000_0010;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkRecord {
    pub from_lid: u32,
    pub from_port: u8,
    pub to_port: u8,
    pub to_lid: u32,
}

impl SaRecord for LinkRecord {
    const ATTR_ID: u16 = attr::LINK_RECORD;
    const WIRE_SIZE: usize = 12;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u32_be(self.from_lid)?;
        c.write_u8(self.from_port)?;
        c.write_u8(self.to_port)?;
        c.write_zeros(2)?;
        c.write_u32_be(self.to_lid)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let from_lid = c.read_u32_be()?;
        let from_port = c.read_u8()?;
        let to_port = c.read_u8()?;
        c.skip(2)?;
        let to_lid = c.read_u32_be()?;
        Ok(Self {
            from_lid,
            from_port,
            to_port,
            to_lid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_record_roundtrip() {
        let rec = LinkRecord {
            from_lid: 0x11,
            from_port: 3,
            to_port: 14,
            to_lid: 0x2002,
        };
        let wire = rec.to_wire().expect("Encode should succeed");
        assert_eq!(wire.len(), 12);
        assert_eq!(&wire[0..4], &[0, 0, 0, 0x11]);
        assert_eq!(wire[4], 3);
        assert_eq!(wire[5], 14);
        assert_eq!(&wire[8..12], &[0, 0, 0x20, 0x02]);
        let back = LinkRecord::from_wire(&wire).expect("Decode should succeed");
        assert_eq!(back, rec);
    }
}
