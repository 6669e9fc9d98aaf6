// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Service records, 184 bytes.

use crate::wire::cursor::{Cursor, CursorMut};
use crate::wire::gid::Gid;
use crate::wire::records::{attr, SaRecord};
use crate::wire::WireResult;

pub const COMP_SERVICE_ID: u64 = 0x0000_0001;
pub const COMP_SERVICE_LID: u64 = 0x0000_0002;
pub const COMP_SERVICE_PKEY: u64 = 0x0000_0004;
pub const COMP_SERVICE_GID: u64 = 0x0000_0010;
pub const COMP_SERVICE_LEASE: u64 = 0x0000_0020;
pub const COMP_SERVICE_KEY: u64 = 0x0000_0080;
pub const COMP_SERVICE_NAME: u64 = 0x0000_0100;

/// Lease value meaning "does not expire".
pub const LEASE_INFINITE: u32 = 0xFFFF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceRecord {
    pub service_id: u64,
    pub service_lid: u32,
    pub service_pkey: u16,
    pub service_gid: Gid,
    pub service_lease: u32,
    pub service_key: [u8; 16],
    pub service_name: [u8; 64],
    pub data8: [u8; 16],
    pub data16: [u16; 8],
    pub data32: [u32; 4],
    pub data64: [u64; 2],
}

impl Default for ServiceRecord {
    fn default() -> Self {
        Self {
            service_id: 0,
            service_lid: 0,
            service_pkey: 0,
            service_gid: Gid::default(),
            service_lease: 0,
            service_key: [0; 16],
            service_name: [0; 64],
            data8: [0; 16],
            data16: [0; 8],
            data32: [0; 4],
            data64: [0; 2],
        }
    }
}

impl ServiceRecord {
    pub fn name(&self) -> &str {
        let end = self
            .service_name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(64);
        std::str::from_utf8(&self.service_name[..end]).unwrap_or("")
    }
}

impl SaRecord for ServiceRecord {
    const ATTR_ID: u16 = attr::SERVICE_RECORD;
    const WIRE_SIZE: usize = 184;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u64_be(self.service_id)?;
        c.write_u32_be(self.service_lid)?;
        c.write_u16_be(self.service_pkey)?;
        c.write_zeros(2)?;
        self.service_gid.encode(c)?;
        c.write_u32_be(self.service_lease)?;
        c.write_zeros(4)?;
        c.write_bytes(&self.service_key)?;
        c.write_bytes(&self.service_name)?;
        c.write_bytes(&self.data8)?;
        for v in self.data16 {
            c.write_u16_be(v)?;
        }
        for v in self.data32 {
            c.write_u32_be(v)?;
        }
        for v in self.data64 {
            c.write_u64_be(v)?;
        }
        Ok(())
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let service_id = c.read_u64_be()?;
        let service_lid = c.read_u32_be()?;
        let service_pkey = c.read_u16_be()?;
        c.skip(2)?;
        let service_gid = Gid::decode(c)?;
        let service_lease = c.read_u32_be()?;
        c.skip(4)?;
        let service_key = c.read_array()?;
        let service_name = c.read_array()?;
        let data8 = c.read_array()?;
        let mut data16 = [0u16; 8];
        for v in &mut data16 {
            *v = c.read_u16_be()?;
        }
        let mut data32 = [0u32; 4];
        for v in &mut data32 {
            *v = c.read_u32_be()?;
        }
        let mut data64 = [0u64; 2];
        for v in &mut data64 {
            *v = c.read_u64_be()?;
        }
        Ok(Self {
            service_id,
            service_lid,
            service_pkey,
            service_gid,
            service_lease,
            service_key,
            service_name,
            data8,
            data16,
            data32,
            data64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_record_roundtrip() {
        let mut name = [0u8; 64];
        name[..11].copy_from_slice(b"fabric.psm2");
        let rec = ServiceRecord {
            service_id: 0x1000_1175_0000_0001,
            service_lid: 0x44,
            service_pkey: 0x8001,
            service_gid: Gid::new(0xFE80 << 48, 9),
            service_lease: LEASE_INFINITE,
            service_key: [7; 16],
            service_name: name,
            data16: [1, 2, 3, 4, 5, 6, 7, 8],
            data64: [u64::MAX, 0],
            ..ServiceRecord::default()
        };
        let wire = rec.to_wire().expect("Encode should succeed");
        assert_eq!(wire.len(), 184);
        let back = ServiceRecord::from_wire(&wire).expect("Decode should succeed");
        assert_eq!(back, rec);
        assert_eq!(back.name(), "fabric.psm2");
    }
}
