// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! 128-bit global identifiers.

use super::cursor::{Cursor, CursorMut};
use super::WireResult;

/// A 128-bit GID: subnet prefix in the high half, interface id in the low.
///
/// On the wire the two halves are independent big-endian u64s; they are
/// converted as whole units, never byte-reversed across the 16-byte span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gid {
    pub prefix: u64,
    pub interface_id: u64,
}

impl Gid {
    pub const WIRE_SIZE: usize = 16;

    pub fn new(prefix: u64, interface_id: u64) -> Self {
        Self {
            prefix,
            interface_id,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.prefix == 0 && self.interface_id == 0
    }

    pub fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u64_be(self.prefix)?;
        c.write_u64_be(self.interface_id)
    }

    pub fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        Ok(Self {
            prefix: c.read_u64_be()?,
            interface_id: c.read_u64_be()?,
        })
    }
}

impl std::fmt::Display for Gid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}:{:016x}", self.prefix, self.interface_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gid_wire_order() {
        let gid = Gid::new(0xFE80_0000_0000_0000, 0x0002_C902_0041_22F1);
        let mut buf = [0u8; 16];
        gid.encode(&mut CursorMut::new(&mut buf))
            .expect("Encode should succeed");
        assert_eq!(buf[0], 0xFE);
        assert_eq!(buf[1], 0x80);
        assert_eq!(buf[8], 0x00);
        assert_eq!(buf[15], 0xF1);

        let back = Gid::decode(&mut Cursor::new(&buf)).expect("Decode should succeed");
        assert_eq!(back, gid);
    }

    #[test]
    fn test_gid_display() {
        let gid = Gid::new(1, 2);
        assert_eq!(gid.to_string(), "0000000000000001:0000000000000002");
        assert!(!gid.is_zero());
        assert!(Gid::default().is_zero());
    }
}
