// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Trace records, 40 bytes.
//!
//! The administration service scrambles trace responses on the wire: every
//! byte after the record identifier generation is XORed with a fixed
//! 0x55 pattern. The decoder reverses the scramble before field conversion.

use crate::wire::cursor::{Cursor, CursorMut};
use crate::wire::records::{attr, SaRecord};
use crate::wire::WireResult;

/// Scramble pattern applied by the service to trace payloads.
pub const TRACE_SCRAMBLE_MASK: u32 = 0x5555_5555;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceRecord {
    pub id_generation: u16,
    pub node_type: u8,
    pub entry_port: u8,
    pub exit_port: u8,
    pub node_id: u64,
    pub chassis_id: u64,
    pub entry_port_id: u64,
    pub exit_port_id: u64,
}

impl SaRecord for TraceRecord {
    const ATTR_ID: u16 = attr::TRACE_RECORD;
    const WIRE_SIZE: usize = 40;

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u16_be(self.id_generation)?;
        c.write_zeros(1)?;
        c.write_u8(self.node_type)?;
        c.write_u8(self.entry_port)?;
        c.write_u8(self.exit_port)?;
        c.write_zeros(2)?;
        c.write_u64_be(self.node_id)?;
        c.write_u64_be(self.chassis_id)?;
        c.write_u64_be(self.entry_port_id)?;
        c.write_u64_be(self.exit_port_id)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let id_generation = c.read_u16_be()?;
        c.skip(1)?;
        let node_type = c.read_u8()?;
        let entry_port = c.read_u8()?;
        let exit_port = c.read_u8()?;
        c.skip(2)?;
        let node_id = c.read_u64_be()?;
        let chassis_id = c.read_u64_be()?;
        let entry_port_id = c.read_u64_be()?;
        let exit_port_id = c.read_u64_be()?;
        Ok(Self {
            id_generation,
            node_type,
            entry_port,
            exit_port,
            node_id,
            chassis_id,
            entry_port_id,
            exit_port_id,
        })
    }
}

/// Undo (or apply) the service's trace scramble in place.
///
/// The transform is an involution: applying it twice restores the input.
pub fn unscramble_trace(bytes: &mut [u8]) {
    for b in bytes.iter_mut() {
        *b ^= 0x55;
    }
}
