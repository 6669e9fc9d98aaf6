// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Read/write cursors for MAD buffer manipulation.
//!
//! All multi-byte fields on the wire are big-endian. Host bitfield layout is
//! never relied on; packed sub-byte groups are read/written as their whole
//! storage unit and split by the record codecs.

use super::{WireError, WireResult};

/// Generate write methods for primitive types (eliminates code duplication)
///
/// Each generated method:
/// 1. Checks buffer bounds (returns `WireError::WriteFailed` if overflow)
/// 2. Converts value to big-endian bytes via `to_be_bytes()`
/// 3. Copies bytes to buffer
/// 4. Advances offset
macro_rules! impl_write_be {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self, value: $type) -> WireResult<()> {
            if self.offset + $size > self.buffer.len() {
                return Err(WireError::WriteFailed {
                    offset: self.offset,
                    reason: "buffer too small".into(),
                });
            }
            let bytes = value.to_be_bytes();
            self.buffer[self.offset..self.offset + $size].copy_from_slice(&bytes);
            self.offset += $size;
            Ok(())
        }
    };
}

/// Generate read methods for primitive types (eliminates code duplication)
///
/// Each generated method:
/// 1. Checks buffer bounds (returns `WireError::ReadFailed` if overflow)
/// 2. Reads N bytes from buffer
/// 3. Converts bytes to value via `from_be_bytes()`
/// 4. Advances offset
macro_rules! impl_read_be {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> WireResult<$type> {
            if self.offset + $size > self.buffer.len() {
                return Err(WireError::ReadFailed {
                    offset: self.offset,
                    reason: "unexpected end of buffer".into(),
                });
            }
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(&self.buffer[self.offset..self.offset + $size]);
            self.offset += $size;
            Ok(<$type>::from_be_bytes(bytes))
        }
    };
}

/// Generate common cursor methods (offset, remaining, skip)
macro_rules! impl_cursor_common {
    ($error_variant:ident, $skip_err_msg:expr) => {
        pub fn offset(&self) -> usize {
            self.offset
        }

        pub fn remaining(&self) -> usize {
            self.buffer.len().saturating_sub(self.offset)
        }

        /// Advance over `n` bytes without interpreting them.
        pub fn skip(&mut self, n: usize) -> WireResult<()> {
            if self.offset + n > self.buffer.len() {
                return Err(WireError::$error_variant {
                    offset: self.offset,
                    reason: $skip_err_msg.into(),
                });
            }
            self.offset += n;
            Ok(())
        }
    };
}

/// Mutable cursor for writing (bounds-checked, zero-copy)
pub struct CursorMut<'a> {
    buffer: &'a mut [u8],
    offset: usize,
}

impl<'a> CursorMut<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_write_be!(write_u8, u8, 1);
    impl_write_be!(write_u16_be, u16, 2);
    impl_write_be!(write_u32_be, u32, 4);
    impl_write_be!(write_u64_be, u64, 8);

    pub fn write_i32_be(&mut self, value: i32) -> WireResult<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> WireResult<()> {
        if self.offset + data.len() > self.buffer.len() {
            return Err(WireError::WriteFailed {
                offset: self.offset,
                reason: "buffer too small".into(),
            });
        }
        self.buffer[self.offset..self.offset + data.len()].copy_from_slice(data);
        self.offset += data.len();
        Ok(())
    }

    /// Write `n` zero bytes (reserved fields).
    pub fn write_zeros(&mut self, n: usize) -> WireResult<()> {
        if self.offset + n > self.buffer.len() {
            return Err(WireError::WriteFailed {
                offset: self.offset,
                reason: "buffer too small".into(),
            });
        }
        self.buffer[self.offset..self.offset + n].fill(0);
        self.offset += n;
        Ok(())
    }

    impl_cursor_common!(WriteFailed, "buffer too small");
}

/// Immutable cursor for reading (bounds-checked, zero-copy)
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_read_be!(read_u8, u8, 1);
    impl_read_be!(read_u16_be, u16, 2);
    impl_read_be!(read_u32_be, u32, 4);
    impl_read_be!(read_u64_be, u64, 8);

    pub fn read_i32_be(&mut self) -> WireResult<i32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.read_bytes(4)?);
        Ok(i32::from_be_bytes(buf))
    }

    pub fn read_bytes(&mut self, len: usize) -> WireResult<&'a [u8]> {
        if self.offset + len > self.buffer.len() {
            return Err(WireError::ReadFailed {
                offset: self.offset,
                reason: "unexpected end of buffer".into(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// Read a fixed-size byte array (node descriptions, service keys).
    pub fn read_array<const N: usize>(&mut self) -> WireResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    impl_cursor_common!(ReadFailed, "unexpected end of buffer");

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_U16: u16 = 0xCDEF;
    const TEST_U32: u32 = 0x1234_5678;
    const TEST_U64: u64 = 0x1122_3344_5566_7788;

    #[test]
    fn test_cursor_mut_write_overflow_reports_offset() {
        let mut buffer = [0u8; 2];
        let mut cursor = CursorMut::new(&mut buffer);
        cursor
            .write_u16_be(TEST_U16)
            .expect("Write u16 should succeed");

        let err = cursor.write_u8(0xFF).unwrap_err();
        match err {
            WireError::WriteFailed { offset, reason } => {
                assert_eq!(offset, 2);
                assert_eq!(reason, "buffer too small");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_cursor_read_overflow_reports_offset() {
        let buffer = [0u8; 1];
        let mut cursor = Cursor::new(&buffer);
        assert_eq!(cursor.read_u8().expect("Read u8 should succeed"), 0);

        let err = cursor.read_u8().unwrap_err();
        match err {
            WireError::ReadFailed { offset, reason } => {
                assert_eq!(offset, 1);
                assert_eq!(reason, "unexpected end of buffer");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_big_endian_byte_order_on_wire() {
        let mut buffer = [0u8; 16];
        let mut cursor = CursorMut::new(&mut buffer);
        cursor.write_u32_be(3).expect("Write u32 should succeed");
        cursor
            .write_u16_be(0x0102)
            .expect("Write u16 should succeed");
        // Network byte order: most significant byte first.
        assert_eq!(&buffer[0..4], &[0x00, 0x00, 0x00, 0x03]);
        assert_eq!(&buffer[4..6], &[0x01, 0x02]);
    }

    #[test]
    fn test_cursor_roundtrip_across_numeric_types() {
        let mut buffer = [0u8; 64];
        let mut writer = CursorMut::new(&mut buffer);
        writer.write_u8(0xAB).expect("Write u8 should succeed");
        writer
            .write_u16_be(TEST_U16)
            .expect("Write u16 should succeed");
        writer
            .write_u32_be(TEST_U32)
            .expect("Write u32 should succeed");
        writer
            .write_u64_be(TEST_U64)
            .expect("Write u64 should succeed");
        writer.write_i32_be(-42).expect("Write i32 should succeed");
        writer.write_zeros(3).expect("Write zeros should succeed");
        writer
            .write_bytes(&[1, 2, 3, 4])
            .expect("Write bytes should succeed");
        let written = writer.offset();

        let mut reader = Cursor::new(&buffer);
        assert_eq!(reader.read_u8().expect("Read u8 should succeed"), 0xAB);
        assert_eq!(
            reader.read_u16_be().expect("Read u16 should succeed"),
            TEST_U16
        );
        assert_eq!(
            reader.read_u32_be().expect("Read u32 should succeed"),
            TEST_U32
        );
        assert_eq!(
            reader.read_u64_be().expect("Read u64 should succeed"),
            TEST_U64
        );
        assert_eq!(reader.read_i32_be().expect("Read i32 should succeed"), -42);
        reader.skip(3).expect("Skip should succeed");
        assert_eq!(
            reader.read_bytes(4).expect("Read bytes should succeed"),
            &[1, 2, 3, 4]
        );
        assert_eq!(reader.remaining(), buffer.len() - written);
    }

    #[test]
    fn test_skip_overflow() {
        let buffer = [0u8; 2];
        let mut cursor = Cursor::new(&buffer);
        cursor.read_u16_be().expect("Read u16 should succeed");
        let err = cursor.skip(8).unwrap_err();
        match err {
            WireError::ReadFailed { offset, .. } => assert_eq!(offset, 2),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_read_array() {
        let buffer = [9u8, 8, 7, 6, 5];
        let mut cursor = Cursor::new(&buffer);
        let arr: [u8; 4] = cursor.read_array().expect("Read array should succeed");
        assert_eq!(arr, [9, 8, 7, 6]);
        assert_eq!(cursor.remaining(), 1);
    }
}
