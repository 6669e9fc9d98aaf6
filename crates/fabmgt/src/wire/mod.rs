// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Big-endian MAD/SA wire codec.
//!
//! Management datagrams are network byte order on the wire. This module is
//! pure and stateless: byte slices in, typed records out, and back.

pub mod cursor;
pub mod gid;
pub mod mad;
pub mod mask;
pub mod records;

pub use cursor::{Cursor, CursorMut};
pub use gid::Gid;
pub use mad::{MadHeader, MadStatus, SaHeader, SA_HEADER_SIZE};
pub use mask::ComponentMask;
pub use records::SaRecord;

use std::fmt;

/// Codec error used within `wire`.
#[derive(Debug, Clone)]
pub enum WireError {
    EncodeFailed { reason: String },
    DecodeFailed { reason: String },
    WriteFailed { offset: usize, reason: String },
    ReadFailed { offset: usize, reason: String },
    Truncated { need: usize, have: usize },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::EncodeFailed { reason } => write!(f, "encode failed: {}", reason),
            WireError::DecodeFailed { reason } => write!(f, "decode failed: {}", reason),
            WireError::WriteFailed { offset, reason } => {
                write!(f, "write failed at offset {}: {}", offset, reason)
            }
            WireError::ReadFailed { offset, reason } => {
                write!(f, "read failed at offset {}: {}", offset, reason)
            }
            WireError::Truncated { need, have } => {
                write!(f, "truncated buffer: need {} bytes, have {}", need, have)
            }
        }
    }
}

impl std::error::Error for WireError {}

impl From<WireError> for crate::Error {
    fn from(_: WireError) -> Self {
        crate::Error::InvalidProtocol
    }
}

pub type WireResult<T> = core::result::Result<T, WireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_error_display_variants() {
        let err = WireError::ReadFailed {
            offset: 4,
            reason: "unexpected end of buffer".into(),
        };
        assert_eq!(
            format!("{}", err),
            "read failed at offset 4: unexpected end of buffer"
        );

        let err = WireError::Truncated { need: 56, have: 12 };
        assert_eq!(format!("{}", err), "truncated buffer: need 56 bytes, have 12");
    }

    #[test]
    fn test_wire_error_into_api_error() {
        let api_err: crate::Error = WireError::DecodeFailed {
            reason: "bad payload".into(),
        }
        .into();
        match api_err {
            crate::Error::InvalidProtocol => {}
            other => panic!("unexpected api error {:?}", other),
        }
    }
}
