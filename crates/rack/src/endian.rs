// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte-order aware read/write cursors for message bodies.
//!
//! The byte order is chosen once per message (from its header when reading,
//! from what the writer declares when writing) and applies to every field.

use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder as _, LittleEndian};

/// Byte order of a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    #[default]
    Big,
    Little,
}

impl ByteOrder {
    /// Order every encoder writes in.
    pub const CANONICAL: ByteOrder = ByteOrder::Big;

    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }
}

/// Generate read methods for 4-byte primitives.
///
/// Checks bounds first so a short buffer never yields a partial value.
macro_rules! impl_read {
    ($name:ident, $type:ty, $be:path, $le:path) => {
        pub fn $name(&mut self) -> Result<$type> {
            let bytes = self.take(4)?;
            Ok(match self.order {
                ByteOrder::Big => $be(bytes),
                ByteOrder::Little => $le(bytes),
            })
        }
    };
}

/// Generate write methods for 4-byte primitives.
macro_rules! impl_write {
    ($name:ident, $type:ty, $be:path, $le:path) => {
        pub fn $name(&mut self, value: $type) {
            let start = self.buffer.len();
            self.buffer.resize(start + 4, 0);
            let slot = &mut self.buffer[start..];
            match self.order {
                ByteOrder::Big => $be(slot, value),
                ByteOrder::Little => $le(slot, value),
            }
        }
    };
}

/// Read cursor over a message body.
pub struct BodyReader<'a> {
    buffer: &'a [u8],
    offset: usize,
    order: ByteOrder,
}

impl<'a> BodyReader<'a> {
    pub fn new(buffer: &'a [u8], order: ByteOrder) -> Self {
        Self {
            buffer,
            offset: 0,
            order,
        }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if len > available {
            return Err(Error::TruncatedInput {
                needed: len,
                available,
            });
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// Fixed-length byte field, unaffected by byte order.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    impl_read!(read_i32, i32, BigEndian::read_i32, LittleEndian::read_i32);
    impl_read!(read_u32, u32, BigEndian::read_u32, LittleEndian::read_u32);
    impl_read!(read_f32, f32, BigEndian::read_f32, LittleEndian::read_f32);
}

/// Write cursor producing a message body.
pub struct BodyWriter {
    buffer: Vec<u8>,
    order: ByteOrder,
}

impl BodyWriter {
    pub fn new(order: ByteOrder) -> Self {
        Self::with_capacity(order, 0)
    }

    pub fn with_capacity(order: ByteOrder, capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            order,
        }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    impl_write!(write_i32, i32, BigEndian::write_i32, LittleEndian::write_i32);
    impl_write!(write_u32, u32, BigEndian::write_u32, LittleEndian::write_u32);
    impl_write!(write_f32, f32, BigEndian::write_f32, LittleEndian::write_f32);

    /// Raw bytes, copied as-is in either order.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}
