// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message header.
//!
//! ```text
//! 0....3: type (i32)
//! 4....7: total length, header + body (u32)
//! 8     : flags (bit 0 set = body little-endian)
//! 9     : priority
//! 10..11: sequence number (u16)
//! 12..15: destination address
//! 16..19: source address
//! ```
//!
//! Header fields are always big-endian. Only the body follows the byte order
//! declared in the flags.

use crate::endian::ByteOrder;
use crate::error::{Error, Result};
use crate::name::ModuleAddress;
use byteorder::{BigEndian, ByteOrder as _};
use std::fmt;

/// Size of the message header in bytes
pub const HEADER_SIZE: usize = 20;

const FLAG_BODY_LE: u8 = 0x01;

/// Message type code.
///
/// Positive values are commands, zero and negative values are replies.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MessageType(pub i32);

impl MessageType {
    pub const ON: Self = Self(1);
    pub const OFF: Self = Self(2);
    pub const GET_STATUS: Self = Self(3);
    pub const GET_DATA: Self = Self(4);
    pub const GET_CONT_DATA: Self = Self(6);
    pub const STOP_CONT_DATA: Self = Self(7);
    pub const GET_NEXT_DATA: Self = Self(8);
    pub const GET_PARAM: Self = Self(9);
    pub const SET_PARAM: Self = Self(10);

    pub const OK: Self = Self(0);
    pub const ERROR: Self = Self(-1);
    pub const TIMEOUT: Self = Self(-2);
    pub const NOT_AVAILABLE: Self = Self(-3);
    pub const ENABLED: Self = Self(-4);
    pub const DISABLED: Self = Self(-5);
    pub const DATA: Self = Self(-6);
    pub const CONT_DATA: Self = Self(-7);
    pub const PARAM: Self = Self(-9);

    pub const fn is_command(self) -> bool {
        self.0 > 0
    }

    fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::ON => "ON",
            Self::OFF => "OFF",
            Self::GET_STATUS => "GET_STATUS",
            Self::GET_DATA => "GET_DATA",
            Self::GET_CONT_DATA => "GET_CONT_DATA",
            Self::STOP_CONT_DATA => "STOP_CONT_DATA",
            Self::GET_NEXT_DATA => "GET_NEXT_DATA",
            Self::GET_PARAM => "GET_PARAM",
            Self::SET_PARAM => "SET_PARAM",
            Self::OK => "OK",
            Self::ERROR => "ERROR",
            Self::TIMEOUT => "TIMEOUT",
            Self::NOT_AVAILABLE => "NOT_AVAILABLE",
            Self::ENABLED => "ENABLED",
            Self::DISABLED => "DISABLED",
            Self::DATA => "DATA",
            Self::CONT_DATA => "CONT_DATA",
            Self::PARAM => "PARAM",
            _ => return None,
        })
    }
}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({})", name, self.0),
            None => write!(f, "MessageType({})", self.0),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Message header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub msg_type: MessageType,
    /// Header plus body length in bytes
    pub total_length: u32,
    /// Byte order of the body
    pub byte_order: ByteOrder,
    pub priority: u8,
    pub seq_nr: u16,
    pub dest: ModuleAddress,
    pub src: ModuleAddress,
}

impl MessageHeader {
    /// Header for a message carrying `body_len` bytes.
    pub fn new(
        msg_type: MessageType,
        body_len: usize,
        dest: ModuleAddress,
        src: ModuleAddress,
    ) -> Self {
        Self {
            msg_type,
            total_length: (HEADER_SIZE + body_len) as u32,
            byte_order: ByteOrder::CANONICAL,
            priority: 0,
            seq_nr: 0,
            dest,
            src,
        }
    }

    /// Body length implied by `total_length`, if it covers the header.
    pub fn body_len(&self) -> Option<usize> {
        (self.total_length as usize).checked_sub(HEADER_SIZE)
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        BigEndian::write_i32(&mut buf[0..4], self.msg_type.0);
        BigEndian::write_u32(&mut buf[4..8], self.total_length);
        buf[8] = match self.byte_order {
            ByteOrder::Big => 0,
            ByteOrder::Little => FLAG_BODY_LE,
        };
        buf[9] = self.priority;
        BigEndian::write_u16(&mut buf[10..12], self.seq_nr);
        BigEndian::write_u32(&mut buf[12..16], self.dest.raw());
        BigEndian::write_u32(&mut buf[16..20], self.src.raw());
        buf
    }

    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < HEADER_SIZE {
            return Err(Error::TruncatedInput {
                needed: HEADER_SIZE,
                available: buf.len(),
            });
        }
        buf[..HEADER_SIZE].copy_from_slice(&self.to_bytes());
        Ok(HEADER_SIZE)
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(Error::TruncatedInput {
                needed: HEADER_SIZE,
                available: buf.len(),
            });
        }

        let byte_order = if buf[8] & FLAG_BODY_LE != 0 {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        };

        Ok(Self {
            msg_type: MessageType(BigEndian::read_i32(&buf[0..4])),
            total_length: BigEndian::read_u32(&buf[4..8]),
            byte_order,
            priority: buf[9],
            seq_nr: BigEndian::read_u16(&buf[10..12]),
            dest: ModuleAddress::from_raw(BigEndian::read_u32(&buf[12..16])),
            src: ModuleAddress::from_raw(BigEndian::read_u32(&buf[16..20])),
        })
    }
}
