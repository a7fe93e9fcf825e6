// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Raw messages: a header plus the undecoded body bytes.

use super::body::{Body, BodyKind};
use super::codec::{self, MessageCodec};
use super::header::{MessageHeader, MessageType, HEADER_SIZE};
use crate::endian::{BodyWriter, ByteOrder};
use crate::error::{Error, Result};
use crate::name::ModuleAddress;

/// Message as it travels over the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub header: MessageHeader,
    pub body: Vec<u8>,
}

impl RawMessage {
    /// Body-less message (commands, acknowledgements, status replies).
    pub fn command(msg_type: MessageType, dest: ModuleAddress, src: ModuleAddress) -> Self {
        Self {
            header: MessageHeader::new(msg_type, 0, dest, src),
            body: Vec::new(),
        }
    }

    /// Message carrying `body`, encoded in the canonical byte order.
    pub fn from_body(
        msg_type: MessageType,
        body: &Body,
        dest: ModuleAddress,
        src: ModuleAddress,
    ) -> Self {
        let (bytes, order) = body.encode();
        Self::with_bytes(msg_type, bytes, order, dest, src)
    }

    /// Message carrying a typed body with its own type code.
    pub fn from_codec<M: MessageCodec>(value: &M, dest: ModuleAddress, src: ModuleAddress) -> Self {
        Self::from_codec_as(value, ByteOrder::CANONICAL, dest, src)
    }

    /// Like [`RawMessage::from_codec`] with an explicit body byte order.
    pub fn from_codec_as<M: MessageCodec>(
        value: &M,
        order: ByteOrder,
        dest: ModuleAddress,
        src: ModuleAddress,
    ) -> Self {
        let mut writer = BodyWriter::with_capacity(order, value.body_len());
        value.write_body(&mut writer);
        Self::with_bytes(M::MESSAGE_TYPE, writer.into_inner(), order, dest, src)
    }

    fn with_bytes(
        msg_type: MessageType,
        body: Vec<u8>,
        order: ByteOrder,
        dest: ModuleAddress,
        src: ModuleAddress,
    ) -> Self {
        let mut header = MessageHeader::new(msg_type, body.len(), dest, src);
        header.byte_order = order;
        Self { header, body }
    }

    pub fn msg_type(&self) -> MessageType {
        self.header.msg_type
    }

    /// Parse a received buffer. The buffer must hold exactly `total_length`
    /// bytes.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let header = MessageHeader::decode(buf)?;
        let total = header.total_length as usize;

        if total < HEADER_SIZE {
            return Err(Error::malformed(format!(
                "total length {} shorter than header",
                total
            )));
        }
        if buf.len() < total {
            return Err(Error::TruncatedInput {
                needed: total,
                available: buf.len(),
            });
        }
        if buf.len() > total {
            return Err(Error::malformed(format!(
                "{} bytes received for total length {}",
                buf.len(),
                total
            )));
        }

        Ok(Self {
            header,
            body: buf[HEADER_SIZE..].to_vec(),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.body.len());
        out.extend_from_slice(&self.header.to_bytes());
        out.extend_from_slice(&self.body);
        out
    }

    /// Decode the body as `kind`. The header is validated first and the body
    /// is not read if it does not match.
    pub fn decode_body(&self, kind: BodyKind) -> Result<Body> {
        self.check_length()?;
        Body::decode(kind, &self.header, &self.body)
    }

    /// Typed decode.
    pub fn open<M: MessageCodec>(&self) -> Result<M> {
        self.check_length()?;
        codec::decode(&self.header, &self.body)
    }

    fn check_length(&self) -> Result<()> {
        if self.header.body_len() != Some(self.body.len()) {
            return Err(Error::malformed(format!(
                "total length {} but {} body bytes present",
                self.header.total_length,
                self.body.len()
            )));
        }
        Ok(())
    }
}
