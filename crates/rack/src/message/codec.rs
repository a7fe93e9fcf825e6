// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-type body codecs.
//!
//! Bodies come in two shapes:
//! - fixed-size records ([`FixedSize`]), whose length is a constant
//! - count-prefixed arrays of [`SubRecord`]s, whose length is `4 + n * SIZE`

use super::header::{MessageHeader, MessageType, HEADER_SIZE};
use crate::endian::{BodyReader, BodyWriter};
use crate::error::{Error, Result};

/// Size of the count prefix of a variable-length body
pub const COUNT_SIZE: usize = 4;

/// Body codec for one message type.
pub trait MessageCodec: Sized {
    /// Type code carried in the header
    const MESSAGE_TYPE: MessageType;

    /// Encoded body length of this value.
    fn body_len(&self) -> usize;

    /// Header consistency check, run before the body is read.
    fn check_header(header: &MessageHeader) -> bool;

    fn read_body(reader: &mut BodyReader<'_>) -> Result<Self>;

    fn write_body(&self, writer: &mut BodyWriter);
}

/// Body with a constant length.
pub trait FixedSize {
    const BODY_LEN: usize;
}

/// Element of a count-prefixed body.
pub trait SubRecord: Sized {
    /// Encoded size of one element
    const SIZE: usize;

    fn read(reader: &mut BodyReader<'_>) -> Result<Self>;

    fn write(&self, writer: &mut BodyWriter);
}

/// True iff the header carries `expected_type` and exactly
/// `HEADER_SIZE + expected_body_len` bytes.
pub fn validate_header(
    header: &MessageHeader,
    expected_type: MessageType,
    expected_body_len: usize,
) -> bool {
    header.msg_type == expected_type
        && header.total_length as usize == HEADER_SIZE + expected_body_len
}

/// Header check shared by all fixed-size codecs.
pub fn check_fixed_header<M: MessageCodec + FixedSize>(header: &MessageHeader) -> bool {
    validate_header(header, M::MESSAGE_TYPE, M::BODY_LEN)
}

/// Header check shared by all count-prefixed codecs.
pub fn check_variable_header<M: MessageCodec, R: SubRecord>(header: &MessageHeader) -> bool {
    header.msg_type == M::MESSAGE_TYPE && records_fit::<R>(header, usize::MAX)
}

/// True if the body length holds the count and a whole number of
/// sub-records, at most `max` of them.
pub fn records_fit<R: SubRecord>(header: &MessageHeader, max: usize) -> bool {
    match header.body_len() {
        Some(len) if len >= COUNT_SIZE => {
            let records = len - COUNT_SIZE;
            records % R::SIZE == 0 && records / R::SIZE <= max
        }
        _ => false,
    }
}

/// Body length of `count` sub-records.
pub fn variable_body_len<R: SubRecord>(count: usize) -> usize {
    COUNT_SIZE + count * R::SIZE
}

/// Read a count-prefixed sequence of sub-records.
///
/// The bytes left in `reader` must be exactly the declared records, otherwise
/// nothing is decoded.
pub fn read_records<R: SubRecord>(reader: &mut BodyReader<'_>) -> Result<Vec<R>> {
    read_records_at_most(reader, usize::MAX)
}

/// Like [`read_records`], rejecting counts above `max`.
pub fn read_records_at_most<R: SubRecord>(
    reader: &mut BodyReader<'_>,
    max: usize,
) -> Result<Vec<R>> {
    let count = reader.read_i32()?;
    let count = usize::try_from(count)
        .map_err(|_| Error::malformed(format!("negative record count {}", count)))?;
    if count > max {
        return Err(Error::malformed(format!(
            "record count {} exceeds limit {}",
            count, max
        )));
    }

    let declared = count
        .checked_mul(R::SIZE)
        .ok_or_else(|| Error::malformed(format!("record count {} overflows", count)))?;
    let available = reader.remaining();
    if declared != available {
        return Err(Error::malformed(format!(
            "record count {} needs {} body bytes, found {}",
            count, declared, available
        )));
    }

    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        records.push(R::read(reader)?);
    }
    Ok(records)
}

/// Write a count-prefixed sequence of sub-records.
pub fn write_records<R: SubRecord>(records: &[R], writer: &mut BodyWriter) {
    writer.write_i32(records.len() as i32);
    for record in records {
        record.write(writer);
    }
}

/// Decode a body whose header has already been validated.
///
/// `body` must be exactly the body region of the message.
pub fn decode<M: MessageCodec>(header: &MessageHeader, body: &[u8]) -> Result<M> {
    if !M::check_header(header) {
        return Err(Error::malformed(format!(
            "header {:?} with length {} does not match codec for {:?}",
            header.msg_type,
            header.total_length,
            M::MESSAGE_TYPE
        )));
    }

    let mut reader = BodyReader::new(body, header.byte_order);
    let value = M::read_body(&mut reader)?;
    if reader.remaining() != 0 {
        return Err(Error::malformed(format!(
            "{} trailing body bytes",
            reader.remaining()
        )));
    }
    Ok(value)
}
