// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Closed set of message bodies the core knows how to decode.
//!
//! A header's type code alone does not identify the payload (every data
//! reply is `DATA`), so decoding is dispatched on a [`BodyKind`] chosen by
//! the caller that knows which module it talks to.

use super::codec::{self, MessageCodec};
use super::header::{MessageHeader, MessageType};
use super::types::{
    ContData, GetContData, GetData, ParamMsg, PathData, RackTime, ServoDriveData, StopContData,
    WaypointPath,
};
use crate::endian::{BodyWriter, ByteOrder};
use crate::error::Result;
use crate::name::ModuleAddress;

/// Payload selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    GetData,
    GetContData,
    ContData,
    StopContData,
    ServoDriveData,
    Path,
    WaypointPath,
    Param,
}

impl BodyKind {
    /// Header type code of this payload.
    pub const fn message_type(self) -> MessageType {
        match self {
            BodyKind::GetData => GetData::MESSAGE_TYPE,
            BodyKind::GetContData => GetContData::MESSAGE_TYPE,
            BodyKind::ContData => ContData::MESSAGE_TYPE,
            BodyKind::StopContData => StopContData::MESSAGE_TYPE,
            BodyKind::ServoDriveData => ServoDriveData::MESSAGE_TYPE,
            BodyKind::Path => PathData::MESSAGE_TYPE,
            BodyKind::WaypointPath => WaypointPath::MESSAGE_TYPE,
            BodyKind::Param => ParamMsg::MESSAGE_TYPE,
        }
    }

    /// True for payloads carried by DATA replies.
    pub const fn is_data(self) -> bool {
        self.message_type().0 == MessageType::DATA.0
    }

    /// Header consistency check of the codec behind this kind.
    pub fn check_header(self, header: &MessageHeader) -> bool {
        match self {
            BodyKind::GetData => GetData::check_header(header),
            BodyKind::GetContData => GetContData::check_header(header),
            BodyKind::ContData => ContData::check_header(header),
            BodyKind::StopContData => StopContData::check_header(header),
            BodyKind::ServoDriveData => ServoDriveData::check_header(header),
            BodyKind::Path => PathData::check_header(header),
            BodyKind::WaypointPath => WaypointPath::check_header(header),
            BodyKind::Param => ParamMsg::check_header(header),
        }
    }
}

/// Decoded message body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    GetData(GetData),
    GetContData(GetContData),
    ContData(ContData),
    StopContData(StopContData),
    ServoDriveData(ServoDriveData),
    Path(PathData),
    WaypointPath(WaypointPath),
    Param(ParamMsg),
}

impl Body {
    pub fn kind(&self) -> BodyKind {
        match self {
            Body::GetData(_) => BodyKind::GetData,
            Body::GetContData(_) => BodyKind::GetContData,
            Body::ContData(_) => BodyKind::ContData,
            Body::StopContData(_) => BodyKind::StopContData,
            Body::ServoDriveData(_) => BodyKind::ServoDriveData,
            Body::Path(_) => BodyKind::Path,
            Body::WaypointPath(_) => BodyKind::WaypointPath,
            Body::Param(_) => BodyKind::Param,
        }
    }

    pub fn message_type(&self) -> MessageType {
        self.kind().message_type()
    }

    pub fn body_len(&self) -> usize {
        match self {
            Body::GetData(b) => b.body_len(),
            Body::GetContData(b) => b.body_len(),
            Body::ContData(b) => b.body_len(),
            Body::StopContData(b) => b.body_len(),
            Body::ServoDriveData(b) => b.body_len(),
            Body::Path(b) => b.body_len(),
            Body::WaypointPath(b) => b.body_len(),
            Body::Param(b) => b.body_len(),
        }
    }

    /// Recording time embedded in the payload, for payloads that carry one.
    pub fn recording_time(&self) -> Option<RackTime> {
        match self {
            Body::GetData(b) => Some(b.recording_time),
            Body::ServoDriveData(b) => Some(b.recording_time),
            Body::GetContData(_)
            | Body::ContData(_)
            | Body::StopContData(_)
            | Body::Path(_)
            | Body::WaypointPath(_)
            | Body::Param(_) => None,
        }
    }

    /// Decode the body region of a message whose header is `header`.
    pub fn decode(kind: BodyKind, header: &MessageHeader, body: &[u8]) -> Result<Self> {
        Ok(match kind {
            BodyKind::GetData => Body::GetData(codec::decode(header, body)?),
            BodyKind::GetContData => Body::GetContData(codec::decode(header, body)?),
            BodyKind::ContData => Body::ContData(codec::decode(header, body)?),
            BodyKind::StopContData => Body::StopContData(codec::decode(header, body)?),
            BodyKind::ServoDriveData => Body::ServoDriveData(codec::decode(header, body)?),
            BodyKind::Path => Body::Path(codec::decode(header, body)?),
            BodyKind::WaypointPath => Body::WaypointPath(codec::decode(header, body)?),
            BodyKind::Param => Body::Param(codec::decode(header, body)?),
        })
    }

    /// Encode in the canonical byte order.
    pub fn encode(&self) -> (Vec<u8>, ByteOrder) {
        self.encode_as(ByteOrder::CANONICAL)
    }

    /// Encode in an explicit byte order.
    pub fn encode_as(&self, order: ByteOrder) -> (Vec<u8>, ByteOrder) {
        let mut writer = BodyWriter::with_capacity(order, self.body_len());
        match self {
            Body::GetData(b) => b.write_body(&mut writer),
            Body::GetContData(b) => b.write_body(&mut writer),
            Body::ContData(b) => b.write_body(&mut writer),
            Body::StopContData(b) => b.write_body(&mut writer),
            Body::ServoDriveData(b) => b.write_body(&mut writer),
            Body::Path(b) => b.write_body(&mut writer),
            Body::WaypointPath(b) => b.write_body(&mut writer),
            Body::Param(b) => b.write_body(&mut writer),
        }
        (writer.into_inner(), order)
    }
}

macro_rules! impl_from_body {
    ($($variant:ident($type:ty)),* $(,)?) => {
        $(
            impl From<$type> for Body {
                fn from(value: $type) -> Self {
                    Body::$variant(value)
                }
            }
        )*
    };
}

impl_from_body!(
    GetData(GetData),
    GetContData(GetContData),
    ContData(ContData),
    StopContData(StopContData),
    ServoDriveData(ServoDriveData),
    Path(PathData),
    WaypointPath(WaypointPath),
    Param(ParamMsg),
);

/// Decode a bare body region whose fields are in `byte_order`.
///
/// The length of `raw` must be exactly what the codec for `kind` expects.
pub fn decode_body(raw: &[u8], byte_order: ByteOrder, kind: BodyKind) -> Result<Body> {
    let mut header = MessageHeader::new(
        kind.message_type(),
        raw.len(),
        ModuleAddress::default(),
        ModuleAddress::default(),
    );
    header.byte_order = byte_order;
    Body::decode(kind, &header, raw)
}

/// Encode `body` in the canonical byte order.
pub fn encode_body(body: &Body) -> (Vec<u8>, ByteOrder) {
    body.encode()
}
