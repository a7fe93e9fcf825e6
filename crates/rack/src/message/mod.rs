// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message envelope and body codecs.

pub mod body;
pub mod codec;
pub mod envelope;
pub mod header;
pub mod types;

pub use body::{decode_body, encode_body, Body, BodyKind};
pub use codec::{validate_header, FixedSize, MessageCodec, SubRecord};
pub use envelope::RawMessage;
pub use header::{MessageHeader, MessageType, HEADER_SIZE};
pub use types::{
    ContData, GetContData, GetData, Param, ParamMsg, ParamType, ParamValue, PathData, Point2d,
    RackTime, ServoDriveData, StopContData, Waypoint2d, WaypointPath, PARAM_MAX_COUNT,
    PARAM_STRING_LEN,
};
