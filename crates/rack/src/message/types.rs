// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Concrete message bodies.

use super::codec::{
    check_fixed_header, check_variable_header, read_records, read_records_at_most, records_fit,
    variable_body_len, write_records, FixedSize, MessageCodec, SubRecord,
};
use super::header::{MessageHeader, MessageType};
use crate::endian::{BodyReader, BodyWriter};
use crate::error::Result;
use crate::name::ModuleAddress;
use std::borrow::Cow;
use std::fmt;

/// Module timestamp in milliseconds
pub type RackTime = u32;

/// Implement [`MessageCodec`] for a fixed-size body from its field list.
macro_rules! fixed_codec {
    (
        $type:ident, $msg_type:expr, $len:expr,
        { $($field:ident: $read:ident / $write:ident),* $(,)? }
    ) => {
        impl FixedSize for $type {
            const BODY_LEN: usize = $len;
        }

        impl MessageCodec for $type {
            const MESSAGE_TYPE: MessageType = $msg_type;

            fn body_len(&self) -> usize {
                Self::BODY_LEN
            }

            fn check_header(header: &MessageHeader) -> bool {
                check_fixed_header::<Self>(header)
            }

            fn read_body(reader: &mut BodyReader<'_>) -> Result<Self> {
                Ok(Self {
                    $($field: reader.$read()?,)*
                })
            }

            fn write_body(&self, writer: &mut BodyWriter) {
                $(writer.$write(self.$field);)*
            }
        }
    };
}

// ----------------------------------------------------------------------------
// Proxy protocol bodies
// ----------------------------------------------------------------------------

/// GET_DATA request: the oldest recording time the caller accepts
/// (0 = latest available).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetData {
    pub recording_time: RackTime,
}

fixed_codec!(GetData, MessageType::GET_DATA, 4, {
    recording_time: read_u32 / write_u32,
});

/// GET_CONT_DATA request: deliver data every `period_time` ms to `data_mbx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetContData {
    pub period_time: RackTime,
    pub data_mbx: u32,
}

fixed_codec!(GetContData, MessageType::GET_CONT_DATA, 8, {
    period_time: read_u32 / write_u32,
    data_mbx: read_u32 / write_u32,
});

impl GetContData {
    pub fn new(period_time: RackTime, data_mbx: ModuleAddress) -> Self {
        Self {
            period_time,
            data_mbx: data_mbx.raw(),
        }
    }
}

/// CONT_DATA reply: the period the producer actually uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContData {
    pub period_time: RackTime,
}

fixed_codec!(ContData, MessageType::CONT_DATA, 4, {
    period_time: read_u32 / write_u32,
});

/// STOP_CONT_DATA request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StopContData {
    pub data_mbx: u32,
}

fixed_codec!(StopContData, MessageType::STOP_CONT_DATA, 4, {
    data_mbx: read_u32 / write_u32,
});

// ----------------------------------------------------------------------------
// Data bodies
// ----------------------------------------------------------------------------

/// Servo drive position sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ServoDriveData {
    pub recording_time: RackTime,
    /// Drive position
    pub position: f32,
}

fixed_codec!(ServoDriveData, MessageType::DATA, 8, {
    recording_time: read_u32 / write_u32,
    position: read_f32 / write_f32,
});

/// 2D point in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point2d {
    pub x: i32,
    pub y: i32,
}

impl Point2d {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl SubRecord for Point2d {
    const SIZE: usize = 8;

    fn read(reader: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            x: reader.read_i32()?,
            y: reader.read_i32()?,
        })
    }

    fn write(&self, writer: &mut BodyWriter) {
        writer.write_i32(self.x);
        writer.write_i32(self.y);
    }
}

/// Path made of points, in driving order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathData {
    pub points: Vec<Point2d>,
}

impl MessageCodec for PathData {
    const MESSAGE_TYPE: MessageType = MessageType::DATA;

    fn body_len(&self) -> usize {
        variable_body_len::<Point2d>(self.points.len())
    }

    fn check_header(header: &MessageHeader) -> bool {
        check_variable_header::<Self, Point2d>(header)
    }

    fn read_body(reader: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            points: read_records(reader)?,
        })
    }

    fn write_body(&self, writer: &mut BodyWriter) {
        write_records(&self.points, writer);
    }
}

/// Navigation waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Waypoint2d {
    /// [mm]
    pub x: i32,
    /// [mm]
    pub y: i32,
    /// [mm/s]
    pub speed: i32,
    /// [mm] absolute value of the maximum turning radius
    pub max_radius: i32,
    pub waypoint_type: i32,
    pub request: i32,
    /// [mm] lateral boundary offset
    pub lbo: i32,
    pub id: i32,
    pub way_id: i32,
    pub layer: i32,
    pub action_start: i32,
    pub action_end: i32,
}

impl SubRecord for Waypoint2d {
    const SIZE: usize = 48;

    fn read(reader: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            x: reader.read_i32()?,
            y: reader.read_i32()?,
            speed: reader.read_i32()?,
            max_radius: reader.read_i32()?,
            waypoint_type: reader.read_i32()?,
            request: reader.read_i32()?,
            lbo: reader.read_i32()?,
            id: reader.read_i32()?,
            way_id: reader.read_i32()?,
            layer: reader.read_i32()?,
            action_start: reader.read_i32()?,
            action_end: reader.read_i32()?,
        })
    }

    fn write(&self, writer: &mut BodyWriter) {
        for value in [
            self.x,
            self.y,
            self.speed,
            self.max_radius,
            self.waypoint_type,
            self.request,
            self.lbo,
            self.id,
            self.way_id,
            self.layer,
            self.action_start,
            self.action_end,
        ] {
            writer.write_i32(value);
        }
    }
}

/// Route description made of waypoints.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WaypointPath {
    pub waypoints: Vec<Waypoint2d>,
}

impl MessageCodec for WaypointPath {
    const MESSAGE_TYPE: MessageType = MessageType::DATA;

    fn body_len(&self) -> usize {
        variable_body_len::<Waypoint2d>(self.waypoints.len())
    }

    fn check_header(header: &MessageHeader) -> bool {
        check_variable_header::<Self, Waypoint2d>(header)
    }

    fn read_body(reader: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            waypoints: read_records(reader)?,
        })
    }

    fn write_body(&self, writer: &mut BodyWriter) {
        write_records(&self.waypoints, writer);
    }
}

// ----------------------------------------------------------------------------
// Module parameters
// ----------------------------------------------------------------------------

/// Size of the name and string value fields of a parameter
pub const PARAM_STRING_LEN: usize = 80;

/// Most parameters one message may carry
pub const PARAM_MAX_COUNT: usize = 50;

/// Value type tag of a [`Param`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Int32,
    String,
    Float,
}

impl ParamType {
    pub const fn code(self) -> i32 {
        match self {
            ParamType::Int32 => 0,
            ParamType::String => 1,
            ParamType::Float => 2,
        }
    }

    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ParamType::Int32),
            1 => Some(ParamType::String),
            2 => Some(ParamType::Float),
            _ => None,
        }
    }
}

/// Typed view of a parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue<'a> {
    Int32(i32),
    Float(f32),
    String(Cow<'a, str>),
}

/// Named module parameter.
///
/// Name and string value are NUL-padded byte fields of
/// [`PARAM_STRING_LEN`] bytes; they are copied as-is regardless of the body
/// byte order.
#[derive(Clone, Copy, PartialEq)]
pub struct Param {
    pub name: [u8; PARAM_STRING_LEN],
    /// [`ParamType`] code
    pub param_type: i32,
    pub value_int32: i32,
    pub value_float: f32,
    pub value_string: [u8; PARAM_STRING_LEN],
}

impl Default for Param {
    fn default() -> Self {
        Self {
            name: [0; PARAM_STRING_LEN],
            param_type: ParamType::Int32.code(),
            value_int32: 0,
            value_float: 0.0,
            value_string: [0; PARAM_STRING_LEN],
        }
    }
}

/// Copy `text` into a NUL-terminated field, cut at a char boundary if it is
/// too long.
fn fixed_string(text: &str) -> [u8; PARAM_STRING_LEN] {
    let mut end = text.len().min(PARAM_STRING_LEN - 1);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut field = [0u8; PARAM_STRING_LEN];
    field[..end].copy_from_slice(&text.as_bytes()[..end]);
    field
}

fn field_str(field: &[u8]) -> Cow<'_, str> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end])
}

impl Param {
    pub fn int32(name: &str, value: i32) -> Self {
        Self {
            name: fixed_string(name),
            param_type: ParamType::Int32.code(),
            value_int32: value,
            ..Default::default()
        }
    }

    pub fn float(name: &str, value: f32) -> Self {
        Self {
            name: fixed_string(name),
            param_type: ParamType::Float.code(),
            value_float: value,
            ..Default::default()
        }
    }

    /// String parameter; `value` is cut to 79 bytes.
    pub fn string(name: &str, value: &str) -> Self {
        Self {
            name: fixed_string(name),
            param_type: ParamType::String.code(),
            value_string: fixed_string(value),
            ..Default::default()
        }
    }

    pub fn name(&self) -> Cow<'_, str> {
        field_str(&self.name)
    }

    pub fn kind(&self) -> Option<ParamType> {
        ParamType::from_code(self.param_type)
    }

    /// Value selected by the type tag, `None` for an unknown tag.
    pub fn value(&self) -> Option<ParamValue<'_>> {
        Some(match self.kind()? {
            ParamType::Int32 => ParamValue::Int32(self.value_int32),
            ParamType::Float => ParamValue::Float(self.value_float),
            ParamType::String => ParamValue::String(field_str(&self.value_string)),
        })
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Param")
            .field("name", &self.name())
            .field("param_type", &self.param_type)
            .field("value", &self.value())
            .finish()
    }
}

impl SubRecord for Param {
    const SIZE: usize = 2 * PARAM_STRING_LEN + 12;

    fn read(reader: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            name: reader.read_array()?,
            param_type: reader.read_i32()?,
            value_int32: reader.read_i32()?,
            value_float: reader.read_f32()?,
            value_string: reader.read_array()?,
        })
    }

    fn write(&self, writer: &mut BodyWriter) {
        writer.write_bytes(&self.name);
        writer.write_i32(self.param_type);
        writer.write_i32(self.value_int32);
        writer.write_f32(self.value_float);
        writer.write_bytes(&self.value_string);
    }
}

/// Parameter list: PARAM reply and SET_PARAM request body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamMsg {
    pub params: Vec<Param>,
}

impl ParamMsg {
    pub fn new(params: Vec<Param>) -> Self {
        Self { params }
    }

    /// First parameter called `name`.
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name() == name)
    }
}

impl MessageCodec for ParamMsg {
    const MESSAGE_TYPE: MessageType = MessageType::PARAM;

    fn body_len(&self) -> usize {
        variable_body_len::<Param>(self.params.len())
    }

    fn check_header(header: &MessageHeader) -> bool {
        matches!(header.msg_type, MessageType::PARAM | MessageType::SET_PARAM)
            && records_fit::<Param>(header, PARAM_MAX_COUNT)
    }

    fn read_body(reader: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            params: read_records_at_most(reader, PARAM_MAX_COUNT)?,
        })
    }

    fn write_body(&self, writer: &mut BodyWriter) {
        write_records(&self.params, writer);
    }
}
