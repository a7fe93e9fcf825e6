// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Module addresses.
//!
//! Every module instance in a running system is named by a 32-bit address
//! made of four 8-bit fields:
//!
//! ```text
//! 31......24 23......16 15.......8 7........0
//! | system  |  class   | instance |  local   |
//! ```
//!
//! `class` identifies the module kind (see [`class_id`]), `local` selects one
//! of the mailboxes a module instance owns.

use crate::error::{AddressField, Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

const LOCAL_ID_BITS: u32 = 8;
const INSTANCE_ID_BITS: u32 = 8;
const CLASS_ID_BITS: u32 = 8;

const LOCAL_SHIFT: u32 = 0;
const INSTANCE_SHIFT: u32 = LOCAL_ID_BITS;
const CLASS_SHIFT: u32 = LOCAL_ID_BITS + INSTANCE_ID_BITS;
const SYSTEM_SHIFT: u32 = LOCAL_ID_BITS + INSTANCE_ID_BITS + CLASS_ID_BITS;

const FIELD_MASK: u32 = 0xFF;

/// Module class identifiers.
pub mod class_id {
    pub const TIMS: u8 = 0x00;
    pub const GDOS: u8 = 0x01;
    pub const GUI: u8 = 0x02;
    pub const TEST: u8 = 0x10;

    pub const CHASSIS: u8 = 0x11;
    pub const ODOMETRY: u8 = 0x12;
    pub const POSITION: u8 = 0x13;
    pub const LADAR: u8 = 0x14;
    pub const CAMERA: u8 = 0x15;
    pub const GPS: u8 = 0x16;
    pub const JOYSTICK: u8 = 0x17;
    pub const PILOT: u8 = 0x18;
    pub const SCAN2D: u8 = 0x19;
    pub const DATALOG: u8 = 0x1A;
    pub const OBJ_RECOG: u8 = 0x1B;
    pub const CLOCK: u8 = 0x1C;
    pub const VEHICLE: u8 = 0x1D;
    pub const GYRO: u8 = 0x1E;
    pub const IO: u8 = 0x1F;
    pub const SERVO_DRIVE: u8 = 0x20;
    pub const SCAN3D: u8 = 0x21;
    pub const PLANNER: u8 = 0x22;
    pub const FEATURE_MAP: u8 = 0x23;
    pub const GRID_MAP: u8 = 0x24;
    pub const PATH: u8 = 0x25;
    pub const MCL: u8 = 0x26;
    pub const PTZ_DRIVE: u8 = 0x27;
    pub const COMPASS: u8 = 0x28;

    /// First class id available for project-specific modules
    pub const OFFSET: u8 = 0x80;
}

static CLASS_NAMES: OnceLock<HashMap<u8, &'static str>> = OnceLock::new();

fn class_names() -> &'static HashMap<u8, &'static str> {
    CLASS_NAMES.get_or_init(|| {
        use class_id::*;

        HashMap::from([
            (TIMS, "Tims"),
            (GDOS, "GDOS"),
            (GUI, "GUI"),
            (TEST, "Test"),
            (CHASSIS, "Chassis"),
            (ODOMETRY, "Odometry"),
            (POSITION, "Position"),
            (LADAR, "Ladar"),
            (CAMERA, "Camera"),
            (GPS, "Gps"),
            (JOYSTICK, "Joystick"),
            (PILOT, "Pilot"),
            (SCAN2D, "Scan2d"),
            (DATALOG, "Datalog"),
            (OBJ_RECOG, "ObjRecog"),
            (CLOCK, "Clock"),
            (VEHICLE, "Vehicle"),
            (GYRO, "Gyro"),
            (IO, "Io"),
            (SERVO_DRIVE, "ServoDrive"),
            (SCAN3D, "Scan3d"),
            (PLANNER, "Planner"),
            (FEATURE_MAP, "FeatureMap"),
            (GRID_MAP, "GridMap"),
            (PATH, "Path"),
            (MCL, "Mcl"),
            (PTZ_DRIVE, "PtzDrive"),
            (COMPASS, "Compass"),
        ])
    })
}

/// Symbolic name of a module class, if known.
pub fn class_name(class_id: u8) -> Option<&'static str> {
    class_names().get(&class_id).copied()
}

/// Unpacked address fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AddressParts {
    pub system_id: u8,
    pub class_id: u8,
    pub instance_id: u8,
    pub local_id: u8,
}

/// 32-bit hierarchical module address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ModuleAddress(u32);

fn checked_field(field: AddressField, value: u32) -> Result<u32> {
    if value > FIELD_MASK {
        return Err(Error::OutOfRange { field, value });
    }
    Ok(value)
}

impl ModuleAddress {
    /// Pack the four address fields. Fails if any field is >= 256.
    pub fn new(system_id: u32, class_id: u32, instance_id: u32, local_id: u32) -> Result<Self> {
        let system = checked_field(AddressField::System, system_id)?;
        let class = checked_field(AddressField::Class, class_id)?;
        let instance = checked_field(AddressField::Instance, instance_id)?;
        let local = checked_field(AddressField::Local, local_id)?;

        Ok(Self(
            (system << SYSTEM_SHIFT)
                | (class << CLASS_SHIFT)
                | (instance << INSTANCE_SHIFT)
                | (local << LOCAL_SHIFT),
        ))
    }

    /// Address on system 0.
    pub fn with_class(class_id: u32, instance_id: u32, local_id: u32) -> Result<Self> {
        Self::new(0, class_id, instance_id, local_id)
    }

    /// Main mailbox (local id 0) of a module on system 0.
    pub fn of(class_id: u32, instance_id: u32) -> Result<Self> {
        Self::new(0, class_id, instance_id, 0)
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn system_id(self) -> u8 {
        ((self.0 >> SYSTEM_SHIFT) & FIELD_MASK) as u8
    }

    pub const fn class_id(self) -> u8 {
        ((self.0 >> CLASS_SHIFT) & FIELD_MASK) as u8
    }

    pub const fn instance_id(self) -> u8 {
        ((self.0 >> INSTANCE_SHIFT) & FIELD_MASK) as u8
    }

    pub const fn local_id(self) -> u8 {
        ((self.0 >> LOCAL_SHIFT) & FIELD_MASK) as u8
    }

    pub const fn parts(self) -> AddressParts {
        AddressParts {
            system_id: self.system_id(),
            class_id: self.class_id(),
            instance_id: self.instance_id(),
            local_id: self.local_id(),
        }
    }

    /// Another mailbox of the same module instance.
    pub const fn mailbox(self, local_id: u8) -> Self {
        Self((self.0 & !FIELD_MASK) | local_id as u32)
    }

    /// `"<ClassName>(<system>/<instance>)"`
    pub fn display_name(self) -> String {
        let class_id = self.class_id();
        match class_name(class_id) {
            Some(name) => format!("{}({}/{})", name, self.system_id(), self.instance_id()),
            None => format!(
                "unknown[{:x}]({}/{})",
                class_id,
                self.system_id(),
                self.instance_id()
            ),
        }
    }

    /// Display name followed by the raw hex address.
    pub fn display_name_verbose(self) -> String {
        format!("{} [{:x}]", self.display_name(), self.0)
    }
}

impl fmt::Display for ModuleAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl fmt::Debug for ModuleAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleAddress({})", self.display_name_verbose())
    }
}

impl From<AddressParts> for ModuleAddress {
    fn from(parts: AddressParts) -> Self {
        Self(
            (u32::from(parts.system_id) << SYSTEM_SHIFT)
                | (u32::from(parts.class_id) << CLASS_SHIFT)
                | (u32::from(parts.instance_id) << INSTANCE_SHIFT)
                | (u32::from(parts.local_id) << LOCAL_SHIFT),
        )
    }
}
