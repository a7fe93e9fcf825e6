// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # RACK - Robotics Application Construction Kit messaging core
//!
//! Client-side building blocks for talking to RACK modules over a
//! TIMS-style message transport: module addressing, the wire envelope,
//! per-type body codecs and synchronous data proxies.
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------------------+
//! |  Application                            |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  DataProxy / ServoDriveProxy / ...      |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  RawMessage (header + body codecs)      |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  Transport (LocalBus, ...)              |
//! +-----------------------------------------+
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use rack::{LocalBus, ModuleAddress, ProxyTimeouts, ServoDriveProxy};
//! use std::sync::Arc;
//!
//! let bus = LocalBus::new();
//! let transport = Arc::new(bus.transport(ModuleAddress::from_raw(0x0002_0001)));
//! let servo = ServoDriveProxy::new(0, 0, transport, ProxyTimeouts::default())?;
//! if let Some(data) = servo.get_latest() {
//!     println!("position {} at {}", data.position, data.recording_time);
//! }
//! # Ok::<(), rack::Error>(())
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod endian;
pub mod error;
pub mod message;
pub mod name;
pub mod proxy;
pub mod transport;

pub use config::{ConfigError, ProxyTimeouts, RackConfig, TimeoutConfig};
pub use endian::{BodyReader, BodyWriter, ByteOrder};
pub use error::{AddressField, Error, Result};
pub use message::{
    Body, BodyKind, MessageCodec, MessageHeader, MessageType, Param, ParamMsg, ParamType,
    ParamValue, PathData, Point2d, RackTime, RawMessage, ServoDriveData, Waypoint2d, WaypointPath,
    HEADER_SIZE,
};
pub use name::{class_id, class_name, AddressParts, ModuleAddress};
pub use proxy::{DataProxy, ModuleStatus, PathProxy, ServoDriveProxy};
pub use transport::{LocalBus, LocalTransport, Mailbox, RequestHandle, Transport};
