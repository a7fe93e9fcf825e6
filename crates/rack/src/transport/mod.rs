// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transport abstraction.
//!
//! The core only builds requests and decodes replies. Delivery, retries and
//! address resolution belong to the transport implementation.
//!
//! ## Design Principles
//!
//! - **Blocking** - `await_reply` suspends the caller until a reply, a fault
//!   or the timeout
//! - **Shared** - implementations are `Send + Sync`, several proxies may hold
//!   the same transport
//! - **Result-based** - faults are `Error::TransportFault` or `Error::Timeout`

use crate::error::Result;
use crate::message::RawMessage;
use crate::name::ModuleAddress;
use std::time::Duration;

pub mod local;

pub use local::{LocalBus, LocalTransport, Mailbox, Request};

/// Ticket for one outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestHandle {
    id: u64,
    target: ModuleAddress,
}

impl RequestHandle {
    pub const fn new(id: u64, target: ModuleAddress) -> Self {
        Self { id, target }
    }

    pub const fn id(&self) -> u64 {
        self.id
    }

    pub const fn target(&self) -> ModuleAddress {
        self.target
    }
}

/// Request/reply transport between module mailboxes.
pub trait Transport: Send + Sync {
    /// Mailbox address replies are sent back to; used as the request source.
    fn local_address(&self) -> ModuleAddress;

    /// Send `request` to `target`.
    fn send(&self, target: ModuleAddress, request: RawMessage) -> Result<RequestHandle>;

    /// Wait up to `timeout` for the reply to `handle`.
    ///
    /// Returns `Error::Timeout` when nothing arrives in time and
    /// `Error::TransportFault` when delivery failed.
    fn await_reply(&self, handle: RequestHandle, timeout: Duration) -> Result<RawMessage>;
}
