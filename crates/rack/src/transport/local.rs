// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process loopback bus.
//!
//! # Architecture
//!
//! ```text
//! LocalBus (shared via Arc)
//! +-- mailboxes: DashMap<ModuleAddress, Sender<Request>>
//! +-- pending:   DashMap<request id, Sender<Vec<u8>>>
//!
//! LocalTransport (client side, implements Transport)
//! +-- replies: DashMap<request id, Receiver<Vec<u8>>>
//!
//! Mailbox (module side)
//! +-- requests: Receiver<Request>
//! ```
//!
//! Messages cross the bus as encoded bytes, so both ends go through the
//! wire codec exactly as they would over a real link.

use super::{RequestHandle, Transport};
use crate::error::{Error, Result};
use crate::message::RawMessage;
use crate::name::ModuleAddress;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Request as delivered to a module mailbox.
#[derive(Debug)]
pub struct Request {
    id: u64,
    bytes: Vec<u8>,
}

impl Request {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Raw wire bytes of the request.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn message(&self) -> Result<RawMessage> {
        RawMessage::parse(&self.bytes)
    }
}

/// Registry of module mailboxes and outstanding replies.
#[derive(Default)]
pub struct LocalBus {
    mailboxes: DashMap<ModuleAddress, Sender<Request>>,
    pending: DashMap<u64, Sender<Vec<u8>>>,
    next_id: AtomicU64,
}

impl LocalBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a module mailbox. Fails if the address is taken.
    pub fn register(self: &Arc<Self>, address: ModuleAddress) -> Result<Mailbox> {
        let (tx, rx) = channel::unbounded();
        match self.mailboxes.entry(address) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(Error::TransportFault(format!(
                    "mailbox {} already registered",
                    address.display_name_verbose()
                )));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(tx);
            }
        }
        log::debug!("LocalBus: registered mailbox {}", address);
        Ok(Mailbox {
            address,
            requests: rx,
            bus: Arc::clone(self),
        })
    }

    /// Client endpoint whose requests carry `address` as source.
    pub fn transport(self: &Arc<Self>, address: ModuleAddress) -> LocalTransport {
        LocalTransport {
            bus: Arc::clone(self),
            address,
            replies: DashMap::new(),
        }
    }

    pub fn is_registered(&self, address: ModuleAddress) -> bool {
        self.mailboxes.contains_key(&address)
    }

    fn deliver_reply(&self, id: u64, bytes: Vec<u8>) -> Result<()> {
        match self.pending.remove(&id) {
            Some((_, tx)) => tx
                .send(bytes)
                .map_err(|_| Error::TransportFault(format!("requester of {} is gone", id))),
            None => {
                log::debug!("LocalBus: dropping reply to expired request {}", id);
                Err(Error::TransportFault(format!("request {} is not pending", id)))
            }
        }
    }
}

/// Module side of the bus: receives requests, sends replies.
pub struct Mailbox {
    address: ModuleAddress,
    requests: Receiver<Request>,
    bus: Arc<LocalBus>,
}

impl Mailbox {
    pub fn address(&self) -> ModuleAddress {
        self.address
    }

    pub fn recv(&self) -> Option<Request> {
        self.requests.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Request> {
        self.requests.recv_timeout(timeout).ok()
    }

    pub fn try_recv(&self) -> Option<Request> {
        self.requests.try_recv().ok()
    }

    /// Answer `request`. The reply source is this mailbox.
    pub fn reply(&self, request: &Request, mut reply: RawMessage) -> Result<()> {
        reply.header.src = self.address;
        if let Ok(original) = request.message() {
            reply.header.dest = original.header.src;
            reply.header.seq_nr = original.header.seq_nr;
        }
        self.reply_bytes(request, reply.to_bytes())
    }

    /// Answer with raw bytes, bypassing the encoder.
    pub fn reply_bytes(&self, request: &Request, bytes: Vec<u8>) -> Result<()> {
        self.bus.deliver_reply(request.id, bytes)
    }
}

impl Drop for Mailbox {
    fn drop(&mut self) {
        self.bus.mailboxes.remove(&self.address);
        log::debug!("LocalBus: unregistered mailbox {}", self.address);
    }
}

/// Client side of the bus.
pub struct LocalTransport {
    bus: Arc<LocalBus>,
    address: ModuleAddress,
    replies: DashMap<u64, Receiver<Vec<u8>>>,
}

impl Transport for LocalTransport {
    fn local_address(&self) -> ModuleAddress {
        self.address
    }

    fn send(&self, target: ModuleAddress, mut request: RawMessage) -> Result<RequestHandle> {
        let mailbox = self
            .bus
            .mailboxes
            .get(&target)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                Error::TransportFault(format!(
                    "no mailbox registered for {}",
                    target.display_name_verbose()
                ))
            })?;

        let id = self.bus.next_id.fetch_add(1, Ordering::Relaxed);
        request.header.dest = target;
        request.header.src = self.address;
        request.header.seq_nr = id as u16;

        let (tx, rx) = channel::bounded(1);
        self.bus.pending.insert(id, tx);
        self.replies.insert(id, rx);

        let delivered = mailbox.send(Request {
            id,
            bytes: request.to_bytes(),
        });
        if delivered.is_err() {
            self.bus.pending.remove(&id);
            self.replies.remove(&id);
            return Err(Error::TransportFault(format!(
                "mailbox {} closed",
                target.display_name_verbose()
            )));
        }

        Ok(RequestHandle::new(id, target))
    }

    fn await_reply(&self, handle: RequestHandle, timeout: Duration) -> Result<RawMessage> {
        let (_, rx) = self.replies.remove(&handle.id()).ok_or_else(|| {
            Error::TransportFault(format!("request {} is not pending", handle.id()))
        })?;

        match rx.recv_timeout(timeout) {
            Ok(bytes) => RawMessage::parse(&bytes),
            Err(RecvTimeoutError::Timeout) => {
                self.bus.pending.remove(&handle.id());
                Err(Error::Timeout)
            }
            Err(RecvTimeoutError::Disconnected) => Err(Error::TransportFault(format!(
                "reply channel for request {} closed",
                handle.id()
            ))),
        }
    }
}
