// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Data proxies: synchronous access to one module.
//!
//! A proxy is bound to a module address and issues one request at a time.
//! Every call follows the same cycle:
//!
//! ```text
//! Idle -> AwaitingReply -> Idle (Some(data) | None)
//! ```
//!
//! Faults never reach the caller. Timeouts, transport errors and malformed
//! replies all end in `None`; the cause is logged and kept in
//! [`DataProxy::last_fault`].
//!
//! # Freshness threshold
//!
//! [`DataProxy::fetch`] takes a recording time that is forwarded to the
//! module in the GET_DATA request. It asks the producer for data recorded no
//! earlier than that instant; `0` asks for the latest sample. The proxy does
//! not reject replies that are older than the threshold, the module is the
//! authority on what is fresh enough.
//!
//! [`DataProxy::fetch_next`] sends GET_NEXT_DATA instead, which carries no
//! threshold and is answered with the producer's next sample.

use crate::config::{ProxyTimeouts, RackConfig};
use crate::error::{Error, Result};
use crate::message::{
    Body, BodyKind, ContData, GetContData, GetData, MessageType, ParamMsg, PathData, RackTime,
    RawMessage, ServoDriveData, StopContData, PARAM_MAX_COUNT,
};
use crate::name::{class_id, ModuleAddress};
use crate::transport::Transport;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Module state reported by GET_STATUS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    Enabled,
    Disabled,
    Error,
}

/// Synchronous accessor bound to one module address.
pub struct DataProxy {
    target: ModuleAddress,
    kind: BodyKind,
    transport: Arc<dyn Transport>,
    timeouts: ProxyTimeouts,
    /// Held for the whole send/receive cycle: one outstanding call per proxy.
    call_lock: Mutex<()>,
    last_fault: Mutex<Option<Error>>,
}

impl DataProxy {
    /// Bind a proxy to `target`. `kind` must be a payload carried by DATA
    /// replies.
    pub fn new(
        target: ModuleAddress,
        kind: BodyKind,
        transport: Arc<dyn Transport>,
        timeouts: ProxyTimeouts,
    ) -> Result<Self> {
        if !kind.is_data() {
            return Err(Error::NotDataPayload(kind));
        }
        Ok(Self {
            target,
            kind,
            transport,
            timeouts,
            call_lock: Mutex::new(()),
            last_fault: Mutex::new(None),
        })
    }

    /// Proxy for `(config.system_id, class_id, instance_id, 0)`.
    pub fn from_config(
        config: &RackConfig,
        class_id: u8,
        instance_id: u32,
        kind: BodyKind,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let target = ModuleAddress::new(config.system_id, u32::from(class_id), instance_id, 0)?;
        Self::new(target, kind, transport, config.proxy_timeouts())
    }

    pub fn target(&self) -> ModuleAddress {
        self.target
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn timeouts(&self) -> ProxyTimeouts {
        self.timeouts
    }

    /// Cause of the most recent failed call.
    pub fn last_fault(&self) -> Option<Error> {
        self.last_fault.lock().clone()
    }

    /// Request data recorded no earlier than `recording_time`.
    pub fn fetch(&self, recording_time: RackTime) -> Option<Body> {
        let _call = self.call_lock.lock();

        let request = RawMessage::from_body(
            MessageType::GET_DATA,
            &Body::GetData(GetData { recording_time }),
            self.target,
            self.transport.local_address(),
        );

        let result = self
            .exchange(request, self.timeouts.data)
            .and_then(|reply| self.decode_data(&reply));

        match result {
            Ok(body) => {
                if let Some(time) = body.recording_time() {
                    if time < recording_time {
                        log::debug!(
                            "{}: data recorded at {} is older than requested {}",
                            self.target,
                            time,
                            recording_time
                        );
                    }
                }
                Some(body)
            }
            Err(e) => {
                self.record_fault("get data", e);
                None
            }
        }
    }

    /// Latest available data.
    pub fn fetch_latest(&self) -> Option<Body> {
        self.fetch(0)
    }

    /// Wait for the next sample the module produces.
    pub fn fetch_next(&self) -> Option<Body> {
        let _call = self.call_lock.lock();

        let request = RawMessage::command(
            MessageType::GET_NEXT_DATA,
            self.target,
            self.transport.local_address(),
        );
        let result = self
            .exchange(request, self.timeouts.data)
            .and_then(|reply| self.decode_data(&reply));

        match result {
            Ok(body) => Some(body),
            Err(e) => {
                self.record_fault("get next data", e);
                None
            }
        }
    }

    /// Current module parameters.
    pub fn get_parameter(&self) -> Option<ParamMsg> {
        let _call = self.call_lock.lock();

        let request = RawMessage::command(
            MessageType::GET_PARAM,
            self.target,
            self.transport.local_address(),
        );
        let result = self
            .exchange(request, self.timeouts.data)
            .and_then(|reply| expect_reply_type(&reply, MessageType::PARAM).map(|()| reply))
            .and_then(|reply| reply.open::<ParamMsg>());

        match result {
            Ok(params) => Some(params),
            Err(e) => {
                self.record_fault("get parameter", e);
                None
            }
        }
    }

    /// Send new parameter values. Failures are logged only.
    pub fn set_parameter(&self, params: &ParamMsg) {
        let _call = self.call_lock.lock();

        if params.params.len() > PARAM_MAX_COUNT {
            self.record_fault(
                "set parameter",
                Error::malformed(format!(
                    "{} parameters exceed limit {}",
                    params.params.len(),
                    PARAM_MAX_COUNT
                )),
            );
            return;
        }

        let mut request =
            RawMessage::from_codec(params, self.target, self.transport.local_address());
        request.header.msg_type = MessageType::SET_PARAM;
        let result = self
            .exchange(request, self.timeouts.data)
            .and_then(|reply| expect_reply_type(&reply, MessageType::OK));
        if let Err(e) = result {
            self.record_fault("set parameter", e);
        }
    }

    /// Switch the module on. Failures are logged only.
    pub fn enable(&self) {
        let _call = self.call_lock.lock();
        self.command(MessageType::ON, self.timeouts.on, "on");
    }

    /// Switch the module off. Failures are logged only.
    pub fn disable(&self) {
        let _call = self.call_lock.lock();
        self.command(MessageType::OFF, self.timeouts.off, "off");
    }

    pub fn status(&self) -> Option<ModuleStatus> {
        let _call = self.call_lock.lock();

        let request = RawMessage::command(
            MessageType::GET_STATUS,
            self.target,
            self.transport.local_address(),
        );
        let result = self
            .exchange(request, self.timeouts.data)
            .and_then(|reply| match reply.msg_type() {
                MessageType::ENABLED => Ok(ModuleStatus::Enabled),
                MessageType::DISABLED => Ok(ModuleStatus::Disabled),
                MessageType::ERROR => Ok(ModuleStatus::Error),
                other => Err(Error::malformed(format!(
                    "unexpected status reply {:?}",
                    other
                ))),
            });

        match result {
            Ok(status) => Some(status),
            Err(e) => {
                self.record_fault("get status", e);
                None
            }
        }
    }

    /// Ask the module to push data to `data_mbx` every `period_time` ms.
    /// Returns the period the module actually uses.
    pub fn fetch_continuous(
        &self,
        period_time: RackTime,
        data_mbx: ModuleAddress,
    ) -> Option<RackTime> {
        let _call = self.call_lock.lock();

        let request = RawMessage::from_codec(
            &GetContData::new(period_time, data_mbx),
            self.target,
            self.transport.local_address(),
        );
        let result = self
            .exchange(request, self.timeouts.data)
            .and_then(|reply| expect_reply_type(&reply, MessageType::CONT_DATA).map(|()| reply))
            .and_then(|reply| reply.open::<ContData>());

        match result {
            Ok(cont) => Some(cont.period_time),
            Err(e) => {
                self.record_fault("get continuous data", e);
                None
            }
        }
    }

    /// Stop continuous data to `data_mbx`. Failures are logged only.
    pub fn stop_continuous(&self, data_mbx: ModuleAddress) {
        let _call = self.call_lock.lock();

        let request = RawMessage::from_codec(
            &StopContData {
                data_mbx: data_mbx.raw(),
            },
            self.target,
            self.transport.local_address(),
        );
        let result = self
            .exchange(request, self.timeouts.data)
            .and_then(|reply| expect_reply_type(&reply, MessageType::OK));
        if let Err(e) = result {
            self.record_fault("stop continuous data", e);
        }
    }

    fn command(&self, msg_type: MessageType, timeout: Duration, verb: &str) {
        let request = RawMessage::command(msg_type, self.target, self.transport.local_address());
        let result = self
            .exchange(request, timeout)
            .and_then(|reply| expect_reply_type(&reply, MessageType::OK));
        if let Err(e) = result {
            self.record_fault(verb, e);
        }
    }

    fn exchange(&self, request: RawMessage, timeout: Duration) -> Result<RawMessage> {
        log::debug!("{}: sending {:?}", self.target, request.msg_type());
        let handle = self.transport.send(self.target, request)?;
        self.transport.await_reply(handle, timeout)
    }

    fn decode_data(&self, reply: &RawMessage) -> Result<Body> {
        expect_reply_type(reply, MessageType::DATA)?;
        reply.decode_body(self.kind)
    }

    fn record_fault(&self, operation: &str, error: Error) {
        log::warn!("{}: {} failed: {}", self.target, operation, error);
        *self.last_fault.lock() = Some(error);
    }
}

fn expect_reply_type(reply: &RawMessage, expected: MessageType) -> Result<()> {
    if reply.msg_type() != expected {
        return Err(Error::malformed(format!(
            "expected {:?} reply, got {:?}",
            expected,
            reply.msg_type()
        )));
    }
    Ok(())
}

/// Generate a proxy for one module class returning its typed data body.
macro_rules! typed_proxy {
    ($(#[$doc:meta])* $name:ident, $class:expr, $kind:ident, $data:ty) => {
        $(#[$doc])*
        pub struct $name {
            proxy: DataProxy,
        }

        impl $name {
            pub fn new(
                system_id: u32,
                instance_id: u32,
                transport: Arc<dyn Transport>,
                timeouts: ProxyTimeouts,
            ) -> Result<Self> {
                let target = ModuleAddress::new(system_id, u32::from($class), instance_id, 0)?;
                Ok(Self {
                    proxy: DataProxy::new(target, BodyKind::$kind, transport, timeouts)?,
                })
            }

            pub fn from_config(
                config: &RackConfig,
                instance_id: u32,
                transport: Arc<dyn Transport>,
            ) -> Result<Self> {
                Ok(Self {
                    proxy: DataProxy::from_config(
                        config,
                        $class,
                        instance_id,
                        BodyKind::$kind,
                        transport,
                    )?,
                })
            }

            pub fn get_data(&self, recording_time: RackTime) -> Option<$data> {
                let body = self.proxy.fetch(recording_time)?;
                self.unwrap_body(body)
            }

            pub fn get_latest(&self) -> Option<$data> {
                self.get_data(0)
            }

            pub fn get_next_data(&self) -> Option<$data> {
                let body = self.proxy.fetch_next()?;
                self.unwrap_body(body)
            }

            fn unwrap_body(&self, body: Body) -> Option<$data> {
                match body {
                    Body::$kind(data) => Some(data),
                    other => {
                        log::warn!(
                            "{}: unexpected body {:?}",
                            self.proxy.target(),
                            other.kind()
                        );
                        None
                    }
                }
            }

            pub fn enable(&self) {
                self.proxy.enable();
            }

            pub fn disable(&self) {
                self.proxy.disable();
            }

            pub fn proxy(&self) -> &DataProxy {
                &self.proxy
            }
        }
    };
}

typed_proxy!(
    /// Proxy for servo drive modules.
    ServoDriveProxy,
    class_id::SERVO_DRIVE,
    ServoDriveData,
    ServoDriveData
);

typed_proxy!(
    /// Proxy for path modules.
    PathProxy,
    class_id::PATH,
    Path,
    PathData
);
