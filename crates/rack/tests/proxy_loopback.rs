// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Proxies talking to module threads over the in-process bus.
//
// Each test registers a fake module mailbox, serves it from a thread and
// drives it through the public proxy API.

#![allow(clippy::float_cmp)]

use parking_lot::Mutex;
use rack::message::{ContData, GetContData, GetData, StopContData};
use rack::{
    class_id, BodyKind, ByteOrder, DataProxy, Error, LocalBus, Mailbox, MessageType,
    ModuleAddress, ModuleStatus, Param, ParamMsg, ParamValue, PathData, PathProxy, Point2d,
    ProxyTimeouts, RawMessage, ServoDriveData, ServoDriveProxy,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const CLIENT: ModuleAddress = ModuleAddress::from_raw(0x0002_0001);

fn servo_address(instance: u32) -> ModuleAddress {
    ModuleAddress::of(u32::from(class_id::SERVO_DRIVE), instance).unwrap()
}

fn timeouts() -> ProxyTimeouts {
    ProxyTimeouts::uniform(Duration::from_secs(2))
}

/// Fake module: answers every request with `handler`, or stays silent on
/// `None`. Stops when `stop` is set.
struct Module {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Module {
    fn spawn<F>(mailbox: Mailbox, handler: F) -> Self
    where
        F: Fn(&Mailbox, &rack::transport::Request, RawMessage) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = thread::spawn(move || {
            while !flag.load(Ordering::Acquire) {
                if let Some(request) = mailbox.recv_timeout(Duration::from_millis(10)) {
                    let message = request.message().unwrap();
                    handler(&mailbox, &request, message);
                }
            }
        });
        Self {
            stop,
            thread: Some(thread),
        }
    }

    fn serve<F>(mailbox: Mailbox, handler: F) -> Self
    where
        F: Fn(RawMessage) -> Option<RawMessage> + Send + 'static,
    {
        Self::spawn(mailbox, move |mailbox, request, message| {
            if let Some(reply) = handler(message) {
                // the proxy may have given up already
                let _ = mailbox.reply(request, reply);
            }
        })
    }
}

impl Drop for Module {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn ack(msg_type: MessageType) -> RawMessage {
    RawMessage::command(msg_type, ModuleAddress::default(), ModuleAddress::default())
}

#[test]
fn servo_drive_get_data_over_bus() {
    let bus = LocalBus::new();
    let target = servo_address(0);
    let _module = Module::serve(bus.register(target).unwrap(), |request| {
        assert_eq!(request.msg_type(), MessageType::GET_DATA);
        let threshold = request.open::<GetData>().unwrap().recording_time;
        Some(RawMessage::from_codec(
            &ServoDriveData {
                recording_time: threshold.max(1000),
                position: 3.5,
            },
            request.header.src,
            request.header.dest,
        ))
    });

    let proxy = ServoDriveProxy::new(0, 0, Arc::new(bus.transport(CLIENT)), timeouts()).unwrap();

    let latest = proxy.get_latest().unwrap();
    assert_eq!(latest.recording_time, 1000);
    assert_eq!(latest.position, 3.5);

    let fresh = proxy.get_data(2500).unwrap();
    assert_eq!(fresh.recording_time, 2500);
    assert_eq!(proxy.proxy().last_fault(), None);
}

#[test]
fn little_endian_reply_is_decoded() {
    let bus = LocalBus::new();
    let target = servo_address(1);
    let _module = Module::serve(bus.register(target).unwrap(), |request| {
        Some(RawMessage::from_codec_as(
            &ServoDriveData {
                recording_time: 42,
                position: -7.25,
            },
            ByteOrder::Little,
            request.header.src,
            request.header.dest,
        ))
    });

    let proxy = ServoDriveProxy::new(0, 1, Arc::new(bus.transport(CLIENT)), timeouts()).unwrap();
    let data = proxy.get_latest().unwrap();
    assert_eq!(data.recording_time, 42);
    assert_eq!(data.position, -7.25);
}

#[test]
fn path_proxy_preserves_point_order() {
    let bus = LocalBus::new();
    let target = ModuleAddress::of(u32::from(class_id::PATH), 0).unwrap();
    let points = vec![Point2d::new(1, 2), Point2d::new(3, 4), Point2d::new(-5, 6)];
    let served = points.clone();
    let _module = Module::serve(bus.register(target).unwrap(), move |request| {
        Some(RawMessage::from_codec(
            &PathData {
                points: served.clone(),
            },
            request.header.src,
            request.header.dest,
        ))
    });

    let proxy = PathProxy::new(0, 0, Arc::new(bus.transport(CLIENT)), timeouts()).unwrap();
    assert_eq!(proxy.get_latest().unwrap().points, points);
}

#[test]
fn silent_module_times_out() {
    let bus = LocalBus::new();
    let target = servo_address(2);
    let _module = Module::serve(bus.register(target).unwrap(), |_| None);

    let proxy = ServoDriveProxy::new(
        0,
        2,
        Arc::new(bus.transport(CLIENT)),
        ProxyTimeouts::uniform(Duration::from_millis(50)),
    )
    .unwrap();

    let started = Instant::now();
    assert_eq!(proxy.get_latest(), None);
    assert!(started.elapsed() >= Duration::from_millis(50));
    assert_eq!(proxy.proxy().last_fault(), Some(Error::Timeout));
}

#[test]
fn late_reply_does_not_leak_into_next_call() {
    let bus = LocalBus::new();
    let target = servo_address(3);
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let _module = Module::serve(bus.register(target).unwrap(), move |request| {
        let call = seen.fetch_add(1, Ordering::SeqCst);
        if call == 0 {
            // first answer arrives after the proxy gave up
            thread::sleep(Duration::from_millis(150));
        }
        Some(RawMessage::from_codec(
            &ServoDriveData {
                recording_time: call as u32,
                position: 0.0,
            },
            request.header.src,
            request.header.dest,
        ))
    });

    let proxy = ServoDriveProxy::new(
        0,
        3,
        Arc::new(bus.transport(CLIENT)),
        ProxyTimeouts::uniform(Duration::from_millis(50)),
    )
    .unwrap();

    assert_eq!(proxy.get_latest(), None);
    thread::sleep(Duration::from_millis(200));

    let data = proxy.get_latest().unwrap();
    assert_eq!(data.recording_time, 1);
}

#[test]
fn malformed_reply_yields_none() {
    let bus = LocalBus::new();
    let target = servo_address(4);
    let _module = Module::spawn(bus.register(target).unwrap(), |mailbox, request, message| {
        let mut bytes = RawMessage::from_codec(
            &ServoDriveData::default(),
            message.header.src,
            message.header.dest,
        )
        .to_bytes();
        // header still claims the full body
        bytes.truncate(bytes.len() - 2);
        let _ = mailbox.reply_bytes(request, bytes);
    });

    let proxy = ServoDriveProxy::new(0, 4, Arc::new(bus.transport(CLIENT)), timeouts()).unwrap();
    assert_eq!(proxy.get_latest(), None);
    assert!(proxy
        .proxy()
        .last_fault()
        .is_some_and(|e| e.is_decode_error()));
}

#[test]
fn error_reply_yields_none() {
    let bus = LocalBus::new();
    let target = servo_address(5);
    let _module = Module::serve(bus.register(target).unwrap(), |_| {
        Some(ack(MessageType::NOT_AVAILABLE))
    });

    let proxy = ServoDriveProxy::new(0, 5, Arc::new(bus.transport(CLIENT)), timeouts()).unwrap();
    assert_eq!(proxy.get_latest(), None);
}

#[test]
fn enable_disable_and_status() {
    let bus = LocalBus::new();
    let target = servo_address(6);
    let enabled = Arc::new(AtomicBool::new(false));
    let state = Arc::clone(&enabled);
    let _module = Module::serve(bus.register(target).unwrap(), move |request| {
        match request.msg_type() {
            MessageType::ON => {
                state.store(true, Ordering::SeqCst);
                Some(ack(MessageType::OK))
            }
            MessageType::OFF => {
                state.store(false, Ordering::SeqCst);
                Some(ack(MessageType::OK))
            }
            MessageType::GET_STATUS => Some(ack(if state.load(Ordering::SeqCst) {
                MessageType::ENABLED
            } else {
                MessageType::DISABLED
            })),
            _ => Some(ack(MessageType::ERROR)),
        }
    });

    let proxy = DataProxy::new(
        target,
        BodyKind::ServoDriveData,
        Arc::new(bus.transport(CLIENT)),
        timeouts(),
    )
    .unwrap();

    assert_eq!(proxy.status(), Some(ModuleStatus::Disabled));
    proxy.enable();
    assert!(enabled.load(Ordering::SeqCst));
    assert_eq!(proxy.status(), Some(ModuleStatus::Enabled));
    proxy.disable();
    assert_eq!(proxy.status(), Some(ModuleStatus::Disabled));
    assert_eq!(proxy.last_fault(), None);
}

#[test]
fn enable_without_module_is_silent() {
    let bus = LocalBus::new();
    let proxy = DataProxy::new(
        servo_address(7),
        BodyKind::ServoDriveData,
        Arc::new(bus.transport(CLIENT)),
        timeouts(),
    )
    .unwrap();
    proxy.enable();
    assert!(matches!(proxy.last_fault(), Some(Error::TransportFault(_))));
    assert_eq!(proxy.status(), None);
}

#[test]
fn continuous_data_registration() {
    let bus = LocalBus::new();
    let target = servo_address(8);
    let subscribed = Arc::new(AtomicUsize::new(0));
    let mbx = Arc::clone(&subscribed);
    let _module = Module::serve(bus.register(target).unwrap(), move |request| {
        match request.msg_type() {
            MessageType::GET_CONT_DATA => {
                let body = request.open::<GetContData>().unwrap();
                mbx.store(body.data_mbx as usize, Ordering::SeqCst);
                // producer runs at 100 ms at most
                Some(RawMessage::from_codec(
                    &ContData {
                        period_time: body.period_time.max(100),
                    },
                    request.header.src,
                    request.header.dest,
                ))
            }
            MessageType::STOP_CONT_DATA => {
                let body = request.open::<StopContData>().unwrap();
                if body.data_mbx as usize == mbx.load(Ordering::SeqCst) {
                    mbx.store(0, Ordering::SeqCst);
                }
                Some(ack(MessageType::OK))
            }
            _ => Some(ack(MessageType::ERROR)),
        }
    });

    let proxy = DataProxy::new(
        target,
        BodyKind::ServoDriveData,
        Arc::new(bus.transport(CLIENT)),
        timeouts(),
    )
    .unwrap();
    let data_mbx = CLIENT.mailbox(2);

    assert_eq!(proxy.fetch_continuous(20, data_mbx), Some(100));
    assert_eq!(subscribed.load(Ordering::SeqCst), data_mbx.raw() as usize);

    proxy.stop_continuous(data_mbx);
    assert_eq!(subscribed.load(Ordering::SeqCst), 0);
    assert_eq!(proxy.last_fault(), None);
}

#[test]
fn concurrent_callers_are_serialized() {
    let bus = LocalBus::new();
    let target = servo_address(9);
    let overlapped = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&overlapped);
    let _module = Module::spawn(bus.register(target).unwrap(), move |mailbox, request, message| {
        thread::sleep(Duration::from_millis(5));
        // a second request from the same proxy must not be queued yet
        if let Some(extra) = mailbox.try_recv() {
            flag.store(true, Ordering::SeqCst);
            let _ = mailbox.reply(&extra, ack(MessageType::ERROR));
        }
        let reply = RawMessage::from_codec(
            &ServoDriveData {
                recording_time: request.id() as u32,
                position: 1.0,
            },
            message.header.src,
            message.header.dest,
        );
        let _ = mailbox.reply(request, reply);
    });

    let proxy = Arc::new(
        ServoDriveProxy::new(0, 9, Arc::new(bus.transport(CLIENT)), timeouts()).unwrap(),
    );

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let proxy = Arc::clone(&proxy);
            thread::spawn(move || (0..5).filter(|_| proxy.get_latest().is_some()).count())
        })
        .collect();
    let answered: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();

    assert_eq!(answered, 40);
    assert!(!overlapped.load(Ordering::SeqCst));
}

#[test]
fn next_data_waits_for_new_sample() {
    let bus = LocalBus::new();
    let target = servo_address(10);
    let _module = Module::serve(bus.register(target).unwrap(), |request| {
        let recording_time = match request.msg_type() {
            MessageType::GET_DATA => 100,
            MessageType::GET_NEXT_DATA => {
                assert!(request.body.is_empty());
                // next sample is produced one cycle later
                thread::sleep(Duration::from_millis(20));
                120
            }
            _ => return Some(ack(MessageType::ERROR)),
        };
        Some(RawMessage::from_codec(
            &ServoDriveData {
                recording_time,
                position: 0.5,
            },
            request.header.src,
            request.header.dest,
        ))
    });

    let proxy = ServoDriveProxy::new(0, 10, Arc::new(bus.transport(CLIENT)), timeouts()).unwrap();
    assert_eq!(proxy.get_latest().unwrap().recording_time, 100);
    assert_eq!(proxy.get_next_data().unwrap().recording_time, 120);
}

#[test]
fn parameters_over_bus() {
    let bus = LocalBus::new();
    let target = servo_address(11);
    let stored = Arc::new(Mutex::new(ParamMsg::new(vec![
        Param::int32("mode", 1),
        Param::float("max_speed", 800.0),
        Param::string("device", "/dev/ttyS0"),
    ])));
    let params = Arc::clone(&stored);
    let _module = Module::serve(bus.register(target).unwrap(), move |request| {
        match request.msg_type() {
            MessageType::GET_PARAM => Some(RawMessage::from_codec_as(
                &*params.lock(),
                ByteOrder::Little,
                request.header.src,
                request.header.dest,
            )),
            MessageType::SET_PARAM => {
                let update = request.open::<ParamMsg>().ok()?;
                let mut current = params.lock();
                for new in update.params {
                    if let Some(slot) = current.params.iter_mut().find(|p| p.name() == new.name()) {
                        *slot = new;
                    }
                }
                Some(ack(MessageType::OK))
            }
            _ => Some(ack(MessageType::ERROR)),
        }
    });

    let proxy = DataProxy::new(
        target,
        BodyKind::ServoDriveData,
        Arc::new(bus.transport(CLIENT)),
        timeouts(),
    )
    .unwrap();

    let current = proxy.get_parameter().unwrap();
    assert_eq!(current, *stored.lock());
    assert_eq!(
        current.get("max_speed").unwrap().value(),
        Some(ParamValue::Float(800.0))
    );

    proxy.set_parameter(&ParamMsg::new(vec![Param::float("max_speed", 1200.0)]));
    assert_eq!(proxy.last_fault(), None);

    let updated = proxy.get_parameter().unwrap();
    assert_eq!(
        updated.get("max_speed").unwrap().value(),
        Some(ParamValue::Float(1200.0))
    );
    assert_eq!(updated.get("mode").unwrap().value(), Some(ParamValue::Int32(1)));
}

#[test]
fn rejected_set_parameter_is_silent() {
    let bus = LocalBus::new();
    let target = servo_address(12);
    let _module = Module::serve(bus.register(target).unwrap(), |_| Some(ack(MessageType::ERROR)));

    let proxy = DataProxy::new(
        target,
        BodyKind::ServoDriveData,
        Arc::new(bus.transport(CLIENT)),
        timeouts(),
    )
    .unwrap();
    proxy.set_parameter(&ParamMsg::new(vec![Param::int32("mode", 2)]));
    assert!(matches!(proxy.last_fault(), Some(Error::MalformedMessage(_))));
}

#[test]
fn request_kind_cannot_back_a_proxy() {
    let bus = LocalBus::new();
    let result = DataProxy::new(
        servo_address(13),
        BodyKind::GetData,
        Arc::new(bus.transport(CLIENT)),
        timeouts(),
    );
    assert_eq!(result.err(), Some(Error::NotDataPayload(BodyKind::GetData)));
}
