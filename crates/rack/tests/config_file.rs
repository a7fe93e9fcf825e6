// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Loading proxy configuration from disk.

use rack::{
    class_id, BodyKind, ConfigError, DataProxy, LocalBus, ModuleAddress, RackConfig,
    ServoDriveProxy,
};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn load_config_and_build_proxies() {
    let file = write_config(
        r#"
system_id = 2

[timeouts]
on_ms = 3000
data_ms = 250
"#,
    );

    let config = RackConfig::from_file(file.path()).unwrap();
    assert_eq!(config.system_id, 2);

    let timeouts = config.proxy_timeouts();
    assert_eq!(timeouts.on, Duration::from_millis(3000));
    assert_eq!(timeouts.off, Duration::from_millis(5000));
    assert_eq!(timeouts.data, Duration::from_millis(250));

    let bus = LocalBus::new();
    let transport = Arc::new(bus.transport(ModuleAddress::from_raw(0x0202_0001)));

    let servo = ServoDriveProxy::from_config(&config, 3, transport.clone()).unwrap();
    assert_eq!(servo.proxy().target().display_name(), "ServoDrive(2/3)");
    assert_eq!(servo.proxy().timeouts(), timeouts);

    let gps = DataProxy::from_config(
        &config,
        class_id::GPS,
        1,
        BodyKind::ServoDriveData,
        transport,
    )
    .unwrap();
    assert_eq!(gps.target().raw(), 0x0216_0100);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = RackConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn invalid_file_is_rejected() {
    let file = write_config("system_id = 300\n");
    assert!(matches!(
        RackConfig::from_file(file.path()),
        Err(ConfigError::Invalid(_))
    ));

    let file = write_config("[timeouts]\ndata_ms = 0\n");
    assert!(matches!(
        RackConfig::from_file(file.path()),
        Err(ConfigError::Invalid(_))
    ));
}
