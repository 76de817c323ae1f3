use crate::mocks::{start, test_config, wait_for};
use spectroplot::{Config, ControllerError, Error, MoveKind, PartialPosition, XyPair};
use std::fs;
use std::io;
use tempfile::TempDir;

#[test]
fn test_unlock_sent_on_connect() {
    let harness = start(&test_config());
    assert_eq!(harness.port.commands(), vec!["$X\n".to_string()]);
    assert!(harness.service.is_connected());
    assert!(harness.service.is_monitoring());
    harness.service.shutdown();
}

#[test]
fn test_unlock_on_connect_disabled() {
    let mut config = test_config();
    config.monitor.unlock_on_connect = false;
    let harness = start(&config);
    assert!(harness.port.commands().is_empty());
    harness.service.shutdown();
}

#[test]
fn test_shutdown_closes_link_once() {
    let harness = start(&test_config());
    harness.service.shutdown();
    assert!(!harness.service.is_connected());
    assert!(!harness.service.is_monitoring());
    assert_eq!(harness.port.close_count(), 1);

    harness.service.shutdown();
    drop(harness.service);
    assert_eq!(harness.port.close_count(), 1);
}

#[test]
fn test_commands_rejected_after_shutdown() {
    let harness = start(&test_config());
    harness.service.shutdown();

    let err = harness
        .service
        .move_plotter(MoveKind::Absolute, &PartialPosition::x_only(1.0), 100)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Controller(ControllerError::NotConnected)
    ));
    assert!(harness.service.unlock().is_err());
}

#[test]
fn test_link_failure_marks_disconnected() {
    let harness = start(&test_config());
    harness.port.push_read_error(io::ErrorKind::BrokenPipe);

    assert!(wait_for(|| !harness.service.is_monitoring()));
    assert_eq!(harness.service.snapshot().state, "Disconnected");
    assert!(!harness.service.is_connected());
    assert_eq!(harness.port.close_count(), 1);
}

#[test]
fn test_telemetry_drained_in_order() {
    let harness = start(&test_config());
    harness.port.push_read("ok\r\nALARM:1\r\n");

    assert!(wait_for(|| harness.service.controller().link().lock().telemetry().len() == 2));
    assert_eq!(
        harness.service.drain_telemetry(),
        vec!["ok".to_string(), "ALARM:1".to_string()]
    );
    assert!(harness.service.drain_telemetry().is_empty());
    harness.service.shutdown();
}

#[test]
fn test_start_from_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("spectroplot.toml");
    fs::write(
        &path,
        "[monitor]\n\
         unlock_on_connect = false\n\
         poll_interval_ms = 5\n\
         \n\
         [imaging.pixel_size_mm]\n\
         x = 4.0\n\
         y = 5.0\n",
    )
    .unwrap();

    let config = Config::load_or_default(&path).unwrap();
    let harness = start(&config);
    assert!(harness.port.commands().is_empty());
    assert_eq!(
        harness.service.coordinate_space().resolution(),
        XyPair::new(50, 20)
    );
    harness.service.shutdown();
}
