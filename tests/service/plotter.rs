use crate::mocks::{report, start, test_config, wait_for};
use spectroplot::{Axis, ControllerError, Error, MoveKind, PartialPosition, Position3};
use spectroplot_core::cancel_flag;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_absolute_move_and_zero() {
    let harness = start(&test_config());
    let service = &harness.service;

    let cmd = service
        .move_plotter(MoveKind::Absolute, &PartialPosition::xy(12.0, 7.5), 800)
        .unwrap();
    assert_eq!(cmd, "G90 G1 G21 X12.0 Y7.5 F800\n");
    assert_eq!(service.snapshot().targeting, Position3::new(12.0, 7.5, 0.0));

    service.zero(&[Axis::X, Axis::Z]).unwrap();
    service.write_raw("$H").unwrap();

    assert_eq!(
        harness.port.commands(),
        vec![
            "$X\n".to_string(),
            cmd,
            "G10 P1 L20 X0 Z0\n".to_string(),
            "$H\n".to_string(),
        ]
    );
    service.shutdown();
}

#[test]
fn test_unknown_move_kind_rejected() {
    let harness = start(&test_config());
    let err = harness
        .service
        .move_named("diagonal", &PartialPosition::x_only(1.0), 100)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Controller(ControllerError::UnknownMoveKind { .. })
    ));
    assert_eq!(harness.port.commands(), vec!["$X\n".to_string()]);
    harness.service.shutdown();
}

#[test]
fn test_incremental_move_waits_for_reported_idle() {
    let harness = Arc::new(start(&test_config()));
    report(&harness, "Run", 1.0, 2.0);

    let mover = {
        let harness = harness.clone();
        thread::spawn(move || {
            harness
                .service
                .move_named("incremental", &PartialPosition::x_only(5.0), 100)
        })
    };

    thread::sleep(Duration::from_millis(50));
    assert_eq!(harness.port.commands(), vec!["$X\n".to_string()]);

    report(&harness, "Idle", 1.0, 2.0);
    let cmd = mover.join().unwrap().unwrap();
    assert_eq!(cmd, "G91 G1 G21 X5.0 F100\n");
    assert_eq!(
        harness.service.snapshot().targeting,
        Position3::new(6.0, 2.0, 0.0)
    );
    harness.service.shutdown();
}

#[test]
fn test_incremental_move_cancelled() {
    let harness = Arc::new(start(&test_config()));
    report(&harness, "Jog", 0.0, 0.0);

    let cancel = cancel_flag();
    let mover = {
        let harness = harness.clone();
        let cancel = cancel.clone();
        thread::spawn(move || {
            harness.service.move_with_cancel(
                MoveKind::Incremental,
                &PartialPosition::y_only(1.0),
                100,
                &cancel,
            )
        })
    };

    cancel.store(true, Ordering::SeqCst);
    let err = mover.join().unwrap().unwrap_err();
    assert!(matches!(err, Error::Controller(ControllerError::Cancelled)));
    assert!(wait_for(|| harness.port.commands() == vec!["$X\n".to_string()]));
    harness.service.shutdown();
}

#[test]
fn test_incremental_move_times_out() {
    let mut config = test_config();
    config.monitor.idle_timeout_ms = 30;
    let harness = start(&config);
    report(&harness, "Hold:0", 0.0, 0.0);

    let err = harness
        .service
        .move_plotter(MoveKind::Incremental, &PartialPosition::x_only(1.0), 100)
        .unwrap_err();
    assert!(err.is_timeout());
    harness.service.shutdown();
}

#[test]
fn test_spectrometer_pass_through() {
    let harness = start(&test_config());
    harness.service.set_lamp(true).unwrap();
    harness.service.set_lamp(false).unwrap();
    harness.service.clear_error().unwrap();

    let log = harness.spectrometer.log.lock();
    assert_eq!(log.lamp, vec![true, false]);
    assert_eq!(log.clears, 1);
    drop(log);
    harness.service.shutdown();
}
