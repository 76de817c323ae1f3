use crate::mock_port::MockPort;
use spectroplot_communication::{PlotterController, PlotterControllerConfig};
use spectroplot_core::{
    cancel_flag, Axis, ControllerError, Error, MoveKind, PartialPosition, Position3,
};
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

fn fast_config() -> PlotterControllerConfig {
    PlotterControllerConfig {
        idle_poll: Duration::from_millis(10),
        idle_timeout: Some(Duration::from_secs(5)),
    }
}

#[test]
fn test_absolute_move_sets_target() {
    let (link, port) = MockPort::link(100);
    link.lock()
        .state_mut()
        .set_position(Position3::new(40.0, 30.0, 0.0));
    let controller = PlotterController::new(link.clone(), fast_config());

    let cmd = controller
        .move_plotter(MoveKind::Absolute, &PartialPosition::y_only(10.0), 50)
        .unwrap();

    assert_eq!(cmd, "G90 G1 G21 Y10.0 F50\n");
    assert_eq!(port.commands(), vec![cmd]);
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.targeting, Position3::new(0.0, 10.0, 0.0));
}

#[test]
fn test_incremental_move_waits_for_idle() {
    let (link, port) = MockPort::link(100);
    {
        let mut inner = link.lock();
        inner.state_mut().set_status("Run");
        inner.state_mut().set_position(Position3::new(1.0, 2.0, 0.0));
    }
    let controller = PlotterController::new(link.clone(), fast_config());

    let mover = thread::spawn(move || {
        controller.move_plotter(MoveKind::Incremental, &PartialPosition::x_only(5.0), 100)
    });

    thread::sleep(Duration::from_millis(100));
    assert!(port.commands().is_empty());

    link.lock().state_mut().set_status("Idle");
    let cmd = mover.join().unwrap().unwrap();

    assert_eq!(cmd, "G91 G1 G21 X5.0 F100\n");
    assert_eq!(port.commands(), vec![cmd]);
    assert_eq!(link.snapshot().targeting, Position3::new(6.0, 2.0, 0.0));
}

#[test]
fn test_incremental_move_targets_each_axis() {
    let (link, _port) = MockPort::link(100);
    {
        let mut inner = link.lock();
        inner.state_mut().set_status("idle");
        inner.state_mut().set_position(Position3::new(1.0, 2.0, 0.0));
    }
    let controller = PlotterController::new(link.clone(), fast_config());

    controller
        .move_plotter(MoveKind::Incremental, &PartialPosition::xy(5.0, -2.0), 100)
        .unwrap();
    assert_eq!(link.snapshot().targeting, Position3::new(6.0, 0.0, 0.0));

    controller
        .move_plotter(MoveKind::Absolute, &PartialPosition::x_only(20.0), 100)
        .unwrap();
    assert_eq!(link.snapshot().targeting, Position3::new(20.0, 0.0, 0.0));
}

#[test]
fn test_incremental_move_resets_omitted_axes_to_position() {
    let (link, _port) = MockPort::link(100);
    link.lock().state_mut().set_status("Idle");
    let controller = PlotterController::new(link.clone(), fast_config());

    controller
        .move_plotter(MoveKind::Absolute, &PartialPosition::xy(50.0, 40.0), 100)
        .unwrap();
    assert_eq!(link.snapshot().targeting, Position3::new(50.0, 40.0, 0.0));

    // Only X has been reached when the next relative move is issued
    link.lock()
        .state_mut()
        .set_position(Position3::new(50.0, 10.0, 0.0));
    controller
        .move_plotter(MoveKind::Incremental, &PartialPosition::x_only(-5.0), 100)
        .unwrap();
    assert_eq!(link.snapshot().targeting, Position3::new(45.0, 10.0, 0.0));
}

#[test]
fn test_incremental_move_times_out() {
    let (link, port) = MockPort::link(100);
    link.lock().state_mut().set_status("Run");
    let controller = PlotterController::new(
        link,
        PlotterControllerConfig {
            idle_poll: Duration::from_millis(10),
            idle_timeout: Some(Duration::from_millis(50)),
        },
    );

    let err = controller
        .move_plotter(MoveKind::Incremental, &PartialPosition::x_only(1.0), 100)
        .unwrap_err();
    assert!(err.is_timeout());
    assert!(port.commands().is_empty());
}

#[test]
fn test_incremental_move_cancelled() {
    let (link, port) = MockPort::link(100);
    link.lock().state_mut().set_status("Hold");
    let controller = PlotterController::new(link, fast_config());

    let cancel = cancel_flag();
    cancel.store(true, Ordering::SeqCst);
    let err = controller
        .move_plotter_with_cancel(
            MoveKind::Incremental,
            &PartialPosition::x_only(1.0),
            100,
            &cancel,
        )
        .unwrap_err();

    assert!(matches!(err, Error::Controller(ControllerError::Cancelled)));
    assert!(port.commands().is_empty());
}

#[test]
fn test_unknown_move_kind_emits_nothing() {
    let (link, port) = MockPort::link(100);
    let controller = PlotterController::new(link, fast_config());

    let err = controller
        .move_named("diagonal", &PartialPosition::x_only(1.0), 100)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Controller(ControllerError::UnknownMoveKind { .. })
    ));
    assert!(port.writes().is_empty());
}

#[test]
fn test_non_finite_target_rejected() {
    let (link, port) = MockPort::link(100);
    let controller = PlotterController::new(link.clone(), fast_config());

    let err = controller
        .move_plotter(MoveKind::Absolute, &PartialPosition::x_only(f64::NAN), 100)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Controller(ControllerError::InvalidCommand { .. })
    ));
    assert!(port.writes().is_empty());
    assert_eq!(link.snapshot().targeting, Position3::default());
}

#[test]
fn test_control_commands() {
    let (link, port) = MockPort::link(100);
    let controller = PlotterController::new(link, fast_config());

    controller.unlock().unwrap();
    controller.zero(&[Axis::Y]).unwrap();
    controller.zero(&[Axis::X, Axis::Y, Axis::Z]).unwrap();
    controller.write_raw("$H").unwrap();

    assert_eq!(
        port.commands(),
        vec!["$X\n", "G10 P1 L20 Y0\n", "G10 P1 L20 X0 Y0 Z0\n", "$H\n"]
    );
}

#[test]
fn test_commands_after_close_fail() {
    let (link, port) = MockPort::link(100);
    let controller = PlotterController::new(link.clone(), fast_config());
    link.close();

    let err = controller.unlock().unwrap_err();
    assert!(matches!(err, Error::Controller(ControllerError::NotConnected)));
    assert!(controller
        .move_plotter(MoveKind::Incremental, &PartialPosition::x_only(1.0), 10)
        .is_err());
    assert!(port.writes().is_empty());
}
