use crate::mock_port::MockPort;
use spectroplot_communication::LinkMonitor;
use std::io;
use std::thread;
use std::time::{Duration, Instant};

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn test_monitor_updates_state_and_shuts_down() {
    let (link, port) = MockPort::link(100);
    port.push_read("<Idle|WPos:3.000,4.000,0.000|FS:0,0>\r\n");

    let mut monitor = LinkMonitor::spawn(link.clone(), Duration::from_millis(5)).unwrap();
    assert!(wait_for(|| link.snapshot().state == "Idle"));
    assert!(port.writes().iter().all(|w| w == "?\n"));

    monitor.shutdown();
    assert!(!monitor.is_running());
    assert!(!link.is_connected());
    assert_eq!(port.close_count(), 1);

    monitor.shutdown();
    assert_eq!(port.close_count(), 1);
}

#[test]
fn test_monitor_exits_on_disconnect() {
    let (link, port) = MockPort::link(100);
    port.push_read_error(io::ErrorKind::BrokenPipe);

    let monitor = LinkMonitor::spawn(link.clone(), Duration::from_millis(5)).unwrap();
    assert!(wait_for(|| !monitor.is_running()));
    assert_eq!(link.snapshot().state, "Disconnected");

    drop(monitor);
    assert_eq!(port.close_count(), 1);
}

#[test]
fn test_drop_closes_link() {
    let (link, port) = MockPort::link(100);
    let monitor = LinkMonitor::spawn(link.clone(), Duration::from_millis(5)).unwrap();
    drop(monitor);

    assert!(!link.is_connected());
    assert_eq!(port.close_count(), 1);
}
