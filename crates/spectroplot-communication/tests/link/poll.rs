use crate::mock_port::MockPort;
use spectroplot_communication::PollOutcome;
use spectroplot_core::{Position3, STATUS_DISCONNECTED};
use std::io;

#[test]
fn test_poll_parses_status_frame() {
    let (link, port) = MockPort::link(100);
    port.push_read("<Idle|WPos:1.000,2.000,0.000|FS:0,0>\r\n");

    let outcome = link.poll_once().unwrap();
    assert_eq!(
        outcome,
        PollOutcome {
            frames: 1,
            telemetry_lines: 0,
            dropped: 0
        }
    );

    let snapshot = link.snapshot();
    assert_eq!(snapshot.state, "Idle");
    assert_eq!(snapshot.position, Position3::new(1.0, 2.0, 0.0));
    assert_eq!(port.writes(), vec!["?\n"]);
}

#[test]
fn test_poll_snaps_near_zero_positions() {
    let (link, port) = MockPort::link(100);
    port.push_read("<Idle|WPos:-0.010,-0.020,0.005>\r\n");
    link.poll_once().unwrap();

    let position = link.snapshot().position;
    assert_eq!(position.x, 0.0);
    assert_eq!(position.y, -0.02);
    assert_eq!(position.z, 0.005);
}

#[test]
fn test_blank_lines_dropped_and_others_buffered() {
    let (link, port) = MockPort::link(100);
    port.push_read("ok\r\n\r\nGrbl 1.1h ['$' for help]\r\n");

    let outcome = link.poll_once().unwrap();
    assert_eq!(outcome.telemetry_lines, 2);
    assert_eq!(
        link.drain_telemetry(),
        vec!["ok", "Grbl 1.1h ['$' for help]"]
    );
    assert!(link.drain_telemetry().is_empty());
}

#[test]
fn test_malformed_frame_keeps_previous_state() {
    let (link, port) = MockPort::link(100);
    port.push_read("<Idle|WPos:1.000,2.000,0.000>\r\n");
    link.poll_once().unwrap();

    port.push_read("<Run|WPos:1.0,abc,0.0>\r\n<Run>\r\n");
    let outcome = link.poll_once().unwrap();
    assert_eq!(outcome.dropped, 2);

    let snapshot = link.snapshot();
    assert_eq!(snapshot.state, "Idle");
    assert_eq!(snapshot.position, Position3::new(1.0, 2.0, 0.0));
    assert!(link.drain_telemetry().is_empty());
}

#[test]
fn test_line_split_across_cycles() {
    let (link, port) = MockPort::link(100);
    port.push_read("<Run|WPos:5.0,");
    assert_eq!(link.poll_once().unwrap().frames, 0);

    port.push_read("6.0,0.0|FS:100,0>\r\n");
    assert_eq!(link.poll_once().unwrap().frames, 1);

    let snapshot = link.snapshot();
    assert_eq!(snapshot.state, "Run");
    assert_eq!(snapshot.position, Position3::new(5.0, 6.0, 0.0));
}

#[test]
fn test_multibyte_character_split_across_reads() {
    let (link, port) = MockPort::link(100);
    let text = "[MSG:café]\r\n".as_bytes();
    let split = text.iter().position(|&b| b == 0xC3).unwrap() + 1;
    port.push_read_bytes(&text[..split]);
    port.push_read_bytes(&text[split..]);

    assert_eq!(link.poll_once().unwrap().telemetry_lines, 1);
    assert_eq!(link.drain_telemetry(), vec!["[MSG:café]"]);
}

#[test]
fn test_multibyte_character_split_across_cycles() {
    let (link, port) = MockPort::link(100);
    port.push_read_bytes(b"\xE2\x82");
    assert_eq!(link.poll_once().unwrap().telemetry_lines, 0);

    port.push_read_bytes(b"\xAC 5\r\n");
    link.poll_once().unwrap();
    assert_eq!(link.drain_telemetry(), vec!["\u{20AC} 5"]);
}

#[test]
fn test_unterminated_input_is_flushed() {
    let (link, port) = MockPort::link(100);
    port.push_read(&"x".repeat(10_000));

    let outcome = link.poll_once().unwrap();
    assert!(outcome.telemetry_lines >= 1);
    let flushed = link.drain_telemetry();
    assert_eq!(flushed.len(), outcome.telemetry_lines);
    assert!(flushed.iter().all(|line| line.len() < 10_000));

    port.push_read("\nok\r\n");
    link.poll_once().unwrap();
    let rest = link.drain_telemetry();
    assert_eq!(rest.last().map(String::as_str), Some("ok"));

    let total: usize = flushed.iter().chain(&rest[..rest.len() - 1]).map(String::len).sum();
    assert_eq!(total, 10_000);
    assert!(flushed.iter().chain(&rest).all(|l| l == "ok" || l.chars().all(|c| c == 'x')));
}

#[test]
fn test_long_input_read_in_chunks() {
    let (link, port) = MockPort::link(1000);
    let lines: String = (0..200).map(|i| format!("[MSG:line {}]\r\n", i)).collect();
    port.push_read(&lines);

    assert_eq!(link.poll_once().unwrap().telemetry_lines, 200);
}

#[test]
fn test_telemetry_keeps_last_lines() {
    let (link, port) = MockPort::link(3);
    port.push_read("a\nb\nc\nd\ne\n");
    link.poll_once().unwrap();

    assert_eq!(link.lock().telemetry().evicted(), 2);
    assert_eq!(link.drain_telemetry(), vec!["c", "d", "e"]);
}

#[test]
fn test_read_error_disconnects_once() {
    let (link, port) = MockPort::link(100);
    port.push_read_error(io::ErrorKind::BrokenPipe);

    let err = link.poll_once().unwrap_err();
    assert!(err.is_connection_error());
    assert_eq!(link.snapshot().state, STATUS_DISCONNECTED);
    assert!(!link.is_connected());
    assert_eq!(port.close_count(), 1);

    assert!(!link.close());
    assert!(link.poll_once().is_err());
    assert_eq!(port.close_count(), 1);
}

#[test]
fn test_interrupted_read_is_retried() {
    let (link, port) = MockPort::link(100);
    port.push_read_error(io::ErrorKind::Interrupted);
    port.push_read("<Idle|WPos:0,0,0>\n");

    assert_eq!(link.poll_once().unwrap().frames, 1);
    assert!(link.is_connected());
}

#[test]
fn test_write_error_disconnects() {
    let (link, port) = MockPort::link(100);
    port.fail_writes();

    assert!(link.write_command("$X\n").is_err());
    assert_eq!(link.snapshot().state, STATUS_DISCONNECTED);
    assert_eq!(port.close_count(), 1);
}

#[test]
fn test_close_is_exactly_once() {
    let (link, port) = MockPort::link(100);
    assert!(link.close());
    assert!(!link.close());
    assert_eq!(port.close_count(), 1);
}
