use proptest::prelude::*;
use spectroplot_communication::StatusParser;
use spectroplot_core::Position3;

proptest! {
    #[test]
    fn parse_frame_never_panics(line in "\\PC*") {
        let _ = StatusParser::parse_frame(&line);
    }

    #[test]
    fn parse_frame_reads_three_decimals(
        x in -500.0f64..500.0,
        y in -500.0f64..500.0,
        z in -50.0f64..50.0,
    ) {
        let line = format!("<Idle|WPos:{:.3},{:.3},{:.3}|FS:0,0>", x, y, z);
        let frame = StatusParser::parse_frame(&line).unwrap();
        let expected = Position3::new(
            format!("{:.3}", x).parse().unwrap(),
            format!("{:.3}", y).parse().unwrap(),
            format!("{:.3}", z).parse().unwrap(),
        );
        prop_assert_eq!(frame.state, "Idle");
        prop_assert_eq!(frame.position, expected);
    }
}
