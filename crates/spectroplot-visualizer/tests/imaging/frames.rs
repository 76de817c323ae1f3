use spectroplot_core::{MachineStateSnapshot, Position3, ScanResult};
use spectroplot_visualizer::{
    CanvasLayout, FrameGenerator, IdentityProcessor, ScanWorkspace, XyPair,
};

fn workspace() -> ScanWorkspace {
    ScanWorkspace::new(
        XyPair::new(40.0, 20.0),
        XyPair::new(2.0, 2.0),
        CanvasLayout {
            width_px: 400,
            ..Default::default()
        },
        Box::new(IdentityProcessor),
        (2.0, 98.0),
    )
    .unwrap()
}

fn state(x: f64, y: f64) -> MachineStateSnapshot {
    MachineStateSnapshot {
        state: "Idle".to_string(),
        position: Position3::new(x, y, 0.0),
        targeting: Position3::new(10.0, 10.0, 0.0),
    }
}

#[test]
fn test_frames_carry_state_metadata() {
    let ws = workspace();
    let mut generator = FrameGenerator::default();

    let frame = generator
        .next_frame(ws.image(), ws.space(), state(5.0, 7.5))
        .unwrap();
    assert_eq!(frame.sequence, 1);
    assert_eq!(frame.state.state, "Idle");
    assert_eq!(frame.image.content_type, "image/png");

    let headers = frame.headers();
    let lookup = |name: &str| {
        headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.clone())
            .unwrap()
    };
    assert_eq!(lookup("Plotter-State"), "Idle");
    assert_eq!(lookup("Plotter-Position"), r#"{"x":5.0,"y":7.5,"z":0.0}"#);
    assert_eq!(lookup("Targeting-Position"), r#"{"x":10.0,"y":10.0,"z":0.0}"#);
    assert_eq!(lookup("Content-Length"), frame.image.bytes.len().to_string());
}

#[test]
fn test_generator_reuses_surface_across_resizes() {
    let mut ws = workspace();
    let mut generator = FrameGenerator::default();

    ws.store_at_position(3.0, 3.0, ScanResult::new(vec![1.0], vec![]))
        .unwrap();
    ws.store_at_position(9.0, 3.0, ScanResult::new(vec![4.0], vec![]))
        .unwrap();
    generator
        .next_frame(ws.image(), ws.space(), state(0.0, 0.0))
        .unwrap();

    ws.set_pixel_size(XyPair::new(4.0, 4.0)).unwrap();
    let frame = generator
        .next_frame(ws.image(), ws.space(), state(0.0, 0.0))
        .unwrap();
    assert_eq!(frame.sequence, 2);
    assert_eq!(generator.frames_rendered(), 2);
}
