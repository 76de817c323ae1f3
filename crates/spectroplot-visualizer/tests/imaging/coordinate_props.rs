use proptest::prelude::*;
use spectroplot_visualizer::{CanvasLayout, CoordinateSpace, XyPair};

fn pixel_size() -> impl Strategy<Value = f64> {
    // 0.05 mm steps between 0.05 and 10 mm
    (1u32..=200).prop_map(|steps| f64::from(steps) * 0.05)
}

proptest! {
    #[test]
    fn configure_covers_workspace_with_whole_cells(
        max_x in 10.0f64..200.0,
        max_y in 10.0f64..200.0,
        px in pixel_size(),
        py in pixel_size(),
    ) {
        let space = CoordinateSpace::configure(
            XyPair::new(max_x, max_y),
            XyPair::new(px, py),
            &CanvasLayout::default(),
        )
        .unwrap();

        let res = space.resolution();
        prop_assert_eq!(res.x, (max_x / px).floor() as usize);
        prop_assert_eq!(res.y, (max_y / py).floor() as usize);
        prop_assert_eq!(space.workspace_size_mm().x, px * res.x as f64);
        prop_assert_eq!(space.workspace_size_mm().y, py * res.y as f64);
    }

    #[test]
    fn cell_centre_round_trips(
        px in pixel_size(),
        py in pixel_size(),
        fx in 0.0f64..1.0,
        fy in 0.0f64..1.0,
    ) {
        let space = CoordinateSpace::configure(
            XyPair::new(200.0, 100.0),
            XyPair::new(px, py),
            &CanvasLayout::default(),
        )
        .unwrap();
        let res = space.resolution();
        let ix = ((fx * res.x as f64) as i64).min(res.x as i64 - 1);
        let iy = ((fy * res.y as f64) as i64).min(res.y as i64 - 1);

        let (wx, wy) = space.cell_to_workspace(ix, iy);
        prop_assert_eq!(space.workspace_to_cell(wx, wy), (ix, iy));
        prop_assert!(space.check_cell(ix, iy).is_ok());

        let (dx, dy) = space.cell_to_display(ix, iy);
        prop_assert_eq!(space.display_to_cell(dx, dy), (ix, iy));
    }

    #[test]
    fn display_stays_inside_plot_box(
        wx in 0.0f64..=200.0,
        wy in 0.0f64..=100.0,
    ) {
        let space = CoordinateSpace::configure(
            XyPair::new(200.0, 100.0),
            XyPair::new(2.0, 2.0),
            &CanvasLayout::default(),
        )
        .unwrap();
        let (left, top, right, bottom) = space.transform().plot_box();
        let (dx, dy) = space.workspace_to_display(wx, wy);
        prop_assert!(dx >= left - 1e-9 && dx <= right + 1e-9);
        prop_assert!(dy >= top - 1e-9 && dy <= bottom + 1e-9);
    }
}

#[test]
fn test_small_pixels_round_trip_at_far_edge() {
    let space = CoordinateSpace::configure(
        XyPair::new(200.0, 100.0),
        XyPair::new(0.1, 0.1),
        &CanvasLayout::default(),
    )
    .unwrap();
    let res = space.resolution();
    let last = (res.x as i64 - 1, res.y as i64 - 1);
    let (wx, wy) = space.cell_to_workspace(last.0, last.1);
    assert_eq!(space.workspace_to_cell(wx, wy), last);
}
