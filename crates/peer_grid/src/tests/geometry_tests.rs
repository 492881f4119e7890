use super::*;

const AREA: Rect = Rect::new(0.0, 140.0, 400.0, 600.0);

#[test]
fn one_over_two_puts_first_peer_across_the_top() {
    assert_eq!(
        slot_frame(Arrangement::OneOverTwo, 0, AREA),
        Rect::new(0.0, 140.0, 400.0, 300.0)
    );
    assert_eq!(
        slot_frame(Arrangement::OneOverTwo, 1, AREA),
        Rect::new(0.0, 440.0, 200.0, 300.0)
    );
    assert_eq!(
        slot_frame(Arrangement::OneOverTwo, 2, AREA),
        Rect::new(200.0, 440.0, 200.0, 300.0)
    );
}

#[test]
fn quad_fills_rows_left_to_right() {
    let frames: Vec<Rect> = (0..4)
        .map(|slot| slot_frame(Arrangement::Quad, slot, AREA))
        .collect();

    assert_eq!(frames[0], Rect::new(0.0, 140.0, 200.0, 300.0));
    assert_eq!(frames[1], Rect::new(200.0, 140.0, 200.0, 300.0));
    assert_eq!(frames[2], Rect::new(0.0, 440.0, 200.0, 300.0));
    assert_eq!(frames[3], Rect::new(200.0, 440.0, 200.0, 300.0));
}

#[test]
fn slot_outside_arrangement_collapses() {
    assert_eq!(
        slot_frame(Arrangement::Single, 1, AREA),
        Rect::new(0.0, 140.0, 0.0, 0.0)
    );
}

#[test]
fn local_preview_sits_in_top_right_corner() {
    assert_eq!(
        local_preview_frame(AREA),
        Rect::new(275.0, 145.0, LOCAL_PREVIEW_WIDTH, LOCAL_PREVIEW_HEIGHT)
    );
}

#[test]
fn local_preview_shrinks_to_fit_tiny_viewports() {
    let frame = local_preview_frame(Rect::new(0.0, 0.0, 50.0, 40.0));

    assert_eq!(frame.width, 40.0);
    assert_eq!(frame.height, 30.0);
    assert_eq!(frame.x, 5.0);
    assert_eq!(frame.y, 5.0);
}
