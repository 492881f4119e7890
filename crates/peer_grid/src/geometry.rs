use serde::Serialize;

use crate::Arrangement;

pub const LOCAL_PREVIEW_WIDTH: f32 = 120.0;
pub const LOCAL_PREVIEW_HEIGHT: f32 = 150.0;
/// Distance of the preview overlay from the top-right corner.
pub const LOCAL_PREVIEW_INSET: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn fraction(&self, fx: f32, fy: f32, fw: f32, fh: f32) -> Rect {
        Rect::new(
            self.x + self.width * fx,
            self.y + self.height * fy,
            self.width * fw,
            self.height * fh,
        )
    }
}

// (x, y, width, height) as fractions of the video area, indexed by slot.
const SINGLE: [(f32, f32, f32, f32); 1] = [(0.0, 0.0, 1.0, 1.0)];
const STACKED: [(f32, f32, f32, f32); 2] = [(0.0, 0.0, 1.0, 0.5), (0.0, 0.5, 1.0, 0.5)];
const ONE_OVER_TWO: [(f32, f32, f32, f32); 3] = [
    (0.0, 0.0, 1.0, 0.5),
    (0.0, 0.5, 0.5, 0.5),
    (0.5, 0.5, 0.5, 0.5),
];
const QUAD: [(f32, f32, f32, f32); 4] = [
    (0.0, 0.0, 0.5, 0.5),
    (0.5, 0.0, 0.5, 0.5),
    (0.0, 0.5, 0.5, 0.5),
    (0.5, 0.5, 0.5, 0.5),
];

fn slot_table(arrangement: Arrangement) -> &'static [(f32, f32, f32, f32)] {
    match arrangement {
        Arrangement::Empty => &[],
        Arrangement::Single => &SINGLE,
        Arrangement::Stacked => &STACKED,
        Arrangement::OneOverTwo => &ONE_OVER_TWO,
        Arrangement::Quad => &QUAD,
    }
}

/// Frame of `slot` inside `area`. Slots outside the arrangement collapse to
/// an empty rectangle at the area's origin.
pub fn slot_frame(arrangement: Arrangement, slot: usize, area: Rect) -> Rect {
    match slot_table(arrangement).get(slot) {
        Some(&(fx, fy, fw, fh)) => area.fraction(fx, fy, fw, fh),
        None => Rect::new(area.x, area.y, 0.0, 0.0),
    }
}

pub fn local_preview_frame(area: Rect) -> Rect {
    let width = LOCAL_PREVIEW_WIDTH.min((area.width - 2.0 * LOCAL_PREVIEW_INSET).max(0.0));
    let height = LOCAL_PREVIEW_HEIGHT.min((area.height - 2.0 * LOCAL_PREVIEW_INSET).max(0.0));
    Rect::new(
        area.x + (area.width - LOCAL_PREVIEW_INSET - width).max(0.0),
        area.y + LOCAL_PREVIEW_INSET.min(area.height),
        width,
        height,
    )
}

#[cfg(test)]
#[path = "tests/geometry_tests.rs"]
mod tests;
