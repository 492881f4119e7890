//! Paints the peer grid. Video surfaces are placeholders labeled with the
//! peer they are bound to.

use eframe::egui;
use peer_grid::{GridLayout, Rect, Tile, NO_BROADCASTER_TEXT};

const REMOTE_FILL: egui::Color32 = egui::Color32::from_rgb(0x1e, 0x29, 0x3b);
const PREVIEW_FILL: egui::Color32 = egui::Color32::from_rgb(0x00, 0x93, 0xe9);
const TILE_STROKE: egui::Color32 = egui::Color32::from_rgb(0x33, 0x41, 0x55);

pub fn to_egui(rect: Rect) -> egui::Rect {
    egui::Rect::from_min_size(
        egui::pos2(rect.x, rect.y),
        egui::vec2(rect.width, rect.height),
    )
}

pub fn from_egui(rect: egui::Rect) -> Rect {
    Rect::new(rect.min.x, rect.min.y, rect.width(), rect.height())
}

pub fn tile_label(tile: &Tile) -> String {
    match tile {
        Tile::LocalPreview => "You".to_string(),
        Tile::Remote(remote) => format!("Peer {}", remote.peer_id),
        Tile::NoBroadcasterPlaceholder => NO_BROADCASTER_TEXT.to_string(),
    }
}

pub fn paint_grid(ui: &mut egui::Ui, layout: &GridLayout, area: egui::Rect) {
    let Some(video) = &layout.video else {
        return;
    };

    let painter = ui.painter_at(area);
    let text_color = ui.visuals().strong_text_color();
    for (tile, frame) in video.frames(from_egui(area)) {
        let rect = to_egui(frame).shrink(1.0);
        match tile {
            Tile::NoBroadcasterPlaceholder => {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    tile_label(&tile),
                    egui::FontId::proportional(16.0),
                    PREVIEW_FILL,
                );
            }
            Tile::Remote(_) => {
                painter.rect_filled(rect, egui::CornerRadius::same(4), REMOTE_FILL);
                painter.rect_stroke(
                    rect,
                    egui::CornerRadius::same(4),
                    egui::Stroke::new(1.0, TILE_STROKE),
                    egui::StrokeKind::Middle,
                );
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    tile_label(&tile),
                    egui::FontId::proportional(14.0),
                    text_color,
                );
            }
            Tile::LocalPreview => {
                painter.rect_filled(rect, egui::CornerRadius::same(6), PREVIEW_FILL);
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    tile_label(&tile),
                    egui::FontId::proportional(13.0),
                    egui::Color32::WHITE,
                );
            }
        }
    }

    if video.hidden_peers > 0 {
        painter.text(
            area.left_bottom() + egui::vec2(8.0, -8.0),
            egui::Align2::LEFT_BOTTOM,
            format!("+{} more", video.hidden_peers),
            egui::FontId::proportional(12.0),
            text_color,
        );
    }
}
