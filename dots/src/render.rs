use engine::graphics::{Color, Renderer2d, text_size};
use engine::ui::{Rect, Size};

use crate::geometry::{BoardGeometry, Edge, Orientation};
use crate::snapshot::{BoardSnapshot, Player};

pub const BACKGROUND: Color = [26, 26, 46, 255];
pub const PLAYER_ONE: Color = [52, 152, 219, 255];
pub const PLAYER_TWO: Color = [231, 76, 60, 255];
pub const DOT: Color = [255, 255, 255, 255];
pub const IDLE_EDGE: Color = [255, 255, 255, 255];
pub const REJECTED_EDGE: Color = [241, 196, 15, 255];
pub const BANNER_TEXT: Color = [255, 255, 255, 255];

pub const IDLE_EDGE_ALPHA: u8 = 51;
pub const BOX_TINT_ALPHA: u8 = 77;
pub const HOVER_ALPHA: u8 = 153;
const BANNER_ALPHA: u8 = 200;

const BOX_LABEL_SCALE: u32 = 4;
const BANNER_MAX_SCALE: u32 = 3;

pub fn player_color(player: Player) -> Color {
    match player {
        Player::One => PLAYER_ONE,
        Player::Two => PLAYER_TWO,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStyle {
    Claimed,
    Hovered(Player),
    Rejected,
    Idle,
}

impl EdgeStyle {
    pub fn resolve(
        edge: Edge,
        snapshot: &BoardSnapshot,
        hovered: Option<Edge>,
        rejected: Option<Edge>,
    ) -> Self {
        if snapshot.edge_claimed(edge) == Some(true) {
            EdgeStyle::Claimed
        } else if hovered == Some(edge) {
            EdgeStyle::Hovered(snapshot.current_player())
        } else if rejected == Some(edge) {
            EdgeStyle::Rejected
        } else {
            EdgeStyle::Idle
        }
    }
}

pub fn render_board(
    gfx: &mut dyn Renderer2d,
    geometry: &BoardGeometry,
    snapshot: &BoardSnapshot,
    hovered: Option<Edge>,
    rejected: Option<Edge>,
) {
    gfx.clear(BACKGROUND);

    for (cell, owner) in snapshot.owned_boxes() {
        let rect = geometry.box_rect(cell);
        let color = player_color(owner);
        gfx.blend_rect(rect, color, BOX_TINT_ALPHA);
        gfx.draw_text_centered(rect, &owner.number().to_string(), color, BOX_LABEL_SCALE);
    }

    let dims = geometry.dims();
    for orientation in Orientation::SCAN_ORDER {
        for edge in dims.edges(orientation) {
            let rect = geometry.edge_stroke_rect(edge);
            // Claimed edges are drawn in player 1's color regardless of who claimed them; the
            // snapshot carries no edge ownership.
            match EdgeStyle::resolve(edge, snapshot, hovered, rejected) {
                EdgeStyle::Claimed => gfx.fill_rect(rect, PLAYER_ONE),
                EdgeStyle::Hovered(player) => gfx.blend_rect(rect, player_color(player), HOVER_ALPHA),
                EdgeStyle::Rejected => gfx.blend_rect(rect, REJECTED_EDGE, HOVER_ALPHA),
                EdgeStyle::Idle => gfx.blend_rect(rect, IDLE_EDGE, IDLE_EDGE_ALPHA),
            }
        }
    }

    let radius = geometry.layout().dot_radius;
    for row in 0..=dims.rows {
        for col in 0..=dims.cols {
            let (x, y) = geometry.dot_position(row, col);
            gfx.fill_circle(x, y, radius, DOT);
        }
    }
}

/// Darkened band across the middle of the surface with `text` centered in it.
pub fn draw_banner(gfx: &mut dyn Renderer2d, text: &str) {
    let surface = gfx.size();
    let area = Rect::from_size(surface.width, surface.height);
    let scale = banner_scale(text, Size::new(surface.width, surface.height));
    let band_height = text_size(text, scale).h + 4 * scale;
    let band = area.middle_band(band_height);
    gfx.blend_rect(band, BACKGROUND, BANNER_ALPHA);
    gfx.draw_text_centered(band, text, BANNER_TEXT, scale);
}

fn banner_scale(text: &str, available: Size) -> u32 {
    (1..=BANNER_MAX_SCALE)
        .rev()
        .find(|&scale| {
            let text = text_size(text, scale);
            Size::new(text.w + 4 * scale, text.h + 4 * scale).fits_in(available)
        })
        .unwrap_or(1)
}
