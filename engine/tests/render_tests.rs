use engine::graphics::{CpuRenderer, Renderer2d, text_size};
use engine::surface::{RgbaBufferSurface, Surface, SurfaceSize};
use engine::ui::Rect;

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

fn with_renderer(size: SurfaceSize, draw: impl FnOnce(&mut dyn Renderer2d)) -> RgbaBufferSurface {
    let mut surface = RgbaBufferSurface::new(size);
    let mut gfx = CpuRenderer::new(surface.frame_mut(), size);
    draw(&mut gfx);
    surface
}

#[test]
fn clear_covers_every_pixel() {
    let surface = with_renderer(SurfaceSize::new(5, 3), |gfx| gfx.clear(BLACK));
    assert!(surface.frame().chunks_exact(4).all(|px| px == BLACK));
}

#[test]
fn blend_rect_is_opaque_over_transparent_buffer() {
    let surface = with_renderer(SurfaceSize::new(4, 4), |gfx| {
        gfx.blend_rect(Rect::new(1, 1, 2, 2), WHITE, 153);
    });
    assert_eq!(surface.pixel(1, 1), Some([153, 153, 153, 255]));
    assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn stacked_blends_accumulate() {
    let surface = with_renderer(SurfaceSize::new(2, 1), |gfx| {
        gfx.clear(BLACK);
        gfx.blend_rect(Rect::from_size(2, 1), WHITE, 51);
        gfx.blend_rect(Rect::from_size(1, 1), WHITE, 51);
    });
    let once = surface.pixel(1, 0).unwrap();
    let twice = surface.pixel(0, 0).unwrap();
    assert_eq!(once, [51, 51, 51, 255]);
    assert!(twice[0] > once[0]);
}

#[test]
fn circle_near_edge_is_clipped_not_wrapped() {
    let surface = with_renderer(SurfaceSize::new(16, 16), |gfx| {
        gfx.clear(BLACK);
        gfx.fill_circle(0, 8, 4, WHITE);
    });
    assert_eq!(surface.pixel(0, 8), Some(WHITE));
    assert_eq!(surface.pixel(4, 8), Some(WHITE));
    // Nothing leaks onto the far side of the previous row.
    assert_eq!(surface.pixel(15, 7), Some(BLACK));
}

#[test]
fn centered_text_stays_within_its_area() {
    let area = Rect::new(10, 10, 40, 30);
    let surface = with_renderer(SurfaceSize::new(60, 60), |gfx| {
        gfx.clear(BLACK);
        gfx.draw_text_centered(area, "12", WHITE, 2);
    });

    let footprint = area.centered(text_size("12", 2));
    for y in 0..60 {
        for x in 0..60 {
            if surface.pixel(x, y) == Some(WHITE) {
                assert!(footprint.contains(x, y), "text pixel at ({x}, {y}) outside {footprint:?}");
            }
        }
    }
}
