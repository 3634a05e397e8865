use engine::graphics::CpuRenderer;
use engine::regression::{
    FrameHashGolden, assert_or_update_golden_json, render_frame_hashes, update_goldens_enabled,
};
use engine::regression_golden_path;
use engine::surface::SurfaceSize;

use dots::config::LayoutConfig;
use dots::geometry::{BoardGeometry, Edge, GridDims};
use dots::render::{draw_banner, render_board};
use dots::snapshot::{BoardSnapshot, SnapshotWire};

struct Frame {
    snapshot: BoardSnapshot,
    hovered: Option<Edge>,
    rejected: Option<Edge>,
    banner: Option<&'static str>,
}

fn snapshot(edit: impl FnOnce(&mut SnapshotWire)) -> BoardSnapshot {
    let mut wire = SnapshotWire::fresh(GridDims::new(3, 3));
    edit(&mut wire);
    BoardSnapshot::try_from(wire).expect("valid scenario snapshot")
}

fn scenario() -> Vec<Frame> {
    let opening = snapshot(|_| {});
    let mid_game = snapshot(|w| {
        w.horizontal_edges[0] = true;
        w.horizontal_edges[3] = true;
        w.vertical_edges[0] = true;
        w.vertical_edges[1] = true;
        w.box_owners.insert("0,0".into(), 1);
        w.scores.insert("1".into(), 1);
        w.current_player = 2;
    });
    let finished = snapshot(|w| {
        w.horizontal_edges.iter_mut().for_each(|f| *f = true);
        w.vertical_edges.iter_mut().for_each(|f| *f = true);
        for r in 0..3 {
            for c in 0..3 {
                w.box_owners.insert(format!("{r},{c}"), if (r + c) % 2 == 0 { 1 } else { 2 });
            }
        }
        w.scores.insert("1".into(), 5);
        w.scores.insert("2".into(), 4);
        w.game_over = true;
    });

    vec![
        Frame {
            snapshot: opening.clone(),
            hovered: None,
            rejected: None,
            banner: None,
        },
        Frame {
            snapshot: opening,
            hovered: Some(Edge::vertical(1, 2)),
            rejected: None,
            banner: None,
        },
        Frame {
            snapshot: mid_game.clone(),
            hovered: Some(Edge::horizontal(1, 1)),
            rejected: None,
            banner: None,
        },
        Frame {
            snapshot: mid_game,
            hovered: None,
            rejected: Some(Edge::vertical(2, 3)),
            banner: None,
        },
        Frame {
            snapshot: finished,
            hovered: None,
            rejected: None,
            banner: Some("Player 1 Wins!"),
        },
    ]
}

#[test]
fn board_frames_match_golden_hashes() {
    let layout = LayoutConfig::default();
    let frames = scenario();
    let size = BoardGeometry::new(GridDims::new(3, 3), layout).surface_size();

    let hashes = render_frame_hashes(&frames, size, |frame, buf, size| {
        let geometry = BoardGeometry::for_snapshot(layout, &frame.snapshot);
        let mut gfx = CpuRenderer::new(buf, size);
        render_board(&mut gfx, &geometry, &frame.snapshot, frame.hovered, frame.rejected);
        if let Some(text) = frame.banner {
            draw_banner(&mut gfx, text);
        }
    });

    // Every frame in the scenario is visually distinct.
    for (i, a) in hashes.iter().enumerate() {
        for b in &hashes[i + 1..] {
            assert_ne!(a, b);
        }
    }

    let name = "board_3x3_scenario";
    let golden = FrameHashGolden::new(name, size, hashes);
    assert_or_update_golden_json(
        regression_golden_path!(name),
        &golden,
        update_goldens_enabled(),
    )
    .unwrap();
}

#[test]
fn rendering_is_deterministic() {
    let layout = LayoutConfig::default();
    let frames = scenario();
    let size = BoardGeometry::new(GridDims::new(3, 3), layout).surface_size();
    let render = |frame: &Frame, buf: &mut [u8], size: SurfaceSize| {
        let geometry = BoardGeometry::for_snapshot(layout, &frame.snapshot);
        render_board(
            &mut CpuRenderer::new(buf, size),
            &geometry,
            &frame.snapshot,
            frame.hovered,
            frame.rejected,
        );
    };
    assert_eq!(
        render_frame_hashes(&frames, size, render),
        render_frame_hashes(&frames, size, render)
    );
}
