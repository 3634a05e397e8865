use std::fmt;

use engine::{surface::SurfaceSize, ui::Rect};
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::snapshot::BoardSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    #[serde(rename = "H")]
    Horizontal,
    #[serde(rename = "V")]
    Vertical,
}

impl Orientation {
    /// Hit-test scan order: horizontal edges win ties near corners.
    pub const SCAN_ORDER: [Orientation; 2] = [Orientation::Horizontal, Orientation::Vertical];

    pub fn code(self) -> char {
        match self {
            Orientation::Horizontal => 'H',
            Orientation::Vertical => 'V',
        }
    }
}

/// A claimable segment between two adjacent dots.
///
/// Horizontal edges lie on grid line `row` and span columns `col..col+1`; vertical edges lie on
/// grid line `col` and span rows `row..row+1`. Serializes as the authority's move body:
/// `{"orientation":"H","r":0,"c":0}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub orientation: Orientation,
    #[serde(rename = "r")]
    pub row: u32,
    #[serde(rename = "c")]
    pub col: u32,
}

impl Edge {
    pub const fn horizontal(row: u32, col: u32) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            row,
            col,
        }
    }

    pub const fn vertical(row: u32, col: u32) -> Self {
        Self {
            orientation: Orientation::Vertical,
            row,
            col,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.orientation.code(), self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxCoord {
    pub row: u32,
    pub col: u32,
}

impl BoxCoord {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// Largest row or column count a board may have. Keeps every surface coordinate of a valid
/// layout well inside `u32`.
pub const MAX_GRID_SIDE: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDims {
    pub rows: u32,
    pub cols: u32,
}

impl GridDims {
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Slots per index row: `C` for horizontal edges, `C + 1` for vertical ones.
    pub fn index_width(self, orientation: Orientation) -> Option<u32> {
        match orientation {
            Orientation::Horizontal => Some(self.cols),
            Orientation::Vertical => self.cols.checked_add(1),
        }
    }

    /// Index rows: `R + 1` grid lines for horizontal edges, `R` for vertical ones.
    pub fn index_rows(self, orientation: Orientation) -> Option<u32> {
        match orientation {
            Orientation::Horizontal => self.rows.checked_add(1),
            Orientation::Vertical => Some(self.rows),
        }
    }

    /// `None` when the count does not fit in `usize`.
    pub fn edge_count(self, orientation: Orientation) -> Option<usize> {
        let rows = usize::try_from(self.index_rows(orientation)?).ok()?;
        let width = usize::try_from(self.index_width(orientation)?).ok()?;
        rows.checked_mul(width)
    }

    pub fn fits(self) -> bool {
        self.rows <= MAX_GRID_SIDE && self.cols <= MAX_GRID_SIDE
    }

    pub fn contains_edge(self, edge: Edge) -> bool {
        match (
            self.index_rows(edge.orientation),
            self.index_width(edge.orientation),
        ) {
            (Some(rows), Some(width)) => edge.row < rows && edge.col < width,
            _ => false,
        }
    }

    /// Flat index of `edge` within its orientation's flag sequence.
    pub fn edge_index(self, edge: Edge) -> Option<usize> {
        if !self.contains_edge(edge) {
            return None;
        }
        let width = self.index_width(edge.orientation)? as usize;
        (edge.row as usize)
            .checked_mul(width)?
            .checked_add(edge.col as usize)
    }

    /// Inverse of `edge_index`.
    pub fn edge_at(self, orientation: Orientation, index: usize) -> Option<Edge> {
        let width = self.index_width(orientation)? as usize;
        if width == 0 || index >= self.edge_count(orientation)? {
            return None;
        }
        Some(Edge {
            orientation,
            row: (index / width) as u32,
            col: (index % width) as u32,
        })
    }

    /// All edge identities of one orientation, in flag order.
    pub fn edges(self, orientation: Orientation) -> impl Iterator<Item = Edge> {
        (0..self.edge_count(orientation).unwrap_or(0))
            .filter_map(move |i| self.edge_at(orientation, i))
    }

    pub fn box_count(self) -> usize {
        self.rows as usize * self.cols as usize
    }

    pub fn contains_box(self, cell: BoxCoord) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Packs a box identity into `row * C + col`.
    pub fn box_key(self, cell: BoxCoord) -> Option<u32> {
        if !self.contains_box(cell) {
            return None;
        }
        cell.row.checked_mul(self.cols)?.checked_add(cell.col)
    }

    pub fn box_at(self, key: u32) -> Option<BoxCoord> {
        if self.cols == 0 || key as usize >= self.box_count() {
            return None;
        }
        Some(BoxCoord::new(key / self.cols, key % self.cols))
    }
}

/// Endpoints of an edge in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Segment {
    pub fn midpoint(&self) -> (f32, f32) {
        (
            (self.x1 as f32 + self.x2 as f32) / 2.0,
            (self.y1 as f32 + self.y2 as f32) / 2.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardGeometry {
    dims: GridDims,
    layout: LayoutConfig,
}

impl BoardGeometry {
    pub fn new(dims: GridDims, layout: LayoutConfig) -> Self {
        Self { dims, layout }
    }

    pub fn for_snapshot(layout: LayoutConfig, snapshot: &BoardSnapshot) -> Self {
        Self::new(snapshot.dims(), layout)
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn layout(&self) -> LayoutConfig {
        self.layout
    }

    /// `C * cell + 2 * padding` by `R * cell + 2 * padding`.
    pub fn surface_size(&self) -> SurfaceSize {
        let LayoutConfig {
            cell_size, padding, ..
        } = self.layout;
        let span = |cells: u32| {
            cells
                .saturating_mul(cell_size)
                .saturating_add(padding.saturating_mul(2))
        };
        SurfaceSize::new(span(self.dims.cols), span(self.dims.rows))
    }

    /// Grid intersection `(row, col)` for row in `0..=R`, col in `0..=C`.
    pub fn dot_position(&self, row: u32, col: u32) -> (u32, u32) {
        let LayoutConfig {
            cell_size, padding, ..
        } = self.layout;
        (padding + col * cell_size, padding + row * cell_size)
    }

    pub fn edge_segment(&self, edge: Edge) -> Segment {
        let (x1, y1) = self.dot_position(edge.row, edge.col);
        let cell = self.layout.cell_size;
        match edge.orientation {
            Orientation::Horizontal => Segment {
                x1,
                y1,
                x2: x1 + cell,
                y2: y1,
            },
            Orientation::Vertical => Segment {
                x1,
                y1,
                x2: x1,
                y2: y1 + cell,
            },
        }
    }

    /// The segment thickened to `edge_width`, centered on its grid line (butt caps).
    pub fn edge_stroke_rect(&self, edge: Edge) -> Rect {
        let seg = self.edge_segment(edge);
        let width = self.layout.edge_width;
        let half = width / 2;
        match edge.orientation {
            Orientation::Horizontal => {
                Rect::new(seg.x1, seg.y1.saturating_sub(half), seg.x2 - seg.x1, width)
            }
            Orientation::Vertical => {
                Rect::new(seg.x1.saturating_sub(half), seg.y1, width, seg.y2 - seg.y1)
            }
        }
    }

    pub fn box_rect(&self, cell: BoxCoord) -> Rect {
        let (x, y) = self.dot_position(cell.row, cell.col);
        Rect::new(x, y, self.layout.cell_size, self.layout.cell_size)
    }

    /// Maps a pointer position to the first unclaimed edge under it.
    ///
    /// Scans horizontal slots, then vertical slots. A candidate matches when the pointer is
    /// strictly within `cell/2 - dot_radius` of the segment midpoint along the segment and
    /// strictly within `hit_threshold` across it. Claimed edges never match.
    pub fn nearest_unclaimed_edge(&self, x: f32, y: f32, snapshot: &BoardSnapshot) -> Option<Edge> {
        let along_limit = self.layout.cell_size as f32 / 2.0 - self.layout.dot_radius as f32;
        let across_limit = self.layout.hit_threshold as f32;

        Orientation::SCAN_ORDER
            .into_iter()
            .flat_map(|orientation| self.dims.edges(orientation))
            .find(|&edge| {
                let (mx, my) = self.edge_segment(edge).midpoint();
                let (along, across) = match edge.orientation {
                    Orientation::Horizontal => ((x - mx).abs(), (y - my).abs()),
                    Orientation::Vertical => ((y - my).abs(), (x - mx).abs()),
                };
                along < along_limit
                    && across < across_limit
                    && snapshot.edge_claimed(edge) == Some(false)
            })
    }
}
