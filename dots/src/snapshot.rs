use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::geometry::{BoxCoord, Edge, GridDims, MAX_GRID_SIDE, Orientation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    pub fn number(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scores {
    pub one: u32,
    pub two: u32,
}

impl Scores {
    pub fn get(&self, player: Player) -> u32 {
        match player {
            Player::One => self.one,
            Player::Two => self.two,
        }
    }
}

#[derive(Debug)]
pub enum SnapshotError {
    Json(serde_json::Error),
    EmptyGrid { rows: u32, cols: u32 },
    TooLarge { rows: u32, cols: u32 },
    EdgeCount {
        orientation: Orientation,
        expected: usize,
        actual: usize,
    },
    BoxKey(String),
    Player(u8),
    ScoreKey(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Json(e) => write!(f, "malformed snapshot json: {e}"),
            SnapshotError::EmptyGrid { rows, cols } => {
                write!(f, "grid must have at least one box, got {rows}x{cols}")
            }
            SnapshotError::TooLarge { rows, cols } => write!(
                f,
                "grid {rows}x{cols} exceeds the {MAX_GRID_SIDE}x{MAX_GRID_SIDE} limit"
            ),
            SnapshotError::EdgeCount {
                orientation,
                expected,
                actual,
            } => write!(
                f,
                "expected {expected} {} edge flags, got {actual}",
                orientation.code()
            ),
            SnapshotError::BoxKey(key) => write!(f, "invalid box key {key:?}"),
            SnapshotError::Player(n) => write!(f, "invalid player number {n}"),
            SnapshotError::ScoreKey(key) => write!(f, "invalid score key {key:?}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        SnapshotError::Json(e)
    }
}

/// The authority's JSON document, field for field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotWire {
    pub rows: u32,
    pub cols: u32,
    #[serde(deserialize_with = "deserialize_flags")]
    pub horizontal_edges: Vec<bool>,
    #[serde(deserialize_with = "deserialize_flags")]
    pub vertical_edges: Vec<bool>,
    /// `"r,c"` -> player number.
    #[serde(default)]
    pub box_owners: BTreeMap<String, u8>,
    /// `"1"` / `"2"` -> boxes owned.
    #[serde(default)]
    pub scores: BTreeMap<String, u32>,
    pub current_player: u8,
    pub game_over: bool,
    /// Present on move responses only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub completed_boxes: Vec<[u32; 2]>,
}

impl SnapshotWire {
    /// An untouched board with player 1 to move.
    pub fn fresh(dims: GridDims) -> Self {
        Self {
            rows: dims.rows,
            cols: dims.cols,
            horizontal_edges: vec![false; dims.edge_count(Orientation::Horizontal).unwrap_or(0)],
            vertical_edges: vec![false; dims.edge_count(Orientation::Vertical).unwrap_or(0)],
            box_owners: BTreeMap::new(),
            scores: BTreeMap::from([("1".to_string(), 0), ("2".to_string(), 0)]),
            current_player: 1,
            game_over: false,
            completed_boxes: Vec::new(),
        }
    }
}

/// Edge flags arrive as booleans or as 0/1 integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireFlag {
    Bool(bool),
    Int(i64),
}

fn deserialize_flags<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<bool>, D::Error> {
    let flags = Vec::<WireFlag>::deserialize(de)?;
    Ok(flags
        .into_iter()
        .map(|flag| match flag {
            WireFlag::Bool(b) => b,
            WireFlag::Int(v) => v != 0,
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    dims: GridDims,
    horizontal: Vec<bool>,
    vertical: Vec<bool>,
    box_owners: BTreeMap<u32, Player>,
    scores: Scores,
    current_player: Player,
    game_over: bool,
    completed_boxes: Vec<BoxCoord>,
}

impl BoardSnapshot {
    pub fn from_json(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let wire: SnapshotWire = serde_json::from_slice(bytes)?;
        Self::try_from(wire)
    }

    pub fn fresh(dims: GridDims) -> Self {
        Self {
            dims,
            horizontal: vec![false; dims.edge_count(Orientation::Horizontal).unwrap_or(0)],
            vertical: vec![false; dims.edge_count(Orientation::Vertical).unwrap_or(0)],
            box_owners: BTreeMap::new(),
            scores: Scores::default(),
            current_player: Player::One,
            game_over: false,
            completed_boxes: Vec::new(),
        }
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// `None` when `edge` is outside the grid.
    pub fn edge_claimed(&self, edge: Edge) -> Option<bool> {
        let index = self.dims.edge_index(edge)?;
        let flags = match edge.orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        };
        flags.get(index).copied()
    }

    pub fn box_owner(&self, cell: BoxCoord) -> Option<Player> {
        let key = self.dims.box_key(cell)?;
        self.box_owners.get(&key).copied()
    }

    /// Owned boxes in row-major order.
    pub fn owned_boxes(&self) -> impl Iterator<Item = (BoxCoord, Player)> + '_ {
        self.box_owners
            .iter()
            .filter_map(|(&key, &owner)| Some((self.dims.box_at(key)?, owner)))
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn score(&self, player: Player) -> u32 {
        self.scores.get(player)
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Boxes closed by the move this snapshot answers; empty for load and reset.
    pub fn completed_boxes(&self) -> &[BoxCoord] {
        &self.completed_boxes
    }
}

impl TryFrom<SnapshotWire> for BoardSnapshot {
    type Error = SnapshotError;

    fn try_from(wire: SnapshotWire) -> Result<Self, Self::Error> {
        if wire.rows == 0 || wire.cols == 0 {
            return Err(SnapshotError::EmptyGrid {
                rows: wire.rows,
                cols: wire.cols,
            });
        }
        let dims = GridDims::new(wire.rows, wire.cols);
        let too_large = SnapshotError::TooLarge {
            rows: wire.rows,
            cols: wire.cols,
        };
        if !dims.fits() {
            return Err(too_large);
        }

        for (orientation, flags) in [
            (Orientation::Horizontal, &wire.horizontal_edges),
            (Orientation::Vertical, &wire.vertical_edges),
        ] {
            let Some(expected) = dims.edge_count(orientation) else {
                return Err(too_large);
            };
            if flags.len() != expected {
                return Err(SnapshotError::EdgeCount {
                    orientation,
                    expected,
                    actual: flags.len(),
                });
            }
        }

        let mut box_owners = BTreeMap::new();
        for (key, owner) in &wire.box_owners {
            let cell = parse_box_key(key)
                .filter(|&cell| dims.contains_box(cell))
                .ok_or_else(|| SnapshotError::BoxKey(key.clone()))?;
            let owner = Player::from_number(*owner).ok_or(SnapshotError::Player(*owner))?;
            let packed = dims
                .box_key(cell)
                .ok_or_else(|| SnapshotError::BoxKey(key.clone()))?;
            box_owners.insert(packed, owner);
        }

        let mut scores = Scores::default();
        for (key, &count) in &wire.scores {
            match key.trim() {
                "1" => scores.one = count,
                "2" => scores.two = count,
                _ => return Err(SnapshotError::ScoreKey(key.clone())),
            }
        }

        let current_player = Player::from_number(wire.current_player)
            .ok_or(SnapshotError::Player(wire.current_player))?;

        let completed_boxes = wire
            .completed_boxes
            .iter()
            .map(|&[row, col]| BoxCoord::new(row, col))
            .filter(|&cell| dims.contains_box(cell))
            .collect();

        Ok(Self {
            dims,
            horizontal: wire.horizontal_edges,
            vertical: wire.vertical_edges,
            box_owners,
            scores,
            current_player,
            game_over: wire.game_over,
            completed_boxes,
        })
    }
}

impl From<&BoardSnapshot> for SnapshotWire {
    fn from(snapshot: &BoardSnapshot) -> Self {
        Self {
            rows: snapshot.dims.rows,
            cols: snapshot.dims.cols,
            horizontal_edges: snapshot.horizontal.clone(),
            vertical_edges: snapshot.vertical.clone(),
            box_owners: snapshot
                .owned_boxes()
                .map(|(cell, owner)| (format!("{},{}", cell.row, cell.col), owner.number()))
                .collect(),
            scores: Player::ALL
                .into_iter()
                .map(|p| (p.number().to_string(), snapshot.score(p)))
                .collect(),
            current_player: snapshot.current_player.number(),
            game_over: snapshot.game_over,
            completed_boxes: snapshot
                .completed_boxes
                .iter()
                .map(|cell| [cell.row, cell.col])
                .collect(),
        }
    }
}

fn parse_box_key(key: &str) -> Option<BoxCoord> {
    let (row, col) = key.split_once(',')?;
    Some(BoxCoord::new(
        row.trim().parse().ok()?,
        col.trim().parse().ok()?,
    ))
}
