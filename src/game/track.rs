//! Tile-based track grid
//!
//! Decodes a rectangular character grid into typed tiles, records the spawn
//! and goal landmarks, and exposes the static wall bodies a physics
//! collaborator registers for collision.

use bitvec::prelude::*;
use serde::Serialize;

use crate::game::constants::track::TILE_SIZE;
use crate::util::vec2::Vec2;

/// Tile kinds a track character can decode to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tile {
    Floor,
    Wall,
    Spawn,
    Goal,
    CornerTL,
    CornerTR,
    CornerBR,
    CornerBL,
}

impl Tile {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '.' => Some(Tile::Floor),
            '#' => Some(Tile::Wall),
            'S' => Some(Tile::Spawn),
            'G' => Some(Tile::Goal),
            '1' => Some(Tile::CornerTL),
            '2' => Some(Tile::CornerTR),
            '3' => Some(Tile::CornerBR),
            '4' => Some(Tile::CornerBL),
            _ => None,
        }
    }

    pub fn is_corner(&self) -> bool {
        matches!(
            self,
            Tile::CornerTL | Tile::CornerTR | Tile::CornerBR | Tile::CornerBL
        )
    }

    /// Walls and corners get a static collision body
    pub fn is_solid(&self) -> bool {
        matches!(self, Tile::Wall) || self.is_corner()
    }
}

/// Named points recorded while loading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landmark {
    Spawn,
    Goal,
}

impl std::fmt::Display for Landmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Landmark::Spawn => write!(f, "spawn"),
            Landmark::Goal => write!(f, "goal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackError {
    #[error("Unknown tile char '{ch}' at row {row}, col {col}")]
    InvalidTile { ch: char, row: usize, col: usize },
    #[error("Row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Track has no tiles")]
    Empty,
    #[error("Track has no {0} tile")]
    MissingLandmark(Landmark),
}

/// Grid coordinate of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileCoord {
    pub col: u32,
    pub row: u32,
}

impl TileCoord {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// Index of a static wall body in [`TrackGrid::wall_bodies`]
pub type WallId = usize;

/// Static collision body for one Wall or Corner tile
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WallBody {
    pub id: WallId,
    pub tile: Tile,
    pub coord: TileCoord,
    /// Tile centre in world space
    pub center: Vec2,
    /// Top-left corner of the tile in world space
    pub origin: Vec2,
}

/// Tile centre for a grid coordinate
pub fn world_position(coord: TileCoord) -> Vec2 {
    Vec2::new(
        coord.col as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        coord.row as f32 * TILE_SIZE + TILE_SIZE / 2.0,
    )
}

/// Top-left corner of a tile in world space
pub fn tile_origin(coord: TileCoord) -> Vec2 {
    Vec2::new(coord.col as f32 * TILE_SIZE, coord.row as f32 * TILE_SIZE)
}

/// Immutable decoded track
#[derive(Debug, Clone)]
pub struct TrackGrid {
    width: u32,
    height: u32,
    /// Row-major tiles
    tiles: Vec<Tile>,
    /// Row-major occupancy mask of tiles that carry a wall body
    solid: BitVec,
    walls: Vec<WallBody>,
    spawn: TileCoord,
    goal: TileCoord,
}

impl TrackGrid {
    /// Decode a character grid. Fails on any unknown character, on rows of
    /// differing length, and on a missing spawn or goal.
    pub fn load<S: AsRef<str>>(rows: &[S]) -> Result<Self, TrackError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(TrackError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * height);
        let mut spawn: Option<TileCoord> = None;
        let mut goal: Option<TileCoord> = None;

        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(TrackError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }

            for (col, ch) in line.chars().enumerate() {
                let tile = Tile::from_char(ch).ok_or(TrackError::InvalidTile { ch, row, col })?;
                let coord = TileCoord::new(col as u32, row as u32);
                match tile {
                    Tile::Spawn => record_landmark(&mut spawn, coord, Landmark::Spawn),
                    Tile::Goal => record_landmark(&mut goal, coord, Landmark::Goal),
                    _ => {}
                }
                tiles.push(tile);
            }
        }

        let spawn = spawn.ok_or(TrackError::MissingLandmark(Landmark::Spawn))?;
        let goal = goal.ok_or(TrackError::MissingLandmark(Landmark::Goal))?;

        let solid: BitVec = tiles.iter().map(Tile::is_solid).collect();
        let walls = tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.is_solid())
            .enumerate()
            .map(|(id, (index, &tile))| {
                let coord = TileCoord::new((index % width) as u32, (index / width) as u32);
                WallBody {
                    id,
                    tile,
                    coord,
                    center: world_position(coord),
                    origin: tile_origin(coord),
                }
            })
            .collect();

        Ok(Self {
            width: width as u32,
            height: height as u32,
            tiles,
            solid,
            walls,
            spawn,
            goal,
        })
    }

    /// Parse a track from text, one row per line. Blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, TrackError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        Self::load(&rows)
    }

    /// (columns, rows)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// World size in units
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.width as f32 * TILE_SIZE, self.height as f32 * TILE_SIZE)
    }

    pub fn tile_at(&self, coord: TileCoord) -> Option<Tile> {
        if coord.col >= self.width || coord.row >= self.height {
            return None;
        }
        self.tiles.get(self.index(coord)).copied()
    }

    pub fn coord_at_world(&self, point: Vec2) -> Option<TileCoord> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let coord = TileCoord::new((point.x / TILE_SIZE) as u32, (point.y / TILE_SIZE) as u32);
        (coord.col < self.width && coord.row < self.height).then_some(coord)
    }

    pub fn tile_at_world(&self, point: Vec2) -> Option<Tile> {
        self.coord_at_world(point).and_then(|c| self.tile_at(c))
    }

    /// Whether the tile carries a wall body. Out of bounds counts as solid.
    pub fn is_solid(&self, coord: TileCoord) -> bool {
        if coord.col >= self.width || coord.row >= self.height {
            return true;
        }
        self.solid[self.index(coord)]
    }

    pub fn is_goal_at(&self, point: Vec2) -> bool {
        self.coord_at_world(point) == Some(self.goal)
    }

    /// Static bodies for every Wall and Corner tile, indexed by [`WallId`]
    pub fn wall_bodies(&self) -> &[WallBody] {
        &self.walls
    }

    pub fn wall(&self, id: WallId) -> Option<&WallBody> {
        self.walls.get(id)
    }

    /// Wall body occupying a tile, if any
    pub fn wall_at(&self, coord: TileCoord) -> Option<&WallBody> {
        if !self.is_solid(coord) || coord.col >= self.width || coord.row >= self.height {
            return None;
        }
        let id = self.solid[..self.index(coord)].count_ones();
        self.walls.get(id)
    }

    pub fn spawn_tile(&self) -> TileCoord {
        self.spawn
    }

    pub fn goal_tile(&self) -> TileCoord {
        self.goal
    }

    /// World position of the spawn tile centre
    pub fn spawn_point(&self) -> Vec2 {
        world_position(self.spawn)
    }

    /// World position of the goal tile centre
    pub fn goal_point(&self) -> Vec2 {
        world_position(self.goal)
    }

    fn index(&self, coord: TileCoord) -> usize {
        coord.row as usize * self.width as usize + coord.col as usize
    }
}

fn record_landmark(slot: &mut Option<TileCoord>, coord: TileCoord, landmark: Landmark) {
    match slot {
        Some(first) => {
            tracing::warn!(
                "Duplicate {} tile at ({}, {}), keeping ({}, {})",
                landmark,
                coord.col,
                coord.row,
                first.col,
                first.row
            );
        }
        None => *slot = Some(coord),
    }
}

/// Built-in level 1
pub fn level_1() -> Result<TrackGrid, TrackError> {
    TrackGrid::load(&crate::game::constants::track::LEVEL_1)
}

/// World-space racing line for level 1
pub fn level_1_waypoints() -> Vec<Vec2> {
    crate::game::constants::track::LEVEL_1_RACING_LINE
        .iter()
        .map(|&(x, y)| Vec2::new(x, y))
        .collect()
}
