//! Corner tile geometry
//!
//! A corner tile is a wall whose solid region is one diagonal half of the
//! cell. The test here decides whether a world point falls in that half and
//! is used to filter contacts before the physics layer resolves them.

use crate::game::constants::track::TILE_SIZE;
use crate::game::track::Tile;
use crate::util::vec2::Vec2;

/// Whether `point` lies in the solid half of a tile starting at `tile_origin`.
///
/// Points outside the cell are never solid for it. Plain walls are solid
/// everywhere inside their cell; floor-like tiles never are.
pub fn is_solid_at(tile: Tile, point: Vec2, tile_origin: Vec2) -> bool {
    let u = (point.x - tile_origin.x) / TILE_SIZE;
    let v = (point.y - tile_origin.y) / TILE_SIZE;
    if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
        return false;
    }

    match tile {
        Tile::Wall => true,
        Tile::CornerTL => u + v <= 1.0,
        Tile::CornerBR => u + v >= 1.0,
        Tile::CornerTR => u >= v,
        Tile::CornerBL => v >= u,
        Tile::Floor | Tile::Spawn | Tile::Goal => false,
    }
}
