//! Directional line-of-sight geometry between a trainer and the player.
//! This module only answers "how far away is the player along a clear line";
//! it never mutates actors or starts any choreography.

use crate::field::CollisionOracle;
use crate::state::Actor;
use crate::types::*;

/// Tiles from `trainer` to `player` along `direction`, or 0 when the player is
/// off-axis, behind the trainer, or beyond `range`.
pub fn approach_distance_in_direction(
    trainer: Pos,
    range: u8,
    player: Pos,
    direction: Direction,
) -> u8 {
    let range = i32::from(range);
    let (on_axis, delta) = match direction {
        Direction::South => (trainer.x == player.x, player.y - trainer.y),
        Direction::North => (trainer.x == player.x, trainer.y - player.y),
        Direction::West => (trainer.y == player.y, trainer.x - player.x),
        Direction::East => (trainer.y == player.y, player.x - trainer.x),
    };
    if on_axis && delta > 0 && delta <= range { u8::try_from(delta).unwrap_or(0) } else { 0 }
}

/// Confirms the tiles strictly between trainer and player are walkable and
/// that the final tile is occupied by an object event. Returns `distance` on
/// success and 0 otherwise.
pub fn check_path<C: CollisionOracle + ?Sized>(
    collision: &C,
    trainer: &Actor,
    distance: u8,
    direction: Direction,
) -> u8 {
    if distance == 0 {
        return 0;
    }

    let mut pos = direction.step(trainer.pos);
    for _ in 1..distance {
        if collision.collision_flags(trainer, pos, direction).blocks_sight() {
            return 0;
        }
        pos = direction.step(pos);
    }

    // The trainer's own wander range must not mask the player's tile.
    match collision.collision_at(trainer, pos, direction, Probe::IgnoreMovementRange) {
        Collision::ObjectEvent => distance,
        _ => 0,
    }
}

/// Direction and distance along which `trainer` spots the player standing on
/// `player`. A normal trainer only looks along its facing; an omnidirectional
/// one takes the first clear line in [`Direction::SCAN_ORDER`].
pub fn trainer_sight_line<C: CollisionOracle + ?Sized>(
    collision: &C,
    trainer: &Actor,
    player: Pos,
) -> Option<(Direction, u8)> {
    let look = |direction: Direction| {
        let distance =
            approach_distance_in_direction(trainer.pos, trainer.sight_range, player, direction);
        match check_path(collision, trainer, distance, direction) {
            0 => None,
            distance => Some((direction, distance)),
        }
    };
    match trainer.trainer_type {
        TrainerType::None => None,
        TrainerType::Normal => look(trainer.facing),
        TrainerType::SeeAllDirections => Direction::SCAN_ORDER.into_iter().find_map(look),
    }
}

/// Distance at which `trainer` spots the player standing on `player`, or 0.
pub fn trainer_approach_distance<C: CollisionOracle + ?Sized>(
    collision: &C,
    trainer: &Actor,
    player: Pos,
) -> u8 {
    trainer_sight_line(collision, trainer, player).map_or(0, |(_, distance)| distance)
}
