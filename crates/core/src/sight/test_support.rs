//! Shared fixtures for the `sight` submodule test suites.
//! Every fixture builds a bordered 14x14 overworld with the player parked in
//! a corner, out of every trainer's line.

use crate::config::SightConfig;
use crate::overworld::Overworld;
use crate::sight::TrainerSight;
use crate::state::{Actor, Map};
use crate::types::*;

pub(crate) const LANE_MAP: MapLocation = MapLocation { map_num: 3, map_group: 1 };

pub(crate) fn lane_script() -> TrainerScript {
    TrainerScript { trainer_id: 101, mode: TrainerBattleMode::Single }
}

/// One normal trainer (local id 1) at (5,5) looking `facing` with `range` tiles of sight.
pub(crate) fn lane_fixture(facing: Direction, range: u8) -> (Overworld, ActorId) {
    let player = Actor::new(LocalId::PLAYER, LANE_MAP, Pos { y: 1, x: 1 }, Direction::South);
    let mut world = Overworld::new(Map::new(14, 14), player, SightConfig::default());
    let trainer = Actor::new(LocalId(1), LANE_MAP, Pos { y: 5, x: 5 }, facing).with_trainer(
        TrainerType::Normal,
        range,
        lane_script(),
    );
    let id = world.add_actor(trainer);
    (world, id)
}

pub(crate) fn add_trainer(
    world: &mut Overworld,
    local_id: u8,
    pos: Pos,
    facing: Direction,
    range: u8,
    trainer_id: u16,
) -> ActorId {
    let script = TrainerScript { trainer_id, mode: TrainerBattleMode::Single };
    let trainer = Actor::new(LocalId(local_id), LANE_MAP, pos, facing).with_trainer(
        TrainerType::Normal,
        range,
        script,
    );
    world.add_actor(trainer)
}

pub(crate) fn hide_trainer(world: &mut Overworld, id: ActorId) {
    let hidden = world.actors[id].clone().with_movement_type(MovementType::Hidden);
    world.actors[id] = hidden;
}

/// Runs sight tasks and the overworld for `frames` frames.
pub(crate) fn run_frames(world: &mut Overworld, sight: &mut TrainerSight, frames: u32) {
    for _ in 0..frames {
        sight.run_tasks(world);
        world.tick();
    }
}
