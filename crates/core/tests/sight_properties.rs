use proptest::{
    prelude::{Just, Strategy, prop_oneof},
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};
use trainer_sight::field::ObjectEvents;
use trainer_sight::sight::{approach_distance_in_direction, trainer_approach_distance};
use trainer_sight::{
    Actor, Detection, Direction, LocalId, Map, MapLocation, MovementRange, Overworld, Pos,
    SightConfig, Tile, TrainerBattleMode, TrainerScript, TrainerSight, TrainerType,
};

const SIZE: usize = 16;

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::South),
        Just(Direction::North),
        Just(Direction::West),
        Just(Direction::East),
    ]
}

fn pos_strategy() -> impl Strategy<Value = Pos> {
    (1..(SIZE as i32 - 1), 1..(SIZE as i32 - 1)).prop_map(|(y, x)| Pos { y, x })
}

fn world_with_player(player: Pos) -> Overworld {
    let player = Actor::new(LocalId::PLAYER, MapLocation::default(), player, Direction::North);
    Overworld::new(Map::new(SIZE, SIZE), player, SightConfig::default())
}

fn trainer(local_id: u8, pos: Pos, facing: Direction, range: u8) -> Actor {
    Actor::new(LocalId(local_id), MapLocation::default(), pos, facing).with_trainer(
        TrainerType::Normal,
        range,
        TrainerScript { trainer_id: u16::from(local_id), mode: TrainerBattleMode::Single },
    )
}

/// Signed tile count from `from` to `to` along `direction`, if `to` is on that axis.
fn axis_delta(from: Pos, to: Pos, direction: Direction) -> Option<i32> {
    match direction {
        Direction::South if from.x == to.x => Some(to.y - from.y),
        Direction::North if from.x == to.x => Some(from.y - to.y),
        Direction::East if from.y == to.y => Some(to.x - from.x),
        Direction::West if from.y == to.y => Some(from.x - to.x),
        _ => None,
    }
}

#[test]
fn geometric_distance_matches_axis_and_range() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(512));
    let inputs = (pos_strategy(), pos_strategy(), 0u8..12, direction_strategy());

    runner
        .run(&inputs, |(trainer, player, range, direction)| {
            let distance = approach_distance_in_direction(trainer, range, player, direction);
            let expected = match axis_delta(trainer, player, direction) {
                Some(delta) if delta > 0 && delta <= i32::from(range) => delta,
                _ => 0,
            };
            if i32::from(distance) != expected {
                return Err(TestCaseError::fail(format!(
                    "{trainer:?} -> {player:?} facing {direction:?} range {range}: got {distance}, expected {expected}"
                )));
            }
            Ok(())
        })
        .expect("distance follows the orthogonal-axis contract");
}

#[test]
fn blocking_tile_between_hides_the_player() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(256));
    let inputs = (pos_strategy(), direction_strategy(), 2i32..6, 1i32..6, proptest::bool::ANY);

    runner
        .run(&inputs, |(trainer_pos, facing, gap, wall_at, occupied)| {
            let player_pos = (0..gap).fold(trainer_pos, |pos, _| facing.step(pos));
            let wall_at = wall_at.min(gap - 1);
            let wall = (0..wall_at).fold(trainer_pos, |pos, _| facing.step(pos));
            let map = Map::new(SIZE, SIZE);
            if !map.in_bounds(player_pos) || map.tile_at(player_pos).impassable {
                return Ok(());
            }

            let mut world = world_with_player(if occupied { player_pos } else { Pos { y: 0, x: 0 } });
            let id = world.add_actor(trainer(1, trainer_pos, facing, 8));
            let actor = world.actor(id).cloned().ok_or_else(|| TestCaseError::fail("trainer"))?;
            world.grid_mut().set_tile(wall, Tile::WALL);

            let distance = trainer_approach_distance(&world, &actor, player_pos);
            if distance != 0 {
                return Err(TestCaseError::fail(format!(
                    "wall at {wall:?} between {trainer_pos:?} and {player_pos:?} still gave {distance}"
                )));
            }
            Ok(())
        })
        .expect("an obstacle strictly between trainer and player blocks sight");
}

#[test]
fn sight_probe_leaves_the_trainer_untouched() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(256));
    let inputs = (pos_strategy(), pos_strategy(), direction_strategy(), 0u8..10, 0u8..3, 0u8..3);

    runner
        .run(&inputs, |(trainer_pos, player_pos, facing, range, range_x, range_y)| {
            if trainer_pos == player_pos {
                return Ok(());
            }
            let mut world = world_with_player(player_pos);
            let mut actor = trainer(1, trainer_pos, facing, range);
            actor.movement_range = MovementRange { x: range_x, y: range_y };
            let id = world.add_actor(actor);
            let before = world.actor(id).cloned().ok_or_else(|| TestCaseError::fail("trainer"))?;

            trainer_approach_distance(&world, &before, player_pos);

            if world.actor(id) != Some(&before) {
                return Err(TestCaseError::fail("sight probe mutated the trainer"));
            }
            Ok(())
        })
        .expect("the final-tile probe never mutates the trainer");
}

#[test]
fn detection_records_at_most_two_trainers() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(128));
    let trainers = proptest::collection::vec((pos_strategy(), direction_strategy(), 1u8..8), 0..8);
    let inputs = (pos_strategy(), trainers, proptest::bool::ANY);

    runner
        .run(&inputs, |(player_pos, trainers, can_double)| {
            let mut world = world_with_player(player_pos);
            world.set_party_can_double(can_double);
            for (index, (pos, facing, range)) in trainers.iter().enumerate() {
                if *pos != player_pos {
                    world.add_actor(trainer(index as u8 + 1, *pos, *facing, *range));
                }
            }
            let snapshot: Vec<Actor> = world.actors().cloned().collect();

            let mut sight = TrainerSight::new();
            let detection = sight.check_for_trainers_wanting_battle(&mut world);

            let count = sight.approaching().len();
            if count > 2 || count != detection.count() {
                return Err(TestCaseError::fail(format!("registry holds {count}, detection {detection:?}")));
            }
            if !can_double && matches!(detection, Detection::Double(_, _)) {
                return Err(TestCaseError::fail("double battle without a double-capable party"));
            }
            for recorded in sight.approaching() {
                let actor = world.actor(recorded.actor).ok_or_else(|| TestCaseError::fail("recorded"))?;
                if recorded.radius == 0 || recorded.radius > actor.sight_range {
                    return Err(TestCaseError::fail(format!("radius {} out of range", recorded.radius)));
                }
            }
            let after: Vec<Actor> = world.actors().cloned().collect();
            if after != snapshot {
                return Err(TestCaseError::fail("detection moved an actor"));
            }
            Ok(())
        })
        .expect("detection respects registry capacity");
}
