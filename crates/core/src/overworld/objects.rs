//! Object-event table access and the per-frame held-movement simulation.

use tracing::trace;

use crate::field::ObjectEvents;
use crate::overworld::{Overworld, push_bounded};
use crate::state::{Actor, HeldMovement, ObjectTemplate};
use crate::types::*;

impl Overworld {
    /// Feeds queued movement-script actions to their actors once the previous
    /// action has finished. A `StepEnd` ends the script.
    pub(super) fn run_movement_scripts(&mut self) {
        let targets: Vec<ActorRef> = self.script_queues.keys().copied().collect();
        for target in targets {
            let Some(id) = self.find_actor(target) else {
                self.script_queues.remove(&target);
                continue;
            };
            if self.is_movement_overridden(id) && !self.clear_held_movement_if_finished(id) {
                continue;
            }
            let next = self.script_queues.get_mut(&target).and_then(|queue| queue.pop_front());
            match next {
                Some(MovementAction::StepEnd) | None => {
                    self.script_queues.remove(&target);
                }
                Some(action) => self.set_held_movement(id, action),
            }
        }
    }

    pub(super) fn advance_held_movements(&mut self) {
        let tile_size = self.config.tile_size;
        let walk_frames = i32::from(self.config.walk_frames.max(1));
        let jump_frames = i32::from(self.config.jump_frames);

        for actor in self.actors.values_mut() {
            if actor.frozen {
                continue;
            }
            let Some(held) = actor.held.as_mut() else {
                continue;
            };
            if held.finished {
                continue;
            }

            held.frames_left = held.frames_left.saturating_sub(1);
            held.finished = held.frames_left == 0;
            let left = i32::from(held.frames_left);

            actor.sprite.offset = match held.action {
                MovementAction::WalkNormal(direction) => {
                    let lag = left * tile_size / walk_frames;
                    let step = direction.step(Pos { y: 0, x: 0 });
                    ScreenPos { x: -step.x * lag, y: -step.y * lag }
                }
                MovementAction::JumpInPlace(_) => {
                    let elapsed = jump_frames - left;
                    ScreenPos { x: 0, y: -(elapsed * left) / 4 }
                }
                _ => ScreenPos::default(),
            };
        }
    }

    fn apply_movement_start(actor: &mut Actor, action: MovementAction, player: Option<Pos>) {
        match action {
            MovementAction::Face(direction) | MovementAction::JumpInPlace(direction) => {
                actor.facing = direction;
            }
            MovementAction::WalkNormal(direction) => {
                actor.facing = direction;
                actor.pos = direction.step(actor.pos);
            }
            MovementAction::FacePlayer => {
                if let Some(direction) = player.and_then(|player| Direction::toward(actor.pos, player))
                {
                    actor.facing = direction;
                }
            }
            MovementAction::RevealTrainer => {
                actor.movement_type = MovementType::for_trainer_facing(actor.facing);
            }
            MovementAction::StepEnd => {}
        }
    }
}

impl ObjectEvents for Overworld {
    fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id)
    }

    fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id)
    }

    fn actor_ids(&self) -> Vec<ActorId> {
        self.actors.keys().collect()
    }

    fn player_id(&self) -> ActorId {
        self.player_id
    }

    fn player_dest_pos(&self) -> Pos {
        // Walking actors already occupy their destination tile.
        self.actors.get(self.player_id).map_or(Pos { y: 0, x: 0 }, |player| player.pos)
    }

    fn find_actor(&self, actor: ActorRef) -> Option<ActorId> {
        self.actors.values().find(|candidate| candidate.actor_ref() == actor).map(|found| found.id)
    }

    fn set_held_movement(&mut self, id: ActorId, action: MovementAction) {
        let player = self.actors.get(self.player_id).map(|player| player.pos);
        let frames = self.config.movement_frames(action);
        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };

        Self::apply_movement_start(actor, action, player);
        actor.held = Some(HeldMovement { action, frames_left: frames, finished: frames == 0 });
        trace!(local_id = ?actor.local_id, ?action, "held movement set");
        push_bounded(&mut self.movement_log, (actor.local_id, action));
    }

    fn is_movement_overridden(&self, id: ActorId) -> bool {
        self.actors.get(id).is_some_and(|actor| actor.held.is_some())
    }

    fn clear_held_movement_if_finished(&mut self, id: ActorId) -> bool {
        let Some(actor) = self.actors.get_mut(id) else {
            return false;
        };
        if actor.held.is_some_and(|held| held.finished) {
            actor.held = None;
            return true;
        }
        false
    }

    fn held_movement_finished(&self, id: ActorId) -> bool {
        self.actors.get(id).is_some_and(|actor| actor.held.is_some_and(|held| held.finished))
    }

    fn clear_held_movement(&mut self, id: ActorId) {
        if let Some(actor) = self.actors.get_mut(id) {
            actor.held = None;
            actor.sprite.offset = ScreenPos::default();
        }
    }

    fn set_trainer_movement_type(&mut self, id: ActorId, movement_type: MovementType) {
        if let Some(actor) = self.actors.get_mut(id) {
            actor.movement_type = movement_type;
            if let MovementType::FaceDirection(direction) = movement_type {
                actor.facing = direction;
            }
        }
    }

    fn override_template(&mut self, id: ActorId) {
        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };
        actor.template_pos = actor.pos;
        let template = ObjectTemplate { pos: actor.pos, movement_type: actor.movement_type };
        self.templates.insert(actor.actor_ref(), template);
    }

    fn freeze_all_except(&mut self, id: ActorId) {
        for actor in self.actors.values_mut() {
            actor.frozen = actor.id != id;
        }
    }

    fn unfreeze_all(&mut self) {
        for actor in self.actors.values_mut() {
            actor.frozen = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ScriptEngine;
    use crate::sight::test_support::*;

    #[test]
    fn walk_lands_on_destination_and_sprite_catches_up() {
        let (mut world, trainer) = lane_fixture(Direction::South, 4);

        world.set_held_movement(trainer, MovementAction::WalkNormal(Direction::South));
        assert_eq!(world.actors[trainer].pos, Pos { y: 6, x: 5 });

        world.tick();
        assert_eq!(world.actors[trainer].sprite.offset, ScreenPos { x: 0, y: -15 });
        assert!(!world.held_movement_finished(trainer));

        for _ in 1..world.config.walk_frames {
            world.tick();
        }
        assert!(world.held_movement_finished(trainer));
        assert_eq!(world.actors[trainer].sprite.offset, ScreenPos::default());
        assert!(world.clear_held_movement_if_finished(trainer));
        assert!(!world.is_movement_overridden(trainer));
    }

    #[test]
    fn frozen_actor_does_not_progress() {
        let (mut world, trainer) = lane_fixture(Direction::South, 4);
        let player = world.player_id;
        world.set_held_movement(trainer, MovementAction::Face(Direction::West));
        world.freeze_all_except(player);

        world.tick();
        assert!(!world.held_movement_finished(trainer));

        world.unfreeze_all();
        world.tick();
        assert!(world.held_movement_finished(trainer));
    }

    #[test]
    fn face_player_turns_toward_the_player() {
        let (mut world, trainer) = lane_fixture(Direction::South, 4);
        world.place_player(Pos { y: 5, x: 2 });
        world.set_held_movement(trainer, MovementAction::FacePlayer);
        assert_eq!(world.actors[trainer].facing, Direction::West);
    }

    #[test]
    fn movement_script_runs_to_step_end() {
        let (mut world, _) = lane_fixture(Direction::South, 4);
        let player = world.player_id;
        let target = world.actors[player].actor_ref();

        world.start_object_movement_script(
            target,
            &[MovementAction::Face(Direction::West), MovementAction::StepEnd],
        );
        for _ in 0..4 {
            world.tick();
        }

        assert_eq!(world.actors[player].facing, Direction::West);
        assert!(world.is_quiescent());
    }

    #[test]
    fn overriding_template_persists_position() {
        let (mut world, trainer) = lane_fixture(Direction::South, 4);
        world.set_held_movement(trainer, MovementAction::WalkNormal(Direction::South));
        world.set_trainer_movement_type(trainer, MovementType::FaceDirection(Direction::East));
        world.override_template(trainer);

        let actor = &world.actors[trainer];
        let template = world.template_of(actor.actor_ref()).expect("template recorded");
        assert_eq!(template.pos, Pos { y: 6, x: 5 });
        assert_eq!(template.movement_type, MovementType::FaceDirection(Direction::East));
        assert_eq!(actor.facing, Direction::East);
    }
}
