//! Script-facing queries and commands used between detection and the end of
//! the battle.

use tracing::debug;

use crate::field::Field;
use crate::sight::{ApproachFollowup, MAX_APPROACHING_TRAINERS, TrainerSight};
use crate::types::*;

impl TrainerSight {
    /// Moves the cursor to the second trainer of a pending two-trainer battle
    /// so the script can configure it. Returns (and publishes as the special
    /// result) whether a trainer remained to configure; the following call
    /// rewinds the cursor.
    pub fn try_prepare_second_approaching_trainer<F: Field + ?Sized>(&mut self, field: &mut F) -> bool {
        let more = match self.approaching.as_slice() {
            [_, second] if self.cursor == 0 => {
                self.cursor = 1;
                field.unfreeze_all();
                field.freeze_all_except(second.actor);
                self.events.push(SightEvent::SecondTrainerSelected { trainer: second.local_id });
                true
            }
            [_, _] => {
                self.cursor = 0;
                false
            }
            _ => false,
        };
        debug!(cursor = self.cursor, more, "prepared approaching trainer");
        field.set_special_var_result(more);
        more
    }

    pub fn current_approaching_trainer(&self) -> Option<ActorId> {
        let index = if self.cursor == 0 { 0 } else { 1 };
        self.approaching.get(index).map(|trainer| trainer.actor)
    }

    /// Registry lookup that clamps out-of-range indices to the first slot.
    pub fn chosen_approaching_trainer(&self, index: usize) -> Option<ActorId> {
        let index = if index >= MAX_APPROACHING_TRAINERS { 0 } else { index };
        self.approaching.get(index).map(|trainer| trainer.actor)
    }

    /// Selects which registered trainer the player turns to after the battle.
    pub fn set_trainer_to_face_after_battle(&mut self, index: usize) {
        self.face_after_battle = index;
    }

    /// Turns the player toward the trainer that approached, or re-asserts the
    /// player's own facing, through a one-step movement script.
    pub fn player_face_trainer_after_battle<F: Field + ?Sized>(&mut self, field: &mut F) {
        let Some(player) = field.actor(field.player_id()) else {
            return;
        };
        let player_ref = player.actor_ref();
        let mut direction = player.facing;

        if self.approached_player
            && let Some(trainer) = self
                .chosen_approaching_trainer(self.face_after_battle)
                .and_then(|id| field.actor(id))
        {
            direction = trainer.facing.opposite();
        }

        let script = [MovementAction::Face(direction), MovementAction::StepEnd];
        field.start_object_movement_script(player_ref, &script);
        field.set_moving_npc(player_ref.local_id);
        self.events.push(SightEvent::PlayerFaced { direction });
    }

    /// Re-arms the current trainer's approach at the exclamation mark with a
    /// new follow-up. Returns false when that trainer has no task left.
    pub fn start_trainer_approach<F: Field + ?Sized>(
        &mut self,
        field: &mut F,
        followup: ApproachFollowup,
    ) -> bool {
        let Some(task_id) = self.current_task() else {
            return false;
        };
        if let Some(task) = self.tasks.get_mut(task_id) {
            task.followup = followup;
            task.step = ApproachStep::ExclamationMark;
        }
        self.run_task(task_id, field);
        true
    }

    /// Forces the current trainer's approach to its destroy step and returns
    /// control to the script engine.
    pub fn end_trainer_approach<F: Field + ?Sized>(&mut self, field: &mut F) {
        let Some(task_id) = self.current_task() else {
            field.enable_script_contexts();
            self.events.push(SightEvent::ScriptContextsEnabled);
            return;
        };
        if let Some(task) = self.tasks.get_mut(task_id) {
            task.followup = ApproachFollowup::DestroyAndEnableScripts;
            task.step = ApproachStep::Finished;
        }
        self.run_task(task_id, field);
    }

    fn current_task(&self) -> Option<TaskId> {
        let actor = self.current_approaching_trainer()?;
        self.tasks.iter().find(|(_, task)| task.actor == actor).map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overworld::Overworld;
    use crate::sight::test_support::*;

    fn double_fixture() -> (Overworld, ActorId, ActorId, TrainerSight) {
        let (mut world, first) = lane_fixture(Direction::South, 4);
        world.place_player(Pos { y: 8, x: 5 });
        let second = add_trainer(&mut world, 2, Pos { y: 8, x: 2 }, Direction::East, 4, 202);
        world.party_can_double = true;
        let mut sight = TrainerSight::new();
        assert_eq!(sight.check_for_trainers_wanting_battle(&mut world), Detection::Double(first, second));
        (world, first, second, sight)
    }

    #[test]
    fn second_trainer_cursor_alternates() {
        let (mut world, first, second, mut sight) = double_fixture();

        assert!(sight.try_prepare_second_approaching_trainer(&mut world));
        assert_eq!(sight.cursor(), 1);
        assert_eq!(world.special_var_result, Some(true));
        assert_eq!(sight.current_approaching_trainer(), Some(second));
        assert!(world.actors[first].frozen);
        assert!(!world.actors[second].frozen);

        assert!(!sight.try_prepare_second_approaching_trainer(&mut world));
        assert_eq!(sight.cursor(), 0);
        assert_eq!(world.special_var_result, Some(false));
        assert_eq!(sight.current_approaching_trainer(), Some(first));
    }

    #[test]
    fn single_registry_never_selects_a_second_trainer() {
        let (mut world, _) = lane_fixture(Direction::South, 4);
        world.place_player(Pos { y: 8, x: 5 });
        let mut sight = TrainerSight::new();
        sight.check_for_trainers_wanting_battle(&mut world);

        assert!(!sight.try_prepare_second_approaching_trainer(&mut world));
        assert_eq!(sight.cursor(), 0);
        assert_eq!(world.special_var_result, Some(false));
    }

    #[test]
    fn out_of_range_lookup_falls_back_to_first_slot() {
        let (_, first, second, sight) = double_fixture();
        assert_eq!(sight.chosen_approaching_trainer(0), Some(first));
        assert_eq!(sight.chosen_approaching_trainer(1), Some(second));
        assert_eq!(sight.chosen_approaching_trainer(7), Some(first));
        assert_eq!(TrainerSight::new().chosen_approaching_trainer(0), None);
    }

    #[test]
    fn player_faces_the_approaching_trainer_after_battle() {
        let (mut world, _, _, mut sight) = double_fixture();
        sight.set_trainer_to_face_after_battle(1);

        sight.player_face_trainer_after_battle(&mut world);

        let (target, script) = world.scripted_movements.back().cloned().expect("script queued");
        assert_eq!(target.local_id, LocalId::PLAYER);
        assert_eq!(script, vec![MovementAction::Face(Direction::West), MovementAction::StepEnd]);
        assert_eq!(world.moving_npc, Some(LocalId::PLAYER));
    }

    #[test]
    fn new_detection_forgets_the_previous_facing_choice() {
        let (mut world, first, second, mut sight) = double_fixture();
        sight.set_trainer_to_face_after_battle(1);
        world.actors[second].active = false;

        assert_eq!(sight.check_for_trainers_wanting_battle(&mut world), Detection::Single(first));
        sight.player_face_trainer_after_battle(&mut world);

        let (_, script) = world.scripted_movements.back().cloned().expect("script queued");
        assert_eq!(script, vec![MovementAction::Face(Direction::North), MovementAction::StepEnd]);
    }

    #[test]
    fn player_keeps_facing_without_an_approach() {
        let (mut world, _) = lane_fixture(Direction::South, 4);
        let player = world.player_id;
        world.actors[player].facing = Direction::East;
        let mut sight = TrainerSight::new();
        sight.check_for_trainers_wanting_battle(&mut world);

        sight.player_face_trainer_after_battle(&mut world);

        let (_, script) = world.scripted_movements.back().cloned().expect("script queued");
        assert_eq!(script, vec![MovementAction::Face(Direction::East), MovementAction::StepEnd]);
    }

    #[test]
    fn ending_the_approach_destroys_the_task_and_resumes_scripts() {
        let (mut world, trainer) = lane_fixture(Direction::South, 4);
        world.place_player(Pos { y: 8, x: 5 });
        let mut sight = TrainerSight::new();
        sight.check_for_trainers_wanting_battle(&mut world);
        sight.run_tasks(&mut world);

        sight.end_trainer_approach(&mut world);

        assert_eq!(sight.approach_step(trainer), None);
        assert_eq!(world.script_contexts_enabled, 1);
        assert!(sight.events().contains(&SightEvent::ScriptContextsEnabled));
    }

    #[test]
    fn restarted_approach_destroys_itself_when_done() {
        let (mut world, trainer) = lane_fixture(Direction::South, 4);
        world.place_player(Pos { y: 8, x: 5 });
        let mut sight = TrainerSight::new();
        sight.check_for_trainers_wanting_battle(&mut world);

        assert!(sight.start_trainer_approach(&mut world, ApproachFollowup::DestroyAndEnableScripts));
        assert_eq!(sight.approach_step(trainer), Some(ApproachStep::WaitExclamationMark));

        run_frames(&mut world, &mut sight, 400);

        assert_eq!(sight.approach_step(trainer), None);
        assert_eq!(world.script_contexts_enabled, 1);
        assert_eq!(world.actors[trainer].pos, Pos { y: 7, x: 5 });
    }
}
