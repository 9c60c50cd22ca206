//! Stand-alone reveal of a buried trainer, used when a cutscene forces the
//! trainer out of the ash outside of a sight approach.

use crate::field::Field;
use crate::sight::approach::{
    TaskStatus, issue_when_idle, jump_out_of_ash, pop_out_of_ash, settle_trainer,
};
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RevealStep {
    FacePlayer,
    PopOutOfAsh,
    JumpInPlace,
    WaitForAsh,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct HiddenRevealTask {
    pub(crate) actor: ActorId,
    pub(crate) step: RevealStep,
    held_cleared: bool,
    ash_effect: Option<EffectId>,
}

impl HiddenRevealTask {
    pub(crate) fn new(actor: ActorId) -> Self {
        Self { actor, step: RevealStep::FacePlayer, held_cleared: false, ash_effect: None }
    }

    /// One frame of the reveal. Completes once the ash has settled, after
    /// restoring the trainer's stationary behavior.
    pub(crate) fn run<F: Field + ?Sized>(&mut self, field: &mut F) -> TaskStatus {
        if field.actor(self.actor).is_none() {
            return TaskStatus::Complete;
        }
        if !self.held_cleared {
            field.clear_held_movement(self.actor);
            self.held_cleared = true;
        }

        match self.step {
            RevealStep::FacePlayer => {
                if issue_when_idle(field, self.actor, MovementAction::FacePlayer) {
                    self.step = RevealStep::PopOutOfAsh;
                }
            }
            RevealStep::PopOutOfAsh => {
                if let Some(effect) = pop_out_of_ash(field, self.actor) {
                    self.ash_effect = effect;
                    self.step = RevealStep::JumpInPlace;
                }
            }
            RevealStep::JumpInPlace => {
                if jump_out_of_ash(field, self.actor, self.ash_effect) {
                    self.step = RevealStep::WaitForAsh;
                }
            }
            RevealStep::WaitForAsh => {}
        }

        if self.step == RevealStep::WaitForAsh && !field.effect_active(EffectKind::PopOutOfAsh) {
            if let Some(facing) = field.actor(self.actor).map(|trainer| trainer.facing) {
                settle_trainer(field, self.actor, facing);
            }
            return TaskStatus::Complete;
        }
        TaskStatus::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldEffects;
    use crate::sight::test_support::*;
    use crate::state::HeldMovement;

    #[test]
    fn forced_reveal_restores_stationary_behavior() {
        let (mut world, trainer) = lane_fixture(Direction::South, 4);
        hide_trainer(&mut world, trainer);
        world.place_player(Pos { y: 5, x: 8 });
        let mut task = HiddenRevealTask::new(trainer);

        let mut frames = 0;
        while task.run(&mut world) == TaskStatus::Running {
            world.tick();
            frames += 1;
            assert!(frames < 500, "reveal stalled at {:?}", task.step);
        }

        let actor = &world.actors[trainer];
        assert_eq!(actor.facing, Direction::East);
        assert_eq!(actor.movement_type, MovementType::FaceDirection(Direction::East));
        assert!(!actor.fixed_priority);
        assert!(!world.effect_active(EffectKind::PopOutOfAsh));
        assert_eq!(world.template_of(actor.actor_ref()).map(|t| t.movement_type), Some(actor.movement_type));
    }

    #[test]
    fn first_frame_drops_pending_held_movement() {
        let (mut world, trainer) = lane_fixture(Direction::South, 4);
        hide_trainer(&mut world, trainer);
        world.actors[trainer].held = Some(HeldMovement {
            action: MovementAction::WalkNormal(Direction::South),
            frames_left: 10,
            finished: false,
        });
        let mut task = HiddenRevealTask::new(trainer);

        task.run(&mut world);

        assert_eq!(world.actors[trainer].held.map(|held| held.action), Some(MovementAction::FacePlayer));
        assert_eq!(task.step, RevealStep::PopOutOfAsh);
    }

    #[test]
    fn vanished_trainer_ends_reveal() {
        let (mut world, trainer) = lane_fixture(Direction::South, 4);
        world.remove_actor(trainer);
        let mut task = HiddenRevealTask::new(trainer);
        assert_eq!(task.run(&mut world), TaskStatus::Complete);
    }
}
