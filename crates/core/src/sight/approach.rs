//! Per-trainer approach choreography.
//!
//! Each spotted trainer gets an [`ApproachTask`] that is re-entered once per
//! frame. A step either chains straight into the next one within the same
//! frame or yields until a movement or effect owned by the overworld finishes.
//!
//! ```text
//! Idle -> ExclamationMark -> WaitExclamationMark -+-> MoveToPlayer -> PlayerFaceTrainer -> WaitPlayerFace -> Finished
//!                                                 |        ^   ^
//!   disguised: RevealDisguise -> WaitRevealDisguise -------+   |
//!   hidden:    RevealHidden -> PopOutOfAsh -> JumpInPlace -> WaitRevealHidden
//! ```

use tracing::{debug, trace};

use crate::field::{EffectRequest, Field};
use crate::sight::icons::spawn_icon;
use crate::types::*;

/// Pop-out-of-ash animation index at which the buried trainer jumps out.
pub const POP_OUT_JUMP_FRAME: u8 = 2;

/// What happens to a task once its trainer reaches the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ApproachFollowup {
    /// Keep the finished task so scripts can query or re-arm it.
    #[default]
    Park,
    /// Release the task and hand control back to the script engine.
    DestroyAndEnableScripts,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Yield,
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TaskStatus {
    Running,
    Complete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ApproachTask {
    pub(crate) actor: ActorId,
    pub(crate) step: ApproachStep,
    pub(crate) followup: ApproachFollowup,
    /// Walking steps left before the trainer turns to the player.
    remaining_steps: u8,
    ash_effect: Option<EffectId>,
}

impl ApproachTask {
    pub(crate) fn new(actor: ActorId, remaining_steps: u8) -> Self {
        Self {
            actor,
            step: ApproachStep::Idle,
            followup: ApproachFollowup::default(),
            remaining_steps,
            ash_effect: None,
        }
    }

    pub(crate) fn remaining_steps(&self) -> u8 {
        self.remaining_steps
    }

    /// Runs steps until one yields. A trainer that vanished or went inactive
    /// completes immediately.
    pub(crate) fn run<F: Field + ?Sized>(&mut self, field: &mut F) -> TaskStatus {
        if !field.actor(self.actor).is_some_and(|actor| actor.active) {
            return TaskStatus::Complete;
        }

        loop {
            match self.advance(field) {
                Flow::Continue => continue,
                Flow::Yield => return TaskStatus::Running,
                Flow::Done => {
                    self.step = ApproachStep::Finished;
                    return TaskStatus::Complete;
                }
            }
        }
    }

    fn advance<F: Field + ?Sized>(&mut self, field: &mut F) -> Flow {
        match self.step {
            ApproachStep::Idle => {
                self.step = ApproachStep::ExclamationMark;
                Flow::Continue
            }
            ApproachStep::ExclamationMark => self.exclamation_mark(field),
            ApproachStep::WaitExclamationMark => self.wait_exclamation_mark(field),
            ApproachStep::MoveToPlayer => self.move_to_player(field),
            ApproachStep::PlayerFaceTrainer => self.player_face_trainer(field),
            ApproachStep::WaitPlayerFace => self.wait_player_face(field),
            ApproachStep::RevealDisguise => {
                if issue_when_idle(field, self.actor, MovementAction::RevealTrainer) {
                    self.step = ApproachStep::WaitRevealDisguise;
                }
                Flow::Yield
            }
            ApproachStep::WaitRevealDisguise => {
                if field.clear_held_movement_if_finished(self.actor) {
                    self.step = ApproachStep::MoveToPlayer;
                }
                Flow::Yield
            }
            ApproachStep::RevealHidden => {
                if issue_when_idle(field, self.actor, MovementAction::FacePlayer) {
                    self.step = ApproachStep::PopOutOfAsh;
                }
                Flow::Yield
            }
            ApproachStep::PopOutOfAsh => {
                if let Some(effect) = pop_out_of_ash(field, self.actor) {
                    self.ash_effect = effect;
                    self.step = ApproachStep::JumpInPlace;
                }
                Flow::Yield
            }
            ApproachStep::JumpInPlace => {
                if jump_out_of_ash(field, self.actor, self.ash_effect) {
                    self.step = ApproachStep::WaitRevealHidden;
                }
                Flow::Yield
            }
            ApproachStep::WaitRevealHidden => {
                if !field.effect_active(EffectKind::PopOutOfAsh) {
                    self.step = ApproachStep::MoveToPlayer;
                }
                Flow::Yield
            }
            ApproachStep::Finished => Flow::Done,
        }
    }

    fn exclamation_mark<F: Field + ?Sized>(&mut self, field: &mut F) -> Flow {
        let Some(trainer) = field.actor(self.actor) else {
            return Flow::Done;
        };
        let facing = trainer.facing;
        let target = trainer.actor_ref();

        spawn_icon(field, IconKind::ExclamationMark, target);
        field.set_held_movement(self.actor, MovementAction::Face(facing));
        self.step = ApproachStep::WaitExclamationMark;
        Flow::Continue
    }

    fn wait_exclamation_mark<F: Field + ?Sized>(&mut self, field: &mut F) -> Flow {
        if field.effect_active(EffectKind::Icon(IconKind::ExclamationMark)) {
            return Flow::Yield;
        }
        let Some(trainer) = field.actor(self.actor) else {
            return Flow::Done;
        };
        self.step = match trainer.movement_type {
            movement if movement.is_disguise() => ApproachStep::RevealDisguise,
            MovementType::Hidden => ApproachStep::RevealHidden,
            _ => ApproachStep::MoveToPlayer,
        };
        Flow::Continue
    }

    fn move_to_player<F: Field + ?Sized>(&mut self, field: &mut F) -> Flow {
        if !movement_settled(field, self.actor) {
            return Flow::Yield;
        }
        let Some(facing) = field.actor(self.actor).map(|trainer| trainer.facing) else {
            return Flow::Done;
        };

        if self.remaining_steps > 0 {
            field.set_held_movement(self.actor, MovementAction::WalkNormal(facing));
            self.remaining_steps -= 1;
            trace!(remaining = self.remaining_steps, "trainer stepped toward player");
        } else {
            field.set_held_movement(self.actor, MovementAction::FacePlayer);
            self.step = ApproachStep::PlayerFaceTrainer;
        }
        Flow::Yield
    }

    fn player_face_trainer<F: Field + ?Sized>(&mut self, field: &mut F) -> Flow {
        if field.is_movement_overridden(self.actor)
            && !field.clear_held_movement_if_finished(self.actor)
        {
            return Flow::Yield;
        }
        let Some(facing) = field.actor(self.actor).map(|trainer| trainer.facing) else {
            return Flow::Done;
        };

        settle_trainer(field, self.actor, facing);

        let player = field.player_id();
        if field.is_movement_overridden(player) && !field.clear_held_movement_if_finished(player)
        {
            return Flow::Yield;
        }
        field.set_held_movement(player, MovementAction::Face(facing.opposite()));
        self.step = ApproachStep::WaitPlayerFace;
        Flow::Yield
    }

    fn wait_player_face<F: Field + ?Sized>(&mut self, field: &mut F) -> Flow {
        let player = field.player_id();
        if movement_settled(field, player) { Flow::Done } else { Flow::Yield }
    }
}

/// True once `id` has no held movement, consuming a finished one.
fn movement_settled<F: Field + ?Sized>(field: &mut F, id: ActorId) -> bool {
    !field.is_movement_overridden(id) || field.clear_held_movement_if_finished(id)
}

/// Issues `action` once the previous held movement of `id` has settled.
pub(super) fn issue_when_idle<F: Field + ?Sized>(
    field: &mut F,
    id: ActorId,
    action: MovementAction,
) -> bool {
    if !movement_settled(field, id) {
        return false;
    }
    field.set_held_movement(id, action);
    true
}

/// Re-derives the trainer's stationary behavior from its facing and persists it.
pub(super) fn settle_trainer<F: Field + ?Sized>(field: &mut F, id: ActorId, facing: Direction) {
    field.set_trainer_movement_type(id, MovementType::for_trainer_facing(facing));
    field.override_template(id);
}

/// Starts the pop-out-of-ash effect once the trainer has turned to face the
/// player. `None` means keep waiting; `Some(None)` means the effect pool was
/// full and the reveal continues without it.
pub(super) fn pop_out_of_ash<F: Field + ?Sized>(
    field: &mut F,
    id: ActorId,
) -> Option<Option<EffectId>> {
    if !field.held_movement_finished(id) {
        return None;
    }
    let trainer = field.actor(id)?;
    let local_id = trainer.local_id;
    let request = EffectRequest::PopOutOfAsh {
        pos: trainer.pos,
        subpriority: trainer.sprite.subpriority.saturating_sub(1),
        priority: 2,
    };
    let effect = field.start_effect(request);
    if effect.is_none() {
        debug!(trainer = ?local_id, "pop-out-of-ash effect skipped, sprite pool full");
    }
    Some(effect)
}

/// Lifts a buried trainer out of the ash layer and starts its jump once the
/// ash animation reaches [`POP_OUT_JUMP_FRAME`].
pub(super) fn jump_out_of_ash<F: Field + ?Sized>(
    field: &mut F,
    id: ActorId,
    ash_effect: Option<EffectId>,
) -> bool {
    let ready = ash_effect
        .and_then(|effect| field.effect_anim_index(effect))
        .is_none_or(|index| index >= POP_OUT_JUMP_FRAME);
    if !ready {
        return false;
    }

    let Some(trainer) = field.actor_mut(id) else {
        return false;
    };
    trainer.fixed_priority = false;
    trainer.trigger_ground_effects = true;
    trainer.sprite.priority = 2;
    let facing = trainer.facing;

    field.clear_held_movement_if_finished(id);
    field.set_held_movement(id, MovementAction::JumpInPlace(facing));
    true
}
