//! Trainer line-of-sight detection and the approach that follows it.
//!
//! [`TrainerSight`] owns everything that outlives a single detection pass:
//! the registry of (at most two) approaching trainers, the double-battle
//! cursor, the "trainer approached the player" flag and the running approach
//! and reveal tasks. The overworld it inspects is passed in on every call.

use std::mem;

use arrayvec::ArrayVec;
use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::field::{Field, trainer_flag_key};
use crate::types::*;

mod approach;
mod hooks;
pub mod icons;
mod reveal;
mod scan;

#[cfg(test)]
pub(crate) mod test_support;

pub use approach::{ApproachFollowup, POP_OUT_JUMP_FRAME};
pub use icons::{IconSprite, IconUpdate, SpriteAnchor, spawn_icon};
pub use scan::{
    approach_distance_in_direction, check_path, trainer_approach_distance, trainer_sight_line,
};

use approach::{ApproachTask, TaskStatus};
use reveal::HiddenRevealTask;

/// A double battle is the largest ambush the battle system supports.
pub const MAX_APPROACHING_TRAINERS: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApproachingTrainer {
    pub actor: ActorId,
    pub local_id: LocalId,
    pub script: TrainerScript,
    /// Tiles between trainer and player when spotted; always at least 1.
    pub radius: u8,
    pub task: TaskId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TrainerCheck {
    NotFound,
    Single,
    DoubleOnly,
}

#[derive(Clone, Debug, Default)]
pub struct TrainerSight {
    approaching: ArrayVec<ApproachingTrainer, MAX_APPROACHING_TRAINERS>,
    cursor: usize,
    approached_player: bool,
    face_after_battle: usize,
    tasks: SlotMap<TaskId, ApproachTask>,
    reveals: SlotMap<TaskId, HiddenRevealTask>,
    events: Vec<SightEvent>,
}

impl TrainerSight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans every object event for a trainer that can see the player and
    /// configures the resulting single or two-trainer battle.
    pub fn check_for_trainers_wanting_battle<F: Field + ?Sized>(&mut self, field: &mut F) -> Detection {
        self.approaching.clear();
        self.cursor = 0;
        self.face_after_battle = 0;

        for id in field.actor_ids() {
            let Some(actor) = field.actor(id) else {
                continue;
            };
            if !actor.active || !actor.trainer_type.can_spot_player() {
                continue;
            }

            match self.check_trainer(field, id) {
                TrainerCheck::NotFound => continue,
                // A double-only trainer fills the battle on its own.
                TrainerCheck::DoubleOnly => break,
                TrainerCheck::Single => {
                    if self.approaching.is_full() || !field.party_can_double_battle() {
                        break;
                    }
                }
            }
        }

        match self.approaching.as_slice() {
            [trainer] => {
                let trainer = *trainer;
                field.reset_trainer_opponent_ids();
                field.configure_one_trainer_battle(trainer.local_id, trainer.script);
                self.approached_player = true;
                self.events.push(SightEvent::SingleBattleConfigured { trainer: trainer.local_id });
                debug!(trainer = ?trainer.local_id, "single trainer battle configured");
                Detection::Single(trainer.actor)
            }
            [first, second] => {
                let (first, second) = (*first, *second);
                field.reset_trainer_opponent_ids();
                for (slot, trainer) in [first, second].into_iter().enumerate() {
                    self.cursor = slot;
                    field.configure_two_trainers_battle(slot, trainer.local_id, trainer.script);
                }
                field.set_up_two_trainers_battle();
                self.cursor = 0;
                self.approached_player = true;
                self.events.push(SightEvent::DoubleBattleConfigured {
                    first: first.local_id,
                    second: second.local_id,
                });
                debug!(first = ?first.local_id, second = ?second.local_id, "two trainer battle configured");
                Detection::Double(first.actor, second.actor)
            }
            _ => {
                self.approached_player = false;
                Detection::None
            }
        }
    }

    fn check_trainer<F: Field + ?Sized>(&mut self, field: &mut F, id: ActorId) -> TrainerCheck {
        let Some(actor) = field.actor(id) else {
            return TrainerCheck::NotFound;
        };
        let Some(script) = actor.script else {
            return TrainerCheck::NotFound;
        };
        let local_id = actor.local_id;

        let context = field.game_context();
        if field.trainer_flags(context).is_set(trainer_flag_key(context, actor, script)) {
            trace!(trainer = ?local_id, ?context, "trainer already battled");
            return TrainerCheck::NotFound;
        }

        let Some((direction, distance)) = trainer_sight_line(field, actor, field.player_dest_pos())
        else {
            return TrainerCheck::NotFound;
        };
        let turn = actor.facing != direction;

        let check = if script.mode.requires_double() {
            if !field.party_can_double_battle() {
                debug!(trainer = ?local_id, "double battle trainer ignored, party cannot double");
                self.events.push(SightEvent::DoubleBattleRejected { trainer: local_id });
                return TrainerCheck::NotFound;
            }
            TrainerCheck::DoubleOnly
        } else {
            TrainerCheck::Single
        };

        if self.approaching.is_full() {
            return TrainerCheck::NotFound;
        }
        if turn && let Some(trainer) = field.actor_mut(id) {
            // Omnidirectional trainers turn toward the line they spotted the player on.
            trainer.facing = direction;
        }
        self.tasks.retain(|_, task| task.actor != id);
        let task = self.tasks.insert(ApproachTask::new(id, distance - 1));
        self.approaching.push(ApproachingTrainer { actor: id, local_id, script, radius: distance, task });
        self.events.push(SightEvent::TrainerSpotted { trainer: local_id, distance });
        debug!(trainer = ?local_id, distance, "trainer spotted the player");

        check
    }

    /// Runs one frame of every approach and reveal task.
    pub fn run_tasks<F: Field + ?Sized>(&mut self, field: &mut F) {
        let task_ids: Vec<TaskId> = self.tasks.keys().collect();
        for task_id in task_ids {
            let parked = self.tasks.get(task_id).is_some_and(|task| {
                task.step == ApproachStep::Finished && task.followup == ApproachFollowup::Park
            });
            if !parked {
                self.run_task(task_id, field);
            }
        }

        let reveal_ids: Vec<TaskId> = self.reveals.keys().collect();
        for reveal_id in reveal_ids {
            let Some(reveal) = self.reveals.get_mut(reveal_id) else {
                continue;
            };
            if reveal.run(field) == TaskStatus::Complete {
                let actor = reveal.actor;
                self.reveals.remove(reveal_id);
                if let Some(trainer) = field.actor(actor) {
                    self.events.push(SightEvent::HiddenTrainerRevealed { trainer: trainer.local_id });
                }
            }
        }
    }

    fn run_task<F: Field + ?Sized>(&mut self, task_id: TaskId, field: &mut F) {
        let Some(task) = self.tasks.get_mut(task_id) else {
            return;
        };
        let before = task.step;
        let status = task.run(field);
        if status == TaskStatus::Complete {
            task.step = ApproachStep::Finished;
        }
        let (actor, step, followup) = (task.actor, task.step, task.followup);
        let trainer = field.actor(actor).map_or(LocalId(0), |actor| actor.local_id);

        if step != before {
            trace!(?trainer, ?step, "approach step changed");
            self.events.push(SightEvent::ApproachStepChanged { trainer, step });
        }
        if status == TaskStatus::Running {
            return;
        }

        self.events.push(SightEvent::ApproachFinished { trainer });
        if followup == ApproachFollowup::DestroyAndEnableScripts {
            self.tasks.remove(task_id);
            field.enable_script_contexts();
            self.events.push(SightEvent::ScriptContextsEnabled);
        }
    }

    /// Forces a buried trainer out of the ash outside of a sight approach.
    pub fn reveal_hidden_trainer(&mut self, actor: ActorId) -> TaskId {
        self.reveals.insert(HiddenRevealTask::new(actor))
    }

    pub fn approaching(&self) -> &[ApproachingTrainer] {
        &self.approaching
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn trainer_approached_player(&self) -> bool {
        self.approached_player
    }

    /// Current step of the approach task driving `actor`, if any.
    pub fn approach_step(&self, actor: ActorId) -> Option<ApproachStep> {
        self.tasks.values().find(|task| task.actor == actor).map(|task| task.step)
    }

    pub fn remaining_walk_steps(&self, actor: ActorId) -> Option<u8> {
        self.tasks.values().find(|task| task.actor == actor).map(|task| task.remaining_steps())
    }

    pub fn active_task_count(&self) -> usize {
        self.tasks.len() + self.reveals.len()
    }

    /// True when no approach is mid-flight and no reveal is pending.
    pub fn is_settled(&self) -> bool {
        self.reveals.is_empty()
            && self.tasks.values().all(|task| task.step == ApproachStep::Finished)
    }

    pub fn events(&self) -> &[SightEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<SightEvent> {
        mem::take(&mut self.events)
    }
}
