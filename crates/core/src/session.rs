//! Frame-stepped driver tying the overworld to trainer sight.
//!
//! A [`Session`] accepts the same inputs a field script and the player would
//! issue, records each accepted one in an [`InputJournal`] and advances the
//! world frame by frame until a battle is ready or everything settles.

use thiserror::Error;
use tracing::debug;

use crate::field::{ObjectEvents, trainer_flag_key};
use crate::journal::{InputJournal, InputPayload};
use crate::overworld::Overworld;
use crate::sight::TrainerSight;
use crate::types::*;

mod hash;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a trainer approach is in progress")]
    ApproachInProgress,
    #[error("no trainer approach is in progress")]
    NoApproach,
    #[error("the player is still moving or frozen")]
    PlayerBusy,
    #[error("no object event with local id {0}")]
    UnknownActor(u8),
    #[error("object event {0} is not a hidden trainer")]
    NotHidden(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvanceStopReason {
    /// Every approaching trainer reached the player; the battle can start.
    BattleReady { trainers: usize },
    /// No approach, reveal, movement or effect is pending.
    Settled,
    BudgetExhausted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdvanceResult {
    pub simulated_frames: u32,
    pub stop_reason: AdvanceStopReason,
}

#[derive(Clone, Debug)]
pub struct Session {
    world: Overworld,
    sight: TrainerSight,
    log: Vec<SightEvent>,
    journal: InputJournal,
    next_input_seq: u64,
    battle_pending: bool,
}

impl Session {
    pub fn new(world: Overworld) -> Self {
        Self {
            world,
            sight: TrainerSight::new(),
            log: Vec::new(),
            journal: InputJournal::new(),
            next_input_seq: 0,
            battle_pending: false,
        }
    }

    pub fn apply(&mut self, input: InputPayload) -> Result<(), SessionError> {
        match input {
            InputPayload::Step { direction } => self.step_player(direction).map(|_| ()),
            InputPayload::Advance { frames } => {
                self.advance(frames);
                Ok(())
            }
            InputPayload::PrepareSecondTrainer => {
                self.prepare_second_trainer();
                Ok(())
            }
            InputPayload::EndApproach => self.end_approach(),
            InputPayload::FaceAfterBattle { index } => {
                self.face_after_battle(index);
                Ok(())
            }
            InputPayload::RevealHidden { local_id } => self.reveal_hidden(local_id),
        }
    }

    /// Starts a player step and runs a detection pass against the tile the
    /// player is moving into.
    pub fn step_player(&mut self, direction: Direction) -> Result<Detection, SessionError> {
        if self.battle_pending {
            return Err(SessionError::ApproachInProgress);
        }
        if !self.world.step_player(direction) {
            return Err(SessionError::PlayerBusy);
        }
        self.record(InputPayload::Step { direction });

        let detection = self.sight.check_for_trainers_wanting_battle(&mut self.world);
        if detection.found() {
            debug!(?detection, "player spotted");
            self.battle_pending = true;
        }
        self.collect_events();
        Ok(detection)
    }

    pub fn advance(&mut self, max_frames: u32) -> AdvanceResult {
        self.record(InputPayload::Advance { frames: max_frames });

        if let Some(stop_reason) = self.battle_ready() {
            return AdvanceResult { simulated_frames: 0, stop_reason };
        }

        let mut frames = 0;
        while frames < max_frames {
            self.sight.run_tasks(&mut self.world);
            self.world.tick();
            self.collect_events();
            frames += 1;

            if let Some(stop_reason) = self.battle_ready() {
                return AdvanceResult { simulated_frames: frames, stop_reason };
            }
            if !self.battle_pending && self.sight.is_settled() && self.world.is_quiescent() {
                return AdvanceResult { simulated_frames: frames, stop_reason: AdvanceStopReason::Settled };
            }
        }

        AdvanceResult { simulated_frames: frames, stop_reason: AdvanceStopReason::BudgetExhausted }
    }

    pub fn prepare_second_trainer(&mut self) -> bool {
        self.record(InputPayload::PrepareSecondTrainer);
        let more = self.sight.try_prepare_second_approaching_trainer(&mut self.world);
        self.collect_events();
        more
    }

    /// Resolves the current trainer's battle: marks it battled and tears its
    /// approach down. The player is released once no approach remains.
    pub fn end_approach(&mut self) -> Result<(), SessionError> {
        if !self.battle_pending {
            return Err(SessionError::NoApproach);
        }
        self.record(InputPayload::EndApproach);

        let context = self.world.context;
        let battled = self
            .sight
            .current_approaching_trainer()
            .and_then(|id| self.world.actor(id))
            .and_then(|trainer| trainer.script.map(|script| trainer_flag_key(context, trainer, script)));
        if let Some(key) = battled {
            self.world.flags_mut(context).set(key);
        }

        self.sight.end_trainer_approach(&mut self.world);
        let remaining = self
            .sight
            .approaching()
            .iter()
            .any(|trainer| self.sight.approach_step(trainer.actor).is_some());
        if !remaining {
            self.battle_pending = false;
            self.world.unfreeze_all();
        }
        self.collect_events();
        Ok(())
    }

    pub fn face_after_battle(&mut self, index: usize) {
        self.record(InputPayload::FaceAfterBattle { index });
        self.sight.set_trainer_to_face_after_battle(index);
        self.sight.player_face_trainer_after_battle(&mut self.world);
        self.collect_events();
    }

    pub fn reveal_hidden(&mut self, local_id: u8) -> Result<(), SessionError> {
        let id = self
            .world
            .actor_by_local_id(LocalId(local_id))
            .ok_or(SessionError::UnknownActor(local_id))?;
        if self.world.actor(id).is_none_or(|actor| actor.movement_type != MovementType::Hidden) {
            return Err(SessionError::NotHidden(local_id));
        }
        self.record(InputPayload::RevealHidden { local_id });
        self.sight.reveal_hidden_trainer(id);
        Ok(())
    }

    fn battle_ready(&self) -> Option<AdvanceStopReason> {
        if self.battle_pending && self.sight.is_settled() {
            Some(AdvanceStopReason::BattleReady { trainers: self.sight.approaching().len() })
        } else {
            None
        }
    }

    fn record(&mut self, payload: InputPayload) {
        self.journal.append(payload, self.next_input_seq);
        self.next_input_seq += 1;
    }

    fn collect_events(&mut self) {
        self.log.extend(self.sight.drain_events());
    }

    pub fn world(&self) -> &Overworld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut Overworld {
        &mut self.world
    }

    pub fn sight(&self) -> &TrainerSight {
        &self.sight
    }

    pub fn log(&self) -> &[SightEvent] {
        &self.log
    }

    pub fn journal(&self) -> &InputJournal {
        &self.journal
    }

    pub fn battle_pending(&self) -> bool {
        self.battle_pending
    }

    pub fn current_frame(&self) -> u64 {
        self.world.frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sight::test_support::*;

    fn spotted_session() -> (Session, ActorId) {
        let (mut world, trainer) = lane_fixture(Direction::South, 4);
        world.place_player(Pos { y: 8, x: 4 });
        let mut session = Session::new(world);
        assert_eq!(session.step_player(Direction::East), Ok(Detection::Single(trainer)));
        (session, trainer)
    }

    #[test]
    fn stepping_into_sight_runs_until_battle_ready() {
        let (mut session, trainer) = spotted_session();

        let result = session.advance(1_000);

        assert_eq!(result.stop_reason, AdvanceStopReason::BattleReady { trainers: 1 });
        assert_eq!(session.world().actors[trainer].pos, Pos { y: 7, x: 5 });
        assert!(session.log().contains(&SightEvent::TrainerSpotted { trainer: LocalId(1), distance: 3 }));
        assert_eq!(session.advance(10).simulated_frames, 0);
    }

    #[test]
    fn player_is_locked_until_the_approach_ends() {
        let (mut session, _) = spotted_session();
        session.advance(1_000);

        assert_eq!(session.step_player(Direction::West), Err(SessionError::ApproachInProgress));
        assert_eq!(session.end_approach(), Ok(()));
        assert!(!session.battle_pending());
        assert_eq!(session.world().script_contexts_enabled(), 1);

        // Marked battled, so the adjacent trainer no longer triggers.
        let result = session.advance(100);
        assert_eq!(result.stop_reason, AdvanceStopReason::Settled);
        assert_eq!(session.step_player(Direction::North), Ok(Detection::None));
    }

    #[test]
    fn ending_without_an_approach_is_rejected() {
        let (world, _) = lane_fixture(Direction::South, 4);
        let mut session = Session::new(world);
        assert_eq!(session.end_approach(), Err(SessionError::NoApproach));
        assert!(session.journal().inputs.is_empty());
    }

    #[test]
    fn reveal_requires_a_hidden_trainer() {
        let (world, _) = lane_fixture(Direction::South, 4);
        let mut session = Session::new(world);
        assert_eq!(session.reveal_hidden(1), Err(SessionError::NotHidden(1)));
        assert_eq!(session.reveal_hidden(9), Err(SessionError::UnknownActor(9)));
    }

    #[test]
    fn forced_reveal_settles_and_logs() {
        let (mut world, trainer) = lane_fixture(Direction::South, 4);
        hide_trainer(&mut world, trainer);
        let mut session = Session::new(world);

        session.reveal_hidden(1).expect("hidden trainer");
        let result = session.advance(1_000);

        assert_eq!(result.stop_reason, AdvanceStopReason::Settled);
        assert!(session.log().contains(&SightEvent::HiddenTrainerRevealed { trainer: LocalId(1) }));
        assert!(!session.world().actors[trainer].fixed_priority);
    }

    #[test]
    fn accepted_inputs_are_journaled_in_order() {
        let (mut session, _) = spotted_session();
        session.advance(5);
        let _ = session.step_player(Direction::North);

        let payloads: Vec<InputPayload> =
            session.journal().inputs.iter().map(|record| record.payload).collect();
        assert_eq!(
            payloads,
            vec![InputPayload::Step { direction: Direction::East }, InputPayload::Advance { frames: 5 }]
        );
    }
}
