//! Collaborator interfaces the trainer-sight core consumes.
//!
//! The overworld (collision grid, object events, sprite effects, script engine
//! and battle setup) is owned elsewhere. [`Field`] bundles every capability so
//! detection and approach code can be driven by any implementation, including
//! the in-crate [`crate::overworld::Overworld`].

use crate::state::Actor;
use crate::types::*;

pub trait CollisionOracle {
    fn collision_flags(&self, actor: &Actor, pos: Pos, direction: Direction) -> CollisionFlags;

    fn collision_at(&self, actor: &Actor, pos: Pos, direction: Direction, probe: Probe)
    -> Collision;
}

/// Object-event table plus the held-movement queue of each object.
pub trait ObjectEvents {
    fn actor(&self, id: ActorId) -> Option<&Actor>;
    fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor>;
    /// Every object event in slot order.
    fn actor_ids(&self) -> Vec<ActorId>;
    fn player_id(&self) -> ActorId;
    /// Tile the player is standing on or moving into.
    fn player_dest_pos(&self) -> Pos;
    fn find_actor(&self, actor: ActorRef) -> Option<ActorId>;

    fn set_held_movement(&mut self, id: ActorId, action: MovementAction);
    fn is_movement_overridden(&self, id: ActorId) -> bool;
    /// Consumes a finished held movement, returning whether one was cleared.
    fn clear_held_movement_if_finished(&mut self, id: ActorId) -> bool;
    fn held_movement_finished(&self, id: ActorId) -> bool;
    fn clear_held_movement(&mut self, id: ActorId);

    fn set_trainer_movement_type(&mut self, id: ActorId, movement_type: MovementType);
    /// Writes the object's current coordinates and movement type back to its template.
    fn override_template(&mut self, id: ActorId);

    fn freeze_all_except(&mut self, id: ActorId);
    fn unfreeze_all(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectRequest {
    Icon { kind: IconKind, target: ActorRef },
    PopOutOfAsh { pos: Pos, subpriority: u8, priority: u8 },
}

impl EffectRequest {
    pub fn kind(&self) -> EffectKind {
        match self {
            EffectRequest::Icon { kind, .. } => EffectKind::Icon(*kind),
            EffectRequest::PopOutOfAsh { .. } => EffectKind::PopOutOfAsh,
        }
    }
}

pub trait FieldEffects {
    /// Returns `None` when the sprite pool is exhausted.
    fn start_effect(&mut self, request: EffectRequest) -> Option<EffectId>;
    fn effect_active(&self, kind: EffectKind) -> bool;
    fn stop_effect(&mut self, id: EffectId);
    /// Current animation command index, or `None` once the effect is gone.
    fn effect_anim_index(&self, id: EffectId) -> Option<u8>;
}

pub trait ScriptEngine {
    fn start_object_movement_script(&mut self, target: ActorRef, script: &[MovementAction]);
    fn set_moving_npc(&mut self, local_id: LocalId);
    fn set_special_var_result(&mut self, value: bool);
    fn enable_script_contexts(&mut self);
}

pub trait BattleSetup {
    fn reset_trainer_opponent_ids(&mut self);
    fn configure_one_trainer_battle(&mut self, trainer: LocalId, script: TrainerScript);
    fn configure_two_trainers_battle(&mut self, slot: usize, trainer: LocalId, script: TrainerScript);
    fn set_up_two_trainers_battle(&mut self);
}

/// Boolean "already battled" store. Keys are trainer ids in the normal
/// context and object local ids inside the battle facilities.
pub trait TrainerFlagStore {
    fn is_set(&self, key: u16) -> bool;
    fn set(&mut self, key: u16);
    fn clear(&mut self, key: u16);
}

pub trait BattleContext {
    fn game_context(&self) -> GameContext;
    fn party_can_double_battle(&self) -> bool;
    fn trainer_flags(&self, context: GameContext) -> &dyn TrainerFlagStore;
}

pub trait Field:
    CollisionOracle + ObjectEvents + FieldEffects + ScriptEngine + BattleSetup + BattleContext
{
}

impl<T> Field for T where
    T: CollisionOracle + ObjectEvents + FieldEffects + ScriptEngine + BattleSetup + BattleContext
{
}

/// Flag key consulted for `actor` under `context`.
pub fn trainer_flag_key(context: GameContext, actor: &Actor, script: TrainerScript) -> u16 {
    match context {
        GameContext::Normal => script.trainer_id,
        GameContext::BattlePyramid | GameContext::TrainerHill => u16::from(actor.local_id.0),
    }
}
