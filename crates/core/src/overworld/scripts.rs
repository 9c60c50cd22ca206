//! Recording stand-ins for the script engine, battle setup and the
//! "already battled" flag stores.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::field::{BattleContext, BattleSetup, ScriptEngine, TrainerFlagStore};
use crate::overworld::{Overworld, context_index, push_bounded};
use crate::types::*;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagSet(BTreeSet<u16>);

impl FlagSet {
    pub fn contains(&self, key: u16) -> bool {
        self.0.contains(&key)
    }

    pub fn set(&mut self, key: u16) {
        self.0.insert(key);
    }

    pub fn clear(&mut self, key: u16) {
        self.0.remove(&key);
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<u16> for FlagSet {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl TrainerFlagStore for FlagSet {
    fn is_set(&self, key: u16) -> bool {
        self.contains(key)
    }

    fn set(&mut self, key: u16) {
        FlagSet::set(self, key);
    }

    fn clear(&mut self, key: u16) {
        FlagSet::clear(self, key);
    }
}

/// Battle configuration written by the detection pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRecord {
    pub opponent_resets: u32,
    pub single: Option<(LocalId, TrainerScript)>,
    pub double: [Option<(LocalId, TrainerScript)>; 2],
    pub two_trainers_set_up: bool,
}

impl ScriptEngine for Overworld {
    fn start_object_movement_script(&mut self, target: ActorRef, script: &[MovementAction]) {
        self.script_queues.insert(target, script.iter().copied().collect());
        push_bounded(&mut self.scripted_movements, (target, script.to_vec()));
    }

    fn set_moving_npc(&mut self, local_id: LocalId) {
        self.moving_npc = Some(local_id);
    }

    fn set_special_var_result(&mut self, value: bool) {
        self.special_var_result = Some(value);
    }

    fn enable_script_contexts(&mut self) {
        self.script_contexts_enabled += 1;
    }
}

impl BattleSetup for Overworld {
    fn reset_trainer_opponent_ids(&mut self) {
        self.battle = BattleRecord {
            opponent_resets: self.battle.opponent_resets + 1,
            ..BattleRecord::default()
        };
    }

    fn configure_one_trainer_battle(&mut self, trainer: LocalId, script: TrainerScript) {
        debug!(?trainer, trainer_id = script.trainer_id, "configure single battle");
        self.battle.single = Some((trainer, script));
    }

    fn configure_two_trainers_battle(&mut self, slot: usize, trainer: LocalId, script: TrainerScript) {
        debug!(slot, ?trainer, trainer_id = script.trainer_id, "configure two trainer battle");
        if let Some(entry) = self.battle.double.get_mut(slot) {
            *entry = Some((trainer, script));
        }
    }

    fn set_up_two_trainers_battle(&mut self) {
        self.battle.two_trainers_set_up = true;
    }
}

impl BattleContext for Overworld {
    fn game_context(&self) -> GameContext {
        self.context
    }

    fn party_can_double_battle(&self) -> bool {
        self.party_can_double
    }

    fn trainer_flags(&self, context: GameContext) -> &dyn TrainerFlagStore {
        &self.flags[context_index(context)]
    }
}
