//! In-crate overworld: a tile grid, object events with held movements, a
//! bounded sprite-effect pool and recording stand-ins for the script engine
//! and battle setup. It implements every [`crate::field`] trait so the sight
//! core can run end to end without a host game.

use std::collections::{BTreeMap, VecDeque};

use slotmap::SlotMap;
use tracing::trace;

use crate::config::SightConfig;
use crate::field::{CollisionOracle, ObjectEvents};
use crate::state::{Actor, Map, ObjectTemplate};
use crate::types::*;

mod collision;
mod effects;
mod objects;
mod scripts;

pub use effects::AshEffect;
pub use scripts::{BattleRecord, FlagSet};

use effects::Effect;

/// Entries each inspection log keeps before dropping the oldest.
pub const INSPECTION_LOG_CAPACITY: usize = 256;

#[derive(Clone, Debug)]
pub struct Overworld {
    pub(crate) config: SightConfig,
    pub(crate) grid: Map,
    pub(crate) actors: SlotMap<ActorId, Actor>,
    pub(crate) player_id: ActorId,
    templates: BTreeMap<ActorRef, ObjectTemplate>,
    effects: SlotMap<EffectId, Effect>,
    pub(crate) context: GameContext,
    pub(crate) party_can_double: bool,
    flags: [FlagSet; 3],
    battle: BattleRecord,
    script_queues: BTreeMap<ActorRef, VecDeque<MovementAction>>,
    pub(crate) scripted_movements: VecDeque<(ActorRef, Vec<MovementAction>)>,
    pub(crate) moving_npc: Option<LocalId>,
    pub(crate) special_var_result: Option<bool>,
    pub(crate) script_contexts_enabled: u32,
    movement_log: VecDeque<(LocalId, MovementAction)>,
    frame: u64,
}

impl Overworld {
    pub fn new(grid: Map, player: Actor, config: SightConfig) -> Self {
        let mut world = Self {
            config,
            grid,
            actors: SlotMap::with_key(),
            player_id: ActorId::default(),
            templates: BTreeMap::new(),
            effects: SlotMap::with_key(),
            context: GameContext::Normal,
            party_can_double: false,
            flags: Default::default(),
            battle: BattleRecord::default(),
            script_queues: BTreeMap::new(),
            scripted_movements: VecDeque::new(),
            moving_npc: None,
            special_var_result: None,
            script_contexts_enabled: 0,
            movement_log: VecDeque::new(),
            frame: 0,
        };
        world.player_id = world.add_actor(player);
        world
    }

    /// Inserts an object event and records its spawn template.
    pub fn add_actor(&mut self, actor: Actor) -> ActorId {
        let template = ObjectTemplate { pos: actor.pos, movement_type: actor.movement_type };
        let actor_ref = actor.actor_ref();
        let id = self.actors.insert(actor);
        self.actors[id].id = id;
        self.templates.entry(actor_ref).or_insert(template);
        id
    }

    pub fn remove_actor(&mut self, id: ActorId) -> Option<Actor> {
        let actor = self.actors.remove(id)?;
        self.script_queues.remove(&actor.actor_ref());
        Some(actor)
    }

    pub fn place_player(&mut self, pos: Pos) {
        let player = &mut self.actors[self.player_id];
        player.pos = pos;
        player.held = None;
        player.sprite.offset = ScreenPos::default();
    }

    /// Starts a player step. Blocked steps only turn the player. Returns false
    /// while the player is frozen or still finishing a movement.
    pub fn step_player(&mut self, direction: Direction) -> bool {
        let player_id = self.player_id;
        let Some(player) = self.actors.get(player_id) else {
            return false;
        };
        if player.frozen || (player.held.is_some() && !self.held_movement_finished(player_id)) {
            return false;
        }

        let dest = direction.step(player.pos);
        let action = match self.collision_at(player, dest, direction, Probe::Normal) {
            Collision::None => MovementAction::WalkNormal(direction),
            collision => {
                trace!(?collision, ?dest, "player step blocked");
                MovementAction::Face(direction)
            }
        };
        self.set_held_movement(player_id, action);
        true
    }

    /// Advances held movements, scripted movement queues and sprite effects by one frame.
    pub fn tick(&mut self) {
        self.frame += 1;
        self.run_movement_scripts();
        self.advance_held_movements();
        self.advance_effects();
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn config(&self) -> &SightConfig {
        &self.config
    }

    pub fn grid(&self) -> &Map {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Map {
        &mut self.grid
    }

    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    pub fn actor_by_local_id(&self, local_id: LocalId) -> Option<ActorId> {
        self.actors.values().find(|actor| actor.local_id == local_id).map(|actor| actor.id)
    }

    pub fn set_context(&mut self, context: GameContext) {
        self.context = context;
    }

    pub fn set_party_can_double(&mut self, can_double: bool) {
        self.party_can_double = can_double;
    }

    pub fn flags(&self, context: GameContext) -> &FlagSet {
        &self.flags[context_index(context)]
    }

    pub fn flags_mut(&mut self, context: GameContext) -> &mut FlagSet {
        &mut self.flags[context_index(context)]
    }

    pub fn battle(&self) -> &BattleRecord {
        &self.battle
    }

    pub fn template_of(&self, actor: ActorRef) -> Option<ObjectTemplate> {
        self.templates.get(&actor).copied()
    }

    /// Held movements issued to `local_id`, oldest first, within the last
    /// [`INSPECTION_LOG_CAPACITY`] issued to anyone.
    pub fn movements_of(&self, local_id: LocalId) -> Vec<MovementAction> {
        self.movement_log
            .iter()
            .filter(|(id, _)| *id == local_id)
            .map(|(_, action)| *action)
            .collect()
    }

    pub fn special_var_result(&self) -> Option<bool> {
        self.special_var_result
    }

    pub fn script_contexts_enabled(&self) -> u32 {
        self.script_contexts_enabled
    }

    pub fn active_effects(&self) -> usize {
        self.effects.len()
    }

    /// True when no actor holds an unfinished movement or queued script and
    /// no effect is animating.
    pub fn is_quiescent(&self) -> bool {
        self.effects.is_empty()
            && self.script_queues.values().all(VecDeque::is_empty)
            && self.actors.values().all(|actor| actor.held.is_none_or(|held| held.finished))
    }
}

fn push_bounded<T>(log: &mut VecDeque<T>, entry: T) {
    if log.len() >= INSPECTION_LOG_CAPACITY {
        log.pop_front();
    }
    log.push_back(entry);
}

fn context_index(context: GameContext) -> usize {
    match context {
        GameContext::Normal => 0,
        GameContext::BattlePyramid => 1,
        GameContext::TrainerHill => 2,
    }
}
