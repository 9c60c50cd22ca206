//! JSON scenario files: a map, its object events, the battle context and an
//! optional input script to replay against them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SightConfig;
use crate::journal::{InputJournal, InputPayload};
use crate::overworld::{FlagSet, Overworld};
use crate::state::{Actor, Map, Tile};
use crate::types::*;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("malformed scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("map must be at least 3x3, got {width}x{height}")]
    MapTooSmall { width: usize, height: usize },
    #[error("{what} at ({x}, {y}) lies outside the map", x = .pos.x, y = .pos.y)]
    OutOfBounds { what: &'static str, pos: Pos },
    #[error("local id {0} is used by more than one object event")]
    DuplicateLocalId(u8),
    #[error("local id 0xff is reserved for the player")]
    ReservedLocalId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub pos: Pos,
    #[serde(default = "default_facing")]
    pub facing: Direction,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerSpec {
    pub local_id: u8,
    pub pos: Pos,
    #[serde(default = "default_facing")]
    pub facing: Direction,
    #[serde(default = "default_trainer_type")]
    pub trainer_type: TrainerType,
    pub sight_range: u8,
    pub script: TrainerScript,
    /// Defaults to facing `facing` in place.
    #[serde(default)]
    pub movement: Option<MovementType>,
    #[serde(default)]
    pub movement_range: MovementRange,
    #[serde(default)]
    pub elevation: u8,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePatch {
    pub pos: Pos,
    #[serde(default)]
    pub impassable: bool,
    #[serde(default)]
    pub elevation: u8,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattledFlags {
    pub normal: FlagSet,
    pub battle_pyramid: FlagSet,
    pub trainer_hill: FlagSet,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub location: MapLocation,
    #[serde(default)]
    pub tiles: Vec<TilePatch>,
    pub player: PlayerSpec,
    #[serde(default)]
    pub trainers: Vec<TrainerSpec>,
    #[serde(default)]
    pub context: GameContext,
    #[serde(default)]
    pub party_can_double: bool,
    #[serde(default)]
    pub battled: BattledFlags,
    #[serde(default)]
    pub config: Option<SightConfig>,
    #[serde(default)]
    pub inputs: Vec<InputPayload>,
}

fn default_facing() -> Direction {
    Direction::South
}

fn default_trainer_type() -> TrainerType {
    TrainerType::Normal
}

fn default_active() -> bool {
    true
}

impl ScenarioFile {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn journal(&self) -> InputJournal {
        InputJournal::from_payloads(self.inputs.iter().copied())
    }

    /// Builds the overworld after validating coordinates and local ids.
    /// `config` overrides the scenario's own tuning.
    pub fn build(&self, config: Option<SightConfig>) -> Result<Overworld, ScenarioError> {
        if self.width < 3 || self.height < 3 {
            return Err(ScenarioError::MapTooSmall { width: self.width, height: self.height });
        }
        let mut grid = Map::new(self.width, self.height);
        for patch in &self.tiles {
            check_bounds(&grid, "tile", patch.pos)?;
            grid.set_tile(patch.pos, Tile { impassable: patch.impassable, elevation: patch.elevation });
        }

        check_bounds(&grid, "player", self.player.pos)?;
        let mut seen = BTreeSet::new();
        for trainer in &self.trainers {
            check_bounds(&grid, "trainer", trainer.pos)?;
            if trainer.local_id == LocalId::PLAYER.0 {
                return Err(ScenarioError::ReservedLocalId);
            }
            if !seen.insert(trainer.local_id) {
                return Err(ScenarioError::DuplicateLocalId(trainer.local_id));
            }
        }

        let config = config.or_else(|| self.config.clone()).unwrap_or_default();
        let player = Actor::new(LocalId::PLAYER, self.location, self.player.pos, self.player.facing);
        let mut world = Overworld::new(grid, player, config);
        for spec in &self.trainers {
            world.add_actor(self.trainer_actor(spec));
        }

        world.set_context(self.context);
        world.set_party_can_double(self.party_can_double);
        *world.flags_mut(GameContext::Normal) = self.battled.normal.clone();
        *world.flags_mut(GameContext::BattlePyramid) = self.battled.battle_pyramid.clone();
        *world.flags_mut(GameContext::TrainerHill) = self.battled.trainer_hill.clone();
        Ok(world)
    }

    fn trainer_actor(&self, spec: &TrainerSpec) -> Actor {
        let mut actor = Actor::new(LocalId(spec.local_id), self.location, spec.pos, spec.facing)
            .with_trainer(spec.trainer_type, spec.sight_range, spec.script)
            .with_movement_range(spec.movement_range)
            .with_elevation(spec.elevation);
        if let Some(movement) = spec.movement {
            actor = actor.with_movement_type(movement);
        }
        actor.active = spec.active;
        actor
    }
}

fn check_bounds(grid: &Map, what: &'static str, pos: Pos) -> Result<(), ScenarioError> {
    if grid.in_bounds(pos) { Ok(()) } else { Err(ScenarioError::OutOfBounds { what, pos }) }
}
