use serde::{Deserialize, Serialize};

use crate::types::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpriteState {
    pub priority: u8,
    pub subpriority: u8,
    /// Sub-tile displacement (walk cycle, jumps).
    pub offset: ScreenPos,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeldMovement {
    pub action: MovementAction,
    pub frames_left: u16,
    pub finished: bool,
}

/// An overworld object event: the player avatar, trainers and other NPCs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub id: ActorId,
    pub local_id: LocalId,
    pub location: MapLocation,
    pub active: bool,
    pub pos: Pos,
    /// Spawn coordinates persisted in the map's object template.
    pub template_pos: Pos,
    pub facing: Direction,
    pub elevation: u8,
    pub trainer_type: TrainerType,
    pub sight_range: u8,
    pub movement_type: MovementType,
    pub movement_range: MovementRange,
    pub script: Option<TrainerScript>,
    pub fixed_priority: bool,
    pub trigger_ground_effects: bool,
    pub frozen: bool,
    pub sprite: SpriteState,
    pub held: Option<HeldMovement>,
}

impl Actor {
    pub fn new(local_id: LocalId, location: MapLocation, pos: Pos, facing: Direction) -> Self {
        Self {
            id: ActorId::default(),
            local_id,
            location,
            active: true,
            pos,
            template_pos: pos,
            facing,
            elevation: 0,
            trainer_type: TrainerType::None,
            sight_range: 0,
            movement_type: MovementType::FaceDirection(facing),
            movement_range: MovementRange::default(),
            script: None,
            fixed_priority: false,
            trigger_ground_effects: true,
            frozen: false,
            sprite: SpriteState { priority: 2, subpriority: 0x80, offset: ScreenPos::default() },
            held: None,
        }
    }

    pub fn with_trainer(
        mut self,
        trainer_type: TrainerType,
        sight_range: u8,
        script: TrainerScript,
    ) -> Self {
        self.trainer_type = trainer_type;
        self.sight_range = sight_range;
        self.script = Some(script);
        self
    }

    pub fn with_movement_type(mut self, movement_type: MovementType) -> Self {
        self.movement_type = movement_type;
        if movement_type == MovementType::Hidden {
            // Buried trainers sit under the ash layer until they pop out.
            self.fixed_priority = true;
            self.trigger_ground_effects = false;
            self.sprite.priority = 3;
        }
        self
    }

    pub fn with_movement_range(mut self, range: MovementRange) -> Self {
        self.movement_range = range;
        self
    }

    pub fn with_elevation(mut self, elevation: u8) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn actor_ref(&self) -> ActorRef {
        ActorRef { local_id: self.local_id, location: self.location }
    }

    pub fn screen_pos(&self, tile_size: i32) -> ScreenPos {
        ScreenPos { x: self.pos.x * tile_size, y: self.pos.y * tile_size }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub impassable: bool,
    /// Zero matches every elevation.
    pub elevation: u8,
}

impl Tile {
    pub const WALL: Tile = Tile { impassable: true, elevation: 0 };
    pub const FLOOR: Tile = Tile { impassable: false, elevation: 0 };
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Map {
    pub internal_width: usize,
    pub internal_height: usize,
    pub tiles: Vec<Tile>,
}

impl Map {
    /// Open floor surrounded by a one-tile wall border.
    pub fn new(width: usize, height: usize) -> Self {
        let mut tiles = vec![Tile::FLOOR; width * height];
        for x in 0..width {
            tiles[x] = Tile::WALL;
            tiles[(height - 1) * width + x] = Tile::WALL;
        }
        for y in 0..height {
            tiles[y * width] = Tile::WALL;
            tiles[y * width + (width - 1)] = Tile::WALL;
        }
        Self { internal_width: width, internal_height: height, tiles }
    }

    pub fn tile_at(&self, pos: Pos) -> Tile {
        if !self.in_bounds(pos) {
            return Tile::WALL;
        }
        self.tiles[self.index(pos)]
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.internal_width
            && (pos.y as usize) < self.internal_height
    }

    pub fn set_tile(&mut self, pos: Pos, tile: Tile) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        self.tiles[idx] = tile;
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.internal_width + (pos.x as usize)
    }
}

/// Persisted spawn data for an object event, rewritten when a trainer settles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectTemplate {
    pub pos: Pos,
    pub movement_type: MovementType,
}
