use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct ActorId;
    pub struct TaskId;
    pub struct EffectId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

/// Cardinal facing. Declaration order is the omnidirectional scan order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    South,
    North,
    West,
    East,
}

impl Direction {
    pub const SCAN_ORDER: [Direction; 4] =
        [Direction::South, Direction::North, Direction::West, Direction::East];

    pub fn opposite(self) -> Self {
        match self {
            Direction::South => Direction::North,
            Direction::North => Direction::South,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    /// Coordinates one tile away in this direction.
    pub fn step(self, pos: Pos) -> Pos {
        match self {
            Direction::South => Pos { y: pos.y + 1, x: pos.x },
            Direction::North => Pos { y: pos.y - 1, x: pos.x },
            Direction::West => Pos { y: pos.y, x: pos.x - 1 },
            Direction::East => Pos { y: pos.y, x: pos.x + 1 },
        }
    }

    /// Dominant direction from `from` to `to`; vertical wins ties.
    pub fn toward(from: Pos, to: Pos) -> Option<Self> {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if dx == 0 && dy == 0 {
            return None;
        }
        if dy.abs() >= dx.abs() {
            Some(if dy > 0 { Direction::South } else { Direction::North })
        } else {
            Some(if dx > 0 { Direction::East } else { Direction::West })
        }
    }
}

/// Sight classification of an object event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrainerType {
    #[default]
    None,
    /// Sees only along its current facing.
    Normal,
    SeeAllDirections,
}

impl TrainerType {
    pub fn can_spot_player(self) -> bool {
        !matches!(self, TrainerType::None)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementType {
    #[default]
    None,
    FaceDirection(Direction),
    LookAround,
    WanderAround,
    TreeDisguise,
    MountainDisguise,
    Hidden,
}

impl MovementType {
    /// Stationary behavior a trainer settles into after approaching.
    pub fn for_trainer_facing(direction: Direction) -> Self {
        MovementType::FaceDirection(direction)
    }

    pub fn is_disguise(self) -> bool {
        matches!(self, MovementType::TreeDisguise | MovementType::MountainDisguise)
    }

    pub fn code(self) -> u8 {
        match self {
            MovementType::None => 0,
            MovementType::FaceDirection(direction) => 1 + direction as u8,
            MovementType::LookAround => 5,
            MovementType::WanderAround => 6,
            MovementType::TreeDisguise => 7,
            MovementType::MountainDisguise => 8,
            MovementType::Hidden => 9,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementAction {
    Face(Direction),
    WalkNormal(Direction),
    FacePlayer,
    RevealTrainer,
    JumpInPlace(Direction),
    StepEnd,
}

/// Per-axis wander limit around the template position. Zero means unlimited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovementRange {
    pub x: u8,
    pub y: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocalId(pub u8);

impl LocalId {
    pub const PLAYER: LocalId = LocalId(0xff);
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MapLocation {
    pub map_num: u8,
    pub map_group: u8,
}

/// Logical handle to an object event that survives slot reuse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorRef {
    pub local_id: LocalId,
    pub location: MapLocation,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrainerBattleMode {
    #[default]
    Single,
    ContinueScript,
    NoIntro,
    Rematch,
    Double,
    RematchDouble,
    ContinueScriptDouble,
}

impl TrainerBattleMode {
    pub fn requires_double(self) -> bool {
        matches!(
            self,
            TrainerBattleMode::Double
                | TrainerBattleMode::RematchDouble
                | TrainerBattleMode::ContinueScriptDouble
        )
    }
}

/// Opaque handle to a trainer's scripted battle descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrainerScript {
    pub trainer_id: u16,
    #[serde(default)]
    pub mode: TrainerBattleMode,
}

/// Which "already battled" flag store is authoritative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameContext {
    #[default]
    Normal,
    BattlePyramid,
    TrainerHill,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IconKind {
    ExclamationMark,
    QuestionMark,
    Heart,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Icon(IconKind),
    PopOutOfAsh,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenPos {
    pub x: i32,
    pub y: i32,
}

bitflags! {
    /// Movement collision bits reported for a single tile.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CollisionFlags: u8 {
        const OUTSIDE_RANGE = 1;
        const IMPASSABLE = 1 << 1;
        const ELEVATION_MISMATCH = 1 << 2;
        const OBJECT_EVENT = 1 << 3;
    }
}

impl CollisionFlags {
    /// Leaving the wander range does not obstruct a line of sight.
    pub fn blocks_sight(self) -> bool {
        !self.difference(CollisionFlags::OUTSIDE_RANGE).is_empty()
    }
}

/// First collision category found at a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collision {
    None,
    OutsideRange,
    Impassable,
    ElevationMismatch,
    /// Another object event (the player, on a sight probe) occupies the tile.
    ObjectEvent,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Probe {
    #[default]
    Normal,
    IgnoreMovementRange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Detection {
    None,
    Single(ActorId),
    Double(ActorId, ActorId),
}

impl Detection {
    pub fn found(self) -> bool {
        !matches!(self, Detection::None)
    }

    pub fn count(self) -> usize {
        match self {
            Detection::None => 0,
            Detection::Single(_) => 1,
            Detection::Double(_, _) => 2,
        }
    }
}

/// Approach choreography steps, in program order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApproachStep {
    Idle,
    ExclamationMark,
    WaitExclamationMark,
    MoveToPlayer,
    PlayerFaceTrainer,
    WaitPlayerFace,
    RevealDisguise,
    WaitRevealDisguise,
    RevealHidden,
    PopOutOfAsh,
    JumpInPlace,
    WaitRevealHidden,
    Finished,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SightEvent {
    TrainerSpotted { trainer: LocalId, distance: u8 },
    /// A double-battle trainer saw the player, but the party cannot double.
    DoubleBattleRejected { trainer: LocalId },
    SingleBattleConfigured { trainer: LocalId },
    DoubleBattleConfigured { first: LocalId, second: LocalId },
    ApproachStepChanged { trainer: LocalId, step: ApproachStep },
    ApproachFinished { trainer: LocalId },
    SecondTrainerSelected { trainer: LocalId },
    ScriptContextsEnabled,
    HiddenTrainerRevealed { trainer: LocalId },
    PlayerFaced { direction: Direction },
}
