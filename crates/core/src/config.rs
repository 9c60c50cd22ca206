//! Frame timings and sprite constants for the overworld and its effects.

use serde::{Deserialize, Serialize};

use crate::types::MovementAction;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SightConfig {
    pub tile_size: i32,
    pub walk_frames: u16,
    pub face_frames: u16,
    pub reveal_frames: u16,
    pub jump_frames: u16,
    /// Lifetime of an exclamation/question/heart icon animation.
    pub icon_frames: u16,
    pub icon_y_offset: i32,
    pub icon_bounce_velocity: i32,
    /// Duration of each pop-out-of-ash animation frame.
    pub ash_frame_durations: Vec<u16>,
    pub effect_capacity: usize,
}

impl Default for SightConfig {
    fn default() -> Self {
        Self {
            tile_size: 16,
            walk_frames: 16,
            face_frames: 1,
            reveal_frames: 24,
            jump_frames: 16,
            icon_frames: 60,
            icon_y_offset: 16,
            icon_bounce_velocity: -5,
            ash_frame_durations: vec![12, 12, 8, 8, 8],
            effect_capacity: 8,
        }
    }
}

impl SightConfig {
    pub fn movement_frames(&self, action: MovementAction) -> u16 {
        match action {
            MovementAction::Face(_) | MovementAction::FacePlayer => self.face_frames,
            MovementAction::WalkNormal(_) => self.walk_frames,
            MovementAction::RevealTrainer => self.reveal_frames,
            MovementAction::JumpInPlace(_) => self.jump_frames,
            MovementAction::StepEnd => 0,
        }
    }
}
