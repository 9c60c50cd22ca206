//! Floating emotion icons (exclamation mark, question mark, heart).
//!
//! An icon is bound to an [`ActorRef`] rather than an [`ActorId`]: object
//! event slots can be reclaimed while the icon is still animating, so the
//! owning effect system re-resolves the target every frame and hands the
//! result to [`IconSprite::update`].

use tracing::debug;

use crate::config::SightConfig;
use crate::field::{EffectRequest, FieldEffects};
use crate::types::*;

/// Screen placement of the sprite an icon follows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpriteAnchor {
    pub pos: ScreenPos,
    pub offset: ScreenPos,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IconUpdate {
    Continue,
    Stop,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconSprite {
    pub kind: IconKind,
    pub target: ActorRef,
    pub palette: u8,
    pub priority: u8,
    pub pos: ScreenPos,
    pub offset: ScreenPos,
    bounce_velocity: i32,
    bounce: i32,
    frames_left: u16,
}

impl IconSprite {
    pub fn new(kind: IconKind, target: ActorRef, config: &SightConfig) -> Self {
        Self {
            kind,
            target,
            palette: if kind == IconKind::Heart { 2 } else { 0 },
            priority: 1,
            pos: ScreenPos::default(),
            offset: ScreenPos::default(),
            bounce_velocity: config.icon_bounce_velocity,
            bounce: 0,
            frames_left: config.icon_frames,
        }
    }

    pub fn anim_ended(&self) -> bool {
        self.frames_left == 0
    }

    pub fn bounce(&self) -> i32 {
        self.bounce
    }

    /// Follows `anchor` for one frame. `None` means the bound actor could not
    /// be resolved, which stops the icon just like the end of its animation.
    pub fn update(&mut self, anchor: Option<SpriteAnchor>, config: &SightConfig) -> IconUpdate {
        let Some(anchor) = anchor else {
            return IconUpdate::Stop;
        };
        if self.anim_ended() {
            return IconUpdate::Stop;
        }

        self.bounce += self.bounce_velocity;
        self.pos = ScreenPos { x: anchor.pos.x, y: anchor.pos.y - config.icon_y_offset };
        self.offset = ScreenPos { x: anchor.offset.x, y: anchor.offset.y + self.bounce };
        if self.bounce != 0 {
            self.bounce_velocity += 1;
        } else {
            self.bounce_velocity = 0;
        }

        self.frames_left = self.frames_left.saturating_sub(1);
        IconUpdate::Continue
    }
}

/// Starts an icon over `target`. A full sprite pool skips the icon.
pub fn spawn_icon<F: FieldEffects + ?Sized>(
    field: &mut F,
    kind: IconKind,
    target: ActorRef,
) -> Option<EffectId> {
    let effect = field.start_effect(EffectRequest::Icon { kind, target });
    if effect.is_none() {
        debug!(?kind, local_id = ?target.local_id, "icon skipped, sprite pool full");
    }
    effect
}
