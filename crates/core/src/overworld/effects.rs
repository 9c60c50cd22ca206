//! Bounded sprite-effect pool: emotion icons and the pop-out-of-ash burst.

use tracing::trace;

use crate::field::{EffectRequest, FieldEffects, ObjectEvents};
use crate::overworld::Overworld;
use crate::sight::{IconSprite, IconUpdate, SpriteAnchor};
use crate::types::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AshEffect {
    pub pos: Pos,
    pub subpriority: u8,
    pub priority: u8,
    pub anim_index: u8,
    frame_timer: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum Effect {
    Icon(IconSprite),
    Ash(AshEffect),
}

impl Effect {
    fn kind(&self) -> EffectKind {
        match self {
            Effect::Icon(icon) => EffectKind::Icon(icon.kind),
            Effect::Ash(_) => EffectKind::PopOutOfAsh,
        }
    }
}

impl Overworld {
    /// Anchor of the active object event an icon follows.
    fn sprite_anchor(&self, target: ActorRef) -> Option<SpriteAnchor> {
        let actor = self
            .find_actor(target)
            .and_then(|id| self.actors.get(id))
            .filter(|actor| actor.active)?;
        Some(SpriteAnchor { pos: actor.screen_pos(self.config.tile_size), offset: actor.sprite.offset })
    }

    pub(super) fn advance_effects(&mut self) {
        let ids: Vec<EffectId> = self.effects.keys().collect();
        for id in ids {
            let anchor = match self.effects.get(id) {
                Some(Effect::Icon(icon)) => self.sprite_anchor(icon.target),
                _ => None,
            };
            let durations = &self.config.ash_frame_durations;
            let done = match self.effects.get_mut(id) {
                Some(Effect::Icon(icon)) => icon.update(anchor, &self.config) == IconUpdate::Stop,
                Some(Effect::Ash(ash)) => {
                    ash.frame_timer = ash.frame_timer.saturating_sub(1);
                    if ash.frame_timer == 0 {
                        ash.anim_index = ash.anim_index.saturating_add(1);
                        match durations.get(usize::from(ash.anim_index)) {
                            Some(duration) => {
                                ash.frame_timer = *duration;
                                false
                            }
                            None => true,
                        }
                    } else {
                        false
                    }
                }
                None => false,
            };
            if done {
                trace!(?id, "effect finished");
                self.stop_effect(id);
            }
        }
    }
}

impl FieldEffects for Overworld {
    fn start_effect(&mut self, request: EffectRequest) -> Option<EffectId> {
        if self.effects.len() >= self.config.effect_capacity {
            return None;
        }
        let effect = match request {
            EffectRequest::Icon { kind, target } => {
                Effect::Icon(IconSprite::new(kind, target, &self.config))
            }
            EffectRequest::PopOutOfAsh { pos, subpriority, priority } => {
                let first = self.config.ash_frame_durations.first().copied().unwrap_or(1);
                Effect::Ash(AshEffect {
                    pos,
                    subpriority,
                    priority,
                    anim_index: 0,
                    frame_timer: first.max(1),
                })
            }
        };
        let id = self.effects.insert(effect);
        trace!(?id, kind = ?request.kind(), "effect started");
        Some(id)
    }

    fn effect_active(&self, kind: EffectKind) -> bool {
        self.effects.values().any(|effect| effect.kind() == kind)
    }

    fn stop_effect(&mut self, id: EffectId) {
        self.effects.remove(id);
    }

    fn effect_anim_index(&self, id: EffectId) -> Option<u8> {
        match self.effects.get(id)? {
            Effect::Ash(ash) => Some(ash.anim_index),
            Effect::Icon(_) => Some(0),
        }
    }
}
