//! Stable snapshot hashing for deterministic verification.
//! Only simulation state feeds the hash; the event log and journal do not.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::*;

fn direction_code(direction: Direction) -> u8 {
    direction as u8
}

impl Session {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.world.frame());
        hasher.write_u8(u8::from(self.battle_pending));

        for actor in self.world.actors() {
            hasher.write_u8(actor.local_id.0);
            hasher.write_i32(actor.pos.x);
            hasher.write_i32(actor.pos.y);
            hasher.write_u8(direction_code(actor.facing));
            hasher.write_u8(actor.movement_type.code());
            hasher.write_u8(u8::from(actor.active));
            hasher.write_u8(u8::from(actor.frozen));
            hasher.write_u8(u8::from(actor.fixed_priority));
            if let Some(held) = actor.held {
                hasher.write_u16(held.frames_left);
                hasher.write_u8(u8::from(held.finished));
            }
        }

        hasher.write_usize(self.sight.cursor());
        hasher.write_u8(u8::from(self.sight.trainer_approached_player()));
        for trainer in self.sight.approaching() {
            hasher.write_u8(trainer.local_id.0);
            hasher.write_u8(trainer.radius);
            if let Some(step) = self.sight.approach_step(trainer.actor) {
                hasher.write_u8(step as u8);
            }
        }

        let battle = self.world.battle();
        hasher.write_u32(battle.opponent_resets);
        for (local_id, script) in battle.single.iter().chain(battle.double.iter().flatten()) {
            hasher.write_u8(local_id.0);
            hasher.write_u16(script.trainer_id);
        }

        for context in [GameContext::Normal, GameContext::BattlePyramid, GameContext::TrainerHill] {
            for key in self.world.flags(context).iter() {
                hasher.write_u16(key);
            }
            hasher.write_u8(0xff);
        }
        hasher.finish()
    }
}
