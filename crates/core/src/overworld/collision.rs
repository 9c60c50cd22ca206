use crate::field::CollisionOracle;
use crate::overworld::Overworld;
use crate::state::Actor;
use crate::types::*;

impl Overworld {
    fn outside_movement_range(actor: &Actor, pos: Pos) -> bool {
        let range = actor.movement_range;
        let dx = (pos.x - actor.template_pos.x).abs();
        let dy = (pos.y - actor.template_pos.y).abs();
        (range.x != 0 && dx > i32::from(range.x)) || (range.y != 0 && dy > i32::from(range.y))
    }

    fn elevation_mismatch(&self, actor: &Actor, pos: Pos) -> bool {
        let tile = self.grid.tile_at(pos);
        actor.elevation != 0 && tile.elevation != 0 && tile.elevation != actor.elevation
    }

    fn object_at(&self, actor: &Actor, pos: Pos) -> bool {
        self.actors
            .values()
            .any(|other| other.id != actor.id && other.active && other.pos == pos)
    }
}

impl CollisionOracle for Overworld {
    fn collision_flags(&self, actor: &Actor, pos: Pos, _direction: Direction) -> CollisionFlags {
        let mut flags = CollisionFlags::empty();
        flags.set(CollisionFlags::OUTSIDE_RANGE, Self::outside_movement_range(actor, pos));
        flags.set(CollisionFlags::IMPASSABLE, self.grid.tile_at(pos).impassable);
        flags.set(CollisionFlags::ELEVATION_MISMATCH, self.elevation_mismatch(actor, pos));
        flags.set(CollisionFlags::OBJECT_EVENT, self.object_at(actor, pos));
        flags
    }

    fn collision_at(
        &self,
        actor: &Actor,
        pos: Pos,
        _direction: Direction,
        probe: Probe,
    ) -> Collision {
        if probe == Probe::Normal && Self::outside_movement_range(actor, pos) {
            Collision::OutsideRange
        } else if self.grid.tile_at(pos).impassable {
            Collision::Impassable
        } else if self.elevation_mismatch(actor, pos) {
            Collision::ElevationMismatch
        } else if self.object_at(actor, pos) {
            Collision::ObjectEvent
        } else {
            Collision::None
        }
    }
}
