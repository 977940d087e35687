//! Position sampling: exposes arena heights to an AI shooter.

use hecs::World;

use archery_core::components::{Bow, Position, Target};
use archery_core::enums::Side;
use archery_core::ports::PositionSource;

/// Read-only view of one side's bow and target heights.
pub struct ArenaView<'w> {
    world: &'w World,
    side: Side,
}

impl<'w> ArenaView<'w> {
    pub fn new(world: &'w World, side: Side) -> Self {
        Self { world, side }
    }
}

impl PositionSource for ArenaView<'_> {
    fn bow_y(&self) -> Option<f64> {
        self.world
            .query::<(&Bow, &Position)>()
            .iter()
            .find(|(_, (bow, _))| bow.side == self.side)
            .map(|(_, (_, pos))| pos.0.y)
    }

    fn target_y(&self) -> Option<f64> {
        self.world
            .query::<(&Target, &Position)>()
            .iter()
            .find(|(_, (target, _))| target.side == self.side)
            .map(|(_, (_, pos))| pos.0.y)
    }
}
