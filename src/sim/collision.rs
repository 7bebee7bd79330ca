//! Player vs obstacle overlap tests

use super::state::{EntityId, Obstacle, Player};

/// Ids of every obstacle overlapping the player, in obstacle order.
///
/// An invincible player skips the tests entirely. Pure: nothing is mutated.
pub fn check_all(player: &Player, obstacles: &[Obstacle]) -> Vec<EntityId> {
    if player.invincible {
        return Vec::new();
    }
    let ship = player.bounds();
    obstacles
        .iter()
        .filter(|obstacle| ship.overlaps(&obstacle.bounds()))
        .map(|obstacle| obstacle.id)
        .collect()
}
