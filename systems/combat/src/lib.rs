#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Close-quarters decisions: the straight-line fire override and the
//! depth-limited adversarial search used when agents get near the hero.

mod engage;
mod search;

use serde::Deserialize;

pub use engage::engage;
pub use search::{CombatSearch, Hero, SearchOutcome};

/// Limits and heuristic weights of the close-quarters systems.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Manhattan distance at which an agent triggers the search.
    pub radius: u32,
    /// Largest number of agents taking part in the search.
    pub max_agents: usize,
    /// Plies searched while at most two agents take part.
    pub max_depth: u32,
    /// Value of a branch in which the hero dies.
    pub death_penalty: f32,
    /// Bonus for an opponent robot hit by a beam.
    pub opponent_kill: f32,
    /// Bonus for a zombie hit by a beam.
    pub zombie_kill: f32,
    /// Bonus for a zombie catching an opponent robot.
    pub zombie_on_opponent: f32,
    /// Bonus for the hero standing on gold.
    pub hero_gold: f32,
    /// Penalty for an opponent standing on gold.
    pub opponent_gold: f32,
    /// Weight of the hero's remaining path cost to the current target.
    pub path_weight: f32,
    /// Path cost assumed where the target cannot be reached.
    pub unreachable_cost: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            radius: 3,
            max_agents: 3,
            max_depth: 2,
            death_penalty: 1000.0,
            opponent_kill: 100.0,
            zombie_kill: 50.0,
            zombie_on_opponent: 50.0,
            hero_gold: 20.0,
            opponent_gold: 10.0,
            path_weight: 1.0,
            unreachable_cost: 100.0,
        }
    }
}
