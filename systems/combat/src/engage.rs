use lasergrid_core::{Agent, AgentId, AgentView, Cell, Direction};
use lasergrid_world::{GridModel, HazardField};
use tracing::debug;

/// Fires at the nearest agent sharing the hero's row or column.
///
/// The override only engages while the hero is safe: no beam on its cell now
/// or on the next tick, no live zombie or active opponent next to it, and a
/// reloaded gun. Airborne opponents cannot be hit and are skipped. Returns
/// the fire direction, or `None` when the override does not apply.
#[must_use]
pub fn engage(
    grid: &GridModel,
    hazards: &HazardField,
    hero: Cell,
    roster: &AgentView,
    gun_ready: bool,
) -> Option<Direction> {
    if !gun_ready {
        return None;
    }
    if hazards.beam_at(0, hero).is_some() || hazards.beam_at(1, hero).is_some() {
        return None;
    }
    let threatened = roster
        .iter()
        .any(|agent| agent.cell.is_adjacent(hero) && (agent.is_zombie || !agent.idle));
    if threatened {
        return None;
    }

    let mut best: Option<BestCandidate> = None;
    for agent in roster.iter() {
        if !agent.is_zombie && agent.airborne {
            continue;
        }
        if agent.cell == hero || !grid.has_clear_path(hero, agent.cell) {
            continue;
        }

        let current = BestCandidate::new(hero, agent);
        match &mut best {
            Some(existing) => {
                if current.precedes(existing) {
                    *existing = current;
                }
            }
            None => best = Some(current),
        }
    }

    let target = best?;
    let direction = Direction::between(hero, target.cell)?.to_fire();
    debug!(target = %target.cell, ?direction, "engaging in line of sight");
    Some(direction)
}

#[derive(Clone, Copy, Debug)]
struct BestCandidate {
    distance_sq: u64,
    agent: AgentId,
    cell: Cell,
}

impl BestCandidate {
    fn new(hero: Cell, agent: &Agent) -> Self {
        Self {
            distance_sq: hero.distance_squared(agent.cell),
            agent: agent.id,
            cell: agent.cell,
        }
    }

    fn precedes(&self, other: &Self) -> bool {
        match self.distance_sq.cmp(&other.distance_sq) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => self.agent < other.agent,
        }
    }
}
