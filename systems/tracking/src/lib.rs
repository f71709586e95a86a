#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick-to-tick re-identification of opponent robots and zombies.

use lasergrid_core::{Agent, AgentId, AgentView, Cell, Direction, RobotState};
use lasergrid_world::GridModel;
use serde::Deserialize;
use tracing::debug;

/// Thresholds that decide when an agent counts as idle.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TrackerTuning {
    /// Ticks without moving before an agent may be idle.
    pub idle_move_ticks: u64,
    /// Ticks without firing before an agent may be idle.
    pub idle_fire_ticks: u64,
    /// Nobody is considered idle until this much gold has been collected.
    pub idle_gold_threshold: u32,
    /// Ticks a gun needs to reload after a shot.
    pub gun_reload: u64,
}

impl Default for TrackerTuning {
    fn default() -> Self {
        Self {
            idle_move_ticks: 4,
            idle_fire_ticks: 2,
            idle_gold_threshold: 0,
            gun_reload: 3,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Sighting {
    cell: Cell,
    airborne: bool,
    is_zombie: bool,
}

/// Owns the agent records and refreshes them from every snapshot.
#[derive(Debug, Default)]
pub struct AgentTracker {
    tuning: TrackerTuning,
    agents: Vec<Agent>,
    next_id: u32,
}

impl AgentTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new(tuning: TrackerTuning) -> Self {
        Self {
            tuning,
            agents: Vec::new(),
            next_id: 0,
        }
    }

    /// Forgets every tracked agent.
    pub fn reset(&mut self) {
        self.agents.clear();
        self.next_id = 0;
    }

    /// Immutable view of the agents seen on the latest tick.
    #[must_use]
    pub fn roster(&self) -> AgentView {
        AgentView::from_agents(self.agents.clone())
    }

    /// Matches the agents visible on `grid` against the previous tick.
    ///
    /// An agent on the same cell keeps its identity; otherwise an unclaimed
    /// record of the same kind one step away is taken to have moved there.
    /// Anything left over is a new identity.
    pub fn observe(&mut self, tick: u64, grid: &GridModel, gold_collected: u32) {
        let sightings = Self::sightings(grid);
        let previous = std::mem::take(&mut self.agents);
        let mut claimed = vec![false; previous.len()];
        let mut matched: Vec<Option<Agent>> = vec![None; sightings.len()];

        for (slot, sighting) in sightings.iter().enumerate() {
            let Some(index) = previous.iter().enumerate().position(|(index, agent)| {
                !claimed[index]
                    && agent.is_zombie == sighting.is_zombie
                    && agent.cell == sighting.cell
            }) else {
                continue;
            };
            claimed[index] = true;
            matched[slot] = Some(previous[index]);
        }

        for (slot, sighting) in sightings.iter().enumerate() {
            if matched[slot].is_some() {
                continue;
            }
            let Some(index) = previous.iter().enumerate().position(|(index, agent)| {
                !claimed[index]
                    && agent.is_zombie == sighting.is_zombie
                    && agent.cell.is_adjacent(sighting.cell)
            }) else {
                continue;
            };
            claimed[index] = true;
            let mut moved = previous[index];
            moved.facing = Direction::between(moved.cell, sighting.cell);
            moved.cell = sighting.cell;
            moved.last_move_tick = tick;
            matched[slot] = Some(moved);
        }

        for (sighting, record) in sightings.iter().zip(matched) {
            let mut agent = record.unwrap_or_else(|| {
                let id = AgentId::new(self.next_id);
                self.next_id += 1;
                debug!(id = id.get(), cell = %sighting.cell, zombie = sighting.is_zombie, "new agent");
                Agent {
                    id,
                    cell: sighting.cell,
                    facing: None,
                    airborne: false,
                    last_fire_tick: None,
                    last_move_tick: tick,
                    idle: false,
                    is_zombie: sighting.is_zombie,
                    ammo_ready: true,
                }
            });

            agent.airborne = sighting.airborne;
            let fired = !agent.is_zombie && Self::fired(grid, agent.cell);
            if fired {
                agent.last_fire_tick = Some(tick);
            }
            agent.idle = !agent.is_zombie
                && !fired
                && gold_collected >= self.tuning.idle_gold_threshold
                && tick.saturating_sub(agent.last_move_tick) >= self.tuning.idle_move_ticks
                && agent.last_fire_tick.map_or(true, |fire| {
                    tick.saturating_sub(fire) >= self.tuning.idle_fire_ticks
                });
            agent.ammo_ready = agent
                .last_fire_tick
                .map_or(true, |fire| tick.saturating_sub(fire) >= self.tuning.gun_reload);

            self.agents.push(agent);
        }

        self.agents.sort_by_key(|agent| agent.id);
    }

    fn sightings(grid: &GridModel) -> Vec<Sighting> {
        let mut sightings: Vec<Sighting> = grid
            .opponents()
            .into_iter()
            .filter(|robot| !robot.state.is_dying())
            .map(|robot| Sighting {
                cell: robot.cell,
                airborne: robot.state == RobotState::Flying,
                is_zombie: false,
            })
            .collect();
        sightings.extend(grid.zombies().into_iter().map(|cell| Sighting {
            cell,
            airborne: false,
            is_zombie: true,
        }));
        sightings
    }

    fn fired(grid: &GridModel, cell: Cell) -> bool {
        Direction::CARDINALS
            .into_iter()
            .any(|away| grid.beam_at(cell.step(away)) == Some(away))
    }
}
