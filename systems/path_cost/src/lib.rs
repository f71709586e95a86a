#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Hazard- and agent-aware weighted relaxation sweep over the board.
//!
//! The sweep starts at an origin cell and relaxes moves in first-in
//! first-out order. Each reached cell records its base move cost, the tick on
//! which the robot would arrive, the move that reached it and the danger
//! accumulated along that route. Ranking compares `cost + route danger`, so a
//! longer but safer route replaces a short one that crosses a predicted beam.

use std::collections::VecDeque;

use lasergrid_core::{AgentView, Category, Cell, Direction, Element, Layer};
use lasergrid_world::{cell_index, GridModel, HazardField};
use serde::Deserialize;
use thiserror::Error;

/// Danger constants applied by the sweep.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PenaltyTuning {
    /// Added on cells holding a box.
    pub box_danger: f32,
    /// Added on holes.
    pub hole_danger: f32,
    /// Added on zombie spawn points and their orthogonal neighbours.
    pub zombie_start_danger: f32,
    /// Added on the cell in front of a ready emitter.
    pub emitter_ahead_danger: f32,
    /// Added on an agent's cell and along its blast rays before weighting.
    pub agent_danger: f32,
    /// Multiplier applied to idle agents.
    pub idle_scale: f32,
    /// Multiplier applied to opponent robots.
    pub opponent_weight: f32,
    /// Multiplier applied to zombies.
    pub zombie_weight: f32,
    /// Added when the arrival tick coincides with a predicted beam.
    pub beam_danger: f32,
    /// Length of an agent's blast rays in cells.
    pub blast_range: i32,
}

impl Default for PenaltyTuning {
    fn default() -> Self {
        Self {
            box_danger: 40.0,
            hole_danger: 400.0,
            zombie_start_danger: 3.0,
            emitter_ahead_danger: 5.0,
            agent_danger: 30.0,
            idle_scale: 0.25,
            opponent_weight: 2.0,
            zombie_weight: 0.25,
            beam_danger: 1.0e6,
            blast_range: 10,
        }
    }
}

/// Errors raised while reconstructing a route from the parent table.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The target was never reached by the sweep.
    #[error("cell {0} was not reached")]
    Unreachable(Cell),
    /// Walking parents did not lead back to the origin.
    #[error("parent chain broken at {at} while walking back from {target}")]
    BrokenChain {
        /// Target the walk started from.
        target: Cell,
        /// Cell whose parent was missing or looped.
        at: Cell,
    },
}

/// Move that produced a cell's current best arrival.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// Cell the move started from.
    pub parent: Cell,
    /// Arrival tick of the parent cell when the move was relaxed.
    pub parent_tick: u32,
    /// Move taken from the parent.
    pub direction: Direction,
}

/// Output tables of one sweep.
#[derive(Clone, Debug)]
pub struct CostField {
    size: i32,
    origin: Cell,
    costs: Vec<f32>,
    arrivals: Vec<u32>,
    parents: Vec<Option<Step>>,
    danger: Vec<f32>,
    route_danger: Vec<f32>,
}

impl CostField {
    fn new(size: i32, origin: Cell) -> Self {
        let side = usize::try_from(size).unwrap_or(0);
        let cell_count = side * side;
        Self {
            size,
            origin,
            costs: vec![f32::INFINITY; cell_count],
            arrivals: vec![u32::MAX; cell_count],
            parents: vec![None; cell_count],
            danger: vec![0.0; cell_count],
            route_danger: vec![f32::INFINITY; cell_count],
        }
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        cell_index(self.size, cell)
    }

    /// Cell the sweep started from.
    #[must_use]
    pub fn origin(&self) -> Cell {
        self.origin
    }

    /// Base move cost to reach `cell`, infinite when unreached or off the board.
    #[must_use]
    pub fn cost(&self, cell: Cell) -> f32 {
        self.index(cell)
            .map_or(f32::INFINITY, |index| self.costs[index])
    }

    /// Tick on which the robot would arrive at `cell`.
    #[must_use]
    pub fn arrival_tick(&self, cell: Cell) -> Option<u32> {
        let index = self.index(cell)?;
        let tick = self.arrivals[index];
        (tick != u32::MAX).then_some(tick)
    }

    /// Move that reached `cell`.
    #[must_use]
    pub fn parent(&self, cell: Cell) -> Option<Step> {
        self.index(cell).and_then(|index| self.parents[index])
    }

    /// Static danger of `cell`.
    #[must_use]
    pub fn danger(&self, cell: Cell) -> f32 {
        self.index(cell).map_or(0.0, |index| self.danger[index])
    }

    /// Danger accumulated along the parent chain ending at `cell`.
    #[must_use]
    pub fn route_danger(&self, cell: Cell) -> f32 {
        self.index(cell)
            .map_or(f32::INFINITY, |index| self.route_danger[index])
    }

    /// Key used to rank targets and relax moves.
    #[must_use]
    pub fn ranking_cost(&self, cell: Cell) -> f32 {
        self.cost(cell) + self.route_danger(cell)
    }

    /// First move on the recorded route from the origin to `target`.
    pub fn first_step(&self, target: Cell) -> Result<Direction, PathError> {
        if self.cost(target).is_infinite() || target == self.origin {
            return Err(PathError::Unreachable(target));
        }

        let limit = self.costs.len();
        let mut cursor = target;
        for _ in 0..limit {
            let Some(step) = self.parent(cursor) else {
                return Err(PathError::BrokenChain { target, at: cursor });
            };
            if step.parent == self.origin {
                return Ok(step.direction);
            }
            cursor = step.parent;
        }

        Err(PathError::BrokenChain { target, at: cursor })
    }
}

/// Sweep configured for one grid and hazard projection.
#[derive(Debug)]
pub struct PathCoster<'a> {
    grid: &'a GridModel,
    hazards: &'a HazardField,
    tuning: &'a PenaltyTuning,
}

impl<'a> PathCoster<'a> {
    /// Creates a sweep over the provided grid and hazards.
    #[must_use]
    pub fn new(grid: &'a GridModel, hazards: &'a HazardField, tuning: &'a PenaltyTuning) -> Self {
        Self {
            grid,
            hazards,
            tuning,
        }
    }

    /// Relaxes every reachable cell from `origin`, avoiding the `roster`.
    #[must_use]
    pub fn sweep(&self, origin: Cell, roster: &AgentView) -> CostField {
        let mut field = CostField::new(self.grid.size(), origin);
        self.seed_danger(&mut field, roster);

        let Some(origin_index) = field.index(origin) else {
            return field;
        };
        field.costs[origin_index] = 0.0;
        field.arrivals[origin_index] = 0;
        field.route_danger[origin_index] = 0.0;

        let mut queue = VecDeque::new();
        queue.push_back(origin);

        while let Some(cell) = queue.pop_front() {
            let Some(current) = field.index(cell) else {
                continue;
            };
            let base_cost = field.costs[current];
            let base_danger = field.route_danger[current];
            let base_tick = field.arrivals[current];

            for direction in Direction::CARDINALS
                .into_iter()
                .chain(Direction::JUMPS)
                .chain([Direction::Stop])
            {
                if direction.dx() == 0 && direction.dy() == 0 {
                    continue;
                }
                let target = cell.step(direction);
                if !self.is_legal(cell, target, direction, roster) {
                    continue;
                }
                let Some(target_index) = field.index(target) else {
                    continue;
                };

                let cost = base_cost + direction.cost();
                let arrival = arrival_tick(cost);
                if self.meets_oncoming_beam(target, direction, arrival) {
                    continue;
                }

                let mut step_danger = field.danger[target_index];
                if self.hazards.beam_at(arrival, target).is_some() {
                    step_danger += self.tuning.beam_danger;
                }
                let route = base_danger + step_danger;

                let known = field.costs[target_index] + field.route_danger[target_index];
                if cost + route >= known {
                    continue;
                }

                field.costs[target_index] = cost;
                field.route_danger[target_index] = route;
                field.arrivals[target_index] = u32::try_from(arrival).unwrap_or(u32::MAX - 1);
                field.parents[target_index] = Some(Step {
                    parent: cell,
                    parent_tick: base_tick,
                    direction,
                });
                queue.push_back(target);
            }
        }

        field
    }

    fn is_legal(&self, from: Cell, target: Cell, direction: Direction, roster: &AgentView) -> bool {
        if self.hazards.is_barrier(target) || needs_jump(self.grid, target) {
            return false;
        }
        if roster.at(target).is_some() {
            return false;
        }
        if direction.is_jump() {
            let crowded = roster
                .iter()
                .any(|agent| !agent.idle && agent.cell.is_adjacent(target));
            if crowded {
                return false;
            }
            let over = from.step(direction.cardinal());
            if self.grid.terrain_category(over) == Category::Wall {
                return false;
            }
        }
        true
    }

    fn meets_oncoming_beam(&self, target: Cell, direction: Direction, arrival: usize) -> bool {
        let Some(previous) = arrival.checked_sub(1) else {
            return false;
        };
        self.hazards
            .beam_at(previous, target)
            .is_some_and(|facing| facing == direction.cardinal().inverted())
    }

    fn seed_danger(&self, field: &mut CostField, roster: &AgentView) {
        let tuning = self.tuning;
        let mut add = |cell: Cell, amount: f32| {
            if let Some(index) = field.index(cell) {
                field.danger[index] += amount;
            }
        };

        for &cell in self.grid.boxes() {
            add(cell, tuning.box_danger);
        }
        for cell in self.grid.holes() {
            add(cell, tuning.hole_danger);
        }
        for spawn in self.grid.zombie_starts() {
            add(spawn, tuning.zombie_start_danger);
            for neighbour in spawn.neighbours() {
                add(neighbour, tuning.zombie_start_danger);
            }
        }
        for emitter in self.grid.laser_machines() {
            if emitter.ready {
                add(emitter.cell.step(emitter.facing), tuning.emitter_ahead_danger);
            }
        }

        for agent in roster.iter() {
            let mut weight = tuning.agent_danger;
            if agent.idle {
                weight *= tuning.idle_scale;
            }
            weight *= if agent.is_zombie {
                tuning.zombie_weight
            } else {
                tuning.opponent_weight
            };

            add(agent.cell, weight);
            for facing in Direction::CARDINALS {
                for distance in 1..=tuning.blast_range {
                    let cell = agent.cell.ray(facing, distance);
                    if !self.grid.contains(cell) || self.grid.blocks_ray(cell) {
                        break;
                    }
                    add(cell, weight);
                }
            }
        }
    }
}

/// Reports whether `cell` can only be jumped over, never entered.
///
/// True for boxes, holes and laser emitters.
#[must_use]
pub fn needs_jump(grid: &GridModel, cell: Cell) -> bool {
    let terrain = grid.element_or(Layer::Terrain, cell, Element::Space);
    terrain == Element::Box
        || terrain == Element::Hole
        || terrain.is_emitter()
        || grid.element_at(Layer::GroundUnits, cell) == Some(Element::Box)
}

fn arrival_tick(cost: f32) -> usize {
    let rounded = cost.round();
    if rounded <= 0.0 {
        0
    } else {
        rounded as usize
    }
}

#[cfg(test)]
mod tests {
    use super::{arrival_tick, PenaltyTuning};

    #[test]
    fn arrival_rounds_to_nearest_tick() {
        assert_eq!(arrival_tick(0.0), 0);
        assert_eq!(arrival_tick(2.0), 2);
        assert_eq!(arrival_tick(2.6), 3);
    }

    #[test]
    fn partial_tuning_keeps_defaults() {
        let tuning: PenaltyTuning =
            serde_json::from_str(r#"{"hole_danger": 10.0}"#).expect("valid tuning");
        assert_eq!(tuning.hole_danger, 10.0);
        assert_eq!(tuning.box_danger, PenaltyTuning::default().box_danger);
    }
}
