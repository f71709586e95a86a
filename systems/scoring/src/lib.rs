#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reward field and target selection.
//!
//! Every cell receives a reward from what the board holds there. The target
//! is the cell with the best `reward / (ranking cost + 1)` ratio under a
//! completed [`CostField`], and the emitted direction is the first move on the
//! recorded route toward it.

use lasergrid_core::{AgentView, Category, Cell, Direction};
use lasergrid_system_path_cost::{needs_jump, CostField};
use lasergrid_world::{cell_index, DistanceField, GridModel};
use serde::Deserialize;
use tracing::{debug, warn};

/// Rewards assigned to board features.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RewardTuning {
    /// Reward of wall cells.
    pub wall: f32,
    /// Base reward of an exit.
    pub exit_base: f32,
    /// Extra exit reward per collected gold.
    pub exit_per_gold: f32,
    /// Exits stay at zero while gold lies within this many steps of them.
    pub exit_gold_radius: u16,
    /// Reward of untaken gold.
    pub gold: f32,
    /// Reward of unexplored cells.
    pub explore: f32,
    /// Reward of perks.
    pub perk: f32,
    /// Added to cells from which a live zombie can be shot.
    pub zombie_hunt: f32,
    /// Reach of the zombie hunting rays in cells.
    pub zombie_hunt_range: i32,
    /// Ranking costs at or above this value are never targeted.
    pub max_ranking_cost: f32,
}

impl Default for RewardTuning {
    fn default() -> Self {
        Self {
            wall: -1.0e9,
            exit_base: 50.0,
            exit_per_gold: 20.0,
            exit_gold_radius: 10,
            gold: 20.0,
            explore: 1.0,
            perk: 3.0,
            zombie_hunt: 5.0,
            zombie_hunt_range: 10,
            max_ranking_cost: 1.0e5,
        }
    }
}

/// Dense per-cell rewards.
#[derive(Clone, Debug, PartialEq)]
pub struct RewardField {
    size: i32,
    values: Vec<f32>,
}

impl RewardField {
    fn index(&self, cell: Cell) -> Option<usize> {
        cell_index(self.size, cell)
    }

    fn set(&mut self, cell: Cell, value: f32) {
        if let Some(index) = self.index(cell) {
            self.values[index] = value;
        }
    }

    fn add(&mut self, cell: Cell, value: f32) {
        if let Some(index) = self.index(cell) {
            self.values[index] += value;
        }
    }

    /// Reward of `cell`, `None` off the board.
    #[must_use]
    pub fn reward(&self, cell: Cell) -> Option<f32> {
        self.index(cell).map(|index| self.values[index])
    }
}

/// Selected destination.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    /// Destination cell.
    pub cell: Cell,
    /// Reward of the destination.
    pub reward: f32,
    /// Ranking cost of reaching the destination.
    pub ranking_cost: f32,
}

/// Outcome of a scoring pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection {
    /// Move to emit this tick.
    pub direction: Direction,
    /// Destination the move heads for, if one was found.
    pub target: Option<Target>,
}

/// Reward-driven target selector.
#[derive(Debug)]
pub struct Scorer<'a> {
    grid: &'a GridModel,
    tuning: &'a RewardTuning,
}

impl<'a> Scorer<'a> {
    /// Creates a scorer over the provided grid.
    #[must_use]
    pub fn new(grid: &'a GridModel, tuning: &'a RewardTuning) -> Self {
        Self { grid, tuning }
    }

    /// Computes the reward of every cell.
    #[must_use]
    pub fn rewards(&self, origin: Cell, roster: &AgentView, gold_collected: u32) -> RewardField {
        let grid = self.grid;
        let tuning = self.tuning;
        let side = usize::try_from(grid.size()).unwrap_or(0);
        let mut field = RewardField {
            size: grid.size(),
            values: vec![0.0; side * side],
        };

        for &wall in grid.walls() {
            field.set(wall, tuning.wall);
        }

        for cell in grid.unexplored() {
            field.set(cell, tuning.explore);
        }

        for &gold in grid.gold() {
            let taken = roster
                .iter()
                .any(|agent| agent.cell == gold || agent.cell.is_adjacent(gold));
            if !taken {
                field.set(gold, tuning.gold);
            }
        }

        for perk in grid.perks() {
            if perk.cell != origin {
                field.set(perk.cell, tuning.perk);
            }
        }

        let exits = grid.exits();
        if !exits.is_empty() {
            let near_gold = DistanceField::from_seeds(grid.size(), grid.gold(), |cell| {
                matches!(
                    grid.terrain_category(cell),
                    Category::Wall | Category::LaserMachine | Category::LaserMachineReady
                )
            });
            let exit_reward = tuning.exit_base + tuning.exit_per_gold * gold_collected as f32;
            for exit in exits {
                if near_gold.within(exit, tuning.exit_gold_radius) {
                    field.set(exit, 0.0);
                } else {
                    field.set(exit, exit_reward);
                }
            }
        }

        for zombie in grid.zombies() {
            for facing in Direction::CARDINALS {
                for distance in 1..=tuning.zombie_hunt_range {
                    let cell = zombie.ray(facing, distance);
                    if !grid.contains(cell) || grid.blocks_ray(cell) {
                        break;
                    }
                    field.add(cell, tuning.zombie_hunt);
                }
            }
        }

        field
    }

    /// Picks the best target under `costs`, scanning columns then rows.
    ///
    /// Ties keep the first cell in scan order.
    #[must_use]
    pub fn select(&self, rewards: &RewardField, costs: &CostField) -> Option<Target> {
        let origin = costs.origin();
        let mut best: Option<Target> = None;
        let mut best_ratio = -1.0_f32;

        for x in 0..self.grid.size() {
            for y in 0..self.grid.size() {
                let cell = Cell::new(x, y);
                if cell == origin {
                    continue;
                }
                let Some(reward) = rewards.reward(cell) else {
                    continue;
                };
                if reward < 0.0 {
                    continue;
                }
                let ranking_cost = costs.ranking_cost(cell);
                if !ranking_cost.is_finite() || ranking_cost >= self.tuning.max_ranking_cost {
                    continue;
                }
                let ratio = reward / (ranking_cost + 1.0);
                if ratio > best_ratio {
                    best_ratio = ratio;
                    best = Some(Target {
                        cell,
                        reward,
                        ranking_cost,
                    });
                }
            }
        }

        best
    }

    /// Scores the board and returns the move toward the best target.
    ///
    /// No reachable target, or a parent table that does not lead back to the
    /// origin, yields [`Direction::Die`].
    #[must_use]
    pub fn decide(&self, costs: &CostField, roster: &AgentView, gold_collected: u32) -> Selection {
        let origin = costs.origin();
        let rewards = self.rewards(origin, roster, gold_collected);
        let Some(target) = self.select(&rewards, costs) else {
            debug!(%origin, "no reachable target");
            return Selection {
                direction: Direction::Die,
                target: None,
            };
        };

        let first = match costs.first_step(target.cell) {
            Ok(direction) => direction,
            Err(error) => {
                warn!(%error, "discarding target");
                return Selection {
                    direction: Direction::Die,
                    target: Some(target),
                };
            }
        };

        let direction = self.walkable(origin, first);
        debug!(
            target = %target.cell,
            reward = target.reward,
            cost = target.ranking_cost,
            ?direction,
            "target selected"
        );

        Selection {
            direction,
            target: Some(target),
        }
    }

    /// Turns a step onto a box, hole or emitter into a jump over it.
    ///
    /// A jump that would land on a wall, off the board or on another such
    /// cell is replaced by [`Direction::Stop`].
    fn walkable(&self, origin: Cell, first: Direction) -> Direction {
        if !first.is_cardinal() || !needs_jump(self.grid, origin.step(first)) {
            return first;
        }
        let jump = first.to_jump();
        let landing = origin.step(jump);
        if self.grid.terrain_category(landing) == Category::Wall || needs_jump(self.grid, landing) {
            warn!(%origin, %landing, "no landing beyond the obstacle");
            return Direction::Stop;
        }
        jump
    }
}

#[cfg(test)]
mod tests {
    use super::{RewardTuning, Scorer};
    use lasergrid_core::{Agent, AgentId, AgentView, Category, Cell, Direction};
    use lasergrid_system_path_cost::{PathCoster, PenaltyTuning};
    use lasergrid_world::{GridModel, HazardField};

    fn grid(terrain: &str) -> GridModel {
        let blank = "-".repeat(terrain.chars().count());
        GridModel::from_layers([terrain, blank.as_str(), blank.as_str()]).expect("valid board")
    }

    const ROOM: &str = "╔═════┐\
                        ║.....│\
                        ║....E│\
                        ║$...$│\
                        ║.....│\
                        ║-....│\
                        └─────┘";

    #[test]
    fn rewards_follow_board_features() {
        let board = grid(ROOM);
        let tuning = RewardTuning::default();
        let scorer = Scorer::new(&board, &tuning);
        let rewards = scorer.rewards(Cell::new(3, 3), &AgentView::default(), 2);

        assert_eq!(rewards.reward(Cell::new(0, 0)), Some(tuning.wall));
        assert_eq!(rewards.reward(Cell::new(1, 3)), Some(tuning.gold));
        assert_eq!(rewards.reward(Cell::new(1, 1)), Some(tuning.explore));
        assert_eq!(rewards.reward(Cell::new(5, 4)), Some(0.0), "gold next to the exit");
        assert_eq!(rewards.reward(Cell::new(2, 2)), Some(0.0));
    }

    #[test]
    fn exit_opens_once_gold_is_out_of_reach() {
        let board = grid(
            "╔═════┐\
             ║.....│\
             ║....E│\
             ║.....│\
             ║.....│\
             ║.....│\
             └─────┘",
        );
        let tuning = RewardTuning::default();
        let rewards = Scorer::new(&board, &tuning).rewards(Cell::new(1, 1), &AgentView::default(), 3);
        assert_eq!(rewards.reward(Cell::new(5, 4)), Some(50.0 + 20.0 * 3.0));
    }

    #[test]
    fn gold_guarded_by_an_agent_is_ignored() {
        let board = grid(ROOM);
        let tuning = RewardTuning::default();
        let guard = Agent {
            id: AgentId::new(1),
            cell: Cell::new(1, 2),
            facing: None,
            airborne: false,
            last_fire_tick: None,
            last_move_tick: 0,
            idle: true,
            is_zombie: true,
            ammo_ready: false,
        };
        let roster = AgentView::from_agents(vec![guard]);
        let rewards = Scorer::new(&board, &tuning).rewards(Cell::new(3, 3), &roster, 0);
        assert_eq!(rewards.reward(Cell::new(1, 3)), Some(0.0));
        assert_eq!(rewards.reward(Cell::new(5, 3)), Some(tuning.gold));
    }

    #[test]
    fn equal_ratios_keep_the_first_column() {
        let board = grid(
            "╔═════┐\
             ║.....│\
             ║.....│\
             ║$...$│\
             ║.....│\
             ║.....│\
             └─────┘",
        );
        let hazards = HazardField::build(&board, 10);
        let penalties = PenaltyTuning::default();
        let costs = PathCoster::new(&board, &hazards, &penalties).sweep(Cell::new(3, 3), &AgentView::default());
        let tuning = RewardTuning::default();
        let selection = Scorer::new(&board, &tuning).decide(&costs, &AgentView::default(), 0);

        assert_eq!(selection.target.map(|target| target.cell), Some(Cell::new(1, 3)));
        assert_eq!(selection.direction.cardinal(), Direction::Left);
    }

    #[test]
    fn box_in_the_corridor_is_jumped_over() {
        let board = grid(
            "╔═════┐\
             ║║║║║║│\
             ║║║║║║│\
             ║║║║║║│\
             ║║║║║║│\
             ║.B.$║│\
             └─────┘",
        );
        let hazards = HazardField::build(&board, 10);
        let penalties = PenaltyTuning::default();
        let costs = PathCoster::new(&board, &hazards, &penalties).sweep(Cell::new(1, 1), &AgentView::default());
        let tuning = RewardTuning::default();
        let selection = Scorer::new(&board, &tuning).decide(&costs, &AgentView::default(), 0);

        assert_eq!(selection.target.map(|target| target.cell), Some(Cell::new(4, 1)));
        assert_eq!(selection.direction, Direction::RightJump);
        let landing = Cell::new(1, 1).step(selection.direction);
        assert_eq!(board.terrain_category(landing), Category::Floor);
    }

    const WALLED_BOX: &str = "╔═════┐\
                              ║.....│\
                              ║.....│\
                              ║.B...│\
                              ║║$...│\
                              ║.B║..│\
                              └─────┘";

    #[test]
    fn jump_over_a_box_needs_a_free_landing() {
        let board = grid(WALLED_BOX);
        let tuning = RewardTuning::default();
        let scorer = Scorer::new(&board, &tuning);

        assert_eq!(scorer.walkable(Cell::new(1, 1), Direction::Right), Direction::Stop);
        assert_eq!(scorer.walkable(Cell::new(1, 3), Direction::Right), Direction::RightJump);
        assert_eq!(scorer.walkable(Cell::new(1, 3), Direction::Up), Direction::Up);
        assert_eq!(scorer.walkable(Cell::new(1, 1), Direction::RightJump), Direction::RightJump);
    }

    #[test]
    fn boxed_in_hero_never_jumps_into_a_wall() {
        let board = grid(WALLED_BOX);
        let hazards = HazardField::build(&board, 10);
        let penalties = PenaltyTuning::default();
        let costs = PathCoster::new(&board, &hazards, &penalties).sweep(Cell::new(1, 1), &AgentView::default());
        let tuning = RewardTuning::default();
        let selection = Scorer::new(&board, &tuning).decide(&costs, &AgentView::default(), 0);

        assert!(costs.cost(Cell::new(2, 2)).is_infinite());
        assert_ne!(selection.direction, Direction::RightJump);
        assert_eq!(selection.direction, Direction::Die);
    }

    #[test]
    fn sealed_cell_yields_die() {
        let board = grid("╔═┐║.│└─┘");
        let hazards = HazardField::build(&board, 10);
        let penalties = PenaltyTuning::default();
        let costs = PathCoster::new(&board, &hazards, &penalties).sweep(Cell::new(1, 1), &AgentView::default());
        let tuning = RewardTuning::default();
        let selection = Scorer::new(&board, &tuning).decide(&costs, &AgentView::default(), 0);

        assert_eq!(selection.direction, Direction::Die);
        assert!(selection.target.is_none());
    }
}
