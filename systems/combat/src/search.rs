use lasergrid_core::{AgentView, Category, Cell, Direction, Element, Layer};
use lasergrid_system_path_cost::CostField;
use lasergrid_world::{GridModel, HazardField};
use tracing::debug;

use crate::CombatTuning;

/// State of the hero handed to the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hero {
    /// Cell the hero occupies.
    pub cell: Cell,
    /// Whether the hero is mid jump.
    pub airborne: bool,
    /// Cardinal of the jump in progress, if known.
    pub jump_vector: Option<Direction>,
    /// Whether the hero's gun has reloaded.
    pub ammo_ready: bool,
}

/// Best first-ply move found by the search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchOutcome {
    /// Move to issue.
    pub direction: Direction,
    /// Heuristic value of the move.
    pub value: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UnitKind {
    Hero,
    Opponent,
    Zombie,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Unit {
    kind: UnitKind,
    cell: Cell,
    airborne: bool,
    vector: Option<Direction>,
    alive: bool,
    ammo: bool,
    idle: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SearchBeam {
    cell: Cell,
    facing: Direction,
    fresh: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct SearchBoard {
    units: Vec<Unit>,
    beams: Vec<SearchBeam>,
}

#[derive(Debug)]
struct MoveRecord {
    unit: usize,
    previous: Unit,
    spawned_beam: bool,
}

#[derive(Debug)]
struct BeamStep {
    previous: Vec<SearchBeam>,
}

#[derive(Debug)]
struct Casualties {
    fallen: Vec<usize>,
}

/// Depth-limited adversarial search over the hero and the nearest agents.
///
/// The hero maximises and every participating agent minimises in turn. All
/// moves mutate one search board and are undone exactly on backtrack.
#[derive(Debug)]
pub struct CombatSearch<'a> {
    grid: &'a GridModel,
    hazards: &'a HazardField,
    tuning: &'a CombatTuning,
    target_costs: Option<&'a CostField>,
    board: SearchBoard,
    depth: u32,
}

impl<'a> CombatSearch<'a> {
    /// Reports whether any tracked agent is within the trigger radius.
    #[must_use]
    pub fn in_close_quarters(hero: Cell, roster: &AgentView, tuning: &CombatTuning) -> bool {
        roster
            .iter()
            .any(|agent| agent.cell.manhattan_distance(hero) <= tuning.radius)
    }

    /// Prepares a search with the nearest agents inside the trigger radius.
    #[must_use]
    pub fn new(
        grid: &'a GridModel,
        hazards: &'a HazardField,
        tuning: &'a CombatTuning,
        target_costs: Option<&'a CostField>,
        hero: Hero,
        roster: &AgentView,
    ) -> Self {
        let mut nearby: Vec<_> = roster
            .iter()
            .filter(|agent| agent.cell.manhattan_distance(hero.cell) <= tuning.radius)
            .collect();
        nearby.sort_by_key(|agent| (agent.cell.manhattan_distance(hero.cell), agent.id));
        nearby.truncate(tuning.max_agents);

        let mut units = Vec::with_capacity(nearby.len() + 1);
        units.push(Unit {
            kind: UnitKind::Hero,
            cell: hero.cell,
            airborne: hero.airborne,
            vector: hero.jump_vector.filter(|vector| vector.is_cardinal()),
            alive: true,
            ammo: hero.ammo_ready,
            idle: false,
        });
        units.extend(nearby.iter().map(|agent| Unit {
            kind: if agent.is_zombie {
                UnitKind::Zombie
            } else {
                UnitKind::Opponent
            },
            cell: agent.cell,
            airborne: agent.airborne,
            vector: agent.facing.filter(|_| agent.airborne),
            alive: true,
            ammo: agent.ammo_ready,
            idle: agent.idle,
        }));

        let mut beams: Vec<SearchBeam> = grid
            .beams()
            .into_iter()
            .map(|beam| SearchBeam {
                cell: beam.cell,
                facing: beam.facing,
                fresh: false,
            })
            .collect();
        beams.extend(
            grid.laser_machines()
                .into_iter()
                .filter(|emitter| emitter.ready)
                .map(|emitter| SearchBeam {
                    cell: emitter.cell.step(emitter.facing),
                    facing: emitter.facing,
                    fresh: true,
                })
                .filter(|beam| grid.contains(beam.cell) && !grid.blocks_ray(beam.cell)),
        );

        let depth = if nearby.len() <= 2 {
            tuning.max_depth
        } else {
            1
        };

        Self {
            grid,
            hazards,
            tuning,
            target_costs,
            board: SearchBoard { units, beams },
            depth,
        }
    }

    /// Number of agents taking part besides the hero.
    #[must_use]
    pub fn participants(&self) -> usize {
        self.board.units.len() - 1
    }

    /// Number of plies the search explores.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Runs the search and returns the best first move of the hero.
    pub fn run(&mut self) -> Option<SearchOutcome> {
        let (value, direction) = self.max_layer(self.depth);
        let direction = direction?;
        debug!(
            ?direction,
            value,
            participants = self.participants(),
            depth = self.depth,
            "close-quarters search"
        );
        Some(SearchOutcome { direction, value })
    }

    fn max_layer(&mut self, depth: u32) -> (f32, Option<Direction>) {
        let mut best_value = f32::NEG_INFINITY;
        let mut best_move = None;
        for direction in self.moves(0) {
            let record = self.apply(0, direction);
            let value = self.min_layer(1, depth, best_value);
            self.undo(record);
            if value > best_value {
                best_value = value;
                best_move = Some(direction);
            }
        }
        (best_value, best_move)
    }

    fn min_layer(&mut self, agent_index: usize, depth: u32, best: f32) -> f32 {
        if agent_index >= self.board.units.len() {
            return self.joint_leaf(depth);
        }
        if !self.board.units[agent_index].alive {
            return self.min_layer(agent_index + 1, depth, best);
        }

        let mut value = f32::INFINITY;
        for direction in self.moves(agent_index) {
            let record = self.apply(agent_index, direction);
            let reply = self.min_layer(agent_index + 1, depth, best);
            self.undo(record);
            value = value.min(reply);
            if value < best {
                break;
            }
        }
        value
    }

    fn joint_leaf(&mut self, depth: u32) -> f32 {
        let step = self.advance_beams();
        let (score, casualties, hero_dead) = self.resolve();

        let value = if hero_dead {
            score
        } else if depth > 1 {
            score + self.max_layer(depth - 1).0
        } else {
            score - self.tuning.path_weight * self.remaining_cost(self.board.units[0].cell)
        };

        self.revive(casualties);
        self.retract_beams(step);
        value
    }

    fn remaining_cost(&self, cell: Cell) -> f32 {
        let Some(costs) = self.target_costs else {
            return 0.0;
        };
        let cost = costs.cost(cell);
        if cost.is_finite() {
            cost
        } else {
            self.tuning.unreachable_cost
        }
    }

    fn moves(&self, index: usize) -> Vec<Direction> {
        let unit = self.board.units[index];
        if !unit.alive {
            return vec![Direction::Stop];
        }
        if unit.airborne {
            return vec![unit.vector.unwrap_or(Direction::Stop)];
        }

        let mut moves = Vec::with_capacity(13);
        match unit.kind {
            UnitKind::Hero => {
                moves.extend(Direction::CARDINALS.into_iter().filter(|&d| self.can_step(unit.cell, d)));
                moves.extend(Direction::JUMPS.into_iter().filter(|&d| self.can_jump(unit.cell, d)));
                if unit.ammo {
                    moves.extend(Direction::FIRES);
                }
            }
            UnitKind::Opponent => {
                if !unit.idle {
                    moves.extend(Direction::CARDINALS.into_iter().filter(|&d| self.can_step(unit.cell, d)));
                    if unit.ammo {
                        moves.extend(Direction::FIRES);
                    }
                }
            }
            UnitKind::Zombie => {
                moves.extend(Direction::CARDINALS.into_iter().filter(|&d| self.can_step(unit.cell, d)));
            }
        }
        moves.push(Direction::Stop);
        moves
    }

    fn can_enter(&self, cell: Cell) -> bool {
        !self.hazards.is_barrier(cell)
            && !self.grid.is_any_at(Layer::Terrain, cell, &[Element::Box])
            && !self.grid.is_any_at(Layer::GroundUnits, cell, &[Element::Box])
    }

    fn can_step(&self, from: Cell, direction: Direction) -> bool {
        self.can_enter(from.step(direction))
    }

    fn can_jump(&self, from: Cell, direction: Direction) -> bool {
        let over = from.step(direction.cardinal());
        self.grid.terrain_category(over) != Category::Wall && self.can_enter(from.step(direction))
    }

    fn apply(&mut self, index: usize, direction: Direction) -> MoveRecord {
        let previous = self.board.units[index];
        let mut unit = previous;
        let mut spawned_beam = false;

        if unit.airborne {
            if direction.is_cardinal() && self.can_enter(unit.cell.step(direction)) {
                unit.cell = unit.cell.step(direction);
            }
            unit.airborne = false;
            unit.vector = None;
        } else if direction.is_cardinal() {
            unit.cell = unit.cell.step(direction);
        } else if direction.is_jump() {
            let vector = direction.cardinal();
            unit.cell = unit.cell.step(vector);
            unit.airborne = true;
            unit.vector = Some(vector);
        } else if direction.is_fire() {
            let facing = direction.cardinal();
            let spawn = unit.cell.step(facing);
            unit.ammo = false;
            if self.grid.contains(spawn) && !self.grid.blocks_ray(spawn) {
                self.board.beams.push(SearchBeam {
                    cell: spawn,
                    facing,
                    fresh: true,
                });
                spawned_beam = true;
            }
        }
        self.board.units[index] = unit;

        MoveRecord {
            unit: index,
            previous,
            spawned_beam,
        }
    }

    fn undo(&mut self, record: MoveRecord) {
        if record.spawned_beam {
            let _ = self.board.beams.pop();
        }
        self.board.units[record.unit] = record.previous;
    }

    fn advance_beams(&mut self) -> BeamStep {
        let previous = self.board.beams.clone();
        let grid = self.grid;
        self.board.beams.retain_mut(|beam| {
            if beam.fresh {
                beam.fresh = false;
                return true;
            }
            let next = beam.cell.step(beam.facing);
            if !grid.contains(next) || grid.blocks_ray(next) {
                return false;
            }
            beam.cell = next;
            true
        });
        BeamStep { previous }
    }

    fn retract_beams(&mut self, step: BeamStep) {
        self.board.beams = step.previous;
    }

    fn beam_on(&self, cell: Cell) -> bool {
        self.board.beams.iter().any(|beam| beam.cell == cell)
    }

    fn zombie_on(&self, cell: Cell) -> bool {
        self.board.units.iter().any(|unit| {
            unit.alive && unit.kind == UnitKind::Zombie && !unit.airborne && unit.cell == cell
        })
    }

    fn holds(&self, cell: Cell, element: Element) -> bool {
        self.grid.is_any_at(Layer::Terrain, cell, &[element])
    }

    fn resolve(&mut self) -> (f32, Casualties, bool) {
        let tuning = self.tuning;
        let mut score = 0.0;
        let mut fallen = Vec::new();

        let hero = self.board.units[0];
        let hero_dead = !hero.airborne
            && (self.beam_on(hero.cell) || self.zombie_on(hero.cell) || self.holds(hero.cell, Element::Hole));
        if hero_dead {
            score -= tuning.death_penalty;
        } else if !hero.airborne && self.holds(hero.cell, Element::Gold) {
            score += tuning.hero_gold;
        }

        for index in 1..self.board.units.len() {
            let unit = self.board.units[index];
            if !unit.alive || unit.airborne {
                continue;
            }
            if self.beam_on(unit.cell) {
                score += match unit.kind {
                    UnitKind::Zombie => tuning.zombie_kill,
                    _ => tuning.opponent_kill,
                };
                fallen.push(index);
                continue;
            }
            if unit.kind == UnitKind::Opponent {
                if self.zombie_on(unit.cell) {
                    score += tuning.zombie_on_opponent;
                    fallen.push(index);
                } else if self.holds(unit.cell, Element::Gold) {
                    score -= tuning.opponent_gold;
                }
            }
        }

        for &index in &fallen {
            self.board.units[index].alive = false;
        }

        (score, Casualties { fallen }, hero_dead)
    }

    fn revive(&mut self, casualties: Casualties) {
        for index in casualties.fallen {
            self.board.units[index].alive = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CombatSearch, Hero};
    use crate::CombatTuning;
    use lasergrid_core::{Agent, AgentId, AgentView, Cell};
    use lasergrid_world::{GridModel, HazardField};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn room(units: &[(i32, i32, char)]) -> GridModel {
        let size = 7;
        let mut terrain = String::new();
        let mut ground = String::new();
        for y in (0..size).rev() {
            for x in 0..size {
                let edge = x == 0 || y == 0 || x == size - 1 || y == size - 1;
                let glyph = if edge {
                    '║'
                } else if (x, y) == (4, 4) {
                    'B'
                } else if (x, y) == (2, 4) {
                    '$'
                } else {
                    '.'
                };
                terrain.push(glyph);
                ground.push(
                    units
                        .iter()
                        .find(|(ux, uy, _)| *ux == x && *uy == y)
                        .map_or('-', |(_, _, glyph)| *glyph),
                );
            }
        }
        let air = "-".repeat(49);
        GridModel::from_layers([terrain.as_str(), ground.as_str(), air.as_str()])
            .expect("valid room")
    }

    fn agent(id: u32, cell: Cell, is_zombie: bool) -> Agent {
        Agent {
            id: AgentId::new(id),
            cell,
            facing: None,
            airborne: false,
            last_fire_tick: None,
            last_move_tick: 0,
            idle: false,
            is_zombie,
            ammo_ready: true,
        }
    }

    #[test]
    fn undo_restores_the_board_exactly() {
        let grid = room(&[(1, 2, '→'), (5, 5, '↓')]);
        let hazards = HazardField::build(&grid, 10);
        let tuning = CombatTuning::default();
        let roster = AgentView::from_agents(vec![
            agent(1, Cell::new(3, 2), false),
            agent(2, Cell::new(2, 3), true),
            agent(3, Cell::new(4, 2), false),
        ]);
        let hero = Hero {
            cell: Cell::new(3, 3),
            airborne: false,
            jump_vector: None,
            ammo_ready: true,
        };
        let mut search = CombatSearch::new(&grid, &hazards, &tuning, None, hero, &roster);
        let pristine = search.board.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed_1a5e);

        for _ in 0..200 {
            let mut records = Vec::new();
            let mut steps = Vec::new();
            let length = rng.gen_range(1..12);
            for _ in 0..length {
                let unit = rng.gen_range(0..search.board.units.len());
                let moves = search.moves(unit);
                let direction = moves[rng.gen_range(0..moves.len())];
                records.push(search.apply(unit, direction));
                if rng.gen_bool(0.3) {
                    steps.push((records.len(), search.advance_beams()));
                }
            }
            while let Some(record) = records.pop() {
                while steps.last().is_some_and(|(depth, _)| *depth > records.len()) {
                    if let Some((_, step)) = steps.pop() {
                        search.retract_beams(step);
                    }
                }
                search.undo(record);
            }
            assert_eq!(search.board, pristine);
        }
    }

    #[test]
    fn search_leaves_the_board_untouched() {
        let grid = room(&[(1, 3, '→')]);
        let hazards = HazardField::build(&grid, 10);
        let tuning = CombatTuning::default();
        let roster = AgentView::from_agents(vec![
            agent(1, Cell::new(3, 2), false),
            agent(2, Cell::new(4, 3), true),
        ]);
        let hero = Hero {
            cell: Cell::new(3, 3),
            airborne: false,
            jump_vector: None,
            ammo_ready: true,
        };
        let mut search = CombatSearch::new(&grid, &hazards, &tuning, None, hero, &roster);
        let pristine = search.board.clone();
        let first = search.run();
        assert_eq!(search.board, pristine);
        assert_eq!(search.run(), first, "search must be repeatable");
    }
}
