//! Time-indexed projection of laser beams over the static barrier map.

use lasergrid_core::{Category, Cell, Direction};

use crate::{cell_index, GridModel};

/// Static barriers plus the predicted beam positions for the next ticks.
///
/// Offset `0` describes the current snapshot. Every active beam is marked on
/// its own cell at offset `0`; every ready emitter first lights the cell in
/// front of it at offset `1`. A ray advances one cell per tick until a wall,
/// an emitter, a box or the board edge stops it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HazardField {
    size: i32,
    horizon: usize,
    barriers: Vec<bool>,
    trace: Vec<Option<Direction>>,
}

impl HazardField {
    /// Number of ticks projected when no horizon is configured.
    pub const DEFAULT_HORIZON: usize = 10;

    /// Builds the barrier map and beam trace for the provided grid.
    #[must_use]
    pub fn build(grid: &GridModel, horizon: usize) -> Self {
        let size = grid.size();
        let cell_count = usize::try_from(size).map_or(0, |side| side * side);

        let mut barriers = vec![false; cell_count];
        for cell in grid.cells() {
            let Some(index) = grid.index_of(cell) else {
                continue;
            };
            let terrain = grid.terrain_category(cell);
            barriers[index] = matches!(
                terrain,
                Category::Wall | Category::LaserMachine | Category::LaserMachineReady
            );
        }

        let mut field = Self {
            size,
            horizon,
            barriers,
            trace: vec![None; cell_count * horizon],
        };

        for beam in grid.beams() {
            field.march(grid, beam.cell, beam.facing, 0);
        }
        for emitter in grid.laser_machines().into_iter().filter(|emitter| emitter.ready) {
            field.march(grid, emitter.cell.step(emitter.facing), emitter.facing, 1);
        }

        field
    }

    fn march(&mut self, grid: &GridModel, start: Cell, facing: Direction, first_tick: usize) {
        let mut cursor = start;
        for tick in first_tick..self.horizon {
            if !grid.contains(cursor) || grid.blocks_ray(cursor) {
                return;
            }
            if let Some(slot) = self.slot(tick, cursor) {
                let entry = &mut self.trace[slot];
                if entry.is_none() {
                    *entry = Some(facing);
                }
            }
            cursor = cursor.step(facing);
        }
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        cell_index(self.size, cell)
    }

    fn slot(&self, tick: usize, cell: Cell) -> Option<usize> {
        if tick >= self.horizon {
            return None;
        }
        let index = self.index(cell)?;
        Some(tick * self.barriers.len() + index)
    }

    /// Number of projected ticks.
    #[must_use]
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Reports whether the cell is a wall or an emitter; off-board cells are barriers.
    #[must_use]
    pub fn is_barrier(&self, cell: Cell) -> bool {
        self.index(cell)
            .and_then(|index| self.barriers.get(index).copied())
            .unwrap_or(true)
    }

    /// Facing of the beam predicted on `cell` at tick offset `tick`.
    ///
    /// Offsets beyond the horizon report no beam.
    #[must_use]
    pub fn beam_at(&self, tick: usize, cell: Cell) -> Option<Direction> {
        let slot = self.slot(tick, cell)?;
        self.trace.get(slot).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::HazardField;
    use crate::GridModel;
    use lasergrid_core::{Cell, Direction};

    fn corridor(terrain: &str, ground: &str) -> GridModel {
        let air = "-".repeat(terrain.chars().count());
        GridModel::from_layers([terrain, ground, air.as_str()]).expect("valid board")
    }

    #[test]
    fn beam_advances_one_cell_per_tick_until_wall() {
        let grid = corridor(
            "╔═══┐\
             ║...│\
             ║...│\
             ║...│\
             └───┘",
            "-----\
             -----\
             -→---\
             -----\
             -----",
        );
        let hazards = HazardField::build(&grid, 10);
        assert_eq!(hazards.beam_at(0, Cell::new(1, 2)), Some(Direction::Right));
        assert_eq!(hazards.beam_at(1, Cell::new(2, 2)), Some(Direction::Right));
        assert_eq!(hazards.beam_at(2, Cell::new(3, 2)), Some(Direction::Right));
        assert_eq!(hazards.beam_at(3, Cell::new(4, 2)), None);
        assert_eq!(hazards.beam_at(1, Cell::new(1, 2)), None);
        assert_eq!(hazards.beam_at(10, Cell::new(1, 2)), None);
    }

    #[test]
    fn ready_emitter_lights_the_cell_in_front_next_tick() {
        let grid = corridor(
            "╔═══┐\
             ║..▼│\
             ║..B│\
             ║...│\
             └───┘",
            "-----\
             -----\
             -----\
             -----\
             -----",
        );
        let hazards = HazardField::build(&grid, 10);
        assert!(hazards.is_barrier(Cell::new(3, 3)));
        assert!(!hazards.is_barrier(Cell::new(3, 2)));
        assert!(hazards.is_barrier(Cell::new(-1, 0)));
        assert_eq!(hazards.beam_at(0, Cell::new(3, 3)), None);
        assert_eq!(hazards.beam_at(1, Cell::new(3, 2)), None);
        assert_eq!(hazards.beam_at(2, Cell::new(3, 1)), None);
    }

    #[test]
    fn charging_emitters_do_not_fire() {
        let grid = corridor(
            "╔═══┐\
             ║.˅.│\
             ║...│\
             ║...│\
             └───┘",
            "-----\
             -----\
             -----\
             -----\
             -----",
        );
        let hazards = HazardField::build(&grid, 4);
        for tick in 0..4 {
            assert_eq!(hazards.beam_at(tick, Cell::new(2, 2)), None);
        }

        let ready = corridor(
            "╔═══┐\
             ║.▼.│\
             ║...│\
             ║...│\
             └───┘",
            "-----\
             -----\
             -----\
             -----\
             -----",
        );
        let hazards = HazardField::build(&ready, 4);
        assert_eq!(hazards.beam_at(1, Cell::new(2, 2)), Some(Direction::Down));
        assert_eq!(hazards.beam_at(2, Cell::new(2, 1)), Some(Direction::Down));
        assert_eq!(hazards.beam_at(3, Cell::new(2, 0)), None);
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let grid = corridor(
            "╔═══┐\
             ║►..│\
             ║...│\
             ║...│\
             └───┘",
            "-----\
             -----\
             ---↑-\
             -----\
             -----",
        );
        assert_eq!(HazardField::build(&grid, 10), HazardField::build(&grid, 10));
    }
}
