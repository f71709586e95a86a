//! Breadth-first step counts over the board.

use std::collections::VecDeque;

use lasergrid_core::Cell;

use crate::cell_index;

/// Dense step-count grid seeded from a set of cells.
///
/// Distances are the number of orthogonal steps to the nearest seed through
/// cells the caller does not block. Unreachable and blocked cells hold
/// `u16::MAX`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistanceField {
    size: i32,
    distances: Vec<u16>,
}

impl DistanceField {
    /// Builds a field over an `size` x `size` board.
    #[must_use]
    pub fn from_seeds<F>(size: i32, seeds: &[Cell], is_blocked: F) -> Self
    where
        F: FnMut(Cell) -> bool,
    {
        let mut field = Self::default();
        field.rebuild_with(size, seeds, is_blocked);
        field
    }

    /// Rebuilds the distances using a reverse breadth-first search.
    pub fn rebuild_with<F>(&mut self, size: i32, seeds: &[Cell], mut is_blocked: F)
    where
        F: FnMut(Cell) -> bool,
    {
        let side = usize::try_from(size).unwrap_or(0);
        let cell_count = side.checked_mul(side).unwrap_or(0);

        self.size = size;
        if cell_count == 0 {
            self.distances.clear();
            return;
        }

        if self.distances.len() != cell_count {
            self.distances = vec![u16::MAX; cell_count];
        } else {
            self.distances.fill(u16::MAX);
        }

        let mut queue = VecDeque::new();

        for &seed in seeds {
            if is_blocked(seed) {
                continue;
            }

            if let Some(index) = cell_index(size, seed) {
                if self.distances[index] == 0 {
                    continue;
                }

                self.distances[index] = 0;
                queue.push_back(seed);
            }
        }

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = cell_index(size, cell) else {
                continue;
            };
            let current_distance = self.distances[current_index];

            if current_distance >= u16::MAX.saturating_sub(1) {
                continue;
            }

            let next_distance = current_distance + 1;

            for neighbour in cell.neighbours() {
                let Some(neighbour_index) = cell_index(size, neighbour) else {
                    continue;
                };

                if is_blocked(neighbour) {
                    continue;
                }

                if self.distances[neighbour_index] <= next_distance {
                    continue;
                }

                self.distances[neighbour_index] = next_distance;
                queue.push_back(neighbour);
            }
        }
    }

    /// Distance captured for the provided cell, if it lies within the field.
    #[must_use]
    pub fn distance(&self, cell: Cell) -> Option<u16> {
        cell_index(self.size, cell).and_then(|offset| self.distances.get(offset).copied())
    }

    /// Reports whether `cell` lies within `steps` of a seed.
    #[must_use]
    pub fn within(&self, cell: Cell, steps: u16) -> bool {
        self.distance(cell)
            .is_some_and(|distance| distance != u16::MAX && distance <= steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_start_at_zero() {
        let field = DistanceField::from_seeds(4, &[Cell::new(1, 2)], |_| false);

        assert_eq!(field.distance(Cell::new(1, 2)), Some(0));
        assert_eq!(field.distance(Cell::new(1, 1)), Some(1));
        assert_eq!(field.distance(Cell::new(1, 0)), Some(2));
        assert_eq!(field.distance(Cell::new(0, 0)), Some(3));
        assert_eq!(field.distance(Cell::new(4, 0)), None);
    }

    #[test]
    fn blocked_cells_stay_unreachable() {
        let wall = Cell::new(1, 1);
        let field = DistanceField::from_seeds(3, &[Cell::new(1, 2)], |cell| cell == wall);

        assert_eq!(field.distance(wall), Some(u16::MAX));
        assert_eq!(field.distance(Cell::new(1, 0)), Some(4));
        assert_eq!(field.distance(Cell::new(0, 1)), Some(2));
        assert!(field.within(Cell::new(0, 1), 2));
        assert!(!field.within(wall, 10));
    }
}
