/*
 * Spatial Grid Module
 *
 * This module defines the SpatialGrid struct for faster neighbor lookups.
 * It hashes boid positions into uniform cubic cells so a query only has to
 * look at the cells overlapping the query sphere instead of every boid.
 *
 * The grid only narrows down candidates; the caller still checks the
 * exact distance of each candidate.
 */

use std::collections::HashMap;

use glam::{IVec3, Vec3};

const MIN_CELL_SIZE: f32 = 1.0e-3;
// Past this many cells per axis a query just returns every index
const MAX_REACH: i32 = 16;

pub struct SpatialGrid {
    pub cell_size: f32,
    cells: HashMap<IVec3, Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() {
            cell_size.max(MIN_CELL_SIZE)
        } else {
            MIN_CELL_SIZE
        };

        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    // Convert world coordinates to a cell coordinate
    #[inline]
    pub fn pos_to_cell(&self, position: Vec3) -> IVec3 {
        (position / self.cell_size).floor().as_ivec3()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    #[inline]
    pub fn insert(&mut self, index: usize, position: Vec3) {
        let cell = self.pos_to_cell(position);
        self.cells.entry(cell).or_default().push(index);
    }

    pub fn rebuild<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Vec3>,
    {
        self.clear();
        for (index, position) in positions.into_iter().enumerate() {
            self.insert(index, position);
        }
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(Vec::is_empty)
    }

    // Indices in every cell the sphere around `position` can touch, ascending
    pub fn get_nearby_indices(&self, position: Vec3, radius: f32) -> Vec<usize> {
        let reach = (radius.max(0.0) / self.cell_size).ceil().max(1.0);
        if !(reach <= MAX_REACH as f32) {
            let mut all: Vec<usize> = self.cells.values().flatten().copied().collect();
            all.sort_unstable();
            return all;
        }
        let reach = reach as i32;
        let center = self.pos_to_cell(position);
        let mut result = Vec::new();

        for dz in -reach..=reach {
            for dy in -reach..=reach {
                for dx in -reach..=reach {
                    let cell = center + IVec3::new(dx, dy, dz);
                    if let Some(indices) = self.cells.get(&cell) {
                        result.extend_from_slice(indices);
                    }
                }
            }
        }

        result.sort_unstable();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_candidates_across_cell_boundaries() {
        let positions = [
            Vec3::new(0.95, 0.0, 0.0),
            Vec3::new(1.05, 0.0, 0.0),
            Vec3::new(5.0, 5.0, 5.0),
        ];
        let mut grid = SpatialGrid::new(1.0);
        grid.rebuild(positions);

        let nearby = grid.get_nearby_indices(positions[0], 0.5);
        assert_eq!(nearby, vec![0, 1]);
        assert_eq!(grid.len(), 3);
    }

    #[test]
    fn negative_coordinates_land_in_their_own_cells() {
        let mut grid = SpatialGrid::new(2.0);
        assert_eq!(grid.pos_to_cell(Vec3::new(-0.5, 0.5, -2.5)), IVec3::new(-1, 0, -2));

        grid.insert(4, Vec3::new(-0.5, 0.0, 0.0));
        grid.insert(9, Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(grid.get_nearby_indices(Vec3::ZERO, 1.0), vec![4, 9]);
    }

    #[test]
    fn large_radius_reaches_further_cells() {
        let mut grid = SpatialGrid::new(1.0);
        grid.insert(0, Vec3::ZERO);
        grid.insert(1, Vec3::new(3.5, 0.0, 0.0));

        assert_eq!(grid.get_nearby_indices(Vec3::ZERO, 1.0), vec![0]);
        assert_eq!(grid.get_nearby_indices(Vec3::ZERO, 4.0), vec![0, 1]);
    }

    #[test]
    fn huge_radius_returns_everything() {
        let mut grid = SpatialGrid::new(0.1);
        grid.insert(2, Vec3::new(40.0, 0.0, 0.0));
        grid.insert(0, Vec3::ZERO);

        assert_eq!(grid.get_nearby_indices(Vec3::ZERO, 50.0), vec![0, 2]);
    }

    #[test]
    fn clear_empties_the_grid() {
        let mut grid = SpatialGrid::new(1.0);
        grid.insert(0, Vec3::ONE);
        grid.clear();
        assert!(grid.is_empty());
        assert!(grid.get_nearby_indices(Vec3::ONE, 1.0).is_empty());
    }
}
