//! 3D board of cell states.

use cubelife_core::{CellState, Coord, Dimensions, Error, Result, StateChange};
use rand::Rng;
use serde::Serialize;
use tracing::warn;

/// A bounded 3D grid. Cells outside the board do not exist; there is no
/// wraparound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Board {
    dimensions: Dimensions,
    cells: Vec<CellState>,
}

impl Board {
    /// Allocate a board with every cell `Default`. Axes below 1 are raised to 1.
    pub fn new(size_x: i32, size_y: i32, size_z: i32) -> Self {
        if Dimensions::needs_clamp(size_x, size_y, size_z) {
            warn!(
                size_x,
                size_y, size_z, "Non-positive board dimension requested, clamping to 1"
            );
        }
        Self::with_dimensions(Dimensions::clamped(size_x, size_y, size_z))
    }

    pub fn with_dimensions(dimensions: Dimensions) -> Self {
        let size = dimensions.cell_count() as usize;
        Self {
            dimensions,
            cells: vec![CellState::Default; size],
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn cell_count(&self) -> u64 {
        self.cells.len() as u64
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        self.dimensions.contains(coord)
    }

    /// Seed every cell alive with independent probability `probability`.
    ///
    /// Returns the number of cells seeded.
    pub fn seed<R: Rng + ?Sized>(&mut self, probability: f32, rng: &mut R) -> u64 {
        self.seed_with(probability, rng, |_, _| {})
    }

    /// Like [`Board::seed`], calling `on_cell` once per cell after it is decided.
    pub fn seed_with<R, F>(&mut self, probability: f32, rng: &mut R, mut on_cell: F) -> u64
    where
        R: Rng + ?Sized,
        F: FnMut(Coord, CellState),
    {
        let mut seeded = 0;

        for index in 0..self.cells.len() {
            let state = if rng.gen::<f32>() < probability {
                seeded += 1;
                CellState::Survivor
            } else {
                CellState::Default
            };
            self.cells[index] = state;
            on_cell(self.index_to_coord(index), state);
        }

        seeded
    }

    pub fn get(&self, coord: Coord) -> Result<CellState> {
        let index = self.checked_index(coord)?;
        Ok(self.cells[index])
    }

    pub fn set(&mut self, coord: Coord, state: CellState) -> Result<()> {
        let index = self.checked_index(coord)?;
        self.cells[index] = state;
        Ok(())
    }

    /// Apply a batch of changes in order.
    ///
    /// Every coordinate is checked before any cell is written, so a bad batch
    /// leaves the board untouched.
    pub fn apply(&mut self, changes: &[StateChange]) -> Result<()> {
        let indices = changes
            .iter()
            .map(|change| self.checked_index(change.pos))
            .collect::<Result<Vec<_>>>()?;

        for (index, change) in indices.into_iter().zip(changes) {
            self.cells[index] = change.new_state;
        }
        Ok(())
    }

    /// Count live cells in the 3x3x3 neighborhood, excluding the cell itself
    /// and anything outside the board.
    pub fn count_live_neighbors(&self, coord: Coord) -> u8 {
        self.neighbors(coord)
            .filter(|&n| self.cells[self.coord_to_index(n)].is_alive())
            .count() as u8
    }

    /// How many in-bounds neighbor cells exist around `coord` (7 for a corner,
    /// 26 for an interior cell).
    pub fn neighbor_candidates(&self, coord: Coord) -> usize {
        self.neighbors(coord).count()
    }

    fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        (-1..=1)
            .flat_map(|dx| (-1..=1).flat_map(move |dy| (-1..=1).map(move |dz| (dx, dy, dz))))
            .filter(|&(dx, dy, dz)| dx != 0 || dy != 0 || dz != 0)
            .map(move |(dx, dy, dz)| coord.offset(dx, dy, dz))
            .filter(move |&n| self.in_bounds(n))
    }

    pub fn live_count(&self) -> u64 {
        self.cells.iter().filter(|c| c.is_alive()).count() as u64
    }

    fn checked_index(&self, coord: Coord) -> Result<usize> {
        if self.in_bounds(coord) {
            Ok(self.coord_to_index(coord))
        } else {
            Err(Error::OutOfRange {
                coord,
                dimensions: self.dimensions,
            })
        }
    }

    fn coord_to_index(&self, coord: Coord) -> usize {
        flat_index(self.dimensions, coord)
    }

    fn index_to_coord(&self, index: usize) -> Coord {
        coord_at(self.dimensions, index)
    }

    /// Iterator over all positions, X outermost then Y then Z
    pub fn positions(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.cells.len()).map(move |i| self.index_to_coord(i))
    }

    /// Iterator over all cells with positions
    pub fn iter(&self) -> impl Iterator<Item = (Coord, CellState)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, state)| (self.index_to_coord(i), *state))
    }
}

// X is the outermost axis so that index order matches X/Y/Z iteration.
// Computed in usize: the cell count of a valid board can exceed i32::MAX.
fn flat_index(dimensions: Dimensions, coord: Coord) -> usize {
    let (sy, sz) = (dimensions.y() as usize, dimensions.z() as usize);
    (coord.x as usize * sy + coord.y as usize) * sz + coord.z as usize
}

// Each component is below its axis length, so narrowing back to i32 is lossless.
fn coord_at(dimensions: Dimensions, index: usize) -> Coord {
    let (sy, sz) = (dimensions.y() as usize, dimensions.z() as usize);
    Coord::new(
        (index / (sz * sy)) as i32,
        ((index / sz) % sy) as i32,
        (index % sz) as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn filled(x: i32, y: i32, z: i32, state: CellState) -> Board {
        let mut board = Board::new(x, y, z);
        for pos in board.positions().collect::<Vec<_>>() {
            board.set(pos, state).unwrap();
        }
        board
    }

    #[test]
    fn test_board_creation() {
        let board = Board::new(4, 3, 2);
        assert_eq!(board.cell_count(), 24);
        assert!(board.iter().all(|(_, s)| s == CellState::Default));
    }

    #[test]
    fn test_non_positive_dimensions_clamp() {
        let board = Board::new(0, -3, 2);
        assert_eq!(board.dimensions(), Dimensions::clamped(1, 1, 2));
        assert_eq!(board.cell_count(), 2);
    }

    #[test]
    fn test_position_order() {
        let board = Board::new(2, 2, 2);
        let positions: Vec<_> = board.positions().collect();
        assert_eq!(positions[0], Coord::new(0, 0, 0));
        assert_eq!(positions[1], Coord::new(0, 0, 1));
        assert_eq!(positions[2], Coord::new(0, 1, 0));
        assert_eq!(positions[4], Coord::new(1, 0, 0));
        assert_eq!(positions[7], Coord::new(1, 1, 1));
    }

    #[test]
    fn test_index_roundtrip() {
        let board = Board::new(3, 4, 5);
        for (i, pos) in board.positions().enumerate() {
            assert_eq!(board.coord_to_index(pos), i);
        }
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_index_beyond_i32_range() {
        let dims = Dimensions::clamped(i32::MAX, 2, 2);
        let far = Coord::new(i32::MAX - 1, 1, 1);

        let index = flat_index(dims, far);
        assert_eq!(index as u64, dims.cell_count() - 1);
        assert!(index > i32::MAX as usize);
        assert_eq!(coord_at(dims, index), far);
        assert_eq!(coord_at(dims, 5), Coord::new(1, 0, 1));
    }

    #[test]
    fn test_out_of_range_access() {
        let mut board = Board::new(2, 2, 2);
        assert!(matches!(
            board.get(Coord::new(2, 0, 0)),
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(
            board.set(Coord::new(0, -1, 0), CellState::Survivor),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_apply_rejects_whole_batch() {
        let mut board = Board::new(2, 2, 2);
        let changes = [
            StateChange::new(Coord::new(0, 0, 0), CellState::Survivor),
            StateChange::new(Coord::new(5, 0, 0), CellState::Survivor),
        ];
        assert!(board.apply(&changes).is_err());
        assert_eq!(board.get(Coord::new(0, 0, 0)).unwrap(), CellState::Default);
    }

    #[test]
    fn test_neighbor_candidates() {
        let board = Board::new(4, 4, 4);
        assert_eq!(board.neighbor_candidates(Coord::new(0, 0, 0)), 7);
        assert_eq!(board.neighbor_candidates(Coord::new(1, 0, 0)), 11);
        assert_eq!(board.neighbor_candidates(Coord::new(1, 1, 0)), 17);
        assert_eq!(board.neighbor_candidates(Coord::new(1, 2, 1)), 26);

        let single = Board::new(1, 1, 1);
        assert_eq!(single.neighbor_candidates(Coord::new(0, 0, 0)), 0);
    }

    #[test]
    fn test_count_neighbors() {
        let mut board = Board::new(8, 8, 8);

        // Cross pattern: center + 4 neighbors in the z = 4 plane
        for pos in [
            Coord::new(4, 4, 4),
            Coord::new(3, 4, 4),
            Coord::new(5, 4, 4),
            Coord::new(4, 3, 4),
            Coord::new(4, 5, 4),
        ] {
            board.set(pos, CellState::Survivor).unwrap();
        }

        assert_eq!(board.count_live_neighbors(Coord::new(4, 4, 4)), 4);
        assert_eq!(board.count_live_neighbors(Coord::new(3, 4, 4)), 3);
        assert_eq!(board.count_live_neighbors(Coord::new(4, 4, 5)), 5);
        assert_eq!(board.count_live_neighbors(Coord::new(0, 0, 0)), 0);
    }

    #[test]
    fn test_dead_flavors_not_counted() {
        let mut board = Board::new(3, 3, 3);
        board.set(Coord::new(0, 0, 0), CellState::Underpopulation).unwrap();
        board.set(Coord::new(0, 0, 1), CellState::Overpopulation).unwrap();
        board.set(Coord::new(0, 0, 2), CellState::Reproduction).unwrap();
        board.set(Coord::new(0, 1, 0), CellState::Survivor).unwrap();
        assert_eq!(board.count_live_neighbors(Coord::new(1, 1, 1)), 2);
    }

    #[test]
    fn test_full_cube_counts() {
        let board = filled(3, 3, 3, CellState::Survivor);
        assert_eq!(board.count_live_neighbors(Coord::new(1, 1, 1)), 26);
        assert_eq!(board.count_live_neighbors(Coord::new(1, 1, 0)), 17);
        assert_eq!(board.count_live_neighbors(Coord::new(0, 0, 0)), 7);
    }

    #[test]
    fn test_seed_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut board = Board::new(4, 4, 4);
        assert_eq!(board.seed(1.0, &mut rng), 64);
        assert_eq!(board.live_count(), 64);

        assert_eq!(board.seed(0.0, &mut rng), 0);
        assert_eq!(board.live_count(), 0);
    }

    #[test]
    fn test_seed_is_deterministic() {
        let mut a = Board::new(6, 6, 6);
        let mut b = Board::new(6, 6, 6);
        let seeded_a = a.seed(0.4, &mut ChaCha8Rng::seed_from_u64(42));
        let seeded_b = b.seed(0.4, &mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(seeded_a, seeded_b);
        assert_eq!(a, b);
        assert!(seeded_a > 0 && seeded_a < 216);
    }

    #[test]
    fn test_seed_with_visits_every_cell() {
        let mut board = Board::new(2, 3, 4);
        let mut visited = Vec::new();
        let seeded = board.seed_with(0.5, &mut ChaCha8Rng::seed_from_u64(3), |pos, state| {
            visited.push((pos, state));
        });

        assert_eq!(visited.len(), 24);
        assert_eq!(
            visited.iter().filter(|(_, s)| s.is_alive()).count() as u64,
            seeded
        );
        let cells: Vec<_> = board.iter().collect();
        assert_eq!(visited, cells);
    }

    proptest! {
        #[test]
        fn prop_neighbor_count_bounded(
            x in 1i32..6, y in 1i32..6, z in 1i32..6, seed in any::<u64>()
        ) {
            let mut board = Board::new(x, y, z);
            board.seed(0.5, &mut ChaCha8Rng::seed_from_u64(seed));
            for pos in board.positions() {
                let n = board.count_live_neighbors(pos) as usize;
                prop_assert!(n <= board.neighbor_candidates(pos));
                prop_assert!(n <= 26);
            }
        }
    }
}
