use crate::{GridSize, Loc, Random};
use log::trace;
use std::collections::TryReserveError;
use std::fmt;
use std::mem;
use std::ops::Index;
use thiserror::Error;

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, 1),
    (1, 0),
    (-1, 0),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("a {0} board has too many cells to address")]
    TooLarge(GridSize),
    #[error("cannot allocate a {size} board")]
    Allocation {
        size: GridSize,
        #[source]
        source: TryReserveError,
    },
}

/// B3/S23: survive on 2 or 3 live neighbors, birth on exactly 3.
pub fn life_rule(alive: bool, neighbors: u8) -> bool {
    matches!((alive, neighbors), (true, 2 | 3) | (false, 3))
}

/// Fixed-size Life board with bounded edges: off-grid cells count as dead.
///
/// The next generation is written to a second buffer that is kept around
/// between ticks, so [`Board::advance`] never allocates.
#[derive(Clone, Debug)]
pub struct Board {
    size: GridSize,
    cells: Vec<bool>,
    next_cells: Vec<bool>,
    generation: u64,
}

impl Board {
    pub fn new(size: GridSize) -> Result<Self, BoardError> {
        // Locations are i32.
        if size.rows > i32::MAX as u32 || size.cols > i32::MAX as u32 {
            return Err(BoardError::TooLarge(size));
        }
        Ok(Self {
            size,
            cells: Self::dead_cells(size)?,
            next_cells: Self::dead_cells(size)?,
            generation: 0,
        })
    }

    fn dead_cells(size: GridSize) -> Result<Vec<bool>, BoardError> {
        let num_cells = size.num_cells().ok_or(BoardError::TooLarge(size))?;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(num_cells)
            .map_err(|source| BoardError::Allocation { size, source })?;
        cells.resize(num_cells, false);
        Ok(cells)
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Number of times [`Board::advance`] has run.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&alive| alive).count()
    }

    pub fn in_bounds(&self, loc: Loc) -> bool {
        loc.grid_index(self.size).is_some()
    }

    pub fn cell(&self, loc: Loc) -> Option<bool> {
        loc.grid_index(self.size).map(|index| self.cells[index])
    }

    /// Panics if `loc` is off the board; check with [`Board::in_bounds`] first.
    pub fn is_alive(&self, loc: Loc) -> bool {
        self[loc]
    }

    /// Brings every in-bounds location to life. Others are skipped.
    pub fn seed<I>(&mut self, locs: I)
    where
        I: IntoIterator,
        I::Item: Into<Loc>,
    {
        for loc in locs {
            let loc = loc.into();
            match loc.grid_index(self.size) {
                Some(index) => self.cells[index] = true,
                None => trace!("ignoring seed {:?} outside {} board", loc, self.size),
            }
        }
    }

    pub fn add_random_life(&mut self, rand: &mut Random, density: f64) {
        for cell in self.cells.iter_mut() {
            if rand.next_bool(density) {
                *cell = true;
            }
        }
    }

    pub fn alive_locs(&self) -> impl Iterator<Item = Loc> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(move |(index, _)| size.loc(index))
    }

    pub fn count_alive_neighbors(&self, loc: Loc) -> u8 {
        Neighborhood::new(self, loc).num_alive()
    }

    pub fn next_state(&self, loc: Loc) -> bool {
        life_rule(self.is_alive(loc), self.count_alive_neighbors(loc))
    }

    /// Steps every cell at once. All neighbor counts come from the current
    /// generation; results land in the spare buffer, which then becomes current.
    pub fn advance(&mut self) {
        let size = self.size;
        let cells = &self.cells;
        for (index, next_cell) in self.next_cells.iter_mut().enumerate() {
            let neighbors = Neighborhood::over(cells, size, size.loc(index)).num_alive();
            *next_cell = life_rule(cells[index], neighbors);
        }
        mem::swap(&mut self.cells, &mut self.next_cells);
        self.generation += 1;
    }
}

impl Index<Loc> for Board {
    type Output = bool;

    fn index(&self, loc: Loc) -> &Self::Output {
        loc.grid_index(self.size)
            .map(|index| &self.cells[index])
            .unwrap_or_else(|| panic!("Index {}, {} out of bounds", loc.x, loc.y))
    }
}

/// Plaintext, one line per `y`: `o` alive, `.` dead.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size.cols as i32 {
            for x in 0..self.size.rows as i32 {
                f.write_str(if self[Loc::new(x, y)] { "o" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The up-to-eight cells around `center` that lie on the board.
pub struct Neighborhood<'a> {
    cells: &'a [bool],
    size: GridSize,
    center: Loc,
}

impl<'a> Neighborhood<'a> {
    pub fn new(board: &'a Board, center: Loc) -> Self {
        Self::over(&board.cells, board.size, center)
    }

    fn over(cells: &'a [bool], size: GridSize, center: Loc) -> Self {
        Self {
            cells,
            size,
            center,
        }
    }

    pub fn for_neighbor_cells<F>(&self, mut f: F)
    where
        F: FnMut(Loc, bool),
    {
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let Some(loc) = self.center.offset(dx, dy) else {
                continue;
            };
            if let Some(index) = loc.grid_index(self.size) {
                f(loc, self.cells[index]);
            }
        }
    }

    pub fn num_alive(&self) -> u8 {
        let mut result = 0;
        self.for_neighbor_cells(|_, alive| {
            if alive {
                result += 1;
            }
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn board(rows: u32, cols: u32, alive: &[(i32, i32)]) -> Board {
        let mut result = Board::new(GridSize::new(rows, cols)).unwrap();
        result.seed(alive.iter().copied());
        result
    }

    fn alive(board: &Board) -> Vec<(i32, i32)> {
        board.alive_locs().map(|loc| (loc.x, loc.y)).collect()
    }

    /// Updates cells one at a time in row-major order without a second buffer.
    fn advance_in_place(board: &mut Board) {
        let size = board.size();
        for x in 0..size.rows as i32 {
            for y in 0..size.cols as i32 {
                let loc = Loc::new(x, y);
                let next = board.next_state(loc);
                let index = loc.grid_index(size).unwrap();
                board.cells[index] = next;
            }
        }
    }

    #[test]
    fn new_board_is_dead() {
        let board = board(30, 20, &[]);
        assert_eq!(board.size(), GridSize::new(30, 20));
        assert_eq!(board.population(), 0);
        assert_eq!(board.generation(), 0);
        assert!(!board.is_alive(Loc::new(29, 19)));
    }

    #[test]
    fn in_bounds_uses_rows_for_x_and_cols_for_y() {
        let board = board(3, 5, &[]);
        assert!(board.in_bounds(Loc::new(2, 4)));
        assert!(!board.in_bounds(Loc::new(3, 0)));
        assert!(!board.in_bounds(Loc::new(0, 5)));
        assert!(!board.in_bounds(Loc::new(-1, 0)));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn is_alive_panics_off_board() {
        board(3, 3, &[]).is_alive(Loc::new(3, 3));
    }

    #[test]
    fn cell_is_none_off_board() {
        let board = board(3, 3, &[(1, 1)]);
        assert_eq!(board.cell(Loc::new(1, 1)), Some(true));
        assert_eq!(board.cell(Loc::new(0, 1)), Some(false));
        assert_eq!(board.cell(Loc::new(-1, 1)), None);
    }

    #[test]
    fn empty_board_dimensions() {
        let mut board = board(0, 0, &[(0, 0)]);
        board.advance();
        assert_eq!(board.population(), 0);
        assert_eq!(board.to_string(), "");
    }

    #[test]
    fn dimensions_past_i32_are_too_large() {
        let wide = Board::new(GridSize::new(i32::MAX as u32 + 1, 1));
        assert!(matches!(wide, Err(BoardError::TooLarge(_))));
        let tall = Board::new(GridSize::new(1, u32::MAX));
        assert!(matches!(tall, Err(BoardError::TooLarge(_))));
    }

    #[test]
    fn unallocatable_board_is_an_error() {
        let result = Board::new(GridSize::new(i32::MAX as u32, i32::MAX as u32));
        if usize::BITS >= 64 {
            let err = result.unwrap_err();
            assert!(matches!(err, BoardError::Allocation { .. }));
            assert_eq!(err.to_string(), "cannot allocate a 2147483647x2147483647 board");
        } else {
            assert!(matches!(result, Err(BoardError::TooLarge(_))));
        }
    }

    #[test]
    fn seeding_out_of_bounds_is_ignored() {
        let empty = board(30, 30, &[]);
        let seeded = board(30, 30, &[(255, 255)]);
        assert_eq!(seeded.cells, empty.cells);

        let mixed = board(30, 30, &[(-1, 4), (4, 30), (2, 3)]);
        assert_eq!(alive(&mixed), vec![(2, 3)]);
    }

    #[test]
    fn life_rule_table() {
        for neighbors in 0..=8 {
            assert_eq!(life_rule(true, neighbors), neighbors == 2 || neighbors == 3);
            assert_eq!(life_rule(false, neighbors), neighbors == 3);
        }
    }

    #[test]
    fn neighbor_count_skips_self_and_edges() {
        let mut full = board(3, 3, &[]);
        full.add_random_life(&mut Random::from_seed(0), 1.0);
        assert_eq!(full.count_alive_neighbors(Loc::new(1, 1)), 8);
        assert_eq!(full.count_alive_neighbors(Loc::new(0, 0)), 3);
        assert_eq!(full.count_alive_neighbors(Loc::new(0, 1)), 5);
        assert_eq!(full.count_alive_neighbors(Loc::new(2, 2)), 3);
    }

    #[test]
    fn edges_do_not_wrap() {
        let board = board(5, 5, &[(0, 0), (4, 4), (0, 4)]);
        assert_eq!(board.count_alive_neighbors(Loc::new(4, 0)), 0);
        assert_eq!(board.count_alive_neighbors(Loc::new(0, 0)), 0);
    }

    #[test]
    fn lone_cells_die() {
        let mut lone = board(10, 10, &[(5, 5)]);
        lone.advance();
        assert_eq!(lone.population(), 0);

        let mut pair = board(10, 10, &[(5, 5), (5, 6)]);
        pair.advance();
        assert_eq!(pair.population(), 0);
    }

    #[test]
    fn block_is_stable() {
        let mut block = board(10, 10, &[(4, 4), (4, 5), (5, 4), (5, 5)]);
        let before = block.cells.clone();
        block.advance();
        assert_eq!(block.cells, before);
        assert_eq!(block.generation(), 1);
    }

    #[test]
    fn block_in_corner_is_stable() {
        let mut block = board(4, 4, &[(0, 0), (0, 1), (1, 0), (1, 1)]);
        block.advance();
        assert_eq!(alive(&block), vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn blinker_has_period_two() {
        let mut blinker = board(5, 5, &[(1, 2), (2, 2), (3, 2)]);
        insta::assert_snapshot!(blinker.to_string(), @r"
        .....
        .....
        .ooo.
        .....
        .....
        ");

        blinker.advance();
        assert_eq!(alive(&blinker), vec![(2, 1), (2, 2), (2, 3)]);
        insta::assert_snapshot!(blinker.to_string(), @r"
        .....
        ..o..
        ..o..
        ..o..
        .....
        ");

        blinker.advance();
        assert_eq!(alive(&blinker), vec![(1, 2), (2, 2), (3, 2)]);
    }

    #[test]
    fn advance_reads_one_generation() {
        let start = board(5, 5, &[(1, 2), (2, 2), (3, 2)]);

        let mut buffered = start.clone();
        buffered.advance();

        let mut in_place = start.clone();
        advance_in_place(&mut in_place);

        assert_eq!(alive(&buffered), vec![(2, 1), (2, 2), (2, 3)]);
        assert_ne!(in_place.cells, buffered.cells);
    }

    #[test]
    fn glider_moves_diagonally() {
        let mut glider = board(8, 8, &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]);
        for _ in 0..4 {
            glider.advance();
        }
        assert_eq!(alive(&glider), vec![(1, 3), (2, 1), (2, 3), (3, 2), (3, 3)]);
        assert_eq!(glider.generation(), 4);
    }

    #[test]
    fn random_life_density() {
        let mut rand = Random::from_seed(42);
        let mut full = board(10, 10, &[]);
        full.add_random_life(&mut rand, 1.0);
        assert_eq!(full.population(), 100);

        let mut empty = board(10, 10, &[]);
        empty.add_random_life(&mut rand, 0.0);
        assert_eq!(empty.population(), 0);
    }

    fn brute_force_neighbors(board: &Board, center: Loc) -> u8 {
        let mut result = 0;
        for loc in board.alive_locs() {
            let (dx, dy) = (loc.x - center.x, loc.y - center.y);
            if (dx, dy) != (0, 0) && dx.abs() <= 1 && dy.abs() <= 1 {
                result += 1;
            }
        }
        result
    }

    proptest! {
        #[test]
        fn neighbor_count_matches_brute_force(
            alive in proptest::collection::vec((0i32..6, 0i32..7), 0..30),
            x in -2i32..8,
            y in -2i32..9,
        ) {
            let board = board(6, 7, &alive);
            let center = Loc::new(x, y);
            let count = board.count_alive_neighbors(center);
            prop_assert!(count <= 8);
            prop_assert_eq!(count, brute_force_neighbors(&board, center));
        }

        #[test]
        fn advance_matches_next_state(
            alive in proptest::collection::vec((0i32..6, 0i32..6), 0..25),
        ) {
            let before = board(6, 6, &alive);
            let mut after = before.clone();
            after.advance();
            for x in 0..6 {
                for y in 0..6 {
                    let loc = Loc::new(x, y);
                    prop_assert_eq!(after.is_alive(loc), before.next_state(loc));
                }
            }
        }

        #[test]
        fn seeding_never_leaves_the_board(
            seeds in proptest::collection::vec((-50i32..50, -50i32..50), 0..40),
        ) {
            let board = board(10, 12, &seeds);
            let expected = seeds
                .iter()
                .filter(|(x, y)| (0..10).contains(x) && (0..12).contains(y))
                .collect::<std::collections::HashSet<_>>()
                .len();
            prop_assert_eq!(board.population(), expected);
        }
    }
}
