use super::grid::Grid;
use super::types::Position;

// Linear-congruential generator. The whole simulation is reproducible from
// one seed, which is what makes the game loop testable tick by tick.
pub fn next_random_using_seed(seed: i32) -> i32 {
    ((seed as i64).wrapping_mul(1_103_515_245).wrapping_add(12_345) % (1_i64 << 31)) as i32
}

pub fn next_random_positive_using_seed(seed: i32) -> i32 {
    let n = next_random_using_seed(seed);
    if n < 0 {
        -n
    } else {
        n
    }
}

#[derive(Debug, Clone)]
pub struct GameRng {
    seed: i32,
}

impl GameRng {
    pub fn new(seed: i32) -> GameRng {
        GameRng { seed }
    }

    pub fn next(&mut self) -> i32 {
        self.seed = next_random_using_seed(self.seed);
        self.seed
    }

    // Draws two values and wraps them into the grid. Looping on this call
    // eventually reaches every cell, which apple placement relies on.
    pub fn random_position(&mut self, grid: Grid) -> Position {
        let x = self.next();
        let y = self.next();
        grid.wrap(x, y)
    }
}
