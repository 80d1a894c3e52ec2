use super::constants::MAX_SNAKE_LEN;
use super::grid::Grid;
use super::rng::GameRng;
use super::types::{Direction, Position};

// Circular queue of relative directions. Each entry records, for one body
// segment beyond the head, the direction leading from that segment toward
// the previous one ("where did I come from"). A step pushes one entry at
// the head end and pops one at the tail end, so the buffer naturally ends
// up a ring.
#[derive(Debug, Clone)]
struct DirectionQueue {
    data: [Direction; MAX_SNAKE_LEN],
    size: usize,
    head: usize,
}

impl DirectionQueue {
    fn new() -> DirectionQueue {
        DirectionQueue {
            data: [Direction::Left; MAX_SNAKE_LEN],
            size: 0,
            head: 0,
        }
    }

    fn len(&self) -> usize {
        self.size
    }

    fn is_full(&self) -> bool {
        self.size == MAX_SNAKE_LEN
    }

    // When full this overwrites the oldest entry, keeping the size capped.
    fn push(&mut self, dir: Direction) {
        self.data[self.head] = dir;
        self.head = (self.head + 1) % MAX_SNAKE_LEN;
        if self.size < MAX_SNAKE_LEN {
            self.size += 1;
        }
    }

    // Drops the oldest entry.
    fn pop(&mut self) {
        if self.size > 0 {
            self.size -= 1;
        }
    }

    // offset 0 is the most recently pushed entry.
    fn get(&self, offset: usize) -> Direction {
        let index = (self.head + MAX_SNAKE_LEN - 1 - offset) % MAX_SNAKE_LEN;
        self.data[index]
    }
}

// One snake. Holds the absolute head position plus the relative body queue;
// absolute body cells are recomputed on demand by walking the queue, which
// keeps the per-snake state at a handful of bytes.
#[derive(Debug, Clone)]
pub struct Snake {
    grid: Grid,
    head: Position,
    facing: Direction,
    body: DirectionQueue,
    grow: bool,
}

impl Snake {
    pub fn new(grid: Grid, x: i32, y: i32) -> Snake {
        Snake {
            grid,
            head: grid.wrap(x, y),
            facing: Direction::Left,
            body: DirectionQueue::new(),
            grow: false,
        }
    }

    pub fn at_random_position(grid: Grid, rng: &mut GameRng) -> Snake {
        let x = rng.next();
        let y = rng.next();
        Snake::new(grid, x, y)
    }

    pub fn head_position(&self) -> Position {
        self.head
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn size(&self) -> usize {
        1 + self.body.len()
    }

    // Takes effect on the next step. Reversing into the own neck is
    // silently rejected.
    pub fn change_direction(&mut self, dir: Direction) {
        if dir == self.facing.opposite() {
            tracing::debug!("snakes can't go backwards");
        } else {
            self.facing = dir;
        }
    }

    // Advances the head one cell. The new second segment "came from" the
    // opposite of the facing direction, so that is what gets pushed. With
    // growth pending the tail entry is kept and the size rises by one;
    // at capacity the push already dropped the oldest entry, so the size
    // stays capped either way.
    pub fn step(&mut self) {
        let was_full = self.body.is_full();
        self.body.push(self.facing.opposite());
        self.head = self.grid.step(self.head, self.facing);
        if self.grow {
            self.grow = false;
        } else if !was_full {
            self.body.pop();
        }
    }

    // Idempotent until the next step.
    pub fn grow(&mut self) {
        self.grow = true;
    }

    pub fn cells(&self) -> Cells<'_> {
        Cells {
            snake: self,
            pos: self.head,
            index: 0,
            yielded_head: false,
        }
    }

    pub fn occupies_position(&self, pos: Position) -> bool {
        self.cells().any(|cell| cell == pos)
    }

    pub fn body_occupies_position(&self, pos: Position) -> bool {
        self.cells().skip(1).any(|cell| cell == pos)
    }
}

// Lazy walk over the snake's cells, head first, tail last. Restartable by
// calling `Snake::cells` again.
pub struct Cells<'a> {
    snake: &'a Snake,
    pos: Position,
    index: usize,
    yielded_head: bool,
}

impl Iterator for Cells<'_> {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        if !self.yielded_head {
            self.yielded_head = true;
            return Some(self.pos);
        }
        if self.index >= self.snake.body.len() {
            return None;
        }
        let dir = self.snake.body.get(self.index);
        self.pos = self.snake.grid.step(self.pos, dir);
        self.index += 1;
        Some(self.pos)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let yielded = self.index + usize::from(self.yielded_head);
        let remaining = self.snake.size() - yielded;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Cells<'_> {}
