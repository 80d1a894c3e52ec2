use super::types::{Direction, Position};

// Toroidal board geometry. Every position-producing operation goes through
// `wrap`, so no caller can ever hold an out-of-range cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
  width: u8,
  height: u8,
}

impl Grid {
  // Panics when a dimension is zero or does not fit the coordinate type.
  // That is a configuration error, not a runtime one.
  pub fn new(width: u16, height: u16) -> Grid {
    assert!(
      width >= 1 && width <= u8::MAX as u16,
      "grid width out of range"
    );
    assert!(
      height >= 1 && height <= u8::MAX as u16,
      "grid height out of range"
    );
    Grid {
      width: width as u8,
      height: height as u8,
    }
  }

  pub fn width(&self) -> u8 {
    self.width
  }

  pub fn height(&self) -> u8 {
    self.height
  }

  pub fn cell_count(&self) -> u32 {
    self.width as u32 * self.height as u32
  }

  pub fn wrap(&self, x: i32, y: i32) -> Position {
    Position {
      x: x.rem_euclid(self.width as i32) as u8,
      y: y.rem_euclid(self.height as i32) as u8,
    }
  }

  pub fn step(&self, pos: Position, dir: Direction) -> Position {
    let x = pos.x as i32;
    let y = pos.y as i32;
    match dir {
      Direction::Up => self.wrap(x, y - 1),
      Direction::Down => self.wrap(x, y + 1),
      Direction::Left => self.wrap(x - 1, y),
      Direction::Right => self.wrap(x + 1, y),
    }
  }
}
