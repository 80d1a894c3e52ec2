#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    Middle,
    Null,
}

impl Button {
    pub fn from_index(index: i32) -> Button {
        match index {
            0 => Button::Up,
            1 => Button::Down,
            2 => Button::Left,
            3 => Button::Right,
            4 => Button::Middle,
            _ => Button::Null,
        }
    }

    pub fn direction(self) -> Option<Direction> {
        match self {
            Button::Up => Some(Direction::Up),
            Button::Down => Some(Direction::Down),
            Button::Left => Some(Direction::Left),
            Button::Right => Some(Direction::Right),
            Button::Middle | Button::Null => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Button::Up => "BUTTON_UP",
            Button::Down => "BUTTON_DOWN",
            Button::Left => "BUTTON_LEFT",
            Button::Right => "BUTTON_RIGHT",
            Button::Middle => "BUTTON_MIDDLE",
            Button::Null => "BUTTON_NULL",
        }
    }
}

// Terminal outcome of a session. NoEvent is only ever produced by the
// internal tick update; `Game::play` never returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    NoEvent,
    Error,
    Win(usize),
    Lose,
}
