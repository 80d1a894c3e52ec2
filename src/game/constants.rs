pub const MAX_GAMES: usize = 1;
pub const MAX_PLAYERS_PER_GAME: usize = 8;
pub const MAX_SNAKES: usize = 8;
pub const MAX_SNAKE_LEN: usize = 32;

pub const BUTTON_COUNT: i32 = 6;

pub const DEFAULT_SEED: i32 = 69420;
pub const DEFAULT_FPS: u32 = 10;
pub const DEFAULT_GRID_WIDTH: u16 = 32;
pub const DEFAULT_GRID_HEIGHT: u16 = 16;

// A full-roster session needs one snake per player.
const _: () = assert!(MAX_SNAKES >= MAX_PLAYERS_PER_GAME);
