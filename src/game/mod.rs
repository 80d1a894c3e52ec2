pub mod ai;
pub mod constants;
pub mod grid;
pub mod joystick;
pub mod pool;
pub mod rng;
pub mod session;
pub mod snake;
pub mod types;
