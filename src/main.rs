use anyhow::Context;
use serde::Serialize;
use std::env;
use tracing_subscriber::EnvFilter;

mod display;
mod game;

use display::FrameBuffer;
use game::constants::{
  DEFAULT_FPS, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, DEFAULT_SEED, MAX_GAMES,
  MAX_PLAYERS_PER_GAME, MAX_SNAKES,
};
use game::grid::Grid;
use game::joystick::{Joystick, RandomJoystick};
use game::pool::Pool;
use game::session::{free_game, Game};
use game::snake::Snake;
use game::types::GameEvent;

struct MatchConfig {
  width: u16,
  height: u16,
  fps: u32,
  ai_players: usize,
  random_players: usize,
  // None means a fresh random seed per match.
  seed: Option<i32>,
  matches: u32,
}

impl MatchConfig {
  fn from_env() -> anyhow::Result<MatchConfig> {
    let config = MatchConfig {
      width: env::var("GRID_WIDTH")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_GRID_WIDTH),
      height: env::var("GRID_HEIGHT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_GRID_HEIGHT),
      fps: env::var("FPS")
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(DEFAULT_FPS),
      ai_players: env::var("AI_PLAYERS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(1),
      random_players: env::var("RANDOM_PLAYERS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0),
      seed: match env::var("SEED") {
        Err(_) => Some(DEFAULT_SEED),
        Ok(value) if value == "random" => None,
        Ok(value) => Some(
          value
            .parse::<i32>()
            .context("SEED must be an integer or \"random\"")?,
        ),
      },
      matches: env::var("MATCHES")
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(1)
        .max(1),
    };

    let players = config.ai_players + config.random_players;
    anyhow::ensure!(
      players >= 1 && players <= MAX_PLAYERS_PER_GAME,
      "AI_PLAYERS + RANDOM_PLAYERS must be between 1 and {MAX_PLAYERS_PER_GAME}"
    );
    anyhow::ensure!(
      config.width >= 1 && config.width <= u8::MAX as u16,
      "GRID_WIDTH out of range"
    );
    anyhow::ensure!(
      config.height >= 1 && config.height <= u8::MAX as u16,
      "GRID_HEIGHT out of range"
    );
    Ok(config)
  }
}

#[derive(Debug, Serialize)]
struct MatchReport {
  match_index: u32,
  seed: i32,
  players: usize,
  ticks: u32,
  outcome: &'static str,
  winner: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = MatchConfig::from_env()?;
  let grid = Grid::new(config.width, config.height);
  let mut games: Pool<Game> = Pool::new(MAX_GAMES);
  let mut snakes: Pool<Snake> = Pool::new(MAX_SNAKES);
  let mut display = FrameBuffer::new(u16::from(grid.width()), u16::from(grid.height()));

  for index in 0..config.matches {
    let seed = match config.seed {
      Some(base) => base.wrapping_add(index as i32),
      None => rand::random(),
    };

    let Ok(handle) = games.insert(Game::new(grid, config.fps, seed)) else {
      anyhow::bail!("game pool exhausted");
    };
    let game = games
      .get_mut(handle)
      .context("freshly inserted game is gone")?;

    for _ in 0..config.ai_players {
      anyhow::ensure!(game.plug_joystick(Joystick::Ai), "couldn't plug joystick");
    }
    for i in 0..config.random_players {
      let joystick_seed = seed.wrapping_add(10_000).wrapping_add(i as i32);
      anyhow::ensure!(
        game.plug_joystick(Joystick::Random(RandomJoystick::new(joystick_seed))),
        "couldn't plug joystick"
      );
    }

    tracing::info!(match_index = index, seed, "starting match");
    let event = game.play(&mut snakes, &mut display).await;

    let (outcome, winner) = match event {
      GameEvent::Win(player) => ("win", Some(player)),
      GameEvent::Lose => ("lose", None),
      GameEvent::Error | GameEvent::NoEvent => {
        free_game(&mut games, &mut snakes, handle);
        anyhow::bail!("the match could not run");
      }
    };

    let report = MatchReport {
      match_index: index,
      seed,
      players: config.ai_players + config.random_players,
      ticks: game.ticks(),
      outcome,
      winner,
    };
    println!("{}", serde_json::to_string(&report)?);

    free_game(&mut games, &mut snakes, handle);
    debug_assert!(snakes.is_empty());
  }

  Ok(())
}
