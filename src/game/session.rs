use super::constants::MAX_PLAYERS_PER_GAME;
use super::grid::Grid;
use super::joystick::Joystick;
use super::pool::{Handle, Pool};
use super::rng::GameRng;
use super::snake::Snake;
use super::types::{Direction, GameEvent, Position};
use crate::display::Display;
use std::time::Duration;

struct PlayerSlot {
  eliminated: bool,
  snake: Option<Handle<Snake>>,
  joystick: Joystick,
}

// One game session. The roster is filled with `plug_joystick` before the
// session starts; `play` then owns the whole lifecycle of a match and only
// returns with a terminal event. Snakes are created at play time and given
// back to their pool by `free_game`.
pub struct Game {
  ticks: u32,
  started: bool,
  fps: u32,
  grid: Grid,
  rng: GameRng,
  apple: Position,
  players: Vec<PlayerSlot>,
}

impl Game {
  pub fn new(grid: Grid, fps: u32, seed: i32) -> Game {
    let mut rng = GameRng::new(seed);
    // There is always exactly one apple. The first one lands anywhere
    // since no snake exists yet.
    let apple = rng.random_position(grid);
    Game {
      ticks: 0,
      started: false,
      fps: fps.max(1),
      grid,
      rng,
      apple,
      players: Vec::with_capacity(MAX_PLAYERS_PER_GAME),
    }
  }

  pub fn ticks(&self) -> u32 {
    self.ticks
  }

  pub fn grid(&self) -> Grid {
    self.grid
  }

  pub fn player_count(&self) -> usize {
    self.players.len()
  }

  pub fn apple_position(&self) -> Position {
    self.apple
  }

  pub fn head_position(&self, snakes: &Pool<Snake>, player: usize) -> Option<Position> {
    let handle = self.players.get(player)?.snake?;
    Some(snakes.get(handle)?.head_position())
  }

  // The roster is append-only and freezes once the session has started.
  pub fn plug_joystick(&mut self, joystick: Joystick) -> bool {
    if self.started {
      tracing::warn!("can't add a joystick now, the game already started");
      return false;
    }
    if self.players.len() == MAX_PLAYERS_PER_GAME {
      tracing::warn!("joystick limit reached");
      return false;
    }
    self.players.push(PlayerSlot {
      eliminated: false,
      snake: None,
      joystick,
    });
    true
  }

  pub fn would_lose_next_update_if(
    &self,
    snakes: &Pool<Snake>,
    player: usize,
    dir: Direction,
  ) -> bool {
    self.view(snakes).would_lose_next_update_if(player, dir)
  }

  // Read-only snapshot of the simulation, one roster entry per registered
  // player. This is what joysticks get to look at during the input phase.
  pub fn view(&self, snakes: &Pool<Snake>) -> GameView {
    let players = self
      .players
      .iter()
      .map(|slot| {
        let snake = slot.snake.and_then(|handle| snakes.get(handle));
        match snake {
          Some(snake) => PlayerView {
            head: snake.head_position(),
            facing: snake.facing(),
            cells: snake.cells().collect(),
          },
          None => PlayerView {
            head: Position { x: 0, y: 0 },
            facing: Direction::Left,
            cells: Vec::new(),
          },
        }
      })
      .collect();
    GameView {
      grid: self.grid,
      apple: self.apple,
      players,
    }
  }

  fn alive_players(&self) -> usize {
    self.players.iter().filter(|slot| !slot.eliminated).count()
  }

  fn first_alive(&self) -> Option<usize> {
    self.players.iter().position(|slot| !slot.eliminated)
  }

  fn is_snake_at(&self, snakes: &Pool<Snake>, pos: Position) -> bool {
    self.players.iter().any(|slot| {
      if slot.eliminated {
        return false;
      }
      let Some(handle) = slot.snake else {
        return false;
      };
      snakes
        .get(handle)
        .is_some_and(|snake| snake.occupies_position(pos))
    })
  }

  // Replaces the apple with a fresh one on a cell no live snake occupies.
  // With a pathological generator cycle and a crowded board this retries
  // forever; the attempt counter exists to make such a loop visible in
  // the logs.
  fn spawn_apple(&mut self, snakes: &Pool<Snake>) {
    let mut attempt = 0;
    loop {
      let pos = self.rng.random_position(self.grid);
      tracing::debug!(
        tick = self.ticks,
        attempt,
        x = pos.x,
        y = pos.y,
        "placing apple"
      );
      if !self.is_snake_at(snakes, pos) {
        self.apple = pos;
        return;
      }
      attempt += 1;
    }
  }

  fn update(&mut self, snakes: &mut Pool<Snake>) -> GameEvent {
    self.ticks += 1;
    let max_snake_size = self.grid.cell_count() as usize;

    for i in 0..self.players.len() {
      if self.players[i].eliminated {
        continue;
      }
      let Some(handle) = self.players[i].snake else {
        continue;
      };

      let (head, size) = match snakes.get_mut(handle) {
        Some(snake) => {
          snake.step();
          (snake.head_position(), snake.size())
        }
        None => continue,
      };

      tracing::debug!(
        tick = self.ticks,
        player = i,
        head_x = head.x,
        head_y = head.y,
        apple_x = self.apple.x,
        apple_y = self.apple.y,
        "player stepped"
      );

      if head == self.apple {
        // The snake can't outgrow the board; covering every cell while
        // eating is the best possible outcome.
        if size == max_snake_size {
          return GameEvent::Win(i);
        }
        if let Some(snake) = snakes.get_mut(handle) {
          snake.grow();
        }
        self.spawn_apple(snakes);
      }

      let mut died = false;
      for j in 0..self.players.len() {
        if died {
          break;
        }
        if self.players[j].eliminated {
          continue;
        }
        let Some(other_handle) = self.players[j].snake else {
          continue;
        };
        let Some(other) = snakes.get(other_handle) else {
          continue;
        };
        died = if j == i {
          other.body_occupies_position(head)
        } else {
          other.occupies_position(head)
        };
        if died {
          tracing::debug!(tick = self.ticks, player = i, hit = j, "snake died");
        }
      }

      if died {
        self.players[i].eliminated = true;
        let alive = self.alive_players();
        tracing::debug!(tick = self.ticks, alive, "a snake died");

        // The first detected global termination ends the tick right
        // here, before later players get their move.
        if alive == 1 {
          if let Some(winner) = self.first_alive() {
            return GameEvent::Win(winner);
          }
        }
        if alive == 0 {
          return GameEvent::Lose;
        }
      }
    }

    GameEvent::NoEvent
  }

  fn draw(&self, snakes: &Pool<Snake>, display: &mut dyn Display) {
    display.clear(false);
    for slot in &self.players {
      if slot.eliminated {
        continue;
      }
      let Some(handle) = slot.snake else {
        continue;
      };
      let Some(snake) = snakes.get(handle) else {
        continue;
      };
      for cell in snake.cells() {
        display.draw_cell(cell.x as u16, cell.y as u16, true);
      }
    }
    display.draw_cell(self.apple.x as u16, self.apple.y as u16, true);
    display.present();
  }

  // Runs the match to its terminal event. The end-of-tick delay is the
  // only suspension point; everything else is computed synchronously.
  pub async fn play(&mut self, snakes: &mut Pool<Snake>, display: &mut dyn Display) -> GameEvent {
    if self.started {
      tracing::warn!("play can't be called twice");
      return GameEvent::Error;
    }

    for i in 0..self.players.len() {
      match snakes.insert(Snake::at_random_position(self.grid, &mut self.rng)) {
        Ok(handle) => self.players[i].snake = Some(handle),
        Err(_) => {
          tracing::error!(
            player = i,
            capacity = snakes.capacity(),
            "couldn't allocate a snake for player"
          );
          // Give back what this call took before reporting the failure.
          for slot in &mut self.players[..i] {
            if let Some(handle) = slot.snake.take() {
              snakes.remove(handle);
            }
          }
          return GameEvent::Error;
        }
      }
    }

    self.started = true;
    if u32::from(display.width()) < u32::from(self.grid.width())
      || u32::from(display.height()) < u32::from(self.grid.height())
    {
      let display_width = display.width();
      let display_height = display.height();
      tracing::warn!(
        display_width,
        display_height,
        "display is smaller than the grid, cells will be clipped"
      );
    }
    let period = Duration::from_millis(u64::from((1000 / self.fps).max(1)));
    let mut interval = tokio::time::interval(period);

    loop {
      // Live joysticks are polled in registration order. The view is
      // rebuilt per player so a later AI sees the direction changes
      // already applied this tick.
      for i in 0..self.players.len() {
        if self.players[i].eliminated {
          continue;
        }
        let view = self.view(snakes);
        let button = self.players[i].joystick.get_button(&view, i);
        if let (Some(dir), Some(handle)) = (button.direction(), self.players[i].snake) {
          if let Some(snake) = snakes.get_mut(handle) {
            snake.change_direction(dir);
          }
        }
      }

      let event = self.update(snakes);
      if event != GameEvent::NoEvent {
        return event;
      }

      self.draw(snakes, display);
      interval.tick().await;
    }
  }
}

// Returns every snake of the session to its pool, then the session slot
// itself. Stale handles are reported and ignored.
pub fn free_game(games: &mut Pool<Game>, snakes: &mut Pool<Snake>, handle: Handle<Game>) {
  let Some(mut game) = games.remove(handle) else {
    tracing::warn!("tried to free an invalid game handle");
    return;
  };
  for slot in &mut game.players {
    if let Some(snake_handle) = slot.snake.take() {
      snakes.remove(snake_handle);
    }
  }
}

pub struct GameView {
  grid: Grid,
  apple: Position,
  players: Vec<PlayerView>,
}

pub struct PlayerView {
  head: Position,
  facing: Direction,
  cells: Vec<Position>,
}

impl GameView {
  pub fn grid(&self) -> Grid {
    self.grid
  }

  pub fn apple_position(&self) -> Position {
    self.apple
  }

  pub fn head_position(&self, player: usize) -> Option<Position> {
    let entry = self.players.get(player)?;
    if entry.cells.is_empty() {
      return None;
    }
    Some(entry.head)
  }

  // One-tick look-ahead for the AI: would this direction be fatal on the
  // next update? A cell is dangerous when it meets an opponent's
  // hypothetical next head (assuming they hold their course) or any of a
  // snake's current cells except its tail, which will have moved on by
  // then. The tail exclusion is knowingly optimistic when that snake is
  // about to grow. Corpses of eliminated players are avoided too.
  pub fn would_lose_next_update_if(&self, player: usize, dir: Direction) -> bool {
    let Some(me) = self.players.get(player) else {
      return false;
    };
    if me.cells.is_empty() {
      return false;
    }
    let future_head = self.grid.step(me.head, dir);

    for (i, opponent) in self.players.iter().enumerate() {
      if opponent.cells.is_empty() {
        continue;
      }
      let future_opponent_head = self.grid.step(opponent.head, opponent.facing);
      if i != player && future_head == future_opponent_head {
        return true;
      }
      for cell in &opponent.cells[..opponent.cells.len() - 1] {
        if *cell == future_head {
          return true;
        }
      }
    }
    false
  }
}

#[cfg(test)]
mod tests;
