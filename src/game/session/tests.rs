use super::*;
use crate::display::FrameBuffer;
use crate::game::ai;
use crate::game::constants::{MAX_GAMES, MAX_SNAKES};
use crate::game::joystick::InputDevice;
use crate::game::types::Button;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

fn snake_pool() -> Pool<Snake> {
    Pool::new(MAX_SNAKES)
}

fn make_game(width: u16, height: u16, seed: i32) -> Game {
    Game::new(Grid::new(width, height), 1000, seed)
}

// Registers a player and hands it a snake at a known position, bypassing
// the random placement `play` would do.
fn add_player_at(game: &mut Game, snakes: &mut Pool<Snake>, x: i32, y: i32) -> Handle<Snake> {
    assert!(game.plug_joystick(Joystick::Ai));
    let Ok(handle) = snakes.insert(Snake::new(game.grid, x, y)) else {
        panic!("snake pool exhausted in test setup");
    };
    let index = game.players.len() - 1;
    game.players[index].snake = Some(handle);
    handle
}

fn grow_step(snakes: &mut Pool<Snake>, handle: Handle<Snake>, dir: Direction) {
    let snake = snakes.get_mut(handle).unwrap();
    snake.change_direction(dir);
    snake.grow();
    snake.step();
}

struct ScriptedDevice {
    buttons: VecDeque<Button>,
    polls: Arc<Mutex<Vec<usize>>>,
}

impl ScriptedDevice {
    fn new(buttons: &[Button]) -> (ScriptedDevice, Arc<Mutex<Vec<usize>>>) {
        let polls = Arc::new(Mutex::new(Vec::new()));
        (
            ScriptedDevice {
                buttons: buttons.iter().copied().collect(),
                polls: Arc::clone(&polls),
            },
            polls,
        )
    }
}

impl InputDevice for ScriptedDevice {
    fn get_button(&mut self, player: usize) -> Button {
        self.polls.lock().unwrap().push(player);
        self.buttons.pop_front().unwrap_or(Button::Null)
    }
}

#[test]
fn biting_the_own_body_loses_on_that_very_tick() {
    let mut snakes = snake_pool();
    let mut game = make_game(4, 4, 1);
    let handle = add_player_at(&mut game, &mut snakes, 3, 2);
    game.started = true;
    game.apple = Position { x: 0, y: 0 };

    // Build a size-5 snake hooked around so the next step lands on the
    // still-occupied tail cell.
    grow_step(&mut snakes, handle, Direction::Left); // (2, 2)
    grow_step(&mut snakes, handle, Direction::Left); // (1, 2)
    grow_step(&mut snakes, handle, Direction::Up); // (1, 1)
    grow_step(&mut snakes, handle, Direction::Right); // (2, 1)
    snakes
        .get_mut(handle)
        .unwrap()
        .change_direction(Direction::Down);
    assert_eq!(snakes.get(handle).unwrap().size(), 5);

    let event = game.update(&mut snakes);
    assert_eq!(event, GameEvent::Lose);
    assert!(game.players[0].eliminated);
}

#[test]
fn second_head_into_an_occupied_cell_hands_the_win_to_the_survivor() {
    let mut snakes = snake_pool();
    let mut game = make_game(6, 6, 1);
    let a = add_player_at(&mut game, &mut snakes, 2, 2);
    let b = add_player_at(&mut game, &mut snakes, 2, 4);
    game.started = true;
    game.apple = Position { x: 0, y: 0 };

    snakes.get_mut(a).unwrap().change_direction(Direction::Down);
    snakes.get_mut(b).unwrap().change_direction(Direction::Up);

    // Player 0 reaches (2, 3) first; player 1 then steps into it and is
    // the one eliminated, which leaves exactly one snake alive.
    let event = game.update(&mut snakes);
    assert_eq!(event, GameEvent::Win(0));
    assert!(!game.players[0].eliminated);
    assert!(game.players[1].eliminated);
}

#[test]
fn eating_the_apple_grows_the_snake_and_relocates_the_apple() {
    let mut snakes = snake_pool();
    let mut game = make_game(5, 3, 1);
    let handle = add_player_at(&mut game, &mut snakes, 2, 1);
    game.started = true;
    game.apple = Position { x: 1, y: 1 };

    let event = game.update(&mut snakes);
    assert_eq!(event, GameEvent::NoEvent);

    // Growth is pending, not yet applied; the apple moved off the snake.
    let snake = snakes.get(handle).unwrap();
    assert_eq!(snake.head_position(), Position { x: 1, y: 1 });
    assert_eq!(game.head_position(&snakes, 0), Some(Position { x: 1, y: 1 }));
    assert_eq!(snake.size(), 1);
    assert_ne!(game.apple_position(), Position { x: 1, y: 1 });
    assert!(!snake.occupies_position(game.apple_position()));

    let event = game.update(&mut snakes);
    assert_eq!(event, GameEvent::NoEvent);
    assert_eq!(snakes.get(handle).unwrap().size(), 2);
}

#[test]
fn covering_the_whole_board_while_eating_wins_immediately() {
    // With an even seed the generator's low-bit phase makes every apple
    // respawn on this 2x2 board land on (1, 0), the one cell the path
    // below keeps free until the very last bite.
    let mut snakes = snake_pool();
    let mut game = make_game(2, 2, 42);
    let handle = add_player_at(&mut game, &mut snakes, 1, 0);
    game.started = true;

    let script = [
        (Direction::Down, Position { x: 1, y: 1 }),
        (Direction::Left, Position { x: 0, y: 1 }),
        (Direction::Up, Position { x: 0, y: 0 }),
    ];
    for (dir, apple) in script {
        game.apple = apple;
        snakes.get_mut(handle).unwrap().change_direction(dir);
        assert_eq!(game.update(&mut snakes), GameEvent::NoEvent);
    }

    assert_eq!(snakes.get(handle).unwrap().size(), 3);
    game.apple = Position { x: 1, y: 0 };
    snakes
        .get_mut(handle)
        .unwrap()
        .change_direction(Direction::Right);
    let event = game.update(&mut snakes);
    assert_eq!(event, GameEvent::Win(0));
}

#[test]
fn lookahead_flags_bodies_but_excludes_the_tail() {
    let mut snakes = snake_pool();
    let mut game = make_game(6, 6, 1);
    let _player = add_player_at(&mut game, &mut snakes, 4, 2);
    let opponent = add_player_at(&mut game, &mut snakes, 5, 3);
    game.started = true;

    // Opponent occupies (3,3) (4,3) (5,3), head at (3,3) facing left.
    grow_step(&mut snakes, opponent, Direction::Left);
    grow_step(&mut snakes, opponent, Direction::Left);

    // (4, 3) is a body cell, (5, 3) is the tail that will have vacated.
    assert!(game.would_lose_next_update_if(&snakes, 0, Direction::Down));
    let mut game2 = make_game(6, 6, 1);
    let mut snakes2 = snake_pool();
    let _player = add_player_at(&mut game2, &mut snakes2, 5, 2);
    let opponent2 = add_player_at(&mut game2, &mut snakes2, 5, 3);
    game2.started = true;
    grow_step(&mut snakes2, opponent2, Direction::Left);
    grow_step(&mut snakes2, opponent2, Direction::Left);
    assert!(!game2.would_lose_next_update_if(&snakes2, 0, Direction::Down));
}

#[test]
fn lookahead_flags_head_on_collisions() {
    let mut snakes = snake_pool();
    let mut game = make_game(6, 6, 1);
    let _player = add_player_at(&mut game, &mut snakes, 1, 3);
    let _opponent = add_player_at(&mut game, &mut snakes, 3, 3);
    game.started = true;

    // Both future heads land on (2, 3): the opponent keeps facing left.
    assert!(game.would_lose_next_update_if(&snakes, 0, Direction::Right));
    assert!(!game.would_lose_next_update_if(&snakes, 0, Direction::Up));
}

#[test]
fn lookahead_still_avoids_eliminated_corpses() {
    let mut snakes = snake_pool();
    let mut game = make_game(6, 6, 1);
    let _player = add_player_at(&mut game, &mut snakes, 2, 2);
    let corpse = add_player_at(&mut game, &mut snakes, 3, 3);
    game.started = true;
    grow_step(&mut snakes, corpse, Direction::Left); // head (2,3), body (3,3)
    game.players[1].eliminated = true;

    assert!(game.would_lose_next_update_if(&snakes, 0, Direction::Down));
}

#[test]
fn lookahead_never_counts_the_own_future_head_as_a_head_on() {
    let mut snakes = snake_pool();
    let mut game = make_game(6, 6, 1);
    let _player = add_player_at(&mut game, &mut snakes, 2, 2);
    game.started = true;

    for dir in [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ] {
        assert!(!game.would_lose_next_update_if(&snakes, 0, dir));
    }
}

#[test]
fn the_roster_freezes_once_the_game_has_started() {
    let mut game = make_game(4, 4, 1);
    assert_eq!(game.grid().width(), 4);
    assert!(game.plug_joystick(Joystick::Ai));
    game.started = true;
    assert!(!game.plug_joystick(Joystick::Ai));
    assert_eq!(game.player_count(), 1);
}

#[test]
fn the_roster_rejects_players_beyond_the_limit() {
    let mut game = make_game(4, 4, 1);
    for _ in 0..MAX_PLAYERS_PER_GAME {
        assert!(game.plug_joystick(Joystick::Ai));
    }
    assert!(!game.plug_joystick(Joystick::Ai));
    assert_eq!(game.player_count(), MAX_PLAYERS_PER_GAME);
}

#[test]
fn draw_renders_live_snakes_and_the_apple_only() {
    let mut snakes = snake_pool();
    let mut game = make_game(6, 6, 1);
    let live = add_player_at(&mut game, &mut snakes, 4, 4);
    let _dead = add_player_at(&mut game, &mut snakes, 1, 1);
    game.started = true;
    game.apple = Position { x: 0, y: 5 };
    grow_step(&mut snakes, live, Direction::Left); // (3, 4) plus (4, 4)
    game.players[1].eliminated = true;

    let mut fb = FrameBuffer::new(6, 6);
    game.draw(&snakes, &mut fb);

    assert_eq!(fb.lit_cells(), 3);
    assert!(fb.cell(3, 4));
    assert!(fb.cell(4, 4));
    assert!(fb.cell(0, 5));
    assert!(!fb.cell(1, 1));
    assert_eq!(fb.frames_presented(), 1);
}

#[tokio::test]
async fn a_single_cell_board_is_won_on_the_first_bite() {
    let mut snakes = snake_pool();
    let mut display = FrameBuffer::new(1, 1);
    let mut game = Game::new(Grid::new(1, 1), 10, 7);
    let (device, polls) = ScriptedDevice::new(&[]);
    assert!(game.plug_joystick(Joystick::Physical(Box::new(device))));

    let event = game.play(&mut snakes, &mut display).await;
    assert_eq!(event, GameEvent::Win(0));
    assert_eq!(game.ticks(), 1);
    assert_eq!(polls.lock().unwrap().as_slice(), &[0]);
}

#[tokio::test(start_paused = true)]
async fn scripted_two_player_match_runs_ticks_until_the_collision() {
    // Even seed: both snakes spawn on (1, 0) of the 2x2 board, as does
    // the initial apple, and nothing here ever eats it.
    let mut snakes = snake_pool();
    let mut display = FrameBuffer::new(2, 2);
    let mut game = Game::new(Grid::new(2, 2), 10, 42);
    let (first, _) = ScriptedDevice::new(&[Button::Down, Button::Left]);
    let (second, _) = ScriptedDevice::new(&[Button::Null, Button::Up]);
    assert!(game.plug_joystick(Joystick::Physical(Box::new(first))));
    assert!(game.plug_joystick(Joystick::Physical(Box::new(second))));

    let event = game.play(&mut snakes, &mut display).await;
    assert_eq!(event, GameEvent::Win(0));
    assert_eq!(game.ticks(), 2);
    assert_eq!(display.frames_presented(), 1);
}

#[tokio::test]
async fn playing_twice_reports_an_error_without_mutation() {
    let mut snakes = snake_pool();
    let mut display = FrameBuffer::new(4, 4);
    let mut game = make_game(4, 4, 1);
    assert!(game.plug_joystick(Joystick::Ai));
    game.started = true;

    let event = game.play(&mut snakes, &mut display).await;
    assert_eq!(event, GameEvent::Error);
    assert_eq!(snakes.len(), 0);
    assert_eq!(game.ticks(), 0);
}

#[tokio::test]
async fn snake_pool_exhaustion_rolls_back_the_partial_allocation() {
    let mut snakes = snake_pool();
    let grid = Grid::new(4, 4);
    let mut rng = GameRng::new(5);
    for _ in 0..MAX_SNAKES - 1 {
        let Ok(_) = snakes.insert(Snake::at_random_position(grid, &mut rng)) else {
            panic!("pool should not be full yet");
        };
    }

    let mut display = FrameBuffer::new(4, 4);
    let mut game = make_game(4, 4, 9);
    assert!(game.plug_joystick(Joystick::Ai));
    assert!(game.plug_joystick(Joystick::Ai));

    let event = game.play(&mut snakes, &mut display).await;
    assert_eq!(event, GameEvent::Error);
    assert_eq!(snakes.len(), MAX_SNAKES - 1);
    assert!(!game.started);
    assert!(game.players.iter().all(|slot| slot.snake.is_none()));
}

#[tokio::test]
async fn freeing_a_game_returns_its_snakes_and_its_slot() {
    let mut games: Pool<Game> = Pool::new(MAX_GAMES);
    let mut snakes = snake_pool();
    let mut display = FrameBuffer::new(1, 1);

    let Ok(handle) = games.insert(Game::new(Grid::new(1, 1), 10, 7)) else {
        panic!("game pool exhausted");
    };
    let game = games.get_mut(handle).unwrap();
    assert!(game.plug_joystick(Joystick::Ai));
    let event = game.play(&mut snakes, &mut display).await;
    assert_eq!(event, GameEvent::Win(0));
    assert_eq!(snakes.len(), 1);

    free_game(&mut games, &mut snakes, handle);
    assert_eq!(snakes.len(), 0);
    assert_eq!(games.len(), 0);
    assert!(games.get(handle).is_none());
}

#[test]
fn ai_prefers_the_shorter_toroidal_path_to_the_apple() {
    let mut snakes = snake_pool();
    let mut game = make_game(8, 8, 1);
    let _player = add_player_at(&mut game, &mut snakes, 1, 4);
    game.started = true;

    game.apple = Position { x: 3, y: 4 };
    let view = game.view(&snakes);
    assert_eq!(ai::evaluate_best_direction(&view, 0), Button::Right);

    // Going left wraps around in three cells, going right takes five.
    game.apple = Position { x: 6, y: 4 };
    let view = game.view(&snakes);
    assert_eq!(ai::evaluate_best_direction(&view, 0), Button::Left);
}

#[test]
fn ai_swerves_to_the_other_horizontal_when_the_short_way_is_fatal() {
    let mut snakes = snake_pool();
    let mut game = make_game(8, 8, 1);
    let _player = add_player_at(&mut game, &mut snakes, 3, 4);
    let blocker = add_player_at(&mut game, &mut snakes, 2, 3);
    game.started = true;
    // Blocker crosses the column just left of the player, so (2, 4) is a
    // non-tail body cell.
    grow_step(&mut snakes, blocker, Direction::Down); // head (2,4), body (2,3)
    grow_step(&mut snakes, blocker, Direction::Down); // head (2,5)

    game.apple = Position { x: 1, y: 4 };
    let view = game.view(&snakes);
    assert_eq!(ai::evaluate_best_direction(&view, 0), Button::Right);
}

#[test]
fn ai_falls_back_to_the_vertical_axis_when_aligned_horizontally() {
    let mut snakes = snake_pool();
    let mut game = make_game(8, 8, 1);
    let _player = add_player_at(&mut game, &mut snakes, 3, 6);
    game.started = true;

    game.apple = Position { x: 3, y: 3 };
    let view = game.view(&snakes);
    assert_eq!(ai::evaluate_best_direction(&view, 0), Button::Up);

    game.apple = Position { x: 3, y: 7 };
    let view = game.view(&snakes);
    assert_eq!(ai::evaluate_best_direction(&view, 0), Button::Down);
}

#[test]
fn a_trapped_ai_still_answers_down() {
    let mut snakes = snake_pool();
    let mut game = make_game(8, 8, 1);
    let player = add_player_at(&mut game, &mut snakes, 2, 6);
    game.started = true;

    // Box the player in: a long opponent ring covers every neighbour of
    // (2, 2) while keeping its tail far away.
    let opponent = add_player_at(&mut game, &mut snakes, 3, 1);
    for dir in [
        Direction::Left, // (2, 1)
        Direction::Left, // (1, 1)
        Direction::Down, // (1, 2)
        Direction::Down, // (1, 3)
        Direction::Right, // (2, 3)
        Direction::Right, // (3, 3)
        Direction::Up, // (3, 2)
        Direction::Up, // (3, 1) is the opponent's own old cell
    ] {
        grow_step(&mut snakes, opponent, dir);
    }
    // Move the player inside the ring.
    {
        let snake = snakes.get_mut(player).unwrap();
        snake.change_direction(Direction::Up);
        for _ in 0..4 {
            snake.step(); // ends at (2, 2)
        }
    }
    assert_eq!(
        snakes.get(player).unwrap().head_position(),
        Position { x: 2, y: 2 }
    );

    game.apple = Position { x: 6, y: 6 };
    let view = game.view(&snakes);
    for dir in [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ] {
        assert!(view.would_lose_next_update_if(0, dir));
    }
    assert_eq!(ai::evaluate_best_direction(&view, 0), Button::Down);
}
