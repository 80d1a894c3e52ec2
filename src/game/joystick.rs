use super::ai;
use super::constants::BUTTON_COUNT;
use super::rng::next_random_positive_using_seed;
use super::session::GameView;
use super::types::Button;

// Anything that can answer "what is being requested right now for player P".
// Physical devices live behind this trait; scripted devices implement it in
// tests.
pub trait InputDevice {
    fn get_button(&mut self, player: usize) -> Button;
}

// The closed set of joystick variants. The AI variant carries no state of
// its own: it reads everything it needs from the per-tick game view.
pub enum Joystick {
    Physical(Box<dyn InputDevice>),
    Random(RandomJoystick),
    Ai,
}

impl Joystick {
    pub fn get_button(&mut self, view: &GameView, player: usize) -> Button {
        match self {
            Joystick::Physical(device) => device.get_button(player),
            Joystick::Random(random) => {
                let button = random.next_button();
                tracing::debug!(player, button = button.name(), "random joystick generated");
                button
            }
            Joystick::Ai => {
                let button = ai::evaluate_best_direction(view, player);
                tracing::debug!(player, button = button.name(), "ai joystick chose");
                button
            }
        }
    }
}

pub struct RandomJoystick {
    seed: i32,
}

impl RandomJoystick {
    pub fn new(seed: i32) -> RandomJoystick {
        RandomJoystick { seed }
    }

    fn next_button(&mut self) -> Button {
        let n = next_random_positive_using_seed(self.seed);
        self.seed = n;
        Button::from_index(n % BUTTON_COUNT)
    }
}
