use super::session::GameView;
use super::types::{Button, Direction};

// Greedy move picker. Walks toward the apple along the shorter toroidal
// axis distance, vetoing any candidate the one-tick look-ahead flags as
// fatal, and falls back to the first surviving direction. Deliberately not
// a search: the per-tick compute budget is tiny and fixed.
pub fn evaluate_best_direction(view: &GameView, player: usize) -> Button {
    let apple = view.apple_position();
    let Some(head) = view.head_position(player) else {
        return Button::Null;
    };

    let width = view.grid().width() as i32;
    let height = view.grid().height() as i32;

    // Danger probes already paid for, kept so the fallback doesn't retry
    // directions that were proven fatal above.
    let mut would_lose_left: Option<bool> = None;
    let mut would_lose_right: Option<bool> = None;
    let mut would_lose_up: Option<bool> = None;

    if apple.x != head.x {
        let (distance_left, distance_right) = if apple.x < head.x {
            (
                head.x as i32 - apple.x as i32,
                width + apple.x as i32 - head.x as i32,
            )
        } else {
            (
                width + head.x as i32 - apple.x as i32,
                apple.x as i32 - head.x as i32,
            )
        };

        let lose_left = view.would_lose_next_update_if(player, Direction::Left);
        would_lose_left = Some(lose_left);
        if distance_left < distance_right && !lose_left {
            return Button::Left;
        }

        let lose_right = view.would_lose_next_update_if(player, Direction::Right);
        would_lose_right = Some(lose_right);
        if !lose_right {
            return Button::Right;
        }
    }

    if apple.y != head.y {
        let (distance_up, distance_down) = if apple.y < head.y {
            (
                head.y as i32 - apple.y as i32,
                height + apple.y as i32 - head.y as i32,
            )
        } else {
            (
                height + head.y as i32 - apple.y as i32,
                apple.y as i32 - head.y as i32,
            )
        };

        let lose_up = view.would_lose_next_update_if(player, Direction::Up);
        would_lose_up = Some(lose_up);
        if distance_up < distance_down && !lose_up {
            return Button::Up;
        }

        if !view.would_lose_next_update_if(player, Direction::Down) {
            return Button::Down;
        }
    }

    // No apple-directed move survived. Pick any direction not yet proven
    // fatal; when everything is fatal, going down is as good as anything.
    if would_lose_left.is_none() && !view.would_lose_next_update_if(player, Direction::Left) {
        return Button::Left;
    }
    if would_lose_right.is_none() && !view.would_lose_next_update_if(player, Direction::Right) {
        return Button::Right;
    }
    if would_lose_up.is_none() && !view.would_lose_next_update_if(player, Direction::Up) {
        return Button::Up;
    }
    if view.would_lose_next_update_if(player, Direction::Down) {
        tracing::debug!(player, "ai player is trapped");
    }
    Button::Down
}
