use super::Velocity;
use crate::layout_engine::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Up,
    Down,
}

/// Classifies a completed pointer sequence as a vertical fling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeClassifier {
    touch_slop: f64,
    min_velocity: f64,
}

impl SwipeClassifier {
    pub fn new(touch_slop: f64, min_velocity: f64) -> Self { Self { touch_slop, min_velocity } }

    pub fn classify(&self, down: Point, up: Point, velocity: Velocity) -> Option<SwipeDirection> {
        let dx = up.x - down.x;
        let dy = up.y - down.y;
        if dy.abs() <= dx.abs() || dy.abs() <= 2.0 * self.touch_slop {
            return None;
        }
        if velocity.y.abs() <= self.min_velocity {
            return None;
        }
        if dy < 0.0 && velocity.y < 0.0 {
            Some(SwipeDirection::Up)
        } else if dy > 0.0 && velocity.y > 0.0 {
            Some(SwipeDirection::Down)
        } else {
            None
        }
    }
}
