use std::time::Duration;

use crate::common::collections::VecDeque;
use crate::layout_engine::Point;

const WINDOW: Duration = Duration::from_millis(100);

/// Pixels per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
}

impl Velocity {
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

/// Estimates pointer velocity from the samples of the last 100 ms.
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    samples: VecDeque<(Duration, Point)>,
}

impl VelocityTracker {
    pub fn clear(&mut self) { self.samples.clear(); }

    pub fn add(&mut self, time: Duration, pos: Point) {
        if self.samples.back().is_some_and(|(t, _)| time < *t) {
            // Clock went backwards; start over.
            self.samples.clear();
        }
        self.samples.push_back((time, pos));
        while let Some(&(t, _)) = self.samples.front() {
            if time.saturating_sub(t) > WINDOW {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn velocity(&self) -> Velocity {
        let (Some(&(t0, p0)), Some(&(t1, p1))) = (self.samples.front(), self.samples.back()) else {
            return Velocity::default();
        };
        let dt = (t1 - t0).as_secs_f64();
        if dt <= 0.0 {
            return Velocity::default();
        }
        Velocity::new((p1.x - p0.x) / dt, (p1.y - p0.y) / dt)
    }
}
