use tracing::debug;

use super::{DrawerState, GestureOutcome};
use crate::layout_engine::{Point, Viewport};

/// Follow factor applied to the finger while dismissing.
const DISMISS_DAMPING: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DismissThresholds {
    pub slop: f64,
    /// Fraction of the viewport height that closes the drawer.
    pub threshold_fraction: f64,
    /// Lower bound on the close distance, already scaled by density.
    pub min_distance: f64,
}

impl DismissThresholds {
    pub fn close_distance(&self, height: f64) -> f64 {
        (self.threshold_fraction * height).max(self.min_distance)
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub enum DismissPhase {
    #[default]
    Idle,
    Tracking { start_y: f64 },
    Dragging { start_y: f64, delta: f64, translation: f64 },
    Committing { target: DrawerState },
}

/// Pulling the open drawer down to close it, starting with its list
/// scrolled to the top.
#[derive(Debug, Clone)]
pub struct DismissDrag {
    phase: DismissPhase,
    thresholds: DismissThresholds,
}

impl DismissDrag {
    pub fn new(thresholds: DismissThresholds) -> Self {
        Self { phase: DismissPhase::Idle, thresholds }
    }

    pub fn phase(&self) -> DismissPhase { self.phase }

    pub fn set_thresholds(&mut self, thresholds: DismissThresholds) { self.thresholds = thresholds; }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, DismissPhase::Tracking { .. } | DismissPhase::Dragging { .. })
    }

    pub fn begin(&mut self, pos: Point) {
        if self.phase == DismissPhase::Idle {
            self.phase = DismissPhase::Tracking { start_y: pos.y };
        }
    }

    /// Returns how open the drawer is while dragging.
    pub fn on_move(&mut self, pos: Point, viewport: Viewport) -> Option<f64> {
        let start_y = match self.phase {
            DismissPhase::Tracking { start_y } => {
                if pos.y - start_y <= self.thresholds.slop {
                    return None;
                }
                start_y
            }
            DismissPhase::Dragging { start_y, .. } => start_y,
            DismissPhase::Idle | DismissPhase::Committing { .. } => return None,
        };
        let height = viewport.height.max(0.0);
        let delta = pos.y - start_y;
        let translation = (delta * DISMISS_DAMPING).clamp(0.0, height);
        self.phase = DismissPhase::Dragging { start_y, delta, translation };
        if height == 0.0 {
            return Some(1.0);
        }
        Some(1.0 - translation / height)
    }

    pub fn release(&mut self, pos: Point, viewport: Viewport) -> Option<GestureOutcome> {
        match self.phase {
            DismissPhase::Dragging { start_y, translation, .. } => {
                let delta = pos.y - start_y;
                let close_at = self.thresholds.close_distance(viewport.height);
                let close = translation > close_at || delta > close_at;
                debug!(translation, delta, close_at, close, "drawer dismiss released");
                if close {
                    self.phase = DismissPhase::Committing { target: DrawerState::Closed };
                    Some(GestureOutcome::DrawerCommit(DrawerState::Closed))
                } else {
                    self.phase = DismissPhase::Idle;
                    Some(GestureOutcome::DrawerSnapBack(DrawerState::Open))
                }
            }
            DismissPhase::Tracking { .. } => {
                self.phase = DismissPhase::Idle;
                None
            }
            DismissPhase::Idle | DismissPhase::Committing { .. } => None,
        }
    }

    pub fn cancel(&mut self) -> Option<DrawerState> {
        let moved = matches!(
            self.phase,
            DismissPhase::Dragging { .. } | DismissPhase::Committing { .. }
        );
        self.phase = DismissPhase::Idle;
        moved.then_some(DrawerState::Open)
    }

    pub fn settle_finished(&mut self) -> Option<DrawerState> {
        let DismissPhase::Committing { target } = self.phase else {
            return None;
        };
        self.phase = DismissPhase::Idle;
        Some(target)
    }
}
