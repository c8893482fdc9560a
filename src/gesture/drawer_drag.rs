use tracing::{debug, trace};

use super::DrawerState;
use crate::layout_engine::{Point, Viewport};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragThresholds {
    /// Bottom fraction of the viewport where a drag may start.
    pub trigger_zone: f64,
    pub touch_slop: f64,
    pub open_threshold: f64,
    pub velocity_override_min_progress: f64,
    /// Upward speed in px/s that opens the drawer from a short drag.
    pub fling_open_velocity: f64,
}

#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub enum DragPhase {
    #[default]
    Idle,
    ArmedForDrag { start: Point },
    Dragging { start: Point, progress: f64 },
    Committing { target: DrawerState },
}

/// Dragging the drawer up from the bottom of the home screen.
#[derive(Debug, Clone)]
pub struct DrawerDrag {
    phase: DragPhase,
    thresholds: DragThresholds,
}

impl DrawerDrag {
    pub fn new(thresholds: DragThresholds) -> Self {
        Self { phase: DragPhase::Idle, thresholds }
    }

    pub fn phase(&self) -> DragPhase { self.phase }

    pub fn set_thresholds(&mut self, thresholds: DragThresholds) { self.thresholds = thresholds; }

    fn reset(&mut self) { self.phase = DragPhase::Idle; }

    /// Arms on a pointer down inside the trigger zone. The caller checks
    /// the binding and that the drawer is closed.
    pub fn arm(&mut self, pos: Point, viewport: Viewport) -> bool {
        if self.phase != DragPhase::Idle {
            return false;
        }
        let zone_top = viewport.height * (1.0 - self.thresholds.trigger_zone);
        if pos.y <= zone_top {
            return false;
        }
        self.phase = DragPhase::ArmedForDrag { start: pos };
        trace!(y = pos.y, zone_top, "drawer drag armed");
        true
    }

    /// Returns the drawer progress while dragging.
    pub fn on_move(&mut self, pos: Point, viewport: Viewport) -> Option<f64> {
        let start = match self.phase {
            DragPhase::ArmedForDrag { start } => {
                if (pos.y - start.y).abs() <= self.thresholds.touch_slop {
                    return None;
                }
                debug!("drawer drag started");
                start
            }
            DragPhase::Dragging { start, .. } => start,
            DragPhase::Idle | DragPhase::Committing { .. } => return None,
        };
        let progress = progress(start.y, pos.y, viewport.height);
        self.phase = DragPhase::Dragging { start, progress };
        Some(progress)
    }

    /// Pointer released with vertical velocity `velocity_y` (px/s, negative
    /// is up). Returns the commit target if a drag was in progress.
    pub fn release(&mut self, velocity_y: f64) -> Option<DrawerState> {
        match self.phase {
            DragPhase::Dragging { progress, .. } => {
                let target = self.commit_target(progress, velocity_y);
                debug!(progress, velocity_y, ?target, "drawer drag released");
                self.phase = DragPhase::Committing { target };
                Some(target)
            }
            DragPhase::ArmedForDrag { .. } => {
                self.reset();
                None
            }
            DragPhase::Idle | DragPhase::Committing { .. } => None,
        }
    }

    pub fn commit_target(&self, progress: f64, velocity_y: f64) -> DrawerState {
        let t = &self.thresholds;
        let flung = progress > t.velocity_override_min_progress && -velocity_y > t.fling_open_velocity;
        if progress > t.open_threshold || flung {
            DrawerState::Open
        } else {
            DrawerState::Closed
        }
    }

    /// Abandons the drag. Returns the state to snap back to when the drawer
    /// had already moved.
    pub fn cancel(&mut self) -> Option<DrawerState> {
        let moved = matches!(self.phase, DragPhase::Dragging { .. } | DragPhase::Committing { .. });
        self.reset();
        moved.then_some(DrawerState::Closed)
    }

    pub fn settle_finished(&mut self) -> Option<DrawerState> {
        let DragPhase::Committing { target } = self.phase else {
            return None;
        };
        self.reset();
        Some(target)
    }
}

fn progress(start_y: f64, y: f64, height: f64) -> f64 {
    if height <= 0.0 {
        return 0.0;
    }
    (start_y - y).clamp(0.0, height) / height
}
