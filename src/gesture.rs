//! Pointer gesture recognition for the home screen.
//!
//! Raw pointer events go in, [`GestureOutcome`]s come out. Nothing here
//! touches the layout or the drawer directly; the reactor decides what an
//! outcome means.

mod dismiss;
mod double_tap;
mod drawer_drag;
mod fling;
mod pinch;
mod velocity;

use std::time::Duration;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub use self::dismiss::{DismissDrag, DismissPhase, DismissThresholds};
pub use self::double_tap::DoubleTapDetector;
pub use self::drawer_drag::{DragPhase, DragThresholds, DrawerDrag};
pub use self::fling::{SwipeClassifier, SwipeDirection};
pub use self::pinch::{PinchClassifier, PinchDirection};
pub use self::velocity::{Velocity, VelocityTracker};
use crate::common::config::GestureSettings;
use crate::layout_engine::{Point, Viewport};

/// What a recognized gesture is bound to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GestureAction {
    #[default]
    None,
    AppDrawer,
    Search,
    Notifications,
    ExpandNotifications,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GestureBindings {
    pub swipe_up: GestureAction,
    pub swipe_down: GestureAction,
    pub double_tap: GestureAction,
    pub pinch_in: GestureAction,
    pub pinch_out: GestureAction,
}

impl GestureBindings {
    pub fn for_swipe(&self, direction: SwipeDirection) -> GestureAction {
        match direction {
            SwipeDirection::Up => self.swipe_up,
            SwipeDirection::Down => self.swipe_down,
        }
    }

    pub fn for_pinch(&self, direction: PinchDirection) -> GestureAction {
        match direction {
            PinchDirection::In => self.pinch_in,
            PinchDirection::Out => self.pinch_out,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    pub bindings: GestureBindings,
    pub drag: DragThresholds,
    pub dismiss: DismissThresholds,
    pub touch_slop: f64,
    pub min_fling_velocity: f64,
    pub double_tap_timeout: Duration,
    pub pinch_threshold: f64,
}

impl GestureConfig {
    pub fn from_settings(g: &GestureSettings) -> Self {
        GestureConfig {
            bindings: GestureBindings {
                swipe_up: g.swipe_up,
                swipe_down: g.swipe_down,
                double_tap: g.double_tap,
                pinch_in: g.pinch_in,
                pinch_out: g.pinch_out,
            },
            drag: DragThresholds {
                trigger_zone: g.drawer_trigger_zone.clamp(0.0, 1.0),
                touch_slop: g.touch_slop.max(0.0),
                open_threshold: g.open_threshold.clamp(0.0, 1.0),
                velocity_override_min_progress: g.velocity_override_min_progress.clamp(0.0, 1.0),
                fling_open_velocity: g.fling_open_velocity.max(0.0),
            },
            dismiss: DismissThresholds {
                slop: g.dismiss_slop.max(0.0),
                threshold_fraction: g.dismiss_threshold.clamp(0.0, 1.0),
                min_distance: g.dismiss_min_distance.max(0.0) * g.density.max(0.0),
            },
            touch_slop: g.touch_slop.max(0.0),
            min_fling_velocity: g.min_fling_velocity.max(0.0),
            double_tap_timeout: Duration::from_millis(g.double_tap_timeout_ms),
            pinch_threshold: g.pinch_threshold.max(1.0),
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self { Self::from_settings(&GestureSettings::default()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawerState {
    #[default]
    Closed,
    Open,
}

bitflags! {
    /// Surfaces shown above the home grid that swallow home gestures.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
    pub struct Overlays: u8 {
        const SEARCH       = 1 << 0;
        const CONTEXT_MENU = 1 << 1;
    }
}

/// State of the surfaces around the recognizer at the time of an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureContext {
    pub viewport: Viewport,
    pub drawer: DrawerState,
    pub overlays: Overlays,
    /// Whether the drawer's list is scrolled to its first row.
    pub drawer_at_top: bool,
}

impl GestureContext {
    pub fn home(viewport: Viewport) -> Self {
        Self {
            viewport,
            drawer: DrawerState::Closed,
            overlays: Overlays::empty(),
            drawer_at_top: true,
        }
    }

    fn on_idle_home(&self) -> bool { self.drawer == DrawerState::Closed && self.overlays.is_empty() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub pos: Point,
    /// Monotonic timestamp of the event.
    pub time: Duration,
    /// Release velocity when the host tracks it.
    pub velocity: Option<Velocity>,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: f64, y: f64, time_ms: u64) -> Self {
        Self {
            kind,
            pos: Point::new(x, y),
            time: Duration::from_millis(time_ms),
            velocity: None,
        }
    }

    pub fn with_velocity(mut self, velocity: Velocity) -> Self {
        self.velocity = Some(velocity);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// How far open the drawer is, `0.0` closed to `1.0` open.
    DrawerProgress(f64),
    /// The drawer should animate to this state and report back with a
    /// settle-finished event.
    DrawerCommit(DrawerState),
    /// Abandon the drag and return to this state.
    DrawerSnapBack(DrawerState),
    Action(GestureAction),
}

/// Routes pointer events to the individual detectors.
///
/// With the drawer open, events drive the dismiss drag. Otherwise they go to
/// the drawer drag, and a release that did not drag the drawer is offered to
/// the fling classifier and then the double-tap detector.
#[derive(Debug)]
pub struct GestureRecognizer {
    config: GestureConfig,
    drawer_drag: DrawerDrag,
    dismiss: DismissDrag,
    swipe: SwipeClassifier,
    double_tap: DoubleTapDetector,
    pinch: PinchClassifier,
    velocity: VelocityTracker,
    down: Option<Point>,
    moved: bool,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            drawer_drag: DrawerDrag::new(config.drag),
            dismiss: DismissDrag::new(config.dismiss),
            swipe: SwipeClassifier::new(config.touch_slop, config.min_fling_velocity),
            double_tap: DoubleTapDetector::new(config.double_tap_timeout),
            pinch: PinchClassifier::new(config.pinch_threshold),
            velocity: VelocityTracker::default(),
            down: None,
            moved: false,
            config,
        }
    }

    pub fn config(&self) -> &GestureConfig { &self.config }

    /// Applies new thresholds and bindings. An in-flight drag keeps going
    /// with the new values.
    pub fn set_config(&mut self, config: GestureConfig) {
        self.drawer_drag.set_thresholds(config.drag);
        self.dismiss.set_thresholds(config.dismiss);
        self.swipe = SwipeClassifier::new(config.touch_slop, config.min_fling_velocity);
        self.double_tap.set_timeout(config.double_tap_timeout);
        self.pinch = PinchClassifier::new(config.pinch_threshold);
        self.config = config;
    }

    pub fn drag_phase(&self) -> DragPhase { self.drawer_drag.phase() }

    pub fn dismiss_phase(&self) -> DismissPhase { self.dismiss.phase() }

    pub fn is_settling(&self) -> bool {
        matches!(self.drawer_drag.phase(), DragPhase::Committing { .. })
            || matches!(self.dismiss.phase(), DismissPhase::Committing { .. })
    }

    pub fn on_pointer(&mut self, event: PointerEvent, ctx: &GestureContext) -> Vec<GestureOutcome> {
        trace!(kind = ?event.kind, x = event.pos.x, y = event.pos.y, "pointer");
        let mut out = Vec::new();
        match event.kind {
            PointerKind::Down => self.pointer_down(event, ctx),
            PointerKind::Move => {
                self.velocity.add(event.time, event.pos);
                if let Some(down) = self.down {
                    let (dx, dy) = (event.pos.x - down.x, event.pos.y - down.y);
                    if dx.hypot(dy) > self.config.touch_slop {
                        self.moved = true;
                    }
                }
                let progress = if self.dismiss.is_active() {
                    self.dismiss.on_move(event.pos, ctx.viewport)
                } else {
                    self.drawer_drag.on_move(event.pos, ctx.viewport)
                };
                out.extend(progress.map(GestureOutcome::DrawerProgress));
            }
            PointerKind::Up => {
                self.velocity.add(event.time, event.pos);
                let velocity = event.velocity.unwrap_or_else(|| self.velocity.velocity());
                self.pointer_up(event, velocity, ctx, &mut out);
                self.down = None;
            }
            PointerKind::Cancel => {
                out.extend(self.drawer_drag.cancel().map(GestureOutcome::DrawerSnapBack));
                out.extend(self.dismiss.cancel().map(GestureOutcome::DrawerSnapBack));
                self.double_tap.reset();
                self.velocity.clear();
                self.down = None;
                self.moved = false;
            }
        }
        if !out.is_empty() {
            debug!(?out, "gesture outcome");
        }
        out
    }

    fn pointer_down(&mut self, event: PointerEvent, ctx: &GestureContext) {
        self.velocity.clear();
        self.velocity.add(event.time, event.pos);
        self.down = Some(event.pos);
        self.moved = false;

        match ctx.drawer {
            DrawerState::Open => {
                if ctx.drawer_at_top && ctx.overlays.is_empty() {
                    self.dismiss.begin(event.pos);
                }
            }
            DrawerState::Closed => {
                let drawer_bound = self.config.bindings.swipe_up == GestureAction::AppDrawer;
                if drawer_bound && ctx.on_idle_home() {
                    self.drawer_drag.arm(event.pos, ctx.viewport);
                }
            }
        }
    }

    fn pointer_up(
        &mut self,
        event: PointerEvent,
        velocity: Velocity,
        ctx: &GestureContext,
        out: &mut Vec<GestureOutcome>,
    ) {
        if self.dismiss.is_active() {
            out.extend(self.dismiss.release(event.pos, ctx.viewport));
            return;
        }
        if let Some(target) = self.drawer_drag.release(velocity.y) {
            out.push(GestureOutcome::DrawerCommit(target));
            self.double_tap.reset();
            return;
        }
        if !ctx.on_idle_home() {
            return;
        }

        let fling = self.down.and_then(|down| self.swipe.classify(down, event.pos, velocity));
        if let Some(direction) = fling {
            self.double_tap.reset();
            let action = self.config.bindings.for_swipe(direction);
            debug!(?direction, %action, "fling");
            if action != GestureAction::None {
                out.push(GestureOutcome::Action(action));
            }
            return;
        }

        if self.moved {
            self.double_tap.reset();
        } else if self.double_tap.on_tap(event.time) {
            let action = self.config.bindings.double_tap;
            if action != GestureAction::None {
                out.push(GestureOutcome::Action(action));
            }
        }
    }

    /// A finished scale gesture with its cumulative scale factor.
    pub fn on_pinch(&mut self, scale: f64, ctx: &GestureContext) -> Option<GestureOutcome> {
        if !ctx.on_idle_home() {
            return None;
        }
        let direction = self.pinch.classify(scale)?;
        let action = self.config.bindings.for_pinch(direction);
        debug!(scale, ?direction, %action, "pinch");
        (action != GestureAction::None).then_some(GestureOutcome::Action(action))
    }

    /// The drawer animation ended. Returns the state it settled in.
    pub fn settle_finished(&mut self) -> Option<DrawerState> {
        self.drawer_drag.settle_finished().or_else(|| self.dismiss.settle_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Viewport = Viewport::new(1000.0, 2000.0);

    fn recognizer() -> GestureRecognizer { GestureRecognizer::new(GestureConfig::default()) }

    fn ev(kind: PointerKind, x: f64, y: f64, t: u64) -> PointerEvent { PointerEvent::new(kind, x, y, t) }

    #[test]
    fn drag_up_from_bottom_opens_drawer() {
        let mut r = recognizer();
        let ctx = GestureContext::home(VIEW);
        assert!(r.on_pointer(ev(PointerKind::Down, 500.0, 1900.0, 0), &ctx).is_empty());
        assert!(matches!(r.drag_phase(), DragPhase::ArmedForDrag { .. }));

        let out = r.on_pointer(ev(PointerKind::Move, 500.0, 1500.0, 100), &ctx);
        assert_eq!(out, vec![GestureOutcome::DrawerProgress(0.2)]);

        r.on_pointer(ev(PointerKind::Move, 500.0, 1100.0, 400), &ctx);
        let out = r.on_pointer(ev(PointerKind::Up, 500.0, 1100.0, 800), &ctx);
        assert_eq!(out, vec![GestureOutcome::DrawerCommit(DrawerState::Open)]);
        assert!(r.is_settling());

        assert_eq!(r.settle_finished(), Some(DrawerState::Open));
        assert_eq!(r.drag_phase(), DragPhase::Idle);
        assert_eq!(r.settle_finished(), None);
    }

    #[test]
    fn drag_not_armed_outside_trigger_zone_or_when_unbound() {
        let mut r = recognizer();
        let ctx = GestureContext::home(VIEW);
        r.on_pointer(ev(PointerKind::Down, 500.0, 1000.0, 0), &ctx);
        assert_eq!(r.drag_phase(), DragPhase::Idle);
        r.on_pointer(ev(PointerKind::Cancel, 500.0, 1000.0, 10), &ctx);

        let mut settings = GestureSettings::default();
        settings.swipe_up = GestureAction::Search;
        let mut r = GestureRecognizer::new(GestureConfig::from_settings(&settings));
        r.on_pointer(ev(PointerKind::Down, 500.0, 1900.0, 0), &ctx);
        assert_eq!(r.drag_phase(), DragPhase::Idle);

        let mut r = recognizer();
        let ctx = GestureContext { overlays: Overlays::SEARCH, ..GestureContext::home(VIEW) };
        r.on_pointer(ev(PointerKind::Down, 500.0, 1900.0, 0), &ctx);
        assert_eq!(r.drag_phase(), DragPhase::Idle);
    }

    #[test]
    fn fling_down_triggers_bound_action() {
        let mut r = recognizer();
        let ctx = GestureContext::home(VIEW);
        r.on_pointer(ev(PointerKind::Down, 500.0, 300.0, 0), &ctx);
        r.on_pointer(ev(PointerKind::Move, 505.0, 500.0, 50), &ctx);
        let out = r.on_pointer(ev(PointerKind::Up, 505.0, 700.0, 100), &ctx);
        assert_eq!(out, vec![GestureOutcome::Action(GestureAction::Notifications)]);
    }

    #[test]
    fn fling_up_above_trigger_zone_opens_drawer_action() {
        let mut r = recognizer();
        let ctx = GestureContext::home(VIEW);
        r.on_pointer(ev(PointerKind::Down, 500.0, 1000.0, 0), &ctx);
        let up = ev(PointerKind::Up, 500.0, 700.0, 100).with_velocity(Velocity::new(0.0, -3000.0));
        let out = r.on_pointer(up, &ctx);
        assert_eq!(out, vec![GestureOutcome::Action(GestureAction::AppDrawer)]);
    }

    #[test]
    fn double_tap_fires_once_per_pair() {
        let mut settings = GestureSettings::default();
        settings.double_tap = GestureAction::Search;
        let mut r = GestureRecognizer::new(GestureConfig::from_settings(&settings));
        let ctx = GestureContext::home(VIEW);

        let tap = |r: &mut GestureRecognizer, t: u64| {
            r.on_pointer(ev(PointerKind::Down, 400.0, 400.0, t), &ctx);
            r.on_pointer(ev(PointerKind::Up, 400.0, 400.0, t + 40), &ctx)
        };
        assert!(tap(&mut r, 0).is_empty());
        assert_eq!(tap(&mut r, 150), vec![GestureOutcome::Action(GestureAction::Search)]);
        assert!(tap(&mut r, 300).is_empty());
        assert!(tap(&mut r, 1000).is_empty());
        assert_eq!(tap(&mut r, 1100), vec![GestureOutcome::Action(GestureAction::Search)]);
    }

    #[test]
    fn unbound_double_tap_is_silent() {
        let mut r = recognizer();
        let ctx = GestureContext::home(VIEW);
        for t in [0, 100] {
            r.on_pointer(ev(PointerKind::Down, 400.0, 400.0, t), &ctx);
            assert!(r.on_pointer(ev(PointerKind::Up, 400.0, 400.0, t + 20), &ctx).is_empty());
        }
    }

    #[test]
    fn dismiss_drag_closes_open_drawer() {
        let mut r = recognizer();
        let ctx = GestureContext { drawer: DrawerState::Open, ..GestureContext::home(VIEW) };
        r.on_pointer(ev(PointerKind::Down, 500.0, 200.0, 0), &ctx);
        let out = r.on_pointer(ev(PointerKind::Move, 500.0, 300.0, 50), &ctx);
        assert_eq!(out, vec![GestureOutcome::DrawerProgress(1.0 - 90.0 / 2000.0)]);
        r.on_pointer(ev(PointerKind::Move, 500.0, 900.0, 150), &ctx);
        let out = r.on_pointer(ev(PointerKind::Up, 500.0, 900.0, 200), &ctx);
        assert_eq!(out, vec![GestureOutcome::DrawerCommit(DrawerState::Closed)]);
        assert_eq!(r.settle_finished(), Some(DrawerState::Closed));
    }

    #[test]
    fn cancel_snaps_back() {
        let mut r = recognizer();
        let ctx = GestureContext::home(VIEW);
        r.on_pointer(ev(PointerKind::Down, 500.0, 1900.0, 0), &ctx);
        r.on_pointer(ev(PointerKind::Move, 500.0, 1400.0, 50), &ctx);
        let out = r.on_pointer(ev(PointerKind::Cancel, 500.0, 1400.0, 60), &ctx);
        assert_eq!(out, vec![GestureOutcome::DrawerSnapBack(DrawerState::Closed)]);
        assert_eq!(r.drag_phase(), DragPhase::Idle);
    }

    #[test]
    fn pinch_maps_to_bindings() {
        let mut settings = GestureSettings::default();
        settings.pinch_in = GestureAction::ExpandNotifications;
        let mut r = GestureRecognizer::new(GestureConfig::from_settings(&settings));
        let ctx = GestureContext::home(VIEW);
        assert_eq!(
            r.on_pinch(0.5, &ctx),
            Some(GestureOutcome::Action(GestureAction::ExpandNotifications))
        );
        assert_eq!(r.on_pinch(2.0, &ctx), None);
        assert_eq!(r.on_pinch(1.1, &ctx), None);
    }

    #[test]
    fn action_names() {
        assert_eq!(GestureAction::ExpandNotifications.to_string(), "expand_notifications");
        assert_eq!("app_drawer".parse::<GestureAction>().unwrap(), GestureAction::AppDrawer);
    }
}
