use tracing::{debug, trace};

use crate::actor::reactor::{Reactor, ViewEvent};
use crate::gesture::{DrawerState, GestureAction, GestureOutcome, Overlays, PointerEvent};

pub struct GestureEventHandler;

impl GestureEventHandler {
    pub fn handle_pointer(reactor: &mut Reactor, event: PointerEvent) {
        let ctx = reactor.gesture_context();
        let outcomes = reactor.recognizer.on_pointer(event, &ctx);
        for outcome in outcomes {
            Self::apply_outcome(reactor, outcome);
        }
    }

    pub fn handle_pinch(reactor: &mut Reactor, scale: f64) {
        let ctx = reactor.gesture_context();
        if let Some(outcome) = reactor.recognizer.on_pinch(scale, &ctx) {
            Self::apply_outcome(reactor, outcome);
        }
    }

    pub fn handle_settle_finished(reactor: &mut Reactor) {
        match reactor.recognizer.settle_finished() {
            Some(state) => reactor.set_drawer_state(state),
            None => trace!("settle finished with no drawer commit in flight"),
        }
    }

    fn apply_outcome(reactor: &mut Reactor, outcome: GestureOutcome) {
        match outcome {
            GestureOutcome::DrawerProgress(progress) => {
                reactor.emit(ViewEvent::DrawerProgress(progress))
            }
            GestureOutcome::DrawerCommit(target) => {
                reactor.emit(ViewEvent::DrawerSettling(target))
            }
            GestureOutcome::DrawerSnapBack(state) => {
                reactor.set_drawer_state(state);
                reactor.emit(ViewEvent::DrawerSettling(state));
            }
            GestureOutcome::Action(action) => Self::run_action(reactor, action),
        }
    }

    pub fn run_action(reactor: &mut Reactor, action: GestureAction) {
        debug!(%action, "running gesture action");
        match action {
            GestureAction::None => {}
            GestureAction::AppDrawer => reactor.set_drawer_state(DrawerState::Open),
            GestureAction::Search => {
                if !reactor.overlays.contains(Overlays::SEARCH) {
                    reactor.overlays.insert(Overlays::SEARCH);
                    reactor.search_query.clear();
                    reactor.emit(ViewEvent::SearchOpened);
                    if reactor.drawer.is_empty() {
                        reactor.request_catalog();
                    }
                }
            }
            GestureAction::Notifications => {
                reactor.emit(ViewEvent::ShowNotifications { expand: false })
            }
            GestureAction::ExpandNotifications => {
                reactor.emit(ViewEvent::ShowNotifications { expand: true })
            }
        }
    }
}
