use tracing::{debug, warn};

use crate::actor::reactor::{Reactor, ViewEvent};
use crate::catalog::CatalogEntry;
use crate::gesture::{DrawerState, Overlays};

pub struct DrawerEventHandler;

impl DrawerEventHandler {
    pub fn handle_catalog_loaded(reactor: &mut Reactor, generation: u64, entries: Vec<CatalogEntry>) {
        if generation != reactor.catalog_generation {
            debug!(generation, latest = reactor.catalog_generation, "discarding stale catalog");
            return;
        }
        if reactor.drawer.replace(generation, entries, &reactor.badges) {
            Self::refresh(reactor);
        }
    }

    pub fn handle_badge_changed(reactor: &mut Reactor, package: String, count: u32) {
        reactor.badges.set(&package, count);
        if reactor.drawer.set_badge(&package, count) && reactor.config.settings.badges.show {
            reactor.emit(ViewEvent::CatalogUpdated(reactor.catalog_view()));
        }
    }

    pub fn handle_set_hidden(reactor: &mut Reactor, package: String, hidden: bool) {
        if !reactor.hidden.set_hidden(&package, hidden) {
            return;
        }
        debug!(package, hidden, "hidden apps changed");
        if let Some(path) = &reactor.hidden_path {
            if let Err(e) = reactor.hidden.save(path) {
                warn!(?path, "failed to save hidden apps: {e}");
            }
        }
        Self::refresh(reactor);
    }

    pub fn handle_search_query(reactor: &mut Reactor, query: String) {
        if !reactor.overlays.contains(Overlays::SEARCH) {
            reactor.overlays.insert(Overlays::SEARCH);
            reactor.emit(ViewEvent::SearchOpened);
        }
        reactor.search_query = query;
        reactor.emit(ViewEvent::SearchResults(reactor.search_results()));
    }

    /// Closes search first, then the drawer.
    pub fn handle_back_pressed(reactor: &mut Reactor) {
        if reactor.overlays.contains(Overlays::SEARCH) {
            reactor.overlays.remove(Overlays::SEARCH);
            reactor.search_query.clear();
            reactor.emit(ViewEvent::SearchClosed);
        } else if reactor.drawer_state == DrawerState::Open {
            reactor.set_drawer_state(DrawerState::Closed);
        }
    }

    pub(crate) fn refresh(reactor: &mut Reactor) {
        reactor.emit(ViewEvent::CatalogUpdated(reactor.catalog_view()));
        if reactor.overlays.contains(Overlays::SEARCH) && !reactor.search_query.is_empty() {
            reactor.emit(ViewEvent::SearchResults(reactor.search_results()));
        }
    }
}
