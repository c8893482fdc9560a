use tracing::debug;

use crate::actor::reactor::{Reactor, ViewEvent};
use crate::layout_engine::{LayoutCommand, PlacementId, Point, Viewport, cell_at};
use crate::model::Item;

pub struct HomeEventHandler;

impl HomeEventHandler {
    pub fn handle_drop(reactor: &mut Reactor, item: Item, point: Point) {
        let cell = cell_at(point, reactor.layout.grid(), reactor.viewport);
        let page = reactor.current_page;
        debug!(%item, page, %cell, "drop on home");
        let _ = reactor.apply_layout(LayoutCommand::Place { item, page, cell });
    }

    pub fn handle_move(reactor: &mut Reactor, id: PlacementId, point: Point) {
        let cell = cell_at(point, reactor.layout.grid(), reactor.viewport);
        let page = reactor.current_page;
        let _ = reactor.apply_layout(LayoutCommand::Move { id, page, cell });
    }

    pub fn handle_add(reactor: &mut Reactor, item: Item) {
        let _ = reactor.apply_layout(LayoutCommand::AddAtFirstFreeSlot(item));
    }

    pub fn handle_remove(reactor: &mut Reactor, id: PlacementId) {
        let _ = reactor.apply_layout(LayoutCommand::Remove(id));
    }

    /// Selecting one past the last page is allowed so that a drop can start a
    /// new page.
    pub fn handle_page_selected(reactor: &mut Reactor, page: u32) {
        let page = page.min(reactor.layout.page_count());
        if page != reactor.current_page {
            reactor.current_page = page;
            reactor.emit(ViewEvent::RefreshPage(page));
        }
    }

    pub fn handle_viewport_changed(reactor: &mut Reactor, viewport: Viewport) {
        if viewport != reactor.viewport {
            reactor.viewport = viewport;
            reactor.emit(ViewEvent::RefreshPage(reactor.current_page));
        }
    }
}
