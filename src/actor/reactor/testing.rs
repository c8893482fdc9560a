use super::*;
use crate::catalog::IconHandle;
use crate::gesture::PointerKind;
use crate::model::{AppId, MemoryStore};

/// 4x5 cells of 100x100 px.
pub const TEST_VIEWPORT: Viewport = Viewport::new(400.0, 500.0);

impl Reactor {
    pub fn new_for_test(store: MemoryStore) -> (Reactor, ViewReceiver) {
        let (view_tx, view_rx) = actor::channel();
        let reactor =
            Reactor::new(Config::default(), Box::new(store), view_tx).with_viewport(TEST_VIEWPORT);
        (reactor, view_rx)
    }

    /// Stands in for the catalog worker; queries show up on the returned
    /// receiver.
    pub fn attach_catalog_for_test(&mut self) -> catalog::Receiver {
        let (tx, rx) = actor::channel();
        self.catalog_tx = Some(tx);
        rx
    }

    pub fn handle_events(&mut self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.handle_event(event);
        }
    }
}

pub fn drain(rx: &mut ViewReceiver) -> Vec<ViewEvent> {
    let mut out = Vec::new();
    while let Ok((_, event)) = rx.try_recv() {
        out.push(event);
    }
    out
}

pub fn queries(rx: &mut catalog::Receiver) -> Vec<u64> {
    let mut out = Vec::new();
    while let Ok((_, request)) = rx.try_recv() {
        if let catalog::Request::Query { generation } = request {
            out.push(generation);
        }
    }
    out
}

pub fn app(name: &str) -> Item { Item::app(format!("com.example.{name}"), ".Main") }

pub fn entry(name: &str, label: &str) -> CatalogEntry {
    CatalogEntry {
        app: AppId::new(format!("com.example.{name}"), ".Main"),
        label: label.to_string(),
        icon: IconHandle(1),
        badge: 0,
        badge_text: None,
    }
}

pub fn pointer(kind: PointerKind, x: f64, y: f64, time_ms: u64) -> Event {
    Event::Pointer(PointerEvent::new(kind, x, y, time_ms))
}

/// Center of a cell in `TEST_VIEWPORT`.
pub fn cell_center(x: u32, y: u32) -> Point { Point::new(x as f64 * 100.0 + 50.0, y as f64 * 100.0 + 50.0) }
