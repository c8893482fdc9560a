//! The reactor owns the session: the layout, the drawer, the gesture
//! recognizer and the badge counts.
//!
//! It takes events from the host and from the catalog worker, turns them into
//! layout mutations and drawer transitions, persists the layout after every
//! mutation and tells the view what to redraw. All of this happens on one
//! thread, so nothing in here is locked.

mod events;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, instrument, trace, warn};

use self::events::drawer::DrawerEventHandler;
use self::events::gesture::GestureEventHandler;
use self::events::home::HomeEventHandler;
use self::events::system::SystemEventHandler;
use crate::actor::{self, catalog};
use crate::catalog::{CatalogEntry, DrawerModel, PackageLister};
use crate::common::collections::BTreeMap;
use crate::common::config::Config;
use crate::gesture::{
    DrawerState, GestureConfig, GestureContext, GestureRecognizer, Overlays, PointerEvent,
};
use crate::layout_engine::{
    EventResponse, GridConfig, LayoutCommand, LayoutEngine, PlacementId, Point, Viewport,
};
use crate::model::{BadgeStore, HiddenSet, Item, PlacementStore};

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

pub type ViewSender = actor::Sender<ViewEvent>;
pub type ViewReceiver = actor::Receiver<ViewEvent>;

#[derive(Debug)]
pub enum Event {
    Pointer(PointerEvent),
    /// The drawer animation started by a commit has finished.
    SettleFinished,
    /// A finished pinch with its cumulative scale.
    Pinch { scale: f64 },

    /// An item dragged out of the drawer was released over the home grid.
    DropOnHome { item: Item, point: Point },
    /// An icon already on the home screen was dragged to `point` on the
    /// current page.
    MoveOnHome { id: PlacementId, point: Point },
    AddToHome(Item),
    RemovePlacement(PlacementId),
    PageSelected(u32),
    ViewportChanged(Viewport),
    DrawerScrolled { at_top: bool },

    RequestCatalog,
    CatalogLoaded { generation: u64, entries: Vec<CatalogEntry> },
    /// Something was installed or updated; the catalog is re-queried.
    PackagesChanged,
    PackageRemoved(String),
    BadgeChanged { package: String, count: u32 },
    SetHidden { package: String, hidden: bool },
    SearchQuery(String),
    BackPressed,

    ConfigChanged(Box<Config>),
    Shutdown,
}

/// What the view should redraw. Pages are always recomputed in full.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    RefreshPage(u32),
    PageCountChanged(u32),
    DrawerProgress(f64),
    /// The drawer is animating towards this state.
    DrawerSettling(DrawerState),
    DrawerChanged(DrawerState),
    SearchOpened,
    SearchClosed,
    SearchResults(Vec<CatalogEntry>),
    CatalogUpdated(BTreeMap<char, Vec<CatalogEntry>>),
    DrawerGridChanged(GridConfig),
    ShowNotifications { expand: bool },
    SaveFailed(String),
}

pub struct Reactor {
    config: Config,
    layout: LayoutEngine,
    store: Box<dyn PlacementStore>,
    hidden: HiddenSet,
    hidden_path: Option<PathBuf>,
    badges: BadgeStore,
    drawer: DrawerModel,
    recognizer: GestureRecognizer,
    viewport: Viewport,
    drawer_state: DrawerState,
    overlays: Overlays,
    drawer_at_top: bool,
    current_page: u32,
    search_query: String,
    catalog_tx: Option<catalog::Sender>,
    catalog_generation: u64,
    pending_save: bool,
    view_tx: ViewSender,
}

impl Reactor {
    /// Restores the layout from `store`. A store that cannot be read starts
    /// the session empty.
    pub fn new(mut config: Config, store: Box<dyn PlacementStore>, view_tx: ViewSender) -> Reactor {
        let fixes = config.auto_fix_values();
        if fixes > 0 {
            warn!(fixes, "config had invalid values, using defaults for them");
        }
        let grid = config.settings.home;
        let layout = match store.load() {
            Ok(items) => LayoutEngine::from_items(grid, items),
            Err(e) => {
                warn!("could not load placements, starting empty: {e}");
                LayoutEngine::new(grid)
            }
        };
        let recognizer = GestureRecognizer::new(GestureConfig::from_settings(&config.settings.gestures));
        Reactor {
            config,
            layout,
            store,
            hidden: HiddenSet::default(),
            hidden_path: None,
            badges: BadgeStore::new(),
            drawer: DrawerModel::new(),
            recognizer,
            viewport: Viewport::default(),
            drawer_state: DrawerState::Closed,
            overlays: Overlays::empty(),
            drawer_at_top: true,
            current_page: 0,
            search_query: String::new(),
            catalog_tx: None,
            catalog_generation: 0,
            pending_save: false,
            view_tx,
        }
    }

    /// Hidden packages, and the file changes to them are written to.
    pub fn with_hidden(mut self, hidden: HiddenSet, path: Option<PathBuf>) -> Self {
        self.hidden = hidden;
        self.hidden_path = path;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Handle for notification listeners to write badge counts through.
    /// Writes made this way show up on the next catalog refresh; send
    /// `BadgeChanged` to redraw immediately.
    pub fn badges(&self) -> BadgeStore { self.badges.clone() }

    pub fn layout(&self) -> &LayoutEngine { &self.layout }

    pub fn drawer_state(&self) -> DrawerState { self.drawer_state }

    pub fn current_page(&self) -> u32 { self.current_page }

    pub fn search_open(&self) -> bool { self.overlays.contains(Overlays::SEARCH) }

    pub fn has_pending_save(&self) -> bool { self.pending_save }

    /// Starts the catalog worker and the reactor thread.
    pub fn spawn(
        mut self,
        lister: Arc<dyn PackageLister>,
    ) -> std::io::Result<(Sender, JoinHandle<()>)> {
        let (events_tx, events) = actor::channel();
        let catalog_tx = catalog::CatalogWorker::new(lister, events_tx.clone()).spawn()?;
        self.catalog_tx = Some(catalog_tx);
        let handle = thread::Builder::new()
            .name("reactor".to_string())
            .spawn(move || self.run(events))?;
        Ok((events_tx, handle))
    }

    pub fn run(mut self, mut events: Receiver) {
        info!(
            placements = self.layout.len(),
            pages = self.layout.page_count(),
            "reactor started"
        );
        while let Some((span, event)) = events.blocking_recv() {
            let _guard = span.enter();
            let stop = matches!(event, Event::Shutdown);
            self.handle_event(event);
            if stop {
                break;
            }
        }
        info!("reactor stopped");
    }

    fn log_event(&self, event: &Event) {
        match event {
            Event::Pointer(..) | Event::DrawerScrolled { .. } => trace!(?event, "Event"),
            Event::CatalogLoaded { generation, entries } => {
                debug!(generation, count = entries.len(), "Event CatalogLoaded")
            }
            _ => debug!(?event, "Event"),
        }
    }

    #[instrument(name = "reactor::handle_event", skip_all)]
    pub fn handle_event(&mut self, event: Event) {
        self.log_event(&event);
        match event {
            Event::Pointer(pointer) => GestureEventHandler::handle_pointer(self, pointer),
            Event::SettleFinished => GestureEventHandler::handle_settle_finished(self),
            Event::Pinch { scale } => GestureEventHandler::handle_pinch(self, scale),
            Event::DropOnHome { item, point } => HomeEventHandler::handle_drop(self, item, point),
            Event::MoveOnHome { id, point } => HomeEventHandler::handle_move(self, id, point),
            Event::AddToHome(item) => HomeEventHandler::handle_add(self, item),
            Event::RemovePlacement(id) => HomeEventHandler::handle_remove(self, id),
            Event::PageSelected(page) => HomeEventHandler::handle_page_selected(self, page),
            Event::ViewportChanged(viewport) => {
                HomeEventHandler::handle_viewport_changed(self, viewport)
            }
            Event::DrawerScrolled { at_top } => self.drawer_at_top = at_top,
            Event::RequestCatalog | Event::PackagesChanged => self.request_catalog(),
            Event::CatalogLoaded { generation, entries } => {
                DrawerEventHandler::handle_catalog_loaded(self, generation, entries)
            }
            Event::PackageRemoved(package) => {
                SystemEventHandler::handle_package_removed(self, package)
            }
            Event::BadgeChanged { package, count } => {
                DrawerEventHandler::handle_badge_changed(self, package, count)
            }
            Event::SetHidden { package, hidden } => {
                DrawerEventHandler::handle_set_hidden(self, package, hidden)
            }
            Event::SearchQuery(query) => DrawerEventHandler::handle_search_query(self, query),
            Event::BackPressed => DrawerEventHandler::handle_back_pressed(self),
            Event::ConfigChanged(config) => SystemEventHandler::handle_config_changed(self, *config),
            Event::Shutdown => SystemEventHandler::handle_shutdown(self),
        }
    }

    fn gesture_context(&self) -> GestureContext {
        GestureContext {
            viewport: self.viewport,
            drawer: self.drawer_state,
            overlays: self.overlays,
            drawer_at_top: self.drawer_at_top,
        }
    }

    fn emit(&self, event: ViewEvent) {
        trace!(?event, "view");
        self.view_tx.send(event);
    }

    /// Applies a layout command, persists the result and refreshes every
    /// page it touched.
    fn apply_layout(&mut self, command: LayoutCommand) -> EventResponse {
        let pages_before = self.layout.page_count();
        let response = self.layout.handle_command(command);
        if response.is_empty() {
            return response;
        }
        if self.layout.page_count() != pages_before {
            self.emit(ViewEvent::PageCountChanged(self.layout.page_count()));
        }
        self.persist();
        for &page in &response.changed_pages {
            self.emit(ViewEvent::RefreshPage(page));
        }
        response
    }

    fn persist(&mut self) {
        let snapshot = self.layout.snapshot();
        match self.store.save(&snapshot) {
            Ok(()) => {
                if self.pending_save {
                    info!("placements saved after earlier failure");
                }
                self.pending_save = false;
            }
            Err(e) => {
                warn!("failed to save placements: {e}");
                self.pending_save = true;
                self.emit(ViewEvent::SaveFailed(e.to_string()));
            }
        }
    }

    fn request_catalog(&mut self) {
        let Some(tx) = &self.catalog_tx else {
            debug!("no catalog worker, ignoring catalog request");
            return;
        };
        self.catalog_generation += 1;
        trace!(generation = self.catalog_generation, "requesting catalog");
        tx.send(catalog::Request::Query { generation: self.catalog_generation });
    }

    /// Applies the badge display settings to entries bound for the view.
    fn decorate<'a>(&self, entries: impl IntoIterator<Item = &'a mut CatalogEntry>) {
        let badges = &self.config.settings.badges;
        for entry in entries {
            if !badges.show {
                entry.badge = 0;
            }
            entry.badge_text = badges.label(entry.badge);
        }
    }

    fn catalog_view(&self) -> BTreeMap<char, Vec<CatalogEntry>> {
        let mut grouped = self.drawer.grouped(&self.hidden);
        self.decorate(grouped.values_mut().flatten());
        grouped
    }

    fn search_results(&self) -> Vec<CatalogEntry> {
        let mut results = self.drawer.search(&self.search_query, &self.hidden);
        self.decorate(&mut results);
        results
    }

    fn set_drawer_state(&mut self, state: DrawerState) {
        if self.drawer_state == state {
            return;
        }
        self.drawer_state = state;
        self.drawer_at_top = true;
        self.emit(ViewEvent::DrawerChanged(state));
        if state == DrawerState::Open && self.drawer.is_empty() {
            self.request_catalog();
        }
    }
}

#[cfg(test)]
pub mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::testing::*;
    use super::*;
    use crate::catalog::{IconHandle, LaunchableApp};
    use crate::gesture::{GestureAction, PointerKind};
    use crate::model::{AppId, Cell, MemoryStore};

    fn refreshed(events: &[ViewEvent]) -> Vec<u32> {
        events
            .iter()
            .filter_map(|e| match e {
                ViewEvent::RefreshPage(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn adds_fill_the_first_row_and_persist() {
        let store = MemoryStore::new();
        let (mut reactor, mut view) = Reactor::new_for_test(store.clone());

        reactor.handle_events(["a", "b", "c", "d", "e"].map(|n| Event::AddToHome(app(n))));
        assert_eq!(refreshed(&drain(&mut view)), vec![0, 0, 0, 0, 0]);
        assert_eq!(store.save_count(), 5);

        let saved = store.load().unwrap();
        let cells: Vec<Cell> = saved.iter().map(|p| p.cell()).collect();
        assert_eq!(
            cells,
            vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(2, 0), Cell::new(3, 0), Cell::new(0, 1)]
        );

        reactor.handle_event(Event::DropOnHome { item: app("f"), point: cell_center(0, 0) });
        let saved = store.load().unwrap();
        assert_eq!(saved.len(), 5);
        assert_eq!(saved[0], app("f").at(0, Cell::new(0, 0)));
        assert!(!saved.contains(&app("a").at(0, Cell::new(0, 0))));
    }

    #[test]
    fn layout_is_restored_from_the_store() {
        let items = vec![app("a").at(0, Cell::new(1, 1)), app("b").at(1, Cell::new(0, 0))];
        let store = MemoryStore::with_items(&items).unwrap();
        let (reactor, _view) = Reactor::new_for_test(store);
        assert_eq!(reactor.layout().snapshot(), items);
        assert_eq!(reactor.layout().page_count(), 2);
    }

    #[test]
    fn unreadable_store_starts_empty() {
        let (mut reactor, _view) = Reactor::new_for_test(MemoryStore::with_blob("{not json"));
        assert!(reactor.layout().is_empty());
        reactor.handle_event(Event::AddToHome(app("a")));
        assert_eq!(reactor.layout().len(), 1);
    }

    #[test]
    fn failed_save_is_retried() {
        let store = MemoryStore::new();
        let (mut reactor, mut view) = Reactor::new_for_test(store.clone());

        store.set_failing(true);
        reactor.handle_event(Event::AddToHome(app("a")));
        let events = drain(&mut view);
        assert!(events.iter().any(|e| matches!(e, ViewEvent::SaveFailed(_))));
        assert!(reactor.has_pending_save());
        assert_eq!(reactor.layout().len(), 1);

        store.set_failing(false);
        reactor.handle_event(Event::AddToHome(app("b")));
        assert!(!reactor.has_pending_save());
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn pending_save_is_flushed_on_shutdown() {
        let store = MemoryStore::new();
        let (mut reactor, _view) = Reactor::new_for_test(store.clone());
        store.set_failing(true);
        reactor.handle_event(Event::AddToHome(app("a")));
        store.set_failing(false);

        reactor.handle_event(Event::Shutdown);
        assert!(!reactor.has_pending_save());
        assert_eq!(store.load().unwrap(), vec![app("a").at(0, Cell::new(0, 0))]);
    }

    #[test]
    fn moving_within_the_page_evicts_the_target() {
        let store = MemoryStore::new();
        let (mut reactor, mut view) = Reactor::new_for_test(store.clone());
        reactor.handle_events([Event::AddToHome(app("a")), Event::AddToHome(app("b"))]);
        let a = reactor.layout().occupant_at(0, Cell::new(0, 0)).unwrap();
        drain(&mut view);

        reactor.handle_event(Event::MoveOnHome { id: a, point: cell_center(1, 0) });
        assert_eq!(store.load().unwrap(), vec![app("a").at(0, Cell::new(1, 0))]);
        assert_eq!(refreshed(&drain(&mut view)), vec![0]);
    }

    #[test]
    fn dropping_past_the_last_page_grows_one_page() {
        let (mut reactor, mut view) = Reactor::new_for_test(MemoryStore::new());
        reactor.handle_event(Event::PageSelected(5));
        assert_eq!(reactor.current_page(), 1);
        drain(&mut view);

        reactor.handle_event(Event::DropOnHome { item: app("a"), point: Point::new(-5.0, 9000.0) });
        assert_eq!(
            drain(&mut view),
            vec![ViewEvent::PageCountChanged(2), ViewEvent::RefreshPage(1)]
        );
        assert_eq!(reactor.layout().snapshot(), vec![app("a").at(1, Cell::new(0, 4))]);
    }

    #[test]
    fn removing_keeps_the_page() {
        let (mut reactor, _view) = Reactor::new_for_test(MemoryStore::new());
        reactor.handle_event(Event::PageSelected(1));
        reactor.handle_event(Event::DropOnHome { item: app("a"), point: cell_center(0, 0) });
        let id = reactor.layout().occupant_at(1, Cell::new(0, 0)).unwrap();
        reactor.handle_event(Event::RemovePlacement(id));
        assert!(reactor.layout().is_empty());
        assert_eq!(reactor.layout().page_count(), 2);
    }

    #[test]
    fn dragging_up_opens_the_drawer() {
        let (mut reactor, mut view) = Reactor::new_for_test(MemoryStore::new());
        let mut catalog = reactor.attach_catalog_for_test();

        reactor.handle_events([
            pointer(PointerKind::Down, 200.0, 480.0, 0),
            pointer(PointerKind::Move, 200.0, 300.0, 50),
            pointer(PointerKind::Up, 200.0, 300.0, 100),
        ]);
        let events = drain(&mut view);
        assert!(matches!(events[0], ViewEvent::DrawerProgress(p) if p > 0.3));
        assert_eq!(events[1], ViewEvent::DrawerSettling(DrawerState::Open));
        assert_eq!(reactor.drawer_state(), DrawerState::Closed);

        reactor.handle_event(Event::SettleFinished);
        assert_eq!(drain(&mut view), vec![ViewEvent::DrawerChanged(DrawerState::Open)]);
        assert_eq!(reactor.drawer_state(), DrawerState::Open);
        assert_eq!(queries(&mut catalog), vec![1]);

        reactor.handle_event(Event::SettleFinished);
        assert!(drain(&mut view).is_empty());
    }

    #[test]
    fn short_drag_settles_closed() {
        let (mut reactor, mut view) = Reactor::new_for_test(MemoryStore::new());
        reactor.handle_events([
            pointer(PointerKind::Down, 200.0, 480.0, 0),
            pointer(PointerKind::Move, 200.0, 450.0, 400),
            pointer(PointerKind::Up, 200.0, 450.0, 800),
            Event::SettleFinished,
        ]);
        let events = drain(&mut view);
        assert!(events.contains(&ViewEvent::DrawerSettling(DrawerState::Closed)));
        assert_eq!(reactor.drawer_state(), DrawerState::Closed);
    }

    #[test]
    fn stale_catalog_results_are_discarded() {
        let (mut reactor, mut view) = Reactor::new_for_test(MemoryStore::new());
        let mut catalog = reactor.attach_catalog_for_test();
        reactor.handle_events([Event::RequestCatalog, Event::RequestCatalog]);
        assert_eq!(queries(&mut catalog), vec![1, 2]);

        reactor.handle_event(Event::CatalogLoaded { generation: 1, entries: vec![entry("old", "Old")] });
        assert!(drain(&mut view).is_empty());

        reactor.handle_event(Event::CatalogLoaded {
            generation: 2,
            entries: vec![entry("b", "beta"), entry("a", "Alpha")],
        });
        let events = drain(&mut view);
        let [ViewEvent::CatalogUpdated(groups)] = events.as_slice() else {
            panic!("unexpected {events:?}");
        };
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec!['A', 'B']);
    }

    #[test]
    fn hidden_apps_leave_the_drawer_but_not_the_home_screen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hidden.ron");
        let (reactor, mut view) = Reactor::new_for_test(MemoryStore::new());
        let mut reactor = reactor.with_hidden(HiddenSet::new(), Some(path.clone()));
        reactor.attach_catalog_for_test();

        reactor.handle_events([
            Event::AddToHome(app("a")),
            Event::RequestCatalog,
            Event::CatalogLoaded { generation: 1, entries: vec![entry("a", "Alpha"), entry("b", "Beta")] },
        ]);
        drain(&mut view);

        reactor.handle_event(Event::SetHidden { package: "com.example.a".into(), hidden: true });
        let events = drain(&mut view);
        let [ViewEvent::CatalogUpdated(groups)] = events.as_slice() else {
            panic!("unexpected {events:?}");
        };
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec!['B']);
        assert_eq!(reactor.layout().len(), 1);
        assert!(HiddenSet::load(&path).unwrap().contains("com.example.a"));

        reactor.handle_event(Event::SetHidden { package: "com.example.a".into(), hidden: true });
        assert!(drain(&mut view).is_empty());
    }

    #[test]
    fn search_and_back_press() {
        let (mut reactor, mut view) = Reactor::new_for_test(MemoryStore::new());
        reactor.attach_catalog_for_test();
        reactor.handle_events([
            Event::RequestCatalog,
            Event::CatalogLoaded { generation: 1, entries: vec![entry("mail", "Inbox"), entry("calc", "Calculator")] },
        ]);
        GestureEventHandler::run_action(&mut reactor, GestureAction::AppDrawer);
        drain(&mut view);

        reactor.handle_event(Event::SearchQuery("CALC".into()));
        let events = drain(&mut view);
        assert_eq!(events[0], ViewEvent::SearchOpened);
        assert_eq!(events[1], ViewEvent::SearchResults(vec![entry("calc", "Calculator")]));

        reactor.handle_event(Event::SearchQuery(String::new()));
        assert_eq!(drain(&mut view), vec![ViewEvent::SearchResults(vec![])]);

        reactor.handle_event(Event::BackPressed);
        assert_eq!(drain(&mut view), vec![ViewEvent::SearchClosed]);
        assert_eq!(reactor.drawer_state(), DrawerState::Open);

        reactor.handle_event(Event::BackPressed);
        assert_eq!(drain(&mut view), vec![ViewEvent::DrawerChanged(DrawerState::Closed)]);

        reactor.handle_event(Event::BackPressed);
        assert!(drain(&mut view).is_empty());
    }

    #[test]
    fn uninstall_removes_icons_entries_and_badge() {
        let store = MemoryStore::new();
        let (mut reactor, mut view) = Reactor::new_for_test(store.clone());
        reactor.attach_catalog_for_test();
        let badges = reactor.badges();
        reactor.handle_events([
            Event::AddToHome(app("a")),
            Event::AddToHome(app("b")),
            Event::PageSelected(1),
            Event::DropOnHome { item: app("a"), point: cell_center(2, 2) },
            Event::RequestCatalog,
            Event::CatalogLoaded { generation: 1, entries: vec![entry("a", "Alpha"), entry("b", "Beta")] },
            Event::BadgeChanged { package: "com.example.a".into(), count: 3 },
        ]);
        assert_eq!(badges.get("com.example.a"), 3);
        drain(&mut view);

        reactor.handle_event(Event::PackageRemoved("com.example.a".into()));
        assert_eq!(store.load().unwrap(), vec![app("b").at(0, Cell::new(1, 0))]);
        assert_eq!(badges.get("com.example.a"), 0);
        let events = drain(&mut view);
        assert_eq!(refreshed(&events), vec![0, 1]);
        assert!(events.iter().any(|e| matches!(e, ViewEvent::CatalogUpdated(g) if g.len() == 1)));
    }

    #[test]
    fn badges_are_shown_and_cleared_on_shutdown() {
        let (mut reactor, mut view) = Reactor::new_for_test(MemoryStore::new());
        reactor.attach_catalog_for_test();
        let badges = reactor.badges();
        badges.set("com.example.a", 120);
        reactor.handle_events([
            Event::RequestCatalog,
            Event::CatalogLoaded { generation: 1, entries: vec![entry("a", "Alpha")] },
        ]);
        let events = drain(&mut view);
        let [ViewEvent::CatalogUpdated(groups)] = events.as_slice() else {
            panic!("unexpected {events:?}");
        };
        assert_eq!(groups[&'A'][0].badge, 120);
        assert_eq!(groups[&'A'][0].badge_text.as_deref(), Some("99+"));

        reactor.handle_event(Event::Shutdown);
        assert!(badges.is_empty());
    }

    #[test]
    fn config_changes_apply_live() {
        let (mut reactor, mut view) = Reactor::new_for_test(MemoryStore::new());
        reactor.handle_events([Event::AddToHome(app("a")), Event::PageSelected(1)]);
        reactor.handle_event(Event::DropOnHome { item: app("far"), point: cell_center(3, 4) });
        drain(&mut view);

        let mut config = Config::default();
        config.settings.home = GridConfig::new(3, 3);
        config.settings.gestures.swipe_down = GestureAction::Search;
        reactor.handle_event(Event::ConfigChanged(Box::new(config)));
        assert_eq!(refreshed(&drain(&mut view)), vec![0, 1]);
        assert_eq!(reactor.layout().len(), 2);
        assert_eq!(reactor.layout().grid(), GridConfig::new(3, 3));

        reactor.handle_events([
            pointer(PointerKind::Down, 200.0, 100.0, 0),
            pointer(PointerKind::Move, 200.0, 200.0, 40),
            pointer(PointerKind::Up, 200.0, 300.0, 80),
        ]);
        assert_eq!(drain(&mut view), vec![ViewEvent::SearchOpened]);
        assert!(reactor.search_open());
    }

    #[test]
    fn pinch_runs_its_binding() {
        let (mut reactor, mut view) = Reactor::new_for_test(MemoryStore::new());
        reactor.handle_event(Event::Pinch { scale: 0.5 });
        assert!(drain(&mut view).is_empty());

        let mut config = Config::default();
        config.settings.gestures.pinch_in = GestureAction::ExpandNotifications;
        reactor.handle_events([Event::ConfigChanged(Box::new(config)), Event::Pinch { scale: 0.5 }]);
        assert_eq!(drain(&mut view), vec![ViewEvent::ShowNotifications { expand: true }]);

        reactor.handle_event(Event::Pinch { scale: 1.1 });
        assert!(drain(&mut view).is_empty());
    }

    #[test]
    fn viewport_change_redraws_current_page() {
        let (mut reactor, mut view) = Reactor::new_for_test(MemoryStore::new());
        reactor.handle_event(Event::ViewportChanged(TEST_VIEWPORT));
        assert!(drain(&mut view).is_empty());

        reactor.handle_event(Event::ViewportChanged(Viewport::new(800.0, 1000.0)));
        assert_eq!(drain(&mut view), vec![ViewEvent::RefreshPage(0)]);
        reactor.handle_event(Event::DropOnHome { item: app("a"), point: Point::new(250.0, 250.0) });
        assert_eq!(reactor.layout().snapshot(), vec![app("a").at(0, Cell::new(1, 1))]);
    }

    #[test]
    fn scrolled_drawer_is_not_dismissed() {
        let (mut reactor, mut view) = Reactor::new_for_test(MemoryStore::new());
        GestureEventHandler::run_action(&mut reactor, GestureAction::AppDrawer);
        reactor.handle_event(Event::DrawerScrolled { at_top: false });
        drain(&mut view);

        reactor.handle_events([
            pointer(PointerKind::Down, 200.0, 50.0, 0),
            pointer(PointerKind::Move, 200.0, 450.0, 50),
            pointer(PointerKind::Up, 200.0, 450.0, 100),
        ]);
        assert!(drain(&mut view).is_empty());
        assert_eq!(reactor.drawer_state(), DrawerState::Open);

        reactor.handle_events([
            Event::DrawerScrolled { at_top: true },
            pointer(PointerKind::Down, 200.0, 50.0, 200),
            pointer(PointerKind::Move, 200.0, 450.0, 250),
            pointer(PointerKind::Up, 200.0, 450.0, 300),
        ]);
        let events = drain(&mut view);
        assert_eq!(events.last(), Some(&ViewEvent::DrawerSettling(DrawerState::Closed)));
        reactor.handle_event(Event::SettleFinished);
        assert_eq!(reactor.drawer_state(), DrawerState::Closed);
    }

    #[test]
    fn badge_display_settings_shape_the_catalog() {
        let (mut reactor, mut view) = Reactor::new_for_test(MemoryStore::new());
        reactor.attach_catalog_for_test();
        reactor.handle_events([
            Event::RequestCatalog,
            Event::CatalogLoaded { generation: 1, entries: vec![entry("a", "Alpha")] },
        ]);
        drain(&mut view);

        let mut config = Config::default();
        config.settings.badges.show_count = false;
        reactor.handle_events([
            Event::ConfigChanged(Box::new(config.clone())),
            Event::BadgeChanged { package: "com.example.a".into(), count: 4 },
        ]);
        let events = drain(&mut view);
        let Some(ViewEvent::CatalogUpdated(groups)) = events.last() else {
            panic!("unexpected {events:?}");
        };
        assert_eq!(groups[&'A'][0].badge, 4);
        assert_eq!(groups[&'A'][0].badge_text.as_deref(), Some(""));

        config.settings.badges.show = false;
        reactor.handle_events([Event::ConfigChanged(Box::new(config)), Event::SearchQuery("alp".into())]);
        let events = drain(&mut view);
        let Some(ViewEvent::SearchResults(results)) = events.last() else {
            panic!("unexpected {events:?}");
        };
        assert_eq!((results[0].badge, results[0].badge_text.clone()), (0, None));
    }

    #[test]
    fn startup_config_is_sanitized() {
        let mut config = Config::default();
        config.settings.home.columns = 0;
        let (view_tx, _view) = actor::channel();
        let mut reactor = Reactor::new(config, Box::new(MemoryStore::new()), view_tx);

        reactor.handle_events(["a", "b", "c"].map(|n| Event::AddToHome(app(n))));
        assert_eq!(reactor.layout().grid(), GridConfig::new(4, 5));
        assert_eq!(reactor.layout().page_count(), 1);
        assert!(reactor.layout().occupant_at(0, Cell::new(2, 0)).is_some());
    }

    #[test]
    fn grid_change_on_an_empty_page_still_redraws_it() {
        let (mut reactor, mut view) = Reactor::new_for_test(MemoryStore::new());
        reactor.handle_event(Event::PageSelected(1));
        drain(&mut view);

        let mut config = Config::default();
        config.settings.home = GridConfig::new(3, 3);
        reactor.handle_event(Event::ConfigChanged(Box::new(config)));
        assert_eq!(drain(&mut view), vec![ViewEvent::RefreshPage(1)]);
    }

    #[test]
    fn drawer_grid_change_is_forwarded() {
        let (mut reactor, mut view) = Reactor::new_for_test(MemoryStore::new());
        let mut config = Config::default();
        config.settings.drawer = GridConfig::new(5, 8);
        reactor.handle_event(Event::ConfigChanged(Box::new(config)));
        assert_eq!(drain(&mut view), vec![ViewEvent::DrawerGridChanged(GridConfig::new(5, 8))]);
        assert!(reactor.layout().is_empty());
    }

    #[test]
    fn invalid_config_values_are_fixed_on_reload() {
        let (mut reactor, mut view) = Reactor::new_for_test(MemoryStore::new());
        let mut config = Config::default();
        config.settings.home.columns = 0;
        reactor.handle_event(Event::ConfigChanged(Box::new(config)));
        assert_eq!(reactor.layout().grid(), GridConfig::new(4, 5));
        assert!(drain(&mut view).is_empty());
    }

    #[test]
    fn spawned_reactor_round_trip() {
        let store = MemoryStore::new();
        let (view_tx, mut view) = actor::channel();
        let reactor = Reactor::new(Config::default(), Box::new(store.clone()), view_tx);
        let lister: Arc<dyn PackageLister> = Arc::new(|| {
            vec![LaunchableApp {
                app: AppId::new("com.example.a", ".Main"),
                label: Some("Alpha".into()),
                icon: Some(IconHandle(3)),
            }]
        });
        let (tx, handle) = reactor.spawn(lister).unwrap();

        tx.send(Event::RequestCatalog);
        let updated = loop {
            let (_, event) = view.blocking_recv().unwrap();
            if let ViewEvent::CatalogUpdated(groups) = event {
                break groups;
            }
        };
        assert_eq!(updated[&'A'][0].label, "Alpha");

        tx.send(Event::AddToHome(app("a")));
        tx.send(Event::Shutdown);
        handle.join().unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }
}
