use slotmap::{SlotMap, new_key_type};
use tracing::{debug, trace, warn};

use super::geometry::{self, CellRect, GridConfig, footprint, rect_for};
use crate::common::collections::{BTreeMap, BTreeSet};
use crate::model::{Cell, Item, PlacedItem};

new_key_type! {
    pub struct PlacementId;
}

/// Result of a successful `place`.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub id: PlacementId,
    pub page: u32,
    pub cell: Cell,
    pub evicted: Vec<PlacedItem>,
}

#[derive(Debug, Clone)]
pub enum LayoutCommand {
    Place { item: Item, page: u32, cell: Cell },
    AddAtFirstFreeSlot(Item),
    Move { id: PlacementId, page: u32, cell: Cell },
    Remove(PlacementId),
    RemovePackage(String),
    SetGrid(GridConfig),
}

/// What a command did, for the caller to persist and redraw.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventResponse {
    pub changed_pages: BTreeSet<u32>,
    pub placed: Option<PlacementId>,
    pub evicted: Vec<PlacedItem>,
    pub removed: Vec<PlacedItem>,
    /// Placements left outside the grid by a `SetGrid`.
    pub out_of_bounds: Vec<PlacementId>,
}

impl EventResponse {
    pub fn is_empty(&self) -> bool { self.changed_pages.is_empty() }
}

/// The authoritative set of placements for a session.
///
/// Mutations never fail. Conflicts are resolved by evicting whatever
/// occupied the destination, and page indices past the end grow the page
/// count by one. Pages are never removed, so an emptied page stays.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    placements: SlotMap<PlacementId, PlacedItem>,
    grid: GridConfig,
    page_count: u32,
}

impl LayoutEngine {
    pub fn new(grid: GridConfig) -> Self {
        Self {
            placements: SlotMap::default(),
            grid,
            page_count: 1,
        }
    }

    /// Rebuilds an engine from persisted placements. Items are placed in
    /// order, so a later record wins over an earlier overlapping one. Page
    /// indices are renumbered densely, keeping their relative order.
    pub fn from_items(grid: GridConfig, items: impl IntoIterator<Item = PlacedItem>) -> Self {
        let mut engine = Self::new(grid);
        let mut items: Vec<PlacedItem> = items.into_iter().collect();

        let pages: BTreeSet<u32> = items.iter().map(|i| i.page()).collect();
        let renumber: BTreeMap<u32, u32> = pages.iter().zip(0..).map(|(&old, new)| (old, new)).collect();
        for (&old, &new) in renumber.iter().filter(|(old, new)| old != new) {
            warn!(old, new, "renumbering persisted page");
        }
        for placed in &mut items {
            let page = renumber[&placed.page()];
            placed.set_position(page, placed.cell());
        }
        engine.page_count = (pages.len() as u32).max(1);

        for placed in items {
            let (page, cell) = (placed.page(), placed.cell());
            if !grid.contains(cell) {
                // Kept as-is, like after a grid shrink.
                warn!("placement outside the grid: {placed}");
                let (_, evicted) = engine.insert_evicting(placed);
                for e in &evicted {
                    warn!("dropping overlapping placement on load: {e}");
                }
                continue;
            }
            let p = engine.place(placed.item(), page, cell);
            for e in &p.evicted {
                warn!("dropping overlapping placement on load: {e}");
            }
        }
        debug!(count = engine.len(), pages = engine.page_count, "layout restored");
        engine
    }

    pub fn grid(&self) -> GridConfig { self.grid }

    pub fn page_count(&self) -> u32 { self.page_count }

    pub fn len(&self) -> usize { self.placements.len() }

    pub fn is_empty(&self) -> bool { self.placements.is_empty() }

    pub fn get(&self, id: PlacementId) -> Option<&PlacedItem> { self.placements.get(id) }

    pub fn iter(&self) -> impl Iterator<Item = (PlacementId, &PlacedItem)> + '_ {
        self.placements.iter()
    }

    /// Placements whose full span meets `target`. Spans are not clipped to
    /// the grid, so an item parked outside a shrunken grid still counts.
    fn intersecting(&self, page: u32, target: &CellRect) -> Vec<PlacementId> {
        self.placements
            .iter()
            .filter(|(_, p)| p.page() == page && rect_for(p.cell(), p.span()).intersects(target))
            .map(|(id, _)| id)
            .collect()
    }

    fn insert_evicting(&mut self, placed: PlacedItem) -> (PlacementId, Vec<PlacedItem>) {
        let target = rect_for(placed.cell(), placed.span());
        let evicted: Vec<PlacedItem> = self
            .intersecting(placed.page(), &target)
            .into_iter()
            .filter_map(|id| self.placements.remove(id))
            .collect();
        for e in &evicted {
            trace!("evicted {e}");
        }
        trace!("placed {placed}");
        (self.placements.insert(placed), evicted)
    }

    /// Places `item` at `cell` on `page`, evicting anything in the way.
    pub fn place(&mut self, item: Item, page: u32, cell: Cell) -> Placement {
        let page = page.min(self.page_count);
        if page == self.page_count {
            self.page_count += 1;
            debug!(page, "allocated page");
        }
        let cell = self.grid.clamp(cell);
        let (id, evicted) = self.insert_evicting(item.at(page, cell));
        Placement { id, page, cell, evicted }
    }

    /// Places `item` in the first free slot of the earliest page with room,
    /// growing a new page when all are full.
    pub fn add_at_first_free_slot(&mut self, item: Item) -> Placement {
        let span = item.span();
        let found = (0..self.page_count).find_map(|page| {
            geometry::first_free_rect(self.placements.values(), self.grid, page, span)
                .map(|cell| (page, cell))
        });
        let (page, cell) = found.unwrap_or((self.page_count, Cell::default()));
        self.place(item, page, cell)
    }

    /// Moves an existing placement. Unknown ids are ignored.
    pub fn move_item(&mut self, id: PlacementId, page: u32, cell: Cell) -> Option<Placement> {
        let old = self.placements.remove(id)?;
        Some(self.place(old.item(), page, cell))
    }

    pub fn remove(&mut self, id: PlacementId) -> Option<PlacedItem> { self.placements.remove(id) }

    /// Removes every placement of `package`, e.g. after an uninstall.
    pub fn remove_package(&mut self, package: &str) -> Vec<PlacedItem> {
        let ids: Vec<PlacementId> = self
            .placements
            .iter()
            .filter(|(_, p)| p.package() == Some(package))
            .map(|(id, _)| id)
            .collect();
        ids.into_iter().filter_map(|id| self.placements.remove(id)).collect()
    }

    pub fn occupant_at(&self, page: u32, cell: Cell) -> Option<PlacementId> {
        self.placements
            .iter()
            .find(|(_, p)| p.page() == page && footprint(p, self.grid).contains(cell))
            .map(|(id, _)| id)
    }

    pub fn items_on_page(&self, page: u32) -> Vec<(PlacementId, PlacedItem)> {
        let mut items: Vec<_> = self
            .placements
            .iter()
            .filter(|(_, p)| p.page() == page)
            .map(|(id, p)| (id, p.clone()))
            .collect();
        items.sort_by_key(|(_, p)| (p.cell().y, p.cell().x));
        items
    }

    /// Human-readable dump of every page, marking placements that sit
    /// outside the current grid.
    pub fn draw_tree(&self) -> String {
        let pages = (0..self.page_count)
            .map(|page| {
                let leaves: Vec<String> = self
                    .items_on_page(page)
                    .into_iter()
                    .map(|(_, p)| {
                        let marker = if self.grid.contains(p.cell()) { "" } else { " (outside grid)" };
                        format!("{} {}{marker}", p.cell(), p.item())
                    })
                    .collect();
                ascii_tree::Tree::Leaf(leaves)
            })
            .enumerate()
            .map(|(page, leaf)| ascii_tree::Tree::Node(format!("page {page}"), vec![leaf]))
            .collect();
        let title = format!("home {}x{}", self.grid.columns, self.grid.rows);
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = ascii_tree::write_tree(&mut out, &ascii_tree::Tree::Node(title, pages));
        out
    }

    /// Switches to a new grid without moving anything. Returns the
    /// placements whose origin is no longer inside the grid; those occupy
    /// no cells until the grid grows back.
    pub fn set_grid(&mut self, grid: GridConfig) -> Vec<PlacementId> {
        self.grid = grid;
        let out: Vec<PlacementId> = self
            .placements
            .iter()
            .filter(|(_, p)| !grid.contains(p.cell()))
            .map(|(id, _)| id)
            .collect();
        if !out.is_empty() {
            warn!(
                columns = grid.columns,
                rows = grid.rows,
                count = out.len(),
                "placements outside the grid after resize"
            );
        }
        out
    }

    /// All placements ordered by page, row, column.
    pub fn snapshot(&self) -> Vec<PlacedItem> {
        let mut items: Vec<PlacedItem> = self.placements.values().cloned().collect();
        items.sort_by_key(|p| (p.page(), p.cell().y, p.cell().x));
        items
    }

    pub fn handle_command(&mut self, command: LayoutCommand) -> EventResponse {
        trace!(?command, "layout command");
        let mut response = EventResponse::default();
        match command {
            LayoutCommand::Place { item, page, cell } => {
                let p = self.place(item, page, cell);
                response.apply(p);
            }
            LayoutCommand::AddAtFirstFreeSlot(item) => {
                let p = self.add_at_first_free_slot(item);
                response.apply(p);
            }
            LayoutCommand::Move { id, page, cell } => {
                let from = self.placements.get(id).map(|p| p.page());
                if let Some(p) = self.move_item(id, page, cell) {
                    response.changed_pages.extend(from);
                    response.apply(p);
                }
            }
            LayoutCommand::Remove(id) => {
                if let Some(removed) = self.remove(id) {
                    response.changed_pages.insert(removed.page());
                    response.removed.push(removed);
                }
            }
            LayoutCommand::RemovePackage(package) => {
                let removed = self.remove_package(&package);
                response.changed_pages.extend(removed.iter().map(|p| p.page()));
                response.removed = removed;
            }
            LayoutCommand::SetGrid(grid) => {
                if grid != self.grid {
                    response.out_of_bounds = self.set_grid(grid);
                    response.changed_pages.extend(self.placements.values().map(|p| p.page()));
                }
            }
        }
        response
    }
}

impl EventResponse {
    fn apply(&mut self, placement: Placement) {
        self.changed_pages.insert(placement.page);
        self.placed = Some(placement.id);
        self.evicted.extend(placement.evicted);
    }
}
