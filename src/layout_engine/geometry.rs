//! Pixel/cell conversions and occupancy scans. Everything here is total:
//! out-of-range input is clamped, never rejected.

use serde::{Deserialize, Serialize};

use crate::model::{Cell, PlacedItem, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    pub columns: u32,
    pub rows: u32,
}

impl GridConfig {
    pub const fn new(columns: u32, rows: u32) -> Self { Self { columns, rows } }

    pub fn cell_count(&self) -> usize { self.columns as usize * self.rows as usize }

    pub fn contains(&self, cell: Cell) -> bool { cell.x < self.columns && cell.y < self.rows }

    pub fn clamp(&self, cell: Cell) -> Cell {
        Cell::new(
            cell.x.min(self.columns.saturating_sub(1)),
            cell.y.min(self.rows.saturating_sub(1)),
        )
    }

    /// Row-major cells, y outer.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.rows).flat_map(move |y| (0..self.columns).map(move |x| Cell::new(x, y)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn max_x(&self) -> f64 { self.origin.x + self.width }

    pub fn max_y(&self) -> f64 { self.origin.y + self.height }
}

/// Pixel size of the area the grid is laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self { Self { width, height } }
}

impl Default for Viewport {
    fn default() -> Self { Self::new(1080.0, 1920.0) }
}

/// Half-open rectangle of cells, `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CellRect {
    pub fn is_empty(&self) -> bool { self.x0 >= self.x1 || self.y0 >= self.y1 }

    pub fn clip(&self, grid: GridConfig) -> CellRect {
        CellRect {
            x0: self.x0.min(grid.columns),
            y0: self.y0.min(grid.rows),
            x1: self.x1.min(grid.columns),
            y1: self.y1.min(grid.rows),
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (self.x0..self.x1).contains(&cell.x) && (self.y0..self.y1).contains(&cell.y)
    }

    pub fn intersects(&self, other: &CellRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x0 < other.x1
            && other.x0 < self.x1
            && self.y0 < other.y1
            && other.y0 < self.y1
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.y0..self.y1).flat_map(move |y| (self.x0..self.x1).map(move |x| Cell::new(x, y)))
    }
}

pub fn rect_for(cell: Cell, span: Span) -> CellRect {
    CellRect {
        x0: cell.x,
        y0: cell.y,
        x1: cell.x.saturating_add(span.x),
        y1: cell.y.saturating_add(span.y),
    }
}

/// Cells `item` occupies on its page under `grid`. Empty if the item lies
/// entirely outside the grid.
pub fn footprint(item: &PlacedItem, grid: GridConfig) -> CellRect {
    rect_for(item.cell(), item.span()).clip(grid)
}

fn cell_size(grid: GridConfig, viewport: Viewport) -> (f64, f64) {
    (
        viewport.width / grid.columns.max(1) as f64,
        viewport.height / grid.rows.max(1) as f64,
    )
}

pub fn cell_at(point: Point, grid: GridConfig, viewport: Viewport) -> Cell {
    let (w, h) = cell_size(grid, viewport);
    let index = |v: f64, size: f64, count: u32| -> u32 {
        if !v.is_finite() || v <= 0.0 || size <= 0.0 {
            return 0;
        }
        ((v / size).floor() as u32).min(count.saturating_sub(1))
    };
    Cell::new(index(point.x, w, grid.columns), index(point.y, h, grid.rows))
}

pub fn cell_frame(cell: Cell, grid: GridConfig, viewport: Viewport) -> Rect {
    let (w, h) = cell_size(grid, viewport);
    let cell = grid.clamp(cell);
    Rect {
        origin: Point::new(cell.x as f64 * w, cell.y as f64 * h),
        width: w,
        height: h,
    }
}

fn occupied<'a, I>(placements: I, grid: GridConfig, page: u32) -> Vec<bool>
where I: IntoIterator<Item = &'a PlacedItem> {
    let mut taken = vec![false; grid.cell_count()];
    for item in placements.into_iter().filter(|p| p.page() == page) {
        for cell in footprint(item, grid).cells() {
            taken[(cell.y * grid.columns + cell.x) as usize] = true;
        }
    }
    taken
}

pub fn first_free_cell<'a, I>(placements: I, grid: GridConfig, page: u32) -> Option<Cell>
where I: IntoIterator<Item = &'a PlacedItem> {
    first_free_rect(placements, grid, page, Span::ONE)
}

/// First row-major origin where the whole span lands on free cells inside
/// the grid. A span larger than the grid is shrunk to the grid first.
pub fn first_free_rect<'a, I>(placements: I, grid: GridConfig, page: u32, span: Span) -> Option<Cell>
where I: IntoIterator<Item = &'a PlacedItem> {
    let taken = occupied(placements, grid, page);
    let span = Span::new(span.x.min(grid.columns), span.y.min(grid.rows));
    grid.cells().find(|&origin| {
        let rect = rect_for(origin, span);
        rect.x1 <= grid.columns
            && rect.y1 <= grid.rows
            && rect.cells().all(|c| !taken[(c.y * grid.columns + c.x) as usize])
    })
}
