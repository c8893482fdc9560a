pub mod engine;
pub mod geometry;

pub use engine::{EventResponse, LayoutCommand, LayoutEngine, Placement, PlacementId};
pub use geometry::{
    CellRect, GridConfig, Point, Rect, Viewport, cell_at, cell_frame, first_free_cell,
    first_free_rect, rect_for,
};
