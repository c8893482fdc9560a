pub mod badges;
pub mod hidden;
pub mod placement;
pub mod store;

pub use badges::BadgeStore;
pub use hidden::HiddenSet;
pub use placement::{AppId, AppPlacement, Cell, Item, PlacedItem, Span, WidgetHandle, WidgetPlacement};
pub use store::{JsonFileStore, MemoryStore, PlacementStore, StoreError};
