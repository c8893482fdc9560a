use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a launchable activity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AppId {
    pub package: String,
    pub component: String,
}

impl AppId {
    pub fn new(package: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            component: component.into(),
        }
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.component)
    }
}

/// Opaque handle allocated by the host widget framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WidgetHandle(pub i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

impl Cell {
    pub const fn new(x: u32, y: u32) -> Self { Self { x, y } }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "({}, {})", self.x, self.y) }
}

/// Size of an item in cells. Apps are always 1x1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub x: u32,
    pub y: u32,
}

impl Span {
    pub const ONE: Span = Span { x: 1, y: 1 };

    /// Spans are at least one cell in each direction.
    pub fn new(x: u32, y: u32) -> Self { Self { x: x.max(1), y: y.max(1) } }
}

impl Default for Span {
    fn default() -> Self { Span::ONE }
}

/// Something that can be placed, without a position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    App(AppId),
    Widget { handle: WidgetHandle, span: Span },
}

impl Item {
    pub fn app(package: impl Into<String>, component: impl Into<String>) -> Self {
        Item::App(AppId::new(package, component))
    }

    pub fn span(&self) -> Span {
        match self {
            Item::App(_) => Span::ONE,
            Item::Widget { span, .. } => *span,
        }
    }

    pub fn package(&self) -> Option<&str> {
        match self {
            Item::App(app) => Some(&app.package),
            Item::Widget { .. } => None,
        }
    }

    pub fn at(self, page: u32, cell: Cell) -> PlacedItem {
        match self {
            Item::App(app) => PlacedItem::App(AppPlacement { app, page, cell }),
            Item::Widget { handle, span } => {
                PlacedItem::Widget(WidgetPlacement { handle, page, cell, span })
            }
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::App(app) => write!(f, "{app}"),
            Item::Widget { handle, span } => write!(f, "widget#{} {}x{}", handle.0, span.x, span.y),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppPlacement {
    pub app: AppId,
    pub page: u32,
    pub cell: Cell,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WidgetPlacement {
    pub handle: WidgetHandle,
    pub page: u32,
    pub cell: Cell,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlacedItem {
    App(AppPlacement),
    Widget(WidgetPlacement),
}

impl PlacedItem {
    pub fn page(&self) -> u32 {
        match self {
            PlacedItem::App(a) => a.page,
            PlacedItem::Widget(w) => w.page,
        }
    }

    pub fn cell(&self) -> Cell {
        match self {
            PlacedItem::App(a) => a.cell,
            PlacedItem::Widget(w) => w.cell,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            PlacedItem::App(_) => Span::ONE,
            PlacedItem::Widget(w) => w.span,
        }
    }

    pub fn item(&self) -> Item {
        match self {
            PlacedItem::App(a) => Item::App(a.app.clone()),
            PlacedItem::Widget(w) => Item::Widget { handle: w.handle, span: w.span },
        }
    }

    pub fn package(&self) -> Option<&str> {
        match self {
            PlacedItem::App(a) => Some(&a.app.package),
            PlacedItem::Widget(_) => None,
        }
    }

    pub(crate) fn set_position(&mut self, page: u32, cell: Cell) {
        match self {
            PlacedItem::App(a) => {
                a.page = page;
                a.cell = cell;
            }
            PlacedItem::Widget(w) => {
                w.page = page;
                w.cell = cell;
            }
        }
    }
}

impl fmt::Display for PlacedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ page {} {}", self.item(), self.page(), self.cell())
    }
}
