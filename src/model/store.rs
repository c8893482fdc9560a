//! Persistence of the home screen layout.
//!
//! The whole placement set is written as one JSON array of flat records on
//! every mutation. Writes go to a temporary file in the destination directory
//! which is then renamed over the old blob, so a reader never observes a
//! partial layout.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::model::placement::{
    AppId, AppPlacement, Cell, PlacedItem, Span, WidgetHandle, WidgetPlacement,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid placement data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to replace placement file: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("invalid ron data: {0}")]
    RonDecode(#[from] ron::error::SpannedError),
    #[error("failed to encode ron: {0}")]
    RonEncode(#[from] ron::Error),
    #[error("malformed record: {0}")]
    MalformedRecord(String),
    #[error("store unavailable")]
    Unavailable,
}

pub trait PlacementStore: Send {
    /// Returns every persisted placement. A store that was never written
    /// yields an empty list.
    fn load(&self) -> Result<Vec<PlacedItem>, StoreError>;

    /// Replaces the persisted placement set with `items`.
    fn save(&self, items: &[PlacedItem]) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RecordKind {
    App,
    Widget,
}

/// On-disk shape of one placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlacementRecord {
    kind: RecordKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    package_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    component_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    widget_handle: Option<i32>,
    x: u32,
    y: u32,
    page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    span_x: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    span_y: Option<u32>,
}

impl From<&PlacedItem> for PlacementRecord {
    fn from(item: &PlacedItem) -> Self {
        match item {
            PlacedItem::App(a) => PlacementRecord {
                kind: RecordKind::App,
                package_id: Some(a.app.package.clone()),
                component_id: Some(a.app.component.clone()),
                widget_handle: None,
                x: a.cell.x,
                y: a.cell.y,
                page: a.page,
                span_x: None,
                span_y: None,
            },
            PlacedItem::Widget(w) => PlacementRecord {
                kind: RecordKind::Widget,
                package_id: None,
                component_id: None,
                widget_handle: Some(w.handle.0),
                x: w.cell.x,
                y: w.cell.y,
                page: w.page,
                span_x: Some(w.span.x),
                span_y: Some(w.span.y),
            },
        }
    }
}

impl TryFrom<PlacementRecord> for PlacedItem {
    type Error = StoreError;

    fn try_from(record: PlacementRecord) -> Result<Self, Self::Error> {
        let cell = Cell::new(record.x, record.y);
        match record.kind {
            RecordKind::App => {
                let (Some(package), Some(component)) = (record.package_id, record.component_id)
                else {
                    return Err(StoreError::MalformedRecord(
                        "app record without packageId/componentId".to_string(),
                    ));
                };
                if package.is_empty() {
                    return Err(StoreError::MalformedRecord("empty packageId".to_string()));
                }
                Ok(PlacedItem::App(AppPlacement {
                    app: AppId { package, component },
                    page: record.page,
                    cell,
                }))
            }
            RecordKind::Widget => {
                let Some(handle) = record.widget_handle else {
                    return Err(StoreError::MalformedRecord(
                        "widget record without widgetHandle".to_string(),
                    ));
                };
                Ok(PlacedItem::Widget(WidgetPlacement {
                    handle: WidgetHandle(handle),
                    page: record.page,
                    cell,
                    span: Span::new(record.span_x.unwrap_or(1), record.span_y.unwrap_or(1)),
                }))
            }
        }
    }
}

pub fn encode(items: &[PlacedItem]) -> Result<String, StoreError> {
    let records: Vec<PlacementRecord> = items.iter().map(PlacementRecord::from).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Decodes a placement blob. Records that fail to decode are skipped; a blob
/// that is not a JSON array is an error.
pub fn decode(blob: &str) -> Result<Vec<PlacedItem>, StoreError> {
    if blob.trim().is_empty() {
        return Ok(Vec::new());
    }
    let values: Vec<serde_json::Value> = serde_json::from_str(blob)?;
    let mut items = Vec::with_capacity(values.len());
    for (idx, value) in values.into_iter().enumerate() {
        let decoded = serde_json::from_value::<PlacementRecord>(value)
            .map_err(StoreError::from)
            .and_then(PlacedItem::try_from);
        match decoded {
            Ok(item) => items.push(item),
            Err(e) => warn!(idx, "skipping placement record: {e}"),
        }
    }
    Ok(items)
}

/// Placement store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    pub fn path(&self) -> &Path { &self.path }
}

impl PlacementStore for JsonFileStore {
    fn load(&self) -> Result<Vec<PlacedItem>, StoreError> {
        let blob = match std::fs::read_to_string(&self.path) {
            Ok(blob) => blob,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "no placement file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let items = decode(&blob)?;
        debug!(path = ?self.path, count = items.len(), "loaded placements");
        Ok(items)
    }

    fn save(&self, items: &[PlacedItem]) -> Result<(), StoreError> {
        let blob = encode(items)?;
        write_atomically(&self.path, blob.as_bytes())?;
        trace!(path = ?self.path, count = items.len(), "saved placements");
        Ok(())
    }
}

/// Writes `contents` to a sibling temp file and renames it over `path`.
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

#[derive(Debug, Default)]
struct MemoryInner {
    blob: Option<String>,
    fail_saves: bool,
    saves: usize,
}

/// In-memory store. Clones share the same blob, which lets a test keep a
/// handle after giving the store to a reactor.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore(Arc<Mutex<MemoryInner>>);

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_items(items: &[PlacedItem]) -> Result<Self, StoreError> {
        let store = Self::new();
        store.0.lock().blob = Some(encode(items)?);
        Ok(store)
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        let store = Self::new();
        store.0.lock().blob = Some(blob.into());
        store
    }

    /// Makes subsequent saves fail until cleared.
    pub fn set_failing(&self, failing: bool) { self.0.lock().fail_saves = failing; }

    pub fn save_count(&self) -> usize { self.0.lock().saves }

    pub fn blob(&self) -> Option<String> { self.0.lock().blob.clone() }
}

impl PlacementStore for MemoryStore {
    fn load(&self) -> Result<Vec<PlacedItem>, StoreError> {
        match &self.0.lock().blob {
            Some(blob) => decode(blob),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, items: &[PlacedItem]) -> Result<(), StoreError> {
        let mut inner = self.0.lock();
        if inner.fail_saves {
            return Err(StoreError::Unavailable);
        }
        inner.blob = Some(encode(items)?);
        inner.saves += 1;
        Ok(())
    }
}
