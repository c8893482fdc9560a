//! The app drawer's view of installed applications.
//!
//! The catalog is rebuilt from scratch on every query: whatever the package
//! lister returns is resolved, filtered against the hidden set and sorted.
//! Nothing here is persisted.

use tracing::{debug, trace};

use crate::common::collections::{BTreeMap, HashSet};
use crate::model::{AppId, BadgeStore, HiddenSet};

/// Key for entries whose label does not start with a letter.
pub const FALLBACK_GROUP: char = '#';

/// Opaque icon reference owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconHandle(pub u64);

/// One row as reported by the host before resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchableApp {
    pub app: AppId,
    pub label: Option<String>,
    pub icon: Option<IconHandle>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub app: AppId,
    pub label: String,
    pub icon: IconHandle,
    pub badge: u32,
    /// Badge as the view should draw it; filled in on the way to the view.
    pub badge_text: Option<String>,
}

impl CatalogEntry {
    pub fn package(&self) -> &str { &self.app.package }
}

/// Source of launchable apps. May be slow; only called off the interaction
/// thread.
pub trait PackageLister: Send + Sync {
    fn list_launchable_apps(&self) -> Vec<LaunchableApp>;
}

impl<F> PackageLister for F
where F: Fn() -> Vec<LaunchableApp> + Send + Sync
{
    fn list_launchable_apps(&self) -> Vec<LaunchableApp> { self() }
}

/// Drops apps whose label or icon could not be loaded. An activity listed
/// more than once keeps its first row.
pub fn resolve(raw: Vec<LaunchableApp>) -> Vec<CatalogEntry> {
    let mut seen = HashSet::default();
    raw.into_iter()
        .filter_map(|LaunchableApp { app, label, icon }| match (label, icon) {
            (Some(label), Some(icon)) => Some(CatalogEntry { app, label, icon, badge: 0, badge_text: None }),
            _ => {
                trace!(%app, "dropping unresolved app");
                None
            }
        })
        .filter(|entry| seen.insert(entry.app.clone()))
        .collect()
}

/// Visible entries, sorted case-insensitively by label. Equal labels keep
/// their input order.
pub fn list_launchable(entries: &[CatalogEntry], hidden: &HiddenSet) -> Vec<CatalogEntry> {
    let mut visible: Vec<CatalogEntry> =
        entries.iter().filter(|e| !hidden.contains(e.package())).cloned().collect();
    visible.sort_by_cached_key(|e| e.label.to_lowercase());
    visible
}

pub fn group_key(label: &str) -> char {
    match label.chars().next() {
        Some(c) if c.is_alphabetic() => c.to_uppercase().next().unwrap_or(c),
        _ => FALLBACK_GROUP,
    }
}

/// Groups entries by the first letter of their label. Order within a group
/// follows the input.
pub fn group_by_initial(entries: &[CatalogEntry]) -> BTreeMap<char, Vec<CatalogEntry>> {
    let mut groups: BTreeMap<char, Vec<CatalogEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(group_key(&entry.label)).or_default().push(entry.clone());
    }
    groups
}

/// Splits entries into drawer rows of `columns` icons.
pub fn rows(entries: &[CatalogEntry], columns: u32) -> Vec<Vec<CatalogEntry>> {
    entries.chunks(columns.max(1) as usize).map(<[CatalogEntry]>::to_vec).collect()
}

/// Case-insensitive substring match on label or package. An empty query
/// matches nothing.
pub fn search(query: &str, entries: &[CatalogEntry]) -> Vec<CatalogEntry> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|e| {
            e.label.to_lowercase().contains(&needle) || e.package().to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// The most recent catalog the drawer is showing.
#[derive(Debug, Clone, Default)]
pub struct DrawerModel {
    entries: Vec<CatalogEntry>,
    generation: u64,
}

impl DrawerModel {
    pub fn new() -> Self { Self::default() }

    pub fn generation(&self) -> u64 { self.generation }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Installs the result of query `generation`. Results older than what is
    /// already shown are ignored.
    pub fn replace(&mut self, generation: u64, mut entries: Vec<CatalogEntry>, badges: &BadgeStore) -> bool {
        if generation < self.generation {
            debug!(generation, current = self.generation, "ignoring older catalog");
            return false;
        }
        for entry in &mut entries {
            entry.badge = badges.get(entry.package());
        }
        self.entries = entries;
        self.generation = generation;
        true
    }

    /// Returns whether any entry changed.
    pub fn set_badge(&mut self, package: &str, count: u32) -> bool {
        let mut changed = false;
        for entry in self.entries.iter_mut().filter(|e| e.app.package == package) {
            changed |= entry.badge != count;
            entry.badge = count;
        }
        changed
    }

    pub fn remove_package(&mut self, package: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.app.package != package);
        before != self.entries.len()
    }

    pub fn visible(&self, hidden: &HiddenSet) -> Vec<CatalogEntry> { list_launchable(&self.entries, hidden) }

    pub fn grouped(&self, hidden: &HiddenSet) -> BTreeMap<char, Vec<CatalogEntry>> {
        group_by_initial(&self.visible(hidden))
    }

    pub fn search(&self, query: &str, hidden: &HiddenSet) -> Vec<CatalogEntry> {
        search(query, &self.visible(hidden))
    }
}
