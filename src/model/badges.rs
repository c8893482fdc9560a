use std::sync::Arc;

use dashmap::DashMap;

/// Unread counts per package, written by whatever listens for
/// notifications and read by the drawer.
///
/// Owned by the session that creates it; clones share the same map.
#[derive(Clone, Default, Debug)]
pub struct BadgeStore(Arc<DashMap<String, u32>>);

impl BadgeStore {
    pub fn new() -> Self { Self::default() }

    /// A count of zero removes the badge.
    pub fn set(&self, package: &str, count: u32) {
        if count == 0 {
            self.0.remove(package);
        } else {
            self.0.insert(package.to_string(), count);
        }
    }

    pub fn get(&self, package: &str) -> u32 { self.0.get(package).map(|c| *c).unwrap_or(0) }

    pub fn clear(&self, package: &str) { self.0.remove(package); }

    pub fn clear_all(&self) { self.0.clear(); }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

/// Text shown on a badge.
pub fn badge_label(count: u32) -> Option<String> {
    match count {
        0 => None,
        1..=99 => Some(count.to_string()),
        _ => Some("99+".to_string()),
    }
}
