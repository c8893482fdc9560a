use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::collections::BTreeSet;
use crate::model::store::{StoreError, write_atomically};

/// Packages the user chose to keep out of the drawer. Independent of the
/// home screen layout: hiding an app leaves its icons where they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HiddenSet(BTreeSet<String>);

impl HiddenSet {
    pub fn new() -> Self { Self::default() }

    pub fn contains(&self, package: &str) -> bool { self.0.contains(package) }

    /// Returns whether the set changed.
    pub fn set_hidden(&mut self, package: &str, hidden: bool) -> bool {
        if hidden {
            self.0.insert(package.to_string())
        } else {
            self.0.remove(package)
        }
    }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ { self.0.iter().map(String::as_str) }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        match std::fs::read_to_string(path) {
            Ok(buf) => Ok(ron::from_str(&buf)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(?path, "no hidden apps file");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let buf = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        write_atomically(path, buf.as_bytes())
    }
}

impl FromIterator<String> for HiddenSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self { Self(iter.into_iter().collect()) }
}
