pub use std::collections::{BTreeMap, BTreeSet, VecDeque};

pub type HashSet<T> = rustc_hash::FxHashSet<T>;
