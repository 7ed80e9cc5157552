//! Immutable installed-mod snapshot.

use std::collections::HashMap;

use super::types::Mod;

/// Folds a mod name to its case-insensitive comparison key.
pub(crate) fn fold(name: &str) -> String {
    name.trim().to_lowercase()
}

/// An ordered, case-insensitively keyed snapshot of the installed mods,
/// fixed for the duration of one resolution pass.
///
/// Insertion order is significant: a mod's position in the input list is
/// the resolver's second tie-breaker. When two records fold to the same
/// name the first wins and keeps its index; later duplicates are ignored,
/// so appending to a mod list never reshuffles an existing order.
#[derive(Debug, Clone)]
pub struct ModSet {
    mods: Vec<Mod>,
    index: HashMap<String, usize>,
}

impl ModSet {
    /// Builds a snapshot from an ordered mod list.
    pub fn from_mods(mods: impl IntoIterator<Item = Mod>) -> ModSet {
        let mut set = ModSet {
            mods: Vec::new(),
            index: HashMap::new(),
        };
        for m in mods {
            let key = fold(&m.name);
            if set.index.contains_key(&key) {
                continue;
            }
            set.index.insert(key, set.mods.len());
            set.mods.push(m);
        }
        set
    }

    /// Number of distinct mods.
    pub fn len(&self) -> usize {
        self.mods.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    /// Looks up a mod by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&Mod> {
        self.position(name).map(|i| &self.mods[i])
    }

    /// The insertion index of a mod, case-insensitively.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&fold(name)).copied()
    }

    /// Whether a mod is installed.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&fold(name))
    }

    /// The mod at an insertion index.
    pub fn by_index(&self, index: usize) -> &Mod {
        &self.mods[index]
    }

    /// Iterates mods in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Mod> {
        self.mods.iter()
    }
}
