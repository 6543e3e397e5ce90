use std::collections::BTreeMap;

/// Assigns stacking priority to panels.
///
/// Every call to [`FocusStack::bring_to_front`] hands out the next value of a
/// single counter, so a later focus event always yields a strictly greater
/// z-index than an earlier one. Values are never reused or decremented.
#[derive(Debug, Clone)]
pub struct FocusStack<K: Ord + Clone> {
    counter: u64,
    assigned: BTreeMap<K, u64>,
}

impl<K: Ord + Clone> Default for FocusStack<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone> FocusStack<K> {
    pub fn new() -> Self {
        Self {
            counter: 0,
            assigned: BTreeMap::new(),
        }
    }

    pub fn bring_to_front(&mut self, id: &K) -> u64 {
        self.counter = self.counter.saturating_add(1);
        self.assigned.insert(id.clone(), self.counter);
        self.counter
    }

    pub fn z_index(&self, id: &K) -> Option<u64> {
        self.assigned.get(id).copied()
    }

    /// Last value handed out, or zero before the first focus event.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Ids ordered bottom to top.
    pub fn order(&self) -> Vec<K> {
        let mut entries: Vec<(&K, u64)> = self.assigned.iter().map(|(k, z)| (k, *z)).collect();
        entries.sort_by_key(|(_, z)| *z);
        entries.into_iter().map(|(k, _)| k.clone()).collect()
    }
}
