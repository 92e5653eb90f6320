use std::collections::BTreeSet;

/// Files currently selected in the source listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, file_id: impl Into<String>) {
        self.ids.insert(file_id.into());
    }

    pub fn deselect(&mut self, file_id: &str) {
        self.ids.remove(file_id);
    }

    /// Flips the selection state of `file_id`; returns whether it is now selected.
    pub fn toggle(&mut self, file_id: &str) -> bool {
        if self.ids.remove(file_id) {
            false
        } else {
            self.ids.insert(file_id.to_string());
            true
        }
    }

    pub fn contains(&self, file_id: &str) -> bool {
        self.ids.contains(file_id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Selected ids in sorted order.
    pub fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
