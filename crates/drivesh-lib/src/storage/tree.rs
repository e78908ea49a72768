//! Flat, ordered mirror of one backend's namespace.
//!
//! There is no parent index: every query is a linear scan over the whole
//! cache filtered by parent id.

use super::item::Item;

#[derive(Debug, Clone, Default)]
pub struct TreeCache {
    items: Vec<Item>,
}

impl TreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = Item>) {
        self.items.extend(items);
    }

    /// Remove the item with `id` and every item below it.
    ///
    /// Returns how many items were dropped.
    pub fn remove_subtree(&mut self, id: &str) -> usize {
        let before = self.items.len();
        let mut pending = vec![id.to_string()];
        while let Some(parent) = pending.pop() {
            pending.extend(
                self.items
                    .iter()
                    .filter(|i| i.parent_id() == parent)
                    .map(|i| i.id().to_string()),
            );
            self.items.retain(|i| i.id() != parent);
        }
        before - self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Item at a positional index over the whole cache.
    ///
    /// Negative indices and indices past the end are out of range.
    pub fn get(&self, index: i64) -> Option<&Item> {
        let index = usize::try_from(index).ok()?;
        self.items.get(index)
    }

    pub fn children_of<'a>(&'a self, parent_id: &'a str) -> impl Iterator<Item = &'a Item> + 'a {
        self.items.iter().filter(move |i| i.parent_id() == parent_id)
    }

    pub fn find_directory(&self, parent_id: &str, name: &str) -> Option<&Item> {
        self.items
            .iter()
            .find(|i| i.parent_id() == parent_id && i.is_directory() && i.name() == name)
    }

    /// First file named `name` under `parent_id`, in cache order.
    pub fn find_file(&self, parent_id: &str, name: &str) -> Option<&Item> {
        self.items
            .iter()
            .find(|i| i.parent_id() == parent_id && !i.is_directory() && i.name() == name)
    }

    pub fn find_directory_by_id(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.is_directory() && i.id() == id)
    }
}

impl<'a> IntoIterator for &'a TreeCache {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
