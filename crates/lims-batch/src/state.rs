//! Canonical in-memory page of one entity family

use lims_model::{Entity, Page};

/// Items currently shown, plus the server-side paging context
///
/// `items.len() <= page_size` holds after every operation.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState<E> {
    /// Items in display order
    pub items: Vec<E>,
    /// Server-reported total across all pages
    pub total: u64,
    /// 1-based current page
    pub page: u32,
    /// Page size
    pub page_size: u32,
}

impl<E: Entity> CollectionState<E> {
    /// Empty state on page 1
    #[inline]
    #[must_use]
    pub fn empty(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            page_size,
        }
    }

    /// Replace everything with a freshly fetched page
    pub fn replace_with_page(&mut self, page: Page<E>) {
        self.items = page.items;
        self.total = page.total;
        self.page = page.page_index;
        self.page_size = page.page_size;
        self.trim_to_page_size();
    }

    /// Drop items beyond the page size
    pub fn trim_to_page_size(&mut self) {
        let limit = usize::try_from(self.page_size).unwrap_or(usize::MAX);
        self.items.truncate(limit);
    }

    /// Number of pages for `total`
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            0
        } else {
            self.total.div_ceil(u64::from(self.page_size))
        }
    }

    /// Item by id
    #[must_use]
    pub fn find(&self, id: &E::Id) -> Option<&E> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Mutable item by id
    pub fn find_mut(&mut self, id: &E::Id) -> Option<&mut E> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    /// Insert a newly created item at the top
    pub fn unshift(&mut self, item: E) {
        self.items.insert(0, item);
        self.total += 1;
        self.trim_to_page_size();
    }

    /// Replace the item with the same id in place; false when absent
    pub fn replace(&mut self, item: E) -> bool {
        match self.find_mut(item.id()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Remove a deleted item
    ///
    /// `total` drops by one even when the item is not on this page, since the
    /// server deleted it either way.
    pub fn remove(&mut self, id: &E::Id) -> Option<E> {
        self.total = self.total.saturating_sub(1);
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    /// Back to the empty state, keeping the page size
    pub fn clear(&mut self) {
        *self = Self::empty(self.page_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
        label: &'static str,
    }

    impl Entity for Row {
        type Id = u32;
        const KIND: &'static str = "row";

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    fn row(id: u32) -> Row {
        Row { id, label: "" }
    }

    #[test]
    fn page_replacement_respects_page_size() {
        let mut state = CollectionState::empty(2);
        state.replace_with_page(Page::new(vec![row(1), row(2), row(3)], 30, 4, 2));

        assert_eq!(state.items, vec![row(1), row(2)]);
        assert_eq!(state.total, 30);
        assert_eq!(state.page, 4);
        assert_eq!(state.total_pages(), 15);
    }

    #[test]
    fn unshift_replace_remove() {
        let mut state = CollectionState::empty(3);
        state.replace_with_page(Page::new(vec![row(1), row(2), row(3)], 3, 1, 3));

        state.unshift(row(9));
        assert_eq!(state.items.iter().map(|r| r.id).collect::<Vec<_>>(), vec![9, 1, 2]);
        assert_eq!(state.total, 4);

        assert!(state.replace(Row { id: 1, label: "edited" }));
        assert_eq!(state.find(&1).map(|r| r.label), Some("edited"));
        assert!(!state.replace(row(42)));

        assert_eq!(state.remove(&9), Some(row(9)));
        assert_eq!(state.total, 3);
        assert_eq!(state.remove(&77), None);
        assert_eq!(state.total, 2);

        state.clear();
        assert_eq!(state, CollectionState::empty(3));
    }
}
