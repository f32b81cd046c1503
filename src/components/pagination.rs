use std::num::NonZeroUsize;

/// How a list grows when the user asks for more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination<A> {
    /// The caller hands over the whole collection; the list reveals it page by page.
    ClientSlice { items_per_page: NonZeroUsize },
    /// The list shows everything it is given and asks the parent for the next window.
    Delegated { load_more: A },
}

/// Page window over a collection owned by someone else.
#[derive(Debug, Clone)]
pub struct Paginator<A> {
    mode: Pagination<A>,
    page: usize,
    hide_more: bool,
    exhausted: bool,
}

impl<A: Copy> Paginator<A> {
    pub fn new(mode: Pagination<A>) -> Self {
        Self {
            mode,
            page: 1,
            hide_more: false,
            exhausted: false,
        }
    }

    pub fn client_slice(items_per_page: NonZeroUsize) -> Self {
        Self::new(Pagination::ClientSlice { items_per_page })
    }

    pub fn delegated(load_more: A) -> Self {
        Self::new(Pagination::Delegated { load_more })
    }

    /// Never show the "load more" affordance.
    pub fn with_hide_more(mut self) -> Self {
        self.hide_more = true;
        self
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Back to the first page. Called when the list starts showing a different entity.
    pub fn reset(&mut self) {
        self.page = 1;
        self.exhausted = false;
    }

    /// The parent got a short page back; there is nothing more to ask for.
    pub fn mark_exhausted(&mut self) {
        self.exhausted = true;
    }

    pub fn visible_len(&self, total: usize) -> usize {
        match self.mode {
            Pagination::ClientSlice { items_per_page } => {
                items_per_page.get().saturating_mul(self.page).min(total)
            }
            Pagination::Delegated { .. } => total,
        }
    }

    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.visible_len(items.len())]
    }

    /// Whether the "load more" affordance should be shown for `total` loaded items.
    pub fn has_more(&self, total: usize) -> bool {
        if self.hide_more {
            return false;
        }
        match self.mode {
            Pagination::ClientSlice { .. } => self.visible_len(total) < total,
            Pagination::Delegated { .. } => !self.exhausted,
        }
    }

    /// Act on "load more". A client-sliced list grows in place and returns `None`;
    /// a delegated list advances its page and returns the action for the parent.
    pub fn load_more(&mut self, total: usize) -> Option<A> {
        if !self.has_more(total) {
            return None;
        }
        self.page += 1;
        match self.mode {
            Pagination::ClientSlice { .. } => None,
            Pagination::Delegated { load_more } => Some(load_more),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LoadMoreTarget;

    fn per_page(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_ten_blocks_three_per_page() {
        let blocks: Vec<u64> = (0..10).collect();
        let mut list = Paginator::<LoadMoreTarget>::client_slice(per_page(3));

        assert_eq!(list.visible(&blocks), &blocks[0..3]);
        assert!(list.has_more(blocks.len()));

        assert_eq!(list.load_more(blocks.len()), None);
        assert_eq!(list.visible(&blocks), &blocks[0..6]);
        assert!(list.has_more(blocks.len()));

        list.load_more(blocks.len());
        list.load_more(blocks.len());
        assert_eq!(list.visible(&blocks), &blocks[..]);
        assert!(!list.has_more(blocks.len()));
    }

    #[test]
    fn test_client_slice_law() {
        for len in 1..=12usize {
            let items: Vec<usize> = (0..len).collect();
            for p in 1..=5usize {
                let mut list = Paginator::<LoadMoreTarget>::client_slice(per_page(p));
                for n in 0..6usize {
                    let expected = (p * (n + 1)).min(len);
                    assert_eq!(list.visible(&items), &items[..expected]);
                    assert_eq!(list.has_more(len), p * (n + 1) < len);
                    list.load_more(len);
                }
            }
        }
    }

    #[test]
    fn test_load_more_past_end_is_ignored() {
        let mut list = Paginator::<LoadMoreTarget>::client_slice(per_page(5));
        assert_eq!(list.load_more(3), None);
        assert_eq!(list.page(), 1);
    }

    #[test]
    fn test_hide_more_suppresses_affordance() {
        let list = Paginator::<LoadMoreTarget>::client_slice(per_page(3)).with_hide_more();
        assert!(!list.has_more(10));
        assert_eq!(list.visible_len(10), 3);

        let mut delegated = Paginator::delegated(LoadMoreTarget::Blocks).with_hide_more();
        assert!(!delegated.has_more(10));
        assert_eq!(delegated.load_more(10), None);
    }

    #[test]
    fn test_delegated_hands_action_to_parent() {
        let mut list = Paginator::delegated(LoadMoreTarget::AssetTransactions);
        let items = [1, 2, 3];
        assert_eq!(list.visible(&items), &items[..]);
        assert!(list.has_more(items.len()));

        assert_eq!(
            list.load_more(items.len()),
            Some(LoadMoreTarget::AssetTransactions)
        );
        assert_eq!(list.page(), 2);

        list.mark_exhausted();
        assert!(!list.has_more(items.len()));
        assert_eq!(list.load_more(items.len()), None);
    }

    #[test]
    fn test_reset_returns_to_first_page() {
        let mut list = Paginator::delegated(LoadMoreTarget::Blocks);
        list.load_more(6);
        list.mark_exhausted();
        list.reset();
        assert_eq!(list.page(), 1);
        assert!(list.has_more(0));
    }

    #[test]
    fn test_empty_collection() {
        let list = Paginator::<LoadMoreTarget>::client_slice(per_page(3));
        let empty: [u8; 0] = [];
        assert!(list.visible(&empty).is_empty());
        assert!(!list.has_more(0));
    }
}
