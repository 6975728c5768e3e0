//! Intrusive doubly linked list over a dense key space.
//!
//! Every key in `[0, nr_keys)` owns one fixed slot in a `{prev, next}` arena;
//! slot `nr_keys` is the sentinel that anchors both ends of the list. Keys
//! are linked by index, so insert/remove/promote are O(1) without touching
//! an allocator after construction.
//!
//! ## Architecture
//!
//! ```text
//!   links: Vec<Link>  (nr_keys + 1 slots)
//!   ┌──────┬───────────────────────────────┐
//!   │ idx  │ Link { prev, next }           │
//!   ├──────┼───────────────────────────────┤
//!   │ 0    │ { UNLINKED, UNLINKED }        │  not in the list
//!   │ 1    │ { 3 (sentinel), 2 }           │  MRU
//!   │ 2    │ { 1, 3 (sentinel) }           │  LRU
//!   │ 3    │ { 2, 1 }                      │  sentinel
//!   └──────┴───────────────────────────────┘
//!
//!   sentinel ─next─► [1] ◄──► [2] ◄─prev─ sentinel
//!              MRU (front)        LRU (back)
//! ```
//!
//! ## Operations
//! - `push_front(key)`: link after the sentinel
//! - `remove(key)`: unlink; no-op if not linked
//! - `move_to_front(key)`: remove + push_front
//! - `back()` / `pop_back()`: LRU end
//!
//! ## Performance
//! - `push_front` / `remove` / `move_to_front` / `pop_back`: O(1)
//! - `iter` / `clear` / `check_invariants`: O(n)
//!
//! A slot whose `prev` and `next` disagree about being linked is corrupted
//! bookkeeping; every operation that observes it panics.

use crate::ds::Bitmap;
use crate::error::{AllocError, InvariantError};

/// Marker stored in both links of a key that is not in the list.
///
/// Distinct from every valid key and from the sentinel index.
pub const UNLINKED: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Link {
    prev: u32,
    next: u32,
}

impl Link {
    const DETACHED: Link = Link {
        prev: UNLINKED,
        next: UNLINKED,
    };
}

/// Index-linked list over keys `[0, nr_keys)` with a sentinel at `nr_keys`.
#[derive(Debug, Clone)]
pub struct IndexList {
    links: Vec<Link>,
    nr_keys: u32,
    len: usize,
}

impl IndexList {
    /// Creates an empty list able to hold every key below `nr_keys`.
    ///
    /// # Panics
    ///
    /// Panics if `nr_keys == u32::MAX`, which would make the sentinel
    /// collide with [`UNLINKED`].
    ///
    /// # Example
    ///
    /// ```
    /// use mrckit::ds::IndexList;
    ///
    /// let mut list = IndexList::try_new(8).unwrap();
    /// list.push_front(3);
    /// list.push_front(5);
    /// assert_eq!(list.front(), Some(5));
    /// assert_eq!(list.back(), Some(3));
    ///
    /// list.move_to_front(3);
    /// assert_eq!(list.pop_back(), Some(5));
    /// ```
    pub fn try_new(nr_keys: u32) -> Result<Self, AllocError> {
        assert!(nr_keys != UNLINKED, "key space collides with UNLINKED marker");
        let slots = nr_keys as usize + 1;
        let mut links = Vec::new();
        links
            .try_reserve_exact(slots)
            .map_err(|e| AllocError::from_reserve("list arena", slots, e))?;
        links.resize(slots - 1, Link::DETACHED);
        links.push(Link {
            prev: nr_keys,
            next: nr_keys,
        });
        Ok(Self {
            links,
            nr_keys,
            len: 0,
        })
    }

    /// Returns the size of the key space this list indexes.
    #[inline]
    pub fn nr_keys(&self) -> u32 {
        self.nr_keys
    }

    /// Returns the number of linked keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no key is linked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `key` is linked into this list.
    ///
    /// # Panics
    ///
    /// Panics if `key >= nr_keys` or the slot is half-linked.
    #[inline]
    pub fn contains(&self, key: u32) -> bool {
        assert!(key < self.nr_keys, "key {key} outside key space");
        let link = self.links[key as usize];
        if link.prev == UNLINKED {
            assert!(
                link.next == UNLINKED,
                "key {key} has prev UNLINKED but next {}",
                link.next
            );
            false
        } else {
            assert!(link.next != UNLINKED, "key {key} has next UNLINKED only");
            true
        }
    }

    /// Returns the key at the front (MRU end), if any.
    #[inline]
    pub fn front(&self) -> Option<u32> {
        let head = self.links[self.sentinel()].next;
        (head != self.nr_keys).then_some(head)
    }

    /// Returns the key at the back (LRU end), if any.
    #[inline]
    pub fn back(&self) -> Option<u32> {
        let tail = self.links[self.sentinel()].prev;
        (tail != self.nr_keys).then_some(tail)
    }

    /// Links `key` at the front.
    ///
    /// # Panics
    ///
    /// Panics if `key` is already linked.
    #[inline]
    pub fn push_front(&mut self, key: u32) {
        assert!(!self.contains(key), "key {key} is already linked");
        let sentinel = self.sentinel();
        let head = self.links[sentinel].next;
        self.links[key as usize] = Link {
            prev: self.nr_keys,
            next: head,
        };
        self.links[head as usize].prev = key;
        self.links[sentinel].next = key;
        self.len += 1;
        assert!(self.len <= self.nr_keys as usize, "list length overflow");
    }

    /// Unlinks `key`; returns `false` if it was not linked.
    #[inline]
    pub fn remove(&mut self, key: u32) -> bool {
        if !self.contains(key) {
            return false;
        }
        let Link { prev, next } = self.links[key as usize];
        assert!(self.len > 0, "list length underflow");
        self.links[prev as usize].next = next;
        self.links[next as usize].prev = prev;
        self.links[key as usize] = Link::DETACHED;
        self.len -= 1;
        true
    }

    /// Moves a linked `key` to the front; returns `false` if not linked.
    #[inline]
    pub fn move_to_front(&mut self, key: u32) -> bool {
        if !self.remove(key) {
            return false;
        }
        self.push_front(key);
        true
    }

    /// Unlinks and returns the key at the back (LRU end).
    #[inline]
    pub fn pop_back(&mut self) -> Option<u32> {
        let tail = self.back()?;
        self.remove(tail);
        Some(tail)
    }

    /// Returns an iterator over linked keys from front to back.
    pub fn iter(&self) -> IndexListIter<'_> {
        IndexListIter {
            list: self,
            current: self.links[self.sentinel()].next,
            remaining: self.len,
        }
    }

    /// Unlinks every key.
    pub fn clear(&mut self) {
        let sentinel = self.sentinel();
        self.links[..sentinel].fill(Link::DETACHED);
        self.links[sentinel] = Link {
            prev: self.nr_keys,
            next: self.nr_keys,
        };
        self.len = 0;
    }

    /// Walks the list and checks link symmetry, length, and that every key
    /// not reached from the sentinel is fully unlinked.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let sentinel = self.nr_keys;
        let mut seen = Bitmap::try_new(u64::from(self.nr_keys))
            .map_err(|e| InvariantError::new(e.to_string()))?;
        let mut prev = sentinel;
        let mut current = self.links[sentinel as usize].next;
        let mut count = 0usize;

        while current != sentinel {
            if current == UNLINKED || current > sentinel {
                return Err(InvariantError::new(format!(
                    "link from {prev} points at invalid slot {current}"
                )));
            }
            if seen.test(u64::from(current)) {
                return Err(InvariantError::new(format!("cycle through key {current}")));
            }
            seen.set1(u64::from(current));
            let link = self.links[current as usize];
            if link.prev != prev {
                return Err(InvariantError::new(format!(
                    "key {current} has prev {} but was reached from {prev}",
                    link.prev
                )));
            }
            count += 1;
            if count > self.len {
                return Err(InvariantError::new(format!(
                    "walk exceeds recorded length {}",
                    self.len
                )));
            }
            prev = current;
            current = link.next;
        }

        if self.links[sentinel as usize].prev != prev {
            return Err(InvariantError::new("sentinel prev does not point at tail"));
        }
        if count != self.len {
            return Err(InvariantError::new(format!(
                "walked {count} keys, recorded length {}",
                self.len
            )));
        }
        for key in 0..self.nr_keys {
            if !seen.test(u64::from(key)) && self.links[key as usize] != Link::DETACHED {
                return Err(InvariantError::new(format!(
                    "key {key} is unreachable but not detached"
                )));
            }
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    /// Returns the list order from front to back.
    pub fn debug_snapshot(&self) -> Vec<u32> {
        self.iter().collect()
    }

    #[inline(always)]
    fn sentinel(&self) -> usize {
        self.nr_keys as usize
    }
}

/// Iterator over linked keys from front (MRU) to back (LRU).
#[derive(Debug)]
pub struct IndexListIter<'a> {
    list: &'a IndexList,
    current: u32,
    remaining: usize,
}

impl Iterator for IndexListIter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == self.list.nr_keys || self.remaining == 0 {
            return None;
        }
        let key = self.current;
        self.current = self.list.links[key as usize].next;
        self.remaining -= 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_list_starts_empty() {
        let list = IndexList::try_new(4).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        for key in 0..4 {
            assert!(!list.contains(key));
        }
        list.check_invariants().unwrap();
    }

    #[test]
    fn index_list_push_front_orders_mru_first() {
        let mut list = IndexList::try_new(5).unwrap();
        list.push_front(0);
        list.push_front(4);
        list.push_front(2);
        assert_eq!(list.debug_snapshot(), vec![2, 4, 0]);
        assert_eq!(list.front(), Some(2));
        assert_eq!(list.back(), Some(0));
        assert_eq!(list.len(), 3);
        list.check_invariants().unwrap();
    }

    #[test]
    fn index_list_remove_middle_and_missing() {
        let mut list = IndexList::try_new(5).unwrap();
        list.push_front(1);
        list.push_front(2);
        list.push_front(3);
        assert!(list.remove(2));
        assert_eq!(list.debug_snapshot(), vec![3, 1]);
        assert!(!list.contains(2));

        assert!(!list.remove(2));
        assert!(!list.remove(4));
        assert_eq!(list.len(), 2);
        list.check_invariants().unwrap();
    }

    #[test]
    fn index_list_move_to_front_promotes() {
        let mut list = IndexList::try_new(4).unwrap();
        list.push_front(0);
        list.push_front(1);
        list.push_front(2);
        assert!(list.move_to_front(0));
        assert_eq!(list.debug_snapshot(), vec![0, 2, 1]);
        assert!(!list.move_to_front(3));
        assert_eq!(list.len(), 3);
        list.check_invariants().unwrap();
    }

    #[test]
    fn index_list_pop_back_drains_lru_first() {
        let mut list = IndexList::try_new(3).unwrap();
        list.push_front(0);
        list.push_front(1);
        list.push_front(2);
        assert_eq!(list.pop_back(), Some(0));
        assert_eq!(list.pop_back(), Some(1));
        assert_eq!(list.pop_back(), Some(2));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
        list.check_invariants().unwrap();
    }

    #[test]
    fn index_list_clear_detaches_everything() {
        let mut list = IndexList::try_new(3).unwrap();
        list.push_front(0);
        list.push_front(2);
        list.clear();
        assert!(list.is_empty());
        assert!(!list.contains(0));
        assert!(!list.contains(2));
        list.push_front(2);
        assert_eq!(list.debug_snapshot(), vec![2]);
        list.check_invariants().unwrap();
    }

    #[test]
    fn index_list_zero_keys_has_only_sentinel() {
        let list = IndexList::try_new(0).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);
        list.check_invariants().unwrap();
    }

    #[test]
    #[should_panic(expected = "already linked")]
    fn index_list_double_insert_panics() {
        let mut list = IndexList::try_new(2).unwrap();
        list.push_front(1);
        list.push_front(1);
    }

    #[test]
    #[should_panic(expected = "outside key space")]
    fn index_list_out_of_range_key_panics() {
        let list = IndexList::try_new(2).unwrap();
        let _ = list.contains(2);
    }

    #[test]
    fn index_list_detects_half_linked_slot() {
        let mut list = IndexList::try_new(3).unwrap();
        list.push_front(0);
        list.links[1].next = 0;
        assert!(list.check_invariants().is_err());
    }
}
