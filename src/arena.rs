//! Slot storage for list nodes.
//!
//! Nodes live in a growable vector of slots and refer to one another by
//! [`NodeId`] rather than by pointer. Freed slots are threaded onto an
//! intrusive free list and reused by later insertions, so a `NodeId` stays
//! valid for exactly as long as the node it names is in the arena.
use crate::error::Error;
use core::{
    fmt,
    num::NonZeroUsize,
    ops::{Index, IndexMut},
};

/// The stable index of a node in an [`Arena`].
///
/// Stored as `index + 1` so that `Option<NodeId>` is the same size as a
/// `usize`.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(NonZeroUsize);

pub(crate) type Link = Option<NodeId>;

pub(crate) struct Arena<N> {
    slots: Vec<Slot<N>>,
    /// Head of the free list.
    free: Link,
    len: usize,
}

enum Slot<N> {
    Occupied(N),
    Vacant { next_free: Link },
}

// === impl NodeId ===

impl NodeId {
    #[inline]
    fn from_index(index: usize) -> Self {
        match NonZeroUsize::new(index.wrapping_add(1)) {
            Some(id) => Self(id),
            None => unreachable!("arena index overflowed usize"),
        }
    }

    #[inline]
    fn index(self) -> usize {
        self.0.get() - 1
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

// === impl Arena ===

impl<N> Arena<N> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            len: 0,
        }
    }

    /// Returns the number of occupied slots.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Ensures that the next call to [`Arena::insert`] will not allocate.
    ///
    /// If a vacant slot is available, this does nothing. Otherwise, space
    /// for one more slot is reserved, failing with [`Error::OutOfMemory`] if
    /// the allocation fails.
    pub(crate) fn reserve_one(&mut self) -> Result<(), Error> {
        if self.free.is_some() {
            return Ok(());
        }

        self.slots.try_reserve(1).map_err(|error| {
            tracing::debug!(%error, slots = self.slots.len(), "arena: failed to grow");
            Error::OutOfMemory
        })
    }

    /// Stores `node` in a vacant slot, returning its ID.
    ///
    /// Does not allocate if [`Arena::reserve_one`] was called first.
    pub(crate) fn insert(&mut self, node: N) -> NodeId {
        self.len += 1;
        match self.free {
            Some(id) => {
                let slot = &mut self.slots[id.index()];
                self.free = match *slot {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => unreachable!("free list points at occupied slot {id:?}"),
                };
                *slot = Slot::Occupied(node);
                id
            }
            None => {
                let id = NodeId::from_index(self.slots.len());
                self.slots.push(Slot::Occupied(node));
                id
            }
        }
    }

    /// Removes the node with the given ID, returning it.
    ///
    /// Returns `None` if the slot is already vacant.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<N> {
        let slot = self.slots.get_mut(id.index())?;
        if let Slot::Vacant { .. } = slot {
            return None;
        }

        let old = core::mem::replace(
            slot,
            Slot::Vacant {
                next_free: self.free,
            },
        );
        self.free = Some(id);
        self.len -= 1;
        match old {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> Option<&N> {
        match self.slots.get(id.index())? {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut N> {
        match self.slots.get_mut(id.index())? {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    /// Drops every slot and releases the backing allocation.
    ///
    /// Nodes still in the arena are dropped without ceremony; callers which
    /// need to observe each node must remove them first.
    pub(crate) fn clear(&mut self) {
        self.slots = Vec::new();
        self.free = None;
        self.len = 0;
    }
}

impl<N> Index<NodeId> for Arena<N> {
    type Output = N;

    #[inline]
    #[track_caller]
    fn index(&self, id: NodeId) -> &N {
        match self.get(id) {
            Some(node) => node,
            None => panic!("arena: dangling node ID {id:?}"),
        }
    }
}

impl<N> IndexMut<NodeId> for Arena<N> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, id: NodeId) -> &mut N {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("arena: dangling node ID {id:?}"),
        }
    }
}

impl<N> fmt::Debug for Arena<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("len", &self.len)
            .field("slots", &self.slots.len())
            .field("free", &crate::util::FmtOption::new(&self.free))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_node_id_is_pointer_sized() {
        assert_eq!(
            core::mem::size_of::<Link>(),
            core::mem::size_of::<usize>()
        );
    }

    #[test]
    fn insert_get_remove() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena[a], "a");
        assert_eq!(arena.get(b), Some(&"b"));

        assert_eq!(arena.remove(a), Some("a"));
        assert_eq!(arena.remove(a), None);
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn reuses_vacant_slots() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);
        let c = arena.insert(3);

        arena.remove(b);
        arena.remove(a);

        // freed slots are reused most-recently-freed first
        arena.reserve_one().unwrap();
        assert_eq!(arena.insert(4), a);
        assert_eq!(arena.insert(5), b);
        let d = arena.insert(6);
        assert_ne!(d, c);

        assert_eq!(arena[a], 4);
        assert_eq!(arena[b], 5);
        assert_eq!(arena[c], 3);
        assert_eq!(arena[d], 6);
        assert_eq!(arena.len(), 4);
    }

    #[test]
    #[should_panic]
    fn index_vacant_panics() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        arena.remove(a);
        let _value: i32 = arena[a];
    }

    #[test]
    fn clear() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        arena.insert(2);
        arena.clear();
        assert_eq!(arena.len(), 0);
        assert_eq!(arena.get(a), None);
    }
}
