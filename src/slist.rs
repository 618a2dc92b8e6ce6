//! A singly-linked list with a detached, forward-only [`Cursor`].
//!
//! [`SList`] is the forward-linked sibling of [`List`](crate::List). Its nodes
//! carry no back-links, so it cannot be walked backwards, and removing a node
//! requires finding its predecessor by walking from the head.
use crate::{
    arena::{Arena, Link, NodeId},
    error::{fail, Error, Result},
    policy::{DefaultPolicy, Policy},
    util::{FmtOption, Generation, ListId},
};
use core::{cmp::Ordering, fmt, iter::FusedIterator, mem};

mod cursor;
pub use self::cursor::Cursor;


/// A singly-linked list.
///
/// Supports *O*(1) insertion at either end and *O*(1) removal from the front.
/// Removing an arbitrary element is *O*(*n*).
///
/// Like [`List`](crate::List), each `SList` carries a [`Policy`] used to
/// duplicate, release, and compare its elements.
///
/// # Examples
///
/// ```
/// use tendril::SList;
///
/// let mut list = SList::new().unwrap();
/// list.insert_back(&"b").unwrap();
/// list.insert_back(&"c").unwrap();
/// list.insert_front(&"a").unwrap();
///
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), ["a", "b", "c"]);
///
/// list.remove_first_matching(&"b").unwrap();
/// assert_eq!(list.len(), 2);
/// assert_eq!(list.peek_tail(), Ok(&"c"));
/// ```
pub struct SList<T, P: Policy<T> = DefaultPolicy> {
    nodes: Arena<Node<T>>,
    head: Link,
    tail: Link,
    len: usize,
    id: ListId,
    generation: Generation,
    policy: P,
}

/// Iterates over the elements of an [`SList`] by reference.
pub struct Iter<'list, T> {
    nodes: &'list Arena<Node<T>>,
    next: Link,
    remaining: usize,
}

/// An owning iterator over the elements of an [`SList`].
///
/// Elements yielded by this iterator are handed to the caller, not released
/// through the list's [`Policy`].
pub struct IntoIter<T, P: Policy<T> = DefaultPolicy> {
    list: SList<T, P>,
}

struct Node<T> {
    value: T,
    next: Link,
}

// === impl SList ===

impl<T: Clone + Ord> SList<T> {
    /// Returns a new empty list using the [`DefaultPolicy`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `T` is a zero-sized type.
    pub fn new() -> Result<Self> {
        Self::with_policy(DefaultPolicy)
    }
}

impl<T, P: Policy<T>> SList<T, P> {
    /// Returns a new empty list which uses `policy` for its elements.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `T` is a zero-sized type.
    pub fn with_policy(policy: P) -> Result<Self> {
        if mem::size_of::<T>() == 0 {
            return fail(
                "SList::with_policy",
                Error::InvalidArgument("element type must not be zero-sized"),
            );
        }

        Ok(Self {
            nodes: Arena::new(),
            head: None,
            tail: None,
            len: 0,
            id: ListId::next(),
            generation: Generation::default(),
            policy,
        })
    }

    /// Returns the number of elements in the list.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list has no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns a reference to this list's [`Policy`].
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Replaces this list's [`Policy`], returning the previous one.
    pub fn set_policy(&mut self, policy: P) -> P {
        mem::replace(&mut self.policy, policy)
    }

    /// Duplicates `element` through the policy and links the copy at the
    /// head of the list.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfMemory`] if the element could not be stored. The list
    ///   is unchanged.
    pub fn insert_front(&mut self, element: &T) -> Result<()> {
        let value = self.duplicate("SList::insert_front", element)?;
        self.link_after(None, value);
        Ok(())
    }

    /// Duplicates `element` through the policy and links the copy at the
    /// tail of the list.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfMemory`] if the element could not be stored. The list
    ///   is unchanged.
    pub fn insert_back(&mut self, element: &T) -> Result<()> {
        let value = self.duplicate("SList::insert_back", element)?;
        self.link_after(self.tail, value);
        Ok(())
    }

    /// Moves `element` into a new node at the head of the list.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfMemory`] if a node could not be allocated.
    pub fn push_front(&mut self, element: T) -> Result<()> {
        self.reserve("SList::push_front")?;
        self.link_after(None, element);
        Ok(())
    }

    /// Moves `element` into a new node at the tail of the list.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfMemory`] if a node could not be allocated.
    pub fn push_back(&mut self, element: T) -> Result<()> {
        self.reserve("SList::push_back")?;
        self.link_after(self.tail, element);
        Ok(())
    }

    /// Removes the head of the list and returns it to the caller, without
    /// releasing it through the policy.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyCollection`] if the list is empty.
    pub fn pop_front(&mut self) -> Result<T> {
        match self.head {
            Some(head) => Ok(self.unlink_after(None, head).value),
            None => fail("SList::pop_front", Error::EmptyCollection),
        }
    }

    /// Removes and releases the first element that the policy compares as
    /// equal to `element`.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyCollection`] if the list is empty.
    /// - [`Error::NotFound`] if no element matches.
    pub fn remove_first_matching(&mut self, element: &T) -> Result<()> {
        if self.is_empty() {
            return fail("SList::remove_first_matching", Error::EmptyCollection);
        }

        let mut prev = None;
        let mut curr = self.head;
        while let Some(id) = curr {
            let node = &self.nodes[id];
            if self.policy.compare(&node.value, element) == Ordering::Equal {
                let Node { value, .. } = self.unlink_after(prev, id);
                self.policy.release(value);
                return Ok(());
            }
            prev = curr;
            curr = node.next;
        }

        fail("SList::remove_first_matching", Error::NotFound)
    }

    /// Returns a reference to the first element.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyCollection`] if the list is empty.
    pub fn peek_head(&self) -> Result<&T> {
        match self.head {
            Some(head) => Ok(&self.nodes[head].value),
            None => fail("SList::peek_head", Error::EmptyCollection),
        }
    }

    /// Returns a reference to the last element.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyCollection`] if the list is empty.
    pub fn peek_tail(&self) -> Result<&T> {
        match self.tail {
            Some(tail) => Ok(&self.nodes[tail].value),
            None => fail("SList::peek_tail", Error::EmptyCollection),
        }
    }

    /// Removes every element, releasing each through the policy in order.
    pub fn clear(&mut self) {
        let mut curr = self.head.take();
        if curr.is_none() {
            return;
        }

        self.tail = None;
        while let Some(id) = curr {
            let Some(node) = self.nodes.remove(id) else {
                unreachable!("list node {id:?} is not in the arena");
            };
            curr = node.next;
            self.policy.release(node.value);
        }

        tracing::trace!(list.id = ?self.id, len = self.len, "SList::clear");
        self.nodes.clear();
        self.len = 0;
        self.generation.bump();
    }

    /// Destroys the list, releasing every element through its policy.
    pub fn destroy(mut self) {
        self.clear();
    }

    /// Returns a new forward [`Cursor`] positioned at the head of this list.
    #[must_use]
    pub fn cursor(&self) -> Cursor<T> {
        Cursor::new(self)
    }

    /// Returns an iterator over the elements of this list, by reference.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            next: self.head,
            remaining: self.len,
        }
    }

    /// Asserts as many of the linked list's invariants as possible.
    #[track_caller]
    pub fn assert_valid(&self) {
        let Some(head) = self.head else {
            assert!(self.tail.is_none(), "an empty list must not have a tail");
            assert_eq!(self.len, 0, "an empty list must have len 0");
            assert_eq!(self.nodes.len(), 0, "an empty list must not own any nodes");
            return;
        };

        assert!(self.tail.is_some(), "a list with a head must have a tail");
        assert_eq!(self.nodes.len(), self.len, "the arena must hold exactly `len` nodes");

        let mut count = 0;
        let mut last = None;
        let mut curr = Some(head);
        while let Some(id) = curr {
            count += 1;
            assert!(count <= self.len, "walking from the head found a cycle");
            last = curr;
            curr = self.nodes[id].next;
        }
        assert_eq!(count, self.len, "`len` must match the number of linked nodes");
        assert_eq!(last, self.tail, "walking from the head must end at the tail");
    }

    // === structural primitives ===

    fn reserve(&mut self, op: &'static str) -> Result<()> {
        self.nodes.reserve_one().or_else(|error| fail(op, error))
    }

    fn duplicate(&mut self, op: &'static str, element: &T) -> Result<T> {
        self.reserve(op)?;
        match self.policy.copy(element) {
            Some(value) => Ok(value),
            None => fail(op, Error::OutOfMemory),
        }
    }

    /// Links a new node after `prev`, or at the head if `prev` is `None`.
    fn link_after(&mut self, prev: Link, value: T) -> NodeId {
        let next = match prev {
            Some(prev) => self.nodes[prev].next,
            None => self.head,
        };
        let id = self.nodes.insert(Node { value, next });

        match prev {
            Some(prev) => self.nodes[prev].next = Some(id),
            None => self.head = Some(id),
        }
        if next.is_none() {
            self.tail = Some(id);
        }

        self.len += 1;
        self.generation.bump();
        tracing::trace!(list.id = ?self.id, node = ?id, len = self.len, "linked");
        id
    }

    /// Unlinks `id`, whose predecessor is `prev` (`None` for the head).
    fn unlink_after(&mut self, prev: Link, id: NodeId) -> Node<T> {
        let Some(node) = self.nodes.remove(id) else {
            unreachable!("list node {id:?} is not in the arena");
        };

        match prev {
            Some(prev) => {
                debug_assert_eq!(self.nodes[prev].next, Some(id));
                self.nodes[prev].next = node.next;
            }
            None => self.head = node.next,
        }
        if node.next.is_none() {
            self.tail = prev;
        }

        self.len -= 1;
        self.generation.bump();
        tracing::trace!(list.id = ?self.id, node = ?id, len = self.len, "unlinked");
        node
    }

    /// Returns the predecessor of `target`, walking from the head. `target`
    /// of `None` finds the tail.
    fn predecessor(&self, target: Link) -> Link {
        let mut prev = None;
        let mut curr = self.head;
        while curr != target {
            let id = curr?;
            prev = curr;
            curr = self.nodes[id].next;
        }
        prev
    }
}

impl<T, P: Policy<T>> Drop for SList<T, P> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: fmt::Debug, P: Policy<T>> fmt::Debug for SList<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SList")
            .field("id", &self.id)
            .field("head", &FmtOption::new(&self.head))
            .field("tail", &FmtOption::new(&self.tail))
            .field("len", &self.len)
            .field("generation", &self.generation)
            .field("elements", &self.iter())
            .finish()
    }
}

impl<'list, T, P: Policy<T>> IntoIterator for &'list SList<T, P> {
    type Item = &'list T;
    type IntoIter = Iter<'list, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, P: Policy<T>> IntoIterator for SList<T, P> {
    type Item = T;
    type IntoIter = IntoIter<T, P>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

// === impl Iter ===

impl<'list, T> Iterator for Iter<'list, T> {
    type Item = &'list T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.nodes[self.next?];
        self.next = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

/// Formats the remaining elements as a list.
impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

// === impl IntoIter ===

impl<T, P: Policy<T>> Iterator for IntoIter<T, P> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.list.is_empty() {
            return None;
        }
        self.list.pop_front().ok()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len, Some(self.list.len))
    }
}

impl<T, P: Policy<T>> ExactSizeIterator for IntoIter<T, P> {}
impl<T, P: Policy<T>> FusedIterator for IntoIter<T, P> {}

impl<T: fmt::Debug, P: Policy<T>> fmt::Debug for IntoIter<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.list).finish()
    }
}
