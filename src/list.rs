//! A doubly-linked list with a detached, bidirectional [`Cursor`].
//!
//! See the [`List`] type for details.
use crate::{
    arena::{Arena, Link, NodeId},
    error::{fail, Error, Result},
    policy::{DefaultPolicy, Policy},
    util::{FmtOption, Generation, ListId},
};
use core::{cmp::Ordering, fmt, iter::FusedIterator, mem};

mod cursor;
pub use self::cursor::{Cursor, CursorState};

#[cfg(test)]
mod tests;

/// A doubly-linked list.
///
/// Elements are stored in arena-allocated nodes which are linked to their
/// neighbours in both directions, so a list supports *O*(1) insertion and
/// removal at either end, and *O*(1) insertion and removal at the position
/// of a [`Cursor`].
///
/// Each list carries a [`Policy`] describing how elements are duplicated
/// when inserted by reference, released when they leave the list, and
/// compared when searching for a value to remove. By default this is
/// [`DefaultPolicy`], which uses [`Clone`], [`Drop`] and [`Ord`].
///
/// # Examples
///
/// Using a `List` as a first-in, first-out (FIFO) queue with
/// [`List::push_back`] and [`List::pop_front`]:
///
/// ```
/// use tendril::List;
///
/// let mut list = List::new().unwrap();
///
/// for i in 0..5 {
///     list.push_back(i).unwrap();
/// }
///
/// for i in 0..5 {
///     assert_eq!(list.pop_front(), Ok(i), "entries are dequeued in FIFO order");
/// }
///
/// assert!(list.is_empty());
/// ```
///
/// Inserting elements by reference duplicates them through the list's
/// policy, leaving the caller's value untouched:
///
/// ```
/// use tendril::List;
///
/// let greeting = String::from("hello");
/// let mut list = List::new().unwrap();
/// list.insert_back(&greeting).unwrap();
/// list.insert_front(&String::from("oh,")).unwrap();
///
/// assert_eq!(list.peek_head().map(String::as_str), Ok("oh,"));
/// assert_eq!(list.peek_tail(), Ok(&greeting));
/// ```
pub struct List<T, P: Policy<T> = DefaultPolicy> {
    nodes: Arena<Node<T>>,
    head: Link,
    tail: Link,
    len: usize,
    id: ListId,
    generation: Generation,
    policy: P,
}

/// Iterates over the elements of a [`List`] by reference.
///
/// This type is returned by [`List::iter`].
pub struct Iter<'list, T> {
    nodes: &'list Arena<Node<T>>,
    front: Link,
    back: Link,
    remaining: usize,
}

/// An owning iterator over the elements of a [`List`].
///
/// Elements yielded by this iterator are handed to the caller, not released
/// through the list's [`Policy`]. Any elements not consumed are released when
/// the iterator is dropped.
pub struct IntoIter<T, P: Policy<T> = DefaultPolicy> {
    list: List<T, P>,
}

struct Node<T> {
    value: T,
    next: Link,
    prev: Link,
}

// === impl List ===

impl<T: Clone + Ord> List<T> {
    /// Returns a new empty list using the [`DefaultPolicy`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `T` is a zero-sized type.
    pub fn new() -> Result<Self> {
        Self::with_policy(DefaultPolicy)
    }
}

impl<T, P: Policy<T>> List<T, P> {
    /// Returns a new empty list which uses `policy` to duplicate, release,
    /// and compare its elements.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `T` is a zero-sized type.
    pub fn with_policy(policy: P) -> Result<Self> {
        if mem::size_of::<T>() == 0 {
            return fail(
                "List::with_policy",
                Error::InvalidArgument("element type must not be zero-sized"),
            );
        }

        let list = Self {
            nodes: Arena::new(),
            head: None,
            tail: None,
            len: 0,
            id: ListId::next(),
            generation: Generation::default(),
            policy,
        };
        tracing::trace!(list.id = ?list.id, "List::with_policy");
        Ok(list)
    }

    /// Returns the number of elements in the list.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if this list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        if self.head.is_none() {
            debug_assert!(
                self.tail.is_none(),
                "inconsistent state: a list had a tail but no head!"
            );
            debug_assert_eq!(self.len, 0, "inconsistent state: a list had no head but a len!");
            return true;
        }

        false
    }

    /// Returns a reference to this list's [`Policy`].
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Replaces this list's [`Policy`], returning the previous one.
    ///
    /// Elements already in the list are unaffected until they are compared
    /// or released, at which point the new policy applies.
    pub fn set_policy(&mut self, policy: P) -> P {
        mem::replace(&mut self.policy, policy)
    }

    /// Duplicates `element` through the list's policy and links the copy as
    /// the new head of the list.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfMemory`] if a node could not be allocated or the
    ///   policy failed to duplicate `element`. The list is unchanged.
    pub fn insert_front(&mut self, element: &T) -> Result<()> {
        let value = self.duplicate("List::insert_front", element)?;
        self.link_between(None, self.head, value);
        Ok(())
    }

    /// Duplicates `element` through the list's policy and links the copy as
    /// the new tail of the list.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfMemory`] if a node could not be allocated or the
    ///   policy failed to duplicate `element`. The list is unchanged.
    pub fn insert_back(&mut self, element: &T) -> Result<()> {
        let value = self.duplicate("List::insert_back", element)?;
        self.link_between(self.tail, None, value);
        Ok(())
    }

    /// Moves `element` into a new node at the head of the list.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfMemory`] if a node could not be allocated. The list is
    ///   unchanged and `element` is dropped.
    pub fn push_front(&mut self, element: T) -> Result<()> {
        self.reserve("List::push_front")?;
        self.link_between(None, self.head, element);
        Ok(())
    }

    /// Moves `element` into a new node at the tail of the list.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfMemory`] if a node could not be allocated. The list is
    ///   unchanged and `element` is dropped.
    pub fn push_back(&mut self, element: T) -> Result<()> {
        self.reserve("List::push_back")?;
        self.link_between(self.tail, None, element);
        Ok(())
    }

    /// Removes the head of the list and returns it to the caller.
    ///
    /// The element is *not* released through the list's policy; ownership
    /// passes to the caller.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyCollection`] if the list is empty.
    pub fn pop_front(&mut self) -> Result<T> {
        match self.head {
            Some(head) => Ok(self.unlink(head).value),
            None => fail("List::pop_front", Error::EmptyCollection),
        }
    }

    /// Removes the tail of the list and returns it to the caller.
    ///
    /// The element is *not* released through the list's policy; ownership
    /// passes to the caller.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyCollection`] if the list is empty.
    pub fn pop_back(&mut self) -> Result<T> {
        match self.tail {
            Some(tail) => Ok(self.unlink(tail).value),
            None => fail("List::pop_back", Error::EmptyCollection),
        }
    }

    /// Removes and releases the first element, starting from the head, that
    /// the list's policy compares as equal to `element`.
    ///
    /// Only the first match is removed. This is an *O*(*n*) operation.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyCollection`] if the list is empty.
    /// - [`Error::NotFound`] if no element matches.
    pub fn remove_first_matching(&mut self, element: &T) -> Result<()> {
        if self.is_empty() {
            return fail("List::remove_first_matching", Error::EmptyCollection);
        }

        let mut curr = self.head;
        while let Some(id) = curr {
            let node = &self.nodes[id];
            if self.policy.compare(&node.value, element) == Ordering::Equal {
                let Node { value, .. } = self.unlink(id);
                self.policy.release(value);
                return Ok(());
            }
            curr = node.next;
        }

        fail("List::remove_first_matching", Error::NotFound)
    }

    /// Returns a reference to the element at the head of the list.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyCollection`] if the list is empty.
    pub fn peek_head(&self) -> Result<&T> {
        match self.head {
            Some(head) => Ok(&self.nodes[head].value),
            None => fail("List::peek_head", Error::EmptyCollection),
        }
    }

    /// Returns a reference to the element at the tail of the list.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyCollection`] if the list is empty.
    pub fn peek_tail(&self) -> Result<&T> {
        match self.tail {
            Some(tail) => Ok(&self.nodes[tail].value),
            None => fail("List::peek_tail", Error::EmptyCollection),
        }
    }

    /// Removes every element from the list, releasing each through the
    /// list's policy in head-to-tail order.
    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }

        let mut curr = self.head.take();
        self.tail = None;
        while let Some(id) = curr {
            let Some(node) = self.nodes.remove(id) else {
                unreachable!("list node {id:?} is not in the arena");
            };
            curr = node.next;
            self.policy.release(node.value);
        }
        debug_assert_eq!(self.nodes.len(), 0, "cleared list leaked nodes");

        tracing::trace!(list.id = ?self.id, len = self.len, "List::clear");
        self.nodes.clear();
        self.len = 0;
        self.generation.bump();
    }

    /// Destroys the list, releasing every element through its policy.
    ///
    /// This consumes the list, so it cannot be used (or destroyed) again.
    /// Simply dropping a list has the same effect.
    pub fn destroy(mut self) {
        self.clear();
    }

    /// Returns a new [`Cursor`] positioned at the head of this list.
    ///
    /// The cursor does not borrow the list; each cursor operation is given
    /// the list explicitly. If the list is structurally changed other than
    /// through this cursor, the cursor's next operation fails with
    /// [`Error::InvalidIterator`].
    #[must_use]
    pub fn cursor(&self) -> Cursor<T> {
        Cursor::new(self)
    }

    /// Returns an iterator over the elements of this list, by reference.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// Asserts as many of the linked list's invariants as possible.
    #[track_caller]
    pub fn assert_valid(&self) {
        let head = match self.head {
            Some(head) => head,
            None => {
                assert!(
                    self.tail.is_none(),
                    "if the linked list's head is null, the tail must also be null"
                );
                assert_eq!(self.len, 0, "if the linked list's head is null, its len must be 0");
                assert_eq!(self.nodes.len(), 0, "an empty list must not own any nodes");
                return;
            }
        };

        let Some(tail) = self.tail else {
            panic!("if the linked list has a head, it must also have a tail");
        };
        assert_eq!(
            self.nodes[head].prev, None,
            "head node must not have a prev link"
        );
        assert_eq!(
            self.nodes[tail].next, None,
            "tail node must not have a next link"
        );
        assert_eq!(
            self.nodes.len(),
            self.len,
            "the arena must hold exactly `len` nodes"
        );

        let mut forward = 0;
        let mut prev = None;
        let mut curr = Some(head);
        while let Some(id) = curr {
            let node = &self.nodes[id];
            assert_eq!(node.prev, prev, "node {id:?}'s prev link is inconsistent");
            assert_ne!(node.next, Some(id), "node {id:?}'s next link cannot be to itself");
            forward += 1;
            assert!(
                forward <= self.len,
                "walking forward from the head visited more than `len` nodes; the list has a cycle"
            );
            prev = curr;
            curr = node.next;
        }
        assert_eq!(prev, Some(tail), "walking forward from the head must end at the tail");
        assert_eq!(forward, self.len, "`len` must match the number of linked nodes");

        let mut backward = 0;
        let mut curr = Some(tail);
        while let Some(id) = curr {
            backward += 1;
            assert!(backward <= self.len, "walking backward from the tail found a cycle");
            curr = self.nodes[id].prev;
        }
        assert_eq!(backward, self.len, "the backward walk must visit `len` nodes");
    }

    // === structural primitives ===

    fn reserve(&mut self, op: &'static str) -> Result<()> {
        self.nodes.reserve_one().or_else(|error| fail(op, error))
    }

    /// Reserves a slot and duplicates `element` through the policy.
    fn duplicate(&mut self, op: &'static str, element: &T) -> Result<T> {
        self.reserve(op)?;
        match self.policy.copy(element) {
            Some(value) => Ok(value),
            None => fail(op, Error::OutOfMemory),
        }
    }

    /// Links a new node holding `value` between `prev` and `next`, which must
    /// be adjacent (or the corresponding end of the list).
    ///
    /// A slot must have been reserved beforehand.
    fn link_between(&mut self, prev: Link, next: Link, value: T) -> NodeId {
        debug_assert_eq!(prev.map_or(self.head, |prev| self.nodes[prev].next), next);
        let id = self.nodes.insert(Node { value, next, prev });

        match prev {
            Some(prev) => self.nodes[prev].next = Some(id),
            None => self.head = Some(id),
        }
        match next {
            Some(next) => self.nodes[next].prev = Some(id),
            None => self.tail = Some(id),
        }

        self.len += 1;
        self.generation.bump();
        tracing::trace!(list.id = ?self.id, node = ?id, len = self.len, "linked");
        id
    }

    /// Unlinks the node `id` from the list, repairing its neighbours and
    /// the head and tail, and removes it from the arena.
    fn unlink(&mut self, id: NodeId) -> Node<T> {
        let Some(node) = self.nodes.remove(id) else {
            unreachable!("list node {id:?} is not in the arena");
        };

        match node.prev {
            Some(prev) => self.nodes[prev].next = node.next,
            None => {
                debug_assert_eq!(self.head, Some(id), "node without prev must be the head");
                self.head = node.next;
            }
        }
        match node.next {
            Some(next) => self.nodes[next].prev = node.prev,
            None => {
                debug_assert_eq!(self.tail, Some(id), "node without next must be the tail");
                self.tail = node.prev;
            }
        }

        self.len -= 1;
        self.generation.bump();
        tracing::trace!(list.id = ?self.id, node = ?id, len = self.len, "unlinked");
        node
    }
}

impl<T, P: Policy<T>> Drop for List<T, P> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: fmt::Debug, P: Policy<T>> fmt::Debug for List<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("id", &self.id)
            .field("head", &FmtOption::new(&self.head))
            .field("tail", &FmtOption::new(&self.tail))
            .field("len", &self.len)
            .field("generation", &self.generation)
            .field("elements", &DebugElements(self))
            .finish()
    }
}

struct DebugElements<'a, T, P: Policy<T>>(&'a List<T, P>);

impl<T: fmt::Debug, P: Policy<T>> fmt::Debug for DebugElements<'_, T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl<'list, T, P: Policy<T>> IntoIterator for &'list List<T, P> {
    type Item = &'list T;
    type IntoIter = Iter<'list, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, P: Policy<T>> IntoIterator for List<T, P> {
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
        if self.remaining == 0 {
            return None;
        }

        let node = &self.nodes[self.front?];
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = &self.nodes[self.back?];
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("front", &FmtOption::new(&self.front))
            .field("back", &FmtOption::new(&self.back))
            .field("remaining", &self.remaining)
            .finish()
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

impl<T, P: Policy<T>> DoubleEndedIterator for IntoIter<T, P> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.list.is_empty() {
            return None;
        }
        self.list.pop_back().ok()
    }
}

impl<T, P: Policy<T>> ExactSizeIterator for IntoIter<T, P> {}
impl<T, P: Policy<T>> FusedIterator for IntoIter<T, P> {}

impl<T: fmt::Debug, P: Policy<T>> fmt::Debug for IntoIter<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.list).finish()
    }
}
