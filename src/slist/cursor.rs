use super::{Node, SList};
use crate::{
    arena::Link,
    error::{fail, Error, Result},
    list::CursorState,
    policy::Policy,
    util::{FmtOption, Generation, ListId},
};
use core::{fmt, marker::PhantomData};

/// A detached, forward-only cursor over an [`SList`].
///
/// This behaves like the bidirectional [`list::Cursor`](crate::list::Cursor),
/// including its invalidation rules, but can only step forward and does not
/// track its position. Inserting before, or deleting, the current element
/// walks from the head of the list to find its predecessor.
///
/// # Examples
///
/// ```
/// use tendril::SList;
///
/// let mut list = SList::new().unwrap();
/// for i in [1, 2, 3, 4, 5] {
///     list.push_back(i).unwrap();
/// }
///
/// let mut cursor = list.cursor();
/// let evens = cursor.filter(&list, |x| x % 2 == 0).unwrap();
/// assert_eq!(evens.iter().copied().collect::<Vec<_>>(), [2, 4]);
///
/// let sum = cursor.reduce(&list, 0, |x, acc| *acc += x).unwrap();
/// assert_eq!(sum, 15);
/// ```
pub struct Cursor<T> {
    list: ListId,
    start: Link,
    current: Link,
    generation: Generation,
    invalidated: bool,
    _elem: PhantomData<fn() -> T>,
}

// === impl Cursor ===

impl<T> Cursor<T> {
    /// Returns a new cursor positioned at the head of `list`.
    #[must_use]
    pub fn new<P: Policy<T>>(list: &SList<T, P>) -> Self {
        Self {
            list: list.id,
            start: list.head,
            current: list.head,
            generation: list.generation,
            invalidated: false,
            _elem: PhantomData,
        }
    }

    /// Returns the state of this cursor relative to `list`.
    #[must_use]
    pub fn state<P: Policy<T>>(&self, list: &SList<T, P>) -> CursorState {
        if self.is_stale(list) {
            CursorState::Invalidated
        } else if self.current.is_some() {
            CursorState::Active
        } else {
            CursorState::PastEnd
        }
    }

    /// Returns `true` if the cursor is positioned on an element.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    pub fn has_next<P: Policy<T>>(&mut self, list: &SList<T, P>) -> Result<bool> {
        self.validate("slist::Cursor::has_next", list)?;
        Ok(self.current.is_some())
    }

    /// Returns the current element without moving the cursor.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    /// - [`Error::IteratorExhausted`] if the cursor is past the end.
    pub fn current_element<'list, P: Policy<T>>(
        &mut self,
        list: &'list SList<T, P>,
    ) -> Result<&'list T> {
        const OP: &str = "slist::Cursor::current_element";
        self.validate(OP, list)?;
        match self.current {
            Some(id) => Ok(&list.nodes[id].value),
            None => fail(OP, Error::IteratorExhausted),
        }
    }

    /// Returns the current element and advances the cursor.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    /// - [`Error::IteratorExhausted`] if the cursor is past the end.
    pub fn step_forward<'list, P: Policy<T>>(
        &mut self,
        list: &'list SList<T, P>,
    ) -> Result<&'list T> {
        const OP: &str = "slist::Cursor::step_forward";
        self.validate(OP, list)?;
        let Some(id) = self.current else {
            return fail(OP, Error::IteratorExhausted);
        };

        let node = &list.nodes[id];
        self.current = node.next;
        Ok(&node.value)
    }

    /// Moves the cursor back to the start of the list.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    pub fn reset<P: Policy<T>>(&mut self, list: &SList<T, P>) -> Result<()> {
        self.validate("slist::Cursor::reset", list)?;
        self.current = self.start;
        Ok(())
    }

    /// Duplicates `element` and inserts it after the current element, or at
    /// the back of the list if the cursor is past the end. The cursor does
    /// not move.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    /// - [`Error::OutOfMemory`] if the element could not be stored.
    pub fn insert_after<P: Policy<T>>(
        &mut self,
        list: &mut SList<T, P>,
        element: &T,
    ) -> Result<()> {
        const OP: &str = "slist::Cursor::insert_after";
        self.validate(OP, list)?;
        let value = list.duplicate(OP, element)?;
        let prev = match self.current {
            Some(id) => Some(id),
            None => list.tail,
        };
        list.link_after(prev, value);
        self.resync(list);
        Ok(())
    }

    /// Duplicates `element` and inserts it before the current element, or at
    /// the back of the list if the cursor is past the end. The cursor does
    /// not move.
    ///
    /// This walks from the head of the list to find the current element's
    /// predecessor, so it is *O*(*n*).
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    /// - [`Error::OutOfMemory`] if the element could not be stored.
    pub fn insert_before<P: Policy<T>>(
        &mut self,
        list: &mut SList<T, P>,
        element: &T,
    ) -> Result<()> {
        const OP: &str = "slist::Cursor::insert_before";
        self.validate(OP, list)?;
        let value = list.duplicate(OP, element)?;
        let prev = if self.current == self.start {
            None
        } else {
            list.predecessor(self.current)
        };
        list.link_after(prev, value);
        self.resync(list);
        Ok(())
    }

    /// Removes the current element and releases it through the list's
    /// policy.
    ///
    /// The cursor moves to the removed element's successor, or to its
    /// predecessor if it was the last element. Finding the predecessor walks
    /// from the head of the list.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    /// - [`Error::IteratorExhausted`] if the cursor is past the end.
    pub fn delete_current<P: Policy<T>>(&mut self, list: &mut SList<T, P>) -> Result<()> {
        const OP: &str = "slist::Cursor::delete_current";
        self.validate(OP, list)?;
        let Some(id) = self.current else {
            return fail(OP, Error::IteratorExhausted);
        };

        let prev = list.predecessor(Some(id));
        let Node { value, next } = list.unlink_after(prev, id);
        list.policy.release(value);
        self.current = next.or(prev);

        self.resync(list);
        tracing::trace!(len = list.len, "{OP}");
        Ok(())
    }

    /// Builds a new list by applying `transform` to every element, from the
    /// start of the list. The cursor does not move.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    /// - [`Error::OutOfMemory`] if the new list could not grow.
    pub fn map<P, F>(&mut self, list: &SList<T, P>, mut transform: F) -> Result<SList<T, P>>
    where
        P: Policy<T> + Clone,
        F: FnMut(&T) -> T,
    {
        const OP: &str = "slist::Cursor::map";
        let mut out = SList::with_policy(list.policy.clone())?;
        self.traverse(OP, list, |element| {
            out.reserve(OP)?;
            out.link_after(out.tail, transform(element));
            Ok(())
        })?;
        Ok(out)
    }

    /// Builds a new list of the elements matching `predicate`, duplicated
    /// through the policy. The cursor does not move.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    /// - [`Error::OutOfMemory`] if an element could not be duplicated.
    pub fn filter<P, F>(&mut self, list: &SList<T, P>, mut predicate: F) -> Result<SList<T, P>>
    where
        P: Policy<T> + Clone,
        F: FnMut(&T) -> bool,
    {
        const OP: &str = "slist::Cursor::filter";
        let mut out = SList::with_policy(list.policy.clone())?;
        self.traverse(OP, list, |element| {
            if predicate(element) {
                let value = out.duplicate(OP, element)?;
                out.link_after(out.tail, value);
            }
            Ok(())
        })?;
        Ok(out)
    }

    /// Folds every element into an accumulator starting with `seed`. The
    /// cursor does not move.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    /// - [`Error::EmptyCollection`] if the list has no elements.
    pub fn reduce<P, A, F>(&mut self, list: &SList<T, P>, seed: A, mut combine: F) -> Result<A>
    where
        P: Policy<T>,
        F: FnMut(&T, &mut A),
    {
        const OP: &str = "slist::Cursor::reduce";
        self.validate(OP, list)?;
        if list.is_empty() {
            return fail(OP, Error::EmptyCollection);
        }

        let mut acc = seed;
        self.traverse(OP, list, |element| {
            combine(element, &mut acc);
            Ok(())
        })?;
        Ok(acc)
    }

    fn traverse<'list, P: Policy<T>>(
        &mut self,
        op: &'static str,
        list: &'list SList<T, P>,
        mut f: impl FnMut(&'list T) -> Result<()>,
    ) -> Result<()> {
        self.validate(op, list)?;
        let saved = self.current;

        let mut curr = self.start;
        let mut result = Ok(());
        while let Some(id) = curr {
            let node = &list.nodes[id];
            if let Err(error) = f(&node.value) {
                result = Err(error);
                break;
            }
            curr = node.next;
        }

        self.current = saved;
        result
    }

    fn is_stale<P: Policy<T>>(&self, list: &SList<T, P>) -> bool {
        self.invalidated || self.list != list.id || self.generation != list.generation
    }

    fn validate<P: Policy<T>>(&mut self, op: &'static str, list: &SList<T, P>) -> Result<()> {
        if self.is_stale(list) {
            if !self.invalidated {
                tracing::debug!(
                    op,
                    cursor.list = ?self.list,
                    list.id = ?list.id,
                    cursor.generation = ?self.generation,
                    list.generation = ?list.generation,
                    "cursor invalidated",
                );
            }
            self.invalidated = true;
            return fail(op, Error::InvalidIterator);
        }
        Ok(())
    }

    fn resync<P: Policy<T>>(&mut self, list: &SList<T, P>) {
        self.start = list.head;
        self.generation = list.generation;
    }
}

impl<T> Clone for Cursor<T> {
    fn clone(&self) -> Self {
        Self {
            _elem: PhantomData,
            ..*self
        }
    }
}

impl<T> fmt::Debug for Cursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("slist::Cursor")
            .field("list", &self.list)
            .field("start", &FmtOption::new(&self.start))
            .field("current", &FmtOption::new(&self.current))
            .field("generation", &self.generation)
            .field("invalidated", &self.invalidated)
            .finish()
    }
}
