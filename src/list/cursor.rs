use super::{List, Node};
use crate::{
    arena::Link,
    error::{fail, Error, Result},
    policy::Policy,
    util::{FmtOption, Generation, ListId},
};
use core::{fmt, marker::PhantomData};

/// A detached, bidirectional cursor over a [`List`].
///
/// Unlike a borrowing iterator, a `Cursor` does not hold a reference to its
/// list. Instead, the list is passed to every cursor operation. This allows
/// any number of cursors to exist alongside the list, and allows the list
/// to be mutated directly while cursors are outstanding.
///
/// In exchange, every operation first checks that the cursor is still
/// valid: that it is being used with the list it was created from, and that
/// the list has not been structurally changed (by an insert or delete)
/// other than through this cursor. If either check fails, the operation
/// returns [`Error::InvalidIterator`], and the cursor remains
/// [invalidated](CursorState::Invalidated) for the rest of its life.
///
/// A cursor has a *current* element, or is past the end of the list. Its
/// [`position`](Cursor::position) is the index of the current element, or
/// the length of the list when it is past the end.
///
/// # Examples
///
/// ```
/// use tendril::{list::CursorState, List};
///
/// let mut list = List::new().unwrap();
/// for i in 1..=3 {
///     list.push_back(i).unwrap();
/// }
///
/// let mut cursor = list.cursor();
/// assert_eq!(cursor.step_forward(&list), Ok(&1));
/// assert_eq!(cursor.current_element(&list), Ok(&2));
///
/// // insert through the cursor; it remains valid.
/// cursor.insert_before(&mut list, &10).unwrap();
/// assert_eq!(cursor.position(&list), Ok(2));
///
/// // mutate the list directly; the cursor is now stale.
/// list.pop_back().unwrap();
/// assert_eq!(cursor.state(&list), CursorState::Invalidated);
/// ```
pub struct Cursor<T> {
    list: ListId,
    start: Link,
    current: Link,
    position: usize,
    generation: Generation,
    invalidated: bool,
    _elem: PhantomData<fn() -> T>,
}

/// The state of a [`Cursor`] relative to its list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CursorState {
    /// The cursor is positioned on an element.
    Active,
    /// The cursor is positioned one past the last element of the list.
    PastEnd,
    /// The list was structurally changed through another handle, or the
    /// cursor was used with a different list.
    Invalidated,
}

/// A saved cursor position, restored after a traversal algorithm runs.
struct Mark {
    current: Link,
    position: usize,
}

// === impl Cursor ===

impl<T> Cursor<T> {
    /// Returns a new cursor over `list`, positioned at its head.
    ///
    /// If `list` is empty, the cursor starts [past the
    /// end](CursorState::PastEnd).
    #[must_use]
    pub fn new<P: Policy<T>>(list: &List<T, P>) -> Self {
        Self {
            list: list.id,
            start: list.head,
            current: list.head,
            position: 0,
            generation: list.generation,
            invalidated: false,
            _elem: PhantomData,
        }
    }

    /// Returns the state of this cursor relative to `list`.
    ///
    /// This does not itself invalidate the cursor; a cursor reported as
    /// [`Invalidated`](CursorState::Invalidated) becomes permanently
    /// invalid on its next operation.
    #[must_use]
    pub fn state<P: Policy<T>>(&self, list: &List<T, P>) -> CursorState {
        if self.is_stale(list) {
            CursorState::Invalidated
        } else if self.current.is_some() {
            CursorState::Active
        } else {
            CursorState::PastEnd
        }
    }

    /// Returns the index of the cursor's current element, or the length of
    /// the list if the cursor is past the end.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    pub fn position<P: Policy<T>>(&mut self, list: &List<T, P>) -> Result<usize> {
        self.validate("Cursor::position", list)?;
        Ok(self.position)
    }

    /// Returns `true` if the cursor is positioned on an element, so that
    /// [`step_forward`](Cursor::step_forward) would succeed.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    pub fn has_next<P: Policy<T>>(&mut self, list: &List<T, P>) -> Result<bool> {
        self.validate("Cursor::has_next", list)?;
        Ok(self.current.is_some())
    }

    /// Returns `true` if [`step_backward`](Cursor::step_backward) would
    /// succeed.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    pub fn has_previous<P: Policy<T>>(&mut self, list: &List<T, P>) -> Result<bool> {
        self.validate("Cursor::has_previous", list)?;
        Ok(self.current != self.start && !list.is_empty())
    }

    /// Returns the current element without moving the cursor.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    /// - [`Error::IteratorExhausted`] if the cursor is past the end.
    pub fn current_element<'list, P: Policy<T>>(
        &mut self,
        list: &'list List<T, P>,
    ) -> Result<&'list T> {
        self.validate("Cursor::current_element", list)?;
        match self.current {
            Some(id) => Ok(&list.nodes[id].value),
            None => fail("Cursor::current_element", Error::IteratorExhausted),
        }
    }

    /// Returns the current element and advances the cursor to the next one.
    ///
    /// Stepping forward from the last element moves the cursor past the end.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    /// - [`Error::IteratorExhausted`] if the cursor is already past the end.
    pub fn step_forward<'list, P: Policy<T>>(
        &mut self,
        list: &'list List<T, P>,
    ) -> Result<&'list T> {
        self.validate("Cursor::step_forward", list)?;
        let Some(id) = self.current else {
            return fail("Cursor::step_forward", Error::IteratorExhausted);
        };

        let node = &list.nodes[id];
        self.current = node.next;
        self.position += 1;
        Ok(&node.value)
    }

    /// Moves the cursor back one element and returns the element it now
    /// points at.
    ///
    /// Stepping back from past the end moves the cursor to the tail of the
    /// list.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    /// - [`Error::IteratorExhausted`] if the cursor is at the start of the
    ///   list.
    pub fn step_backward<'list, P: Policy<T>>(
        &mut self,
        list: &'list List<T, P>,
    ) -> Result<&'list T> {
        self.validate("Cursor::step_backward", list)?;
        if self.current == self.start {
            return fail("Cursor::step_backward", Error::IteratorExhausted);
        }

        let prev = match self.current {
            Some(id) => list.nodes[id].prev,
            None => list.tail,
        };
        let Some(prev) = prev else {
            unreachable!("a cursor not at the start must have a predecessor");
        };

        self.current = Some(prev);
        self.position -= 1;
        Ok(&list.nodes[prev].value)
    }

    /// Moves the cursor back to the start of the list, at position 0.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    pub fn reset<P: Policy<T>>(&mut self, list: &List<T, P>) -> Result<()> {
        self.validate("Cursor::reset", list)?;
        self.current = self.start;
        self.position = 0;
        Ok(())
    }

    /// Moves the cursor to the last element of the list.
    ///
    /// If the list is empty, the cursor remains past the end at position 0.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    pub fn seek_to_end<P: Policy<T>>(&mut self, list: &List<T, P>) -> Result<()> {
        self.validate("Cursor::seek_to_end", list)?;
        self.current = list.tail;
        self.position = list.len.saturating_sub(1);
        Ok(())
    }

    /// Moves the cursor to the element at `index`.
    ///
    /// The walk starts from whichever end of the list is closer, so this is
    /// *O*(min(`index`, `len - index`)).
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    /// - [`Error::OutOfRange`] if `index >= len`. The cursor does not move.
    pub fn seek_to_position<P: Policy<T>>(
        &mut self,
        list: &List<T, P>,
        index: usize,
    ) -> Result<()> {
        self.validate("Cursor::seek_to_position", list)?;
        let len = list.len;
        if index >= len {
            return fail("Cursor::seek_to_position", Error::OutOfRange { index, len });
        }

        let mut curr;
        if index < len / 2 {
            curr = self.start;
            for _ in 0..index {
                curr = curr.and_then(|id| list.nodes[id].next);
            }
        } else {
            curr = list.tail;
            for _ in index..len - 1 {
                curr = curr.and_then(|id| list.nodes[id].prev);
            }
        }
        debug_assert!(curr.is_some(), "seek to an in-range index ended on no node");

        tracing::trace!(index, len, "Cursor::seek_to_position");
        self.current = curr;
        self.position = index;
        Ok(())
    }

    /// Duplicates `element` through the list's policy and inserts it after
    /// the cursor's current element. The cursor does not move.
    ///
    /// If the cursor is past the end, the element is appended to the list
    /// and the cursor stays past the end.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    /// - [`Error::OutOfMemory`] if the element could not be stored. Neither
    ///   the list nor the cursor is changed.
    pub fn insert_after<P: Policy<T>>(&mut self, list: &mut List<T, P>, element: &T) -> Result<()> {
        const OP: &str = "Cursor::insert_after";
        self.validate(OP, list)?;
        let value = list.duplicate(OP, element)?;

        match self.current {
            Some(id) => {
                let next = list.nodes[id].next;
                list.link_between(Some(id), next, value);
            }
            None => {
                list.link_between(list.tail, None, value);
                self.position = list.len;
            }
        }

        self.resync(list);
        tracing::trace!(position = self.position, len = list.len, "{OP}");
        Ok(())
    }

    /// Duplicates `element` through the list's policy and inserts it before
    /// the cursor's current element. The cursor stays on its current
    /// element, whose position increases by one.
    ///
    /// If the cursor is past the end, the element is appended to the list.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    /// - [`Error::OutOfMemory`] if the element could not be stored. Neither
    ///   the list nor the cursor is changed.
    pub fn insert_before<P: Policy<T>>(
        &mut self,
        list: &mut List<T, P>,
        element: &T,
    ) -> Result<()> {
        const OP: &str = "Cursor::insert_before";
        self.validate(OP, list)?;
        let value = list.duplicate(OP, element)?;

        if self.current == self.start {
            list.link_between(None, list.head, value);
        } else {
            match self.current {
                Some(id) => {
                    let prev = list.nodes[id].prev;
                    list.link_between(prev, Some(id), value);
                }
                None => {
                    list.link_between(list.tail, None, value);
                }
            }
        }
        self.position += 1;

        self.resync(list);
        tracing::trace!(position = self.position, len = list.len, "{OP}");
        Ok(())
    }

    /// Removes the current element from the list and releases it through
    /// the list's policy.
    ///
    /// The cursor moves to the removed element's successor. If the removed
    /// element was the last one, the cursor moves back to its predecessor
    /// instead; if it was the only one, the cursor is left past the end of
    /// the now-empty list.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    /// - [`Error::IteratorExhausted`] if the cursor is past the end.
    pub fn delete_current<P: Policy<T>>(&mut self, list: &mut List<T, P>) -> Result<()> {
        const OP: &str = "Cursor::delete_current";
        self.validate(OP, list)?;
        let Some(id) = self.current else {
            return fail(OP, Error::IteratorExhausted);
        };

        let Node { value, next, prev } = list.unlink(id);
        list.policy.release(value);

        match (next, prev) {
            (Some(_), _) => self.current = next,
            (None, Some(_)) => {
                self.current = prev;
                self.position -= 1;
            }
            (None, None) => {
                self.current = None;
                self.position = 0;
            }
        }

        self.resync(list);
        tracing::trace!(position = self.position, len = list.len, "{OP}");
        Ok(())
    }

    /// Builds a new list by applying `transform` to every element, in order
    /// from the start of the list.
    ///
    /// The new list uses a clone of this list's policy. The cursor's
    /// position is the same after the call as before it.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    /// - [`Error::OutOfMemory`] if the new list could not grow. The partially
    ///   built list is dropped.
    pub fn map<P, F>(&mut self, list: &List<T, P>, mut transform: F) -> Result<List<T, P>>
    where
        P: Policy<T> + Clone,
        F: FnMut(&T) -> T,
    {
        const OP: &str = "Cursor::map";
        let mut out = List::with_policy(list.policy.clone())?;
        self.traverse(OP, list, |element| {
            out.reserve(OP)?;
            out.link_between(out.tail, None, transform(element));
            Ok(())
        })?;
        Ok(out)
    }

    /// Builds a new list from the elements for which `predicate` returns
    /// `true`, duplicated through this list's policy, in their original
    /// order.
    ///
    /// The cursor's position is the same after the call as before it.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    /// - [`Error::OutOfMemory`] if an element could not be duplicated. The
    ///   partially built list is dropped.
    pub fn filter<P, F>(&mut self, list: &List<T, P>, mut predicate: F) -> Result<List<T, P>>
    where
        P: Policy<T> + Clone,
        F: FnMut(&T) -> bool,
    {
        const OP: &str = "Cursor::filter";
        let mut out = List::with_policy(list.policy.clone())?;
        self.traverse(OP, list, |element| {
            if predicate(element) {
                let value = out.duplicate(OP, element)?;
                out.link_between(out.tail, None, value);
            }
            Ok(())
        })?;
        Ok(out)
    }

    /// Folds every element into an accumulator, in order from the start of
    /// the list, starting with `seed`.
    ///
    /// The cursor's position is the same after the call as before it.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterator`] if the cursor is invalidated.
    /// - [`Error::EmptyCollection`] if the list has no elements.
    pub fn reduce<P, A, F>(&mut self, list: &List<T, P>, seed: A, mut combine: F) -> Result<A>
    where
        P: Policy<T>,
        F: FnMut(&T, &mut A),
    {
        const OP: &str = "Cursor::reduce";
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

    /// Walks the list from the start, passing each element to `f`, then
    /// restores the cursor's position whether or not `f` failed.
    fn traverse<'list, P: Policy<T>>(
        &mut self,
        op: &'static str,
        list: &'list List<T, P>,
        mut f: impl FnMut(&'list T) -> Result<()>,
    ) -> Result<()> {
        self.validate(op, list)?;
        let mark = self.mark();
        self.current = self.start;
        self.position = 0;

        let mut result = Ok(());
        while self.current.is_some() {
            let element = match self.step_forward(list) {
                Ok(element) => element,
                Err(error) => {
                    result = Err(error);
                    break;
                }
            };
            if let Err(error) = f(element) {
                result = Err(error);
                break;
            }
        }

        tracing::trace!(op, visited = self.position, ok = result.is_ok(), "traversed");
        self.restore(mark);
        result
    }

    fn mark(&self) -> Mark {
        Mark {
            current: self.current,
            position: self.position,
        }
    }

    fn restore(&mut self, Mark { current, position }: Mark) {
        self.current = current;
        self.position = position;
    }

    fn is_stale<P: Policy<T>>(&self, list: &List<T, P>) -> bool {
        self.invalidated || self.list != list.id || self.generation != list.generation
    }

    fn validate<P: Policy<T>>(&mut self, op: &'static str, list: &List<T, P>) -> Result<()> {
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

    /// Adopts the list's new head and generation after a mutation made
    /// through this cursor.
    fn resync<P: Policy<T>>(&mut self, list: &List<T, P>) {
        self.start = list.head;
        self.generation = list.generation;
        debug_assert!(
            self.current.is_some() || self.position == list.len,
            "a cursor past the end must be at position `len`"
        );
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
        let Self {
            list,
            start,
            current,
            position,
            generation,
            invalidated,
            _elem,
        } = self;
        f.debug_struct("Cursor")
            .field("list", list)
            .field("start", &FmtOption::new(start))
            .field("current", &FmtOption::new(current))
            .field("position", position)
            .field("generation", generation)
            .field("invalidated", invalidated)
            .finish()
    }
}
