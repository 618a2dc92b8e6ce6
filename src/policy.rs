//! Element storage policies.
//!
//! Every list carries a [`Policy`] which decides how elements are duplicated
//! when they are inserted by reference, how they are released when they
//! leave the list, and how they are compared when searching for a value to
//! remove.
//!
//! Most lists use [`DefaultPolicy`], which clones, drops, and compares with
//! [`Ord`]. [`Hooks`] allows replacing any subset of the three behaviours
//! with closures, and also serves element types which are not [`Ord`].
//! Types which need something else entirely may implement [`Policy`]
//! directly.
use core::{cmp::Ordering, fmt};
use std::rc::Rc;

/// Describes how a list duplicates, releases, and compares its elements.
///
/// # Examples
///
/// A policy which compares strings case-insensitively:
///
/// ```
/// use std::cmp::Ordering;
/// use tendril::{List, Policy};
///
/// #[derive(Clone, Default)]
/// struct CaseInsensitive;
///
/// impl Policy<String> for CaseInsensitive {
///     fn copy(&self, element: &String) -> Option<String> {
///         Some(element.clone())
///     }
///
///     fn compare(&self, a: &String, b: &String) -> Ordering {
///         a.to_lowercase().cmp(&b.to_lowercase())
///     }
/// }
///
/// let mut list = List::with_policy(CaseInsensitive).unwrap();
/// list.insert_back(&"Hello".to_string()).unwrap();
/// list.insert_back(&"World".to_string()).unwrap();
///
/// list.remove_first_matching(&"WORLD".to_string()).unwrap();
/// assert_eq!(list.len(), 1);
/// ```
pub trait Policy<T> {
    /// Duplicates `element` so that the copy can be owned by a list node.
    ///
    /// Returning `None` reports that the element could not be duplicated.
    /// The list operation that requested the copy then fails with
    /// [`Error::OutOfMemory`](crate::Error::OutOfMemory), leaving the list
    /// unchanged.
    fn copy(&self, element: &T) -> Option<T>;

    /// Releases an element which is leaving the list.
    ///
    /// This is called exactly once for every element removed by a delete,
    /// [`clear`](crate::List::clear), or when the list itself is dropped.
    /// Elements handed back to the caller (e.g. by `pop_front`) are *not*
    /// released. By default, the element is simply dropped.
    fn release(&self, element: T) {
        drop(element);
    }

    /// Compares two elements. Two elements *match* when this returns
    /// [`Ordering::Equal`].
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// The default [`Policy`]: [`Clone`] to duplicate, [`Drop`] to release, and
/// [`Ord`] to compare.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DefaultPolicy;

/// A [`Policy`] assembled from closures.
///
/// [`Hooks::new`] starts from the behaviour of [`DefaultPolicy`], and each
/// hook may then be replaced individually. Element types without [`Clone`]
/// or [`Ord`] start from [`Hooks::from_fns`] instead, which takes the copy
/// and compare hooks up front. Hooks are reference-counted, so cloning a
/// `Hooks` (as [`Cursor::map`](crate::list::Cursor::map) does for the list
/// it builds) shares the same closures.
///
/// # Examples
///
/// ```
/// use std::{cell::Cell, rc::Rc};
/// use tendril::{Hooks, List};
///
/// let released = Rc::new(Cell::new(0));
/// let hooks = Hooks::new().on_release({
///     let released = released.clone();
///     move |_: u32| released.set(released.get() + 1)
/// });
///
/// let mut list = List::with_policy(hooks).unwrap();
/// list.insert_back(&1).unwrap();
/// list.insert_back(&2).unwrap();
/// list.destroy();
///
/// assert_eq!(released.get(), 2);
/// ```
///
/// Floats have no total order, so they supply their own comparison:
///
/// ```
/// use tendril::{Hooks, List};
///
/// let hooks = Hooks::from_fns(|x: &f64| Some(*x), |a: &f64, b: &f64| a.total_cmp(b));
/// let mut list = List::with_policy(hooks).unwrap();
/// list.insert_back(&1.5).unwrap();
/// list.insert_back(&-0.5).unwrap();
///
/// list.remove_first_matching(&1.5).unwrap();
/// assert_eq!(list.peek_head(), Ok(&-0.5));
/// ```
pub struct Hooks<T> {
    copy: Rc<dyn Fn(&T) -> Option<T>>,
    release: Option<Rc<dyn Fn(T)>>,
    compare: Rc<dyn Fn(&T, &T) -> Ordering>,
}

// === impl DefaultPolicy ===

impl<T: Clone + Ord> Policy<T> for DefaultPolicy {
    #[inline]
    fn copy(&self, element: &T) -> Option<T> {
        Some(element.clone())
    }

    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

// === impl Hooks ===

impl<T: Clone + Ord + 'static> Hooks<T> {
    /// Returns a new `Hooks` which behaves like [`DefaultPolicy`] until its
    /// hooks are replaced.
    #[must_use]
    pub fn new() -> Self {
        Self::from_fns(
            |element: &T| DefaultPolicy.copy(element),
            |a: &T, b: &T| DefaultPolicy.compare(a, b),
        )
    }
}

impl<T> Hooks<T> {
    /// Returns a new `Hooks` from a copy hook and a compare hook. Released
    /// elements are dropped unless [`on_release`](Self::on_release) is set.
    ///
    /// Unlike [`Hooks::new`], this places no bounds on `T`.
    #[must_use]
    pub fn from_fns(
        copy: impl Fn(&T) -> Option<T> + 'static,
        compare: impl Fn(&T, &T) -> Ordering + 'static,
    ) -> Self {
        Self {
            copy: Rc::new(copy),
            release: None,
            compare: Rc::new(compare),
        }
    }

    /// Replaces the hook used to duplicate elements.
    #[must_use]
    pub fn on_copy(self, copy: impl Fn(&T) -> Option<T> + 'static) -> Self {
        Self {
            copy: Rc::new(copy),
            ..self
        }
    }

    /// Sets the hook used to release elements leaving the list.
    #[must_use]
    pub fn on_release(self, release: impl Fn(T) + 'static) -> Self {
        Self {
            release: Some(Rc::new(release)),
            ..self
        }
    }

    /// Replaces the hook used to compare elements.
    #[must_use]
    pub fn on_compare(self, compare: impl Fn(&T, &T) -> Ordering + 'static) -> Self {
        Self {
            compare: Rc::new(compare),
            ..self
        }
    }
}

impl<T> Policy<T> for Hooks<T> {
    fn copy(&self, element: &T) -> Option<T> {
        (self.copy)(element)
    }

    fn release(&self, element: T) {
        match self.release {
            Some(ref release) => release(element),
            None => drop(element),
        }
    }

    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.compare)(a, b)
    }
}

impl<T> Clone for Hooks<T> {
    fn clone(&self) -> Self {
        Self {
            copy: self.copy.clone(),
            release: self.release.clone(),
            compare: self.compare.clone(),
        }
    }
}

impl<T: Clone + Ord + 'static> Default for Hooks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Hooks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("release", &self.release.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn default_policy() {
        let policy = DefaultPolicy;
        assert_eq!(Policy::<i32>::copy(&policy, &5), Some(5));
        assert_eq!(policy.compare(&1, &2), Ordering::Less);
        assert_eq!(policy.compare(&"b", &"b"), Ordering::Equal);
    }

    #[test]
    fn hooks_fall_back_to_default() {
        let hooks = Hooks::<i32>::new();
        assert_eq!(hooks.copy(&3), Some(3));
        assert_eq!(hooks.compare(&3, &3), Ordering::Equal);
        hooks.release(3);
    }

    #[test]
    fn hooks_are_called() {
        let released = Rc::new(RefCell::new(Vec::new()));
        let hooks = Hooks::new()
            .on_copy(|x: &i32| if *x < 0 { None } else { Some(x * 10) })
            .on_release({
                let released = released.clone();
                move |x| released.borrow_mut().push(x)
            })
            .on_compare(|a: &i32, b: &i32| (a % 10).cmp(&(b % 10)));

        assert_eq!(hooks.copy(&2), Some(20));
        assert_eq!(hooks.copy(&-1), None);
        assert_eq!(hooks.compare(&13, &3), Ordering::Equal);

        hooks.clone().release(7);
        assert_eq!(*released.borrow(), vec![7]);
    }

    #[test]
    fn hooks_without_ord() {
        #[derive(Clone, Debug, PartialEq)]
        struct Point(f64);

        let hooks = Hooks::from_fns(
            |p: &Point| Some(p.clone()),
            |a: &Point, b: &Point| a.0.total_cmp(&b.0),
        );
        assert_eq!(hooks.copy(&Point(1.5)), Some(Point(1.5)));
        assert_eq!(hooks.compare(&Point(-0.0), &Point(0.0)), Ordering::Less);
        hooks.release(Point(2.0));
    }

    #[test]
    fn debug_shows_release_hook() {
        let hooks = Hooks::<u8>::new().on_compare(|a, b| b.cmp(a));
        assert_eq!(format!("{hooks:?}"), "Hooks { release: false, .. }");
        let hooks = hooks.on_release(drop);
        assert_eq!(format!("{hooks:?}"), "Hooks { release: true, .. }");
    }
}
