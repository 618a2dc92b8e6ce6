use super::*;
use crate::{policy::Hooks, util::trace_init};
use std::{cell::RefCell, rc::Rc};

mod traverse;

fn list_from(vals: &[i32]) -> List<i32> {
    let mut list = List::new().unwrap();
    for val in vals {
        list.insert_back(val).unwrap();
    }
    list.assert_valid();
    list
}

fn collect_vals<P: Policy<i32>>(list: &List<i32, P>) -> Vec<i32> {
    list.iter().copied().collect()
}

fn drain_list(list: &mut List<i32>) -> Vec<i32> {
    let mut ret = vec![];

    while let Ok(val) = list.pop_back() {
        ret.push(val);
    }

    ret
}

/// Returns a policy that records every element it releases.
fn recording_hooks() -> (Hooks<i32>, Rc<RefCell<Vec<i32>>>) {
    let released = Rc::new(RefCell::new(Vec::new()));
    let hooks = Hooks::new().on_release({
        let released = released.clone();
        move |val: i32| released.borrow_mut().push(val)
    });
    (hooks, released)
}

#[test]
fn new_is_empty() {
    let list = List::<i32>::new().unwrap();
    assert!(list.is_empty());
    assert_eq!(list.len(), 0);
    assert_eq!(list.peek_head(), Err(Error::EmptyCollection));
    assert_eq!(list.peek_tail(), Err(Error::EmptyCollection));
    list.assert_valid();
}

#[test]
fn zero_sized_elements_are_rejected() {
    let _trace = trace_init();

    let err = List::<()>::new().unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "{err:?}");
}

#[test]
fn push_and_drain() {
    let _trace = trace_init();

    let mut list = List::new().unwrap();
    assert!(list.is_empty());

    list.push_front(5).unwrap();
    assert!(!list.is_empty());
    list.assert_valid();
    list.push_front(7).unwrap();
    list.assert_valid();
    list.push_front(31).unwrap();
    list.assert_valid();

    let items: Vec<i32> = drain_list(&mut list);
    assert_eq!([5, 7, 31].to_vec(), items);

    list.assert_valid();
    assert!(list.is_empty());
}

#[test]
fn insert_front_and_back() {
    let _trace = trace_init();

    let mut list = List::new().unwrap();
    list.insert_back(&2).unwrap();
    list.insert_front(&1).unwrap();
    list.insert_back(&3).unwrap();
    list.assert_valid();

    assert_eq!(collect_vals(&list), [1, 2, 3]);
    assert_eq!(list.peek_head(), Ok(&1));
    assert_eq!(list.peek_tail(), Ok(&3));
    assert_eq!(list.len(), 3);
}

#[test]
fn insert_duplicates_the_element() {
    let original = vec![1, 2, 3];
    let mut list = List::new().unwrap();
    list.insert_back(&original).unwrap();

    assert_eq!(list.peek_head(), Ok(&original));
    assert_ne!(
        list.peek_head().unwrap().as_ptr(),
        original.as_ptr(),
        "the list must own a copy, not the caller's buffer"
    );
}

#[test]
fn pop_front() {
    let _trace = trace_init();

    let mut list = list_from(&[5, 7, 31]);

    assert_eq!(list.pop_front(), Ok(5));
    list.assert_valid();
    assert_eq!(list.pop_front(), Ok(7));
    list.assert_valid();
    assert_eq!(list.pop_front(), Ok(31));
    list.assert_valid();

    assert!(list.is_empty());
    assert_eq!(list.pop_front(), Err(Error::EmptyCollection));
    assert_eq!(list.pop_back(), Err(Error::EmptyCollection));
    list.assert_valid();
}

#[test]
fn push_pop_push_pop() {
    let _trace = trace_init();

    let mut list = List::new().unwrap();

    list.push_front(1).unwrap();
    list.assert_valid();
    assert_eq!(list.pop_back(), Ok(1));
    list.assert_valid();
    assert!(list.is_empty());

    list.push_front(2).unwrap();
    list.assert_valid();
    assert_eq!(list.pop_back(), Ok(2));
    list.assert_valid();

    assert!(list.is_empty());
    assert_eq!(list.pop_back(), Err(Error::EmptyCollection));
    list.assert_valid();
}

#[test]
fn remove_first_matching() {
    let _trace = trace_init();

    let mut list = list_from(&[1, 2, 3, 2, 4]);

    list.remove_first_matching(&2).unwrap();
    list.assert_valid();
    assert_eq!(collect_vals(&list), [1, 3, 2, 4], "only the first match is removed");

    // removing the head and tail must repair both ends.
    list.remove_first_matching(&1).unwrap();
    list.assert_valid();
    list.remove_first_matching(&4).unwrap();
    list.assert_valid();
    assert_eq!(collect_vals(&list), [3, 2]);
    assert_eq!(list.peek_head(), Ok(&3));
    assert_eq!(list.peek_tail(), Ok(&2));

    assert_eq!(list.remove_first_matching(&42), Err(Error::NotFound));
    assert_eq!(list.len(), 2);
}

#[test]
fn remove_from_empty() {
    let mut list = List::<i32>::new().unwrap();
    assert_eq!(
        list.remove_first_matching(&1),
        Err(Error::EmptyCollection),
        "an empty list reports emptiness before searching"
    );
}

#[test]
fn remove_only_element() {
    let mut list = list_from(&[9]);
    list.remove_first_matching(&9).unwrap();
    list.assert_valid();
    assert!(list.is_empty());
}

#[test]
fn clear_releases_in_order() {
    let _trace = trace_init();

    let (hooks, released) = recording_hooks();
    let mut list = List::with_policy(hooks).unwrap();
    for i in 1..=4 {
        list.insert_back(&i).unwrap();
    }

    list.clear();
    list.assert_valid();
    assert!(list.is_empty());
    assert_eq!(*released.borrow(), [1, 2, 3, 4]);

    // clearing an empty list is a no-op.
    list.clear();
    assert_eq!(released.borrow().len(), 4);

    // the list is reusable after being cleared.
    list.insert_back(&5).unwrap();
    list.assert_valid();
    assert_eq!(collect_vals(&list), [5]);
}

#[test]
fn destroy_and_drop_release_every_element() {
    let (hooks, released) = recording_hooks();
    let mut list = List::with_policy(hooks.clone()).unwrap();
    list.insert_back(&1).unwrap();
    list.insert_back(&2).unwrap();
    list.destroy();
    assert_eq!(*released.borrow(), [1, 2]);

    released.borrow_mut().clear();
    {
        let mut list = List::with_policy(hooks).unwrap();
        list.insert_back(&3).unwrap();
    }
    assert_eq!(*released.borrow(), [3]);
}

#[test]
fn pop_does_not_release() {
    let (hooks, released) = recording_hooks();
    let mut list = List::with_policy(hooks).unwrap();
    list.insert_back(&1).unwrap();
    list.insert_back(&2).unwrap();

    assert_eq!(list.pop_front(), Ok(1));
    assert_eq!(list.pop_back(), Ok(2));
    drop(list);
    assert!(released.borrow().is_empty());
}

#[test]
fn slots_are_reused() {
    let mut list = List::new().unwrap();
    for round in 0..3 {
        for i in 0..8 {
            list.push_back(round * 8 + i).unwrap();
        }
        while list.len() > 2 {
            list.pop_front().unwrap();
        }
        list.assert_valid();
    }
    assert_eq!(collect_vals(&list), [22, 23]);
}

#[test]
fn double_ended_iter() {
    let list = list_from(&[1, 2, 3]);

    let head_to_tail = list.iter().copied().collect::<Vec<_>>();
    assert_eq!(&head_to_tail, &[1, 2, 3]);

    let tail_to_head = list.iter().rev().copied().collect::<Vec<_>>();
    assert_eq!(&tail_to_head, &[3, 2, 1]);
}

/// Per the double-ended iterator docs:
///
/// > It is important to note that both back and forth work on the same range,
/// > and do not cross: iteration is over when they meet in the middle.
#[test]
fn double_ended_iter_empties() {
    let list = list_from(&[1, 2, 3, 4]);

    let mut iter = list.iter();
    assert_eq!(iter.len(), 4);

    assert_eq!(iter.next(), Some(&1));
    assert_eq!(iter.next(), Some(&2));

    assert_eq!(iter.next_back(), Some(&4));
    assert_eq!(iter.next_back(), Some(&3));

    assert_eq!(iter.next(), None);
    assert_eq!(iter.next_back(), None);
}

#[test]
fn into_iter() {
    let (hooks, released) = recording_hooks();
    let mut list = List::with_policy(hooks).unwrap();
    for i in 1..=5 {
        list.insert_back(&i).unwrap();
    }

    let mut iter = list.into_iter();
    assert_eq!(iter.len(), 5);
    assert_eq!(iter.next(), Some(1));
    assert_eq!(iter.next_back(), Some(5));
    drop(iter);

    assert_eq!(
        *released.borrow(),
        [2, 3, 4],
        "only elements left in the iterator are released"
    );

    let list = list_from(&[1, 2]);
    let mut sum = 0;
    for val in &list {
        sum += val;
    }
    assert_eq!(sum, 3);
}

#[test]
fn set_policy() {
    let (first, first_released) = recording_hooks();
    let (second, second_released) = recording_hooks();

    let mut list = List::with_policy(first).unwrap();
    list.insert_back(&1).unwrap();
    list.insert_back(&2).unwrap();
    list.remove_first_matching(&1).unwrap();

    let old = list.set_policy(second);
    assert_eq!(format!("{old:?}"), format!("{:?}", list.policy()));
    drop(list);

    assert_eq!(*first_released.borrow(), [1]);
    assert_eq!(*second_released.borrow(), [2]);
}

#[test]
fn debug() {
    let list = list_from(&[1, 2, 3]);
    let debug = format!("{list:?}");
    assert!(debug.starts_with("List {"), "{debug}");
    assert!(debug.contains("len: 3"), "{debug}");
    assert!(debug.contains("elements: [1, 2, 3]"), "{debug}");

    let empty = List::<i32>::new().unwrap();
    let debug = format!("{empty:?}");
    assert!(debug.contains("head: None"), "{debug}");
}

#[derive(Debug)]
enum Op {
    PushFront,
    PopBack,
    PushBack,
    PopFront,
    InsertFront,
    Remove(usize),
}

use core::ops::Range;
use proptest::collection::vec;
use proptest::num::usize::ANY;

/// The default range for proptest's vec strategy is 0..100.
const FUZZ_RANGE: Range<usize> = 0..100;

proptest::proptest! {
    #[test]
    fn fuzz_linked_list(ops in vec(ANY, FUZZ_RANGE)) {
        let ops = ops
            .iter()
            .map(|i| match i % 6 {
                0 => Op::PushFront,
                1 => Op::PopBack,
                2 => Op::PushBack,
                3 => Op::PopFront,
                4 => Op::InsertFront,
                5 => Op::Remove(i / 6),
                _ => unreachable!(),
            })
            .collect::<Vec<_>>();

        let _trace = trace_init();
        let _span = tracing::info_span!("fuzz").entered();
        tracing::info!(?ops);
        run_fuzz(ops);
    }
}

fn run_fuzz(ops: Vec<Op>) {
    use std::collections::VecDeque;

    let mut ll = List::<i32>::new().unwrap();
    let mut reference = VecDeque::new();

    for (i, op) in ops.iter().enumerate() {
        let _span = tracing::info_span!("op", ?i, ?op).entered();
        tracing::info!(?op);
        let val = i as i32;
        match op {
            Op::PushFront => {
                reference.push_front(val);
                ll.push_front(val).unwrap();
            }
            Op::InsertFront => {
                reference.push_front(val);
                ll.insert_front(&val).unwrap();
            }
            Op::PopBack => {
                if reference.is_empty() {
                    assert!(ll.is_empty());
                    assert_eq!(ll.pop_back(), Err(Error::EmptyCollection));
                    tracing::debug!("skipping pop; list is empty");
                    continue;
                }

                let v = reference.pop_back();
                assert_eq!(v, ll.pop_back().ok());
            }
            Op::PushBack => {
                reference.push_back(val);
                ll.insert_back(&val).unwrap();
            }
            Op::PopFront => {
                if reference.is_empty() {
                    assert!(ll.is_empty());
                    assert_eq!(ll.pop_front(), Err(Error::EmptyCollection));
                    tracing::debug!("skipping pop: list is empty");
                    continue;
                }

                let v = reference.pop_front();
                assert_eq!(v, ll.pop_front().ok());
            }
            Op::Remove(n) => {
                if reference.is_empty() {
                    assert!(ll.is_empty());
                    assert_eq!(ll.remove_first_matching(&0), Err(Error::EmptyCollection));
                    continue;
                }

                // values are unique, so removing by value removes exactly
                // the element at `idx`.
                let idx = n % reference.len();
                let expect = reference.remove(idx).unwrap();
                ll.remove_first_matching(&expect).unwrap();
            }
        }
        assert_eq!(ll.len(), reference.len());
        ll.assert_valid();
        assert!(ll.iter().eq(reference.iter()));
        assert!(ll.iter().rev().eq(reference.iter().rev()));
    }
}
