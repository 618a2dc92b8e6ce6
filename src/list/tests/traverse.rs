use super::*;

#[test]
fn map_squares() {
    let _trace = trace_init();

    let list = list_from(&[1, 2, 3, 4, 5]);
    let mut cursor = list.cursor();
    cursor.seek_to_position(&list, 2).unwrap();

    let squares = cursor.map(&list, |x| x * x).unwrap();
    squares.assert_valid();
    assert_eq!(collect_vals(&squares), [1, 4, 9, 16, 25]);

    assert_eq!(collect_vals(&list), [1, 2, 3, 4, 5], "the source list is unchanged");
    assert_eq!(cursor.position(&list), Ok(2));
    assert_eq!(cursor.current_element(&list), Ok(&3));
}

#[test]
fn filter_evens() {
    let _trace = trace_init();

    let list = list_from(&[1, 2, 3, 4, 5]);
    let mut cursor = list.cursor();
    cursor.seek_to_end(&list).unwrap();
    cursor.step_forward(&list).unwrap();

    let evens = cursor.filter(&list, |x| x % 2 == 0).unwrap();
    evens.assert_valid();
    assert_eq!(collect_vals(&evens), [2, 4]);
    assert_eq!(cursor.state(&list), CursorState::PastEnd);
    assert_eq!(cursor.position(&list), Ok(5));
}

#[test]
fn reduce_sum() {
    let list = list_from(&[1, 2, 3, 4, 5]);
    let mut cursor = list.cursor();
    cursor.step_forward(&list).unwrap();

    let sum = cursor.reduce(&list, 0, |x, acc| *acc += x).unwrap();
    assert_eq!(sum, 15);
    assert_eq!(cursor.position(&list), Ok(1));
}

#[test]
fn reduce_into_another_type() {
    let list = list_from(&[3, 1, 2]);
    let mut cursor = list.cursor();

    let joined = cursor
        .reduce(&list, String::new(), |x, acc| {
            if !acc.is_empty() {
                acc.push(',');
            }
            acc.push_str(&x.to_string());
        })
        .unwrap();
    assert_eq!(joined, "3,1,2");
}

#[test]
fn traverse_from_start_not_current() {
    let list = list_from(&[1, 2, 3]);
    let mut cursor = list.cursor();
    cursor.seek_to_end(&list).unwrap();

    let mut seen = Vec::new();
    cursor.reduce(&list, (), |x, _| seen.push(*x)).unwrap();
    assert_eq!(seen, [1, 2, 3]);
}

#[test]
fn empty_list() {
    let list = List::<i32>::new().unwrap();
    let mut cursor = list.cursor();

    let mapped = cursor.map(&list, |x| x + 1).unwrap();
    assert!(mapped.is_empty());
    let filtered = cursor.filter(&list, |_| true).unwrap();
    assert!(filtered.is_empty());

    assert_eq!(
        cursor.reduce(&list, 0, |x, acc| *acc += x),
        Err(Error::EmptyCollection)
    );
    assert_eq!(cursor.state(&list), CursorState::PastEnd);
}

#[test]
fn output_uses_a_clone_of_the_policy() {
    let (hooks, released) = recording_hooks();
    let mut list = List::with_policy(hooks).unwrap();
    for i in 1..=4 {
        list.insert_back(&i).unwrap();
    }

    let mut cursor = list.cursor();
    let doubled = cursor.map(&list, |x| x * 2).unwrap();
    let odds = cursor.filter(&list, |x| x % 2 == 1).unwrap();
    drop(doubled);
    drop(odds);

    assert_eq!(*released.borrow(), [2, 4, 6, 8, 1, 3]);
}

#[test]
fn failed_filter_restores_cursor_and_drops_output() {
    let _trace = trace_init();

    let released = Rc::new(RefCell::new(Vec::new()));
    let hooks = Hooks::new()
        .on_copy(|x: &i32| if *x == 4 { None } else { Some(*x) })
        .on_release({
            let released = released.clone();
            move |x: i32| released.borrow_mut().push(x)
        });
    let mut list = List::with_policy(hooks).unwrap();
    for i in 1..=5 {
        list.push_back(i).unwrap();
    }

    let mut cursor = list.cursor();
    cursor.seek_to_position(&list, 3).unwrap();

    let result = cursor.filter(&list, |x| x % 2 == 0);
    assert_eq!(result.unwrap_err(), Error::OutOfMemory);

    assert_eq!(
        *released.borrow(),
        [2],
        "the partial output is released when it is dropped"
    );
    assert_eq!(cursor.position(&list), Ok(3));
    assert_eq!(cursor.current_element(&list), Ok(&4));
    assert_eq!(collect_vals(&list), [1, 2, 3, 4, 5]);
}

#[test]
fn invalidated_cursor_cannot_traverse() {
    let mut list = list_from(&[1, 2, 3]);
    let mut cursor = list.cursor();
    list.push_back(4).unwrap();

    assert_eq!(cursor.map(&list, |x| *x).unwrap_err(), Error::InvalidIterator);
    assert_eq!(cursor.filter(&list, |_| true).unwrap_err(), Error::InvalidIterator);
    assert_eq!(
        cursor.reduce(&list, 0, |x, acc| *acc += x),
        Err(Error::InvalidIterator)
    );
}
