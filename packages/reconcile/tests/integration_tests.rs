//! Tests for the public API of the reconcilers, covering convergence, idempotence and the exact
//! edits applied to a target.

use std::rc::Rc;

use observable::{ListEvent, ObservableList, ObservableMap, ObservableSet};
use reconcile::{KeyedReconciler, Reconciler, SetReconciler, WindowedReconciler, reconcile};
use testing::{EventRecorder, Model, models, names};

fn same(left: &[Rc<Model>], right: &[Rc<Model>]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(l, r)| Rc::ptr_eq(l, r))
}

fn pick(items: &[Rc<Model>], order: &[usize]) -> Vec<Rc<Model>> {
    order
        .iter()
        .map(|&position| Rc::clone(&items[position]))
        .collect()
}

/// Every ordering of `items`, generated with Heap's algorithm.
fn permutations(items: &[usize]) -> Vec<Vec<usize>> {
    fn generate(k: usize, items: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if k <= 1 {
            out.push(items.clone());
            return;
        }

        for i in 0..k - 1 {
            generate(k - 1, items, out);
            let j = if k % 2 == 0 { i } else { 0 };
            items.swap(j, k - 1);
        }

        generate(k - 1, items, out);
    }

    let mut items = items.to_vec();
    let mut out = Vec::new();
    generate(items.len(), &mut items, &mut out);
    out
}

#[test]
fn rotation_scenario_edit_log() {
    let abc = models(&["A", "B", "C"]);
    let target = ObservableList::from(abc.clone());
    let recorder = EventRecorder::attach(&target);

    reconcile(&target, pick(&abc, &[2, 0, 1])).unwrap();

    let swaps: Vec<(usize, usize)> = recorder
        .events()
        .iter()
        .map(|event| match event {
            ListEvent::Swap { a, b } => (*a, *b),
            other => panic!("unexpected event {other:?}"),
        })
        .collect();

    assert_eq!(swaps, vec![(0, 2), (1, 2)]);
    assert_eq!(names(&target.to_vec()), vec!["C", "A", "B"]);
    assert!(same(&target.to_vec(), &pick(&abc, &[2, 0, 1])));
}

#[test]
fn converges_from_every_ordering_and_then_stays_put() {
    let pool = models(&["a", "b", "c", "d", "e"]);
    let starts: [&[usize]; 4] = [&[], &[4], &[3, 2, 1, 0], &[0, 4, 2]];

    for start in starts {
        for order in permutations(&[0, 1, 2, 3]) {
            let target = ObservableList::from(pick(&pool, start));
            let source = pick(&pool, &order);

            reconcile(&target, source.clone()).unwrap();
            assert!(
                same(&target.to_vec(), &source),
                "{start:?} -> {order:?} gave {:?}",
                names(&target.to_vec())
            );

            assert!(reconcile(&target, source.clone()).unwrap().is_empty());
        }
    }
}

#[test]
fn retained_items_are_never_reinserted() {
    let pool = models(&["a", "b", "c", "d"]);
    let target = ObservableList::from(pick(&pool, &[0, 1, 2, 3]));
    let recorder = EventRecorder::attach(&target);

    // Drop "b", keep the others in a new order.
    reconcile(&target, pick(&pool, &[3, 0, 2])).unwrap();

    let inserted = recorder
        .events()
        .iter()
        .filter(|event| matches!(event, ListEvent::Insert { .. }))
        .count();
    assert_eq!(inserted, 0);
    assert_eq!(names(&target.to_vec()), vec!["d", "a", "c"]);
}

#[test]
fn bound_reconciler_tracks_filtered_source() {
    let source = ObservableList::from(models(&["apple", "avocado", "banana"]));
    let target = ObservableList::new();

    let reconciler = Reconciler::attach(source.clone(), target.clone(), |source| {
        source
            .to_vec()
            .into_iter()
            .filter(|model: &Rc<Model>| model.name().starts_with('a'))
    })
    .unwrap();

    assert_eq!(names(&target.to_vec()), vec!["apple", "avocado"]);

    source.push_front(Model::new("apricot"));
    source.append(Model::new("cherry"));
    source.delete(1).unwrap();

    assert_eq!(names(&target.to_vec()), vec!["apricot", "avocado"]);
    assert_eq!(reconciler.passes(), 4);
    assert!(reconciler.run().unwrap().is_empty());
}

#[test]
fn window_of_five_over_three_yields_three() {
    let source = models(&["a", "b", "c"]);
    let target = ObservableList::new();

    let window = WindowedReconciler::builder()
        .window_size(5)
        .build(source.clone(), target.clone())
        .unwrap();

    assert_eq!(window.target().len(), 3);
    assert!(same(&target.to_vec(), &source));
}

#[test]
fn window_scrolls_through_observable_source() {
    let source = ObservableList::from(models(&["a", "b", "c", "d", "e"]));
    let target = ObservableList::new();

    let window = WindowedReconciler::builder()
        .window_size(2)
        .displayed_index(1)
        .attach(source.clone(), target.clone())
        .unwrap();
    assert_eq!(names(&target.to_vec()), vec!["b", "c"]);

    while window.scroll_forward().unwrap() {}
    assert_eq!(window.displayed_index(), 4);
    assert_eq!(names(&target.to_vec()), vec!["e"]);

    window.scroll_backward().unwrap();
    assert_eq!(names(&target.to_vec()), vec!["d", "e"]);

    source.delete(4).unwrap();
    assert_eq!(names(&target.to_vec()), vec!["d"]);
}

#[test]
fn source_mutation_alone_moves_window_contents() {
    let source = ObservableList::from(models(&["a", "b", "c", "d"]));
    let target = ObservableList::new();

    let _window = WindowedReconciler::builder()
        .window_size(3)
        .attach(source.clone(), target.clone())
        .unwrap();
    assert_eq!(names(&target.to_vec()), vec!["a", "b", "c"]);

    let kept = target.get(1).unwrap();
    source.delete(0).unwrap();

    assert_eq!(names(&target.to_vec()), vec!["b", "c", "d"]);
    assert!(Rc::ptr_eq(&target.get(0).unwrap(), &kept));
}

#[test]
fn set_reconciler_tracks_membership_of_list() {
    let source = ObservableList::from(models(&["a", "b", "c"]));
    let target = ObservableSet::new();

    let reconciler = SetReconciler::attach(source.clone(), target.clone(), |source| {
        source
            .to_vec()
            .into_iter()
            .filter(|model: &Rc<Model>| model.name() != "b")
    })
    .unwrap();
    assert_eq!(target.len(), 2);

    let a = source.get(0).unwrap();
    source.reverse();
    assert_eq!(reconciler.total_edits().total(), 2);
    assert!(target.contains(&a));

    source.delete(2).unwrap();
    assert!(!target.contains(&a));
    assert_eq!(names(&target.to_vec()), vec!["c"]);
}

#[test]
fn keyed_reconciler_mirrors_list_into_map() {
    let source = ObservableList::from(models(&["x", "y"]));
    let target = ObservableMap::new();

    let reconciler = KeyedReconciler::attach(source.clone(), target.clone(), |source| {
        source
            .to_vec()
            .into_iter()
            .map(|model: Rc<Model>| (model.name().to_string(), model))
    })
    .unwrap();

    assert_eq!(target.keys(), vec!["x".to_string(), "y".to_string()]);

    source.set(0, Model::new("x")).unwrap();
    assert_eq!(reconciler.total_edits().sets(), 1);

    source.delete(1).unwrap();
    assert_eq!(target.keys(), vec!["x".to_string()]);
}
