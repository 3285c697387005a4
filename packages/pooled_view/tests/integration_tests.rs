//! Tests for views driven by reconcilers, covering widget identity and pool reuse.

use std::ptr;
use std::rc::Rc;

use observable::{ObservableList, ObservableMap};
use pooled_view::{DataWidget, ListView, MapView};
use recycle_pool::LocalRecyclePool;
use reconcile::{Reconciler, reconcile};
use testing::{Model, Widget, models, names};

fn pool() -> LocalRecyclePool {
    let pool = LocalRecyclePool::new();
    pool.register::<Widget>(16);
    pool
}

fn displayed(view: &ListView<Rc<Model>, Widget>) -> Vec<String> {
    names(&view.models())
}

fn addresses(view: &ListView<Rc<Model>, Widget>) -> Vec<*const Widget> {
    view.with_widgets(|widgets| {
        widgets
            .iter()
            .map(|widget| ptr::from_ref::<Widget>(widget))
            .collect()
    })
}

fn address_of(view: &ListView<Rc<Model>, Widget>, model: &Rc<Model>) -> Option<*const Widget> {
    view.with_widgets(|widgets| {
        widgets
            .iter()
            .find(|widget| widget.model().is_some_and(|shown| Rc::ptr_eq(shown, model)))
            .map(|widget| ptr::from_ref::<Widget>(widget))
    })
}

#[test]
fn reordering_keeps_every_widget() {
    let pool = pool();
    let items = models(&["a", "b", "c", "d"]);

    let list = ObservableList::from(items.clone());
    let view = ListView::new(pool.clone());
    view.attach(&list).unwrap();

    let before = items
        .iter()
        .map(|model| address_of(&view, model).unwrap())
        .collect::<Vec<_>>();
    let created = pool.stats::<Widget>().unwrap().created();

    let reordered = vec![
        Rc::clone(&items[3]),
        Rc::clone(&items[1]),
        Rc::clone(&items[0]),
        Rc::clone(&items[2]),
    ];
    reconcile(&list, reordered).unwrap();

    assert_eq!(displayed(&view), vec!["d", "b", "a", "c"]);

    let stats = pool.stats::<Widget>().unwrap();
    assert_eq!(stats.created(), created);
    assert_eq!(stats.recycled(), 0);

    for (model, address) in items.iter().zip(before) {
        assert_eq!(address_of(&view, model), Some(address));
    }

    view.with_widgets(|widgets| {
        assert!(widgets.iter().all(|widget| widget.setups() == 1));
    });
}

#[test]
fn replaced_items_hand_their_widgets_to_later_items() {
    let pool = pool();
    let list = ObservableList::from(models(&["a", "b", "c"]));
    let view = ListView::new(pool.clone());
    view.attach(&list).unwrap();

    let mut original = addresses(&view);

    // New items are inserted before the old ones are deleted, so this round allocates.
    reconcile(&list, models(&["x", "y", "z"])).unwrap();
    assert_eq!(pool.free_len::<Widget>().unwrap(), 3);

    reconcile(&list, models(&["p", "q", "r"])).unwrap();
    assert_eq!(displayed(&view), vec!["p", "q", "r"]);

    let stats = pool.stats::<Widget>().unwrap();
    assert_eq!(stats.created(), 6);
    assert_eq!(stats.reused(), 3);
    assert_eq!(stats.recycled(), 6);

    let mut current = addresses(&view);
    current.sort();
    original.sort();
    assert_eq!(current, original);
}

#[test]
fn reconciler_keeps_filtered_view_in_step() {
    let pool = pool();
    let source = ObservableList::from(models(&["apple", "banana", "avocado"]));
    let shown = ObservableList::new();

    let view = ListView::new(pool.clone());
    view.attach(&shown).unwrap();

    let _reconciler = Reconciler::attach(source.clone(), shown.clone(), |source| {
        source
            .to_vec()
            .into_iter()
            .filter(|model: &Rc<Model>| model.name().starts_with('a'))
    })
    .unwrap();

    assert_eq!(displayed(&view), vec!["apple", "avocado"]);

    source.insert(0, Model::new("apricot")).unwrap();
    assert_eq!(displayed(&view), vec!["apricot", "apple", "avocado"]);

    source.delete(1).unwrap();
    assert_eq!(displayed(&view), vec!["apricot", "avocado"]);

    assert_eq!(pool.free_len::<Widget>().unwrap(), 1);
}

#[test]
fn map_view_follows_keyed_source() {
    let pool = pool();
    let map = ObservableMap::new();
    let view = MapView::<_, _, Widget>::new(pool.clone());
    view.attach(&map).unwrap();

    let [first, second] = [Model::new("first"), Model::new("second")];
    map.set("one", Rc::clone(&first));
    map.set("two", Rc::clone(&second));
    map.delete(&"one").unwrap();

    assert_eq!(names(&view.models()), vec!["second"]);

    drop(view);
    assert_eq!(pool.free_len::<Widget>().unwrap(), 2);
}
