//! End-to-end tests for decorator stacking: observable decorators around
//! keyed lists, unwrap gating across layers, and notification behavior
//! through a full stack.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use mantle_collections::{
    AssocStore, CollectionError, KeyedList, ListEvent, ListNotification, MapEvent,
    MapNotification, ObservableList, ObservableMap, SeqStore,
};

#[derive(Debug, Clone, PartialEq)]
struct User {
    name: String,
    age: i32,
}

fn user(name: &str, age: i32) -> User {
    User {
        name: name.to_string(),
        age,
    }
}

#[test]
fn keyed_list_under_observable_list() {
    let keyed = KeyedList::new(Vec::new(), |u: &User| u.name.clone()).unwrap();
    let mut list = ObservableList::new(keyed);

    let log: Rc<RefCell<Vec<ListNotification<User>>>> = Rc::new(RefCell::new(Vec::new()));
    let _sub = list.subscribe({
        let log = log.clone();
        move |note| log.borrow_mut().push(note.clone())
    });

    list.push(user("alice", 30)).unwrap();
    list.push(user("bob", 25)).unwrap();

    // Duplicate key: rejected by the inner keyed layer, error passes
    // through the observable layer unchanged, nothing is published.
    assert_eq!(
        list.push(user("alice", 99)),
        Err(CollectionError::DuplicateKey)
    );

    list.remove_at(0).unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 3);
    assert_eq!(log[0].event, ListEvent::UPDATED | ListEvent::ADDED);
    assert_eq!(log[1].event, ListEvent::UPDATED | ListEvent::ADDED);
    assert_eq!(log[2].event, ListEvent::UPDATED | ListEvent::REMOVED);
    assert_eq!(log[2].old_item, Some(user("alice", 30)));

    assert_eq!(list.len(), 1);
    assert_eq!(list.get(0), Some(&user("bob", 25)));
}

#[test]
fn keyed_index_stays_in_step_under_the_stack() {
    let keyed = KeyedList::with_index(
        Vec::new(),
        HashMap::new(),
        |u: &User| u.name.clone(),
        true,
    )
    .unwrap();
    let mut list = ObservableList::with_public_wrapped(keyed, true);

    list.push(user("alice", 30)).unwrap();
    list.push(user("bob", 25)).unwrap();
    list.set(1, user("carol", 40)).unwrap();
    assert!(list.remove_item(&user("alice", 30)));

    // Mutations went through the observable layer; the keyed index below
    // it followed every one of them.
    let keyed = list.unwrap().unwrap();
    assert_eq!(keyed.len(), 1);
    assert_eq!(keyed.by_key(&"carol".to_string()), Ok(&user("carol", 40)));
    assert!(!keyed.contains_key(&"alice".to_string()));
    assert!(!keyed.contains_key(&"bob".to_string()));
}

#[test]
fn unwrap_gating_is_per_layer() {
    let keyed = KeyedList::with_index(
        Vec::<User>::new(),
        HashMap::<String, User>::new(),
        |u: &User| u.name.clone(),
        false, // inner layer keeps its Vec private
    )
    .unwrap();
    let list = ObservableList::with_public_wrapped(keyed, true);

    // Outer layer is public: we can reach the keyed list.
    let keyed = list.unwrap().unwrap();
    // Inner layer is private: the Vec stays hidden.
    assert_eq!(keyed.unwrap().err(), Some(CollectionError::InvalidState));
}

#[test]
fn observable_map_scenario_with_one_subscriber() {
    let mut map = ObservableMap::new(HashMap::<String, i32>::new());
    let log: Rc<RefCell<Vec<MapNotification<String, i32>>>> = Rc::new(RefCell::new(Vec::new()));
    let _sub = map.subscribe({
        let log = log.clone();
        move |note| log.borrow_mut().push(note.clone())
    });

    map.set("x".to_string(), 10);
    map.set("x".to_string(), 20);

    let log = log.borrow();
    assert_eq!(log[0].event, MapEvent::UPDATED | MapEvent::ADDED);
    assert_eq!(log[0].old_value, None);
    assert_eq!(log[1].event, MapEvent::UPDATED | MapEvent::SET);
    assert_eq!(log[1].old_value, Some(10));
}

#[test]
fn two_observers_both_receive_each_notification_in_order() {
    let mut map = ObservableMap::new(HashMap::<String, i32>::new());
    let order: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

    let _first = map.subscribe({
        let order = order.clone();
        move |note: &MapNotification<String, i32>| {
            order
                .borrow_mut()
                .push(format!("first:{}", note.key.clone().unwrap_or_default()))
        }
    });
    let _second = map.subscribe({
        let order = order.clone();
        move |note: &MapNotification<String, i32>| {
            order
                .borrow_mut()
                .push(format!("second:{}", note.key.clone().unwrap_or_default()))
        }
    });

    map.set("a".to_string(), 1);

    assert_eq!(*order.borrow(), vec!["first:a", "second:a"]);
}

#[test]
fn observable_map_around_observable_map() {
    // Stacking two observable layers: one mutation, one notification from
    // each layer, inner first (it completes before the outer publishes).
    let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

    let inner = ObservableMap::new(HashMap::<String, i32>::new());
    let _inner_sub = inner.subscribe({
        let order = order.clone();
        move |_| order.borrow_mut().push("inner")
    });

    let mut outer = ObservableMap::new(inner);
    let _outer_sub = outer.subscribe({
        let order = order.clone();
        move |_| order.borrow_mut().push("outer")
    });

    outer.set("a".to_string(), 1);

    assert_eq!(*order.borrow(), vec!["inner", "outer"]);
}
