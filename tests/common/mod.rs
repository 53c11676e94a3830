#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use statelens::{Host, StateContainer};
use std::cell::RefCell;
use std::rc::Rc;

pub type Calls = Rc<RefCell<Vec<(Value, Value)>>>;

/// Register a listener on `host` that records every `(old, new)` pair.
pub fn record_updates<H: Host>(host: &H) -> Calls {
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&calls);
    host.on_update(move |old, new| sink.borrow_mut().push((old.clone(), new.clone())));
    calls
}

pub fn nested_container() -> StateContainer {
    StateContainer::new(json!({"foo": {"bar": 1, "baz": 1}}))
}

#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TodoState {
    pub items: Vec<TodoItem>,
    pub next_id: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: u64,
    pub text: String,
    pub done: bool,
}

pub fn todo_state() -> TodoState {
    TodoState {
        items: vec![
            TodoItem {
                id: 0,
                text: "buy milk".to_string(),
                done: false,
            },
            TodoItem {
                id: 1,
                text: "walk dog".to_string(),
                done: true,
            },
        ],
        next_id: 2,
    }
}
