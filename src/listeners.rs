use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`Host::on_update`](crate::Host::on_update), used to
/// unregister the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(&Value, &Value)>;

/// Ordered set of `(old, new)` callbacks owned by one host.
#[derive(Default)]
pub(crate) struct Listeners {
    entries: RefCell<Vec<(ListenerId, Listener)>>,
    next_id: Cell<u64>,
}

impl Listeners {
    pub(crate) fn add(&self, listener: impl Fn(&Value, &Value) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let listener: Listener = Rc::new(listener);
        self.entries.borrow_mut().push((id, listener));
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Call every listener in registration order.
    ///
    /// The list is copied first, so a listener may read its host or
    /// register and remove listeners while being called.
    pub(crate) fn fire(&self, old: &Value, new: &Value) {
        let snapshot: Vec<Listener> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        log::trace!("notifying {} listener(s)", snapshot.len());
        for listener in snapshot {
            listener(old, new);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.borrow().len())
            .finish()
    }
}
