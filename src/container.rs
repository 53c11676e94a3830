use crate::error::Result;
use crate::host::{Host, sealed};
use crate::keypath::Path;
use crate::listeners::{ListenerId, Listeners};
use crate::tree;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The authoritative owner of one state tree.
///
/// `StateContainer` is a handle: clones share the same slot and the same
/// listeners. Every write replaces the slot with a new tree and notifies
/// listeners with the trees from before and after.
///
/// # Examples
///
/// ```
/// use statelens::{Host, StateContainer};
/// use serde_json::json;
///
/// let container = StateContainer::new(json!({"foo": "bar", "moo": "cow"}));
/// container.set_state(json!({"foo": "baz"})).unwrap();
/// assert_eq!(container.state().unwrap(), json!({"foo": "baz", "moo": "cow"}));
/// ```
#[derive(Clone)]
pub struct StateContainer {
    inner: Rc<Inner>,
}

struct Inner {
    state: RefCell<Value>,
    listeners: Listeners,
}

impl fmt::Debug for StateContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateContainer")
            .field("state", &self.inner.state.borrow())
            .field("listeners", &self.inner.listeners)
            .finish()
    }
}

impl Default for StateContainer {
    fn default() -> Self {
        StateContainer::new(Value::Object(Map::new()))
    }
}

impl StateContainer {
    /// Create a container holding `state`.
    pub fn new(state: Value) -> Self {
        StateContainer {
            inner: Rc::new(Inner {
                state: RefCell::new(state),
                listeners: Listeners::default(),
            }),
        }
    }

    /// Create a container from any serializable value.
    pub fn from_serialize<T: Serialize + ?Sized>(state: &T) -> Result<Self> {
        Ok(StateContainer::new(tree::from_plain(state)?))
    }

    /// Returns a builder for configuring initial state and listeners.
    ///
    /// # Examples
    ///
    /// ```
    /// use statelens::{Host, StateContainer};
    /// use serde_json::json;
    ///
    /// let container = StateContainer::builder()
    ///     .state(json!({"count": 0}))
    ///     .listener(|old, new| println!("{old} -> {new}"))
    ///     .build()
    ///     .unwrap();
    /// container.set("count", 1).unwrap();
    /// ```
    pub fn builder() -> StateContainerBuilder {
        StateContainerBuilder::new()
    }

    /// Install `next` as the current tree and notify listeners.
    fn replace_state(&self, next: Value) {
        let old = self.inner.state.replace(next);
        if self.inner.listeners.is_empty() {
            return;
        }
        let new = self.inner.state.borrow().clone();
        self.inner.listeners.fire(&old, &new);
    }
}

impl sealed::Sealed for StateContainer {}

impl Host for StateContainer {
    fn state(&self) -> Result<Value> {
        Ok(self.inner.state.borrow().clone())
    }

    fn read(&self, path: &Path) -> Result<Option<Value>> {
        Ok(tree::get_in(&self.inner.state.borrow(), path).cloned())
    }

    fn write(&self, path: &Path, value: Value) -> Result<()> {
        log::trace!("container: set {path}");
        let next = tree::set_in(&self.inner.state.borrow(), path, value)?;
        self.replace_state(next);
        Ok(())
    }

    fn merge(&self, partial: Value) -> Result<()> {
        log::debug!("container: merging state");
        let next = tree::merge(&self.inner.state.borrow(), &partial)?;
        self.replace_state(next);
        Ok(())
    }

    fn on_update(&self, listener: impl Fn(&Value, &Value) + 'static) -> ListenerId {
        self.inner.listeners.add(listener)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.remove(id)
    }

    fn same_host(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

type BoxedListener = Box<dyn Fn(&Value, &Value)>;

/// Builder for configuring a [`StateContainer`] before it is created.
///
/// Created via [`StateContainer::builder`].
pub struct StateContainerBuilder {
    state: Result<Value>,
    listeners: Vec<BoxedListener>,
}

impl fmt::Debug for StateContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateContainerBuilder")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for StateContainerBuilder {
    fn default() -> Self {
        StateContainerBuilder::new()
    }
}

impl StateContainerBuilder {
    fn new() -> Self {
        StateContainerBuilder {
            state: Ok(Value::Object(Map::new())),
            listeners: Vec::new(),
        }
    }

    /// Set the initial tree. Defaults to an empty mapping.
    pub fn state(mut self, state: Value) -> Self {
        self.state = Ok(state);
        self
    }

    /// Set the initial tree from a serializable value.
    ///
    /// Conversion errors are reported by [`build`](Self::build).
    pub fn state_from<T: Serialize + ?Sized>(mut self, state: &T) -> Self {
        self.state = tree::from_plain(state);
        self
    }

    /// Register a listener that is in place before the first write.
    pub fn listener(mut self, listener: impl Fn(&Value, &Value) + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Create the container.
    ///
    /// # Errors
    ///
    /// Returns an error if the value given to
    /// [`state_from`](Self::state_from) could not be serialized.
    pub fn build(self) -> Result<StateContainer> {
        let container = StateContainer::new(self.state?);
        for listener in self.listeners {
            container.on_update(listener);
        }
        Ok(container)
    }
}
