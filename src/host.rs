use crate::error::Result;
use crate::keypath::Path;
use crate::lens::Lens;
use crate::listeners::ListenerId;
use crate::recorder::Recorder;
use crate::tree;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// The keyed surface shared by [`StateContainer`](crate::StateContainer)
/// and [`Recorder`].
///
/// A host owns the state a [`Lens`] reads and writes. Handles are cheap to
/// clone; clones refer to the same host. This trait is sealed and cannot be
/// implemented outside of this crate.
///
/// # Examples
///
/// ```
/// use statelens::{path, Host, StateContainer};
/// use serde_json::json;
///
/// let container = StateContainer::new(json!({"foo": "bar"}));
/// container.set("foo", "baz").unwrap();
/// assert_eq!(container.get("foo").unwrap(), Some(json!("baz")));
/// assert_eq!(container.get(path!("nope", "deeper")).unwrap(), None);
/// ```
pub trait Host: Clone + sealed::Sealed {
    /// The full realized state, detached from the host.
    fn state(&self) -> Result<Value>;

    /// Store `value` at `path`, creating missing intermediate mappings, then
    /// notify listeners.
    fn write(&self, path: &Path, value: Value) -> Result<()>;

    /// Shallow-merge `partial` into the root, then notify listeners.
    fn merge(&self, partial: Value) -> Result<()>;

    /// Register a callback fired with `(old_state, new_state)` after every
    /// write that reaches this host.
    fn on_update(&self, listener: impl Fn(&Value, &Value) + 'static) -> ListenerId;

    /// Unregister a listener. Returns `false` if it was not registered.
    fn remove_listener(&self, id: ListenerId) -> bool;

    /// Whether `other` is a handle to this very host (not merely an equal one).
    fn same_host(&self, other: &Self) -> bool;

    /// The node at `path`, detached. `None` if absent.
    fn read(&self, path: &Path) -> Result<Option<Value>> {
        Ok(tree::get_in(&self.state()?, path).cloned())
    }

    /// A lens bound to this host at `path`.
    fn lens_for(&self, path: impl Into<Path>) -> Lens<Self> {
        Lens::new(self.clone(), path.into())
    }

    fn get(&self, path: impl Into<Path>) -> Result<Option<Value>> {
        self.lens_for(path).get()
    }

    fn get_as<T: DeserializeOwned>(&self, path: impl Into<Path>) -> Result<Option<T>> {
        self.lens_for(path).get_as()
    }

    fn set(&self, path: impl Into<Path>, value: impl Serialize) -> Result<()> {
        self.lens_for(path).set(value)
    }

    fn has(&self, path: impl Into<Path>) -> Result<bool> {
        Ok(self.read(&path.into())?.is_some())
    }

    /// Shallow-merge a serializable mapping into the root.
    ///
    /// Top-level keys present in `partial` are replaced wholesale; all other
    /// top-level keys are kept.
    fn set_state(&self, partial: impl Serialize) -> Result<()> {
        self.merge(tree::from_plain(&partial)?)
    }

    fn state_as<T: DeserializeOwned>(&self) -> Result<T> {
        tree::to_plain(&self.state()?)
    }

    /// A new recorder staging writes on top of this host.
    fn recorder(&self) -> Recorder<Self> {
        Recorder::new(self.clone())
    }

    /// Apply everything `recorder` has staged to this host.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongParent`](crate::Error::WrongParent) if
    /// `recorder` was created from a different host.
    fn commit(&self, recorder: &Recorder<Self>) -> Result<()> {
        recorder.replay(self)
    }
}
