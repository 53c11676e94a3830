use crate::error::Result;
use crate::host::Host;
use crate::keypath::Path;
use crate::tree;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// A reusable accessor bound to a fixed path in a [`Host`].
///
/// Lenses hold no state of their own; every read and write goes to the
/// host. Deriving a sub-lens never changes the parent lens.
///
/// # Examples
///
/// ```
/// use statelens::{Host, StateContainer};
/// use serde_json::json;
///
/// let container = StateContainer::new(json!({"foo": {"bar": 1, "baz": 2}}));
/// let foo = container.lens_for("foo");
/// let bar = foo.lens_for("bar");
///
/// bar.set(2).unwrap();
/// assert_eq!(foo.get().unwrap(), Some(json!({"bar": 2, "baz": 2})));
/// ```
#[derive(Clone)]
pub struct Lens<H> {
    host: H,
    path: Path,
}

impl<H: fmt::Debug> fmt::Debug for Lens<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lens")
            .field("path", &self.path)
            .field("host", &self.host)
            .finish()
    }
}

impl<H: Host> Lens<H> {
    pub(crate) fn new(host: H, path: Path) -> Self {
        Lens { host, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// The current value at this lens's path, or `None` if absent.
    ///
    /// The returned value is a detached copy; changing it does not change
    /// the host.
    pub fn get(&self) -> Result<Option<Value>> {
        self.host.read(&self.path)
    }

    /// The current value converted through serde.
    pub fn get_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.get()?.map(|value| tree::to_plain(&value)).transpose()
    }

    /// Store `value` at this lens's path.
    ///
    /// Missing intermediate mappings are created. Fails with
    /// [`Error::PathConflict`](crate::Error::PathConflict) if a prefix of the
    /// path holds a scalar, in which case nothing is written.
    pub fn set(&self, value: impl Serialize) -> Result<()> {
        self.host.write(&self.path, tree::from_plain(&value)?)
    }

    /// A new lens with `sub` appended to this lens's path.
    pub fn lens_for(&self, sub: impl Into<Path>) -> Lens<H> {
        Lens::new(self.host.clone(), self.path.join(sub))
    }

    /// Call `f` with the current value and return its result.
    pub fn with_value<R>(&self, f: impl FnOnce(Option<Value>) -> R) -> Result<R> {
        Ok(f(self.get()?))
    }

    /// Replace the current value with `f(current)` and return the value
    /// read back after the write.
    pub fn swap<T: Serialize>(&self, f: impl FnOnce(Option<Value>) -> T) -> Result<Option<Value>> {
        let next = f(self.get()?);
        self.set(next)?;
        self.get()
    }

    /// Wrap this lens with a get-side and a set-side mapping.
    pub fn transform(
        self,
        get: impl Fn(Option<Value>) -> Option<Value> + 'static,
        set: impl Fn(Value) -> Value + 'static,
    ) -> LensTransformer<H> {
        LensTransformer::new(self).map_get(get).map_set(set)
    }
}

type GetTransform = Rc<dyn Fn(Option<Value>) -> Option<Value>>;
type SetTransform = Rc<dyn Fn(Value) -> Value>;

/// A lens seen through a pair of pure mappings.
///
/// Reads pass through the get transform after the lens reads; writes pass
/// through the set transform before the lens writes. The stored
/// representation is unchanged. Both transforms default to identity.
///
/// # Examples
///
/// ```
/// use statelens::{Host, LensTransformer, StateContainer};
/// use serde_json::{json, Value};
///
/// let container = StateContainer::new(json!({"port": "8080"}));
/// let port = LensTransformer::new(container.lens_for("port"))
///     .map_get(|v| v.and_then(|s| s.as_str()?.parse::<u64>().ok()).map(Value::from))
///     .map_set(|v| Value::String(v.to_string()));
///
/// assert_eq!(port.get().unwrap(), Some(json!(8080)));
/// port.set(json!(9090)).unwrap();
/// assert_eq!(container.get("port").unwrap(), Some(json!("9090")));
/// ```
#[derive(Clone)]
pub struct LensTransformer<H> {
    lens: Lens<H>,
    get: GetTransform,
    set: SetTransform,
}

impl<H: fmt::Debug> fmt::Debug for LensTransformer<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LensTransformer")
            .field("lens", &self.lens)
            .finish_non_exhaustive()
    }
}

impl<H: Host> LensTransformer<H> {
    /// Wrap `lens` with identity transforms.
    pub fn new(lens: Lens<H>) -> Self {
        LensTransformer {
            lens,
            get: Rc::new(|value: Option<Value>| value),
            set: Rc::new(|value: Value| value),
        }
    }

    pub fn map_get(mut self, get: impl Fn(Option<Value>) -> Option<Value> + 'static) -> Self {
        self.get = Rc::new(get);
        self
    }

    pub fn map_set(mut self, set: impl Fn(Value) -> Value + 'static) -> Self {
        self.set = Rc::new(set);
        self
    }

    pub fn lens(&self) -> &Lens<H> {
        &self.lens
    }

    pub fn get(&self) -> Result<Option<Value>> {
        Ok((self.get)(self.lens.get()?))
    }

    pub fn set(&self, value: impl Serialize) -> Result<()> {
        self.lens.set((self.set)(tree::from_plain(&value)?))
    }

    pub fn with_value<R>(&self, f: impl FnOnce(Option<Value>) -> R) -> Result<R> {
        Ok(f(self.get()?))
    }
}
