use crate::container::StateContainer;
use crate::error::{Error, Result};
use crate::host::{Host, sealed};
use crate::keypath::Path;
use crate::listeners::{ListenerId, Listeners};
use crate::tree;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// One step of a logged write.
///
/// `Navigate` moves the cursor to a path relative to the current cursor
/// (the host root at the start of an entry). `Set` stores a value at the
/// cursor; `SetState` shallow-merges a mapping into the host root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "arg", rename_all = "snake_case")]
pub enum Action {
    Navigate(Path),
    Set(Value),
    SetState(Value),
}

/// A single entry in a [`Recorder`]'s action log.
///
/// Path writes are logged as `[Navigate(path), Set(value)]`, merges as
/// `[SetState(value)]`. Entries serialize as plain JSON and can be applied
/// to any host with [`LogEntry::apply`].
///
/// # Examples
///
/// ```
/// use statelens::{path, Action, Host, StateContainer};
/// use serde_json::json;
///
/// let container = StateContainer::new(json!({"foo": {"bar": 1, "baz": 1}}));
/// let recorder = container.recorder();
/// recorder.set(path!("foo", "bar"), 2).unwrap();
///
/// let log = recorder.log();
/// assert_eq!(log.len(), 1);
/// assert_eq!(
///     log[0].actions(),
///     &[Action::Navigate(path!("foo", "bar")), Action::Set(json!(2))]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogEntry(Vec<Action>);

impl LogEntry {
    fn set(path: Path, value: Value) -> Self {
        LogEntry(vec![Action::Navigate(path), Action::Set(value)])
    }

    fn set_state(value: Value) -> Self {
        LogEntry(vec![Action::SetState(value)])
    }

    pub fn actions(&self) -> &[Action] {
        &self.0
    }

    fn navigates_to(&self, path: &Path) -> bool {
        matches!(self.0.first(), Some(Action::Navigate(p)) if p == path)
    }

    /// Perform this entry's actions, in order, against `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedEntry`] if a `Set` has no cursor to write
    /// to or a `SetState` follows a navigation; otherwise whatever the
    /// target's write or merge returns.
    pub fn apply<H: Host>(&self, target: &H) -> Result<()> {
        let mut cursor: Option<Path> = None;
        for action in &self.0 {
            match action {
                Action::Navigate(path) => {
                    cursor = Some(match cursor {
                        Some(base) => base.join(path),
                        None => path.clone(),
                    });
                }
                Action::Set(value) => {
                    let path = cursor.as_ref().ok_or(Error::MalformedEntry)?;
                    target.write(path, value.clone())?;
                }
                Action::SetState(value) => {
                    if cursor.is_some() {
                        return Err(Error::MalformedEntry);
                    }
                    target.merge(value.clone())?;
                }
            }
        }
        Ok(())
    }
}

fn apply_log<H: Host>(log: &[LogEntry], target: &H) -> Result<()> {
    log.iter().try_for_each(|entry| entry.apply(target))
}

/// A transactional overlay on top of a parent [`Host`].
///
/// Writes to a recorder never reach its parent until the recorder is
/// committed. Until then, reads see the parent's current state with the
/// recorder's own writes replayed on top: paths the recorder wrote keep the
/// recorder's values, every other path tracks the parent.
///
/// Recorders are hosts themselves, so they can hand out lenses and spawn
/// their own sub-recorders. Committing is local to one parent/child pair.
///
/// # Examples
///
/// ```
/// use statelens::{Host, StateContainer};
/// use serde_json::json;
///
/// let container = StateContainer::new(json!({"foo": "bar"}));
/// let recorder = container.recorder();
///
/// recorder.set("foo", 4).unwrap();
/// container.set("foo", 5).unwrap();
/// assert_eq!(recorder.get("foo").unwrap(), Some(json!(4)));
///
/// container.commit(&recorder).unwrap();
/// assert_eq!(container.get("foo").unwrap(), Some(json!(4)));
/// assert!(!recorder.is_dirty());
/// ```
#[derive(Clone)]
pub struct Recorder<P> {
    parent: P,
    inner: Rc<Inner>,
}

struct Inner {
    overlay: RefCell<Value>,
    // Set once the whole root has been written; the overlay is then the full state.
    root_replaced: Cell<bool>,
    log: RefCell<Vec<LogEntry>>,
    listeners: Listeners,
}

impl<P: fmt::Debug> fmt::Debug for Recorder<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("parent", &self.parent)
            .field("overlay", &self.inner.overlay.borrow())
            .field("root_replaced", &self.inner.root_replaced.get())
            .field("log", &self.inner.log.borrow())
            .field("listeners", &self.inner.listeners)
            .finish()
    }
}

impl<P: Host> Recorder<P> {
    pub(crate) fn new(parent: P) -> Self {
        Recorder {
            parent,
            inner: Rc::new(Inner {
                overlay: RefCell::new(Value::Object(Map::new())),
                root_replaced: Cell::new(false),
                log: RefCell::new(Vec::new()),
                listeners: Listeners::default(),
            }),
        }
    }

    /// The host this recorder commits into.
    pub fn parent(&self) -> &P {
        &self.parent
    }

    /// A copy of the action log, oldest entry first.
    pub fn log(&self) -> Vec<LogEntry> {
        self.inner.log.borrow().clone()
    }

    /// Whether any writes are staged.
    pub fn is_dirty(&self) -> bool {
        !self.inner.log.borrow().is_empty()
    }

    /// Apply the staged writes to `target`, then clear this recorder.
    ///
    /// The log is first checked against a scratch copy of `target`, so a
    /// log that no longer applies fails without touching `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongParent`] if `target` is not this recorder's
    /// parent. Both sides are left unchanged.
    pub fn replay(&self, target: &P) -> Result<()> {
        if !target.same_host(&self.parent) {
            log::warn!("refusing to replay recorder into a host that is not its parent");
            return Err(Error::WrongParent);
        }

        let entries = self.log();
        apply_log(&entries, &StateContainer::new(target.state()?))?;
        apply_log(&entries, target)?;
        self.clear();

        log::debug!("recorder: committed {} log entries", entries.len());
        Ok(())
    }

    /// Drop every staged write. The recorder tracks its parent again.
    ///
    /// Listeners are notified if anything was staged and the staged state
    /// could still be realized.
    pub fn discard(&self) -> Result<()> {
        if !self.is_dirty() {
            return Ok(());
        }
        let old = self.state();
        self.clear();
        log::debug!("recorder: discarded staged writes");
        if let Ok(old) = old {
            let new = self.state()?;
            self.inner.listeners.fire(&old, &new);
        }
        Ok(())
    }

    fn clear(&self) {
        *self.inner.overlay.borrow_mut() = Value::Object(Map::new());
        self.inner.root_replaced.set(false);
        self.inner.log.borrow_mut().clear();
    }

    /// Remember the written top-level subtree so a later merge can carry it.
    fn track(&self, path: &Path, new: &Value) {
        let mut overlay = self.inner.overlay.borrow_mut();
        let Some(top) = path.keys().first() else {
            *overlay = new.clone();
            self.inner.root_replaced.set(true);
            return;
        };
        let subtree = tree::get_in(new, &path.prefix(1));
        if let (Value::Object(map), Some(subtree)) = (&mut *overlay, subtree) {
            map.insert(top.as_field(), subtree.clone());
        }
    }

    /// The overlay with every tracked key refreshed from `current`.
    fn refreshed_overlay(&self, current: &Value) -> Value {
        let mut overlay = self.inner.overlay.borrow().clone();
        if let (Value::Object(map), Value::Object(current)) = (&mut overlay, current) {
            for (key, value) in map.iter_mut() {
                if let Some(latest) = current.get(key) {
                    *value = latest.clone();
                }
            }
        }
        overlay
    }
}

impl<P> sealed::Sealed for Recorder<P> {}

impl<P: Host> Host for Recorder<P> {
    /// The parent's current state with this recorder's log replayed on top.
    fn state(&self) -> Result<Value> {
        let scratch = StateContainer::new(self.parent.state()?);
        apply_log(&self.log(), &scratch)?;
        scratch.state()
    }

    fn write(&self, path: &Path, value: Value) -> Result<()> {
        log::trace!("recorder: set {path}");
        let old = self.state()?;
        let new = tree::set_in(&old, path, value.clone())?;

        {
            let mut entries = self.inner.log.borrow_mut();
            if entries.last().is_some_and(|entry| entry.navigates_to(path)) {
                entries.pop();
            }
            entries.push(LogEntry::set(path.clone(), value));
        }
        self.track(path, &new);

        self.inner.listeners.fire(&old, &new);
        Ok(())
    }

    fn merge(&self, partial: Value) -> Result<()> {
        log::debug!(
            "recorder: merging state, superseding {} log entries",
            self.inner.log.borrow().len()
        );
        let old = self.state()?;
        let new = tree::merge(&old, &partial)?;

        // A merged entry would bring back parent keys the root write removed,
        // so a replaced root is logged as a root write of the merged state.
        let (entry, overlay) = if self.inner.root_replaced.get() {
            (LogEntry::set(Path::root(), new.clone()), new.clone())
        } else {
            let overlay = tree::merge(&self.refreshed_overlay(&old), &partial)?;
            (LogEntry::set_state(overlay.clone()), overlay)
        };
        *self.inner.log.borrow_mut() = vec![entry];
        *self.inner.overlay.borrow_mut() = overlay;

        self.inner.listeners.fire(&old, &new);
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
