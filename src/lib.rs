//! An in-process state container with path lenses and transactional
//! recorders.
//!
//! State is a single JSON-shaped tree owned by a [`StateContainer`]. A
//! [`Lens`] reads and writes one path of that tree, creating missing
//! intermediate mappings on write. A [`Recorder`] stages writes on top of a
//! container (or another recorder) as a replayable action log; committing
//! it replays the log into the parent, discarding drops it.
//!
//! ```
//! use statelens::{path, Host, StateContainer};
//! use serde_json::json;
//!
//! let container = StateContainer::new(json!({"foo": {"bar": 1, "baz": 1}}));
//! let recorder = container.recorder();
//!
//! recorder.set(path!("foo", "bar"), 2).unwrap();
//! assert_eq!(recorder.state().unwrap(), json!({"foo": {"bar": 2, "baz": 1}}));
//! assert_eq!(container.get(path!("foo", "bar")).unwrap(), Some(json!(1)));
//!
//! container.commit(&recorder).unwrap();
//! assert_eq!(container.state().unwrap(), json!({"foo": {"bar": 2, "baz": 1}}));
//! ```

mod container;
mod error;
mod host;
mod keypath;
mod lens;
mod listeners;
mod recorder;
pub mod tree;

pub use container::{StateContainer, StateContainerBuilder};
pub use error::{Error, Result};
pub use host::Host;
pub use keypath::{Key, Path};
pub use lens::{Lens, LensTransformer};
pub use listeners::ListenerId;
pub use recorder::{Action, LogEntry, Recorder};
