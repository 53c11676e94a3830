use crate::keypath::Path;
use thiserror::Error;

/// Errors returned by containers, recorders and lenses.
///
/// Reading a path that does not exist is not an error; lenses return
/// `Ok(None)` for it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A recorder was committed or replayed into a host other than the one
    /// it was created from.
    #[error("trying to replay into wrong parent container")]
    WrongParent,

    /// A write would have to descend through a node that cannot hold
    /// children.
    #[error("cannot write beneath `{path}`: found {found} where a container was expected")]
    PathConflict { path: Path, found: &'static str },

    /// A sequence index too far past the end of the sequence to pad.
    #[error("index {index} under `{path}` is too far past a sequence of length {len}")]
    IndexOutOfRange { path: Path, index: usize, len: usize },

    /// `set_state` needs mappings on both sides of the merge.
    #[error("set_state expects a mapping, found {found}")]
    NotAMapping { found: &'static str },

    /// A log entry whose actions do not form a navigate-then-mutate sequence.
    #[error("malformed action log entry")]
    MalformedEntry,

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
