use serde::{Deserialize, Serialize};
use std::fmt;

/// One segment of a [`Path`]: a mapping field or a sequence index.
///
/// Serialized untagged, so a path reads as plain JSON: `["todos", 0, "done"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Index(usize),
    Field(String),
}

impl Key {
    /// The key as a mapping field name. Indices become their decimal form.
    pub fn as_field(&self) -> String {
        match self {
            Key::Field(name) => name.clone(),
            Key::Index(i) => i.to_string(),
        }
    }

    /// The key as a sequence index, if it is one or parses as one.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(i) => Some(*i),
            Key::Field(name) => name.parse().ok(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Field(name) => f.write_str(name),
            Key::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Field(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Field(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Key::Field(name.clone())
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

/// An ordered sequence of keys locating a node in the state tree.
///
/// The empty path addresses the root. Anything that converts into a single
/// [`Key`] also converts into a one-element path, so `"foo"`, `0` and
/// `path!("foo", 0)` are all accepted wherever a path is expected.
///
/// # Examples
///
/// ```
/// use statelens::{path, Key, Path};
///
/// let p = path!("todos", 0, "done");
/// assert_eq!(p.len(), 3);
/// assert_eq!(p.keys()[1], Key::Index(0));
/// assert_eq!(p.to_string(), "todos/0/done");
///
/// let single: Path = "todos".into();
/// assert_eq!(single, path!("todos"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<Key>);

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first `len` keys of this path.
    pub fn prefix(&self, len: usize) -> Path {
        Path(self.0[..len.min(self.0.len())].to_vec())
    }

    /// A new path with `sub` appended. `self` is left untouched.
    pub fn join(&self, sub: impl Into<Path>) -> Path {
        let mut keys = self.0.clone();
        keys.extend(sub.into().0);
        Path(keys)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

impl From<Key> for Path {
    fn from(key: Key) -> Self {
        Path(vec![key])
    }
}

impl From<&str> for Path {
    fn from(name: &str) -> Self {
        Path(vec![name.into()])
    }
}

impl From<String> for Path {
    fn from(name: String) -> Self {
        Path(vec![name.into()])
    }
}

impl From<usize> for Path {
    fn from(i: usize) -> Self {
        Path(vec![i.into()])
    }
}

impl From<&Path> for Path {
    fn from(path: &Path) -> Self {
        path.clone()
    }
}

impl From<Vec<Key>> for Path {
    fn from(keys: Vec<Key>) -> Self {
        Path(keys)
    }
}

impl<K: Into<Key>, const N: usize> From<[K; N]> for Path {
    fn from(keys: [K; N]) -> Self {
        Path(keys.into_iter().map(Into::into).collect())
    }
}

impl FromIterator<Key> for Path {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

/// Build a [`Path`] from mixed field and index segments.
///
/// ```
/// use statelens::{path, Key};
///
/// let p = path!("foo", "bar", 2);
/// assert_eq!(p.keys(), &[Key::from("foo"), Key::from("bar"), Key::Index(2)]);
/// assert!(path!().is_empty());
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($key:expr),+ $(,)?) => {
        $crate::Path::from(vec![$($crate::Key::from($key)),+])
    };
}
