//! Request header store.
//!
//! Header names are kept exactly as they were received and looked up byte for
//! byte: `Content-Length` and `content-length` are two different names here.
//! Handlers that need case-insensitive matching must fold case themselves.

/// An ordered multi-value mapping from header name to one or more values.
///
/// Values of the same name keep their insertion order, and names are iterated in
/// the order they were first added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, Vec<String>)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to `name`, creating the name if absent.
    pub fn add<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        let name = name.into();
        match self.position(&name) {
            Some(index) => self.entries[index].1.push(value.into()),
            None => self.entries.push((name, vec![value.into()])),
        }
    }

    /// Replaces every value of `name` with the single `value`.
    pub fn set<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        let name = name.into();
        match self.position(&name) {
            Some(index) => self.entries[index].1 = vec![value.into()],
            None => self.entries.push((name, vec![value.into()])),
        }
    }

    /// Returns the first value of `name`, or `""` when the name is absent or has no values.
    pub fn get(&self, name: &str) -> &str {
        self.get_all(name).first().map_or("", String::as_str)
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        match self.position(name) {
            Some(index) => &self.entries[index].1,
            None => &[],
        }
    }

    pub fn del(&mut self, name: &str) {
        self.entries.retain(|(key, _)| key != name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == name)
    }
}
