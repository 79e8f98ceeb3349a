//! Dotted field paths used in diagnostics.

use std::fmt;

/// Field names from the root record down to a node, e.g. `http.session`.
///
/// The root itself has an empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<&'static str>,
}

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[&'static str] {
        &self.segments
    }

    pub(crate) fn push(&mut self, name: &'static str) {
        self.segments.push(name);
    }

    pub(crate) fn pop(&mut self) {
        self.segments.pop();
    }

    /// Returns a copy of this path extended by one field.
    pub(crate) fn child(&self, name: &'static str) -> Self {
        let mut path = self.clone();
        path.push(name);
        path
    }

    /// `"<path>: "` for error messages, or nothing at the root.
    pub(crate) fn prefix(&self) -> String {
        if self.is_root() {
            String::new()
        } else {
            format!("{self}: ")
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl PartialEq<&str> for FieldPath {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}
