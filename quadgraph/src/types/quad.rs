//! Quads and directions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Value;

/// One of the four slots of a quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Subject,
    Predicate,
    Object,
    Label,
}

impl Direction {
    /// All directions in slot order.
    pub const ALL: [Self; 4] = [Self::Subject, Self::Predicate, Self::Object, Self::Label];

    /// Slot index, 0 through 3.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Subject => 0,
            Self::Predicate => 1,
            Self::Object => 2,
            Self::Label => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Subject => "subject",
            Self::Predicate => "predicate",
            Self::Object => "object",
            Self::Label => "label",
        };
        f.write_str(name)
    }
}

/// A directed labeled edge.
///
/// INVARIANT: subject, predicate and object always hold a value; only the
/// label may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quad {
    pub subject: Value,
    pub predicate: Value,
    pub object: Value,
    pub label: Option<Value>,
}

impl Quad {
    /// Create a new quad.
    #[must_use]
    pub const fn new(subject: Value, predicate: Value, object: Value, label: Option<Value>) -> Self {
        Self {
            subject,
            predicate,
            object,
            label,
        }
    }

    /// Create a quad from anything convertible to values.
    ///
    /// `&str` arguments become plain strings.
    #[must_use]
    pub fn make(
        subject: impl Into<Value>,
        predicate: impl Into<Value>,
        object: impl Into<Value>,
        label: Option<impl Into<Value>>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            label: label.map(Into::into),
        }
    }

    /// Create an unlabeled quad.
    #[must_use]
    pub fn triple(
        subject: impl Into<Value>,
        predicate: impl Into<Value>,
        object: impl Into<Value>,
    ) -> Self {
        Self::new(subject.into(), predicate.into(), object.into(), None)
    }

    /// Get the value in a direction.
    #[must_use]
    pub const fn get(&self, direction: Direction) -> Option<&Value> {
        match direction {
            Direction::Subject => Some(&self.subject),
            Direction::Predicate => Some(&self.predicate),
            Direction::Object => Some(&self.object),
            Direction::Label => self.label.as_ref(),
        }
    }

    /// Iterate over the present values paired with their direction.
    pub fn values(&self) -> impl Iterator<Item = (Direction, &Value)> {
        Direction::ALL
            .into_iter()
            .filter_map(|d| self.get(d).map(|v| (d, v)))
    }

    /// Apply a function to every value, producing a new quad.
    #[must_use]
    pub fn map_values(&self, mut f: impl FnMut(&Value) -> Value) -> Self {
        Self {
            subject: f(&self.subject),
            predicate: f(&self.predicate),
            object: f(&self.object),
            label: self.label.as_ref().map(f),
        }
    }

    /// The sort key: canonical text of all four directions.
    #[must_use]
    pub fn sort_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(label) = &self.label {
            write!(f, " {label}")?;
        }
        f.write_str(" .")
    }
}

/// Sort quads by their canonical string form.
pub fn sort_quads(quads: &mut [Quad]) {
    quads.sort_by_cached_key(Quad::sort_key);
}
