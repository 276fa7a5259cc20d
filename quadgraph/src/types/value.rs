//! Typed values and their canonical text form.
//!
//! Provides the `Value` sum type and `ValueKind` discriminant, along with
//! structural equality, within-kind ordering, and the canonical string form
//! used for sorting and for untyped storage.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Datatype IRI used in the canonical form of `Value::Int`.
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
/// Datatype IRI used in the canonical form of `Value::Float`.
pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
/// Datatype IRI used in the canonical form of `Value::Bool`.
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
/// Datatype IRI used in the canonical form of `Value::Time`.
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

/// Value kind discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ValueKind {
    Iri = 0x01,
    BlankNode = 0x02,
    String = 0x03,
    TypedString = 0x04,
    LangString = 0x05,
    Int = 0x06,
    Float = 0x07,
    Bool = 0x08,
    Time = 0x09,
    Raw = 0x0A,
}

/// A typed value that can occupy any direction of a quad.
///
/// Equality is structural per kind. `Float` compares by bit pattern so that
/// the type can be used as a hash key (`NaN == NaN`, `-0.0 != 0.0`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Iri(String),
    BlankNode(String),
    String(String),
    TypedString { value: String, datatype: String },
    LangString { value: String, lang: String },
    Int(i64),
    Float(f64),
    Bool(bool),
    Time(DateTime<Utc>),
    /// Opaque text with no type information. Its canonical form is the text itself.
    Raw(String),
}

impl Value {
    #[must_use]
    pub fn iri(s: impl Into<String>) -> Self {
        Self::Iri(s.into())
    }

    #[must_use]
    pub fn bnode(s: impl Into<String>) -> Self {
        Self::BlankNode(s.into())
    }

    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    #[must_use]
    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self::TypedString {
            value: value.into(),
            datatype: datatype.into(),
        }
    }

    #[must_use]
    pub fn lang(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Self::LangString {
            value: value.into(),
            lang: lang.into(),
        }
    }

    #[must_use]
    pub fn raw(s: impl Into<String>) -> Self {
        Self::Raw(s.into())
    }

    /// Get the kind discriminant.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Iri(_) => ValueKind::Iri,
            Self::BlankNode(_) => ValueKind::BlankNode,
            Self::String(_) => ValueKind::String,
            Self::TypedString { .. } => ValueKind::TypedString,
            Self::LangString { .. } => ValueKind::LangString,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Bool(_) => ValueKind::Bool,
            Self::Time(_) => ValueKind::Time,
            Self::Raw(_) => ValueKind::Raw,
        }
    }

    /// Compare two values of the same kind.
    ///
    /// Returns `None` when the kinds differ, when a typed string has a
    /// different datatype, when a language string has a different language
    /// tag, or when either float is NaN. There is no order across kinds.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Iri(a), Self::Iri(b))
            | (Self::BlankNode(a), Self::BlankNode(b))
            | (Self::String(a), Self::String(b))
            | (Self::Raw(a), Self::Raw(b)) => Some(a.cmp(b)),
            (
                Self::TypedString {
                    value: a,
                    datatype: da,
                },
                Self::TypedString {
                    value: b,
                    datatype: db,
                },
            ) if da == db => Some(a.cmp(b)),
            (Self::LangString { value: a, lang: la }, Self::LangString { value: b, lang: lb })
                if la == lb =>
            {
                Some(a.cmp(b))
            }
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Time(a), Self::Time(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Parse a canonical text form.
    ///
    /// `<..>` is an IRI, `_:..` a blank node, and a quoted literal is a
    /// plain, typed, or language string. Typed strings whose datatype is one
    /// of the XSD integer, double, boolean, or dateTime IRIs are converted to
    /// the native variant when the literal parses. Anything else is `Raw`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if let Some(iri) = text.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
            return Self::Iri(iri.to_owned());
        }
        if let Some(id) = text.strip_prefix("_:") {
            return Self::BlankNode(id.to_owned());
        }
        if text.starts_with('"') {
            if let Some((literal, rest)) = split_quoted(text) {
                if rest.is_empty() {
                    return Self::String(literal);
                }
                if let Some(datatype) = rest
                    .strip_prefix("^^<")
                    .and_then(|t| t.strip_suffix('>'))
                {
                    return Self::from_typed_literal(literal, datatype);
                }
                if let Some(lang) = rest.strip_prefix('@') {
                    if !lang.is_empty() {
                        return Self::lang(literal, lang);
                    }
                }
            }
        }
        Self::Raw(text.to_owned())
    }

    fn from_typed_literal(literal: String, datatype: &str) -> Self {
        let native = match datatype {
            XSD_INTEGER => literal.parse::<i64>().ok().map(Self::Int),
            XSD_DOUBLE => literal.parse::<f64>().ok().map(Self::Float),
            XSD_BOOLEAN => match literal.as_str() {
                "true" => Some(Self::Bool(true)),
                "false" => Some(Self::Bool(false)),
                _ => None,
            },
            XSD_DATE_TIME => DateTime::parse_from_rfc3339(&literal)
                .ok()
                .map(|t| Self::Time(t.with_timezone(&Utc))),
            _ => None,
        };
        native.unwrap_or_else(|| Self::typed(literal, datatype))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Iri(a), Self::Iri(b))
            | (Self::BlankNode(a), Self::BlankNode(b))
            | (Self::String(a), Self::String(b))
            | (Self::Raw(a), Self::Raw(b)) => a == b,
            (
                Self::TypedString {
                    value: a,
                    datatype: da,
                },
                Self::TypedString {
                    value: b,
                    datatype: db,
                },
            ) => a == b && da == db,
            (Self::LangString { value: a, lang: la }, Self::LangString { value: b, lang: lb }) => {
                a == b && la == lb
            }
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Self::Iri(s) | Self::BlankNode(s) | Self::String(s) | Self::Raw(s) => s.hash(state),
            Self::TypedString { value, datatype } => {
                value.hash(state);
                datatype.hash(state);
            }
            Self::LangString { value, lang } => {
                value.hash(state);
                lang.hash(state);
            }
            Self::Int(n) => n.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::Bool(b) => b.hash(state),
            Self::Time(t) => t.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(s) => write!(f, "<{s}>"),
            Self::BlankNode(s) => write!(f, "_:{s}"),
            Self::String(s) => write_quoted(f, s),
            Self::TypedString { value, datatype } => {
                write_quoted(f, value)?;
                write!(f, "^^<{datatype}>")
            }
            Self::LangString { value, lang } => {
                write_quoted(f, value)?;
                write!(f, "@{lang}")
            }
            Self::Int(n) => write!(f, "\"{n}\"^^<{XSD_INTEGER}>"),
            Self::Float(n) => write!(f, "\"{n}\"^^<{XSD_DOUBLE}>"),
            Self::Bool(b) => write!(f, "\"{b}\"^^<{XSD_BOOLEAN}>"),
            Self::Time(t) => write!(
                f,
                "\"{}\"^^<{XSD_DATE_TIME}>",
                t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
            ),
            Self::Raw(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Time(t)
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

/// Split a leading quoted literal from the rest of the text.
///
/// Returns the unescaped literal and the remainder after the closing quote,
/// or `None` if the quote is never closed.
fn split_quoted(text: &str) -> Option<(String, &str)> {
    let body = text.strip_prefix('"')?;
    let mut literal = String::with_capacity(body.len());
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((literal, &body[i + 1..])),
            '\\' => {
                let (_, escaped) = chars.next()?;
                literal.push(match escaped {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    other => other,
                });
            }
            c => literal.push(c),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn time(secs: i64, nanos: u32) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, nanos).unwrap()
    }

    #[test]
    fn test_canonical_forms() {
        assert_eq!(Value::iri("name").to_string(), "<name>");
        assert_eq!(Value::bnode("A").to_string(), "_:A");
        assert_eq!(Value::string("B").to_string(), "\"B\"");
        assert_eq!(Value::typed("10", "int").to_string(), "\"10\"^^<int>");
        assert_eq!(Value::lang("value", "en").to_string(), "\"value\"@en");
        assert_eq!(Value::raw("<type>").to_string(), "<type>");
        assert_eq!(
            Value::Int(-5).to_string(),
            format!("\"-5\"^^<{XSD_INTEGER}>")
        );
    }

    #[test]
    fn test_parse_returns_same_variant() {
        let values = [
            Value::iri("name"),
            Value::bnode("A"),
            Value::string("with \"quotes\" and \\ and\nnewline"),
            Value::typed("10", "int"),
            Value::lang("value", "en"),
            Value::Int(-123_456_789),
            Value::Float(-12345e-6),
            Value::Bool(true),
            Value::Time(time(1_700_000_000, 123_456_789)),
        ];
        for value in values {
            let parsed = Value::parse(&value.to_string());
            assert_eq!(parsed, value, "canonical form {value}");
        }
    }

    #[test]
    fn test_parse_bare_text_is_raw() {
        assert_eq!(Value::parse("hello"), Value::raw("hello"));
        assert_eq!(Value::parse("\"unterminated"), Value::raw("\"unterminated"));
        assert_eq!(Value::parse("\"x\"@"), Value::raw("\"x\"@"));
    }

    #[test]
    fn test_typed_literal_with_bad_payload_stays_typed() {
        let text = format!("\"ten\"^^<{XSD_INTEGER}>");
        assert_eq!(Value::parse(&text), Value::typed("ten", XSD_INTEGER));
    }

    #[test]
    fn test_equality_is_per_kind() {
        assert_ne!(Value::string("a"), Value::raw("a"));
        assert_ne!(Value::iri("a"), Value::bnode("a"));
        assert_ne!(Value::typed("1", "x"), Value::typed("1", "y"));
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
    }

    #[test]
    fn test_hash_agrees_with_equality() {
        let mut set = HashSet::new();
        set.insert(Value::string("a"));
        set.insert(Value::string("a"));
        set.insert(Value::raw("a"));
        set.insert(Value::Float(1.5));
        set.insert(Value::Float(1.5));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_compare_within_kind() {
        assert_eq!(
            Value::bnode("alice").compare(&Value::bnode("bob")),
            Some(Ordering::Less)
        );
        assert_eq!(Value::Int(112).compare(&Value::Int(20)), Some(Ordering::Greater));
        assert_eq!(
            Value::Time(time(10, 0)).compare(&Value::Time(time(10, 0))),
            Some(Ordering::Equal)
        );
        assert_eq!(Value::Bool(false).compare(&Value::Bool(true)), Some(Ordering::Less));
    }

    #[test]
    fn test_compare_across_kinds_is_undefined() {
        assert_eq!(Value::Int(1).compare(&Value::Float(1.0)), None);
        assert_eq!(Value::string("a").compare(&Value::iri("a")), None);
        assert_eq!(
            Value::lang("a", "en").compare(&Value::lang("b", "fr")),
            None
        );
        assert_eq!(Value::Float(f64::NAN).compare(&Value::Float(1.0)), None);
    }
}
