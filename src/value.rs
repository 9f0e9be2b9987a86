//! An owned JSON tree for callers that want the whole document at once.
//!
//! [`Value`] is built by draining a reader's event stream and can be
//! replayed through a writer. Numbers keep their exact lexemes, so a tree
//! round-trips without precision loss.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use crate::{
    error::{Error, Result},
    event::Event,
    number::Number,
    reader::JsonReader,
    writer::JsonWriter,
};

/// Object representation. Ordered by key; duplicate keys cannot occur, the
/// grammar rejects them before a tree is built.
pub type Map = BTreeMap<String, Value>;

/// Array representation.
pub type Array = Vec<Value>;

/// An owned JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The `null` literal.
    Null,
    /// `true` or `false`.
    Boolean(bool),
    /// A number, held as its exact decimal text.
    Number(Number),
    /// A string.
    String(String),
    /// An array of values.
    Array(Array),
    /// An object.
    Object(Map),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for [`Value::Object`].
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Returns `true` for [`Value::Array`].
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Reads one complete document from `reader` into an owned tree. The
    /// root is always an object or an array; the reader must be fresh, not
    /// already positioned inside a document.
    ///
    /// # Errors
    ///
    /// Any reader failure: syntax, grammar, or I/O. A usage error when the
    /// reader has already consumed part of a document.
    pub fn read_from<R: Read>(reader: &mut JsonReader<R>) -> Result<Self> {
        match reader.next_event()? {
            Event::ObjectStart => Self::read_object(reader),
            Event::ArrayStart => Self::read_array(reader),
            // Reachable when the reader was already inside a document.
            _ => Err(Error::Usage(
                "reader is not positioned at the start of a document",
            )),
        }
    }

    fn read_object<R: Read>(reader: &mut JsonReader<R>) -> Result<Self> {
        let mut map = Map::new();
        loop {
            match reader.next_event()? {
                Event::ObjectEnd => return Ok(Value::Object(map)),
                Event::String => {
                    let key = reader.string_value()?.to_owned();
                    let event = reader.next_event()?;
                    map.insert(key, Self::read_value(reader, event)?);
                }
                _ => return Err(Error::Usage("object member must start with a key")),
            }
        }
    }

    fn read_array<R: Read>(reader: &mut JsonReader<R>) -> Result<Self> {
        let mut items = Array::new();
        loop {
            match reader.next_event()? {
                Event::ArrayEnd => return Ok(Value::Array(items)),
                event => items.push(Self::read_value(reader, event)?),
            }
        }
    }

    fn read_value<R: Read>(reader: &mut JsonReader<R>, event: Event) -> Result<Self> {
        match event {
            Event::ObjectStart => Self::read_object(reader),
            Event::ArrayStart => Self::read_array(reader),
            Event::String => Ok(Value::String(reader.string_value()?.to_owned())),
            Event::Number => Ok(Value::Number(reader.number()?)),
            Event::Boolean => Ok(Value::Boolean(reader.boolean_value()?)),
            Event::Null => Ok(Value::Null),
            Event::ObjectEnd | Event::ArrayEnd => {
                Err(Error::Usage("container end is not a value"))
            }
        }
    }

    /// Replays the tree through `writer` as a stream of tokens. Does not
    /// flush or close the writer.
    ///
    /// # Errors
    ///
    /// Any writer failure, including grammar rejection when the tree is
    /// written somewhere a value is not allowed.
    pub fn write_to<W: Write>(&self, writer: &mut JsonWriter<W>) -> Result<()> {
        match self {
            Value::Null => writer.write_null(),
            Value::Boolean(b) => writer.write_bool(*b),
            Value::Number(n) => writer.write_number_str(n.as_str()),
            Value::String(s) => writer.write_string(s),
            Value::Array(items) => {
                writer.write_array_start()?;
                for item in items {
                    item.write_to(writer)?;
                }
                writer.write_array_end()
            }
            Value::Object(map) => {
                writer.write_object_start()?;
                for (key, value) in map {
                    writer.write_string(key)?;
                    value.write_to(writer)?;
                }
                writer.write_object_end()
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(Number::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Number(Number::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}
