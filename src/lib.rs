//! A pull-based streaming JSON codec: an event [`JsonReader`] and a
//! token-ordered [`JsonWriter`], both validated incrementally by a shared
//! grammar analyzer that tracks nesting and token legality without ever
//! building a parse tree.
//!
//! # Reading
//!
//! ```rust
//! use jsonpull::{Event, JsonReader};
//!
//! let mut reader = JsonReader::new(&br#"{"id": 1, "ok": true}"#[..]);
//! assert_eq!(reader.next_event().unwrap(), Event::ObjectStart);
//! assert_eq!(reader.next_event().unwrap(), Event::String);
//! assert_eq!(reader.string_value().unwrap(), "id");
//! assert_eq!(reader.next_event().unwrap(), Event::Number);
//! assert_eq!(reader.i64_value().unwrap(), 1);
//! ```
//!
//! # Writing
//!
//! ```rust
//! use jsonpull::JsonWriter;
//!
//! let mut out = Vec::new();
//! let mut writer = JsonWriter::new(&mut out);
//! writer.write_object_start().unwrap();
//! writer.write_string("id").unwrap();
//! writer.write_i64(1).unwrap();
//! writer.write_object_end().unwrap();
//! writer.flush().unwrap();
//! writer.close().unwrap();
//! assert_eq!(out, br#"{"id":1}"#);
//! ```
//!
//! Colons and commas are never surfaced as reader events and never written
//! explicitly; both sides derive them from the grammar analyzer. Each
//! reader/writer owns its analyzer exclusively and is single-threaded.

mod error;
mod event;
mod grammar;
mod number;
mod reader;
mod value;
mod writer;

#[cfg(test)]
mod tests;

pub use error::{DecodeError, Error, GrammarError, Result};
pub use event::Event;
pub use number::Number;
pub use reader::{Encoding, JsonReader};
pub use value::{Array, Map, Value};
pub use writer::JsonWriter;
