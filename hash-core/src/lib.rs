//! # hash-core
//!
//! Typed, observable key/value view over a URL fragment.
//!
//! [`HashSync`] owns one external string (the [`Channel`]), decodes it into
//! keys and values with a pluggable codec from `urlhash-codec`, and writes
//! local changes back. Individual keys can be claimed with
//! [`HashSync::bind`] to get defaults, custom parsing and change listeners.
//!
//! ## Design
//!
//! Everything is synchronous and single-threaded. The only outside event is
//! "the channel changed", which the host forwards to
//! [`HashSync::on_change`]. The engine remembers the last string it synced,
//! so the notification caused by its own write is recognised and ignored.
//!
//! ## Example
//!
//! ```
//! use urlhash_core::{HashSync, MemoryChannel, Value};
//!
//! let channel = MemoryChannel::with_value("#tab=files&debug");
//! let mut hash = HashSync::new(channel.clone())?;
//! assert_eq!(hash.get("debug"), Some(&Value::Bool(true)));
//!
//! hash.bind("page")?.set_default("1")?;
//! hash.set("tab", "search")?;
//! assert_eq!(channel.current(), "#tab=search&debug&page=1");
//! # Ok::<(), urlhash_core::HashError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binding;
pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod value;

pub use binding::{KeyBinding, Listener};
pub use channel::{Channel, MemoryChannel};
pub use config::{EncodingConfig, EscapeMode, HashConfig};
pub use engine::{HashSync, DEFAULT_MARKER};
pub use error::{HashError, ParseError};
pub use value::{parse_value, value_to_string, ParseFn, StringifyFn, Value};
