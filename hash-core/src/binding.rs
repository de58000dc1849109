//! Per-key bindings.
//!
//! A binding claims one key of a [`HashSync`] and adds a default value, a
//! custom parser/stringifier, and change listeners. All channel I/O goes
//! back through the engine; the binding only owns its typed value.
//!
//! ```text
//! unset ──set_default──▶ defaulted ──set──▶ set
//!   │                        ▲               │
//!   └────────set─────────────┼───────────────┤
//!                            └────reset──────┘
//! ```
//!
//! Two error policies meet here. Values arriving from the channel
//! ([`KeyBinding::load`]) are parsed best-effort: a parse failure keeps the
//! previous value. Values written by the caller through
//! [`KeyBinding::try_set_str`] report the parse failure and change nothing.

use crate::channel::Channel;
use crate::engine::HashSync;
use crate::error::{HashError, ParseError};
use crate::value::{default_parse, default_stringify, parse_value, ParseFn, StringifyFn, Value};

/// A change listener.
pub type Listener = Box<dyn FnMut(&Value)>;

/// Listener fan-out, specialised for the common single-listener case.
#[derive(Default)]
pub(crate) enum Listeners {
    #[default]
    Empty,
    Single(Listener),
    Multiple(Vec<Listener>),
}

impl Listeners {
    fn add(&mut self, listener: Listener) {
        *self = match std::mem::take(self) {
            Listeners::Empty => Listeners::Single(listener),
            Listeners::Single(first) => Listeners::Multiple(vec![first, listener]),
            Listeners::Multiple(mut all) => {
                all.push(listener);
                Listeners::Multiple(all)
            }
        };
    }

    fn notify(&mut self, value: &Value) {
        match self {
            Listeners::Empty => {}
            Listeners::Single(listener) => listener(value),
            Listeners::Multiple(all) => {
                for listener in all.iter_mut() {
                    listener(value);
                }
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            Listeners::Empty => 0,
            Listeners::Single(_) => 1,
            Listeners::Multiple(all) => all.len(),
        }
    }
}

/// State owned by the engine for each bound key.
pub(crate) struct BindingState {
    pub(crate) value: Option<Value>,
    def: Option<Value>,
    parse: ParseFn,
    stringify: StringifyFn,
    listeners: Listeners,
}

impl BindingState {
    pub(crate) fn new(value: Option<Value>) -> Self {
        Self {
            value,
            def: None,
            parse: default_parse(),
            stringify: default_stringify(),
            listeners: Listeners::Empty,
        }
    }

    fn notify(&mut self) {
        if let Some(value) = &self.value {
            self.listeners.notify(value);
        }
    }
}

// Engine-side binding operations. Handles delegate here so the borrow of
// the engine stays in one place.
impl<C: Channel> HashSync<C> {
    /// Re-read the binding's value from the cache. Parse failures are dropped.
    pub(crate) fn binding_load(&mut self, key: &str) {
        let Some(Some(raw)) = self.cache.get(key) else {
            return;
        };
        let Some(state) = self.bound.get_mut(key) else {
            return;
        };
        match (state.parse)(raw.as_str()) {
            Ok(value) => {
                if state.value.as_ref() != Some(&value) {
                    state.value = Some(value);
                    state.notify();
                }
            }
            Err(e) => tracing::debug!(%key, error = %e, "keeping previous value"),
        }
    }

    pub(crate) fn binding_save(&mut self, key: &str) -> Result<(), HashError> {
        let Some(state) = self.bound.get(key) else {
            return Ok(());
        };
        let raw = state.value.as_ref().and_then(|v| (state.stringify)(v));
        if self.cache.get(key) == Some(&raw) {
            return Ok(());
        }
        self.cache.insert(key.to_string(), raw);
        self.save()
    }

    pub(crate) fn binding_set(&mut self, key: &str, value: Value) -> Result<(), HashError> {
        let Some(state) = self.bound.get_mut(key) else {
            return Ok(());
        };
        if state.value.as_ref() == Some(&value) {
            return Ok(());
        }
        state.value = Some(value);
        state.notify();
        self.binding_save(key)
    }

    pub(crate) fn binding_parse(&self, key: &str, raw: &str) -> Result<Value, ParseError> {
        match self.bound.get(key) {
            Some(state) => (state.parse)(raw),
            None => parse_value(raw),
        }
    }

    pub(crate) fn binding_set_default(&mut self, key: &str, def: Value) -> Result<(), HashError> {
        let Some(state) = self.bound.get_mut(key) else {
            return Ok(());
        };
        state.def = Some(def);
        if state.value.is_some() {
            return Ok(());
        }
        state.value = state.def.clone();
        state.notify();
        self.binding_save(key)
    }

    /// Bring back a bound key the channel dropped. The value returns to the
    /// default with one notification, and the key is written back even when
    /// the value did not change.
    pub(crate) fn binding_restore(&mut self, key: &str) -> Result<(), HashError> {
        let Some(state) = self.bound.get_mut(key) else {
            return Ok(());
        };
        state.value = state.def.clone();
        state.notify();
        // The cache must match the channel, which no longer carries the key.
        if let Some(raw) = self.cache.get_mut(key) {
            *raw = None;
        }
        self.binding_save(key)
    }

    pub(crate) fn binding_reset(&mut self, key: &str) -> Result<(), HashError> {
        let Some(state) = self.bound.get_mut(key) else {
            return Ok(());
        };
        if state.value == state.def {
            return Ok(());
        }
        state.value = state.def.clone();
        state.notify();
        self.binding_save(key)
    }
}

/// Handle to the binding of one key.
///
/// Borrows the engine mutably; get a fresh one with
/// [`HashSync::binding`] whenever needed.
pub struct KeyBinding<'a, C: Channel> {
    hash: &'a mut HashSync<C>,
    key: String,
}

impl<'a, C: Channel> KeyBinding<'a, C> {
    pub(crate) fn new(hash: &'a mut HashSync<C>, key: &str) -> Self {
        Self {
            hash,
            key: key.to_string(),
        }
    }

    fn state(&self) -> Option<&BindingState> {
        self.hash.bound.get(&self.key)
    }

    fn state_mut(&mut self) -> Option<&mut BindingState> {
        self.hash.bound.get_mut(&self.key)
    }

    /// The bound key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current value; `None` until loaded, set or defaulted.
    pub fn get(&self) -> Option<&Value> {
        self.state().and_then(|s| s.value.as_ref())
    }

    /// The default value, if any.
    pub fn default_value(&self) -> Option<&Value> {
        self.state().and_then(|s| s.def.as_ref())
    }

    /// Set a typed value. Setting the current value again does nothing.
    pub fn set(&mut self, value: impl Into<Value>) -> Result<&mut Self, HashError> {
        self.hash.binding_set(&self.key, value.into())?;
        Ok(self)
    }

    /// Set from a raw string; input the parser rejects becomes `Null`.
    pub fn set_str(&mut self, raw: &str) -> Result<&mut Self, HashError> {
        let value = match self.hash.binding_parse(&self.key, raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(key = %self.key, error = %e, "unparsable input, storing null");
                Value::Null
            }
        };
        self.set(value)
    }

    /// Set from a raw string, or report the parse failure and change nothing.
    pub fn try_set_str(&mut self, raw: &str) -> Result<&mut Self, HashError> {
        let value = self
            .hash
            .binding_parse(&self.key, raw)
            .map_err(|source| HashError::Parse {
                key: self.key.clone(),
                source,
            })?;
        self.set(value)
    }

    /// Set the default, adopting it if no value is present yet.
    pub fn set_default(&mut self, def: impl Into<Value>) -> Result<&mut Self, HashError> {
        self.hash.binding_set_default(&self.key, def.into())?;
        Ok(self)
    }

    /// Set the default from a raw string parsed with this binding's parser.
    pub fn set_default_str(&mut self, raw: &str) -> Result<&mut Self, HashError> {
        let def = self
            .hash
            .binding_parse(&self.key, raw)
            .map_err(|source| HashError::Parse {
                key: self.key.clone(),
                source,
            })?;
        self.set_default(def)
    }

    /// Revert to the default value.
    pub fn reset(&mut self) -> Result<&mut Self, HashError> {
        self.hash.binding_reset(&self.key)?;
        Ok(self)
    }

    /// Re-read the value from the engine's cache.
    pub fn load(&mut self) -> &mut Self {
        self.hash.binding_load(&self.key);
        self
    }

    /// Called when the channel moved; same as [`load`](Self::load).
    pub fn on_change(&mut self) -> &mut Self {
        self.load()
    }

    /// Push the current value to the engine and on to the channel.
    pub fn save(&mut self) -> Result<&mut Self, HashError> {
        self.hash.binding_save(&self.key)?;
        Ok(self)
    }

    /// Replace the parser and reload the cached raw string with it.
    pub fn set_parse(
        &mut self,
        parse: impl Fn(&str) -> Result<Value, ParseError> + 'static,
    ) -> &mut Self {
        if let Some(state) = self.state_mut() {
            state.parse = Box::new(parse);
        }
        self.load()
    }

    /// Replace both parser and stringifier.
    pub fn set_parse_with(
        &mut self,
        parse: impl Fn(&str) -> Result<Value, ParseError> + 'static,
        stringify: impl Fn(&Value) -> Option<String> + 'static,
    ) -> Result<&mut Self, HashError> {
        self.set_parse(parse);
        self.set_stringify(stringify)
    }

    /// Replace the stringifier and re-persist the current value with it.
    pub fn set_stringify(
        &mut self,
        stringify: impl Fn(&Value) -> Option<String> + 'static,
    ) -> Result<&mut Self, HashError> {
        let has_value = match self.state_mut() {
            Some(state) => {
                state.stringify = Box::new(stringify);
                state.value.is_some()
            }
            None => false,
        };
        if has_value {
            self.save()?;
        }
        Ok(self)
    }

    /// Subscribe to changes. The current value, if any, is replayed at once.
    pub fn add_listener(&mut self, mut listener: impl FnMut(&Value) + 'static) -> &mut Self {
        if let Some(state) = self.state_mut() {
            if let Some(value) = &state.value {
                listener(value);
            }
            state.listeners.add(Box::new(listener));
        }
        self
    }

    /// Number of listeners.
    pub fn listener_count(&self) -> usize {
        self.state().map_or(0, |s| s.listeners.len())
    }
}

impl<C: Channel> std::fmt::Debug for KeyBinding<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyBinding")
            .field("key", &self.key)
            .field("value", &self.get())
            .field("default", &self.default_value())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
