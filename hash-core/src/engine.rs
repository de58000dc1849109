//! The synchronization engine.
//!
//! [`HashSync`] keeps three maps consistent with one external string:
//!
//! - `cache`: key → last synced raw string (`None` = absent, e.g. `false`)
//! - `values`: key → typed value, for unbound keys only
//! - `bound`: key → binding state, for keys claimed by [`HashSync::bind`]
//!
//! A key lives in exactly one of `values` and `bound`. `load` pulls the
//! channel into the maps, `save` pushes the maps out to the channel, and
//! `prune` reconciles keys that vanished from the channel.
//!
//! ```text
//! channel ──load──▶ decode ──▶ cache ──▶ values / bindings ──▶ listeners
//!    ▲                                        │
//!    └──────── save ◀── encode ◀── cache ◀────┘
//! ```

use std::collections::HashSet;

use indexmap::IndexMap;
use urlhash_codec::{Decoder, Encoder, Escaped, Pair};

use crate::binding::{BindingState, KeyBinding};
use crate::channel::Channel;
use crate::config::HashConfig;
use crate::error::HashError;
use crate::value::{parse_value, value_to_string, Value};

/// Default leading marker of the channel string.
pub const DEFAULT_MARKER: char = '#';

/// Typed key/value view over a single external string.
pub struct HashSync<C: Channel> {
    channel: C,
    marker: Option<char>,
    decoder: Box<dyn Decoder>,
    encoder: Box<dyn Encoder>,
    /// Last synced channel string, marker stripped.
    last: String,
    pub(crate) cache: IndexMap<String, Option<String>>,
    values: IndexMap<String, Value>,
    pub(crate) bound: IndexMap<String, BindingState>,
}

impl<C: Channel> HashSync<C> {
    /// Create an engine with the plain escaped codec and `#` marker, and
    /// load the channel's current contents.
    pub fn new(channel: C) -> Result<Self, HashError> {
        Self::with_codec(channel, Escaped::max(), Escaped::max(), Some(DEFAULT_MARKER))
    }

    /// Create an engine from configuration.
    pub fn with_config(channel: C, config: &HashConfig) -> Result<Self, HashError> {
        config.validate()?;
        Self::with_codec(
            channel,
            config.decoder(),
            config.encoder(),
            config.marker_char()?,
        )
    }

    /// Create an engine with explicit codecs and marker.
    pub fn with_codec(
        channel: C,
        decoder: impl Decoder + 'static,
        encoder: impl Encoder + 'static,
        marker: Option<char>,
    ) -> Result<Self, HashError> {
        let mut hash = Self {
            channel,
            marker,
            decoder: Box::new(decoder),
            encoder: Box::new(encoder),
            last: String::new(),
            cache: IndexMap::new(),
            values: IndexMap::new(),
            bound: IndexMap::new(),
        };
        hash.load()?;
        Ok(hash)
    }

    /// Pull the channel into local state.
    ///
    /// Does nothing if the channel still shows what was last synced. Parse
    /// failures are discarded and leave the previous value in place; a
    /// string no decoder recognises leaves all state untouched.
    pub fn load(&mut self) -> Result<(), HashError> {
        let raw = self.channel.get();
        let body = self.strip_marker(&raw);
        if body == self.last {
            return Ok(());
        }
        self.last = body.to_string();

        let Some(pairs) = self.decoder.decode(body) else {
            tracing::debug!(channel = %raw, "no decoder matched, keeping state");
            return Ok(());
        };

        let mut seen = HashSet::with_capacity(pairs.len());
        for Pair { key, value } in pairs {
            let text = value.unwrap_or_default();
            seen.insert(key.clone());
            if self.cache.get(&key).and_then(Option::as_deref) == Some(text.as_str()) {
                continue;
            }

            self.cache.insert(key.clone(), Some(text.clone()));
            if self.bound.contains_key(&key) {
                self.binding_load(&key);
            } else {
                match parse_value(&text) {
                    Ok(value) => {
                        self.values.insert(key, value);
                    }
                    Err(e) => tracing::debug!(%key, error = %e, "discarding unparsable value"),
                }
            }
        }

        self.prune(&seen)
    }

    /// Entry point for the host's change notification.
    pub fn on_change(&mut self) -> Result<(), HashError> {
        self.load()
    }

    /// Drop every unbound key not in `except`; restore bound ones to their
    /// default and write them back.
    pub fn prune(&mut self, except: &HashSet<String>) -> Result<(), HashError> {
        let stale: Vec<String> = self
            .cache
            .keys()
            .filter(|key| !except.contains(*key))
            .cloned()
            .collect();

        for key in stale {
            if self.bound.contains_key(&key) {
                tracing::debug!(%key, "bound key left the channel, restoring default");
                self.binding_restore(&key)?;
            } else {
                tracing::debug!(%key, "pruning key");
                self.cache.shift_remove(&key);
                self.values.shift_remove(&key);
            }
        }
        Ok(())
    }

    /// Encode local state and write it to the channel.
    pub fn save(&mut self) -> Result<(), HashError> {
        for (key, raw) in self.cache.iter_mut() {
            if self.bound.contains_key(key) {
                continue;
            }
            if let Some(value) = self.values.get(key) {
                *raw = value_to_string(value);
            }
        }

        let pairs: Vec<Pair> = self
            .cache
            .iter()
            .map(|(key, value)| Pair {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        let body = self.encoder.encode(&pairs)?;

        if body == self.last {
            tracing::trace!("channel already up to date");
            return Ok(());
        }

        let raw = match self.marker {
            Some(marker) if !body.is_empty() => format!("{}{}", marker, body),
            _ => body.clone(),
        };
        tracing::debug!(channel = %raw, "saving");
        self.last = body;
        self.channel.set(&raw);
        Ok(())
    }

    /// Claim `key` for a binding. A key can be bound only once.
    pub fn bind(&mut self, key: &str) -> Result<KeyBinding<'_, C>, HashError> {
        if self.bound.contains_key(key) {
            return Err(HashError::AlreadyBound(key.to_string()));
        }
        self.claim(key);
        Ok(KeyBinding::new(self, key))
    }

    /// Handle to the binding for `key`, if bound.
    pub fn binding(&mut self, key: &str) -> Option<KeyBinding<'_, C>> {
        if self.bound.contains_key(key) {
            Some(KeyBinding::new(self, key))
        } else {
            None
        }
    }

    /// Handle to the binding for `key`, binding it first if needed.
    pub fn binding_or_bind(&mut self, key: &str) -> KeyBinding<'_, C> {
        if !self.bound.contains_key(key) {
            self.claim(key);
        }
        KeyBinding::new(self, key)
    }

    // A key lives in either `values` or `bound`, never both.
    fn claim(&mut self, key: &str) {
        let value = self.values.shift_remove(key);
        self.bound.insert(key.to_string(), BindingState::new(value));
    }

    /// Check if `key` is bound.
    pub fn is_bound(&self, key: &str) -> bool {
        self.bound.contains_key(key)
    }

    /// Typed value of `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self.bound.get(key) {
            Some(state) => state.value.as_ref(),
            None => self.values.get(key),
        }
    }

    /// Raw string of `key` as last synced.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.cache.get(key).and_then(Option::as_deref)
    }

    /// Set `key` to a typed value, binding it if needed.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), HashError> {
        self.binding_or_bind(key).set(value)?;
        Ok(())
    }

    /// Set `key` from a raw string; unparsable input becomes `Null`.
    pub fn set_str(&mut self, key: &str, raw: &str) -> Result<(), HashError> {
        self.binding_or_bind(key).set_str(raw)?;
        Ok(())
    }

    /// Set `key` from a raw string, failing without side effects if the
    /// binding's parser rejects it.
    pub fn try_set_str(&mut self, key: &str, raw: &str) -> Result<(), HashError> {
        self.binding_or_bind(key).try_set_str(raw)?;
        Ok(())
    }

    /// Known keys in stable order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cache.keys().map(String::as_str)
    }

    /// Last synced channel string, marker stripped.
    pub fn last(&self) -> &str {
        &self.last
    }

    /// The channel collaborator.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    fn strip_marker<'s>(&self, raw: &'s str) -> &'s str {
        match self.marker {
            Some(marker) => raw.strip_prefix(marker).unwrap_or(raw),
            None => raw,
        }
    }
}

impl<C: Channel + std::fmt::Debug> std::fmt::Debug for HashSync<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashSync")
            .field("channel", &self.channel)
            .field("marker", &self.marker)
            .field("last", &self.last)
            .field("cache", &self.cache)
            .field("values", &self.values)
            .field("bound", &self.bound.keys().collect::<Vec<_>>())
            .finish()
    }
}
