//! The external string resource being synchronized.
//!
//! In a browser this is `location.hash`; the host forwards its change
//! event to [`HashSync::on_change`](crate::HashSync::on_change). The
//! engine only needs to read and write the raw string.

use std::cell::RefCell;
use std::rc::Rc;

/// Accessor for the raw channel string, marker included.
pub trait Channel {
    /// Current raw string.
    fn get(&self) -> String;

    /// Replace the raw string.
    fn set(&mut self, value: &str);
}

impl<T: Channel + ?Sized> Channel for Box<T> {
    fn get(&self) -> String {
        (**self).get()
    }

    fn set(&mut self, value: &str) {
        (**self).set(value)
    }
}

/// In-memory channel for tests and headless hosts.
///
/// Clones share state, so a test can keep one handle to play the part of
/// the user (back/forward, hand edits) while the engine owns another.
#[derive(Debug, Default, Clone)]
pub struct MemoryChannel {
    inner: Rc<RefCell<MemoryChannelInner>>,
}

#[derive(Debug, Default)]
struct MemoryChannelInner {
    current: String,
    writes: Vec<String>,
    pending: usize,
}

impl MemoryChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a channel holding `initial`.
    pub fn with_value(initial: &str) -> Self {
        let channel = Self::new();
        channel.inner.borrow_mut().current = initial.to_string();
        channel
    }

    /// Current raw string.
    pub fn current(&self) -> String {
        self.inner.borrow().current.clone()
    }

    /// Change the string out-of-band, as navigation would.
    pub fn navigate(&self, value: &str) {
        let mut inner = self.inner.borrow_mut();
        if inner.current != value {
            inner.current = value.to_string();
            inner.pending += 1;
        }
    }

    /// Every string written through [`Channel::set`], oldest first.
    pub fn writes(&self) -> Vec<String> {
        self.inner.borrow().writes.clone()
    }

    /// The last string written through [`Channel::set`].
    pub fn last_write(&self) -> Option<String> {
        self.inner.borrow().writes.last().cloned()
    }

    /// Number of change notifications not yet delivered; resets the count.
    ///
    /// Like a browser, the channel raises one notification per actual
    /// change, whoever made it.
    pub fn take_notifications(&self) -> usize {
        std::mem::take(&mut self.inner.borrow_mut().pending)
    }

    /// Clear all state.
    pub fn reset(&self) {
        *self.inner.borrow_mut() = MemoryChannelInner::default();
    }
}

impl Channel for MemoryChannel {
    fn get(&self) -> String {
        self.current()
    }

    fn set(&mut self, value: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.writes.push(value.to_string());
        if inner.current != value {
            inner.current = value.to_string();
            inner.pending += 1;
        }
    }
}
