//! Change-only value broadcaster.
//!
//! [`Observable`] holds a value and pushes it to every subscriber channel
//! when it changes. Setting the same value again is silent, so subscribers
//! never see two identical consecutive values.

use crossbeam_channel::{Receiver, Sender, unbounded};

/// A value whose changes are broadcast over crossbeam channels.
#[derive(Debug)]
pub struct Observable<T> {
    value: T,
    subscribers: Vec<Sender<T>>,
}

impl<T: Clone + PartialEq> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
        }
    }

    /// Current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Register a new subscriber.
    ///
    /// The receiver only gets values set after this call; the current value
    /// is not replayed.
    pub fn subscribe(&mut self) -> Receiver<T> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Store `value` and notify subscribers if it differs from the current one.
    ///
    /// Returns `true` when a change was broadcast. Subscribers whose receiver
    /// has been dropped are removed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        let value = &self.value;
        self.subscribers.retain(|tx| tx.send(value.clone()).is_ok());
        true
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
