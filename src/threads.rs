//! Per-channel thread bookkeeping.
//!
//! A channel is either without a thread or has exactly one current thread,
//! identified by the `ts` of its opening message. Entries live as long as the
//! registry and are never written to disk.

use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct ThreadRegistry {
    threads: HashMap<String, String>,
}

impl ThreadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current thread for `channel`, if one was opened.
    pub fn get(&self, channel: &str) -> Option<&str> {
        self.threads.get(channel).map(String::as_str)
    }

    /// Record `thread_ts` as the channel's current thread, returning the one it replaces.
    pub fn record(&mut self, channel: &str, thread_ts: impl Into<String>) -> Option<String> {
        self.threads.insert(channel.to_string(), thread_ts.into())
    }

    /// Drop the channel's thread so the next post opens a new one.
    pub fn forget(&mut self, channel: &str) -> Option<String> {
        self.threads.remove(channel)
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}
