//! Command key generation
//!
//! Every emitted command carries an opaque unique key. Key generation is a
//! capability passed into each command creator so that a simulation stays a
//! pure function of its inputs: production hosts hand in a
//! [`UuidKeyGenerator`], tests and reproducible runs a
//! [`SequentialKeyGenerator`].

use uuid::Uuid;

/// Source of opaque command keys
pub trait KeyGenerator {
    /// Produce the next key. Keys must be unique within one simulation run.
    fn next_key(&mut self) -> String;
}

/// Random UUIDv4 keys
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidKeyGenerator;

impl KeyGenerator for UuidKeyGenerator {
    fn next_key(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `{prefix}-{n}` keys, counting from zero
#[derive(Debug, Clone)]
pub struct SequentialKeyGenerator {
    prefix: String,
    next: u64,
}

impl SequentialKeyGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// Number of keys handed out so far
    pub fn issued(&self) -> u64 {
        self.next
    }
}

impl Default for SequentialKeyGenerator {
    fn default() -> Self {
        Self::new("cmd")
    }
}

impl KeyGenerator for SequentialKeyGenerator {
    fn next_key(&mut self) -> String {
        let key = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        key
    }
}
