//! Hash-based task ID generation.
//!
//! IDs have the form `{prefix}-{hash}` (e.g. `tl-a3f8`), where the hash is a
//! base36 rendering of a SHA-256 digest over the task's title, description,
//! the current time and a nonce.
//!
//! The hash length grows with the number of stored tasks so that short IDs
//! stay short while the collision probability stays low:
//!
//! - 0-500 tasks: 4 chars
//! - 501-1,500: 5 chars
//! - 1,501+: 6 chars
//!
//! # Example
//!
//! ```
//! use tasklink::id_generation::IdGenerator;
//!
//! let mut generator = IdGenerator::new("tl");
//! let id = generator.generate("Write docs", "", 0).unwrap();
//! assert!(id.starts_with("tl-"));
//! ```

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;
const MAX_ID_LENGTH: usize = 6;

/// Errors that can occur during ID generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Every nonce collided, even after growing the hash length
    #[error("Unable to generate unique ID after {attempts} attempts")]
    CollisionExhausted {
        /// Number of nonces tried
        attempts: u32,
    },
}

/// Hash-based ID generator with collision detection.
///
/// Tracks every ID it has produced or been told about so that a fresh ID is
/// never handed out twice.
#[derive(Debug)]
pub struct IdGenerator {
    prefix: String,
    existing_ids: HashSet<String>,
}

impl IdGenerator {
    /// Create a generator for the given prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            existing_ids: HashSet::new(),
        }
    }

    /// The prefix used for generated IDs
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Register an existing ID to prevent collisions
    pub fn register_id(&mut self, id: impl Into<String>) {
        self.existing_ids.insert(id.into());
    }

    /// Forget an ID (after its task was deleted)
    pub fn release_id(&mut self, id: &str) {
        self.existing_ids.remove(id);
    }

    /// Generate a new unique ID.
    ///
    /// `store_size` is the number of tasks currently stored and selects the
    /// hash length.
    ///
    /// # Errors
    ///
    /// Returns [`IdGenerationError::CollisionExhausted`] if no unique ID
    /// could be produced.
    pub fn generate(
        &mut self,
        title: &str,
        description: &str,
        store_size: usize,
    ) -> Result<String, IdGenerationError> {
        let mut length = adaptive_length(store_size);

        loop {
            for nonce in 0..MAX_NONCE {
                let id = self.hash_id(title, description, nonce, length);
                if self.existing_ids.insert(id.clone()) {
                    if nonce > 0 {
                        debug!(nonce, length, "Generated unique ID after collision retries");
                    }
                    return Ok(id);
                }
            }

            if length >= MAX_ID_LENGTH {
                return Err(IdGenerationError::CollisionExhausted {
                    attempts: MAX_NONCE,
                });
            }
            warn!(length, max_nonce = MAX_NONCE, "All nonces exhausted, increasing ID length");
            length += 1;
        }
    }

    fn hash_id(&self, title: &str, description: &str, nonce: u32, length: usize) -> String {
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let content = format!("{}|{}|{}|{}", title, description, timestamp, nonce);

        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let digest = hasher.finalize();

        format!("{}-{}", self.prefix, encode_base36(&digest[..8], length))
    }
}

/// Hash length for a store holding `store_size` tasks
fn adaptive_length(store_size: usize) -> usize {
    match store_size {
        0..=500 => 4,
        501..=1500 => 5,
        _ => MAX_ID_LENGTH,
    }
}

/// Encode up to eight bytes as a fixed-length base36 string
fn encode_base36(bytes: &[u8], length: usize) -> String {
    let mut n = bytes
        .iter()
        .fold(0u64, |acc, &b| acc.wrapping_shl(8).wrapping_add(u64::from(b)));

    let mut out = Vec::with_capacity(length);
    while out.len() < length {
        out.push(BASE36_CHARS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();

    out.into_iter().map(char::from).collect()
}
