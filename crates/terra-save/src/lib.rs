//! Typed client save-state for Terra Worlds
//!
//! The browser games persist their progress as JSON blobs in local storage,
//! one key per world, and historically merged them back into untyped state
//! objects with an object spread. This crate replaces that with explicit
//! typed structs: loading validates the JSON, fills missing fields from the
//! per-world defaults, migrates unversioned blobs, and clamps out-of-range
//! values instead of silently carrying them forward.

pub mod settings;
pub mod worlds;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Current save format version. Blobs written by the original browser
/// client carry no version field and deserialize as version 0.
pub const SAVE_VERSION: u32 = 1;

/// Errors produced when loading a persisted save blob.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("save data is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("save data version {0} is newer than this client supports")]
    FromTheFuture(u32),
}

/// A state object persisted under a single local-storage key.
///
/// `Default` supplies the new-player state; deserialization fills any
/// missing field from it, which preserves the forgiving merge semantics
/// old saves rely on while keeping the shape explicit.
pub trait SaveState: Default + Serialize + DeserializeOwned {
    /// The local-storage key this state is persisted under.
    const KEY: &'static str;

    /// Format version recorded in the blob (0 for legacy browser saves).
    fn version(&self) -> u32;

    /// Stamp the current format version.
    fn set_version(&mut self, version: u32);

    /// Clamp out-of-range values and drop unknown references. Called after
    /// every load, so legacy blobs are repaired rather than rejected.
    fn sanitize(&mut self) {}

    /// Parse a persisted blob, migrating and sanitizing it.
    ///
    /// `None` (key absent) yields the new-player default. Malformed JSON is
    /// an error so callers can decide whether to discard the blob; a blob
    /// from a newer client is refused outright.
    fn load(raw: Option<&str>) -> Result<Self, SaveError> {
        let Some(raw) = raw else {
            return Ok(Self::default());
        };

        let mut state: Self = serde_json::from_str(raw)?;
        if state.version() > SAVE_VERSION {
            return Err(SaveError::FromTheFuture(state.version()));
        }
        state.set_version(SAVE_VERSION);
        state.sanitize();
        Ok(state)
    }

    /// Parse a persisted blob, falling back to the default on any failure.
    fn load_or_default(raw: Option<&str>) -> Self {
        Self::load(raw).unwrap_or_default()
    }

    /// Serialize for persistence.
    fn to_json(&self) -> String {
        serde_json::to_string(self).expect("save states serialize infallibly")
    }
}
