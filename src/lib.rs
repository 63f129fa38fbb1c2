//! confstore: a single-threaded, hashed key/value store for
//! properties-style configuration files.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small configuration snapshot with explicit bucket chains and
//!   manual growth, loaded from and saved to a line-oriented text file.
//! - Layers:
//!   - BucketTable<S>: structural layer. Entries live in a generational
//!     slot arena; each bucket is a `Vec` of entry ids in tail-append
//!     order. Lookups compare the cached hash before the key.
//!   - format: the line reader/writer (comments, separators, escapes).
//!   - ConfigStore<S>: public API (`load`, `save`, `get`, `set`, `remove`,
//!     `size`, `clear`, `is_init_success`).
//!   - keys / settings: launcher key names and typed region settings built
//!     on top of `ConfigStore::get`.
//!
//! Constraints
//! - Single-threaded; callers sharing a store wrap the whole thing in a
//!   mutex.
//! - Keys are unique, non-empty, compared byte for byte.
//! - `get` hands out `&str` views only; entries are never aliased.
//! - Iteration and `save` follow bucket order, not insertion order.
//!
//! Hasher and growth invariants
//! - Each entry stores a precomputed `u64` hash; `hash % bucket_count` is
//!   its bucket. Growth doubles the bucket count and the capacity limit
//!   and relinks entry ids using the cached hash; entries are never
//!   recreated.
//! - Growth allocates the new array before touching the old one, so an
//!   allocation failure leaves the table as it was.
//!
//! Loading
//! - A missing file is not an error. Any other read failure, or non-UTF-8
//!   content, fails the load and leaves the store unchanged.
//! - `load` merges into existing entries (last duplicate wins) and reserves
//!   all needed growth before applying the first pair.
//! - Malformed lines are skipped and reported by line number.
//!
//! Notes and non-goals
//! - No logging unless `StoreOptions::debug` is set; then load, save and
//!   growth emit `tracing` events.
//! - No process launching, XML rendering or environment fallback.

mod bucket_table;
mod bucket_table_proptest;
mod config_store;
mod error;
mod format;
pub mod keys;
mod options;
pub mod settings;

// Public surface
pub use bucket_table::Iter;
pub use config_store::{ConfigStore, LoadReport};
pub use error::{SettingsError, StoreError};
pub use options::{StoreOptions, ARRAY_SIZE, PROPERTY_MAX_SIZE};
pub use settings::{CommonSettings, RegionSettings};
