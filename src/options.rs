//! Construction-time configuration for [`ConfigStore`](crate::ConfigStore).

/// Number of buckets a store starts with.
pub const ARRAY_SIZE: usize = 16;

/// Entry count above which a store with [`ARRAY_SIZE`] buckets grows.
/// The limit doubles together with the bucket count.
pub const PROPERTY_MAX_SIZE: usize = 12;

/// Options passed to a store when it is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreOptions {
    /// Initial bucket count.
    pub initial_buckets: usize,
    /// Growth threshold for `initial_buckets`; crossing it doubles the table.
    pub capacity_limit: usize,
    /// Emit `tracing` events for load, save and growth.
    pub debug: bool,
    /// Treat a missing file as an initialization failure in
    /// [`ConfigStore::open_with`](crate::ConfigStore::open_with).
    pub require_file: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            initial_buckets: ARRAY_SIZE,
            capacity_limit: PROPERTY_MAX_SIZE,
            debug: false,
            require_file: false,
        }
    }
}

impl StoreOptions {
    pub fn with_initial_buckets(mut self, buckets: usize) -> Self {
        self.initial_buckets = buckets;
        self
    }

    pub fn with_capacity_limit(mut self, limit: usize) -> Self {
        self.capacity_limit = limit;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_require_file(mut self, require: bool) -> Self {
        self.require_file = require;
        self
    }

    /// Clamp zero sizes to one so the table always has a bucket to hash into.
    pub(crate) fn normalized(mut self) -> Self {
        self.initial_buckets = self.initial_buckets.max(1);
        self.capacity_limit = self.capacity_limit.max(1);
        self
    }
}
