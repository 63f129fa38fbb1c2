//! ConfigStore: public key/value store with file load and save.

use crate::bucket_table::{BucketTable, GrowError, Iter};
use crate::error::StoreError;
use crate::format;
use crate::options::StoreOptions;
use core::hash::BuildHasher;
use hashbrown::hash_map::DefaultHashBuilder;
use hashbrown::HashSet;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, trace, warn};

/// Summary of one `load`/`load_str` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// False when the file did not exist; the store was left as it was.
    pub file_found: bool,
    /// Number of `key=value` lines applied, duplicates included.
    pub applied: usize,
    /// 1-based line numbers of skipped malformed lines.
    pub malformed: Vec<usize>,
}

/// Hashed `key=value` store backed by a properties-style text file.
///
/// Keys are unique, non-empty and compared byte for byte. Iteration and
/// `save` follow bucket order, not insertion or file order.
pub struct ConfigStore<S = DefaultHashBuilder> {
    table: BucketTable<S>,
    options: StoreOptions,
    init_success: bool,
}

impl ConfigStore {
    /// Empty store with default options.
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    pub fn with_options(options: StoreOptions) -> Self {
        Self::with_hasher(options, Default::default())
    }

    /// Build a store and load `path` into it.
    ///
    /// Never fails; check [`is_init_success`](Self::is_init_success). A
    /// missing file yields an empty, successfully initialized store unless
    /// [`StoreOptions::require_file`] is set.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::open_with(path, StoreOptions::default())
    }

    pub fn open_with(path: impl AsRef<Path>, options: StoreOptions) -> Self {
        let mut store = Self::with_options(options);
        let path = path.as_ref();
        store.init_success = match store.load(path) {
            Ok(report) => report.file_found || !store.options.require_file,
            Err(e) => {
                if store.options.debug {
                    warn!(path = %path.display(), error = %e, "initial load failed");
                }
                false
            }
        };
        store
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ConfigStore<S>
where
    S: BuildHasher + Clone + Default,
{
    pub fn with_hasher(options: StoreOptions, hasher: S) -> Self {
        let options = options.normalized();
        Self {
            table: BucketTable::with_hasher(
                options.initial_buckets,
                options.capacity_limit,
                hasher,
            ),
            options,
            init_success: true,
        }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Whether construction-time loading succeeded. Later `load`/`save`
    /// calls report through their own return values and do not change it.
    pub fn is_init_success(&self) -> bool {
        self.init_success
    }

    /// Read `path` and merge its pairs into the store, last duplicate wins.
    ///
    /// A missing file is not an error: the report has `file_found == false`
    /// and nothing changes. On any error the store is left as it was.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<LoadReport, StoreError> {
        let path = path.as_ref();
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if self.options.debug {
                    debug!(path = %path.display(), "config file not found");
                }
                return Ok(LoadReport::default());
            }
            Err(e) => return Err(StoreError::io(path, e)),
        };
        let text = String::from_utf8(bytes).map_err(|_| StoreError::Encoding {
            path: path.to_path_buf(),
        })?;

        let report = self.load_str(&text)?;
        if self.options.debug {
            debug!(
                path = %path.display(),
                applied = report.applied,
                malformed = report.malformed.len(),
                entries = self.len(),
                "loaded config file"
            );
        }
        Ok(report)
    }

    /// Parse `text` with the file grammar and merge it into the store.
    pub fn load_str(&mut self, text: &str) -> Result<LoadReport, StoreError> {
        let parsed = format::parse(text);
        if self.options.debug {
            for line in &parsed.malformed {
                warn!(line, "skipping malformed line");
            }
        }

        // Grow once up front so applying the pairs cannot fail halfway.
        let new_keys = {
            let mut fresh: HashSet<&str> = HashSet::new();
            for (k, _) in &parsed.pairs {
                if !self.table.contains_key(k) {
                    fresh.insert(k.as_str());
                }
            }
            fresh.len()
        };
        self.reserve(new_keys)?;

        let applied = parsed.pairs.len();
        for (k, v) in parsed.pairs {
            self.table.insert(&k, v).map_err(grow_error)?;
        }
        Ok(LoadReport {
            file_found: true,
            applied,
            malformed: parsed.malformed,
        })
    }

    /// Write every entry to `path`, truncating it first.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
        let mut w = BufWriter::new(file);
        self.write_to(&mut w)
            .and_then(|_| w.flush())
            .map_err(|e| StoreError::io(path, e))?;
        if self.options.debug {
            debug!(path = %path.display(), entries = self.len(), "saved config file");
        }
        Ok(())
    }

    /// Serialize every entry as one escaped `key=value` line.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for (k, v) in self.iter() {
            format::write_line(w, k, v)?;
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.table.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    /// Insert or overwrite `key`, returning the previous value.
    ///
    /// An empty key is rejected and the store is unchanged. Inserting a new
    /// key past the capacity limit grows the bucket array first.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<Option<String>, StoreError> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let before = self.table.bucket_count();
        let prev = self.table.insert(key, value.into()).map_err(grow_error)?;
        if self.options.debug {
            if self.table.bucket_count() != before {
                debug!(from = before, to = self.table.bucket_count(), "grew bucket array");
            }
            trace!(key, replaced = prev.is_some(), "set");
        }
        Ok(prev)
    }

    /// Remove `key`, returning its value; absent keys are a no-op.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.table.remove(key)
    }

    /// Number of live entries.
    pub fn size(&self) -> usize {
        self.table.len()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Drop every entry. The bucket array keeps its grown size.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn iter(&self) -> Iter<'_> {
        self.table.iter()
    }

    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Entry count above which the next new key triggers growth.
    pub fn capacity_limit(&self) -> usize {
        self.table.capacity_limit()
    }

    fn reserve(&mut self, additional: usize) -> Result<(), StoreError> {
        let before = self.table.bucket_count();
        self.table.reserve(additional).map_err(grow_error)?;
        if self.options.debug && self.table.bucket_count() != before {
            debug!(from = before, to = self.table.bucket_count(), "grew bucket array");
        }
        Ok(())
    }
}

fn grow_error(e: GrowError) -> StoreError {
    StoreError::CapacityGrowth {
        requested: e.requested,
    }
}

impl<'a, S> IntoIterator for &'a ConfigStore<S>
where
    S: BuildHasher + Clone + Default,
{
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S> fmt::Debug for ConfigStore<S>
where
    S: BuildHasher + Clone + Default,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn snapshot<S: BuildHasher + Clone + Default>(s: &ConfigStore<S>) -> BTreeMap<String, String> {
        s.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    /// Invariant: a fresh store is empty, initialized, and sized by options.
    #[test]
    fn new_store_defaults() {
        let s = ConfigStore::new();
        assert!(s.is_init_success());
        assert_eq!(s.size(), 0);
        assert!(s.is_empty());
        assert_eq!(s.bucket_count(), crate::ARRAY_SIZE);
        assert_eq!(s.capacity_limit(), crate::PROPERTY_MAX_SIZE);
    }

    /// Invariant: overwriting keeps `size` and returns the previous value.
    #[test]
    fn set_overwrite_keeps_size() {
        let mut s = ConfigStore::new();
        assert_eq!(s.set("k", "v1").unwrap(), None);
        assert_eq!(s.set("k", "v2").unwrap(), Some("v1".to_string()));
        assert_eq!(s.size(), 1);
        assert_eq!(s.get("k"), Some("v2"));
    }

    /// Invariant: empty keys are rejected without touching the store.
    #[test]
    fn empty_key_rejected() {
        let mut s = ConfigStore::new();
        assert!(matches!(s.set("", "v"), Err(StoreError::EmptyKey)));
        assert_eq!(s.size(), 0);
    }

    /// Invariant: empty values are legal and distinct from absence.
    #[test]
    fn empty_value_is_present() {
        let mut s = ConfigStore::new();
        s.set("k", "").unwrap();
        assert_eq!(s.get("k"), Some(""));
        assert!(s.contains_key("k"));
        assert_eq!(s.get("other"), None);
    }

    /// Invariant: keys compare exactly, without case folding.
    #[test]
    fn keys_are_case_sensitive() {
        let mut s = ConfigStore::new();
        s.set("Region.http.port", "1").unwrap();
        s.set("region.http.port", "2").unwrap();
        assert_eq!(s.size(), 2);
        assert_eq!(s.get("Region.http.port"), Some("1"));
        assert_eq!(s.get("REGION.HTTP.PORT"), None);
    }

    /// Invariant: remove decrements by one on hit and is a no-op on miss.
    #[test]
    fn remove_hit_and_miss() {
        let mut s = ConfigStore::new();
        s.set("a", "1").unwrap();
        s.set("b", "2").unwrap();
        assert_eq!(s.remove("a"), Some("1".to_string()));
        assert_eq!(s.size(), 1);
        assert_eq!(s.get("a"), None);
        assert_eq!(s.remove("a"), None);
        assert_eq!(s.size(), 1);
    }

    /// Invariant: growth past the threshold keeps every key reachable and
    /// `clear` does not shrink the grown array.
    #[test]
    fn growth_then_clear() {
        let mut s = ConfigStore::new();
        for i in 0..1000 {
            s.set(&format!("region{i}.http.port"), i.to_string()).unwrap();
        }
        assert_eq!(s.size(), 1000);
        assert!(s.bucket_count() > crate::ARRAY_SIZE);
        assert!(s.size() <= s.capacity_limit());
        for i in 0..1000 {
            assert_eq!(s.get(&format!("region{i}.http.port")), Some(i.to_string().as_str()));
        }
        s.table.assert_consistent();

        let grown = s.bucket_count();
        s.clear();
        assert_eq!(s.size(), 0);
        assert_eq!(s.bucket_count(), grown);
        assert_eq!(s.get("region1.http.port"), None);
    }

    /// Invariant: `load_str` merges into existing entries, last duplicate wins.
    #[test]
    fn load_str_merges_with_last_wins() {
        let mut s = ConfigStore::new();
        s.set("keep", "me").unwrap();
        s.set("k", "old").unwrap();
        let report = s.load_str("k=first\nk=second\nnew=1\nbroken\n").unwrap();
        assert_eq!(report.applied, 3);
        assert_eq!(report.malformed, vec![4]);
        assert!(report.file_found);
        assert_eq!(s.get("k"), Some("second"));
        assert_eq!(s.get("keep"), Some("me"));
        assert_eq!(s.size(), 3);
    }

    /// Invariant: a large load grows once ahead of applying pairs.
    #[test]
    fn load_str_reserves_growth() {
        let mut s = ConfigStore::with_options(StoreOptions::default().with_initial_buckets(2).with_capacity_limit(1));
        let text: String = (0..100).map(|i| format!("k{i}=v{i}\n")).collect();
        s.load_str(&text).unwrap();
        assert_eq!(s.size(), 100);
        assert_eq!(s.bucket_count(), 256);
        assert_eq!(s.capacity_limit(), 128);
        s.table.assert_consistent();
    }

    /// Invariant: serialization followed by parsing reproduces the pairs.
    #[test]
    fn write_to_then_load_str_round_trips() {
        let mut s = ConfigStore::new();
        s.set("common.java.home", "/opt/jdk").unwrap();
        s.set("common.java.options", "-Xmx1g -Dfoo=bar").unwrap();
        s.set("odd key:=", " spaced value ").unwrap();
        s.set("#notacomment", "a\nb").unwrap();

        let mut buf = Vec::new();
        s.write_to(&mut buf).unwrap();
        let mut t = ConfigStore::new();
        t.load_str(std::str::from_utf8(&buf).unwrap()).unwrap();
        assert_eq!(snapshot(&s), snapshot(&t));
    }

    /// Invariant: debug logging does not change behavior.
    #[test]
    fn debug_option_is_behavior_neutral() {
        let mut s = ConfigStore::with_options(StoreOptions::default().with_debug(true));
        for i in 0..40 {
            s.set(&format!("k{i}"), "v").unwrap();
        }
        s.load_str("bad line\nk0=w").unwrap();
        assert_eq!(s.size(), 40);
        assert_eq!(s.get("k0"), Some("w"));
    }

    /// Invariant: Debug output lists the entries as a map.
    #[test]
    fn debug_format_lists_entries() {
        let mut s = ConfigStore::new();
        s.set("a", "1").unwrap();
        assert_eq!(format!("{s:?}"), r#"{"a": "1"}"#);
    }
}
