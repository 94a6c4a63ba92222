//! SpanMap: the public chained hash map over byte-span keys and values.

use crate::chains::{Chains, Placement};
use crate::config::{clamp_capacity, Builder, Flags, Settings, Storage};
use crate::entry::{copy_bytes, Bytes, Entry};
use crate::error::{Error, Result};
use crate::hasher::{ByteHasher, Djb2};
use crate::reentrancy::DebugReentrancy;
use core::fmt;

/// Chained hash map keyed by raw byte spans.
///
/// `'a` is the lifetime of caller memory referenced by entries stored in
/// [`Storage::Borrow`] mode; the borrow checker enforces that such memory
/// outlives the map. Copy-mode maps own every byte they store.
///
/// The map is single-threaded (`!Send`, `!Sync`) and has no internal locking.
///
/// ```
/// use span_hashmap::{Flags, SpanMap};
///
/// let mut map = SpanMap::create(Flags::NONE, 0.1, None, 10).unwrap();
/// map.insert(b"Key-1", b"This is the Value-1").unwrap();
/// assert_eq!(map.get(b"Key-1"), Some(&b"This is the Value-1"[..]));
/// assert!(map.remove(b"Key-1"));
/// assert!(!map.contains(b"Key-1"));
/// ```
pub struct SpanMap<'a> {
    hasher: Box<dyn ByteHasher>,
    chains: Chains<'a>,
    reentrancy: DebugReentrancy,
}

/// Link a prepared entry, then grow if the collision load went over the
/// threshold. The entry stays stored even when growth fails, which is
/// reported as [`Error::Grow`].
fn commit<'a>(chains: &mut Chains<'a>, entry: Entry<'a>) -> Result<()> {
    let digest = entry.digest;
    let placement = chains.link(entry);
    tracing::trace!(digest, ?placement, len = chains.len(), "insert");
    if placement == Placement::Appended {
        tracing::trace!(
            collisions = chains.collisions(),
            current_load = chains.current_load(),
            "collision"
        );
    }
    chains.grow_if_overloaded().map_err(|source| Error::Grow {
        capacity: chains.capacity(),
        source: Box::new(source),
    })
}

impl<'a> SpanMap<'a> {
    /// Create a map from creation flags.
    ///
    /// `hasher` defaults to [`Djb2`]; a `capacity` of zero selects
    /// [`DEFAULT_CAPACITY`](crate::DEFAULT_CAPACITY).
    pub fn create(
        flags: Flags,
        max_load: f64,
        hasher: Option<Box<dyn ByteHasher>>,
        capacity: usize,
    ) -> Result<Self> {
        let settings = Settings::new(
            flags.storage(),
            max_load,
            !flags.contains(Flags::DISABLE_RESIZE),
        )?;
        let hasher = hasher.unwrap_or_else(|| Box::new(Djb2));
        Self::from_parts(settings, hasher, capacity)
    }

    pub fn builder() -> Builder {
        Builder::new()
    }

    pub(crate) fn from_parts(
        settings: Settings,
        hasher: Box<dyn ByteHasher>,
        capacity: usize,
    ) -> Result<Self> {
        let capacity = clamp_capacity(capacity);
        let chains = Chains::with_capacity(settings, capacity)?;
        tracing::debug!(capacity, ?settings, "created span map");
        Ok(Self {
            hasher,
            chains,
            reentrancy: DebugReentrancy::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.len() == 0
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.chains.capacity()
    }

    /// Inserts that landed behind an existing chain head, net of non-head removals.
    pub fn collisions(&self) -> usize {
        self.chains.collisions()
    }

    /// `collisions / capacity` as of the last collision insert or resize.
    pub fn current_load(&self) -> f64 {
        self.chains.current_load()
    }

    pub fn max_load(&self) -> f64 {
        self.chains.settings().max_load
    }

    /// The mode [`insert`](Self::insert) stores with. Entries added through
    /// [`insert_copied`](Self::insert_copied) are owned in either mode, so a
    /// `Borrow` map may hold a mix of borrowed and owned entries.
    pub fn storage(&self) -> Storage {
        self.chains.storage()
    }

    pub fn resize_enabled(&self) -> bool {
        self.chains.settings().resize
    }

    /// Insert or update `key`, storing per the map's [`Storage`] mode.
    ///
    /// An existing key keeps its entry and only the value is replaced; the
    /// entry count and collision count do not change. If the insert pushes
    /// the load ratio over the threshold the map doubles.
    ///
    /// # Errors
    ///
    /// [`Error::Alloc`] if copying the spans failed; nothing was stored.
    /// [`Error::Grow`] if the pair was stored but the growth it triggered
    /// failed; the map keeps its previous capacity.
    pub fn insert(&mut self, key: &'a [u8], value: &'a [u8]) -> Result<()> {
        let _g = self.reentrancy.enter("insert");
        let digest = self.hasher.digest(key);
        let entry = Entry::create(self.chains.storage(), digest, key, value)?;
        commit(&mut self.chains, entry)
    }

    /// Insert or update `key` with private copies of both spans, whatever
    /// the map's storage mode. Suits short-lived buffers.
    ///
    /// Errors as for [`insert`](Self::insert).
    pub fn insert_copied(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let _g = self.reentrancy.enter("insert_copied");
        let digest = self.hasher.digest(key);
        let key = copy_bytes(key, "copying key")?;
        let value = copy_bytes(value, "copying value")?;
        let entry = Entry::from_bytes(digest, Bytes::Owned(key), Bytes::Owned(value));
        commit(&mut self.chains, entry)
    }

    /// The value stored for `key`. A stored empty value is `Some(&[])`.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        let _g = self.reentrancy.enter("get");
        let digest = self.hasher.digest(key);
        self.chains.get(digest, key)
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        let _g = self.reentrancy.enter("contains");
        let digest = self.hasher.digest(key);
        self.chains.contains(digest, key)
    }

    /// Remove `key`; returns whether it was present.
    pub fn remove(&mut self, key: &[u8]) -> bool {
        let _g = self.reentrancy.enter("remove");
        let digest = self.hasher.digest(key);
        let found = self.chains.remove(digest, key);
        tracing::trace!(digest, found, len = self.chains.len(), "remove");
        found
    }

    /// Re-slot every entry into `new_capacity` slots (zero selects the
    /// default). If the result is still over the load threshold and resizing
    /// is enabled, the map keeps doubling from there.
    pub fn resize(&mut self, new_capacity: usize) -> Result<()> {
        let _g = self.reentrancy.enter("resize");
        self.chains.resize(clamp_capacity(new_capacity))
    }

    /// Release every entry and the slot array. Borrowed spans are left alone.
    pub fn destroy(self) {
        tracing::debug!(
            len = self.chains.len(),
            capacity = self.chains.capacity(),
            "destroying span map"
        );
    }

    #[cfg(test)]
    pub(crate) fn chains(&self) -> &Chains<'a> {
        &self.chains
    }

    #[cfg(test)]
    pub(crate) fn chains_mut(&mut self) -> &mut Chains<'a> {
        &mut self.chains
    }
}

impl fmt::Debug for SpanMap<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpanMap")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("collisions", &self.collisions())
            .field("current_load", &self.current_load())
            .field("max_load", &self.max_load())
            .field("storage", &self.storage())
            .field("resize_enabled", &self.resize_enabled())
            .finish_non_exhaustive()
    }
}
