//! Table configuration: creation flags, storage mode and the fluent builder.

use crate::error::{Error, Result};
use crate::hasher::{ByteHasher, Djb2};
use crate::span_map::SpanMap;
use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// Slot count used when the caller asks for zero slots.
pub const DEFAULT_CAPACITY: usize = 64;

/// Threshold for `collisions / capacity` used by `Builder::new`.
pub const DEFAULT_MAX_LOAD: f64 = 0.75;

/// How the table holds key and value bytes. Chosen once at creation.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Storage {
    /// Entries reference caller memory, which must outlive the table.
    #[default]
    Borrow,
    /// Entries own private copies made on insert.
    Copy,
}

/// Creation flags, combinable with `|`.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Flags(u32);

impl Flags {
    pub const NONE: Flags = Flags(0x00);
    pub const COPY_KEY_VALUE: Flags = Flags(0x01);
    pub const DISABLE_RESIZE: Flags = Flags(0x02);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn storage(self) -> Storage {
        if self.contains(Flags::COPY_KEY_VALUE) {
            Storage::Copy
        } else {
            Storage::Borrow
        }
    }
}

impl BitOr for Flags {
    type Output = Flags;
    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(Flags::COPY_KEY_VALUE) {
            names.push("COPY_KEY_VALUE");
        }
        if self.contains(Flags::DISABLE_RESIZE) {
            names.push("DISABLE_RESIZE");
        }
        if names.is_empty() {
            f.write_str("Flags(NONE)")
        } else {
            write!(f, "Flags({})", names.join(" | "))
        }
    }
}

/// Settings the table keeps for its whole life, including across resizes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) storage: Storage,
    pub(crate) max_load: f64,
    pub(crate) resize: bool,
}

impl Settings {
    pub(crate) fn new(storage: Storage, max_load: f64, resize: bool) -> Result<Self> {
        if max_load.is_nan() || max_load < 0.0 {
            return Err(Error::InvalidMaxLoad(max_load));
        }
        Ok(Self {
            storage,
            max_load,
            resize,
        })
    }
}

/// Zero means "use the default"; every other request is taken as is.
pub(crate) fn clamp_capacity(requested: usize) -> usize {
    if requested == 0 {
        tracing::debug!(default = DEFAULT_CAPACITY, "zero capacity requested, using default");
        DEFAULT_CAPACITY
    } else {
        requested
    }
}

/// Fluent construction of a [`SpanMap`].
///
/// ```
/// use span_hashmap::{Builder, Storage};
///
/// let mut map = Builder::new()
///     .storage(Storage::Copy)
///     .capacity(16)
///     .max_load(0.5)
///     .build()
///     .unwrap();
/// map.insert_copied(b"k", b"v").unwrap();
/// assert_eq!(map.get(b"k"), Some(&b"v"[..]));
/// ```
pub struct Builder {
    storage: Storage,
    max_load: f64,
    capacity: usize,
    resize: bool,
    hasher: Option<Box<dyn ByteHasher>>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            storage: Storage::default(),
            max_load: DEFAULT_MAX_LOAD,
            capacity: DEFAULT_CAPACITY,
            resize: true,
            hasher: None,
        }
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn storage(mut self, storage: Storage) -> Self {
        self.storage = storage;
        self
    }

    /// Threshold for `collisions / capacity`; exceeding it doubles the table.
    ///
    /// `0.0` grows on any collision that a larger table could separate. Keys
    /// whose digests are equal stay chained, and the table does not grow
    /// for them.
    pub fn max_load(mut self, max_load: f64) -> Self {
        self.max_load = max_load;
        self
    }

    /// Initial slot count; zero selects [`DEFAULT_CAPACITY`].
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn disable_resize(mut self) -> Self {
        self.resize = false;
        self
    }

    pub fn hasher<H>(mut self, hasher: H) -> Self
    where
        H: ByteHasher + 'static,
    {
        self.hasher = Some(Box::new(hasher));
        self
    }

    pub fn build<'a>(self) -> Result<SpanMap<'a>> {
        let settings = Settings::new(self.storage, self.max_load, self.resize)?;
        let hasher = self.hasher.unwrap_or_else(|| Box::new(Djb2));
        SpanMap::from_parts(settings, hasher, self.capacity)
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("storage", &self.storage)
            .field("max_load", &self.max_load)
            .field("capacity", &self.capacity)
            .field("resize", &self.resize)
            .field("custom_hasher", &self.hasher.is_some())
            .finish()
    }
}
