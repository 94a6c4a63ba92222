//! Entry: one key/value pair plus the arena link to the next entry of its chain.

use crate::config::Storage;
use crate::error::{Error, Result};
use core::fmt;
use core::ops::Deref;
use slotmap::DefaultKey;

/// Key or value bytes, either owned by the entry or borrowed from the caller.
///
/// Length is always explicit; the bytes are never assumed to be text.
pub(crate) enum Bytes<'a> {
    Owned(Box<[u8]>),
    Borrowed(&'a [u8]),
}

impl<'a> Bytes<'a> {
    /// Store `src` according to `storage`: a private copy or a plain reference.
    pub(crate) fn store(storage: Storage, src: &'a [u8], what: &'static str) -> Result<Self> {
        match storage {
            Storage::Copy => copy_bytes(src, what).map(Bytes::Owned),
            Storage::Borrow => Ok(Bytes::Borrowed(src)),
        }
    }

    pub(crate) fn is_owned(&self) -> bool {
        matches!(self, Bytes::Owned(_))
    }
}

impl Deref for Bytes<'_> {
    type Target = [u8];
    #[inline]
    fn deref(&self) -> &[u8] {
        match self {
            Bytes::Owned(b) => b,
            Bytes::Borrowed(b) => b,
        }
    }
}

impl fmt::Debug for Bytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = if self.is_owned() { "Owned" } else { "Borrowed" };
        write!(f, "{}({:?})", tag, &**self)
    }
}

/// Duplicate `src` into a fresh boxed slice without aborting on allocation failure.
pub(crate) fn copy_bytes(src: &[u8], what: &'static str) -> Result<Box<[u8]>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(src.len()).map_err(Error::alloc(what))?;
    buf.extend_from_slice(src);
    Ok(buf.into_boxed_slice())
}

#[derive(Debug)]
pub(crate) struct Entry<'a> {
    pub(crate) key: Bytes<'a>,
    pub(crate) value: Bytes<'a>,
    pub(crate) digest: u32,
    pub(crate) next: Option<DefaultKey>,
}

impl<'a> Entry<'a> {
    /// Build an unlinked entry. In copy mode both buffers are duplicated; if
    /// the second copy fails the first is released before returning.
    pub(crate) fn create(
        storage: Storage,
        digest: u32,
        key: &'a [u8],
        value: &'a [u8],
    ) -> Result<Self> {
        let key = Bytes::store(storage, key, "copying key")?;
        let value = Bytes::store(storage, value, "copying value")?;
        Ok(Self::from_bytes(digest, key, value))
    }

    pub(crate) fn from_bytes(digest: u32, key: Bytes<'a>, value: Bytes<'a>) -> Self {
        Self {
            key,
            value,
            digest,
            next: None,
        }
    }

    /// Full fixed-length comparison; embedded zero bytes are significant.
    #[inline]
    pub(crate) fn key_equals(&self, digest: u32, key: &[u8]) -> bool {
        self.digest == digest && *self.key == *key
    }

    /// Replace the value; an owned previous value is released here.
    pub(crate) fn set_value(&mut self, value: Bytes<'a>) -> Bytes<'a> {
        core::mem::replace(&mut self.value, value)
    }
}
