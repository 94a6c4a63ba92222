//! Chains: slot heads, the entry arena and the collision bookkeeping.
//!
//! Every entry lives in a `SlotMap` arena. A slot head and an entry's `next`
//! field both hold arena keys, so each chain is a singly-linked list without
//! raw pointers. Entries never move in the arena; resizing only rewrites the
//! head array and the `next` links.
//!
//! Counters follow the table's load policy:
//! - `collisions` grows by one for each insert appended behind an existing
//!   head, and shrinks by one only when a non-head entry is removed.
//! - `current_load` is `collisions / capacity`, refreshed after a collision
//!   insert and after each resize. Removal leaves it untouched.
//!
//! Growth doubles only while a doubling can still split some chain. Once
//! every chain holds a single digest (always the case past `u32::MAX`
//! slots, where each slot is its digest) the table stays put even if the
//! ratio is over the threshold.
//!
//! This layer never sees keys it has to hash; callers pass digests in.

use crate::config::{Settings, Storage};
use crate::entry::Entry;
use crate::error::{Error, Result};
use slotmap::{DefaultKey, SlotMap};

/// Where an insert ended up.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Placement {
    /// Became the head of an empty slot.
    Head,
    /// Appended behind an existing head (a collision).
    Appended,
    /// Key already present; its value was replaced.
    Updated,
}

#[derive(Debug)]
pub(crate) struct Chains<'a> {
    heads: Vec<Option<DefaultKey>>,
    arena: SlotMap<DefaultKey, Entry<'a>>,
    collisions: usize,
    current_load: f64,
    settings: Settings,
    /// Slot arrays larger than this are refused as if the allocator failed.
    #[cfg(test)]
    slot_limit: Option<usize>,
}

/// Allocate `capacity` empty slot heads, reporting failure instead of aborting.
fn empty_heads(capacity: usize) -> Result<Vec<Option<DefaultKey>>> {
    let mut heads = Vec::new();
    heads
        .try_reserve_exact(capacity)
        .map_err(Error::alloc("allocating slot array"))?;
    heads.resize(capacity, None);
    Ok(heads)
}

impl<'a> Chains<'a> {
    /// `capacity` must already be clamped to at least one slot.
    pub(crate) fn with_capacity(settings: Settings, capacity: usize) -> Result<Self> {
        debug_assert!(capacity >= 1);
        Ok(Self {
            heads: empty_heads(capacity)?,
            arena: SlotMap::new(),
            collisions: 0,
            current_load: 0.0,
            settings,
            #[cfg(test)]
            slot_limit: None,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.arena.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.heads.len()
    }

    pub(crate) fn collisions(&self) -> usize {
        self.collisions
    }

    pub(crate) fn current_load(&self) -> f64 {
        self.current_load
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn storage(&self) -> Storage {
        self.settings.storage
    }

    #[inline]
    fn slot_of(&self, digest: u32) -> usize {
        // u32 -> usize is lossless on every supported target.
        digest as usize % self.heads.len()
    }

    /// Walk the chain for `digest` looking for `key`.
    fn find(&self, digest: u32, key: &[u8]) -> Option<DefaultKey> {
        let mut cur = self.heads[self.slot_of(digest)];
        while let Some(k) = cur {
            let e = &self.arena[k];
            if e.key_equals(digest, key) {
                return Some(k);
            }
            cur = e.next;
        }
        None
    }

    pub(crate) fn get(&self, digest: u32, key: &[u8]) -> Option<&[u8]> {
        self.find(digest, key).map(|k| &*self.arena[k].value)
    }

    pub(crate) fn contains(&self, digest: u32, key: &[u8]) -> bool {
        self.find(digest, key).is_some()
    }

    /// Link `entry` into its chain, or move its value onto an existing entry
    /// with the same key. Does not grow the table; see `grow_if_overloaded`.
    pub(crate) fn link(&mut self, entry: Entry<'a>) -> Placement {
        debug_assert!(entry.next.is_none());
        let slot = self.slot_of(entry.digest);
        let Some(head) = self.heads[slot] else {
            self.heads[slot] = Some(self.arena.insert(entry));
            return Placement::Head;
        };

        let mut tail = head;
        loop {
            let cur = &mut self.arena[tail];
            if cur.key_equals(entry.digest, &entry.key) {
                cur.set_value(entry.value);
                return Placement::Updated;
            }
            match cur.next {
                Some(next) => tail = next,
                None => break,
            }
        }

        let k = self.arena.insert(entry);
        self.arena[tail].next = Some(k);
        self.collisions += 1;
        self.current_load = self.collisions as f64 / self.capacity() as f64;
        Placement::Appended
    }

    /// Unlink and drop the first entry matching `key`.
    pub(crate) fn remove(&mut self, digest: u32, key: &[u8]) -> bool {
        let slot = self.slot_of(digest);
        let mut prev: Option<DefaultKey> = None;
        let mut cur = self.heads[slot];
        while let Some(k) = cur {
            let e = &self.arena[k];
            if !e.key_equals(digest, key) {
                prev = Some(k);
                cur = e.next;
                continue;
            }
            let next = e.next;
            match prev {
                None => self.heads[slot] = next,
                Some(p) => {
                    self.arena[p].next = next;
                    self.collisions -= 1;
                }
            }
            self.arena.remove(k);
            return true;
        }
        false
    }

    /// True when the load ratio exceeds the threshold and growth is allowed.
    pub(crate) fn overloaded(&self) -> bool {
        self.settings.resize && self.current_load > self.settings.max_load
    }

    /// True when some chain holds entries with different digests, so that a
    /// larger table could spread them over more slots.
    fn splittable(&self) -> bool {
        self.heads.iter().any(|&head| {
            let Some(h) = head else { return false };
            let digest = self.arena[h].digest;
            let mut cur = self.arena[h].next;
            while let Some(k) = cur {
                if self.arena[k].digest != digest {
                    return true;
                }
                cur = self.arena[k].next;
            }
            false
        })
    }

    /// Double the slot count until the load ratio is back under the threshold
    /// or no chain is left that doubling could split.
    pub(crate) fn grow_if_overloaded(&mut self) -> Result<()> {
        if !self.overloaded() {
            return Ok(());
        }
        tracing::debug!(
            current_load = self.current_load,
            max_load = self.settings.max_load,
            "load ratio over threshold"
        );
        if !self.splittable() {
            tracing::debug!(capacity = self.capacity(), "no chain can be split, not growing");
            return Ok(());
        }
        let doubled = self
            .capacity()
            .checked_mul(2)
            .ok_or(Error::CapacityOverflow {
                capacity: self.capacity(),
            })?;
        self.resize(doubled)
    }

    /// Re-slot every entry into `capacity` fresh heads, then keep doubling
    /// for as long as the re-slotted table is itself overloaded and some
    /// chain could still be split.
    ///
    /// Each step commits atomically: if an allocation fails the table stays
    /// valid at the last capacity it reached.
    pub(crate) fn resize(&mut self, capacity: usize) -> Result<()> {
        let mut target = capacity;
        loop {
            self.reslot(target)?;
            if !self.overloaded() || !self.splittable() {
                return Ok(());
            }
            target = target.checked_mul(2).ok_or(Error::CapacityOverflow {
                capacity: target,
            })?;
        }
    }

    fn alloc_heads(&self, capacity: usize) -> Result<Vec<Option<DefaultKey>>> {
        #[cfg(test)]
        {
            if self.slot_limit.is_some_and(|limit| capacity > limit) {
                // More than `isize::MAX` bytes: a real refusal.
                return empty_heads(usize::MAX);
            }
        }
        empty_heads(capacity)
    }

    /// Rebuild the head array at `capacity`, visiting old slots in order and
    /// each chain head to tail, appending at the tail of the new chain.
    fn reslot(&mut self, capacity: usize) -> Result<()> {
        debug_assert!(capacity >= 1);
        let mut heads = self.alloc_heads(capacity)?;
        let mut tails = self.alloc_heads(capacity)?;
        let mut collisions = 0usize;
        let old_capacity = self.capacity();

        // Nothing below allocates, so the swap cannot be interrupted.
        for old_head in core::mem::take(&mut self.heads) {
            let mut cur = old_head;
            while let Some(k) = cur {
                let e = &mut self.arena[k];
                cur = e.next.take();
                let slot = e.digest as usize % capacity;
                match tails[slot] {
                    None => heads[slot] = Some(k),
                    Some(t) => {
                        self.arena[t].next = Some(k);
                        collisions += 1;
                    }
                }
                tails[slot] = Some(k);
            }
        }

        tracing::debug!(
            old_capacity,
            new_capacity = capacity,
            old_collisions = self.collisions,
            new_collisions = collisions,
            "re-slotted table"
        );

        self.heads = heads;
        self.collisions = collisions;
        self.current_load = if collisions == 0 {
            0.0
        } else {
            collisions as f64 / capacity as f64
        };
        Ok(())
    }

    /// Number of entries reachable by walking every chain.
    #[cfg(test)]
    pub(crate) fn reachable(&self) -> usize {
        self.chain_lengths().iter().sum()
    }

    /// Chain lengths per slot, for layout assertions.
    #[cfg(test)]
    pub(crate) fn chain_lengths(&self) -> Vec<usize> {
        self.heads
            .iter()
            .map(|&head| {
                let mut n = 0;
                let mut cur = head;
                while let Some(k) = cur {
                    n += 1;
                    cur = self.arena[k].next;
                }
                n
            })
            .collect()
    }

    /// Make every slot array above `limit` fail to allocate.
    #[cfg(test)]
    pub(crate) fn limit_slots(&mut self, limit: usize) {
        self.slot_limit = Some(limit);
    }

    /// Insert a pre-built value; used by tests that bypass the hasher.
    #[cfg(test)]
    pub(crate) fn link_bytes(
        &mut self,
        digest: u32,
        key: crate::entry::Bytes<'a>,
        value: crate::entry::Bytes<'a>,
    ) -> Placement {
        self.link(Entry::from_bytes(digest, key, value))
    }
}
