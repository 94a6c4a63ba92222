//! span-hashmap: a single-threaded chained hash map whose keys and values
//! are raw byte spans, stored either as private copies or as borrows of
//! caller memory.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a separate-chaining table with an explicit, inspectable growth
//!   policy and a choice of ownership for the stored bytes.
//! - Layers:
//!   - `ByteHasher`: pluggable `&[u8] -> u32` digest; `Djb2` by default.
//!   - `Entry`: key/value `Bytes` (owned or borrowed), the key's digest and
//!     the arena key of the next entry in its chain.
//!   - `Chains`: slot heads, the entry arena (`slotmap`), and the entry,
//!     collision and load bookkeeping. Works on digests only.
//!   - `SpanMap`: public API. Hashes keys, builds entries per the storage
//!     mode and delegates to `Chains`.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync`; no locks or atomics. Sharing a map
//!   across threads is not supported.
//! - Keys compare by length and then every byte; embedded zero bytes count.
//! - Lookups never allocate. Copies and slot arrays are allocated fallibly,
//!   so allocation failure surfaces as `Error::Alloc`.
//!
//! Growth policy
//! - The load ratio is `collisions / capacity`, where `collisions` counts
//!   inserts that were appended behind an existing chain head. It is not
//!   the usual `len / capacity`.
//! - After every insert, if resizing is enabled and the ratio exceeds
//!   `max_load`, the slot count doubles. Re-slotting recomputes collisions
//!   for the new layout and keeps doubling while still over the threshold.
//! - Doubling stops once no chain holds two different digests, since more
//!   slots could not split anything. A constant hasher never grows the table.
//! - Removing a non-head entry lowers `collisions`; removing a head does
//!   not. Removal never refreshes the load ratio.
//!
//! Storage modes
//! - `Storage::Copy`: every insert duplicates key and value.
//! - `Storage::Borrow`: entries reference caller memory for the map's
//!   lifetime `'a`; the map never frees it.
//! - `insert_copied` stores copies regardless of mode.
//!
//! Hasher and re-slotting
//! - Each entry keeps the digest computed at insert time; resizing uses the
//!   stored digest and never calls the hasher again.
//!
//! Non-goals
//! - No iteration, no persistence of the map, no concurrent access.

mod chains;
mod config;
mod entry;
mod error;
pub mod hasher;
mod reentrancy;
mod span_map;
mod span_map_proptest;

// Public surface
pub use config::{Builder, Flags, Storage, DEFAULT_CAPACITY, DEFAULT_MAX_LOAD};
pub use error::{Error, Result};
pub use hasher::{ByteHasher, Djb2, Multiplicative};
pub use span_map::SpanMap;
