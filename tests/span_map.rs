// SpanMap integration suite.
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Count: `len` equals the number of distinct keys present.
// - Update: re-inserting a key replaces its value in place.
// - Byte equality: keys match on length and every byte, zeros included.
// - Growth: driven by `collisions / capacity`, suppressed by DISABLE_RESIZE,
//   and stopped once no chain can be split by doubling.
// - Allocation failure: the call fails and the map stays usable.
// - Resize: every pair survives re-slotting with its last value.
use span_hashmap::{ByteHasher, Error, Flags, Multiplicative, SpanMap, Storage};

const KEYS: [&[u8]; 6] = [b"Key-0", b"Key-1", b"Key-2", b"Key-3", b"Key-4", b"Key-5"];
const VALUES: [&[u8]; 6] = [
    b"This is the Value-0",
    b"This is the Value-1",
    b"This is the Value-2",
    b"This is the Value-3",
    b"This is the Value-4",
    b"This is the Value-5",
];

fn six_key_table() -> SpanMap<'static> {
    let mut m = SpanMap::create(Flags::NONE, 0.1, None, 10).expect("create");
    for (k, v) in KEYS.into_iter().zip(VALUES) {
        m.insert(k, v).expect("insert");
    }
    m
}

// Test: the six-key walkthrough.
// Assumes: capacity 10, max load 0.1, borrow mode, default hasher.
// Verifies: lookups, removal, and retrieval after an explicit resize.
#[test]
fn six_key_walkthrough() {
    let mut m = six_key_table();
    assert_eq!(m.len(), 6);
    assert_eq!(m.get(b"Key-1"), Some(&b"This is the Value-1"[..]));
    assert_eq!(m.get(b"Key-3"), Some(&b"This is the Value-3"[..]));
    assert_eq!(m.get(b"Key-5"), Some(&b"This is the Value-5"[..]));

    assert!(m.remove(b"Key-2"));
    assert!(!m.contains(b"Key-2"));
    assert_eq!(m.len(), 5);

    m.resize(32).expect("resize");
    assert_eq!(m.capacity(), 32);
    assert_eq!(m.get(b"Key-4"), Some(&b"This is the Value-4"[..]));
    assert_eq!(m.len(), 5);
    m.destroy();
}

// Test: the six keys land in distinct slots under the default hasher.
// Verifies: no collisions, no growth at capacity 10.
#[test]
fn six_keys_do_not_collide() {
    let m = six_key_table();
    assert_eq!(m.collisions(), 0);
    assert_eq!(m.current_load(), 0.0);
    assert_eq!(m.capacity(), 10);
}

// Test: update-or-insert.
// Verifies: same key twice keeps len and returns the last value.
#[test]
fn reinsert_updates_value() {
    let mut m = SpanMap::builder().storage(Storage::Copy).build().unwrap();
    m.insert_copied(b"k", b"first").unwrap();
    m.insert_copied(b"k", b"second, longer").unwrap();
    assert_eq!(m.len(), 1);
    assert_eq!(m.get(b"k"), Some(&b"second, longer"[..]));
    m.insert_copied(b"k", b"").unwrap();
    assert_eq!(m.get(b"k"), Some(&b""[..]));
}

// Test: absent keys.
// Verifies: get/contains/remove report absence and len is unchanged.
#[test]
fn absent_key_is_not_found() {
    let mut m = six_key_table();
    assert_eq!(m.get(b"Key-9"), None);
    assert!(!m.contains(b"Key-9"));
    assert!(!m.remove(b"Key-9"));
    assert_eq!(m.len(), 6);
    // Same prefix, different length.
    assert!(!m.contains(b"Key-"));
    assert!(!m.contains(b"Key-11"));
}

// Test: embedded zero bytes.
// Assumes: keys are compared as raw bytes, not C strings.
// Verifies: keys differing only after a zero byte are distinct entries.
#[test]
fn embedded_zero_bytes_are_significant() {
    let mut m = SpanMap::builder().capacity(1).disable_resize().build().unwrap();
    m.insert(b"ab\0cd", b"one").unwrap();
    m.insert(b"ab\0ce", b"two").unwrap();
    m.insert(b"ab", b"three").unwrap();
    assert_eq!(m.len(), 3);
    assert_eq!(m.get(b"ab\0cd"), Some(&b"one"[..]));
    assert_eq!(m.get(b"ab\0ce"), Some(&b"two"[..]));
    assert_eq!(m.get(b"ab"), Some(&b"three"[..]));
    m.insert(b"v", b"\0\0\x01\0").unwrap();
    assert_eq!(m.get(b"v"), Some(&b"\0\0\x01\0"[..]));
}

// Test: equal-length keys with different content under a hasher that only
// looks at length.
// Verifies: they never alias each other.
#[test]
fn equal_length_keys_stay_distinct() {
    let mut m = SpanMap::builder()
        .hasher(|b: &[u8]| b.len() as u32)
        .storage(Storage::Copy)
        .build()
        .unwrap();
    for i in 0u16..50 {
        m.insert_copied(&i.to_be_bytes(), &i.to_le_bytes()).unwrap();
    }
    assert_eq!(m.len(), 50);
    for i in 0u16..50 {
        assert_eq!(m.get(&i.to_be_bytes()), Some(&i.to_le_bytes()[..]));
    }
}

// Test: resize preserves content.
// Verifies: shrinking and growing keep every pair and len.
#[test]
fn resize_round_trip_keeps_pairs() {
    let mut m = SpanMap::builder()
        .storage(Storage::Copy)
        .capacity(8)
        .max_load(1000.0)
        .build()
        .unwrap();
    for i in 0u32..200 {
        m.insert_copied(format!("key-{i}").as_bytes(), &i.to_le_bytes())
            .unwrap();
    }
    for cap in [1, 3, 512, 7] {
        m.resize(cap).unwrap();
        assert_eq!(m.capacity(), cap);
        assert_eq!(m.len(), 200);
        for i in 0u32..200 {
            let got = m.get(format!("key-{i}").as_bytes());
            assert_eq!(got, Some(&i.to_le_bytes()[..]));
        }
    }
}

// Test: automatic growth.
// Assumes: max load 0.0, so any surviving collision is over the threshold.
// Verifies: capacity doubles until the collision count reaches zero.
#[test]
fn zero_max_load_grows_until_collision_free() {
    let mut m = SpanMap::builder()
        .storage(Storage::Copy)
        .capacity(1)
        .max_load(0.0)
        .build()
        .unwrap();
    for i in 0u32..16 {
        m.insert_copied(&i.to_le_bytes(), b"v").unwrap();
        assert_eq!(m.collisions(), 0);
    }
    assert!(m.capacity().is_power_of_two());
    assert!(m.capacity() >= 16);
}

// Test: DISABLE_RESIZE.
// Verifies: capacity never changes however many collisions accumulate.
#[test]
fn disable_resize_pins_capacity() {
    let mut m = SpanMap::create(Flags::COPY_KEY_VALUE | Flags::DISABLE_RESIZE, 0.01, None, 4)
        .unwrap();
    for i in 0u32..500 {
        m.insert_copied(&i.to_le_bytes(), b"v").unwrap();
    }
    assert_eq!(m.capacity(), 4);
    assert_eq!(m.len(), 500);
    assert!(m.collisions() >= 496);
    assert!(m.current_load() > m.max_load());
}

// Test: custom hasher plumbing through `create`.
// Verifies: the alternate multiplicative hasher works end to end.
#[test]
fn create_with_custom_hasher() {
    let h: Box<dyn ByteHasher> = Box::new(Multiplicative::default());
    let mut m = SpanMap::create(Flags::COPY_KEY_VALUE, 0.75, Some(h), 0).unwrap();
    assert_eq!(m.capacity(), span_hashmap::DEFAULT_CAPACITY);
    for i in 0u8..=255 {
        m.insert_copied(&[i, i], &[i]).unwrap();
    }
    assert_eq!(m.len(), 256);
    assert_eq!(m.get(&[42, 42]), Some(&[42u8][..]));
}

// Test: zero threshold with a hasher that gives every key one digest.
// Assumes: the two keys collide at every capacity.
// Verifies: the insert returns, and the table does not grow, because no
//           doubling could separate the keys.
#[test]
fn zero_max_load_constant_hasher_terminates() {
    let mut m = SpanMap::builder()
        .hasher(|_: &[u8]| 7u32)
        .capacity(4)
        .max_load(0.0)
        .build()
        .unwrap();
    m.insert(b"a", b"1").unwrap();
    m.insert(b"b", b"2").unwrap();
    assert_eq!(m.len(), 2);
    assert_eq!(m.capacity(), 4);
    assert_eq!(m.collisions(), 1);
    assert_eq!(m.get(b"b"), Some(&b"2"[..]));
}

// Test: slot arrays too large to allocate.
// Verifies: create and resize report `Error::Alloc`; after the failed
//           resize every pair is still readable and inserts still work.
#[test]
fn allocation_failure_is_recoverable() {
    let err = SpanMap::create(Flags::NONE, 0.75, None, usize::MAX).unwrap_err();
    assert!(matches!(err, Error::Alloc { .. }));

    let mut m = six_key_table();
    let (capacity, len) = (m.capacity(), m.len());
    let err = m.resize(usize::MAX).unwrap_err();
    assert!(matches!(err, Error::Alloc { .. }));
    assert!(err.to_string().contains("slot array"));
    assert_eq!((m.capacity(), m.len()), (capacity, len));
    for (k, v) in KEYS.into_iter().zip(VALUES) {
        assert_eq!(m.get(k), Some(v));
    }
    m.insert(b"Key-6", b"This is the Value-6").unwrap();
    assert_eq!(m.len(), len + 1);
    assert_eq!(m.get(b"Key-6"), Some(&b"This is the Value-6"[..]));
}

// Test: invalid configuration.
// Verifies: NaN and negative thresholds are rejected up front.
#[test]
fn invalid_max_load_is_an_error() {
    let err = SpanMap::builder().max_load(f64::NAN).build().unwrap_err();
    assert!(matches!(err, Error::InvalidMaxLoad(_)));
    assert!(err.to_string().contains("max load"));
    assert!(SpanMap::create(Flags::NONE, -0.1, None, 4).is_err());
}

// Test: borrow mode ties entries to caller buffers.
// Verifies: values read back are the caller's own bytes.
#[test]
fn borrow_mode_shares_caller_memory() {
    let keys: Vec<Vec<u8>> = (0u8..10).map(|i| vec![i; 3]).collect();
    let values: Vec<Vec<u8>> = (0u8..10).map(|i| vec![i; 7]).collect();
    let mut m = SpanMap::create(Flags::NONE, 0.75, None, 4).unwrap();
    for (k, v) in keys.iter().zip(&values) {
        m.insert(k, v).unwrap();
    }
    for (k, v) in keys.iter().zip(&values) {
        let got = m.get(k).unwrap();
        assert_eq!(got.as_ptr(), v.as_ptr());
    }
    assert_eq!(m.storage(), Storage::Borrow);
}
