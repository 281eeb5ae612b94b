//! Property-name interning.
//!
//! A custom open-chaining hash table keyed by a per-instance random seed,
//! so untrusted property names cannot force degenerate chains by
//! precomputing collisions. `get` never inserts; `add` returns the
//! canonical shared string. Mutation requires `&mut self`, which is the
//! whole thread-safety story: concurrent lookups are fine, concurrent
//! `add` is rejected by the borrow checker.

use std::sync::Arc;

use rand::Rng as _;

const INITIAL_SIZE: usize = 32;

struct Entry {
    value: Arc<str>,
    hash: u32,
    next: Option<Box<Entry>>,
}

/// Deduplication cache for repeated property names.
///
/// The table may outlive any single reader; a reader optionally owns one
/// through [`ReaderOptions::name_table`](crate::ReaderOptions::name_table).
#[derive(Default)]
pub struct NameTable {
    entries: Vec<Option<Box<Entry>>>,
    count: usize,
    mask: u32,
    seed: u32,
}

impl std::fmt::Debug for NameTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameTable").field("count", &self.count).finish()
    }
}

impl NameTable {
    /// Creates an empty table with a freshly randomized seed.
    #[must_use]
    pub fn new() -> Self {
        let mut table = Self {
            entries: Vec::new(),
            count: 0,
            mask: (INITIAL_SIZE - 1) as u32,
            seed: rand::thread_rng().r#gen(),
        };
        table.entries.resize_with(INITIAL_SIZE, || None);
        table
    }

    /// Number of interned names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Seeded one-at-a-time hash over the name's characters.
    fn hash(&self, chars: impl Iterator<Item = char>, len: usize) -> u32 {
        let mut h = (len as u32).wrapping_add(self.seed);
        for c in chars {
            h = h.wrapping_add((h << 7) ^ (c as u32));
        }
        h = h.wrapping_sub(h >> 17);
        h = h.wrapping_sub(h >> 11);
        h.wrapping_sub(h >> 5)
    }

    fn lookup(&self, hash: u32, key: &[char]) -> Option<Arc<str>> {
        let mut entry = self.entries[(hash & self.mask) as usize].as_deref();
        while let Some(e) = entry {
            if e.hash == hash && e.value.chars().eq(key.iter().copied()) {
                return Some(Arc::clone(&e.value));
            }
            entry = e.next.as_deref();
        }
        None
    }

    /// Returns the canonical instance for `key`, or `None` without
    /// inserting.
    #[must_use]
    pub fn get(&self, key: &[char]) -> Option<Arc<str>> {
        if self.entries.is_empty() || key.is_empty() {
            return None;
        }
        self.lookup(self.hash(key.iter().copied(), key.len()), key)
    }

    /// Inserts `value` if absent and returns the canonical instance.
    pub fn add(&mut self, value: &str) -> Arc<str> {
        if self.entries.is_empty() {
            *self = Self::new();
        }
        let key: Vec<char> = value.chars().collect();
        if key.is_empty() {
            return Arc::from("");
        }
        let hash = self.hash(key.iter().copied(), key.len());
        if let Some(existing) = self.lookup(hash, &key) {
            return existing;
        }

        let canonical: Arc<str> = Arc::from(value);
        let index = (hash & self.mask) as usize;
        let entry = Box::new(Entry {
            value: Arc::clone(&canonical),
            hash,
            next: self.entries[index].take(),
        });
        self.entries[index] = Some(entry);
        self.count += 1;
        if self.count >= self.entries.len() {
            self.grow();
        }
        canonical
    }

    /// Doubles the bucket array and rehashes every chain.
    fn grow(&mut self) {
        let new_size = self.entries.len() * 2;
        let new_mask = (new_size - 1) as u32;
        let mut new_entries: Vec<Option<Box<Entry>>> = Vec::new();
        new_entries.resize_with(new_size, || None);

        for slot in &mut self.entries {
            let mut entry = slot.take();
            while let Some(mut e) = entry {
                entry = e.next.take();
                let index = (e.hash & new_mask) as usize;
                e.next = new_entries[index].take();
                new_entries[index] = Some(e);
            }
        }

        self.entries = new_entries;
        self.mask = new_mask;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_does_not_insert() {
        let table = NameTable::new();
        let key: Vec<char> = "name".chars().collect();
        assert!(table.get(&key).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn add_then_get_returns_the_same_instance() {
        let mut table = NameTable::new();
        let first = table.add("name");
        let key: Vec<char> = "name".chars().collect();
        let second = table.get(&key).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn add_is_idempotent() {
        let mut table = NameTable::new();
        let first = table.add("a");
        let second = table.add("a");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn survives_growth() {
        let mut table = NameTable::new();
        let names: Vec<String> = (0..200).map(|i| format!("property{i}")).collect();
        let canonical: Vec<Arc<str>> = names.iter().map(|n| table.add(n)).collect();
        for (name, arc) in names.iter().zip(&canonical) {
            let key: Vec<char> = name.chars().collect();
            let found = table.get(&key).unwrap();
            assert!(Arc::ptr_eq(arc, &found), "lost {name} across growth");
        }
    }

    #[test]
    fn distinct_tables_use_distinct_seeds() {
        // Not a guarantee (seeds are random), but a collision of two u32
        // draws is vanishingly unlikely and would indicate a fixed seed.
        let a = NameTable::new();
        let b = NameTable::new();
        assert_ne!(a.seed, b.seed);
    }
}
