use std::ops::Index;

use crate::utils::MyHash;

struct Entry<T> {
    value: T,
    /// Index of the next entry in the same bucket, 0 for none.
    next: usize,
}

/// Hash-consing table: every distinct value is stored exactly once.
///
/// Index 0 is a sentry and never holds a value.
/// Entries are never removed, a verification query lives for a single check.
pub struct Table<T> {
    data: Vec<Entry<T>>,
    buckets: Vec<usize>,
    bitmask: u64,
}

impl<T> Table<T>
where
    T: Default,
{
    /// Create a new table with `2^bits` buckets.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 24, "Bucket bits should be in the range 0..=24");

        let num_buckets = 1 << bits;
        Self {
            data: vec![Entry {
                value: T::default(),
                next: 0,
            }],
            buckets: vec![0; num_buckets],
            bitmask: (num_buckets - 1) as u64,
        }
    }
}

impl<T> Table<T> {
    /// Number of stored values.
    pub fn size(&self) -> usize {
        self.data.len() - 1
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Get the reference to the value at the given index.
    pub fn value(&self, index: usize) -> &T {
        assert_ne!(index, 0, "Index is 0");
        &self.data[index].value
    }

    /// Append a value without hash-consing it and return its index.
    pub fn add(&mut self, value: T) -> usize {
        self.data.push(Entry { value, next: 0 });
        self.data.len() - 1
    }
}

impl<T> Table<T>
where
    T: MyHash + Eq,
{
    /// Put a value into the table, returning the index of the existing copy if there is one.
    pub fn put(&mut self, value: T) -> usize {
        let bucket = (value.hash() & self.bitmask) as usize;
        let mut index = self.buckets[bucket];

        if index == 0 {
            let i = self.add(value);
            self.buckets[bucket] = i;
            return i;
        }

        loop {
            if self.data[index].value == value {
                return index;
            }
            let next = self.data[index].next;
            if next == 0 {
                let i = self.add(value);
                self.data[index].next = i;
                return i;
            }
            index = next;
        }
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}
