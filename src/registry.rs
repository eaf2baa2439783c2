use super::hit::{ReadId, SubRanges};
use bimap::BiMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Read {
    pub len: u32,
    pub deleted: bool,
}

/// Every read seen in the input, addressed by a stable handle.
/// Reads are never removed, only flagged as deleted, so handles stay valid.
#[derive(Debug, Default)]
pub struct ReadRegistry {
    names: BiMap<String, ReadId>,
    reads: Vec<Read>,
    length_conflicts: usize,
}

impl ReadRegistry {
    pub fn new() -> ReadRegistry {
        ReadRegistry::default()
    }

    /// Return the handle of `name`, registering it on first sight.
    /// A later conflicting length is reported and ignored.
    /// # Example
    /// ```
    /// use rustyovl::registry::ReadRegistry;
    /// let mut reads = ReadRegistry::new();
    /// let a = reads.intern("read_a", 1000);
    /// let b = reads.intern("read_b", 500);
    /// assert_eq!(reads.intern("read_a", 1000), a);
    /// assert_ne!(a, b);
    /// assert_eq!(reads.name(b), "read_b");
    /// ```
    pub fn intern(&mut self, name: &str, len: u32) -> ReadId {
        if let Some(&id) = self.names.get_by_left(name) {
            let known = self.reads[id as usize].len;
            if known != len {
                self.length_conflicts += 1;
                log::warn!(
                    "Read {} seen with length {} but was first seen with length {}; keeping {}.",
                    name,
                    len,
                    known,
                    known
                );
            }
            return id;
        }
        let id = self.reads.len() as ReadId;
        self.names.insert(name.to_string(), id);
        self.reads.push(Read {
            len,
            deleted: false,
        });
        id
    }

    pub fn get(&self, id: ReadId) -> &Read {
        &self.reads[id as usize]
    }

    pub fn id(&self, name: &str) -> Option<ReadId> {
        self.names.get_by_left(name).copied()
    }

    pub fn name(&self, id: ReadId) -> &str {
        self.names
            .get_by_right(&id)
            .map(|name| name.as_str())
            .unwrap_or_else(|| panic!("read handle {} is not registered", id))
    }

    pub fn mark_deleted(&mut self, id: ReadId) {
        self.reads[id as usize].deleted = true;
    }

    pub fn is_deleted(&self, id: ReadId) -> bool {
        self.reads[id as usize].deleted
    }

    pub fn len(&self) -> usize {
        self.reads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    pub fn n_deleted(&self) -> usize {
        self.reads.iter().filter(|r| r.deleted).count()
    }

    /// Number of times a read was re-registered with a different length.
    pub fn length_conflicts(&self) -> usize {
        self.length_conflicts
    }

    pub fn lengths(&self) -> impl Iterator<Item = u32> + '_ {
        self.reads.iter().map(|r| r.len)
    }

    /// Iterate over `(handle, name, read)` in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (ReadId, &str, &Read)> + '_ {
        self.reads
            .iter()
            .enumerate()
            .map(move |(idx, read)| (idx as ReadId, self.name(idx as ReadId), read))
    }

    /// Flag every read whose sub-range is the empty sentinel.
    pub fn delete_empty(&mut self, subs: &SubRanges) -> usize {
        let mut n = 0;
        for (read, sub) in self.reads.iter_mut().zip(subs.iter()) {
            if sub.is_empty() && !read.deleted {
                read.deleted = true;
                n += 1;
            }
        }
        n
    }
}
