//! Slab arena for nodes and attributes
//!
//! Entries are handed out from preallocated slabs. The first slab holds
//! `initial` entries and each following slab doubles in size until `max`;
//! from then on every slab holds `max` entries. A slab is created with its
//! final capacity and only ever pushed to within that capacity, so its
//! storage never moves and a reference into it stays valid for the arena's
//! whole life. Nothing is freed individually.
//!
//! Ids are flat `u32` indices; the slab sizes are a pure function of the
//! policy, so an index maps back to (slab, slot) arithmetically.

use tracing::trace;

/// Slab growth policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaPolicy {
    /// Entries in the first slab
    pub initial: usize,
    /// Upper bound for slab size
    pub max: usize,
}

impl Default for ArenaPolicy {
    fn default() -> Self {
        ArenaPolicy {
            initial: 100,
            max: 20000,
        }
    }
}

/// Largest slab any policy is clamped to
pub const MAX_SLAB: usize = 1 << 20;

impl ArenaPolicy {
    /// Clamp to a usable policy (`1 <= initial <= max <= MAX_SLAB`)
    pub fn normalized(self) -> Self {
        let initial = self.initial.clamp(1, MAX_SLAB);
        ArenaPolicy {
            initial,
            max: self.max.clamp(initial, MAX_SLAB),
        }
    }
}

/// Bump arena of `T`
#[derive(Debug)]
pub struct Arena<T> {
    slabs: Vec<Vec<T>>,
    policy: ArenaPolicy,
    /// Number of doubling slabs before sizes settle at `max`
    ramp_slabs: usize,
    /// Total entries held by the doubling slabs
    ramp_len: usize,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new(ArenaPolicy::default())
    }
}

impl<T> Arena<T> {
    pub fn new(policy: ArenaPolicy) -> Self {
        let policy = policy.normalized();
        let mut ramp_slabs = 0;
        let mut ramp_len = 0;
        let mut size = policy.initial;
        while size < policy.max {
            ramp_len += size;
            ramp_slabs += 1;
            size = size.saturating_mul(2);
        }

        Arena {
            slabs: Vec::new(),
            policy,
            ramp_slabs,
            ramp_len,
            len: 0,
        }
    }

    /// Capacity of slab number `slab`
    #[inline]
    fn slab_size(&self, slab: usize) -> usize {
        if slab < self.ramp_slabs {
            self.policy.initial << slab
        } else {
            self.policy.max
        }
    }

    /// Map a flat index to (slab, slot)
    #[inline]
    fn locate(&self, index: usize) -> (usize, usize) {
        if index >= self.ramp_len {
            let offset = index - self.ramp_len;
            return (self.ramp_slabs + offset / self.policy.max, offset % self.policy.max);
        }
        // Slab k covers [initial * (2^k - 1), initial * (2^(k+1) - 1))
        let q = index / self.policy.initial + 1;
        let slab = (usize::BITS - 1 - q.leading_zeros()) as usize;
        let start = self.policy.initial * ((1usize << slab) - 1);
        (slab, index - start)
    }

    /// Store `value` and return its index
    pub fn alloc(&mut self, value: T) -> u32 {
        let need_slab = match self.slabs.last() {
            Some(slab) => slab.len() == self.slab_size(self.slabs.len() - 1),
            None => true,
        };
        if need_slab {
            let capacity = self.slab_size(self.slabs.len());
            trace!(slab = self.slabs.len(), capacity, "arena slab allocated");
            self.slabs.push(Vec::with_capacity(capacity));
        }

        let index = self.len;
        if let Some(slab) = self.slabs.last_mut() {
            slab.push(value);
        }
        self.len += 1;
        index as u32
    }

    #[inline]
    pub fn get(&self, index: u32) -> Option<&T> {
        let index = index as usize;
        if index >= self.len {
            return None;
        }
        let (slab, slot) = self.locate(index);
        self.slabs.get(slab)?.get(slot)
    }

    #[inline]
    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        let index = index as usize;
        if index >= self.len {
            return None;
        }
        let (slab, slot) = self.locate(index);
        self.slabs.get_mut(slab)?.get_mut(slot)
    }

    /// Number of entries handed out
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slabs allocated so far
    pub fn slab_count(&self) -> usize {
        self.slabs.len()
    }

    /// Entries in allocation order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slabs.iter().flatten()
    }
}

impl<T> std::ops::Index<u32> for Arena<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: u32) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!("arena index {} out of bounds (len {})", index, self.len),
        }
    }
}

impl<T> std::ops::IndexMut<u32> for Arena<T> {
    #[inline]
    fn index_mut(&mut self, index: u32) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("arena index {} out of bounds (len {})", index, len),
        }
    }
}
