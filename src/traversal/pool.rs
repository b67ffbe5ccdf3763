//! Free lists of traversal stack storage.
//!
//! Every traversal needs a few stacks. Their buffers are checked out of a per-frame-type pool and handed back when
//! the traversal is dropped, so walking a tree in steady state does not allocate.

use parking_lot::{const_mutex, Mutex};

/// Capacities of the buffers kept in the pool, one free list per class.
pub const CAPACITY_CLASSES: [usize; 3] = [16, 64, 256];

/// Buffers retained per capacity class. Further returns are dropped.
pub const MAX_FREE_PER_CLASS: usize = 8;

/// Buffers that grew beyond this capacity are dropped instead of returned.
pub const RETENTION_THRESHOLD: usize = CAPACITY_CLASSES[CAPACITY_CLASSES.len() - 1];

const CLASSES: usize = CAPACITY_CLASSES.len();

pub(crate) struct StackPool<T> {
    free: Mutex<[Vec<Vec<T>>; CLASSES]>,
}

impl<T> StackPool<T> {
    pub(crate) const fn new() -> Self {
        Self {
            free: const_mutex([Vec::new(), Vec::new(), Vec::new()]),
        }
    }

    /// Checks out an empty buffer with room for at least `CAPACITY_CLASSES[0]` frames.
    pub(crate) fn take(&self) -> Vec<T> {
        let reused = {
            let mut free = self.free.lock();
            free.iter_mut().find_map(Vec::pop)
        };
        reused.unwrap_or_else(|| Vec::with_capacity(CAPACITY_CLASSES[0]))
    }

    /// Returns `buffer` to the free list of its capacity class.
    pub(crate) fn give(&self, mut buffer: Vec<T>) {
        let capacity = buffer.capacity();
        if capacity > RETENTION_THRESHOLD {
            log::trace!("dropping traversal stack of capacity {capacity} instead of pooling it");
            return;
        }
        let Some(class) = CAPACITY_CLASSES.iter().rposition(|&class| class <= capacity) else {
            return;
        };
        // clear before locking, dropping frames may release whole trees
        buffer.clear();
        let mut free = self.free.lock();
        if free[class].len() < MAX_FREE_PER_CLASS {
            free[class].push(buffer);
        }
    }

    #[cfg(test)]
    fn free_counts(&self) -> [usize; CLASSES] {
        let free = self.free.lock();
        [free[0].len(), free[1].len(), free[2].len()]
    }
}

/// A frame type with a pool of its own.
pub(crate) trait Pooled: Sized + 'static {
    fn pool() -> &'static StackPool<Self>;
}

/// A stack whose storage comes from the pool of `T`.
///
/// No buffer is checked out until the first push, so stacks a traversal never uses cost nothing.
pub(crate) struct PooledVec<T: Pooled> {
    inner: Vec<T>,
}

impl<T: Pooled> PooledVec<T> {
    pub(crate) const fn new() -> Self {
        Self { inner: Vec::new() }
    }

    #[inline]
    pub(crate) fn push(&mut self, value: T) {
        if self.inner.capacity() == 0 {
            self.inner = T::pool().take();
        }
        self.inner.push(value);
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Option<T> {
        self.inner.pop()
    }

    #[inline]
    pub(crate) fn last(&self) -> Option<&T> {
        self.inner.last()
    }

    #[inline]
    pub(crate) fn last_mut(&mut self) -> Option<&mut T> {
        self.inner.last_mut()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T: Pooled> Drop for PooledVec<T> {
    fn drop(&mut self) {
        if self.inner.capacity() > 0 {
            T::pool().give(std::mem::take(&mut self.inner));
        }
    }
}
