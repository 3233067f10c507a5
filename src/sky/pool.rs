//! Fixed-capacity pool of reusable handles
//!
//! All members are created up front. Acquiring never creates anything:
//! once every member is active, [`Pool::acquire`] returns `None`.

/// A pool of pre-created members identified by handle.
///
/// Acquire and release are O(1) apart from the handle lookup on release.
#[derive(Debug, Clone)]
pub struct Pool<H> {
    /// Every member and whether it is currently active
    slots: Vec<(H, bool)>,
    /// Indices of inactive slots
    free_list: Vec<usize>,
}

impl<H: Copy + Eq> Pool<H> {
    /// Build a pool from handles created by the caller, all inactive
    pub fn new(members: impl IntoIterator<Item = H>) -> Self {
        let slots: Vec<(H, bool)> = members.into_iter().map(|h| (h, false)).collect();
        let free_list = (0..slots.len()).rev().collect();
        Self { slots, free_list }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    #[inline]
    pub fn inactive_count(&self) -> usize {
        self.free_list.len()
    }

    /// Take an inactive member and mark it active.
    ///
    /// Returns `None` when the pool is exhausted.
    pub fn acquire(&mut self) -> Option<H> {
        let index = self.free_list.pop()?;
        let slot = &mut self.slots[index];
        slot.1 = true;
        Some(slot.0)
    }

    /// Return a member to the pool.
    ///
    /// Releasing an inactive or unknown handle does nothing and returns false.
    pub fn release(&mut self, handle: H) -> bool {
        let Some(index) = self.slots.iter().position(|(h, _)| *h == handle) else {
            return false;
        };
        if !self.slots[index].1 {
            return false;
        }
        self.slots[index].1 = false;
        self.free_list.push(index);
        true
    }

    pub fn is_active(&self, handle: H) -> bool {
        self.slots.iter().any(|(h, active)| *h == handle && *active)
    }

    /// Handles of all active members
    pub fn active(&self) -> impl Iterator<Item = H> + '_ {
        self.slots.iter().filter(|(_, active)| *active).map(|(h, _)| *h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_counts_consistent(pool: &Pool<u32>) {
        assert_eq!(pool.active_count() + pool.inactive_count(), pool.capacity());
    }

    #[test]
    fn test_exhaustion_and_recycling() {
        let mut pool = Pool::new([10u32, 11, 12]);
        assert_eq!(pool.capacity(), 3);

        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        let c = pool.acquire().unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
        for handle in [a, b, c] {
            assert!(pool.is_active(handle));
        }
        assert_counts_consistent(&pool);

        // Exhausted: nothing new is created
        assert_eq!(pool.acquire(), None);
        assert_eq!(pool.capacity(), 3);

        assert!(pool.release(b));
        assert_eq!(pool.active_count(), 2);
        assert_eq!(pool.acquire(), Some(b));
        assert_counts_consistent(&pool);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut pool = Pool::new([1u32, 2]);
        let a = pool.acquire().unwrap();

        assert!(pool.release(a));
        assert!(!pool.release(a));
        assert!(!pool.release(99));
        assert_eq!(pool.inactive_count(), 2);
        assert_counts_consistent(&pool);
    }

    #[test]
    fn test_active_iteration() {
        let mut pool = Pool::new([1u32, 2, 3]);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        pool.release(a);

        let active: Vec<u32> = pool.active().collect();
        assert_eq!(active, vec![b]);
        assert!(pool.is_active(b));
        assert!(!pool.is_active(a));
    }

    #[test]
    fn test_empty_pool_never_acquires() {
        let mut pool: Pool<u32> = Pool::new(Vec::new());
        assert_eq!(pool.acquire(), None);
        assert_counts_consistent(&pool);
    }
}
