//! Monotonic id allocation.

/// Hands out strictly increasing `u64` ids.
///
/// Ids are never reused, even after the owning structure has been cleared,
/// so a stale id can never alias a live one.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to [`alloc`](Self::alloc) will return
    #[inline]
    pub fn peek(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_monotonic() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.alloc(), 0);
        assert_eq!(ids.alloc(), 1);
        assert_eq!(ids.peek(), 2);
        assert_eq!(ids.alloc(), 2);
    }
}
