// llcnfc-rs/llcnfc/src/link/ring.rs

/// Fixed-capacity FIFO addressed by `(start, count)`.
///
/// Occupied positions are always the `count` positions starting at `start`,
/// wrapping at `N`. Index bookkeeping never leaves this type.
#[derive(Debug, Clone)]
pub struct Ring<T, const N: usize> {
    slots: [Option<T>; N],
    start: usize,
    count: usize,
}

impl<T, const N: usize> Default for Ring<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Ring<T, N> {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            start: 0,
            count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == N
    }

    fn position(&self, offset: usize) -> usize {
        (self.start + offset) % N
    }

    /// Append at the back; hands the item back when full.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        let pos = self.position(self.count);
        self.slots[pos] = Some(item);
        self.count += 1;
        Ok(())
    }

    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Element `offset` places after the oldest.
    pub fn get(&self, offset: usize) -> Option<&T> {
        if offset >= self.count {
            return None;
        }
        self.slots[self.position(offset)].as_ref()
    }

    /// Remove the oldest element if `pred` accepts it.
    pub fn pop_front_if(&mut self, pred: impl FnOnce(&T) -> bool) -> Option<T> {
        if !self.front().is_some_and(pred) {
            return None;
        }
        let item = self.slots[self.start].take();
        self.start = self.position(1);
        self.count -= 1;
        if self.count == 0 {
            self.start = 0;
        }
        item
    }

    /// Remove the newest element.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let pos = self.position(self.count - 1);
        self.count -= 1;
        let item = self.slots[pos].take();
        if self.count == 0 {
            self.start = 0;
        }
        item
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let (tail, head) = self.slots.split_at(self.start);
        head.iter()
            .chain(tail.iter())
            .take(self.count)
            .filter_map(Option::as_ref)
    }

    /// Oldest first.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        let count = self.count;
        let (tail, head) = self.slots.split_at_mut(self.start);
        head.iter_mut()
            .chain(tail.iter_mut())
            .take(count)
            .filter_map(Option::as_mut)
    }

    /// Empty the ring, returning the elements oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.count);
        while let Some(item) = self.pop_front_if(|_| true) {
            out.push(item);
        }
        out
    }

    pub fn clear(&mut self) {
        self.drain();
    }
}
