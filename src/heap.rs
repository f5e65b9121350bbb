//! Min-heap of weighted samples.
//!
//! Holds the "large" items of a [`Varopt`](crate::Varopt) reservoir, ordered by
//! weight with the lightest item at index 0. The backing array is exposed in
//! heap order because sample indices refer to slots, not sorted rank.

/// A sample paired with the weight it was offered with.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedSample<T> {
    pub sample: T,
    pub weight: f64,
}

impl<T> WeightedSample<T> {
    #[inline]
    pub fn new(sample: T, weight: f64) -> Self {
        Self { sample, weight }
    }
}

/// Array-backed binary min-heap keyed on [`WeightedSample::weight`].
///
/// Ties are broken arbitrarily. The payload is never compared.
#[derive(Debug, Clone)]
pub struct SampleHeap<T> {
    items: Vec<WeightedSample<T>>,
}

impl<T> Default for SampleHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SampleHeap<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Insert an item, restoring heap order. O(log n).
    pub fn push(&mut self, item: WeightedSample<T>) {
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
    }

    /// Remove and return the lightest item. O(log n).
    pub fn pop(&mut self) -> Option<WeightedSample<T>> {
        let last = self.items.len().checked_sub(1)?;
        self.items.swap(0, last);
        let min = self.items.pop();
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        min
    }

    /// The lightest item, if any. O(1).
    #[inline]
    pub fn peek(&self) -> Option<&WeightedSample<T>> {
        self.items.first()
    }

    /// Weight of the lightest item, if any.
    #[inline]
    pub fn min_weight(&self) -> Option<f64> {
        self.peek().map(|s| s.weight)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Backing array in heap order.
    #[inline]
    pub fn as_slice(&self) -> &[WeightedSample<T>] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn sift_up(&mut self, mut child: usize) {
        while child > 0 {
            let parent = (child - 1) / 2;
            if self.items[child].weight >= self.items[parent].weight {
                break;
            }
            self.items.swap(child, parent);
            child = parent;
        }
    }

    fn sift_down(&mut self, mut parent: usize) {
        let n = self.items.len();
        loop {
            let left = 2 * parent + 1;
            if left >= n {
                break;
            }
            let right = left + 1;
            let mut smallest = left;
            if right < n && self.items[right].weight < self.items[left].weight {
                smallest = right;
            }
            if self.items[smallest].weight >= self.items[parent].weight {
                break;
            }
            self.items.swap(parent, smallest);
            parent = smallest;
        }
    }
}
