//! Array-backed binary min-heap used to pick the two lightest nodes while
//! building a tree.
//!
//! Elements live at indices `1..=len`; index 0 holds a sentinel that compares
//! less than or equal to every element, so sifting up never has to check for
//! the root explicitly.

#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    elements: Vec<T>,
    capacity: usize,
}

impl<T: Ord> MinHeap<T> {
    pub fn with_capacity(capacity: usize, sentinel: T) -> Self {
        let mut elements = Vec::with_capacity(capacity + 1);
        elements.push(sentinel);
        MinHeap { elements, capacity }
    }

    pub fn len(&self) -> usize {
        self.elements.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn parent(i: usize) -> usize {
        i / 2
    }

    fn left(i: usize) -> usize {
        2 * i
    }

    fn right(i: usize) -> usize {
        2 * i + 1
    }

    /// Inserts `value`, returning `false` without touching the heap when it is
    /// already at capacity.
    pub fn insert(&mut self, value: T) -> bool {
        if self.len() >= self.capacity {
            return false;
        }
        debug_assert!(value >= self.elements[0], "element sorts below the sentinel");

        self.elements.push(value);
        let mut current = self.len();
        while self.elements[current] < self.elements[Self::parent(current)] {
            self.elements.swap(current, Self::parent(current));
            current = Self::parent(current);
        }
        true
    }

    /// Removes and returns the minimum element. Equal elements come out in
    /// heap order, not in any canonical order.
    pub fn remove(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let last = self.len();
        self.elements.swap(1, last);
        let popped = self.elements.pop();
        self.min_heapify(1);
        popped
    }

    fn min_heapify(&mut self, i: usize) {
        let n = self.len();
        let l = Self::left(i);
        let r = Self::right(i);
        if l > n {
            return;
        }

        let mut smallest = l;
        if r <= n && self.elements[r] < self.elements[l] {
            smallest = r;
        }

        if self.elements[i] > self.elements[smallest] {
            self.elements.swap(i, smallest);
            self.min_heapify(smallest);
        }
    }
}
