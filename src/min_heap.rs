use thiserror::Error;

/// Array-backed binary min-heap. The root (index 0) is always the smallest
/// element under `T`'s `Ord`.
#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    elements: Vec<T>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeapError {
    #[error("extract from empty heap")]
    HeapUnderflow,
}

impl<T> MinHeap<T> {
    pub fn heap_size(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn parent(i: usize) -> usize {
        (i - 1) / 2
    }

    fn left(i: usize) -> usize {
        2 * i + 1
    }

    fn right(i: usize) -> usize {
        2 * i + 2
    }
}

impl<T: Ord> MinHeap<T> {
    pub fn build(source: Vec<T>) -> Self {
        let mut heap = MinHeap { elements: source };
        let n = heap.heap_size();
        for i in (0..n / 2).rev() {
            heap.sift_down(i);
        }
        heap
    }

    pub fn valid_min_heap(&self) -> bool {
        (1..self.heap_size()).all(|i| self.elements[Self::parent(i)] <= self.elements[i])
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.heap_size();
        loop {
            let l = Self::left(i);
            let r = Self::right(i);
            let mut smallest = i;
            if l < n && self.elements[l] < self.elements[smallest] {
                smallest = l;
            }
            if r < n && self.elements[r] < self.elements[smallest] {
                smallest = r;
            }
            if smallest == i {
                return;
            }
            self.elements.swap(i, smallest);
            i = smallest;
        }
    }

    pub fn insert(&mut self, value: T) {
        self.elements.push(value);
        let mut i = self.heap_size() - 1;
        while i > 0 {
            let p = Self::parent(i);
            if self.elements[p] <= self.elements[i] {
                break;
            }
            self.elements.swap(i, p);
            i = p;
        }
        debug_assert!(self.valid_min_heap());
    }

    pub fn extract_min(&mut self) -> Result<T, HeapError> {
        if self.is_empty() {
            return Err(HeapError::HeapUnderflow);
        }
        let result = self.elements.swap_remove(0);
        if !self.is_empty() {
            self.sift_down(0);
        }
        Ok(result)
    }
}
