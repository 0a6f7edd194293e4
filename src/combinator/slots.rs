//! Index-preserving result collection.

/// Fixed-size result buffer filled in any order.
///
/// Each slot accepts one value; the buffer hands back the complete, ordered
/// collection exactly once, when the last empty slot is filled.
pub(super) struct Slots<V> {
    entries: Vec<Option<V>>,
    remaining: usize,
}

impl<V> Slots<V> {
    pub(super) fn new(size: usize) -> Self {
        Self {
            entries: std::iter::repeat_with(|| None).take(size).collect(),
            remaining: size,
        }
    }

    /// Stores `value` at `index`.
    ///
    /// Returns the ordered values when this fills the last empty slot. A slot
    /// that is already filled keeps its first value.
    pub(super) fn fill(&mut self, index: usize, value: V) -> Option<Vec<V>> {
        let slot = self.entries.get_mut(index)?;
        if slot.is_some() {
            return None;
        }
        *slot = Some(value);
        self.remaining -= 1;
        if self.remaining > 0 {
            return None;
        }
        self.entries.iter_mut().map(Option::take).collect()
    }
}
