use crate::math::Real;
use core::cmp::Ordering;

/// A value packed with a cost, ordered so that a `BinaryHeap` pops the
/// smallest cost first.
#[derive(Copy, Clone, Debug)]
pub struct WeightedValue<T> {
    pub value: T,
    pub cost: Real,
}

impl<T> WeightedValue<T> {
    /// Creates a new value packed with a cost.
    #[inline]
    pub fn new(value: T, cost: Real) -> WeightedValue<T> {
        WeightedValue { value, cost }
    }
}

impl<T> PartialEq for WeightedValue<T> {
    #[inline]
    fn eq(&self, other: &WeightedValue<T>) -> bool {
        self.cost.eq(&other.cost)
    }
}

impl<T> Eq for WeightedValue<T> {}

impl<T> PartialOrd for WeightedValue<T> {
    #[inline]
    fn partial_cmp(&self, other: &WeightedValue<T>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for WeightedValue<T> {
    #[inline]
    fn cmp(&self, other: &WeightedValue<T>) -> Ordering {
        if self.cost < other.cost {
            Ordering::Greater
        } else if self.cost > other.cost {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }
}

#[cfg(test)]
mod test {
    use super::WeightedValue;
    use alloc::collections::BinaryHeap;

    #[test]
    fn heap_pops_cheapest_first() {
        let mut heap = BinaryHeap::new();
        heap.push(WeightedValue::new(0, 3.0));
        heap.push(WeightedValue::new(1, 1.0));
        heap.push(WeightedValue::new(2, 2.0));

        let order: Vec<_> = core::iter::from_fn(|| heap.pop().map(|w| w.value)).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }
}
