use alloc::vec::Vec;

use super::handle::Handle;

/// Slot-based storage for tree nodes. Freed slots are recycled through a
/// free list, so handles stay dense across long insert/delete workloads.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self { slots: Vec::new(), free: Vec::new() }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(handle) = self.free.pop() {
            self.slots[handle.to_index()] = Some(element);
            handle
        } else {
            // Strict less-than: after the push the arena holds at most
            // `Handle::MAX` elements, so every slot is addressable.
            assert!(
                self.slots.len() < Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX
            );
            self.slots.push(Some(element));
            Handle::from_index(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    /// Removes the element, returning it and recycling the slot.
    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    pub(crate) fn free(&mut self, handle: Handle) {
        drop(self.take(handle));
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use alloc::vec::Vec;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn freed_slots_are_recycled() {
        let mut arena: Arena<u32> = Arena::new();
        let a = arena.alloc(1);
        let b = arena.alloc(2);
        arena.free(a);
        assert_eq!(arena.len(), 1);

        // The next allocation reuses the freed slot.
        let c = arena.alloc(3);
        assert_eq!(c, a);
        assert_eq!(*arena.get(b), 2);
        assert_eq!(*arena.get(c), 3);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Alloc(u32),
        Mutate(usize, u32),
        Take(usize),
        Clear,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            20 => any::<u32>().prop_map(Op::Alloc),
            6 => (any::<usize>(), any::<u32>()).prop_map(|(which, value)| Op::Mutate(which, value)),
            6 => any::<usize>().prop_map(Op::Take),
            1 => Just(Op::Clear),
        ]
    }

    proptest! {
        /// Replays random operations against a vec-of-pairs model; every live
        /// handle must keep resolving to the value it was allocated with.
        #[test]
        fn arena_matches_model(ops in prop::collection::vec(op_strategy(), 0..256)) {
            let mut arena: Arena<u32> = Arena::new();
            let mut model: Vec<(Handle, u32)> = Vec::new();

            for op in ops {
                match op {
                    Op::Alloc(value) => {
                        model.push((arena.alloc(value), value));
                    }
                    Op::Mutate(which, value) => {
                        if model.is_empty() {
                            continue;
                        }
                        let index = which % model.len();
                        let entry = &mut model[index];
                        *arena.get_mut(entry.0) = value;
                        entry.1 = value;
                    }
                    Op::Take(which) => {
                        if model.is_empty() {
                            continue;
                        }
                        let (handle, expected) = model.swap_remove(which % model.len());
                        prop_assert_eq!(arena.take(handle), expected);
                    }
                    Op::Clear => {
                        arena.clear();
                        model.clear();
                    }
                }

                prop_assert_eq!(arena.len(), model.len());
                for &(handle, value) in &model {
                    prop_assert_eq!(*arena.get(handle), value);
                }
            }
        }
    }
}
