//! Append-only storage addressed by typed ids.
//!
//! Every arena picks a random check value on creation and stamps it into the ids it hands out,
//! so an id used with an arena that did not create it is caught instead of silently aliasing.

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Declare a new id type that can be used to index an [Arena].
#[macro_export]
macro_rules! new_index_type {
    ($vis:vis $name:ident) => {
        #[derive(Copy, Clone, Eq, PartialEq, Hash)]
        $vis struct $name($crate::util::arena::Idx);

        impl $crate::util::arena::IndexType for $name {
            fn new(idx: $crate::util::arena::Idx) -> Self {
                $name(idx)
            }
            fn idx(self) -> $crate::util::arena::Idx {
                self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0.index())
            }
        }
    };
}

pub trait IndexType: Debug + Copy + Eq + Hash {
    fn new(idx: Idx) -> Self;
    fn idx(self) -> Idx;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Idx {
    index: usize,
    check: u64,
}

impl Idx {
    pub fn index(self) -> usize {
        self.index
    }
}

pub struct Arena<K: IndexType, T> {
    values: Vec<T>,
    check: u64,
    ph: PhantomData<K>,
}

impl<K: IndexType, T> Arena<K, T> {
    pub fn push(&mut self, value: T) -> K {
        let idx = Idx {
            index: self.values.len(),
            check: self.check,
        };
        self.values.push(value);
        K::new(idx)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn contains(&self, key: K) -> bool {
        let idx = key.idx();
        idx.check == self.check && idx.index < self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        let check = self.check;
        self.values
            .iter()
            .enumerate()
            .map(move |(index, value)| (K::new(Idx { index, check }), value))
    }

    pub fn get(&self, key: K) -> Option<&T> {
        if self.contains(key) {
            Some(&self.values[key.idx().index])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        if self.contains(key) {
            Some(&mut self.values[key.idx().index])
        } else {
            None
        }
    }

    fn checked_index(&self, key: K) -> usize {
        let idx = key.idx();
        assert_eq!(idx.check, self.check, "{:?} used with an arena that did not create it", key);
        idx.index
    }
}

impl<K: IndexType, T> Index<K> for Arena<K, T> {
    type Output = T;
    fn index(&self, key: K) -> &T {
        &self.values[self.checked_index(key)]
    }
}

impl<K: IndexType, T> IndexMut<K> for Arena<K, T> {
    fn index_mut(&mut self, key: K) -> &mut T {
        let index = self.checked_index(key);
        &mut self.values[index]
    }
}

impl<K: IndexType, T> Default for Arena<K, T> {
    fn default() -> Self {
        Arena {
            values: vec![],
            check: rand::random(),
            ph: PhantomData,
        }
    }
}

#[cfg(test)]
mod test {
    use crate::util::arena::Arena;

    new_index_type!(TestId);

    #[test]
    fn push_and_index() {
        let mut arena: Arena<TestId, &str> = Arena::default();
        let idle = arena.push("IDLE");
        let busy = arena.push("BUSY");
        arena[busy] = "WORK";

        assert_eq!(arena[idle], "IDLE");
        assert_eq!(arena[busy], "WORK");
        assert_eq!(arena.len(), 2);
        assert_eq!(format!("{:?}", busy), "TestId(1)");
    }

    #[test]
    fn ids_belong_to_their_arena() {
        let mut first: Arena<TestId, u32> = Arena::default();
        let mut second: Arena<TestId, u32> = Arena::default();
        let key = first.push(1);
        second.push(2);

        assert!(first.contains(key));
        assert!(!second.contains(key));
        assert_eq!(first.get(key), Some(&1));
        assert_eq!(second.get(key), None);
    }

    #[test]
    #[should_panic(expected = "did not create it")]
    fn foreign_id_panics() {
        let mut first: Arena<TestId, u32> = Arena::default();
        let second: Arena<TestId, u32> = Arena::default();
        let key = first.push(1);
        let _ = second[key];
    }

    #[test]
    fn iter_in_push_order() {
        let mut arena: Arena<TestId, char> = Arena::default();
        let a = arena.push('a');
        let b = arena.push('b');
        assert_eq!(arena.iter().collect::<Vec<_>>(), vec![(a, &'a'), (b, &'b')]);
    }
}
