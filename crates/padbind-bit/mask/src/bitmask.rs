use std::fmt;
use std::marker::PhantomData;

use crate::Bitable;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bitmask<T: Bitable>(u64, PhantomData<T>);

impl<T: Bitable> Bitmask<T> {
    /// Create a new bitmask from a slice of values.
    pub fn new(values: &[T]) -> Self {
        let mut mask = Self::empty();
        for value in values {
            mask.insert(*value);
        }
        mask
    }

    /// Create an empty bitmask.
    pub const fn empty() -> Self {
        Self(0, PhantomData)
    }

    /// Create a bitmask from raw bits.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits, PhantomData)
    }

    #[inline]
    pub const fn bits(&self) -> u64 {
        self.0
    }

    #[inline]
    pub fn contains(&self, value: T) -> bool {
        (self.0 & value.bit()) != 0
    }

    /// Insert a value. Returns `true` if it was not present.
    #[inline]
    pub fn insert(&mut self, value: T) -> bool {
        let fresh = !self.contains(value);
        self.0 |= value.bit();
        fresh
    }

    /// Remove a value. Returns `true` if it was present.
    #[inline]
    pub fn remove(&mut self, value: T) -> bool {
        let present = self.contains(value);
        self.0 &= !value.bit();
        present
    }

    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_subset(&self, other: &Bitmask<T>) -> bool {
        self.0 & other.0 == self.0
    }

    #[inline]
    pub fn is_superset(&self, other: &Bitmask<T>) -> bool {
        other.is_subset(self)
    }

    #[inline]
    pub fn union(&self, other: &Bitmask<T>) -> Bitmask<T> {
        Self::from_bits(self.0 | other.0)
    }

    #[inline]
    pub fn difference(&self, other: &Bitmask<T>) -> Bitmask<T> {
        Self::from_bits(self.0 & !other.0)
    }

    /// Count the number of values in the set.
    #[inline]
    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Iterate values in declaration order.
    pub fn iter(&self) -> Iter<T> {
        Iter {
            rest: self.0,
            _marker: PhantomData,
        }
    }
}

impl<T: Bitable> Default for Bitmask<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Bitable> FromIterator<T> for Bitmask<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut mask = Self::empty();
        for value in iter {
            mask.insert(value);
        }
        mask
    }
}

impl<T: Bitable> IntoIterator for Bitmask<T> {
    type Item = T;
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Iter<T> {
        self.iter()
    }
}

impl<T: Bitable + fmt::Debug> fmt::Debug for Bitmask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

pub struct Iter<T: Bitable> {
    rest: u64,
    _marker: PhantomData<T>,
}

impl<T: Bitable> Iterator for Iter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        while self.rest != 0 {
            let index = self.rest.trailing_zeros();
            self.rest &= self.rest - 1;
            if let Some(value) = T::from_index(index) {
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.rest.count_ones() as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::Bitmask;
    use crate::Bitable;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestFlag {
        A,
        B,
        C,
        D,
    }

    impl Bitable for TestFlag {
        const COUNT: u32 = 4;

        fn bit(&self) -> u64 {
            1u64 << self.index()
        }

        fn index(&self) -> u32 {
            *self as u32
        }

        fn from_index(index: u32) -> Option<Self> {
            [TestFlag::A, TestFlag::B, TestFlag::C, TestFlag::D]
                .get(index as usize)
                .copied()
        }
    }

    #[test]
    fn empty_creates_no_bits_set() {
        let mask = Bitmask::<TestFlag>::empty();
        assert!(!mask.contains(TestFlag::A));
        assert!(!mask.contains(TestFlag::D));
        assert_eq!(mask.iter().count(), 0);
    }

    #[test]
    fn new_handles_duplicates() {
        let mask = Bitmask::new(&[TestFlag::B, TestFlag::B, TestFlag::D]);
        assert!(!mask.contains(TestFlag::A));
        assert!(mask.contains(TestFlag::B));
        assert!(mask.contains(TestFlag::D));
        assert_eq!(mask.count(), 2);
    }

    #[test]
    fn insert_and_remove_report_changes() {
        let mut mask = Bitmask::empty();
        assert!(mask.insert(TestFlag::A));
        assert!(!mask.insert(TestFlag::A));
        assert!(mask.remove(TestFlag::A));
        assert!(!mask.remove(TestFlag::A));
        assert!(mask.is_empty());
    }

    #[test]
    fn iter_yields_declaration_order() {
        let mask = Bitmask::new(&[TestFlag::D, TestFlag::A, TestFlag::C]);
        let values: Vec<_> = mask.iter().collect();
        assert_eq!(values, vec![TestFlag::A, TestFlag::C, TestFlag::D]);
    }

    #[test]
    fn set_operations() {
        let ab = Bitmask::new(&[TestFlag::A, TestFlag::B]);
        let bc = Bitmask::new(&[TestFlag::B, TestFlag::C]);

        assert_eq!(ab.union(&bc), Bitmask::new(&[TestFlag::A, TestFlag::B, TestFlag::C]));
        assert_eq!(ab.difference(&bc), Bitmask::new(&[TestFlag::A]));
        assert!(Bitmask::new(&[TestFlag::B]).is_subset(&ab));
        assert!(ab.is_superset(&Bitmask::new(&[TestFlag::A])));
        assert!(!ab.is_subset(&bc));
    }

    #[test]
    fn collects_from_iterator() {
        let mask: Bitmask<TestFlag> = [TestFlag::C, TestFlag::A].into_iter().collect();
        assert_eq!(format!("{mask:?}"), "{A, C}");
    }
}
