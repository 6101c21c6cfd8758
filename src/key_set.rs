use crate::KeyCode;
use bitvec::prelude::*;
use std::fmt;

/// The set of key codes a virtual device declares it can emit.
///
/// Backed by a bitmap as wide as the kernel's key space, so iteration always yields codes in
/// ascending order, which is also the order capabilities get registered in.
#[derive(Clone, PartialEq, Eq)]
pub struct KeySet {
    bits: BitArr!(for KeyCode::COUNT, in u8),
}

impl KeySet {
    pub fn new() -> Self {
        Self {
            bits: BitArray::ZERO,
        }
    }

    /// Adds `key`, returning whether it was newly inserted.
    ///
    /// # Panics
    ///
    /// Panics if the code is outside the kernel's key range (`KEY_MAX`).
    /// See [`KeySet::try_insert`] for a non-panicking version.
    pub fn insert(&mut self, key: KeyCode) -> bool {
        match self.try_insert(key) {
            Some(inserted) => inserted,
            None => panic!("key code {} out of range", key.code()),
        }
    }

    /// Adds `key`, returning whether it was newly inserted, or `None` if the code is outside
    /// the kernel's key range.
    pub fn try_insert(&mut self, key: KeyCode) -> Option<bool> {
        let index = key.code() as usize;
        (index < KeyCode::COUNT).then(|| !self.bits.replace(index, true))
    }

    pub fn contains(&self, key: KeyCode) -> bool {
        self.bits
            .get(key.code() as usize)
            .map_or(false, |bit| *bit)
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    pub fn iter(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.bits.iter_ones().map(|index| KeyCode::new(index as u16))
    }
}

impl Default for KeySet {
    fn default() -> Self {
        Self::new()
    }
}

/// # Panics
///
/// Panics on a code outside the kernel's key range, like [`KeySet::insert`].
impl FromIterator<KeyCode> for KeySet {
    fn from_iter<I: IntoIterator<Item = KeyCode>>(iter: I) -> Self {
        let mut set = KeySet::new();
        iter.into_iter().for_each(|key| {
            set.insert(key);
        });
        set
    }
}

/// # Panics
///
/// Panics on a code outside the kernel's key range, like [`KeySet::insert`].
impl<'a> FromIterator<&'a KeyCode> for KeySet {
    fn from_iter<I: IntoIterator<Item = &'a KeyCode>>(iter: I) -> Self {
        Self::from_iter(iter.into_iter().copied())
    }
}

impl fmt::Debug for KeySet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
