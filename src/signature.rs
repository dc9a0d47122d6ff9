//! Fixed-width component bitsets.

use std::fmt;
use std::ops::{BitAnd, BitOr};

use crate::component::{ComponentId, MAX_COMPONENTS};

/// A set of [component ids](ComponentId), one bit per id.
///
/// For an entity, bit `k` means the entity carries component `k`. For a
/// [`System`](crate::system::System), bit `k` means entities must carry
/// component `k` to be tracked by it.
#[repr(transparent)]
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature {
    bits: u32,
}

/// An iterator over the component ids in a [`Signature`].
#[derive(Clone)]
pub struct SignatureIter {
    bits: u32,
}

const _: () = assert!(MAX_COMPONENTS == u32::BITS as usize);

impl Signature {
    /// Returns an empty signature.
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    /// Creates a signature from its raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self { bits }
    }

    /// Returns the raw bits of this signature.
    pub const fn bits(self) -> u32 {
        self.bits
    }

    /// Returns the amount of components in this signature.
    pub const fn len(self) -> usize {
        self.bits.count_ones() as _
    }

    /// Returns `true` if this signature contains no components.
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Returns `true` if the component is in this signature.
    pub const fn contains(self, id: ComponentId) -> bool {
        self.bits & Self::bit(id) != 0
    }

    /// Returns `true` if every component of `other` is in this signature.
    ///
    /// This is the matching predicate between an entity (`self`) and the
    /// requirements of a system (`other`).
    pub const fn contains_all(self, other: Self) -> bool {
        self.bits & other.bits == other.bits
    }

    /// Adds a component to this signature.
    ///
    /// Returns `true` if it wasn't present.
    pub fn set(&mut self, id: ComponentId) -> bool {
        let had = self.contains(id);

        self.bits |= Self::bit(id);

        !had
    }

    /// Removes a component from this signature.
    ///
    /// Returns `true` if it was present.
    pub fn unset(&mut self, id: ComponentId) -> bool {
        let had = self.contains(id);

        self.bits &= !Self::bit(id);

        had
    }

    /// Adds a component and returns `self`.
    pub fn with(mut self, id: ComponentId) -> Self {
        self.set(id);

        self
    }

    /// Removes a component and returns `self`.
    pub fn without(mut self, id: ComponentId) -> Self {
        self.unset(id);

        self
    }

    /// Returns the components in both signatures.
    pub const fn intersection(self, other: Self) -> Self {
        Self { bits: self.bits & other.bits }
    }

    /// Returns the components in either signature.
    pub const fn union(self, other: Self) -> Self {
        Self { bits: self.bits | other.bits }
    }

    /// Returns the components in this signature but not in `other`.
    pub const fn difference(self, other: Self) -> Self {
        Self { bits: self.bits & !other.bits }
    }

    /// Removes all components from this signature.
    pub fn clear(&mut self) {
        self.bits = 0;
    }

    /// Returns an iterator over the component ids in ascending order.
    pub const fn iter(self) -> SignatureIter {
        SignatureIter { bits: self.bits }
    }

    const fn bit(id: ComponentId) -> u32 {
        debug_assert!(id.0 < MAX_COMPONENTS);

        1 << id.0
    }
}

impl BitAnd for Signature {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.intersection(rhs)
    }
}

impl BitOr for Signature {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl FromIterator<ComponentId> for Signature {
    fn from_iter<I: IntoIterator<Item = ComponentId>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), Self::with)
    }
}

impl IntoIterator for Signature {
    type IntoIter = SignatureIter;
    type Item = ComponentId;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Named(ComponentId);

        impl fmt::Debug for Named {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.0.type_name() {
                    Some(name) => f.write_str(name),
                    None => write!(f, "#{}", self.0.index()),
                }
            }
        }

        f.debug_set().entries(self.iter().map(Named)).finish()
    }
}

impl Iterator for SignatureIter {
    type Item = ComponentId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }

        let index = self.bits.trailing_zeros();

        // clear the lowest set bit
        self.bits &= self.bits - 1;

        Some(ComponentId(index as _))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.bits.count_ones() as usize;

        (len, Some(len))
    }
}

impl ExactSizeIterator for SignatureIter {}
