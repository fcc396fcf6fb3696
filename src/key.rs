//! Sentinel-based key trait for zero-cost optional indices.
//!
//! Links inside nodes are plain integers; a reserved sentinel value
//! (e.g. `u32::MAX`) stands in for "no link" instead of `Option<Idx>`,
//! which would double the link size for most index widths.

/// A copyable index type with a sentinel "none" value.
///
/// Implemented for the unsigned integer types; custom key types
/// (e.g. strongly-typed record ids) can implement it too.
///
/// # Example
///
/// ```
/// use anchor_collections::Key;
///
/// let idx: u32 = 5;
/// assert!(idx.is_some());
/// assert!(u32::NONE.is_none());
/// ```
pub trait Key: Copy + Eq {
    /// Sentinel value representing "no index" / null.
    ///
    /// For the integer impls this is `MAX`, which also caps usable
    /// storage capacity at `MAX` slots.
    const NONE: Self;

    /// Returns `true` if this is the sentinel value.
    #[inline]
    fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Returns `true` if this is not the sentinel value.
    #[inline]
    fn is_some(self) -> bool {
        !self.is_none()
    }

    /// Returns the key as a `usize`, for slot indexing.
    fn as_usize(self) -> usize;

    /// Creates a key from a `usize` slot number.
    fn from_usize(val: usize) -> Self;
}

macro_rules! impl_key_for_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Key for $ty {
                const NONE: Self = <$ty>::MAX;

                #[inline]
                fn as_usize(self) -> usize {
                    self as usize
                }

                #[inline]
                fn from_usize(val: usize) -> Self {
                    val as Self
                }
            }
        )*
    };
}

impl_key_for_unsigned!(u8, u16, u32, u64, usize);
