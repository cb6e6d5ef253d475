//! Compact sets over small field-less enums.
//!
//! Any enum with at most 64 variants can implement [`Bitable`] (usually via
//! `#[derive(Bit)]` from `padbind-bit-derive`) and be stored in a
//! [`Bitmask`], which is a plain `u64` with set operations.

mod bitmask;

pub use bitmask::{Bitmask, Iter};

pub trait Bitable: Copy {
    /// Number of variants.
    const COUNT: u32;

    fn bit(&self) -> u64;
    fn index(&self) -> u32;

    /// Variant by declaration index.
    fn from_index(index: u32) -> Option<Self>;
}

#[cfg(test)]
extern crate self as padbind_bit_mask;
