//! # Compressed rank/select bit vectors with the RRR scheme
//!
//! This crate provides a static bit vector compressed close to the
//! information-theoretic minimum while answering positional queries without
//! decompressing, following the succinct indexable dictionaries of
//! Raman, Raman, and Rao.
//!
//! Let $`S \subseteq \{ 0,1,\dots,u-1 \}`$ be the set of positions at which
//! bits are set in a bit vector of length $`u`$. The supported queries are:
//!
//! - $`\textrm{Access}(i)`$ returns `true` if $`i \in S`$ or `false` otherwise
//!   (implemented by [`Access`]).
//! - $`\textrm{Rank}(i)`$ returns the cardinality of
//!   $`\{ x \in S \mid x < i \}`$ (implemented by [`Rank`]).
//! - $`\textrm{Select}(k)`$ returns the $`k`$-th smallest position in $`S`$,
//!   counting from one (implemented by [`Select`]).
//!
//! # Data structures
//!
//! - [`BitVector`] is a plain, updatable bit array packed into 64-bit words,
//!   with fixed- and variable-width integer access. It is the input to and
//!   the output of (de)compression.
//! - [`RrrVector`] is the compressed representation. Bits are grouped into
//!   63-bit blocks, each stored as its popcount (the *class*) plus a
//!   lexicographic index within that class, with sparse superblock summaries
//!   for queries.
//!
//! # Examples
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use rrrbv::{BitVector, RrrVector, Access, Rank, Select, NumBits};
//!
//! let bv = BitVector::from_bits([true, false, false, true, false]);
//! let rrr = RrrVector::new(&bv)?;
//!
//! assert_eq!(rrr.num_bits(), 5);
//! assert_eq!(rrr.num_ones(), 2);
//!
//! assert_eq!(rrr.access(3), Some(true));
//! assert_eq!(rrr.rank1(3), Some(1));
//! assert_eq!(rrr.rank0(3), Some(2));
//! assert_eq!(rrr.select1(2), Some(3));
//! assert_eq!(rrr.select0(1), Some(1));
//!
//! assert_eq!(rrr.uncompress(), bv);
//! # Ok(())
//! # }
//! ```
//!
//! # Serialization
//!
//! Both structures implement [`Serializable`] with a fixed little-endian
//! layout, so serialized bytes can be exchanged across machines.
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use rrrbv::{RrrVector, Serializable};
//!
//! let rrr = RrrVector::from_bits([true, false, true])?;
//!
//! let mut bytes = vec![];
//! rrr.serialize_into(&mut bytes)?;
//! let (other, consumed) = RrrVector::read_from_bytes(&bytes)?;
//!
//! assert_eq!(rrr, other);
//! assert_eq!(consumed, bytes.len());
//! # Ok(())
//! # }
//! ```
#![deny(missing_docs)]

pub mod bit_vector;
pub mod rrr_vector;
pub mod serial;

pub use bit_vector::BitVector;
pub use rrr_vector::RrrVector;
pub use serial::Serializable;

/// Interface for reporting basic statistics in a bit vector.
pub trait NumBits {
    /// Returns the number of bits stored.
    fn num_bits(&self) -> usize;

    /// Returns the number of bits set.
    fn num_ones(&self) -> usize;

    /// Returns the number of bits unset.
    #[inline(always)]
    fn num_zeros(&self) -> usize {
        self.num_bits() - self.num_ones()
    }
}

/// Interface for accessing elements on bit arrays.
pub trait Access {
    /// Returns the `pos`-th bit, or [`None`] if out of bounds.
    fn access(&self, pos: usize) -> Option<bool>;
}

/// Interface for rank queries on bit vectors.
///
/// Let $`S \subseteq \{ 0,1,\dots,u-1 \}`$ be the set of positions at which
/// bits are set in a bit vector of length $`u`$.
pub trait Rank {
    /// Returns the cardinality of $`\{ x \in S \mid x < i \}`$,
    /// or [`None`] if $`u < i`$.
    fn rank1(&self, i: usize) -> Option<usize>;

    /// Returns the cardinality of $`\{ x \not\in S \mid 0 \leq x < i \}`$,
    /// or [`None`] if $`u < i`$.
    fn rank0(&self, i: usize) -> Option<usize>;
}

/// Interface for select queries on bit vectors.
///
/// Let $`S \subseteq \{ 0,1,\dots,u-1 \}`$ be the set of positions at which
/// bits are set in a bit vector of length $`u`$.
///
/// Ranks are counted from one: `select1(1)` is the position of the first set
/// bit. `select1(0)` and `select0(0)` return [`None`].
pub trait Select {
    /// Returns the $`k`$-th smallest position in $`S`$ (1-based), or
    /// [`None`] if `k` is zero or exceeds the number of set bits.
    fn select1(&self, k: usize) -> Option<usize>;

    /// Returns the $`k`$-th smallest position not in $`S`$ (1-based), or
    /// [`None`] if `k` is zero or exceeds the number of unset bits.
    fn select0(&self, k: usize) -> Option<usize>;
}
