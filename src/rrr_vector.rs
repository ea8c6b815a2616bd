//! Compressed rank/select bit vector based on the RRR succinct indexable
//! dictionary.
#![cfg(target_pointer_width = "64")]

pub mod enumerative;

use std::io::{Read, Write};
use std::mem::size_of;

use anyhow::{anyhow, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::bit_vector::BitVector;
use crate::{Access, NumBits, Rank, Select, Serializable};
use enumerative::{BLOCK_LEN, CLASS_WIDTH, OFFSET_WIDTHS};

/// The number of blocks summarized by one superblock entry.
const SUPERBLOCK_BLOCKS: usize = 32;

/// Static compressed bit vector with rank/select queries, after Raman, Raman,
/// and Rao.
///
/// The input is split into blocks of [`BLOCK_LEN`] = 63 bits. Each block is
/// stored as its popcount (6 bits) plus the lexicographic index of the block
/// within its popcount class, occupying only as many bits as that class
/// requires. Every 32 blocks, a superblock entry
/// records the cumulative popcount and the bit offset of the block's index
/// field, so each query decodes exactly one block after a bounded scan.
///
/// The structure is immutable after construction. All queries are read-only
/// and safe to run from many threads at once.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rrrbv::{BitVector, RrrVector, Access, Rank, Select, NumBits};
///
/// let bv = BitVector::from_bits([true, false, false, true]);
/// let rrr = RrrVector::new(&bv)?;
///
/// assert_eq!(rrr.num_bits(), 4);
/// assert_eq!(rrr.num_ones(), 2);
///
/// assert_eq!(rrr.access(0), Some(true));
/// assert_eq!(rrr.rank1(4), Some(2));
/// assert_eq!(rrr.select1(2), Some(3));
/// assert_eq!(rrr.select0(1), Some(1));
/// # Ok(())
/// # }
/// ```
///
/// # References
///
/// - R. Raman, V. Raman, and S. S. Rao, "Succinct indexable dictionaries with
///   applications to encoding k-ary trees and multisets," ACM Transactions on
///   Algorithms, 2007.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RrrVector {
    len: usize,
    num_ones: usize,
    /// One 6-bit class per block.
    classes: BitVector,
    /// Concatenated per-block offsets, `OFFSET_WIDTHS[class]` bits each.
    offsets: BitVector,
    /// Bit offset into `offsets` at which each superblock's first block starts.
    sb_offsets: Vec<u64>,
    /// Popcount of all bits before each superblock.
    sb_ranks: Vec<u64>,
}

impl RrrVector {
    /// Compresses the bit vector `bv`.
    ///
    /// # Arguments
    ///
    /// - `bv`: Bit vector to compress.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use rrrbv::{BitVector, RrrVector, NumBits};
    ///
    /// let rrr = RrrVector::new(&BitVector::with_len(1000))?;
    /// assert_eq!(rrr.num_bits(), 1000);
    /// assert_eq!(rrr.num_ones(), 0);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(bv: &BitVector) -> Result<Self> {
        let len = bv.len();
        let num_blocks = Self::blocks_for(len);
        let num_superblocks = Self::superblocks_for(num_blocks);

        // First pass: classes and the total width of the offset stream.
        let mut classes = BitVector::with_len(num_blocks * CLASS_WIDTH);
        let mut total_width = 0;
        for b in 0..num_blocks {
            let k = Self::read_block(bv, b).count_ones() as usize;
            classes.set_bits(b * CLASS_WIDTH, k as u64, CLASS_WIDTH)?;
            total_width += usize::from(OFFSET_WIDTHS[k]);
        }

        // Second pass: superblock summaries and the offsets themselves.
        let mut offsets = BitVector::with_len(total_width);
        let mut sb_offsets = Vec::with_capacity(num_superblocks);
        let mut sb_ranks = Vec::with_capacity(num_superblocks);
        let mut cur = 0;
        let mut rank_sum = 0;
        for b in 0..num_blocks {
            if b % SUPERBLOCK_BLOCKS == 0 {
                sb_offsets.push(cur as u64);
                sb_ranks.push(rank_sum as u64);
            }
            let (class, offset) = enumerative::encode(Self::read_block(bv, b));
            let width = usize::from(OFFSET_WIDTHS[class]);
            offsets.set_bits(cur, offset, width)?;
            cur += width;
            rank_sum += class;
        }

        Ok(Self {
            len,
            num_ones: rank_sum,
            classes,
            offsets,
            sb_offsets,
            sb_ranks,
        })
    }

    /// Compresses the input bit stream `bits`.
    ///
    /// # Arguments
    ///
    /// - `bits`: Bit stream.
    pub fn from_bits<I>(bits: I) -> Result<Self>
    where
        I: IntoIterator<Item = bool>,
    {
        Self::new(&BitVector::from_bits(bits))
    }

    /// Decompresses into a plain bit vector equal to the construction input.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use rrrbv::{BitVector, RrrVector};
    ///
    /// let bv = BitVector::from_bits([true, false, true, true, false]);
    /// let rrr = RrrVector::new(&bv)?;
    /// assert_eq!(rrr.uncompress(), bv);
    /// # Ok(())
    /// # }
    /// ```
    pub fn uncompress(&self) -> BitVector {
        let mut bv = BitVector::with_len(self.len);
        let mut cur = 0;
        for b in 0..Self::blocks_for(self.len) {
            let class = self.class_of(b);
            let width = usize::from(OFFSET_WIDTHS[class]);
            let offset = self.offsets.get_bits(cur, width).unwrap();
            cur += width;
            let pos = b * BLOCK_LEN;
            let block = enumerative::decode(class, offset);
            bv.set_bits(pos, block, BLOCK_LEN.min(self.len - pos)).unwrap();
        }
        bv
    }

    /// Returns the number of bytes the serialized structure occupies, not
    /// counting the leading length word: the two packed streams plus 16 bytes
    /// per superblock.
    pub fn size_in_bytes(&self) -> usize {
        self.classes.size_in_bytes()
            + self.offsets.size_in_bytes()
            + (self.sb_offsets.len() + self.sb_ranks.len()) * size_of::<u64>()
    }

    /// Deserializes the structure from the head of `buf`, returning it
    /// together with the number of bytes consumed. Trailing bytes are
    /// ignored.
    ///
    /// # Arguments
    ///
    /// - `buf`: Byte buffer starting with a serialized structure.
    ///
    /// # Errors
    ///
    /// An error is returned if `buf` is truncated or inconsistent.
    pub fn read_from_bytes(buf: &[u8]) -> Result<(Self, usize)> {
        let this = Self::deserialize_from(buf)?;
        let consumed = this.size_in_bytes() + size_of::<u64>();
        Ok((this, consumed))
    }

    /// Reads block `b` of `bv`; the final block may be shorter than
    /// [`BLOCK_LEN`] and is padded with high zeros.
    fn read_block(bv: &BitVector, b: usize) -> u64 {
        let pos = b * BLOCK_LEN;
        bv.get_bits(pos, BLOCK_LEN.min(bv.len() - pos)).unwrap()
    }

    fn class_of(&self, b: usize) -> usize {
        self.classes.get_bits(b * CLASS_WIDTH, CLASS_WIDTH).unwrap() as usize
    }

    /// Decodes block `b` whose offset field starts at bit `cur` of `offsets`.
    fn decode_block(&self, b: usize, cur: usize) -> u64 {
        let class = self.class_of(b);
        let width = usize::from(OFFSET_WIDTHS[class]);
        let offset = self.offsets.get_bits(cur, width).unwrap();
        enumerative::decode(class, offset)
    }

    const fn blocks_for(len: usize) -> usize {
        (len + BLOCK_LEN - 1) / BLOCK_LEN
    }

    const fn superblocks_for(num_blocks: usize) -> usize {
        (num_blocks + SUPERBLOCK_BLOCKS - 1) / SUPERBLOCK_BLOCKS
    }
}

impl NumBits for RrrVector {
    /// Returns the number of bits stored.
    fn num_bits(&self) -> usize {
        self.len
    }

    /// Returns the number of bits set.
    fn num_ones(&self) -> usize {
        self.num_ones
    }
}

impl Access for RrrVector {
    /// Returns the `pos`-th bit, or [`None`] if `self.num_bits() <= pos`.
    ///
    /// # Complexity
    ///
    /// Bounded by one superblock scan plus one block decode.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use rrrbv::{Access, RrrVector};
    ///
    /// let rrr = RrrVector::from_bits([true, false, false])?;
    /// assert_eq!(rrr.access(0), Some(true));
    /// assert_eq!(rrr.access(1), Some(false));
    /// assert_eq!(rrr.access(3), None);
    /// # Ok(())
    /// # }
    /// ```
    fn access(&self, pos: usize) -> Option<bool> {
        if self.len <= pos {
            return None;
        }
        let b = pos / BLOCK_LEN;
        let s = b / SUPERBLOCK_BLOCKS;
        let mut cur = self.sb_offsets[s] as usize;
        for b2 in s * SUPERBLOCK_BLOCKS..b {
            cur += usize::from(OFFSET_WIDTHS[self.class_of(b2)]);
        }
        let block = self.decode_block(b, cur);
        Some((block >> (pos % BLOCK_LEN)) & 1 == 1)
    }
}

impl Rank for RrrVector {
    /// Returns the number of set bits in positions `[0, pos)`, or [`None`] if
    /// `self.num_bits() < pos`.
    ///
    /// # Complexity
    ///
    /// Bounded by one superblock scan plus one block decode.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use rrrbv::{Rank, RrrVector};
    ///
    /// let rrr = RrrVector::from_bits([true, false, false, true])?;
    /// assert_eq!(rrr.rank1(1), Some(1));
    /// assert_eq!(rrr.rank1(3), Some(1));
    /// assert_eq!(rrr.rank1(4), Some(2));
    /// assert_eq!(rrr.rank1(5), None);
    /// # Ok(())
    /// # }
    /// ```
    fn rank1(&self, pos: usize) -> Option<usize> {
        if self.len < pos {
            return None;
        }
        if pos == self.len {
            return Some(self.num_ones);
        }
        let b = pos / BLOCK_LEN;
        let s = b / SUPERBLOCK_BLOCKS;
        let mut rank = self.sb_ranks[s] as usize;
        let mut cur = self.sb_offsets[s] as usize;
        for b2 in s * SUPERBLOCK_BLOCKS..b {
            let class = self.class_of(b2);
            rank += class;
            cur += usize::from(OFFSET_WIDTHS[class]);
        }
        let r = pos % BLOCK_LEN;
        if r != 0 {
            let block = self.decode_block(b, cur);
            rank += (block & ((1 << r) - 1)).count_ones() as usize;
        }
        Some(rank)
    }

    /// Returns the number of unset bits in positions `[0, pos)`, or [`None`]
    /// if `self.num_bits() < pos`.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use rrrbv::{Rank, RrrVector};
    ///
    /// let rrr = RrrVector::from_bits([true, false, false, true])?;
    /// assert_eq!(rrr.rank0(1), Some(0));
    /// assert_eq!(rrr.rank0(3), Some(2));
    /// # Ok(())
    /// # }
    /// ```
    fn rank0(&self, pos: usize) -> Option<usize> {
        Some(pos - self.rank1(pos)?)
    }
}

impl Select for RrrVector {
    /// Returns the position of the `k`-th set bit (1-based), or [`None`] if
    /// `k` is zero or exceeds `self.num_ones()`.
    ///
    /// # Complexity
    ///
    /// Binary search over the superblocks plus one superblock scan and one
    /// block decode.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use rrrbv::{RrrVector, Select};
    ///
    /// let rrr = RrrVector::from_bits([true, false, false, true])?;
    /// assert_eq!(rrr.select1(1), Some(0));
    /// assert_eq!(rrr.select1(2), Some(3));
    /// assert_eq!(rrr.select1(3), None);
    /// assert_eq!(rrr.select1(0), None);
    /// # Ok(())
    /// # }
    /// ```
    fn select1(&self, k: usize) -> Option<usize> {
        if k == 0 || self.num_ones < k {
            return None;
        }
        // The last superblock with fewer than k ones before it.
        let s = self.sb_ranks.partition_point(|&r| (r as usize) < k) - 1;

        let mut rank = self.sb_ranks[s] as usize;
        let mut cur = self.sb_offsets[s] as usize;
        let mut b = s * SUPERBLOCK_BLOCKS;
        let mut class = self.class_of(b);
        while rank + class < k {
            rank += class;
            cur += usize::from(OFFSET_WIDTHS[class]);
            b += 1;
            class = self.class_of(b);
        }

        let mut block = self.decode_block(b, cur);
        for _ in 1..(k - rank) {
            block &= block - 1;
        }
        Some(b * BLOCK_LEN + block.trailing_zeros() as usize)
    }

    /// Returns the position of the `k`-th unset bit (1-based), or [`None`] if
    /// `k` is zero or exceeds `self.num_zeros()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use rrrbv::{RrrVector, Select};
    ///
    /// let rrr = RrrVector::from_bits([true, false, false, true])?;
    /// assert_eq!(rrr.select0(1), Some(1));
    /// assert_eq!(rrr.select0(2), Some(2));
    /// assert_eq!(rrr.select0(3), None);
    /// # Ok(())
    /// # }
    /// ```
    fn select0(&self, k: usize) -> Option<usize> {
        if k == 0 || self.num_zeros() < k {
            return None;
        }
        // Zeros before superblock s. The padding of a trailing partial block
        // counts as zeros here, which is harmless: it sits above every real
        // position and k never reaches it.
        let zeros_before =
            |s: usize| s * SUPERBLOCK_BLOCKS * BLOCK_LEN - self.sb_ranks[s] as usize;

        // The last superblock with fewer than k zeros before it.
        let (mut lo, mut hi) = (0, self.sb_ranks.len());
        while lo < hi {
            let mid = (lo + hi) / 2;
            if zeros_before(mid) < k {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        let s = lo - 1;

        let mut rank = zeros_before(s);
        let mut cur = self.sb_offsets[s] as usize;
        let mut b = s * SUPERBLOCK_BLOCKS;
        let mut class = self.class_of(b);
        while rank + (BLOCK_LEN - class) < k {
            rank += BLOCK_LEN - class;
            cur += usize::from(OFFSET_WIDTHS[class]);
            b += 1;
            class = self.class_of(b);
        }

        let mut block = !self.decode_block(b, cur) & ((1 << BLOCK_LEN) - 1);
        for _ in 1..(k - rank) {
            block &= block - 1;
        }
        Some(b * BLOCK_LEN + block.trailing_zeros() as usize)
    }
}

impl Serializable for RrrVector {
    /// Writes, in order: the bit length as a little-endian `u64`; the
    /// superblock offset entries; the superblock rank entries; the classes
    /// stream; the offsets stream. The superblock count is not stored since
    /// it is recomputed from the length on reading.
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        writer.write_u64::<LittleEndian>(self.len as u64)?;
        for &x in &self.sb_offsets {
            writer.write_u64::<LittleEndian>(x)?;
        }
        for &x in &self.sb_ranks {
            writer.write_u64::<LittleEndian>(x)?;
        }
        let mut mem = (1 + self.sb_offsets.len() + self.sb_ranks.len()) * size_of::<u64>();
        mem += self.classes.serialize_into(&mut writer)?;
        mem += self.offsets.serialize_into(&mut writer)?;
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let len = reader.read_u64::<LittleEndian>()? as usize;
        let num_blocks = Self::blocks_for(len);
        let num_superblocks = Self::superblocks_for(num_blocks);

        let mut sb_offsets = vec![0; num_superblocks];
        for x in sb_offsets.iter_mut() {
            *x = reader.read_u64::<LittleEndian>()?;
        }
        let mut sb_ranks = vec![0; num_superblocks];
        for x in sb_ranks.iter_mut() {
            *x = reader.read_u64::<LittleEndian>()?;
        }

        let classes = BitVector::deserialize_from(&mut reader)?;
        if classes.len() != num_blocks * CLASS_WIDTH {
            return Err(anyhow!(
                "the classes stream must hold {} bits, but holds {}.",
                num_blocks * CLASS_WIDTH,
                classes.len()
            ));
        }
        let offsets = BitVector::deserialize_from(&mut reader)?;

        let mut num_ones = 0;
        let mut total_width = 0;
        for b in 0..num_blocks {
            let class = classes.get_bits(b * CLASS_WIDTH, CLASS_WIDTH).unwrap() as usize;
            num_ones += class;
            total_width += usize::from(OFFSET_WIDTHS[class]);
        }
        if offsets.len() != total_width {
            return Err(anyhow!(
                "the offsets stream must hold {} bits, but holds {}.",
                total_width,
                offsets.len()
            ));
        }

        Ok(Self {
            len,
            num_ones,
            classes,
            offsets,
            sb_offsets,
            sb_ranks,
        })
    }
}
