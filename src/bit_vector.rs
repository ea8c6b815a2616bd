//! Plain bit array packed into 64-bit words, with fixed- and variable-width
//! integer access.
#![cfg(target_pointer_width = "64")]

use std::io::{Read, Write};

use anyhow::{anyhow, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{Access, Serializable};

/// The number of bits in a machine word.
pub const WORD_LEN: usize = u64::BITS as usize;

/// Updatable bit array packed into 64-bit words.
///
/// Besides single-bit access, the array supports reading and writing integers
/// of any width up to [`WORD_LEN`] bits at arbitrary bit offsets, which is the
/// primitive the compressed structures in this crate are built on.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rrrbv::BitVector;
///
/// let mut bv = BitVector::with_len(70);
/// bv.set_bits(60, 0b10110, 5)?;
///
/// assert_eq!(bv.len(), 70);
/// assert_eq!(bv.get_bits(60, 5), Some(0b10110));
/// assert_eq!(bv.get_bit(61), Some(true));
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct BitVector {
    words: Vec<u64>,
    len: usize,
}

impl BitVector {
    /// Creates a new empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new vector of `len` bits, all unset.
    ///
    /// # Arguments
    ///
    /// - `len`: Number of bits.
    pub fn with_len(len: usize) -> Self {
        Self {
            words: vec![0; Self::words_for(len)],
            len,
        }
    }

    /// Creates a new vector from input bit stream `bits`.
    ///
    /// # Arguments
    ///
    /// - `bits`: Bit stream.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrrbv::BitVector;
    ///
    /// let bv = BitVector::from_bits([false, true, false]);
    /// assert_eq!(bv.len(), 3);
    /// assert_eq!(bv.get_bit(1), Some(true));
    /// ```
    pub fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut this = Self::new();
        bits.into_iter().for_each(|b| this.push_bit(b));
        this
    }

    /// Returns the `pos`-th bit, or [`None`] if out of bounds.
    ///
    /// # Arguments
    ///
    /// - `pos`: Bit position.
    #[inline(always)]
    pub fn get_bit(&self, pos: usize) -> Option<bool> {
        if pos < self.len {
            let (word, shift) = (pos / WORD_LEN, pos % WORD_LEN);
            Some((self.words[word] >> shift) & 1 == 1)
        } else {
            None
        }
    }

    /// Updates the `pos`-th bit to `bit`.
    ///
    /// # Arguments
    ///
    /// - `pos`: Bit position.
    /// - `bit`: Bit value set.
    ///
    /// # Errors
    ///
    /// An error is returned if `self.len() <= pos`.
    #[inline(always)]
    pub fn set_bit(&mut self, pos: usize, bit: bool) -> Result<()> {
        if self.len <= pos {
            return Err(anyhow!(
                "pos must be less than self.len()={}, but got {pos}.",
                self.len
            ));
        }
        let (word, shift) = (pos / WORD_LEN, pos % WORD_LEN);
        self.words[word] &= !(1 << shift);
        self.words[word] |= (bit as u64) << shift;
        Ok(())
    }

    /// Pushes `bit` at the end.
    ///
    /// # Arguments
    ///
    /// - `bit`: Bit value pushed.
    #[inline(always)]
    pub fn push_bit(&mut self, bit: bool) {
        let shift = self.len % WORD_LEN;
        if shift == 0 {
            self.words.push(bit as u64);
        } else {
            let last = self.words.last_mut().unwrap();
            *last |= (bit as u64) << shift;
        }
        self.len += 1;
    }

    /// Returns the `len` bits starting at the `pos`-th bit as an integer
    /// whose LSB is the `pos`-th bit, or [`None`] if
    ///
    /// - `len` is greater than [`WORD_LEN`], or
    /// - `self.len() < pos + len`.
    ///
    /// # Arguments
    ///
    /// - `pos`: Bit position.
    /// - `len`: Number of bits extracted.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrrbv::BitVector;
    ///
    /// let bv = BitVector::from_bits([true, false, true, false]);
    /// assert_eq!(bv.get_bits(1, 2), Some(0b10));
    /// assert_eq!(bv.get_bits(2, 3), None);
    /// ```
    #[inline(always)]
    pub fn get_bits(&self, pos: usize, len: usize) -> Option<u64> {
        if WORD_LEN < len || self.len < pos + len {
            return None;
        }
        if len == 0 {
            return Some(0);
        }
        let (word, shift) = (pos / WORD_LEN, pos % WORD_LEN);
        let mask = if len < WORD_LEN {
            (1 << len) - 1
        } else {
            u64::MAX
        };
        let bits = if shift + len <= WORD_LEN {
            (self.words[word] >> shift) & mask
        } else {
            (self.words[word] >> shift) | ((self.words[word + 1] << (WORD_LEN - shift)) & mask)
        };
        Some(bits)
    }

    /// Writes the lowest `len` bits of `bits` starting at the `pos`-th bit.
    ///
    /// # Arguments
    ///
    /// - `pos`: Bit position.
    /// - `bits`: Integer whose lowest `len` bits are written.
    /// - `len`: Number of bits written.
    ///
    /// # Errors
    ///
    /// An error is returned if
    ///
    /// - `len` is greater than [`WORD_LEN`], or
    /// - `self.len() < pos + len`.
    #[inline(always)]
    pub fn set_bits(&mut self, pos: usize, bits: u64, len: usize) -> Result<()> {
        if WORD_LEN < len {
            return Err(anyhow!(
                "len must be no greater than {WORD_LEN}, but got {len}."
            ));
        }
        if self.len < pos + len {
            return Err(anyhow!(
                "pos+len must be no greater than self.len()={}, but got {}.",
                self.len,
                pos + len
            ));
        }
        if len == 0 {
            return Ok(());
        }
        let mask = if len < WORD_LEN {
            (1 << len) - 1
        } else {
            u64::MAX
        };
        let bits = bits & mask;

        let (word, shift) = (pos / WORD_LEN, pos % WORD_LEN);
        self.words[word] &= !(mask << shift);
        self.words[word] |= bits << shift;

        let stored = WORD_LEN - shift;
        if stored < len {
            self.words[word + 1] &= !(mask >> stored);
            self.words[word + 1] |= bits >> stored;
        }
        Ok(())
    }

    /// Pushes the lowest `len` bits of `bits` at the end.
    ///
    /// # Arguments
    ///
    /// - `bits`: Integer whose lowest `len` bits are pushed.
    /// - `len`: Number of bits pushed.
    ///
    /// # Errors
    ///
    /// An error is returned if `len` is greater than [`WORD_LEN`].
    #[inline(always)]
    pub fn push_bits(&mut self, bits: u64, len: usize) -> Result<()> {
        if WORD_LEN < len {
            return Err(anyhow!(
                "len must be no greater than {WORD_LEN}, but got {len}."
            ));
        }
        if len == 0 {
            return Ok(());
        }
        let mask = if len < WORD_LEN {
            (1 << len) - 1
        } else {
            u64::MAX
        };
        let bits = bits & mask;

        let shift = self.len % WORD_LEN;
        if shift == 0 {
            self.words.push(bits);
        } else {
            let last = self.words.last_mut().unwrap();
            *last |= bits << shift;
            if len > WORD_LEN - shift {
                self.words.push(bits >> (WORD_LEN - shift));
            }
        }
        self.len += len;
        Ok(())
    }

    /// Creates an iterator for enumerating bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrrbv::BitVector;
    ///
    /// let bv = BitVector::from_bits([false, true, true]);
    /// let mut it = bv.iter();
    ///
    /// assert_eq!(it.next(), Some(false));
    /// assert_eq!(it.next(), Some(true));
    /// assert_eq!(it.next(), Some(true));
    /// assert_eq!(it.next(), None);
    /// ```
    pub const fn iter(&self) -> Iter {
        Iter { bv: self, pos: 0 }
    }

    /// Returns the number of bits stored.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the vector is empty.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of underlying words.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrrbv::BitVector;
    ///
    /// let bv = BitVector::with_len(70);
    /// assert_eq!(bv.num_words(), 2);
    /// ```
    #[inline(always)]
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// Returns the number of bytes the serialized vector occupies.
    pub const fn size_in_bytes(&self) -> usize {
        (1 + Self::words_for(self.len)) * std::mem::size_of::<u64>()
    }

    /// Deserializes the vector from the head of `buf`, returning it together
    /// with the number of bytes consumed. Trailing bytes are ignored.
    ///
    /// # Arguments
    ///
    /// - `buf`: Byte buffer starting with a serialized vector.
    ///
    /// # Errors
    ///
    /// An error is returned if `buf` is truncated.
    pub fn read_from_bytes(buf: &[u8]) -> Result<(Self, usize)> {
        let this = Self::deserialize_from(buf)?;
        let consumed = this.size_in_bytes();
        Ok((this, consumed))
    }

    const fn words_for(len: usize) -> usize {
        (len + WORD_LEN - 1) / WORD_LEN
    }
}

impl Access for BitVector {
    /// Returns the `pos`-th bit, or [`None`] if out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrrbv::{Access, BitVector};
    ///
    /// let bv = BitVector::from_bits([true, false]);
    /// assert_eq!(bv.access(0), Some(true));
    /// assert_eq!(bv.access(1), Some(false));
    /// assert_eq!(bv.access(2), None);
    /// ```
    fn access(&self, pos: usize) -> Option<bool> {
        self.get_bit(pos)
    }
}

impl Serializable for BitVector {
    /// Writes the bit length as a little-endian `u64`, followed by the data
    /// words in little-endian order. The word count is derived from the bit
    /// length, so the layout is self-describing.
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        writer.write_u64::<LittleEndian>(self.len as u64)?;
        for &word in &self.words {
            writer.write_u64::<LittleEndian>(word)?;
        }
        Ok(self.size_in_bytes())
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let len = reader.read_u64::<LittleEndian>()? as usize;
        let mut words = vec![0; Self::words_for(len)];
        for word in words.iter_mut() {
            *word = reader.read_u64::<LittleEndian>()?;
        }
        Ok(Self { words, len })
    }
}

/// Iterator for enumerating bits, created by [`BitVector::iter()`].
pub struct Iter<'a> {
    bv: &'a BitVector,
    pos: usize,
}

impl Iterator for Iter<'_> {
    type Item = bool;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.pos < self.bv.len() {
            let bit = self.bv.get_bit(self.pos);
            self.pos += 1;
            bit
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.bv.len() - self.pos;
        (rem, Some(rem))
    }
}

impl<'a> IntoIterator for &'a BitVector {
    type Item = bool;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    fn gen_random_bits(len: usize, seed: u64) -> Vec<bool> {
        let mut rng = ChaChaRng::seed_from_u64(seed);
        (0..len).map(|_| rng.gen::<bool>()).collect()
    }

    fn gen_random_ints(len: usize, width: usize, seed: u64) -> Vec<u64> {
        let mask = if width < WORD_LEN {
            (1 << width) - 1
        } else {
            u64::MAX
        };
        let mut rng = ChaChaRng::seed_from_u64(seed);
        (0..len).map(|_| rng.gen::<u64>() & mask).collect()
    }

    fn test_bits(bits: &[bool]) {
        let bv = BitVector::from_bits(bits.iter().cloned());
        assert_eq!(bits.len(), bv.len());
        assert_eq!(bv.num_words(), (bits.len() + WORD_LEN - 1) / WORD_LEN);
        for i in 0..bits.len() {
            assert_eq!(bv.get_bit(i), Some(bits[i]));
        }

        let mut other = BitVector::with_len(bits.len());
        bits.iter()
            .enumerate()
            .for_each(|(i, &b)| other.set_bit(i, b).unwrap());
        assert_eq!(bv, other);
    }

    fn test_ints(ints: &[u64], width: usize) {
        let mut bv = BitVector::new();
        ints.iter().for_each(|&x| bv.push_bits(x, width).unwrap());
        assert_eq!(ints.len() * width, bv.len());
        for i in 0..ints.len() {
            assert_eq!(bv.get_bits(i * width, width), Some(ints[i]));
        }

        let mut other = BitVector::with_len(ints.len() * width);
        ints.iter()
            .enumerate()
            .for_each(|(i, &x)| other.set_bits(i * width, x, width).unwrap());
        assert_eq!(bv, other);
    }

    #[test]
    fn test_random_bits() {
        for seed in 0..30 {
            let bits = gen_random_bits(200, seed);
            test_bits(&bits);
        }
    }

    #[test]
    fn test_random_ints() {
        for width in [1, 5, 6, 31, 32, 60, 63, 64] {
            for seed in 0..5 {
                let ints = gen_random_ints(100, width, seed);
                test_ints(&ints, width);
            }
        }
    }

    #[test]
    fn test_get_bits_straddling() {
        let mut bv = BitVector::with_len(128);
        bv.set_bits(60, 0xff, 8).unwrap();
        assert_eq!(bv.get_bits(60, 8), Some(0xff));
        assert_eq!(bv.get_bits(59, 10), Some(0b0111111110));
    }

    #[test]
    fn test_get_bits_zero_width() {
        let bv = BitVector::with_len(10);
        assert_eq!(bv.get_bits(10, 0), Some(0));
        assert_eq!(bv.get_bits(11, 0), None);
    }

    #[test]
    fn test_set_bit_oob() {
        let mut bv = BitVector::with_len(3);
        let e = bv.set_bit(3, true);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("pos must be less than self.len()=3, but got 3.".to_string())
        );
    }

    #[test]
    fn test_set_bits_oob() {
        let mut bv = BitVector::with_len(70);
        assert!(bv.set_bits(66, 0, 5).is_err());
        assert!(bv.set_bits(0, 0, 65).is_err());
    }

    #[test]
    fn test_iter() {
        let bits = gen_random_bits(100, 13);
        let bv = BitVector::from_bits(bits.iter().cloned());
        let collected: Vec<bool> = bv.iter().collect();
        assert_eq!(bits, collected);
    }

    #[test]
    fn test_serialize() {
        for seed in 0..10 {
            let bv = BitVector::from_bits(gen_random_bits(317, seed));
            let mut bytes = vec![];
            let size = bv.serialize_into(&mut bytes).unwrap();
            let other = BitVector::deserialize_from(&bytes[..]).unwrap();
            assert_eq!(bv, other);
            assert_eq!(size, bytes.len());
            assert_eq!(size, bv.size_in_bytes());
        }
    }

    #[test]
    fn test_serialize_empty() {
        let bv = BitVector::new();
        let mut bytes = vec![];
        let size = bv.serialize_into(&mut bytes).unwrap();
        assert_eq!(size, 8);
        let (other, consumed) = BitVector::read_from_bytes(&bytes).unwrap();
        assert_eq!(bv, other);
        assert_eq!(consumed, 8);
    }

    #[test]
    fn test_read_from_bytes_trailing() {
        let bv = BitVector::from_bits(gen_random_bits(100, 7));
        let mut bytes = vec![];
        bv.serialize_into(&mut bytes).unwrap();
        let written = bytes.len();
        bytes.extend_from_slice(&[0xAB; 16]);
        let (other, consumed) = BitVector::read_from_bytes(&bytes).unwrap();
        assert_eq!(bv, other);
        assert_eq!(consumed, written);
    }

    #[test]
    fn test_deserialize_truncated() {
        let bv = BitVector::from_bits(gen_random_bits(100, 7));
        let mut bytes = vec![];
        bv.serialize_into(&mut bytes).unwrap();
        bytes.truncate(bytes.len() - 1);
        assert!(BitVector::deserialize_from(&bytes[..]).is_err());
    }
}
