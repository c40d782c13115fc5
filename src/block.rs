use zeroize::Zeroize;

/// Size of a block in bytes.
pub(crate) const BLOCK_SIZE: usize = 1024;

/// Number of 64-bit words in a block.
pub(crate) const QWORDS_IN_BLOCK: usize = BLOCK_SIZE / 8;

/// A 1024-byte block, viewed as 128 little-endian 64-bit words.
///
/// Block contents are secret; a block is scrubbed when dropped.
#[derive(Clone)]
pub(crate) struct Block([u64; QWORDS_IN_BLOCK]);

impl Block {
    pub(crate) const fn zero() -> Self {
        Self([0u64; QWORDS_IN_BLOCK])
    }

    pub(crate) fn from_bytes(bytes: &[u8; BLOCK_SIZE]) -> Self {
        let mut block = Self::zero();
        for (word, chunk) in block.0.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut le = [0u8; 8];
            le.copy_from_slice(chunk);
            *word = u64::from_le_bytes(le);
        }
        block
    }

    pub(crate) fn write_bytes(&self, out: &mut [u8; BLOCK_SIZE]) {
        for (chunk, word) in out.chunks_exact_mut(8).zip(self.0.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
    }

    #[inline]
    pub(crate) fn word(&self, i: usize) -> u64 {
        self.0[i]
    }

    #[inline]
    pub(crate) fn set_word(&mut self, i: usize, value: u64) {
        self.0[i] = value;
    }

    pub(crate) fn xor_with(&mut self, other: &Block) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a ^= b;
        }
    }

    /// Compression function G(X, Y) = P(X ⊕ Y) ⊕ X ⊕ Y.
    ///
    /// `R = X ⊕ Y` is treated as an 8×8 matrix of 16-byte registers. The permutation P is
    /// applied to each row of 16 words, then to each column of 16 words, and the result is
    /// XOR-ed with `R` again.
    pub(crate) fn compress(x: &Block, y: &Block) -> Block {
        let mut r = x.clone();
        r.xor_with(y);

        let mut q = r.clone();

        for row in 0..8 {
            permute(&mut q.0, core::array::from_fn(|k| 16 * row + k));
        }

        for column in 0..8 {
            permute(
                &mut q.0,
                core::array::from_fn(|k| 2 * column + 16 * (k / 2) + k % 2),
            );
        }

        q.xor_with(&r);
        q
    }
}

impl Zeroize for Block {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Applies P to the 16 words of `block` at `indices`.
#[inline(always)]
fn permute(block: &mut [u64; QWORDS_IN_BLOCK], indices: [usize; 16]) {
    let mut v = indices.map(|i| block[i]);

    round(&mut v);

    for (i, word) in indices.into_iter().zip(v) {
        block[i] = word;
    }
}

/// One BLAKE2b-style round over a 4×4 matrix of words: columns, then diagonals.
#[inline(always)]
fn round(v: &mut [u64; 16]) {
    mix(v, 0, 4, 8, 12);
    mix(v, 1, 5, 9, 13);
    mix(v, 2, 6, 10, 14);
    mix(v, 3, 7, 11, 15);

    mix(v, 0, 5, 10, 15);
    mix(v, 1, 6, 11, 12);
    mix(v, 2, 7, 8, 13);
    mix(v, 3, 4, 9, 14);
}

#[inline(always)]
fn mix(v: &mut [u64; 16], a: usize, b: usize, c: usize, d: usize) {
    v[a] = blamka(v[a], v[b]);
    v[d] = (v[d] ^ v[a]).rotate_right(32);
    v[c] = blamka(v[c], v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(24);

    v[a] = blamka(v[a], v[b]);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = blamka(v[c], v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(63);
}

/// `x + y + 2 * lo(x) * lo(y)`, where `lo` keeps the low 32 bits.
#[inline(always)]
fn blamka(x: u64, y: u64) -> u64 {
    let product = u64::from(x as u32) * u64::from(y as u32);
    x.wrapping_add(y).wrapping_add(product.wrapping_mul(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_from_seed(seed: u64) -> Block {
        let mut block = Block::zero();
        for i in 0..QWORDS_IN_BLOCK {
            block.set_word(i, seed.wrapping_mul(0x9e37_79b9_7f4a_7c15).rotate_left(i as u32) ^ i as u64);
        }
        block
    }

    #[test]
    fn test_blamka() {
        assert_eq!(blamka(0, 0), 0);
        assert_eq!(blamka(1, 1), 4);
        assert_eq!(blamka(u64::MAX, 1), 2u64.wrapping_mul(0xffff_ffff));
        assert_eq!(blamka(1 << 32, 1 << 32), 1 << 33);
    }

    #[test]
    fn test_bytes_round_trip_is_little_endian() {
        let mut bytes = [0u8; BLOCK_SIZE];
        bytes[0] = 0x01;
        bytes[7] = 0x80;
        bytes[1016] = 0xff;

        let block = Block::from_bytes(&bytes);

        assert_eq!(block.word(0), 0x8000_0000_0000_0001);
        assert_eq!(block.word(127), 0xff);

        let mut out = [0u8; BLOCK_SIZE];
        block.write_bytes(&mut out);
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_compress_of_zero_blocks_is_zero() {
        let zero = Block::zero();
        let out = Block::compress(&zero, &zero);

        assert!(out.0.iter().all(|w| *w == 0));
    }

    #[test]
    fn test_compress_is_symmetric_in_inputs() {
        let x = block_from_seed(1);
        let y = block_from_seed(2);

        assert_eq!(Block::compress(&x, &y).0, Block::compress(&y, &x).0);
    }

    #[test]
    fn test_compress_diffuses_single_bit() {
        let x = block_from_seed(3);
        let y = block_from_seed(4);
        let mut y_flipped = y.clone();
        y_flipped.set_word(77, y.word(77) ^ 1);

        let a = Block::compress(&x, &y);
        let b = Block::compress(&x, &y_flipped);

        let changed_words = a.0.iter().zip(b.0.iter()).filter(|(a, b)| a != b).count();
        assert!(changed_words > 100);
    }

    #[test]
    fn test_zeroize() {
        let mut block = block_from_seed(5);
        block.zeroize();

        assert!(block.0.iter().all(|w| *w == 0));
    }
}
