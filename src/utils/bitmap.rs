use alloc::vec::Vec;

const WORD_BITS: usize = u64::BITS as usize;

/// A packed validity bitmap, bit `i` set means slot `i` holds a value
///
/// Bits are stored least significant first in 64 bit words. Bits past `len`
/// in the last word are always zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bitmap {
    /// Packed bits
    words: Vec<u64>,
    /// Number of addressable bits
    len: usize,
}

impl Bitmap {
    /// Creates an empty bitmap
    pub const fn new() -> Self {
        Self {
            words: Vec::new(),
            len: 0,
        }
    }

    /// Creates an empty bitmap with room for `bits` bits
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: Vec::with_capacity(bits.div_ceil(WORD_BITS)),
            len: 0,
        }
    }

    /// Creates a bitmap of `len` bits, all set to `value`
    pub fn filled(len: usize, value: bool) -> Self {
        let mut bitmap = Self::with_capacity(len);
        bitmap.extend_constant(len, value);
        bitmap
    }

    /// Returns the number of bits
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the bitmap holds no bits
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the bit at `index`, out of range bits read as unset
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        index < self.len && (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// Sets the bit at `index`, out of range writes are ignored
    pub fn set(&mut self, index: usize, value: bool) {
        if index >= self.len {
            return;
        }
        let mask = 1u64 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Appends one bit
    pub fn push(&mut self, value: bool) {
        if self.len.is_multiple_of(WORD_BITS) {
            self.words.push(0);
        }
        self.len += 1;
        self.set(self.len - 1, value);
    }

    /// Appends `count` copies of `value`
    pub fn extend_constant(&mut self, count: usize, value: bool) {
        if !value {
            self.len += count;
            self.words.resize(self.len.div_ceil(WORD_BITS), 0);
            return;
        }
        let mut remaining = count;
        // fill the partial tail word bit by bit, then whole words
        while remaining > 0 && !self.len.is_multiple_of(WORD_BITS) {
            self.push(true);
            remaining -= 1;
        }
        let whole = remaining / WORD_BITS;
        self.words.extend(core::iter::repeat_n(u64::MAX, whole));
        self.len += whole * WORD_BITS;
        for _ in 0..remaining % WORD_BITS {
            self.push(true);
        }
    }

    /// Returns the number of set bits in `offset..offset + len`
    pub fn count_set_in(&self, offset: usize, len: usize) -> usize {
        let mut count = 0;
        self.visit_set_runs(offset, len, |_, n| count += n);
        count
    }

    /// Returns the number of set bits
    pub fn count_set(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Calls `f(start, len)` for every maximal run of set bits inside
    /// `offset..offset + len`
    ///
    /// Whole words of zeros or ones are skipped without probing each bit.
    pub fn visit_set_runs<F>(&self, offset: usize, len: usize, mut f: F)
    where
        F: FnMut(usize, usize),
    {
        let end = offset.saturating_add(len).min(self.len);
        let mut pos = offset;
        while pos < end {
            let start = self.next_with(pos, end, true);
            if start >= end {
                break;
            }
            let stop = self.next_with(start, end, false);
            f(start, stop - start);
            pos = stop;
        }
    }

    /// Returns the first position in `from..end` whose bit equals `value`, or `end`
    fn next_with(&self, from: usize, end: usize, value: bool) -> usize {
        let mut pos = from;
        while pos < end {
            let index = pos / WORD_BITS;
            let word = if value {
                self.words[index]
            } else {
                !self.words[index]
            };
            let word = word >> (pos % WORD_BITS);
            if word != 0 {
                return (pos + word.trailing_zeros() as usize).min(end);
            }
            pos = (index + 1) * WORD_BITS;
        }
        end
    }
}

impl FromIterator<bool> for Bitmap {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut bitmap = Self::with_capacity(iter.size_hint().0);
        iter.for_each(|bit| bitmap.push(bit));
        bitmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn runs(bitmap: &Bitmap, offset: usize, len: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        bitmap.visit_set_runs(offset, len, |start, n| out.push((start, n)));
        out
    }

    #[test]
    fn push_and_get() {
        let bitmap: Bitmap = [true, false, true, true].into_iter().collect();
        assert_eq!(bitmap.len(), 4);
        assert!(bitmap.get(0));
        assert!(!bitmap.get(1));
        assert!(bitmap.get(3));
        assert!(!bitmap.get(4));
        assert_eq!(bitmap.count_set(), 3);
    }

    #[test]
    fn runs_within_a_word() {
        let bitmap: Bitmap = [false, true, true, false, true].into_iter().collect();
        assert_eq!(runs(&bitmap, 0, 5), [(1, 2), (4, 1)]);
        assert_eq!(runs(&bitmap, 2, 2), [(2, 1)]);
    }

    #[test]
    fn runs_across_words() {
        let mut bitmap = Bitmap::filled(200, true);
        bitmap.set(10, false);
        bitmap.set(150, false);
        assert_eq!(runs(&bitmap, 0, 200), [(0, 10), (11, 139), (151, 49)]);
        assert_eq!(bitmap.count_set_in(60, 100), 99);
    }

    #[test]
    fn extend_constant_keeps_tail_clear() {
        let mut bitmap = Bitmap::new();
        bitmap.push(false);
        bitmap.extend_constant(130, true);
        bitmap.extend_constant(3, false);
        assert_eq!(bitmap.len(), 134);
        assert_eq!(bitmap.count_set(), 130);
        assert_eq!(runs(&bitmap, 0, 1000), [(1, 130)]);
    }

    #[test]
    fn pushes_open_words_on_exact_boundaries() {
        let mut bitmap: Bitmap = (0..64).map(|_| true).collect();
        assert_eq!(bitmap.count_set(), 64);
        bitmap.push(false);
        bitmap.push(true);
        assert_eq!(bitmap.len(), 66);
        assert!(!bitmap.get(64));
        assert!(bitmap.get(65));

        bitmap.extend_constant(62, true);
        bitmap.push(true);
        assert_eq!(bitmap.len(), 129);
        assert_eq!(runs(&bitmap, 0, 129), [(0, 64), (65, 64)]);
    }

    #[test]
    fn all_unset_has_no_runs() {
        let bitmap = Bitmap::filled(300, false);
        assert!(runs(&bitmap, 0, 300).is_empty());
        assert_eq!(bitmap.count_set(), 0);
    }
}
