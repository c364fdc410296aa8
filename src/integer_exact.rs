use crate::{Moments, NullableSequence, utils::paired_valid_runs_in};

/// Returns the largest number of slots whose sum of `bit_width` wide integers
/// can never overflow a signed 64 bit accumulator
///
/// For unsigned 32 bit values the bound is `2^31` slots, each below `2^32`,
/// so every partial sum stays below `2^63`. The matching sum of products
/// stays below `2^95`, well inside 128 bits.
///
/// # Arguments
///
/// * `bit_width` - Bit width of the element type, at most 32
///
/// # Returns
///
/// * `u64` - The chunk length bound
#[inline]
pub const fn chunk_bound(bit_width: u32) -> u64 {
    1u64 << (63 - bit_width)
}

/// Exact count, sums and sum of products of narrow integer pairs
///
/// Nothing is converted to floating point until the moments are read, and
/// even then only quantities bounded by the count are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegerExact {
    /// Number of pairs
    count: i64,
    /// Sum of x
    sum_x: i64,
    /// Sum of y
    sum_y: i64,
    /// Sum of x * y
    sum_xy: i128,
}

impl IntegerExact {
    /// Creates an empty accumulator
    pub const fn new() -> Self {
        Self {
            count: 0,
            sum_x: 0,
            sum_y: 0,
            sum_xy: 0,
        }
    }

    /// Adds one pair
    ///
    /// The caller keeps the number of pairs under [`chunk_bound`] for the
    /// element width, which rules out overflow.
    #[inline]
    pub fn consume_one(&mut self, x: i64, y: i64) {
        self.sum_x += x;
        self.sum_y += y;
        self.sum_xy += i128::from(x) * i128::from(y);
        self.count += 1;
    }

    /// Returns the number of pairs consumed
    #[inline]
    pub const fn count(&self) -> i64 {
        self.count
    }

    /// Returns the mean of x
    #[inline]
    pub fn mean_x(&self) -> f64 {
        self.sum_x as f64 / self.count as f64
    }

    /// Returns the mean of y
    #[inline]
    pub fn mean_y(&self) -> f64 {
        self.sum_y as f64 / self.count as f64
    }

    /// Returns the sum of centered cross products, `sum_xy - sum_x * sum_y / count`
    ///
    /// `sum_x * sum_y / count` is split into an exact integer quotient and a
    /// remainder below `count`; only the remainder goes through floating
    /// point, so the full product never has to fit in 53 bits.
    pub fn m_xy(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let count = i128::from(self.count);
        let product = i128::from(self.sum_x) * i128::from(self.sum_y);
        let quotient = product / count;
        let fraction = (product % count) as f64 / self.count as f64;
        (self.sum_xy - quotient) as f64 - fraction
    }

    /// Returns the float domain moments of the consumed pairs
    pub fn moments(&self) -> Moments {
        if self.count == 0 {
            return Moments::EMPTY;
        }
        Moments::new(self.count, self.mean_x(), self.mean_y(), self.m_xy())
    }
}

/// Computes the moments of the valid pairs of `x` and `y` exactly, one
/// overflow-safe chunk at a time
///
/// Every chunk of at most `bound` slots gets a fresh [`IntegerExact`] whose
/// moments are merged into the running result as soon as the chunk ends.
pub(crate) fn exact_moments<X, Y, T, W>(x: &X, y: &Y, bound: u64, widen: W) -> Moments
where
    X: NullableSequence<Item = T> + ?Sized,
    Y: NullableSequence<Item = T> + ?Sized,
    W: Fn(T) -> i64,
{
    let len = x.len().min(y.len());
    let step = usize::try_from(bound).unwrap_or(usize::MAX).max(1);
    let mut moments = Moments::EMPTY;
    let mut start = 0;
    while start < len {
        let span = step.min(len - start);
        let mut chunk = IntegerExact::new();
        paired_valid_runs_in(x, y, start, span, |pos, n| {
            for i in pos..pos + n {
                chunk.consume_one(widen(x.value(i)), widen(y.value(i)));
            }
        });
        if chunk.count() > 0 {
            tracing::trace!(start, span, count = chunk.count(), "merging exact integer chunk");
            moments.merge(&chunk.moments());
        }
        start += span;
    }
    moments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Column;
    use alloc::vec::Vec;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn chunk_bounds_by_width() {
        assert_eq!(chunk_bound(8), 1 << 55);
        assert_eq!(chunk_bound(16), 1 << 47);
        assert_eq!(chunk_bound(32), 1 << 31);
    }

    #[test]
    fn exact_moments_small() {
        let mut acc = IntegerExact::new();
        for (x, y) in [(1, 2), (2, 4), (3, 6), (4, 8), (5, 10)] {
            acc.consume_one(x, y);
        }
        assert_eq!(acc.count(), 5);
        assert_eq!(acc.mean_x(), 3.0);
        assert_eq!(acc.mean_y(), 6.0);
        assert_eq!(acc.m_xy(), 20.0);
    }

    #[test]
    fn negative_remainders_are_exact() {
        let mut acc = IntegerExact::new();
        for (x, y) in [(-7, 3), (2, -5), (4, 4)] {
            acc.consume_one(x, y);
        }
        // sum_xy = -21 - 10 + 16 = -15, sum_x * sum_y / n = -1 * 2 / 3
        assert_approx_eq!(acc.m_xy(), -15.0 + 2.0 / 3.0, 1e-12);
    }

    #[test]
    fn large_products_keep_precision() {
        // sum_x * sum_y is far above 2^53, the centered sum is tiny
        let base = i64::from(u32::MAX);
        let mut acc = IntegerExact::new();
        for d in [-1, 0, 1] {
            acc.consume_one(base + d, base + d);
        }
        assert_eq!(acc.m_xy(), 2.0);
    }

    #[test]
    fn empty_is_identity() {
        let acc = IntegerExact::new();
        assert_eq!(acc.m_xy(), 0.0);
        assert_eq!(acc.moments(), Moments::EMPTY);
    }

    #[test]
    fn chunked_matches_single_chunk() {
        let x: Column<i32> = (0..103)
            .map(|i| (i % 11 != 4).then_some(i * 37 % 101 - 50))
            .collect();
        let y: Column<i32> = (0..103)
            .map(|i| (i % 13 != 6).then_some(i * 53 % 89 - 40))
            .collect();

        let whole = exact_moments(&x, &y, u64::MAX, i64::from);
        for bound in [1, 2, 7, 16, 50, 102] {
            let chunked = exact_moments(&x, &y, bound, i64::from);
            assert_eq!(chunked.count(), whole.count());
            assert_approx_eq!(chunked.mean_x(), whole.mean_x(), 1e-12);
            assert_approx_eq!(chunked.mean_y(), whole.mean_y(), 1e-12);
            assert_approx_eq!(chunked.m_xy(), whole.m_xy(), 1e-9);
        }
    }

    #[test]
    fn chunks_without_pairs_are_skipped() {
        let x: Vec<Option<u8>> = [None, None, None, Some(1), Some(2), Some(3)].into();
        let y: Vec<Option<u8>> = [Some(1), Some(2), Some(3), Some(2), Some(4), Some(6)].into();
        let moments = exact_moments(&x[..], &y[..], 3, i64::from);
        assert_eq!(moments.count(), 3);
        assert_eq!(moments.mean_x(), 2.0);
        assert_eq!(moments.m_xy(), 4.0);
    }
}
