use core::marker::PhantomData;

use crate::{Element, Error, Moments, NullableSequence, Result, VarianceOptions};

/// Mergeable covariance state for one aggregation partition
///
/// An accumulator is created once per partition, consumes that partition's
/// chunks, is merged with the accumulators of other partitions in any order
/// and is finalized once. Narrow integer elements are accumulated exactly in
/// overflow-safe chunks, everything else runs two passes of pairwise
/// summation; the choice is made by the element type at compile time.
#[derive(Debug, Clone)]
pub struct CovarianceAccumulator<T> {
    /// Count, means and cross moment of every pair seen so far
    moments: Moments,
    /// False once any consumed or merged chunk contained a null
    all_valid: bool,
    /// Decimal scale of the element type, zero for non-decimals
    decimal_scale: i32,
    /// Normalization and null handling
    options: VarianceOptions,
    _element: PhantomData<fn() -> T>,
}

impl<T: Element> CovarianceAccumulator<T> {
    /// Creates an empty accumulator
    ///
    /// # Arguments
    ///
    /// * `options` - Normalization and null handling options
    ///
    /// # Returns
    ///
    /// * `Self` - The accumulator
    pub const fn new(options: VarianceOptions) -> Self {
        Self::with_decimal_scale(0, options)
    }

    /// Creates an empty accumulator for decimal elements of the given scale
    ///
    /// # Arguments
    ///
    /// * `decimal_scale` - Number of fractional decimal digits of the elements
    /// * `options` - Normalization and null handling options
    ///
    /// # Returns
    ///
    /// * `Self` - The accumulator
    pub const fn with_decimal_scale(decimal_scale: i32, options: VarianceOptions) -> Self {
        Self {
            moments: Moments::EMPTY,
            all_valid: true,
            decimal_scale,
            options,
            _element: PhantomData,
        }
    }

    /// Consumes one chunk of paired values
    ///
    /// Pairs where either side is null are skipped. When nulls are present
    /// and `skip_nulls` is off the chunk contributes nothing; the null is
    /// remembered and turns the final result into no value.
    ///
    /// # Arguments
    ///
    /// * `x` - The first operand
    /// * `y` - The second operand, position aligned with `x`
    ///
    /// # Returns
    ///
    /// * `Result<()>` - `LengthMismatch` if the operands can not be paired
    pub fn consume<X, Y>(&mut self, x: &X, y: &Y) -> Result<()>
    where
        X: NullableSequence<Item = T> + ?Sized,
        Y: NullableSequence<Item = T> + ?Sized,
    {
        if x.len() != y.len() {
            tracing::debug!(x = x.len(), y = y.len(), "rejecting unaligned operands");
            return Err(Error::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }

        let chunk_valid = x.null_count() == 0 && y.null_count() == 0;
        self.all_valid &= chunk_valid;
        if !chunk_valid && !self.options.skip_nulls() {
            return Ok(());
        }

        let chunk = T::moments(x, y, self.decimal_scale);
        self.moments.merge(&chunk);
        Ok(())
    }

    /// Merges the state of another partition into this one
    ///
    /// Associative and commutative; an empty accumulator is the identity.
    ///
    /// # Arguments
    ///
    /// * `other` - The accumulator of a disjoint partition
    pub fn merge_from(&mut self, other: &Self) {
        tracing::trace!(
            left = self.moments.count(),
            right = other.moments.count(),
            "merging covariance states"
        );
        self.all_valid &= other.all_valid;
        self.moments.merge(&other.moments);
    }

    /// Returns the covariance of every pair consumed or merged
    ///
    /// # Returns
    ///
    /// * `Option<f64>` - `m_xy / (count - ddof)`, or `None` when `count <= ddof`,
    ///   `count < min_count`, or a null was seen with `skip_nulls` off
    pub fn finalize(&self) -> Option<f64> {
        if !self.is_admitted() {
            return None;
        }
        Some(self.moments.m_xy() / self.denominator())
    }

    /// Returns true when finalizing yields a value
    pub(crate) fn is_admitted(&self) -> bool {
        let admitted = self.options.admits(self.moments.count(), self.all_valid);
        if !admitted {
            tracing::debug!(
                count = self.moments.count(),
                all_valid = self.all_valid,
                "covariance state has no value"
            );
        }
        admitted
    }

    /// Returns `count - ddof`
    #[inline]
    pub(crate) fn denominator(&self) -> f64 {
        (self.moments.count() - self.options.ddof()) as f64
    }

    /// Returns the number of valid pairs accumulated
    #[inline]
    pub const fn count(&self) -> i64 {
        self.moments.count()
    }

    /// Returns the means of x and y
    #[inline]
    pub const fn mean(&self) -> (f64, f64) {
        (self.moments.mean_x(), self.moments.mean_y())
    }

    /// Returns the sum of centered cross products
    #[inline]
    pub const fn m_xy(&self) -> f64 {
        self.moments.m_xy()
    }

    /// Returns the accumulated moments
    #[inline]
    pub const fn moments(&self) -> &Moments {
        &self.moments
    }

    /// Returns false once any consumed or merged chunk contained a null
    #[inline]
    pub const fn all_valid(&self) -> bool {
        self.all_valid
    }

    /// Returns the decimal scale fixed at construction
    #[inline]
    pub const fn decimal_scale(&self) -> i32 {
        self.decimal_scale
    }

    /// Returns the options
    #[inline]
    pub const fn options(&self) -> &VarianceOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Column;
    use alloc::vec::Vec;
    use assert_approx_eq::assert_approx_eq;

    fn consumed<T: Element>(x: &[T], y: &[T], options: VarianceOptions) -> CovarianceAccumulator<T> {
        let mut acc = CovarianceAccumulator::new(options);
        assert!(acc.consume(x, y).is_ok());
        acc
    }

    #[test]
    fn cov_works() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        let acc = consumed(&x, &y, VarianceOptions::new(1));
        assert_eq!(acc.finalize(), Some(5.0));

        let acc = consumed(&x, &y, VarianceOptions::new(0));
        assert_eq!(acc.finalize(), Some(4.0));
    }

    #[test]
    fn cov_integer_path_works() {
        let x = [1i32, 2, 3, 4, 5];
        let y = [2i32, 4, 6, 8, 10];
        let acc = consumed(&x, &y, VarianceOptions::new(1));
        assert_eq!(acc.finalize(), Some(5.0));

        let x = [2u8, 4, 6, 8, 10];
        let y = [1u8, 3, 2, 5, 7];
        let acc = consumed(&x, &y, VarianceOptions::new(1));
        assert_eq!(acc.finalize(), Some(7.0));
    }

    #[test]
    fn cov_sliding_windows() {
        let inputs = [(2.0, 1.0), (4.0, 3.0), (6.0, 2.0), (8.0, 5.0), (10.0, 7.0)];
        let expected = [0.6667, 1.3333, 3.3333];
        for (i, e) in expected.iter().enumerate() {
            let (x, y): (Vec<f64>, Vec<f64>) = inputs[i..i + 3].iter().copied().unzip();
            let acc = consumed(&x, &y, VarianceOptions::new(0));
            assert_approx_eq!(acc.finalize().unwrap_or(f64::NAN), e, 0.0001);
        }
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let mut acc = CovarianceAccumulator::<f64>::new(VarianceOptions::new(1));
        let err = acc.consume(&[1.0, 2.0][..], &[1.0][..]);
        assert_eq!(err, Err(Error::LengthMismatch { x: 2, y: 1 }));
        assert_eq!(acc.count(), 0);
    }

    #[test]
    fn nulls_skipped_by_default() {
        let x: Column<f64> = [Some(1.0), None, Some(3.0), Some(5.0)].into_iter().collect();
        let y: Column<f64> = [Some(2.0), Some(9.0), None, Some(6.0)].into_iter().collect();
        let mut acc = CovarianceAccumulator::new(VarianceOptions::new(1));
        assert!(acc.consume(&x, &y).is_ok());
        assert_eq!(acc.count(), 2);
        assert!(!acc.all_valid());
        assert_eq!(acc.finalize(), Some(8.0));
    }

    #[test]
    fn nulls_poison_strict_mode() {
        let x: Column<i16> = [Some(1), None, Some(3)].into_iter().collect();
        let y: Column<i16> = [Some(2), Some(4), Some(6)].into_iter().collect();
        let mut options = VarianceOptions::new(1);
        options.set_skip_nulls(false);

        let mut acc = CovarianceAccumulator::new(options);
        assert!(acc.consume(&x, &y).is_ok());
        assert_eq!(acc.count(), 0);
        assert_eq!(acc.finalize(), None);

        let mut clean = consumed(&[1i16, 2, 3], &[2i16, 4, 6], options);
        assert_eq!(clean.finalize(), Some(2.0));
        clean.merge_from(&acc);
        assert_eq!(clean.finalize(), None);
    }

    #[test]
    fn threshold_boundary() {
        let one = consumed(&[3.0], &[4.0], VarianceOptions::new(1));
        assert_eq!(one.finalize(), None);

        let two = consumed(&[3.0, 5.0], &[4.0, 8.0], VarianceOptions::new(1));
        assert_eq!(two.finalize(), Some(4.0));

        let mut options = VarianceOptions::new(0);
        options.set_min_count(3);
        assert_eq!(consumed(&[3.0, 5.0], &[4.0, 8.0], options).finalize(), None);
    }

    #[test]
    fn merge_matches_single_consume() {
        let x: Vec<i32> = (0..60).map(|i| (i * 31 % 17) - 8).collect();
        let y: Vec<i32> = (0..60).map(|i| (i * 7 % 23) - 11).collect();
        let options = VarianceOptions::new(1);
        let whole = consumed(&x, &y, options);

        let mut merged = CovarianceAccumulator::new(options);
        for (cx, cy) in x.chunks(13).zip(y.chunks(13)).rev() {
            merged.merge_from(&consumed(cx, cy, options));
        }
        assert_eq!(merged.count(), whole.count());
        assert_approx_eq!(
            merged.finalize().unwrap_or(f64::NAN),
            whole.finalize().unwrap_or(f64::NAN),
            1e-12
        );
    }

    #[test]
    fn repeated_consume_accumulates() {
        let mut acc = CovarianceAccumulator::new(VarianceOptions::new(1));
        assert!(acc.consume(&[1.0, 2.0, 3.0][..], &[2.0, 4.0, 6.0][..]).is_ok());
        assert!(acc.consume(&[4.0, 5.0][..], &[8.0, 10.0][..]).is_ok());
        assert_eq!(acc.count(), 5);
        assert_approx_eq!(acc.finalize().unwrap_or(f64::NAN), 5.0, 1e-12);
    }

    #[test]
    fn decimal_scale_applies() {
        let x = [100i128, 200, 300, 400, 500];
        let y = [2i128, 4, 6, 8, 10];
        let mut acc = CovarianceAccumulator::with_decimal_scale(2, VarianceOptions::new(1));
        assert!(acc.consume(&x[..], &y[..]).is_ok());
        assert_eq!(acc.decimal_scale(), 2);
        assert_approx_eq!(acc.finalize().unwrap_or(f64::NAN), 0.05, 1e-12);
    }
}
