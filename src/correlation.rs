use num_traits::Float;

use crate::{
    CovarianceAccumulator, Element, NullableSequence, Result, VarianceOptions,
    moments::merge_sum_sq, sum_paired,
};

/// Mergeable Pearson correlation state for one aggregation partition
///
/// Wraps a [`CovarianceAccumulator`] and adds the sums of squared deviations
/// of each operand. Those sums are centered on the means of the single chunk
/// this accumulator consumed, so an instance consumes exactly once while
/// empty; partitions are then combined with [`merge_from`](Self::merge_from).
#[derive(Debug, Clone)]
pub struct CorrelationAccumulator<T> {
    /// Covariance of the same pairs
    covariance: CovarianceAccumulator<T>,
    /// Sum of squared deviations of x
    mx2: f64,
    /// Sum of squared deviations of y
    my2: f64,
    /// Whether the single consume already happened
    consumed: bool,
}

impl<T: Element> CorrelationAccumulator<T> {
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
    pub const fn with_decimal_scale(decimal_scale: i32, options: VarianceOptions) -> Self {
        Self {
            covariance: CovarianceAccumulator::with_decimal_scale(decimal_scale, options),
            mx2: 0.0,
            my2: 0.0,
            consumed: false,
        }
    }

    /// Consumes the one chunk of paired values this accumulator covers
    ///
    /// # Arguments
    ///
    /// * `x` - The first operand
    /// * `y` - The second operand, position aligned with `x`
    ///
    /// # Returns
    ///
    /// * `Result<()>` - `LengthMismatch` if the operands can not be paired
    ///
    /// # Panics
    ///
    /// Panics if the accumulator already consumed a chunk or already holds
    /// merged pairs: the squared deviations would be centered on a mean that
    /// no longer describes the pairs they were summed over.
    pub fn consume<X, Y>(&mut self, x: &X, y: &Y) -> Result<()>
    where
        X: NullableSequence<Item = T> + ?Sized,
        Y: NullableSequence<Item = T> + ?Sized,
    {
        assert!(
            !self.consumed && self.covariance.count() == 0,
            "correlation accumulator consumes once while empty, merge further chunks instead"
        );
        self.covariance.consume(x, y)?;
        self.consumed = true;

        if self.covariance.count() > 0 {
            let (mean_x, mean_y) = self.covariance.mean();
            let scale = self.covariance.decimal_scale();
            self.mx2 = sum_paired(x, y, |a, _| {
                let d = a.to_f64_scaled(scale) - mean_x;
                d * d
            });
            self.my2 = sum_paired(x, y, |_, b| {
                let d = b.to_f64_scaled(scale) - mean_y;
                d * d
            });
        }
        Ok(())
    }

    /// Merges the state of another partition into this one
    ///
    /// # Arguments
    ///
    /// * `other` - The accumulator of a disjoint partition
    pub fn merge_from(&mut self, other: &Self) {
        let count1 = self.covariance.count();
        let (mean_x1, mean_y1) = self.covariance.mean();
        let count2 = other.covariance.count();
        let (mean_x2, mean_y2) = other.covariance.mean();

        self.covariance.merge_from(&other.covariance);
        self.mx2 = merge_sum_sq((count1, mean_x1, self.mx2), (count2, mean_x2, other.mx2));
        self.my2 = merge_sum_sq((count1, mean_y1, self.my2), (count2, mean_y2, other.my2));
        self.consumed |= other.consumed;
    }

    /// Returns the Pearson correlation of every pair consumed or merged
    ///
    /// The value is not clamped and may leave `[-1, 1]` by rounding error.
    /// A constant operand yields a non-finite value.
    ///
    /// # Returns
    ///
    /// * `Option<f64>` - The correlation, or `None` under the same conditions
    ///   as [`CovarianceAccumulator::finalize`]
    pub fn finalize(&self) -> Option<f64> {
        if !self.covariance.is_admitted() {
            return None;
        }
        let denominator = self.covariance.denominator();
        let std_x = Float::sqrt(self.mx2 / denominator);
        let std_y = Float::sqrt(self.my2 / denominator);
        let covar = self.covariance.m_xy() / denominator;
        Some(covar / (std_x * std_y))
    }

    /// Returns the wrapped covariance state
    #[inline]
    pub const fn covariance(&self) -> &CovarianceAccumulator<T> {
        &self.covariance
    }

    /// Returns the sums of squared deviations of x and y
    #[inline]
    pub const fn sum_sq_dev(&self) -> (f64, f64) {
        (self.mx2, self.my2)
    }
}
