use crate::{NullableSequence, sum_paired, utils::paired_valid_runs_in};

/// Partial bivariate moments of a set of valid pairs
///
/// `count == 0` is the identity of [`merge`](Self::merge); its means and
/// cross moment are fixed at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    /// Number of pairs
    count: i64,
    /// Mean of x
    mean_x: f64,
    /// Mean of y
    mean_y: f64,
    /// Sum of centered cross products, not normalized
    m_xy: f64,
}

impl Moments {
    /// Moments of no pairs
    pub const EMPTY: Self = Self::new(0, 0.0, 0.0, 0.0);

    /// Creates moments from their parts
    pub const fn new(count: i64, mean_x: f64, mean_y: f64, m_xy: f64) -> Self {
        Self {
            count,
            mean_x,
            mean_y,
            m_xy,
        }
    }

    /// Returns the number of pairs
    #[inline]
    pub const fn count(&self) -> i64 {
        self.count
    }

    /// Returns the mean of x
    #[inline]
    pub const fn mean_x(&self) -> f64 {
        self.mean_x
    }

    /// Returns the mean of y
    #[inline]
    pub const fn mean_y(&self) -> f64 {
        self.mean_y
    }

    /// Returns the sum of centered cross products
    #[inline]
    pub const fn m_xy(&self) -> f64 {
        self.m_xy
    }

    /// Returns true for the identity element
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Computes the moments of the valid pairs of `x` and `y` in two passes
    ///
    /// The first pass sums each operand to get the means, the second sums
    /// the centered cross products against those means. Both passes use
    /// pairwise summation.
    ///
    /// # Arguments
    ///
    /// * `x` - The first operand
    /// * `y` - The second operand
    /// * `to_f64` - Conversion of an element to `f64`
    ///
    /// # Returns
    ///
    /// * `Moments` - The moments, empty when no pair is valid
    pub fn two_pass<X, Y, T, F>(x: &X, y: &Y, to_f64: F) -> Self
    where
        X: NullableSequence<Item = T> + ?Sized,
        Y: NullableSequence<Item = T> + ?Sized,
        F: Fn(T) -> f64,
    {
        let mut count = 0usize;
        paired_valid_runs_in(x, y, 0, x.len(), |_, n| count += n);
        if count == 0 {
            return Self::EMPTY;
        }

        let n = count as f64;
        let mean_x = sum_paired(x, y, |a, _| to_f64(a)) / n;
        let mean_y = sum_paired(x, y, |_, b| to_f64(b)) / n;
        let m_xy = sum_paired(x, y, |a, b| (to_f64(a) - mean_x) * (to_f64(b) - mean_y));

        Self::new(count as i64, mean_x, mean_y, m_xy)
    }

    /// Merges the moments of a disjoint set of pairs into `self`
    ///
    /// Bivariate form of the parallel mean/variance combination: the merged
    /// cross moment is the sum of both cross moments plus each side's count
    /// times the product of its mean shifts. The result does not depend on
    /// how a data set was split or in which order the parts are merged, up
    /// to floating point rounding.
    ///
    /// # Arguments
    ///
    /// * `other` - Moments of pairs disjoint from those in `self`
    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }

        let count1 = self.count as f64;
        let count2 = other.count as f64;
        let count = self.count + other.count;
        let n = count as f64;

        let mean_x = (self.mean_x * count1 + other.mean_x * count2) / n;
        let mean_y = (self.mean_y * count1 + other.mean_y * count2) / n;

        self.m_xy += other.m_xy
            + count1 * (self.mean_x - mean_x) * (self.mean_y - mean_y)
            + count2 * (other.mean_x - mean_x) * (other.mean_y - mean_y);
        self.mean_x = mean_x;
        self.mean_y = mean_y;
        self.count = count;
    }
}

/// Combines two sums of squared deviations over disjoint sets
///
/// Univariate form of [`Moments::merge`]; the means are the ones each side
/// had before merging.
///
/// # Arguments
///
/// * `(count1, mean1, m2_1)` - Count, mean and sum of squared deviations of the first set
/// * `(count2, mean2, m2_2)` - The same for the second set
///
/// # Returns
///
/// * `f64` - The sum of squared deviations of the union
pub(crate) fn merge_sum_sq(
    (count1, mean1, m2_1): (i64, f64, f64),
    (count2, mean2, m2_2): (i64, f64, f64),
) -> f64 {
    if count2 == 0 {
        return m2_1;
    }
    if count1 == 0 {
        return m2_2;
    }
    let (c1, c2) = (count1 as f64, count2 as f64);
    let mean = (mean1 * c1 + mean2 * c2) / (c1 + c2);
    m2_1 + m2_2 + c1 * (mean1 - mean) * (mean1 - mean) + c2 * (mean2 - mean) * (mean2 - mean)
}
