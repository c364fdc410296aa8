/// Options shared by variance, covariance and correlation
///
/// Sums of products are normalized by `count - ddof`. Null handling and the
/// minimum observation threshold decide when a result exists at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarianceOptions {
    /// Delta Degrees of Freedom, sums of products are normalized by `count - ddof`
    ddof: i64,
    /// Skip null pairs instead of yielding no value
    skip_nulls: bool,
    /// Minimum number of valid pairs required for a result
    min_count: i64,
}

impl Default for VarianceOptions {
    fn default() -> Self {
        Self::new(0)
    }
}

impl VarianceOptions {
    /// Creates options with the given `ddof`, skipping nulls and no minimum count
    ///
    /// # Arguments
    ///
    /// * `ddof` - The Delta Degrees of Freedom
    ///
    /// # Returns
    ///
    /// * `Self` - The options object
    pub const fn new(ddof: i64) -> Self {
        Self {
            ddof,
            skip_nulls: true,
            min_count: 0,
        }
    }

    /// Returns the Delta Degrees of Freedom
    #[inline]
    pub const fn ddof(&self) -> i64 {
        self.ddof
    }

    /// Returns whether null pairs are skipped
    #[inline]
    pub const fn skip_nulls(&self) -> bool {
        self.skip_nulls
    }

    /// Returns the minimum number of valid pairs required for a result
    #[inline]
    pub const fn min_count(&self) -> i64 {
        self.min_count
    }

    /// Sets the Delta Degrees of Freedom
    ///
    /// # Arguments
    ///
    /// * `ddof` - The Delta Degrees of Freedom
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The options object
    #[inline]
    pub const fn set_ddof(&mut self, ddof: i64) -> &mut Self {
        self.ddof = ddof;
        self
    }

    /// Sets whether null pairs are skipped
    ///
    /// With `skip_nulls` false a single null in either operand turns the
    /// final result into no value.
    #[inline]
    pub const fn set_skip_nulls(&mut self, skip_nulls: bool) -> &mut Self {
        self.skip_nulls = skip_nulls;
        self
    }

    /// Sets the minimum number of valid pairs required for a result
    #[inline]
    pub const fn set_min_count(&mut self, min_count: i64) -> &mut Self {
        self.min_count = min_count;
        self
    }

    /// Returns true when `count` pairs, with or without nulls seen, produce a value
    ///
    /// # Arguments
    ///
    /// * `count` - Number of valid pairs accumulated
    /// * `all_valid` - Whether every consumed pair was non-null
    ///
    /// # Returns
    ///
    /// * `bool` - True if finalization yields a number
    #[inline]
    pub(crate) const fn admits(&self, count: i64, all_valid: bool) -> bool {
        count > self.ddof && count >= self.min_count && (all_valid || self.skip_nulls)
    }
}

/// Options for shifting a sequence
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShiftOptions<T> {
    /// Positive shifts right, negative shifts left
    periods: i32,
    /// Value written into vacated slots, null when absent
    fill_value: Option<T>,
}

impl<T> Default for ShiftOptions<T> {
    fn default() -> Self {
        Self::new(1)
    }
}

impl<T> ShiftOptions<T> {
    /// Creates shift options with the given periods and null fill
    ///
    /// # Arguments
    ///
    /// * `periods` - Number of positions to shift, negative for a left shift
    ///
    /// # Returns
    ///
    /// * `Self` - The options object
    pub const fn new(periods: i32) -> Self {
        Self {
            periods,
            fill_value: None,
        }
    }

    /// Returns the number of periods to shift by
    #[inline]
    pub const fn periods(&self) -> i32 {
        self.periods
    }

    /// Returns the fill value, `None` means vacated slots become null
    #[inline]
    pub const fn fill_value(&self) -> Option<&T> {
        self.fill_value.as_ref()
    }

    /// Sets the number of periods to shift by
    #[inline]
    pub const fn set_periods(&mut self, periods: i32) -> &mut Self {
        self.periods = periods;
        self
    }

    /// Sets the fill value
    ///
    /// # Arguments
    ///
    /// * `fill_value` - Value for vacated slots, `None` for nulls
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The options object
    #[inline]
    pub fn set_fill_value(&mut self, fill_value: Option<T>) -> &mut Self {
        self.fill_value = fill_value;
        self
    }
}
