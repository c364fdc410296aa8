use alloc::vec::Vec;

use crate::{Bitmap, NullableSequence};

/// An owned nullable column of values
///
/// Null slots keep a default placeholder in `values`; the optional validity
/// bitmap is dropped entirely when the column has no nulls.
#[derive(Debug, Clone, PartialEq)]
pub struct Column<T> {
    /// Slot values, placeholders at null positions
    values: Vec<T>,
    /// Validity bits, `None` when every slot is valid
    validity: Option<Bitmap>,
    /// Cached number of null slots
    null_count: usize,
}

impl<T: Clone> Column<T> {
    /// Creates a column without nulls
    ///
    /// # Arguments
    ///
    /// * `values` - The slot values
    ///
    /// # Returns
    ///
    /// * `Self` - The column
    pub fn new(values: Vec<T>) -> Self {
        Self {
            values,
            validity: None,
            null_count: 0,
        }
    }

    /// Creates a column from values and a validity bitmap
    ///
    /// # Panics
    ///
    /// Panics if `validity` and `values` differ in length.
    pub fn with_validity(values: Vec<T>, validity: Bitmap) -> Self {
        assert_eq!(
            values.len(),
            validity.len(),
            "validity must cover every value"
        );
        let null_count = values.len() - validity.count_set();
        Self {
            values,
            validity: (null_count > 0).then_some(validity),
            null_count,
        }
    }

    /// Returns the slot values, including placeholders at null positions
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Returns the validity bitmap, `None` when the column has no nulls
    #[inline]
    pub const fn validity(&self) -> Option<&Bitmap> {
        self.validity.as_ref()
    }

    /// Returns the slots as options, `None` at null positions
    pub fn to_options(&self) -> Vec<Option<T>> {
        (0..self.values.len()).map(|i| self.get(i)).collect()
    }
}

impl<T: Clone + Default> Column<T> {
    /// Creates a column from optional values, `None` becomes a null slot
    pub fn from_options<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut builder = ColumnBuilder::with_capacity(iter.size_hint().0);
        for value in iter {
            builder.append_option(value);
        }
        builder.finish()
    }
}

impl<T: Clone + Default> FromIterator<Option<T>> for Column<T> {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        Self::from_options(iter)
    }
}

impl<T: Clone> From<Vec<T>> for Column<T> {
    fn from(values: Vec<T>) -> Self {
        Self::new(values)
    }
}

impl<T: Clone> NullableSequence for Column<T> {
    type Item = T;

    #[inline]
    fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    fn null_count(&self) -> usize {
        self.null_count
    }

    #[inline]
    fn is_valid(&self, index: usize) -> bool {
        index < self.values.len() && self.validity.as_ref().is_none_or(|bits| bits.get(index))
    }

    #[inline]
    fn value(&self, index: usize) -> T {
        self.values[index].clone()
    }

    fn visit_valid_runs_in<F>(&self, offset: usize, len: usize, mut f: F)
    where
        F: FnMut(usize, usize),
    {
        match &self.validity {
            Some(bits) => bits.visit_set_runs(offset, len, f),
            None => {
                let end = offset.saturating_add(len).min(self.values.len());
                if offset < end {
                    f(offset, end - offset);
                }
            }
        }
    }
}

/// Incremental builder for a [`Column`]
#[derive(Debug, Clone)]
pub struct ColumnBuilder<T> {
    values: Vec<T>,
    validity: Bitmap,
    null_count: usize,
}

impl<T: Clone + Default> Default for ColumnBuilder<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<T: Clone + Default> ColumnBuilder<T> {
    /// Creates a builder with room for `capacity` slots
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            validity: Bitmap::with_capacity(capacity),
            null_count: 0,
        }
    }

    /// Returns the number of slots appended so far
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Appends one valid value
    pub fn append_value(&mut self, value: T) -> &mut Self {
        self.values.push(value);
        self.validity.push(true);
        self
    }

    /// Appends `count` copies of `value`
    pub fn append_n(&mut self, value: T, count: usize) -> &mut Self {
        self.values.extend(core::iter::repeat_n(value, count));
        self.validity.extend_constant(count, true);
        self
    }

    /// Appends `count` null slots
    pub fn append_nulls(&mut self, count: usize) -> &mut Self {
        self.values.extend(core::iter::repeat_n(T::default(), count));
        self.validity.extend_constant(count, false);
        self.null_count += count;
        self
    }

    /// Appends a value or a null slot
    pub fn append_option(&mut self, value: Option<T>) -> &mut Self {
        match value {
            Some(v) => self.append_value(v),
            None => self.append_nulls(1),
        }
    }

    /// Finishes the column
    pub fn finish(self) -> Column<T> {
        Column {
            values: self.values,
            validity: (self.null_count > 0).then_some(self.validity),
            null_count: self.null_count,
        }
    }
}
