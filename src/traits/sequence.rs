use crate::Element;

/// A typed, nullable, sliceable sequence of values
///
/// This is the narrow view of a host columnar array that the accumulators
/// need: a length, a null count, positional access and a callback driven
/// walk over maximal runs of valid positions. Run positions are always
/// reported in the coordinates of the sequence being visited.
pub trait NullableSequence {
    /// Element stored in each slot
    type Item: Clone;

    /// Returns the number of slots, valid or null
    fn len(&self) -> usize;

    /// Returns the number of null slots
    fn null_count(&self) -> usize;

    /// Returns true if the slot at `index` holds a value
    fn is_valid(&self, index: usize) -> bool;

    /// Returns the raw slot at `index`
    ///
    /// The content of a null slot is unspecified, callers check
    /// [`is_valid`](Self::is_valid) or walk valid runs first.
    fn value(&self, index: usize) -> Self::Item;

    /// Calls `f(start, len)` for every maximal run of valid slots inside
    /// `offset..offset + len`
    ///
    /// The default implementation probes slot by slot, array backed
    /// sequences override it with a word at a time bitmap walk.
    fn visit_valid_runs_in<F>(&self, offset: usize, len: usize, mut f: F)
    where
        F: FnMut(usize, usize),
    {
        let end = offset.saturating_add(len).min(self.len());
        let mut run_start = None;
        for i in offset..end {
            match (self.is_valid(i), run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    f(start, i - start);
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            f(start, end - start);
        }
    }

    /// Calls `f(start, len)` for every maximal run of valid slots
    #[inline]
    fn visit_valid_runs<F>(&self, f: F)
    where
        F: FnMut(usize, usize),
    {
        self.visit_valid_runs_in(0, self.len(), f)
    }

    /// Returns the value at `index`, or `None` for a null slot
    #[inline]
    fn get(&self, index: usize) -> Option<Self::Item> {
        self.is_valid(index).then(|| self.value(index))
    }

    /// Returns the number of valid slots
    #[inline]
    fn valid_count(&self) -> usize {
        self.len() - self.null_count()
    }

    /// Returns a zero-copy view over `offset..offset + len`
    ///
    /// Out of range bounds are clamped to the sequence.
    fn slice(&self, offset: usize, len: usize) -> Sliced<'_, Self>
    where
        Self: Sized,
    {
        Sliced::new(self, offset, len)
    }
}

/// A borrowed window into another [`NullableSequence`]
#[derive(Debug)]
pub struct Sliced<'a, S: ?Sized> {
    inner: &'a S,
    offset: usize,
    len: usize,
    null_count: usize,
}

impl<S: ?Sized> Clone for Sliced<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for Sliced<'_, S> {}

impl<'a, S: NullableSequence + ?Sized> Sliced<'a, S> {
    /// Creates a view over `offset..offset + len` of `inner`, clamped to its length
    pub fn new(inner: &'a S, offset: usize, len: usize) -> Self {
        let offset = offset.min(inner.len());
        let len = len.min(inner.len() - offset);
        let null_count = if inner.null_count() == 0 {
            0
        } else {
            let mut valid = 0;
            inner.visit_valid_runs_in(offset, len, |_, n| valid += n);
            len - valid
        };
        Self {
            inner,
            offset,
            len,
            null_count,
        }
    }

    /// Returns the offset of the view into the underlying sequence
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

impl<S: NullableSequence + ?Sized> NullableSequence for Sliced<'_, S> {
    type Item = S::Item;

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn null_count(&self) -> usize {
        self.null_count
    }

    #[inline]
    fn is_valid(&self, index: usize) -> bool {
        index < self.len && self.inner.is_valid(self.offset + index)
    }

    #[inline]
    fn value(&self, index: usize) -> Self::Item {
        self.inner.value(self.offset + index)
    }

    fn visit_valid_runs_in<F>(&self, offset: usize, len: usize, mut f: F)
    where
        F: FnMut(usize, usize),
    {
        let offset = offset.min(self.len);
        let len = len.min(self.len - offset);
        let base = self.offset;
        self.inner
            .visit_valid_runs_in(base + offset, len, |start, n| f(start - base, n));
    }
}

impl<S: NullableSequence + ?Sized> NullableSequence for &S {
    type Item = S::Item;

    #[inline]
    fn len(&self) -> usize {
        (**self).len()
    }

    #[inline]
    fn null_count(&self) -> usize {
        (**self).null_count()
    }

    #[inline]
    fn is_valid(&self, index: usize) -> bool {
        (**self).is_valid(index)
    }

    #[inline]
    fn value(&self, index: usize) -> Self::Item {
        (**self).value(index)
    }

    fn visit_valid_runs_in<F>(&self, offset: usize, len: usize, f: F)
    where
        F: FnMut(usize, usize),
    {
        (**self).visit_valid_runs_in(offset, len, f)
    }
}

impl<T: Element> NullableSequence for [T] {
    type Item = T;

    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    #[inline]
    fn null_count(&self) -> usize {
        0
    }

    #[inline]
    fn is_valid(&self, index: usize) -> bool {
        index < <[T]>::len(self)
    }

    #[inline]
    fn value(&self, index: usize) -> T {
        self[index]
    }

    fn visit_valid_runs_in<F>(&self, offset: usize, len: usize, mut f: F)
    where
        F: FnMut(usize, usize),
    {
        let end = offset.saturating_add(len).min(<[T]>::len(self));
        if offset < end {
            f(offset, end - offset);
        }
    }
}

impl<T: Clone + Default> NullableSequence for [Option<T>] {
    type Item = T;

    #[inline]
    fn len(&self) -> usize {
        <[Option<T>]>::len(self)
    }

    fn null_count(&self) -> usize {
        self.iter().filter(|v| v.is_none()).count()
    }

    #[inline]
    fn is_valid(&self, index: usize) -> bool {
        matches!(<[Option<T>]>::get(self, index), Some(Some(_)))
    }

    #[inline]
    fn value(&self, index: usize) -> T {
        self[index].clone().unwrap_or_default()
    }
}
