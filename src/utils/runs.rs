use crate::NullableSequence;

/// Calls `f(start, len)` for every maximal run of positions where both `x`
/// and `y` are valid
///
/// Positions past the shorter sequence never pair; callers that need the two
/// sequences aligned check their lengths first.
#[inline]
pub fn paired_valid_runs<X, Y, F>(x: &X, y: &Y, f: F)
where
    X: NullableSequence + ?Sized,
    Y: NullableSequence + ?Sized,
    F: FnMut(usize, usize),
{
    paired_valid_runs_in(x, y, 0, x.len().min(y.len()), f)
}

/// Like [`paired_valid_runs`], restricted to `offset..offset + len`
pub(crate) fn paired_valid_runs_in<X, Y, F>(x: &X, y: &Y, offset: usize, len: usize, mut f: F)
where
    X: NullableSequence + ?Sized,
    Y: NullableSequence + ?Sized,
    F: FnMut(usize, usize),
{
    let len = len.min(x.len().min(y.len()).saturating_sub(offset));
    match (x.null_count(), y.null_count()) {
        (_, 0) => x.visit_valid_runs_in(offset, len, f),
        (0, _) => y.visit_valid_runs_in(offset, len, f),
        _ => x.visit_valid_runs_in(offset, len, |start, n| y.visit_valid_runs_in(start, n, &mut f)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn pairs<X, Y>(x: &X, y: &Y) -> Vec<(usize, usize)>
    where
        X: NullableSequence + ?Sized,
        Y: NullableSequence + ?Sized,
    {
        let mut out = Vec::new();
        paired_valid_runs(x, y, |start, len| out.push((start, len)));
        out
    }

    #[test]
    fn intersection_of_runs() {
        let x = [Some(1), Some(2), Some(3), None, Some(5), Some(6)];
        let y = [Some(1), None, Some(3), Some(4), Some(5), Some(6)];
        assert_eq!(pairs(&x[..], &y[..]), [(0, 1), (2, 1), (4, 2)]);
    }

    #[test]
    fn dense_side_defers_to_other() {
        let x = [1, 2, 3, 4];
        let y = [None, Some(2), Some(3), None];
        assert_eq!(pairs(&x[..], &y[..]), [(1, 2)]);
        assert_eq!(pairs(&y[..], &x[..]), [(1, 2)]);
    }

    #[test]
    fn restricted_range() {
        let x = [1, 2, 3, 4, 5, 6];
        let y = [Some(1), Some(2), None, Some(4), Some(5), Some(6)];
        let mut out = Vec::new();
        paired_valid_runs_in(&x[..], &y[..], 1, 4, |start, len| out.push((start, len)));
        assert_eq!(out, [(1, 1), (3, 2)]);
    }
}
