use crate::{NullableSequence, paired_valid_runs};

/// Number of terms summed naively before a partial sum enters the cascade
pub const BLOCK_SIZE: usize = 16;

/// Maximum cascade depth, one level per bit of the pending mask
const LEVELS: usize = u64::BITS as usize;

/// Pairwise (cascade) summation state
///
/// Each finished block lands on level 0. Two pending sums on a level are
/// combined into the level above, exactly like a carry propagating through
/// a binary counter, so the rounding error grows with the depth of the tree
/// instead of the number of terms.
#[derive(Debug, Clone)]
struct Cascade {
    /// Partial sum per level
    sums: [f64; LEVELS],
    /// Bit `i` set when level `i` holds a pending sum
    mask: u64,
    /// Highest level reached so far
    root: usize,
}

impl Cascade {
    const fn new() -> Self {
        Self {
            sums: [0.0; LEVELS],
            mask: 0,
            root: 0,
        }
    }

    /// Folds one block sum into the cascade
    #[inline]
    fn reduce(&mut self, block_sum: f64) {
        let mut level = 0;
        let mut bit = 1u64;
        self.sums[level] += block_sum;
        self.mask ^= bit;
        while self.mask & bit == 0 && level + 1 < LEVELS {
            let carried = core::mem::take(&mut self.sums[level]);
            level += 1;
            bit <<= 1;
            self.sums[level] += carried;
            self.mask ^= bit;
        }
        self.root = self.root.max(level);
    }

    /// Sums `term(i)` for every `i` in `start..start + len`, block by block
    #[inline]
    fn push_run<F>(&mut self, start: usize, len: usize, term: F)
    where
        F: Fn(usize) -> f64,
    {
        let end = start + len;
        let mut pos = start;
        while pos < end {
            let block_end = (pos + BLOCK_SIZE).min(end);
            let block_sum = (pos..block_end).fold(0.0, |acc, i| acc + term(i));
            self.reduce(block_sum);
            pos = block_end;
        }
    }

    /// Collapses the pending levels, lowest first
    fn finish(mut self) -> f64 {
        for level in 1..=self.root {
            self.sums[level] += self.sums[level - 1];
        }
        self.sums[self.root]
    }
}

/// Sums `f(value)` over the valid slots of `values` with pairwise summation
///
/// Null runs are skipped entirely. An empty or all-null sequence sums to zero.
///
/// # Arguments
///
/// * `values` - The sequence to sum over
/// * `f` - The term computed for each valid value
///
/// # Returns
///
/// * `f64` - The sum
pub fn sum_valid<S, F>(values: &S, f: F) -> f64
where
    S: NullableSequence + ?Sized,
    F: Fn(S::Item) -> f64,
{
    let mut cascade = Cascade::new();
    values.visit_valid_runs(|start, len| cascade.push_run(start, len, |i| f(values.value(i))));
    cascade.finish()
}

/// Sums `f(x, y)` over positions where both `x` and `y` are valid
///
/// # Arguments
///
/// * `x` - The first operand
/// * `y` - The second operand
/// * `f` - The term computed for each valid pair
///
/// # Returns
///
/// * `f64` - The sum
pub fn sum_paired<X, Y, F>(x: &X, y: &Y, f: F) -> f64
where
    X: NullableSequence + ?Sized,
    Y: NullableSequence + ?Sized,
    F: Fn(X::Item, Y::Item) -> f64,
{
    let mut cascade = Cascade::new();
    paired_valid_runs(x, y, |start, len| {
        cascade.push_run(start, len, |i| f(x.value(i), y.value(i)))
    });
    cascade.finish()
}
